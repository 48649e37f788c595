//! `hlk stop-type`: Remove every running instance of some component types.

use clap::Args;

use super::GlobalArgs;
use crate::output;

/// Arguments for the `stop-type` command.
#[derive(Args, Debug)]
pub struct StopTypeArgs {
    /// Component type names. Only the simple name is compared.
    #[arg(required = true)]
    pub types: Vec<String>,
}

/// Executes the `stop-type` command.
///
/// # Errors
///
/// Returns an error if the removal script is rejected.
pub async fn execute(args: StopTypeArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let mut session = global.linker()?;
    let result = session.linker.stop_component_by_type(&args.types).await;
    session.print_events()?;
    let outcome = result?;
    eprintln!(
        "{}",
        output::describe_outcome("stop", &args.types.join(", "), &outcome)
    );
    if outcome.submitted {
        session.report_spool();
    }
    Ok(())
}
