//! `hlk stop`: Remove components from the node by id.

use clap::Args;

use super::GlobalArgs;
use crate::output;

/// Arguments for the `stop` command.
#[derive(Args, Debug)]
pub struct StopArgs {
    /// Component ids to remove.
    #[arg(required = true)]
    pub ids: Vec<String>,
}

/// Executes the `stop` command.
///
/// Each id is removed by its own script; the first rejection stops the
/// command.
///
/// # Errors
///
/// Returns an error if a removal is rejected.
pub async fn execute(args: StopArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let mut session = global.linker()?;
    for id in &args.ids {
        let result = session.linker.stop(id).await;
        session.print_events()?;
        let outcome = result?;
        eprintln!("{}", output::describe_outcome("stop", id, &outcome));
    }
    session.report_spool();
    Ok(())
}
