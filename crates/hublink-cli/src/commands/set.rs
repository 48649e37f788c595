//! `hlk set`: Assign one attribute of a running component.

use clap::Args;

use super::GlobalArgs;
use crate::output;

/// Arguments for the `set` command.
#[derive(Args, Debug)]
pub struct SetArgs {
    /// Component id.
    pub id: String,
    /// Attribute name.
    pub attribute: String,
    /// New value.
    pub value: String,
}

/// Executes the `set` command.
///
/// # Errors
///
/// Returns an error if the update is rejected.
pub async fn execute(args: SetArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let mut session = global.linker()?;
    let result = session
        .linker
        .update_component_attribute(&args.id, &args.attribute, &args.value)
        .await;
    session.print_events()?;
    let outcome = result?;
    eprintln!(
        "{}",
        output::describe_outcome("update", &format!("{}.{}", args.id, args.attribute), &outcome)
    );
    session.report_spool();
    Ok(())
}
