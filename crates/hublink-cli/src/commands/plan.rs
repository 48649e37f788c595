//! `hlk plan`: Show the script a start request would submit.

use clap::Args;

use super::GlobalArgs;
use super::start::ComponentArgs;
use crate::output;

/// Arguments for the `plan` command.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// The component to plan for.
    #[command(flatten)]
    pub component: ComponentArgs,
}

/// Executes the `plan` command.
///
/// Resolves the component's type requirements against the model and
/// prints the start script without submitting it.
///
/// # Errors
///
/// Returns an error if the request is invalid or the model cannot be loaded.
pub fn execute(args: PlanArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let session = global.linker()?;
    let config = session.linker.config();
    let props = args.component.properties(&config.binding_prefix)?;
    let path = props.path(&config.node_name);

    println!("Start plan for: {path} ({})", props.component_type);
    println!("{}", output::rule(40));
    match session.linker.plan_start(&props)? {
        Some(script) => {
            print!("{}", output::numbered(&script));
            println!();
            println!("  {} operation(s) would be submitted.", script.len());
        }
        None => println!("  {path} is already running, nothing would be submitted."),
    }
    Ok(())
}
