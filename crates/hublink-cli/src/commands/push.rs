//! `hlk push`: Submit a script file verbatim.

use std::io::Read;
use std::path::PathBuf;

use clap::Args;

use super::GlobalArgs;
use crate::output;

/// Arguments for the `push` command.
#[derive(Args, Debug)]
pub struct PushArgs {
    /// Script file, or `-` for standard input.
    pub file: PathBuf,
}

/// Executes the `push` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the script is rejected.
pub async fn execute(args: PushArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let text = if args.file.as_os_str() == "-" {
        let mut text = String::new();
        let _ = std::io::stdin().read_to_string(&mut text)?;
        text
    } else {
        std::fs::read_to_string(&args.file)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {e}", args.file.display()))?
    };

    let mut session = global.linker()?;
    let result = session.linker.push_script(&text).await;
    session.print_events()?;
    let outcome = result?;
    eprintln!(
        "{}",
        output::describe_outcome("push", &args.file.display().to_string(), &outcome)
    );
    if outcome.submitted {
        session.report_spool();
    }
    Ok(())
}
