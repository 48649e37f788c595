//! `hlk check`: Parse a script file and check it against the model.

use std::path::PathBuf;

use clap::Args;
use hublink_model::snapshot::ModelSnapshot;
use hublink_model::store::load_model;
use hublink_sdk::checker::ScriptChecker;

use super::GlobalArgs;
use crate::output;

/// Arguments for the `check` command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Script file to check.
    pub file: PathBuf,

    /// Move operations after the ones creating their targets before checking.
    #[arg(long)]
    pub reorder: bool,
}

/// Executes the `check` command.
///
/// # Errors
///
/// Returns an error if the script does not parse or would not apply.
pub fn execute(args: CheckArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let mut checker = ScriptChecker::load(&args.file)?;
    if args.reorder {
        checker = ScriptChecker::from(checker.ordered());
    }
    let snapshot = ModelSnapshot::from(load_model(&global.model)?);

    checker.check(&snapshot)?;
    print!("{}", output::numbered(checker.script()));
    eprintln!(
        "  {}: {} operation(s), order OK",
        args.file.display(),
        checker.script().len()
    );
    Ok(())
}
