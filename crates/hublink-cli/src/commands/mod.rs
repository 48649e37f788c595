//! CLI command definitions and dispatch.

pub mod check;
pub mod plan;
pub mod push;
pub mod set;
pub mod start;
pub mod stop;
pub mod stop_type;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use hublink_common::config::LinkerConfig;
use hublink_common::constants::{
    BIN_NAME, DEFAULT_CONFIG_FILE, DEFAULT_MODEL_FILE, DEFAULT_SPOOL_DIR,
};
use hublink_runtime::engine::Linker;
use hublink_runtime::spool::SpoolModelService;
use hublink_sdk::event::EventListener;

use crate::output;

/// hublink: adaptation scripts for the components of one node.
#[derive(Parser, Debug)]
#[command(name = BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Options shared by every subcommand.
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Linker configuration file (YAML). Defaults to `hublink.yaml` when present.
    #[arg(long, global = true, env = "HUBLINK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Node to generate scripts for. Overrides the configuration.
    #[arg(long, global = true, env = "HUBLINK_NODE")]
    pub node: Option<String>,

    /// Model document (JSON) the scripts are planned against.
    #[arg(long, global = true, env = "HUBLINK_MODEL", default_value = DEFAULT_MODEL_FILE)]
    pub model: PathBuf,

    /// Directory accepted scripts are written to.
    #[arg(long, global = true, env = "HUBLINK_SPOOL", default_value = DEFAULT_SPOOL_DIR)]
    pub spool: PathBuf,

    /// Print the adaptation events of the request as JSON lines.
    #[arg(long, global = true)]
    pub events: bool,
}

impl GlobalArgs {
    /// Loads the configuration and applies command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or is invalid.
    pub fn linker_config(&self) -> anyhow::Result<LinkerConfig> {
        let mut config = match &self.config {
            Some(path) => LinkerConfig::load(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                LinkerConfig::load(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => LinkerConfig::default(),
        };
        if let Some(node) = &self.node {
            config.node_name.clone_from(node);
        }
        config.validate()?;
        tracing::debug!(node = %config.node_name, "configuration loaded");
        Ok(config)
    }

    /// Opens the spool model service and a linker over it.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or the model cannot be loaded.
    pub fn linker(&self) -> anyhow::Result<Session> {
        let config = self.linker_config()?;
        let service = Arc::new(SpoolModelService::open(&self.model, &self.spool)?);
        let linker = Linker::new(config, service.clone());
        let listener = self.events.then(|| EventListener::new(&linker));
        Ok(Session {
            linker,
            service,
            listener,
        })
    }
}

/// A linker opened for one command.
#[derive(Debug)]
pub struct Session {
    /// The linker.
    pub linker: Linker,
    /// Its model service.
    pub service: Arc<SpoolModelService>,
    listener: Option<EventListener>,
}

impl Session {
    /// Prints the events collected so far when `--events` was given.
    ///
    /// # Errors
    ///
    /// Returns an error if an event cannot be serialized.
    pub fn print_events(&mut self) -> anyhow::Result<()> {
        if let Some(listener) = &mut self.listener {
            for event in listener.drain() {
                println!("{}", serde_json::to_string(&event)?);
            }
        }
        Ok(())
    }

    /// Prints the spooled file count after a submission.
    pub fn report_spool(&self) {
        match self.service.spooled() {
            Ok(files) => eprintln!(
                "  {} script(s) waiting in {}",
                files.len(),
                self.service.spool_dir().display()
            ),
            Err(e) => tracing::warn!(error = %e, "cannot list spool directory"),
        }
    }
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the script a start request would submit.
    Plan(plan::PlanArgs),
    /// Start a component on the node.
    Start(start::StartArgs),
    /// Remove components from the node by id.
    Stop(stop::StopArgs),
    /// Remove every running instance of some component types.
    StopType(stop_type::StopTypeArgs),
    /// Assign one attribute of a running component.
    Set(set::SetArgs),
    /// Submit a script file verbatim.
    Push(push::PushArgs),
    /// Parse a script file and check it against the model.
    Check(check::CheckArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    let global = cli.global;
    let result = match cli.command {
        Command::Plan(args) => plan::execute(args, &global),
        Command::Start(args) => start::execute(args, &global).await,
        Command::Stop(args) => stop::execute(args, &global).await,
        Command::StopType(args) => stop_type::execute(args, &global).await,
        Command::Set(args) => set::execute(args, &global).await,
        Command::Push(args) => push::execute(args, &global).await,
        Command::Check(args) => check::execute(args, &global),
    };
    result.map_err(output::request_error)
}
