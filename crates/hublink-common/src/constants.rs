//! System-wide constants and defaults.

/// Type name used when a channel is created to relay a binding.
pub const DEFAULT_CHANNEL_TYPE: &str = "AsyncBroadcast";

/// Prefix of the channel identifiers generated for bindings.
pub const CHANNEL_ID_PREFIX: &str = "chan";

/// Attribute keys starting with this prefix carry binding specifications
/// instead of plain attribute values.
pub const DEFAULT_BINDING_PREFIX: &str = "binding";

/// Node name used when neither the configuration nor the CLI sets one.
pub const DEFAULT_NODE_NAME: &str = "node0";

/// Default description advertised by the linker service.
pub const DEFAULT_DESCRIPTION: &str =
    "Automate the deployment of Active Home components on the component model.";

/// Default request path the linker service is reachable under.
pub const DEFAULT_SRC: &str = "/active-home-linker";

/// Default configuration file looked up by the CLI.
pub const DEFAULT_CONFIG_FILE: &str = "hublink.yaml";

/// Default model file read by the spool model service.
pub const DEFAULT_MODEL_FILE: &str = "model.json";

/// Default directory accepted scripts are written to.
pub const DEFAULT_SPOOL_DIR: &str = "spool";

/// File extension of spooled scripts.
pub const SCRIPT_EXTENSION: &str = "kevs";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "hlk";
