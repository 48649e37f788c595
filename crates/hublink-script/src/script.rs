//! Typed adaptation script operations.
//!
//! Scripts are built and inspected as [`ScriptOp`] records. They are
//! rendered to the line-oriented text format only when handed to the
//! apply engine:
//!
//! ```text
//! add <node>.<id> : <TypeName>
//! add <channelId> : <ChannelType>
//! set <node>.<id>.<attr> = "<value>"
//! bind <node>.<id>.<port> <channelId>
//! remove <node>.<id>
//! ```

use std::fmt;

use hublink_common::error::Result;
use hublink_common::types::{ChannelId, ComponentPath};

/// A port of a component instance: `<node>.<id>.<port>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortRef {
    /// Component owning the port.
    pub component: ComponentPath,
    /// Port name.
    pub port: String,
}

impl PortRef {
    /// Creates a port reference.
    #[must_use]
    pub fn new(component: ComponentPath, port: impl Into<String>) -> Self {
        Self {
            component,
            port: port.into(),
        }
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.component, self.port)
    }
}

/// One model mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptOp {
    /// Instantiates a component on a node.
    AddComponent {
        /// Where the component is created.
        path: ComponentPath,
        /// Type to instantiate, as requested.
        type_name: String,
    },
    /// Creates a channel.
    AddChannel {
        /// Channel id.
        channel: ChannelId,
        /// Channel type.
        type_name: String,
    },
    /// Assigns an attribute value.
    SetAttribute {
        /// Component whose attribute is set.
        path: ComponentPath,
        /// Attribute name.
        attribute: String,
        /// New value.
        value: String,
    },
    /// Connects a port to a channel.
    Bind {
        /// Port being connected.
        port: PortRef,
        /// Channel the port joins.
        channel: ChannelId,
    },
    /// Removes a component instance.
    Remove {
        /// Component to remove.
        path: ComponentPath,
    },
}

impl ScriptOp {
    /// Keyword the operation is written with.
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::AddComponent { .. } | Self::AddChannel { .. } => "add",
            Self::SetAttribute { .. } => "set",
            Self::Bind { .. } => "bind",
            Self::Remove { .. } => "remove",
        }
    }
}

impl fmt::Display for ScriptOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddComponent { path, type_name } => write!(f, "add {path} : {type_name}"),
            Self::AddChannel { channel, type_name } => write!(f, "add {channel} : {type_name}"),
            Self::SetAttribute {
                path,
                attribute,
                value,
            } => write!(f, "set {path}.{attribute} = \"{}\"", escape(value)),
            Self::Bind { port, channel } => write!(f, "bind {port} {channel}"),
            Self::Remove { path } => write!(f, "remove {path}"),
        }
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

/// An ordered sequence of operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    ops: Vec<ScriptOp>,
}

impl Script {
    /// Creates an empty script.
    #[must_use]
    pub const fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Parses script text. See [`crate::parser::parse_script`].
    ///
    /// # Errors
    ///
    /// Returns an error naming the first line that cannot be parsed.
    pub fn parse(text: &str) -> Result<Self> {
        crate::parser::parse_script(text)
    }

    /// Appends an operation.
    pub fn push(&mut self, op: ScriptOp) {
        self.ops.push(op);
    }

    /// Operations in execution order.
    #[must_use]
    pub fn ops(&self) -> &[ScriptOp] {
        &self.ops
    }

    /// Number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the script has no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Iterates over operations in execution order.
    pub fn iter(&self) -> std::slice::Iter<'_, ScriptOp> {
        self.ops.iter()
    }

    /// Renders the text handed to the apply engine, one line per
    /// operation, each terminated by a newline.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for op in &self.ops {
            writeln!(f, "{op}")?;
        }
        Ok(())
    }
}

impl Extend<ScriptOp> for Script {
    fn extend<T: IntoIterator<Item = ScriptOp>>(&mut self, iter: T) {
        self.ops.extend(iter);
    }
}

impl FromIterator<ScriptOp> for Script {
    fn from_iter<T: IntoIterator<Item = ScriptOp>>(iter: T) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Script {
    type Item = ScriptOp;
    type IntoIter = std::vec::IntoIter<ScriptOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

impl<'a> IntoIterator for &'a Script {
    type Item = &'a ScriptOp;
    type IntoIter = std::slice::Iter<'a, ScriptOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}
