//! The compact binding grammar.
//!
//! A binding specification is a comma-separated list of entries:
//!
//! ```text
//! <sourcePort>><TypeReference>.<destinationPort>
//! ```
//!
//! The type reference may be qualified (`org.activehome.Light`); only its
//! simple name is used to find destinations. Each entry fans out to every
//! running instance of the type on the local node.

use std::fmt;

use hublink_common::error::{HublinkError, Result};
use hublink_common::types::ComponentPath;
use hublink_model::lookup::find_running;
use hublink_model::view::ModelView;
use nom::{
    IResult, Parser, bytes::complete::take_while1, character::complete::char,
    combinator::all_consuming, sequence::separated_pair,
};

use crate::component::PortBindings;
use crate::script::PortRef;

/// One parsed binding entry, before destinations are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingEntry {
    /// Port of the component being started.
    pub source_port: String,
    /// Type of the destination components.
    pub type_ref: String,
    /// Port of each destination component.
    pub dest_port: String,
}

/// A resolved destination token: `<node>.<componentId>.<port>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Destination {
    /// Destination component.
    pub component: ComponentPath,
    /// Destination port.
    pub port: String,
}

impl Destination {
    /// Parses a destination token.
    ///
    /// # Errors
    ///
    /// Returns [`HublinkError::InvalidBinding`] unless the token has exactly
    /// three non-empty dot-separated fields.
    pub fn parse(token: &str) -> Result<Self> {
        let fields: Vec<&str> = token.split('.').collect();
        match fields.as_slice() {
            [node, id, port] if !node.is_empty() && !id.is_empty() && !port.is_empty() => {
                Ok(Self {
                    component: ComponentPath::new(*node, *id),
                    port: (*port).to_string(),
                })
            }
            _ => Err(HublinkError::InvalidBinding {
                entry: token.to_string(),
                reason: format!(
                    "destination needs <node>.<component>.<port>, found {} field(s)",
                    fields.len()
                ),
            }),
        }
    }

    /// The destination as a port reference.
    #[must_use]
    pub fn port_ref(&self) -> PortRef {
        PortRef::new(self.component.clone(), self.port.clone())
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.component, self.port)
    }
}

const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

const fn is_reference_char(c: char) -> bool {
    is_name_char(c) || c == '.' || c == '/'
}

fn port_name(input: &str) -> IResult<&str, &str> {
    take_while1(is_name_char)(input)
}

fn reference(input: &str) -> IResult<&str, &str> {
    take_while1(is_reference_char)(input)
}

fn entry(input: &str) -> IResult<&str, (&str, &str)> {
    all_consuming(separated_pair(port_name, char('>'), reference)).parse(input)
}

fn parse_entry(raw: &str) -> Result<BindingEntry> {
    let invalid = |reason: &str| HublinkError::InvalidBinding {
        entry: raw.to_string(),
        reason: reason.to_string(),
    };
    let (_, (source, destination)) =
        entry(raw).map_err(|_| invalid("expected <port>><Type>.<port>"))?;
    let (type_ref, dest_port) = destination
        .rsplit_once('.')
        .ok_or_else(|| invalid("destination has no port field"))?;
    if dest_port.is_empty() || type_ref.is_empty() || type_ref.ends_with('.') {
        return Err(invalid("empty type or port field"));
    }
    // `Type/1.0` without a port would otherwise split inside the version.
    if !dest_port.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
        || !dest_port.chars().all(is_name_char)
    {
        return Err(invalid("destination port must follow the type and its version"));
    }
    if let Some((name, version)) = type_ref.split_once('/') {
        if name.is_empty() || version.is_empty() || version.contains('/') {
            return Err(invalid("expected <Type>/<version>"));
        }
    }
    Ok(BindingEntry {
        source_port: source.to_string(),
        type_ref: type_ref.to_string(),
        dest_port: dest_port.to_string(),
    })
}

/// Parses a binding specification into its entries.
///
/// Blanks around entries and empty entries (such as a trailing comma) are
/// ignored.
///
/// # Errors
///
/// Returns [`HublinkError::InvalidBinding`] for the first malformed entry.
pub fn parse_binding_spec(raw: &str) -> Result<Vec<BindingEntry>> {
    raw.split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(parse_entry)
        .collect()
}

/// Resolves a binding specification against the components running on
/// `local_node` and appends the destinations to `map`.
///
/// Every source port named in the specification gets an entry in `map`,
/// even when no destination instance is running.
///
/// # Errors
///
/// Returns [`HublinkError::InvalidBinding`] if the specification is malformed.
/// Nothing is added to `map` in that case.
pub fn fill_binding_map<V: ModelView + ?Sized>(
    raw: &str,
    view: &V,
    local_node: &str,
    map: &mut PortBindings,
) -> Result<()> {
    let entries = parse_binding_spec(raw)?;
    for entry in entries {
        let running = find_running(view, &entry.type_ref, &[local_node]);
        if running.is_empty() {
            tracing::warn!(
                port = %entry.source_port,
                type_ref = %entry.type_ref,
                node = local_node,
                "no running destination for binding"
            );
        }
        map.entry(entry.source_port)
            .or_default()
            .extend(running.iter().map(|path| path.member(&entry.dest_port)));
    }
    Ok(())
}
