//! Script synthesis.
//!
//! Turns resolved start requests into add, set, and bind operations, and
//! builds the removal and update scripts of the other requests. Every
//! binding is relayed through a channel derived from its destination;
//! channels are created at most once per script and never when the model
//! already has them.

use std::collections::HashSet;

use hublink_common::config::LinkerConfig;
use hublink_common::error::{HublinkError, Result};
use hublink_common::types::{ChannelId, ComponentPath};
use hublink_model::lookup::find_running;
use hublink_model::view::ModelView;

use crate::binding::{Destination, fill_binding_map};
use crate::component::{ComponentProperties, PortBindings};
use crate::script::{PortRef, Script, ScriptOp};

/// Channels already queued for creation within one synthesis call.
#[derive(Debug, Default)]
struct QueuedChannels(HashSet<ChannelId>);

impl QueuedChannels {
    /// Records a channel, returning `false` if it was already queued.
    fn queue(&mut self, channel: &ChannelId) -> bool {
        self.0.insert(channel.clone())
    }
}

/// Builds scripts for one node against one model snapshot.
#[derive(Debug)]
pub struct Synthesizer<'a, V: ModelView + ?Sized> {
    view: &'a V,
    node: &'a str,
    channel_type: &'a str,
    binding_prefix: &'a str,
}

impl<'a, V: ModelView + ?Sized> Synthesizer<'a, V> {
    /// Creates a synthesizer for the configured node.
    #[must_use]
    pub fn new(view: &'a V, config: &'a LinkerConfig) -> Self {
        Self {
            view,
            node: &config.node_name,
            channel_type: &config.channel_type,
            binding_prefix: &config.binding_prefix,
        }
    }

    /// Node the scripts are generated for.
    #[must_use]
    pub const fn node(&self) -> &'a str {
        self.node
    }

    /// Channel relaying bindings into `dest` from this node.
    #[must_use]
    pub fn channel_for(&self, dest: &Destination) -> ChannelId {
        ChannelId::derive(&dest.port, self.node, &dest.component.id)
    }

    /// Builds the script starting a component.
    ///
    /// The script adds the component, sets every plain attribute, then
    /// creates missing channels and binds ports. Binding attributes are
    /// parsed into destinations and merged with the explicit port bindings
    /// instead of being set.
    ///
    /// # Errors
    ///
    /// Returns [`HublinkError::NotFound`] if the id or type is missing, and
    /// [`HublinkError::InvalidBinding`] if a binding is malformed.
    pub fn start_script(&self, props: &ComponentProperties) -> Result<Script> {
        props.validate()?;
        let path = props.path(self.node);

        let mut script = Script::new();
        script.push(ScriptOp::AddComponent {
            path: path.clone(),
            type_name: props.component_type.clone(),
        });

        for (key, value) in props.plain_attributes(self.binding_prefix) {
            script.push(ScriptOp::SetAttribute {
                path: path.clone(),
                attribute: key.clone(),
                value: value.clone(),
            });
        }

        let mut bindings = props.port_bindings.clone();
        for (_, raw) in props.binding_attributes(self.binding_prefix) {
            fill_binding_map(raw, self.view, self.node, &mut bindings)?;
        }

        let mut queued = QueuedChannels::default();
        self.push_bindings(&mut script, &path, &bindings, &mut queued)?;
        Ok(script)
    }

    /// Builds a script binding an already added component according to
    /// the binding attributes named by `keys`.
    ///
    /// Keys without the binding prefix, or absent from the attributes, are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`HublinkError::NotFound`] if the id or type is missing, and
    /// [`HublinkError::InvalidBinding`] if a binding is malformed.
    pub fn binding_script<'k, I>(&self, props: &ComponentProperties, keys: I) -> Result<Script>
    where
        I: IntoIterator<Item = &'k str>,
    {
        props.validate()?;
        let path = props.path(self.node);
        let mut bindings = PortBindings::new();
        for key in keys {
            if !key.starts_with(self.binding_prefix) {
                continue;
            }
            if let Some(raw) = props.attributes.get(key) {
                fill_binding_map(raw, self.view, self.node, &mut bindings)?;
            }
        }

        let mut script = Script::new();
        let mut queued = QueuedChannels::default();
        self.push_bindings(&mut script, &path, &bindings, &mut queued)?;
        Ok(script)
    }

    fn push_bindings(
        &self,
        script: &mut Script,
        source: &ComponentPath,
        bindings: &PortBindings,
        queued: &mut QueuedChannels,
    ) -> Result<()> {
        for (port, destinations) in bindings {
            for token in destinations {
                let dest = Destination::parse(token)?;
                let channel = self.channel_for(&dest);
                if self.view.find_hub(channel.as_str()).is_none() && queued.queue(&channel) {
                    script.push(ScriptOp::AddChannel {
                        channel: channel.clone(),
                        type_name: self.channel_type.to_string(),
                    });
                    script.push(ScriptOp::Bind {
                        port: dest.port_ref(),
                        channel: channel.clone(),
                    });
                }
                script.push(ScriptOp::Bind {
                    port: PortRef::new(source.clone(), port.clone()),
                    channel,
                });
            }
        }
        Ok(())
    }

    /// Builds the script removing every component of the given types
    /// running on this node. Empty when nothing matches.
    #[must_use]
    pub fn stop_by_type_script<S: AsRef<str>>(&self, type_names: &[S]) -> Script {
        let mut seen = HashSet::new();
        let mut script = Script::new();
        for type_name in type_names {
            for path in find_running(self.view, type_name.as_ref(), &[self.node]) {
                if seen.insert(path.clone()) {
                    script.push(ScriptOp::Remove { path });
                }
            }
        }
        script
    }

    /// Builds the script removing one component of this node.
    ///
    /// # Errors
    ///
    /// Returns [`HublinkError::NotFound`] if the id is empty.
    pub fn remove_script(&self, id: &str) -> Result<Script> {
        let path = self.local_path(id)?;
        Ok(std::iter::once(ScriptOp::Remove { path }).collect())
    }

    /// Builds the script assigning one attribute of a component of this node.
    ///
    /// # Errors
    ///
    /// Returns [`HublinkError::NotFound`] if the id or attribute is empty.
    pub fn set_attribute_script(&self, id: &str, attribute: &str, value: &str) -> Result<Script> {
        let path = self.local_path(id)?;
        if attribute.is_empty() {
            return Err(HublinkError::NotFound {
                kind: "attribute name",
                id: format!("update of {path}"),
            });
        }
        Ok(std::iter::once(ScriptOp::SetAttribute {
            path,
            attribute: attribute.to_string(),
            value: value.to_string(),
        })
        .collect())
    }

    fn local_path(&self, id: &str) -> Result<ComponentPath> {
        if id.trim().is_empty() {
            return Err(HublinkError::NotFound {
                kind: "component id",
                id: format!("request on node {}", self.node),
            });
        }
        Ok(ComponentPath::new(self.node, id))
    }
}
