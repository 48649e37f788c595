//! Fluent API for describing a component to start.

use std::collections::BTreeMap;

use hublink_common::constants::DEFAULT_BINDING_PREFIX;
use hublink_common::error::Result;
use hublink_script::binding::{Destination, parse_binding_spec};
use hublink_script::component::{ComponentProperties, PortBindings};

/// Builder for a start request.
#[derive(Debug)]
pub struct StartRequestBuilder {
    component_type: String,
    id: String,
    binding_prefix: String,
    attributes: BTreeMap<String, String>,
    bindings: Vec<String>,
    port_bindings: PortBindings,
}

impl StartRequestBuilder {
    /// Creates a builder for an instance `id` of `component_type`.
    #[must_use]
    pub fn new(component_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            component_type: component_type.into(),
            id: id.into(),
            binding_prefix: DEFAULT_BINDING_PREFIX.to_string(),
            attributes: BTreeMap::new(),
            bindings: Vec::new(),
            port_bindings: PortBindings::new(),
        }
    }

    /// Sets the key prefix marking binding attributes. Must match the
    /// linker's configuration.
    #[must_use]
    pub fn binding_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.binding_prefix = prefix.into();
        self
    }

    /// Sets an attribute value.
    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(key.into(), value.into());
        self
    }

    /// Adds a binding specification such as `out>Light.in,status>Panel.led`.
    ///
    /// Each specification becomes its own binding attribute, under the
    /// first of `<prefix>`, `<prefix>_1`, ... not already set through
    /// [`attribute`](Self::attribute).
    #[must_use]
    pub fn binding(mut self, spec: impl Into<String>) -> Self {
        self.bindings.push(spec.into());
        self
    }

    /// Binds a port to an explicit destination `<node>.<component>.<port>`.
    #[must_use]
    pub fn bind(mut self, port: impl Into<String>, destination: impl Into<String>) -> Self {
        self.port_bindings
            .entry(port.into())
            .or_default()
            .push(destination.into());
        self
    }

    /// Checks the request and returns its properties.
    ///
    /// # Errors
    ///
    /// Returns [`HublinkError::NotFound`](hublink_common::error::HublinkError::NotFound)
    /// if the id or type is empty, and
    /// [`HublinkError::InvalidBinding`](hublink_common::error::HublinkError::InvalidBinding)
    /// if a specification or destination is malformed.
    pub fn build(self) -> Result<ComponentProperties> {
        let mut props = ComponentProperties::new(self.component_type, self.id);
        props.validate()?;

        for destination in self.port_bindings.values().flatten() {
            let _ = Destination::parse(destination)?;
        }
        props.port_bindings = self.port_bindings;
        props.attributes = self.attributes;

        let mut n = 0;
        for spec in self.bindings {
            let _ = parse_binding_spec(&spec)?;
            let key = loop {
                let key = if n == 0 {
                    self.binding_prefix.clone()
                } else {
                    format!("{}_{n}", self.binding_prefix)
                };
                n += 1;
                if !props.attributes.contains_key(&key) {
                    break key;
                }
            };
            let _ = props.attributes.insert(key, spec);
        }
        tracing::debug!(id = %props.id, attributes = props.attributes.len(), "start request built");
        Ok(props)
    }
}
