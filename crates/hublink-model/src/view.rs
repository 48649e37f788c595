//! Query interface over a model.
//!
//! Resolution and synthesis only ever read the model through
//! [`ModelView`], so they work against any structure the host model
//! library exposes.

use crate::model::{ComponentInstance, Hub, ModelRoot, Node, Package, TypeDefinition};
use crate::typeref::TypeRef;

/// Read-only queries over the component model.
pub trait ModelView {
    /// Finds an execution node by name.
    fn find_node(&self, name: &str) -> Option<&Node>;

    /// Finds a package by dotted path, walking the tree one segment at a
    /// time. Returns `None` as soon as a segment is missing.
    fn find_package(&self, path: &str) -> Option<&Package>;

    /// Finds the type definition for a possibly qualified, possibly
    /// versioned type name.
    fn find_type_definition(&self, type_name: &str) -> Option<&TypeDefinition>;

    /// Finds a channel by id.
    fn find_hub(&self, id: &str) -> Option<&Hub>;

    /// Lists the components of a node. Unknown nodes have none.
    fn list_components(&self, node: &str) -> &[ComponentInstance];

    /// Finds a component instance on a node.
    fn find_component(&self, node: &str, id: &str) -> Option<&ComponentInstance> {
        self.find_node(node).and_then(|n| n.find_component(id))
    }
}

impl ModelView for ModelRoot {
    fn find_node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    fn find_package(&self, path: &str) -> Option<&Package> {
        let mut segments = path.split('.');
        let first = segments.next().filter(|s| !s.is_empty())?;
        let mut pack = self.packages.iter().find(|p| p.name == first)?;
        for segment in segments {
            pack = pack.find_package(segment)?;
        }
        Some(pack)
    }

    fn find_type_definition(&self, type_name: &str) -> Option<&TypeDefinition> {
        let type_ref = TypeRef::parse(type_name);
        self.find_package(type_ref.package())?
            .find_type_definition(type_ref.simple_name())
    }

    fn find_hub(&self, id: &str) -> Option<&Hub> {
        self.hubs.iter().find(|h| h.name == id)
    }

    fn list_components(&self, node: &str) -> &[ComponentInstance] {
        self.find_node(node).map_or(&[], |n| n.components.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DictionaryAttribute;

    fn sample() -> ModelRoot {
        ModelRoot {
            nodes: vec![Node {
                name: "home1".into(),
                components: vec![ComponentInstance {
                    name: "light_a".into(),
                    type_definition: "org.activehome.Light/1.0".into(),
                }],
            }],
            packages: vec![Package {
                name: "org".into(),
                packages: vec![Package {
                    name: "activehome".into(),
                    packages: Vec::new(),
                    type_definitions: vec![TypeDefinition {
                        name: "Light".into(),
                        version: Some("1.0".into()),
                        dictionary: vec![DictionaryAttribute {
                            name: "lux".into(),
                            default_value: Some("300".into()),
                        }],
                    }],
                }],
                type_definitions: Vec::new(),
            }],
            hubs: vec![Hub {
                name: "chan_in_home1_light_a".into(),
                type_definition: "AsyncBroadcast".into(),
            }],
        }
    }

    #[test]
    fn find_package_walks_segments() {
        let model = sample();
        let pack = model.find_package("org.activehome").expect("package");
        assert_eq!(pack.name, "activehome");
        assert!(model.find_package("org.missing").is_none());
        assert!(model.find_package("").is_none());
    }

    #[test]
    fn find_type_definition_ignores_version() {
        let model = sample();
        let td = model
            .find_type_definition("org.activehome.Light/2.0")
            .expect("type");
        assert_eq!(td.name, "Light");
        assert!(model.find_type_definition("Light").is_none());
    }

    #[test]
    fn unknown_node_lists_no_components() {
        let model = sample();
        assert!(model.list_components("nowhere").is_empty());
        assert_eq!(model.list_components("home1").len(), 1);
    }

    #[test]
    fn find_component_and_hub() {
        let model = sample();
        assert!(model.find_component("home1", "light_a").is_some());
        assert!(model.find_component("home1", "light_b").is_none());
        assert!(model.find_hub("chan_in_home1_light_a").is_some());
    }
}
