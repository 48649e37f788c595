//! Running-component queries.

use hublink_common::types::ComponentPath;

use crate::typeref::TypeRef;
use crate::view::ModelView;

/// Returns the components of the given type running on any of `nodes`.
///
/// Types match on their simple name; package qualifiers and versions on
/// either side are ignored. Results follow node order, then the order in
/// which each node lists its components. Nodes absent from the model are
/// skipped.
pub fn find_running<V, S>(view: &V, type_name: &str, nodes: &[S]) -> Vec<ComponentPath>
where
    V: ModelView + ?Sized,
    S: AsRef<str>,
{
    let wanted = TypeRef::parse(type_name);
    let mut running = Vec::new();
    for node in nodes {
        let node = node.as_ref();
        if view.find_node(node).is_none() {
            tracing::debug!(node, "node not in model, skipped");
            continue;
        }
        running.extend(
            view.list_components(node)
                .iter()
                .filter(|c| TypeRef::parse(&c.type_definition).same_simple_name(&wanted))
                .map(|c| ComponentPath::new(node, c.name.clone())),
        );
    }
    running
}
