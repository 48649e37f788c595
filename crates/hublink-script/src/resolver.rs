//! Type requirement resolution.
//!
//! Locates the type definition of a requested component in the model's
//! package tree and fills in the attribute defaults it declares.

use hublink_model::view::ModelView;

use crate::component::ComponentProperties;

/// A start request enriched with its type's requirements.
#[derive(Debug, Clone)]
pub struct ResolvedComponent {
    /// Caller properties plus declared defaults.
    pub properties: ComponentProperties,
    /// Whether a type definition was found.
    pub type_resolved: bool,
    /// Attribute keys whose value came from a declared default, in
    /// declaration order.
    pub defaulted: Vec<String>,
}

/// Merges the caller's properties with the defaults declared by their type.
///
/// The type is looked up by walking its package path. Caller-supplied
/// attributes are never overwritten. Declared attributes without a default
/// value are left out. When the type cannot be found the caller's
/// properties are returned unchanged and a warning is logged.
pub fn resolve_requirements<V: ModelView + ?Sized>(
    initial: &ComponentProperties,
    view: &V,
) -> ResolvedComponent {
    let mut properties = initial.clone();
    let Some(type_def) = view.find_type_definition(&initial.component_type) else {
        tracing::warn!(
            component_type = %initial.component_type,
            id = %initial.id,
            "type definition not found, using requested attributes only"
        );
        return ResolvedComponent {
            properties,
            type_resolved: false,
            defaulted: Vec::new(),
        };
    };

    let mut defaulted = Vec::new();
    for attribute in &type_def.dictionary {
        if attribute.name.is_empty() || properties.attributes.contains_key(&attribute.name) {
            continue;
        }
        if let Some(default) = &attribute.default_value {
            let _ = properties
                .attributes
                .insert(attribute.name.clone(), default.clone());
            defaulted.push(attribute.name.clone());
        }
    }
    tracing::debug!(
        component_type = %initial.component_type,
        defaults = defaulted.len(),
        "type requirements resolved"
    );

    ResolvedComponent {
        properties,
        type_resolved: true,
        defaulted,
    }
}
