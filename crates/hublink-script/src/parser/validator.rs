//! Static validation of a script against a model snapshot.
//!
//! Checks that the script can be applied in the order it is written
//! before it is handed to the apply engine.

use hublink_common::error::{HublinkError, Result};
use hublink_model::view::ModelView;

use crate::graph::{Dependency, ScriptGraph};
use crate::script::Script;

/// Validates the dependency order of a script.
///
/// # Checks performed
///
/// 1. Nothing is created twice.
/// 2. Nothing the script creates already exists in the model.
/// 3. Every set, bind, or remove comes after the creation of its target.
/// 4. Targets the script does not create exist in the model.
///
/// # Errors
///
/// Returns an error naming the first offending line.
pub fn validate<V: ModelView + ?Sized>(script: &Script, view: &V) -> Result<()> {
    tracing::debug!(ops = script.len(), "validating script order");
    let graph = ScriptGraph::from_script(script);
    check_duplicates(&graph)?;
    check_already_present(&graph, view)?;
    check_order(&graph)?;
    check_external(&graph, view)?;
    Ok(())
}

fn exists<V: ModelView + ?Sized>(dep: &Dependency, view: &V) -> bool {
    match dep {
        Dependency::Component(path) => view.find_component(&path.node, &path.id).is_some(),
        Dependency::Channel(id) => view.find_hub(id.as_str()).is_some(),
    }
}

fn check_duplicates(graph: &ScriptGraph) -> Result<()> {
    match graph.duplicates().first() {
        Some((idx, dep)) => Err(HublinkError::InvalidScript {
            line: idx + 1,
            message: format!("{dep} is added more than once"),
        }),
        None => Ok(()),
    }
}

fn check_already_present<V: ModelView + ?Sized>(graph: &ScriptGraph, view: &V) -> Result<()> {
    for (idx, dep) in graph.created() {
        if exists(dep, view) {
            return Err(HublinkError::InvalidScript {
                line: idx + 1,
                message: format!("{dep} already exists in the model"),
            });
        }
    }
    Ok(())
}

fn check_order(graph: &ScriptGraph) -> Result<()> {
    let mut misordered = graph.misordered();
    misordered.sort_by_key(|(_, user, _)| *user);
    match misordered.first() {
        Some((creator, user, dep)) => Err(HublinkError::InvalidScript {
            line: user + 1,
            message: format!("{dep} is used before it is added on line {}", creator + 1),
        }),
        None => Ok(()),
    }
}

fn check_external<V: ModelView + ?Sized>(graph: &ScriptGraph, view: &V) -> Result<()> {
    for (idx, dep) in graph.external() {
        if !exists(dep, view) {
            return Err(HublinkError::InvalidScript {
                line: idx + 1,
                message: format!("{dep} is neither in the model nor added by the script"),
            });
        }
    }
    Ok(())
}
