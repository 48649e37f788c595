//! The linker engine.
//!
//! Every inbound request follows the same pipeline: take a fresh snapshot
//! of the current model, synthesize a script against it, log the script,
//! submit it once, and map the apply engine's verdict to an outcome.

use std::sync::Arc;

use hublink_common::config::LinkerConfig;
use hublink_common::error::{HublinkError, Result};
use hublink_common::types::{RequestId, RequesterInfo};
use hublink_model::snapshot::{DeepCloner, ModelCloner, ModelSnapshot};
use hublink_model::view::ModelView;
use hublink_script::component::ComponentProperties;
use hublink_script::parser::validator;
use hublink_script::resolver::resolve_requirements;
use hublink_script::script::Script;
use hublink_script::synth::Synthesizer;
use tokio::sync::broadcast;

use crate::events::{AdaptationEvent, EventBus, EventKind, Operation};
use crate::queue::ApplyQueue;
use crate::service::{self, ModelService};

/// Result of a request that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Id under which the request's events were published.
    pub request: RequestId,
    /// Whether a script was submitted and applied.
    pub submitted: bool,
}

impl Outcome {
    const fn applied(request: RequestId) -> Self {
        Self {
            request,
            submitted: true,
        }
    }

    const fn skipped(request: RequestId) -> Self {
        Self {
            request,
            submitted: false,
        }
    }
}

/// Turns lifecycle requests into scripts for the local node.
///
/// Collaborators are injected; the engine holds no model state of its own.
pub struct Linker {
    config: LinkerConfig,
    service: Arc<dyn ModelService>,
    cloner: Arc<dyn ModelCloner>,
    queue: ApplyQueue,
    events: EventBus,
}

impl std::fmt::Debug for Linker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Linker")
            .field("config", &self.config)
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}

impl Linker {
    /// Creates a linker that snapshots with a deep copy.
    #[must_use]
    pub fn new(config: LinkerConfig, service: Arc<dyn ModelService>) -> Self {
        Self::with_cloner(config, service, Arc::new(DeepCloner))
    }

    /// Creates a linker with a custom snapshot strategy.
    #[must_use]
    pub fn with_cloner(
        config: LinkerConfig,
        service: Arc<dyn ModelService>,
        cloner: Arc<dyn ModelCloner>,
    ) -> Self {
        Self {
            config,
            service,
            cloner,
            queue: ApplyQueue::new(),
            events: EventBus::default(),
        }
    }

    /// Configuration of this linker.
    #[must_use]
    pub const fn config(&self) -> &LinkerConfig {
        &self.config
    }

    /// Opens a listener for the events of every later request.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AdaptationEvent> {
        self.events.subscribe()
    }

    /// Takes an independent copy of the current model.
    #[must_use]
    pub fn snapshot(&self) -> ModelSnapshot {
        let snapshot = self.cloner.clone_model(&self.service.current_model());
        tracing::debug!(version = %snapshot.version(), "model snapshot taken");
        snapshot
    }

    /// Builds the script a start request would submit, without submitting.
    ///
    /// Returns `None` when the id is already running on the local node.
    ///
    /// # Errors
    ///
    /// Returns [`HublinkError::NotFound`] if the id or type is missing, and
    /// [`HublinkError::InvalidBinding`] if a binding is malformed.
    pub fn plan_start(&self, props: &ComponentProperties) -> Result<Option<Script>> {
        props.validate()?;
        let snapshot = self.snapshot();
        if snapshot
            .find_component(&self.config.node_name, &props.id)
            .is_some()
        {
            return Ok(None);
        }
        let resolved = resolve_requirements(props, &snapshot);
        Synthesizer::new(&snapshot, &self.config)
            .start_script(&resolved.properties)
            .map(Some)
    }

    /// Starts a component on the local node.
    ///
    /// Succeeds without submitting when the id is already running. When
    /// the component type is not yet known to the model, the bindings its
    /// defaults declare are submitted in a second script once the add has
    /// been applied.
    ///
    /// # Errors
    ///
    /// - [`HublinkError::NotFound`] if the id or type is missing.
    /// - [`HublinkError::InvalidBinding`] if a binding is malformed.
    /// - [`HublinkError::ModelUpdateFailed`] if the start script or the
    ///   deferred binding script is rejected.
    /// - [`HublinkError::ApplyAbandoned`] if no outcome is reported.
    pub async fn start_component(
        &self,
        props: &ComponentProperties,
        requester: &RequesterInfo,
    ) -> Result<Outcome> {
        let request = RequestId::generate();
        tracing::info!(
            %request,
            id = %props.id,
            component_type = %props.component_type,
            requester = %requester.name,
            household = ?requester.household,
            "start requested"
        );
        props.validate()?;

        let _permit = self.queue.acquire(&props.id).await;
        let snapshot = self.snapshot();
        if snapshot
            .find_component(&self.config.node_name, &props.id)
            .is_some()
        {
            tracing::info!(%request, id = %props.id, "component already running, nothing to do");
            self.publish(
                request,
                Operation::Start,
                Some(&props.id),
                EventKind::Skipped {
                    reason: "already running".into(),
                },
            );
            return Ok(Outcome::skipped(request));
        }

        let resolved = resolve_requirements(props, &snapshot);
        let script = Synthesizer::new(&snapshot, &self.config).start_script(&resolved.properties)?;
        drop(snapshot);

        let path = props.path(&self.config.node_name);
        if !self
            .submit(request, Operation::Start, Some(&props.id), script.to_text(), script.len())
            .await?
        {
            return Err(HublinkError::ModelUpdateFailed {
                message: format!("start of {path} was rejected"),
            });
        }

        if !resolved.type_resolved {
            self.deferred_bindings(request, props).await?;
        }
        Ok(Outcome::applied(request))
    }

    /// Applies the bindings declared by type defaults that were unknown
    /// when the start script was built.
    ///
    /// A type that is still unknown, or defaults that no longer parse, are
    /// logged and leave the started component unbound.
    async fn deferred_bindings(
        &self,
        request: RequestId,
        props: &ComponentProperties,
    ) -> Result<()> {
        let script = {
            let snapshot = self.snapshot();
            let resolved = resolve_requirements(props, &snapshot);
            if !resolved.type_resolved {
                tracing::error!(
                    %request,
                    id = %props.id,
                    component_type = %props.component_type,
                    "type definition still unknown after start, default bindings not applied"
                );
                return Ok(());
            }
            let keys = resolved
                .defaulted
                .iter()
                .map(String::as_str)
                .filter(|key| key.starts_with(&self.config.binding_prefix));
            match Synthesizer::new(&snapshot, &self.config)
                .binding_script(&resolved.properties, keys)
            {
                Ok(script) => script,
                Err(e) => {
                    tracing::error!(%request, id = %props.id, error = %e, "default bindings not applied");
                    return Ok(());
                }
            }
        };
        if script.is_empty() {
            tracing::debug!(%request, id = %props.id, "no default bindings");
            return Ok(());
        }

        if self
            .submit(
                request,
                Operation::DeferredBinding,
                Some(&props.id),
                script.to_text(),
                script.len(),
            )
            .await?
        {
            Ok(())
        } else {
            Err(HublinkError::ModelUpdateFailed {
                message: format!(
                    "binding update for {} was rejected",
                    props.path(&self.config.node_name)
                ),
            })
        }
    }

    /// Removes every instance of the given types running on the local node.
    ///
    /// Succeeds without submitting when nothing matches.
    ///
    /// # Errors
    ///
    /// - [`HublinkError::StopError`] if the removal script is rejected.
    /// - [`HublinkError::ApplyAbandoned`] if no outcome is reported.
    pub async fn stop_component_by_type<S: AsRef<str> + Sync>(
        &self,
        type_names: &[S],
    ) -> Result<Outcome> {
        let request = RequestId::generate();
        let names: Vec<&str> = type_names.iter().map(AsRef::as_ref).collect();
        tracing::info!(%request, types = ?names, "stop by type requested");

        let script = {
            let snapshot = self.snapshot();
            Synthesizer::new(&snapshot, &self.config).stop_by_type_script(&names)
        };
        if script.is_empty() {
            tracing::info!(%request, types = ?names, "no running instance, nothing to stop");
            self.publish(
                request,
                Operation::StopByType,
                None,
                EventKind::Skipped {
                    reason: "nothing running".into(),
                },
            );
            return Ok(Outcome::skipped(request));
        }

        if self
            .submit(request, Operation::StopByType, None, script.to_text(), script.len())
            .await?
        {
            Ok(Outcome::applied(request))
        } else {
            Err(HublinkError::StopError {
                message: format!("removal of {} instance(s) of {names:?} was rejected", script.len()),
            })
        }
    }

    /// Assigns one attribute of a component on the local node.
    ///
    /// # Errors
    ///
    /// - [`HublinkError::NotFound`] if the id or attribute name is empty.
    /// - [`HublinkError::ModelUpdateFailed`] if the update is rejected.
    /// - [`HublinkError::ApplyAbandoned`] if no outcome is reported.
    pub async fn update_component_attribute(
        &self,
        id: &str,
        attribute: &str,
        value: &str,
    ) -> Result<Outcome> {
        let request = RequestId::generate();
        tracing::info!(%request, id, attribute, "attribute update requested");
        let script = {
            let snapshot = self.snapshot();
            Synthesizer::new(&snapshot, &self.config).set_attribute_script(id, attribute, value)?
        };

        let _permit = self.queue.acquire(id).await;
        if self
            .submit(request, Operation::Update, Some(id), script.to_text(), script.len())
            .await?
        {
            Ok(Outcome::applied(request))
        } else {
            Err(HublinkError::ModelUpdateFailed {
                message: format!("update of {id}.{attribute} was rejected"),
            })
        }
    }

    /// Removes one component from the local node.
    ///
    /// # Errors
    ///
    /// - [`HublinkError::NotFound`] if the id is empty.
    /// - [`HublinkError::StopError`] if the removal is rejected.
    /// - [`HublinkError::ApplyAbandoned`] if no outcome is reported.
    pub async fn stop(&self, id: &str) -> Result<Outcome> {
        let request = RequestId::generate();
        tracing::info!(%request, id, "stop requested");
        let script = {
            let snapshot = self.snapshot();
            let synth = Synthesizer::new(&snapshot, &self.config);
            if snapshot.find_component(synth.node(), id).is_none() {
                tracing::warn!(%request, id, "component not in current model, submitting removal anyway");
            }
            synth.remove_script(id)?
        };

        let _permit = self.queue.acquire(id).await;
        if self
            .submit(request, Operation::Stop, Some(id), script.to_text(), script.len())
            .await?
        {
            Ok(Outcome::applied(request))
        } else {
            Err(HublinkError::StopError {
                message: format!("removal of {}.{id} was rejected", self.config.node_name),
            })
        }
    }

    /// Submits a caller-written script verbatim.
    ///
    /// The text is parsed and order-checked first; problems are logged but
    /// do not prevent submission. Blank text succeeds without submitting.
    ///
    /// # Errors
    ///
    /// - [`HublinkError::ModelUpdateFailed`] if the script is rejected.
    /// - [`HublinkError::ApplyAbandoned`] if no outcome is reported.
    pub async fn push_script(&self, text: &str) -> Result<Outcome> {
        let request = RequestId::generate();
        let lines = text.lines().filter(|l| !l.trim().is_empty()).count();
        if lines == 0 {
            tracing::info!(%request, "empty script pushed, nothing to do");
            self.publish(
                request,
                Operation::Push,
                None,
                EventKind::Skipped {
                    reason: "empty script".into(),
                },
            );
            return Ok(Outcome::skipped(request));
        }

        match Script::parse(text) {
            Ok(script) => {
                let snapshot = self.snapshot();
                if let Err(e) = validator::validate(&script, &snapshot) {
                    tracing::warn!(%request, error = %e, "pushed script may not apply");
                }
            }
            Err(e) => tracing::warn!(%request, error = %e, "pushed script does not parse"),
        }

        if self
            .submit(request, Operation::Push, None, text.to_string(), lines)
            .await?
        {
            Ok(Outcome::applied(request))
        } else {
            Err(HublinkError::ModelUpdateFailed {
                message: "pushed script was rejected".into(),
            })
        }
    }

    async fn submit(
        &self,
        request: RequestId,
        operation: Operation,
        component: Option<&str>,
        text: String,
        lines: usize,
    ) -> Result<bool> {
        tracing::info!(%request, %operation, lines, script = %text, "submitting script");
        self.publish(request, operation, component, EventKind::Submitted { lines });

        match service::submit(self.service.as_ref(), text, operation.as_str()).await {
            Ok(true) => {
                tracing::info!(%request, %operation, "script applied");
                self.publish(request, operation, component, EventKind::Applied);
                Ok(true)
            }
            Ok(false) => {
                tracing::error!(%request, %operation, "script rejected by apply engine");
                self.publish(request, operation, component, EventKind::Rejected);
                Ok(false)
            }
            Err(e) => {
                tracing::error!(%request, %operation, error = %e, "script outcome lost");
                self.publish(request, operation, component, EventKind::Abandoned);
                Err(e)
            }
        }
    }

    fn publish(
        &self,
        request: RequestId,
        operation: Operation,
        component: Option<&str>,
        kind: EventKind,
    ) {
        self.events
            .publish(AdaptationEvent::now(request, operation, component, kind));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use hublink_model::model::{ComponentInstance, ModelRoot, Node};
    use hublink_model::snapshot::VersionedModel;

    use super::*;
    use crate::service::ApplyCallback;

    struct Recorder {
        model: VersionedModel,
        accept: bool,
        scripts: Mutex<Vec<String>>,
    }

    impl ModelService for Recorder {
        fn current_model(&self) -> VersionedModel {
            self.model.clone()
        }

        fn submit_script(&self, script: String, on_complete: ApplyCallback) {
            self.scripts.lock().unwrap().push(script);
            on_complete(self.accept);
        }
    }

    fn linker(accept: bool) -> (Linker, Arc<Recorder>) {
        let model = ModelRoot {
            nodes: vec![Node {
                name: "home1".into(),
                components: vec![ComponentInstance {
                    name: "light_a".into(),
                    type_definition: "org.activehome.Light".into(),
                }],
            }],
            ..ModelRoot::default()
        };
        let recorder = Arc::new(Recorder {
            model: VersionedModel::new(model),
            accept,
            scripts: Mutex::new(Vec::new()),
        });
        let linker = Linker::new(LinkerConfig::for_node("home1"), recorder.clone());
        (linker, recorder)
    }

    #[test]
    fn plan_start_skips_running_id() {
        let (linker, _) = linker(true);
        let props = ComponentProperties::new("org.activehome.Light", "light_a");
        assert!(linker.plan_start(&props).unwrap().is_none());
    }

    #[tokio::test]
    async fn update_rejection_is_model_update_failed() {
        let (linker, recorder) = linker(false);
        let err = linker
            .update_component_attribute("light_a", "level", "3")
            .await
            .unwrap_err();
        assert!(matches!(err, HublinkError::ModelUpdateFailed { .. }));
        assert_eq!(
            recorder.scripts.lock().unwrap().as_slice(),
            ["set home1.light_a.level = \"3\"\n"]
        );
    }

    #[tokio::test]
    async fn stop_rejection_is_stop_error() {
        let (linker, _) = linker(false);
        let err = linker.stop("light_a").await.unwrap_err();
        assert!(matches!(err, HublinkError::StopError { .. }));
    }

    #[tokio::test]
    async fn blank_push_is_skipped() {
        let (linker, recorder) = linker(true);
        let outcome = linker.push_script("\n  \n").await.unwrap();
        assert!(!outcome.submitted);
        assert!(recorder.scripts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_push_is_still_submitted() {
        let (linker, recorder) = linker(true);
        let outcome = linker.push_script("frobnicate everything\n").await.unwrap();
        assert!(outcome.submitted);
        assert_eq!(
            recorder.scripts.lock().unwrap().as_slice(),
            ["frobnicate everything\n"]
        );
    }
}
