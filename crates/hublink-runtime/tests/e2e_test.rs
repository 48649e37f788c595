//! End-to-end tests for the linker engine.
//!
//! These tests run the full request pipeline against an in-memory apply
//! engine that parses each submitted script and applies it to its model:
//! 1. Start requests (bindings, defaults, idempotence, deferred bindings)
//! 2. Stop requests (by type and by id)
//! 3. Attribute updates and pushed scripts
//! 4. Apply outcomes (rejection, abandonment) and events
//! 5. Concurrent starts of the same id

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use hublink_common::config::LinkerConfig;
use hublink_common::error::{ErrorKind, HublinkError};
use hublink_common::types::RequesterInfo;
use hublink_model::model::{
    ComponentInstance, DictionaryAttribute, Hub, ModelRoot, Node, Package, TypeDefinition,
};
use hublink_model::snapshot::VersionedModel;
use hublink_model::view::ModelView;
use hublink_runtime::engine::Linker;
use hublink_runtime::events::{EventKind, Operation};
use hublink_runtime::service::{ApplyCallback, ModelService};
use hublink_script::component::ComponentProperties;
use hublink_script::script::{Script, ScriptOp};

// ── In-memory apply engine ───────────────────────────────────────────

#[derive(Clone, Copy)]
enum Verdict {
    Accept,
    Reject,
    Drop,
}

struct Applier {
    model: RwLock<VersionedModel>,
    verdict: Mutex<Verdict>,
    /// Verdict taking over after the next submission.
    next_verdict: Mutex<Option<Verdict>>,
    scripts: Mutex<Vec<String>>,
    /// Package published together with the first applied script.
    arriving: Mutex<Option<Package>>,
    delay: Duration,
}

impl Applier {
    fn new(model: ModelRoot) -> Arc<Self> {
        Arc::new(Self {
            model: RwLock::new(VersionedModel::new(model)),
            verdict: Mutex::new(Verdict::Accept),
            next_verdict: Mutex::new(None),
            scripts: Mutex::new(Vec::new()),
            arriving: Mutex::new(None),
            delay: Duration::ZERO,
        })
    }

    fn slow(model: ModelRoot, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            model: RwLock::new(VersionedModel::new(model)),
            verdict: Mutex::new(Verdict::Accept),
            next_verdict: Mutex::new(None),
            scripts: Mutex::new(Vec::new()),
            arriving: Mutex::new(None),
            delay,
        })
    }

    fn set_verdict(&self, verdict: Verdict) {
        *self.verdict.lock().unwrap() = verdict;
    }

    fn then_verdict(&self, verdict: Verdict) {
        *self.next_verdict.lock().unwrap() = Some(verdict);
    }

    fn scripts(&self) -> Vec<String> {
        self.scripts.lock().unwrap().clone()
    }

    fn apply(&self, text: &str) {
        let script = Script::parse(text).expect("submitted script should parse");
        let mut guard = self.model.write().unwrap();
        let mut root = (*guard.model).clone();
        for op in &script {
            match op {
                ScriptOp::AddComponent { path, type_name } => {
                    if let Some(node) = root.nodes.iter_mut().find(|n| n.name == path.node) {
                        node.components.push(ComponentInstance {
                            name: path.id.clone(),
                            type_definition: type_name.clone(),
                        });
                    }
                }
                ScriptOp::AddChannel { channel, type_name } => root.hubs.push(Hub {
                    name: channel.to_string(),
                    type_definition: type_name.clone(),
                }),
                ScriptOp::Remove { path } => {
                    if let Some(node) = root.nodes.iter_mut().find(|n| n.name == path.node) {
                        node.components.retain(|c| c.name != path.id);
                    }
                }
                ScriptOp::SetAttribute { .. } | ScriptOp::Bind { .. } => {}
            }
        }
        if let Some(pack) = self.arriving.lock().unwrap().take() {
            root.packages.push(pack);
        }
        *guard = VersionedModel::new(root);
    }
}

impl ModelService for Applier {
    fn current_model(&self) -> VersionedModel {
        self.model.read().unwrap().clone()
    }

    fn submit_script(&self, script: String, on_complete: ApplyCallback) {
        self.scripts.lock().unwrap().push(script.clone());
        let verdict = {
            let mut current = self.verdict.lock().unwrap();
            let verdict = *current;
            if let Some(next) = self.next_verdict.lock().unwrap().take() {
                *current = next;
            }
            verdict
        };
        match verdict {
            Verdict::Accept => {
                self.apply(&script);
                if self.delay.is_zero() {
                    on_complete(true);
                } else {
                    let delay = self.delay;
                    let _ = std::thread::spawn(move || {
                        std::thread::sleep(delay);
                        on_complete(true);
                    });
                }
            }
            Verdict::Reject => on_complete(false),
            Verdict::Drop => drop(on_complete),
        }
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────

fn instance(name: &str, type_definition: &str) -> ComponentInstance {
    ComponentInstance {
        name: name.into(),
        type_definition: type_definition.into(),
    }
}

fn attr(name: &str, default: &str) -> DictionaryAttribute {
    DictionaryAttribute {
        name: name.into(),
        default_value: Some(default.into()),
    }
}

fn thermostat_package() -> Package {
    Package {
        name: "org".into(),
        packages: vec![Package {
            name: "activehome".into(),
            packages: Vec::new(),
            type_definitions: vec![TypeDefinition {
                name: "Thermostat".into(),
                version: Some("1.0".into()),
                dictionary: vec![
                    attr("target", "19"),
                    attr("bindingHeat", "heat>Heater.cmd"),
                ],
            }],
        }],
        type_definitions: Vec::new(),
    }
}

fn home(packages: Vec<Package>) -> ModelRoot {
    ModelRoot {
        nodes: vec![
            Node {
                name: "home1".into(),
                components: vec![
                    instance("light_a", "org.activehome.Light"),
                    instance("heater", "org.activehome.Heater/2.1"),
                ],
            },
            Node {
                name: "home2".into(),
                components: vec![instance("light_z", "org.activehome.Light")],
            },
        ],
        packages,
        hubs: Vec::new(),
    }
}

fn linker(service: &Arc<Applier>) -> Linker {
    Linker::new(LinkerConfig::for_node("home1"), service.clone())
}

fn requester() -> RequesterInfo {
    RequesterInfo {
        name: "tester".into(),
        household: Some("h42".into()),
    }
}

// ── Start ────────────────────────────────────────────────────────────

#[tokio::test]
async fn start_binds_to_running_instances_through_new_channel() {
    let service = Applier::new(home(Vec::new()));
    let linker = linker(&service);
    let mut props = ComponentProperties::new("org.activehome.Switch", "switch");
    let _ = props
        .attributes
        .insert("binding".into(), "out>node1.Light.in".into());

    let outcome = linker.start_component(&props, &requester()).await.unwrap();

    assert!(outcome.submitted);
    assert_eq!(
        service.scripts(),
        vec![
            "add home1.switch : org.activehome.Switch\n\
             add chan_in_home1_light_a : AsyncBroadcast\n\
             bind home1.light_a.in chan_in_home1_light_a\n\
             bind home1.switch.out chan_in_home1_light_a\n"
        ]
    );
}

#[tokio::test]
async fn start_reuses_channel_created_by_earlier_start() {
    let service = Applier::new(home(Vec::new()));
    let linker = linker(&service);
    let mut first = ComponentProperties::new("org.activehome.Switch", "switch1");
    let _ = first
        .port_bindings
        .insert("out".into(), vec!["home1.light_a.in".into()]);
    let mut second = ComponentProperties::new("org.activehome.Switch", "switch2");
    let _ = second
        .port_bindings
        .insert("out".into(), vec!["home1.light_a.in".into()]);

    let _ = linker.start_component(&first, &requester()).await.unwrap();
    let _ = linker.start_component(&second, &requester()).await.unwrap();

    let scripts = service.scripts();
    assert!(scripts[0].contains("add chan_in_home1_light_a"));
    assert_eq!(
        scripts[1],
        "add home1.switch2 : org.activehome.Switch\n\
         bind home1.switch2.out chan_in_home1_light_a\n"
    );
}

#[tokio::test]
async fn start_of_running_id_submits_nothing() {
    let service = Applier::new(home(Vec::new()));
    let linker = linker(&service);
    let mut events = linker.subscribe();

    let outcome = linker
        .start_component(
            &ComponentProperties::new("org.activehome.Light", "light_a"),
            &requester(),
        )
        .await
        .unwrap();

    assert!(!outcome.submitted);
    assert!(service.scripts().is_empty());
    let event = events.recv().await.unwrap();
    assert_eq!(event.operation, Operation::Start);
    assert!(matches!(event.kind, EventKind::Skipped { .. }));
}

#[tokio::test]
async fn start_fills_defaults_and_keeps_caller_values() {
    let service = Applier::new(home(vec![thermostat_package()]));
    let linker = linker(&service);
    let mut props = ComponentProperties::new("org.activehome.Thermostat/1.0", "thermo");
    let _ = props.attributes.insert("target".into(), "21".into());

    let _ = linker.start_component(&props, &requester()).await.unwrap();

    assert_eq!(
        service.scripts(),
        vec![
            "add home1.thermo : org.activehome.Thermostat/1.0\n\
             set home1.thermo.target = \"21\"\n\
             add chan_cmd_home1_heater : AsyncBroadcast\n\
             bind home1.heater.cmd chan_cmd_home1_heater\n\
             bind home1.thermo.heat chan_cmd_home1_heater\n"
        ]
    );
}

#[tokio::test]
async fn start_applies_default_bindings_once_type_arrives() {
    let service = Applier::new(home(Vec::new()));
    *service.arriving.lock().unwrap() = Some(thermostat_package());
    let linker = linker(&service);
    let mut events = linker.subscribe();

    let outcome = linker
        .start_component(
            &ComponentProperties::new("org.activehome.Thermostat", "thermo"),
            &requester(),
        )
        .await
        .unwrap();

    assert!(outcome.submitted);
    assert_eq!(
        service.scripts(),
        vec![
            "add home1.thermo : org.activehome.Thermostat\n".to_string(),
            "add chan_cmd_home1_heater : AsyncBroadcast\n\
             bind home1.heater.cmd chan_cmd_home1_heater\n\
             bind home1.thermo.heat chan_cmd_home1_heater\n"
                .to_string(),
        ]
    );

    let mut operations = Vec::new();
    while let Ok(event) = events.try_recv() {
        assert_eq!(event.request, outcome.request);
        operations.push(event.operation);
    }
    assert!(operations.contains(&Operation::DeferredBinding));
}

#[tokio::test]
async fn rejected_default_bindings_fail_the_start() {
    let service = Applier::new(home(Vec::new()));
    *service.arriving.lock().unwrap() = Some(thermostat_package());
    service.then_verdict(Verdict::Reject);
    let linker = linker(&service);

    let err = linker
        .start_component(
            &ComponentProperties::new("org.activehome.Thermostat", "thermo"),
            &requester(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ModelUpdateFailed);
    assert!(err.to_string().contains("home1.thermo"));
    assert_eq!(service.scripts().len(), 2);
    assert!(service.current_model().model.nodes[0].find_component("thermo").is_some());
}

#[tokio::test]
async fn abandoned_default_bindings_fail_the_start() {
    let service = Applier::new(home(Vec::new()));
    *service.arriving.lock().unwrap() = Some(thermostat_package());
    service.then_verdict(Verdict::Drop);
    let linker = linker(&service);

    let err = linker
        .start_component(
            &ComponentProperties::new("org.activehome.Thermostat", "thermo"),
            &requester(),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        HublinkError::ApplyAbandoned { operation: "deferred_binding" }
    ));
}

#[tokio::test]
async fn start_with_unknown_type_succeeds_with_caller_data_only() {
    let service = Applier::new(home(Vec::new()));
    let linker = linker(&service);
    let mut props = ComponentProperties::new("org.unknown.Widget", "widget");
    let _ = props.attributes.insert("color".into(), "blue".into());

    let outcome = linker.start_component(&props, &requester()).await.unwrap();

    assert!(outcome.submitted);
    assert_eq!(
        service.scripts(),
        vec!["add home1.widget : org.unknown.Widget\nset home1.widget.color = \"blue\"\n"]
    );
}

#[tokio::test]
async fn start_without_id_is_not_found() {
    let service = Applier::new(home(Vec::new()));
    let linker = linker(&service);
    let err = linker
        .start_component(
            &ComponentProperties::new("org.activehome.Switch", ""),
            &requester(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(service.scripts().is_empty());
}

#[tokio::test]
async fn start_with_malformed_binding_is_invalid_request() {
    let service = Applier::new(home(Vec::new()));
    let linker = linker(&service);
    let mut props = ComponentProperties::new("org.activehome.Switch", "switch");
    let _ = props.attributes.insert("binding".into(), "out=Light.in".into());
    let err = linker
        .start_component(&props, &requester())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    assert!(service.scripts().is_empty());
}

#[tokio::test]
async fn rejected_start_is_model_update_failed() {
    let service = Applier::new(home(Vec::new()));
    service.set_verdict(Verdict::Reject);
    let linker = linker(&service);
    let err = linker
        .start_component(
            &ComponentProperties::new("org.activehome.Switch", "switch"),
            &requester(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ModelUpdateFailed);
}

#[tokio::test]
async fn abandoned_start_reports_error() {
    let service = Applier::new(home(Vec::new()));
    service.set_verdict(Verdict::Drop);
    let linker = linker(&service);
    let mut events = linker.subscribe();
    let err = linker
        .start_component(
            &ComponentProperties::new("org.activehome.Switch", "switch"),
            &requester(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, HublinkError::ApplyAbandoned { operation: "start" }));

    let kinds: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
        .map(|e| e.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![EventKind::Submitted { lines: 1 }, EventKind::Abandoned]
    );
}

#[tokio::test]
async fn concurrent_starts_of_same_id_apply_once() {
    let service = Applier::slow(home(Vec::new()), Duration::from_millis(30));
    let linker = Arc::new(linker(&service));
    let props = ComponentProperties::new("org.activehome.Switch", "switch");

    let tasks: Vec<_> = (0..2)
        .map(|_| {
            let linker = Arc::clone(&linker);
            let props = props.clone();
            tokio::spawn(async move { linker.start_component(&props, &requester()).await })
        })
        .collect();

    let mut submitted = 0;
    for task in tasks {
        if task.await.unwrap().unwrap().submitted {
            submitted += 1;
        }
    }
    assert_eq!(submitted, 1);
    assert_eq!(service.scripts().len(), 1);
}

// ── Stop ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn stop_by_type_removes_local_instances_only() {
    let service = Applier::new(home(Vec::new()));
    let linker = linker(&service);

    let outcome = linker
        .stop_component_by_type(&["org.activehome.Light"])
        .await
        .unwrap();

    assert!(outcome.submitted);
    assert_eq!(service.scripts(), vec!["remove home1.light_a\n"]);
    let model = service.current_model();
    assert!(model.model.nodes[0].find_component("light_a").is_none());
    assert!(model.model.nodes[1].find_component("light_z").is_some());
}

#[tokio::test]
async fn stop_by_type_with_nothing_running_submits_nothing() {
    let service = Applier::new(home(Vec::new()));
    let linker = linker(&service);
    let outcome = linker.stop_component_by_type(&["Siren"]).await.unwrap();
    assert!(!outcome.submitted);
    assert!(service.scripts().is_empty());
}

#[tokio::test]
async fn rejected_stop_by_type_is_stop_error() {
    let service = Applier::new(home(Vec::new()));
    service.set_verdict(Verdict::Reject);
    let linker = linker(&service);
    let err = linker
        .stop_component_by_type(&["Light"])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StopError);
}

#[tokio::test]
async fn stop_by_id_uses_local_node() {
    let service = Applier::new(home(Vec::new()));
    let linker = linker(&service);
    let _ = linker.stop("heater").await.unwrap();
    assert_eq!(service.scripts(), vec!["remove home1.heater\n"]);
}

// ── Update and push ──────────────────────────────────────────────────

#[tokio::test]
async fn update_submits_one_set() {
    let service = Applier::new(home(Vec::new()));
    let linker = linker(&service);
    let _ = linker
        .update_component_attribute("light_a", "label", "hall \"main\"")
        .await
        .unwrap();
    assert_eq!(
        service.scripts(),
        vec!["set home1.light_a.label = \"hall \\\"main\\\"\"\n"]
    );
}

#[tokio::test]
async fn pushed_script_is_submitted_verbatim() {
    let service = Applier::new(home(Vec::new()));
    let linker = linker(&service);
    let text = "add chan_x : AsyncBroadcast\n\n// wire the light\nbind home1.light_a.in chan_x\n";
    let outcome = linker.push_script(text).await.unwrap();
    assert!(outcome.submitted);
    assert_eq!(service.scripts(), vec![text]);
    assert!(service.current_model().model.find_hub("chan_x").is_some());
}

#[tokio::test]
async fn rejected_push_is_model_update_failed() {
    let service = Applier::new(home(Vec::new()));
    service.set_verdict(Verdict::Reject);
    let linker = linker(&service);
    let err = linker.push_script("remove home1.light_a\n").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ModelUpdateFailed);
}
