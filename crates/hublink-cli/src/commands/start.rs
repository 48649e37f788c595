//! `hlk start`: Start a component on the node.

use clap::Args;
use hublink_common::types::RequesterInfo;
use hublink_script::component::ComponentProperties;
use hublink_sdk::builder::StartRequestBuilder;

use super::GlobalArgs;
use crate::output;

/// Component description shared by `start` and `plan`.
#[derive(Args, Debug, Clone)]
pub struct ComponentArgs {
    /// Component type, optionally qualified and versioned
    /// (`org.activehome.Light/1.0`).
    pub component_type: String,

    /// Instance id, unique on the node.
    pub id: String,

    /// Attribute value, repeatable.
    #[arg(short, long = "attr", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub attributes: Vec<(String, String)>,

    /// Binding specification such as `out>Light.in`, repeatable.
    #[arg(short, long = "binding", value_name = "SPEC")]
    pub bindings: Vec<String>,

    /// Explicit port destination, repeatable.
    #[arg(short, long = "port", value_name = "PORT=NODE.ID.PORT", value_parser = parse_key_value)]
    pub ports: Vec<(String, String)>,
}

impl ComponentArgs {
    /// Builds the start request.
    ///
    /// # Errors
    ///
    /// Returns an error if the id, type, or a binding is invalid.
    pub fn properties(&self, binding_prefix: &str) -> anyhow::Result<ComponentProperties> {
        let mut builder = StartRequestBuilder::new(&self.component_type, &self.id)
            .binding_prefix(binding_prefix);
        for (key, value) in &self.attributes {
            builder = builder.attribute(key, value);
        }
        for spec in &self.bindings {
            builder = builder.binding(spec);
        }
        for (port, destination) in &self.ports {
            builder = builder.bind(port, destination);
        }
        Ok(builder.build()?)
    }
}

/// Arguments for the `start` command.
#[derive(Args, Debug)]
pub struct StartArgs {
    /// The component to start.
    #[command(flatten)]
    pub component: ComponentArgs,

    /// Name recorded as the requester.
    #[arg(long, env = "USER", default_value = "hlk")]
    pub requester: String,

    /// Household the requester acts for.
    #[arg(long)]
    pub household: Option<String>,
}

/// Parses a `KEY=VALUE` argument. The value may contain `=`.
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, found \"{raw}\"")),
    }
}

/// Executes the `start` command.
///
/// # Errors
///
/// Returns an error if the request is invalid or the script is rejected.
pub async fn execute(args: StartArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let mut session = global.linker()?;
    let props = args
        .component
        .properties(&session.linker.config().binding_prefix)?;
    let requester = RequesterInfo {
        name: args.requester,
        household: args.household,
    };

    let result = session.linker.start_component(&props, &requester).await;
    session.print_events()?;
    let outcome = result?;
    let path = props.path(&session.linker.config().node_name);
    eprintln!("{}", output::describe_outcome("start", &path.to_string(), &outcome));
    if outcome.submitted {
        session.report_spool();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_key_value_splits_on_first_equals() {
        assert_eq!(
            parse_key_value("expr=a=b").unwrap(),
            ("expr".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_key_value("empty=").unwrap(),
            ("empty".to_string(), String::new())
        );
    }

    #[test]
    fn parse_key_value_rejects_missing_key() {
        assert!(parse_key_value("=x").is_err());
        assert!(parse_key_value("novalue").is_err());
    }

    #[test]
    fn component_args_build_properties() {
        let args = ComponentArgs {
            component_type: "org.activehome.Switch".into(),
            id: "switch".into(),
            attributes: vec![("label".into(), "hall".into())],
            bindings: vec!["out>Light.in".into()],
            ports: vec![("alarm".into(), "home1.siren.trigger".into())],
        };
        let props = args.properties("binding").unwrap();
        assert_eq!(props.attributes.len(), 2);
        assert_eq!(props.port_bindings["alarm"], vec!["home1.siren.trigger"]);
    }
}
