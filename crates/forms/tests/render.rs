use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Value, json};

use wfe_forms::components::{DisplayVariable, GroupMembers, InputVariable};
use wfe_forms::provider::{InMemoryVariableProvider, NullVariableProvider, ProcessRecord, ProcessStore};
use wfe_forms::script::EmbeddedScripts;
use wfe_forms::{
    ComponentRegistry, FormComponent, FormComponentRuntime, FormError, FormSession, RenderContext, RenderScope, RequestState, arguments,
    arguments_from_json, error_fragment, render_component,
};
use wfe_types::User;

fn store() -> Arc<ProcessStore> {
    Arc::new(ProcessStore::new(vec![
        ProcessRecord::new(1, "Purchase")
            .with_variable("amount", json!(17))
            .with_variable("supplierProcess", json!(2))
            .with_variable("groups", json!([{"id": 10, "name": "Managers"}, {"id": 11, "name": "<Staff>"}]))
            .with_variable("manager", json!("jdoe"))
            .with_variable("jsonUrlUser", json!("asmith"))
            .with_variable("comment", Value::Null),
        ProcessRecord::new(2, "Supplier").with_variable("amount", json!(99)),
    ]))
}

fn context() -> RenderContext {
    let provider = InMemoryVariableProvider::new(store(), 1).expect("process 1");
    RenderContext::new(User::new(1, "admin"), Arc::new(provider))
}

fn request() -> RequestState {
    RequestState::new(Arc::new(EmbeddedScripts), FormSession::new())
}

/// Echoes every parameter it can see as a comma-separated list.
#[derive(Debug)]
struct EchoParameters;

impl FormComponent for EchoParameters {
    fn name(&self) -> &str {
        "EchoParameters"
    }

    fn render_request(&self, scope: &mut RenderScope<'_>) -> Result<String, FormError> {
        let mut seen = Vec::new();
        for index in 0..scope.argument_count() {
            seen.push(scope.string_param(index)?.unwrap_or_default());
        }
        let amount: i64 = scope.variable_value_or(0, -1)?;
        Ok(format!("{}|{amount}", seen.join(",")))
    }
}

#[derive(Debug)]
struct Failing;

impl FormComponent for Failing {
    fn name(&self) -> &str {
        "Failing"
    }

    fn render_request(&self, _scope: &mut RenderScope<'_>) -> Result<String, FormError> {
        Err(FormError::Render("component exploded".into()))
    }
}

/// Wraps a child rendered through the chained path.
#[derive(Debug)]
struct Panel<C>(C);

impl<C: FormComponent> FormComponent for Panel<C> {
    fn name(&self) -> &str {
        "Panel"
    }

    fn render_request(&self, scope: &mut RenderScope<'_>) -> Result<String, FormError> {
        let inner = scope.render_chained(&self.0)?;
        Ok(format!("<div class=\"panel\">{inner}</div>"))
    }
}

/// Exports the embedded GroupMembers script with global scope.
#[derive(Debug)]
struct GlobalScript;

impl FormComponent for GlobalScript {
    fn name(&self) -> &str {
        "GlobalScript"
    }

    fn render_request(&self, scope: &mut RenderScope<'_>) -> Result<String, FormError> {
        Ok(scope.export_named_script(&IndexMap::new(), true, "GroupMembers"))
    }
}

#[test]
fn successful_render_returns_component_output_unchanged() {
    let html = render_component(DisplayVariable, context(), arguments!["amount"], None);
    assert_eq!(html, "<span class=\"displayVariable\">17</span>");
}

#[test]
fn target_process_argument_is_consumed_before_parameters_are_read() {
    let context = context().with_target_process(true);
    let html = FormComponentRuntime::init(EchoParameters, context).render(arguments!["supplierProcess", "amount", "other"], None);
    assert_eq!(html, "amount,other|99");
}

#[test]
fn target_process_without_selector_variable_renders_error_fragment() {
    let context = context().with_target_process(true);
    let html = FormComponentRuntime::init(EchoParameters, context).render(arguments!["comment", "amount"], None);
    assert_eq!(html, error_fragment("Variable comment is not defined or has no value"));
}

#[test]
fn target_process_pointing_at_unknown_process_renders_error_fragment() {
    let context = context().with_target_process(true);
    let html = FormComponentRuntime::init(EchoParameters, context).render(arguments!["amount"], None);
    assert_eq!(html, error_fragment("Process 17 not found"));
}

#[test]
fn any_failure_becomes_the_error_fragment() {
    let html = render_component(Failing, context(), arguments![], None);
    assert_eq!(
        html,
        "<div style=\"background-color: #ffb0b0; border: 1px solid red; padding: 3px;\">component exploded</div>"
    );

    let missing = render_component(DisplayVariable, context(), arguments!["nope"], None);
    assert_eq!(
        missing,
        "<div style=\"background-color: #ffb0b0; border: 1px solid red; padding: 3px;\">Variable nope is not defined or has no value</div>"
    );

    let unconvertible = render_component(EchoParameters, context(), arguments!["manager"], None);
    assert_eq!(unconvertible, error_fragment("Unable to convert \"jdoe\" to integer"));
}

#[test]
fn rendering_without_process_context_still_degrades_to_fragment() {
    let context = RenderContext::new(User::new(2, "guest"), Arc::new(NullVariableProvider)).with_target_process(true);
    let html = render_component(DisplayVariable, context, arguments![], None);
    assert_eq!(html, error_fragment("Variable argument #0 is not defined or has no value"));
}

#[test]
fn chained_child_shares_parent_scope_and_target_process() {
    let context = context().with_target_process(true);
    let html = FormComponentRuntime::init(Panel(EchoParameters), context).render(arguments!["supplierProcess", "amount"], None);
    assert_eq!(html, "<div class=\"panel\">amount|99</div>");
}

#[test]
fn chained_child_failure_reaches_parent_boundary() {
    let html = render_component(Panel(Failing), context(), arguments![], None);
    assert_eq!(html, error_fragment("component exploded"));
}

#[test]
fn display_variable_uses_rich_combo_label() {
    let literal = render_component(DisplayVariable, context(), arguments!["amount", "value@Total"], None);
    assert_eq!(literal, "<span class=\"displayVariable\"><label>Total</label> 17</span>");

    let from_variable = render_component(DisplayVariable, context(), arguments!["amount", "manager"], None);
    assert_eq!(from_variable, "<span class=\"displayVariable\"><label>jdoe</label> 17</span>");
}

#[test]
fn input_variable_registers_post_processor_in_session() {
    let mut request = request();
    let html = render_component(InputVariable, context(), arguments!["manager"], Some(&mut request));
    assert_eq!(html, "<input type=\"text\" name=\"manager\" value=\"jdoe\" />");

    let session = request.into_session();
    let submitted = json!({"manager": "  alice  "});
    let variables = session.process_submission(submitted.as_object().unwrap()).unwrap();
    assert_eq!(variables.get("manager"), Some(&json!("alice")));
}

#[test]
fn input_variable_without_request_still_renders() {
    let html = render_component(InputVariable, context(), arguments!["comment"], None);
    assert_eq!(html, "<input type=\"text\" name=\"comment\" value=\"\" />");
}

#[test]
fn group_members_renders_selectors_and_inlines_script() {
    let mut request = request();
    let html = render_component(GroupMembers, context(), arguments!["groups", "manager"], Some(&mut request));
    assert!(html.starts_with("<select id=\"groupSelector_manager\"><option value=\"\"></option><option value=\"10\">Managers</option>"));
    assert!(html.contains("<option value=\"11\">&lt;Staff&gt;</option>"));
    assert!(html.contains("<option value=\"jdoe\" selected=\"true\">jdoe</option>"));
    assert!(html.contains("$(\"#userSelector_manager\")"));
    assert!(html.contains("\"/form.do\""));
    assert!(!html.contains("GROUP_SELECTOR"));
}

#[test]
fn group_members_selectors_survive_placeholder_like_names() {
    let mut request = request();
    let html = render_component(GroupMembers, context(), arguments!["groups", "jsonUrlUser"], Some(&mut request));
    assert!(html.contains("<select id=\"groupSelector_jsonUrlUser\">"));
    assert!(html.contains("$(\"#groupSelector_jsonUrlUser\")"));
    assert!(html.contains("$(\"#userSelector_jsonUrlUser\")"));
    assert!(!html.contains("/form.doUser"));
}

#[test]
fn global_script_is_emitted_once_per_page() {
    let mut request = request();
    let first = render_component(GlobalScript, context(), arguments![], Some(&mut request));
    let second = render_component(GlobalScript, context(), arguments![], Some(&mut request));
    assert!(first.starts_with("<script type=\"text/javascript\">"));
    assert_eq!(second, "");
}

#[test]
fn registry_components_render_with_target_process_flag() {
    let registry = ComponentRegistry::builtin();
    let resolved = registry.resolve("TargetProcessDisplayVariable").expect("registered");
    let context = context().with_target_process(resolved.target_process);
    let html = render_component(resolved.component, context, arguments_from_json(vec![json!("supplierProcess"), json!("amount")]), None);
    assert_eq!(html, "<span class=\"displayVariable\">99</span>");
}
