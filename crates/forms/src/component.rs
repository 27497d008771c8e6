//! # Form component runtime
//!
//! A form component is a template helper that renders a piece of a process
//! form. The runtime around it:
//!
//! - resolves positional template arguments into typed values,
//! - optionally redirects variable lookups to another running process (the
//!   *target process*) selected by the first argument,
//! - isolates every rendering failure into an inline error fragment.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use serde_json::json;
//! use wfe_forms::provider::{InMemoryVariableProvider, ProcessRecord, ProcessStore};
//! use wfe_forms::{FormComponent, FormComponentRuntime, FormError, RenderContext, RenderScope, arguments};
//! use wfe_types::User;
//!
//! #[derive(Debug)]
//! struct Amount;
//!
//! impl FormComponent for Amount {
//!     fn name(&self) -> &str {
//!         "Amount"
//!     }
//!
//!     fn render_request(&self, scope: &mut RenderScope<'_>) -> Result<String, FormError> {
//!         let amount: i64 = scope.required_variable_value(0)?;
//!         Ok(format!("<b>{amount}</b>"))
//!     }
//! }
//!
//! let store = Arc::new(ProcessStore::new(vec![ProcessRecord::new(1, "Purchase").with_variable("amount", json!(17))]));
//! let provider = Arc::new(InMemoryVariableProvider::new(store, 1)?);
//! let context = RenderContext::new(User::new(1, "admin"), provider);
//!
//! let html = FormComponentRuntime::init(Amount, context).render(arguments!["amount"], None);
//! assert_eq!(html, "<b>17</b>");
//! # Ok::<(), wfe_forms::FormError>(())
//! ```

use std::fmt::Debug;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, error};

use wfe_types::{ProcessId, User};
use wfe_util::escape_html_text;

use crate::FormError;
use crate::convert::{FromVariableValue, convert_to};
use crate::provider::{VariableProvider, VariableProviderExt};
use crate::request::RequestState;
use crate::submission::{SubmissionHandler, SubmissionPostProcessor};
use crate::template::{Arguments, TemplateValue};

/// Marks a rich combo parameter as a literal value rather than a variable name.
pub const RICH_COMBO_VALUE_PREFIX: &str = "value@";

/// Prefix of the registration name of target-process-aware component variants.
pub const TARGET_PROCESS_PREFIX: &str = "TargetProcess";

/// A renderable form component.
pub trait FormComponent: Debug {
    /// Component name; also selects the script resource `scripts/<name>.js`.
    fn name(&self) -> &str;

    /// Renders the component markup. Parameters are read through `scope`.
    fn render_request(&self, scope: &mut RenderScope<'_>) -> Result<String, FormError>;
}

impl<T: FormComponent + ?Sized> FormComponent for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn render_request(&self, scope: &mut RenderScope<'_>) -> Result<String, FormError> {
        (**self).render_request(scope)
    }
}

/// Context a component is initialized with.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// User the form is rendered for
    pub user: User,
    /// Provider of the process the form belongs to
    pub variable_provider: Arc<dyn VariableProvider>,
    /// Whether the first argument selects a target process
    pub target_process: bool,
}

impl RenderContext {
    pub fn new(user: User, variable_provider: Arc<dyn VariableProvider>) -> Self {
        Self {
            user,
            variable_provider,
            target_process: false,
        }
    }

    pub fn with_target_process(mut self, target_process: bool) -> Self {
        self.target_process = target_process;
        self
    }
}

/// An initialized component, ready to be rendered once.
#[derive(Debug)]
pub struct FormComponentRuntime<C> {
    component: C,
    context: RenderContext,
}

impl<C: FormComponent> FormComponentRuntime<C> {
    pub fn init(component: C, context: RenderContext) -> Self {
        Self { component, context }
    }

    pub fn component(&self) -> &C {
        &self.component
    }

    /// Renders the component for one template invocation.
    ///
    /// Never fails: any error raised while selecting the target process or
    /// rendering is logged together with the process context and replaced by
    /// [`error_fragment`]. Without a `request`, script export and submission
    /// registration are unavailable.
    pub fn render(self, mut arguments: Arguments, request: Option<&mut RequestState>) -> String {
        let FormComponentRuntime { component, context } = self;
        let RenderContext {
            user,
            mut variable_provider,
            target_process,
        } = context;
        let logged_arguments = format!("{arguments:?}");

        let result = render_with_context(&component, &user, &mut variable_provider, target_process, &mut arguments, request);
        match result {
            Ok(html) => html,
            Err(err) => {
                let process_definition = variable_provider.process_definition_name().unwrap_or_default();
                error!(
                    component = component.name(),
                    process_definition = %process_definition,
                    process_id = ?variable_provider.process_id(),
                    arguments = %logged_arguments,
                    error = %err,
                    "form component rendering failed"
                );
                error_fragment(&err.to_string())
            }
        }
    }
}

fn render_with_context(
    component: &dyn FormComponent,
    user: &User,
    variable_provider: &mut Arc<dyn VariableProvider>,
    target_process: bool,
    arguments: &mut Arguments,
    request: Option<&mut RequestState>,
) -> Result<String, FormError> {
    if target_process {
        let process_id: ProcessId =
            RenderScope::new(user, &**variable_provider, arguments.as_slice(), None, component.name()).required_variable_value(0)?;
        arguments.remove(0);
        debug!(component = component.name(), process_id, "rendering against target process");
        *variable_provider = variable_provider.same_provider(process_id)?;
    }
    let mut scope = RenderScope::new(user, &**variable_provider, arguments.as_slice(), request, component.name());
    component.render_request(&mut scope)
}

/// Inline marker rendered in place of a component that failed.
pub fn error_fragment(message: &str) -> String {
    format!(
        "<div style=\"background-color: #ffb0b0; border: 1px solid red; padding: 3px;\">{}</div>",
        escape_html_text(message)
    )
}

/// Everything a component can read while it renders.
///
/// Parameter indices are relative to the argument list after the target
/// process argument, if any, was consumed.
#[derive(Debug)]
pub struct RenderScope<'r> {
    user: &'r User,
    variable_provider: &'r dyn VariableProvider,
    arguments: &'r [Box<dyn TemplateValue>],
    request: Option<&'r mut RequestState>,
    component_name: &'r str,
}

impl<'r> RenderScope<'r> {
    fn new(
        user: &'r User,
        variable_provider: &'r dyn VariableProvider,
        arguments: &'r [Box<dyn TemplateValue>],
        request: Option<&'r mut RequestState>,
        component_name: &'r str,
    ) -> Self {
        Self {
            user,
            variable_provider,
            arguments,
            request,
            component_name,
        }
    }

    pub fn user(&self) -> &User {
        self.user
    }

    pub fn variable_provider(&self) -> &dyn VariableProvider {
        self.variable_provider
    }

    pub fn component_name(&self) -> &str {
        self.component_name
    }

    pub fn argument_count(&self) -> usize {
        self.arguments.len()
    }

    pub fn request(&mut self) -> Option<&mut RequestState> {
        self.request.as_deref_mut()
    }

    /// Unwrapped argument `index`, `None` when out of range.
    pub fn raw_param(&self, index: usize) -> Result<Option<Value>, FormError> {
        self.arguments.get(index).map(|argument| argument.unwrap()).transpose()
    }

    pub fn string_param(&self, index: usize) -> Result<Option<String>, FormError> {
        self.param(index)
    }

    /// Argument `index` converted to `T`; `None` when out of range or `null`.
    pub fn param<T: FromVariableValue>(&self, index: usize) -> Result<Option<T>, FormError> {
        convert_to(self.raw_param(index)?.as_ref())
    }

    /// Argument `index` read as either a literal or a variable reference.
    ///
    /// - `value@<literal>`: the trimmed literal is converted directly.
    /// - a name of an existing variable: the variable's value is converted.
    /// - anything else: the raw argument is converted directly, for templates
    ///   written before the `value@` prefix existed.
    pub fn rich_combo_param<T: FromVariableValue>(&self, index: usize) -> Result<Option<T>, FormError> {
        let raw = self.raw_param(index)?;
        if let Some(Value::String(text)) = &raw {
            if let Some(literal) = text.strip_prefix(RICH_COMBO_VALUE_PREFIX) {
                return convert_to(Some(&Value::String(literal.trim().to_string())));
            }
            if let Some(variable) = self.variable_provider.variable(text) {
                return convert_to(Some(&variable.value));
            }
        }
        convert_to(raw.as_ref())
    }

    /// Value of the variable named by argument `index`; the variable must exist
    /// and have a value.
    pub fn required_variable_value<T: FromVariableValue>(&self, index: usize) -> Result<T, FormError> {
        let variable_name = self
            .string_param(index)?
            .ok_or_else(|| FormError::MissingRequiredVariable {
                name: format!("argument #{index}"),
            })?;
        self.variable_provider.get_value_not_null(&variable_name)
    }

    /// Value of the variable named by argument `index`, or `default` when the
    /// argument or the variable is absent.
    pub fn variable_value_or<T: FromVariableValue>(&self, index: usize, default: T) -> Result<T, FormError> {
        let Some(variable_name) = self.string_param(index)? else {
            return Ok(default);
        };
        Ok(self.variable_provider.get_value(&variable_name)?.unwrap_or(default))
    }

    /// Renders `child` in this scope: same user, same provider, same
    /// arguments, no target process selection. Errors propagate to the
    /// caller instead of being turned into a fragment.
    pub fn render_chained(&mut self, child: &dyn FormComponent) -> Result<String, FormError> {
        let mut child_scope = RenderScope {
            user: self.user,
            variable_provider: self.variable_provider,
            arguments: self.arguments,
            request: self.request.as_deref_mut(),
            component_name: child.name(),
        };
        child.render_request(&mut child_scope)
    }

    /// Exports the script named after the component.
    pub fn export_script(&mut self, substitutions: &IndexMap<String, String>, global_scope: bool) -> String {
        let name = self.component_name;
        self.export_named_script(substitutions, global_scope, name)
    }

    /// Exports `scripts/<name>.js`. Returns an empty string when rendering
    /// outside of a request.
    pub fn export_named_script(&mut self, substitutions: &IndexMap<String, String>, global_scope: bool, name: &str) -> String {
        let path = format!("scripts/{name}.js");
        match self.request.as_deref_mut() {
            Some(request) => request.export_script(&path, substitutions, global_scope),
            None => String::new(),
        }
    }

    /// Claims the submitted value of `variable_name` for `handler`.
    pub fn register_variable_handler(&mut self, variable_name: &str, handler: Arc<dyn SubmissionHandler>) -> Result<(), FormError> {
        let request = self.request.as_deref_mut().ok_or(FormError::NoRequest)?;
        request.session_mut().register_handler(variable_name, handler);
        Ok(())
    }

    /// Registers `post_processor` for the submitted value of `variable_name`.
    pub fn register_variable_post_processor(
        &mut self,
        variable_name: &str,
        post_processor: Arc<dyn SubmissionPostProcessor>,
    ) -> Result<(), FormError> {
        let request = self.request.as_deref_mut().ok_or(FormError::NoRequest)?;
        request.session_mut().register_post_processor(variable_name, post_processor);
        Ok(())
    }
}

/// Initializes and renders `component` in one call.
pub fn render_component<C: FormComponent>(component: C, context: RenderContext, arguments: Arguments, request: Option<&mut RequestState>) -> String {
    FormComponentRuntime::init(component, context).render(arguments, request)
}
