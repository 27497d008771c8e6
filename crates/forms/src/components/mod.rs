//! Built-in form components and the name registry used to look them up.
//!
//! Modules:
//! - `display_variable`: read-only variable value
//! - `input_variable`: text input with submission trimming
//! - `group_members`: group/user selectors backed by an exported script

mod display_variable;
mod group_members;
mod input_variable;

pub use display_variable::DisplayVariable;
pub use group_members::GroupMembers;
pub use input_variable::InputVariable;

use indexmap::IndexMap;

use crate::FormComponent;
use crate::component::TARGET_PROCESS_PREFIX;

/// Creates a fresh component instance per invocation site.
pub type ComponentFactory = fn() -> Box<dyn FormComponent>;

/// Maps template-visible component names to factories.
///
/// Every registered component is also reachable as
/// `TargetProcess<Name>`, which renders it against the process selected by
/// the first argument.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    factories: IndexMap<String, ComponentFactory>,
}

/// A component looked up by name, together with its target-process flag.
#[derive(Debug)]
pub struct ResolvedComponent {
    pub component: Box<dyn FormComponent>,
    pub target_process: bool,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in components.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("DisplayVariable", || Box::new(DisplayVariable) as Box<dyn FormComponent>);
        registry.register("InputVariable", || Box::new(InputVariable) as Box<dyn FormComponent>);
        registry.register("GroupMembers", || Box::new(GroupMembers) as Box<dyn FormComponent>);
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, factory: ComponentFactory) {
        self.factories.insert(name.into(), factory);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Looks up `name`, honoring the `TargetProcess` prefix.
    pub fn resolve(&self, name: &str) -> Option<ResolvedComponent> {
        if let Some(factory) = self.factories.get(name) {
            return Some(ResolvedComponent {
                component: factory(),
                target_process: false,
            });
        }
        let base_name = name.strip_prefix(TARGET_PROCESS_PREFIX)?;
        self.factories.get(base_name).map(|factory| ResolvedComponent {
            component: factory(),
            target_process: true,
        })
    }
}
