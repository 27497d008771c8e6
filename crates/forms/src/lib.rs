//! # WFE Forms
//!
//! Runtime for the components that make up server-rendered process forms.
//!
//! ## Architecture
//!
//! - **`component`**: the render boundary, [`RenderScope`] parameter accessors, chained rendering
//! - **`template`**: template call arguments and the [`TemplateValue`] capability
//! - **`convert`**: conversion of unwrapped values into component parameter types
//! - **`provider`**: [`VariableProvider`](provider::VariableProvider) and its in-memory implementation
//! - **`request`**: per-request state (script markers, session)
//! - **`script`**: component script sources and inlining
//! - **`submission`**: handlers and post-processors claimed for submitted variables
//! - **`components`**: built-in components and the name registry

pub mod component;
pub mod components;
pub mod convert;
mod error;
pub mod provider;
pub mod request;
pub mod script;
pub mod submission;
pub mod template;

pub use component::{
    FormComponent, FormComponentRuntime, RICH_COMBO_VALUE_PREFIX, RenderContext, RenderScope, TARGET_PROCESS_PREFIX, error_fragment,
    render_component,
};
pub use components::{ComponentRegistry, ResolvedComponent};
pub use convert::FromVariableValue;
pub use error::FormError;
pub use request::RequestState;
pub use submission::FormSession;
pub use template::{Arguments, TemplateValue, Wrapped, arguments_from_json};
