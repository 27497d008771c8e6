use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, error};

use wfe_util::FormsConfig;
use wfe_util::config::DEFAULT_COMPONENT_ENDPOINT;

use crate::script::{ChainedScriptSource, ScriptSource, render_script, script_error_fragment};
use crate::submission::FormSession;

/// State of the page request a form is rendered in.
///
/// Passed explicitly into [`FormComponentRuntime::render`](crate::FormComponentRuntime::render).
/// Holds the markers of scripts already emitted on the page and the user's
/// [`FormSession`].
#[derive(Debug)]
pub struct RequestState {
    scripts: Arc<dyn ScriptSource>,
    component_endpoint: String,
    exported_scripts: IndexSet<String>,
    session: FormSession,
}

impl RequestState {
    pub fn new(scripts: Arc<dyn ScriptSource>, session: FormSession) -> Self {
        Self {
            scripts,
            component_endpoint: DEFAULT_COMPONENT_ENDPOINT.to_string(),
            exported_scripts: IndexSet::new(),
            session,
        }
    }

    /// Request using the configured script sources and component endpoint.
    pub fn from_config(config: &FormsConfig, session: FormSession) -> Self {
        Self::new(Arc::new(ChainedScriptSource::from_config(config)), session).with_component_endpoint(config.component_endpoint.clone())
    }

    pub fn with_component_endpoint(mut self, component_endpoint: impl Into<String>) -> Self {
        self.component_endpoint = component_endpoint.into();
        self
    }

    pub fn session(&self) -> &FormSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut FormSession {
        &mut self.session
    }

    /// Ends the request and hands the session back to the caller.
    pub fn into_session(self) -> FormSession {
        self.session
    }

    /// Whether a globally scoped script at `path` was already emitted.
    pub fn is_script_exported(&self, path: &str) -> bool {
        self.exported_scripts.contains(path)
    }

    /// Emits the script at `path` with `substitutions` applied.
    ///
    /// With `global_scope` the script is emitted at most once per request; the
    /// marker is set before the script is loaded, so a script that fails to
    /// load is not retried on the same page. A missing script produces an
    /// inline marker instead of an error.
    pub fn export_script(&mut self, path: &str, substitutions: &IndexMap<String, String>, global_scope: bool) -> String {
        if global_scope && !self.exported_scripts.insert(path.to_string()) {
            return String::new();
        }
        match self.scripts.load(path) {
            Ok(body) => {
                debug!(path, global_scope, "exporting component script");
                render_script(&body, substitutions, &self.component_endpoint)
            }
            Err(err) => {
                error!(path, error = %err, "Tag execution error");
                script_error_fragment(path)
            }
        }
    }
}
