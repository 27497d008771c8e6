//! Component script resources.
//!
//! Components may ship a JavaScript file (`scripts/<Component>.js`) that is
//! inlined into the page next to the component markup. Placeholders in the
//! file are replaced with per-invocation values before inlining.

use std::fmt::Debug;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use wfe_util::FormsConfig;

use crate::FormError;

/// Placeholder replaced with the component endpoint URL.
pub const JSON_URL_PLACEHOLDER: &str = "jsonUrl";

/// Locates script resources by their relative path (for example `scripts/GroupMembers.js`).
pub trait ScriptSource: Send + Sync + Debug {
    fn load(&self, path: &str) -> Result<String, FormError>;
}

/// Scripts compiled into the crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedScripts;

const EMBEDDED: &[(&str, &str)] = &[("scripts/GroupMembers.js", include_str!("../scripts/GroupMembers.js"))];

impl ScriptSource for EmbeddedScripts {
    fn load(&self, path: &str) -> Result<String, FormError> {
        EMBEDDED
            .iter()
            .find(|(embedded_path, _)| *embedded_path == path)
            .map(|(_, body)| body.to_string())
            .ok_or_else(|| FormError::ResourceNotFound { path: path.to_string() })
    }
}

/// Scripts read from a directory on disk; `path` is resolved relative to `root`.
#[derive(Debug, Clone)]
pub struct DirectoryScriptSource {
    root: PathBuf,
}

impl DirectoryScriptSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ScriptSource for DirectoryScriptSource {
    fn load(&self, path: &str) -> Result<String, FormError> {
        let relative = path.trim_start_matches('/');
        if relative.split('/').any(|segment| segment == "..") {
            return Err(FormError::ResourceNotFound { path: path.to_string() });
        }
        fs::read_to_string(self.root.join(relative)).map_err(|error| {
            debug!(path, root = %self.root.display(), error = %error, "script not readable");
            FormError::ResourceNotFound { path: path.to_string() }
        })
    }
}

/// Tries each source in order and returns the first script found.
#[derive(Debug, Clone, Default)]
pub struct ChainedScriptSource {
    sources: Vec<Arc<dyn ScriptSource>>,
}

impl ChainedScriptSource {
    pub fn new(sources: Vec<Arc<dyn ScriptSource>>) -> Self {
        Self { sources }
    }

    /// Configured scripts directory first, embedded scripts second.
    pub fn from_config(config: &FormsConfig) -> Self {
        let mut sources: Vec<Arc<dyn ScriptSource>> = Vec::new();
        if let Some(dir) = &config.scripts_dir {
            sources.push(Arc::new(DirectoryScriptSource::new(dir.clone())));
        }
        sources.push(Arc::new(EmbeddedScripts));
        Self { sources }
    }
}

impl ScriptSource for ChainedScriptSource {
    fn load(&self, path: &str) -> Result<String, FormError> {
        for source in &self.sources {
            if let Ok(body) = source.load(path) {
                return Ok(body);
            }
        }
        Err(FormError::ResourceNotFound { path: path.to_string() })
    }
}

/// Replaces the placeholders in `body` and wraps the result in a script
/// element. `jsonUrl` points at the component endpoint unless `substitutions`
/// covers it. Replacements are made in a single pass over the original body,
/// so replaced text is never matched again.
pub fn render_script(body: &str, substitutions: &IndexMap<String, String>, component_endpoint: &str) -> String {
    let mut placeholders: Vec<(&str, &str)> = substitutions
        .iter()
        .filter(|(placeholder, _)| !placeholder.is_empty())
        .map(|(placeholder, replacement)| (placeholder.as_str(), replacement.as_str()))
        .collect();
    if !substitutions.contains_key(JSON_URL_PLACEHOLDER) {
        placeholders.push((JSON_URL_PLACEHOLDER, component_endpoint));
    }
    format!("<script type=\"text/javascript\">{}</script>", replace_all(body, &placeholders))
}

fn replace_all(body: &str, placeholders: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(body.len());
    let mut rest = body;
    while !rest.is_empty() {
        // Earliest match wins; the longest placeholder breaks ties.
        let next = placeholders
            .iter()
            .filter_map(|(placeholder, replacement)| rest.find(placeholder).map(|at| (at, *placeholder, *replacement)))
            .min_by(|left, right| left.0.cmp(&right.0).then(right.1.len().cmp(&left.1.len())));
        let Some((at, placeholder, replacement)) = next else {
            output.push_str(rest);
            break;
        };
        output.push_str(&rest[..at]);
        output.push_str(replacement);
        rest = &rest[at + placeholder.len()..];
    }
    output
}

/// Inline marker shown in place of a script that could not be exported.
pub fn script_error_fragment(path: &str) -> String {
    format!("<p style='color: red;'>Unable to export script <b>{path}</b> to page</p>")
}
