use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::{Subscriber, debug};

use wfe_forms::provider::{InMemoryVariableProvider, ProcessStore};
use wfe_forms::{ComponentRegistry, FormSession, RenderContext, RequestState, arguments_from_json, render_component};
use wfe_types::User;
use wfe_util::FormsConfig;

#[derive(Debug, Parser)]
#[command(name = "wfe-forms", about = "Render process form components")]
struct Cli {
    /// Path to the forms configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the available components
    Components,
    /// Render one component invocation against a process fixture
    Render(RenderArgs),
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// Component name, optionally prefixed with `TargetProcess`
    component: String,
    /// JSON file with `{"processes": [...]}`
    #[arg(long)]
    fixture: PathBuf,
    /// Process the form belongs to
    #[arg(long)]
    process: i64,
    /// Template arguments as a JSON array
    #[arg(long, default_value = "[]")]
    args: String,
    /// Acting user login
    #[arg(long, default_value = "Administrator")]
    user: String,
    /// Submitted form input (JSON object) processed after rendering
    #[arg(long)]
    submit: Option<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => FormsConfig::load_from(path),
        None => FormsConfig::load(),
    }
    .context("failed to load forms configuration")?;
    debug!(?config, "loaded forms configuration");

    let registry = ComponentRegistry::builtin();
    match cli.command {
        Command::Components => {
            for name in registry.names() {
                println!("{name}");
            }
            Ok(())
        }
        Command::Render(args) => {
            let output = run_render(&registry, &config, &args)?;
            println!("{output}");
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing::subscriber::set_global_default(log_subscriber(&filter));
}

fn log_subscriber(filter: &str) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).finish()
}

fn run_render(registry: &ComponentRegistry, config: &FormsConfig, args: &RenderArgs) -> Result<String> {
    let store = load_fixture(&args.fixture)?;
    let provider = InMemoryVariableProvider::new(Arc::new(store), args.process)?;
    let resolved = registry
        .resolve(&args.component)
        .with_context(|| format!("unknown component '{}'", args.component))?;

    let arguments = match serde_json::from_str::<Value>(&args.args).context("--args must be valid JSON")? {
        Value::Array(values) => values,
        other => vec![other],
    };

    let context = RenderContext::new(User::new(0, args.user.clone()), Arc::new(provider)).with_target_process(resolved.target_process);
    let mut request = RequestState::from_config(config, FormSession::new());
    let mut output = render_component(resolved.component, context, arguments_from_json(arguments), Some(&mut request));

    if let Some(submit) = &args.submit {
        let input: Value = serde_json::from_str(submit).context("--submit must be valid JSON")?;
        let input = input.as_object().context("--submit must be a JSON object")?;
        let variables = request.session().process_submission(input)?;
        output.push('\n');
        output.push_str(&serde_json::to_string_pretty(&variables)?);
    }
    Ok(output)
}

fn load_fixture(path: &Path) -> Result<ProcessStore> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read process fixture: {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid process fixture: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_fixture(dir: &Path) -> PathBuf {
        let path = dir.join("processes.json");
        fs::write(
            &path,
            r#"{"processes": [
                {"id": 1, "definition_name": "Purchase", "variables": {"amount": 17, "supplier": 2, "manager": "jdoe"}},
                {"id": 2, "definition_name": "Supplier", "variables": {"amount": 99}}
            ]}"#,
        )
        .unwrap();
        path
    }

    fn render_args(fixture: PathBuf, component: &str, args: &str) -> RenderArgs {
        RenderArgs {
            component: component.into(),
            fixture,
            process: 1,
            args: args.into(),
            user: "admin".into(),
            submit: None,
        }
    }

    #[test]
    fn log_filter_controls_debug_events() {
        tracing::subscriber::with_default(log_subscriber("debug"), || {
            assert!(tracing::enabled!(tracing::Level::DEBUG));
        });
        tracing::subscriber::with_default(log_subscriber("info"), || {
            assert!(!tracing::enabled!(tracing::Level::DEBUG));
            assert!(tracing::enabled!(tracing::Level::INFO));
        });
    }

    #[test]
    fn renders_component_from_fixture() {
        let temp_dir = tempfile::tempdir().unwrap();
        let args = render_args(write_fixture(temp_dir.path()), "DisplayVariable", r#"["amount"]"#);
        let output = run_render(&ComponentRegistry::builtin(), &FormsConfig::default(), &args).unwrap();
        assert_eq!(output, "<span class=\"displayVariable\">17</span>");
    }

    #[test]
    fn target_process_prefix_switches_process() {
        let temp_dir = tempfile::tempdir().unwrap();
        let args = render_args(write_fixture(temp_dir.path()), "TargetProcessDisplayVariable", r#"["supplier", "amount"]"#);
        let output = run_render(&ComponentRegistry::builtin(), &FormsConfig::default(), &args).unwrap();
        assert_eq!(output, "<span class=\"displayVariable\">99</span>");
    }

    #[test]
    fn submit_applies_registered_post_processors() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut args = render_args(write_fixture(temp_dir.path()), "InputVariable", r#""manager""#);
        args.submit = Some(r#"{"manager": "  alice "}"#.into());
        let output = run_render(&ComponentRegistry::builtin(), &FormsConfig::default(), &args).unwrap();
        assert!(output.starts_with("<input type=\"text\" name=\"manager\" value=\"jdoe\" />\n"));
        assert!(output.contains("\"manager\": \"alice\""));
    }

    #[test]
    fn unknown_component_and_process_are_errors() {
        let temp_dir = tempfile::tempdir().unwrap();
        let fixture = write_fixture(temp_dir.path());
        let unknown = render_args(fixture.clone(), "Nope", "[]");
        assert!(run_render(&ComponentRegistry::builtin(), &FormsConfig::default(), &unknown).is_err());

        let mut missing_process = render_args(fixture, "DisplayVariable", "[]");
        missing_process.process = 42;
        assert!(run_render(&ComponentRegistry::builtin(), &FormsConfig::default(), &missing_process).is_err());
    }
}
