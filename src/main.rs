mod transport;
mod wiring;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use agent_loop::{AgentLoop, AnthropicConfig, AnthropicOracle};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use recording_pipeline::{HelperCommand, OpenAiTranscriber, RecordingSession, RecordingSessionConfig, Transcriber};
use tracing::info;
use uia_config::AgentConfig;

#[derive(Parser)]
#[command(name = "uia-agentd", about = "Local UI-automation agent host process")]
struct Cli {
    /// Path to a JSON config file overlaying the defaults (spec.md §6 env vars
    /// layer on top of this).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the controller's bidirectional command socket (default).
    Serve,
    /// Run the observe-decide-act loop toward a goal, driven by the
    /// Anthropic oracle.
    Agent {
        goal: String,
    },
    /// Run a workflow definition as an agent goal, after resolving its
    /// `{{variable}}` tokens.
    Workflow {
        path: PathBuf,
        #[arg(long = "var", value_parser = parse_key_val)]
        vars: Vec<(String, String)>,
    },
    /// Record a session: events, screenshots, and (optionally) narration
    /// audio, producing a session manifest.
    Record {
        session_dir: PathBuf,
        #[arg(long, default_value = "recorded session")]
        description: String,
        #[arg(long, default_value = "uia-event-monitor")]
        event_monitor: String,
        #[arg(long)]
        audio_recorder: Option<String>,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got \"{s}\""))?;
    Ok((name.to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let loaded = uia_config::load(cli.config.as_deref()).context("loading agent config")?;
    let config = loaded.config;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&config).await,
        Commands::Agent { goal } => run_agent(&config, goal).await,
        Commands::Workflow { path, vars } => run_workflow(&config, &path, vars).await,
        Commands::Record {
            session_dir,
            description,
            event_monitor,
            audio_recorder,
        } => run_recording(&config, session_dir, description, event_monitor, audio_recorder).await,
    }
}

async fn serve(config: &AgentConfig) -> Result<()> {
    let dispatcher = Arc::new(wiring::build_dispatcher(config));
    let state = transport::TransportState { dispatcher };
    let app = transport::router(state);

    let listener = tokio::net::TcpListener::bind(&config.transport.bind_address)
        .await
        .with_context(|| format!("binding transport socket at {}", config.transport.bind_address))?;
    info!(address = %config.transport.bind_address, "uia-agentd: listening for controller connections");
    axum::serve(listener, app).await.context("serving transport socket")
}

async fn run_agent(config: &AgentConfig, goal: String) -> Result<()> {
    let dispatcher = Arc::new(wiring::build_dispatcher(config));
    let anthropic = AnthropicConfig::from_env()
        .context("ANTHROPIC_API_KEY must be set to run the agent loop")?;
    let oracle = Arc::new(AnthropicOracle::new(anthropic).context("building oracle client")?);

    let loop_config = agent_loop::LoopConfig {
        goal,
        max_iterations: config.agent_loop.max_iterations,
        settle_delay: Duration::from_millis(config.agent_loop.settle_delay_ms),
        parse_error_budget: config.agent_loop.parse_error_budget,
    };
    let agent = AgentLoop::new(dispatcher, oracle, loop_config);
    let result = agent.run().await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    if matches!(result.outcome, agent_loop::Outcome::Error) {
        bail!("agent loop ended in error: {}", result.summary);
    }
    Ok(())
}

async fn run_workflow(config: &AgentConfig, path: &PathBuf, vars: Vec<(String, String)>) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading workflow definition at {}", path.display()))?;
    let definition: core_types::WorkflowDefinition =
        serde_json::from_str(&raw).context("parsing workflow definition JSON")?;

    let values: std::collections::HashMap<String, String> = vars.into_iter().collect();
    let resolved = if values.is_empty() {
        definition
    } else {
        workflow::resolve_variables(&definition, &values).context("resolving workflow variables")?
    };
    let goal = workflow::format_workflow_as_goal(&resolved);
    run_agent(config, goal).await
}

async fn run_recording(
    config: &AgentConfig,
    session_dir: PathBuf,
    description: String,
    event_monitor: String,
    audio_recorder: Option<String>,
) -> Result<()> {
    let session_id = uuid::Uuid::new_v4().to_string();
    let recording_config = RecordingSessionConfig {
        id: session_id.clone(),
        description,
        session_dir,
        event_monitor: HelperCommand {
            program: event_monitor,
            args: Vec::new(),
        },
        audio_recorder: audio_recorder.map(|program| HelperCommand { program, args: Vec::new() }),
        recording: config.recording.clone(),
        capture_timeout: Duration::from_secs(15),
    };

    let transcriber: Option<Arc<dyn Transcriber>> = std::env::var("OPENAI_API_KEY")
        .ok()
        .filter(|v| !v.is_empty())
        .and_then(|key| OpenAiTranscriber::new(key).ok())
        .map(|t| Arc::new(t) as Arc<dyn Transcriber>);

    info!(id = %session_id, "uia-agentd: recording session started, press Ctrl+C to stop");
    let session = RecordingSession::start(recording_config, transcriber).await?;
    tokio::signal::ctrl_c().await.context("waiting for Ctrl+C")?;
    let manifest = session.stop().await?;
    info!(
        id = %manifest.id,
        frames = manifest.frame_count,
        events = manifest.event_count,
        "uia-agentd: recording session complete"
    );
    println!("{}", serde_json::to_string_pretty(&manifest)?);
    Ok(())
}
