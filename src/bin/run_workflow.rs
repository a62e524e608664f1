//! CLI: run a workflow graph (JSON node map) from a file.
//!
//! Compiles and validates the graph, then runs it in-process. Questions are
//! answered from `--input` values in order, then from stdin lines. When stdin is
//! exhausted while a question is pending, the session is saved to
//! `--session-file` and can be continued later with `--resume`.
//!
//! Usage: `run_workflow [OPTIONS] <graph.json>`
//!
//! Set RUST_LOG=flowweave=trace for TRACE-level span enter/exit and events.

use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use flowweave::session_io::{load_session, save_session};
use flowweave::types::{ExecuteResponse, ExecutionSession, NewWorkflow};
use flowweave::{
  EngineConfig, ExecuteRequest, ExecutorRegistry, InMemorySessionStore, InMemoryWorkflowStore,
  SessionStore, StateMap, TracingAuditSink, WorkflowRunner, WorkflowService, compile_graph,
  validate,
};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};
use uuid::Uuid;

/// Run a workflow graph from a JSON file.
#[derive(Parser, Debug)]
#[command(name = "run_workflow")]
#[command(
  after_help = r#"Environment variables (override flags and --config when set):
  FLOWWEAVE_MAX_STEPS          Maximum node executions per run (default 100).
  FLOWWEAVE_HTTP_TIMEOUT_SECS  Timeout for APICall requests (default 30).
  FLOWWEAVE_DEFAULT_USER       User recorded on the session (default anonymous).

Examples:
  run_workflow --state name=Ann greeting.json
  run_workflow --input 42 --session-file .flowweave/session.json survey.json
  run_workflow --resume .flowweave/session.json survey.json"#
)]
struct Args {
  /// Initial state entry as key=value; values that parse as JSON keep their type
  #[arg(long = "state", value_name = "KEY=VALUE")]
  state: Vec<String>,

  /// Maximum node executions per run. Overridden by FLOWWEAVE_MAX_STEPS if set.
  #[arg(long, value_name = "N")]
  max_steps: Option<usize>,

  /// Answer for the next question; may be repeated
  #[arg(long = "input", value_name = "TEXT")]
  input: Vec<String>,

  /// Where to save the session when it is left awaiting input
  #[arg(long, value_name = "PATH")]
  session_file: Option<PathBuf>,

  /// Continue a session saved with --session-file
  #[arg(long, value_name = "PATH")]
  resume: Option<PathBuf>,

  /// Engine configuration file (JSON)
  #[arg(long, value_name = "PATH")]
  config: Option<PathBuf>,

  /// Validate the graph and exit
  #[arg(long, conflicts_with = "no_validate")]
  validate_only: bool,

  /// Run even when validation reports errors
  #[arg(long)]
  no_validate: bool,

  /// Path to the workflow graph JSON file
  #[arg(value_name = "graph.json")]
  graph_path: PathBuf,
}

/// Answers for pending questions: queued flags first, then stdin lines.
struct Answers {
  queued: VecDeque<String>,
  stdin: Lines<BufReader<Stdin>>,
}

impl Answers {
  fn new(queued: Vec<String>) -> Self {
    Self {
      queued: queued.into(),
      stdin: BufReader::new(tokio::io::stdin()).lines(),
    }
  }

  async fn next(&mut self) -> Option<String> {
    if let Some(answer) = self.queued.pop_front() {
      return Some(answer);
    }
    match self.stdin.next_line().await {
      Ok(line) => line,
      Err(e) => {
        warn!(error = %e, "failed to read stdin");
        None
      }
    }
  }
}

fn parse_state(entries: &[String]) -> Result<StateMap, String> {
  let mut state = StateMap::new();
  for entry in entries {
    let Some((key, raw)) = entry.split_once('=') else {
      return Err(format!("invalid --state '{entry}': expected KEY=VALUE"));
    };
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    state.insert(key.trim().to_string(), value);
  }
  Ok(state)
}

fn engine_config(args: &Args) -> Result<EngineConfig, String> {
  let mut config = match &args.config {
    Some(path) => EngineConfig::load(path).map_err(|e| e.to_string())?,
    None => EngineConfig::default(),
  };
  if let Some(max_steps) = args.max_steps {
    config.max_steps = max_steps;
  }
  config
    .with_overrides(|key| std::env::var(key).ok())
    .map_err(|e| e.to_string())
}

fn exit_with(message: impl std::fmt::Display) -> ! {
  eprintln!("{message}");
  process::exit(1);
}

/// Prints the `message` output of every step after the first `seen` entries.
fn print_new_messages(response: &ExecuteResponse, seen: usize) {
  for entry in response.execution_history.iter().skip(seen) {
    if let Some(Value::String(text)) = entry.output.get("message") {
      println!("{text}");
    }
  }
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();
  let config = engine_config(&args)
    .unwrap_or_else(|e| exit_with(format!("Invalid configuration: {e}")));
  info!(max_steps = config.max_steps, graph = %args.graph_path.display(), "run_workflow starting");

  let source = fs::read_to_string(&args.graph_path)
    .unwrap_or_else(|e| exit_with(format!("Error reading {}: {e}", args.graph_path.display())));

  let resumed: Option<ExecutionSession> = args.resume.as_ref().map(|path| {
    load_session(path)
      .unwrap_or_else(|e| exit_with(format!("Error loading session {}: {e}", path.display())))
  });
  let workflow_id = resumed
    .as_ref()
    .map(|s| s.workflow_id)
    .unwrap_or_else(Uuid::new_v4);

  let compiled = compile_graph(&source, workflow_id)
    .unwrap_or_else(|e| exit_with(format!("Error compiling graph: {e}")));
  let validation = validate(&compiled.nodes, &compiled.edges);
  for finding in &validation.errors {
    eprintln!("error {}: {}", finding.code, finding.message);
  }
  for finding in &validation.warnings {
    eprintln!("warning {}: {}", finding.code, finding.message);
  }
  if args.validate_only {
    if validation.is_valid {
      println!("Graph is valid.");
      return;
    }
    process::exit(1);
  }
  if !validation.is_valid && !args.no_validate {
    exit_with("Graph has validation errors (use --no-validate to run anyway).");
  }

  let initial_state = parse_state(&args.state).unwrap_or_else(|e| exit_with(e));

  let workflows = Arc::new(InMemoryWorkflowStore::new());
  let sessions = Arc::new(InMemorySessionStore::new());
  let audit = Arc::new(TracingAuditSink);
  let service = WorkflowService::new(workflows.clone(), audit.clone());
  let name = args
    .graph_path
    .file_stem()
    .map(|s| s.to_string_lossy().into_owned())
    .unwrap_or_default();
  let new = NewWorkflow {
    id: Some(workflow_id),
    name,
    graph_source: source,
    ..NewWorkflow::default()
  };
  if let Err(e) = service.create(new, &config.default_user_id).await {
    exit_with(format!("Error storing workflow: {e}"));
  }
  let registry =
    ExecutorRegistry::with_defaults(&config).unwrap_or_else(|e| exit_with(format!("Error: {e}")));
  let runner = WorkflowRunner::new(workflows, sessions.clone(), audit, registry, config);

  let mut answers = Answers::new(args.input.clone());
  let mut seen = 0;
  let mut request = match resumed {
    Some(session) => {
      seen = session.execution_history.len();
      let session_id = session.session_id.clone();
      if let Some(prompt) = &session.pending_prompt {
        println!("{prompt}");
      }
      if let Err(e) = sessions.put(session).await {
        exit_with(format!("Error restoring session: {e}"));
      }
      let Some(answer) = answers.next().await else {
        println!("Awaiting input.");
        return;
      };
      ExecuteRequest::resume(workflow_id, session_id, Value::String(answer))
    }
    None => ExecuteRequest::start(workflow_id).with_state(initial_state),
  };

  loop {
    let response = runner.execute(request).await;
    print_new_messages(&response, seen);
    seen = response.execution_history.len();

    if !response.status.is_terminal() {
      if let Some(error) = &response.error_message {
        eprintln!("{error}");
      }
      if let Some(prompt) = &response.message {
        println!("{prompt}");
      }
      match answers.next().await {
        Some(answer) => {
          request =
            ExecuteRequest::resume(workflow_id, &response.session_id, Value::String(answer));
          continue;
        }
        None => {
          if let Some(path) = &args.session_file {
            let saved = sessions.get(&response.session_id).await.ok().flatten();
            match saved {
              Some(session) => {
                if let Err(e) = save_session(path, &session) {
                  exit_with(format!("Error saving session {}: {e}", path.display()));
                }
                info!(path = %path.display(), "session saved");
              }
              None => exit_with(format!("session not found: {}", response.session_id)),
            }
          }
          println!("Awaiting input.");
          return;
        }
      }
    }

    if response.is_complete {
      println!("Workflow completed.");
      match serde_json::to_string_pretty(&response.state) {
        Ok(state) => println!("{state}"),
        Err(e) => warn!(error = %e, "failed to render final state"),
      }
      return;
    }
    let message = response
      .error_message
      .unwrap_or_else(|| "unknown error".to_string());
    println!("Workflow failed: {message}");
    process::exit(1);
  }
}
