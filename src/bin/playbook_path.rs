//! CLI: Load playbooks, print their graph and node path, optionally execute.
//!
//! Playbooks come from the playbook service, or from a snapshot file when
//! `--file` is given. The graph is built, the node path resolved and printed.
//!
//! Usage: `playbook_path [OPTIONS]`
//! Example: playbook_path --file playbooks.json --include-isolated
//!
//! Set RUST_LOG=playbook_graph=trace for TRACE-level span enter/exit and events.

use clap::Parser;
use playbook_graph::config::{
  DEFAULT_POLL_INTERVAL, DEFAULT_POLL_WINDOW, DEFAULT_REQUEST_TIMEOUT, DEFAULT_SERVICE_URL,
};
use playbook_graph::snapshot_io::{load_snapshot, save_snapshot};
use playbook_graph::{
  Config, EditorSession, ExecutionCoordinator, HttpPlaybookService, RootPolicy,
  fetch_all_playbooks,
};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

/// Print the execution node path of a playbook library.
#[derive(Parser, Debug)]
#[command(name = "playbook_path")]
#[command(
  after_help = r#"Environment variables (override the matching flags when set):
  PLAYBOOK_SERVICE_URL           Base url of the playbook service.
  PLAYBOOK_REQUEST_TIMEOUT_SECS  Per-request timeout in seconds.
  PLAYBOOK_POLL_INTERVAL_SECS    Seconds between log fetches after an execution.
  PLAYBOOK_POLL_WINDOW_SECS      Seconds a log polling window stays open.
  PLAYBOOK_INCLUDE_ISOLATED      true to append unconnected plays to the path.

Examples:
  playbook_path
  playbook_path --file playbooks.json
  playbook_path --execute-path --follow-logs"#
)]
struct Args {
  /// Base url of the playbook service. Overridden by PLAYBOOK_SERVICE_URL if set.
  #[arg(long, value_name = "URL", default_value = DEFAULT_SERVICE_URL)]
  service_url: String,

  /// Per-request timeout in seconds, at least 1.
  #[arg(
    long,
    value_name = "SECS",
    default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs(),
    value_parser = clap::value_parser!(u64).range(1..)
  )]
  timeout_secs: u64,

  /// Seconds between log fetches while following logs.
  #[arg(
    long,
    value_name = "SECS",
    default_value_t = DEFAULT_POLL_INTERVAL.as_secs(),
    value_parser = clap::value_parser!(u64).range(1..)
  )]
  poll_interval_secs: u64,

  /// Seconds to keep following logs after an execution.
  #[arg(
    long,
    value_name = "SECS",
    default_value_t = DEFAULT_POLL_WINDOW.as_secs(),
    value_parser = clap::value_parser!(u64).range(1..)
  )]
  poll_window_secs: u64,

  /// Append plays with no connection to the node path.
  #[arg(long)]
  include_isolated: bool,

  /// Read playbooks from this snapshot file instead of the service.
  #[arg(long, value_name = "FILE")]
  file: Option<PathBuf>,

  /// Write the loaded playbooks to this snapshot file.
  #[arg(long, value_name = "FILE")]
  save: Option<PathBuf>,

  /// Execute the resolved node path on the service.
  #[arg(long, conflicts_with = "execute_playbook")]
  execute_path: bool,

  /// Execute every play of the playbook with this name.
  #[arg(long, value_name = "NAME")]
  execute_playbook: Option<String>,

  /// After executing, print log snapshots until the polling window closes.
  #[arg(long)]
  follow_logs: bool,
}

impl Args {
  fn config(&self) -> Config {
    Config {
      service_url: self.service_url.clone(),
      request_timeout: Duration::from_secs(self.timeout_secs),
      poll_interval: Duration::from_secs(self.poll_interval_secs),
      poll_window: Duration::from_secs(self.poll_window_secs),
      root_policy: if self.include_isolated {
        RootPolicy::IncludeIsolated
      } else {
        RootPolicy::SourcesOnly
      },
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

  info!("playbook_path starting");
  let args = Args::parse();

  // Env vars override flags.
  let config = match args.config().with_env() {
    Ok(c) => c,
    Err(e) => {
      eprintln!("Invalid configuration: {}", e);
      process::exit(1);
    }
  };
  info!(service_url = %config.service_url, policy = ?config.root_policy, "options (env or flags)");

  let service = match HttpPlaybookService::from_config(&config) {
    Ok(s) => Arc::new(s),
    Err(e) => {
      eprintln!("Error creating service client: {}", e);
      process::exit(1);
    }
  };

  let playbooks = match &args.file {
    Some(path) => match load_snapshot(path) {
      Ok(p) => p,
      Err(e) => {
        eprintln!("Error reading {}: {}", path.display(), e);
        process::exit(1);
      }
    },
    None => match fetch_all_playbooks(service.as_ref()).await {
      Some(p) => p,
      None => {
        eprintln!("Error fetching playbooks from {}", config.service_url);
        process::exit(1);
      }
    },
  };

  if let Some(path) = &args.save {
    if let Err(e) = save_snapshot(path, &playbooks) {
      eprintln!("Error writing {}: {}", path.display(), e);
      process::exit(1);
    }
    info!(path = %path.display(), "snapshot saved");
  }

  let session = EditorSession::with_playbooks(playbooks, config.root_policy);
  println!("Playbooks: {}", session.playbooks().len());
  println!("Nodes:");
  for node in session.nodes() {
    println!(
      "  {} [{}] {:?} at ({}, {})",
      node.id, node.playbook_id, node.label, node.position.x, node.position.y
    );
  }
  println!("Edges:");
  for edge in session.edges().iter() {
    println!("  {} -> {}", edge.source, edge.target);
  }
  println!("Node path:");
  for step in session.labelled_path() {
    println!("  {} {:?}", step.id, step.description);
  }

  let mut coordinator = ExecutionCoordinator::new(service, &config);
  let notice = if args.execute_path {
    Some(coordinator.execute_node_path(&session).await)
  } else if let Some(name) = &args.execute_playbook {
    let Some(id) = session
      .playbooks()
      .iter()
      .find(|pb| &pb.name == name)
      .map(|pb| pb.id.clone())
    else {
      eprintln!("No playbook named {}", name);
      process::exit(1);
    };
    Some(coordinator.execute_playbook(&session, &id).await)
  } else {
    None
  };

  let Some(notice) = notice else {
    return;
  };
  println!("{}", notice);
  if notice.is_error() {
    process::exit(1);
  }

  if args.follow_logs {
    if let Some(mut window) = coordinator.take_polling_window() {
      while let Some(snapshot) = window.next_snapshot().await {
        println!("Logs #{} at {}", snapshot.tick, snapshot.fetched_at.to_rfc3339());
        for entry in &snapshot.docker {
          println!("  $ {}\n{}", entry.command, entry.output);
        }
        for entry in &snapshot.context {
          println!("  [{}] {} => {}", entry.play, entry.command, entry.result);
        }
      }
      let ticks = window.finished().await;
      info!(ticks, "log polling finished");
    }
  } else {
    coordinator.stop_polling();
  }
}
