//! `geochat run`: the long-lived chat host.
//!
//! Commands arrive as JSON lines on stdin and are queued onto a single
//! channel, so the dispatcher handles them one at a time in arrival order.
//! Every controller event is printed to stdout and, unless disabled, stored
//! in the history database.

use std::future::Future;
use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use geochat_core::chat::{CommandDispatcher, Dispatch};
use geochat_core::event::{EventBus, EventSink};
use geochat_core::transport::ChatTransport;
use geochat_infra::config::{apply_overrides, load_chat_config};
use geochat_infra::keepalive::LogKeepAlive;
use geochat_infra::sqlite::message::{SqliteMessageStore, spawn_recorder};
use geochat_infra::sqlite::pool::DatabasePool;
use geochat_infra::transport::WsTransport;
use geochat_infra::watcher::start_config_watcher;
use geochat_types::command::RawCommand;
use geochat_types::config::ChatConfig;
use geochat_types::event::ChatEvent;

use super::output::{event_json, render_event};
use crate::state::AppPaths;

const EVENT_BUS_CAPACITY: usize = 256;
const COMMAND_QUEUE_CAPACITY: usize = 64;
/// How long the printer and recorder get to drain after the host stops.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Options for [`run_host`], gathered from the command line.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub name: Option<String>,
    pub server: Option<String>,
    pub watch: bool,
    pub record_history: bool,
    pub json: bool,
}

impl RunOptions {
    fn apply(&self, config: ChatConfig) -> ChatConfig {
        apply_overrides(config, self.name.as_deref(), self.server.as_deref())
    }
}

/// Serve commands until the participant leaves, stdin closes, or the process
/// is asked to stop.
pub async fn run_host(paths: &AppPaths, options: RunOptions) -> anyhow::Result<()> {
    let config = options.apply(load_chat_config(&paths.config_path).await);
    info!(
        user_name = %config.user_name,
        server_uri = config.server_uri.as_deref().unwrap_or(""),
        message_limit = config.message_limit,
        "starting chat host"
    );

    let bus = EventBus::new(EVENT_BUS_CAPACITY);
    let printer = spawn_printer(bus.subscribe(), options.json);

    let recorder = if options.record_history {
        tokio::fs::create_dir_all(&paths.data_dir)
            .await
            .with_context(|| format!("failed to create {}", paths.data_dir.display()))?;
        let pool = DatabasePool::new(&paths.database_url())
            .await
            .context("failed to open the history database")?;
        Some(spawn_recorder(
            Arc::new(SqliteMessageStore::new(pool)),
            bus.subscribe(),
        ))
    } else {
        None
    };

    // The handle must outlive the loop; dropping it stops the watch.
    let (_watcher, mut reloads) = if options.watch {
        match start_config_watcher(&paths.config_path, None) {
            Ok((handle, rx)) => (Some(handle), Some(rx)),
            Err(err) => {
                warn!(error = %err, "config reload disabled");
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    let (tx, mut commands) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
    spawn_stdin_reader(tx);

    let keep_alive = Arc::new(LogKeepAlive::new("geochat-host"));
    let mut dispatcher = CommandDispatcher::new(
        WsTransport::new(bus.clone()),
        bus.clone(),
        config,
        keep_alive,
    );

    let exit = serve_commands(
        &mut dispatcher,
        &mut commands,
        &mut reloads,
        &options,
        shutdown_signal(),
    )
    .await;
    info!(?exit, "chat host stopped");
    drop(dispatcher);
    drop(bus);

    if let Some(recorder) = recorder {
        if tokio::time::timeout(DRAIN_TIMEOUT, recorder).await.is_err() {
            warn!("history recorder did not finish in time");
        }
    }
    let _ = tokio::time::timeout(DRAIN_TIMEOUT, printer).await;

    Ok(())
}

/// Why the host stopped serving commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostExit {
    /// The participant left the chat.
    Left,
    /// Command input reached end of file.
    InputClosed,
    /// Ctrl+C or SIGTERM.
    Signal,
}

/// Feed queued commands to `dispatcher` one at a time, applying config
/// reloads in between, until the participant leaves, input ends, or
/// `shutdown` resolves. The dispatcher is shut down before returning.
pub async fn serve_commands<T, S, F>(
    dispatcher: &mut CommandDispatcher<T, S>,
    commands: &mut mpsc::Receiver<RawCommand>,
    reloads: &mut Option<mpsc::Receiver<ChatConfig>>,
    options: &RunOptions,
    shutdown: F,
) -> HostExit
where
    T: ChatTransport,
    S: EventSink,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let exit = loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(raw) => {
                    if dispatcher.dispatch_raw(raw).await == Dispatch::Stop {
                        info!("participant left, stopping host");
                        break HostExit::Left;
                    }
                }
                None => {
                    debug!("command input closed");
                    break HostExit::InputClosed;
                }
            },
            Some(config) = next_reload(reloads) => {
                dispatcher.reload_config(options.apply(config));
            }
            () = &mut shutdown => {
                info!("shutdown signal received");
                break HostExit::Signal;
            }
        }
    };

    dispatcher.shutdown().await;
    exit
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command_line(line: &str) -> Option<Result<RawCommand, serde_json::Error>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(serde_json::from_str(line))
}

/// Read commands from `input` and queue them on `tx` until input ends or the
/// host stops listening.
pub fn read_commands<R: BufRead>(input: R, tx: &mpsc::Sender<RawCommand>) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!(error = %err, "failed to read command input");
                break;
            }
        };
        match parse_command_line(&line) {
            None => continue,
            Some(Ok(command)) => {
                if tx.blocking_send(command).is_err() {
                    break;
                }
            }
            Some(Err(err)) => warn!(error = %err, "ignoring unparseable command line"),
        }
    }
}

/// Blocking stdin reads live on their own thread so they never hold up
/// runtime shutdown.
fn spawn_stdin_reader(tx: mpsc::Sender<RawCommand>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        read_commands(stdin.lock(), &tx);
    });
}

fn spawn_printer(mut events: broadcast::Receiver<ChatEvent>, json: bool) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => print_event(&event, json),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event printer lagged behind the event bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

fn print_event(event: &ChatEvent, json: bool) {
    if json {
        match event_json(event) {
            Ok(line) => println!("{line}"),
            Err(err) => warn!(error = %err, kind = event.kind(), "failed to serialize event"),
        }
    } else {
        println!("{}", render_event(event));
    }
}

async fn next_reload(reloads: &mut Option<mpsc::Receiver<ChatConfig>>) -> Option<ChatConfig> {
    match reloads {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
