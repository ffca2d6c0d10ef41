//! Live client attachment to a container's stdio streams.
//!
//! One session spawns an independent relay task per stdio direction:
//! client input into the process's stdin pipe, process stdout/stderr out
//! to the client's sinks, and a discard drain for any output direction
//! the client did not ask for. Every spawned task reports exactly one
//! outcome into a bounded collection channel; the session is decided once
//! stdout and stderr have both reported, or at the first error. Teardown
//! releases the session's pipe ends, which any still-blocked relay
//! observes as a closed pipe and treats as normal termination.

mod copier;
mod drain;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use gantry_shared::constants::attach::DETACH_SEQUENCE;
use gantry_shared::{Direction, GantryError, GantryResult};

use crate::container::{ByteSink, ByteSource, ContainerProcess};
use crate::logs::{self, LogStore};

/// One attach request, created per call and discarded with its outcome.
///
/// A `Some` endpoint requests that direction; `stdout`/`stderr` left as
/// `None` are still drained so the process never blocks on them.
#[derive(Default)]
pub struct AttachRequest {
    /// Replay captured logs before any live streaming.
    pub logs: bool,

    /// Relay live process output after any replay.
    pub stream: bool,

    /// Client source for process stdin.
    pub stdin: Option<ByteSource>,

    /// Client sink for process stdout.
    pub stdout: Option<ByteSink>,

    /// Client sink for process stderr.
    pub stderr: Option<ByteSink>,
}

/// Handle one attach request against a running container.
///
/// When `logs` is set, captured output is replayed to completion first
/// (best-effort). When `stream` is set, a live session runs next and its
/// aggregated outcome becomes the call's result. For stdin-once non-TTY
/// containers the call then blocks, unbounded, until the process exits:
/// relay teardown in that mode says nothing about the process being done.
pub async fn attach(
    container: &ContainerProcess,
    store: &LogStore,
    request: AttachRequest,
) -> GantryResult<()> {
    let AttachRequest {
        logs: replay_logs,
        stream,
        stdin,
        mut stdout,
        mut stderr,
    } = request;

    if replay_logs {
        logs::replay(store, stdout.as_mut(), stderr.as_mut()).await;
    }

    if stream {
        let config = *container.config();
        AttachSession::new(container).run(stdin, stdout, stderr).await?;

        if config.stdin_once && !config.tty {
            container.wait_for_exit(None).await?;
        }
    }

    Ok(())
}

/// Terminal report of one relay or drain.
///
/// Each spawned unit produces exactly one, even on abnormal termination;
/// no unit ends silently.
struct RelayOutcome {
    direction: Direction,
    error: Option<GantryError>,
}

/// Completion rule for one session.
///
/// The session is decided once stdout and stderr have both reported;
/// stdin reporting (or never reporting) has no bearing. The first
/// outcome carrying an error short-circuits the decision.
#[derive(Default)]
struct Aggregator {
    stdout_done: bool,
    stderr_done: bool,
}

impl Aggregator {
    /// Observe one outcome; returns the session result once decided.
    fn observe(&mut self, outcome: RelayOutcome) -> Option<GantryResult<()>> {
        match outcome.direction {
            Direction::Stdout => self.stdout_done = true,
            Direction::Stderr => self.stderr_done = true,
            Direction::Stdin => {}
        }

        if let Some(err) = outcome.error {
            return Some(Err(err));
        }
        if self.stdout_done && self.stderr_done {
            return Some(Ok(()));
        }
        None
    }
}

/// One live attach session over a container's stream pipes.
///
/// The session exclusively holds whichever pipe endpoints it takes for
/// its whole lifetime; a second session on the same direction fails with
/// [`GantryError::StreamUnavailable`] until the container is restarted.
pub struct AttachSession<'a> {
    container: &'a ContainerProcess,
    shutdown: CancellationToken,
}

impl<'a> AttachSession<'a> {
    pub fn new(container: &'a ContainerProcess) -> Self {
        Self {
            container,
            shutdown: CancellationToken::new(),
        }
    }

    /// Establish relays for every mandatory and requested direction and
    /// wait for the aggregated outcome.
    ///
    /// Delivered exactly once; the session is consumed.
    pub async fn run(
        self,
        stdin: Option<ByteSource>,
        stdout: Option<ByteSink>,
        stderr: Option<ByteSink>,
    ) -> GantryResult<()> {
        let config = self.container.config();
        let pipes = self.container.streams();

        // One channel slot per unit that reports, so a late outcome can
        // neither block its task nor get lost before the decision.
        let units = 2 + usize::from(stdin.is_some() && config.open_stdin);
        let (tx, mut rx) = mpsc::channel::<RelayOutcome>(units);

        // stdin relays only when the client supplies input and the
        // process keeps its stdin open; otherwise the pipe sink stays
        // untouched.
        if let Some(source) = stdin {
            if config.open_stdin {
                self.spawn_stdin_relay(source, &tx);
            }
        }
        self.spawn_output_relay(Direction::Stdout, pipes.take_stdout(), stdout, &tx);
        self.spawn_output_relay(Direction::Stderr, pipes.take_stderr(), stderr, &tx);
        drop(tx);

        let mut aggregator = Aggregator::default();
        let result = loop {
            match rx.recv().await {
                Some(outcome) => {
                    eprintln!("DIAG recv outcome dir={:?} err={}", outcome.direction, outcome.error.is_some());
                    if let Some(result) = aggregator.observe(outcome) {
                        break result;
                    }
                }
                // Unreachable while the invariant holds that every unit
                // reports; kept as a hard failure rather than a hang.
                None => {
                    break Err(GantryError::Internal(
                        "attach relays ended without reporting".into(),
                    ));
                }
            }
        };

        // Teardown, on every exit path: release the session's pipe ends.
        // Relays still blocked on them observe the closed pipe and exit
        // without error; their outcomes land in channel capacity and are
        // dropped with it.
        self.shutdown.cancel();
        result
    }

    fn spawn_stdin_relay(&self, mut source: ByteSource, tx: &mpsc::Sender<RelayOutcome>) {
        let mut sink = match self.container.streams().take_stdin() {
            Ok(sink) => sink,
            Err(e) => {
                let _ = tx.try_send(RelayOutcome {
                    direction: Direction::Stdin,
                    error: Some(e),
                });
                return;
            }
        };

        let config = *self.container.config();
        let escape = config.tty.then_some(DETACH_SEQUENCE);
        let shutdown = self.shutdown.clone();
        let tx = tx.clone();
        let container = self.container.id().to_string();

        tokio::spawn(async move {
            debug!(target: "attach", container = %container, "stdin: begin");
            let copied = tokio::select! {
                _ = shutdown.cancelled() => Ok(0),
                res = copier::relay_bytes(&mut source, &mut sink, escape) => {
                    copier::suppress_closed_pipe(res)
                }
            };
            let error = match copied {
                Ok(_) => None,
                Err(e) => {
                    error!(target: "attach", container = %container, "stdin: {}", e);
                    Some(GantryError::Relay(format!("stdin: {}", e)))
                }
            };
            debug!(target: "attach", container = %container, "stdin: end");
            let _ = tx.try_send(RelayOutcome {
                direction: Direction::Stdin,
                error,
            });

            // Client input is over. In stdin-once non-TTY mode only the
            // stdin pipe closes (dropped with this task) and the process
            // may keep producing output; in every other mode a client
            // hangup ends the whole session.
            if !(config.stdin_once && !config.tty) {
                shutdown.cancel();
            }
        });
    }

    fn spawn_output_relay(
        &self,
        direction: Direction,
        source: GantryResult<ByteSource>,
        client: Option<ByteSink>,
        tx: &mpsc::Sender<RelayOutcome>,
    ) {
        let container = self.container.id().to_string();
        let mut source = match source {
            Ok(source) => source,
            Err(e) => {
                if client.is_some() {
                    // Requested direction without a pipe: the failure is
                    // the direction's outcome.
                    let _ = tx.try_send(RelayOutcome {
                        direction,
                        error: Some(e),
                    });
                } else {
                    // Nothing to drain; the direction is simply done.
                    warn!(target: "attach", container = %container, "{} drain: {}", direction, e);
                    let _ = tx.try_send(RelayOutcome {
                        direction,
                        error: None,
                    });
                }
                return;
            }
        };

        let shutdown = self.shutdown.clone();
        let tx = tx.clone();
        match client {
            Some(mut sink) => {
                tokio::spawn(async move {
                    debug!(target: "attach", container = %container, "{}: begin", direction);
                    let copied = tokio::select! {
                        _ = shutdown.cancelled() => Ok(0),
                        res = copier::relay_bytes(&mut source, &mut sink, None) => {
                            copier::suppress_closed_pipe(res)
                        }
                    };
                    let error = match copied {
                        Ok(_) => None,
                        Err(e) => {
                            error!(target: "attach", container = %container, "{}: {}", direction, e);
                            Some(GantryError::Relay(format!("{}: {}", direction, e)))
                        }
                    };
                    debug!(target: "attach", container = %container, "{}: end", direction);
                    let _ = tx.try_send(RelayOutcome { direction, error });
                });
            }
            None => {
                tokio::spawn(async move {
                    eprintln!("DIAG drain {:?} begin", direction);
                    // Mandatory drain: nobody reads this direction, but
                    // the process-side pipe still needs a consumer.
                    let drained = tokio::select! {
                        _ = shutdown.cancelled() => Ok(0),
                        res = drain::drain(&mut source) => copier::suppress_closed_pipe(res),
                    };
                    eprintln!("DIAG drain {:?} end {:?}", direction, drained.as_ref().map(|_| ()));
                    if let Err(e) = drained {
                        // Drain failures never fail the session; the
                        // direction still counts as done.
                        warn!(target: "attach", container = %container, "{} drain: {}", direction, e);
                    }
                    let _ = tx.try_send(RelayOutcome {
                        direction,
                        error: None,
                    });
                });
            }
        }
    }
}
