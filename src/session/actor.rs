// Single-owner session task: commands in over a channel, provider calls spawned out
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::{Result, SmartSearchError};
use crate::provider::{ProviderError, ProviderOutcome, SearchProvider};
use crate::session::{Resolution, SearchSession, SearchTicket, SessionSnapshot};

/// Notification emitted after the session handled a provider response or clear
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Presented {
        generation: u64,
        result_count: usize,
        error: bool,
    },
    StaleDiscarded {
        generation: u64,
    },
    Cleared,
}

impl From<Resolution> for SessionEvent {
    fn from(resolution: Resolution) -> Self {
        match resolution {
            Resolution::Presented {
                generation,
                result_count,
                error,
            } => SessionEvent::Presented {
                generation,
                result_count,
                error,
            },
            Resolution::Stale { generation, .. } => SessionEvent::StaleDiscarded { generation },
        }
    }
}

enum Command {
    Submit {
        query: String,
        reply: oneshot::Sender<SearchTicket>,
    },
    Clear,
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
}

/// Completed provider call routed back to the owning task
struct Resolved {
    generation: u64,
    outcome: ProviderOutcome,
}

/// Handle to a session running on its own task
///
/// The task is the only writer of session state. Provider calls run as
/// separate tasks and report back through a channel, so a slow call never
/// blocks newer submissions.
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Spawn the session task; returns the handle and the event stream
    pub fn spawn(
        session: SearchSession,
        provider: Arc<dyn SearchProvider>,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(session_worker(session, provider, commands_rx, events_tx));

        (
            Self {
                commands: commands_tx,
                task,
            },
            events_rx,
        )
    }

    /// Submit a query; the returned ticket carries its generation
    pub async fn submit(&self, query: impl Into<String>) -> Result<SearchTicket> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Submit {
            query: query.into(),
            reply,
        })?;
        rx.await
            .map_err(|_| SmartSearchError::Session("Session task dropped submit".to_string()))
    }

    /// Return the session to idle
    pub fn clear(&self) -> Result<()> {
        self.send(Command::Clear)
    }

    /// Current session state
    pub async fn snapshot(&self) -> Result<SessionSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { reply })?;
        rx.await
            .map_err(|_| SmartSearchError::Session("Session task dropped snapshot".to_string()))
    }

    /// Stop the session task and wait for it to finish
    pub async fn shutdown(self) {
        drop(self.commands);
        if let Err(e) = self.task.await {
            tracing::error!("Session task ended abnormally: {}", e);
        }
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| SmartSearchError::Session("Session task is not running".to_string()))
    }
}

async fn session_worker(
    mut session: SearchSession,
    provider: Arc<dyn SearchProvider>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<SessionEvent>,
) {
    let (resolved_tx, mut resolved_rx) = mpsc::unbounded_channel::<Resolved>();

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    break;
                };
                match command {
                    Command::Submit { query, reply } => {
                        let ticket = session.submit(&query);
                        spawn_search(provider.clone(), &ticket, resolved_tx.clone());
                        let _ = reply.send(ticket);
                    }
                    Command::Clear => {
                        session.clear();
                        let _ = events.send(SessionEvent::Cleared);
                    }
                    Command::Snapshot { reply } => {
                        let _ = reply.send(session.snapshot());
                    }
                }
            }

            Some(resolved) = resolved_rx.recv() => {
                let resolution = session.resolve(resolved.generation, resolved.outcome);
                let _ = events.send(resolution.into());
            }
        }
    }

    tracing::debug!("Session {} task finished", session.id());
}

fn spawn_search(
    provider: Arc<dyn SearchProvider>,
    ticket: &SearchTicket,
    resolved: mpsc::UnboundedSender<Resolved>,
) {
    let generation = ticket.generation;
    let clean_query = ticket.parsed.clean_query.clone();
    let filter = ticket.parsed.filter.clone();

    tokio::spawn(async move {
        // A panicking provider still resolves its generation, as a failure
        let call = tokio::spawn(async move { provider.search(&clean_query, &filter).await });
        let outcome = match call.await {
            Ok(result) => ProviderOutcome::from(result),
            Err(e) => {
                tracing::error!("Search provider task for generation {} failed: {}", generation, e);
                ProviderOutcome::Failed(ProviderError::Backend(format!(
                    "Search provider panicked: {}",
                    e
                )))
            }
        };
        // Receiver is gone only when the session task has stopped
        let _ = resolved.send(Resolved {
            generation,
            outcome,
        });
    });
}
