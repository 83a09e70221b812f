//! services/api/src/runtime.rs
//!
//! Drives a `SessionController` from a single tokio task.
//!
//! The controller is owned by one actor task and never shared, so the session
//! state needs no lock. Handlers talk to the actor through a channel of
//! `Command`s. Simulator delays become spawned timer tasks that post the event
//! back to the actor once they elapse.

use crate::error::ApiError;
use chat_core::{
    ConversationId, Intent, IntentOutcome, Message, ScheduledEvent, SessionController,
    SessionSnapshot, SimulatorEvent,
};
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// A request for the session actor.
#[derive(Debug)]
pub enum Command {
    /// Apply a user intent and report its outcome.
    Apply {
        intent: Intent,
        reply: oneshot::Sender<IntentOutcome>,
    },
    /// A simulator delay has elapsed.
    Fire(SimulatorEvent),
    /// Read any conversation's history; `None` when the conversation is unknown.
    History {
        conversation_id: ConversationId,
        reply: oneshot::Sender<Option<Vec<Message>>>,
    },
}

/// A cheap, cloneable handle onto the running session.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<SessionSnapshot>,
    shutdown: CancellationToken,
}

impl SessionHandle {
    /// Applies an intent. The returned outcome is only sent after the
    /// resulting snapshot has been published.
    pub async fn apply(&self, intent: Intent) -> Result<IntentOutcome, ApiError> {
        let (reply, outcome) = oneshot::channel();
        self.commands
            .send(Command::Apply { intent, reply })
            .map_err(|_| ApiError::SessionClosed)?;
        outcome.await.map_err(|_| ApiError::SessionClosed)
    }

    pub async fn history(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Option<Vec<Message>>, ApiError> {
        let (reply, history) = oneshot::channel();
        self.commands
            .send(Command::History {
                conversation_id,
                reply,
            })
            .map_err(|_| ApiError::SessionClosed)?;
        history.await.map_err(|_| ApiError::SessionClosed)
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver that wakes on every published change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Stops the actor and every pending simulator timer.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

/// Spawns the actor that owns `controller` and returns a handle onto it.
pub fn spawn_session(controller: SessionController) -> (SessionHandle, JoinHandle<()>) {
    let (commands, inbox) = mpsc::unbounded_channel();
    let (publisher, snapshots) = watch::channel(controller.snapshot());
    let shutdown = CancellationToken::new();

    let task = tokio::spawn(run_session(
        controller,
        inbox,
        commands.clone(),
        publisher,
        shutdown.clone(),
    ));

    let handle = SessionHandle {
        commands,
        snapshots,
        shutdown,
    };
    (handle, task)
}

async fn run_session(
    mut controller: SessionController,
    mut inbox: mpsc::UnboundedReceiver<Command>,
    timers: mpsc::UnboundedSender<Command>,
    publisher: watch::Sender<SessionSnapshot>,
    shutdown: CancellationToken,
) {
    info!("Session actor started.");

    loop {
        let command = tokio::select! {
            _ = shutdown.cancelled() => break,
            command = inbox.recv() => match command {
                Some(command) => command,
                None => break,
            },
        };

        match command {
            Command::Apply { intent, reply } => {
                debug!("Applying intent: {:?}", intent);
                let dispatch = controller.handle(intent);
                for scheduled in dispatch.scheduled {
                    schedule(scheduled, &timers, &shutdown);
                }
                publish(&publisher, &controller);
                let _ = reply.send(dispatch.outcome);
            }
            Command::Fire(event) => {
                debug!("Simulator event fired: {:?}", event);
                controller.fire(event);
                publish(&publisher, &controller);
            }
            Command::History {
                conversation_id,
                reply,
            } => {
                let history = controller
                    .registry()
                    .contains(conversation_id)
                    .then(|| controller.messages().messages(conversation_id).to_vec());
                let _ = reply.send(history);
            }
        }
    }

    info!("Session actor stopped.");
}

/// Posts the event back to the actor once its delay has elapsed.
/// Timers are never cancelled individually; only shutdown stops them.
fn schedule(
    scheduled: ScheduledEvent,
    timers: &mpsc::UnboundedSender<Command>,
    shutdown: &CancellationToken,
) {
    let timers = timers.clone();
    let shutdown = shutdown.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = shutdown.cancelled() => {}
            _ = tokio::time::sleep(scheduled.delay) => {
                let _ = timers.send(Command::Fire(scheduled.event));
            }
        }
    });
}

fn publish(publisher: &watch::Sender<SessionSnapshot>, controller: &SessionController) {
    let next = controller.snapshot();
    publisher.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            *current = next;
            true
        }
    });
}
