//! Runtime for driving a session
//!
//! One controller task owns the `SessionState`. User intents and gateway
//! outcomes arrive on the same channel and are handled strictly one at a
//! time, so there is a single writer and no locking.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::SessionController;

use crate::gateway::RequestGateway;
use crate::source::DocumentFile;
use crate::state_machine::{Event, SessionView};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};

const EVENT_BUFFER: usize = 32;
const UPDATE_BUFFER: usize = 64;

/// Updates sent to the presentation layer
#[derive(Debug, Clone)]
pub enum SessionUpdate {
    /// State changed; carries the freshly derived view
    View(SessionView),
    /// An intent was refused (wrong document kind, busy, no source)
    Notice { message: String },
}

/// The controller task is gone and can no longer accept intents
#[derive(Debug, Error)]
#[error("session controller has stopped")]
pub struct SessionClosed;

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    session_id: String,
    event_tx: mpsc::Sender<Event>,
    update_tx: broadcast::Sender<SessionUpdate>,
    view_rx: watch::Receiver<SessionView>,
}

impl SessionHandle {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Stream of updates from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SessionUpdate> {
        self.update_tx.subscribe()
    }

    /// Latest published view
    pub fn view(&self) -> SessionView {
        self.view_rx.borrow().clone()
    }

    /// Receiver that always holds the latest view
    pub fn watch(&self) -> watch::Receiver<SessionView> {
        self.view_rx.clone()
    }

    pub async fn attach_document(&self, file: DocumentFile) -> Result<(), SessionClosed> {
        self.send(Event::SubmitDocument { file }).await
    }

    pub async fn attach_video(&self, url: impl Into<String>) -> Result<(), SessionClosed> {
        self.send(Event::SubmitVideo { url: url.into() }).await
    }

    pub async fn ask(&self, question: impl Into<String>) -> Result<(), SessionClosed> {
        self.send(Event::SendQuestion {
            text: question.into(),
        })
        .await
    }

    pub async fn clear(&self) -> Result<(), SessionClosed> {
        self.send(Event::ClearSource).await
    }

    async fn send(&self, event: Event) -> Result<(), SessionClosed> {
        self.event_tx.send(event).await.map_err(|_| SessionClosed)
    }
}

/// Start a controller for a fresh session on the current tokio runtime.
///
/// The controller stops once every handle is dropped and no gateway call is
/// still outstanding.
pub fn spawn_session<G>(gateway: G) -> SessionHandle
where
    G: RequestGateway + 'static,
{
    let session_id = uuid::Uuid::new_v4().to_string();
    let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
    let (update_tx, _) = broadcast::channel(UPDATE_BUFFER);
    let (view_tx, view_rx) = watch::channel(SessionView::default());

    let controller = SessionController::new(
        session_id.clone(),
        gateway,
        event_rx,
        &event_tx,
        update_tx.clone(),
        view_tx,
    );
    tokio::spawn(controller.run());

    SessionHandle {
        session_id,
        event_tx,
        update_tx,
        view_rx,
    }
}
