//! Session controller executor

use super::SessionUpdate;
use crate::gateway::RequestGateway;
use crate::state_machine::{
    transition, Effect, Event, OperationKind, SessionState, SessionView, TransitionError,
};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

/// Owns the session state and performs the effects the state machine asks for
pub struct SessionController<G>
where
    G: RequestGateway + 'static,
{
    session_id: String,
    state: SessionState,
    gateway: Arc<G>,
    event_rx: mpsc::Receiver<Event>,
    /// Weak so that dropping every handle lets the loop finish
    event_tx: mpsc::WeakSender<Event>,
    update_tx: broadcast::Sender<SessionUpdate>,
    view_tx: watch::Sender<SessionView>,
}

impl<G> SessionController<G>
where
    G: RequestGateway + 'static,
{
    pub fn new(
        session_id: String,
        gateway: G,
        event_rx: mpsc::Receiver<Event>,
        event_tx: &mpsc::Sender<Event>,
        update_tx: broadcast::Sender<SessionUpdate>,
        view_tx: watch::Sender<SessionView>,
    ) -> Self {
        Self {
            session_id,
            state: SessionState::new(),
            gateway: Arc::new(gateway),
            event_rx,
            event_tx: event_tx.downgrade(),
            update_tx,
            view_tx,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.session_id, "Starting session controller");

        while let Some(event) = self.event_rx.recv().await {
            // Refusals are reported to subscribers inside process_event
            let _ = self.process_event(event);
        }

        tracing::info!(session_id = %self.session_id, "Session controller stopped");
    }

    /// Apply one event: pure transition, then effects in order
    pub fn process_event(&mut self, event: Event) -> Result<(), TransitionError> {
        let event_name = event.name();

        let result = match transition(&self.state, event) {
            Ok(r) => r,
            Err(e) => {
                if e.is_user_facing() {
                    tracing::debug!(
                        session_id = %self.session_id,
                        event = event_name,
                        reason = %e,
                        "Intent refused"
                    );
                    let _ = self.update_tx.send(SessionUpdate::Notice {
                        message: e.to_string(),
                    });
                } else {
                    tracing::warn!(
                        session_id = %self.session_id,
                        event = event_name,
                        error = %e,
                        "Dropping event"
                    );
                }
                return Err(e);
            }
        };

        let previous_phase = self.state.phase();
        self.state = result.new_state;
        if previous_phase != self.state.phase() {
            tracing::info!(
                session_id = %self.session_id,
                from = ?previous_phase,
                to = ?self.state.phase(),
                event = event_name,
                "Phase changed"
            );
        }

        for effect in result.effects {
            self.execute_effect(effect);
        }

        Ok(())
    }

    fn execute_effect(&self, effect: Effect) {
        match effect {
            Effect::PublishView => {
                let view = self.state.view();
                self.view_tx.send_replace(view.clone());
                // No subscribers is fine
                let _ = self.update_tx.send(SessionUpdate::View(view));
            }

            Effect::UploadDocument { file } => {
                let gateway = Arc::clone(&self.gateway);
                self.spawn_call(OperationKind::AttachDocument, async move {
                    Event::document_outcome(gateway.submit_document(&file).await)
                });
            }

            Effect::LoadVideo { url } => {
                let gateway = Arc::clone(&self.gateway);
                self.spawn_call(OperationKind::AttachVideo, async move {
                    Event::video_outcome(gateway.submit_video(&url).await)
                });
            }

            Effect::Ask { question } => {
                let gateway = Arc::clone(&self.gateway);
                self.spawn_call(OperationKind::Ask, async move {
                    Event::answer_outcome(gateway.ask(&question).await)
                });
            }
        }
    }

    /// Run a gateway call in the background and feed its outcome back in
    fn spawn_call<F>(&self, operation: OperationKind, call: F)
    where
        F: Future<Output = Event> + Send + 'static,
    {
        let Some(event_tx) = self.event_tx.upgrade() else {
            tracing::warn!(
                session_id = %self.session_id,
                ?operation,
                "No handles left, skipping gateway call"
            );
            return;
        };
        let session_id = self.session_id.clone();

        tokio::spawn(async move {
            tracing::debug!(%session_id, ?operation, "Gateway call started (background)");
            let outcome = call.await;
            if event_tx.send(outcome).await.is_err() {
                tracing::debug!(%session_id, ?operation, "Controller gone before call resolved");
            }
        });
    }
}
