//! Runner side of the request protocol.

use std::sync::Arc;

use encounter_core::error::EncounterError;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::info;

use crate::domain::request::{Completion, EncounterRequest};
use crate::domain::status::{RequestPhase, WalkState, WalkStatus};

/// Emits requests to the content layer and tracks the halted phase.
#[derive(Debug)]
pub struct RequestChannel {
    sender: mpsc::UnboundedSender<EncounterRequest>,
    status: Arc<watch::Sender<WalkStatus>>,
}

impl RequestChannel {
    pub(crate) fn new(
        sender: mpsc::UnboundedSender<EncounterRequest>,
        status: Arc<watch::Sender<WalkStatus>>,
    ) -> Self {
        Self { sender, status }
    }

    fn set_state(&self, state: WalkState) {
        self.status.send_modify(|status| status.state = state);
    }

    /// Sends a non-halting request.
    ///
    /// # Errors
    ///
    /// Returns `EncounterError::ResolutionFailure` if the content layer has
    /// gone away.
    pub fn present(&self, request: EncounterRequest) -> Result<(), EncounterError> {
        self.sender
            .send(request)
            .map_err(|_| EncounterError::ResolutionFailure("content layer disconnected".into()))
    }

    /// Sends a halting request built around a fresh completion and suspends
    /// until the content layer resolves it.
    ///
    /// On success the walk is left in `PrepareComplete`; the runner moves it
    /// back to `Walking` at the next activation.
    ///
    /// # Errors
    ///
    /// Returns `EncounterError::ResolutionFailure` if the request cannot be
    /// delivered or its completion is dropped unresolved.
    pub async fn halt<T: Send>(
        &self,
        build: impl FnOnce(Completion<T>) -> EncounterRequest,
    ) -> Result<T, EncounterError> {
        let (tx, rx) = oneshot::channel();
        let request = build(Completion::new(tx, Arc::clone(&self.status)));
        info!(node_id = %request.node_id(), kind = request.kind(), "walk halted on request");

        self.set_state(WalkState::Halted(RequestPhase::Request));
        if self.sender.send(request).is_err() {
            self.set_state(WalkState::Walking);
            return Err(EncounterError::ResolutionFailure(
                "content layer disconnected".into(),
            ));
        }

        match rx.await {
            Ok(value) => {
                self.set_state(WalkState::Halted(RequestPhase::PrepareComplete));
                Ok(value)
            }
            Err(_) => {
                self.set_state(WalkState::Walking);
                Err(EncounterError::ResolutionFailure(
                    "request dropped without completion".into(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use encounter_content::domain::node::LogId;

    use super::*;
    use crate::domain::request::{DialogOutcome, DialogRequest, TextRequest};

    fn channel() -> (
        RequestChannel,
        mpsc::UnboundedReceiver<EncounterRequest>,
        watch::Receiver<WalkStatus>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (status, observer) = watch::channel(WalkStatus::idle());
        (RequestChannel::new(tx, Arc::new(status)), rx, observer)
    }

    fn text() -> EncounterRequest {
        EncounterRequest::Text(TextRequest {
            node_id: LogId::new("intro"),
            title: String::new(),
            message: "Static on every band.".to_owned(),
            display_seconds: 1.0,
        })
    }

    fn dialog(completion: Completion<DialogOutcome>) -> EncounterRequest {
        EncounterRequest::Dialog(DialogRequest {
            node_id: LogId::new("hail"),
            edge_id: "d1".to_owned(),
            title: "Incoming".to_owned(),
            message: "Respond?".to_owned(),
            completion,
        })
    }

    #[test]
    fn test_present_delivers_without_halting() {
        // Arrange
        let (channel, mut rx, observer) = channel();

        // Act
        channel.present(text()).unwrap();

        // Assert
        assert_eq!(rx.try_recv().unwrap().kind(), "text");
        assert!(rx.try_recv().is_err());
        assert_eq!(observer.borrow().state, WalkState::Idle);
    }

    #[tokio::test]
    async fn test_halt_moves_through_request_handle_and_prepare_complete() {
        // Arrange
        let (channel, mut rx, observer) = channel();
        let watcher = observer.clone();
        let content = tokio::spawn(async move {
            let Some(EncounterRequest::Dialog(request)) = rx.recv().await else {
                panic!("expected a dialog request");
            };
            let mut phases = vec![watcher.borrow().state];
            request.completion.mark_handling();
            phases.push(watcher.borrow().state);
            request.completion.complete(DialogOutcome::Failure).unwrap();
            phases
        });

        // Act
        let outcome = channel.halt(dialog).await.unwrap();
        let phases = content.await.unwrap();

        // Assert
        assert_eq!(outcome, DialogOutcome::Failure);
        assert_eq!(
            phases,
            vec![
                WalkState::Halted(RequestPhase::Request),
                WalkState::Halted(RequestPhase::Handle),
            ]
        );
        assert_eq!(
            observer.borrow().state,
            WalkState::Halted(RequestPhase::PrepareComplete)
        );
    }

    #[tokio::test]
    async fn test_dropped_completion_fails_and_resumes_walking() {
        // Arrange
        let (channel, mut rx, observer) = channel();
        let content = tokio::spawn(async move {
            let request = rx.recv().await;
            drop(request);
        });

        // Act
        let result = channel.halt(dialog).await;
        content.await.unwrap();

        // Assert
        assert!(matches!(result, Err(EncounterError::ResolutionFailure(_))));
        assert_eq!(observer.borrow().state, WalkState::Walking);
    }

    #[tokio::test]
    async fn test_closed_content_layer_fails_both_request_kinds() {
        // Arrange
        let (channel, rx, observer) = channel();
        drop(rx);

        // Act
        let halted = channel.halt(dialog).await;
        let presented = channel.present(text());

        // Assert
        assert!(matches!(halted, Err(EncounterError::ResolutionFailure(_))));
        assert!(matches!(presented, Err(EncounterError::ResolutionFailure(_))));
        assert_eq!(observer.borrow().state, WalkState::Walking);
    }
}
