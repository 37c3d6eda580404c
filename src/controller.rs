//! Event-loop wiring between the presentation layer, the state machine and
//! the document engine.
//!
//! ## Data Flow
//!
//! ```text
//! UiEvent ──▶ IntakeMachine ──▶ WorkflowState ──▶ watch channel ──▶ renderer
//!                  │ Effect::StartLoad                ▲
//!                  ▼                                  │
//!            DocumentEngine (spawned, with timeout) ──┘ LoadCompleted / LoadTimedOut
//! ```
//!
//! The controller owns the machine outright. The presentation layer gets
//! snapshots through [`IntakeController::subscribe`] and talks back only by
//! sending [`UiEvent`]s, so there is no shared mutable state.
//!
//! Engine loads run as spawned tasks. Each task reports exactly once: the
//! result, a timeout, or (if the engine panicked) an internal error. Events
//! are applied one at a time on the controller's task, so a completion can
//! never interleave with a half-applied selection.
//!
//! `dispatch` spawns tasks and must therefore be called from inside a tokio
//! runtime.

use crate::config::IntakeConfig;
use crate::engine::DocumentEngine;
use crate::error::EngineError;
use crate::file::CandidateFile;
use crate::machine::{Effect, IntakeEvent, IntakeMachine, Outcome, UiEvent};
use crate::observer::{NoopObserver, SharedObserver};
use crate::state::{LoadTicket, Phase, WorkflowState};
use crate::view::ViewModel;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

/// Drives an [`IntakeMachine`] against a [`DocumentEngine`].
pub struct IntakeController {
    machine: IntakeMachine,
    engine: Arc<dyn DocumentEngine>,
    observer: SharedObserver,
    state_tx: watch::Sender<WorkflowState>,
    completions_tx: mpsc::UnboundedSender<IntakeEvent>,
    completions_rx: mpsc::UnboundedReceiver<IntakeEvent>,
}

impl IntakeController {
    pub fn new(engine: Arc<dyn DocumentEngine>, config: IntakeConfig) -> Self {
        let machine = IntakeMachine::new(config);
        let (state_tx, _) = watch::channel(machine.state().clone());
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            machine,
            engine,
            observer: Arc::new(NoopObserver),
            state_tx,
            completions_tx,
            completions_rx,
        }
    }

    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Current state.
    pub fn state(&self) -> &WorkflowState {
        self.machine.state()
    }

    pub fn config(&self) -> &IntakeConfig {
        self.machine.config()
    }

    /// Presentation projection of the current state.
    pub fn view(&self) -> ViewModel {
        ViewModel::project(self.machine.state(), self.machine.config())
    }

    /// A receiver that always holds the latest state snapshot.
    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.state_tx.subscribe()
    }

    /// Latest state as a stream, starting with the current snapshot.
    pub fn updates(&self) -> WatchStream<WorkflowState> {
        WatchStream::new(self.state_tx.subscribe())
    }

    /// Apply one presentation event.
    pub fn dispatch(&mut self, event: UiEvent) -> Outcome {
        let selected = match &event {
            UiEvent::FileSelected(Some(file)) => Some(file.name.clone()),
            _ => None,
        };
        let outcome = self.apply(event.into());
        if let (Outcome::Ignored, Some(name)) = (&outcome, selected) {
            self.observer.on_selection_ignored(&name);
        }
        outcome
    }

    /// Apply engine completions until no load is in flight.
    pub async fn settle(&mut self) -> &WorkflowState {
        while self.machine.state().is_loading() {
            match self.completions_rx.recv().await {
                Some(event) => {
                    self.apply(event);
                }
                None => break,
            }
        }
        self.machine.state()
    }

    /// Run the event loop until `ui_events` closes and nothing is in flight.
    ///
    /// Returns the final state.
    pub async fn run(mut self, mut ui_events: mpsc::Receiver<UiEvent>) -> WorkflowState {
        let mut ui_open = true;
        loop {
            if !ui_open && !self.machine.state().is_loading() {
                break;
            }
            tokio::select! {
                event = ui_events.recv(), if ui_open => match event {
                    Some(event) => {
                        self.dispatch(event);
                    }
                    None => {
                        debug!("UI event channel closed");
                        ui_open = false;
                    }
                },
                Some(event) = self.completions_rx.recv() => {
                    self.apply(event);
                }
            }
        }
        self.machine.state().clone()
    }

    fn apply(&mut self, event: IntakeEvent) -> Outcome {
        let outcome = self.machine.handle(event);
        let (transitions, effect) = match &outcome {
            Outcome::Applied {
                transitions,
                effect,
            } => (transitions.clone(), effect.clone()),
            _ => return outcome,
        };

        for t in &transitions {
            self.observer.on_phase_change(t.from, t.to);
        }

        let state = self.machine.state();
        match transitions.last().map(|t| t.to) {
            Some(Phase::Failed) => {
                if let Some(message) = &state.error_message {
                    self.observer.on_error(message);
                }
            }
            Some(Phase::Ready) => {
                if let Some(document) = &state.document {
                    self.observer.on_load_complete(document);
                }
            }
            _ => {}
        }

        if let Some(Effect::StartLoad { ticket, file }) = effect {
            self.start_load(ticket, file);
        }

        self.state_tx.send_replace(self.machine.state().clone());
        outcome
    }

    fn start_load(&self, ticket: LoadTicket, file: CandidateFile) {
        info!(
            "Loading {} with {} engine (load {})",
            file.name,
            self.engine.name(),
            ticket
        );
        self.observer.on_load_start(&file.name, file.size_bytes);

        let load = AssertUnwindSafe(self.engine.load(file))
            .catch_unwind()
            .map(|caught| match caught {
                Ok(result) => result,
                Err(_) => Err(EngineError::Internal("engine panicked".into())),
            });
        let limit = self.machine.config().load_timeout;
        let tx = self.completions_tx.clone();

        tokio::spawn(async move {
            let event = match limit {
                Some(limit) => match tokio::time::timeout(limit, load).await {
                    Ok(result) => IntakeEvent::LoadCompleted { ticket, result },
                    Err(_) => IntakeEvent::LoadTimedOut {
                        ticket,
                        after: limit,
                    },
                },
                None => IntakeEvent::LoadCompleted {
                    ticket,
                    result: load.await,
                },
            };
            if tx.send(event).is_err() {
                warn!("Controller dropped before load {} finished", ticket);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{DocumentHandle, HeaderCheckEngine, LoadFuture, PlaceholderEngine};
    use std::time::Duration;

    struct PanickingEngine;

    impl DocumentEngine for PanickingEngine {
        fn name(&self) -> &str {
            "panicking"
        }

        fn load(&self, _file: CandidateFile) -> LoadFuture {
            explode().boxed()
        }
    }

    async fn explode() -> Result<DocumentHandle, EngineError> {
        panic!("engine bug")
    }

    fn controller() -> IntakeController {
        IntakeController::new(Arc::new(PlaceholderEngine), IntakeConfig::default())
    }

    #[tokio::test]
    async fn dispatch_then_settle_reaches_ready() {
        let mut c = controller();
        let out = c.dispatch(UiEvent::FileSelected(Some(CandidateFile::new(
            "a.pdf",
            "application/pdf",
            1000,
        ))));
        assert!(out.is_applied());
        assert_eq!(c.state().phase, Phase::Loading);
        assert!(!c.view().upload.enabled);

        let state = c.settle().await;
        assert_eq!(state.phase, Phase::Ready);
        assert_eq!(
            state.success_message.as_deref(),
            Some("Successfully loaded a.pdf")
        );
    }

    #[tokio::test]
    async fn subscribers_see_latest_state() {
        let mut c = controller();
        let rx = c.subscribe();
        let png = CandidateFile::new("a.png", "image/png", 1);
        c.dispatch(UiEvent::FileSelected(Some(png)));
        assert_eq!(rx.borrow().phase, Phase::Failed);
        assert_eq!(
            rx.borrow().error_message.as_deref(),
            Some("Please upload a valid PDF file.")
        );
    }

    #[tokio::test]
    async fn engine_panic_becomes_failure() {
        let mut c = IntakeController::new(Arc::new(PanickingEngine), IntakeConfig::default());
        c.dispatch(UiEvent::FileSelected(Some(CandidateFile::new(
            "a.pdf",
            "application/pdf",
            1,
        ))));
        let state = c.settle().await;
        assert_eq!(state.phase, Phase::Failed);
        assert_eq!(
            state.error_message.as_deref(),
            Some("Could not load a.pdf: internal engine error: engine panicked")
        );
    }

    #[tokio::test]
    async fn run_processes_events_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("real.pdf");
        std::fs::write(&path, b"%PDF-1.5\n").unwrap();

        let c = IntakeController::new(
            Arc::new(HeaderCheckEngine),
            IntakeConfig::builder()
                .load_timeout(Duration::from_secs(5))
                .build()
                .unwrap(),
        );
        let (tx, rx) = mpsc::channel(8);
        let file = CandidateFile::from_path(&path).unwrap();
        tx.send(UiEvent::FileSelected(Some(file))).await.unwrap();
        drop(tx);

        let state = c.run(rx).await;
        assert_eq!(state.phase, Phase::Ready);
        assert_eq!(
            state.document.and_then(|d| d.pdf_version).as_deref(),
            Some("1.5")
        );
    }
}
