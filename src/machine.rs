//! The intake state machine.
//!
//! [`IntakeMachine`] is the only code that mutates [`WorkflowState`]. It is
//! synchronous and runs every event to completion: `handle` takes one event,
//! applies every resulting transition, and returns an [`Outcome`] describing
//! what happened plus an optional [`Effect`] for the caller to perform.
//!
//! The machine never awaits anything itself. Loading is requested through
//! `Effect::StartLoad`, and the result comes back later as a
//! `LoadCompleted` (or `LoadTimedOut`) event carrying the same
//! [`LoadTicket`]. Between the two the machine sits in `Loading` and refuses
//! new selections, so at most one file is ever in flight.

use crate::config::IntakeConfig;
use crate::engine::DocumentHandle;
use crate::error::{EngineError, IntakeError};
use crate::file::CandidateFile;
use crate::state::{InFlight, LoadTicket, Phase, WorkflowState};
use crate::validate::{validate_with, ValidationResult};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Events the presentation layer may send.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// The file picker changed; `None` when the user picked nothing.
    FileSelected(Option<CandidateFile>),
    DismissError,
    DismissSuccess,
}

/// Every event the machine understands.
#[derive(Debug, Clone, PartialEq)]
pub enum IntakeEvent {
    Ui(UiEvent),
    /// The engine finished loading the upload identified by `ticket`.
    LoadCompleted {
        ticket: LoadTicket,
        result: Result<DocumentHandle, EngineError>,
    },
    /// The upload identified by `ticket` exceeded the load timeout.
    LoadTimedOut {
        ticket: LoadTicket,
        after: Duration,
    },
}

impl From<UiEvent> for IntakeEvent {
    fn from(e: UiEvent) -> Self {
        IntakeEvent::Ui(e)
    }
}

/// Work the caller must perform after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Hand `file` to the document engine and report back with `ticket`.
    StartLoad {
        ticket: LoadTicket,
        file: CandidateFile,
    },
}

/// One phase change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
}

/// What handling an event did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing to act on: no file selected, or no message to dismiss.
    NoOp,
    /// The event was refused: the upload slot is held, or the completion
    /// belongs to an upload that is no longer in flight.
    Ignored,
    /// State changed. `transitions` is empty when only messages changed.
    Applied {
        transitions: Vec<Transition>,
        effect: Option<Effect>,
    },
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied { .. })
    }

    pub fn effect(&self) -> Option<&Effect> {
        match self {
            Outcome::Applied { effect, .. } => effect.as_ref(),
            _ => None,
        }
    }

    pub fn transitions(&self) -> &[Transition] {
        match self {
            Outcome::Applied { transitions, .. } => transitions,
            _ => &[],
        }
    }
}

/// The upload intake state machine.
#[derive(Debug, Clone)]
pub struct IntakeMachine {
    config: IntakeConfig,
    state: WorkflowState,
    next_ticket: u64,
}

impl Default for IntakeMachine {
    fn default() -> Self {
        Self::new(IntakeConfig::default())
    }
}

impl IntakeMachine {
    /// A machine in `Idle` with no messages.
    pub fn new(config: IntakeConfig) -> Self {
        Self {
            config,
            state: WorkflowState::default(),
            next_ticket: 1,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn config(&self) -> &IntakeConfig {
        &self.config
    }

    /// Apply one event to completion.
    pub fn handle(&mut self, event: impl Into<IntakeEvent>) -> Outcome {
        match event.into() {
            IntakeEvent::Ui(UiEvent::FileSelected(None)) => {
                debug!("File selection cleared; nothing to do");
                Outcome::NoOp
            }
            IntakeEvent::Ui(UiEvent::FileSelected(Some(file))) => self.select(file),
            IntakeEvent::Ui(UiEvent::DismissError) => match self.state.error_message.take() {
                Some(_) => Outcome::Applied {
                    transitions: Vec::new(),
                    effect: None,
                },
                None => Outcome::NoOp,
            },
            IntakeEvent::Ui(UiEvent::DismissSuccess) => match self.state.success_message.take() {
                Some(_) => Outcome::Applied {
                    transitions: Vec::new(),
                    effect: None,
                },
                None => Outcome::NoOp,
            },
            IntakeEvent::LoadCompleted { ticket, result } => self.complete(ticket, result),
            IntakeEvent::LoadTimedOut { ticket, after } => {
                let Some(name) = self.take_in_flight(ticket) else {
                    return Outcome::Ignored;
                };
                warn!("Load of {} timed out after {:?}", name, after);
                let message = IntakeError::LoadTimeout { after }.to_string();
                self.fail(message)
            }
        }
    }

    fn select(&mut self, file: CandidateFile) -> Outcome {
        if !self.state.phase.accepts_selection() {
            debug!(
                "Ignoring selection of {} while {}",
                file.name, self.state.phase
            );
            return Outcome::Ignored;
        }

        let mut transitions = vec![self.enter(Phase::Validating)];
        self.state.error_message = None;
        self.state.success_message = None;

        match validate_with(&file, &self.config) {
            ValidationResult::Rejected(reason) => {
                info!("Rejected {}: {:?}", file.name, reason);
                self.state.error_message = Some(reason.user_message());
                transitions.push(self.enter(Phase::Failed));
                Outcome::Applied {
                    transitions,
                    effect: None,
                }
            }
            ValidationResult::Accepted => {
                let ticket = LoadTicket(self.next_ticket);
                self.next_ticket += 1;
                info!(
                    "Accepted {} ({} bytes), load {}",
                    file.name, file.size_bytes, ticket
                );

                self.state.document = None;
                self.state.in_flight = Some(InFlight {
                    ticket,
                    name: file.name.clone(),
                });
                transitions.push(self.enter(Phase::Loading));
                Outcome::Applied {
                    transitions,
                    effect: Some(Effect::StartLoad { ticket, file }),
                }
            }
        }
    }

    fn complete(
        &mut self,
        ticket: LoadTicket,
        result: Result<DocumentHandle, EngineError>,
    ) -> Outcome {
        let Some(name) = self.take_in_flight(ticket) else {
            return Outcome::Ignored;
        };

        match result {
            Ok(document) => {
                info!("Loaded {}", name);
                self.state.success_message = Some(format!("Successfully loaded {name}"));
                self.state.document = Some(document);
                Outcome::Applied {
                    transitions: vec![self.enter(Phase::Ready)],
                    effect: None,
                }
            }
            Err(source) => {
                warn!("Engine failed to load {}: {}", name, source);
                let message = IntakeError::Engine { name, source }.to_string();
                self.fail(message)
            }
        }
    }

    /// Release the upload slot if `ticket` holds it.
    fn take_in_flight(&mut self, ticket: LoadTicket) -> Option<String> {
        let held = self.state.phase == Phase::Loading
            && self.state.in_flight.as_ref().map(|f| f.ticket) == Some(ticket);
        if !held {
            debug!("Ignoring stale completion for load {}", ticket);
            return None;
        }
        self.state.in_flight.take().map(|f| f.name)
    }

    fn fail(&mut self, message: String) -> Outcome {
        self.state.error_message = Some(message);
        Outcome::Applied {
            transitions: vec![self.enter(Phase::Failed)],
            effect: None,
        }
    }

    fn enter(&mut self, to: Phase) -> Transition {
        let from = std::mem::replace(&mut self.state.phase, to);
        debug!("Phase {} -> {}", from, to);
        Transition { from, to }
    }
}
