//! Presentation projection.
//!
//! [`ViewModel::project`] turns a [`WorkflowState`] into exactly what a
//! renderer needs: the upload control, at most one error and one success
//! alert, the loading indicator, and the workspace. No decisions happen in
//! the renderer; it draws the view model and sends back the `dismiss` events
//! attached to each alert.

use crate::config::IntakeConfig;
use crate::engine::DocumentHandle;
use crate::machine::UiEvent;
use crate::state::{Phase, WorkflowState};
use serde::Serialize;

/// Text of the loading indicator.
pub const LOADING_TEXT: &str = "Processing PDF...";

/// Text shown while no document is open.
pub const WORKSPACE_PLACEHOLDER: &str = "PDF Editor workspace will appear here";

/// The file-selection control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadControl {
    pub enabled: bool,
    /// Advisory picker filter, e.g. `.pdf`.
    pub accept: String,
    pub hint: String,
}

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Error,
    Success,
}

/// A dismissible notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

impl Alert {
    /// The event the alert's close button sends.
    pub fn dismiss_event(&self) -> UiEvent {
        match self.kind {
            AlertKind::Error => UiEvent::DismissError,
            AlertKind::Success => UiEvent::DismissSuccess,
        }
    }
}

/// What fills the editor area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Workspace {
    Placeholder { text: String },
    Document(DocumentHandle),
}

/// Everything the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub phase: Phase,
    pub upload: UploadControl,
    pub error: Option<Alert>,
    pub success: Option<Alert>,
    /// Loading indicator text, present only while loading.
    pub loading: Option<String>,
    pub workspace: Workspace,
}

impl ViewModel {
    pub fn project(state: &WorkflowState, config: &IntakeConfig) -> Self {
        let alert = |kind, message: &Option<String>| {
            message.as_ref().map(|m| Alert {
                kind,
                message: m.clone(),
            })
        };

        Self {
            phase: state.phase,
            upload: UploadControl {
                enabled: state.upload_enabled(),
                accept: config.accept_filter.clone(),
                hint: config.upload_hint(),
            },
            error: alert(AlertKind::Error, &state.error_message),
            success: alert(AlertKind::Success, &state.success_message),
            loading: state.is_loading().then(|| LOADING_TEXT.to_string()),
            workspace: match &state.document {
                Some(doc) => Workspace::Document(doc.clone()),
                None => Workspace::Placeholder {
                    text: WORKSPACE_PLACEHOLDER.to_string(),
                },
            },
        }
    }

    /// Alerts in display order: error first, then success.
    pub fn alerts(&self) -> impl Iterator<Item = &Alert> {
        self.error.iter().chain(self.success.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{InFlight, LoadTicket};

    #[test]
    fn idle_view() {
        let v = ViewModel::project(&WorkflowState::default(), &IntakeConfig::default());
        assert!(v.upload.enabled);
        assert_eq!(v.upload.accept, ".pdf");
        assert_eq!(v.upload.hint, "PDF files only (max 50MB)");
        assert!(v.loading.is_none());
        assert_eq!(v.alerts().count(), 0);
        assert_eq!(
            v.workspace,
            Workspace::Placeholder {
                text: WORKSPACE_PLACEHOLDER.into()
            }
        );
    }

    #[test]
    fn loading_view_disables_upload() {
        let state = WorkflowState {
            phase: Phase::Loading,
            in_flight: Some(InFlight {
                ticket: LoadTicket(1),
                name: "a.pdf".into(),
            }),
            ..Default::default()
        };
        let v = ViewModel::project(&state, &IntakeConfig::default());
        assert!(!v.upload.enabled);
        assert_eq!(v.loading.as_deref(), Some(LOADING_TEXT));
    }

    #[test]
    fn alerts_carry_dismiss_events() {
        let state = WorkflowState {
            phase: Phase::Failed,
            error_message: Some("Please upload a valid PDF file.".into()),
            success_message: Some("Successfully loaded a.pdf".into()),
            ..Default::default()
        };
        let v = ViewModel::project(&state, &IntakeConfig::default());
        let events: Vec<UiEvent> = v.alerts().map(Alert::dismiss_event).collect();
        assert_eq!(events, vec![UiEvent::DismissError, UiEvent::DismissSuccess]);
    }

    #[test]
    fn view_serialises_workspace_tag() {
        let state = WorkflowState {
            phase: Phase::Ready,
            document: Some(DocumentHandle {
                name: "a.pdf".into(),
                size_bytes: 3,
                pdf_version: Some("1.7".into()),
            }),
            ..Default::default()
        };
        let view = ViewModel::project(&state, &IntakeConfig::default());
        let json = serde_json::to_value(view).unwrap();
        assert_eq!(json["workspace"]["kind"], "document");
        assert_eq!(json["workspace"]["name"], "a.pdf");
        assert_eq!(json["phase"], "ready");
    }
}
