use serde::Serialize;

use super::types::{SchedulePayload, ScheduleSnapshot};
use super::view_model::ScheduleView;

/// Where the query layer currently is
#[derive(Debug, Clone)]
pub enum QueryState {
    Loading,
    Error(String),
    Ready(Option<SchedulePayload>),
}

/// Exactly one of these is rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    Spinner { message: &'static str },
    ErrorNotice { title: &'static str, detail: &'static str },
    SignInPrompt { title: &'static str, detail: &'static str },
    Schedule(Box<ScheduleView>),
}

/// Loading wins over errors, errors over the sign-in check; the view model
/// only runs once all three are out of the way
pub fn resolve_screen(signed_in: bool, query: QueryState) -> Screen {
    match query {
        QueryState::Loading => Screen::Spinner {
            message: "Loading schedule...",
        },
        QueryState::Error(reason) => {
            tracing::warn!(%reason, "Schedule fetch failed");
            Screen::ErrorNotice {
                title: "Error loading schedule",
                detail: "Please check your connection and try again",
            }
        }
        QueryState::Ready(_) if !signed_in => Screen::SignInPrompt {
            title: "Sign in required",
            detail: "Please sign in to view your schedule",
        },
        QueryState::Ready(payload) => {
            let snapshot = ScheduleSnapshot::from_payload(payload);
            Screen::Schedule(Box::new(ScheduleView::build(&snapshot)))
        }
    }
}
