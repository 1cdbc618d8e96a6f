//! Lifecycle action handlers.
//!
//! `POST /pause/{pid}`, `POST /resume/{pid}` and `POST /kill/{pid}` return the
//! outcome message as plain text. `POST /actions` serves the dashboard form
//! and redirects back to `/` with the message in the query string.
//!
//! Browsers send form POSTs cross-site without a preflight, so every action
//! request whose `Sec-Fetch-Site` or `Origin` points at another site is
//! refused with 403 before any signal is sent. Clients that send neither
//! header (curl, scripts) are accepted.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use procwatch::{ControlOutcome, LifecycleController};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::state::SharedState;

/// Operator actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Pause,
    Resume,
    Kill,
}

impl Action {
    pub fn apply(self, controller: &LifecycleController, pid: u32) -> ControlOutcome {
        match self {
            Action::Pause => controller.pause(pid),
            Action::Resume => controller.resume(pid),
            Action::Kill => controller.kill(pid),
        }
    }
}

/// Form body of `POST /actions`.
#[derive(Debug, Deserialize)]
pub struct ActionForm {
    pub action: Action,
    pub pid: String,
}

/// Parses operator input into a positive pid.
pub fn parse_pid(input: &str) -> Option<u32> {
    input.trim().parse::<u32>().ok().filter(|pid| *pid > 0)
}

/// HTTP status reported for an outcome.
pub fn outcome_status(outcome: &ControlOutcome) -> StatusCode {
    match outcome {
        ControlOutcome::Paused(_)
        | ControlOutcome::AlreadyPaused(_)
        | ControlOutcome::Resumed(_)
        | ControlOutcome::Killed(_) => StatusCode::OK,
        ControlOutcome::NotPaused(_) => StatusCode::CONFLICT,
        ControlOutcome::NoSuchProcess(_) => StatusCode::NOT_FOUND,
        ControlOutcome::PermissionDenied(_) | ControlOutcome::Protected(_) => {
            StatusCode::FORBIDDEN
        }
        ControlOutcome::Failed(_, _) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Whether the request comes from the dashboard's own origin.
pub fn is_same_origin(headers: &HeaderMap) -> bool {
    if let Some(site) = headers.get("sec-fetch-site") {
        return matches!(site.to_str(), Ok("same-origin") | Ok("none"));
    }

    let origin = match headers.get(header::ORIGIN) {
        Some(origin) => origin,
        None => return true,
    };
    let host = match headers.get(header::HOST).and_then(|h| h.to_str().ok()) {
        Some(host) => host,
        None => return false,
    };
    match origin.to_str() {
        Ok(origin) => origin
            .split_once("://")
            .map(|(_, authority)| authority.eq_ignore_ascii_case(host))
            .unwrap_or(false),
        Err(_) => false,
    }
}

const CROSS_ORIGIN_MESSAGE: &str = "Cross-origin action request rejected";

fn run_action(state: &SharedState, action: Action, raw_pid: &str) -> (StatusCode, String) {
    match parse_pid(raw_pid) {
        Some(pid) => {
            let outcome = action.apply(&state.controller, pid);
            (outcome_status(&outcome), outcome.to_string())
        }
        None => (
            StatusCode::BAD_REQUEST,
            format!("Invalid PID '{}'", raw_pid.trim()),
        ),
    }
}

/// Handler for `POST /pause/{pid}`.
#[instrument(skip(state, headers))]
pub async fn pause_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(pid): Path<String>,
) -> Response {
    debug!("Processing pause request");
    guarded_action(&state, &headers, Action::Pause, &pid)
}

/// Handler for `POST /resume/{pid}`.
#[instrument(skip(state, headers))]
pub async fn resume_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(pid): Path<String>,
) -> Response {
    debug!("Processing resume request");
    guarded_action(&state, &headers, Action::Resume, &pid)
}

/// Handler for `POST /kill/{pid}`.
#[instrument(skip(state, headers))]
pub async fn kill_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(pid): Path<String>,
) -> Response {
    debug!("Processing kill request");
    guarded_action(&state, &headers, Action::Kill, &pid)
}

fn guarded_action(
    state: &SharedState,
    headers: &HeaderMap,
    action: Action,
    raw_pid: &str,
) -> Response {
    if !is_same_origin(headers) {
        warn!("Rejected cross-origin {:?} request for PID {}", action, raw_pid);
        return (StatusCode::FORBIDDEN, CROSS_ORIGIN_MESSAGE).into_response();
    }
    run_action(state, action, raw_pid).into_response()
}

/// Handler for the dashboard form.
#[instrument(skip(state, headers))]
pub async fn form_action_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Form(form): Form<ActionForm>,
) -> Response {
    debug!("Processing form action");
    if !is_same_origin(&headers) {
        warn!("Rejected cross-origin {:?} form for PID {}", form.action, form.pid);
        return (StatusCode::FORBIDDEN, CROSS_ORIGIN_MESSAGE).into_response();
    }
    let (_, message) = run_action(&state, form.action, &form.pid);
    Redirect::to(&format!("/?msg={}", encode_query(&message))).into_response()
}

/// Percent-encodes a query value.
fn encode_query(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}
