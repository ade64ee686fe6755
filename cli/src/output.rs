//! Terminal rendering and argument value parsing.

#[cfg(test)]
#[path = "output_test.rs"]
mod output_test;

use hirevoo_session::guard::GuardDecision;
use hirevoo_session::notify::{Notification, Notifier, Tone};
use hirevoo_session::state::settings::SettingsMap;
use hirevoo_session::{AuthPhase, AuthState};
use serde_json::{Value, json};

use crate::CliError;

/// Prints notifications to stderr, one line each.
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notification: Notification) {
        eprintln!("{}", notification_line(&notification));
    }
}

pub fn notification_line(notification: &Notification) -> String {
    let tag = match notification.tone {
        Tone::Success => "ok",
        Tone::Info => "info",
        Tone::Warning => "warn",
        Tone::Error => "error",
    };
    let mut line = format!("[{tag}] {}", notification.title);
    if !notification.description.is_empty() {
        line.push_str(": ");
        line.push_str(&notification.description);
    }
    if notification.retryable {
        line.push_str(" (retryable)");
    }
    line
}

pub fn phase_label(phase: AuthPhase) -> &'static str {
    match phase {
        AuthPhase::Unknown => "unknown",
        AuthPhase::Authenticated => "authenticated",
        AuthPhase::Unauthenticated => "unauthenticated",
    }
}

pub fn auth_json(state: &AuthState) -> Value {
    json!({
        "phase": phase_label(state.phase()),
        "isAuthenticated": state.is_authenticated,
        "isStaff": state.is_staff(),
        "user": state.user,
    })
}

pub fn guard_json(path: &str, decision: &GuardDecision) -> Value {
    match decision {
        GuardDecision::Defer => json!({ "path": path, "decision": "defer" }),
        GuardDecision::Render => json!({ "path": path, "decision": "render" }),
        GuardDecision::Redirect(route) => json!({ "path": path, "decision": "redirect", "to": route }),
    }
}

/// A setting value from the command line: JSON when it parses, else a bare
/// string, so `true` is a bool and `spanish` is a string.
pub fn parse_setting_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

/// # Errors
///
/// Returns [`CliError::InvalidJson`] for malformed input and
/// [`CliError::NotAnObject`] when the JSON is not an object.
pub fn parse_settings_object(raw: &str) -> Result<SettingsMap, CliError> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(map),
        _ => Err(CliError::NotAnObject),
    }
}

/// # Errors
///
/// Returns [`CliError::InvalidJson`] when `value` cannot be rendered.
pub fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
