//! Display String Constants
//!
//! All user-visible text shown on the display surface lives here so the
//! task layer and the CLI agree on exact wording:
//! - Static messages for fixed notifications
//! - Small formatting helpers for messages that carry numbers
//!
//! # Usage
//!
//! ```ignore
//! use longcalc_foundation::strings::{result_text, MSG_INTERNAL_ERROR};
//!
//! display.on_error(MSG_INTERNAL_ERROR);
//! display.on_result(&result_text(125, 0));
//! ```

// ============================================================================
// Fixed Messages
// ============================================================================

/// Shown when the trigger that fired is not the one the controller owns
pub const MSG_INTERNAL_ERROR: &str = "Interner Fehler.";
/// Shown when the trigger fires without any input
pub const MSG_NO_INPUT: &str = "Bitte Zahl in das Textfeld eingeben!";
/// Startup notification when progress is reported
pub const MSG_STARTED: &str = "Berechnung gestartet.";
/// Startup notification when progress reporting is disabled
pub const MSG_STARTED_NO_PROGRESS: &str = "Berechnung gestartet (ohne Fortschrittsanzeige).";
/// Shown when a start is requested while a computation runs
pub const MSG_ALREADY_RUNNING: &str = "Berechnung läuft bereits.";
/// Shown after a running computation was cancelled
pub const MSG_CANCELLED: &str = "Berechnung abgebrochen.";

// ============================================================================
// Formatting Helpers
// ============================================================================

/// Two-line result text: `Ergebnis: {value}` / `Laufzeit: {secs} Sekunden`
pub fn result_text(result_value: u64, elapsed_seconds: u64) -> String {
    format!(
        "Ergebnis: {}\nLaufzeit: {} Sekunden",
        result_value, elapsed_seconds
    )
}

/// Text label next to the percent indicator
pub fn percent_label(percent: u8) -> String {
    format!("{}%", percent)
}

/// Progress payload in message mode
pub fn progress_message(percent: u8) -> String {
    format!("Fortschritt: {}%", percent)
}

/// Input could not be parsed as a non-negative integer
pub fn invalid_number(input: &str) -> String {
    format!("Ungültige Zahl: {}", input)
}

/// Input parsed but is above the supported maximum
pub fn number_too_large(max: u64) -> String {
    format!("Zahl zu groß (maximal {}).", max)
}
