//! Terminal display surface
//!
//! Line-oriented rendering of progress, results and errors. Logs go to
//! stderr; this writes to stdout (or any `Write` in tests).

use longcalc_foundation::strings::percent_label;
use longcalc_foundation::DisplaySurface;
use std::io::Write;
use tracing::{debug, warn};

const BAR_WIDTH: usize = 20;
const PROMPT: &str = "Zahl eingeben (q = Ende): ";

pub struct TerminalDisplay<W: Write + Send> {
    out: W,
    trigger_enabled: bool,
}

impl TerminalDisplay<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> TerminalDisplay<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            trigger_enabled: true,
        }
    }

    #[cfg(test)]
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Ask for the next number; nothing is shown while the trigger is disabled
    pub fn show_prompt(&mut self) {
        if self.trigger_enabled {
            self.write(format_args!("{}", PROMPT), false);
        }
    }

    fn write(&mut self, args: std::fmt::Arguments<'_>, newline: bool) {
        let result = if newline {
            writeln!(self.out, "{}", args)
        } else {
            write!(self.out, "{}", args)
        };
        if let Err(e) = result.and_then(|_| self.out.flush()) {
            warn!("Failed to write to terminal: {}", e);
        }
    }
}

/// `[██████░░░░░░░░░░░░░░]`
pub fn render_bar(percent: u8, width: usize) -> String {
    let filled = (usize::from(percent.min(100)) * width) / 100;
    format!("[{}{}]", "█".repeat(filled), "░".repeat(width - filled))
}

impl<W: Write + Send> DisplaySurface for TerminalDisplay<W> {
    fn on_progress_percent(&mut self, percent: u8) {
        let line = format!("{} {}", render_bar(percent, BAR_WIDTH), percent_label(percent));
        self.write(format_args!("{}", line), true);
    }

    fn on_progress_message(&mut self, text: &str) {
        self.write(format_args!("{}", text), true);
    }

    fn on_result(&mut self, text: &str) {
        self.write(format_args!("{}", text), true);
    }

    fn set_trigger_enabled(&mut self, enabled: bool) {
        debug!("Trigger {}", if enabled { "enabled" } else { "disabled" });
        self.trigger_enabled = enabled;
    }

    fn on_error(&mut self, text: &str) {
        self.write(format_args!("{}", text), true);
    }
}
