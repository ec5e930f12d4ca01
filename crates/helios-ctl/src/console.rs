//! Console output.
//!
//! Protocol lines are rendered by the engine; this layer only adds color and
//! keeps the periodic broadcast status on a single in-place line while a
//! continuous run is active.

use std::io::{self, Write};

use helios_engine::report::{render, render_update};
use helios_engine::{Report, SessionState};
use helios_protocol::Update;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[m";
const CLEAR_LINE: &str = "\r\x1b[K";

/// Writes reports to stdout.
pub struct Console {
    /// Overwrite the broadcast status in place instead of scrolling it.
    status_in_place: bool,
    /// Whether an unterminated status line is currently displayed.
    status_shown: bool,
}

impl Console {
    /// Create a console; `status_in_place` is used for continuous runs.
    pub fn new(status_in_place: bool) -> Self {
        Console {
            status_in_place,
            status_shown: false,
        }
    }

    /// Print one report.
    pub fn print_report(&mut self, report: &Report, session: &SessionState) {
        if self.status_in_place {
            if let Report::Decoded(Update::Broadcast(_)) = report {
                print!("{}{}", CLEAR_LINE, render(report, session));
                let _ = io::stdout().flush();
                self.status_shown = true;
                return;
            }
        }

        let line = render(report, session);
        let colored = match report {
            Report::Decoded(_) => color_decoded(&line),
            Report::Invalid { .. } | Report::Foreign { .. } => {
                format!("{}{}{}", RED, line, RESET)
            }
            Report::Undecoded { .. } => format!("{}{}{}", BOLD, line, RESET),
        };
        self.print_line(&colored);
    }

    /// Print a plain error line.
    pub fn print_error(&mut self, message: &str) {
        let line = format!("{}{}{}", RED, message, RESET);
        self.print_line(&line);
    }

    fn print_line(&mut self, line: &str) {
        if self.status_shown {
            print!("{}", CLEAR_LINE);
            self.status_shown = false;
        }
        println!("{}", line);
    }

    /// Terminate the status line and replay the last known status.
    pub fn finish(&mut self, last_status: Option<Update>, session: &SessionState) {
        if self.status_shown {
            println!();
            self.status_shown = false;
        }
        if let Some(update) = last_status {
            println!("{}", render_update(&update, session));
        }
    }
}

/// Color the label part of a decoded line.
fn color_decoded(line: &str) -> String {
    match line.split_once(" = ") {
        Some((label, value)) => format!("{}{}{} = {}", GREEN, label, RESET, value),
        None => format!("{}{}{}", GREEN, line, RESET),
    }
}
