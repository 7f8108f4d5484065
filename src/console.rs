//! User-facing output channel for help and version text, plus the
//! process-exit primitive the help parameter uses.

use std::io::{self, Write};

use parking_lot::Mutex;

/// Exit status used after printing help.
pub const HELP_EXIT_STATUS: i32 = 101;

pub trait Console {
    fn print(&self, text: &str);

    /// Terminate with `status`. Implementations that return (test consoles)
    /// leave the parser to abort with [`crate::parser::ParseError::HelpShown`].
    fn exit(&self, status: i32);
}

/// Stdout and `std::process::exit`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn print(&self, text: &str) {
        let mut stdout = io::stdout().lock();
        if let Err(e) = stdout.write_all(text.as_bytes()).and_then(|_| stdout.flush()) {
            tracing::warn!(error = %e, "Failed to write to stdout");
        }
    }

    fn exit(&self, status: i32) {
        std::process::exit(status);
    }
}

/// Records output and exit requests instead of acting on them.
#[derive(Debug, Default)]
pub struct BufferConsole {
    output: Mutex<String>,
    exits: Mutex<Vec<i32>>,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(&self) -> String {
        self.output.lock().clone()
    }

    /// Statuses passed to `exit`, in order.
    pub fn exits(&self) -> Vec<i32> {
        self.exits.lock().clone()
    }
}

impl Console for BufferConsole {
    fn print(&self, text: &str) {
        self.output.lock().push_str(text);
    }

    fn exit(&self, status: i32) {
        self.exits.lock().push(status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_console_records_everything() {
        let console = BufferConsole::new();
        console.print("a");
        console.print("b\n");
        console.exit(HELP_EXIT_STATUS);
        assert_eq!(console.output(), "ab\n");
        assert_eq!(console.exits(), [HELP_EXIT_STATUS]);
    }
}
