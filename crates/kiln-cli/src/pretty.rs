//! Status line printing for the CLI.

/// Print an informational note.
pub fn info(message: &str) {
    println!("\u{2139} {message}");
}

/// Print a "work in progress" line.
pub fn wait(message: &str) {
    println!("\u{2026} {message}");
}

/// Print a completion line.
pub fn done(message: &str) {
    println!("\u{2714} {message}");
}

/// Print a failure line to stderr.
pub fn fail(message: &str) {
    eprintln!("\u{2718} {message}");
}

/// Quiet-aware printer: in quiet mode only kernel output and failures
/// remain visible.
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    quiet: bool,
}

impl Printer {
    #[must_use]
    pub const fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn info(self, message: &str) {
        if !self.quiet {
            info(message);
        }
    }

    pub fn wait(self, message: &str) {
        if !self.quiet {
            wait(message);
        }
    }

    pub fn done(self, message: &str) {
        if !self.quiet {
            done(message);
        }
    }
}
