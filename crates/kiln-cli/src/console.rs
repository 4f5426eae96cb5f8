//! Stdio-backed console for the run loop.

use std::io::{self, BufRead, Write};

use kiln_client::RunIo;

use crate::pretty;

/// Read one line, stripping the trailing newline.
///
/// A closed stream is an error: the run loop must unwind rather than
/// keep answering the server with empty input.
fn read_trimmed_line(reader: &mut impl BufRead) -> io::Result<String> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "stdin closed during interactive input",
        ));
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(line)
}

/// Routes kernel console records to the process stdout/stderr and
/// reads interactive input from the terminal.
pub struct StdioConsole {
    quiet: bool,
}

impl StdioConsole {
    #[must_use]
    pub const fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl RunIo for StdioConsole {
    fn stdout(&mut self, text: &str) {
        print!("{text}");
    }

    fn stderr(&mut self, text: &str) {
        eprint!("{text}");
    }

    fn unknown_record(&mut self, kind: &str, text: &str) {
        println!("----- output record (type: {kind}) -----");
        println!("{text}");
        println!("----- end of record -----");
    }

    fn flush(&mut self) {
        let _ = io::stdout().flush();
    }

    fn read_line(&mut self) -> io::Result<String> {
        read_trimmed_line(&mut io::stdin().lock())
    }

    fn read_secret(&mut self) -> io::Result<String> {
        rpassword::prompt_password("Password: ")
    }

    fn phase_done(&mut self, message: &str) {
        if !self.quiet {
            pretty::done(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_read_trimmed_line_strips_newline() {
        let mut input = Cursor::new("42\n");
        assert_eq!(read_trimmed_line(&mut input).unwrap(), "42");

        let mut input = Cursor::new("yes\r\n");
        assert_eq!(read_trimmed_line(&mut input).unwrap(), "yes");
    }

    #[test]
    fn test_read_trimmed_line_fails_on_closed_stream() {
        let mut input = Cursor::new("");
        let err = read_trimmed_line(&mut input).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
