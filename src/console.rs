//! Console input/output with colour formatting.
//!
//! Every component that talks to the user receives a [`Console`] instead of
//! touching stdin/stdout directly, so the whole interactive flow can be driven
//! from a byte buffer in tests.

use std::io::{self, BufRead, StdinLock, Stdout, Write};

use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

/// Line-oriented reader/writer pair.
pub struct Console<R, W> {
    reader: R,
    writer: W,
}

impl Console<StdinLock<'static>, Stdout> {
    /// Console bound to the process stdin/stdout.
    ///
    /// Stdout is never held locked: the Ctrl-C handler prints from another
    /// thread while a prompt is blocked on stdin.
    pub fn stdio() -> Self {
        Console::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Console { reader, writer }
    }

    /// Access the underlying writer (used by tests to inspect output).
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Plain line.
    pub fn info(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.writer, "{}", message)
    }

    /// Success line (same colour as info).
    pub fn success(&mut self, message: &str) -> io::Result<()> {
        self.info(message)
    }

    /// Yellow line.
    pub fn warning(&mut self, message: &str) -> io::Result<()> {
        self.colored(Color::Yellow, message)
    }

    /// Red line.
    pub fn error(&mut self, message: &str) -> io::Result<()> {
        self.colored(Color::Red, message)
    }

    /// Print a full line in the given colour.
    pub fn colored(&mut self, color: Color, message: &str) -> io::Result<()> {
        queue!(
            self.writer,
            SetForegroundColor(color),
            Print(message),
            ResetColor,
            Print("\n")
        )?;
        self.writer.flush()
    }

    /// Show a green prompt and read one line.
    ///
    /// Returns `Ok(None)` at end of input. The trailing line terminator is
    /// stripped; any other whitespace is left for the caller to handle.
    pub fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
        queue!(
            self.writer,
            SetForegroundColor(Color::Green),
            Print(message),
            ResetColor
        )?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed_len = line.trim_end_matches(&['\n', '\r'][..]).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }
}
