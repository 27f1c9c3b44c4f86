//! Terminal output for command handlers.
//!
//! Handlers write through the [`Terminal`] trait so their output can be
//! captured in tests with [`RecordingTerminal`].

use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde_json::Value;

use crate::markup;
use crate::table::{self, Row};

/// Output surface used by command handlers.
///
/// Every `&str` argument except [`Terminal::raw`] may carry inline markup.
pub trait Terminal: Send + Sync {
    /// Print a line to standard output.
    fn print(&self, message: &str);

    /// Print a line verbatim, without markup processing.
    fn raw(&self, text: &str);

    /// Report an error to standard error.
    fn error(&self, message: &str);

    fn table(&self, rows: &[Row]);

    /// Key/value view of a JSON response.
    fn vtable(&self, value: &Value);

    fn pairs(&self, pairs: &[(String, String)]);

    /// Writer receiving streamed bytes (live log output).
    fn stream(&self) -> Box<dyn Write + Send>;

    /// Start an indeterminate progress indicator; it clears when dropped.
    fn spinner(&self, message: &str) -> Spinner {
        let _ = message;
        Spinner::hidden()
    }
}

/// A progress spinner that clears itself when dropped.
#[derive(Debug)]
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn hidden() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_draw_target(ProgressDrawTarget::hidden());
        Self { bar }
    }

    fn visible(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

/// Terminal writing to the process's standard streams.
///
/// Markup is styled only when the destination stream is a TTY.
#[derive(Debug, Clone)]
pub struct StdTerminal {
    stdout_styled: bool,
    stderr_styled: bool,
}

impl Default for StdTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl StdTerminal {
    pub fn new() -> Self {
        Self {
            stdout_styled: io::stdout().is_terminal(),
            stderr_styled: io::stderr().is_terminal(),
        }
    }

    fn write_stdout(&self, text: &str) {
        let mut stdout = io::stdout().lock();
        // A closed pipe (e.g. `| head`) is not worth failing the command over.
        let _ = writeln!(stdout, "{text}");
    }
}

impl Terminal for StdTerminal {
    fn print(&self, message: &str) {
        self.write_stdout(&markup::render(message, self.stdout_styled));
    }

    fn raw(&self, text: &str) {
        self.write_stdout(text);
    }

    fn error(&self, message: &str) {
        let line = markup::render(&format!("!! ▸ !!   {message}"), self.stderr_styled);
        let _ = writeln!(io::stderr().lock(), "{line}");
    }

    fn table(&self, rows: &[Row]) {
        self.write_stdout(&table::render_table(rows, self.stdout_styled));
    }

    fn vtable(&self, value: &Value) {
        self.write_stdout(&table::render_vtable(value, self.stdout_styled));
    }

    fn pairs(&self, pairs: &[(String, String)]) {
        self.write_stdout(&table::render_pairs(pairs, self.stdout_styled));
    }

    fn stream(&self) -> Box<dyn Write + Send> {
        Box::new(io::stdout())
    }

    fn spinner(&self, message: &str) -> Spinner {
        if io::stderr().is_terminal() {
            Spinner::visible(message)
        } else {
            Spinner::hidden()
        }
    }
}

/// One captured piece of terminal output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Line(String),
    Error(String),
    Table(Vec<Row>),
    /// A key/value view, rendered without styling.
    Vtable(String),
}

/// Terminal that captures output in memory with markup stripped.
#[derive(Debug, Clone, Default)]
pub struct RecordingTerminal {
    output: Arc<Mutex<Vec<Output>>>,
    streamed: Arc<Mutex<Vec<u8>>>,
}

impl RecordingTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, output: Output) {
        if let Ok(mut captured) = self.output.lock() {
            captured.push(output);
        }
    }

    pub fn output(&self) -> Vec<Output> {
        self.output.lock().map(|captured| captured.clone()).unwrap_or_default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.output()
            .into_iter()
            .filter_map(|output| match output {
                Output::Line(line) => Some(line),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.output()
            .into_iter()
            .filter_map(|output| match output {
                Output::Error(error) => Some(error),
                _ => None,
            })
            .collect()
    }

    pub fn tables(&self) -> Vec<Vec<Row>> {
        self.output()
            .into_iter()
            .filter_map(|output| match output {
                Output::Table(rows) => Some(rows),
                _ => None,
            })
            .collect()
    }

    pub fn vtables(&self) -> Vec<String> {
        self.output()
            .into_iter()
            .filter_map(|output| match output {
                Output::Vtable(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Everything written to [`Terminal::stream`] writers, lossily decoded.
    pub fn streamed(&self) -> String {
        self.streamed
            .lock()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default()
    }
}

impl Terminal for RecordingTerminal {
    fn print(&self, message: &str) {
        self.push(Output::Line(markup::strip(message)));
    }

    fn raw(&self, text: &str) {
        self.push(Output::Line(text.to_string()));
    }

    fn error(&self, message: &str) {
        self.push(Output::Error(markup::strip(message)));
    }

    fn table(&self, rows: &[Row]) {
        let stripped = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|(key, value)| (key.clone(), markup::strip(value)))
                    .collect()
            })
            .collect();
        self.push(Output::Table(stripped));
    }

    fn vtable(&self, value: &Value) {
        self.push(Output::Vtable(table::render_vtable(value, false)));
    }

    fn pairs(&self, pairs: &[(String, String)]) {
        self.push(Output::Vtable(table::render_pairs(pairs, false)));
    }

    fn stream(&self) -> Box<dyn Write + Send> {
        Box::new(SharedBuffer(Arc::clone(&self.streamed)))
    }
}

struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut bytes = self
            .0
            .lock()
            .map_err(|_| io::Error::other("output buffer poisoned"))?;
        bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
