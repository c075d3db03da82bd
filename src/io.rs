//! The output sink `println`/`print` write through.
//!
//! Grounded on `ouros::io::PrintWriter`: a small trait the interpreter
//! writes text and separator characters to, rather than calling
//! `println!`/`print!` directly, so tests can capture output instead of
//! writing to real stdout. The redirect-stack/thread-local buffering
//! machinery `PrintWriter` carries (for `contextlib.redirect_stdout`) has
//! no counterpart here — Krait has no such construct — so this trait is
//! just the write surface.

use std::io::Write as _;

/// Receives the text `println`/`print` produce.
pub trait PrintSink {
    /// Writes `s` verbatim, with no added separators or newline.
    fn print_str(&mut self, s: &str);

    /// Writes a single character, used for the space between multiple
    /// `println`/`print` arguments and the trailing newline `println`
    /// adds.
    fn print_char(&mut self, c: char);
}

/// The default sink: real process stdout.
#[derive(Debug, Default)]
pub struct StdPrint;

impl PrintSink for StdPrint {
    fn print_str(&mut self, s: &str) {
        let _ = std::io::stdout().write_all(s.as_bytes());
    }

    fn print_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        let _ = std::io::stdout().write_all(c.encode_utf8(&mut buf).as_bytes());
    }
}

/// A sink that collects output into an owned `String`, for tests that
/// assert on exact program output.
#[derive(Debug, Default)]
pub struct CollectStringPrint(pub String);

impl CollectStringPrint {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl PrintSink for CollectStringPrint {
    fn print_str(&mut self, s: &str) {
        self.0.push_str(s);
    }

    fn print_char(&mut self, c: char) {
        self.0.push(c);
    }
}
