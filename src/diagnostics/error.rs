//! The closed set of diagnostics the interpreter can raise.
//!
//! Every variant corresponds to exactly one `PARSER-*`/`RUNTIME-*` code from
//! the language specification. `Display` renders only the headline (and,
//! for the two-part messages, the detail paragraph that follows it); the
//! source snippet and any trailing commentary are attached separately by
//! [`crate::diagnostics::render`], so the plain `Display` text stays usable
//! on its own in logs where a snippet would be redundant or unavailable.

use crate::frontend::ast::Span;

/// All diagnostics the lexer, parser, and evaluator can produce.
#[derive(Debug, thiserror::Error)]
pub enum KraitError {
    /// PARSER-1: the parser encountered a token it could not fit into any
    /// production at the current point in the grammar.
    #[error("Error (PARSER-1): The parser failed: unexpected token {lexeme:?}")]
    UnexpectedToken { lexeme: String, span: Span },

    /// PARSER-5: a name is rebound in a scope where it is already bound.
    /// `original_span` is where the name was first declared; `span` is the
    /// rebinding that triggered the error.
    #[error("Error (PARSER-5): Reassigning to an already declared value is impossible")]
    AlreadyDefined {
        name: String,
        original_span: Span,
        span: Span,
    },

    /// PARSER-6: an identifier is referenced that no enclosing scope binds,
    /// and that can be determined without running the program.
    #[error("Error (PARSER-6): Unknown value: `{name}`")]
    UnknownIdentifier { name: String, span: Span },

    /// PARSER-7: a `.field` access on a receiver whose type is statically
    /// known (a literal or a built-in value) names a field the receiver
    /// does not have.
    #[error("Error (PARSER-7): Unknown field: `{field}`")]
    UnknownStaticField { field: String, span: Span },

    /// RUNTIME-1: a function or built-in was called with the wrong number
    /// of arguments. `plural` is `"s"` unless `expected == 1`, precomputed
    /// by [`KraitError::arity_mismatch`] since `thiserror`'s format string
    /// only captures fields, not arbitrary expressions.
    #[error("Error (RUNTIME-1): A function accepting {expected} argument{plural} was called with {got} arguments")]
    ArityMismatch {
        expected: usize,
        got: usize,
        plural: &'static str,
    },

    /// RUNTIME-2: a built-in was called with an argument of the wrong kind.
    #[error("Error (RUNTIME-2): A built-in function was called with an argument of incorrect type\n\n{op} expected argument #{position} to be of a different type.")]
    WrongArgumentType { op: String, position: usize },

    /// RUNTIME-5: forcing a thunk that is already being forced.
    #[error("Error (RUNTIME-5): Encountered a cycle between values")]
    ValueCycle,

    /// RUNTIME-7: integer or float division/modulo by a zero right-hand
    /// side.
    #[error("Error (RUNTIME-7): Cannot divide by zero\n\nExpected the right-hand side of {op} to be nonzero.")]
    DivisionByZero { op: String },

    /// RUNTIME-9: `.field` access names a field the receiver does not
    /// have, detected only at evaluation time.
    #[error("Error (RUNTIME-9): Unknown field: `{field}`")]
    UnknownField { field: String },

    /// RUNTIME-13: `import` failed to resolve a module, or resolved to a
    /// module that is already being loaded (an import cycle). `message`
    /// carries the whole pre-formatted body, since the two cases (not
    /// found vs. cycle) have unrelated shapes.
    #[error("Error (RUNTIME-13): {message}")]
    ModuleError { message: String },

    /// RUNTIME-14: a tuple or string index is out of bounds. `op` is the
    /// method that raised it, e.g. `"tuple#get"`.
    #[error("Error (RUNTIME-14): An out-of-bounds index was provided to {op}\n\nExpected an index in the range [0, {len}), but got {index}.")]
    IndexOutOfBounds { op: String, index: i64, len: usize },

    /// RUNTIME-15: `import_library` could not find a shared object.
    #[error("Error (RUNTIME-15): The library \"{name}\" wasn't found")]
    LibraryNotFound { name: String },

    /// RUNTIME-16: a resolved native symbol could not be wrapped into a
    /// usable value.
    #[error("Error (RUNTIME-16): Couldn't fetch the symbol \"{symbol}\" from the library at \"{library}\"\n\n\"{symbol}\" isn't a value.")]
    LibrarySymbolUnusable { library: String, symbol: String },

    /// RUNTIME-17: the requested symbol does not exist in the library.
    #[error("Error (RUNTIME-17): Couldn't fetch the symbol \"{symbol}\" from the library at \"{library}\"\n\n\"{symbol}\" doesn't exist.")]
    LibrarySymbolNotFound { library: String, symbol: String },

    /// RUNTIME-18: `codepoint()` was called on a string that is not
    /// exactly one code point long.
    #[error("Error (RUNTIME-18): Expected a single code point\n\nExpected a string of length 1, but got length {len}.")]
    NotASingleCodepoint { len: usize },
}

impl KraitError {
    /// Builds an [`KraitError::ArityMismatch`], precomputing the plural
    /// suffix for the expected-count noun.
    #[must_use]
    pub fn arity_mismatch(expected: usize, got: usize) -> Self {
        Self::ArityMismatch {
            expected,
            got,
            plural: if expected == 1 { "" } else { "s" },
        }
    }

    /// The span(s) to use for a caret-underlined snippet, if this
    /// diagnostic carries one, in the order they should be rendered.
    /// [`KraitError::AlreadyDefined`] renders two source lines (the
    /// original declaration, then the rebinding); everything else that
    /// carries a span renders exactly one.
    #[must_use]
    pub fn snippet_spans(&self) -> Vec<Span> {
        match self {
            Self::UnexpectedToken { span, .. }
            | Self::UnknownIdentifier { span, .. }
            | Self::UnknownStaticField { span, .. } => vec![*span],
            Self::AlreadyDefined {
                original_span,
                span,
                ..
            } => vec![*original_span, *span],
            _ => Vec::new(),
        }
    }

    /// Text appended after the snippet, separated by a blank line. Only
    /// `PARSER-5` carries one.
    #[must_use]
    pub fn trailing_text(&self) -> Option<&'static str> {
        match self {
            Self::AlreadyDefined { .. } => Some("Consider assigning to a new value."),
            _ => None,
        }
    }

    /// The process exit code this diagnostic should produce: every
    /// language-level diagnostic is a normal (non-catastrophic) failure.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        1
    }
}
