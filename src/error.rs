//! Crate-wide error type.
//!
//! Construction-time invariant violations fail fast with a typed error;
//! per-cell data-quality issues never surface here (they degrade to the NaN
//! missing sentinel inside the table layer instead).

/// All failure modes of the forecasting pipeline.
#[derive(Clone)]
pub enum Error {
    /// Sequence-parameter length disagrees with an explicit period count, or
    /// a future-date list disagrees with a distribution's period count.
    ShapeMismatch(String),
    /// A sheet key could not be resolved to a table, column, row, or cell.
    KeyResolution(String),
    /// A date string is not in any accepted encoding.
    UnsupportedDate(String),
    /// An argument violates a documented precondition (e.g. `end <= start`
    /// in period generation, or a zero sample count).
    Precondition(String),
    /// File or CSV I/O failure.
    Io(String),
    /// Chart rendering failure.
    Render(String),
}

impl Error {
    /// Process exit code for the `fbands` binary.
    ///
    /// 2 = usage/config, 3 = data, 4 = math/render.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Precondition(_) | Error::Io(_) => 2,
            Error::KeyResolution(_) | Error::UnsupportedDate(_) => 3,
            Error::ShapeMismatch(_) | Error::Render(_) => 4,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Error::ShapeMismatch(_) => "ShapeMismatch",
            Error::KeyResolution(_) => "KeyResolution",
            Error::UnsupportedDate(_) => "UnsupportedDate",
            Error::Precondition(_) => "Precondition",
            Error::Io(_) => "Io",
            Error::Render(_) => "Render",
        }
    }

    fn message(&self) -> &str {
        match self {
            Error::ShapeMismatch(m)
            | Error::KeyResolution(m)
            | Error::UnsupportedDate(m)
            | Error::Precondition(m)
            | Error::Io(m)
            | Error::Render(m) => m,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind())
            .field("message", &self.message())
            .finish()
    }
}

impl std::error::Error for Error {}
