//! Domain error types.

/// A parse error with position information for threshold expressions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    /// Format the error with a caret pointing at the error position in the input.
    /// `position` is a byte offset; the caret column counts chars.
    pub fn display_with_context(&self, input: &str) -> String {
        let column = input
            .get(..self.position)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(self.position);
        let caret = " ".repeat(column) + "^";
        format!(
            "{input}\n{caret}\n{err}",
            input = input,
            caret = caret,
            err = self
        )
    }
}

/// Top-level error type for valuescreen.
#[derive(Debug, thiserror::Error)]
pub enum ScreenerError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    ThresholdParse(#[from] ParseError),

    #[error("invalid threshold set: {reason}")]
    ThresholdInvalid { reason: String },

    #[error("unknown ticker {ticker}")]
    UnknownTicker { ticker: String },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("malformed snapshot for {ticker}: {reason}")]
    MalformedSnapshot { ticker: String, reason: String },

    #[error("no tickers could be evaluated ({failed} failed)")]
    NoResults { failed: usize },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScreenerError {
    /// Whether this error belongs to a single instrument's fetch rather than the run.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            ScreenerError::UnknownTicker { .. }
                | ScreenerError::DataSource { .. }
                | ScreenerError::MalformedSnapshot { .. }
        )
    }
}

impl From<&ScreenerError> for std::process::ExitCode {
    fn from(err: &ScreenerError) -> Self {
        let code: u8 = match err {
            ScreenerError::Io(_) | ScreenerError::Report { .. } => 1,
            ScreenerError::ConfigParse { .. }
            | ScreenerError::ConfigMissing { .. }
            | ScreenerError::ConfigInvalid { .. } => 2,
            ScreenerError::ThresholdParse(_) | ScreenerError::ThresholdInvalid { .. } => 3,
            ScreenerError::UnknownTicker { .. }
            | ScreenerError::DataSource { .. }
            | ScreenerError::MalformedSnapshot { .. } => 4,
            ScreenerError::NoResults { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
