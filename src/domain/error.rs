//! Domain error types.

/// The single error kind raised by indicator and scoring computations:
/// empty or malformed series, non-positive prices where positivity is required,
/// bad window parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid input: {reason}")]
pub struct InvalidInputError {
    pub reason: String,
}

impl InvalidInputError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A parse error with position information for rule parsing.
#[derive(Debug, Clone, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    /// Format the error with a caret pointing at the error position in the input.
    pub fn display_with_context(&self, input: &str) -> String {
        let caret = " ".repeat(self.position) + "^";
        format!(
            "{input}\n{caret}\n{err}",
            input = input,
            caret = caret,
            err = self
        )
    }
}

/// Top-level error type for signalboard.
#[derive(Debug, thiserror::Error)]
pub enum SignalboardError {
    #[error("data error: {reason}")]
    Data { reason: String },

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
    RuleParse(#[from] ParseError),

    #[error("invalid rule: {reason}")]
    RuleInvalid { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SignalboardError> for std::process::ExitCode {
    fn from(err: &SignalboardError) -> Self {
        let code: u8 = match err {
            SignalboardError::Io(_) | SignalboardError::Report { .. } => 1,
            SignalboardError::ConfigParse { .. }
            | SignalboardError::ConfigMissing { .. }
            | SignalboardError::ConfigInvalid { .. } => 2,
            SignalboardError::Data { .. } => 3,
            SignalboardError::RuleParse(_) | SignalboardError::RuleInvalid { .. } => 4,
            SignalboardError::NoData { .. } | SignalboardError::InsufficientData { .. } => 5,
            SignalboardError::InvalidInput(_) => 6,
        };
        std::process::ExitCode::from(code)
    }
}
