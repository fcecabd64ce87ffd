//! Error types.

/// Everything that can go wrong while talking to the generator.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A physical value was outside the range the instrument accepts.
    #[error("{parameter} must be between {min} and {max} {unit}, got {value}")]
    Range {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
        unit: &'static str,
    },

    #[error("unknown waveform '{0}' (expected square, triangle or sine)")]
    UnknownWaveform(String),

    /// The value does not fit in the requested number of hex digits.
    #[error("value {value} does not fit in {digits} hex digits")]
    Encoding { value: u32, digits: usize },

    /// A character outside the device alphabet was found in a payload.
    #[error("invalid encoded character {0:?}")]
    Decoding(char),

    #[error("no response received")]
    NoResponse,

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),
}

impl From<serialport::Error> for Error {
    fn from(err: serialport::Error) -> Self {
        Error::Transport(err.into())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl Error {
    pub(crate) fn range(
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
        unit: &'static str,
    ) -> Self {
        Error::Range {
            parameter,
            value,
            min,
            max,
            unit,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
