//! PW2102 function generator serial protocol.

pub mod cipher;
pub mod config;
pub mod constants;
pub mod encoding;
pub mod error;
pub mod generator;
pub mod protocol;
pub mod transport;

pub use self::config::{GeneratorConfig, SettleDelays};
pub use self::encoding::{Attenuation, FrequencyBand, Waveform};
pub use self::error::{Error, Result};
pub use self::generator::FunctionGenerator;
pub use self::protocol::{Command, FrequencyReading};
pub use self::transport::Transport;
