/// Leading byte of every request and response frame.
pub const FRAME_START: u8 = b'/';
/// Sentinel terminating every request and response frame.
pub const SENTINEL: u8 = b'.';
/// Prefix of the answer to a frequency query.
pub const FREQUENCY_RESPONSE_HEADER: &[u8] = b"/AK";

pub const DEFAULT_BAUD_RATE: u32 = 9600;
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

pub mod commands {
    pub const SELECT_BAND: &str = "G0";
    pub const WAVEFORM: &str = "G2";
    pub const FREQUENCY: &str = "DK";
    pub const OUTPUT_LEVEL: &str = "DB";
    pub const DUTY_CYCLE: &str = "DC";
    pub const OFFSET: &str = "DD";
    pub const CMOS_LEVEL: &str = "DG";
    pub const QUERY_FREQUENCY: &str = "AK";
}

/// Device alphabet, indexed by hex digit value.
///
/// `0`-`9` pass through, `A`-`F` become the six ASCII characters following `9`.
pub const SYMBOLS: [u8; 16] = *b"0123456789:;<=>?";
