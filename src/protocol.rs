//! The ASCII wire protocol of the PW2102.
//!
//! Requests look like `/<mnemonic><payload>.`, where the payload is made of
//! device symbols (see [`crate::cipher`]). The only query, `/AK.`, is
//! answered with `/AK<4 code symbols><band symbol>.`.

use std::fmt;

use crate::cipher;
use crate::constants::{FRAME_START, FREQUENCY_RESPONSE_HEADER, SENTINEL, commands};
use crate::encoding::{self, Attenuation, FrequencyBand, Waveform};
use crate::error::{Error, Result};

/// Frame a mnemonic and payload: leading `/`, trailing `.` unless already present.
pub fn frame(mnemonic: &str, payload: &str) -> String {
    let mut buf = String::with_capacity(mnemonic.len() + payload.len() + 2);
    buf.push(FRAME_START as char);
    buf.push_str(mnemonic);
    buf.push_str(payload);
    if !buf.ends_with(SENTINEL as char) {
        buf.push(SENTINEL as char);
    }
    buf
}

/// PW2102 command
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    /// Select the frequency band. Must precede [`Command::Frequency`].
    SelectBand(FrequencyBand),
    /// Normalised frequency code within the selected band.
    Frequency { code: u16 },
    Waveform(Waveform),
    /// Amplitude code, 128-228.
    OutputLevel { code: u8, attenuation: Attenuation },
    /// DC offset code, 28-228.
    Offset { code: u8, attenuation: Attenuation },
    /// Duty cycle code, 25-231.
    DutyCycle { code: u8 },
    /// CMOS output level code, 28-128.
    CmosLevel { code: u8 },
    /// Read back the current frequency.
    QueryFrequency,
}

impl Command {
    /// Band select followed by the frequency value, in transmission order.
    pub fn frequency(hz: f64) -> Result<[Command; 2]> {
        let (band, code) = encoding::frequency_code(hz)?;
        Ok([Command::SelectBand(band), Command::Frequency { code }])
    }

    pub fn output_level(vpp: f64, attenuation: Attenuation) -> Result<Self> {
        Ok(Command::OutputLevel {
            code: encoding::output_level_code(vpp)?,
            attenuation,
        })
    }

    pub fn offset(volts: f64, attenuation: Attenuation) -> Result<Self> {
        Ok(Command::Offset {
            code: encoding::offset_code(volts)?,
            attenuation,
        })
    }

    pub fn duty_cycle(percent: f64) -> Result<Self> {
        Ok(Command::DutyCycle {
            code: encoding::duty_cycle_code(percent)?,
        })
    }

    pub fn cmos_level(volts: f64) -> Result<Self> {
        Ok(Command::CmosLevel {
            code: encoding::cmos_level_code(volts)?,
        })
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Command::SelectBand(_) => commands::SELECT_BAND,
            Command::Frequency { .. } => commands::FREQUENCY,
            Command::Waveform(_) => commands::WAVEFORM,
            Command::OutputLevel { .. } => commands::OUTPUT_LEVEL,
            Command::Offset { .. } => commands::OFFSET,
            Command::DutyCycle { .. } => commands::DUTY_CYCLE,
            Command::CmosLevel { .. } => commands::CMOS_LEVEL,
            Command::QueryFrequency => commands::QUERY_FREQUENCY,
        }
    }

    fn payload(&self) -> Result<String> {
        match self {
            Command::SelectBand(band) => Ok(band.code().to_string()),
            Command::Frequency { code } => cipher::encode_hex(u32::from(*code), 4),
            Command::Waveform(wave) => Ok(wave.code().to_string()),
            Command::OutputLevel { code, attenuation } | Command::Offset { code, attenuation } => {
                let mut payload = cipher::encode_hex(u32::from(*code), 2)?;
                payload.push(attenuation.digit());
                Ok(payload)
            }
            Command::DutyCycle { code } | Command::CmosLevel { code } => {
                cipher::encode_hex(u32::from(*code), 2)
            }
            Command::QueryFrequency => Ok(String::new()),
        }
    }

    /// The framed command, as sent on the wire.
    pub fn to_frame(&self) -> Result<String> {
        Ok(frame(self.mnemonic(), &self.payload()?))
    }

    pub fn into_raw(self) -> Result<Vec<u8>> {
        Ok(self.to_frame()?.into_bytes())
    }
}

/// Pick the most recent complete message out of a raw read buffer.
///
/// Only sentinel-terminated fragments count; a trailing remainder without a
/// sentinel is still in flight and is ignored. Bytes preceding the last
/// frame start inside the chosen fragment are leftovers of an earlier,
/// partially read message. The returned slice includes the sentinel.
pub fn last_message(buf: &[u8]) -> Result<&[u8]> {
    let end = buf
        .iter()
        .rposition(|&b| b == SENTINEL)
        .ok_or(Error::NoResponse)?;

    let terminated = &buf[..=end];
    let mut fragments = terminated
        .split_inclusive(|&b| b == SENTINEL)
        .filter(|f| f.len() > 1);
    let last = fragments.next_back().ok_or(Error::NoResponse)?;

    let stale = fragments.count();
    if stale > 0 {
        log::warn!("Discarding {} stale response fragment(s)", stale);
    }

    let start = last
        .iter()
        .rposition(|&b| b == FRAME_START)
        .unwrap_or(0);
    Ok(&last[start..])
}

/// Frequency as reported by the instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyReading {
    pub band: FrequencyBand,
    pub code: u32,
}

impl FrequencyReading {
    pub fn hz(&self) -> f64 {
        encoding::frequency_from_code(self.band, self.code)
    }

    /// Parse the latest `/AK` response found in `buf`.
    pub fn from_raw(buf: &[u8]) -> Result<Self> {
        let msg = last_message(buf)?;
        let header = FREQUENCY_RESPONSE_HEADER;

        if !msg.starts_with(header) || !msg.ends_with(&[SENTINEL]) {
            return Err(unexpected(msg));
        }
        let body: String = msg[header.len()..msg.len() - 1]
            .iter()
            .map(|&b| b as char)
            .collect();
        let digits = cipher::decode_hex(&body)?;

        if digits.len() < 2 {
            return Err(unexpected(msg));
        }
        let (code, band) = digits.split_at(digits.len() - 1);
        let band = u8::from_str_radix(band, 16)
            .ok()
            .and_then(FrequencyBand::from_code)
            .ok_or_else(|| unexpected(msg))?;
        let code = u32::from_str_radix(code, 16).map_err(|_| unexpected(msg))?;

        Ok(FrequencyReading { band, code })
    }
}

impl fmt::Display for FrequencyReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz (band {})", self.hz(), self.band)
    }
}

fn unexpected(msg: &[u8]) -> Error {
    Error::UnexpectedResponse(String::from_utf8_lossy(msg).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(cmd: Command) -> String {
        String::from_utf8(cmd.into_raw().unwrap()).unwrap()
    }

    #[test]
    fn frame_adds_sentinel_once() {
        assert_eq!(frame("AK", ""), "/AK.");
        assert_eq!(frame("DK", "55?0"), "/DK55?0.");
        assert_eq!(frame("DK", "55?0."), "/DK55?0.");
    }

    #[test]
    fn frequency_commands() {
        let [band, value] = Command::frequency(22_000.0).unwrap();
        assert_eq!(raw(band), "/G04.");
        assert_eq!(raw(value), "/DK55?0.");

        let [band, value] = Command::frequency(1_000.0).unwrap();
        assert_eq!(raw(band), "/G03.");
        assert_eq!(raw(value), "/DK2710.");

        assert!(matches!(
            Command::frequency(2_200_001.0),
            Err(Error::Range { .. })
        ));
    }

    #[test]
    fn waveform_command() {
        assert_eq!(raw(Command::Waveform(Waveform::Sine)), "/G24.");
        assert_eq!(raw(Command::Waveform(Waveform::Square)), "/G21.");
        assert_eq!(raw(Command::Waveform(Waveform::Triangle)), "/G22.");
    }

    #[test]
    fn level_and_offset_carry_attenuation() {
        assert_eq!(raw(Command::output_level(10.0, Attenuation::Off).unwrap()), "/DB;20.");
        assert_eq!(raw(Command::output_level(20.0, Attenuation::On).unwrap()), "/DB>41.");
        assert_eq!(raw(Command::offset(0.0, Attenuation::Off).unwrap()), "/DD800.");
        assert_eq!(raw(Command::offset(-10.0, Attenuation::On).unwrap()), "/DD1<1.");
    }

    #[test]
    fn duty_and_cmos_commands() {
        assert_eq!(raw(Command::duty_cycle(50.0).unwrap()), "/DC80.");
        assert_eq!(raw(Command::duty_cycle(15.0).unwrap()), "/DC>7.");
        assert_eq!(raw(Command::cmos_level(14.0).unwrap()), "/DG1<.");
    }

    #[test]
    fn query_command() {
        assert_eq!(raw(Command::QueryFrequency), "/AK.");
    }

    #[test]
    fn last_message_skips_stale_and_incomplete() {
        let buf = b"/AK1234?.junk/AK5678<.incomplete";
        assert_eq!(last_message(buf).unwrap(), b"/AK5678<.");
    }

    #[test]
    fn last_message_single() {
        assert_eq!(last_message(b"/AK27103.").unwrap(), b"/AK27103.");
        assert_eq!(last_message(b"/AK27103...").unwrap(), b"/AK27103.");
    }

    #[test]
    fn empty_buffer_is_no_response() {
        assert!(matches!(last_message(b""), Err(Error::NoResponse)));
        assert!(matches!(last_message(b"/AK1234"), Err(Error::NoResponse)));
        assert!(matches!(last_message(b"..."), Err(Error::NoResponse)));
        assert!(matches!(FrequencyReading::from_raw(b""), Err(Error::NoResponse)));
    }

    #[test]
    fn reading_decodes_code_and_band() {
        let reading = FrequencyReading::from_raw(b"/AK27103.").unwrap();
        assert_eq!(reading.band.code(), 3);
        assert_eq!(reading.code, 10_000);
        assert_eq!(reading.hz(), 1_000.0);

        let reading = FrequencyReading::from_raw(b"/AK55?04.").unwrap();
        assert_eq!(reading.hz(), 22_000.0);
    }

    #[test]
    fn reading_uses_latest_message() {
        let reading = FrequencyReading::from_raw(b"/AK27103./AK55?04.").unwrap();
        assert_eq!(reading.hz(), 22_000.0);
    }

    #[test]
    fn wrong_header_is_unexpected() {
        assert!(matches!(
            FrequencyReading::from_raw(b"/ZZ1234."),
            Err(Error::UnexpectedResponse(_))
        ));
        assert!(matches!(
            FrequencyReading::from_raw(b"junk."),
            Err(Error::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn missing_digits_or_bad_band_is_unexpected() {
        assert!(matches!(
            FrequencyReading::from_raw(b"/AK."),
            Err(Error::UnexpectedResponse(_))
        ));
        assert!(matches!(
            FrequencyReading::from_raw(b"/AK3."),
            Err(Error::UnexpectedResponse(_))
        ));
        // band digit 'C' has no table entry
        assert!(matches!(
            FrequencyReading::from_raw(b"/AK5678<."),
            Err(Error::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn foreign_symbol_is_decoding_error() {
        match FrequencyReading::from_raw(b"/AK27x03.") {
            Err(Error::Decoding(c)) => assert_eq!(c, 'x'),
            other => panic!("expected decoding error, got {:?}", other),
        }
    }

    #[test]
    fn non_ascii_symbol_is_decoding_error() {
        match FrequencyReading::from_raw(b"/AK27\xff03.") {
            Err(Error::Decoding(c)) => assert_eq!(c, '\u{ff}'),
            other => panic!("expected decoding error, got {:?}", other),
        }
    }
}
