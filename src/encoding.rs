//! Physical value to device code mappings.
//!
//! Every encoder validates the input against the instrument's documented
//! range first, then applies a linear (or banded) transform and rounds to
//! the nearest integer code.

use std::{fmt, str::FromStr};

use clap::{ValueEnum, builder::PossibleValue};

use crate::error::{Error, Result};

/// Upper bound of the highest frequency band.
pub const MAX_FREQUENCY_HZ: f64 = 2_200_000.0;

/// Normalised frequency codes are fractions of the band scale, times this.
const FREQUENCY_CODE_SCALE: f64 = 1e4;

/// One of the seven frequency ranges of the instrument.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrequencyBand(u8);

/// `(max_hz, scale)` per band, ordered by band code.
const BANDS: [(f64, f64); 7] = [
    (2.2, 1.0),
    (22.0, 10.0),
    (220.0, 100.0),
    (2_200.0, 1e3),
    (22_000.0, 1e4),
    (220_000.0, 1e5),
    (2_200_000.0, 1e6),
];

impl FrequencyBand {
    /// Pick the lowest band whose maximum is at least `hz`.
    pub fn select(hz: f64) -> Result<Self> {
        if !(0.0..=MAX_FREQUENCY_HZ).contains(&hz) {
            return Err(Error::range("frequency", hz, 0.0, MAX_FREQUENCY_HZ, "Hz"));
        }
        BANDS
            .iter()
            .position(|&(max, _)| hz <= max)
            .map(|i| FrequencyBand(i as u8))
            .ok_or_else(|| Error::range("frequency", hz, 0.0, MAX_FREQUENCY_HZ, "Hz"))
    }

    pub fn from_code(code: u8) -> Option<Self> {
        (usize::from(code) < BANDS.len()).then_some(FrequencyBand(code))
    }

    pub const fn code(&self) -> u8 {
        self.0
    }

    /// Hz represented by a normalised code of 10000 in this band.
    pub fn scale(&self) -> f64 {
        BANDS[usize::from(self.0)].1
    }

    pub fn max_hz(&self) -> f64 {
        BANDS[usize::from(self.0)].0
    }
}

impl fmt::Display for FrequencyBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let max = self.max_hz();
        if max >= 1e6 {
            write!(f, "{} MHz", max / 1e6)
        } else if max >= 1e3 {
            write!(f, "{} kHz", max / 1e3)
        } else {
            write!(f, "{} Hz", max)
        }
    }
}

/// Band and 4-digit code for a frequency.
pub fn frequency_code(hz: f64) -> Result<(FrequencyBand, u16)> {
    let band = FrequencyBand::select(hz)?;
    let code = (hz / band.scale() * FREQUENCY_CODE_SCALE).round();
    Ok((band, code as u16))
}

/// Inverse of [`frequency_code`].
pub fn frequency_from_code(band: FrequencyBand, code: u32) -> f64 {
    f64::from(code) * band.scale() / FREQUENCY_CODE_SCALE
}

/// 0-20 Vpp maps onto 128-228.
pub fn output_level_code(vpp: f64) -> Result<u8> {
    if !(0.0..=20.0).contains(&vpp) {
        return Err(Error::range("output level", vpp, 0.0, 20.0, "Vpp"));
    }
    Ok(((vpp / 0.2).round() + 128.0) as u8)
}

/// -10 V to +10 V maps onto 28-228.
pub fn offset_code(volts: f64) -> Result<u8> {
    if !(-10.0..=10.0).contains(&volts) {
        return Err(Error::range("offset", volts, -10.0, 10.0, "V"));
    }
    let ratio = (volts + 10.0) / 20.0;
    let code = (ratio * 200.0 + 28.0).round().clamp(28.0, 228.0);
    Ok(code as u8)
}

/// 85 % to 15 % maps onto 25-231 (inverted).
pub fn duty_cycle_code(percent: f64) -> Result<u8> {
    if !(15.0..=85.0).contains(&percent) {
        return Err(Error::range("duty cycle", percent, 15.0, 85.0, "%"));
    }
    let ratio = (85.0 - percent) / 70.0;
    let code = (ratio * 206.0 + 25.0).round().clamp(25.0, 231.0);
    Ok(code as u8)
}

/// 14 V to 4 V maps onto 28-128 (inverted).
pub fn cmos_level_code(volts: f64) -> Result<u8> {
    if !(4.0..=14.0).contains(&volts) {
        return Err(Error::range("CMOS level", volts, 4.0, 14.0, "V"));
    }
    let ratio = (14.0 - volts) / 10.0;
    Ok((ratio * 100.0 + 28.0).round() as u8)
}

/// Output waveform shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Waveform {
    Square,
    Triangle,
    Sine,
}

impl Waveform {
    /// Single unencoded digit sent after `G2`.
    pub const fn code(&self) -> char {
        match self {
            Waveform::Square => '1',
            Waveform::Triangle => '2',
            Waveform::Sine => '4',
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Waveform::Square => "square",
            Waveform::Triangle => "triangle",
            Waveform::Sine => "sine",
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Waveform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "square" => Ok(Waveform::Square),
            "triangle" => Ok(Waveform::Triangle),
            "sine" => Ok(Waveform::Sine),
            _ => Err(Error::UnknownWaveform(s.to_string())),
        }
    }
}

impl ValueEnum for Waveform {
    fn value_variants<'a>() -> &'a [Self] {
        &[Waveform::Square, Waveform::Triangle, Waveform::Sine]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        match self {
            Waveform::Square => Some(PossibleValue::new("square").aliases(["sq"])),
            Waveform::Triangle => Some(PossibleValue::new("triangle").aliases(["tri"])),
            Waveform::Sine => Some(PossibleValue::new("sine").aliases(["sin"])),
        }
    }
}

/// Attenuation flag appended to level and offset commands.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Attenuation {
    #[default]
    Off,
    On,
}

impl Attenuation {
    pub const fn digit(&self) -> char {
        match self {
            Attenuation::Off => '0',
            Attenuation::On => '1',
        }
    }
}

impl From<bool> for Attenuation {
    fn from(on: bool) -> Self {
        if on { Attenuation::On } else { Attenuation::Off }
    }
}

impl TryFrom<u8> for Attenuation {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Attenuation::Off),
            1 => Ok(Attenuation::On),
            _ => Err(Error::range("attenuation", f64::from(value), 0.0, 1.0, "")),
        }
    }
}
