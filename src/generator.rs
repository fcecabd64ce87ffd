//! High level control of the function generator.

use std::{thread::sleep, time::Duration};

use crate::{
    Command, Transport,
    config::{GeneratorConfig, SettleDelays},
    encoding::{Attenuation, Waveform},
    error::Result,
    protocol::FrequencyReading,
    transport::SerialTransport,
};

pub struct FunctionGenerator<T: Transport> {
    transport: T,
    delays: SettleDelays,
    /// Read timeout for query answers
    timeout: Duration,
}

impl FunctionGenerator<SerialTransport> {
    pub fn open(config: &GeneratorConfig) -> Result<Self> {
        let transport = SerialTransport::open(&config.port, config.baud_rate, config.timeout())?;
        Ok(FunctionGenerator::new(transport, config.delays, config.timeout()))
    }
}

impl<T: Transport> FunctionGenerator<T> {
    pub fn new(transport: T, delays: SettleDelays, timeout: Duration) -> Self {
        FunctionGenerator {
            transport,
            delays,
            timeout,
        }
    }

    pub fn delays(&self) -> &SettleDelays {
        &self.delays
    }

    pub fn set_delays(&mut self, delays: SettleDelays) {
        self.delays = delays;
    }

    /// Select the matching band, then send the frequency value.
    ///
    /// Waits `band_select` between the two writes and `frequency_settle` after.
    pub fn set_frequency(&mut self, hz: f64) -> Result<()> {
        let [band, value] = Command::frequency(hz)?;
        self.transport.send_command(&band)?;
        pause(self.delays.band_select);
        self.transport.send_command(&value)?;
        log::info!("Frequency set to {} Hz", hz);
        pause(self.delays.frequency_settle);
        Ok(())
    }

    pub fn set_waveform(&mut self, wave: Waveform) -> Result<()> {
        self.apply(Command::Waveform(wave))?;
        log::info!("Waveform set to {}", wave);
        Ok(())
    }

    /// Amplitude in Vpp, 0-20.
    pub fn set_output_level(&mut self, vpp: f64, attenuation: Attenuation) -> Result<()> {
        self.apply(Command::output_level(vpp, attenuation)?)?;
        log::info!("Output level set to {} Vpp ({:?} attenuation)", vpp, attenuation);
        Ok(())
    }

    /// DC offset in volts, -10 to +10.
    pub fn set_offset(&mut self, volts: f64, attenuation: Attenuation) -> Result<()> {
        self.apply(Command::offset(volts, attenuation)?)?;
        log::info!("Offset set to {} V", volts);
        Ok(())
    }

    /// Duty cycle in percent, 15-85.
    pub fn set_duty_cycle(&mut self, percent: f64) -> Result<()> {
        self.apply(Command::duty_cycle(percent)?)?;
        log::info!("Duty cycle set to {}%", percent);
        Ok(())
    }

    /// CMOS output level in volts, 4-14.
    pub fn set_cmos_level(&mut self, volts: f64) -> Result<()> {
        self.apply(Command::cmos_level(volts)?)?;
        log::info!("CMOS level set to {} V", volts);
        Ok(())
    }

    /// Query the frequency the instrument is currently generating.
    pub fn frequency(&mut self) -> Result<FrequencyReading> {
        self.transport.send_command(&Command::QueryFrequency)?;
        pause(self.delays.response);
        let raw = self.transport.recv_raw(self.timeout)?;
        log::debug!("<= {}", String::from_utf8_lossy(&raw));
        FrequencyReading::from_raw(&raw)
    }

    /// Release the transport. Dropping it closes the port.
    pub fn close(self) -> T {
        log::debug!("Closing connection");
        self.transport
    }

    fn apply(&mut self, cmd: Command) -> Result<()> {
        self.transport.send_command(&cmd)?;
        pause(self.delays.inter_command);
        Ok(())
    }
}

fn pause(d: Duration) {
    if !d.is_zero() {
        sleep(d);
    }
}
