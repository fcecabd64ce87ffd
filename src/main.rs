use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use pw2102::{
    Attenuation, FunctionGenerator, GeneratorConfig, SettleDelays, Waveform,
    transport::SerialTransport,
};

type Generator = FunctionGenerator<SerialTransport>;

#[derive(clap::Parser)]
#[command(
    name = "pw2102",
    about = "Control a PW2102 function generator over its serial port"
)]
struct Cli {
    /// Serial port the generator is attached to, e.g. COM2 or /dev/ttyUSB0
    #[arg(short, long, global = true)]
    port: Option<String>,
    #[arg(short, long, global = true)]
    baud: Option<u32>,
    /// YAML file with port, baud_rate, timeout_ms and delays
    #[arg(short, long, global = true)]
    config: Option<String>,
    /// Skip all settle delays between commands
    #[arg(long, global = true)]
    no_settle: bool,
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Cmd,
}

#[derive(clap::Subcommand)]
enum Cmd {
    /// List available serial ports
    Ports,
    /// Set the output frequency in Hz (0 to 2.2 MHz)
    Frequency { hz: f64 },
    /// Set the output waveform
    Waveform {
        #[arg(value_enum)]
        wave: Waveform,
    },
    /// Set the amplitude in Vpp (0 to 20)
    Level {
        vpp: f64,
        #[arg(long)]
        attenuate: bool,
    },
    /// Set the DC offset in volts (-10 to +10)
    Offset {
        #[arg(allow_negative_numbers = true)]
        volts: f64,
        #[arg(long)]
        attenuate: bool,
    },
    /// Set the duty cycle in percent (15 to 85)
    Duty { percent: f64 },
    /// Set the CMOS output level in volts (4 to 14)
    Cmos { volts: f64 },
    /// Read back the current frequency
    Read,
    /// Configure the output once, then step through a range of frequencies
    Sweep {
        #[arg(long)]
        start: f64,
        #[arg(long)]
        step: f64,
        #[arg(long)]
        count: usize,
        #[arg(long, value_enum, default_value_t = Waveform::Sine)]
        waveform: Waveform,
        #[arg(long, default_value_t = 10.0)]
        level: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        offset: f64,
        #[arg(long, default_value_t = 50.0)]
        duty: f64,
        /// Seconds to hold each frequency, overrides the configured settle delay
        #[arg(long)]
        dwell: Option<f64>,
    },
}

impl Cli {
    fn generator_config(&self) -> Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::load(path)?,
            None => {
                let Some(port) = &self.port else {
                    anyhow::bail!("no serial port given, use --port or --config");
                };
                GeneratorConfig::new(port.clone())
            }
        };
        if let Some(port) = &self.port {
            config.port = port.clone();
        }
        if let Some(baud) = self.baud {
            config.baud_rate = baud;
        }
        if self.no_settle {
            config.delays = SettleDelays::none();
        }
        Ok(config)
    }

    fn open_generator(&self) -> Result<Generator> {
        Ok(FunctionGenerator::open(&self.generator_config()?)?)
    }
}

fn dwell_delay(secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .with_context(|| format!("invalid dwell of {} seconds", secs))
}

#[allow(clippy::too_many_arguments)]
fn sweep(
    fg: &mut Generator,
    start: f64,
    step: f64,
    count: usize,
    waveform: Waveform,
    level: f64,
    offset: f64,
    duty: f64,
) -> Result<()> {
    fg.set_waveform(waveform)?;
    fg.set_output_level(level, Attenuation::Off)?;
    fg.set_offset(offset, Attenuation::Off)?;
    fg.set_duty_cycle(duty)?;

    let bar = ProgressBar::new(count as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );
    for i in 0..count {
        let hz = start + i as f64 * step;
        bar.set_message(format!("{} Hz", hz));
        fg.set_frequency(hz)?;
        bar.inc(1);
    }
    bar.finish_with_message("done");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };
    let _ = simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );

    match &cli.command {
        Cmd::Ports => {
            for port in SerialTransport::scan_ports()? {
                println!("{}", port);
            }
        }
        Cmd::Frequency { hz } => cli.open_generator()?.set_frequency(*hz)?,
        Cmd::Waveform { wave } => cli.open_generator()?.set_waveform(*wave)?,
        Cmd::Level { vpp, attenuate } => cli
            .open_generator()?
            .set_output_level(*vpp, Attenuation::from(*attenuate))?,
        Cmd::Offset { volts, attenuate } => cli
            .open_generator()?
            .set_offset(*volts, Attenuation::from(*attenuate))?,
        Cmd::Duty { percent } => cli.open_generator()?.set_duty_cycle(*percent)?,
        Cmd::Cmos { volts } => cli.open_generator()?.set_cmos_level(*volts)?,
        Cmd::Read => {
            let reading = cli.open_generator()?.frequency()?;
            println!("{}", reading);
        }
        Cmd::Sweep {
            start,
            step,
            count,
            waveform,
            level,
            offset,
            duty,
            dwell,
        } => {
            let settle = (*dwell).map(dwell_delay).transpose()?;
            let mut fg = cli.open_generator()?;
            if let Some(settle) = settle {
                let mut delays = *fg.delays();
                delays.frequency_settle = settle;
                fg.set_delays(delays);
            }
            sweep(
                &mut fg, *start, *step, *count, *waveform, *level, *offset, *duty,
            )?;
        }
    }

    Ok(())
}
