// quadio test application -- CLI tool for exercising the four module
// families (DI4, DO4, RT4, AO4) against real hardware.
//
// Usage:
//   quadio-test-app --module di4 --port /dev/ttyACM0 identify
//   quadio-test-app --module di4 --port /dev/ttyACM0 get --channel 0
//   quadio-test-app --module di4 --port /dev/ttyACM0 get-group --channels 0,2
//   quadio-test-app --module do4 --port /dev/ttyACM0 set-digital --channel 1 --state on
//   quadio-test-app --module ao4 --port /dev/ttyACM0 set-volts --channel 0 --volts 2.5
//   quadio-test-app --module rt4 --port /dev/ttyACM0 get --channel 0 --kind temperature2
//   quadio-test-app --module di4 --port /dev/ttyACM0 param-get --address 0x1111 --channel 0
//   quadio-test-app --module rt4 --port /dev/ttyACM0 calibrate --channel 0 --options 0x10
//   quadio-test-app list

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use quadio::modules::{ao4, di4, do4, rt4};
use quadio::{
    supported_modules, IoModule, ModuleProfile, Reply, SerialTransport, Value, ValueKind,
};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// quadio test application -- exercises I/O modules from the command line.
#[derive(Parser)]
#[command(name = "quadio-test-app", version, about)]
struct Cli {
    /// Module family: di4, do4, rt4, ao4.
    /// Required for all commands except `list`.
    #[arg(long)]
    module: Option<ModuleArg>,

    /// Serial port path (e.g. /dev/ttyACM0, COM16).
    #[arg(long)]
    port: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModuleArg {
    Di4,
    Do4,
    Rt4,
    Ao4,
}

impl ModuleArg {
    fn profile(self) -> &'static ModuleProfile {
        match self {
            ModuleArg::Di4 => &di4::PROFILE,
            ModuleArg::Do4 => &do4::PROFILE,
            ModuleArg::Rt4 => &rt4::PROFILE,
            ModuleArg::Ao4 => &ao4::PROFILE,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Digital,
    Counter,
    AnalogU2,
    AnalogS2,
    AnalogS4,
    Resistance2,
    Temperature2,
    Temperature4,
}

impl From<KindArg> for ValueKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Digital => ValueKind::Digital,
            KindArg::Counter => ValueKind::Counter,
            KindArg::AnalogU2 => ValueKind::AnalogU2,
            KindArg::AnalogS2 => ValueKind::AnalogS2,
            KindArg::AnalogS4 => ValueKind::AnalogS4,
            KindArg::Resistance2 => ValueKind::Resistance2,
            KindArg::Temperature2 => ValueKind::Temperature2,
            KindArg::Temperature4 => ValueKind::Temperature4,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// List the supported module families.
    List,

    /// Identify the attached module and print its metadata.
    Identify,

    /// Read one channel.
    Get {
        #[arg(long)]
        channel: u8,
        /// Value kind to request; defaults to the module's first readable
        /// kind.
        #[arg(long)]
        kind: Option<KindArg>,
    },

    /// Read several channels in one exchange.
    GetGroup {
        /// Comma-separated channel indices, e.g. `0,2,3`.
        #[arg(long)]
        channels: String,
        #[arg(long)]
        kind: Option<KindArg>,
    },

    /// Write a digital channel.
    SetDigital {
        #[arg(long)]
        channel: u8,
        /// `on` or `off`.
        #[arg(long)]
        state: String,
    },

    /// Write an analog channel in volts.
    SetVolts {
        #[arg(long)]
        channel: u8,
        #[arg(long)]
        volts: f64,
        /// Wire encoding to use.
        #[arg(long, default_value = "analog-s4")]
        kind: KindArg,
    },

    /// Read a configuration parameter's raw bytes.
    ParamGet {
        /// Parameter address (hex, e.g. 0x1111).
        #[arg(long, value_parser = parse_hex_u16)]
        address: u16,
        #[arg(long)]
        channel: u8,
    },

    /// Write a configuration parameter from raw hex bytes.
    ParamSet {
        #[arg(long, value_parser = parse_hex_u16)]
        address: u16,
        #[arg(long)]
        channel: u8,
        /// Parameter bytes as hex, e.g. `0x20` or `64000000`.
        #[arg(long)]
        data: String,
        #[arg(long)]
        persistent: bool,
    },

    /// Run a channel calibration cycle.
    Calibrate {
        #[arg(long)]
        channel: u8,
        /// Module-specific calibration options (hex).
        #[arg(long, value_parser = parse_hex_u8, default_value = "0x00")]
        options: u8,
        #[arg(long)]
        persistent: bool,
    },
}

fn parse_hex_u16(s: &str) -> std::result::Result<u16, String> {
    let trimmed = s.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(trimmed, 16).map_err(|e| e.to_string())
}

fn parse_hex_u8(s: &str) -> std::result::Result<u8, String> {
    let trimmed = s.trim_start_matches("0x").trim_start_matches("0X");
    u8::from_str_radix(trimmed, 16).map_err(|e| e.to_string())
}

fn parse_hex_bytes(s: &str) -> Result<Vec<u8>> {
    let trimmed = s.trim_start_matches("0x").trim_start_matches("0X");
    if trimmed.is_empty() || trimmed.len() % 2 != 0 {
        bail!("hex data must be a non-empty, even-length string");
    }
    (0..trimmed.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&trimmed[i..i + 2], 16)
                .with_context(|| format!("bad hex byte at offset {i}"))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

fn print_value(channel: u8, value: &Value) {
    if let Some(state) = value.as_digital() {
        println!("channel {channel}: {}", if state { "on" } else { "off" });
    } else if let Some(count) = value.as_counter() {
        println!("channel {channel}: {count} counts");
    } else if let Some(volts) = value.as_volts() {
        println!("channel {channel}: {volts:.6} V");
    } else if let Some(degrees) = value.as_celsius() {
        println!("channel {channel}: {degrees:.2} C");
    } else if let Some(ohms) = value.as_ohms() {
        println!("channel {channel}: {ohms:.1} ohm");
    } else {
        println!("channel {channel}: {value:?}");
    }
}

fn selector_from_list(profile: &ModuleProfile, list: &str) -> Result<Vec<bool>> {
    let mut selector = vec![false; profile.nr_of_channels as usize];
    for part in list.split(',') {
        let index: usize = part
            .trim()
            .parse()
            .with_context(|| format!("bad channel index '{part}'"))?;
        let slot = selector
            .get_mut(index)
            .with_context(|| format!("channel {index} out of range"))?;
        *slot = true;
    }
    Ok(selector)
}

async fn connect(module: ModuleArg, port: &str) -> Result<IoModule> {
    let transport = SerialTransport::new(port);
    let mut module = IoModule::new(module.profile(), Box::new(transport));
    module
        .open()
        .await
        .with_context(|| format!("opening {port}"))?;
    Ok(module)
}

async fn run_identify(module: &mut IoModule) -> Result<()> {
    let status = module.identify(0).await?;
    if !status.is_ok() {
        bail!("identify failed: {status}");
    }
    let id = module.device_id().context("identity missing after identify")?;
    println!(
        "class:    {}",
        module.device_class_name().unwrap_or("unknown")
    );
    println!(
        "type:     {}",
        module.device_type_name().unwrap_or("unknown")
    );
    println!("firmware: rev {}", id.revision_fw);
    println!("hardware: rev {}", id.revision_hw);
    println!("serial:   {}", id.serial);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Command::List = cli.command {
        for profile in supported_modules() {
            println!(
                "{:4}  class 0x{:04X}  {} channels",
                profile.name, profile.device_class, profile.nr_of_channels
            );
        }
        return Ok(());
    }

    let module_arg = cli.module.context("--module is required")?;
    let port = cli.port.context("--port is required")?;
    let mut module = connect(module_arg, &port).await?;

    // Run the command, then close the port whatever the outcome.
    let result = run(&mut module, cli.command).await;
    module.close().await?;
    result
}

async fn run(module: &mut IoModule, command: Command) -> Result<()> {
    match command {
        Command::List => unreachable!("handled in main"),

        Command::Identify => run_identify(module).await,

        Command::Get { channel, kind } => {
            let kind: ValueKind = match kind {
                Some(kind) => kind.into(),
                None => *module
                    .profile()
                    .input_kinds
                    .first()
                    .context("module has no readable channels")?,
            };
            match module.get_io(channel, kind).await? {
                Reply::Value(value) => {
                    print_value(channel, &value);
                    Ok(())
                }
                Reply::Failed(status) => bail!("module reported: {status}"),
            }
        }

        Command::GetGroup { channels, kind } => {
            let kind: ValueKind = match kind {
                Some(kind) => kind.into(),
                None => *module
                    .profile()
                    .input_kinds
                    .first()
                    .context("module has no readable channels")?,
            };
            let selector = selector_from_list(module.profile(), &channels)?;
            match module.get_io_group(&selector, kind).await? {
                Reply::Value(values) => {
                    let indices = selector
                        .iter()
                        .enumerate()
                        .filter(|(_, on)| **on)
                        .map(|(i, _)| i as u8);
                    for (channel, value) in indices.zip(values.iter()) {
                        print_value(channel, value);
                    }
                    Ok(())
                }
                Reply::Failed(status) => bail!("module reported: {status}"),
            }
        }

        Command::SetDigital { channel, state } => {
            let on = match state.as_str() {
                "on" | "1" | "true" => true,
                "off" | "0" | "false" => false,
                other => bail!("bad state '{other}', expected on/off"),
            };
            let status = module.set_io(channel, Value::Digital(on)).await?;
            if !status.is_ok() {
                bail!("module reported: {status}");
            }
            println!("channel {channel} set {}", if on { "on" } else { "off" });
            Ok(())
        }

        Command::SetVolts {
            channel,
            volts,
            kind,
        } => {
            let value = Value::volts(kind.into(), volts)?;
            let status = module.set_io(channel, value).await?;
            if !status.is_ok() {
                bail!("module reported: {status}");
            }
            println!("channel {channel} set to {volts} V");
            Ok(())
        }

        Command::ParamGet { address, channel } => {
            match module.get_param_raw(address, channel).await? {
                Reply::Value(bytes) => {
                    println!("0x{address:04X}[{channel}] = {bytes:02X?}");
                    Ok(())
                }
                Reply::Failed(status) => bail!("module reported: {status}"),
            }
        }

        Command::ParamSet {
            address,
            channel,
            data,
            persistent,
        } => {
            let bytes = parse_hex_bytes(&data)?;
            let status = module
                .set_param_raw(address, channel, persistent, &bytes)
                .await?;
            if !status.is_ok() {
                bail!("module reported: {status}");
            }
            println!("0x{address:04X}[{channel}] written");
            Ok(())
        }

        Command::Calibrate {
            channel,
            options,
            persistent,
        } => {
            let status = module.calibrate_io(channel, options, persistent).await?;
            if !status.is_ok() {
                bail!("module reported: {status}");
            }
            println!("channel {channel} calibration started");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parsers() {
        assert_eq!(parse_hex_u16("0x1111").unwrap(), 0x1111);
        assert_eq!(parse_hex_u16("1120").unwrap(), 0x1120);
        assert_eq!(parse_hex_u8("0x10").unwrap(), 0x10);
        assert!(parse_hex_u16("zz").is_err());

        assert_eq!(parse_hex_bytes("0x20").unwrap(), vec![0x20]);
        assert_eq!(parse_hex_bytes("64000000").unwrap(), vec![0x64, 0, 0, 0]);
        assert!(parse_hex_bytes("123").is_err());
        assert!(parse_hex_bytes("").is_err());
    }

    #[test]
    fn selector_parsing() {
        let selector = selector_from_list(&di4::PROFILE, "0,2").unwrap();
        assert_eq!(selector, vec![true, false, true, false]);
        assert!(selector_from_list(&di4::PROFILE, "5").is_err());
        assert!(selector_from_list(&di4::PROFILE, "x").is_err());
    }
}
