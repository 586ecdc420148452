//! # Zebconf CLI
//!
//! Command-line interface for configuring Zebra printers.
//!
//! ## Usage
//!
//! ```bash
//! # Read variables (USB printer)
//! zebconf get device.friendly_name appl.name
//!
//! # Set variables on a network printer
//! zebconf set -d 192.168.1.50 device.friendly_name=Shipping ip.dhcp.enable=on
//!
//! # Store and fetch files
//! zebconf push -d /dev/usb/lp0 LOGO.GRF
//! zebconf ls
//!
//! # Join a WPA-PSK network, then reset
//! zebconf wifi TestNet -p hunter2 --country US
//!
//! # Check a firmware archive without sending it
//! zebconf upgrade V84.20.18Z.zip --check
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};
use regex::Regex;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use zebconf::{
    ConnectionConfig, Firmware, ZebraDevice, ZebraError,
    schema::WifiAuth,
};

/// Zebconf - Zebra printer configuration
#[derive(Parser, Debug)]
#[command(name = "zebconf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// More logging (repeatable)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Less logging (repeatable)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    quiet: u8,

    /// Device path, host[:port], or omit for USB
    #[arg(short, long, global = true, env = "ZEBCONF_DEVICE")]
    device: Option<String>,

    /// Read timeout in seconds
    #[arg(short, long, global = true, env = "ZEBCONF_TIMEOUT", default_value = "2.0")]
    timeout: f64,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get variable(s)
    Get {
        #[arg(value_name = "NAME", required = true)]
        variables: Vec<String>,
    },

    /// Set variable(s)
    Set {
        #[arg(value_name = "NAME=VALUE", required = true, value_parser = parse_name_value)]
        variables: Vec<(String, String)>,
    },

    /// Reset device
    Reset,

    /// Restore configuration defaults
    Restore { category: String },

    /// List files
    Ls,

    /// Remove file
    Rm { filename: String },

    /// Rename file
    Mv { oldname: String, newname: String },

    /// Print file contents
    Cat { filename: String },

    /// Download file
    Pull {
        filename: String,

        /// Local output path (defaults to the file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Upload file
    Push {
        filename: String,

        /// Local input path (defaults to the file name)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Upgrade firmware
    Upgrade {
        firmware: PathBuf,

        /// Only validate the archive
        #[arg(long)]
        check: bool,
    },

    /// Configure WiFi
    Wifi {
        essid: String,

        /// Network passphrase
        #[arg(short, long)]
        password: Option<String>,

        /// Use WPA-PSK (the default)
        #[arg(long, conflicts_with = "auth")]
        wpa_psk: bool,

        /// Authentication scheme
        #[arg(long)]
        auth: Option<String>,

        /// Regulatory country code
        #[arg(long)]
        country: Option<String>,

        /// Do not reset the printer afterwards
        #[arg(long)]
        no_reset: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Map `-v`/`-q` counts onto a default filter; `RUST_LOG` wins if set.
fn init_logging(verbose: u8, quiet: u8) {
    const LEVELS: [&str; 4] = ["error", "warn", "info", "debug"];
    let index = (2 + verbose as i32 - quiet as i32).max(0) as usize;
    let level = LEVELS.get(index).copied().unwrap_or("trace");

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Parse a `name=value` argument.
fn parse_name_value(s: &str) -> Result<(String, String), String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern =
        PATTERN.get_or_init(|| Regex::new(r"^([\w.]+)=(.+)$").expect("name=value pattern is valid"));
    let caps = pattern
        .captures(s)
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    Ok((caps[1].to_string(), caps[2].to_string()))
}

/// Device-side name for a local path
fn device_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

fn run(cli: Cli) -> Result<(), ZebraError> {
    if !cli.timeout.is_finite() || cli.timeout < 0.0 {
        return Err(ZebraError::Value(format!("invalid timeout {}", cli.timeout)));
    }
    let config = ConnectionConfig::from_path(cli.device.as_deref())?
        .with_timeout(Duration::from_secs_f64(cli.timeout));

    // Validation alone needs no printer
    if let Commands::Upgrade {
        firmware,
        check: true,
    } = &cli.command
    {
        let firmware = Firmware::open(firmware)?;
        println!("{}", firmware.version());
        return Ok(());
    }

    let mut device = ZebraDevice::from_config(&config);
    device.session(|dev| execute(dev, cli.command))
}

fn execute(device: &mut ZebraDevice, command: Commands) -> Result<(), ZebraError> {
    match command {
        Commands::Get { variables } => {
            for name in variables {
                println!("{}", device.getvar(&name)?);
            }
        }
        Commands::Set { variables } => {
            for (name, value) in variables {
                device.setvar(&name, &value)?;
            }
        }
        Commands::Reset => device.reset()?,
        Commands::Restore { category } => device.restore_defaults(&category)?,
        Commands::Ls => println!("{}", device.list()?),
        Commands::Rm { filename } => device.delete(&filename)?,
        Commands::Mv { oldname, newname } => device.rename(&oldname, &newname)?,
        Commands::Cat { filename } => {
            let content = device.download(&filename)?;
            let mut stdout = io::stdout().lock();
            stdout.write_all(&content)?;
            stdout.flush()?;
        }
        Commands::Pull { filename, output } => {
            let output = output.unwrap_or_else(|| PathBuf::from(&filename));
            let content = device.download(&device_name(&filename))?;
            fs::write(&output, content)?;
            info!("saved {}", output.display());
        }
        Commands::Push { filename, input } => {
            let input = input.unwrap_or_else(|| PathBuf::from(&filename));
            let content = fs::read(&input)?;
            device.upload(&device_name(&filename), &content)?;
        }
        Commands::Upgrade { firmware, .. } => {
            let firmware = Firmware::open(firmware)?;
            device.upgrade(&firmware)?;
        }
        Commands::Wifi {
            essid,
            password,
            wpa_psk: _,
            auth,
            country,
            no_reset,
        } => {
            let auth = match auth {
                Some(scheme) => scheme.parse()?,
                None => WifiAuth::WpaPsk,
            };
            device.wifi(&essid, password.as_deref(), auth, country.as_deref())?;
            if !no_reset {
                device.reset()?;
            }
        }
    }
    Ok(())
}
