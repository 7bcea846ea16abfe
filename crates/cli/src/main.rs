//! mousecfg CLI: command-line mouse configuration tool.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mousecfg_core::device::{self, MouseModel};
use mousecfg_core::transport::{is_device_plugged, ENV_DRY_RUN, ENV_FAKE_DEVICE};
use mousecfg_core::{Mouse, Profile, TransportConfig, Value};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mousecfg", version, about = "Configure USB HID gaming mice")]
struct Cli {
    /// Do not touch the device; record reports in memory instead.
    /// Accepts 1/0, true/false, yes/no and on/off from the environment.
    #[arg(
        long,
        global = true,
        env = "MOUSECFG_DRY_RUN",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    dry_run: bool,

    /// Pretend this device (VVVV:PPPP, hex) is the only one plugged in. Implies --dry-run.
    #[arg(
        long,
        global = true,
        env = "MOUSECFG_FAKE_DEVICE",
        value_name = "VVVV:PPPP"
    )]
    fake_device: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Target {
    /// Built-in model, e.g. rival100 (see `list`).
    #[arg(long, short, conflicts_with = "profile_file")]
    model: Option<String>,

    /// JSON profile file describing the device and its commands.
    #[arg(long, value_name = "PATH")]
    profile_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported mice and whether they are plugged in.
    List {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Show the commands a mouse understands.
    Commands {
        #[command(flatten)]
        target: Target,
    },
    /// Run commands, e.g. `set_color=#ff0000 set_polling_rate=500 save`.
    Set {
        #[command(flatten)]
        target: Target,
        /// NAME=VALUE pairs, or NAME alone for commands without a value.
        #[arg(required = true, value_name = "NAME=VALUE")]
        assignments: Vec<String>,
    },
    /// Restore every setting that has a factory default.
    Reset {
        #[command(flatten)]
        target: Target,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// The CLI flags are the key-value source of the transport selection.
fn transport_config(cli: &Cli) -> Result<TransportConfig> {
    let config = TransportConfig::from_lookup(|key| match key {
        ENV_DRY_RUN => cli.dry_run.then(|| "1".to_string()),
        ENV_FAKE_DEVICE => cli.fake_device.clone(),
        _ => None,
    })?;
    Ok(config)
}

fn load_profile(target: &Target, config: &TransportConfig) -> Result<Profile> {
    if let Some(path) = &target.profile_file {
        let context = format!("loading profile {}", path.display());
        return Profile::load(path).context(context);
    }
    if let Some(name) = &target.model {
        let Some(model) = MouseModel::from_name(name) else {
            anyhow::bail!("Unknown model '{name}'. Run `mousecfg list` for supported models");
        };
        return Ok(model.profile());
    }
    let models = device::discover(config);
    let Some(model) = models.first() else {
        anyhow::bail!("No supported mouse found. Plug one in, or pass --model / --profile-file");
    };
    Ok(model.profile())
}

fn parse_assignment(arg: &str) -> (&str, Value) {
    match arg.split_once('=') {
        Some((name, value)) => (name.trim(), Value::from_cli(value)),
        None => (arg.trim(), Value::None),
    }
}

fn print_commands(profile: &Profile) {
    println!("{} ({})", profile.name, profile.identity);
    for (name, spec) in &profile.commands {
        let default = spec
            .default
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {name:<22} {:<12} wValue=0x{:04X}  default: {default}",
            spec.value_type.as_str(),
            spec.w_value
        );
        if let Some(description) = &spec.description {
            println!("  {:<22} {description}", "");
        }
        if !spec.choices.is_empty() {
            let labels: Vec<&str> = spec.choices.keys().map(String::as_str).collect();
            println!("  {:<22} choices: {}", "", labels.join(", "));
        }
        if let (Some(min), Some(max)) = (spec.min, spec.max) {
            println!("  {:<22} range: {min}..={max}", "");
        }
        if !spec.buttons.is_empty() {
            let actions: Vec<&str> = spec.actions.keys().map(String::as_str).collect();
            println!("  {:<22} buttons: {}", "", spec.buttons.join(", "));
            println!("  {:<22} actions: {}", "", actions.join(", "));
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = transport_config(&cli)?;
    tracing::debug!(?config, "Transport selected");
    if config.is_simulated() {
        eprintln!("Dry run: no report will reach the device.");
    }

    match &cli.command {
        Commands::List { json } => {
            let rows: Vec<(MouseModel, bool)> = MouseModel::ALL
                .iter()
                .map(|m| {
                    let id = m.identity();
                    (*m, is_device_plugged(&config, id.vendor_id, id.product_id))
                })
                .collect();
            if *json {
                let out: Vec<serde_json::Value> = rows
                    .iter()
                    .map(|(m, plugged)| {
                        serde_json::json!({
                            "model": m.key(),
                            "name": m.name(),
                            "vendor_id": format!("{:04X}", m.identity().vendor_id),
                            "product_id": format!("{:04X}", m.identity().product_id),
                            "plugged": plugged,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                for (model, plugged) in &rows {
                    let id = model.identity();
                    println!(
                        "{:<10} {} (VID: 0x{:04X}, PID: 0x{:04X}){}",
                        model.key(),
                        model.name(),
                        id.vendor_id,
                        id.product_id,
                        if *plugged { "  [plugged]" } else { "" }
                    );
                }
            }
        }
        Commands::Commands { target } => {
            let profile = load_profile(target, &config)?;
            print_commands(&profile);
        }
        Commands::Set {
            target,
            assignments,
        } => {
            let profile = load_profile(target, &config)?;
            let mut mouse = Mouse::open(profile, &config)?;
            for arg in assignments {
                let (name, value) = parse_assignment(arg);
                mouse
                    .run(name, &value)
                    .with_context(|| format!("running '{name}'"))?;
                println!("{name}: {value}");
            }
            mouse.close()?;
        }
        Commands::Reset { target } => {
            let profile = load_profile(target, &config)?;
            let mut mouse = Mouse::open(profile, &config)?;
            mouse.set_default()?;
            println!("{mouse}: defaults restored");
            mouse.close()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn assignment_with_and_without_value() {
        assert_eq!(
            parse_assignment("set_color=#ff0000"),
            ("set_color", Value::Text("#ff0000".into()))
        );
        assert_eq!(parse_assignment("save"), ("save", Value::None));
        assert_eq!(parse_assignment("set_color="), ("set_color", Value::None));
    }

    #[test]
    fn fake_device_flag_selects_simulation() {
        let cli = Cli::parse_from(["mousecfg", "--fake-device", "1038:1702", "list"]);
        let config = transport_config(&cli).unwrap();
        assert!(config.is_simulated());
        assert!(is_device_plugged(&config, 0x1038, 0x1702));
    }

    #[test]
    fn dry_run_env_accepts_boolish_values() {
        std::env::set_var(ENV_DRY_RUN, "1");
        let cli = Cli::try_parse_from(["mousecfg", "list"]);
        std::env::remove_var(ENV_DRY_RUN);

        let cli = cli.unwrap();
        assert!(cli.dry_run);
        assert!(transport_config(&cli).unwrap().is_simulated());
    }

    #[test]
    fn set_requires_assignments() {
        assert!(Cli::try_parse_from(["mousecfg", "set", "--model", "rival100"]).is_err());
    }
}
