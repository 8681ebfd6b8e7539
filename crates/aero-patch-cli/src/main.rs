#![forbid(unsafe_code)]

mod config;

use aero_patch_engine::{parse_u32_literal, PatchEngine, ON_FRAME_SECTION, SPEEDHACKS_SECTION};
use anyhow::{anyhow, bail, Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::{Command, Config};

fn main() -> Result<()> {
    let config = Config::load();

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut engine = PatchEngine::new();
    engine
        .load_from_config(&config.engine)
        .context("load game ini files")?;

    match &config.command {
        Command::List { entries } => {
            for patch in engine.patches() {
                let mark = if patch.enabled { "[x]" } else { "[ ]" };
                let origin = if patch.user_defined { " (user)" } else { "" };
                println!(
                    "{mark} {}{origin}: {}",
                    patch.name,
                    entry_count(patch.entries.len())
                );
                if *entries {
                    for entry in &patch.entries {
                        println!("    {entry}");
                    }
                }
            }
            Ok(())
        }
        Command::Enable { name } => toggle(&mut engine, &config, name, true),
        Command::Disable { name } => toggle(&mut engine, &config, name, false),
        Command::Speedhack { address: None, .. } => {
            for (address, cycles) in engine.speed_hacks().iter() {
                println!("0x{address:08X} = {cycles}");
            }
            Ok(())
        }
        Command::Speedhack {
            address: Some(address),
            cycles: None,
        } => {
            println!("{}", engine.speedhack_cycles(parse_literal("address", address)?));
            Ok(())
        }
        Command::Speedhack {
            address: Some(address),
            cycles: Some(cycles),
        } => set_speedhack(
            &config,
            parse_literal("address", address)?,
            parse_literal("cycle count", cycles)?,
        ),
    }
}

fn entry_count(count: usize) -> String {
    match count {
        1 => "1 entry".to_string(),
        n => format!("{n} entries"),
    }
}

fn parse_literal(what: &str, text: &str) -> Result<u32> {
    parse_u32_literal(text).ok_or_else(|| anyhow!("invalid {what} {text:?}"))
}

fn toggle(engine: &mut PatchEngine, config: &Config, name: &str, enabled: bool) -> Result<()> {
    let Some(local_path) = config.engine.local_ini.as_deref() else {
        bail!("--local-ini is required to save patch state");
    };

    if !engine.set_enabled(name, enabled) {
        bail!("no patch named {name:?}");
    }

    // Re-read so sections the engine does not own are written back untouched.
    let mut local = config.engine.load_local()?;
    engine
        .save_patch_section()
        .store(&mut local, ON_FRAME_SECTION);
    local
        .save(local_path)
        .with_context(|| format!("save {}", local_path.display()))?;

    tracing::info!(patch = name, enabled, "saved patch state");
    println!("{} {name}", if enabled { "enabled" } else { "disabled" });
    Ok(())
}

fn set_speedhack(config: &Config, address: u32, cycles: u32) -> Result<()> {
    let Some(local_path) = config.engine.local_ini.as_deref() else {
        bail!("--local-ini is required to save speed hacks");
    };

    let key = format!("0x{address:08X}");
    let mut local = config.engine.load_local()?;
    let previous = local.get(SPEEDHACKS_SECTION, &key);
    local.set(SPEEDHACKS_SECTION, &key, &cycles.to_string());
    local
        .save(local_path)
        .with_context(|| format!("save {}", local_path.display()))?;

    tracing::info!(address = %key, cycles, previous = ?previous, "saved speed hack");
    println!("{key} = {cycles}");
    Ok(())
}
