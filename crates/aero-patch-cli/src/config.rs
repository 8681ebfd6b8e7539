use std::path::PathBuf;

use aero_patch_engine::{PatchEngineConfig, SessionFlags};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "aero-patch", version)]
#[command(about = "Inspect and toggle per-frame memory patches in game ini files")]
pub struct Args {
    /// Shipped default game ini (read-only).
    ///
    /// Environment variable: `AERO_PATCH_GLOBAL_INI`.
    #[arg(long, env = "AERO_PATCH_GLOBAL_INI")]
    global_ini: Option<PathBuf>,

    /// User game ini. Toggles are written back to this file.
    ///
    /// Environment variable: `AERO_PATCH_LOCAL_INI`.
    #[arg(long, env = "AERO_PATCH_LOCAL_INI")]
    local_ini: Option<PathBuf>,

    /// Log filter (tracing-subscriber EnvFilter syntax).
    ///
    /// Environment variable: `AERO_PATCH_LOG_LEVEL`.
    #[arg(long, env = "AERO_PATCH_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List merged frame patches.
    List {
        /// Also print every entry of each patch.
        #[arg(long)]
        entries: bool,
    },
    /// Enable a patch and save the user ini.
    Enable { name: String },
    /// Disable a patch and save the user ini.
    Disable { name: String },
    /// List speed hacks, print the cycle count for one address (0 when there is none), or set it
    /// in the user ini.
    Speedhack {
        address: Option<String>,
        cycles: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub engine: PatchEngineConfig,
    pub log_level: String,
    pub command: Command,
}

impl Config {
    pub fn load() -> Self {
        Self::from_args(Args::parse())
    }

    pub fn from_args(args: Args) -> Self {
        let log_level = args
            .log_level
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "info".to_string());

        Self {
            engine: PatchEngineConfig {
                global_ini: args.global_ini,
                local_ini: args.local_ini,
                session: SessionFlags::default(),
            },
            log_level,
            command: args.command,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_log_level_falls_back_to_info() {
        let args = Args::try_parse_from(["aero-patch", "--log-level", " ", "list"]).unwrap();
        let config = Config::from_args(args);
        assert_eq!(config.log_level, "info");
        assert!(matches!(config.command, Command::List { entries: false }));
    }

    #[test]
    fn paths_are_passed_to_the_engine() {
        let args = Args::try_parse_from([
            "aero-patch",
            "--global-ini",
            "Sys/GameSettings/GALE01.ini",
            "--local-ini",
            "User/GameSettings/GALE01.ini",
            "enable",
            "Infinite lives",
        ])
        .unwrap();
        let config = Config::from_args(args);
        assert_eq!(
            config.engine.global_ini,
            Some(PathBuf::from("Sys/GameSettings/GALE01.ini"))
        );
        assert!(matches!(config.command, Command::Enable { ref name } if name == "Infinite lives"));
    }

    #[test]
    fn speedhack_arguments_are_optional() {
        let args = Args::try_parse_from(["aero-patch", "speedhack"]).unwrap();
        assert!(matches!(
            Config::from_args(args).command,
            Command::Speedhack {
                address: None,
                cycles: None
            }
        ));

        let args = Args::try_parse_from(["aero-patch", "speedhack", "0x80003000", "40"]).unwrap();
        assert!(matches!(
            Config::from_args(args).command,
            Command::Speedhack {
                address: Some(_),
                cycles: Some(ref c)
            } if c == "40"
        ));
    }
}
