//! Optional TOML settings file merged beneath the command-line flags.

use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use robot_rescue_core::{GameRules, PlayerName, PlayerNameError, DEFAULT_SEED};
use serde::Deserialize;
use thiserror::Error;

use crate::Args;

const DEFAULT_NAME: &str = "player";
const DEFAULT_MAX_TICKS: u64 = 2_000;
const DEFAULT_LEADERBOARD: &str = "leaderboard.toml";

/// What the headless host answers when a life is lost.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub(crate) enum LifeLostPolicy {
    /// Keep playing until the last life.
    #[default]
    Continue,
    /// Stop at the first lost life.
    Quit,
}

/// Values read from the settings file. Every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub(crate) name: Option<String>,
    pub(crate) seed: Option<u64>,
    pub(crate) max_ticks: Option<u64>,
    pub(crate) leaderboard: Option<PathBuf>,
    pub(crate) realtime: Option<bool>,
    pub(crate) on_life_lost: Option<LifeLostPolicy>,
    pub(crate) snapshots: Option<bool>,
    pub(crate) bomb: Option<bool>,
}

impl Settings {
    /// Reads and parses a settings file.
    pub(crate) fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    pub(crate) fn parse(contents: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(contents)?)
    }
}

/// Errors raised while loading or resolving settings.
#[derive(Debug, Error)]
pub(crate) enum SettingsError {
    /// The settings file could not be read.
    #[error("failed to read settings from {}", path.display())]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The settings file is not valid TOML for this schema.
    #[error("failed to parse settings")]
    Parse(#[from] toml::de::Error),
    /// The resolved player name is not acceptable.
    #[error("invalid player name")]
    Name(#[from] PlayerNameError),
    /// A run needs at least one tick.
    #[error("max_ticks must be positive")]
    ZeroTicks,
}

/// Fully resolved options for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RunConfig {
    pub(crate) name: PlayerName,
    pub(crate) rules: GameRules,
    pub(crate) max_ticks: u64,
    pub(crate) leaderboard: PathBuf,
    pub(crate) realtime: bool,
    pub(crate) on_life_lost: LifeLostPolicy,
    pub(crate) snapshots: bool,
}

impl RunConfig {
    /// Layers command-line flags over file settings over defaults.
    pub(crate) fn resolve(args: &Args, settings: Settings) -> Result<Self, SettingsError> {
        let name = args
            .name
            .clone()
            .or(settings.name)
            .unwrap_or_else(|| DEFAULT_NAME.to_owned());
        let max_ticks = args
            .max_ticks
            .or(settings.max_ticks)
            .unwrap_or(DEFAULT_MAX_TICKS);
        if max_ticks == 0 {
            return Err(SettingsError::ZeroTicks);
        }

        Ok(Self {
            name: PlayerName::new(name)?,
            rules: GameRules {
                seed: args.seed.or(settings.seed).unwrap_or(DEFAULT_SEED),
                bomb_enabled: args.bomb || settings.bomb.unwrap_or(false),
            },
            max_ticks,
            leaderboard: args
                .leaderboard
                .clone()
                .or(settings.leaderboard)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LEADERBOARD)),
            realtime: args.realtime || settings.realtime.unwrap_or(false),
            on_life_lost: args
                .on_life_lost
                .or(settings.on_life_lost)
                .unwrap_or_default(),
            snapshots: args.snapshots || settings.snapshots.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["robot-rescue"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).expect("valid arguments")
    }

    #[test]
    fn defaults_apply_without_flags_or_file() {
        let config = RunConfig::resolve(&args(&[]), Settings::default()).expect("resolves");

        assert_eq!(config.name.as_str(), DEFAULT_NAME);
        assert_eq!(config.rules, GameRules::default());
        assert_eq!(config.max_ticks, DEFAULT_MAX_TICKS);
        assert_eq!(config.leaderboard, PathBuf::from(DEFAULT_LEADERBOARD));
        assert_eq!(config.on_life_lost, LifeLostPolicy::Continue);
        assert!(!config.realtime);
        assert!(!config.snapshots);
    }

    #[test]
    fn flags_override_file_settings() {
        let settings = Settings::parse(
            r#"
                name = "filed"
                seed = 7
                max_ticks = 50
                on_life_lost = "quit"
                bomb = true
            "#,
        )
        .expect("valid settings");

        let config = RunConfig::resolve(&args(&["--name", "flagged", "--max-ticks", "9"]), settings)
            .expect("resolves");

        assert_eq!(config.name.as_str(), "flagged");
        assert_eq!(config.max_ticks, 9);
        assert_eq!(config.rules.seed, 7);
        assert!(config.rules.bomb_enabled);
        assert_eq!(config.on_life_lost, LifeLostPolicy::Quit);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = Settings::parse("speed = 3").expect_err("unknown key");

        assert!(matches!(error, SettingsError::Parse(_)));
    }

    #[test]
    fn invalid_names_are_reported() {
        let error = RunConfig::resolve(&args(&["--name", "two words"]), Settings::default())
            .expect_err("whitespace rejected");

        assert!(matches!(error, SettingsError::Name(PlayerNameError::Whitespace)));
    }

    #[test]
    fn zero_ticks_are_rejected() {
        let error = RunConfig::resolve(&args(&["--max-ticks", "0"]), Settings::default())
            .expect_err("zero ticks");

        assert!(matches!(error, SettingsError::ZeroTicks));
    }

    #[test]
    fn missing_file_reports_path() {
        let error = Settings::load(Path::new("/nonexistent/robot-rescue.toml"))
            .expect_err("missing file");

        assert!(error.to_string().contains("robot-rescue.toml"));
    }
}
