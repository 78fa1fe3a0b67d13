//! Server configuration.
//!
//! Either use [`ServerConfig::default`] (and the builder's overrides) or
//! load from environment variables:
//!
//! - `CODEDUEL_BIND_ADDR`                 (default: "127.0.0.1:8080")
//! - `CODEDUEL_PROBLEMS`                  (default: "problems.json")
//! - `CODEDUEL_JUDGE_CMD`                 (default: "python3")
//! - `CODEDUEL_JUDGE_ARGS`                (whitespace-separated; default: "sandbox/run.py")
//! - `CODEDUEL_JUDGE_TIMEOUT_SECS`        (default: 30)
//! - `CODEDUEL_MATCHMAKING_TIMEOUT_SECS`  (default: 600)
//! - `CODEDUEL_SWEEP_SECS`                (default: 30)
//! - `CODEDUEL_INITIAL_HEALTH`            (default: 5)
//! - `CODEDUEL_RESPITE_MS`                (default: 1500)
//! - `CODEDUEL_LANGUAGE`                  (default: "risc-v")

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use codeduel_room::RoomConfig;

/// A malformed configuration value.
#[derive(Debug, thiserror::Error)]
#[error("invalid value {value:?} for {key}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
}

/// Everything the server needs to run.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,

    /// Path to the JSON problem catalogue, read once at startup.
    pub problems_path: PathBuf,

    /// Sandbox interpreter the judge spawns per submission.
    pub judge_program: String,
    pub judge_args: Vec<String>,

    /// Wall-clock budget for one judged execution.
    pub judge_timeout: Duration,

    /// How long a fresh connection may sit in matchmaking before the
    /// server hangs up.
    pub matchmaking_timeout: Duration,

    /// Base cadence of the garbage-collector sweeps.
    pub sweep_interval: Duration,

    /// Health each player starts a match with.
    pub initial_health: u32,

    /// Breather between a solved problem and the next one.
    pub respite: Duration,

    /// Language label shown to players.
    pub language: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_owned(),
            problems_path: PathBuf::from("problems.json"),
            judge_program: "python3".to_owned(),
            judge_args: vec!["sandbox/run.py".to_owned()],
            judge_timeout: Duration::from_secs(30),
            matchmaking_timeout: Duration::from_secs(600),
            sweep_interval: Duration::from_secs(30),
            initial_health: 5,
            respite: Duration::from_millis(1500),
            language: "risc-v".to_owned(),
        }
    }
}

impl ServerConfig {
    /// Constructs a config from environment variables, falling back to
    /// the defaults above.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            bind_addr: env::var("CODEDUEL_BIND_ADDR").unwrap_or(defaults.bind_addr),
            problems_path: env::var("CODEDUEL_PROBLEMS")
                .map(PathBuf::from)
                .unwrap_or(defaults.problems_path),
            judge_program: env::var("CODEDUEL_JUDGE_CMD").unwrap_or(defaults.judge_program),
            judge_args: env::var("CODEDUEL_JUDGE_ARGS")
                .map(|args| args.split_whitespace().map(str::to_owned).collect())
                .unwrap_or(defaults.judge_args),
            judge_timeout: Duration::from_secs(read_env_or(
                "CODEDUEL_JUDGE_TIMEOUT_SECS",
                defaults.judge_timeout.as_secs(),
            )?),
            matchmaking_timeout: Duration::from_secs(read_env_or(
                "CODEDUEL_MATCHMAKING_TIMEOUT_SECS",
                defaults.matchmaking_timeout.as_secs(),
            )?),
            sweep_interval: Duration::from_secs(read_env_or(
                "CODEDUEL_SWEEP_SECS",
                defaults.sweep_interval.as_secs(),
            )?),
            initial_health: read_env_or("CODEDUEL_INITIAL_HEALTH", defaults.initial_health)?,
            respite: Duration::from_millis(read_env_or(
                "CODEDUEL_RESPITE_MS",
                defaults.respite.as_millis() as u64,
            )?),
            language: env::var("CODEDUEL_LANGUAGE").unwrap_or(defaults.language),
        })
    }

    /// The per-room slice of this config.
    pub fn room_config(&self) -> RoomConfig {
        RoomConfig {
            initial_health: self.initial_health,
            respite: self.respite,
            language: self.language.clone(),
        }
    }
}

fn read_env_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value.parse::<T>().map_err(|_| ConfigError { key, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.initial_health, 5);
        assert_eq!(config.judge_timeout, Duration::from_secs(30));
        assert_eq!(config.matchmaking_timeout, Duration::from_secs(600));
    }

    #[test]
    fn test_room_config_mirrors_server_config() {
        let config = ServerConfig {
            initial_health: 7,
            respite: Duration::from_millis(10),
            language: "python".to_owned(),
            ..ServerConfig::default()
        };
        let room = config.room_config();
        assert_eq!(room.initial_health, 7);
        assert_eq!(room.respite, Duration::from_millis(10));
        assert_eq!(room.language, "python");
    }
}
