//! Deployment environment and logging configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Deployment environment RotaGuard runs in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    /// Shared test or staging deployment
    Test,
    Production,
}

impl Environment {
    pub const ALL: [Environment; 3] = [Self::Development, Self::Test, Self::Production];

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Whether the built-in development signing secret may be used
    pub fn allows_default_secret(&self) -> bool {
        !self.is_production()
    }

    /// Read `ROTAGUARD_ENV`; unset or unknown values mean development
    pub fn from_env() -> Self {
        std::env::var("ROTAGUARD_ENV")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Production => "production",
        }
    }

    /// Base name of the optional configuration file, without extension
    pub fn config_file(&self) -> String {
        format!("rotaguard.{}", self.as_str())
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Environment::Development),
            "test" | "testing" | "staging" => Ok(Environment::Test),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("Unknown environment: {}", other)),
        }
    }
}

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
    Compact,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `info,rg_core=debug`
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,

    /// ANSI colors; only useful on a terminal
    #[serde(default)]
    pub ansi: bool,

    /// Attach file and line to every event
    #[serde(default)]
    pub file_and_line: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::for_environment(Environment::Development)
    }
}

impl LoggingConfig {
    /// Defaults per environment; machines read the logs outside development
    pub fn for_environment(env: Environment) -> Self {
        let level = match env {
            Environment::Development => "debug,sqlx=warn",
            Environment::Test => "info",
            Environment::Production => "info,rg_core=info,sqlx=warn",
        };
        let interactive = env == Environment::Development;

        Self {
            level: level.to_string(),
            format: if interactive {
                LogFormat::Pretty
            } else {
                LogFormat::Json
            },
            ansi: interactive,
            file_and_line: interactive,
        }
    }
}
