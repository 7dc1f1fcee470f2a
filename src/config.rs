use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{self, BufReader},
    path::Path,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot load config file")]
    Load(#[from] io::Error),
    #[error("cannot parse config file")]
    Parse(#[from] serde_yaml::Error),
    #[error("unsupported config kind")]
    KindNotSupported,
    #[error("unsupported config api version")]
    VersionNotSupported,
    #[error("delay_min_ms must not exceed delay_max_ms")]
    InvalidDelay,
}

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
#[allow(non_snake_case)]
pub struct Config {
    /// The api version of the config file
    pub apiVersion: String,
    /// The kind of the config file
    pub kind: String,
    /// The HTTP server configuration
    #[serde(default)]
    pub api: ApiConfig,
    /// The compile endpoint configuration
    #[serde(default)]
    pub compile: CompileConfig,
}

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct ApiConfig {
    /// The host on which the API server will listen
    #[serde(default = "default_host")]
    pub host: String,
    /// The port on which the API server will listen
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct CompileConfig {
    /// Lower bound of the simulated latency
    #[serde(default = "default_delay_min_ms")]
    pub delay_min_ms: u64,
    /// Upper bound of the simulated latency
    #[serde(default = "default_delay_max_ms")]
    pub delay_max_ms: u64,
    #[serde(default = "default_max_code_chars")]
    pub max_code_chars: usize,
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

pub const API_VERSION: &str = "codeforge.io/v1alpha1";
pub const KIND: &str = "Config";

fn default_host() -> String {
    String::from("127.0.0.1")
}

fn default_port() -> u16 {
    8080
}

fn default_delay_min_ms() -> u64 {
    1000
}

fn default_delay_max_ms() -> u64 {
    3000
}

fn default_max_code_chars() -> usize {
    50_000
}

fn default_max_input_chars() -> usize {
    10_000
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for CompileConfig {
    fn default() -> Self {
        CompileConfig {
            delay_min_ms: default_delay_min_ms(),
            delay_max_ms: default_delay_max_ms(),
            max_code_chars: default_max_code_chars(),
            max_input_chars: default_max_input_chars(),
        }
    }
}

impl CompileConfig {
    /// Same limits, no simulated latency.
    pub fn without_delay() -> Self {
        CompileConfig {
            delay_min_ms: 0,
            delay_max_ms: 0,
            ..CompileConfig::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            apiVersion: API_VERSION.to_string(),
            kind: KIND.to_string(),
            api: ApiConfig::default(),
            compile: CompileConfig::default(),
        }
    }
}

impl Config {
    /// Load a Config from a file.
    ///
    /// Arguments:
    ///
    /// * `path`: The path to the config file.
    ///
    /// Returns:
    ///
    /// A Result<Config>
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(ConfigError::Load)?;
        let reader = BufReader::new(file);
        let config: Config = serde_yaml::from_reader(reader).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        Config::load(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.kind != KIND {
            return Err(ConfigError::KindNotSupported);
        }

        if self.apiVersion != API_VERSION {
            return Err(ConfigError::VersionNotSupported);
        }

        if self.compile.delay_min_ms > self.compile.delay_max_ms {
            return Err(ConfigError::InvalidDelay);
        }

        Ok(())
    }
}
