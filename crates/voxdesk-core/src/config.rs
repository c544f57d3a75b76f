use crate::error::ConfigError;
use crate::types::BUFFER_FRAMES;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub audio: AudioConfig,

    #[serde(default)]
    pub speech: SpeechConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AudioConfig {
    #[serde(default = "default_device_name")]
    pub input_device: String,

    #[serde(default = "default_device_name")]
    pub output_device: String,

    #[serde(default = "default_true")]
    pub enable_output: bool,

    /// Per-frame capture timeout.
    #[serde(default = "default_frame_timeout_ms")]
    pub frame_timeout_ms: u64,

    /// How long one utterance is recorded for.
    #[serde(default = "default_listen_duration_ms")]
    pub listen_duration_ms: u64,

    #[serde(default = "default_buffer_frames")]
    pub buffer_frames: usize,
}

impl AudioConfig {
    pub fn frame_timeout(&self) -> Duration {
        Duration::from_millis(self.frame_timeout_ms)
    }

    pub fn listen_duration(&self) -> Duration {
        Duration::from_millis(self.listen_duration_ms)
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            input_device: default_device_name(),
            output_device: default_device_name(),
            enable_output: default_true(),
            frame_timeout_ms: default_frame_timeout_ms(),
            listen_duration_ms: default_listen_duration_ms(),
            buffer_frames: default_buffer_frames(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SpeechConfig {
    /// Base URL serving `/stt/chunk`, `/stt/finish` and `/tts`.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Upper bound on a streamed synthesis response, body included.
    #[serde(default = "default_stream_timeout_ms")]
    pub stream_timeout_ms: u64,
}

impl SpeechConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn stream_timeout(&self) -> Duration {
        Duration::from_millis(self.stream_timeout_ms)
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_ms: default_request_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            stream_timeout_ms: default_stream_timeout_ms(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_device_name() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

fn default_frame_timeout_ms() -> u64 {
    20
}

fn default_listen_duration_ms() -> u64 {
    3000
}

fn default_buffer_frames() -> usize {
    BUFFER_FRAMES
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_connect_timeout_ms() -> u64 {
    2000
}

fn default_stream_timeout_ms() -> u64 {
    30_000
}

/// Interpolate `${VAR}` patterns with environment variable values.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([^}]+)\}").unwrap();
    let mut result = input.to_string();

    for cap in re.captures_iter(input) {
        let var_name = &cap[1];
        let val = std::env::var(var_name)
            .map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
        result = result.replace(&cap[0], &val);
    }

    Ok(result)
}

impl AppConfig {
    /// Load configuration from a TOML file, with environment variable interpolation.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let interpolated = interpolate_env_vars(s)?;
        let config: AppConfig = toml::from_str(&interpolated)?;
        if config.audio.buffer_frames == 0 {
            tracing::warn!("audio.buffer_frames = 0 is unusable, falling back to {BUFFER_FRAMES}");
            return Ok(AppConfig {
                audio: AudioConfig {
                    buffer_frames: BUFFER_FRAMES,
                    ..config.audio
                },
                ..config
            });
        }
        Ok(config)
    }
}
