pub mod config;
pub mod error;
pub mod sink;
pub mod types;

pub use config::{AppConfig, AudioConfig, GeneralConfig, SpeechConfig};
pub use error::{AudioError, ConfigError, SpeechError};
pub use sink::AudioSink;
pub use types::{
    deadline_after, AudioFrame, SessionState, BUFFER_FRAMES, CHANNELS, FRAME_BYTES,
    FRAME_SAMPLES, MAX_WAIT, SAMPLE_RATE,
};
