//! Remote speech services: chunked STT upload and streaming TTS playback.

pub mod stt;
pub mod transport;
pub mod tts;

pub use stt::SpeechClient;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, Transport};
pub use tts::{play_pcm_stream, SpeechSynthesizer};
