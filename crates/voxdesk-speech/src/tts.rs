//! Streaming text-to-speech playback.

use crate::transport::{normalize_endpoint, HttpRequest, Transport};
use serde::Serialize;
use std::io::{ErrorKind, Read};
use voxdesk_core::{AudioSink, SpeechError, FRAME_BYTES, FRAME_SAMPLES};

const TTS_PATH: &str = "/tts";

#[derive(Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
}

/// Requests synthesized speech and plays it while it downloads.
pub struct SpeechSynthesizer<T: Transport> {
    transport: T,
    endpoint: String,
}

impl<T: Transport> SpeechSynthesizer<T> {
    pub fn new(transport: T, endpoint: &str) -> Result<Self, SpeechError> {
        Ok(Self {
            transport,
            endpoint: normalize_endpoint(endpoint)?,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Synthesize `text` and forward the PCM response to `sink` frame by frame.
    ///
    /// Returns the number of samples played. A non-200 response plays nothing.
    pub fn request_and_play<S: AudioSink + ?Sized>(
        &self,
        text: &str,
        sink: &mut S,
    ) -> Result<usize, SpeechError> {
        let body = serde_json::to_vec(&SynthesisRequest { text })
            .map_err(|e| SpeechError::Transport(e.to_string()))?;
        let request = HttpRequest::post(
            format!("{}{}", self.endpoint, TTS_PATH),
            "application/json",
            body,
        )
        .streaming();

        let response = self.transport.send(request)?;
        if response.status != 200 {
            tracing::warn!(status = response.status, "tts request rejected");
            return Err(SpeechError::Status(response.status));
        }

        let mut body = response.into_body();
        let played = play_pcm_stream(&mut body, sink)?;
        tracing::debug!(
            samples = played,
            ms = played as u64 * 1000 / u64::from(voxdesk_core::SAMPLE_RATE),
            "tts playback finished"
        );
        Ok(played)
    }
}

/// Decode a little-endian 16-bit PCM byte stream and hand it to `sink` as it
/// arrives, at most one frame at a time. Runs until the reader reports end of
/// stream. An odd byte at a read boundary is carried into the next read; one
/// left over at the very end is dropped.
pub fn play_pcm_stream<R, S>(reader: &mut R, sink: &mut S) -> Result<usize, SpeechError>
where
    R: Read + ?Sized,
    S: AudioSink + ?Sized,
{
    let mut bytes = [0u8; FRAME_BYTES];
    let mut samples = [0i16; FRAME_SAMPLES];
    let mut carry = 0usize;
    let mut played = 0usize;

    loop {
        let n = match reader.read(&mut bytes[carry..]) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::warn!(played, error = %e, "tts stream broke off");
                return Err(SpeechError::Stream(e));
            }
        };

        let filled = carry + n;
        let whole = filled / 2;
        for (sample, pair) in samples.iter_mut().zip(bytes[..whole * 2].chunks_exact(2)) {
            *sample = i16::from_le_bytes([pair[0], pair[1]]);
        }
        if whole > 0 {
            sink.play_samples(&samples[..whole]);
            played += whole;
        }

        carry = filled % 2;
        if carry == 1 {
            bytes[0] = bytes[filled - 1];
        }
    }

    if carry == 1 {
        tracing::debug!("tts stream ended on an odd byte, dropping it");
    }
    Ok(played)
}
