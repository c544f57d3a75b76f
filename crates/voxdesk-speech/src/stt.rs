//! Chunked speech-to-text upload.

use crate::transport::{normalize_endpoint, HttpRequest, Transport};
use voxdesk_core::{AudioFrame, SessionState, SpeechError};

const CHUNK_PATH: &str = "/stt/chunk";
const FINISH_PATH: &str = "/stt/finish";

/// Streams captured frames to a recognizer, one request per frame, and
/// fetches the transcript when the stream is finalized.
///
/// ```text
/// Idle --begin_stream--> Streaming --end_stream--> Idle
///                        Streaming --push_audio--> Streaming
/// ```
///
/// Calls made in the wrong state fail with [`SpeechError::InvalidState`] and
/// change nothing.
pub struct SpeechClient<T: Transport> {
    transport: T,
    endpoint: String,
    state: SessionState,
    chunks_sent: usize,
}

impl<T: Transport> SpeechClient<T> {
    /// Store the recognizer endpoint. No request is made.
    pub fn new(transport: T, endpoint: &str) -> Result<Self, SpeechError> {
        Ok(Self {
            transport,
            endpoint: normalize_endpoint(endpoint)?,
            state: SessionState::Idle,
            chunks_sent: 0,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Chunks accepted by the recognizer in the current (or last) session.
    pub fn chunks_sent(&self) -> usize {
        self.chunks_sent
    }

    pub fn begin_stream(&mut self) -> Result<(), SpeechError> {
        self.require(SessionState::Idle)?;
        self.state = SessionState::Streaming;
        self.chunks_sent = 0;
        tracing::debug!(endpoint = %self.endpoint, "stt session opened");
        Ok(())
    }

    /// Upload one frame as little-endian PCM.
    ///
    /// Only a 2xx reply counts as accepted; any other status is
    /// [`SpeechError::Status`]. A failed chunk leaves the session streaming;
    /// whether to resend it or move on is up to the caller.
    pub fn push_audio(&mut self, frame: &AudioFrame) -> Result<(), SpeechError> {
        self.require(SessionState::Streaming)?;

        let request = HttpRequest::post(
            format!("{}{}", self.endpoint, CHUNK_PATH),
            "application/octet-stream",
            frame.to_le_bytes(),
        );
        let response = self.transport.send(request)?;
        if !response.is_success() {
            tracing::warn!(status = response.status, "stt chunk rejected");
            return Err(SpeechError::Status(response.status));
        }

        self.chunks_sent += 1;
        tracing::trace!(samples = frame.len(), chunk = self.chunks_sent, "stt chunk sent");
        Ok(())
    }

    /// Finalize the session and fetch the transcript.
    ///
    /// Once the state check passes the session is back to Idle, whatever
    /// the outcome of the finish request.
    pub fn end_stream(&mut self) -> Result<String, SpeechError> {
        self.require(SessionState::Streaming)?;
        self.state = SessionState::Idle;

        let response = self
            .transport
            .send(HttpRequest::get(format!("{}{}", self.endpoint, FINISH_PATH)))?;
        if response.status != 200 {
            tracing::warn!(status = response.status, "stt finish failed");
            return Err(SpeechError::Status(response.status));
        }

        let transcript = response.text()?;
        if transcript.trim().is_empty() {
            return Err(SpeechError::EmptyTranscript);
        }
        tracing::info!(
            chunks = self.chunks_sent,
            transcript = %transcript,
            "stt session closed"
        );
        Ok(transcript)
    }

    fn require(&self, expected: SessionState) -> Result<(), SpeechError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SpeechError::InvalidState {
                expected,
                actual: self.state,
            })
        }
    }
}
