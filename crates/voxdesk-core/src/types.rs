use std::fmt;
use std::time::{Duration, Instant};

/// Capture and playback sample rate in Hz.
pub const SAMPLE_RATE: u32 = 16_000;

/// Mono everywhere.
pub const CHANNELS: u16 = 1;

/// Samples per frame (one STT chunk, one TTS read).
pub const FRAME_SAMPLES: usize = 512;

/// Default number of frames buffered between the driver and the caller.
pub const BUFFER_FRAMES: usize = 4;

/// Bytes in one frame of little-endian 16-bit PCM.
pub const FRAME_BYTES: usize = FRAME_SAMPLES * std::mem::size_of::<i16>();

/// Longest wait any deadline is allowed to express.
pub const MAX_WAIT: Duration = Duration::from_secs(24 * 60 * 60);

/// `Instant::now() + timeout`, capped at [`MAX_WAIT`] so oversized
/// configured timeouts cannot overflow.
pub fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout.min(MAX_WAIT)).unwrap_or(now)
}

/// A fixed-capacity block of mono 16-bit samples with a valid-sample count.
#[derive(Clone, PartialEq, Eq)]
pub struct AudioFrame {
    samples: [i16; FRAME_SAMPLES],
    len: usize,
}

impl AudioFrame {
    pub fn new() -> Self {
        Self {
            samples: [0; FRAME_SAMPLES],
            len: 0,
        }
    }

    /// Build a frame from `samples`, keeping at most [`FRAME_SAMPLES`] of them.
    pub fn from_samples(samples: &[i16]) -> Self {
        let mut frame = Self::new();
        let n = samples.len().min(FRAME_SAMPLES);
        frame.samples[..n].copy_from_slice(&samples[..n]);
        frame.len = n;
        frame
    }

    pub const fn capacity(&self) -> usize {
        FRAME_SAMPLES
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == FRAME_SAMPLES
    }

    /// The valid samples.
    pub fn as_slice(&self) -> &[i16] {
        &self.samples[..self.len]
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Writable tail past the valid samples. Pair with [`commit`](Self::commit).
    pub fn spare_mut(&mut self) -> &mut [i16] {
        &mut self.samples[self.len..]
    }

    /// Mark `n` more samples of the spare tail as valid.
    pub fn commit(&mut self, n: usize) {
        self.len = (self.len + n).min(FRAME_SAMPLES);
    }

    /// Valid samples as raw little-endian PCM.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.as_slice()
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect()
    }
}

impl Default for AudioFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AudioFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioFrame")
            .field("len", &self.len)
            .field("capacity", &FRAME_SAMPLES)
            .finish()
    }
}

/// STT session state. Idle until a stream is opened, Streaming until it is finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Streaming,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => f.write_str("idle"),
            SessionState::Streaming => f.write_str("streaming"),
        }
    }
}
