use crate::capture::CaptureNode;
use crate::device::DeviceManager;
use crate::output::OutputNode;
use crate::status::StreamStatus;
use ringbuf::traits::{Consumer, Observer, Producer};
use ringbuf::{HeapCons, HeapProd};
use std::time::{Duration, Instant};
use voxdesk_core::{deadline_after, AudioConfig, AudioError, AudioFrame, AudioSink, FRAME_SAMPLES};

/// Default per-frame capture timeout.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(20);

const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Duplex audio interface: frame capture, blocking playback.
///
/// The driver threads only touch the ring buffers; every method here runs on
/// the caller's thread.
pub struct AudioIo {
    capture: HeapCons<i16>,
    playback: Option<HeapProd<i16>>,
    status: StreamStatus,
    _capture_node: Option<CaptureNode>,
    _output_node: Option<OutputNode>,
}

impl AudioIo {
    /// Open the configured capture device and, if `enable_output` is set, the
    /// playback device. Both run at 16 kHz mono with `buffer_frames` frames of
    /// ring buffering.
    pub fn open(devices: &DeviceManager, config: &AudioConfig) -> Result<Self, AudioError> {
        let capacity = ring_capacity(config);
        let status = StreamStatus::new();

        let input_device = devices.get_input_device(&config.input_device)?;
        let (cap_prod, cap_cons) = crate::create_ring_buffer(capacity);
        let capture_node = CaptureNode::new(&input_device, cap_prod, status.clone())?;

        let (playback, output_node) = if config.enable_output {
            let (producer, node) = open_playback(devices, config, &status)?;
            (Some(producer), Some(node))
        } else {
            (None, None)
        };

        let output_name = if config.enable_output {
            config.output_device.as_str()
        } else {
            "disabled"
        };
        tracing::info!(
            input = %config.input_device,
            output = %output_name,
            buffer_frames = config.buffer_frames,
            "audio interface open"
        );

        Ok(Self {
            capture: cap_cons,
            playback,
            status,
            _capture_node: Some(capture_node),
            _output_node: output_node,
        })
    }

    /// Open the playback device only. Capture reads always time out empty.
    pub fn open_output(devices: &DeviceManager, config: &AudioConfig) -> Result<Self, AudioError> {
        let status = StreamStatus::new();
        let (producer, node) = open_playback(devices, config, &status)?;
        let (_, cap_cons) = crate::create_ring_buffer(FRAME_SAMPLES);

        tracing::info!(output = %config.output_device, "audio output open");

        Ok(Self {
            capture: cap_cons,
            playback: Some(producer),
            status,
            _capture_node: None,
            _output_node: Some(node),
        })
    }

    /// Build an interface over existing ring buffer halves with no driver
    /// stream attached. `playback = None` disables output.
    pub fn from_ring_buffers(capture: HeapCons<i16>, playback: Option<HeapProd<i16>>) -> Self {
        Self {
            capture,
            playback,
            status: StreamStatus::new(),
            _capture_node: None,
            _output_node: None,
        }
    }

    pub fn output_enabled(&self) -> bool {
        self.playback.is_some()
    }

    pub fn status(&self) -> &StreamStatus {
        &self.status
    }

    /// True once either driver stream has reported an error.
    pub fn stream_error(&self) -> bool {
        self.status.has_failed()
    }

    /// Fill `frame` with up to one frame of captured audio.
    ///
    /// Returns as soon as the frame is full, or after `timeout` with whatever
    /// arrived (possibly nothing). The frame is cleared first.
    pub fn read_samples(&mut self, frame: &mut AudioFrame, timeout: Duration) -> usize {
        frame.clear();
        let deadline = deadline_after(timeout);
        loop {
            let n = self.capture.pop_slice(frame.spare_mut());
            frame.commit(n);
            if frame.is_full() {
                break;
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
        frame.len()
    }

    /// [`read_samples`](Self::read_samples) with [`DEFAULT_READ_TIMEOUT`].
    pub fn read_frame(&mut self, frame: &mut AudioFrame) -> usize {
        self.read_samples(frame, DEFAULT_READ_TIMEOUT)
    }

    /// Queue `samples` for playback, blocking until all of them fit.
    ///
    /// No-op when output is disabled. Gives up only if the output stream has
    /// failed; capture errors do not affect playback.
    pub fn play_samples(&mut self, samples: &[i16]) {
        let Some(producer) = self.playback.as_mut() else {
            return;
        };

        let mut rest = samples;
        loop {
            let n = producer.push_slice(rest);
            rest = &rest[n..];
            if rest.is_empty() {
                return;
            }
            if self.status.output_failed() {
                tracing::warn!(dropped = rest.len(), "output stream failed, dropping playback");
                return;
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    /// Block until everything queued for playback has been handed to the driver.
    pub fn flush_playback(&mut self) {
        let Some(producer) = self.playback.as_ref() else {
            return;
        };
        while !producer.is_empty() && !self.status.output_failed() {
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    /// Drop captured samples nobody has read yet. Returns how many were dropped.
    pub fn discard_pending_capture(&mut self) -> usize {
        let pending = self.capture.occupied_len();
        self.capture.skip(pending)
    }
}

fn ring_capacity(config: &AudioConfig) -> usize {
    FRAME_SAMPLES * config.buffer_frames.max(1)
}

fn open_playback(
    devices: &DeviceManager,
    config: &AudioConfig,
    status: &StreamStatus,
) -> Result<(HeapProd<i16>, OutputNode), AudioError> {
    let device = devices.get_output_device(&config.output_device)?;
    let (producer, consumer) = crate::create_ring_buffer(ring_capacity(config));
    let node = OutputNode::new(&device, consumer, status.clone())?;
    Ok((producer, node))
}

impl AudioSink for AudioIo {
    fn play_samples(&mut self, samples: &[i16]) {
        AudioIo::play_samples(self, samples);
    }
}
