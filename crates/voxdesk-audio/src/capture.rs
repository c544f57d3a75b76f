use crate::status::StreamStatus;
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{Device, SampleRate, Stream, StreamConfig};
use ringbuf::traits::{Observer, Producer};
use ringbuf::HeapProd;
use voxdesk_core::{AudioError, CHANNELS, FRAME_SAMPLES, SAMPLE_RATE};

/// Convert a driver sample in [-1.0, 1.0] to 16-bit PCM.
pub(crate) fn f32_to_i16(sample: f32) -> i16 {
    (sample * 32768.0).clamp(-32768.0, 32767.0) as i16
}

/// Microphone stream feeding 16-bit samples into a ring buffer.
pub struct CaptureNode {
    _stream: Stream,
}

impl CaptureNode {
    pub fn new(
        device: &Device,
        mut producer: HeapProd<i16>,
        status: StreamStatus,
    ) -> Result<Self, AudioError> {
        let config = StreamConfig {
            channels: CHANNELS,
            sample_rate: SampleRate(SAMPLE_RATE),
            buffer_size: cpal::BufferSize::Fixed(FRAME_SAMPLES as u32),
        };

        let err_status = status.clone();
        let err_callback = move |err: cpal::StreamError| {
            tracing::error!("capture stream error: {}", err);
            err_status.mark_input_failed();
        };

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let room = producer.vacant_len();
                    let pushed =
                        producer.push_iter(data.iter().take(room).map(|&s| f32_to_i16(s)));
                    status.add_dropped(data.len() - pushed);
                },
                err_callback,
                None,
            )
            .map_err(|e| AudioError::StreamBuild(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamPlay(e.to_string()))?;

        Ok(Self { _stream: stream })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f32_to_i16_full_scale() {
        assert_eq!(f32_to_i16(0.0), 0);
        assert_eq!(f32_to_i16(-1.0), i16::MIN);
        assert_eq!(f32_to_i16(1.0), i16::MAX);
    }

    #[test]
    fn test_f32_to_i16_clamps_out_of_range() {
        assert_eq!(f32_to_i16(4.0), i16::MAX);
        assert_eq!(f32_to_i16(-4.0), i16::MIN);
    }

    #[test]
    fn test_f32_to_i16_half_scale() {
        assert_eq!(f32_to_i16(0.5), 16384);
        assert_eq!(f32_to_i16(-0.5), -16384);
    }
}
