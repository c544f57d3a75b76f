use crate::status::StreamStatus;
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{Device, SampleRate, Stream, StreamConfig};
use ringbuf::traits::Consumer;
use ringbuf::HeapCons;
use voxdesk_core::{AudioError, CHANNELS, FRAME_SAMPLES, SAMPLE_RATE};

pub(crate) fn i16_to_f32(sample: i16) -> f32 {
    f32::from(sample) / 32768.0
}

/// Speaker stream draining 16-bit samples from a ring buffer.
///
/// Underruns are filled with silence.
pub struct OutputNode {
    _stream: Stream,
}

impl OutputNode {
    pub fn new(
        device: &Device,
        mut consumer: HeapCons<i16>,
        status: StreamStatus,
    ) -> Result<Self, AudioError> {
        let config = StreamConfig {
            channels: CHANNELS,
            sample_rate: SampleRate(SAMPLE_RATE),
            buffer_size: cpal::BufferSize::Fixed(FRAME_SAMPLES as u32),
        };

        let err_callback = move |err: cpal::StreamError| {
            tracing::error!("output stream error: {}", err);
            status.mark_output_failed();
        };

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for sample in data.iter_mut() {
                        *sample = consumer.try_pop().map(i16_to_f32).unwrap_or(0.0);
                    }
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
