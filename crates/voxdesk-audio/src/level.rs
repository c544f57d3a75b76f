use voxdesk_core::AudioFrame;

/// Largest magnitude a 16-bit sample can take.
const FULL_SCALE: f64 = 32768.0;

/// Normalized RMS level of the frame's valid samples, in [0, 1].
///
/// Accumulates in `f64` so a full frame of full-scale samples cannot overflow.
/// An empty frame has level 0.
pub fn rms(frame: &AudioFrame) -> f32 {
    let samples = frame.as_slice();
    if samples.is_empty() {
        return 0.0;
    }
    let energy: f64 = samples
        .iter()
        .map(|&s| {
            let s = f64::from(s);
            s * s
        })
        .sum();
    ((energy / samples.len() as f64).sqrt() / FULL_SCALE) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxdesk_core::FRAME_SAMPLES;

    #[test]
    fn test_rms_empty_frame_is_zero() {
        assert_eq!(rms(&AudioFrame::new()), 0.0);
    }

    #[test]
    fn test_rms_silence_is_zero() {
        let frame = AudioFrame::from_samples(&[0; FRAME_SAMPLES]);
        assert_eq!(rms(&frame), 0.0);
    }

    #[test]
    fn test_rms_full_scale_is_one() {
        let frame = AudioFrame::from_samples(&[i16::MIN; FRAME_SAMPLES]);
        assert!((rms(&frame) - 1.0).abs() < 1e-6);

        let frame = AudioFrame::from_samples(&[i16::MAX; FRAME_SAMPLES]);
        assert!((rms(&frame) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_rms_alternating_full_scale_square_wave() {
        let samples: Vec<i16> = (0..FRAME_SAMPLES)
            .map(|i| if i % 2 == 0 { i16::MAX } else { -i16::MAX })
            .collect();
        let level = rms(&AudioFrame::from_samples(&samples));
        assert!((level - 1.0).abs() < 1e-4, "got {level}");
    }

    #[test]
    fn test_rms_sine_is_about_inverse_sqrt_two() {
        let samples: Vec<i16> = (0..FRAME_SAMPLES)
            .map(|i| {
                let phase = i as f64 * 2.0 * std::f64::consts::PI * 8.0 / FRAME_SAMPLES as f64;
                (phase.sin() * 32767.0) as i16
            })
            .collect();
        let level = rms(&AudioFrame::from_samples(&samples));
        assert!((level - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-3, "got {level}");
    }

    #[test]
    fn test_rms_only_counts_valid_samples() {
        let mut frame = AudioFrame::from_samples(&[16384; 4]);
        assert!((rms(&frame) - 0.5).abs() < 1e-6);
        frame.clear();
        assert_eq!(rms(&frame), 0.0);
    }
}
