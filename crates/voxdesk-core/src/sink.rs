/// Consumer of decoded playback audio.
///
/// The synthesizer forwards each chunk of PCM it receives to a sink as soon as
/// it arrives; implementations block until the samples are accepted.
pub trait AudioSink {
    fn play_samples(&mut self, samples: &[i16]);
}

impl AudioSink for Vec<i16> {
    fn play_samples(&mut self, samples: &[i16]) {
        self.extend_from_slice(samples);
    }
}
