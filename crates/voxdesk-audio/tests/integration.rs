use ringbuf::traits::{Consumer, Producer};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use voxdesk_audio::{create_ring_buffer, rms, AudioIo};
use voxdesk_core::{AudioFrame, AudioSink, BUFFER_FRAMES, FRAME_SAMPLES};

#[test]
fn test_capture_frames_from_threaded_driver() {
    let (mut mic, cap_cons) = create_ring_buffer(FRAME_SAMPLES * BUFFER_FRAMES);
    let mut io = AudioIo::from_ring_buffers(cap_cons, None);

    // Simulated driver: 3 frames of a ramp delivered in 128-sample bursts
    let total = FRAME_SAMPLES * 3;
    let driver = std::thread::spawn(move || {
        let signal: Vec<i16> = (0..total).map(|i| (i % 1000) as i16).collect();
        let mut offset = 0;
        while offset < signal.len() {
            let end = (offset + 128).min(signal.len());
            offset += mic.push_slice(&signal[offset..end]);
            std::thread::sleep(Duration::from_millis(1));
        }
    });

    let mut captured = Vec::new();
    let mut frame = AudioFrame::new();
    for _ in 0..200 {
        let n = io.read_samples(&mut frame, Duration::from_millis(20));
        captured.extend_from_slice(frame.as_slice());
        if n == 0 && captured.len() >= total {
            break;
        }
    }
    driver.join().unwrap();

    assert_eq!(captured.len(), total);
    for (i, s) in captured.iter().enumerate() {
        assert_eq!(*s, (i % 1000) as i16);
    }
}

#[test]
fn test_playback_blocks_until_driver_drains() {
    let (cap_prod, cap_cons) = create_ring_buffer(FRAME_SAMPLES);
    let (out_prod, mut out_cons) = create_ring_buffer(FRAME_SAMPLES * BUFFER_FRAMES);
    let mut io = AudioIo::from_ring_buffers(cap_cons, Some(out_prod));
    drop(cap_prod);

    // Simulated speaker: drain one frame per millisecond until told to stop
    let done = Arc::new(AtomicBool::new(false));
    let done_flag = Arc::clone(&done);
    let speaker = std::thread::spawn(move || {
        let mut played = Vec::new();
        let mut buf = vec![0i16; FRAME_SAMPLES];
        loop {
            let n = out_cons.pop_slice(&mut buf);
            played.extend_from_slice(&buf[..n]);
            if n == 0 && done_flag.load(Ordering::Relaxed) {
                break;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        played
    });

    // Ten frames through a four-frame ring
    let audio: Vec<i16> = (0..FRAME_SAMPLES * 10).map(|i| (i as i16).wrapping_mul(7)).collect();
    for chunk in audio.chunks(300) {
        AudioSink::play_samples(&mut io, chunk);
    }
    io.flush_playback();
    done.store(true, Ordering::Relaxed);

    let played = speaker.join().unwrap();
    assert_eq!(played, audio);
}

#[test]
fn test_rms_of_captured_frame() {
    let (mut mic, cap_cons) = create_ring_buffer(FRAME_SAMPLES * BUFFER_FRAMES);
    let mut io = AudioIo::from_ring_buffers(cap_cons, None);

    mic.push_slice(&[0; FRAME_SAMPLES]);
    let mut frame = AudioFrame::new();
    io.read_frame(&mut frame);
    assert_eq!(rms(&frame), 0.0);

    mic.push_slice(&[i16::MIN; FRAME_SAMPLES]);
    io.read_frame(&mut frame);
    assert!((rms(&frame) - 1.0).abs() < 1e-6);
}
