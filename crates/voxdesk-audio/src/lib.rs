pub mod capture;
pub mod device;
pub mod io;
pub mod level;
pub mod output;
pub mod status;

pub use capture::CaptureNode;
pub use device::DeviceManager;
pub use io::{AudioIo, DEFAULT_READ_TIMEOUT};
pub use level::rms;
pub use output::OutputNode;
pub use status::StreamStatus;

use ringbuf::traits::Split;
use ringbuf::{HeapCons, HeapProd, HeapRb};

/// Create a sample ring buffer split into producer and consumer halves.
pub fn create_ring_buffer(capacity: usize) -> (HeapProd<i16>, HeapCons<i16>) {
    HeapRb::<i16>::new(capacity).split()
}
