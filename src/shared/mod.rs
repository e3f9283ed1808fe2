pub mod ring_queue;
pub mod snapshot;

pub use ring_queue::RingQueue;
