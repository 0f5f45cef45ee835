//! Rolling History Buffer
//!
//! Provides a fixed-capacity ring buffer with strict FIFO eviction, used to
//! keep the most recent per-frame samples for external reporting.

mod buffer;

pub use buffer::{RingBuffer, DEFAULT_CAPACITY};

use thiserror::Error;

/// Ring buffer errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BufferError {
    #[error("Ring buffer capacity must be at least 1")]
    ZeroCapacity,
}
