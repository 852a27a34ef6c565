//! Browser glue and shared data structures.
//!
//! Provides:
//! - [`RingBuffer`] - Fixed-capacity circular buffer with O(1) push
//! - [`LocalStorage`] - [`Storage`](crate::core::Storage) backed by `window.localStorage`
//! - [`logger`] - `log` backend writing to the browser console

pub mod dom;
pub mod logger;
mod ring_buffer;

pub use dom::LocalStorage;
pub use ring_buffer::RingBuffer;
