//! Filesystem change notification.
//!
//! Turns low-level OS change signals into typed [`WatchEvent`]s delivered
//! through a unified callback or a multi-method [`WatchObserver`].
//!
//! # Architecture
//!
//! ```text
//! Path::watch(...)            StreamWatcher::builder(paths)
//!        |                               |
//!  SingleWatcher                   StreamWatcher
//!  (one path, one handle,      (path set, one handle,
//!   creation wait)              latency coalescing, flush)
//!        |                               |
//!        +------------ dispatch ---------+
//!                         |
//!          callback  or  observer methods
//! ```
//!
//! Both watcher kinds deliver on a serial [`EventQueue`](crate::queue::EventQueue);
//! events within one watcher arrive in OS order, and no ordering holds
//! across watcher instances.

mod dispatch;
mod event;
mod single;
mod stream;

pub use dispatch::{EventSink, WatchCallback, WatchObserver};
pub use event::WatchEvent;
pub use single::{SingleWatcher, SingleWatcherBuilder, WatcherPhase};
pub use stream::{StreamWatcher, StreamWatcherBuilder};
