//! POSIX path algebra and filesystem change notification.
//!
//! Two pieces: a pure, string-based [`Path`] model (normalization,
//! component decomposition, ancestor reasoning, common-ancestor
//! computation) and a watch subsystem that turns OS change signals into
//! typed [`WatchEvent`]s delivered through callbacks or a multi-method
//! observer.
//!
//! ```no_run
//! use pathwatch::{Path, WatchFlags};
//!
//! let path = Path::new("/a//b/../c").standardized();
//! assert_eq!(path.raw(), "/a/c");
//!
//! let watcher = Path::new("/tmp/target").watch(WatchFlags::CHANGE_MASK, |event| {
//!     println!("{event}");
//! });
//! // keep `watcher` alive for the duration of the subscription
//! drop(watcher);
//! ```

pub mod config;
pub mod error;
pub mod flags;
pub mod logging;
pub mod path;
pub mod queue;
pub mod watcher;

pub use config::LoggingConfig;
pub use error::FileError;
pub use flags::{PermissionFlags, WatchFlags};
pub use path::{
    Path, RelativePathType, SEPARATOR, change_directory, current_working_directory,
    set_current_working_directory,
};
pub use queue::EventQueue;
pub use watcher::{
    EventSink, SingleWatcher, SingleWatcherBuilder, StreamWatcher, StreamWatcherBuilder,
    WatchCallback, WatchEvent, WatchObserver, WatcherPhase,
};
