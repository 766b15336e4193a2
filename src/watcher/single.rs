//! Single-path, descriptor-based watcher.
//!
//! A [`SingleWatcher`] owns at most one OS watch handle scoped to one
//! path, plus an optional secondary handle on the parent directory while
//! waiting for a path that does not exist yet. State machine:
//!
//! ```text
//! Pending ──start()──> AwaitingCreation ──creation observed──> Active
//!    │                        │                                  │
//!    └────────start()─────────┘ (path already exists)            │
//!                             └───────────close()────────────────┴──> Stopped
//! ```
//!
//! The caller owns the watcher and must keep it alive for the duration of
//! the subscription; dropping it closes the subscription. The watcher
//! holds no strong reference back to the subscriber's observer beyond the
//! registered sink.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use parking_lot::Mutex;

use crate::flags::WatchFlags;
use crate::path::Path;
use crate::queue::EventQueue;

use super::dispatch::{EventSink, WatchCallback, WatchObserver, dispatch};
use super::event::WatchEvent;

/// Externally visible lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherPhase {
    /// Built but not yet started.
    Pending,
    /// Waiting for the watched path to come into existence.
    AwaitingCreation,
    /// Receiving events for the watched path.
    Active,
    /// Cancelled or closed; resources released.
    Stopped,
}

enum State {
    Pending,
    AwaitingCreation { parent_watcher: RecommendedWatcher },
    Active { watcher: RecommendedWatcher },
    Stopped,
}

struct SingleInner {
    path: Path,
    requested: WatchFlags,
    queue: EventQueue,
    sink: Option<EventSink>,
    state: Mutex<State>,
    last_flags: Mutex<Option<WatchFlags>>,
    sequence: AtomicU64,
}

/// Descriptor-based watcher for one path.
pub struct SingleWatcher {
    inner: Arc<SingleInner>,
}

impl SingleWatcher {
    /// Builder for a watcher on `path`.
    pub fn builder(path: Path) -> SingleWatcherBuilder {
        SingleWatcherBuilder {
            path,
            events: WatchFlags::CHANGE_MASK,
            queue: None,
            sink: None,
        }
    }

    /// The watched path.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> WatcherPhase {
        match &*self.inner.state.lock() {
            State::Pending => WatcherPhase::Pending,
            State::AwaitingCreation { .. } => WatcherPhase::AwaitingCreation,
            State::Active { .. } => WatcherPhase::Active,
            State::Stopped => WatcherPhase::Stopped,
        }
    }

    /// Acquire the OS resources and begin delivery.
    ///
    /// Returns `false` when the path does not exist and `CREATED` was not
    /// requested, or when the OS handle cannot be acquired; no partial
    /// resource is left open on any failure path. Returns `true` without
    /// re-subscribing when already started. Never blocks waiting for an
    /// event, only for resource acquisition.
    pub fn start(&self) -> bool {
        SingleInner::start(&self.inner)
    }

    /// Cancel the active event source. Safe to call repeatedly; later
    /// calls are no-ops once cancellation is in flight. A pending
    /// creation wait is not affected; use [`SingleWatcher::close`] for
    /// full teardown.
    pub fn stop(&self) {
        let released = {
            let mut state = self.inner.state.lock();
            match std::mem::replace(&mut *state, State::Stopped) {
                State::Active { watcher } => Some(watcher),
                other => {
                    *state = other;
                    None
                }
            }
        };
        if released.is_some() {
            crate::debug_event!("watcher", "stopped", "{}", self.inner.path);
        }
        // Dropped outside the lock; release may involve the backend's own
        // thread shutdown.
        drop(released);
    }

    /// Release every OS resource immediately, including a still-pending
    /// creation watcher. Idempotent; also invoked by `Drop` exactly once
    /// if not already closed.
    pub fn close(&self) {
        self.inner.close();
    }

    /// Best-effort last-seen flag set, or a synthetic `CREATED` indicator
    /// while awaiting creation.
    pub fn current_event(&self) -> Option<WatchFlags> {
        if matches!(
            &*self.inner.state.lock(),
            State::AwaitingCreation { .. }
        ) {
            return Some(WatchFlags::CREATED);
        }
        *self.inner.last_flags.lock()
    }
}

impl Drop for SingleWatcher {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for SingleWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleWatcher")
            .field("path", &self.inner.path)
            .field("phase", &self.phase())
            .finish()
    }
}

impl SingleInner {
    fn start(this: &Arc<Self>) -> bool {
        let mut state = this.state.lock();
        if matches!(
            &*state,
            State::Active { .. } | State::AwaitingCreation { .. }
        ) {
            return true;
        }

        let target = this.path.absolute();
        if !target.exists() {
            if !this.requested.contains(WatchFlags::CREATED) {
                return false;
            }
            return Self::await_creation(this, &mut state, &target);
        }
        Self::activate(this, &mut state, &target)
    }

    /// Install the primary watch handle on an existing path.
    fn activate(this: &Arc<Self>, state: &mut State, target: &Path) -> bool {
        let weak = Arc::downgrade(this);
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    if let Some(inner) = weak.upgrade() {
                        Self::handle_event(&inner, &event);
                    }
                }
                Err(e) => tracing::warn!("[watcher] backend error: {e}"),
            }
        });
        let mut watcher = match watcher {
            Ok(watcher) => watcher,
            Err(e) => {
                tracing::warn!("[watcher] failed to create handle for {}: {e}", target);
                return false;
            }
        };

        if let Err(e) = watcher.watch(target.as_std_path(), RecursiveMode::NonRecursive) {
            // The handle is dropped here; nothing stays open.
            tracing::warn!("[watcher] failed to watch {}: {e}", target);
            return false;
        }

        *state = State::Active { watcher };
        crate::debug_event!("watcher", "active", "{}", this.path);
        true
    }

    /// Install the secondary watch on the parent directory, waiting for
    /// the target to come into existence.
    fn await_creation(this: &Arc<Self>, state: &mut State, target: &Path) -> bool {
        let parent = target.parent();
        let weak = Arc::downgrade(this);
        let parent_watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let Ok(event) = res else { return };
            // Only write-ish notifications on the parent are of interest.
            if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                return;
            }
            if let Some(inner) = weak.upgrade() {
                let recheck = Arc::clone(&inner);
                inner
                    .queue
                    .execute(move || Self::observe_creation(&recheck));
            }
        });
        let mut parent_watcher = match parent_watcher {
            Ok(watcher) => watcher,
            Err(e) => {
                tracing::warn!("[watcher] failed to create parent handle for {}: {e}", target);
                return false;
            }
        };

        if let Err(e) = parent_watcher.watch(parent.as_std_path(), RecursiveMode::NonRecursive) {
            tracing::warn!("[watcher] failed to watch parent {}: {e}", parent);
            return false;
        }

        *state = State::AwaitingCreation { parent_watcher };
        crate::debug_event!("watcher", "awaiting creation", "{}", this.path);
        true
    }

    /// Re-check the target after a parent notification. Runs on the
    /// delivery queue, never on the backend's callback thread, so the
    /// secondary watcher can be dropped safely from here.
    fn observe_creation(this: &Arc<Self>) {
        let target = this.path.absolute();
        if !target.is_regular() && !target.is_directory() {
            return;
        }

        // Tear the secondary watcher down exactly once: only the call
        // that observes the AwaitingCreation state proceeds.
        let parent_watcher = {
            let mut state = this.state.lock();
            match std::mem::replace(&mut *state, State::Pending) {
                State::AwaitingCreation { parent_watcher } => parent_watcher,
                other => {
                    *state = other;
                    return;
                }
            }
        };
        drop(parent_watcher);

        let kind = if target.is_directory() {
            WatchFlags::IS_DIRECTORY
        } else {
            WatchFlags::IS_FILE
        };
        crate::debug_event!("watcher", "created", "{}", this.path);
        Self::deliver(this, WatchFlags::CREATED | kind);

        // Re-enter start() to proceed to Active, unless a racing close()
        // landed between the teardown above and here.
        if matches!(&*this.state.lock(), State::Pending) {
            Self::start(this);
        }
    }

    /// Decode and filter one backend event for the active watch.
    fn handle_event(this: &Arc<Self>, event: &Event) {
        let mut flags = WatchFlags::from_event_kind(&event.kind);
        if event.need_rescan() {
            flags |= WatchFlags::MUST_RESCAN;
        }

        // Once creation has been observed it is not re-delivered.
        let relevant =
            flags & WatchFlags::CHANGE_MASK & (this.requested - WatchFlags::CREATED);
        if relevant.is_empty() && !flags.contains(WatchFlags::MUST_RESCAN) {
            return;
        }
        Self::deliver(this, relevant | (flags - WatchFlags::CHANGE_MASK));
    }

    /// Record and enqueue one decoded event for dispatch.
    fn deliver(this: &Arc<Self>, flags: WatchFlags) {
        *this.last_flags.lock() = Some(flags);
        let sequence_id = this.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let event = WatchEvent::new(sequence_id, this.path.clone(), flags);

        let weak = Arc::downgrade(this);
        this.queue.execute(move || {
            let Some(inner) = weak.upgrade() else { return };
            // A dispatch already running when close() lands is allowed to
            // finish, but nothing new begins after release.
            if matches!(&*inner.state.lock(), State::Stopped) {
                return;
            }
            if let Some(sink) = &inner.sink {
                dispatch(&event, sink);
            }
        });
    }

    fn close(&self) {
        let released = {
            let mut state = self.state.lock();
            match std::mem::replace(&mut *state, State::Stopped) {
                State::Active { watcher } => Some(watcher),
                State::AwaitingCreation { parent_watcher } => Some(parent_watcher),
                _ => None,
            }
        };
        if released.is_some() {
            crate::debug_event!("watcher", "closed", "{}", self.path);
        }
        drop(released);
    }
}

/// Builder for [`SingleWatcher`].
pub struct SingleWatcherBuilder {
    path: Path,
    events: WatchFlags,
    queue: Option<EventQueue>,
    sink: Option<EventSink>,
}

impl SingleWatcherBuilder {
    /// Flag mask to watch for. Defaults to every change flag.
    pub fn events(mut self, events: WatchFlags) -> Self {
        self.events = events;
        self
    }

    /// Delivery context. Defaults to the shared background queue.
    pub fn queue(mut self, queue: EventQueue) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Register a unified callback, invoked once per event.
    pub fn callback(mut self, callback: impl Fn(&WatchEvent) + Send + Sync + 'static) -> Self {
        self.sink = Some(EventSink::Callback(Arc::new(callback) as WatchCallback));
        self
    }

    /// Register a multi-method observer.
    ///
    /// The watcher keeps only this shared handle; the subscriber is
    /// responsible for any state the observer borrows.
    pub fn observer(mut self, observer: Arc<dyn WatchObserver>) -> Self {
        self.sink = Some(EventSink::Observer(observer));
        self
    }

    /// Build the watcher. Construction never fails; resource acquisition
    /// is reported by [`SingleWatcher::start`].
    pub fn build(self) -> SingleWatcher {
        SingleWatcher {
            inner: Arc::new(SingleInner {
                path: self.path,
                requested: self.events,
                queue: self.queue.unwrap_or_else(EventQueue::background),
                sink: self.sink,
                state: Mutex::new(State::Pending),
                last_flags: Mutex::new(None),
                sequence: AtomicU64::new(0),
            }),
        }
    }
}

impl Path {
    /// Watch this path with a unified callback, attempting to start
    /// immediately. Check [`SingleWatcher::phase`] for the outcome.
    pub fn watch(
        &self,
        events: WatchFlags,
        callback: impl Fn(&WatchEvent) + Send + Sync + 'static,
    ) -> SingleWatcher {
        let watcher = SingleWatcher::builder(self.clone())
            .events(events)
            .callback(callback)
            .build();
        watcher.start();
        watcher
    }

    /// Watch this path with a multi-method observer, attempting to start
    /// immediately.
    pub fn watch_with_observer(
        &self,
        events: WatchFlags,
        observer: Arc<dyn WatchObserver>,
    ) -> SingleWatcher {
        let watcher = SingleWatcher::builder(self.clone())
            .events(events)
            .observer(observer)
            .build();
        watcher.start();
        watcher
    }
}
