//! Debounced synchronization scheduling.
//!
//! Leading + trailing debounce: the first trigger of a burst runs the job at
//! once, later triggers inside the quiescence window are folded together, and
//! if any were folded the job runs one more time when the window finally
//! elapses. Each folded trigger restarts the window.
//!
//! The job receives only the key and must read the latest document state
//! itself, so the trailing run always synchronizes what the user ended with.

use dashmap::DashMap;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Outcome of a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Run the job now.
    Fire,
    /// Suppressed; the trailing run is due at the given instant.
    Deferred(Instant),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Window { deadline: Instant, pending: bool },
}

/// Clock-injected debounce state machine.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    state: State,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            state: State::Idle,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Takes effect from the next trigger.
    pub fn set_window(&mut self, window: Duration) {
        self.window = window;
    }

    /// Registers a change at `now`.
    pub fn trigger(&mut self, now: Instant) -> Trigger {
        let deadline = now + self.window;
        match self.state {
            State::Window { deadline: current, .. } if now < current => {
                self.state = State::Window {
                    deadline,
                    pending: true,
                };
                Trigger::Deferred(deadline)
            }
            _ => {
                self.state = State::Window {
                    deadline,
                    pending: false,
                };
                Trigger::Fire
            }
        }
    }

    /// Closes the window if it has elapsed.
    ///
    /// Returns `true` when a trailing run is owed.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.state {
            State::Window { deadline, pending } if now >= deadline => {
                self.state = State::Idle;
                pending
            }
            _ => false,
        }
    }

    /// Deadline of a trailing run that is still owed.
    pub fn pending_deadline(&self) -> Option<Instant> {
        match self.state {
            State::Window {
                deadline,
                pending: true,
            } => Some(deadline),
            _ => None,
        }
    }
}

type Job<K> = Arc<dyn Fn(K) -> BoxFuture<'static, ()> + Send + Sync>;

struct Slot {
    debouncer: Debouncer,
    timer: Option<JoinHandle<()>>,
}

/// Per-key debounced job runner on the tokio runtime.
pub struct ChangeScheduler<K> {
    window_ms: AtomicU64,
    job: Job<K>,
    slots: Arc<DashMap<K, Slot>>,
}

impl<K: Eq + Hash> std::fmt::Debug for ChangeScheduler<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeScheduler")
            .field("window_ms", &self.window_ms.load(Ordering::Relaxed))
            .field("keys", &self.slots.len())
            .finish()
    }
}

fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

impl<K> ChangeScheduler<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(window: Duration, job: F) -> Self
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            window_ms: AtomicU64::new(window.as_millis() as u64),
            job: Arc::new(move |key| job(key).boxed()),
            slots: Arc::new(DashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms.load(Ordering::Relaxed))
    }

    pub fn set_window(&self, window: Duration) {
        self.window_ms
            .store(window.as_millis() as u64, Ordering::Relaxed);
    }

    /// Records a change for `key`. Must be called from within a tokio runtime.
    pub fn trigger(&self, key: K) {
        let window = self.window();
        let mut slot = self.slots.entry(key.clone()).or_insert_with(|| Slot {
            debouncer: Debouncer::new(window),
            timer: None,
        });
        slot.debouncer.set_window(window);

        match slot.debouncer.trigger(now()) {
            Trigger::Fire => {
                drop(slot);
                tracing::trace!("leading run");
                tokio::spawn((self.job)(key));
            }
            Trigger::Deferred(deadline) => {
                if let Some(timer) = slot.timer.take() {
                    timer.abort();
                }
                let slots = Arc::clone(&self.slots);
                let job = Arc::clone(&self.job);
                slot.timer = Some(tokio::spawn(async move {
                    tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
                    let owed = slots.get_mut(&key).is_some_and(|mut slot| {
                        slot.timer = None;
                        slot.debouncer.expire(now())
                    });
                    if owed {
                        tracing::trace!("trailing run");
                        job(key).await;
                    }
                }));
            }
        }
    }

    /// Forgets `key`, dropping any owed trailing run.
    pub fn cancel(&self, key: &K) {
        if let Some((_, slot)) = self.slots.remove(key)
            && let Some(timer) = slot.timer
        {
            timer.abort();
        }
    }

    /// Whether a trailing run is owed for `key`.
    pub fn is_pending(&self, key: &K) -> bool {
        self.slots
            .get(key)
            .is_some_and(|slot| slot.debouncer.pending_deadline().is_some())
    }
}
