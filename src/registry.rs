//! In-flight extraction registry
//!
//! Process-local, thread-safe ownership arbitration per destination key. The
//! first caller to ask for a key becomes the owner of that generation and
//! receives an [`ExtractionPermit`]; everyone else receives a
//! [`CompletionSignal`] attached to the same in-flight attempt. The registry
//! holds no durable state — the completion marker on disk is the only thing
//! that outlives the process.
//!
//! The original check-lock-recheck pattern over a shared map is expressed here
//! as a single atomic get-or-create inside one mutex critical section, so two
//! callers racing on the same key can never both become owner.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Terminal outcome of one extraction generation, shared with every waiter
type Outcome = Result<()>;

/// Map from destination key to the in-flight generation's signal
type InflightMap = HashMap<PathBuf, watch::Receiver<Option<Outcome>>>;

/// Registry of in-flight extractions, keyed by canonical destination path
///
/// Cheap to clone; clones share the same underlying map.
#[derive(Clone, Debug, Default)]
pub struct ExtractionRegistry {
    inflight: Arc<Mutex<InflightMap>>,
}

/// Result of [`ExtractionRegistry::try_acquire`]
pub enum Acquire {
    /// This caller owns the generation and must perform the extraction,
    /// resolve the permit, and thereby release the entry
    Owner(ExtractionPermit),
    /// Another caller owns an in-flight generation for this key; wait on the
    /// signal for its outcome
    Waiter(CompletionSignal),
}

impl ExtractionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically look up or create the in-flight entry for `key`
    ///
    /// Exactly one concurrent caller per key receives [`Acquire::Owner`]; all
    /// others receive [`Acquire::Waiter`] bound to that owner's outcome. Once
    /// the owner's permit is gone the entry is removed and the next caller
    /// starts a fresh generation.
    pub fn try_acquire(&self, key: &Path) -> Acquire {
        let mut inflight = lock(&self.inflight);

        match inflight.entry(key.to_path_buf()) {
            Entry::Occupied(entry) => {
                debug!(?key, "attaching to in-flight extraction");
                Acquire::Waiter(CompletionSignal {
                    key: key.to_path_buf(),
                    rx: entry.get().clone(),
                })
            }
            Entry::Vacant(slot) => {
                let (tx, rx) = watch::channel(None);
                slot.insert(rx);
                debug!(?key, "acquired extraction ownership");
                Acquire::Owner(ExtractionPermit {
                    key: key.to_path_buf(),
                    tx: Some(tx),
                    inflight: Arc::clone(&self.inflight),
                })
            }
        }
    }

    /// Whether a generation is currently in flight for `key`
    ///
    /// Diagnostic visibility only; by the time the answer is observed it may
    /// already be stale.
    pub fn contains(&self, key: &Path) -> bool {
        lock(&self.inflight).contains_key(key)
    }
}

/// Single-use resolver held by the owner of one extraction generation
///
/// [`resolve`](Self::resolve) consumes the permit, so resolving twice is
/// unrepresentable. Dropping the permit without resolving (owner panicked or
/// its future was cancelled) closes the channel: attached waiters observe an
/// [`Error::Interrupted`] outcome instead of hanging, and the registry entry is
/// removed so the key can recover with a fresh generation.
pub struct ExtractionPermit {
    key: PathBuf,
    tx: Option<watch::Sender<Option<Outcome>>>,
    inflight: Arc<Mutex<InflightMap>>,
}

impl ExtractionPermit {
    /// Resolve this generation's outcome and release the registry entry
    ///
    /// Every waiter already attached to the generation observes `outcome`;
    /// waiters still holding the signal after release keep reading the same
    /// resolved value. Future callers for the key start over at the marker
    /// check.
    pub fn resolve(mut self, outcome: Outcome) {
        if let Some(tx) = self.tx.take() {
            tx.send_replace(Some(outcome));
        }
        // self drops here, removing the entry after the value is visible
    }
}

impl Drop for ExtractionPermit {
    fn drop(&mut self) {
        if self.tx.is_some() {
            warn!(
                key = ?self.key,
                "extraction owner dropped without resolving; waiters observe an interrupted generation"
            );
        }
        let removed = lock(&self.inflight).remove(&self.key);
        debug_assert!(
            removed.is_some(),
            "in-flight entry missing while its permit was alive"
        );
    }
}

impl std::fmt::Debug for ExtractionPermit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionPermit")
            .field("key", &self.key)
            .field("resolved", &self.tx.is_none())
            .finish()
    }
}

/// Shared completion signal for one extraction generation
///
/// Starts pending and resolves exactly once. Any number of waiters may hold a
/// signal for the same generation; each waits with its own budget.
#[derive(Clone, Debug)]
pub struct CompletionSignal {
    key: PathBuf,
    rx: watch::Receiver<Option<Outcome>>,
}

impl CompletionSignal {
    /// Block until the generation resolves, up to `max_wait`
    ///
    /// Returns the owner's outcome on resolution, [`Error::Timeout`] if the
    /// budget elapses first (the extraction itself is not cancelled), or
    /// [`Error::Interrupted`] if the owning attempt vanished without an
    /// outcome.
    pub async fn wait(mut self, max_wait: Duration) -> Result<()> {
        let destination = self.key.clone();

        match tokio::time::timeout(max_wait, self.rx.wait_for(|outcome| outcome.is_some())).await {
            Err(_elapsed) => Err(Error::Timeout {
                destination,
                waited: max_wait,
            }),
            // Owner vanished before resolving and no value was ever published
            Ok(Err(_closed)) => Err(Error::Interrupted { destination }),
            Ok(Ok(resolved)) => match &*resolved {
                Some(outcome) => outcome.clone(),
                // wait_for only yields on a published value
                None => Err(Error::Interrupted { destination }),
            },
        }
    }
}

fn lock(inflight: &Mutex<InflightMap>) -> MutexGuard<'_, InflightMap> {
    // A poisoned map only means another owner panicked mid-update; the map
    // itself is never left in a torn state by any critical section here.
    inflight.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
