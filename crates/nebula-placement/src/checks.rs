//! The process-wide placement lock and the generation-check suppression flag.
//!
//! Structure-start evaluation mutates engine state that is not safe to share,
//! so at most one evaluation runs at a time, process-wide. The suppression
//! flag lives next to the lock and can only be raised through a
//! [`LockToken`], so two forced placements can never interleave flag state.
//! Generation code does not read the flag; it receives a
//! [`GenerationChecks`] value with every call. The flag is kept for external
//! readers (see [`generation_checks_suppressed`]).

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

/// Whether block placement validity checks apply to a generation call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationChecks {
    /// Normal generation: fluid adjacency, replacement legality and
    /// foothold checks apply.
    Enforced,
    /// Forced placement: checks are skipped.
    Suppressed,
}

impl GenerationChecks {
    /// Returns `true` for [`GenerationChecks::Suppressed`].
    pub fn is_suppressed(self) -> bool {
        self == Self::Suppressed
    }
}

static GLOBAL: LazyLock<Arc<PlacementLock>> = LazyLock::new(|| Arc::new(PlacementLock::new()));

/// Mutual-exclusion resource serializing structure-start evaluation and
/// forced placement.
#[derive(Debug, Default)]
pub struct PlacementLock {
    mutex: Mutex<()>,
    suppressed: AtomicBool,
}

impl PlacementLock {
    /// Creates an independent lock. Production code shares [`PlacementLock::global`].
    pub const fn new() -> Self {
        Self {
            mutex: Mutex::new(()),
            suppressed: AtomicBool::new(false),
        }
    }

    /// The process-wide lock.
    pub fn global() -> Arc<Self> {
        Arc::clone(&*GLOBAL)
    }

    /// Blocks until the lock is free and returns the token proving ownership.
    ///
    /// A lock poisoned by a panicking holder is recovered: the guarded state
    /// is `()` and the suppression flag is restored by its own guard.
    pub fn acquire(&self) -> LockToken<'_> {
        let guard = self.mutex.lock().unwrap_or_else(PoisonError::into_inner);
        LockToken {
            lock: self,
            _guard: guard,
        }
    }

    /// Current value of this lock's suppression flag.
    pub fn checks_suppressed(&self) -> bool {
        self.suppressed.load(Ordering::Acquire)
    }
}

/// Current value of the process-wide suppression flag.
pub fn generation_checks_suppressed() -> bool {
    GLOBAL.checks_suppressed()
}

/// Proof that the holder owns a [`PlacementLock`]. Released on drop.
pub struct LockToken<'l> {
    lock: &'l PlacementLock,
    _guard: MutexGuard<'l, ()>,
}

impl LockToken<'_> {
    /// Copyable evidence that the lock is held, for passing into generation calls.
    pub fn held(&self) -> LockHeld<'_> {
        LockHeld {
            _token: PhantomData,
        }
    }

    /// Raises the suppression flag until the returned guard is dropped.
    pub fn suppress_checks(&self) -> SuppressionGuard<'_> {
        let previous = self.lock.suppressed.swap(true, Ordering::AcqRel);
        SuppressionGuard {
            lock: self.lock,
            previous,
        }
    }
}

/// Borrowed evidence that a [`PlacementLock`] is held.
///
/// Only obtainable from a live [`LockToken`]; calls that must run under the
/// lock take one as an argument.
#[derive(Clone, Copy, Debug)]
pub struct LockHeld<'t> {
    _token: PhantomData<&'t ()>,
}

/// Scoped suppression of generation checks.
///
/// Dropping the guard (including during unwinding) restores the flag to the
/// value it had when the guard was created.
pub struct SuppressionGuard<'t> {
    lock: &'t PlacementLock,
    previous: bool,
}

impl SuppressionGuard<'_> {
    /// The check mode generation calls made under this guard must use.
    pub fn checks(&self) -> GenerationChecks {
        GenerationChecks::Suppressed
    }
}

impl Drop for SuppressionGuard<'_> {
    fn drop(&mut self) {
        self.lock.suppressed.store(self.previous, Ordering::Release);
    }
}
