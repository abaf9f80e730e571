//! Cooperative cancellation for long-running loads.
//!
//! `CancellationToken` / `CancellationHandle` pair: the token is handed to the
//! bulk loader (checked at every batch boundary), while the handle stays with
//! the caller to request cancellation. A batch that is already running always
//! finishes and commits before the request is observed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Token checked by the loader to detect cancellation.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

/// Handle held by the caller to cancel an in-flight load.
#[derive(Debug, Clone)]
pub struct CancellationHandle {
    flag: Arc<AtomicBool>,
}

/// Create a new cancellation pair (token, handle).
pub fn cancellation_pair() -> (CancellationToken, CancellationHandle) {
    let flag = Arc::new(AtomicBool::new(false));
    (
        CancellationToken {
            flag: Arc::clone(&flag),
        },
        CancellationHandle { flag },
    )
}

impl CancellationToken {
    /// Check if cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

impl CancellationHandle {
    /// Signal cancellation to the associated token. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }
}
