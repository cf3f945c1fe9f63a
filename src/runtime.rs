//! Process-wide library lifecycle.
//!
//! The engine keeps a single three-state machine: fresh, ready, shut down.
//! `Repository::open` initializes a fresh runtime on first use, so explicit
//! initialization is optional; once `shutdown` has run, every further open
//! fails with a typed error instead of undefined behavior.

use crate::errors::{Error, Result};
use std::sync::atomic::{AtomicU8, Ordering};

const FRESH: u8 = 0;
const READY: u8 = 1;
const DOWN: u8 = 2;

static STATE: AtomicU8 = AtomicU8::new(FRESH);

/// Initialize the library explicitly.
///
/// Fails with `AlreadyInitialized` on a second call and with `Shutdown`
/// after the library has been torn down.
pub fn initialize() -> Result<()> {
    match STATE.compare_exchange(FRESH, READY, Ordering::SeqCst, Ordering::SeqCst) {
        Ok(_) => Ok(()),
        Err(READY) => Err(Error::AlreadyInitialized),
        Err(_) => Err(Error::Shutdown),
    }
}

/// Tear the library down. Idempotent.
pub fn shutdown() {
    STATE.store(DOWN, Ordering::SeqCst);
}

/// Gate for every public entry point: auto-initializes a fresh runtime,
/// accepts a ready one, and rejects use after shutdown.
pub(crate) fn ensure_ready() -> Result<()> {
    match STATE.load(Ordering::SeqCst) {
        DOWN => Err(Error::Shutdown),
        FRESH => {
            // Racing initializers both land on READY; losing to a
            // concurrent shutdown is caught by the recheck.
            let _ = STATE.compare_exchange(FRESH, READY, Ordering::SeqCst, Ordering::SeqCst);
            match STATE.load(Ordering::SeqCst) {
                DOWN => Err(Error::Shutdown),
                _ => Ok(()),
            }
        }
        _ => Ok(()),
    }
}
