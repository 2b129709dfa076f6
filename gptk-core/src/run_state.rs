//! Run/cancel state shared between the orchestrator and an external stop
//! control.
//!
//! A run holds a [`RunGuard`]; every component below the orchestrator only
//! sees the guard's [`CancellationToken`] and polls it at its loop boundaries.
//! Dropping the guard returns the state to idle, so a run that fails or
//! panics can never leave the state stuck at "running".

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU64, Ordering},
};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{Result, ToolkitError};

#[derive(Debug)]
struct ActiveRun {
    id: u64,
    token: CancellationToken,
}

#[derive(Clone, Debug, Default)]
pub struct RunState {
    active: Arc<Mutex<Option<ActiveRun>>>,
    next_id: Arc<AtomicU64>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters the running state. Fails when another run is still active.
    pub fn begin(&self) -> Result<RunGuard> {
        let mut active = self
            .active
            .lock()
            .map_err(|_| ToolkitError::Internal("run state lock poisoned".into()))?;
        if active.is_some() {
            return Err(ToolkitError::AlreadyRunning);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        *active = Some(ActiveRun {
            id,
            token: token.clone(),
        });
        debug!(run_id = id, "Run started");

        Ok(RunGuard {
            state: self.clone(),
            id,
            token,
        })
    }

    pub fn is_running(&self) -> bool {
        self.active
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Requests cancellation of the active run, if any. Returns whether a run
    /// was signalled.
    pub fn cancel(&self) -> bool {
        let Ok(active) = self.active.lock() else {
            return false;
        };
        match active.as_ref() {
            Some(run) => {
                info!(run_id = run.id, "Stop requested");
                run.token.cancel();
                true
            }
            None => false,
        }
    }

    fn finish(&self, id: u64) {
        if let Ok(mut active) = self.active.lock()
            && active.as_ref().is_some_and(|run| run.id == id)
        {
            *active = None;
            debug!(run_id = id, "Run finished");
        }
    }
}

/// Proof of an active run. Idle is restored when this is dropped.
#[derive(Debug)]
pub struct RunGuard {
    state: RunState,
    id: u64,
    token: CancellationToken,
}

impl RunGuard {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.state.finish(self.id);
    }
}
