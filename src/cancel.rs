//! Ctrl-C handling: remove the scratch frame directory of the clip in progress, then exit.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::foundation::error::{RetypeError, RetypeResult};

/// Exit status used after an interrupt (128 + SIGINT).
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Shared slot naming the scratch directory that must not outlive an interrupt.
#[derive(Clone, Debug, Default)]
pub struct ScratchRegistry {
    current: Arc<Mutex<Option<PathBuf>>>,
}

impl ScratchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, dir: &Path) {
        if let Ok(mut slot) = self.current.lock() {
            *slot = Some(dir.to_path_buf());
        }
    }

    pub fn clear(&self) {
        if let Ok(mut slot) = self.current.lock() {
            *slot = None;
        }
    }

    pub fn current(&self) -> Option<PathBuf> {
        self.current.lock().ok().and_then(|slot| slot.clone())
    }

    /// Remove the registered directory, if any. Returns the removed path.
    pub fn cleanup(&self) -> Option<PathBuf> {
        let dir = self.current.lock().ok().and_then(|mut slot| slot.take())?;
        match std::fs::remove_dir_all(&dir) {
            Ok(()) => Some(dir),
            Err(err) => {
                tracing::error!(dir = %dir.display(), %err, "failed to clean up frames");
                None
            }
        }
    }
}

/// Spawn a background thread that waits for Ctrl-C, cleans up `registry` and exits the process
/// with [`INTERRUPTED_EXIT_CODE`].
pub fn install(registry: ScratchRegistry) -> RetypeResult<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| RetypeError::config(format!("failed to start signal runtime: {e}")))?;

    std::thread::Builder::new()
        .name("retype-ctrlc".to_string())
        .spawn(move || {
            runtime.block_on(async {
                if let Err(err) = tokio::signal::ctrl_c().await {
                    tracing::error!(%err, "failed to listen for ctrl-c");
                    return;
                }
                tracing::info!("interrupted, cleaning up temporary files");
                registry.cleanup();
                std::process::exit(INTERRUPTED_EXIT_CODE);
            });
        })
        .map_err(|e| RetypeError::config(format!("failed to spawn signal thread: {e}")))?;
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/cancel.rs"]
mod tests;
