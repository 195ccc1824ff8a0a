//! Background dataset loading.
//!
//! The file is read and parsed on its own thread so the event loop keeps
//! running. The result is handed back through a channel exactly once.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Instant;

use tracing::{error, info};

use crate::error::{Result, ScoutError};
use crate::store::{self, Dataset};

/// Reads and parses the file at `path`.
pub fn load_file(path: &Path, delimiter: Option<u8>) -> Result<Dataset> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ScoutError::FileNotFound(path.display().to_string()),
        ErrorKind::PermissionDenied => ScoutError::PermissionDenied(path.display().to_string()),
        _ => ScoutError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(ScoutError::LoadingFailed(format!(
            "{} is not a file",
            path.display()
        )));
    }
    let raw = fs::read_to_string(path)?;
    store::load_with_delimiter(&raw, delimiter)
}

/// Handle to a load running in the background.
pub struct PendingLoad {
    path: PathBuf,
    receiver: Receiver<Result<Dataset>>,
    started: Instant,
}

impl PendingLoad {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Non blocking check for the result. `None` while the load is still running.
    pub fn poll(&self) -> Option<Result<Dataset>> {
        match self.receiver.try_recv() {
            Ok(result) => {
                match &result {
                    Ok(ds) => info!(
                        "Loaded {} rows from {} in {}ms",
                        ds.len(),
                        self.path.display(),
                        self.started.elapsed().as_millis()
                    ),
                    Err(e) => error!("Loading {} failed: {e}", self.path.display()),
                }
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ScoutError::LoadingFailed(
                "loader thread stopped without a result".into(),
            ))),
        }
    }
}

/// Starts loading `path` on a new thread.
pub fn spawn_load(path: PathBuf, delimiter: Option<u8>) -> PendingLoad {
    let (sender, receiver) = mpsc::channel();
    let thread_path = path.clone();
    thread::spawn(move || {
        // The receiver may be gone if the app quit mid-load.
        let _ = sender.send(load_file(&thread_path, delimiter));
    });
    PendingLoad {
        path,
        receiver,
        started: Instant::now(),
    }
}
