//! The store handle.
//!
//! SQLite connections are not `Sync`, so one worker thread owns the only
//! connection and async callers send it closures. Every clone of
//! [`Database`] talks to the same worker; the worker stops when the last
//! clone is dropped.

use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex, PoisonError},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use rusqlite::Connection;
use tokio::sync::oneshot;

use super::migrations::run_migrations;
use crate::{log_error, log_info};

const ENABLE_LOGS: bool = true;

const BUSY_TIMEOUT_MS: i64 = 5_000;

type Job = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum Command {
    Run(Job),
    Stop,
}

enum Target {
    File(PathBuf),
    Memory,
}

impl Target {
    fn connect(&self) -> Result<Connection> {
        let conn = match self {
            Target::File(path) => Connection::open(path)
                .with_context(|| format!("failed to open SQLite database {}", path.display()))?,
            Target::Memory => {
                Connection::open_in_memory().context("failed to open in-memory SQLite database")?
            }
        };

        // WAL needs a real file; results tables rely on cascading deletes.
        if let Target::File(_) = self {
            conn.pragma_update(None, "journal_mode", "WAL")
                .context("failed to enable WAL mode")?;
            conn.pragma_update(None, "busy_timeout", BUSY_TIMEOUT_MS)
                .context("failed to set busy timeout")?;
        }
        conn.pragma_update(None, "foreign_keys", "ON")
            .context("failed to enable foreign keys")?;
        Ok(conn)
    }
}

fn worker_main(target: Target, commands: mpsc::Receiver<Command>, ready: mpsc::Sender<Result<()>>) {
    let opened = target.connect().and_then(|mut conn| {
        run_migrations(&mut conn).context("failed to run database migrations")?;
        Ok(conn)
    });

    let mut conn = match opened {
        Ok(conn) => {
            if ready.send(Ok(())).is_err() {
                return;
            }
            conn
        }
        Err(err) => {
            let _ = ready.send(Err(err));
            return;
        }
    };

    for command in commands {
        match command {
            Command::Run(job) => job(&mut conn),
            Command::Stop => break,
        }
    }

    log_info!("Store worker stopped");
}

struct Worker {
    sender: mpsc::Sender<Command>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for Worker {
    fn drop(&mut self) {
        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle {
            if let Err(err) = self.sender.send(Command::Stop) {
                log_error!("Store worker already gone at shutdown: {err}");
            }
            if handle.join().is_err() {
                log_error!("Store worker panicked");
            }
        }
    }
}

#[derive(Clone)]
pub struct Database {
    worker: Arc<Worker>,
    path: Arc<PathBuf>,
}

impl Database {
    /// Opens (creating if needed) the database file and brings its schema up to date.
    pub fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }
        Self::start(Target::File(path.clone()), path)
    }

    /// Private database that disappears with the last clone.
    pub fn open_in_memory() -> Result<Self> {
        Self::start(Target::Memory, PathBuf::from(":memory:"))
    }

    fn start(target: Target, path: PathBuf) -> Result<Self> {
        let (sender, commands) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("cognilab-db".into())
            .spawn(move || worker_main(target, commands, ready_tx))
            .context("failed to spawn store worker thread")?;

        ready_rx
            .recv()
            .context("store worker exited before it was ready")??;

        log_info!("Store ready at {}", path.display());

        Ok(Self {
            worker: Arc::new(Worker {
                sender,
                handle: Mutex::new(Some(handle)),
            }),
            path: Arc::new(path),
        })
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Runs `task` on the worker and waits for its result.
    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        let job: Job = Box::new(move |conn| {
            // The caller may have been cancelled; nothing to do then.
            let _ = reply_tx.send(task(conn));
        });

        self.worker
            .sender
            .send(Command::Run(job))
            .map_err(|_| anyhow!("store worker is not running"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("store worker stopped before replying"))?
    }
}
