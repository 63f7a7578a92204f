//! Asynchronous I/O service.
//!
//! A growable pool of worker threads drains a shared job queue; each worker
//! drives one job at a time to completion on its own current-thread tokio
//! runtime. Callers submit a future through [`IoService::run`] and block on a
//! oneshot until some worker fulfills it, which is what gives the client its
//! synchronous-looking contract over the async engine.
//!
//! Teardown is stop-then-join: closing the queue makes every worker drain the
//! remaining jobs, observe the disconnect and exit its loop; only then are the
//! threads joined. Shutdown is idempotent and also runs on drop, so a thread
//! is never joined while its loop can still receive work.

use crate::error::DfsError;
use futures::future::BoxFuture;
use log::debug;
use std::future::Future;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

type Job = BoxFuture<'static, ()>;

pub struct IoService {
    tx: Mutex<Option<mpsc::Sender<Job>>>,
    queue: Arc<Mutex<mpsc::Receiver<Job>>>,
    workers: Mutex<Vec<thread::JoinHandle<()>>>,
}

impl IoService {
    /// New service with zero workers; idle until threads are added.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx: Mutex::new(Some(tx)),
            queue: Arc::new(Mutex::new(rx)),
            workers: Mutex::new(Vec::new()),
        }
    }

    /// Spawn one more worker thread; returns the new pool size.
    ///
    /// Runtime construction and thread spawn failures are returned to the
    /// caller, never swallowed.
    pub fn add_worker_thread(&self) -> Result<usize, DfsError> {
        if self.tx.lock().unwrap().is_none() {
            return Err(DfsError::ServiceStopped);
        }
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let queue = Arc::clone(&self.queue);
        let mut workers = self.workers.lock().unwrap();
        let name = format!("dfs-io-{}", workers.len());
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || worker_loop(rt, queue))?;
        workers.push(handle);
        debug!("spawned io worker {name}, pool size {}", workers.len());
        Ok(workers.len())
    }

    /// Number of live worker threads.
    pub fn thread_count(&self) -> usize {
        self.workers.lock().unwrap().len()
    }

    /// Queue `fut` and block the calling thread until a worker completes it.
    pub fn run<T, F>(&self, fut: F) -> Result<T, DfsError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (done_tx, done_rx) = tokio::sync::oneshot::channel();
        let job: Job = Box::pin(async move {
            let _ = done_tx.send(fut.await);
        });
        {
            // Send under the sender lock and never clone the sender: a job
            // queued here is visible before shutdown can close the queue, so
            // workers always drain it before exiting.
            let guard = self.tx.lock().unwrap();
            let tx = guard.as_ref().ok_or(DfsError::ServiceStopped)?;
            if self.thread_count() == 0 {
                // nobody will ever drain the queue
                return Err(DfsError::NoWorkers);
            }
            tx.send(job).map_err(|_| DfsError::ServiceStopped)?;
        }
        done_rx.blocking_recv().map_err(|_| DfsError::ServiceStopped)
    }

    /// Close the queue, let workers drain it, then join them all.
    pub fn shutdown(&self) {
        let closed = self.tx.lock().unwrap().take();
        if closed.is_none() {
            return; // already stopped
        }
        drop(closed);
        let handles: Vec<_> = self.workers.lock().unwrap().drain(..).collect();
        let n = handles.len();
        for h in handles {
            let _ = h.join();
        }
        debug!("io service stopped, joined {n} worker(s)");
    }
}

impl Default for IoService {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for IoService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(rt: tokio::runtime::Runtime, queue: Arc<Mutex<mpsc::Receiver<Job>>>) {
    loop {
        // Holding the lock across recv() only serializes dequeueing; jobs
        // themselves run after the guard is released.
        let job = match queue.lock() {
            Ok(guard) => guard.recv(),
            Err(_) => break,
        };
        match job {
            Ok(job) => rt.block_on(job),
            Err(_) => break, // sender dropped: service stopped
        }
    }
}
