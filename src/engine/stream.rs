use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle, ThreadId};

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Returned when the worker behind a stream has died, which only happens if
/// a launched task panicked. Fatal: the run cannot continue.
#[derive(Debug)]
pub struct StreamClosed;

/// An in-order task queue backed by one worker thread.
///
/// This is the partition's execution resource: kernels and outgoing copies
/// are `launch`ed onto it and run strictly in enqueue order, while the host
/// continues. `synchronize` blocks the host until everything enqueued so far
/// has completed, which is the only way the host observes results.
pub struct Stream {
    tx: Option<Sender<Task>>,
    worker: Option<JoinHandle<()>>,
    worker_id: ThreadId,
}

impl Stream {
    pub fn new(label: &str) -> Self {
        let (tx, rx) = mpsc::channel::<Task>();
        let worker = thread::Builder::new()
            .name(label.to_string())
            .spawn(move || {
                for task in rx {
                    task();
                }
            })
            .expect("spawn stream worker");
        let worker_id = worker.thread().id();
        Stream {
            tx: Some(tx),
            worker: Some(worker),
            worker_id,
        }
    }

    pub fn launch(
        &self,
        task: impl FnOnce() + Send + 'static,
    ) -> std::result::Result<(), StreamClosed> {
        self.tx
            .as_ref()
            .expect("stream already shut down")
            .send(Box::new(task))
            .map_err(|_| StreamClosed)
    }

    pub fn synchronize(&self) -> std::result::Result<(), StreamClosed> {
        let (done_tx, done_rx) = mpsc::channel::<()>();
        self.launch(move || {
            let _ = done_tx.send(());
        })?;
        done_rx.recv().map_err(|_| StreamClosed)
    }
}

impl Drop for Stream {
    fn drop(&mut self) {
        drop(self.tx.take());
        if let Some(worker) = self.worker.take() {
            // Joining from the worker itself cannot happen in normal
            // operation; the guard keeps Drop deadlock-free regardless.
            if thread::current().id() != self.worker_id {
                let _ = worker.join();
            }
        }
    }
}
