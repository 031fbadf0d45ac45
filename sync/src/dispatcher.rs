use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

/// A unit of work submitted to a [`Dispatcher`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Enqueues work so that tasks submitted by the same owner run in submission
/// order and never concurrently, while tasks from distinct owners may run in
/// parallel.
pub trait OrderedDispatch {
    /// Enqueues `task` on `owner`'s FIFO.
    fn ordered(&self, owner: u64, task: Job);
}

struct OwnerQueue {
    jobs: VecDeque<Job>,
    running: bool,
}

struct State {
    owners: HashMap<u64, OwnerQueue>,
    ready: VecDeque<u64>,
    shutdown: bool,
    abort: bool,
}

struct Shared {
    state: Mutex<State>,
    condvar: Condvar,
}

/// A thread pool that serializes work per logical owner while running work
/// from distinct owners in parallel.
///
/// Grounded on libbitcoin's `threadpool`: a fixed set of worker threads drain
/// a shared work queue, and termination comes in two modes, `shutdown`
/// (drain queued work, then join) and `abort` (abandon queued work
/// immediately). Unlike the C++ original, workers are plain OS threads over a
/// condition variable rather than an `asio::io_context`, since this crate has
/// no other use for an async reactor.
pub struct Dispatcher {
    shared: Arc<Shared>,
    threads: Mutex<Vec<JoinHandle<()>>>,
}

impl Dispatcher {
    /// Spawns `worker_count` worker threads.
    pub fn new(worker_count: usize) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                owners: HashMap::new(),
                ready: VecDeque::new(),
                shutdown: false,
                abort: false,
            }),
            condvar: Condvar::new(),
        });

        let mut threads = Vec::with_capacity(worker_count);
        for _ in 0..worker_count.max(1) {
            threads.push(Self::spawn_once(shared.clone()));
        }

        Dispatcher {
            shared,
            threads: Mutex::new(threads),
        }
    }

    fn spawn_once(shared: Arc<Shared>) -> JoinHandle<()> {
        thread::spawn(move || loop {
            let (owner, job) = {
                let mut state = shared.state.lock().unwrap();
                loop {
                    if state.abort {
                        return;
                    }
                    if let Some(owner) = state.ready.pop_front() {
                        let job = state
                            .owners
                            .get_mut(&owner)
                            .and_then(|queue| queue.jobs.pop_front())
                            .expect("an owner is only queued as ready while it has work");
                        break (owner, job);
                    }
                    if state.shutdown {
                        return;
                    }
                    state = shared.condvar.wait(state).unwrap();
                }
            };

            job();

            let mut state = shared.state.lock().unwrap();
            let more_work = state
                .owners
                .get(&owner)
                .map(|queue| !queue.jobs.is_empty())
                .unwrap_or(false);
            if more_work {
                state.ready.push_back(owner);
            } else if let Some(queue) = state.owners.get_mut(&owner) {
                queue.running = false;
            }
            shared.condvar.notify_all();
        })
    }

    /// Stops accepting new work, drains queued work, and joins all threads.
    pub fn shutdown(&self) {
        {
            let mut state = self.shared.state.lock().unwrap();
            state.shutdown = true;
        }
        self.shared.condvar.notify_all();
        self.join();
    }

    /// Stops immediately, abandoning queued work, and joins all threads.
    pub fn abort(&self) {
        {
            let mut state = self.shared.state.lock().unwrap();
            state.abort = true;
        }
        self.shared.condvar.notify_all();
        self.join();
    }

    fn join(&self) {
        let mut threads = self.threads.lock().unwrap();
        for handle in threads.drain(..) {
            let _ = handle.join();
        }
    }
}

impl OrderedDispatch for Dispatcher {
    fn ordered(&self, owner: u64, task: Job) {
        let mut state = self.shared.state.lock().unwrap();
        if state.shutdown || state.abort {
            return;
        }
        let queue = state.owners.entry(owner).or_insert_with(|| OwnerQueue {
            jobs: VecDeque::new(),
            running: false,
        });
        queue.jobs.push_back(task);
        if !queue.running {
            queue.running = true;
            state.ready.push_back(owner);
            self.shared.condvar.notify_one();
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn same_owner_runs_in_order_never_concurrently() {
        let dispatcher = Dispatcher::new(4);
        let order = Arc::new(Mutex::new(Vec::new()));
        let concurrent = Arc::new(AtomicUsize::new(0));
        let max_concurrent = Arc::new(AtomicUsize::new(0));

        for i in 0..20 {
            let order = order.clone();
            let concurrent = concurrent.clone();
            let max_concurrent = max_concurrent.clone();
            dispatcher.ordered(
                1,
                Box::new(move || {
                    let now = concurrent.fetch_add(1, Ordering::SeqCst) + 1;
                    max_concurrent.fetch_max(now, Ordering::SeqCst);
                    order.lock().unwrap().push(i);
                    concurrent.fetch_sub(1, Ordering::SeqCst);
                }),
            );
        }

        dispatcher.shutdown();
        assert_eq!(*order.lock().unwrap(), (0..20).collect::<Vec<_>>());
        assert_eq!(max_concurrent.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn distinct_owners_can_run_in_parallel() {
        let dispatcher = Dispatcher::new(4);
        let concurrent = Arc::new(AtomicUsize::new(0));
        let max_concurrent = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(std::sync::Barrier::new(4));

        for owner in 0..4u64 {
            let concurrent = concurrent.clone();
            let max_concurrent = max_concurrent.clone();
            let barrier = barrier.clone();
            dispatcher.ordered(
                owner,
                Box::new(move || {
                    let now = concurrent.fetch_add(1, Ordering::SeqCst) + 1;
                    max_concurrent.fetch_max(now, Ordering::SeqCst);
                    barrier.wait();
                    concurrent.fetch_sub(1, Ordering::SeqCst);
                }),
            );
        }

        dispatcher.shutdown();
        assert_eq!(max_concurrent.load(Ordering::SeqCst), 4);
    }
}
