use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

// Shared lets testbench components share bookkeeping (scoreboard statistics, trace
// buffers, the kernel state) between tasks. Tasks must be Send, so this is Arc<Mutex>
// even though the executor only ever runs on one thread.
pub struct Shared<T>(Arc<Mutex<T>>);

impl<T> Shared<T> {
    pub fn new(data: T) -> Shared<T> {
        Shared(Arc::new(Mutex::new(data)))
    }

    /// Locks the value. A panic inside an earlier lock does not poison the data for
    /// the remaining tasks, it only ends the panicking one.
    pub fn get(&self) -> MutexGuard<'_, T> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.get())
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Shared(self.0.clone())
    }
}

impl<T: Default> Default for Shared<T> {
    fn default() -> Self {
        Shared::new(T::default())
    }
}
