use futures::future::{try_join_all, BoxFuture, FutureExt};
use futures::task::{waker_ref, ArcWake, Context, Poll};
use futures_channel::oneshot;
use queues::{IsQueue, Queue};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::error::{HarnessError, HarnessResult};
use crate::shared::Shared;

type ReadyQueue = Shared<Queue<Arc<Task>>>;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn schedule_task(ready: &ReadyQueue, task: Arc<Task>) {
    ready.with_mut(|q| {
        // Queue::add is infallible, the Result is part of the IsQueue trait only
        let _ = q.add(task);
    });
}

/// Single-threaded executor owned by one simulation. Tasks are polled in wake order
/// until the ready queue is empty, then control goes back to the time base.
#[derive(Clone)]
pub(crate) struct Executor {
    ready: ReadyQueue,
    tasks: Shared<Vec<Weak<Task>>>,
    fault: Shared<Option<HarnessError>>,
}

impl Executor {
    pub(crate) fn new() -> Self {
        Self {
            ready: Shared::new(Queue::new()),
            tasks: Shared::new(Vec::new()),
            fault: Shared::new(None),
        }
    }

    pub(crate) fn spawn(
        &self,
        future: impl Future<Output = HarnessResult<()>> + Send + 'static,
        name: &str,
    ) -> JoinHandle {
        let (task, join_handle) = Task::new(future.boxed(), name, self.ready.clone());
        self.tasks.with_mut(|tasks| {
            tasks.retain(|t| t.strong_count() > 0);
            tasks.push(Arc::downgrade(&task));
        });
        schedule_task(&self.ready, task);
        join_handle
    }

    #[inline]
    pub(crate) fn run_once(&self) {
        while let Some(task) = self.next_task() {
            self.process_task(task);
        }
    }

    #[cfg(test)]
    pub(crate) fn is_idle(&self) -> bool {
        self.ready.with_mut(|q| q.size() == 0)
    }

    /// First task failure since the last call, if any.
    pub(crate) fn take_fault(&self) -> Option<HarnessError> {
        self.fault.with_mut(Option::take)
    }

    pub(crate) fn cancel_all(&self) {
        let tasks = self.tasks.with_mut(std::mem::take);
        for task in tasks.iter().filter_map(Weak::upgrade) {
            task.cancel();
        }
        self.ready.with_mut(|q| *q = Queue::new());
    }

    fn next_task(&self) -> Option<Arc<Task>> {
        self.ready.with_mut(|q| q.remove().ok())
    }

    #[inline]
    fn process_task(&self, task: Arc<Task>) {
        // Cancelled and finished tasks can still be woken by stale wakers. Skip them.
        if !task.is_pending() {
            return;
        }

        let mut fut_slot = lock(&task.future);
        let Some(mut fut) = fut_slot.take() else {
            return;
        };
        let waker = waker_ref(&task);
        let context = &mut Context::from_waker(&waker);
        match fut.as_mut().poll(context) {
            Poll::Pending => {
                // the task may have cancelled itself while running
                if task.is_pending() {
                    *fut_slot = Some(fut);
                }
            }
            Poll::Ready(result) => {
                drop(fut_slot);
                *lock(&task.state) = TaskState::Done;
                if let Err(e) = &result {
                    log::error!("task `{}` failed: {}", task.name, e);
                    self.fault.with_mut(|fault| {
                        if fault.is_none() {
                            *fault = Some(HarnessError::TaskFailed {
                                task: task.name.clone(),
                                source: Box::new(e.clone()),
                            });
                        }
                    });
                }
                if let Some(tx) = lock(&task.join_tx).take() {
                    let _ = tx.send(result);
                }
            }
        }
    }
}

#[derive(PartialEq, Clone, Copy, Debug)]
enum TaskState {
    Pending,
    Done,
    Cancelled,
}

pub struct Task {
    future: Mutex<Option<BoxFuture<'static, HarnessResult<()>>>>,
    state: Mutex<TaskState>,
    name: String,
    join_tx: Mutex<Option<oneshot::Sender<HarnessResult<()>>>>,
    ready: ReadyQueue,
}

impl Task {
    fn new(
        fut: BoxFuture<'static, HarnessResult<()>>,
        name: &str,
        ready: ReadyQueue,
    ) -> (Arc<Self>, JoinHandle) {
        let (tx, rx) = oneshot::channel();
        let task = Arc::new(Self {
            future: Mutex::new(Some(fut)),
            state: Mutex::new(TaskState::Pending),
            name: name.to_string(),
            join_tx: Mutex::new(Some(tx)),
            ready,
        });
        let join_handle = JoinHandle {
            task: task.clone(),
            join_rx: rx,
        };
        (task, join_handle)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn is_pending(&self) -> bool {
        *lock(&self.state) == TaskState::Pending
    }

    /// Stops the task. Its future is dropped right away unless the task is the one
    /// currently running, in which case the executor drops it after the poll returns.
    pub fn cancel(&self) {
        {
            let mut state = lock(&self.state);
            if *state != TaskState::Pending {
                return;
            }
            *state = TaskState::Cancelled;
        }
        let fut = match self.future.try_lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        drop(fut);
        lock(&self.join_tx).take();
    }
}

impl ArcWake for Task {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        if arc_self.is_pending() {
            schedule_task(&arc_self.ready, arc_self.clone());
        }
    }
}

pub struct JoinHandle {
    task: Arc<Task>,
    join_rx: oneshot::Receiver<HarnessResult<()>>,
}

impl JoinHandle {
    pub fn name(&self) -> &str {
        self.task.name()
    }

    pub fn is_finished(&self) -> bool {
        !self.task.is_pending()
    }

    pub fn cancel(&self) {
        self.task.cancel();
    }
}

impl Future for JoinHandle {
    type Output = HarnessResult<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.join_rx.poll_unpin(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(HarnessError::Cancelled(self.task.name.clone()))),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// A set of tasks started together and stopped together. Joining waits for every
/// member; the first failure cancels the rest.
pub struct TaskGroup {
    executor: Executor,
    handles: Vec<JoinHandle>,
}

impl TaskGroup {
    pub(crate) fn new(executor: Executor) -> Self {
        Self {
            executor,
            handles: Vec::new(),
        }
    }

    pub fn spawn(
        &mut self,
        name: &str,
        future: impl Future<Output = HarnessResult<()>> + Send + 'static,
    ) {
        let handle = self.executor.spawn(future, name);
        self.handles.push(handle);
    }

    pub fn names(&self) -> Vec<&str> {
        self.handles.iter().map(JoinHandle::name).collect()
    }

    pub fn is_finished(&self) -> bool {
        self.handles.iter().all(JoinHandle::is_finished)
    }

    pub fn cancel(&self) {
        for handle in &self.handles {
            handle.cancel();
        }
    }

    pub async fn join(self) -> HarnessResult<()> {
        let tasks: Vec<Arc<Task>> = self.handles.iter().map(|h| h.task.clone()).collect();
        let result = try_join_all(self.handles).await;
        if result.is_err() {
            for task in &tasks {
                task.cancel();
            }
        }
        result.map(|_| ())
    }
}
