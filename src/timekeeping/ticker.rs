use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use actix_web::rt::{self, task::JoinHandle};

/// A periodic job bound to the lifetime of its handle.
///
/// Cancellation happens once, when the handle is dropped or passed to
/// [`PeriodicTask::cancel`]. A tick only runs its body while holding the
/// cancellation lock, so once cancel returns the body never runs again, even
/// if the timer task is mid-poll on another worker.
pub struct PeriodicTask {
    cancelled: Arc<Mutex<bool>>,
    handle: JoinHandle<()>,
}

impl PeriodicTask {
    /// Spawns `tick` every `period` on the current actix runtime.
    /// The first call happens one period after spawning.
    pub fn spawn<F>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() + 'static,
    {
        let cancelled = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&cancelled);

        let handle = rt::spawn(async move {
            let mut interval = rt::time::interval(period);
            // first tick of a tokio interval completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;

                let stopped = flag.lock().unwrap_or_else(PoisonError::into_inner);
                if *stopped {
                    break;
                }
                tick();
            }
        });

        Self { cancelled, handle }
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        *self.cancelled.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[actix_web::test]
    async fn ticks_until_cancelled() {
        let ticks = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&ticks);

        let task = PeriodicTask::spawn(Duration::from_millis(10), move || {
            counter.set(counter.get() + 1);
        });

        rt::time::sleep(Duration::from_millis(65)).await;
        task.cancel();
        let at_cancel = ticks.get();
        assert!(at_cancel > 0);

        rt::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(ticks.get(), at_cancel);
    }

    #[actix_web::test]
    async fn dropping_the_handle_cancels() {
        let ticks = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&ticks);

        {
            let _task = PeriodicTask::spawn(Duration::from_millis(5), move || {
                counter.set(counter.get() + 1);
            });
        }

        rt::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(ticks.get(), 0);
    }
}
