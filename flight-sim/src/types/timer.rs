use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, RecvTimeoutError, Sender},
        Arc, Mutex,
    },
    thread::{self, JoinHandle, ThreadId},
    time::{Duration, Instant},
};

use super::sim_error::SimError;

struct TimerThread {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// A repeating timer with support for starting, pausing, resuming and stopping.
///
/// The callback runs on a dedicated thread once per interval. `stop` wakes the
/// thread right away and waits for it, so once it returns no further tick runs.
pub struct Timer {
    running: AtomicBool,
    paused: Arc<AtomicBool>,
    thread: Mutex<Option<TimerThread>>,
}

impl Timer {
    /// Creates a stopped timer
    pub fn new() -> Self {
        Timer {
            running: AtomicBool::new(false),
            paused: Arc::new(AtomicBool::new(false)),
            thread: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Pauses the timer indefinitely; ticks are skipped until `resume`.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    /// Resumes the timer
    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    /// Starts the timer and executes the callback on each tick with the tick count.
    ///
    /// Fails with [`SimError::DoubleStart`] if already running.
    pub fn start(
        &self,
        interval: Duration,
        mut tick_callback: impl FnMut(usize) + Send + 'static,
    ) -> Result<(), SimError> {
        if interval.is_zero() {
            return Err(SimError::InvalidDuration("0ms".to_string()));
        }

        let mut thread_slot = self
            .thread
            .lock()
            .map_err(|_| SimError::Lock("Failed to lock timer thread.".to_string()))?;
        if thread_slot.is_some() {
            return Err(SimError::DoubleStart);
        }

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let paused = Arc::clone(&self.paused);
        self.running.store(true, Ordering::SeqCst);

        let handle = thread::Builder::new()
            .name("timer-thread".to_string())
            .spawn(move || {
                let mut tick_count = 0;
                let mut deadline = Instant::now() + interval;
                loop {
                    let wait = deadline.saturating_duration_since(Instant::now());
                    match stop_rx.recv_timeout(wait) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                    deadline += interval;

                    if paused.load(Ordering::SeqCst) {
                        continue;
                    }

                    tick_count += 1;
                    tick_callback(tick_count);

                    // A tick longer than the interval does not queue a burst of catch-up ticks.
                    let now = Instant::now();
                    if deadline < now {
                        deadline = now;
                    }
                }
            })
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                SimError::TimerStart(format!("Failed to start the timer thread: {}", e))
            })?;

        *thread_slot = Some(TimerThread { stop_tx, handle });
        Ok(())
    }

    /// Stops the timer. Returns `false` if it was not running.
    pub fn stop(&self) -> bool {
        let timer_thread = match self.thread.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        let Some(TimerThread { stop_tx, handle }) = timer_thread else {
            return false;
        };

        let _ = stop_tx.send(());
        if handle.thread().id() != current_thread_id() {
            let _ = handle.join();
        }
        self.running.store(false, Ordering::SeqCst);
        true
    }
}

impl Default for Timer {
    fn default() -> Self {
        Timer::new()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn current_thread_id() -> ThreadId {
    thread::current().id()
}
