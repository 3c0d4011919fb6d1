use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use signal_hook::{
    consts::{SIGINT, SIGTERM},
    iterator::{Handle, Signals},
};

use crate::error::Result;

/// Records SIGINT/SIGTERM while a plan runs instead of letting them kill the process.
///
/// The terminal still delivers Ctrl-C to the child processes, so the running step fails
/// on its own and the executor gets to run undo steps.
pub struct SignalWatcher {
    interrupted: Arc<AtomicBool>,
    handle: Handle,
    thread: Option<JoinHandle<()>>,
}

impl SignalWatcher {
    pub fn install() -> Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM])?;
        let handle = signals.handle();
        let interrupted = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&interrupted);
        let thread = thread::spawn(move || {
            for signal in signals.forever() {
                tracing::warn!(signal, "interrupt received; waiting for the running step to stop");
                flag.store(true, Ordering::SeqCst);
            }
        });
        Ok(SignalWatcher {
            interrupted,
            handle,
            thread: Some(thread),
        })
    }

    pub fn interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }
}

impl Drop for SignalWatcher {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
