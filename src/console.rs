//! Terminal input shared by task controls and user prompts.
//!
//! A single reader owns stdin. A line goes to the prompt waiting for it, if
//! any; otherwise it is treated as a control command for the running task.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

#[derive(Clone)]
pub(crate) struct Console {
    pending: Arc<Mutex<Option<oneshot::Sender<String>>>>,
    closed: Arc<AtomicBool>,
    /// One prompt at a time.
    prompt: Arc<tokio::sync::Mutex<()>>,
}

impl Console {
    /// Start reading the process's stdin.
    pub fn stdin() -> (Self, mpsc::UnboundedReceiver<String>) {
        Self::spawn(BufReader::new(tokio::io::stdin()))
    }

    pub fn spawn<R>(reader: R) -> (Self, mpsc::UnboundedReceiver<String>)
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let console = Self {
            pending: Arc::new(Mutex::new(None)),
            closed: Arc::new(AtomicBool::new(false)),
            prompt: Arc::new(tokio::sync::Mutex::new(())),
        };

        let pending = console.pending.clone();
        let closed = console.closed.clone();
        tokio::spawn(async move {
            let mut lines = reader.lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let waiting = pending.lock().take();
                match waiting {
                    Some(prompt) => {
                        let _ = prompt.send(line);
                    }
                    None => {
                        if commands_tx.send(line).is_err() {
                            break;
                        }
                    }
                }
            }
            debug!("stdin closed");
            closed.store(true, Ordering::SeqCst);
            pending.lock().take();
        });

        (console, commands_rx)
    }

    /// Wait for the next line typed by the user. `None` once stdin is closed.
    pub async fn read_line(&self) -> Option<String> {
        let _turn = self.prompt.lock().await;
        let (tx, rx) = oneshot::channel();
        *self.pending.lock() = Some(tx);
        if self.closed.load(Ordering::SeqCst) {
            self.pending.lock().take();
            return None;
        }
        rx.await.ok()
    }
}
