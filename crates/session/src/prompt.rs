//! Operator prompt for reader selection

use std::io::{self, BufRead};
use std::thread;

use tagrelay_pcsc::ReaderDevice;
use tokio::sync::oneshot;

use crate::error::SelectionError;

/// Presents the reader list and collects the operator's answer
pub trait OperatorPrompt: Send + Sync + 'static {
    /// Show the numbered reader list
    fn present(&self, devices: &[ReaderDevice]);

    /// Start reading one line of input
    ///
    /// Reading must not block the caller. The returned receiver resolves once
    /// a line is available; the read may be abandoned by dropping it.
    fn read_line(&self) -> oneshot::Receiver<io::Result<String>>;
}

/// Prompt on the process terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinPrompt;

impl OperatorPrompt for StdinPrompt {
    fn present(&self, devices: &[ReaderDevice]) {
        println!("\nSelect a reader by entering the number next to it on the list:\n");
        for (i, device) in devices.iter().enumerate() {
            println!("[{}] {}", i + 1, device);
        }
    }

    fn read_line(&self) -> oneshot::Receiver<io::Result<String>> {
        let (tx, rx) = oneshot::channel();

        // Detached: a pending stdin read cannot be interrupted, so the thread
        // is left behind when the selector is cancelled.
        thread::spawn(move || {
            let mut line = String::new();
            let result = match io::stdin().lock().read_line(&mut line) {
                Ok(0) => Err(io::Error::from(io::ErrorKind::UnexpectedEof)),
                Ok(_) => Ok(line),
                Err(e) => Err(e),
            };
            // Receiver gone means the selection was cancelled
            let _ = tx.send(result);
        });

        rx
    }
}

/// Parse a 1-based reader number into an index into a list of `count` readers
pub fn parse_selection(input: &str, count: usize) -> Result<usize, SelectionError> {
    let trimmed = input.trim();
    let index: usize = trimmed
        .parse()
        .map_err(|_| SelectionError::NotANumber(trimmed.to_string()))?;

    if index < 1 || index > count {
        return Err(SelectionError::OutOfRange { index, count });
    }
    Ok(index - 1)
}
