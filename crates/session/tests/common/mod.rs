//! Common test utilities
#![allow(dead_code, unreachable_pub)]

use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tagrelay_pcsc::ReaderDevice;
use tagrelay_session::{DeliveryError, DeliveryTarget, OperatorPrompt, SessionConfig};
use tokio::sync::oneshot;
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{Layer, Registry};

/// UID response for `04:3A:F1:02`
pub const UID_RESPONSE: [u8; 6] = [0x04, 0x3A, 0xF1, 0x02, 0x90, 0x00];

/// First page of the page read response
pub const PAGE: [u8; 4] = [0x03, 0x0C, 0xD1, 0x01];

/// Four pages of user data followed by `90 00`
pub fn page_response() -> Vec<u8> {
    let mut response = PAGE.to_vec();
    response.extend_from_slice(&[0x55, 0x02, 0x65, 0x78]);
    response.extend_from_slice(&[0x61, 0x6D, 0x70, 0x6C]);
    response.extend_from_slice(&[0x65, 0x2E, 0x63, 0x6F]);
    response.extend_from_slice(&[0x90, 0x00]);
    response
}

/// Session settings with millisecond timings
pub fn fast_config() -> SessionConfig {
    SessionConfig {
        status_timeout: Duration::from_millis(20),
        health_interval: Duration::from_millis(20),
        reboot_delay: Duration::from_millis(20),
        enumeration_backoff: Duration::from_millis(10),
        ..SessionConfig::default()
    }
}

/// Poll `condition` until it holds or two seconds pass
pub async fn eventually<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..400 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}

/// Prompt answering from a script
///
/// Once the script runs out, reads stay pending like an idle operator.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompt {
    inner: Arc<Mutex<PromptInner>>,
}

#[derive(Debug, Default)]
struct PromptInner {
    answers: VecDeque<String>,
    presented: Vec<Vec<ReaderDevice>>,
    pending: Vec<oneshot::Sender<io::Result<String>>>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prompt = Self::default();
        prompt.inner.lock().answers = answers.into_iter().map(Into::into).collect();
        prompt
    }

    /// Reader lists shown so far
    pub fn presented(&self) -> Vec<Vec<ReaderDevice>> {
        self.inner.lock().presented.clone()
    }

    pub fn times_presented(&self) -> usize {
        self.inner.lock().presented.len()
    }
}

impl OperatorPrompt for ScriptedPrompt {
    fn present(&self, devices: &[ReaderDevice]) {
        self.inner.lock().presented.push(devices.to_vec());
    }

    fn read_line(&self) -> oneshot::Receiver<io::Result<String>> {
        let (tx, rx) = oneshot::channel();
        let mut inner = self.inner.lock();
        match inner.answers.pop_front() {
            Some(answer) => {
                let _ = tx.send(Ok(answer));
            }
            None => inner.pending.push(tx),
        }
        rx
    }
}

/// Target recording every payload
#[derive(Debug, Clone, Default)]
pub struct RecordingTarget {
    payloads: Arc<Mutex<Vec<Bytes>>>,
}

impl RecordingTarget {
    pub fn payloads(&self) -> Vec<Bytes> {
        self.payloads.lock().clone()
    }
}

#[async_trait]
impl DeliveryTarget for RecordingTarget {
    async fn dispatch(&self, payload: &[u8]) -> Result<(), DeliveryError> {
        self.payloads.lock().push(Bytes::copy_from_slice(payload));
        Ok(())
    }
}

/// Target whose deliveries never complete
#[derive(Debug, Clone, Default)]
pub struct StalledTarget {
    started: Arc<AtomicUsize>,
}

impl StalledTarget {
    /// Deliveries started so far
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeliveryTarget for StalledTarget {
    async fn dispatch(&self, _payload: &[u8]) -> Result<(), DeliveryError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}

/// Layer keeping the message of every event
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    messages: Arc<Mutex<Vec<String>>>,
}

impl LogCapture {
    /// Capture events on the current thread until the guard is dropped
    pub fn install() -> (Self, DefaultGuard) {
        let capture = Self::default();
        let subscriber = Registry::default().with(capture.clone());
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    /// Number of events whose message contains `needle`
    pub fn count(&self, needle: &str) -> usize {
        self.messages
            .lock()
            .iter()
            .filter(|message| message.contains(needle))
            .count()
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.messages.lock().push(visitor.0);
    }
}

#[derive(Default)]
struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}
