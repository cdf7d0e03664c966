// Test doubles shared by the unit tests

use crate::error::transport::TransportError;
use crate::transport::Transport;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;

/// Transport that records every write instead of talking to a process.
///
/// Clones share state, so a test can keep one clone while the coordinator
/// owns another.
#[derive(Clone)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
    running: Arc<AtomicBool>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn stopped() -> Self {
        let transport = Self::new();
        transport.running.store(false, Ordering::SeqCst);
        transport
    }

    /// Every write so far, parsed as JSON.
    pub fn sent(&self) -> Vec<Value> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|bytes| serde_json::from_slice(bytes).expect("sent bytes should be JSON"))
            .collect()
    }

    pub fn sent_raw(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, bytes: Vec<u8>) -> Result<(), TransportError> {
        if !self.running.load(Ordering::SeqCst) {
            return Err(TransportError::not_running());
        }
        self.sent.lock().unwrap().push(bytes);
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}
