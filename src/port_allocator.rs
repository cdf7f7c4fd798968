use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, warn};

use crate::fields;

/// Pool of UDP ports handed to client sessions. Ports come back to the tail
/// of the queue, so a just-closed port is the last one to be reused.
#[derive(Debug, Clone)]
pub struct PortAllocator {
    free_tx: Sender<u16>,
    free_rx: Receiver<u16>,
    start: u16,
    count: usize,
}

impl PortAllocator {
    /// Seeds the pool with `[start, start + count)`, clamped to the valid
    /// port range.
    pub fn new(start: u16, count: usize) -> Self {
        let (free_tx, free_rx) = crossbeam_channel::unbounded();
        let end = (start as usize + count).min(u16::MAX as usize + 1);
        for port in start as usize..end {
            // the receiver is alive, so this cannot fail
            let _ = free_tx.send(port as u16);
        }
        debug!(
            { fields::PORT } = start,
            { fields::QUEUE_SIZE } = end - start as usize,
            "Port pool seeded"
        );
        Self {
            free_tx,
            free_rx,
            start,
            count: end - start as usize,
        }
    }

    pub fn allocate(&self) -> Option<u16> {
        let port = self.free_rx.try_recv().ok();
        if port.is_none() {
            warn!("Port pool exhausted");
        }
        port
    }

    pub fn release(&self, port: u16) {
        if !self.owns(port) {
            warn!({ fields::PORT } = port, "Release of port outside pool ignored");
            return;
        }
        let _ = self.free_tx.send(port);
    }

    pub fn available_count(&self) -> usize {
        self.free_rx.len()
    }

    pub fn capacity(&self) -> usize {
        self.count
    }

    fn owns(&self, port: u16) -> bool {
        port >= self.start && ((port - self.start) as usize) < self.count
    }
}
