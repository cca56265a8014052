//! Mapping of a session priority onto an interface queue.

/// Chooses the interface queue that carries traffic of a given priority.
///
/// The same queue is used on every link of a computed path.
pub trait QueueSelector: Send + Sync {
    /// Queue number in `[0, queues_per_interface)` for `priority`.
    fn queue_for(&self, priority: u8, queues_per_interface: u8) -> u8;
}

/// Precedence-based selector.
///
/// The top three bits of the priority byte are the IP precedence; higher
/// precedence maps to lower-numbered queues, clamped to the configured
/// number of queues.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrecedenceQueueSelector;

impl QueueSelector for PrecedenceQueueSelector {
    fn queue_for(&self, priority: u8, queues_per_interface: u8) -> u8 {
        let precedence = priority >> 5;
        let last = queues_per_interface.max(1) - 1;
        (7 - precedence).min(last)
    }
}

/// Selector that always returns the same queue, clamped to the configured range.
#[derive(Debug, Clone, Copy)]
pub struct FixedQueueSelector(pub u8);

impl QueueSelector for FixedQueueSelector {
    fn queue_for(&self, _priority: u8, queues_per_interface: u8) -> u8 {
        self.0.min(queues_per_interface.max(1) - 1)
    }
}
