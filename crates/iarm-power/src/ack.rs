//! Delayed acknowledgement of pre-change notifications.
//!
//! A delayed acknowledgement is a one-shot deadline owned by the event loop.
//! It fires when the loop reaches its due time and can be cancelled before
//! then; nothing runs behind the loop's back.

use std::time::{Duration, Instant};

/// Lead time subtracted from a requested delay so the acknowledgement lands
/// before the power manager's own timeout.
pub const ACK_LEAD: Duration = Duration::from_millis(50);

/// An acknowledgement waiting for its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayedAck {
    /// Client to acknowledge for.
    pub client_id: u32,
    /// Transaction being acknowledged.
    pub transaction_id: i32,
    due: Instant,
}

impl DelayedAck {
    /// Schedules an acknowledgement `delay` minus [`ACK_LEAD`] after `now`.
    #[must_use]
    pub fn schedule(client_id: u32, transaction_id: i32, delay: Duration, now: Instant) -> Self {
        Self {
            client_id,
            transaction_id,
            due: now + delay.saturating_sub(ACK_LEAD),
        }
    }

    /// Deadline of the acknowledgement.
    #[must_use]
    pub const fn due(&self) -> Instant {
        self.due
    }

    /// Time left before the deadline, zero once it has passed.
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Duration {
        self.due.saturating_duration_since(now)
    }
}

/// Holds at most one pending acknowledgement.
#[derive(Debug, Default)]
pub struct AckSlot {
    pending: Option<DelayedAck>,
}

impl AckSlot {
    /// Stores `ack`, returning the acknowledgement it cancels, if any.
    pub const fn schedule(&mut self, ack: DelayedAck) -> Option<DelayedAck> {
        self.pending.replace(ack)
    }

    /// Cancels the pending acknowledgement.
    pub const fn cancel(&mut self) -> Option<DelayedAck> {
        self.pending.take()
    }

    /// Reports whether an acknowledgement is pending.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Deadline of the pending acknowledgement.
    #[must_use]
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.map(|ack| ack.due())
    }

    /// Removes and returns the acknowledgement if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<DelayedAck> {
        if self.pending.is_some_and(|ack| ack.due() <= now) {
            self.pending.take()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_subtracts_the_lead() {
        let now = Instant::now();
        let ack = DelayedAck::schedule(1, 2, Duration::from_secs(2), now);
        assert_eq!(ack.due(), now + Duration::from_millis(1950));
        assert_eq!(ack.remaining(now), Duration::from_millis(1950));
    }

    #[test]
    fn short_delays_are_due_immediately() {
        let now = Instant::now();
        let ack = DelayedAck::schedule(1, 2, Duration::from_millis(10), now);
        assert_eq!(ack.remaining(now), Duration::ZERO);
    }

    #[test]
    fn slot_fires_only_after_the_deadline() {
        let now = Instant::now();
        let mut slot = AckSlot::default();
        slot.schedule(DelayedAck::schedule(1, 9, Duration::from_secs(1), now));

        assert_eq!(slot.take_due(now), None);
        assert!(slot.is_pending());

        let fired = slot.take_due(now + Duration::from_secs(1));
        assert_eq!(fired.map(|ack| ack.transaction_id), Some(9));
        assert!(!slot.is_pending());
    }

    #[test]
    fn rescheduling_cancels_the_previous_ack() {
        let now = Instant::now();
        let mut slot = AckSlot::default();
        slot.schedule(DelayedAck::schedule(1, 1, Duration::from_secs(1), now));
        let cancelled = slot.schedule(DelayedAck::schedule(1, 2, Duration::from_secs(1), now));

        assert_eq!(cancelled.map(|ack| ack.transaction_id), Some(1));
        assert_eq!(slot.cancel().map(|ack| ack.transaction_id), Some(2));
        assert_eq!(slot.next_due(), None);
    }
}
