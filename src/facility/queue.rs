//! Priority/patience wait queue
//!
//! A [`WaitQueue`] holds [`Ticket`]s ordered by priority tier (higher first),
//! then enqueue minute, then arrival order. Tickets whose patience deadline has
//! passed are swept out lazily on every access and reported as abandoned. A
//! ticket leaves the queue exactly once, whichever way it leaves.

use parking_lot::Mutex;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::events::{MetricsSink, ParkEvent};
use crate::simulation::{QueueError, SimClock};
use crate::types::VisitorId;

/// What happened to a ticket once it left the queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketOutcome {
    /// The holder completed a ride cycle
    RideFinished {
        /// Ride name
        ride: String,
        /// Minutes between enqueue and boarding
        waited: u64,
    },
    /// The holder received a food order
    FoodServed {
        /// Food stand name
        stand: String,
    },
    /// The ticket expired before it was served
    Abandoned {
        /// Ride or food stand name
        facility: String,
        /// Minutes spent in the queue
        waited: u64,
    },
}

/// A queued request for a ride seat or a food order
#[derive(Debug, Clone)]
pub struct Ticket {
    /// Visitor holding the ticket
    pub holder: VisitorId,
    /// Simulated minute the ticket was created
    pub enqueued_at: u64,
    /// Last minute at which the ticket may still be served
    pub patience_deadline: u64,
    /// Priority tier, higher is served first
    pub tier: u8,
    reply: Option<Sender<TicketOutcome>>,
}

impl Ticket {
    /// Create a tier-0 ticket that expires `patience` minutes after `enqueued_at`
    pub fn new(holder: VisitorId, enqueued_at: u64, patience: u64) -> Self {
        Self {
            holder,
            enqueued_at,
            patience_deadline: enqueued_at.saturating_add(patience),
            tier: 0,
            reply: None,
        }
    }

    /// Set the priority tier
    pub fn with_tier(mut self, tier: u8) -> Self {
        self.tier = tier;
        self
    }

    /// Attach the channel on which the holder waits for the outcome
    pub fn with_reply(mut self, reply: Sender<TicketOutcome>) -> Self {
        self.reply = Some(reply);
        self
    }

    /// Whether the deadline has passed at minute `now`
    pub fn is_expired(&self, now: u64) -> bool {
        now > self.patience_deadline
    }

    /// Minutes between enqueue and `now`
    pub fn waited(&self, now: u64) -> u64 {
        now.saturating_sub(self.enqueued_at)
    }

    /// Tell the holder what happened; a holder that already left is ignored
    pub fn notify(&self, outcome: TicketOutcome) {
        if let Some(reply) = &self.reply {
            let _ = reply.send(outcome);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct QueueKey {
    /// 0 for tickets handed back by a ride, 1 for everything else
    rank: u8,
    tier: Reverse<u8>,
    enqueued_at: u64,
    seq: u64,
}

#[derive(Debug)]
struct QueueState {
    entries: BTreeMap<QueueKey, Ticket>,
    next_seq: u64,
    /// Counts down so later requeues sort ahead of earlier ones
    next_front_seq: u64,
}

impl QueueState {
    fn take_expired(&mut self, now: u64) -> Vec<Ticket> {
        let expired: Vec<QueueKey> = self
            .entries
            .iter()
            .filter(|(_, ticket)| ticket.is_expired(now))
            .map(|(key, _)| *key)
            .collect();
        expired.iter().filter_map(|key| self.entries.remove(key)).collect()
    }
}

/// Thread-safe bounded queue in front of a ride or food stand
pub struct WaitQueue {
    label: String,
    capacity: Option<usize>,
    batch_limit: Option<usize>,
    clock: Arc<SimClock>,
    sink: Option<Arc<dyn MetricsSink>>,
    state: Mutex<QueueState>,
}

impl std::fmt::Debug for WaitQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaitQueue")
            .field("label", &self.label)
            .field("capacity", &self.capacity)
            .field("batch_limit", &self.batch_limit)
            .field("len", &self.len())
            .finish()
    }
}

impl WaitQueue {
    /// Create a queue; `capacity` of `None` means unbounded
    pub fn new(label: impl Into<String>, capacity: Option<usize>, clock: Arc<SimClock>) -> Self {
        Self {
            label: label.into(),
            capacity,
            batch_limit: None,
            clock,
            sink: None,
            state: Mutex::new(QueueState {
                entries: BTreeMap::new(),
                next_seq: 0,
                next_front_seq: u64::MAX,
            }),
        }
    }

    /// Report enqueue, rejection and abandonment events to `sink`
    pub fn with_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Never hand out more than `limit` tickets per dequeue
    pub fn with_batch_limit(mut self, limit: usize) -> Self {
        self.batch_limit = Some(limit);
        self
    }

    /// Largest batch a single dequeue returns, if limited
    pub fn batch_limit(&self) -> Option<usize> {
        self.batch_limit
    }

    /// Name of the ride or stand this queue serves
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Configured capacity
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Add a ticket in priority order
    ///
    /// Overdue tickets are swept first so they do not count against capacity.
    pub fn enqueue(&self, ticket: Ticket) -> Result<(), QueueError> {
        let holder = ticket.holder;
        let tier = ticket.tier;

        let (now, expired, result) = {
            let mut state = self.state.lock();
            // Read the minute under the lock so expiry and insertion agree on it
            let now = self.clock.now();
            let expired = state.take_expired(now);

            let result = match self.capacity {
                Some(capacity) if state.entries.len() >= capacity => {
                    Err(QueueError::QueueFull { queue: self.label.clone(), capacity })
                }
                _ => {
                    let key = QueueKey {
                        rank: 1,
                        tier: Reverse(ticket.tier),
                        enqueued_at: ticket.enqueued_at,
                        seq: state.next_seq,
                    };
                    state.next_seq += 1;
                    state.entries.insert(key, ticket);
                    Ok(())
                }
            };
            (now, expired, result)
        };

        self.report_abandoned(expired, now);
        match &result {
            Ok(()) => {
                trace!("{} queued for {} (tier {})", holder, self.label, tier);
                self.emit(ParkEvent::TicketEnqueued {
                    minute: now,
                    facility: self.label.clone(),
                    visitor: holder,
                    tier,
                });
            }
            Err(_) => {
                debug!("{} turned away from full queue {}", holder, self.label);
                self.emit(ParkEvent::QueueRejected {
                    minute: now,
                    facility: self.label.clone(),
                    visitor: holder,
                });
            }
        }
        result
    }

    /// Remove and return up to `n` servable tickets in priority order
    ///
    /// `n` is clamped to the batch limit when one is set. Expiry and removal
    /// happen under one lock acquisition, so a ticket returned here can never
    /// also be reported as abandoned, nor be past its deadline.
    pub fn dequeue_up_to(&self, n: usize) -> Vec<Ticket> {
        let n = self.batch_limit.map_or(n, |limit| n.min(limit));
        let (now, expired, taken) = {
            let mut state = self.state.lock();
            let now = self.clock.now();
            let expired = state.take_expired(now);
            let mut taken = Vec::with_capacity(n.min(state.entries.len()));
            while taken.len() < n {
                match state.entries.pop_first() {
                    Some((_, ticket)) => taken.push(ticket),
                    None => break,
                }
            }
            (now, expired, taken)
        };
        self.report_abandoned(expired, now);
        taken
    }

    /// Sweep out every ticket whose deadline has passed
    ///
    /// Returns the holders of the abandoned tickets.
    pub fn expire_now(&self) -> Vec<VisitorId> {
        let (now, expired) = {
            let mut state = self.state.lock();
            let now = self.clock.now();
            (now, state.take_expired(now))
        };
        let holders = expired.iter().map(|t| t.holder).collect();
        self.report_abandoned(expired, now);
        holders
    }

    /// Put pulled-but-unserved tickets back ahead of everyone else
    ///
    /// Relative order of `tickets` is kept and capacity is not checked: these
    /// tickets were already admitted once.
    pub fn requeue_front(&self, tickets: Vec<Ticket>) {
        if tickets.is_empty() {
            return;
        }
        let count = tickets.len();
        let mut state = self.state.lock();
        let base = state.next_front_seq - count as u64;
        for (offset, ticket) in tickets.into_iter().enumerate() {
            let key = QueueKey {
                rank: 0,
                tier: Reverse(0),
                enqueued_at: 0,
                seq: base + 1 + offset as u64,
            };
            state.entries.insert(key, ticket);
        }
        state.next_front_seq = base;
        debug!("Requeued {} tickets at the front of {}", count, self.label);
    }

    /// Withdraw a holder's ticket without reporting it
    pub fn remove(&self, holder: VisitorId) -> Option<Ticket> {
        let mut state = self.state.lock();
        let key = state
            .entries
            .iter()
            .find(|(_, ticket)| ticket.holder == holder)
            .map(|(key, _)| *key)?;
        state.entries.remove(&key)
    }

    /// Number of queued tickets, including overdue ones not yet swept
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Whether no ticket is queued
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Whether `holder` has a ticket in this queue
    pub fn contains(&self, holder: VisitorId) -> bool {
        self.state.lock().entries.values().any(|ticket| ticket.holder == holder)
    }

    /// Holders in service order
    pub fn holders(&self) -> Vec<VisitorId> {
        self.state.lock().entries.values().map(|ticket| ticket.holder).collect()
    }

    fn report_abandoned(&self, expired: Vec<Ticket>, now: u64) {
        for ticket in expired {
            let waited = ticket.waited(now);
            debug!("{} gave up on {} after {} min", ticket.holder, self.label, waited);
            ticket.notify(TicketOutcome::Abandoned { facility: self.label.clone(), waited });
            self.emit(ParkEvent::TicketAbandoned {
                minute: now,
                facility: self.label.clone(),
                visitor: ticket.holder,
                waited,
            });
        }
    }

    fn emit(&self, event: ParkEvent) {
        if let Some(sink) = &self.sink {
            sink.record(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;
    use std::sync::mpsc;

    fn queue(capacity: Option<usize>) -> (Arc<SimClock>, Arc<MemorySink>, WaitQueue) {
        let clock = Arc::new(SimClock::unbounded(1.0));
        let sink = Arc::new(MemorySink::new());
        let queue = WaitQueue::new("Carousel", capacity, Arc::clone(&clock)).with_sink(sink.clone());
        (clock, sink, queue)
    }

    fn ids(tickets: &[Ticket]) -> Vec<u64> {
        tickets.iter().map(|t| t.holder.value()).collect()
    }

    #[test]
    fn test_fifo_within_tier() {
        let (_, sink, q) = queue(None);
        for id in 1..=3 {
            q.enqueue(Ticket::new(VisitorId(id), 0, 30)).unwrap();
        }
        assert_eq!(q.len(), 3);
        assert_eq!(ids(&q.dequeue_up_to(2)), vec![1, 2]);
        assert_eq!(ids(&q.dequeue_up_to(5)), vec![3]);
        assert!(q.is_empty());
        assert_eq!(sink.count("ticket_enqueued"), 3);
    }

    #[test]
    fn test_higher_tier_jumps_ahead() {
        let (clock, _, q) = queue(None);
        q.enqueue(Ticket::new(VisitorId(1), 0, 30)).unwrap();
        clock.advance(1);
        q.enqueue(Ticket::new(VisitorId(2), 1, 30).with_tier(1)).unwrap();
        assert_eq!(q.holders(), vec![VisitorId(2), VisitorId(1)]);
    }

    #[test]
    fn test_queue_full() {
        let (_, sink, q) = queue(Some(1));
        q.enqueue(Ticket::new(VisitorId(1), 0, 30)).unwrap();
        let err = q.enqueue(Ticket::new(VisitorId(2), 0, 30)).unwrap_err();
        assert_eq!(err, QueueError::QueueFull { queue: "Carousel".to_string(), capacity: 1 });
        assert_eq!(sink.count("queue_rejected"), 1);
        assert!(!q.contains(VisitorId(2)));
    }

    #[test]
    fn test_expiry_notifies_holder() {
        let (clock, sink, q) = queue(None);
        let (tx, rx) = mpsc::channel();
        q.enqueue(Ticket::new(VisitorId(1), 0, 2).with_reply(tx)).unwrap();

        clock.advance(2);
        assert!(q.expire_now().is_empty());
        clock.advance(1);
        assert_eq!(q.expire_now(), vec![VisitorId(1)]);

        assert_eq!(
            rx.try_recv().unwrap(),
            TicketOutcome::Abandoned { facility: "Carousel".to_string(), waited: 3 }
        );
        assert_eq!(sink.count("ticket_abandoned"), 1);
        assert!(q.is_empty());
    }

    #[test]
    fn test_requeue_front_keeps_order() {
        let (_, _, q) = queue(Some(2));
        q.enqueue(Ticket::new(VisitorId(1), 0, 30)).unwrap();
        q.enqueue(Ticket::new(VisitorId(2), 0, 30).with_tier(3)).unwrap();
        q.requeue_front(vec![Ticket::new(VisitorId(8), 0, 30), Ticket::new(VisitorId(9), 0, 30)]);

        // Capacity is ignored for returned tickets
        assert_eq!(q.len(), 4);
        assert_eq!(ids(&q.dequeue_up_to(4)), vec![8, 9, 2, 1]);
    }

    #[test]
    fn test_later_requeue_goes_first() {
        let (_, _, q) = queue(None);
        q.requeue_front(vec![Ticket::new(VisitorId(1), 0, 30)]);
        q.requeue_front(vec![Ticket::new(VisitorId(2), 0, 30)]);
        assert_eq!(q.holders(), vec![VisitorId(2), VisitorId(1)]);
    }

    #[test]
    fn test_batch_limit_clamps_dequeue() {
        let clock = Arc::new(SimClock::unbounded(1.0));
        let q = WaitQueue::new("Carousel", None, clock).with_batch_limit(2);
        for id in 1..=5 {
            q.enqueue(Ticket::new(VisitorId(id), 0, 30)).unwrap();
        }
        assert_eq!(q.batch_limit(), Some(2));
        assert_eq!(ids(&q.dequeue_up_to(5)), vec![1, 2]);
        assert_eq!(ids(&q.dequeue_up_to(1)), vec![3]);
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn test_remove_and_contains() {
        let (_, sink, q) = queue(None);
        q.enqueue(Ticket::new(VisitorId(1), 0, 30)).unwrap();
        q.enqueue(Ticket::new(VisitorId(2), 0, 30)).unwrap();
        assert!(q.contains(VisitorId(2)));

        let removed = q.remove(VisitorId(2)).unwrap();
        assert_eq!(removed.holder, VisitorId(2));
        assert!(!q.contains(VisitorId(2)));
        assert!(q.remove(VisitorId(2)).is_none());
        assert_eq!(sink.count("ticket_abandoned"), 0);
    }
}
