//! Fixed-capacity FIFO event queue.
//!
//! A ring buffer over storage allocated once at construction. Enqueue on a
//! full queue hands the event back instead of growing or blocking.

use crate::core::{Event, EventId};
use std::fmt;
use thiserror::Error;

/// Returned by [`EventQueue::enqueue`] when the queue is full.
///
/// Carries the rejected event so the caller decides what to do with the
/// payload.
#[derive(Error)]
#[error("event queue full (capacity {capacity}), dropped {}", .event.id)]
pub struct QueueFull<P> {
    pub event: Event<P>,
    pub capacity: usize,
}

impl<P> fmt::Debug for QueueFull<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueFull")
            .field("event", &self.event.id)
            .field("capacity", &self.capacity)
            .finish()
    }
}

/// Bounded FIFO of events.
///
/// # Example
///
/// ```rust
/// use deferflow::core::{Event, EventId};
/// use deferflow::engine::EventQueue;
///
/// let mut queue = EventQueue::new(2);
/// queue.enqueue(Event::bare(EventId::new(1))).unwrap();
/// queue.enqueue(Event::bare(EventId::new(2))).unwrap();
/// assert!(queue.enqueue(Event::bare(EventId::new(3))).is_err());
///
/// assert_eq!(queue.dequeue().map(|e| e.id), Some(EventId::new(1)));
/// assert_eq!(queue.len(), 1);
/// ```
pub struct EventQueue<P> {
    slots: Box<[Option<Event<P>>]>,
    head: usize,
    tail: usize,
    count: usize,
}

impl<P> EventQueue<P> {
    /// Create a queue holding at most `capacity` events.
    ///
    /// A capacity of zero is raised to one; machines validate their
    /// configuration before building queues.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    /// Append an event at the tail.
    pub fn enqueue(&mut self, event: Event<P>) -> Result<(), QueueFull<P>> {
        if self.is_full() {
            return Err(QueueFull {
                event,
                capacity: self.capacity(),
            });
        }
        self.slots[self.tail] = Some(event);
        self.tail = self.advance(self.tail);
        self.count += 1;
        Ok(())
    }

    /// Take the event at the head, if any.
    pub fn dequeue(&mut self) -> Option<Event<P>> {
        if self.is_empty() {
            return None;
        }
        let event = self.slots[self.head].take();
        self.head = self.advance(self.head);
        self.count -= 1;
        event
    }

    /// Id of the event at the head, if any.
    pub fn peek_id(&self) -> Option<EventId> {
        self.iter().next().map(|event| event.id)
    }

    /// Drop every queued event and rewind the indices.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.head = 0;
        self.tail = 0;
        self.count = 0;
    }

    /// Queued events, head first.
    pub fn iter(&self) -> impl Iterator<Item = &Event<P>> + '_ {
        (0..self.count).filter_map(move |offset| {
            self.slots[(self.head + offset) % self.capacity()].as_ref()
        })
    }

    /// Ids of the queued events, head first.
    pub fn ids(&self) -> Vec<EventId> {
        self.iter().map(|event| event.id).collect()
    }

    fn advance(&self, index: usize) -> usize {
        (index + 1) % self.capacity()
    }
}

impl<P> fmt::Debug for EventQueue<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventQueue")
            .field("capacity", &self.capacity())
            .field("head", &self.head)
            .field("tail", &self.tail)
            .field("pending", &self.ids())
            .finish()
    }
}
