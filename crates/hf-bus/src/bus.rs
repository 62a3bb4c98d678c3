//! Double-buffered message bus.

use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use crate::error::BusResult;
use crate::payload::{Message, Payload};
use crate::topic::Topic;

/// How a topic retains messages between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryMode {
    /// Keep only the most recent message.
    #[default]
    Latest,
    /// Keep every message until a tick in which the queue was consumed.
    Queue,
}

/// What a subscriber sees on a topic during the current tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Delivery<'a> {
    /// Nothing has ever been made visible on this topic.
    NoData,
    /// Most recent message of a latest-value topic.
    Latest(&'a Message),
    /// Visible messages of a queue topic, in publish order.
    Queued(&'a [Message]),
}

impl<'a> Delivery<'a> {
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData) || matches!(self, Self::Queued(q) if q.is_empty())
    }

    /// Newest visible message, whatever the mode.
    pub fn latest(&self) -> Option<&'a Message> {
        match *self {
            Self::NoData => None,
            Self::Latest(m) => Some(m),
            Self::Queued(q) => q.last(),
        }
    }

    /// All visible messages as a slice.
    pub fn messages(&self) -> &'a [Message] {
        match *self {
            Self::NoData => &[],
            Self::Latest(m) => std::slice::from_ref(m),
            Self::Queued(q) => q,
        }
    }
}

#[derive(Debug, Clone)]
enum Slot {
    Latest(Message),
    Queue(Vec<Message>),
}

/// Counters returned by [`MessageBus::advance_tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvanceStats {
    /// Messages promoted from pending to visible.
    pub promoted: usize,
    /// Queued messages dropped because their queue was consumed.
    pub cleared: usize,
}

/// Topic-keyed publish/subscribe bus.
///
/// Maps are ordered so that iteration (and therefore logging and recording)
/// is deterministic.
#[derive(Debug, Clone, Default)]
pub struct MessageBus {
    queue_topics: BTreeSet<Topic>,
    visible: BTreeMap<Topic, Slot>,
    pending: BTreeMap<Topic, Vec<Message>>,
    consumed: BTreeSet<Topic>,
    published_total: u64,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a topic as queue mode. All other topics use latest-value mode.
    pub fn configure_queue(&mut self, topic: Topic) {
        self.queue_topics.insert(topic);
    }

    pub fn mode(&self, topic: &Topic) -> DeliveryMode {
        if self.queue_topics.contains(topic) {
            DeliveryMode::Queue
        } else {
            DeliveryMode::Latest
        }
    }

    /// Stage a payload. It becomes visible after the next [`advance_tick`].
    ///
    /// [`advance_tick`]: MessageBus::advance_tick
    pub fn publish(&mut self, topic: Topic, payload: Payload, tick: u64) {
        let mode = self.mode(&topic);
        let message = Message {
            topic: topic.clone(),
            payload,
            published_at: tick,
        };
        let staged = self.pending.entry(topic).or_default();
        match mode {
            DeliveryMode::Latest => {
                staged.clear();
                staged.push(message);
            }
            DeliveryMode::Queue => staged.push(message),
        }
        self.published_total += 1;
    }

    /// Stage a payload on a topic given as a string; malformed topics are rejected.
    pub fn publish_str(&mut self, topic: &str, payload: Payload, tick: u64) -> BusResult<()> {
        let topic = Topic::new(topic)?;
        self.publish(topic, payload, tick);
        Ok(())
    }

    /// Visible messages on `topic`. Never fails; unknown topics and drained
    /// queues yield `NoData`.
    pub fn subscribe(&self, topic: &Topic) -> Delivery<'_> {
        match self.visible.get(topic) {
            None => Delivery::NoData,
            Some(Slot::Latest(m)) => Delivery::Latest(m),
            Some(Slot::Queue(q)) => Delivery::Queued(q),
        }
    }

    /// String-keyed variant of [`subscribe`](MessageBus::subscribe).
    pub fn subscribe_str(&self, topic: &str) -> BusResult<Delivery<'_>> {
        let topic = Topic::new(topic)?;
        Ok(self.subscribe(&topic))
    }

    /// Record that a queue's visible messages were read this tick.
    pub fn mark_consumed(&mut self, topic: &Topic) {
        if self.queue_topics.contains(topic) {
            self.consumed.insert(topic.clone());
        }
    }

    /// Promote pending publishes to visible state for the next tick.
    ///
    /// Consumed queues are emptied before new messages are appended; queues
    /// nobody read keep their messages.
    pub fn advance_tick(&mut self) -> AdvanceStats {
        let mut stats = AdvanceStats::default();

        for topic in std::mem::take(&mut self.consumed) {
            if let Some(Slot::Queue(q)) = self.visible.get_mut(&topic) {
                stats.cleared += q.len();
                q.clear();
            }
        }
        self.visible
            .retain(|_, slot| !matches!(slot, Slot::Queue(q) if q.is_empty()));

        for (topic, messages) in std::mem::take(&mut self.pending) {
            stats.promoted += messages.len();
            match self.mode(&topic) {
                DeliveryMode::Latest => {
                    if let Some(last) = messages.into_iter().last() {
                        self.visible.insert(topic, Slot::Latest(last));
                    }
                }
                DeliveryMode::Queue => match self.visible.get_mut(&topic) {
                    Some(Slot::Queue(q)) => q.extend(messages),
                    _ => {
                        self.visible.insert(topic, Slot::Queue(messages));
                    }
                },
            }
        }

        trace!(
            promoted = stats.promoted,
            cleared = stats.cleared,
            "bus advanced"
        );
        stats
    }

    /// Topics with visible data, in sorted order.
    pub fn topics(&self) -> impl Iterator<Item = &Topic> {
        self.visible.keys()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }

    pub fn visible_len(&self) -> usize {
        self.visible
            .values()
            .map(|slot| match slot {
                Slot::Latest(_) => 1,
                Slot::Queue(q) => q.len(),
            })
            .sum()
    }

    /// Total number of publish calls since the bus was created.
    pub fn published_total(&self) -> u64 {
        self.published_total
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn nothing_leaks_within_a_tick(
            schedule in prop::collection::vec(prop::collection::vec((0usize..4, -100.0f64..100.0), 0..6), 1..12)
        ) {
            let topics: Vec<Topic> = (0..4)
                .map(|i| Topic::new(format!("state/t{i}")).unwrap())
                .collect();
            let mut bus = MessageBus::new();

            for (tick, publishes) in schedule.iter().enumerate() {
                let tick = tick as u64;
                bus.advance_tick();
                let before: Vec<Option<Message>> =
                    topics.iter().map(|t| bus.subscribe(t).latest().cloned()).collect();

                for &(i, v) in publishes {
                    bus.publish(topics[i].clone(), Payload::scalar(v), tick);
                }

                // Same tick: nothing changed.
                for (t, seen) in topics.iter().zip(&before) {
                    prop_assert_eq!(bus.subscribe(t).latest().cloned(), seen.clone());
                    if let Some(m) = seen {
                        prop_assert!(m.published_at < tick);
                    }
                }
            }

            // Next tick: the last publish per topic is now visible.
            let last_tick = schedule.len() as u64 - 1;
            bus.advance_tick();
            let final_publishes = schedule.last().unwrap();
            for &(i, _) in final_publishes {
                let m = bus.subscribe(&topics[i]).latest().unwrap();
                prop_assert_eq!(m.published_at, last_tick);
                let expected = final_publishes.iter().rev().find(|(j, _)| *j == i).unwrap().1;
                prop_assert_eq!(m.payload.as_scalar(), Some(expected));
            }
        }
    }
}
