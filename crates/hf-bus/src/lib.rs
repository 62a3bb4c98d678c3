//! Topic-keyed publish/subscribe bus for hydroflow agents.
//!
//! The bus is double-buffered: everything published during tick N lands in a
//! pending area and only becomes visible when the scheduler calls
//! [`MessageBus::advance_tick`] at the start of tick N+1. Subscribers evaluated
//! during tick N therefore never observe each other's output, which keeps
//! agent execution order from leaking into results.
//!
//! Two delivery modes exist per topic:
//! - **Latest** (default): the topic holds its most recent message.
//! - **Queue**: messages accumulate in publish order until a tick in which the
//!   queue was consumed has passed. Used for commands that must not be dropped.

pub mod bus;
pub mod error;
pub mod payload;
pub mod topic;

pub use bus::{AdvanceStats, Delivery, DeliveryMode, MessageBus};
pub use error::{BusError, BusResult};
pub use payload::{Command, Message, Payload, StateSnapshot};
pub use topic::Topic;
