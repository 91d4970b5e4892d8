//! Domain events and the in-process bus that distributes them.
//!
//! The movement engine publishes one event per committed movement; notifiers
//! and any other read-side consumer subscribe here. Nothing in this crate
//! knows about products or fields.

pub mod bus;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
