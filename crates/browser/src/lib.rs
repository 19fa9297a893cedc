//! Stateful browser subsystems on top of the catalog store contract.
//!
//! Three components carry the decision logic: the fallback search
//! [`resolver`], the optimistic-concurrency [`entry_store`], and the
//! [`view_state`] coordinator. Around them sit the [`notify`] scheduler
//! (the sole user-facing error/success channel), the graph-node
//! [`widgets`] adapter, and env-based [`config`].

pub mod config;
pub mod entry_store;
pub mod notify;
pub mod resolver;
pub mod view_state;
pub mod widgets;
