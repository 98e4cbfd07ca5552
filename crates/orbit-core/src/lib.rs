//! # orbit-core
//!
//! Foundation types shared by the ORBIT realtime client crates.
//!
//! - **Branded IDs**: [`TenantId`], [`Room`], [`ConnectionId`] as newtypes
//! - **Wire frames**: [`InboundMessage`] (server → client) and [`ControlFrame`]
//!   (client → server) for the `/ws` push-update endpoint
//! - **Storage**: the [`KeyValueStore`] primitive with a tab-scoped
//!   [`MemoryStore`] and a durable [`FileStore`]
//! - **Constants**: storage keys, well-known rooms and events

#![deny(unsafe_code)]

pub mod constants;
pub mod errors;
pub mod ids;
pub mod messages;
pub mod storage;

pub use errors::{FrameError, StorageError};
pub use ids::{ConnectionId, Room, TenantId};
pub use messages::{ControlFrame, InboundMessage, Update};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
