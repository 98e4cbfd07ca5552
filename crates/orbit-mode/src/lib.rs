//! # orbit-mode
//!
//! Tab-wide `live`/`sandbox` mode and the resolver that picks live or demo
//! data and actions from it.
//!
//! - [`ModeProvider`] initialises the mode from the URL query, then the
//!   tab-scoped store, then `live`, and yields a cloneable [`ModeHandle`]
//! - [`ModeHandle::scope`] installs a handle for a task; [`use_mode`] looks it
//!   up and fails with [`ModeError::NoProvider`] outside any scope
//! - [`resolver`] holds the pure selection rules the handle applies
//! - [`fixtures`] and [`simulation`] supply the demo data and canned
//!   interactions shown while in sandbox

#![deny(unsafe_code)]

pub mod error;
pub mod fixtures;
pub mod mode;
pub mod navigator;
pub mod provider;
pub mod resolver;
pub mod simulation;

pub use error::{ActionError, ModeError};
pub use fixtures::SandboxFixtures;
pub use mode::AppMode;
pub use navigator::{HistoryNavigator, Navigator};
pub use provider::{ModeHandle, ModeProvider, ModeSnapshot, use_mode};
pub use resolver::{Action, ActionHandler, ActionResult, Resolved, SandboxStub, action};
