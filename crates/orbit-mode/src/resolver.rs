//! Mode-aware selection of data and actions.
//!
//! Everything here is a pure function of `(mode, inputs)`: no caching, no
//! storage, and references come back exactly as they went in.
//! [`ModeHandle`](crate::ModeHandle) applies these with its current mode.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::info;

use crate::error::ActionError;
use crate::mode::AppMode;

/// Outcome of an action.
pub type ActionResult = Result<Value, ActionError>;

/// An async operation taking JSON arguments.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Run the action.
    async fn call(&self, args: Value) -> ActionResult;
}

/// Shared action handle.
pub type Action = Arc<dyn ActionHandler>;

struct FnAction<F>(F);

#[async_trait]
impl<F, Fut> ActionHandler for FnAction<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = ActionResult> + Send,
{
    async fn call(&self, args: Value) -> ActionResult {
        (self.0)(args).await
    }
}

/// Wrap an async closure as an [`Action`].
pub fn action<F, Fut>(f: F) -> Action
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ActionResult> + Send + 'static,
{
    Arc::new(FnAction(f))
}

/// Action used in sandbox when no sandbox action is supplied: logs the call
/// and reports success without touching anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SandboxStub;

#[async_trait]
impl ActionHandler for SandboxStub {
    async fn call(&self, args: Value) -> ActionResult {
        info!(%args, "[Sandbox] action simulated");
        Ok(json!({"success": true, "sandbox": true}))
    }
}

/// Data resolved together with its provenance.
#[derive(Debug)]
pub struct Resolved<'a, T: ?Sized> {
    /// The data to render.
    pub data: &'a T,
    /// Live data is still loading; `data` is the demo placeholder.
    pub is_loading: bool,
    /// `data` is the demo fixture.
    pub is_using_demo: bool,
}

impl<T: ?Sized> Clone for Resolved<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Resolved<'_, T> {}

/// Sandbox fixture in sandbox, live data otherwise.
pub fn resolve_data<'a, T: ?Sized>(
    mode: AppMode,
    live: Option<&'a T>,
    sandbox: &'a T,
) -> Option<&'a T> {
    match mode {
        AppMode::Sandbox => Some(sandbox),
        AppMode::Live => live,
    }
}

/// Like [`resolve_data`], but never empty: the fixture stands in while live
/// data is loading or absent.
pub fn resolve_with_fallback<'a, T: ?Sized>(
    mode: AppMode,
    live: Option<&'a T>,
    sandbox: &'a T,
    is_loading: bool,
) -> Resolved<'a, T> {
    let demo = |is_loading| Resolved {
        data: sandbox,
        is_loading,
        is_using_demo: true,
    };
    match (mode, live) {
        (AppMode::Sandbox, _) => demo(false),
        (AppMode::Live, _) if is_loading => demo(true),
        (AppMode::Live, Some(live)) => Resolved {
            data: live,
            is_loading: false,
            is_using_demo: false,
        },
        (AppMode::Live, None) => demo(false),
    }
}

/// The live action in live mode; in sandbox the sandbox action, or
/// [`SandboxStub`] when there is none.
pub fn resolve_action(mode: AppMode, live: &Action, sandbox: Option<&Action>) -> Action {
    match (mode, sandbox) {
        (AppMode::Live, _) => Arc::clone(live),
        (AppMode::Sandbox, Some(sandbox)) => Arc::clone(sandbox),
        (AppMode::Sandbox, None) => Arc::new(SandboxStub),
    }
}
