//! Tab-wide mode state.
//!
//! A [`ModeProvider`] reads the initial mode once, then hands out a
//! [`ModeHandle`]. The handle is the single writer of the mode: every
//! transition persists to the tab-scoped store and notifies `watch`
//! subscribers. Handles are plain values, so independent tabs (and tests)
//! never share state.

use std::future::Future;
use std::sync::Arc;

use orbit_core::KeyValueStore;
use orbit_core::constants::{MODE_QUERY_PARAM, MODE_STORAGE_KEY, RETURN_PATH_KEY, ROOT_ROUTE};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::ModeError;
use crate::mode::AppMode;
use crate::navigator::Navigator;
use crate::resolver::{self, Action, Resolved};

tokio::task_local! {
    static CURRENT: ModeHandle;
}

/// The handle installed by the innermost [`ModeHandle::scope`].
pub fn use_mode() -> Result<ModeHandle, ModeError> {
    CURRENT
        .try_with(ModeHandle::clone)
        .map_err(|_| ModeError::NoProvider)
}

/// Everything a page needs to render mode-dependent chrome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeSnapshot {
    /// Current mode.
    pub mode: AppMode,
    /// `mode == Sandbox`.
    pub is_sandbox: bool,
    /// `mode == Live`.
    pub is_live: bool,
    /// Alias of `is_sandbox`.
    pub is_demo: bool,
    /// Alias of `is_live`.
    pub is_production: bool,
    /// Where `exit_sandbox` will navigate.
    pub return_path: Option<String>,
}

/// Reads the initial mode.
pub struct ModeProvider {
    session: Arc<dyn KeyValueStore>,
    navigator: Arc<dyn Navigator>,
}

impl ModeProvider {
    /// `session` is the tab-scoped store; `navigator` drives `exit_sandbox`.
    pub fn new(session: Arc<dyn KeyValueStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self { session, navigator }
    }

    /// Resolve the starting mode and return the handle.
    ///
    /// Precedence: `mode=` in `query` (persisted immediately), then the
    /// stored mode, then `live`. Unrecognised values at either level are
    /// ignored. A stored return path is restored as well.
    pub fn initialize(self, query: &str) -> ModeHandle {
        let from_query = query_mode(query);
        let mode = if let Some(mode) = from_query {
            self.session.set(MODE_STORAGE_KEY, mode.as_str());
            mode
        } else {
            self.stored_mode().unwrap_or_default()
        };

        let return_path = self
            .session
            .get(RETURN_PATH_KEY)
            .filter(|path| !path.is_empty());

        info!(%mode, from_query = from_query.is_some(), "mode initialized");

        let (tx, _) = watch::channel(mode);
        ModeHandle {
            inner: Arc::new(Inner {
                session: self.session,
                navigator: self.navigator,
                mode: tx,
                return_path: RwLock::new(return_path),
            }),
        }
    }

    fn stored_mode(&self) -> Option<AppMode> {
        let raw = self.session.get(MODE_STORAGE_KEY)?;
        match raw.parse() {
            Ok(mode) => Some(mode),
            Err(e) => {
                warn!(error = %e, "ignoring stored mode");
                None
            }
        }
    }
}

fn query_mode(query: &str) -> Option<AppMode> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let raw = url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == MODE_QUERY_PARAM)
        .map(|(_, value)| value.into_owned())?;
    match raw.parse() {
        Ok(mode) => Some(mode),
        Err(_) => {
            debug!(value = %raw, "ignoring unrecognised mode query");
            None
        }
    }
}

struct Inner {
    session: Arc<dyn KeyValueStore>,
    navigator: Arc<dyn Navigator>,
    mode: watch::Sender<AppMode>,
    return_path: RwLock<Option<String>>,
}

/// Cloneable handle to one tab's mode state.
#[derive(Clone)]
pub struct ModeHandle {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ModeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModeHandle")
            .field("mode", &self.mode())
            .field("return_path", &self.return_path())
            .finish_non_exhaustive()
    }
}

impl ModeHandle {
    // ── reads ───────────────────────────────────────────────────────

    /// Current mode.
    pub fn mode(&self) -> AppMode {
        *self.inner.mode.borrow()
    }

    /// Whether the tab is in sandbox.
    pub fn is_sandbox(&self) -> bool {
        self.mode().is_sandbox()
    }

    /// Whether the tab is live.
    pub fn is_live(&self) -> bool {
        self.mode().is_live()
    }

    /// Route `exit_sandbox` will return to, if one was recorded.
    pub fn return_path(&self) -> Option<String> {
        self.inner.return_path.read().clone()
    }

    /// Current state with the demo/production aliases.
    pub fn snapshot(&self) -> ModeSnapshot {
        let mode = self.mode();
        ModeSnapshot {
            mode,
            is_sandbox: mode.is_sandbox(),
            is_live: mode.is_live(),
            is_demo: mode.is_sandbox(),
            is_production: mode.is_live(),
            return_path: self.return_path(),
        }
    }

    /// Receiver notified on every mode change.
    pub fn watch(&self) -> watch::Receiver<AppMode> {
        self.inner.mode.subscribe()
    }

    // ── transitions ─────────────────────────────────────────────────

    /// Switch mode and persist it.
    pub fn set_mode(&self, mode: AppMode) {
        let previous = self.inner.mode.send_replace(mode);
        self.inner.session.set(MODE_STORAGE_KEY, mode.as_str());
        if previous != mode {
            info!(from = %previous, to = %mode, "mode changed");
        }
    }

    /// Flip between live and sandbox.
    pub fn toggle_mode(&self) {
        self.set_mode(self.mode().toggled());
    }

    /// Record where to come back to and switch to sandbox.
    ///
    /// Uses `path` when given and non-empty, else the current location.
    pub fn enter_sandbox(&self, path: Option<&str>) {
        let path = path
            .filter(|p| !p.is_empty())
            .map_or_else(|| self.inner.navigator.location(), str::to_owned);
        self.inner.session.set(RETURN_PATH_KEY, &path);
        debug!(return_path = %path, "entering sandbox");
        *self.inner.return_path.write() = Some(path);
        self.set_mode(AppMode::Sandbox);
    }

    /// Consume the recorded return path, switch to live and navigate there
    /// (or to `/`). Returns the route navigated to.
    pub fn exit_sandbox(&self) -> String {
        let path = self
            .inner
            .session
            .get(RETURN_PATH_KEY)
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| ROOT_ROUTE.to_owned());
        self.inner.session.remove(RETURN_PATH_KEY);
        *self.inner.return_path.write() = None;
        self.set_mode(AppMode::Live);
        self.inner.navigator.navigate(&path);
        debug!(return_path = %path, "exited sandbox");
        path
    }

    // ── resolution ──────────────────────────────────────────────────

    /// `sandbox` in sandbox mode, else `live`.
    pub fn select_data<'a, T: ?Sized>(&self, live: Option<&'a T>, sandbox: &'a T) -> Option<&'a T> {
        resolver::resolve_data(self.mode(), live, sandbox)
    }

    /// Data with loading/demo provenance; never empty.
    pub fn select_data_with_fallback<'a, T: ?Sized>(
        &self,
        live: Option<&'a T>,
        sandbox: &'a T,
        is_loading: bool,
    ) -> Resolved<'a, T> {
        resolver::resolve_with_fallback(self.mode(), live, sandbox, is_loading)
    }

    /// The action to invoke for the current mode.
    pub fn select_action(&self, live: &Action, sandbox: Option<&Action>) -> Action {
        resolver::resolve_action(self.mode(), live, sandbox)
    }

    // ── scoping ─────────────────────────────────────────────────────

    /// Run `future` with this handle visible to [`use_mode`].
    pub fn scope<F: Future>(&self, future: F) -> impl Future<Output = F::Output> {
        CURRENT.scope(self.clone(), future)
    }

    /// Run `f` with this handle visible to [`use_mode`].
    pub fn sync_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        CURRENT.sync_scope(self.clone(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::SandboxFixtures;
    use crate::navigator::HistoryNavigator;
    use assert_matches::assert_matches;
    use orbit_core::MemoryStore;

    fn provider_with(entries: &[(&str, &str)], location: &str) -> (ModeProvider, Arc<MemoryStore>, Arc<HistoryNavigator>) {
        let store = Arc::new(MemoryStore::with_entries(entries.iter().copied()));
        let nav = Arc::new(HistoryNavigator::new(location));
        (ModeProvider::new(store.clone(), nav.clone()), store, nav)
    }

    // ── initialization ──────────────────────────────────────────────

    #[test]
    fn defaults_to_live() {
        let (provider, store, _) = provider_with(&[], "/");
        let handle = provider.initialize("");
        assert_eq!(handle.mode(), AppMode::Live);
        assert!(handle.return_path().is_none());
        assert!(store.get(MODE_STORAGE_KEY).is_none());
    }

    #[test]
    fn query_mode_is_persisted() {
        let (provider, store, _) = provider_with(&[], "/");
        let handle = provider.initialize("?mode=sandbox");
        assert!(handle.is_sandbox());
        assert_eq!(store.get(MODE_STORAGE_KEY).as_deref(), Some("sandbox"));
    }

    #[test]
    fn query_beats_stored() {
        let (provider, store, _) = provider_with(&[(MODE_STORAGE_KEY, "sandbox")], "/");
        let handle = provider.initialize("tab=1&mode=live");
        assert!(handle.is_live());
        assert_eq!(store.get(MODE_STORAGE_KEY).as_deref(), Some("live"));
    }

    #[test]
    fn stored_used_without_query() {
        let (provider, _, _) = provider_with(&[(MODE_STORAGE_KEY, "sandbox")], "/");
        assert!(provider.initialize("?tab=2").is_sandbox());
    }

    #[test]
    fn invalid_values_are_ignored() {
        let (provider, store, _) = provider_with(&[(MODE_STORAGE_KEY, "demo")], "/");
        let handle = provider.initialize("?mode=SANDBOX");
        assert!(handle.is_live());
        // neither level was valid, so nothing was written
        assert_eq!(store.get(MODE_STORAGE_KEY).as_deref(), Some("demo"));

        let (provider, _, _) = provider_with(&[(MODE_STORAGE_KEY, "sandbox")], "/");
        assert!(provider.initialize("?mode=bogus").is_sandbox());
    }

    #[test]
    fn stored_return_path_is_restored() {
        let (provider, _, nav) = provider_with(
            &[(MODE_STORAGE_KEY, "sandbox"), (RETURN_PATH_KEY, "/crm/leads")],
            "/crm/leads?tour=1",
        );
        let handle = provider.initialize("");
        assert_eq!(handle.return_path().as_deref(), Some("/crm/leads"));
        assert_eq!(handle.exit_sandbox(), "/crm/leads");
        assert_eq!(nav.location(), "/crm/leads");
    }

    // ── transitions ─────────────────────────────────────────────────

    #[test]
    fn set_and_toggle_persist() {
        let (provider, store, _) = provider_with(&[], "/");
        let handle = provider.initialize("");
        handle.set_mode(AppMode::Sandbox);
        assert_eq!(store.get(MODE_STORAGE_KEY).as_deref(), Some("sandbox"));
        handle.toggle_mode();
        assert!(handle.is_live());
        assert_eq!(store.get(MODE_STORAGE_KEY).as_deref(), Some("live"));
        handle.toggle_mode();
        assert!(handle.is_sandbox());
    }

    #[test]
    fn enter_then_exit_round_trip() {
        let (provider, store, nav) = provider_with(&[], "/admin/workers");
        let handle = provider.initialize("");

        handle.enter_sandbox(None);
        assert!(handle.is_sandbox());
        assert_eq!(handle.return_path().as_deref(), Some("/admin/workers"));
        assert_eq!(store.get(RETURN_PATH_KEY).as_deref(), Some("/admin/workers"));

        nav.navigate("/admin/sandbox-tour");
        let target = handle.exit_sandbox();

        assert_eq!(target, "/admin/workers");
        assert_eq!(nav.location(), "/admin/workers");
        assert!(handle.is_live());
        assert!(handle.return_path().is_none());
        assert!(store.get(RETURN_PATH_KEY).is_none());
        assert_eq!(store.get(MODE_STORAGE_KEY).as_deref(), Some("live"));
    }

    #[test]
    fn enter_with_explicit_path() {
        let (provider, _, _) = provider_with(&[], "/jobs");
        let handle = provider.initialize("");
        handle.enter_sandbox(Some("/payroll-processing"));
        assert_eq!(handle.return_path().as_deref(), Some("/payroll-processing"));

        handle.enter_sandbox(Some(""));
        assert_eq!(handle.return_path().as_deref(), Some("/jobs"));
    }

    #[test]
    fn exit_without_return_path_goes_home() {
        let (provider, _, nav) = provider_with(&[], "/crm");
        let handle = provider.initialize("?mode=sandbox");
        assert_eq!(handle.exit_sandbox(), "/");
        assert_eq!(nav.history(), vec!["/crm", "/"]);

        // the return path is consumed exactly once
        handle.enter_sandbox(None);
        assert_eq!(handle.exit_sandbox(), "/");
        assert_eq!(handle.exit_sandbox(), "/");
    }

    #[test]
    fn snapshot_aliases() {
        let (provider, _, _) = provider_with(&[], "/owner-hub");
        let handle = provider.initialize("");
        let live = handle.snapshot();
        assert!(live.is_live && live.is_production && !live.is_demo);

        handle.enter_sandbox(None);
        let sandbox = handle.snapshot();
        assert_eq!(
            sandbox,
            ModeSnapshot {
                mode: AppMode::Sandbox,
                is_sandbox: true,
                is_live: false,
                is_demo: true,
                is_production: false,
                return_path: Some("/owner-hub".into()),
            }
        );
    }

    #[tokio::test]
    async fn watch_sees_changes() {
        let (provider, _, _) = provider_with(&[], "/");
        let handle = provider.initialize("");
        let mut rx = handle.watch();

        handle.toggle_mode();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), AppMode::Sandbox);
    }

    #[test]
    fn clones_share_state_providers_do_not() {
        let (provider, _, _) = provider_with(&[], "/");
        let a = provider.initialize("");
        let b = a.clone();
        a.set_mode(AppMode::Sandbox);
        assert!(b.is_sandbox());

        let (other, _, _) = provider_with(&[], "/");
        assert!(other.initialize("").is_live());
    }

    // ── resolution through the handle ───────────────────────────────

    #[test]
    fn sandbox_query_selects_fixture() {
        let (provider, _, _) = provider_with(&[], "/");
        let handle = provider.initialize("?mode=sandbox");
        assert_eq!(handle.select_data(Some(&42), &7), Some(&7));
    }

    #[test]
    fn live_select_returns_same_reference() {
        let (provider, _, _) = provider_with(&[], "/");
        let handle = provider.initialize("");
        let fixtures = SandboxFixtures::demo();
        let live = SandboxFixtures::demo();

        let got = handle.select_data(Some(&live.workers), &fixtures.workers).unwrap();
        assert!(std::ptr::eq(got, &live.workers));

        let resolved = handle.select_data_with_fallback(None, &fixtures.stats, false);
        assert!(resolved.is_using_demo);
        assert!(std::ptr::eq(resolved.data, &fixtures.stats));
    }

    // ── scoping ─────────────────────────────────────────────────────

    #[test]
    fn use_mode_outside_scope_fails() {
        assert_matches!(use_mode(), Err(ModeError::NoProvider));
    }

    #[tokio::test]
    async fn use_mode_inside_scope() {
        let (provider, _, _) = provider_with(&[], "/");
        let handle = provider.initialize("?mode=sandbox");
        let mode = handle
            .scope(async { use_mode().map(|h| h.mode()) })
            .await
            .unwrap();
        assert_eq!(mode, AppMode::Sandbox);
        assert_matches!(use_mode(), Err(ModeError::NoProvider));
    }

    #[test]
    fn sync_scope_sees_writes() {
        let (provider, _, _) = provider_with(&[], "/");
        let handle = provider.initialize("");
        handle.sync_scope(|| use_mode().unwrap().set_mode(AppMode::Sandbox));
        assert!(handle.is_sandbox());
    }
}
