//! `orbit watch`: follow a room until Ctrl-C.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use orbit_core::constants::{TENANT_ID_KEY, events};
use orbit_core::{FileStore, KeyValueStore, Update};
use orbit_realtime::{ConnectionConfig, ConnectionManager, Endpoint, WsConnector};
use orbit_settings::OrbitSettings;
use parking_lot::Mutex;
use serde_json::{Map, Value, json};
use tracing::info;

/// Arguments for `orbit watch`.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Room to subscribe to (empty for none).
    #[arg(long)]
    pub room: String,

    /// Tenant identifier; stored in the local store before connecting.
    #[arg(long)]
    pub tenant: Option<String>,

    /// Web app origin, e.g. `https://orbit.example` (overrides settings).
    #[arg(long)]
    pub base_url: Option<String>,

    /// Reconnect delay in milliseconds (overrides settings).
    #[arg(long)]
    pub reconnect_delay_ms: Option<u64>,
}

/// Running view of the dashboard counters, folded from `status-update`
/// payloads.
#[derive(Debug, Default)]
struct DashboardState {
    stats: Map<String, Value>,
}

impl DashboardState {
    /// Shallow-merge an object payload; returns the merged view.
    fn apply(&mut self, data: &Value) -> Option<Value> {
        let patch = data.as_object()?;
        for (key, value) in patch {
            let _ = self.stats.insert(key.clone(), value.clone());
        }
        Some(Value::Object(self.stats.clone()))
    }
}

fn render(update: &Update, merged: Option<Value>) -> Value {
    let mut line = json!({
        "event": update.event,
        "data": update.data,
    });
    if let Some(merged) = merged {
        line["stats"] = merged;
    }
    line
}

fn config_for(settings: &OrbitSettings, args: &WatchArgs) -> Result<ConnectionConfig> {
    let mut config = ConnectionConfig::from_settings(&settings.realtime)
        .context("Invalid realtime settings")?;
    if let Some(base_url) = &args.base_url {
        config.endpoint = Endpoint::new(base_url, &settings.realtime.ws_path)
            .context("Invalid --base-url")?;
    }
    if let Some(ms) = args.reconnect_delay_ms {
        config.reconnect_delay = Duration::from_millis(ms.max(1));
    }
    Ok(config)
}

pub async fn run(settings: &OrbitSettings, args: WatchArgs) -> Result<()> {
    let config = config_for(settings, &args)?;

    let store = FileStore::open(&settings.storage.local_store_path).with_context(|| {
        format!(
            "Failed to open local store: {}",
            settings.storage.local_store_path.display()
        )
    })?;
    if let Some(tenant) = &args.tenant {
        store.set(TENANT_ID_KEY, tenant);
    }

    let dashboard = Arc::new(Mutex::new(DashboardState::default()));
    let manager = ConnectionManager::builder(config, args.room.as_str())
        .connector(Arc::new(WsConnector))
        .local_store(Arc::new(store))
        .on_message(move |update| {
            let merged = if update.event.as_deref() == Some(events::STATUS_UPDATE) {
                dashboard.lock().apply(&update.data)
            } else {
                None
            };
            let mut out = std::io::stdout().lock();
            let _ = writeln!(out, "{}", render(&update, merged));
        })
        .spawn();

    let mut status = manager.watch_status();
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                break;
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = status.borrow_and_update().clone();
                info!(
                    state = %current.state,
                    indicator = current.indicator(),
                    last_error = ?current.last_error,
                    "connection status"
                );
            }
        }
    }

    info!("shutting down");
    manager.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_updates_merge_shallowly() {
        let mut state = DashboardState::default();
        let first = state
            .apply(&json!({"pendingApprovals": 3, "activeWorkers": 10}))
            .unwrap();
        assert_eq!(first, json!({"pendingApprovals": 3, "activeWorkers": 10}));

        let second = state.apply(&json!({"pendingApprovals": 2})).unwrap();
        assert_eq!(second, json!({"pendingApprovals": 2, "activeWorkers": 10}));
    }

    #[test]
    fn non_object_payload_is_not_merged() {
        let mut state = DashboardState::default();
        assert!(state.apply(&json!([1, 2])).is_none());
        assert!(state.stats.is_empty());
    }

    #[test]
    fn render_includes_stats_only_when_merged() {
        let update = Update {
            data: json!({"id": 4}),
            event: Some(events::DOCUMENT_UPLOADED.into()),
        };
        assert_eq!(
            render(&update, None),
            json!({"event": "document-uploaded", "data": {"id": 4}})
        );
        let with_stats = render(&update, Some(json!({"a": 1})));
        assert_eq!(with_stats["stats"], json!({"a": 1}));
    }

    #[test]
    fn cli_overrides_settings() {
        let settings = OrbitSettings::default();
        let args = WatchArgs {
            room: "payroll".into(),
            tenant: None,
            base_url: Some("https://orbit.example".into()),
            reconnect_delay_ms: Some(250),
        };
        let config = config_for(&settings, &args).unwrap();
        assert!(config.endpoint.is_secure());
        assert_eq!(config.reconnect_delay, Duration::from_millis(250));
    }
}
