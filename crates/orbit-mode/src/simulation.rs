//! Canned interactions for sandbox mode: workflow tips, auto-responses and
//! notifications.

use std::time::Duration;

use rand::seq::IndexedRandom;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::debug;

/// Extra pause between the typing indicator and the simulated reply.
pub const TYPING_LEAD: Duration = Duration::from_millis(500);

/// A reply sent back after `delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoResponse {
    /// Reply text.
    pub message: &'static str,
    /// How long the simulated peer takes to answer.
    pub delay: Duration,
}

const fn reply(message: &'static str, delay_ms: u64) -> AutoResponse {
    AutoResponse {
        message,
        delay: Duration::from_millis(delay_ms),
    }
}

/// Every auto-response the sandbox can produce.
pub static AUTO_RESPONSES: [AutoResponse; 8] = [
    reply("✅ Message received!", 800),
    reply("👍 On it!", 1200),
    reply("📍 ETA 5 minutes", 1500),
    reply("✔️ Task completed!", 2000),
    reply("🔔 Notification sent", 1000),
    reply("📊 Processing...", 600),
    reply("💾 Saved successfully", 900),
    reply("🎯 Assignment confirmed", 1100),
];

/// Severity of a simulated notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum NotificationKind {
    Success,
    Info,
    Warning,
}

/// A toast-style notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: &'static str,
    pub message: &'static str,
}

/// Notifications the sandbox cycles through.
pub static SIMULATED_NOTIFICATIONS: [Notification; 4] = [
    Notification {
        kind: NotificationKind::Success,
        title: "Worker Clocked In",
        message: "Jane Demo checked in at Nashville site",
    },
    Notification {
        kind: NotificationKind::Info,
        title: "New Application",
        message: "John Sample submitted an application",
    },
    Notification {
        kind: NotificationKind::Warning,
        title: "Timesheet Due",
        message: "3 timesheets pending approval",
    },
    Notification {
        kind: NotificationKind::Success,
        title: "Payment Processed",
        message: "Payroll batch completed successfully",
    },
];

static WORKFLOW_TIPS: &[(&str, [&str; 3])] = &[
    (
        "/admin",
        [
            "💡 Try clicking on a worker card to see their full profile",
            "💡 Use the search bar to filter workers by skill or location",
            "💡 The dashboard stats update in real-time with live data",
        ],
    ),
    (
        "/developer",
        [
            "💡 Check the Integration Status to see what's configured",
            "💡 Use the To-Do list to track your setup progress",
            "💡 The Asset Tracker shows all registered hallmarks",
        ],
    ),
    (
        "/crm",
        [
            "💡 Drag leads between columns to update their status",
            "💡 Click a lead to see full contact history",
            "💡 Use filters to segment by source or value",
        ],
    ),
    (
        "/payroll-processing",
        [
            "💡 Select multiple timesheets for batch approval",
            "💡 Click the calculate button to preview payroll totals",
            "💡 Export to CSV for external accounting systems",
        ],
    ),
    (
        "/employee-hub",
        [
            "💡 Check your upcoming shifts in the calendar view",
            "💡 Submit time-off requests directly from here",
            "💡 View your pay stubs and earnings history",
        ],
    ),
    (
        "/owner-hub",
        [
            "💡 Monitor all locations from the overview dashboard",
            "💡 Generate revenue reports by clicking Analytics",
            "💡 Manage franchise settings in Configuration",
        ],
    ),
    (
        "/jobs",
        [
            "💡 Click on a job to see full details and requirements",
            "💡 Use filters to find jobs by location or pay rate",
            "💡 Apply directly from the job listing page",
        ],
    ),
    (
        "/marketing-hub",
        [
            "💡 Create campaigns using the template builder",
            "💡 Track open rates and click-through in Analytics",
            "💡 Schedule emails for optimal delivery times",
        ],
    ),
];

static DEFAULT_TIPS: [&str; 3] = [
    "💡 Explore this section to learn its features",
    "💡 All changes in sandbox mode are temporary",
    "💡 Click 'Exit to Live' when you're ready for real data",
];

/// Tips for the first route prefix matching `path`, or the generic tips.
pub fn tips_for_page(path: &str) -> &'static [&'static str] {
    WORKFLOW_TIPS
        .iter()
        .find(|(prefix, _)| path.starts_with(prefix))
        .map_or(&DEFAULT_TIPS[..], |(_, tips)| &tips[..])
}

fn pick<T>(items: &[T]) -> Option<&T> {
    items.choose(&mut rand::rng())
}

// Fallbacks index slot 0 of fixed-size tables; an empty table fails to compile.

/// A random tip for `path`.
pub fn random_tip(path: &str) -> &'static str {
    pick(tips_for_page(path)).copied().unwrap_or(DEFAULT_TIPS[0])
}

/// A random auto-response.
pub fn random_auto_response() -> &'static AutoResponse {
    pick(&AUTO_RESPONSES).unwrap_or(&AUTO_RESPONSES[0])
}

/// A random notification.
pub fn random_notification() -> &'static Notification {
    pick(&SIMULATED_NOTIFICATIONS).unwrap_or(&SIMULATED_NOTIFICATIONS[0])
}

// ─────────────────────────────────────────────────────────────────────────────
// Scheduled simulations
// ─────────────────────────────────────────────────────────────────────────────

/// A pending simulated reply. Dropping or cancelling it prevents any further
/// callbacks.
#[must_use = "dropping the guard cancels the simulation"]
#[derive(Debug)]
pub struct SimulationGuard {
    handle: JoinHandle<()>,
}

impl SimulationGuard {
    /// Cancel the pending callbacks.
    pub fn cancel(self) {
        drop(self);
    }

    /// Whether every callback has already run (or the task was cancelled).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for SimulationGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Call `callback` with a random auto-response after its delay.
pub fn simulate_response(callback: impl FnOnce(&'static str) + Send + 'static) -> SimulationGuard {
    simulate_response_with(random_auto_response(), callback)
}

/// Call `callback` with `response.message` after `response.delay`.
pub fn simulate_response_with(
    response: &'static AutoResponse,
    callback: impl FnOnce(&'static str) + Send + 'static,
) -> SimulationGuard {
    debug!(delay = ?response.delay, "simulating response");
    let handle = tokio::spawn(async move {
        tokio::time::sleep(response.delay).await;
        callback(response.message);
    });
    SimulationGuard { handle }
}

/// Typing indicator: `on_start` now, then `on_message` and `on_end` together
/// after the response delay plus [`TYPING_LEAD`].
pub fn simulate_typing(
    on_start: impl FnOnce(),
    on_message: impl FnOnce(&'static str) + Send + 'static,
    on_end: impl FnOnce() + Send + 'static,
) -> SimulationGuard {
    simulate_typing_with(random_auto_response(), on_start, on_message, on_end)
}

/// [`simulate_typing`] with a fixed response.
pub fn simulate_typing_with(
    response: &'static AutoResponse,
    on_start: impl FnOnce(),
    on_message: impl FnOnce(&'static str) + Send + 'static,
    on_end: impl FnOnce() + Send + 'static,
) -> SimulationGuard {
    on_start();
    let handle = tokio::spawn(async move {
        tokio::time::sleep(response.delay + TYPING_LEAD).await;
        on_message(response.message);
        on_end();
    });
    SimulationGuard { handle }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::mpsc;

    #[test]
    fn pick_from_empty_is_none() {
        let empty: [&str; 0] = [];
        assert!(pick(&empty).is_none());
        assert_eq!(pick(&["only"]), Some(&"only"));
    }

    #[test]
    fn tips_match_route_prefix() {
        assert_eq!(
            tips_for_page("/crm/leads/42")[0],
            "💡 Drag leads between columns to update their status"
        );
        assert_eq!(tips_for_page("/jobs").len(), 3);
        assert_eq!(tips_for_page("/settings"), &DEFAULT_TIPS[..]);
        assert_eq!(tips_for_page("/"), &DEFAULT_TIPS[..]);
    }

    #[test]
    fn prefix_match_is_plain_string_prefix() {
        // "/administrator" still starts with "/admin"
        assert_eq!(tips_for_page("/administrator"), tips_for_page("/admin"));
    }

    #[test]
    fn random_picks_come_from_tables() {
        for _ in 0..32 {
            assert!(tips_for_page("/payroll-processing").contains(&random_tip("/payroll-processing")));
            assert!(AUTO_RESPONSES.contains(random_auto_response()));
            assert!(SIMULATED_NOTIFICATIONS.contains(random_notification()));
        }
    }

    #[test]
    fn notification_serializes_with_type_tag() {
        let value = serde_json::to_value(SIMULATED_NOTIFICATIONS[2]).unwrap();
        assert_eq!(value["type"], "warning");
        assert_eq!(value["title"], "Timesheet Due");
    }

    #[tokio::test(start_paused = true)]
    async fn response_fires_after_its_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let response = &AUTO_RESPONSES[0];
        let _guard = simulate_response_with(response, move |msg| {
            let _ = tx.send(msg);
        });

        tokio::time::sleep(response.delay - Duration::from_millis(1)).await;
        assert!(rx.try_recv().is_err());
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(rx.try_recv().unwrap(), "✅ Message received!");
    }

    #[tokio::test(start_paused = true)]
    async fn random_response_eventually_fires() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _guard = simulate_response(move |msg| {
            let _ = tx.send(msg);
        });
        let msg = rx.recv().await.unwrap();
        assert!(AUTO_RESPONSES.iter().any(|r| r.message == msg));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_guard_cancels() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let guard = simulate_response(move |_| flag.store(true, Ordering::SeqCst));
        guard.cancel();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn typing_adds_lead_time() {
        let started = Arc::new(AtomicBool::new(false));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let end_tx = tx.clone();
        let response = &AUTO_RESPONSES[5];

        let guard = simulate_typing_with(
            response,
            || started.store(true, Ordering::SeqCst),
            move |msg| {
                let _ = tx.send(msg.to_owned());
            },
            move || {
                let _ = end_tx.send("<end>".to_owned());
            },
        );
        assert!(started.load(Ordering::SeqCst));

        tokio::time::sleep(response.delay).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(TYPING_LEAD + Duration::from_millis(1)).await;
        assert_eq!(rx.try_recv().unwrap(), "📊 Processing...");
        assert_eq!(rx.try_recv().unwrap(), "<end>");
        assert!(guard.is_finished());
    }
}
