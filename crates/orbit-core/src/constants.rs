//! Storage keys, endpoint defaults, and well-known rooms/events.

use std::time::Duration;

/// Tab-scoped storage key holding the current app mode (`live` / `sandbox`).
pub const MODE_STORAGE_KEY: &str = "orbit_app_mode";

/// Tab-scoped storage key holding the route to return to on sandbox exit.
pub const RETURN_PATH_KEY: &str = "orbit_sandbox_return_path";

/// Local (durable) storage key holding the tenant identifier.
pub const TENANT_ID_KEY: &str = "tenantId";

/// URL query parameter that overrides the stored mode on initial load.
pub const MODE_QUERY_PARAM: &str = "mode";

/// Path of the push-update endpoint.
pub const WS_PATH: &str = "/ws";

/// Query parameter carrying the tenant identifier on connect.
pub const TENANT_QUERY_PARAM: &str = "tenantId";

/// Fixed delay between a close and the next connect attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_millis(3000);

/// Route used when leaving the sandbox with no recorded return path.
pub const ROOT_ROUTE: &str = "/";

/// Rooms the admin dashboards subscribe to.
pub mod rooms {
    /// Payroll batch status.
    pub const PAYROLL: &str = "payroll";
    /// Worker assignment status.
    pub const ASSIGNMENTS: &str = "assignments";
    /// Wage garnishment status.
    pub const GARNISHMENTS: &str = "garnishments";
    /// Document uploads.
    pub const DOCUMENTS: &str = "documents";
    /// Compliance checks.
    pub const COMPLIANCE: &str = "compliance";

    /// All well-known rooms.
    pub const ALL: [&str; 5] = [PAYROLL, ASSIGNMENTS, GARNISHMENTS, DOCUMENTS, COMPLIANCE];
}

/// Event tags carried on `update` frames.
pub mod events {
    /// Generic status change.
    pub const STATUS_UPDATE: &str = "status-update";
    /// A document finished uploading.
    pub const DOCUMENT_UPLOADED: &str = "document-uploaded";
}
