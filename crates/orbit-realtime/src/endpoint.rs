//! Push-update endpoint URL construction.

use orbit_core::TenantId;
use orbit_core::constants::{TENANT_QUERY_PARAM, WS_PATH};
use url::Url;

use crate::error::RealtimeError;

/// Where the socket connects: scheme, authority and path, without the
/// per-connect tenant query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    secure: bool,
    authority: String,
    path: String,
}

impl Endpoint {
    /// Derive the endpoint from the web app origin.
    ///
    /// `https`/`wss` select `wss`, `http`/`ws` select `ws`. Any path on
    /// `base_url` is ignored in favour of `path`.
    pub fn new(base_url: &str, path: &str) -> Result<Self, RealtimeError> {
        let invalid = |reason: &str| RealtimeError::InvalidEndpoint {
            url: base_url.to_owned(),
            reason: reason.to_owned(),
        };

        let url = Url::parse(base_url).map_err(|e| invalid(&e.to_string()))?;
        let secure = match url.scheme() {
            "https" | "wss" => true,
            "http" | "ws" => false,
            _ => return Err(invalid("unsupported scheme")),
        };
        let host = url.host_str().ok_or_else(|| invalid("missing host"))?;
        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_owned(),
        };
        let path = if path.starts_with('/') {
            path.to_owned()
        } else {
            format!("/{path}")
        };

        Ok(Self {
            secure,
            authority,
            path,
        })
    }

    /// Endpoint at the default `/ws` path.
    pub fn from_origin(base_url: &str) -> Result<Self, RealtimeError> {
        Self::new(base_url, WS_PATH)
    }

    /// Whether the socket uses `wss`.
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// `{ws|wss}://{host}{path}?tenantId={id}`, with the id percent-encoded.
    pub fn socket_url(&self, tenant: &TenantId) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        format!(
            "{scheme}://{}{}?{TENANT_QUERY_PARAM}={}",
            self.authority,
            self.path,
            urlencoding::encode(tenant.as_str())
        )
    }
}
