//! Application state shared by all handlers.

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use ticket_chain_core::TicketService;

/// Application state shared across all HTTP handlers.
///
/// Cheap to clone: everything is behind an `Arc`.
///
/// # Examples
///
/// ```ignore
/// let service = Arc::new(TicketService::new(store, &StoreLayout::default()));
/// let state = AppState::new(service)
///     .with_admin_token(Some("s3cret".to_string()))
///     .with_metrics(prometheus_handle);
/// let app = build_router(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    service: Arc<TicketService>,
    admin_token: Option<Arc<str>>,
    metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create state around a ticket service. Reset is disabled and `/metrics`
    /// is empty until configured.
    #[must_use]
    pub const fn new(service: Arc<TicketService>) -> Self {
        Self {
            service,
            admin_token: None,
            metrics: None,
        }
    }

    /// Set the bearer token required by administrative routes.
    ///
    /// Surrounding whitespace is ignored. `None` or a blank token disables
    /// those routes.
    #[must_use]
    pub fn with_admin_token(mut self, token: Option<String>) -> Self {
        self.admin_token = token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(Arc::from);
        self
    }

    /// Set the Prometheus handle rendered on `/metrics`.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// The ticket lifecycle service.
    #[must_use]
    pub fn service(&self) -> &TicketService {
        &self.service
    }

    /// The configured admin token, if any.
    #[must_use]
    pub fn admin_token(&self) -> Option<&str> {
        self.admin_token.as_deref()
    }

    /// The Prometheus handle, if metrics are exported.
    #[must_use]
    pub const fn metrics(&self) -> Option<&PrometheusHandle> {
        self.metrics.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticket_chain_testing::{InMemoryDocumentStore, fixtures};

    fn state() -> AppState {
        AppState::new(Arc::new(fixtures::service(&InMemoryDocumentStore::new())))
    }

    #[test]
    fn test_state_is_clone() {
        fn assert_clone<T: Clone + Send + Sync + 'static>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_empty_admin_token_disables_reset() {
        assert_eq!(state().admin_token(), None);
        assert_eq!(state().with_admin_token(Some(String::new())).admin_token(), None);
        assert_eq!(
            state()
                .with_admin_token(Some("s3cret".to_string()))
                .admin_token(),
            Some("s3cret")
        );
    }

    #[test]
    fn test_admin_token_is_trimmed() {
        assert_eq!(
            state()
                .with_admin_token(Some("  s3cret\n".to_string()))
                .admin_token(),
            Some("s3cret")
        );
        assert_eq!(state().with_admin_token(Some("   ".to_string())).admin_token(), None);
    }
}
