use super::manager::BrowserError;
use headless_chrome::browser::tab::RequestPausedDecision;
use headless_chrome::browser::transport::{SessionId, Transport};
use headless_chrome::protocol::cdp::Fetch::events::RequestPausedEvent;
use headless_chrome::protocol::cdp::Fetch::{FailRequest, RequestPattern, RequestStage};
use headless_chrome::protocol::cdp::Network::{ErrorReason, ResourceType};
use headless_chrome::Tab;
use std::sync::Arc;

/// Aborts requests of the configured resource types and lets everything
/// else through
#[derive(Debug, Clone)]
pub struct ResourceFilter {
    blocked: Vec<String>,
}

impl ResourceFilter {
    pub fn new(blocked: &[String]) -> Self {
        Self {
            blocked: blocked.iter().map(|t| t.to_lowercase()).collect(),
        }
    }

    /// CDP resource type names are matched case-insensitively (`Font` == `font`)
    pub fn blocks(&self, resource_type: &str) -> bool {
        let resource_type = resource_type.to_lowercase();
        self.blocked.iter().any(|t| *t == resource_type)
    }

    fn resource_type_name(resource_type: &ResourceType) -> String {
        format!("{:?}", resource_type)
    }

    fn decide(&self, event: &RequestPausedEvent) -> RequestPausedDecision {
        let kind = Self::resource_type_name(&event.params.resource_Type);
        if self.blocks(&kind) {
            log::debug!("Blocked {} request: {}", kind, event.params.request.url);
            RequestPausedDecision::Fail(FailRequest {
                request_id: event.params.request_id.clone(),
                error_reason: ErrorReason::BlockedByClient,
            })
        } else {
            RequestPausedDecision::Continue(None)
        }
    }

    /// Route every request of the tab through this filter for the tab's lifetime
    pub fn install(self, tab: &Arc<Tab>) -> Result<(), BrowserError> {
        if self.blocked.is_empty() {
            return Ok(());
        }

        let patterns = vec![RequestPattern {
            url_pattern: Some("*".to_string()),
            resource_Type: None,
            request_stage: Some(RequestStage::Request),
        }];

        tab.enable_fetch(Some(patterns.as_slice()), None)
            .map_err(|e| BrowserError::ConfigurationError(format!("Fetch domain: {}", e)))?;

        tab.enable_request_interception(Arc::new(
            move |_transport: Arc<Transport>, _session_id: SessionId, event: RequestPausedEvent| {
                self.decide(&event)
            },
        ))
        .map_err(|e| BrowserError::ConfigurationError(format!("Request interception: {}", e)))?;

        Ok(())
    }
}
