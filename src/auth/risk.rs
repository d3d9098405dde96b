//! Risk screen boundary
//!
//! Registration may consult an external blocklist service before creating
//! a user. Only the boundary is modeled here; real integrations implement
//! `RiskScreen`.

use std::future::Future;

/// Outcome of screening an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskVerdict {
    pub flagged: bool,
    pub reason: Option<String>,
}

impl RiskVerdict {
    pub fn clear() -> Self {
        Self {
            flagged: false,
            reason: None,
        }
    }

    pub fn flagged(reason: impl Into<String>) -> Self {
        Self {
            flagged: true,
            reason: Some(reason.into()),
        }
    }
}

/// The screen itself failed (network, upstream outage).
#[derive(Debug, thiserror::Error)]
#[error("risk screen failed: {0}")]
pub struct RiskError(pub String);

/// External risk-check collaborator consulted during registration.
pub trait RiskScreen: Send + Sync {
    fn screen(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<RiskVerdict, RiskError>> + Send;
}

/// Policy-keyed screen: flags any email containing one of the configured
/// substrings. Stands in for the upstream blocklist lookup in this demo.
#[derive(Debug, Clone, Default)]
pub struct DenyPatternScreen {
    patterns: Vec<String>,
}

impl DenyPatternScreen {
    pub fn new(patterns: Vec<String>) -> Self {
        Self { patterns }
    }
}

impl RiskScreen for DenyPatternScreen {
    async fn screen(&self, email: &str) -> Result<RiskVerdict, RiskError> {
        let email = email.to_lowercase();
        for pattern in &self.patterns {
            if email.contains(&pattern.to_lowercase()) {
                return Ok(RiskVerdict::flagged(format!(
                    "email matches blocked pattern '{pattern}'"
                )));
            }
        }
        Ok(RiskVerdict::clear())
    }
}
