//! Post-finalize landing page.

use crate::config::InviteConfig;
use crate::domain::InviteAudience;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectPolicy {
    admin_dashboard_path: String,
    standard_dashboard_path: String,
}

impl Default for RedirectPolicy {
    fn default() -> Self {
        Self::from_config(&InviteConfig::default())
    }
}

impl RedirectPolicy {
    pub fn new(admin_dashboard_path: impl Into<String>, standard: impl Into<String>) -> Self {
        Self {
            admin_dashboard_path: admin_dashboard_path.into(),
            standard_dashboard_path: standard.into(),
        }
    }

    pub fn from_config(config: &InviteConfig) -> Self {
        Self::new(config.admin_dashboard_path.clone(), config.standard_dashboard_path.clone())
    }

    pub fn destination(&self, audience: InviteAudience) -> &str {
        match audience {
            InviteAudience::Admin => &self.admin_dashboard_path,
            InviteAudience::Standard => &self.standard_dashboard_path,
        }
    }
}
