//! Member records as seen by the invite flow.

use serde::{Deserialize, Serialize};

use crate::domain::{AuthId, CompanyId, InviteAudience};

/// A provisioned user. `company_id` is first-assignment-wins: once set, the
/// invite flow never changes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub auth_id: AuthId,
    pub company_id: Option<CompanyId>,
    /// Role recorded when the member was linked through an invite.
    pub role: Option<InviteAudience>,
}

impl Member {
    pub fn new(auth_id: AuthId) -> Self {
        Self { auth_id, company_id: None, role: None }
    }

    pub fn is_assigned(&self) -> bool {
        self.company_id.is_some()
    }
}
