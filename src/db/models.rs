use serde::{Deserialize, Serialize};

/// Delivery state of a lead. Transitions only Pending -> Synced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Pending,
    Synced,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadRecord {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_prefix: String,
    pub phone: String,
    pub age: Option<String>,
    pub country: String,
    /// Province from the home-country selector.
    pub province: Option<String>,
    /// Free-text region for other countries.
    pub region: Option<String>,
    pub program: String,
    pub study_level: Option<String>,
    pub consent_given: bool,
    /// Exact legal text shown at submission time. Write-once, kept for audit.
    pub consent_text: String,
    pub created_at: String,
    pub synced: bool,
    pub remote_id: Option<String>,
    pub last_request: Option<String>,
    pub last_response: Option<String>,
}

impl LeadRecord {
    pub fn state(&self) -> SyncState {
        if self.synced {
            SyncState::Synced
        } else {
            SyncState::Pending
        }
    }
}

/// Contact fields of a lead before it is assigned an id. Everything here is
/// write-once: once stored, only the sync columns of the row ever change.
#[derive(Debug, Clone)]
pub struct NewLead {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_prefix: String,
    pub phone: String,
    pub age: Option<String>,
    pub country: String,
    pub province: Option<String>,
    pub region: Option<String>,
    pub program: String,
    pub study_level: Option<String>,
    pub consent_given: bool,
    pub consent_text: String,
    pub created_at: String,
}

/// One entry of the program catalog: display name -> CRM product ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub name: String,
    pub product_id: String,
    pub dedication_id: String,
}
