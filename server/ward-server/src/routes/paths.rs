//! Route path constants
//!
//! utoipa `#[path(...)]` attributes need string literals, so handlers repeat
//! these paths in their annotations; keep the two in step.

pub const HEALTH: &str = "/health";
pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";

/// Staff accounts
pub mod auth {
    pub const REGISTER: &str = "/api/register";
    pub const LOGIN: &str = "/api/login";
}

/// Nurse-facing patient and catalog endpoints
pub mod ward {
    pub const PATIENTS: &str = "/api/patients";
    pub const IV_ITEMS: &str = "/api/iv-items";
    pub const ASSIGNMENTS: &str = "/api/patient-iv-assignments";
    pub const ASSIGNMENT_BY_ID: &str = "/api/iv-assignment/:id";
    pub const IV_HISTORY: &str = "/api/nurse/patient/:id/iv-history";
}

/// Biller-facing endpoints
pub mod billing {
    pub const SUMMARY: &str = "/api/billing/summary";
    pub const PATIENTS: &str = "/api/billing/patients";
    pub const PATIENT_BY_ID: &str = "/api/billing/patient/:id";
    pub const DISCHARGE: &str = "/api/patients/:id/discharge";
    pub const DISCHARGED_BY_ID: &str = "/api/discharged-patients/:id";
}
