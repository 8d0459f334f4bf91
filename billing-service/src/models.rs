use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Character limit of name columns (`VARCHAR(255)`)
pub const MAX_NAME_CHARS: usize = 255;
pub const MAX_GENDER_CHARS: usize = 10;
pub const MAX_ROOM_NUMBER_CHARS: usize = 20;

/// Raised when a stored enum column holds a value this build does not know
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Staff role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Admits patients and assigns IV items
    #[default]
    Nurse,
    /// Views charges, corrects assignments and discharges patients
    Biller,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Nurse => "nurse",
            Role::Biller => "biller",
        }
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nurse" => Ok(Role::Nurse),
            "biller" => Ok(Role::Biller),
            other => Err(UnknownVariant {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// IV status of an admitted patient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum IvStatus {
    /// Admitted, nothing assigned yet
    #[default]
    Pending,
    /// At least one IV item has been assigned
    Active,
}

impl IvStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IvStatus::Pending => "pending",
            IvStatus::Active => "active",
        }
    }
}

impl FromStr for IvStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(IvStatus::Pending),
            "active" => Ok(IvStatus::Active),
            other => Err(UnknownVariant {
                kind: "iv_status",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for IvStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registered staff member
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub name: String,
    /// Argon2id PHC string
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub password_hash: String,
    pub role: Role,
}

/// Admitted ward patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Patient {
    pub id: i32,
    pub name: String,
    pub dob: NaiveDate,
    pub gender: Option<String>,
    pub room_number: Option<String>,
    pub admission_date: Option<NaiveDate>,
    pub diagnosis: Option<String>,
    pub iv_status: IvStatus,
}

/// Validated intake data for a new patient
#[derive(Debug, Clone)]
pub struct NewPatient {
    pub name: String,
    pub dob: NaiveDate,
    pub gender: Option<String>,
    pub room_number: Option<String>,
    pub admission_date: NaiveDate,
    pub diagnosis: Option<String>,
}

/// Row of the nurse patient list
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema, sqlx::FromRow)]
pub struct PatientListEntry {
    pub id: i32,
    pub name: String,
    /// Timestamp of the newest live assignment, if any
    pub last_iv_assigned: Option<DateTime<Utc>>,
}

/// Catalog entry for a billable IV fluid or medication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct IvItem {
    pub id: i32,
    pub name: String,
    /// Unit price, two fractional digits
    #[schema(value_type = String, example = "50.00")]
    pub price_inr: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewIvItem {
    pub name: String,
    pub price_inr: Decimal,
}

/// Live assignment row as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Assignment {
    pub id: i32,
    pub patient_id: i32,
    pub iv_item_id: i32,
    pub quantity: i32,
    pub assigned_at: DateTime<Utc>,
}

/// Validated request to give an IV item to a patient
#[derive(Debug, Clone, Copy)]
pub struct NewAssignment {
    pub patient_id: i32,
    pub iv_item_id: i32,
    pub quantity: i32,
}

/// Archived patient written once at discharge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DischargedPatient {
    pub id: i32,
    /// Id the patient had in the live table; not a foreign key
    pub original_patient_id: i32,
    pub name: String,
    pub dob: NaiveDate,
    pub gender: Option<String>,
    pub room_number: Option<String>,
    pub admission_date: Option<NaiveDate>,
    pub discharge_date: DateTime<Utc>,
    pub diagnosis: Option<String>,
    pub iv_status: IvStatus,
    /// Bill frozen at discharge time
    #[schema(value_type = String, example = "180.00")]
    pub total_amount: Decimal,
}

/// Archived assignment; item name and price are copies, not references
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct DischargedAssignment {
    pub id: i32,
    pub discharged_patient_id: i32,
    pub iv_item_id: i32,
    pub iv_item_name: String,
    #[schema(value_type = String, example = "50.00")]
    pub price_inr: Decimal,
    pub quantity: i32,
    pub assigned_at: DateTime<Utc>,
}

/// Full archival record of one discharge
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DischargeRecord {
    pub patient: DischargedPatient,
    pub assignments: Vec<DischargedAssignment>,
}

/// Result of a successful discharge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DischargeReceipt {
    pub message: String,
    #[serde(rename = "dischargedPatientId")]
    pub discharged_patient_id: i32,
}
