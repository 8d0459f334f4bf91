//! Discharge workflow
//!
//! A discharge snapshots the patient and every live assignment into the
//! archive, then removes the live rows. [`ArchivePlan`] is the storage
//! independent part: it decides what gets written, and each repository
//! applies it inside its own atomic unit.

use crate::error::BillingResult;
use crate::models::{DischargedAssignment, DischargedPatient, Patient};
use crate::reporting::{grand_total, AssignmentLine};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

pub const DISCHARGE_SUCCESS_MESSAGE: &str = "Patient discharged successfully";

/// Archived copy of one live assignment, before the archive assigns ids
#[derive(Debug, Clone, PartialEq)]
pub struct ArchivedAssignmentDraft {
    pub iv_item_id: i32,
    pub iv_item_name: String,
    pub price_inr: Decimal,
    pub quantity: i32,
    pub assigned_at: DateTime<Utc>,
}

/// Everything a discharge writes to the archive
#[derive(Debug, Clone, PartialEq)]
pub struct ArchivePlan {
    pub patient: Patient,
    pub total_amount: Decimal,
    pub discharge_date: DateTime<Utc>,
    pub assignments: Vec<ArchivedAssignmentDraft>,
}

impl ArchivePlan {
    /// Build the archive contents from the patient row and its live lines.
    ///
    /// Item names and prices are copied by value so later catalog edits
    /// cannot change a closed bill.
    pub fn prepare(
        patient: Patient,
        lines: &[AssignmentLine],
        discharge_date: DateTime<Utc>,
    ) -> BillingResult<Self> {
        let assignments = lines
            .iter()
            .map(|line| ArchivedAssignmentDraft {
                iv_item_id: line.iv_item_id,
                iv_item_name: line.item_name.clone(),
                price_inr: line.price_inr,
                quantity: line.quantity,
                assigned_at: line.assigned_at,
            })
            .collect();

        Ok(Self {
            patient,
            total_amount: grand_total(lines.iter().map(|line| line.total))?,
            discharge_date,
            assignments,
        })
    }

    /// Archived patient row once the archive has assigned `archive_id`
    pub fn discharged_patient(&self, archive_id: i32) -> DischargedPatient {
        DischargedPatient {
            id: archive_id,
            original_patient_id: self.patient.id,
            name: self.patient.name.clone(),
            dob: self.patient.dob,
            gender: self.patient.gender.clone(),
            room_number: self.patient.room_number.clone(),
            admission_date: self.patient.admission_date,
            discharge_date: self.discharge_date,
            diagnosis: self.patient.diagnosis.clone(),
            iv_status: self.patient.iv_status,
            total_amount: self.total_amount,
        }
    }
}

impl ArchivedAssignmentDraft {
    pub fn into_archived(self, id: i32, discharged_patient_id: i32) -> DischargedAssignment {
        DischargedAssignment {
            id,
            discharged_patient_id,
            iv_item_id: self.iv_item_id,
            iv_item_name: self.iv_item_name,
            price_inr: self.price_inr,
            quantity: self.quantity,
            assigned_at: self.assigned_at,
        }
    }
}
