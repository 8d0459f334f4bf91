use crate::credentials::CredentialHasher;
use crate::discharge::DISCHARGE_SUCCESS_MESSAGE;
use crate::error::{BillingError, BillingResult};
use crate::models::*;
use crate::reporting::{
    check_quantity, check_unit_price, BillingSummary, IvHistory, PatientBilling, PatientCharge,
};
use crate::repository::WardRepository;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// Quantity recorded when an assignment request leaves it out
pub const DEFAULT_QUANTITY: i32 = 1;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// `Validation` when `value` holds more than `max` characters
fn check_length(field: &str, value: Option<&str>, max: usize) -> BillingResult<()> {
    match value {
        Some(value) if value.chars().count() > max => Err(BillingError::validation(format!(
            "{} must be at most {} characters",
            field, max
        ))),
        _ => Ok(()),
    }
}

/// Ward billing operations over a [`WardRepository`]
#[derive(Clone)]
pub struct BillingService {
    repo: Arc<dyn WardRepository>,
    hasher: CredentialHasher,
}

impl BillingService {
    pub fn new(repo: Arc<dyn WardRepository>) -> BillingResult<Self> {
        Ok(Self {
            repo,
            hasher: CredentialHasher::new()?,
        })
    }

    pub async fn is_healthy(&self) -> bool {
        self.repo.is_healthy().await
    }

    /// Register a staff member; role defaults to nurse
    pub async fn register(&self, username: &str, password: &str, role: Option<Role>) -> BillingResult<User> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(BillingError::validation("username and password are required"));
        }
        check_length("username", Some(username), MAX_NAME_CHARS)?;
        if self.repo.find_user(username).await?.is_some() {
            return Err(BillingError::Conflict("Username already exists".to_string()));
        }

        let password_hash = self.hasher.hash_password(password).await?;
        let user = self
            .repo
            .insert_user(NewUser {
                name: username.to_string(),
                password_hash,
                role: role.unwrap_or_default(),
            })
            .await?;

        info!(user_id = user.id, role = %user.role, "Staff member registered");
        Ok(user)
    }

    /// Check credentials and return the user's role.
    ///
    /// Unknown user and wrong password fail with the same message.
    pub async fn login(&self, username: &str, password: &str) -> BillingResult<Role> {
        let Some(user) = self.repo.find_user(username.trim()).await? else {
            warn!("Login attempt for unknown user");
            return Err(BillingError::Authentication(INVALID_CREDENTIALS.to_string()));
        };

        if !self.hasher.verify_password(password, &user.password_hash).await? {
            warn!(user_id = user.id, "Login attempt with wrong password");
            return Err(BillingError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        Ok(user.role)
    }

    pub async fn admit_patient(&self, patient: NewPatient) -> BillingResult<Patient> {
        if patient.name.trim().is_empty() {
            return Err(BillingError::validation("name is required"));
        }
        check_length("name", Some(&patient.name), MAX_NAME_CHARS)?;
        check_length("gender", patient.gender.as_deref(), MAX_GENDER_CHARS)?;
        check_length("room_number", patient.room_number.as_deref(), MAX_ROOM_NUMBER_CHARS)?;

        let patient = self.repo.insert_patient(patient).await?;
        info!(patient_id = patient.id, "Patient admitted");
        Ok(patient)
    }

    pub async fn list_patients(&self) -> BillingResult<Vec<PatientListEntry>> {
        self.repo.list_patients().await
    }

    pub async fn add_iv_item(&self, item: NewIvItem) -> BillingResult<IvItem> {
        if item.name.trim().is_empty() {
            return Err(BillingError::validation("name is required"));
        }
        check_length("name", Some(&item.name), MAX_NAME_CHARS)?;
        let price_inr = check_unit_price(item.price_inr)?;
        self.repo
            .insert_iv_item(NewIvItem { price_inr, ..item })
            .await
    }

    pub async fn list_iv_items(&self) -> BillingResult<Vec<IvItem>> {
        self.repo.list_iv_items().await
    }

    /// Give an IV item to a patient and mark the patient active
    pub async fn assign_iv_item(
        &self,
        patient_id: i32,
        iv_item_id: i32,
        quantity: Option<i32>,
    ) -> BillingResult<Assignment> {
        let quantity = check_quantity(quantity.unwrap_or(DEFAULT_QUANTITY))?;

        let assignment = self
            .repo
            .create_assignment(NewAssignment {
                patient_id,
                iv_item_id,
                quantity,
            })
            .await?;

        info!(
            assignment_id = assignment.id,
            patient_id, iv_item_id, quantity, "IV item assigned"
        );
        Ok(assignment)
    }

    /// Remove a single assignment; the patient's `iv_status` stays as it is
    pub async fn remove_assignment(&self, assignment_id: i32) -> BillingResult<()> {
        if !self.repo.delete_assignment(assignment_id).await? {
            return Err(BillingError::not_found("Assignment"));
        }
        Ok(())
    }

    pub async fn billing_summary(&self) -> BillingResult<BillingSummary> {
        let lines = self.repo.summary_lines().await?;
        BillingSummary::from_lines(lines)
    }

    pub async fn patient_charges(&self) -> BillingResult<Vec<PatientCharge>> {
        self.repo.patient_charges().await
    }

    /// Itemized bill; an unknown patient yields an empty bill, not an error
    pub async fn patient_billing(&self, patient_id: i32) -> BillingResult<PatientBilling> {
        let Some(patient) = self.repo.find_patient(patient_id).await? else {
            return Ok(PatientBilling::empty());
        };
        let lines = self.repo.patient_assignment_lines(patient_id).await?;
        PatientBilling::new(Some(patient), lines)
    }

    pub async fn nurse_iv_history(&self, patient_id: i32) -> BillingResult<IvHistory> {
        let patient = self
            .repo
            .find_patient(patient_id)
            .await?
            .ok_or_else(|| BillingError::not_found("Patient"))?;
        let lines = self.repo.patient_assignment_lines(patient_id).await?;

        Ok(IvHistory {
            patient,
            assignments: lines.into_iter().map(Into::into).collect(),
        })
    }

    /// Archive the patient with their bill and remove the live rows
    pub async fn discharge_patient(&self, patient_id: i32) -> BillingResult<DischargeReceipt> {
        let archived = self.repo.discharge_patient(patient_id, Utc::now()).await?;

        info!(
            patient_id,
            discharged_patient_id = archived.id,
            total_amount = %archived.total_amount,
            "Patient discharged"
        );
        Ok(DischargeReceipt {
            message: DISCHARGE_SUCCESS_MESSAGE.to_string(),
            discharged_patient_id: archived.id,
        })
    }

    pub async fn discharged_patient(&self, discharged_patient_id: i32) -> BillingResult<DischargeRecord> {
        self.repo
            .find_discharge(discharged_patient_id)
            .await?
            .ok_or_else(|| BillingError::not_found("Discharged patient"))
    }
}

impl std::fmt::Debug for BillingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillingService").finish_non_exhaustive()
    }
}
