use crate::discharge::ArchivePlan;
use crate::error::{BillingError, BillingResult};
use crate::models::*;
use crate::reporting::{grand_total, money, sort_charges, AssignmentLine, PatientCharge, SummaryLine};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

pub mod postgres;

pub use postgres::PostgresWardRepository;

/// Storage interface for ward, catalog, billing and archive data
#[async_trait]
pub trait WardRepository: Send + Sync {
    async fn find_user(&self, name: &str) -> BillingResult<Option<User>>;

    /// Insert a user; `Conflict` when the name is taken
    async fn insert_user(&self, user: NewUser) -> BillingResult<User>;

    /// Live patients ordered by name, with their newest assignment time
    async fn list_patients(&self) -> BillingResult<Vec<PatientListEntry>>;

    async fn insert_patient(&self, patient: NewPatient) -> BillingResult<Patient>;

    async fn find_patient(&self, patient_id: i32) -> BillingResult<Option<Patient>>;

    /// Catalog ordered by name
    async fn list_iv_items(&self) -> BillingResult<Vec<IvItem>>;

    async fn insert_iv_item(&self, item: NewIvItem) -> BillingResult<IvItem>;

    /// Insert the assignment and mark the patient `active`, atomically.
    /// `NotFound` when the patient or the item does not exist.
    async fn create_assignment(&self, assignment: NewAssignment) -> BillingResult<Assignment>;

    /// Remove one live assignment; `false` when no such assignment exists.
    /// The patient's `iv_status` is left as it is.
    async fn delete_assignment(&self, assignment_id: i32) -> BillingResult<bool>;

    /// Live assignment lines of one patient, most recent first
    async fn patient_assignment_lines(&self, patient_id: i32) -> BillingResult<Vec<AssignmentLine>>;

    /// Every live assignment line with patient context, most recent first
    async fn summary_lines(&self) -> BillingResult<Vec<SummaryLine>>;

    /// One running total per live patient (zero-assignment patients included), ordered by name
    async fn patient_charges(&self) -> BillingResult<Vec<PatientCharge>>;

    /// Archive the patient and their assignments, then delete the live rows,
    /// as a single atomic unit. `NotFound` (and no writes) when the patient
    /// does not exist.
    async fn discharge_patient(
        &self,
        patient_id: i32,
        discharged_at: DateTime<Utc>,
    ) -> BillingResult<DischargedPatient>;

    async fn find_discharge(&self, discharged_patient_id: i32) -> BillingResult<Option<DischargeRecord>>;

    async fn is_healthy(&self) -> bool;
}

#[derive(Default)]
struct WardTables {
    users: BTreeMap<i32, User>,
    patients: BTreeMap<i32, Patient>,
    iv_items: BTreeMap<i32, IvItem>,
    assignments: BTreeMap<i32, Assignment>,
    discharged_patients: BTreeMap<i32, DischargedPatient>,
    discharged_assignments: BTreeMap<i32, DischargedAssignment>,
    sequence: i32,
}

impl WardTables {
    fn next_id(&mut self) -> i32 {
        self.sequence += 1;
        self.sequence
    }

    fn line_for(&self, assignment: &Assignment) -> Option<BillingResult<AssignmentLine>> {
        let item = self.iv_items.get(&assignment.iv_item_id)?;
        Some(AssignmentLine::new(
            assignment.id,
            assignment.patient_id,
            item.id,
            item.name.clone(),
            item.price_inr,
            assignment.quantity,
            assignment.assigned_at,
        ))
    }

    fn lines_for_patient(&self, patient_id: i32) -> BillingResult<Vec<AssignmentLine>> {
        let mut lines = self
            .assignments
            .values()
            .filter(|a| a.patient_id == patient_id)
            .filter_map(|a| self.line_for(a))
            .collect::<BillingResult<Vec<_>>>()?;
        lines.sort_by(|a, b| b.assigned_at.cmp(&a.assigned_at).then(b.id.cmp(&a.id)));
        Ok(lines)
    }
}

/// In-memory repository for testing and development
///
/// All tables live behind one mutex, so each operation (discharge included)
/// is atomic with respect to every other.
pub struct InMemoryWardRepository {
    tables: Arc<Mutex<WardTables>>,
}

impl InMemoryWardRepository {
    pub fn new() -> Self {
        Self {
            tables: Arc::new(Mutex::new(WardTables::default())),
        }
    }
}

impl Default for InMemoryWardRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WardRepository for InMemoryWardRepository {
    async fn find_user(&self, name: &str) -> BillingResult<Option<User>> {
        let tables = self.tables.lock();
        Ok(tables.users.values().find(|u| u.name == name).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> BillingResult<User> {
        let mut tables = self.tables.lock();
        if tables.users.values().any(|u| u.name == user.name) {
            return Err(BillingError::Conflict("Username already exists".to_string()));
        }
        let id = tables.next_id();
        let user = User {
            id,
            name: user.name,
            password_hash: user.password_hash,
            role: user.role,
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn list_patients(&self) -> BillingResult<Vec<PatientListEntry>> {
        let tables = self.tables.lock();
        let mut entries: Vec<PatientListEntry> = tables
            .patients
            .values()
            .map(|p| PatientListEntry {
                id: p.id,
                name: p.name.clone(),
                last_iv_assigned: tables
                    .assignments
                    .values()
                    .filter(|a| a.patient_id == p.id)
                    .map(|a| a.assigned_at)
                    .max(),
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(entries)
    }

    async fn insert_patient(&self, patient: NewPatient) -> BillingResult<Patient> {
        let mut tables = self.tables.lock();
        let id = tables.next_id();
        let patient = Patient {
            id,
            name: patient.name,
            dob: patient.dob,
            gender: patient.gender,
            room_number: patient.room_number,
            admission_date: Some(patient.admission_date),
            diagnosis: patient.diagnosis,
            iv_status: IvStatus::Pending,
        };
        tables.patients.insert(id, patient.clone());
        Ok(patient)
    }

    async fn find_patient(&self, patient_id: i32) -> BillingResult<Option<Patient>> {
        Ok(self.tables.lock().patients.get(&patient_id).cloned())
    }

    async fn list_iv_items(&self) -> BillingResult<Vec<IvItem>> {
        let tables = self.tables.lock();
        let mut items: Vec<IvItem> = tables.iv_items.values().cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn insert_iv_item(&self, item: NewIvItem) -> BillingResult<IvItem> {
        let mut tables = self.tables.lock();
        let id = tables.next_id();
        let item = IvItem {
            id,
            name: item.name,
            price_inr: money(item.price_inr),
        };
        tables.iv_items.insert(id, item.clone());
        Ok(item)
    }

    async fn create_assignment(&self, assignment: NewAssignment) -> BillingResult<Assignment> {
        let mut tables = self.tables.lock();
        if !tables.patients.contains_key(&assignment.patient_id) {
            return Err(BillingError::not_found("Patient"));
        }
        if !tables.iv_items.contains_key(&assignment.iv_item_id) {
            return Err(BillingError::not_found("IV item"));
        }

        let id = tables.next_id();
        let created = Assignment {
            id,
            patient_id: assignment.patient_id,
            iv_item_id: assignment.iv_item_id,
            quantity: assignment.quantity,
            assigned_at: Utc::now(),
        };
        tables.assignments.insert(id, created.clone());
        if let Some(patient) = tables.patients.get_mut(&assignment.patient_id) {
            patient.iv_status = IvStatus::Active;
        }
        Ok(created)
    }

    async fn delete_assignment(&self, assignment_id: i32) -> BillingResult<bool> {
        Ok(self.tables.lock().assignments.remove(&assignment_id).is_some())
    }

    async fn patient_assignment_lines(&self, patient_id: i32) -> BillingResult<Vec<AssignmentLine>> {
        self.tables.lock().lines_for_patient(patient_id)
    }

    async fn summary_lines(&self) -> BillingResult<Vec<SummaryLine>> {
        let tables = self.tables.lock();
        let mut assignments: Vec<&Assignment> = tables.assignments.values().collect();
        assignments.sort_by(|a, b| b.assigned_at.cmp(&a.assigned_at).then(b.id.cmp(&a.id)));

        assignments
            .into_iter()
            .filter_map(|a| {
                let patient = tables.patients.get(&a.patient_id)?;
                let item = tables.iv_items.get(&a.iv_item_id)?;
                Some(SummaryLine::new(
                    patient.name.clone(),
                    patient.room_number.clone(),
                    item.name.clone(),
                    item.price_inr,
                    a.quantity,
                    a.assigned_at,
                ))
            })
            .collect()
    }

    async fn patient_charges(&self) -> BillingResult<Vec<PatientCharge>> {
        let tables = self.tables.lock();
        let mut charges = tables
            .patients
            .values()
            .map(|p| -> BillingResult<PatientCharge> {
                let lines = tables.lines_for_patient(p.id)?;
                Ok(PatientCharge {
                    id: p.id,
                    name: p.name.clone(),
                    total_amount: grand_total(lines.iter().map(|l| l.total))?,
                })
            })
            .collect::<BillingResult<Vec<_>>>()?;
        sort_charges(&mut charges);
        Ok(charges)
    }

    async fn discharge_patient(
        &self,
        patient_id: i32,
        discharged_at: DateTime<Utc>,
    ) -> BillingResult<DischargedPatient> {
        let mut tables = self.tables.lock();

        let patient = tables
            .patients
            .get(&patient_id)
            .cloned()
            .ok_or_else(|| BillingError::not_found("Patient"))?;
        let lines = tables.lines_for_patient(patient_id)?;
        let plan = ArchivePlan::prepare(patient, &lines, discharged_at)?;

        let archive_id = tables.next_id();
        let discharged = plan.discharged_patient(archive_id);
        tables.discharged_patients.insert(archive_id, discharged.clone());

        for draft in plan.assignments {
            let id = tables.next_id();
            tables
                .discharged_assignments
                .insert(id, draft.into_archived(id, archive_id));
        }

        tables.assignments.retain(|_, a| a.patient_id != patient_id);
        tables.patients.remove(&patient_id);

        Ok(discharged)
    }

    async fn find_discharge(&self, discharged_patient_id: i32) -> BillingResult<Option<DischargeRecord>> {
        let tables = self.tables.lock();
        Ok(tables
            .discharged_patients
            .get(&discharged_patient_id)
            .map(|patient| DischargeRecord {
                patient: patient.clone(),
                assignments: tables
                    .discharged_assignments
                    .values()
                    .filter(|a| a.discharged_patient_id == discharged_patient_id)
                    .cloned()
                    .collect(),
            }))
    }

    async fn is_healthy(&self) -> bool {
        true
    }
}
