//! PostgreSQL-backed ward repository
//!
//! Multi-statement operations run through [`TransactionManager::run`]. The
//! patient row is locked with `SELECT ... FOR UPDATE` before an assignment
//! is added or the patient is discharged, so the two cannot interleave and a
//! second concurrent discharge of the same patient finds no row.

use crate::discharge::ArchivePlan;
use crate::error::{BillingError, BillingResult};
use crate::models::*;
use crate::reporting::{money, AssignmentLine, PatientCharge, SummaryLine};
use crate::repository::WardRepository;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use database_layer::{DatabaseError, DatabasePool, TransactionManager};
use futures::FutureExt;
use rust_decimal::Decimal;
use sqlx::PgConnection;
use tracing::{debug, info};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    name: String,
    password_hash: String,
    role: String,
}

impl TryFrom<UserRow> for User {
    type Error = BillingError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            name: row.name,
            password_hash: row.password_hash,
            role: row.role.parse().map_err(unknown_variant)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PatientRow {
    id: i32,
    name: String,
    dob: NaiveDate,
    gender: Option<String>,
    room_number: Option<String>,
    admission_date: Option<NaiveDate>,
    diagnosis: Option<String>,
    iv_status: String,
}

impl TryFrom<PatientRow> for Patient {
    type Error = BillingError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        Ok(Patient {
            id: row.id,
            name: row.name,
            dob: row.dob,
            gender: row.gender,
            room_number: row.room_number,
            admission_date: row.admission_date,
            diagnosis: row.diagnosis,
            iv_status: row.iv_status.parse().map_err(unknown_variant)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct DischargedPatientRow {
    id: i32,
    original_patient_id: i32,
    name: String,
    dob: NaiveDate,
    gender: Option<String>,
    room_number: Option<String>,
    admission_date: Option<NaiveDate>,
    discharge_date: DateTime<Utc>,
    diagnosis: Option<String>,
    iv_status: String,
    total_amount: Decimal,
}

impl TryFrom<DischargedPatientRow> for DischargedPatient {
    type Error = BillingError;

    fn try_from(row: DischargedPatientRow) -> Result<Self, Self::Error> {
        Ok(DischargedPatient {
            id: row.id,
            original_patient_id: row.original_patient_id,
            name: row.name,
            dob: row.dob,
            gender: row.gender,
            room_number: row.room_number,
            admission_date: row.admission_date,
            discharge_date: row.discharge_date,
            diagnosis: row.diagnosis,
            iv_status: row.iv_status.parse().map_err(unknown_variant)?,
            total_amount: money(row.total_amount),
        })
    }
}

#[derive(sqlx::FromRow)]
struct LineRow {
    id: i32,
    patient_id: i32,
    iv_item_id: i32,
    item_name: String,
    price_inr: Decimal,
    quantity: i32,
    assigned_at: DateTime<Utc>,
}

impl TryFrom<LineRow> for AssignmentLine {
    type Error = BillingError;

    fn try_from(row: LineRow) -> BillingResult<Self> {
        AssignmentLine::new(
            row.id,
            row.patient_id,
            row.iv_item_id,
            row.item_name,
            row.price_inr,
            row.quantity,
            row.assigned_at,
        )
    }
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    patient_name: String,
    room_number: Option<String>,
    item_name: String,
    price_inr: Decimal,
    quantity: i32,
    assigned_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ChargeRow {
    id: i32,
    name: String,
    total_amount: Decimal,
}

fn unknown_variant(err: UnknownVariant) -> BillingError {
    BillingError::Internal(format!("Corrupt row: {}", err))
}

fn conflict_on_unique(err: sqlx::Error, message: &str) -> BillingError {
    let db_err = DatabaseError::from(err);
    if db_err.is_unique_violation() {
        BillingError::Conflict(message.to_string())
    } else {
        BillingError::Database(db_err)
    }
}

async fn fetch_lines(conn: &mut PgConnection, patient_id: i32) -> BillingResult<Vec<AssignmentLine>> {
    let rows: Vec<LineRow> = sqlx::query_as(
        r#"
        SELECT a.id, a.patient_id, a.iv_item_id, i.name AS item_name,
               i.price_inr, a.quantity, a.assigned_at
        FROM patient_iv_assignments a
        JOIN iv_items i ON i.id = a.iv_item_id
        WHERE a.patient_id = $1
        ORDER BY a.assigned_at DESC, a.id DESC
        "#,
    )
    .bind(patient_id)
    .fetch_all(conn)
    .await?;

    rows.into_iter().map(AssignmentLine::try_from).collect()
}

async fn lock_patient(conn: &mut PgConnection, patient_id: i32) -> BillingResult<Option<Patient>> {
    let row: Option<PatientRow> = sqlx::query_as(
        r#"
        SELECT id, name, dob, gender, room_number, admission_date, diagnosis, iv_status
        FROM patients
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(patient_id)
    .fetch_optional(conn)
    .await?;

    row.map(Patient::try_from).transpose()
}

/// PostgreSQL-backed ward repository
#[derive(Clone, Debug)]
pub struct PostgresWardRepository {
    pool: DatabasePool,
    transactions: TransactionManager,
}

impl PostgresWardRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            transactions: TransactionManager::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl WardRepository for PostgresWardRepository {
    async fn find_user(&self, name: &str) -> BillingResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, name, password_hash, role FROM users WHERE name = $1")
                .bind(name)
                .fetch_optional(self.pool.pool())
                .await?;

        row.map(User::try_from).transpose()
    }

    async fn insert_user(&self, user: NewUser) -> BillingResult<User> {
        debug!("Registering user {}", user.name);

        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (name, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING id, name, password_hash, role
            "#,
        )
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(self.pool.pool())
        .await
        .map_err(|e| conflict_on_unique(e, "Username already exists"))?;

        info!(user_id = row.id, "User registered");
        User::try_from(row)
    }

    async fn list_patients(&self) -> BillingResult<Vec<PatientListEntry>> {
        let entries = sqlx::query_as(
            r#"
            SELECT p.id, p.name, MAX(a.assigned_at) AS last_iv_assigned
            FROM patients p
            LEFT JOIN patient_iv_assignments a ON a.patient_id = p.id
            GROUP BY p.id, p.name
            ORDER BY p.name, p.id
            "#,
        )
        .fetch_all(self.pool.pool())
        .await?;

        Ok(entries)
    }

    async fn insert_patient(&self, patient: NewPatient) -> BillingResult<Patient> {
        let row: PatientRow = sqlx::query_as(
            r#"
            INSERT INTO patients (name, dob, gender, room_number, admission_date, diagnosis, iv_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, dob, gender, room_number, admission_date, diagnosis, iv_status
            "#,
        )
        .bind(&patient.name)
        .bind(patient.dob)
        .bind(&patient.gender)
        .bind(&patient.room_number)
        .bind(patient.admission_date)
        .bind(&patient.diagnosis)
        .bind(IvStatus::Pending.as_str())
        .fetch_one(self.pool.pool())
        .await?;

        info!(patient_id = row.id, "Patient admitted");
        Patient::try_from(row)
    }

    async fn find_patient(&self, patient_id: i32) -> BillingResult<Option<Patient>> {
        let row: Option<PatientRow> = sqlx::query_as(
            r#"
            SELECT id, name, dob, gender, room_number, admission_date, diagnosis, iv_status
            FROM patients
            WHERE id = $1
            "#,
        )
        .bind(patient_id)
        .fetch_optional(self.pool.pool())
        .await?;

        row.map(Patient::try_from).transpose()
    }

    async fn list_iv_items(&self) -> BillingResult<Vec<IvItem>> {
        let items: Vec<IvItem> =
            sqlx::query_as("SELECT id, name, price_inr FROM iv_items ORDER BY name, id")
                .fetch_all(self.pool.pool())
                .await?;

        Ok(items
            .into_iter()
            .map(|item| IvItem {
                price_inr: money(item.price_inr),
                ..item
            })
            .collect())
    }

    async fn insert_iv_item(&self, item: NewIvItem) -> BillingResult<IvItem> {
        let created: IvItem = sqlx::query_as(
            "INSERT INTO iv_items (name, price_inr) VALUES ($1, $2) RETURNING id, name, price_inr",
        )
        .bind(&item.name)
        .bind(money(item.price_inr))
        .fetch_one(self.pool.pool())
        .await?;

        info!(iv_item_id = created.id, "IV item added to catalog");
        Ok(IvItem {
            price_inr: money(created.price_inr),
            ..created
        })
    }

    async fn create_assignment(&self, assignment: NewAssignment) -> BillingResult<Assignment> {
        debug!(
            "Assigning item {} x{} to patient {}",
            assignment.iv_item_id, assignment.quantity, assignment.patient_id
        );

        let created = self
            .transactions
            .run(move |conn| {
                async move {
                    if lock_patient(&mut *conn, assignment.patient_id).await?.is_none() {
                        return Err(BillingError::not_found("Patient"));
                    }

                    let item_exists: Option<i32> =
                        sqlx::query_scalar("SELECT id FROM iv_items WHERE id = $1")
                            .bind(assignment.iv_item_id)
                            .fetch_optional(&mut *conn)
                            .await?;
                    if item_exists.is_none() {
                        return Err(BillingError::not_found("IV item"));
                    }

                    let created: Assignment = sqlx::query_as(
                        r#"
                        INSERT INTO patient_iv_assignments (patient_id, iv_item_id, quantity)
                        VALUES ($1, $2, $3)
                        RETURNING id, patient_id, iv_item_id, quantity, assigned_at
                        "#,
                    )
                    .bind(assignment.patient_id)
                    .bind(assignment.iv_item_id)
                    .bind(assignment.quantity)
                    .fetch_one(&mut *conn)
                    .await?;

                    sqlx::query("UPDATE patients SET iv_status = $1 WHERE id = $2")
                        .bind(IvStatus::Active.as_str())
                        .bind(assignment.patient_id)
                        .execute(&mut *conn)
                        .await?;

                    Ok(created)
                }
                .boxed()
            })
            .await?;

        info!(assignment_id = created.id, "IV item assigned");
        Ok(created)
    }

    async fn delete_assignment(&self, assignment_id: i32) -> BillingResult<bool> {
        let result = sqlx::query("DELETE FROM patient_iv_assignments WHERE id = $1")
            .bind(assignment_id)
            .execute(self.pool.pool())
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            info!(assignment_id, "Assignment removed");
        }
        Ok(removed)
    }

    async fn patient_assignment_lines(&self, patient_id: i32) -> BillingResult<Vec<AssignmentLine>> {
        let mut conn = self.pool.pool().acquire().await?;
        fetch_lines(&mut *conn, patient_id).await
    }

    async fn summary_lines(&self) -> BillingResult<Vec<SummaryLine>> {
        let rows: Vec<SummaryRow> = sqlx::query_as(
            r#"
            SELECT p.name AS patient_name, p.room_number, i.name AS item_name,
                   i.price_inr, a.quantity, a.assigned_at
            FROM patient_iv_assignments a
            JOIN patients p ON p.id = a.patient_id
            JOIN iv_items i ON i.id = a.iv_item_id
            ORDER BY a.assigned_at DESC, a.id DESC
            "#,
        )
        .fetch_all(self.pool.pool())
        .await?;

        rows.into_iter()
            .map(|row| {
                SummaryLine::new(
                    row.patient_name,
                    row.room_number,
                    row.item_name,
                    row.price_inr,
                    row.quantity,
                    row.assigned_at,
                )
            })
            .collect()
    }

    async fn patient_charges(&self) -> BillingResult<Vec<PatientCharge>> {
        let rows: Vec<ChargeRow> = sqlx::query_as(
            r#"
            SELECT p.id, p.name,
                   COALESCE(SUM(i.price_inr * a.quantity), 0)::NUMERIC AS total_amount
            FROM patients p
            LEFT JOIN patient_iv_assignments a ON a.patient_id = p.id
            LEFT JOIN iv_items i ON i.id = a.iv_item_id
            GROUP BY p.id, p.name
            ORDER BY p.name, p.id
            "#,
        )
        .fetch_all(self.pool.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| PatientCharge {
                id: row.id,
                name: row.name,
                total_amount: money(row.total_amount),
            })
            .collect())
    }

    async fn discharge_patient(
        &self,
        patient_id: i32,
        discharged_at: DateTime<Utc>,
    ) -> BillingResult<DischargedPatient> {
        info!(patient_id, "Discharging patient");

        self.transactions
            .run(move |conn| {
                async move {
                    let patient = lock_patient(&mut *conn, patient_id)
                        .await?
                        .ok_or_else(|| BillingError::not_found("Patient"))?;
                    let lines = fetch_lines(&mut *conn, patient_id).await?;
                    let plan = ArchivePlan::prepare(patient, &lines, discharged_at)?;

                    let archive_id: i32 = sqlx::query_scalar(
                        r#"
                        INSERT INTO discharged_patients (
                            original_patient_id, name, dob, gender, room_number,
                            admission_date, discharge_date, diagnosis, iv_status, total_amount
                        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                        RETURNING id
                        "#,
                    )
                    .bind(plan.patient.id)
                    .bind(&plan.patient.name)
                    .bind(plan.patient.dob)
                    .bind(&plan.patient.gender)
                    .bind(&plan.patient.room_number)
                    .bind(plan.patient.admission_date)
                    .bind(plan.discharge_date)
                    .bind(&plan.patient.diagnosis)
                    .bind(plan.patient.iv_status.as_str())
                    .bind(plan.total_amount)
                    .fetch_one(&mut *conn)
                    .await?;

                    for draft in &plan.assignments {
                        sqlx::query(
                            r#"
                            INSERT INTO discharged_patient_iv_assignments (
                                discharged_patient_id, iv_item_id, iv_item_name,
                                price_inr, quantity, assigned_at
                            ) VALUES ($1, $2, $3, $4, $5, $6)
                            "#,
                        )
                        .bind(archive_id)
                        .bind(draft.iv_item_id)
                        .bind(&draft.iv_item_name)
                        .bind(draft.price_inr)
                        .bind(draft.quantity)
                        .bind(draft.assigned_at)
                        .execute(&mut *conn)
                        .await?;
                    }

                    sqlx::query("DELETE FROM patient_iv_assignments WHERE patient_id = $1")
                        .bind(patient_id)
                        .execute(&mut *conn)
                        .await?;
                    sqlx::query("DELETE FROM patients WHERE id = $1")
                        .bind(patient_id)
                        .execute(&mut *conn)
                        .await?;

                    debug!(
                        archive_id,
                        archived_assignments = plan.assignments.len(),
                        "Archive rows written"
                    );
                    Ok(plan.discharged_patient(archive_id))
                }
                .boxed()
            })
            .await
    }

    async fn find_discharge(&self, discharged_patient_id: i32) -> BillingResult<Option<DischargeRecord>> {
        let row: Option<DischargedPatientRow> = sqlx::query_as(
            r#"
            SELECT id, original_patient_id, name, dob, gender, room_number,
                   admission_date, discharge_date, diagnosis, iv_status, total_amount
            FROM discharged_patients
            WHERE id = $1
            "#,
        )
        .bind(discharged_patient_id)
        .fetch_optional(self.pool.pool())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let patient = DischargedPatient::try_from(row)?;

        let assignments: Vec<DischargedAssignment> = sqlx::query_as(
            r#"
            SELECT id, discharged_patient_id, iv_item_id, iv_item_name,
                   price_inr, quantity, assigned_at
            FROM discharged_patient_iv_assignments
            WHERE discharged_patient_id = $1
            ORDER BY assigned_at DESC, id DESC
            "#,
        )
        .bind(discharged_patient_id)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(Some(DischargeRecord {
            patient,
            assignments: assignments
                .into_iter()
                .map(|a| DischargedAssignment {
                    price_inr: money(a.price_inr),
                    ..a
                })
                .collect(),
        }))
    }

    async fn is_healthy(&self) -> bool {
        self.pool.is_healthy().await
    }
}
