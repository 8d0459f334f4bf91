pub mod paths;

use crate::handlers::{assignments, auth, billing, discharge, health, iv_items, patients};
use crate::openapi;
use crate::server::WardServer;
use axum::{
    routing::{delete, get, post},
    Router,
};

/// Create all application routes
pub fn create_routes() -> Router<WardServer> {
    Router::new()
        .route(paths::HEALTH, get(health::health_check))
        .route(paths::OPENAPI_JSON, get(openapi::openapi_json))
        .merge(auth_routes())
        .merge(ward_routes())
        .merge(billing_routes())
}

fn auth_routes() -> Router<WardServer> {
    Router::new()
        .route(paths::auth::REGISTER, post(auth::register))
        .route(paths::auth::LOGIN, post(auth::login))
}

fn ward_routes() -> Router<WardServer> {
    Router::new()
        .route(
            paths::ward::PATIENTS,
            get(patients::list_patients).post(patients::admit_patient),
        )
        .route(
            paths::ward::IV_ITEMS,
            get(iv_items::list_iv_items).post(iv_items::add_iv_item),
        )
        .route(paths::ward::ASSIGNMENTS, post(assignments::assign_iv_item))
        .route(paths::ward::ASSIGNMENT_BY_ID, delete(assignments::remove_assignment))
        .route(paths::ward::IV_HISTORY, get(patients::iv_history))
}

fn billing_routes() -> Router<WardServer> {
    Router::new()
        .route(paths::billing::SUMMARY, get(billing::billing_summary))
        .route(paths::billing::PATIENTS, get(billing::patient_charges))
        .route(paths::billing::PATIENT_BY_ID, get(billing::patient_billing))
        .route(paths::billing::DISCHARGE, post(discharge::discharge_patient))
        .route(paths::billing::DISCHARGED_BY_ID, get(discharge::discharged_patient))
}
