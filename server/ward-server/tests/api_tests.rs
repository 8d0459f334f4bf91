//! HTTP API tests over the in-memory repository

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use ward_server::{create_app, WardConfig, WardServer};

struct TestApp {
    app: Router,
}

impl TestApp {
    fn new() -> Self {
        let server = WardServer::in_memory(WardConfig::default()).unwrap();
        Self {
            app: create_app(server),
        }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    async fn admit(&self, name: &str) -> i64 {
        let (status, body) = self
            .post(
                "/api/patients",
                json!({"name": name, "admission_date": "2024-01-01", "room_number": "3A"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    async fn add_item(&self, name: &str, price: &str) -> i64 {
        let (status, body) = self
            .post("/api/iv-items", json!({"name": name, "price_inr": price}))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    async fn assign(&self, patient_id: i64, iv_item_id: i64, quantity: Option<i64>) -> (StatusCode, Value) {
        let mut body = json!({"patient_id": patient_id, "iv_item_id": iv_item_id});
        if let Some(quantity) = quantity {
            body["quantity"] = json!(quantity);
        }
        self.post("/api/patient-iv-assignments", body).await
    }
}

#[tokio::test]
async fn test_health_reports_in_memory_backend() {
    let app = TestApp::new();
    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "in-memory");
}

#[tokio::test]
async fn test_asha_scenario_end_to_end() {
    let app = TestApp::new();
    let asha = app.admit("Asha").await;
    let saline = app.add_item("Saline 500ml", "50").await;
    let dextrose = app.add_item("Dextrose", "80").await;

    assert_eq!(app.assign(asha, saline, Some(2)).await.0, StatusCode::OK);
    assert_eq!(app.assign(asha, dextrose, None).await.0, StatusCode::OK);

    let (status, bill) = app.get(&format!("/api/billing/patient/{}", asha)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bill["total_amount"], "180.00");
    assert_eq!(bill["patient"]["iv_status"], "active");
    assert_eq!(bill["assignments"].as_array().unwrap().len(), 2);

    let (status, receipt) = app
        .send(Method::POST, &format!("/api/patients/{}/discharge", asha), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["message"], "Patient discharged successfully");
    let archive_id = receipt["dischargedPatientId"].as_i64().unwrap();

    let (status, record) = app.get(&format!("/api/discharged-patients/{}", archive_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["patient"]["total_amount"], "180.00");
    assert_eq!(record["assignments"].as_array().unwrap().len(), 2);

    let (_, charges) = app.get("/api/billing/patients").await;
    assert!(charges.as_array().unwrap().is_empty());

    let (status, again) = app
        .send(Method::POST, &format!("/api/patients/{}/discharge", asha), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(again["error_type"], "not_found");
}

#[tokio::test]
async fn test_unknown_patient_bill_is_empty_not_an_error() {
    let app = TestApp::new();
    let (status, bill) = app.get("/api/billing/patient/9999").await;

    assert_eq!(status, StatusCode::OK);
    assert!(bill["patient"].is_null());
    assert_eq!(bill["assignments"], json!([]));
    assert_eq!(bill["total_amount"], "0.00");
}

#[tokio::test]
async fn test_discharge_unknown_patient_is_404() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::POST, "/api/patients/777/discharge", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Patient not found");
    assert!(body["error_id"].is_string());
}

#[tokio::test]
async fn test_idle_patient_total_is_zero() {
    let app = TestApp::new();
    app.admit("Zoya").await;

    let (status, charges) = app.get("/api/billing/patients").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(charges[0]["name"], "Zoya");
    assert_eq!(charges[0]["total_amount"], "0.00");
}

#[tokio::test]
async fn test_quantity_validation() {
    let app = TestApp::new();
    let patient = app.admit("Meera").await;
    let item = app.add_item("Ringer Lactate", "120.50").await;

    let (status, body) = app.assign(patient, item, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quantity"], 1);

    for bad in [0, -1] {
        let (status, body) = app.assign(patient, item, Some(bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_type"], "validation_error");
    }
}

#[tokio::test]
async fn test_assignment_to_unknown_item_is_404() {
    let app = TestApp::new();
    let patient = app.admit("Dev").await;

    let (status, _) = app.assign(patient, 4242, Some(1)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_assignment_keeps_status() {
    let app = TestApp::new();
    let patient = app.admit("Kiran").await;
    let item = app.add_item("Saline 500ml", "50.00").await;
    let (_, assignment) = app.assign(patient, item, Some(1)).await;
    let assignment_id = assignment["id"].as_i64().unwrap();

    let uri = format!("/api/iv-assignment/{}", assignment_id);
    let (status, body) = app.send(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Assignment deleted successfully");

    let (_, bill) = app.get(&format!("/api/billing/patient/{}", patient)).await;
    assert_eq!(bill["patient"]["iv_status"], "active");
    assert_eq!(bill["total_amount"], "0.00");

    let (status, _) = app.send(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_summary_and_patient_list() {
    let app = TestApp::new();
    let asha = app.admit("Asha").await;
    app.admit("Bala").await;
    let item = app.add_item("Dextrose", "80").await;
    app.assign(asha, item, Some(3)).await;

    let (status, summary) = app.get("/api/billing/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_revenue"], "240.00");
    assert_eq!(summary["assignments"][0]["patient_name"], "Asha");
    assert_eq!(summary["assignments"][0]["total"], "240.00");

    let (_, patients) = app.get("/api/patients").await;
    assert_eq!(patients[0]["name"], "Asha");
    assert!(patients[0]["last_iv_assigned"].is_string());
    assert!(patients[1]["last_iv_assigned"].is_null());

    let (status, history) = app.get(&format!("/api/nurse/patient/{}/iv-history", asha)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["assignments"][0]["item_name"], "Dextrose");
}

#[tokio::test]
async fn test_patient_dob_falls_back_to_admission_date() {
    let app = TestApp::new();
    let (status, patient) = app
        .post("/api/patients", json!({"name": "Nila", "admission_date": "2024-02-10"}))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(patient["dob"], "2024-02-10");
    assert_eq!(patient["iv_status"], "pending");
}

#[tokio::test]
async fn test_intake_requires_admission_date() {
    let app = TestApp::new();
    let (status, body) = app.post("/api/patients", json!({"name": "Nila"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_error");
}

#[tokio::test]
async fn test_item_price_must_be_positive() {
    let app = TestApp::new();
    let (status, _) = app
        .post("/api/iv-items", json!({"name": "Free sample", "price_inr": 0}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, items) = app.get("/api/iv-items").await;
    assert_eq!(items, json!([]));
}

#[tokio::test]
async fn test_item_price_out_of_column_range_is_rejected() {
    let app = TestApp::new();

    for price in [json!("10000000000000000000000000000"), json!("100000000"), json!("12.345")] {
        let (status, body) = app
            .post("/api/iv-items", json!({"name": "Bulk", "price_inr": price}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", price);
        assert_eq!(body["error_type"], "validation_error");
    }

    let (_, items) = app.get("/api/iv-items").await;
    assert_eq!(items, json!([]));
}

#[tokio::test]
async fn test_largest_bill_stays_readable_and_dischargeable() {
    let app = TestApp::new();
    let patient = app.admit("Asha").await;
    let item = app.add_item("Top shelf", "99999999.99").await;

    assert_eq!(app.assign(patient, item, Some(10_000)).await.0, StatusCode::OK);
    let (status, _) = app.assign(patient, item, Some(10_001)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, bill) = app.get(&format!("/api/billing/patient/{}", patient)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bill["total_amount"], "999999999900.00");

    let (status, receipt) = app
        .send(Method::POST, &format!("/api/patients/{}/discharge", patient), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let archive_id = receipt["dischargedPatientId"].as_i64().unwrap();
    let (_, record) = app.get(&format!("/api/discharged-patients/{}", archive_id)).await;
    assert_eq!(record["patient"]["total_amount"], "999999999900.00");
}

#[tokio::test]
async fn test_intake_field_lengths_are_enforced() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/patients",
            json!({"name": "Nila", "admission_date": "2024-02-10", "room_number": "R".repeat(21)}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "room_number must be at most 20 characters");

    let (status, _) = app
        .post(
            "/api/patients",
            json!({"name": "Nila", "admission_date": "2024-02-10", "gender": "G".repeat(11)}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, patients) = app.get("/api/patients").await;
    assert_eq!(patients, json!([]));
}

#[tokio::test]
async fn test_register_and_login() {
    let app = TestApp::new();

    let (status, body) = app
        .post("/api/register", json!({"username": "billy", "password": "pw", "role": "biller"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Registration successful");

    let (status, body) = app
        .post("/api/login", json!({"username": "billy", "password": "pw"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "biller");

    let (status, _) = app
        .post("/api/login", json!({"username": "billy", "password": "wrong"}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post("/api/register", json!({"username": "billy", "password": "pw2"}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_malformed_json_is_validation_error() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/patient-iv-assignments")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_numeric_id_is_validation_error() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/billing/patient/abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_error");
}

#[tokio::test]
async fn test_openapi_document_lists_discharge() {
    let app = TestApp::new();
    let (status, doc) = app.get("/api-docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/patients/{id}/discharge"]["post"].is_object());
}
