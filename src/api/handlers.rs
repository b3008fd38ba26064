//! HTTP request handlers for the payroll API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Form, Json, Router,
    extract::{
        Path, Query, State,
        rejection::{FormRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{RecordFilter, calculate_payroll, summarize_payroll};
use crate::error::{PayrollError, PayrollResult};
use crate::export::{PDF_CONTENT_TYPE, Payslip};
use crate::identity::{Account, AccountId};
use crate::models::{PayrollReport, WageRecord};
use crate::store::UpsertOutcome;

use super::request::{AddRecordForm, CredentialsForm, RemoveRecordForm};
use super::response::{
    AccountResponse, ApiError, ApiErrorResponse, RecordListResponse, RecordRemovedResponse,
    RecordSavedResponse, SessionResponse,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/logout", get(logout_handler).post(logout_handler))
        .route("/add", post(add_handler))
        .route("/remove", post(remove_handler))
        .route("/list", get(list_handler))
        .route("/report", get(report_handler))
        .route("/pdf/:name", get(pdf_handler))
        .with_state(state)
}

/// Logs a failed request and converts the error into its JSON response.
fn failure(correlation_id: Uuid, error: PayrollError) -> Response {
    if error.is_validation() {
        warn!(correlation_id = %correlation_id, error = %error, "Request rejected");
    } else {
        warn!(correlation_id = %correlation_id, error = %error, "Request failed");
    }
    ApiErrorResponse::from(error).into_response()
}

fn form_rejected(correlation_id: Uuid, rejection: FormRejection) -> Response {
    let body_text = rejection.body_text();
    warn!(
        correlation_id = %correlation_id,
        error = %body_text,
        "Form data error"
    );
    let status = match rejection.status() {
        StatusCode::UNSUPPORTED_MEDIA_TYPE => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        _ => StatusCode::BAD_REQUEST,
    };
    ApiErrorResponse::new(status, ApiError::malformed_form(body_text)).into_response()
}

fn query_rejected(correlation_id: Uuid, rejection: QueryRejection) -> Response {
    let body_text = rejection.body_text();
    warn!(
        correlation_id = %correlation_id,
        error = %body_text,
        "Query string error"
    );
    ApiErrorResponse::new(StatusCode::BAD_REQUEST, ApiError::malformed_query(body_text))
        .into_response()
}

fn signed_in_user(state: &AppState, jar: &CookieJar) -> PayrollResult<AccountId> {
    state.sessions().resolve(jar)?.require_user()
}

/// Handler for GET / endpoint.
///
/// Confirms the caller holds a signed-in session.
async fn index_handler(State(state): State<AppState>, jar: CookieJar) -> Response {
    let correlation_id = Uuid::new_v4();

    match signed_in_user(&state, &jar) {
        Ok(account_id) => {
            info!(
                correlation_id = %correlation_id,
                account_id = %account_id,
                "Session resolved"
            );
            Json(SessionResponse {
                authenticated: true,
                account_id: Some(account_id),
            })
            .into_response()
        }
        Err(err) => failure(correlation_id, err),
    }
}

/// Handler for POST /register endpoint.
async fn register_handler(
    State(state): State<AppState>,
    payload: Result<Form<CredentialsForm>, FormRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing registration request");

    let form = match payload {
        Ok(Form(form)) => form,
        Err(rejection) => return form_rejected(correlation_id, rejection),
    };

    let registered = match form.into_parts() {
        Ok((email, password)) => {
            state
                .with_identity(move |identity| identity.create_account(&email, &password))
                .await
        }
        Err(err) => Err(err),
    };

    match registered {
        Ok(account) => {
            info!(
                correlation_id = %correlation_id,
                account_id = %account.id,
                "Account registered"
            );
            (StatusCode::CREATED, Json(AccountResponse::from(account))).into_response()
        }
        Err(err) => failure(correlation_id, err),
    }
}

/// Handler for POST /login endpoint.
///
/// Checks the submitted credentials, starts a session for the account and
/// hands its token back in a cookie.
async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Form<CredentialsForm>, FormRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing login request");

    let form = match payload {
        Ok(Form(form)) => form,
        Err(rejection) => return form_rejected(correlation_id, rejection),
    };

    match sign_in(&state, form).await {
        Ok((account, token)) => {
            info!(
                correlation_id = %correlation_id,
                account_id = %account.id,
                "Signed in"
            );
            (
                jar.add(state.sessions().session_cookie(token)),
                Json(AccountResponse::from(account)),
            )
                .into_response()
        }
        Err(err) => failure(correlation_id, err),
    }
}

async fn sign_in(state: &AppState, form: CredentialsForm) -> PayrollResult<(Account, Uuid)> {
    let (email, password) = form.into_parts()?;
    let account = state
        .with_identity(move |identity| identity.verify_credentials(&email, &password))
        .await?;
    let token = state.sessions().start(account.id)?;
    Ok((account, token))
}

/// Handler for GET and POST /logout endpoint.
async fn logout_handler(State(state): State<AppState>, jar: CookieJar) -> Response {
    let correlation_id = Uuid::new_v4();

    match state.sessions().end(&jar) {
        Ok(ended) => {
            info!(correlation_id = %correlation_id, ended, "Signed out");
            (
                jar.remove(state.sessions().removal_cookie()),
                Json(SessionResponse {
                    authenticated: false,
                    account_id: None,
                }),
            )
                .into_response()
        }
        Err(err) => failure(correlation_id, err),
    }
}

/// Handler for POST /add endpoint.
///
/// Validates the submitted record and writes it under its name, replacing
/// any record already stored there.
async fn add_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Form<AddRecordForm>, FormRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing add request");

    let account_id = match signed_in_user(&state, &jar) {
        Ok(account_id) => account_id,
        Err(err) => return failure(correlation_id, err),
    };
    let form = match payload {
        Ok(Form(form)) => form,
        Err(rejection) => return form_rejected(correlation_id, rejection),
    };

    add_record(&state, form, account_id, correlation_id)
        .await
        .unwrap_or_else(|err| failure(correlation_id, err))
}

async fn add_record(
    state: &AppState,
    form: AddRecordForm,
    account_id: AccountId,
    correlation_id: Uuid,
) -> PayrollResult<Response> {
    let record = WageRecord::try_from(form)?;
    let saved = record.clone();
    let outcome = state.with_store(move |store| store.upsert(saved)).await?;

    info!(
        correlation_id = %correlation_id,
        account_id = %account_id,
        employee = %record.name,
        outcome = ?outcome,
        "Wage record saved"
    );

    let status = match outcome {
        UpsertOutcome::Inserted => StatusCode::CREATED,
        UpsertOutcome::Replaced => StatusCode::OK,
    };
    Ok((status, Json(RecordSavedResponse { outcome, record })).into_response())
}

/// Handler for POST /remove endpoint.
async fn remove_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Form<RemoveRecordForm>, FormRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing remove request");

    let account_id = match signed_in_user(&state, &jar) {
        Ok(account_id) => account_id,
        Err(err) => return failure(correlation_id, err),
    };
    let form = match payload {
        Ok(Form(form)) => form,
        Err(rejection) => return form_rejected(correlation_id, rejection),
    };

    match remove_record(&state, form).await {
        Ok((removed, name)) => {
            info!(
                correlation_id = %correlation_id,
                account_id = %account_id,
                employee = %name,
                removed,
                "Wage record removed"
            );
            Json(RecordRemovedResponse { name, removed }).into_response()
        }
        Err(err) => failure(correlation_id, err),
    }
}

async fn remove_record(state: &AppState, form: RemoveRecordForm) -> PayrollResult<(bool, String)> {
    let name = form.into_name()?;
    let key = name.clone();
    let removed = state.with_store(move |store| store.delete(&key)).await?;
    Ok((removed, name))
}

/// Handler for GET /list endpoint.
///
/// Returns the stored records narrowed by the query-string filter.
async fn list_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    query: Result<Query<RecordFilter>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing list request");

    if let Err(err) = signed_in_user(&state, &jar) {
        return failure(correlation_id, err);
    }
    let filter = match query {
        Ok(Query(filter)) => filter,
        Err(rejection) => return query_rejected(correlation_id, rejection),
    };

    match state.with_store(|store| store.list()).await {
        Ok(records) => {
            let employees = filter.apply(records);
            info!(
                correlation_id = %correlation_id,
                filtered = !filter.is_unconstrained(),
                count = employees.len(),
                "Wage records listed"
            );
            Json(RecordListResponse::from(employees)).into_response()
        }
        Err(err) => failure(correlation_id, err),
    }
}

/// Handler for GET /report endpoint.
///
/// Computes payroll for every record the filter selects and returns the
/// per-employee breakdowns with their totals.
async fn report_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    query: Result<Query<RecordFilter>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing report request");

    if let Err(err) = signed_in_user(&state, &jar) {
        return failure(correlation_id, err);
    }
    let filter = match query {
        Ok(Query(filter)) => filter,
        Err(rejection) => return query_rejected(correlation_id, rejection),
    };

    let start_time = Instant::now();
    match state.with_store(|store| store.list()).await {
        Ok(records) => {
            let selected = filter.apply(records);
            let report = PayrollReport::new(filter, summarize_payroll(&selected));
            info!(
                correlation_id = %correlation_id,
                report_id = %report.report_id,
                employees = report.employees.len(),
                total_gross = %report.total_gross,
                total_net = %report.total_net,
                duration_us = start_time.elapsed().as_micros(),
                "Payroll report generated"
            );
            Json(report).into_response()
        }
        Err(err) => failure(correlation_id, err),
    }
}

/// Handler for GET /pdf/:name endpoint.
///
/// Streams the named employee's payslip as a PDF attachment.
async fn pdf_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(name): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, employee = %name, "Processing payslip request");

    let rendered = match signed_in_user(&state, &jar) {
        Ok(_) => render_payslip(&state, name, correlation_id).await,
        Err(err) => Err(err),
    };
    rendered.unwrap_or_else(|err| failure(correlation_id, err))
}

async fn render_payslip(
    state: &AppState,
    name: String,
    correlation_id: Uuid,
) -> PayrollResult<Response> {
    let lookup = name.clone();
    let record = state
        .with_store(move |store| store.get(&lookup))
        .await?
        .ok_or(PayrollError::RecordNotFound { name })?;

    let payslip = Payslip::new(&record, &calculate_payroll(&record));
    let document = payslip.to_pdf();

    info!(
        correlation_id = %correlation_id,
        employee = %record.name,
        bytes = document.len(),
        "Payslip rendered"
    );

    Ok((
        [
            (header::CONTENT_TYPE, PDF_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", payslip.file_name()),
            ),
        ],
        document,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use rust_decimal::Decimal;
    use tower::ServiceExt;

    fn create_test_state() -> AppState {
        AppState::in_memory()
    }

    /// Registers an account and returns a cookie header for a live session.
    fn signed_in_cookie(state: &AppState) -> String {
        let account = state
            .identity()
            .create_account("clerk@example.com", "secret-password")
            .unwrap();
        let token = state.sessions().start(account.id).unwrap();
        format!("{}={}", state.sessions().cookie_name(), token)
    }

    fn seed(state: &AppState, name: &str, rate: &str, hours: &str, branch: &str) {
        let record = WageRecord::parse(name, rate, hours, "0", branch, "2024-01").unwrap();
        state.store().upsert(record).unwrap();
    }

    fn form_post(uri: &str, cookie: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("Cookie", cookie)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn authed_get(uri: &str, cookie: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("Cookie", cookie)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[tokio::test]
    async fn test_add_valid_record_returns_201() {
        let state = create_test_state();
        let cookie = signed_in_cookie(&state);
        let router = create_router(state.clone());

        let response = router
            .oneshot(form_post(
                "/add",
                &cookie,
                "name=alice&rate=20&hours=45&deductions=50&branch=north&date=2024-01",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let content_type = response.headers().get("content-type").unwrap();
        assert_eq!(content_type, "application/json");

        let saved: RecordSavedResponse =
            serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(saved.outcome, UpsertOutcome::Inserted);
        assert!(state.store().get("alice").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_add_replacing_record_returns_200() {
        let state = create_test_state();
        let cookie = signed_in_cookie(&state);
        seed(&state, "alice", "20", "40", "north");

        let response = create_router(state.clone())
            .oneshot(form_post(
                "/add",
                &cookie,
                "name=alice&rate=25&hours=40&deductions=0&branch=north&date=2024-01",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let stored = state.store().get("alice").unwrap().unwrap();
        assert_eq!(stored.rate, Decimal::from(25));
    }

    #[tokio::test]
    async fn test_add_non_numeric_rate_returns_400_and_stores_nothing() {
        let state = create_test_state();
        let cookie = signed_in_cookie(&state);

        let response = create_router(state.clone())
            .oneshot(form_post(
                "/add",
                &cookie,
                "name=alice&rate=abc&hours=45&deductions=50&branch=north&date=2024-01",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(error.code, "VALIDATION_ERROR");
        assert!(state.store().list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_missing_field_returns_400() {
        let state = create_test_state();
        let cookie = signed_in_cookie(&state);

        let response = create_router(state)
            .oneshot(form_post("/add", &cookie, "name=alice&rate=20"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(error.code, "MISSING_FIELD");
        assert!(error.message.contains("hours"));
    }

    #[tokio::test]
    async fn test_add_without_session_returns_401() {
        let state = create_test_state();

        let response = create_router(state.clone())
            .oneshot(form_post(
                "/add",
                "",
                "name=alice&rate=20&hours=45&deductions=50&branch=north&date=2024-01",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(state.store().list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_applies_filter() {
        let state = create_test_state();
        let cookie = signed_in_cookie(&state);
        seed(&state, "alice", "20", "40", "north");
        seed(&state, "bob", "15", "30", "south");

        let response = create_router(state)
            .oneshot(authed_get("/list?branch=north", &cookie))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let listing: RecordListResponse =
            serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(listing.count, 1);
        assert_eq!(listing.employees[0].name, "alice");
    }

    #[tokio::test]
    async fn test_report_totals_selected_records() {
        let state = create_test_state();
        let cookie = signed_in_cookie(&state);
        seed(&state, "alice", "20", "45", "north");
        seed(&state, "bob", "15", "30", "south");

        let response = create_router(state)
            .oneshot(authed_get("/report", &cookie))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let report: PayrollReport = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(report.employees.len(), 2);
        // 950 + 600
        assert_eq!(report.total_gross, Decimal::from(1550));
        // 712.5 + 450
        assert_eq!(report.total_net, Decimal::new(11625, 1));
    }

    #[tokio::test]
    async fn test_pdf_returns_attachment() {
        let state = create_test_state();
        let cookie = signed_in_cookie(&state);
        seed(&state, "alice", "20", "45", "north");

        let response = create_router(state)
            .oneshot(authed_get("/pdf/alice", &cookie))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            PDF_CONTENT_TYPE
        );
        assert_eq!(
            response.headers().get("content-disposition").unwrap(),
            "attachment; filename=\"alice.pdf\""
        );
        let document = body_bytes(response).await;
        assert!(document.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_pdf_unknown_name_returns_404() {
        let state = create_test_state();
        let cookie = signed_in_cookie(&state);

        let response = create_router(state)
            .oneshot(authed_get("/pdf/ghost", &cookie))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let error: ApiError = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(error.code, "RECORD_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_form_without_content_type_returns_415() {
        let state = create_test_state();
        let cookie = signed_in_cookie(&state);

        let response = create_router(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/remove")
                    .header("Cookie", cookie)
                    .body(Body::from("name=alice"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let error: ApiError = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(error.code, "MALFORMED_FORM");
    }
}
