// Employee handlers module

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Response, StatusCode};

use super::error::ApiError;
use super::response::{empty_response, json_response};
use super::types::{EmployeePayload, EmployeeFields, PageQuery};
use crate::config::AppState;
use crate::store::Employee;

type BoxError = Box<dyn std::error::Error + Send + Sync>;
type HandlerResult = Result<Response<Full<Bytes>>, ApiError>;

/// GET /employee?page=&per_page=
pub async fn list_employees(state: &AppState, query: Option<&str>) -> HandlerResult {
    let (start, end) = PageQuery::parse(query).window();
    let employees = state.store.page(start, end).await;
    Ok(json_response(StatusCode::OK, &employees))
}

/// POST /employee
pub async fn create_employee<B>(state: &AppState, body: B) -> HandlerResult
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let fields = read_fields(body, state.config.http.max_body_size).await?;
    let employee = Employee::new(fields.name, fields.position, fields.salary);
    let created = state.store.create(employee).await?;
    Ok(json_response(StatusCode::CREATED, &created))
}

/// GET /employee/:id
pub async fn get_employee(state: &AppState, id: &str) -> HandlerResult {
    let employee = state.store.get_by_id(id).await?;
    Ok(json_response(StatusCode::OK, &employee))
}

/// PUT /employee/:id
pub async fn update_employee<B>(state: &AppState, id: &str, body: B) -> HandlerResult
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let fields = read_fields(body, state.config.http.max_body_size).await?;
    let updated = state
        .store
        .update(id, fields.name, fields.position, fields.salary)
        .await?;
    Ok(json_response(StatusCode::OK, &updated))
}

/// DELETE /employee/:id
pub async fn delete_employee(state: &AppState, id: &str) -> HandlerResult {
    state.store.delete(id).await?;
    Ok(empty_response(StatusCode::NO_CONTENT))
}

/// GET /healthz
#[allow(clippy::unnecessary_wraps)]
pub fn health() -> HandlerResult {
    Ok(json_response(
        StatusCode::OK,
        &serde_json::json!({ "status": "ok" }),
    ))
}

/// Collect at most `max_body_size` bytes and bind them to validated fields
async fn read_fields<B>(body: B, max_body_size: u64) -> Result<EmployeeFields, ApiError>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let collected = Limited::new(body, limit).collect().await.map_err(|e| {
        if e.downcast_ref::<LengthLimitError>().is_some() {
            ApiError::PayloadTooLarge
        } else {
            ApiError::BadRequest(format!("Failed to read request body: {e}"))
        }
    })?;

    EmployeePayload::from_json(&collected.to_bytes())?.validate()
}
