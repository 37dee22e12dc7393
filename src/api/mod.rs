// API module entry
// Employee CRUD routes over JSON

mod error;
mod handlers;
mod response;
mod types;

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppState;
use crate::logger::{self, AccessLogEntry};
use crate::routing::{match_route, Route, RouteMatch};

pub use error::ApiError;

/// Handler a matched route dispatches to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    ListEmployees,
    CreateEmployee,
    GetEmployee,
    UpdateEmployee,
    DeleteEmployee,
    Health,
}

/// Route table; the health probe stays last so it can be sliced off
static ROUTES: [Route<Endpoint>; 6] = [
    Route::new(Method::GET, "/employee", Endpoint::ListEmployees),
    Route::new(Method::POST, "/employee", Endpoint::CreateEmployee),
    Route::new(Method::GET, "/employee/:id", Endpoint::GetEmployee),
    Route::new(Method::PUT, "/employee/:id", Endpoint::UpdateEmployee),
    Route::new(Method::DELETE, "/employee/:id", Endpoint::DeleteEmployee),
    Route::new(Method::GET, "/healthz", Endpoint::Health),
];

fn route_table(health_check: bool) -> &'static [Route<Endpoint>] {
    if health_check {
        &ROUTES
    } else {
        &ROUTES[..ROUTES.len() - 1]
    }
}

/// Connection-level entry point: handles the request and writes the access log
pub async fn serve<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let entry = state
        .config
        .logging
        .access_log
        .then(|| access_log_entry(&req, peer_addr));

    let response = handle_request(req, &state).await;

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(response.body().size_hint().exact().unwrap_or(0))
            .unwrap_or(usize::MAX);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route a request to its handler and render any failure as a JSON error
pub async fn handle_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let (parts, body) = req.into_parts();
    let path = parts.uri.path();
    let routes = route_table(state.config.http.health_check);

    let result = match match_route(&parts.method, path, routes) {
        RouteMatch::Found(endpoint, params) => {
            let id = params.get("id").unwrap_or_default();
            match endpoint {
                Endpoint::ListEmployees => handlers::list_employees(state, parts.uri.query()).await,
                Endpoint::CreateEmployee => match check_body_size(&parts, state) {
                    Ok(()) => handlers::create_employee(state, body).await,
                    Err(e) => Err(e),
                },
                Endpoint::GetEmployee => handlers::get_employee(state, id).await,
                Endpoint::UpdateEmployee => match check_body_size(&parts, state) {
                    Ok(()) => handlers::update_employee(state, id, body).await,
                    Err(e) => Err(e),
                },
                Endpoint::DeleteEmployee => handlers::delete_employee(state, id).await,
                Endpoint::Health => handlers::health(),
            }
        }
        RouteMatch::MethodNotAllowed(allowed) => Err(ApiError::MethodNotAllowed(allowed)),
        RouteMatch::NotFound => Err(ApiError::RouteNotFound),
    };

    result.unwrap_or_else(|e| {
        if e.status().is_client_error() {
            logger::log_warning(&format!("{} {path}: {e}", parts.method));
        }
        e.into_response()
    })
}

/// Reject early when the declared Content-Length exceeds the configured limit
fn check_body_size(parts: &hyper::http::request::Parts, state: &AppState) -> Result<(), ApiError> {
    let Some(content_length) = parts.headers.get(hyper::header::CONTENT_LENGTH) else {
        return Ok(());
    };
    let max_body_size = state.config.http.max_body_size;

    match content_length.to_str().ok().map(str::parse::<u64>) {
        Some(Ok(size)) if size > max_body_size => {
            logger::log_error(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Err(ApiError::PayloadTooLarge)
        }
        Some(Ok(_)) => Ok(()),
        _ => {
            logger::log_warning("Invalid Content-Length header, skipping size check");
            Ok(())
        }
    }
}

fn access_log_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let header = |name: hyper::header::HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    entry.referer = header(hyper::header::REFERER);
    entry.user_agent = header(hyper::header::USER_AGENT);
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::{Employee, EmployeeStore};
    use http_body_util::BodyExt;
    use hyper::StatusCode;
    use serde_json::{json, Value};

    fn test_state() -> AppState {
        let mut config = Config::load_from("does-not-exist/employee-test-config").unwrap();
        config.logging.access_log = false;
        AppState::new(&config, Arc::new(EmployeeStore::new()))
    }

    fn request(method: Method, uri: &str, body: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap()
    }

    async fn send(state: &AppState, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
        let response = handle_request(request(method, uri, body), state).await;
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create(state: &AppState, name: &str, salary: i64) -> Value {
        let body = json!({ "name": name, "position": "Engineer", "salary": salary }).to_string();
        let (status, value) = send(state, Method::POST, "/employee", &body).await;
        assert_eq!(status, StatusCode::CREATED);
        value
    }

    #[tokio::test]
    async fn test_employee_lifecycle() {
        let state = test_state();

        let created = create(&state, "sumithra", 50000).await;
        let id = created["id"].as_str().unwrap().to_string();
        assert!(!id.is_empty());
        assert_eq!(created["name"], "sumithra");
        assert_eq!(created["position"], "Engineer");
        assert_eq!(created["salary"], 50000);

        let (status, fetched) = send(&state, Method::GET, &format!("/employee/{id}"), "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);

        let update = json!({ "id": "ignored", "name": "sumithra", "position": "Engineer", "salary": 70000 });
        let (status, updated) = send(
            &state,
            Method::PUT,
            &format!("/employee/{id}"),
            &update.to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["id"], id.as_str());
        assert_eq!(updated["name"], "sumithra");
        assert_eq!(updated["position"], "Engineer");
        assert_eq!(updated["salary"], 70000);

        let (status, body) = send(&state, Method::DELETE, &format!("/employee/{id}"), "").await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, body) = send(&state, Method::GET, &format!("/employee/{id}"), "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "employee not found" }));
    }

    #[tokio::test]
    async fn test_create_assigns_distinct_ids() {
        let state = test_state();
        let first = create(&state, "a", 1).await;
        let second = create(&state, "b", 2).await;
        assert_ne!(first["id"], second["id"]);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_body() {
        let state = test_state();

        let (status, body) = send(&state, Method::POST, "/employee", r#"{"name":"a"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "missing required field: position, salary");

        let (status, body) = send(&state, Method::POST, "/employee", "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON"));

        assert!(state.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_update_errors() {
        let state = test_state();
        let body = json!({ "name": "a", "position": "b", "salary": 1 }).to_string();

        let (status, _) = send(&state, Method::PUT, "/employee/missing", &body).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let created = create(&state, "a", 1).await;
        let uri = format!("/employee/{}", created["id"].as_str().unwrap());
        let (status, _) = send(&state, Method::PUT, &uri, r#"{"name":"a"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let state = test_state();
        let (status, body) = send(&state, Method::DELETE, "/employee/missing", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "employee not found");
    }

    #[tokio::test]
    async fn test_duplicate_create_is_conflict() {
        let state = test_state();
        let emp = Employee {
            id: "fixed".to_string(),
            name: "a".to_string(),
            position: "b".to_string(),
            salary: 1,
        };
        state.store.create(emp.clone()).await.unwrap();
        let err = ApiError::from(state.store.create(emp).await.unwrap_err());
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let state = test_state();
        let mut names = Vec::new();
        for i in 0..3 {
            let name = format!("emp{i}");
            create(&state, &name, i + 1).await;
            names.push(name);
        }

        let (status, body) = send(&state, Method::GET, "/employee?page=1&per_page=10", "").await;
        assert_eq!(status, StatusCode::OK);
        let listed: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["name"].as_str().unwrap())
            .collect();
        assert_eq!(listed, names);

        let (_, body) = send(&state, Method::GET, "/employee?per_page=2", "").await;
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (_, body) = send(&state, Method::GET, "/employee?page=2&per_page=2", "").await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["name"], "emp2");

        let (_, body) = send(&state, Method::GET, "/employee?page=5", "").await;
        assert_eq!(body, json!([]));

        let (status, body) = send(&state, Method::GET, "/employee?page=abc", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));

        let (_, body) = send(&state, Method::GET, "/employee", "").await;
        assert_eq!(body.as_array().unwrap().len(), 3);

        // Encoded query values are decoded before parsing
        let (_, body) = send(&state, Method::GET, "/employee?page=%32&per_page=%32", "").await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["name"], "emp2");
    }

    #[tokio::test]
    async fn test_zero_salary_is_rejected() {
        let state = test_state();
        let body = json!({ "name": "a", "position": "b", "salary": 0 }).to_string();
        let (status, value) = send(&state, Method::POST, "/employee", &body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], "missing required field: salary");
        assert!(state.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_trailing_slash_matches_route() {
        let state = test_state();
        let created = create(&state, "a", 1).await;
        let id = created["id"].as_str().unwrap();

        let (status, body) = send(&state, Method::GET, "/employee/", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (status, body) = send(&state, Method::GET, &format!("/employee/{id}/"), "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], id);
    }

    #[tokio::test]
    async fn test_list_empty_store() {
        let state = test_state();
        let (status, body) = send(&state, Method::GET, "/employee", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_unknown_route_and_method() {
        let state = test_state();

        let (status, body) = send(&state, Method::GET, "/departments", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "route not found");

        let response = handle_request(request(Method::PATCH, "/employee/1", "{}"), &state).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response.headers().get("allow").and_then(|v| v.to_str().ok()),
            Some("GET, PUT, DELETE")
        );
    }

    #[tokio::test]
    async fn test_health_check_toggle() {
        let state = test_state();
        let (status, body) = send(&state, Method::GET, "/healthz", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));

        let mut config = state.config.clone();
        config.http.health_check = false;
        let state = AppState::new(&config, Arc::new(EmployeeStore::new()));
        let (status, _) = send(&state, Method::GET, "/healthz", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_body_size_limit() {
        let mut state = test_state();
        state.config.http.max_body_size = 16;
        let body = json!({ "name": "a long enough name", "position": "b", "salary": 1 }).to_string();

        // Declared length over the limit
        let mut req = request(Method::POST, "/employee", &body);
        req.headers_mut()
            .insert("content-length", body.len().to_string().parse().unwrap());
        let response = handle_request(req, &state).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        // No declared length: the limit applies while reading
        let (status, body) = send(&state, Method::POST, "/employee", &body).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"], "request body too large");
        assert!(state.store.is_empty().await);
    }
}
