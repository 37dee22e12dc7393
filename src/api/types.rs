// API request types module
// Request body binding and pagination query parsing

use serde::Deserialize;

use super::error::ApiError;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PER_PAGE: i64 = 10;

/// Body of create and update requests
///
/// Fields are optional on the wire so a missing one can be reported as a
/// validation error instead of a parse error. Any `id` is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct EmployeePayload {
    pub name: Option<String>,
    pub position: Option<String>,
    pub salary: Option<i64>,
}

/// Validated create/update fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeFields {
    pub name: String,
    pub position: String,
    pub salary: i64,
}

impl EmployeePayload {
    pub fn from_json(bytes: &[u8]) -> Result<Self, ApiError> {
        serde_json::from_slice(bytes).map_err(|e| ApiError::BadRequest(format!("Invalid JSON: {e}")))
    }

    /// Check required fields. Empty strings and a zero salary count as missing.
    pub fn validate(self) -> Result<EmployeeFields, ApiError> {
        let name = self.name.filter(|s| !s.is_empty());
        let position = self.position.filter(|s| !s.is_empty());
        let salary = self.salary.filter(|&s| s != 0);

        match (name, position, salary) {
            (Some(name), Some(position), Some(salary)) => Ok(EmployeeFields {
                name,
                position,
                salary,
            }),
            (name, position, salary) => {
                let missing: Vec<&str> = [
                    ("name", name.is_none()),
                    ("position", position.is_none()),
                    ("salary", salary.is_none()),
                ]
                .into_iter()
                .filter_map(|(field, is_missing)| is_missing.then_some(field))
                .collect();
                Err(ApiError::BadRequest(format!(
                    "missing required field: {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

/// `page` / `per_page` query parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub page: i64,
    pub per_page: i64,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageQuery {
    /// Parse from a raw query string
    ///
    /// Keys and values are percent-decoded first. Absent parameters take
    /// their defaults. A parameter that is present but not an integer
    /// (including an empty value) is read as 0.
    pub fn parse(query: Option<&str>) -> Self {
        let mut result = Self::default();
        let mut seen_page = false;
        let mut seen_per_page = false;

        for (key, value) in form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            match key.as_ref() {
                "page" if !seen_page => {
                    seen_page = true;
                    result.page = value.parse().unwrap_or(0);
                }
                "per_page" if !seen_per_page => {
                    seen_per_page = true;
                    result.per_page = value.parse().unwrap_or(0);
                }
                _ => {}
            }
        }
        result
    }

    /// Zero-based `[start, end)` window into the listing
    ///
    /// Negative bounds are floored at 0; the store clamps the upper side.
    pub fn window(self) -> (usize, usize) {
        let start = (self.page - 1).saturating_mul(self.per_page);
        let end = start.saturating_add(self.per_page);
        (to_index(start), to_index(end))
    }
}

fn to_index(value: i64) -> usize {
    usize::try_from(value.max(0)).unwrap_or(usize::MAX)
}
