use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Success envelope: `{"status":"success","message":...,"data":{...}}`.
pub fn success(data: Value) -> Json<Value> {
    Json(json!({
        "status": "success",
        "data": data
    }))
}

pub fn success_with_message(message: &str, data: Value) -> Json<Value> {
    Json(json!({
        "status": "success",
        "message": message,
        "data": data
    }))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        Self { page, limit, total, pages }
    }
}

/// Common `?page=&limit=` query parameters for list endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(10).clamp(1, 100)
    }

    pub fn skip(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}
