use anyhow::{anyhow, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use tracing::{debug, error};

use shared_config::AppConfig;

/// Thin JSON-over-HTTP client for a MongoDB Atlas Data API compatible
/// document store. All persistence and indexing is delegated here; the
/// application never opens a database connection of its own.
pub struct DocumentStore {
    client: Client,
    base_url: String,
    api_key: String,
    data_source: String,
    database: String,
}

impl DocumentStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.data_api_url.clone(),
            api_key: config.data_api_key.clone(),
            data_source: config.data_source.clone(),
            database: config.database_name.clone(),
        }
    }

    fn get_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(&self.api_key) {
            headers.insert("api-key", value);
        }

        headers
    }

    fn action_body(&self, collection: &str) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("dataSource".to_string(), json!(self.data_source));
        body.insert("database".to_string(), json!(self.database));
        body.insert("collection".to_string(), json!(collection));
        body
    }

    async fn action<T>(&self, action: &str, body: Map<String, Value>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/action/{}", self.base_url, action);
        debug!("Data API {} on {}", action, url);

        let response = self
            .client
            .post(&url)
            .headers(self.get_headers())
            .json(&Value::Object(body))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Data API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                _ => anyhow!("Data API error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    pub async fn find(
        &self,
        collection: &str,
        filter: Value,
        sort: Option<Value>,
        limit: Option<i64>,
        skip: Option<i64>,
    ) -> Result<Vec<Value>> {
        let mut body = self.action_body(collection);
        body.insert("filter".to_string(), filter);
        if let Some(sort) = sort {
            body.insert("sort".to_string(), sort);
        }
        if let Some(limit) = limit {
            body.insert("limit".to_string(), json!(limit));
        }
        if let Some(skip) = skip {
            body.insert("skip".to_string(), json!(skip));
        }

        let result: FindResult = self.action("find", body).await?;
        Ok(result.documents)
    }

    pub async fn find_one(&self, collection: &str, filter: Value) -> Result<Option<Value>> {
        let mut body = self.action_body(collection);
        body.insert("filter".to_string(), filter);

        let result: FindOneResult = self.action("findOne", body).await?;
        Ok(result.document)
    }

    pub async fn insert_one(&self, collection: &str, document: Value) -> Result<()> {
        let mut body = self.action_body(collection);
        body.insert("document".to_string(), document);

        let _: InsertOneResult = self.action("insertOne", body).await?;
        Ok(())
    }

    /// Apply a MongoDB update document (`$set`, `$inc`, `$push`, ...) to the
    /// first document matching `filter`. Returns the modified count.
    pub async fn update_one(&self, collection: &str, filter: Value, update: Value) -> Result<u64> {
        let mut body = self.action_body(collection);
        body.insert("filter".to_string(), filter);
        body.insert("update".to_string(), update);

        let result: UpdateResult = self.action("updateOne", body).await?;
        Ok(result.modified_count)
    }

    pub async fn aggregate(&self, collection: &str, pipeline: Value) -> Result<Vec<Value>> {
        let mut body = self.action_body(collection);
        body.insert("pipeline".to_string(), pipeline);

        let result: FindResult = self.action("aggregate", body).await?;
        Ok(result.documents)
    }

    /// The Data API has no dedicated count action; counting goes through an
    /// aggregation pipeline.
    pub async fn count(&self, collection: &str, filter: Value) -> Result<i64> {
        let pipeline = json!([
            { "$match": filter },
            { "$count": "total" }
        ]);

        let documents = self.aggregate(collection, pipeline).await?;
        let total = documents
            .first()
            .and_then(|doc| doc["total"].as_i64())
            .unwrap_or(0);

        Ok(total)
    }
}

#[derive(serde::Deserialize)]
struct FindResult {
    #[serde(default)]
    documents: Vec<Value>,
}

#[derive(serde::Deserialize)]
struct FindOneResult {
    document: Option<Value>,
}

#[derive(serde::Deserialize)]
#[allow(dead_code)]
struct InsertOneResult {
    #[serde(rename = "insertedId")]
    inserted_id: Option<Value>,
}

#[derive(serde::Deserialize)]
struct UpdateResult {
    #[serde(rename = "matchedCount", default)]
    #[allow(dead_code)]
    matched_count: u64,
    #[serde(rename = "modifiedCount", default)]
    modified_count: u64,
}
