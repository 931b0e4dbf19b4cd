//! HTTP client for an Elasticsearch-compatible engine.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::EngineConfig;
use crate::corpus::Document;
use crate::error::EngineError;
use crate::search::engine::{RawHit, SearchEngine, SearchHits, WriteResult};
use crate::search::query::SearchRequest;
use crate::search::settings::IndexSettings;

const USER_AGENT: &str = "ap89-search/0.1";

pub struct ElasticClient {
    client: reqwest::Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Acknowledged {
    #[serde(default)]
    acknowledged: bool,
}

#[derive(Deserialize, Debug)]
struct IndexResponse {
    result: String,
    #[serde(rename = "_id")]
    id: Option<String>,
}

#[derive(Deserialize, Debug)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Deserialize, Debug)]
struct HitsEnvelope {
    total: Option<Total>,
    #[serde(default)]
    hits: Vec<RawHit>,
}

/// `hits.total` is an object on 7.x+ and a bare number on older engines.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum Total {
    Object { value: u64 },
    Count(u64),
}

impl Total {
    fn value(&self) -> u64 {
        match self {
            Total::Object { value } | Total::Count(value) => *value,
        }
    }
}

impl ElasticClient {
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        debug!("{} {}", method, url);

        let builder = self.client.request(method, url);
        match &self.username {
            Some(user) => builder.basic_auth(user, self.password.as_deref()),
            None => builder,
        }
    }
}

/// Pass successful responses through; turn anything else into an error
/// carrying the engine's body.
async fn check(resp: Response, operation: &'static str) -> Result<Response, EngineError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(EngineError::Status {
        operation,
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl SearchEngine for ElasticClient {
    async fn index_exists(&self, index: &str) -> Result<bool, EngineError> {
        let resp = self.request(Method::HEAD, index).send().await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(false),
            _ => check(resp, "index exists").await.map(|_| true),
        }
    }

    async fn delete_index(&self, index: &str) -> Result<bool, EngineError> {
        let resp = self.request(Method::DELETE, index).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(EngineError::IndexNotFound(index.to_string()));
        }
        let ack: Acknowledged = check(resp, "delete index").await?.json().await?;
        Ok(ack.acknowledged)
    }

    async fn create_index(
        &self,
        index: &str,
        settings: &IndexSettings,
    ) -> Result<bool, EngineError> {
        let resp = self
            .request(Method::PUT, index)
            .json(&json!({ "settings": settings }))
            .send()
            .await?;
        let ack: Acknowledged = check(resp, "create index").await?.json().await?;
        Ok(ack.acknowledged)
    }

    async fn index_document(
        &self,
        index: &str,
        document: &Document,
    ) -> Result<WriteResult, EngineError> {
        let resp = self
            .request(Method::POST, &format!("{index}/_doc"))
            .json(document)
            .send()
            .await?;
        let written: IndexResponse = check(resp, "index document").await?.json().await?;
        debug!("Indexed {} as {:?}", document.doc_id, written.id);
        Ok(WriteResult::from_engine(&written.result))
    }

    async fn search(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> Result<SearchHits, EngineError> {
        let resp = self
            .request(Method::POST, &format!("{index}/_search"))
            .json(request)
            .send()
            .await?;
        let found: SearchResponse = check(resp, "search").await?.json().await?;

        Ok(SearchHits {
            total: found
                .hits
                .total
                .map(|t| t.value())
                .unwrap_or(found.hits.hits.len() as u64),
            hits: found.hits.hits,
        })
    }
}
