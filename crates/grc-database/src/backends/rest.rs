//! Hosted table API backend (PostgREST protocol).
//!
//! Plans become query-string filters on `{base_url}/{table}`: `in.(..)` for
//! value sets, `gte`/`lte` pairs for ranges and one `or=(..)` of `ilike`
//! terms for free text. Counts come from the `Content-Range` header of a
//! `HEAD` request with `Prefer: count=exact`. Grouped counts read the column
//! page by page, since the server caps rows per response.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use grc_core::config::RestConfig;
use grc_core::error::{AppError, ErrorKind};
use grc_core::query::predicate::scalar_text;
use grc_core::query::{Predicate, QueryPlan};
use grc_core::result::AppResult;
use grc_core::traits::{Backend, Row};
use grc_core::types::SortDirection;

const PREFER: &str = "prefer";

/// Rows requested per page when tallying a column.
const GROUP_PAGE_SIZE: u64 = 1000;

/// [`Backend`] over a PostgREST-compatible HTTP table API.
#[derive(Debug, Clone)]
pub struct RestBackend {
    base_url: Url,
    client: Client,
}

impl RestBackend {
    /// Build a backend from configuration. `timeout` bounds each HTTP call.
    pub fn new(config: &RestConfig, timeout: Duration) -> AppResult<Self> {
        let trimmed = config.base_url.trim_end_matches('/');
        let base_url = Url::parse(&format!("{trimmed}/")).map_err(|e| {
            AppError::configuration(format!("Invalid rest.base_url '{}': {e}", config.base_url))
        })?;

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(default_headers(config)?)
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;

        Ok(Self { base_url, client })
    }

    fn table_url(&self, table: &str) -> AppResult<Url> {
        self.base_url
            .join(table)
            .map_err(|e| AppError::internal(format!("Invalid table path '{table}': {e}")))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(method = %method, url = %url, "Table API request");
        self.client.request(method, url)
    }

    async fn send(&self, request: RequestBuilder, action: &str) -> AppResult<Response> {
        let response = request.send().await.map_err(|e| {
            let kind = if e.is_timeout() {
                ErrorKind::Timeout
            } else {
                ErrorKind::Repository
            };
            AppError::with_source(kind, format!("Failed to {action}: {e}"), e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or(body);
        Err(AppError::repository(format!(
            "Failed to {action}: table API returned {status}: {detail}"
        )))
    }

    async fn rows(&self, response: Response) -> AppResult<Vec<Row>> {
        let rows: Vec<Value> = response.json().await.map_err(|e| {
            AppError::with_source(ErrorKind::Serialization, format!("Invalid table API body: {e}"), e)
        })?;
        rows.into_iter()
            .map(|value| match value {
                Value::Object(row) => Ok(row),
                other => Err(AppError::serialization(format!(
                    "Expected a row object, got {other}"
                ))),
            })
            .collect()
    }
}

fn default_headers(config: &RestConfig) -> AppResult<HeaderMap> {
    let invalid = |what: &str| AppError::configuration(format!("Invalid {what} for the table API"));
    let mut headers = HeaderMap::new();
    if !config.api_key.is_empty() {
        headers.insert(
            "apikey",
            HeaderValue::from_str(&config.api_key).map_err(|_| invalid("api key"))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.api_key))
                .map_err(|_| invalid("api key"))?,
        );
    }
    let schema = HeaderValue::from_str(&config.schema).map_err(|_| invalid("schema"))?;
    headers.insert("accept-profile", schema.clone());
    headers.insert("content-profile", schema);
    Ok(headers)
}

/// Double-quote a value for use inside PostgREST list and logic syntax.
fn quote_value(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Query-string pairs expressing a conjunction of predicates.
fn filter_pairs(predicates: &[Predicate]) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for predicate in predicates {
        match predicate {
            Predicate::In { column, values } => {
                let list: Vec<String> = values.iter().map(|v| quote_value(v)).collect();
                pairs.push((column.to_string(), format!("in.({})", list.join(","))));
            }
            Predicate::Between { column, start, end } => {
                let fmt = |ts: &chrono::DateTime<chrono::Utc>| {
                    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
                };
                pairs.push((column.to_string(), format!("gte.{}", fmt(start))));
                pairs.push((column.to_string(), format!("lte.{}", fmt(end))));
            }
            Predicate::AnyContains { columns, needle } => {
                let pattern = quote_value(&ilike_pattern(needle));
                let terms: Vec<String> = columns
                    .iter()
                    .map(|c| format!("{c}.ilike.{pattern}"))
                    .collect();
                pairs.push(("or".to_string(), format!("({})", terms.join(","))));
            }
        }
    }
    pairs
}

/// Substring pattern for `ilike`, with the needle matched literally.
/// The server turns every `*` into `%`, so a literal `*` can only be
/// matched as the single-character wildcard.
fn ilike_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('*');
    for ch in needle.chars() {
        match ch {
            '\\' | '%' | '_' => {
                pattern.push('\\');
                pattern.push(ch);
            }
            '*' => pattern.push('_'),
            _ => pattern.push(ch),
        }
    }
    pattern.push('*');
    pattern
}

fn order_param(plan: &QueryPlan) -> String {
    plan.order
        .iter()
        .map(|key| {
            let dir = match key.direction {
                SortDirection::Asc => "asc",
                SortDirection::Desc => "desc",
            };
            format!("{}.{dir}", key.field)
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn with_pairs(mut url: Url, pairs: &[(String, String)]) -> Url {
    {
        let mut query = url.query_pairs_mut();
        for (key, value) in pairs {
            query.append_pair(key, value);
        }
    }
    url
}

fn id_filter(id: Uuid) -> Vec<(String, String)> {
    vec![("id".to_string(), format!("eq.{id}"))]
}

/// Total from a `Content-Range` value such as `0-24/57` or `*/0`.
fn parse_content_range(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

fn content_range_total(response: &Response) -> Option<u64> {
    response
        .headers()
        .get("content-range")
        .and_then(|v| v.to_str().ok())
        .and_then(parse_content_range)
}

/// Whether another page is needed after reading `seen` rows in total, the
/// last `batch` of them in the latest response. A server row cap can make
/// `batch` smaller than requested, so the reported total decides when known.
fn more_pages(seen: u64, batch: u64, total: Option<u64>) -> bool {
    if batch == 0 {
        return false;
    }
    match total {
        Some(total) => seen < total,
        None => batch >= GROUP_PAGE_SIZE,
    }
}

#[async_trait]
impl Backend for RestBackend {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn select(&self, table: &'static str, plan: &QueryPlan) -> AppResult<Vec<Row>> {
        let mut pairs = vec![("select".to_string(), "*".to_string())];
        pairs.extend(filter_pairs(&plan.predicates));
        if !plan.order.is_empty() {
            pairs.push(("order".to_string(), order_param(plan)));
        }
        pairs.push(("offset".to_string(), plan.offset.to_string()));
        pairs.push(("limit".to_string(), plan.limit.to_string()));

        let url = with_pairs(self.table_url(table)?, &pairs);
        let response = self.send(self.request(Method::GET, url), "select rows").await?;
        self.rows(response).await
    }

    async fn count(&self, table: &'static str, predicates: &[Predicate]) -> AppResult<u64> {
        let mut pairs = vec![("select".to_string(), "id".to_string())];
        pairs.extend(filter_pairs(predicates));
        let url = with_pairs(self.table_url(table)?, &pairs);

        let request = self
            .request(Method::HEAD, url)
            .header(PREFER, "count=exact");
        let response = self.send(request, "count rows").await?;
        content_range_total(&response)
            .ok_or_else(|| AppError::repository("Table API response had no usable Content-Range"))
    }

    async fn count_by(
        &self,
        table: &'static str,
        predicates: &[Predicate],
        column: &'static str,
    ) -> AppResult<BTreeMap<String, u64>> {
        let mut pairs = vec![("select".to_string(), column.to_string())];
        pairs.extend(filter_pairs(predicates));
        pairs.push((column.to_string(), "not.is.null".to_string()));
        pairs.push(("order".to_string(), "id.asc".to_string()));
        let table_url = self.table_url(table)?;

        let mut counts = BTreeMap::new();
        let mut seen = 0;
        loop {
            let mut page = pairs.clone();
            page.push(("offset".to_string(), seen.to_string()));
            page.push(("limit".to_string(), GROUP_PAGE_SIZE.to_string()));
            let request = self
                .request(Method::GET, with_pairs(table_url.clone(), &page))
                .header(PREFER, "count=exact");
            let response = self.send(request, "group rows").await?;
            let total = content_range_total(&response);

            let rows = self.rows(response).await?;
            let batch = rows.len() as u64;
            for row in rows {
                if let Some(key) = row.get(column).and_then(scalar_text) {
                    *counts.entry(key).or_insert(0) += 1;
                }
            }
            seen += batch;
            if !more_pages(seen, batch, total) {
                debug!(table, column, rows = seen, "Grouped rows");
                return Ok(counts);
            }
        }
    }

    async fn fetch(&self, table: &'static str, id: Uuid) -> AppResult<Option<Row>> {
        let url = with_pairs(self.table_url(table)?, &id_filter(id));
        let response = self.send(self.request(Method::GET, url), "fetch row").await?;
        Ok(self.rows(response).await?.into_iter().next())
    }

    async fn insert(&self, table: &'static str, row: Row) -> AppResult<Row> {
        let request = self
            .request(Method::POST, self.table_url(table)?)
            .header(PREFER, "return=representation")
            .json(&row);
        let response = self.send(request, "insert row").await?;
        self.rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::repository("Table API returned no inserted row"))
    }

    async fn update(&self, table: &'static str, id: Uuid, patch: Row) -> AppResult<Option<Row>> {
        let url = with_pairs(self.table_url(table)?, &id_filter(id));
        let request = self
            .request(Method::PATCH, url)
            .header(PREFER, "return=representation")
            .json(&patch);
        let response = self.send(request, "update row").await?;
        Ok(self.rows(response).await?.into_iter().next())
    }

    async fn delete(&self, table: &'static str, id: Uuid) -> AppResult<bool> {
        let url = with_pairs(self.table_url(table)?, &id_filter(id));
        let request = self
            .request(Method::DELETE, url)
            .header(PREFER, "return=representation");
        let response = self.send(request, "delete row").await?;
        Ok(!self.rows(response).await?.is_empty())
    }
}
