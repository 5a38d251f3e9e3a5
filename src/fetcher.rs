//! Catalog provider boundary and the LeetCode GraphQL client behind it.
//!
//! One POST returns the whole problem list with the caller's solve status.
//! Calls log latency and record counts; the session cookie is never logged.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, COOKIE, REFERER, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use crate::config::CatalogCfg;
use crate::domain::{Credential, Difficulty, ProblemRecord, SolveStatus};
use crate::error::FetchError;
use crate::util::trunc_for_log;

#[async_trait]
pub trait CatalogFetcher: Send + Sync {
  async fn fetch(&self, credential: &Credential) -> Result<Vec<ProblemRecord>, FetchError>;
}

const OPERATION_NAME: &str = "problemsetQuestionList";

const PROBLEMSET_QUERY: &str = r#"
query problemsetQuestionList($categorySlug: String, $limit: Int, $skip: Int, $filters: QuestionListFilterInput) {
  problemsetQuestionList: questionList(
    categorySlug: $categorySlug
    limit: $limit
    skip: $skip
    filters: $filters
  ) {
    total: totalNum
    questions: data {
      title
      titleSlug
      difficulty
      status
      isPaidOnly
    }
  }
}
"#;

#[derive(Serialize)]
struct GraphQlRequest<'a> {
  #[serde(rename = "operationName")]
  operation_name: &'a str,
  query: &'a str,
  variables: Variables,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Variables {
  category_slug: String,
  skip: u32,
  limit: u32,
  filters: serde_json::Value,
}

#[derive(Deserialize)]
struct GraphQlResponse {
  data: Option<ResponseData>,
  #[serde(default)]
  errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseData {
  problemset_question_list: Option<QuestionList>,
}

#[derive(Deserialize)]
struct QuestionList {
  #[serde(default)]
  questions: Vec<RawQuestion>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
  title: String,
  title_slug: String,
  difficulty: String,
  status: Option<String>,
  #[serde(default)]
  is_paid_only: bool,
}

#[derive(Deserialize)]
struct GraphQlError {
  message: String,
}

/// Turn a raw GraphQL body into problem records.
/// Entries with an unknown difficulty label are dropped with a warning.
pub fn parse_catalog_response(body: &str) -> Result<Vec<ProblemRecord>, FetchError> {
  let resp: GraphQlResponse =
    serde_json::from_str(body).map_err(|e| FetchError::Malformed(format!("JSON parse error: {e}")))?;

  let list = match resp.data.and_then(|d| d.problemset_question_list) {
    Some(list) => list,
    None => {
      let msg = resp.errors.first().map(|e| e.message.clone()).unwrap_or_else(|| "missing data".into());
      return Err(FetchError::Malformed(msg));
    }
  };

  let mut records = Vec::with_capacity(list.questions.len());
  for q in list.questions {
    let Some(difficulty) = Difficulty::from_label(&q.difficulty) else {
      warn!(target: "catalog", slug = %q.title_slug, difficulty = %q.difficulty, "Skipping problem with unknown difficulty");
      continue;
    };
    records.push(ProblemRecord {
      title: q.title,
      title_slug: q.title_slug,
      difficulty,
      status: SolveStatus::from_raw(q.status.as_deref()),
      is_paid_only: q.is_paid_only,
    });
  }

  if records.is_empty() {
    return Err(FetchError::Empty);
  }
  Ok(records)
}

#[derive(Clone)]
pub struct LeetCodeFetcher {
  pub client: reqwest::Client,
  pub graphql_url: String,
  pub referer: String,
  pub page_limit: u32,
}

impl LeetCodeFetcher {
  pub fn from_config(cfg: &CatalogCfg) -> Result<Self, FetchError> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(cfg.timeout_secs))
      .build()?;
    Ok(Self {
      client,
      graphql_url: cfg.graphql_url.clone(),
      referer: cfg.referer.clone(),
      page_limit: cfg.page_limit,
    })
  }
}

#[async_trait]
impl CatalogFetcher for LeetCodeFetcher {
  #[instrument(level = "info", skip_all, fields(url = %self.graphql_url, limit = self.page_limit))]
  async fn fetch(&self, credential: &Credential) -> Result<Vec<ProblemRecord>, FetchError> {
    let req = GraphQlRequest {
      operation_name: OPERATION_NAME,
      query: PROBLEMSET_QUERY,
      variables: Variables {
        category_slug: String::new(),
        skip: 0,
        limit: self.page_limit,
        filters: serde_json::json!({}),
      },
    };

    let start = Instant::now();
    let res = self.client.post(&self.graphql_url)
      .header(USER_AGENT, "leetdaily-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(REFERER, &self.referer)
      .header(COOKIE, format!("LEETCODE_SESSION={}", credential.token))
      .json(&req).send().await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      error!(target: "catalog", status, elapsed = ?start.elapsed(), "Catalog HTTP error");
      return Err(FetchError::Status { status, body: trunc_for_log(&body, 200) });
    }

    let body = res.text().await?;
    let records = parse_catalog_response(&body)?;
    info!(target: "catalog", elapsed = ?start.elapsed(), total = records.len(), bytes = body.len(), "Catalog fetched");
    Ok(records)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_questions_and_maps_status() {
    let body = r#"{
      "data": { "problemsetQuestionList": { "total": 3, "questions": [
        { "title": "Two Sum", "titleSlug": "two-sum", "difficulty": "Easy", "status": "ac", "isPaidOnly": false },
        { "title": "LRU Cache", "titleSlug": "lru-cache", "difficulty": "Medium", "status": null, "isPaidOnly": false },
        { "title": "Odd", "titleSlug": "odd", "difficulty": "Legendary", "status": "notac", "isPaidOnly": true },
        { "title": "Paid", "titleSlug": "paid", "difficulty": "Hard", "status": "notac", "isPaidOnly": true }
      ] } }
    }"#;
    let recs = parse_catalog_response(body).unwrap();
    assert_eq!(recs.len(), 3);
    assert_eq!(recs[0].status, SolveStatus::Accepted);
    assert_eq!(recs[1].status, SolveStatus::NotAccepted);
    assert_eq!(recs[1].difficulty, Difficulty::Medium);
    assert!(recs[2].is_paid_only);
  }

  #[test]
  fn empty_list_is_an_error() {
    let body = r#"{ "data": { "problemsetQuestionList": { "questions": [] } } }"#;
    assert!(matches!(parse_catalog_response(body), Err(FetchError::Empty)));
  }

  #[test]
  fn graphql_errors_are_malformed() {
    let body = r#"{ "data": null, "errors": [ { "message": "User is not authenticated" } ] }"#;
    match parse_catalog_response(body) {
      Err(FetchError::Malformed(msg)) => assert!(msg.contains("not authenticated")),
      other => panic!("unexpected: {:?}", other.map(|r| r.len())),
    }
  }

  #[test]
  fn garbage_is_malformed() {
    assert!(matches!(parse_catalog_response("<html>"), Err(FetchError::Malformed(_))));
  }

  #[test]
  fn request_body_shape() {
    let req = GraphQlRequest {
      operation_name: OPERATION_NAME,
      query: PROBLEMSET_QUERY,
      variables: Variables { category_slug: String::new(), skip: 0, limit: 50, filters: serde_json::json!({}) },
    };
    let v = serde_json::to_value(&req).unwrap();
    assert_eq!(v["operationName"], "problemsetQuestionList");
    assert_eq!(v["variables"]["categorySlug"], "");
    assert_eq!(v["variables"]["limit"], 50);
  }
}
