//! Elasticsearch adapter for [`SearchIndex`] over the JSON HTTP API.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::application::repos::{IndexError, RawDocument, SearchIndex};
use crate::config::ElasticSettings;

use super::error::InfraError;

/// Longest error body kept in an [`IndexError`].
const MAX_ERROR_BODY: usize = 512;

#[derive(Clone, Debug)]
pub struct ElasticIndex {
    client: Client,
    base: Url,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Debug, Deserialize)]
struct Hits {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: RawDocument,
}

#[derive(Debug, Deserialize)]
struct GetResponse {
    found: bool,
    #[serde(rename = "_source", default)]
    source: Option<RawDocument>,
}

impl ElasticIndex {
    pub fn new(settings: &ElasticSettings) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(settings.timeout)
            .build()
            .map_err(|err| {
                InfraError::configuration(format!("failed to build search index client: {err}"))
            })?;

        if settings.url.cannot_be_a_base() {
            return Err(InfraError::configuration(format!(
                "search index url `{}` cannot be used as a base",
                settings.url
            )));
        }

        Ok(Self {
            client,
            base: settings.url.clone(),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("kinoteka/", env!("CARGO_PKG_VERSION"))
    }

    fn url(&self, segments: &[&str]) -> Result<Url, IndexError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| IndexError::transport(format!("`{}` cannot be a base", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn error_body(response: Response) -> String {
        let mut text = response.text().await.unwrap_or_default();
        if text.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !text.is_char_boundary(cut) {
                cut -= 1;
            }
            text.truncate(cut);
        }
        text
    }
}

fn transport_error(err: reqwest::Error) -> IndexError {
    if err.is_timeout() {
        IndexError::Timeout
    } else {
        IndexError::transport(err)
    }
}

#[async_trait]
impl SearchIndex for ElasticIndex {
    async fn search(&self, index: &str, body: &Value) -> Result<Vec<RawDocument>, IndexError> {
        let url = self.url(&[index, "_search"])?;
        debug!(index, body = %body, "search index query");

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(IndexError::NotFound(Self::error_body(response).await));
        }
        if !status.is_success() {
            return Err(IndexError::Status {
                status: status.as_u16(),
                message: Self::error_body(response).await,
            });
        }

        let parsed: SearchResponse = response.json().await.map_err(IndexError::decode)?;
        Ok(parsed.hits.hits.into_iter().map(|hit| hit.source).collect())
    }

    async fn get(&self, index: &str, id: &str) -> Result<Option<RawDocument>, IndexError> {
        let url = self.url(&[index, "_doc", id])?;
        debug!(index, id, "search index get");

        let response = self.client.get(url).send().await.map_err(transport_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            // A missing document answers `found: false`; a missing index answers with an error body.
            let body = Self::error_body(response).await;
            return match serde_json::from_str::<GetResponse>(&body) {
                Ok(parsed) if !parsed.found => Ok(None),
                _ => Err(IndexError::NotFound(body)),
            };
        }
        if !status.is_success() {
            return Err(IndexError::Status {
                status: status.as_u16(),
                message: Self::error_body(response).await,
            });
        }

        let parsed: GetResponse = response.json().await.map_err(IndexError::decode)?;
        Ok(if parsed.found { parsed.source } else { None })
    }
}
