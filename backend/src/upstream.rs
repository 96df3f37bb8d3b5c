use reqwest::Client as HttpClient;
use serde_json::Value;
use shared::ReportRequest;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("URL parsing failed: {0}")]
    Url(#[from] url::ParseError),
    #[error("upstream responded {status}: {detail}")]
    Api { status: u16, detail: String },
}

impl UpstreamError {
    /// Message relayed to the browser in the `details` field.
    pub fn detail(&self) -> String {
        match self {
            UpstreamError::Api { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }
}

/// Extracts the FastAPI-style `detail` message from an error body,
/// falling back to the raw text.
fn detail_from_body(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str().map(String::from)))
        .unwrap_or_else(|| body.to_string())
}

/// Client for the report-generation API. All task and report state lives
/// on the other side of this client.
#[derive(Clone)]
pub struct UpstreamClient {
    http: HttpClient,
    base: Url,
}

impl UpstreamClient {
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        // A trailing slash keeps joins relative to the full configured path.
        let base = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{}/", base_url))?
        };
        Ok(Self {
            http: HttpClient::new(),
            base,
        })
    }

    pub async fn submit_report(&self, request: &ReportRequest) -> Result<Value, UpstreamError> {
        let endpoint = self.base.join("generate-report")?;
        let response = self.http.post(endpoint).json(request).send().await?;
        Self::relay_json(response).await
    }

    pub async fn fetch_report(&self, task_id: &str) -> Result<Value, UpstreamError> {
        let endpoint = self.base.join(&format!("report/{}", task_id))?;
        let response = self.http.get(endpoint).send().await?;
        Self::relay_json(response).await
    }

    async fn relay_json(response: reqwest::Response) -> Result<Value, UpstreamError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Api {
                status: status.as_u16(),
                detail: detail_from_body(&body),
            });
        }
        Ok(response.json::<Value>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_prefers_fastapi_field() {
        let body = r#"{"detail":"topic must not be empty"}"#;
        assert_eq!(detail_from_body(body), "topic must not be empty");
    }

    #[test]
    fn detail_falls_back_to_raw_body() {
        assert_eq!(detail_from_body("Internal Server Error"), "Internal Server Error");
        assert_eq!(detail_from_body(r#"{"message":"nope"}"#), r#"{"message":"nope"}"#);
    }

    #[test]
    fn api_error_detail_is_relayed() {
        let err = UpstreamError::Api { status: 422, detail: "bad request".into() };
        assert_eq!(err.detail(), "bad request");
    }

    #[test]
    fn endpoints_join_against_base() {
        let client = UpstreamClient::new("http://localhost:8000").unwrap();
        assert_eq!(
            client.base.join("generate-report").unwrap().as_str(),
            "http://localhost:8000/generate-report"
        );
        assert_eq!(
            client.base.join("report/abc-123").unwrap().as_str(),
            "http://localhost:8000/report/abc-123"
        );
    }

    #[test]
    fn base_url_keeps_configured_path_prefix() {
        let client = UpstreamClient::new("http://localhost:8000/api").unwrap();
        assert_eq!(
            client.base.join("generate-report").unwrap().as_str(),
            "http://localhost:8000/api/generate-report"
        );
    }
}
