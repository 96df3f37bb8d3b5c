use gloo_net::http::Request;
use shared::{ErrorEnvelope, GenerateForm, ReportStatus, ReportSubmission};

/// Pulls the most useful message out of a non-OK BFF response.
async fn response_error(resp: gloo_net::http::Response, fallback: &str) -> String {
    match resp.json::<ErrorEnvelope>().await {
        Ok(envelope) => envelope.details.unwrap_or(envelope.error),
        Err(_) => fallback.to_string(),
    }
}

pub async fn submit_report(form: &GenerateForm) -> Result<ReportSubmission, String> {
    let resp = Request::post("/api/generate-report")
        .json(form)
        .map_err(|e| format!("Failed to encode request: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    if !resp.ok() {
        return Err(response_error(resp, "Failed to start report generation").await);
    }

    resp.json::<ReportSubmission>()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))
}

pub async fn fetch_report(task_id: &str) -> Result<ReportStatus, String> {
    let resp = Request::get(&format!("/api/report/{}", task_id))
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    if !resp.ok() {
        return Err(response_error(resp, "Failed to fetch report status").await);
    }

    resp.json::<ReportStatus>()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))
}

pub fn download_url_text(task_id: &str) -> String {
    format!("/api/download/text/{}", task_id)
}

pub fn download_url_pdf(task_id: &str) -> String {
    format!("/api/download/pdf/{}", task_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_urls_embed_the_task_id() {
        assert_eq!(download_url_text("abc-123"), "/api/download/text/abc-123");
        assert_eq!(download_url_pdf("abc-123"), "/api/download/pdf/abc-123");
    }
}
