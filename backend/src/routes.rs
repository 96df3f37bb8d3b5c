use actix_files::Files;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, web};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use log::error;
use shared::{ErrorEnvelope, GenerateForm, ReportStatus};

use crate::upstream::UpstreamClient;

pub fn configure_routes(cfg: &mut web::ServiceConfig, frontend_dir: String) {
    cfg.service(web::resource("/api/generate-report").route(web::post().to(generate_report)))
        .service(web::resource("/api/report/{task_id}").route(web::get().to(report_status)))
        .service(web::resource("/api/download/text/{task_id}").route(web::get().to(download_text)))
        .service(web::resource("/api/download/pdf/{task_id}").route(web::get().to(download_pdf)))
        .service(Files::new("/", frontend_dir).index_file("index.html"));
}

fn failure(message: &str, details: Option<String>) -> HttpResponse {
    HttpResponse::InternalServerError().json(ErrorEnvelope {
        error: message.to_string(),
        details,
    })
}

fn not_ready(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorEnvelope {
        error: message.to_string(),
        details: None,
    })
}

fn attachment(filename: String) -> ContentDisposition {
    ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(filename)],
    }
}

async fn generate_report(
    upstream: web::Data<UpstreamClient>,
    form: web::Json<GenerateForm>,
) -> HttpResponse {
    let request = form.into_inner().into_request();
    match upstream.submit_report(&request).await {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) => {
            error!("Error generating report: {}", e);
            failure("Failed to generate report", Some(e.detail()))
        }
    }
}

async fn report_status(
    upstream: web::Data<UpstreamClient>,
    path: web::Path<String>,
) -> HttpResponse {
    let task_id = path.into_inner();
    match upstream.fetch_report(&task_id).await {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) => {
            error!("Error fetching report {}: {}", task_id, e);
            failure("Failed to fetch report", Some(e.detail()))
        }
    }
}

async fn download_text(
    upstream: web::Data<UpstreamClient>,
    path: web::Path<String>,
) -> HttpResponse {
    let task_id = path.into_inner();
    let report = match fetch_status(&upstream, &task_id).await {
        Ok(report) => report,
        Err(response) => return response,
    };

    match text_payload(&report) {
        Some((filename, body)) => HttpResponse::Ok()
            .content_type("text/plain")
            .insert_header(attachment(filename))
            .body(body),
        None => not_ready("Report not ready yet"),
    }
}

async fn download_pdf(
    upstream: web::Data<UpstreamClient>,
    path: web::Path<String>,
) -> HttpResponse {
    let task_id = path.into_inner();
    let report = match fetch_status(&upstream, &task_id).await {
        Ok(report) => report,
        Err(response) => return response,
    };

    match pdf_payload(&report) {
        Ok((filename, bytes)) => HttpResponse::Ok()
            .content_type("application/pdf")
            .insert_header(attachment(filename))
            .body(bytes),
        Err(PdfPayload::NotReady) => not_ready("PDF not ready yet"),
        Err(PdfPayload::Decode(e)) => {
            error!("Error decoding PDF payload for {}: {}", task_id, e);
            failure("Failed to download PDF", Some(e.to_string()))
        }
    }
}

async fn fetch_status(
    upstream: &UpstreamClient,
    task_id: &str,
) -> Result<ReportStatus, HttpResponse> {
    let body = upstream.fetch_report(task_id).await.map_err(|e| {
        error!("Error downloading report {}: {}", task_id, e);
        failure("Failed to download report", Some(e.detail()))
    })?;

    serde_json::from_value(body).map_err(|e| {
        error!("Unexpected report payload for {}: {}", task_id, e);
        failure("Failed to download report", Some(e.to_string()))
    })
}

/// Collapses every whitespace run in the topic into a single underscore.
fn sanitize_topic(topic: &str) -> String {
    let mut sanitized = String::with_capacity(topic.len());
    let mut in_run = false;
    for c in topic.chars() {
        if c.is_whitespace() {
            if !in_run {
                sanitized.push('_');
            }
            in_run = true;
        } else {
            sanitized.push(c);
            in_run = false;
        }
    }
    sanitized
}

fn attachment_filename(topic: Option<&str>, extension: &str) -> String {
    format!(
        "astronomy_report_{}.{}",
        sanitize_topic(topic.unwrap_or("report")),
        extension
    )
}

fn text_payload(report: &ReportStatus) -> Option<(String, String)> {
    if !report.is_completed() {
        return None;
    }
    let body = report.report_text.clone()?;
    Some((attachment_filename(report.topic.as_deref(), "txt"), body))
}

#[derive(Debug)]
enum PdfPayload {
    NotReady,
    Decode(base64::DecodeError),
}

fn pdf_payload(report: &ReportStatus) -> Result<(String, Vec<u8>), PdfPayload> {
    if !report.is_completed() {
        return Err(PdfPayload::NotReady);
    }
    let encoded = report.pdf_base64.as_deref().ok_or(PdfPayload::NotReady)?;
    let bytes = BASE64.decode(encoded).map_err(PdfPayload::Decode)?;
    Ok((attachment_filename(report.topic.as_deref(), "pdf"), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;

    fn completed(topic: &str) -> ReportStatus {
        ReportStatus {
            status: "completed".into(),
            topic: Some(topic.into()),
            report_text: Some("# Findings\n\nAll quiet.".into()),
            pdf_base64: Some(BASE64.encode(b"%PDF-1.4 fake")),
        }
    }

    #[test]
    fn whitespace_runs_become_single_underscores() {
        assert_eq!(sanitize_topic("Black Holes"), "Black_Holes");
        assert_eq!(sanitize_topic("Dark\t  Matter"), "Dark_Matter");
        assert_eq!(sanitize_topic(" edges "), "_edges_");
        assert_eq!(sanitize_topic("NoSpaces"), "NoSpaces");
    }

    #[test]
    fn filenames_carry_prefix_and_extension() {
        assert_eq!(
            attachment_filename(Some("Black Holes"), "txt"),
            "astronomy_report_Black_Holes.txt"
        );
        assert_eq!(attachment_filename(None, "pdf"), "astronomy_report_report.pdf");
    }

    #[test]
    fn text_payload_requires_completed_status() {
        let mut report = completed("Pulsars");
        report.status = "processing".into();
        assert!(text_payload(&report).is_none());

        report.status = "failed".into();
        assert!(text_payload(&report).is_none());
    }

    #[test]
    fn text_payload_returns_report_text_verbatim() {
        let report = completed("Pulsars");
        let (filename, body) = text_payload(&report).unwrap();
        assert_eq!(filename, "astronomy_report_Pulsars.txt");
        assert_eq!(body, "# Findings\n\nAll quiet.");
    }

    #[test]
    fn pdf_payload_requires_completed_status_and_payload() {
        let mut report = completed("Pulsars");
        report.status = "processing".into();
        assert!(matches!(pdf_payload(&report), Err(PdfPayload::NotReady)));

        let mut report = completed("Pulsars");
        report.pdf_base64 = None;
        assert!(matches!(pdf_payload(&report), Err(PdfPayload::NotReady)));
    }

    #[test]
    fn pdf_payload_decodes_base64() {
        let report = completed("Ring Nebula");
        let (filename, bytes) = pdf_payload(&report).unwrap();
        assert_eq!(filename, "astronomy_report_Ring_Nebula.pdf");
        assert_eq!(bytes, b"%PDF-1.4 fake");
    }

    #[test]
    fn pdf_payload_rejects_garbage_base64() {
        let mut report = completed("Pulsars");
        report.pdf_base64 = Some("not base64!!".into());
        assert!(matches!(pdf_payload(&report), Err(PdfPayload::Decode(_))));
    }
}
