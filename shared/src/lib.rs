use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumString};

/// Temperature forwarded upstream when the form omits one or sends
/// something unparseable.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Delay between status polls while a report is still processing.
pub const POLL_INTERVAL_MS: u32 = 5_000;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProcessType {
    #[default]
    Hierarchical,
    Sequential,
}

// HTML range inputs submit their value as a string, so the form field
// arrives as either a JSON number or a numeric string.
fn deserialize_loose_float<'de, D>(deserializer: D) -> Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64().map(|f| f as f32),
        Some(Value::String(s)) => s.trim().parse::<f32>().ok(),
        _ => None,
    })
}

/// Body the browser posts to the BFF's generate route.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct GenerateForm {
    pub topic: String,
    #[serde(default, deserialize_with = "deserialize_loose_float")]
    pub temperature: Option<f32>,
    #[serde(rename = "processType", default)]
    pub process_type: Option<ProcessType>,
}

impl GenerateForm {
    /// Applies the named defaults, yielding the request forwarded upstream.
    pub fn into_request(self) -> ReportRequest {
        ReportRequest {
            topic: self.topic,
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            process_type: self.process_type.unwrap_or_default(),
        }
    }
}

/// Body the BFF forwards to the upstream generate endpoint.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ReportRequest {
    pub topic: String,
    pub temperature: f32,
    pub process_type: ProcessType,
}

/// Upstream's acknowledgement of an accepted generation request.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ReportSubmission {
    pub task_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Status payload owned by the upstream API; this side only reads it.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ReportStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub report_text: Option<String>,
    #[serde(default)]
    pub pdf_base64: Option<String>,
}

impl ReportStatus {
    pub fn is_processing(&self) -> bool {
        self.status == "processing"
    }

    pub fn is_completed(&self) -> bool {
        self.status == "completed"
    }
}

/// Uniform failure body returned by every BFF route.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_accepts_numbers_and_strings() {
        let form: GenerateForm =
            serde_json::from_str(r#"{"topic":"Mars","temperature":0.9}"#).unwrap();
        assert_eq!(form.temperature, Some(0.9));

        let form: GenerateForm =
            serde_json::from_str(r#"{"topic":"Mars","temperature":"0.3"}"#).unwrap();
        assert_eq!(form.temperature, Some(0.3));
    }

    #[test]
    fn unparseable_temperature_defaults() {
        let form: GenerateForm =
            serde_json::from_str(r#"{"topic":"Mars","temperature":"warm"}"#).unwrap();
        assert_eq!(form.temperature, None);
        assert_eq!(form.into_request().temperature, DEFAULT_TEMPERATURE);
    }

    #[test]
    fn zero_temperature_is_not_defaulted() {
        let form: GenerateForm =
            serde_json::from_str(r#"{"topic":"Mars","temperature":"0"}"#).unwrap();
        assert_eq!(form.into_request().temperature, 0.0);
    }

    #[test]
    fn missing_fields_take_named_defaults() {
        let form: GenerateForm = serde_json::from_str(r#"{"topic":"Black Holes"}"#).unwrap();
        let request = form.into_request();
        assert_eq!(request.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(request.process_type, ProcessType::Hierarchical);
    }

    #[test]
    fn process_type_round_trips_lowercase() {
        let form: GenerateForm =
            serde_json::from_str(r#"{"topic":"Quasars","processType":"sequential"}"#).unwrap();
        assert_eq!(form.process_type, Some(ProcessType::Sequential));

        let request = form.into_request();
        let wire = serde_json::to_value(&request).unwrap();
        assert_eq!(wire["process_type"], "sequential");
        assert_eq!(wire["topic"], "Quasars");
    }

    #[test]
    fn report_status_predicates() {
        let processing = ReportStatus { status: "processing".into(), ..Default::default() };
        assert!(processing.is_processing());
        assert!(!processing.is_completed());

        let failed = ReportStatus { status: "failed".into(), ..Default::default() };
        assert!(!failed.is_processing());
        assert!(!failed.is_completed());
    }
}
