/// JSON messages exchanged with the page.
///
/// Notifications keep their `{type, prop?, data}` shape. A decode ends with
/// one outcome message: `{"type":"done","data":{...}}` or
/// `{"type":"error","data":"..."}`.
use serde::Serialize;
use stlscope_core::notify::format_byte_size;
use stlscope_core::{DecodeError, DecodeOptions, DecodeOutput, Format, Notification};

/// Everything about a finished decode except the buffers themselves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodeSummary {
    pub format: Format,
    pub byte_size: u64,
    pub size: String,
    pub facet_count: u32,
    pub colors: bool,
    pub alpha: Option<f32>,
    pub min: [f32; 3],
    pub max: [f32; 3],
    pub centroid: [f32; 3],
    pub recentered: bool,
}

impl From<&DecodeOutput> for DecodeSummary {
    fn from(output: &DecodeOutput) -> Self {
        let b = &output.bounds;
        Self {
            format: output.metadata.format,
            byte_size: output.metadata.byte_size,
            size: format_byte_size(output.metadata.byte_size),
            facet_count: output.metadata.facet_count,
            colors: output.mesh.has_colors(),
            alpha: output.mesh.alpha,
            min: b.min.coords.into(),
            max: b.max.coords.into(),
            centroid: b.centroid.coords.into(),
            recentered: output.recentered,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum Outcome {
    Done(DecodeSummary),
    Error(String),
}

impl Outcome {
    pub fn from_result(result: Result<&DecodeOutput, &DecodeError>) -> Self {
        match result {
            Ok(output) => Outcome::Done(output.into()),
            Err(err) => Outcome::Error(err.to_string()),
        }
    }
}

/// Options arrive as JSON; an empty or blank string means the defaults.
/// Missing fields take their default values.
pub fn parse_options(json: &str) -> Result<DecodeOptions, String> {
    if json.trim().is_empty() {
        return Ok(DecodeOptions::default());
    }
    serde_json::from_str(json).map_err(|e| format!("invalid decode options: {}", e))
}

pub fn notification_json(notification: &Notification) -> String {
    to_json(notification)
}

pub fn outcome_json(outcome: &Outcome) -> String {
    to_json(outcome)
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        format!(r#"{{"type":"error","data":"serialization failed: {}"}}"#, e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use stlscope_core::{decode, write_binary, FacetRecord, InfoKey};

    fn two_facets() -> Vec<u8> {
        let record = FacetRecord {
            normal: [0.0, 0.0, 1.0],
            vertices: [[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 2.0, 1.0]],
            attribute: 0,
        };
        write_binary(&[0u8; 80], &[record, record])
    }

    fn parsed(json: String) -> Value {
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_notifications_keep_worker_shape() {
        let info = Notification::Info {
            prop: InfoKey::Size,
            data: "184 Bytes".to_string(),
        };
        assert_eq!(
            parsed(notification_json(&info)),
            json!({"type": "info", "prop": "size", "data": "184 Bytes"})
        );
        assert_eq!(
            parsed(notification_json(&Notification::Progress { percent: 40 })),
            json!({"type": "progress", "data": 40})
        );
    }

    #[test]
    fn test_done_message() {
        let output = decode(&two_facets()).unwrap();
        let message = parsed(outcome_json(&Outcome::from_result(Ok(&output))));

        assert_eq!(message["type"], "done");
        let data = &message["data"];
        assert_eq!(data["format"], "binary");
        assert_eq!(data["byte_size"], 184);
        assert_eq!(data["size"], "184 Bytes");
        assert_eq!(data["facet_count"], 2);
        assert_eq!(data["colors"], false);
        assert_eq!(data["alpha"], Value::Null);
        assert_eq!(data["max"], json!([2.0, 2.0, 1.0]));
        assert_eq!(data["recentered"], false);
    }

    #[test]
    fn test_error_message() {
        let err = decode(&[0u8; 12]).unwrap_err();
        let message = parsed(outcome_json(&Outcome::from_result(Err(&err))));

        assert_eq!(message["type"], "error");
        assert!(message["data"].as_str().unwrap().contains("out of bounds"));
    }

    #[test]
    fn test_parse_options() {
        assert_eq!(parse_options("").unwrap(), DecodeOptions::default());
        assert_eq!(parse_options("  ").unwrap(), DecodeOptions::default());

        let options = parse_options(r#"{"recenter": false}"#).unwrap();
        assert!(!options.recenter);
        assert_eq!(options.progress_interval, DecodeOptions::default().progress_interval);

        assert!(parse_options("{recenter").unwrap_err().starts_with("invalid decode options"));
    }
}
