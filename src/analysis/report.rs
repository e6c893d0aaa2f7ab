//! Analysis service response model

use serde::{Deserialize, Serialize};

fn default_label() -> String {
    "unknown".to_string()
}

fn default_features() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Summary returned by the analysis service
///
/// Fields the service leaves out take neutral defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(default = "default_label")]
    pub label: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub clarity: f64,
    #[serde(default)]
    pub fluency: f64,
    #[serde(default)]
    pub pace: f64,
    #[serde(rename = "featuresSummary", default = "default_features")]
    pub features_summary: serde_json::Value,
}

impl Default for AnalysisReport {
    fn default() -> Self {
        Self {
            label: default_label(),
            confidence: 0.0,
            clarity: 0.0,
            fluency: 0.0,
            pace: 0.0,
            features_summary: default_features(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_report() {
        let json = r#"{
            "label": "neutral",
            "confidence": 0.75,
            "clarity": 41.5,
            "fluency": 75.0,
            "pace": 38.2,
            "featuresSummary": {"pitch": 1910.0, "energy": 0.0083}
        }"#;
        let report: AnalysisReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.label, "neutral");
        assert_eq!(report.confidence, 0.75);
        assert_eq!(report.pace, 38.2);
        assert_eq!(report.features_summary["pitch"], 1910.0);
    }

    #[test]
    fn test_missing_fields_default() {
        let report: AnalysisReport = serde_json::from_str(r#"{"confidence": 0.5}"#).unwrap();
        assert_eq!(report.label, "unknown");
        assert_eq!(report.confidence, 0.5);
        assert_eq!(report.clarity, 0.0);
        assert!(report.features_summary.as_object().unwrap().is_empty());
    }

    #[test]
    fn test_serializes_camel_case_summary() {
        let value = serde_json::to_value(AnalysisReport::default()).unwrap();
        assert!(value.get("featuresSummary").is_some());
        assert!(value.get("features_summary").is_none());
    }
}
