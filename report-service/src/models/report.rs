//! Report domain types and request payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time SaaS business metrics supplied by the caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub mrr: f64,
    pub subscribers: f64,
    pub churn_rate: f64,
    pub growth_rate: f64,
}

/// A titled block of report text, either supplied by the caller or
/// derived from completion output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSection {
    pub title: String,
    pub content: String,
}

/// A fully assembled analysis report. Constructed once per request and
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub title: String,
    pub date: DateTime<Utc>,
    pub summary: String,
    pub sections: Vec<ReportSection>,
}

/// Body of `POST /generate-report`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateReportRequest {
    pub report_data: Option<Metrics>,
}

/// Body of `POST /enhance-report`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnhanceReportRequest {
    pub initial_report: Option<Vec<ReportSection>>,
    pub metrics: Option<Metrics>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_use_camel_case_on_the_wire() {
        let metrics: Metrics =
            serde_json::from_str(r#"{"mrr":10000,"subscribers":200,"churnRate":5,"growthRate":12}"#)
                .expect("valid metrics payload");

        assert_eq!(metrics.churn_rate, 5.0);
        assert_eq!(metrics.growth_rate, 12.0);
    }

    #[test]
    fn report_round_trips_through_json() {
        let report = Report {
            title: "Quarterly Analysis".to_string(),
            date: chrono::Utc::now(),
            summary: "Steady growth.".to_string(),
            sections: vec![ReportSection {
                title: "Executive Summary".to_string(),
                content: "Steady growth.".to_string(),
            }],
        };

        let encoded = serde_json::to_string(&report).expect("report serializes");
        let decoded: Report = serde_json::from_str(&encoded).expect("report deserializes");

        assert_eq!(decoded.title, report.title);
        assert_eq!(decoded.summary, report.summary);
        assert_eq!(decoded.sections, report.sections);
    }
}
