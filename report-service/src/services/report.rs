//! Report assembly: prompt construction and completion-text splitting.
//!
//! The completion service returns free prose; everything here is pure
//! string work. The generate variant splits one response at fixed
//! heading markers, the enhance variant greps per-section insight
//! blocks out of the response with anchored regexes.

use chrono::Utc;
use regex::Regex;
use thiserror::Error;

use crate::models::{Metrics, Report, ReportSection};

/// Title given to every generated report.
pub const REPORT_TITLE: &str = "AI-Generated Strategic Analysis";

/// System instruction for the generate variant.
pub const GENERATE_SYSTEM_PROMPT: &str =
    "You are an expert SaaS CFO providing strategic analysis and recommendations.";

/// System instruction for the enhance variant.
pub const ENHANCE_SYSTEM_PROMPT: &str =
    "You are an expert SaaS CFO providing strategic analysis and recommendations. \
     Focus on actionable insights and specific implementation steps.";

/// Heading markers delimiting the generated analysis, in the order the
/// model is instructed to emit them.
const SECTION_MARKERS: [&str; 4] = [
    "Key Performance Analysis",
    "Risk Factors",
    "Growth Opportunities",
    "Strategic Recommendations",
];

/// Titles of the assembled report sections.
const SECTION_TITLES: [&str; 5] = [
    "Executive Summary",
    "Key Performance Analysis",
    "Risk Assessment",
    "Growth Opportunities",
    "Strategic Recommendations",
];

/// Label under which per-section insight text is appended.
const INSIGHTS_LABEL: &str = "\n\nStrategic Insights:\n";

#[derive(Debug, Error)]
pub enum SectionExtractError {
    #[error("marker \"{0}\" not found in completion text")]
    MarkerNotFound(String),
}

/// Build the user prompt for a fresh report from raw metrics.
pub fn generate_prompt(metrics: &Metrics) -> String {
    format!(
        "As an expert SaaS financial analyst, analyze these metrics and provide strategic insights:\n\
         \n\
         Current Metrics:\n\
         - MRR: ${}\n\
         - Subscribers: {}\n\
         - Churn Rate: {}%\n\
         - Growth Rate: {}%\n\
         \n\
         Please provide:\n\
         1. Executive Summary\n\
         2. Key Performance Analysis\n\
         3. Risk Factors\n\
         4. Growth Opportunities\n\
         5. Strategic Recommendations\n\
         \n\
         Format the response in clear sections with actionable insights.",
        metrics.mrr, metrics.subscribers, metrics.churn_rate, metrics.growth_rate
    )
}

/// Build the user prompt for enhancing an existing report.
pub fn enhance_prompt(sections: &[ReportSection], metrics: &Metrics) -> String {
    let current_report = sections
        .iter()
        .map(|section| format!("{}:\n{}", section.title, section.content))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "As an experienced SaaS CFO and financial analyst, review and enhance the following \
         financial report with strategic insights and actionable recommendations. Focus on \
         identifying key opportunities, risks, and specific action items.\n\
         \n\
         Current Report:\n\
         {}\n\
         \n\
         Key Metrics:\n\
         - MRR: ${}\n\
         - Subscribers: {}\n\
         - Churn Rate: {}%\n\
         - Growth Rate: {}%\n\
         \n\
         Provide enhanced analysis focusing on:\n\
         1. Strategic implications of the current metrics\n\
         2. Specific, actionable recommendations\n\
         3. Risk mitigation strategies\n\
         4. Growth opportunities\n\
         5. Operational improvements\n\
         \n\
         For each section, add detailed insights and concrete action items that the business \
         can implement.",
        current_report, metrics.mrr, metrics.subscribers, metrics.churn_rate, metrics.growth_rate
    )
}

/// Split `text` into the segments lying strictly between consecutive
/// `markers`, trimmed of surrounding whitespace.
///
/// Returns `markers.len() + 1` segments: the text before the first
/// marker, the text between each pair, and the text after the last.
/// Markers must appear in the given order; a marker that never appears
/// after its predecessor is an explicit error rather than a bad slice.
pub fn split_by_markers<'a>(
    text: &'a str,
    markers: &[&str],
) -> Result<Vec<&'a str>, SectionExtractError> {
    let mut segments = Vec::with_capacity(markers.len() + 1);
    let mut rest = text;

    for marker in markers {
        let at = rest
            .find(marker)
            .ok_or_else(|| SectionExtractError::MarkerNotFound((*marker).to_string()))?;
        segments.push(rest[..at].trim());
        rest = &rest[at + marker.len()..];
    }
    segments.push(rest.trim());

    Ok(segments)
}

/// Assemble a five-section report from the completion text returned for
/// a generate request. The model is instructed to emit the sections in
/// a fixed order; their headings are the split points.
pub fn assemble_report(analysis: &str) -> Result<Report, SectionExtractError> {
    let segments = split_by_markers(analysis, &SECTION_MARKERS)?;

    let sections: Vec<ReportSection> = SECTION_TITLES
        .iter()
        .zip(segments)
        .map(|(title, content)| ReportSection {
            title: (*title).to_string(),
            content: content.to_string(),
        })
        .collect();

    Ok(Report {
        title: REPORT_TITLE.to_string(),
        date: Utc::now(),
        summary: sections[0].content.clone(),
        sections,
    })
}

/// Append the model's per-section insights to each caller-supplied
/// section and add one trailing "Strategic Recommendations" section.
/// Output length is always `sections.len() + 1`.
pub fn enhance_sections(sections: &[ReportSection], analysis: &str) -> Vec<ReportSection> {
    let mut enhanced: Vec<ReportSection> = sections
        .iter()
        .map(|section| ReportSection {
            title: section.title.clone(),
            content: format!(
                "{}{}{}",
                section.content,
                INSIGHTS_LABEL,
                extract_section_insights(analysis, &section.title)
            ),
        })
        .collect();

    enhanced.push(ReportSection {
        title: "Strategic Recommendations".to_string(),
        content: extract_recommendations(analysis),
    });

    enhanced
}

/// Extract the insight text the model produced for one section title.
///
/// The capture is anchored at the title followed by a colon or newline,
/// case-insensitive, and runs until a blank line or the end of the
/// text. No match yields the empty string, never an error.
pub fn extract_section_insights(analysis: &str, section_title: &str) -> String {
    capture_after_anchor(analysis, &regex::escape(section_title))
}

/// Extract the recommendations block from the completion text, matching
/// the word with or without its plural ending.
pub fn extract_recommendations(analysis: &str) -> String {
    capture_after_anchor(analysis, "recommendations?")
}

fn capture_after_anchor(analysis: &str, anchor: &str) -> String {
    // The capture consumes the terminating blank line instead of
    // looking ahead at it; only group 1 is used, so the result is the
    // same block of text.
    let pattern = format!(r"(?is){}[:\n](.*?)(?:\n\n|$)", anchor);
    match Regex::new(&pattern) {
        Ok(re) => re
            .captures(analysis)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default(),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> Metrics {
        Metrics {
            mrr: 10000.0,
            subscribers: 200.0,
            churn_rate: 5.0,
            growth_rate: 12.0,
        }
    }

    const ANALYSIS: &str = "\
The business shows strong momentum this quarter.

Key Performance Analysis
MRR growth is outpacing subscriber growth, indicating expansion revenue.

Risk Factors
Churn at 5% erodes roughly half of new bookings.

Growth Opportunities
Annual plans and usage-based tiers remain untapped.

Strategic Recommendations
Prioritize churn reduction before increasing acquisition spend.";

    #[test]
    fn split_by_markers_returns_segments_between_markers() {
        let segments = split_by_markers(ANALYSIS, &SECTION_MARKERS).expect("markers present");

        assert_eq!(segments.len(), 5);
        assert_eq!(
            segments[0],
            "The business shows strong momentum this quarter."
        );
        assert_eq!(
            segments[1],
            "MRR growth is outpacing subscriber growth, indicating expansion revenue."
        );
        assert_eq!(
            segments[4],
            "Prioritize churn reduction before increasing acquisition spend."
        );
    }

    #[test]
    fn split_by_markers_trims_surrounding_whitespace() {
        let segments =
            split_by_markers("  before \n\nMARK\n  after  ", &["MARK"]).expect("marker present");

        assert_eq!(segments, vec!["before", "after"]);
    }

    #[test]
    fn split_by_markers_reports_the_missing_marker() {
        let err = split_by_markers("no headings here", &["Risk Factors"]).unwrap_err();

        match err {
            SectionExtractError::MarkerNotFound(marker) => assert_eq!(marker, "Risk Factors"),
        }
    }

    #[test]
    fn split_by_markers_requires_markers_in_order() {
        // Second marker only appears before the first one.
        let err = split_by_markers("B then A", &["A", "B"]).unwrap_err();

        match err {
            SectionExtractError::MarkerNotFound(marker) => assert_eq!(marker, "B"),
        }
    }

    #[test]
    fn assemble_report_produces_five_titled_sections() {
        let report = assemble_report(ANALYSIS).expect("markers present");

        assert_eq!(report.title, REPORT_TITLE);
        assert_eq!(report.sections.len(), 5);
        assert_eq!(report.sections[0].title, "Executive Summary");
        assert_eq!(report.sections[2].title, "Risk Assessment");
        assert_eq!(report.summary, report.sections[0].content);
    }

    #[test]
    fn assemble_report_fails_on_missing_marker() {
        let partial = "Summary.\n\nKey Performance Analysis\nFine.";

        assert!(assemble_report(partial).is_err());
    }

    #[test]
    fn extract_section_insights_is_case_insensitive() {
        let analysis = "revenue overview:\nExpansion revenue carries growth.\n\nNext:\nmore";

        assert_eq!(
            extract_section_insights(analysis, "Revenue Overview"),
            "Expansion revenue carries growth."
        );
    }

    #[test]
    fn extract_section_insights_stops_at_blank_line() {
        let analysis = "Customer Health:\nChurn is concentrated.\nIn one tier.\n\nUnrelated text.";

        assert_eq!(
            extract_section_insights(analysis, "Customer Health"),
            "Churn is concentrated.\nIn one tier."
        );
    }

    #[test]
    fn extract_section_insights_returns_empty_when_title_absent() {
        assert_eq!(extract_section_insights(ANALYSIS, "Unrelated Title"), "");
    }

    #[test]
    fn extract_section_insights_escapes_regex_metacharacters() {
        let analysis = "Q&A (FY24):\nAll answered.";

        assert_eq!(extract_section_insights(analysis, "Q&A (FY24)"), "All answered.");
    }

    #[test]
    fn extract_recommendations_matches_singular_and_plural() {
        assert_eq!(
            extract_recommendations("Recommendation:\nShip annual plans."),
            "Ship annual plans."
        );
        assert_eq!(
            extract_recommendations("Recommendations:\nShip annual plans."),
            "Ship annual plans."
        );
    }

    #[test]
    fn extract_recommendations_returns_empty_when_absent() {
        assert_eq!(extract_recommendations("Nothing actionable here."), "");
    }

    #[test]
    fn enhance_sections_appends_exactly_one_section() {
        let sections = vec![
            ReportSection {
                title: "Revenue Overview".to_string(),
                content: "MRR was $10,000.".to_string(),
            },
            ReportSection {
                title: "Customer Health".to_string(),
                content: "Churn was 5%.".to_string(),
            },
        ];
        let analysis = "\
Revenue Overview:
Protect expansion revenue with annual contracts.

Customer Health:
Churn is concentrated in the self-serve tier.

Recommendations:
Introduce annual billing.";

        let enhanced = enhance_sections(&sections, analysis);

        assert_eq!(enhanced.len(), 3);
        assert_eq!(
            enhanced[0].content,
            "MRR was $10,000.\n\nStrategic Insights:\nProtect expansion revenue with annual contracts."
        );
        assert!(enhanced[1].content.starts_with("Churn was 5%."));
        assert_eq!(enhanced[2].title, "Strategic Recommendations");
        assert_eq!(enhanced[2].content, "Introduce annual billing.");
    }

    #[test]
    fn enhance_sections_tolerates_unmatched_titles() {
        let sections = vec![ReportSection {
            title: "Unmatched Title".to_string(),
            content: "Original.".to_string(),
        }];

        let enhanced = enhance_sections(&sections, "No headings at all.");

        assert_eq!(enhanced.len(), 2);
        assert_eq!(enhanced[0].content, "Original.\n\nStrategic Insights:\n");
        assert_eq!(enhanced[1].content, "");
    }

    #[test]
    fn generate_prompt_embeds_all_metric_values() {
        let prompt = generate_prompt(&metrics());

        assert!(prompt.contains("- MRR: $10000"));
        assert!(prompt.contains("- Subscribers: 200"));
        assert!(prompt.contains("- Churn Rate: 5%"));
        assert!(prompt.contains("- Growth Rate: 12%"));
        assert!(prompt.contains("5. Strategic Recommendations"));
    }

    #[test]
    fn enhance_prompt_embeds_sections_and_metrics() {
        let sections = vec![ReportSection {
            title: "Revenue Overview".to_string(),
            content: "MRR was $10,000.".to_string(),
        }];

        let prompt = enhance_prompt(&sections, &metrics());

        assert!(prompt.contains("Revenue Overview:\nMRR was $10,000."));
        assert!(prompt.contains("- Churn Rate: 5%"));
        assert!(prompt.contains("5. Operational improvements"));
    }
}
