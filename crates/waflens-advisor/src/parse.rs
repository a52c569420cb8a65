use crate::{AnalysisRecommendation, AssessmentAnalysis};

/// Parse raw LLM output into a structured analysis. Models wrap JSON in
/// prose and code fences despite instructions, so the object is extracted
/// before parsing; a malformed object still gets a per-recommendation
/// salvage pass. Total failure degrades to a raw-text analysis.
pub fn parse_analysis(raw: &str) -> AssessmentAnalysis {
    let json_str = match extract_json_object(raw) {
        Some(s) => s,
        None => return raw_only(raw),
    };

    // Try the full object first
    if let Ok(analysis) = serde_json::from_str::<AssessmentAnalysis>(&json_str) {
        return analysis;
    }

    // Fall back to salvaging individual recommendation objects
    let recommendations = salvage_recommendations(&json_str);
    if recommendations.is_empty() {
        return raw_only(raw);
    }
    AssessmentAnalysis {
        recommendations,
        raw_response: Some(raw.to_string()),
        ..AssessmentAnalysis::default()
    }
}

fn raw_only(raw: &str) -> AssessmentAnalysis {
    AssessmentAnalysis {
        raw_response: Some(raw.to_string()),
        ..AssessmentAnalysis::default()
    }
}

/// Extract the outermost JSON object substring from raw LLM output.
fn extract_json_object(raw: &str) -> Option<String> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(raw[start..=end].to_string())
}

/// Walk the "recommendations" array of a malformed object and parse each
/// balanced `{...}` span on its own, keeping whatever deserializes.
fn salvage_recommendations(json_str: &str) -> Vec<AnalysisRecommendation> {
    let Some(key) = json_str.find("\"recommendations\"") else {
        return vec![];
    };
    let Some(array_start) = json_str[key..].find('[') else {
        return vec![];
    };
    let inner = &json_str[key + array_start..];

    let mut recommendations = Vec::new();
    let mut depth = 0;
    let mut start = None;

    for (i, ch) in inner.char_indices() {
        match ch {
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start {
                        let obj_str = &inner[s..=i];
                        if let Ok(rec) = serde_json::from_str::<AnalysisRecommendation>(obj_str) {
                            recommendations.push(rec);
                        }
                    }
                    start = None;
                }
            }
            ']' if depth == 0 => break,
            _ => {}
        }
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_analysis_parses_fully() {
        let raw = r#"{
            "score": 72,
            "summary": "Decent posture, gaps in key management.",
            "recommendations": [
                {"priority": "high", "title": "Rotate keys", "description": "Automate rotation.", "effort": "low", "impact": "high"}
            ],
            "quick_wins": ["Enable MFA"],
            "strategic_improvements": ["Adopt zero trust"]
        }"#;

        let analysis = parse_analysis(raw);
        assert_eq!(analysis.score, Some(72));
        assert_eq!(analysis.recommendations.len(), 1);
        assert_eq!(analysis.recommendations[0].title, "Rotate keys");
        assert_eq!(analysis.quick_wins, vec!["Enable MFA"]);
        assert!(analysis.raw_response.is_none());
    }

    #[test]
    fn object_is_extracted_from_surrounding_prose() {
        let raw = "Here is my analysis:\n```json\n{\"score\": 50, \"summary\": \"ok\"}\n```\nHope that helps!";
        let analysis = parse_analysis(raw);
        assert_eq!(analysis.score, Some(50));
        assert_eq!(analysis.summary, "ok");
    }

    #[test]
    fn malformed_object_salvages_recommendations() {
        // trailing comma breaks the full parse
        let raw = r#"{
            "score": "not a number",
            "recommendations": [
                {"priority": "high", "title": "Fix backups", "description": "Nightly snapshots."},
                {"priority": "broken...
            ]
        }"#;

        let analysis = parse_analysis(raw);
        assert_eq!(analysis.recommendations.len(), 1);
        assert_eq!(analysis.recommendations[0].title, "Fix backups");
        assert!(analysis.raw_response.is_some());
    }

    #[test]
    fn unparseable_output_carries_the_raw_text() {
        let raw = "I cannot answer that in JSON, sorry.";
        let analysis = parse_analysis(raw);
        assert!(analysis.recommendations.is_empty());
        assert_eq!(analysis.raw_response.as_deref(), Some(raw));
        assert_eq!(analysis.score, None);
    }
}
