mod engine;
mod parse;
pub mod prompt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use waflens_core::AiSettings;

/// Input to the advisory flow.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct AdvisoryRequest {
    /// The user's question about their architecture.
    pub prompt: String,
}

/// The advisory answer. `response` is the upstream model's text verbatim;
/// `sources` is reserved for future citation support and is always empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
pub struct AdvisoryAnswer {
    pub response: String,
    pub sources: Vec<String>,
}

impl AdvisoryAnswer {
    fn from_model_text(text: String) -> AdvisoryAnswer {
        AdvisoryAnswer {
            response: text,
            sources: Vec::new(),
        }
    }
}

/// Forward a free-text prompt through the fixed advisory template. No
/// retrieval, no prior turns, no context from the data store; any upstream
/// failure propagates as a generic error string.
pub async fn ask(settings: &AiSettings, request: &AdvisoryRequest) -> Result<AdvisoryAnswer, String> {
    let system = prompt::system_prompt();
    let user_msg = prompt::advisory_prompt(&request.prompt);

    eprintln!(
        "[waflens-advisor] asking {} ({})",
        settings.provider, settings.model
    );

    let text = engine::generate(settings, system, &user_msg).await?;
    Ok(AdvisoryAnswer::from_model_text(text))
}

/// One structured recommendation out of an assessment analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
pub struct AnalysisRecommendation {
    pub priority: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub effort: String,
    #[serde(default)]
    pub impact: String,
}

/// Structured result of analyzing one pillar's assessment responses.
/// When the model's output cannot be parsed, the fields are empty and
/// `raw_response` carries the text instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
pub struct AssessmentAnalysis {
    #[serde(default)]
    pub score: Option<u8>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub recommendations: Vec<AnalysisRecommendation>,
    #[serde(default)]
    pub quick_wins: Vec<String>,
    #[serde(default)]
    pub strategic_improvements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

/// Analyze assessment responses for one pillar and return prioritized
/// recommendations. Parse failures degrade to a raw-text analysis rather
/// than erroring; the raw prose is still worth showing.
pub async fn analyze(
    settings: &AiSettings,
    pillar: &str,
    responses: &[Value],
) -> Result<AssessmentAnalysis, String> {
    let system = prompt::system_prompt();
    let user_msg = prompt::analysis_prompt(pillar, responses);

    let raw = engine::generate(settings, system, &user_msg).await?;
    Ok(parse::parse_analysis(&raw))
}
