//! Prompt templates for the advisory flow. Deterministic wrapping: the
//! user's prompt is embedded verbatim, nothing else is assembled.

use serde_json::Value;

/// Role framing shared by every advisory call.
pub fn system_prompt() -> &'static str {
    "You are an expert Cloud Architect and an assistant for the \"WAFLens\" \
     application (Well-Architected Framework Lens)."
}

/// The fixed instructional template naming the five pillars, framing the
/// user's prompt verbatim.
pub fn advisory_prompt(user_prompt: &str) -> String {
    format!(
        "Your goal is to help users improve their cloud architecture based on the 5 pillars:\n\
         1. Operational Excellence\n\
         2. Security\n\
         3. Reliability\n\
         4. Performance Efficiency\n\
         5. Cost Optimization\n\n\
         User Prompt: {}\n\n\
         Provide a helpful, professional, and concise answer.",
        user_prompt
    )
}

/// Template for assessment analysis: asks the model to score one pillar's
/// responses and answer in JSON.
pub fn analysis_prompt(pillar: &str, responses: &[Value]) -> String {
    let responses_json =
        serde_json::to_string_pretty(responses).unwrap_or_else(|_| "[]".to_string());
    format!(
        "Analyze the following {} pillar assessment responses and provide:\n\
         1. An overall score (0-100)\n\
         2. Top 3 prioritized recommendations\n\
         3. Quick wins that can be implemented immediately\n\
         4. Long-term strategic improvements\n\n\
         Assessment Responses:\n{}\n\n\
         Respond in JSON format:\n\
         {{\n\
         \x20   \"score\": <number>,\n\
         \x20   \"summary\": \"<brief summary>\",\n\
         \x20   \"recommendations\": [\n\
         \x20       {{\n\
         \x20           \"priority\": \"high|medium|low\",\n\
         \x20           \"title\": \"<recommendation title>\",\n\
         \x20           \"description\": \"<detailed description>\",\n\
         \x20           \"effort\": \"low|medium|high\",\n\
         \x20           \"impact\": \"low|medium|high\"\n\
         \x20       }}\n\
         \x20   ],\n\
         \x20   \"quick_wins\": [\"<quick win 1>\", \"<quick win 2>\"],\n\
         \x20   \"strategic_improvements\": [\"<improvement 1>\", \"<improvement 2>\"]\n\
         }}\n\
         Output ONLY the JSON object, nothing else.",
        pillar.to_uppercase(),
        responses_json
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn advisory_template_frames_the_prompt_verbatim() {
        let out = advisory_prompt("How do I reduce cost?");
        assert!(out.contains("User Prompt: How do I reduce cost?"));
        for pillar in [
            "Operational Excellence",
            "Security",
            "Reliability",
            "Performance Efficiency",
            "Cost Optimization",
        ] {
            assert!(out.contains(pillar), "template must name {}", pillar);
        }
    }

    #[test]
    fn analysis_template_embeds_pillar_and_responses() {
        let out = analysis_prompt("security", &[json!({"question": "q1", "answer": "yes"})]);
        assert!(out.contains("SECURITY pillar assessment responses"));
        assert!(out.contains("\"question\": \"q1\""));
        assert!(out.contains("Output ONLY the JSON object"));
    }
}
