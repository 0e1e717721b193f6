//! Lexical post-processing of the model's answer.
//!
//! Keyword matching on free text is approximate: "buy" also matches
//! "buyback", and a negated "do not buy" still reads as BUY.

use tickwise_models::{Confidence, Recommendation, RiskLevel};

use crate::orchestrator::ToolInvocation;
use crate::tools::ToolKind;

/// BUY if the answer mentions "buy", else SELL if it mentions "sell", else
/// HOLD. Case-insensitive substring matching.
pub fn classify(answer: &str) -> (Recommendation, Confidence) {
    let lower = answer.to_lowercase();
    if lower.contains("buy") {
        let confidence = if lower.contains("strong") || lower.contains("recommend") {
            Confidence::High
        } else {
            Confidence::Medium
        };
        (Recommendation::Buy, confidence)
    } else if lower.contains("sell") {
        let confidence = if lower.contains("strong") {
            Confidence::High
        } else {
            Confidence::Medium
        };
        (Recommendation::Sell, confidence)
    } else {
        (Recommendation::Hold, Confidence::Medium)
    }
}

/// `Risk Level=<X>` from the most recent risk tool result, if any.
pub fn assessed_risk_level(invocations: &[ToolInvocation]) -> Option<RiskLevel> {
    invocations
        .iter()
        .rev()
        .filter(|inv| inv.tool == ToolKind::RiskAssessment.name())
        .find_map(|inv| parse_risk_level(&inv.output))
}

fn parse_risk_level(output: &str) -> Option<RiskLevel> {
    let (_, rest) = output.split_once("Risk Level=")?;
    let label: String = rest.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    RiskLevel::parse(&label)
}

/// Cut `text` to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
