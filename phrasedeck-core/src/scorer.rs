//! Semantic match scoring of validated candidates against a phrase.
//!
//! One multimodal request carries every validated candidate's payload (in
//! order) plus the scoring instruction naming the phrase. The model must
//! answer with a flat JSON array of integers, one score per candidate, same
//! order. The parse is strict: wrong length, non-integer entries, or values
//! outside [0, 10] fail the phrase rather than fabricate a score.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

use crate::ai::prompts::{render_score_prompt, SCORE_PREFILL, SCORE_SYSTEM_PROMPT};
use crate::ai::{AiError, ChatMessage, ChatRequest, ContentBlock, VisionClient};
use crate::types::FetchedCandidate;

/// Scores are integers in [0, MAX_SCORE].
pub const MAX_SCORE: i64 = 10;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("scoring provider error: {0}")]
    Provider(#[from] AiError),

    #[error("failed to parse score array: {0}")]
    Parse(String),

    #[error("expected {expected} scores, model returned {got}")]
    CountMismatch { expected: usize, got: usize },
}

/// Score every candidate against the phrase.
///
/// Returns one score per candidate, in candidate order. Provider errors are
/// not retried; all errors are scoped to the current phrase.
pub async fn score_candidates<V: VisionClient>(
    client: &V,
    phrase: &str,
    candidates: &[FetchedCandidate],
) -> Result<Vec<u8>, ScoreError> {
    let mut content: Vec<ContentBlock> = candidates
        .iter()
        .map(|c| ContentBlock::image(c.mime, STANDARD.encode(&c.data)))
        .collect();
    content.push(ContentBlock::text(render_score_prompt(phrase)));

    let request = ChatRequest {
        system: SCORE_SYSTEM_PROMPT.to_string(),
        messages: vec![
            ChatMessage::user(content),
            ChatMessage::assistant_prefill(SCORE_PREFILL),
        ],
        max_tokens: 1024,
    };

    let completion = client.complete(request).await?;
    parse_scores(&completion, candidates.len())
}

/// Parse a prefilled completion into exactly `expected` scores.
fn parse_scores(completion: &str, expected: usize) -> Result<Vec<u8>, ScoreError> {
    // The model continues after the "[" prefill, so the completion is the
    // array body without its opening bracket.
    let raw = format!("{}{}", SCORE_PREFILL, completion.trim());

    let scores: Vec<i64> =
        serde_json::from_str(&raw).map_err(|e| ScoreError::Parse(e.to_string()))?;

    if scores.len() != expected {
        return Err(ScoreError::CountMismatch {
            expected,
            got: scores.len(),
        });
    }

    scores
        .into_iter()
        .map(|s| {
            if (0..=MAX_SCORE).contains(&s) {
                Ok(s as u8)
            } else {
                Err(ScoreError::Parse(format!("score {} out of range", s)))
            }
        })
        .collect()
}
