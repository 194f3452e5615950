//! LLM-assisted search query planning.
//!
//! A phrase is often a poor image search query: searching for "come ti
//! chiami" verbatim mostly finds pictures of the written phrase. One
//! text-only model call rewrites the whole phrase list into search queries.
//! Callers fall back to the raw phrases when planning fails.

use thiserror::Error;

use crate::ai::prompts::{render_query_plan_prompt, QUERY_PLAN_PREFILL, QUERY_PLAN_SYSTEM_PROMPT};
use crate::ai::{AiError, ChatMessage, ChatRequest, ContentBlock, VisionClient};
use crate::types::PhraseQuery;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("query planning provider error: {0}")]
    Provider(#[from] AiError),

    #[error("failed to parse query array: {0}")]
    Parse(String),

    #[error("expected {expected} queries, model returned {got}")]
    CountMismatch { expected: usize, got: usize },
}

/// Plan one search query per phrase.
pub async fn plan_queries<V: VisionClient>(
    client: &V,
    phrases: &[String],
    source_language: &str,
) -> Result<Vec<PhraseQuery>, PlanError> {
    let prompt = render_query_plan_prompt(phrases, source_language);

    let request = ChatRequest {
        system: QUERY_PLAN_SYSTEM_PROMPT.to_string(),
        messages: vec![
            ChatMessage::user(vec![ContentBlock::text(prompt)]),
            ChatMessage::assistant_prefill(QUERY_PLAN_PREFILL),
        ],
        max_tokens: 1000,
    };

    let completion = client.complete(request).await?;

    let raw = format!("{}{}", QUERY_PLAN_PREFILL, completion.trim());
    let queries: Vec<String> =
        serde_json::from_str(&raw).map_err(|e| PlanError::Parse(e.to_string()))?;

    if queries.len() != phrases.len() {
        return Err(PlanError::CountMismatch {
            expected: phrases.len(),
            got: queries.len(),
        });
    }

    Ok(phrases
        .iter()
        .zip(queries)
        .map(|(phrase, query)| PhraseQuery::new(phrase.clone(), query))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::FakeVisionClient;

    fn phrases() -> Vec<String> {
        vec!["come ti chiami".to_string(), "la mela".to_string()]
    }

    #[tokio::test]
    async fn pairs_queries_with_phrases() {
        let client = FakeVisionClient::new()
            .with_default_response("\"people introducing themselves\", \"apple\"]");
        let planned = plan_queries(&client, &phrases(), "italian").await.unwrap();
        assert_eq!(
            planned,
            vec![
                PhraseQuery::new("come ti chiami", "people introducing themselves"),
                PhraseQuery::new("la mela", "apple"),
            ]
        );
    }

    #[tokio::test]
    async fn wrong_length_is_a_count_mismatch() {
        let client = FakeVisionClient::new().with_default_response("\"only one\"]");
        let result = plan_queries(&client, &phrases(), "italian").await;
        assert!(matches!(result, Err(PlanError::CountMismatch { .. })));
    }

    #[tokio::test]
    async fn malformed_completion_is_a_parse_error() {
        let client = FakeVisionClient::new().with_default_response("sure, here are queries");
        let result = plan_queries(&client, &phrases(), "italian").await;
        assert!(matches!(result, Err(PlanError::Parse(_))));
    }
}
