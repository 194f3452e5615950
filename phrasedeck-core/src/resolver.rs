//! The phrase-to-image resolution pipeline.
//!
//! Per phrase: Searching, Fetching, Validating, Scoring, Selecting. Failure
//! scoping follows three tiers:
//! - per-candidate (fetch/validation drops): swallowed and logged;
//! - per-phrase (scoring errors, no usable candidates): the phrase resolves
//!   to `Unresolved` and the batch continues;
//! - per-batch (search provider failure after its retry): fail-fast, the
//!   remaining phrases are not processed. Aborting beats silently shipping
//!   an incomplete deck.

use crate::ai::VisionClient;
use crate::http::HttpClient;
use crate::image::{fetch_candidates, validate_candidates};
use crate::scorer::score_candidates;
use crate::search::{SearchError, SearchProvider};
use crate::types::{Candidate, ConfidenceTier, PhraseQuery, Resolution};

/// Pipeline configuration, threaded explicitly rather than read from a
/// process-wide flag.
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    /// When false, the pipeline skips fetching, validation, and scoring and
    /// picks by the provider's own confidence tiers.
    pub use_ai: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self { use_ai: true }
    }
}

/// Drives search, fetch, validation, scoring, and selection for each phrase.
pub struct Resolver<S, C, V> {
    search: S,
    http: C,
    vision: V,
    options: ResolveOptions,
}

impl<S, C, V> Resolver<S, C, V>
where
    S: SearchProvider,
    C: HttpClient,
    V: VisionClient,
{
    pub fn new(search: S, http: C, vision: V, options: ResolveOptions) -> Self {
        Self {
            search,
            http,
            vision,
            options,
        }
    }

    /// Resolve a batch of phrases, in order.
    ///
    /// The result list is append-only and parallel to the input. A search
    /// error aborts the whole batch; every other failure is scoped to its
    /// phrase.
    pub async fn resolve_batch(
        &self,
        items: &[PhraseQuery],
    ) -> Result<Vec<Resolution>, SearchError> {
        let mut resolutions = Vec::with_capacity(items.len());
        for item in items {
            let resolution = self.resolve_phrase(item).await?;
            resolutions.push(resolution);
        }
        Ok(resolutions)
    }

    /// Resolve a single phrase to an image.
    pub async fn resolve_phrase(&self, item: &PhraseQuery) -> Result<Resolution, SearchError> {
        let candidates = self.search.search(&item.query).await?;

        if candidates.is_empty() {
            tracing::warn!(phrase = %item.phrase, "search returned no candidates");
            return Ok(Resolution::Unresolved {
                phrase: item.phrase.clone(),
                reason: "search returned no candidates".to_string(),
            });
        }

        if !self.options.use_ai {
            return Ok(resolve_by_confidence(&item.phrase, &candidates));
        }

        let fetched = fetch_candidates(&self.http, &candidates).await;
        let valid = validate_candidates(fetched);

        if valid.is_empty() {
            tracing::warn!(phrase = %item.phrase, "no candidate survived fetch and validation");
            return Ok(Resolution::Unresolved {
                phrase: item.phrase.clone(),
                reason: "no candidate survived fetch and validation".to_string(),
            });
        }

        let scores = match score_candidates(&self.vision, &item.phrase, &valid).await {
            Ok(scores) => scores,
            Err(e) => {
                tracing::warn!(phrase = %item.phrase, error = %e, "scoring failed");
                return Ok(Resolution::Unresolved {
                    phrase: item.phrase.clone(),
                    reason: e.to_string(),
                });
            }
        };

        // Ties break to the first maximum. The winner's original_index maps
        // the selection back into the unfiltered candidate list.
        let best = select_best(&scores);
        let original_index = valid[best].original_index;

        Ok(Resolution::Resolved {
            phrase: item.phrase.clone(),
            image_url: candidates[original_index].url.clone(),
        })
    }
}

/// Index of the maximum score; ties break to the lowest index.
fn select_best(scores: &[u8]) -> usize {
    let mut best = 0;
    for (i, &score) in scores.iter().enumerate() {
        if score > scores[best] {
            best = i;
        }
    }
    best
}

/// Confidence-only selection: first High result, else first Medium, else the
/// first result.
fn resolve_by_confidence(phrase: &str, candidates: &[Candidate]) -> Resolution {
    let chosen = candidates
        .iter()
        .find(|c| c.confidence == ConfidenceTier::High)
        .or_else(|| {
            candidates
                .iter()
                .find(|c| c.confidence == ConfidenceTier::Medium)
        })
        .unwrap_or(&candidates[0]);

    Resolution::Resolved {
        phrase: phrase.to_string(),
        image_url: chosen.url.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImageMime;

    fn candidate(url: &str, confidence: ConfidenceTier) -> Candidate {
        Candidate {
            url: url.to_string(),
            mime: ImageMime::Jpeg,
            confidence,
        }
    }

    #[test]
    fn select_best_breaks_ties_to_lowest_index() {
        assert_eq!(select_best(&[2, 9, 4]), 1);
        assert_eq!(select_best(&[5, 5, 2]), 0);
        assert_eq!(select_best(&[0]), 0);
        assert_eq!(select_best(&[3, 7, 7, 7]), 1);
    }

    #[test]
    fn confidence_prefers_high_then_medium_then_first() {
        let with_high = vec![
            candidate("http://img/low.jpg", ConfidenceTier::Low),
            candidate("http://img/med.jpg", ConfidenceTier::Medium),
            candidate("http://img/high.jpg", ConfidenceTier::High),
        ];
        assert_eq!(
            resolve_by_confidence("x", &with_high).image_url(),
            Some("http://img/high.jpg")
        );

        let with_medium = vec![
            candidate("http://img/low.jpg", ConfidenceTier::Low),
            candidate("http://img/med.jpg", ConfidenceTier::Medium),
        ];
        assert_eq!(
            resolve_by_confidence("x", &with_medium).image_url(),
            Some("http://img/med.jpg")
        );

        let all_low = vec![
            candidate("http://img/first.jpg", ConfidenceTier::Low),
            candidate("http://img/second.jpg", ConfidenceTier::Low),
        ];
        assert_eq!(
            resolve_by_confidence("x", &all_low).image_url(),
            Some("http://img/first.jpg")
        );
    }
}
