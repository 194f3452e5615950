//! Request-scoped card generation over the core pipeline.

use thiserror::Error;

use phrasedeck_core::ai::{AiConfig, ClaudeClient, DisabledVision, VisionClient};
use phrasedeck_core::http::WebClient;
use phrasedeck_core::translate::{GoogleTranslator, Translator};
use phrasedeck_core::types::{Card, PhraseQuery, Resolution};
use phrasedeck_core::{
    plan_queries, require_env, BraveSearch, ConfigError, FetchError, ResolveOptions, Resolver,
    SearchError, TranslateError,
};

// The upload form targets Italian learners, like the CLI's defaults.
const SOURCE_LANG: &str = "it";
const TARGET_LANG: &str = "en";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Http(#[from] FetchError),
    #[error("translation failed: {0}")]
    Translate(#[from] TranslateError),
    #[error("image resolution failed: {0}")]
    Search(#[from] SearchError),
    #[error("failed to render CSV: {0}")]
    Render(String),
}

/// Long-lived collaborators for serving card requests. The HTTP client and
/// credentials are shared; search and vision clients are built per request
/// so the form's AI checkbox can switch scoring on and off.
pub struct Pipeline {
    http: WebClient,
    brave_api_key: String,
    ai_config: AiConfig,
}

impl Pipeline {
    pub fn from_env() -> Result<Self, PipelineError> {
        Ok(Self {
            http: WebClient::new()?,
            brave_api_key: require_env("BRAVE_API_KEY")?,
            ai_config: AiConfig::from_env()?,
        })
    }

    /// Translate the phrases, resolve an image per phrase, and render the
    /// flashcard rows as a CSV string.
    pub async fn generate_csv(
        &self,
        phrases: &[String],
        use_ai: bool,
    ) -> Result<String, PipelineError> {
        let search = BraveSearch::new(self.http.clone(), self.brave_api_key.clone());
        let vision: Box<dyn VisionClient> = if use_ai {
            Box::new(ClaudeClient::new(self.ai_config.clone()))
        } else {
            Box::new(DisabledVision)
        };

        let translator = GoogleTranslator::new(self.http.clone(), SOURCE_LANG, TARGET_LANG);
        let mut translations = Vec::with_capacity(phrases.len());
        for phrase in phrases {
            translations.push(translator.translate(phrase).await?);
        }

        let queries: Vec<PhraseQuery> = if use_ai {
            match plan_queries(&vision, phrases, SOURCE_LANG).await {
                Ok(planned) => planned,
                Err(e) => {
                    tracing::warn!(error = %e, "query planning failed, searching phrases verbatim");
                    phrases.iter().map(PhraseQuery::verbatim).collect()
                }
            }
        } else {
            phrases.iter().map(PhraseQuery::verbatim).collect()
        };

        let resolver = Resolver::new(search, self.http.clone(), vision, ResolveOptions { use_ai });
        let resolutions = resolver.resolve_batch(&queries).await?;

        let cards = build_cards(phrases, &translations, &resolutions);
        render_csv(&cards)
    }
}

/// Pair each phrase with its translation and resolution, in input order.
fn build_cards(
    phrases: &[String],
    translations: &[String],
    resolutions: &[Resolution],
) -> Vec<Card> {
    phrases
        .iter()
        .zip(translations)
        .zip(resolutions)
        .map(|((phrase, translation), resolution)| Card {
            front: translation.clone(),
            back: phrase.clone(),
            image_url: resolution.image_url().map(String::from),
        })
        .collect()
}

/// Render cards as Anki-importable rows: front, back, image tag.
fn render_csv(cards: &[Card]) -> Result<String, PipelineError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for card in cards {
        let image = card
            .image_url
            .as_deref()
            .map(|url| format!("<img src='{}'/>", url))
            .unwrap_or_default();
        writer
            .write_record([card.front.as_str(), card.back.as_str(), image.as_str()])
            .map_err(|e| PipelineError::Render(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| PipelineError::Render(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| PipelineError::Render(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cards_keep_input_order_and_unresolved_phrases_get_no_image() {
        let phrases = vec!["pane".to_string(), "vino".to_string()];
        let translations = vec!["bread".to_string(), "wine".to_string()];
        let resolutions = vec![
            Resolution::Resolved {
                phrase: "pane".to_string(),
                image_url: "http://img/pane.jpg".to_string(),
            },
            Resolution::Unresolved {
                phrase: "vino".to_string(),
                reason: "no candidates".to_string(),
            },
        ];

        let cards = build_cards(&phrases, &translations, &resolutions);

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].front, "bread");
        assert_eq!(cards[0].back, "pane");
        assert_eq!(cards[0].image_url.as_deref(), Some("http://img/pane.jpg"));
        assert_eq!(cards[1].image_url, None);
    }

    #[test]
    fn csv_rows_hold_translation_phrase_and_image_tag() {
        let cards = vec![
            Card {
                front: "bread".to_string(),
                back: "pane".to_string(),
                image_url: Some("http://img/pane.jpg".to_string()),
            },
            Card {
                front: "wine".to_string(),
                back: "vino".to_string(),
                image_url: None,
            },
        ];

        let csv = render_csv(&cards).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("bread,pane,<img src='http://img/pane.jpg'/>")
        );
        assert_eq!(lines.next(), Some("wine,vino,"));
    }
}
