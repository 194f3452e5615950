use serde::{Deserialize, Serialize};

/// Image formats accepted for flashcard images.
///
/// Anything outside this set is dropped at the search-result boundary, so the
/// rest of the pipeline only ever sees these three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageMime {
    Jpeg,
    Png,
    Webp,
}

impl ImageMime {
    /// The full MIME string, e.g. "image/jpeg".
    pub fn as_mime(&self) -> &'static str {
        match self {
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Png => "image/png",
            ImageMime::Webp => "image/webp",
        }
    }

    /// Parse a Content-Type header value. Parameters after ';' are ignored.
    pub fn from_mime(value: &str) -> Option<Self> {
        let essence = value.split(';').next().unwrap_or("").trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" => Some(ImageMime::Jpeg),
            "image/png" => Some(ImageMime::Png),
            "image/webp" => Some(ImageMime::Webp),
            _ => None,
        }
    }

    /// Guess the format from a URL's path extension ("jpg" normalizes to jpeg).
    pub fn from_url(url: &str) -> Option<Self> {
        let parsed = url::Url::parse(url).ok()?;
        let path = parsed.path();
        let ext = path.rsplit('.').next()?;
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageMime::Jpeg),
            "png" => Some(ImageMime::Png),
            "webp" => Some(ImageMime::Webp),
            _ => None,
        }
    }
}

/// The search provider's own relevance label for a result.
///
/// Only consulted on the confidence-only path (AI scoring disabled).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    /// Unrecognized or missing labels map to Low.
    pub fn parse(label: Option<&str>) -> Self {
        match label {
            Some("high") => ConfidenceTier::High,
            Some("medium") => ConfidenceTier::Medium,
            _ => ConfidenceTier::Low,
        }
    }
}

/// An image search result before any bytes are fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub url: String,
    pub mime: ImageMime,
    pub confidence: ConfidenceTier,
}

/// A candidate whose bytes survived the fetch and content-type filter.
///
/// `original_index` points back into the candidate list returned by the
/// search provider. Validation can drop arbitrary entries, so selection must
/// go through this tag rather than positional alignment.
#[derive(Debug, Clone)]
pub struct FetchedCandidate {
    pub original_index: usize,
    pub url: String,
    pub mime: ImageMime,
    pub data: Vec<u8>,
}

/// A phrase together with the search query used to find images for it.
///
/// The query is usually an LLM-optimized rephrasing; `verbatim` uses the
/// phrase itself.
#[derive(Debug, Clone, PartialEq)]
pub struct PhraseQuery {
    pub phrase: String,
    pub query: String,
}

impl PhraseQuery {
    pub fn new(phrase: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            query: query.into(),
        }
    }

    pub fn verbatim(phrase: impl Into<String>) -> Self {
        let phrase = phrase.into();
        Self {
            query: phrase.clone(),
            phrase,
        }
    }
}

/// Outcome of resolving one phrase to an image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Resolved { phrase: String, image_url: String },
    Unresolved { phrase: String, reason: String },
}

impl Resolution {
    pub fn phrase(&self) -> &str {
        match self {
            Resolution::Resolved { phrase, .. } => phrase,
            Resolution::Unresolved { phrase, .. } => phrase,
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        match self {
            Resolution::Resolved { image_url, .. } => Some(image_url),
            Resolution::Unresolved { .. } => None,
        }
    }
}

/// One flashcard row: translation on the front, phrase on the back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub front: String,
    pub back: String,
    pub image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_from_url_normalizes_jpg() {
        assert_eq!(
            ImageMime::from_url("https://example.com/photos/cat.jpg"),
            Some(ImageMime::Jpeg)
        );
        assert_eq!(
            ImageMime::from_url("https://example.com/photos/cat.jpeg"),
            Some(ImageMime::Jpeg)
        );
    }

    #[test]
    fn mime_from_url_ignores_query_string() {
        assert_eq!(
            ImageMime::from_url("https://example.com/a/b.png?width=400&crop=1.5"),
            Some(ImageMime::Png)
        );
    }

    #[test]
    fn mime_from_url_is_case_insensitive() {
        assert_eq!(
            ImageMime::from_url("https://example.com/IMG_01.WEBP"),
            Some(ImageMime::Webp)
        );
    }

    #[test]
    fn mime_from_url_rejects_unknown_extensions() {
        assert_eq!(ImageMime::from_url("https://example.com/cat.gif"), None);
        assert_eq!(ImageMime::from_url("https://example.com/page.html"), None);
        assert_eq!(ImageMime::from_url("not a url"), None);
    }

    #[test]
    fn mime_from_header_strips_parameters() {
        assert_eq!(
            ImageMime::from_mime("image/jpeg; charset=utf-8"),
            Some(ImageMime::Jpeg)
        );
        assert_eq!(ImageMime::from_mime("text/html"), None);
    }

    #[test]
    fn confidence_defaults_to_low() {
        assert_eq!(ConfidenceTier::parse(Some("high")), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::parse(Some("weird")), ConfidenceTier::Low);
        assert_eq!(ConfidenceTier::parse(None), ConfidenceTier::Low);
    }
}
