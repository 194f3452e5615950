//! Phrase-to-image resolution for flashcard generation.
//!
//! Given phrases in a source language, the pipeline queries an image search
//! provider, fetches and validates candidate images, scores candidates
//! against the phrase with a vision model, and deterministically selects the
//! best match. Translation, file I/O, and CSV rendering live outside the
//! core (see the phrasedeck CLI).

pub mod ai;
pub mod error;
pub mod http;
pub mod image;
pub mod query_plan;
pub mod resolver;
pub mod scorer;
pub mod search;
pub mod translate;
pub mod types;

pub use error::{require_env, ConfigError, FetchError};
pub use image::{validate_image, ValidationError, MAX_IMAGE_BYTES};
pub use query_plan::{plan_queries, PlanError};
pub use resolver::{ResolveOptions, Resolver};
pub use scorer::{score_candidates, ScoreError, MAX_SCORE};
pub use search::{BraveSearch, MockSearch, SearchError, SearchProvider};
pub use translate::{FakeTranslator, GoogleTranslator, TranslateError, Translator};
pub use types::{
    Candidate, Card, ConfidenceTier, FetchedCandidate, ImageMime, PhraseQuery, Resolution,
};
