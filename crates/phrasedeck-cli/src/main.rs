//! phrasedeck: turn a phrase list into a flashcard CSV.
//!
//! Reads phrases from a .txt or single-column .csv file, translates them,
//! resolves a representative image per phrase, and writes Anki-importable
//! rows: translation, phrase, image tag.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use phrasedeck_core::ai::{AiConfig, ClaudeClient, DisabledVision, VisionClient};
use phrasedeck_core::http::WebClient;
use phrasedeck_core::translate::{GoogleTranslator, Translator};
use phrasedeck_core::types::{Card, PhraseQuery, Resolution};
use phrasedeck_core::{plan_queries, BraveSearch, ResolveOptions, Resolver};

#[derive(Parser)]
#[command(name = "phrasedeck")]
#[command(about = "Generate flashcard CSVs from phrase lists", long_about = None)]
struct Cli {
    /// Phrase list: .txt (one phrase per line) or single-column .csv
    #[arg(long, short = 'F')]
    file: PathBuf,

    /// Output CSV path (default: input path with a .csv extension)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Skip AI-assisted scoring and pick by the search provider's own
    /// confidence labels
    #[arg(long)]
    no_ai: bool,

    /// Source language code of the phrases
    #[arg(long, default_value = "it")]
    source_lang: String,

    /// Target language code for translations
    #[arg(long, default_value = "en")]
    target_lang: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let phrases = read_phrases(&cli.file)?;
    tracing::info!(count = phrases.len(), "read phrases");

    let http = WebClient::new().context("failed to build HTTP client")?;

    // Credentials are checked up front so a missing key fails before any
    // phrase is processed.
    let search = BraveSearch::from_env(http.clone())?;
    let vision: Box<dyn VisionClient> = if cli.no_ai {
        Box::new(DisabledVision)
    } else {
        Box::new(ClaudeClient::new(AiConfig::from_env()?))
    };

    println!("Translating phrases...");
    let translator = GoogleTranslator::new(http.clone(), &cli.source_lang, &cli.target_lang);
    let mut translations = Vec::with_capacity(phrases.len());
    for phrase in &phrases {
        let translation = translator
            .translate(phrase)
            .await
            .with_context(|| format!("failed to translate {:?}", phrase))?;
        translations.push(translation);
    }

    let queries = if cli.no_ai {
        phrases.iter().map(PhraseQuery::verbatim).collect()
    } else {
        match plan_queries(&vision, &phrases, &cli.source_lang).await {
            Ok(planned) => planned,
            Err(e) => {
                tracing::warn!(error = %e, "query planning failed, searching phrases verbatim");
                phrases.iter().map(PhraseQuery::verbatim).collect()
            }
        }
    };

    println!("Resolving images...");
    let resolver = Resolver::new(search, http, vision, ResolveOptions { use_ai: !cli.no_ai });
    let resolutions = resolver
        .resolve_batch(&queries)
        .await
        .context("image resolution aborted")?;

    let cards = build_cards(&phrases, &translations, &resolutions);
    let output = cli
        .output
        .unwrap_or_else(|| cli.file.with_extension("csv"));
    write_cards(&output, &cards)?;

    let resolved = cards.iter().filter(|c| c.image_url.is_some()).count();
    println!(
        "Wrote {} cards ({} with images) to {}",
        cards.len(),
        resolved,
        output.display()
    );

    Ok(())
}

/// Read phrases from a .txt (one per line) or single-column .csv file.
fn read_phrases(path: &Path) -> Result<Vec<String>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    let phrases = match extension {
        "txt" => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect()
        }
        "csv" => {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(false)
                .from_path(path)
                .with_context(|| format!("failed to read {}", path.display()))?;

            let mut phrases = Vec::new();
            for record in reader.records() {
                let record = record?;
                if record.len() > 1 {
                    bail!(
                        "CSV files should only have one column containing phrases, \
                         delete any additional columns"
                    );
                }
                if let Some(phrase) = record.get(0) {
                    let phrase = phrase.trim();
                    if !phrase.is_empty() {
                        phrases.push(phrase.to_string());
                    }
                }
            }
            phrases
        }
        _ => bail!("File type must be '.txt' or '.csv'"),
    };

    if phrases.is_empty() {
        bail!("no phrases detected in your phrases file");
    }

    Ok(phrases)
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

/// Write cards as Anki-importable rows: front, back, image tag.
fn write_cards(path: &Path, cards: &[Card]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    for card in cards {
        let image = card
            .image_url
            .as_deref()
            .map(|url| format!("<img src='{}'/>", url))
            .unwrap_or_default();
        writer.write_record([card.front.as_str(), card.back.as_str(), image.as_str()])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(name: &str, content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn reads_txt_skipping_blank_lines() {
        let (_dir, path) = temp_file("phrases.txt", "ciao\n\n  come stai  \n");
        let phrases = read_phrases(&path).unwrap();
        assert_eq!(phrases, vec!["ciao", "come stai"]);
    }

    #[test]
    fn reads_single_column_csv() {
        let (_dir, path) = temp_file("phrases.csv", "ciao\ncome stai\n");
        let phrases = read_phrases(&path).unwrap();
        assert_eq!(phrases, vec!["ciao", "come stai"]);
    }

    #[test]
    fn rejects_multi_column_csv() {
        let (_dir, path) = temp_file("phrases.csv", "ciao,hello\n");
        assert!(read_phrases(&path).is_err());
    }

    #[test]
    fn rejects_unknown_extensions_and_empty_files() {
        let (_dir, path) = temp_file("phrases.docx", "ciao");
        assert!(read_phrases(&path).is_err());

        let (_dir, path) = temp_file("phrases.txt", "\n \n");
        assert!(read_phrases(&path).is_err());
    }

    #[test]
    fn cards_keep_phrase_order_and_mark_unresolved() {
        let phrases = vec!["ciao".to_string(), "grazie".to_string()];
        let translations = vec!["hello".to_string(), "thanks".to_string()];
        let resolutions = vec![
            Resolution::Resolved {
                phrase: "ciao".to_string(),
                image_url: "http://img/a.png".to_string(),
            },
            Resolution::Unresolved {
                phrase: "grazie".to_string(),
                reason: "scoring failed".to_string(),
            },
        ];

        let cards = build_cards(&phrases, &translations, &resolutions);
        assert_eq!(cards[0].front, "hello");
        assert_eq!(cards[0].image_url.as_deref(), Some("http://img/a.png"));
        assert_eq!(cards[1].back, "grazie");
        assert_eq!(cards[1].image_url, None);
    }

    #[test]
    fn csv_output_includes_image_tag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let cards = vec![
            Card {
                front: "hello".to_string(),
                back: "ciao".to_string(),
                image_url: Some("http://img/a.png".to_string()),
            },
            Card {
                front: "thanks".to_string(),
                back: "grazie".to_string(),
                image_url: None,
            },
        ];

        write_cards(&path, &cards).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<img src='http://img/a.png'/>"));
        assert!(content.lines().count() == 2);
    }
}
