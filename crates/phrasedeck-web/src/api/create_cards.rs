use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use crate::api::ErrorResponse;
use crate::AppState;

/// Form fields accepted by the card endpoint.
#[derive(Debug, Default)]
struct CardForm {
    phrases: Option<String>,
    file: Option<(String, Vec<u8>)>,
    use_ai: bool,
}

pub async fn create_cards(
    State(pipeline): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut form = CardForm::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("multipart read error: {}", e);
                return (
                    e.status(),
                    Json(ErrorResponse {
                        error: format!("Failed to read form data: {}", e.body_text()),
                    }),
                )
                    .into_response();
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "use_ai" => {
                // Checkbox is only submitted when ticked, with value "on".
                form.use_ai = matches!(field.text().await.as_deref(), Ok("on"));
            }
            "phrases" => {
                form.phrases = field.text().await.ok();
            }
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                if filename.is_empty() {
                    // File input left empty on a submitted form.
                    continue;
                }
                match field.bytes().await {
                    Ok(bytes) => form.file = Some((filename, bytes.to_vec())),
                    Err(e) => {
                        tracing::warn!("field read error: {}", e);
                        return (
                            e.status(),
                            Json(ErrorResponse {
                                error: format!("Failed to read file data: {}", e.body_text()),
                            }),
                        )
                            .into_response();
                    }
                }
            }
            _ => {}
        }
    }

    let phrases = match extract_phrases(&form) {
        Ok(phrases) => phrases,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })).into_response()
        }
    };

    let csv = match pipeline.generate_csv(&phrases, form.use_ai).await {
        Ok(csv) => csv,
        Err(e) => {
            tracing::error!("card generation failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Error processing request: {}", e),
                }),
            )
                .into_response();
        }
    };

    (
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=translation_cards.csv",
            ),
        ],
        csv,
    )
        .into_response()
}

/// Pull the phrase list out of the form: the textarea wins when it has
/// content, then an uploaded file.
fn extract_phrases(form: &CardForm) -> Result<Vec<String>, String> {
    if let Some(text) = form.phrases.as_deref() {
        let phrases = parse_lines(text);
        if !phrases.is_empty() {
            return Ok(phrases);
        }
    }

    if let Some((filename, data)) = &form.file {
        let phrases = parse_upload(filename, data)?;
        if phrases.is_empty() {
            return Err("no phrases detected in your phrases file".to_string());
        }
        return Ok(phrases);
    }

    Err("No input provided. Please upload a file or enter phrases.".to_string())
}

fn parse_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Parse an uploaded phrase list by extension: .txt (one phrase per line)
/// or single-column .csv.
fn parse_upload(filename: &str, data: &[u8]) -> Result<Vec<String>, String> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "txt" => {
            let text =
                std::str::from_utf8(data).map_err(|_| "File must be UTF-8 text".to_string())?;
            Ok(parse_lines(text))
        }
        "csv" => {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(false)
                .from_reader(data);

            let mut phrases = Vec::new();
            for record in reader.records() {
                let record = record.map_err(|e| format!("Invalid CSV: {}", e))?;
                if record.len() > 1 {
                    return Err(
                        "CSV files should only have one column containing phrases, \
                         delete any additional columns"
                            .to_string(),
                    );
                }
                if let Some(phrase) = record.get(0) {
                    let phrase = phrase.trim();
                    if !phrase.is_empty() {
                        phrases.push(phrase.to_string());
                    }
                }
            }
            Ok(phrases)
        }
        _ => Err("File type must be '.txt' or '.csv'".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn textarea_lines_are_trimmed_and_blank_lines_dropped() {
        let phrases = parse_lines("  ciao  \n\ncome ti chiami\n");
        assert_eq!(phrases, vec!["ciao", "come ti chiami"]);
    }

    #[test]
    fn textarea_wins_over_uploaded_file() {
        let form = CardForm {
            phrases: Some("dal vivo".to_string()),
            file: Some(("other.txt".to_string(), b"ignored".to_vec())),
            use_ai: false,
        };
        assert_eq!(extract_phrases(&form).unwrap(), vec!["dal vivo"]);
    }

    #[test]
    fn empty_textarea_falls_back_to_uploaded_file() {
        let form = CardForm {
            phrases: Some("  \n".to_string()),
            file: Some(("list.txt".to_string(), b"pane\nvino\n".to_vec())),
            use_ai: false,
        };
        assert_eq!(extract_phrases(&form).unwrap(), vec!["pane", "vino"]);
    }

    #[test]
    fn missing_input_is_rejected() {
        let err = extract_phrases(&CardForm::default()).unwrap_err();
        assert!(err.contains("No input provided"));
    }

    #[test]
    fn csv_upload_takes_one_column() {
        let phrases = parse_upload("list.csv", b"ciao\ncome ti chiami\n").unwrap();
        assert_eq!(phrases, vec!["ciao", "come ti chiami"]);
    }

    #[test]
    fn multi_column_csv_upload_is_rejected() {
        let err = parse_upload("list.csv", b"ciao,hello\n").unwrap_err();
        assert!(err.contains("one column"));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = parse_upload("list.pdf", b"ciao").unwrap_err();
        assert!(err.contains(".txt"));
    }
}
