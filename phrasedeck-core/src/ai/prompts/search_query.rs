//! Prompt for turning phrases into image search queries.

/// System prompt for the query planning request.
pub const QUERY_PLAN_SYSTEM_PROMPT: &str = "you are a phrase classifier";

/// Assistant-turn prefix that biases the model toward a bare JSON array.
pub const QUERY_PLAN_PREFILL: &str = "[";

pub fn render_query_plan_prompt(phrases: &[String], source_language: &str) -> String {
    let template = r#"
You must take a list of phrases provided in the <text> field and based off each phrase, decide on a search query for an image search engine that would most likely return accurate images for that phrase. Examples phrases and search queries are provided below in <example> tags.

<text>
    {text}
</text>

<examples>
<example>
    <phrases>
        ["How are you?", "What's happening", "the apple"]
    </phrases>
    <queries>
        ["How are you?", "Asking someone a question", "apple"]
    </queries>
<example>
<example>
    <phrases>
        ["nice to meet you", "where are you from?", "what do you do for work?"]
    </phrases>
    <queries>
        ["people shaking hands", "map of the world", "people working"]
    </queries>
<example>
</examples>

<rules>
1. Input phrases will be in {source_language}, you must first translate the phrase to English before deciding what could be a good search term for that phrase
2. Avoid queries that would lead to photos of text. e.g. if the input phrase is "come ti chiami" the query should not include "come ti chiami" itself, as an exact match is likely to return images of the written phrase
</rules>
You must simply return a new JSON array of query strings, one per phrase, with no preamble or additional text.
"#;

    let phrase_list = serde_json::to_string(phrases).unwrap_or_else(|_| "[]".to_string());
    template
        .replace("{text}", &phrase_list)
        .replace("{source_language}", source_language)
}
