//! Prompt for scoring candidate images against a phrase.

/// System prompt for the scoring request.
pub const SCORE_SYSTEM_PROMPT: &str = "You are an image classifier and rater";

/// Assistant-turn prefix that biases the model toward a bare JSON array.
pub const SCORE_PREFILL: &str = "[";

pub fn render_score_prompt(phrase: &str) -> String {
    let template = r#"
You are responsible for taking the images above and scoring from 1-10 how well they match the supplied <text> field.

You must return only an array of integer scores based on how well the supplied image matches the text. Do not include any preamble or conclusions.
{text}

Here are some examples of what to return:
For 4 images:
<example1>
[1, 2, 9, 4]
</example1>

For 3 images:

<example2>
[1, 0, 3]
</example2>
"#;

    template.replace("{text}", &format!("<text>{}</text>", phrase))
}
