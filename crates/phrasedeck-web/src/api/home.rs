use axum::response::Html;

const HOME_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>phrasedeck</title>
</head>
<body>
  <h1>phrasedeck</h1>
  <p>Paste phrases (one per line) or upload a .txt or single-column .csv
  file, then download the generated flashcard CSV.</p>
  <form action="/create-cards" method="post" enctype="multipart/form-data">
    <p><textarea name="phrases" rows="10" cols="40" placeholder="come ti chiami"></textarea></p>
    <p><input type="file" name="file" accept=".txt,.csv"></p>
    <p><label><input type="checkbox" name="use_ai" checked> Use AI-assisted image scoring</label></p>
    <p><button type="submit">Create cards</button></p>
  </form>
</body>
</html>
"#;

pub async fn home() -> Html<&'static str> {
    Html(HOME_PAGE)
}
