use axum::response::Html;

const UPLOAD_FORM: &str = include_str!("../static/index.html");

/// `GET /`: the crop analysis upload page. All of its state lives in the browser.
pub async fn upload_form() -> Html<&'static str> {
    Html(UPLOAD_FORM)
}
