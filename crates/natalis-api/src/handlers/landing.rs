use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

#[utoipa::path(
    get,
    path = "/",
    tag = "landing",
    responses(
        (status = 200, description = "Registration form", content_type = "text/html", body = String),
        (status = 429, description = "Rate limit exceeded", body = crate::error::ErrorResponse)
    )
)]
pub async fn landing() -> Html<&'static str> {
    Html(INDEX_HTML)
}
