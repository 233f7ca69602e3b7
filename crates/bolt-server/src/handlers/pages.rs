//! Page endpoint.
//!
//! Looks up the rendered artifact for a request path and wraps it in the
//! site chrome: stylesheet link, navigation bar and `<main>` body.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bolt_renderer::escape_html;
use bolt_site::title_from_slug;
use md5::{Digest, Md5};

use crate::error::ServerError;
use crate::handlers::validate_request_path;
use crate::state::AppState;

/// Page served at `/`.
const ROOT_PAGE: &str = "index";

/// Handle GET /.
pub(crate) async fn get_root_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    serve_page(ROOT_PAGE, &state, &headers)
}

/// Handle GET /{path}.
pub(crate) async fn get_page(
    Path(path): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let path = validate_request_path(&path)?;
    serve_page(path, &state, &headers)
}

fn serve_page(path: &str, state: &AppState, headers: &HeaderMap) -> Result<Response, ServerError> {
    let address = state.scheme.address_for_url(path);
    let body = state
        .store
        .get(&address)
        .and_then(|document| document.rendered)
        .ok_or_else(|| ServerError::PageNotFound(format!("/{path}")))?;

    let page = render_page(&page_title(path), &state.navigation_html, &body);
    let etag = compute_etag(&state.version, &page);

    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == etag.as_bytes()
    {
        return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
    }

    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_owned()),
            (header::ETAG, etag),
            (header::CACHE_CONTROL, "private, max-age=60".to_owned()),
        ],
        page,
    )
        .into_response())
}

/// Document title for a request path, matching the navigation labels.
fn page_title(path: &str) -> String {
    let slug = path.rsplit('/').next().unwrap_or(path);
    if slug == ROOT_PAGE {
        "Home".to_owned()
    } else {
        title_from_slug(slug)
    }
}

/// Wrap a rendered body in the full HTML document.
fn render_page(title: &str, navigation: &str, body: &str) -> String {
    const HEAD: &str = "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n";
    const LINKS: &str = "<link rel=\"stylesheet\" href=\"/css\">\n</head>\n<body>\n";
    const TAIL: &str = "\n</main>\n</body>\n</html>\n";

    let mut html = String::with_capacity(
        HEAD.len() + title.len() + LINKS.len() + navigation.len() + body.len() + TAIL.len() + 32,
    );
    html.push_str(HEAD);
    html.push_str("<title>");
    html.push_str(&escape_html(title));
    html.push_str("</title>\n");
    html.push_str(LINKS);
    html.push_str(navigation);
    html.push_str("\n<main>\n");
    html.push_str(body);
    html.push_str(TAIL);
    html
}

/// Compute `ETag` from version and content.
///
/// MD5 truncated to 64 bits (16 hex chars).
fn compute_etag(version: &str, content: &str) -> String {
    let hash = Md5::digest(format!("{version}:{content}").as_bytes());
    format!("\"{}\"", &hex::encode(hash)[..16])
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use super::*;
    use crate::app::create_router;

    async fn get(state: Arc<AppState>, uri: &str, etag: Option<&str>) -> Response {
        let mut request = Request::builder().uri(uri);
        if let Some(etag) = etag {
            request = request.header(header::IF_NONE_MATCH, etag);
        }
        create_router(state)
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_compute_etag_depends_on_version_and_content() {
        assert_ne!(compute_etag("1.0.0", "a"), compute_etag("1.0.1", "a"));
        assert_ne!(compute_etag("1.0.0", "a"), compute_etag("1.0.0", "b"));
    }

    #[test]
    fn test_compute_etag_format() {
        let etag = compute_etag("1.0.0", "content");
        assert!(etag.starts_with('"') && etag.ends_with('"'));
        assert_eq!(etag.len(), 18);
    }

    #[test]
    fn test_render_page_layout() {
        assert_eq!(
            render_page("Q&A", "<nav></nav>", "<p>hi</p>"),
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
             <title>Q&amp;A</title>\n<link rel=\"stylesheet\" href=\"/css\">\n</head>\n<body>\n\
             <nav></nav>\n<main>\n<p>hi</p>\n</main>\n</body>\n</html>\n"
        );
    }

    #[test]
    fn test_page_title() {
        assert_eq!(page_title("index"), "Home");
        assert_eq!(page_title("guide/setup-steps"), "Setup Steps");
        assert_eq!(page_title("about"), "About");
    }

    #[tokio::test]
    async fn test_get_page_serves_full_document() {
        let state = AppState::for_tests(&[("about", Some("<h1>About</h1>"))], "");

        let response = get(state, "/about", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
        assert!(response.headers().contains_key(header::ETAG));
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        assert_eq!(response.headers()["x-frame-options"], "DENY");

        let body = body_text(response).await;
        assert!(body.starts_with("<!DOCTYPE html>"));
        assert!(body.contains("<title>About</title>"));
        assert!(body.contains(r#"<link rel="stylesheet" href="/css">"#));
        assert!(body.contains(r#"<nav><ul><li><a href="/about">About</a></li></ul></nav>"#));
        assert!(body.contains("<main>\n<h1>About</h1>\n</main>"));
    }

    #[tokio::test]
    async fn test_get_nested_page_with_trailing_slash() {
        let state = AppState::for_tests(&[("guide/setup", Some("<p>Setup</p>"))], "");

        let response = get(state, "/guide/setup/", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("<p>Setup</p>"));
    }

    #[tokio::test]
    async fn test_root_serves_index() {
        let state = AppState::for_tests(&[("index", Some("<p>Welcome</p>"))], "");

        let response = get(state, "/", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("<p>Welcome</p>"));
        assert!(body.contains(r#"<a href="/">Home</a>"#));
    }

    #[tokio::test]
    async fn test_root_without_index_is_not_found() {
        let state = AppState::for_tests(&[("about", Some("<p>About</p>"))], "");

        let response = get(state, "/", None).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_missing_page_is_not_found() {
        let state = AppState::for_tests(&[], "");

        let response = get(state, "/nope", None).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["path"], "/nope");
    }

    #[tokio::test]
    async fn test_unrendered_page_is_not_found() {
        let state = AppState::for_tests(&[("draft", None)], "");

        let response = get(state, "/draft", None).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_traversal_is_rejected() {
        let state = AppState::for_tests(&[("about", Some("<p>About</p>"))], "");

        for uri in ["/../about", "/a/%2e%2e/about", "/a%5Cb", "/a//b"] {
            let response = get(Arc::clone(&state), uri, None).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_if_none_match_returns_not_modified() {
        let state = AppState::for_tests(&[("about", Some("<p>About</p>"))], "");

        let first = get(Arc::clone(&state), "/about", None).await;
        let etag = first.headers()[header::ETAG].to_str().unwrap().to_owned();

        let second = get(Arc::clone(&state), "/about", Some(&etag)).await;
        assert_eq!(second.status(), StatusCode::NOT_MODIFIED);
        assert!(body_text(second).await.is_empty());

        let stale = get(state, "/about", Some("\"0000000000000000\"")).await;
        assert_eq!(stale.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_css_route() {
        let state = AppState::for_tests(&[], "body { margin: 0; }");

        let response = get(state, "/css", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/css; charset=utf-8"
        );
        assert_eq!(body_text(response).await, "body { margin: 0; }");
    }
}
