/*!
 * Integration tests for the HTTP backends against a local server
 */

use textmill::errors::ProviderError;
use textmill::providers::{GoogleWebBackend, LibreTranslateBackend, LingvaBackend, TranslationBackend};

use crate::common::init_test_logging;
use crate::common::mock_server::{MockResponse, MockServer};

#[tokio::test]
async fn test_google_shouldSendQueryAndJoinSegments() {
    let server = MockServer::start(vec![MockResponse::ok(
        r#"[[["Hola. ","Hello. ",null],["¿Qué tal?","How are you?",null]],null,"en"]"#,
    )])
    .await;

    let backend = GoogleWebBackend::new(vec![server.url("/translate_a/single")], 5);
    let result = backend.translate("Hello. How are you?", "en", "es").await.unwrap();
    assert_eq!(result, "Hola. ¿Qué tal?");

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert!(requests[0].target.starts_with("/translate_a/single?client=gtx&sl=en&tl=es&dt=t&q="));
}

#[tokio::test]
async fn test_libretranslate_shouldPostJsonBody() {
    let server = MockServer::start(vec![MockResponse::ok(r#"{"translatedText":"bonjour"}"#)]).await;

    let backend = LibreTranslateBackend::new(vec![server.url("/translate")], 5);
    let result = backend.translate("hello", "auto", "fr").await.unwrap();
    assert_eq!(result, "bonjour");

    let requests = server.requests();
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].target, "/translate");

    let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(body["q"], "hello");
    assert_eq!(body["source"], "auto");
    assert_eq!(body["target"], "fr");
    assert_eq!(body["format"], "text");
}

#[tokio::test]
async fn test_lingva_shouldEncodeTextInPath() {
    let server = MockServer::start(vec![MockResponse::ok(r#"{"translation":"hallo welt"}"#)]).await;

    let backend = LingvaBackend::new(vec![server.url("/api/v1")], 5);
    let result = backend.translate("hello world", "en", "de").await.unwrap();
    assert_eq!(result, "hallo welt");
    assert_eq!(server.requests()[0].target, "/api/v1/en/de/hello%20world");
}

#[tokio::test]
async fn test_backend_withFailingMirrors_shouldMoveToNextMirror() {
    init_test_logging();
    let broken = MockServer::start(vec![MockResponse::error(503)]).await;
    let empty = MockServer::start(vec![MockResponse::ok(r#"{"translation":""}"#)]).await;
    let garbage = MockServer::start(vec![MockResponse::ok("<html>busy</html>")]).await;
    let working = MockServer::start(vec![MockResponse::ok(r#"{"translation":"hola"}"#)]).await;

    let backend = LingvaBackend::new(
        vec![
            broken.url("/api/v1"),
            empty.url("/api/v1"),
            garbage.url("/api/v1"),
            working.url("/api/v1"),
        ],
        5,
    );

    assert_eq!(backend.translate("hello", "en", "es").await.unwrap(), "hola");
    assert_eq!(broken.requests().len(), 1);
    assert_eq!(empty.requests().len(), 1);
    assert_eq!(garbage.requests().len(), 1);
    assert_eq!(working.requests().len(), 1);
}

#[tokio::test]
async fn test_backend_withAllMirrorsFailing_shouldReportCount() {
    let first = MockServer::start(vec![MockResponse::error(500)]).await;
    let second = MockServer::start(vec![MockResponse::error(429)]).await;

    let backend = LibreTranslateBackend::new(vec![first.url("/translate"), second.url("/translate")], 5);
    let error = backend.translate("hello", "en", "es").await.unwrap_err();

    match error {
        ProviderError::AllEndpointsFailed { backend, count } => {
            assert_eq!(backend, "LibreTranslate");
            assert_eq!(count, 2);
        }
        other => panic!("unexpected error: {}", other),
    }
}
