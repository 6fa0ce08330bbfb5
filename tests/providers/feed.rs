use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scribetwin::PipelineError;
use scribetwin::config::CorpusConfig;
use scribetwin::corpus::{CorpusSource, Rss2JsonSource};

use super::harness::install_crypto;

const LONG_POST: &str = "Ada wrote about analytical engines and the patterns they weave, \
                         at length and with some care.";

#[tokio::test]
async fn feed_items_become_clean_author_texts() {
    install_crypto();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "feed": {"title": "Engineering"},
            "items": [
                {
                    "author": "Ada",
                    "content": format!("<p>{LONG_POST}</p><script>track()</script>")
                },
                {
                    "author": "",
                    "description": format!("<div><em>{LONG_POST}</em></div>")
                },
                {"author": "Grace", "content": "<p>too short</p>"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let source = Rss2JsonSource::new(&CorpusConfig::default());
    let texts = source
        .fetch(&format!("{}/feed", server.uri()))
        .await
        .unwrap();

    assert_eq!(texts.len(), 2);
    assert_eq!(texts[0].author, "Ada");
    assert_eq!(texts[0].text, LONG_POST);
    assert_eq!(texts[1].author, "unknown_author");
    assert!(texts.iter().all(|t| !t.text.contains('<') && !t.text.contains("track")));
    server.verify().await;
}

#[tokio::test]
async fn feed_server_errors_are_source_unavailable() {
    install_crypto();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let source = Rss2JsonSource::new(&CorpusConfig::default());
    let err = source
        .fetch(&format!("{}/feed", server.uri()))
        .await
        .unwrap_err();

    match err {
        PipelineError::SourceUnavailable(message) => assert!(message.contains("500")),
        other => panic!("expected SourceUnavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_feed_is_source_unavailable() {
    install_crypto();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<rss>not json</rss>"))
        .mount(&server)
        .await;

    let source = Rss2JsonSource::new(&CorpusConfig::default());
    let result = source.fetch(&format!("{}/feed", server.uri())).await;

    assert!(matches!(result, Err(PipelineError::SourceUnavailable(_))));
}
