//! Accessibility and batch verification against a local HTTP server

use inkwarden_domain::{ContentDomain, InstitutionType, SourceCandidate};
use inkwarden_sources::{
    AccessChecker, CredibilityContext, RejectCode, SourceError, SourceVerifier, VerifierConfig,
};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve canned responses keyed by request path until the test ends
async fn serve() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]).to_string();
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();

                let (status, body) = match path.as_str() {
                    "/ok" => (
                        "200 OK",
                        format!("<html><body><h1>睡眠衛教</h1><p>{}</p></body></html>", "規律作息".repeat(600)),
                    ),
                    "/soft404" => ("200 OK", "<html><title>Page Not Found</title></html>".to_string()),
                    "/slow" => {
                        tokio::time::sleep(Duration::from_secs(3)).await;
                        ("200 OK", "late".to_string())
                    }
                    _ => ("404 Not Found", "nope".to_string()),
                };
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
            });
        }
    });

    format!("http://{}", addr)
}

fn checker(timeout_secs: u64) -> AccessChecker {
    let config = VerifierConfig {
        access_timeout_secs: timeout_secs,
        ..VerifierConfig::default()
    };
    AccessChecker::new(&config).unwrap()
}

#[tokio::test]
async fn test_accessible_page_returns_excerpt() {
    let base = serve().await;
    let check = checker(5).check(&format!("{}/ok", base)).await;

    assert!(check.accessible);
    assert_eq!(check.status, Some(200));
    let content = check.content.unwrap();
    assert!(content.starts_with("睡眠衛教"));
    assert_eq!(content.chars().count(), 1500);
}

#[tokio::test]
async fn test_soft_404_is_inaccessible() {
    let base = serve().await;
    let check = checker(5).check(&format!("{}/soft404", base)).await;

    assert!(!check.accessible);
    assert_eq!(check.status, Some(200));
    assert!(check.reason.unwrap().contains("page not found"));
}

#[tokio::test]
async fn test_http_error_status() {
    let base = serve().await;
    let check = checker(5).check(&format!("{}/missing", base)).await;

    assert!(!check.accessible);
    assert_eq!(check.reason.as_deref(), Some("HTTP 404"));
}

#[tokio::test]
async fn test_timeout_is_a_value() {
    let base = serve().await;
    let check = checker(1).check(&format!("{}/slow", base)).await;

    assert!(!check.accessible);
    assert!(check.reason.unwrap().contains("timed out"));
}

fn candidates() -> Vec<SourceCandidate> {
    vec![
        SourceCandidate::new("睡眠衛教手冊", "https://www.hpa.gov.tw/sleep", "國民健康署提供的睡眠衛教資訊與失眠改善建議，適合一般民眾閱讀。".repeat(2))
            .with_institution("國民健康署", InstitutionType::Government),
        SourceCandidate::new("失眠怎麼辦", "https://kknews.cc/health/abc", ""),
        SourceCandidate::new("失眠研究", "http://insecure.edu.tw/a", ""),
        SourceCandidate::new("睡眠衛教手冊", "https://www.hpa.gov.tw/sleep", ""),
        SourceCandidate::new("天氣", "https://www.example.com/weather", "")
            .with_institution("", InstitutionType::Commercial),
        SourceCandidate::new("失眠 門診", "https://www.ntuh.gov.tw/sleep", "")
            .with_institution("台大醫院", InstitutionType::Government),
    ]
}

#[tokio::test]
async fn test_batch_layers_and_ranking() {
    let verifier = SourceVerifier::new(VerifierConfig::offline()).unwrap();
    let ctx = CredibilityContext::new(ContentDomain::Health).with_institutions(["國民健康署"]);

    let report = verifier.verify_batch(candidates(), "失眠 睡眠", &ctx).await;

    assert_eq!(report.duplicates, 1);
    assert_eq!(report.rejections.len(), 2);
    assert!(report.rejections.iter().all(|r| r.code == RejectCode::FormatInvalid));
    assert_eq!(report.rejections[0].url, "https://kknews.cc/health/abc");

    // 40 + 30 + 20 + 10; 40 + 30; 10 + 10 - 15
    let scores: Vec<u8> = report.whitelist.iter().map(|s| s.credibility_score()).collect();
    assert_eq!(scores, vec![100, 70, 5]);
    assert_eq!(report.whitelist.sources()[0].url(), "https://www.hpa.gov.tw/sleep");
    assert_eq!(report.low_relevance, vec!["https://www.example.com/weather"]);
}

#[tokio::test]
async fn test_max_sources_truncates() {
    let config = VerifierConfig {
        max_sources: 1,
        ..VerifierConfig::offline()
    };
    let verifier = SourceVerifier::new(config).unwrap();
    let ctx = CredibilityContext::new(ContentDomain::Health);

    let report = verifier.verify_batch(candidates(), "失眠 睡眠", &ctx).await;
    assert_eq!(report.whitelist.len(), 1);

    // the minimum wins over max_sources
    let report = verifier.build_whitelist(candidates(), "失眠 睡眠", &ctx, 2).await.unwrap();
    assert_eq!(report.whitelist.len(), 2);
}

#[tokio::test]
async fn test_minimum_not_met_aborts() {
    let verifier = SourceVerifier::new(VerifierConfig::offline()).unwrap();
    let ctx = CredibilityContext::new(ContentDomain::Finance);
    let only_bad = vec![SourceCandidate::new("x", "https://example.com/a?id=1234", "")];

    let err = verifier.build_whitelist(only_bad, "ETF", &ctx, 2).await.unwrap_err();
    assert_eq!(
        err,
        SourceError::SourceMinimumNotMet {
            domain: ContentDomain::Finance,
            required: 2,
            available: 0
        }
    );
}

#[tokio::test]
async fn test_unreachable_candidate_is_isolated() {
    let config = VerifierConfig {
        access_timeout_secs: 2,
        ..VerifierConfig::default()
    };
    let verifier = SourceVerifier::new(config).unwrap();
    let ctx = CredibilityContext::new(ContentDomain::General);
    let batch = vec![
        SourceCandidate::new("a", "https://127.0.0.1:9/a", ""),
        SourceCandidate::new("b", "https://127.0.0.1:9/b", ""),
    ];

    let report = verifier.verify_batch(batch, "a", &ctx).await;
    assert!(report.whitelist.is_empty());
    assert_eq!(report.rejections.len(), 2);
    assert!(report.rejections.iter().all(|r| r.code == RejectCode::Unreachable));
    assert_eq!(report.rejections[0].url, "https://127.0.0.1:9/a");
}

#[test]
fn test_invalid_config_rejected() {
    let config = VerifierConfig {
        max_concurrency: 0,
        ..VerifierConfig::default()
    };
    assert!(matches!(SourceVerifier::new(config), Err(SourceError::Config(_))));
}
