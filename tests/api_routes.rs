//! ルーティングの統合テスト
//!
//! メモリ上のリポジトリとモックの取得元を注入し、DBや外部APIなしで
//! リクエストフロー全体（キャッシュ→テーブル→取得→描画）を検証します。

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use kimochi::app::page::PageTemplate;
use kimochi::app::{create_router, AppState};
use kimochi::domain::post::model::{Post, SentimentResult};
use kimochi::domain::post::repository::{MemoryPostRepository, PostRepository};
use kimochi::domain::sentiment::VaderScorer;
use kimochi::infra::api::reddit::MockPostSource;
use kimochi::infra::cache::MemoryResponseCache;
use kimochi::infra::chart::ChartRenderer;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    repository: Arc<MemoryPostRepository>,
    source: Arc<MockPostSource>,
    static_dir: TempDir,
}

impl TestApp {
    fn new(source: MockPostSource) -> Self {
        let static_dir = tempfile::tempdir().unwrap();
        let repository = Arc::new(MemoryPostRepository::new());
        let source = Arc::new(source);

        let state = AppState {
            repository: repository.clone(),
            source: source.clone(),
            scorer: Arc::new(VaderScorer::new()),
            cache: Arc::new(MemoryResponseCache::new(3600)),
            renderer: ChartRenderer::new(static_dir.path().join("images")).unwrap(),
            page: Arc::new(PageTemplate::new().unwrap()),
            static_dir: static_dir.path().to_path_buf(),
        };

        Self {
            router: create_router(state),
            repository,
            source,
            static_dir,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn post_form(&self, uri: &str, body: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn get(&self, uri: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }
}

fn science_posts() -> Vec<Post> {
    vec![
        Post::new(
            "I go to Loyola Maryland and don't know what to major",
            "I enjoy Finance and tech. I was aiming to make the most money out of college and was stuck between data science or Finance. Any help?",
            "https://www.reddit.com/r/college/1",
        ),
        Post::new(
            "Lab equipment broke again",
            "This is a terrible week for the lab",
            "https://www.reddit.com/r/labrats/2",
        ),
    ]
}

mod validation {
    use super::*;

    #[tokio::test]
    async fn test_missing_topic_is_bad_request() {
        let app = TestApp::new(MockPostSource::new_success(science_posts()));

        let (status, body) = app.post_form("/api/sentiment/analyze", "num_records=3").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], "Topic is required");
        assert_eq!(app.source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_topic_is_bad_request() {
        let app = TestApp::new(MockPostSource::new_success(science_posts()));

        let (status, body) = app.get("/api/sentiment/analyze?topic=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Topic is required"));
    }

    #[tokio::test]
    async fn test_invalid_num_records() {
        let app = TestApp::new(MockPostSource::new_success(science_posts()));

        for bad in ["0", "-2", "many"] {
            let (status, body) = app
                .post_form("/api/sentiment/analyze", &format!("topic=science&num_records={}", bad))
                .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "num_records={}", bad);
            assert!(body.contains("num_records must be a positive integer"));
        }
        assert_eq!(app.repository.len().await, 0);
    }
}

mod analyze {
    use super::*;

    #[tokio::test]
    async fn test_analyze_fetches_and_renders() {
        let app = TestApp::new(MockPostSource::new_success(science_posts()));

        let (status, body) = app
            .post_form("/api/sentiment/analyze", "topic=science&num_records=1")
            .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("science"));
        assert!(body.contains("I enjoy Finance and tech."));
        assert!(body.contains("POSITIVE"));
        assert!(body.contains("data:image/png;base64,"));
        assert_eq!(app.repository.len().await, 1);
        assert_eq!(app.source.call_count(), 1);

        // 画像ファイルも書き出されている
        let images = app.static_dir.path().join("images");
        assert!(images.join("sentiment_bar_chart.png").exists());
        assert!(images.join("word_cloud.png").exists());
        println!("✅ 取得→分析→描画の一連の流れを確認");
    }

    #[tokio::test]
    async fn test_query_parameters_work_for_get() {
        let app = TestApp::new(MockPostSource::new_success(science_posts()));

        let (status, body) = app.get("/api/sentiment/analyze?topic=science&num_records=2").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Lab equipment broke again"));
        assert!(body.contains("NEGATIVE"));
        assert_eq!(app.repository.len().await, 2);
    }

    #[tokio::test]
    async fn test_second_request_is_served_from_cache() {
        let app = TestApp::new(MockPostSource::new_success(science_posts()));

        let (_, first) = app
            .post_form("/api/sentiment/analyze", "topic=science&num_records=1")
            .await;
        let (status, second) = app
            .post_form("/api/sentiment/analyze", "topic=science&num_records=1")
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(first, second);
        assert_eq!(app.source.call_count(), 1);
        assert_eq!(app.repository.len().await, 1);
    }

    #[tokio::test]
    async fn test_stored_rows_are_reused_for_other_limits() {
        let app = TestApp::new(MockPostSource::new_success(science_posts()));

        app.post_form("/api/sentiment/analyze", "topic=science&num_records=1")
            .await;
        // キャッシュキーは異なるがテーブルに1件あるので再取得しない
        let (status, body) = app
            .post_form("/api/sentiment/analyze", "topic=science&num_records=5")
            .await;

        assert_eq!(status, StatusCode::OK);
        assert!(!body.contains("Lab equipment broke again"));
        assert_eq!(app.source.call_count(), 1);
        assert_eq!(app.repository.len().await, 1);
    }

    #[tokio::test]
    async fn test_preexisting_rows_skip_fetch() {
        let app = TestApp::new(MockPostSource::new_success(science_posts()));
        app.repository
            .store("science", &[SentimentResult::new("from table", "stored content", -0.3)])
            .await
            .unwrap();

        let (status, body) = app.post_form("/api/sentiment/analyze", "topic=science").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("from table"));
        assert!(body.contains("-0.3000"));
        assert_eq!(app.source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_renders_empty_page() {
        let app = TestApp::new(MockPostSource::new_error("429 Too Many Requests"));

        let (status, body) = app.post_form("/api/sentiment/analyze", "topic=science").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("No posts found for this topic."));
        assert_eq!(app.repository.len().await, 0);
    }
}

mod pages {
    use super::*;

    #[tokio::test]
    async fn test_index_page() {
        let app = TestApp::new(MockPostSource::new_success(vec![]));

        let (status, body) = app.get("/api/sentiment/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<form"));

        let (status, _) = app.post_form("/api/sentiment/", "").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_generated_images_are_served() {
        let app = TestApp::new(MockPostSource::new_success(science_posts()));
        app.post_form("/api/sentiment/analyze", "topic=science").await;

        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/static/images/word_cloud.png")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/png"
        );
    }
}
