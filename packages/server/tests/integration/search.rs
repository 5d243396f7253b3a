use crate::common::{TestApp, routes};

mod search_files {
    use super::*;

    #[tokio::test]
    async fn missing_query_is_bad_request_with_empty_list() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::SEARCH).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body, serde_json::json!([]));

        let res = app.get("/fileSearch?q=").await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn finds_uploaded_file_case_insensitively() {
        let app = TestApp::spawn().await;
        app.upload("report.pdf", b"pdf".to_vec()).await;
        let stored = app.records().await.remove(0);

        let res = app.search("REPORT").await;

        assert_eq!(res.status, 200);
        assert_eq!(
            res.body,
            serde_json::json!([{"filename": "report.pdf", "path": stored.path}])
        );
    }

    #[tokio::test]
    async fn no_match_is_empty_list() {
        let app = TestApp::spawn().await;
        app.upload("report.pdf", b"pdf".to_vec()).await;

        let res = app.search("budget").await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn returns_only_the_first_match() {
        let app = TestApp::spawn().await;
        app.upload("budget-2023.xlsx", b"a".to_vec()).await;
        app.upload("budget-2024.xlsx", b"b".to_vec()).await;

        let res = app.search("budget").await;

        let hits = res.body.as_array().unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["filename"], "budget-2023.xlsx");
    }

    #[tokio::test]
    async fn query_is_a_regular_expression() {
        let app = TestApp::spawn().await;
        app.upload("my-report.pdf", b"a".to_vec()).await;
        app.upload("Report.PDF", b"b".to_vec()).await;

        let res = app.search(r"^rep.*\.pdf$").await;

        let hits = res.body.as_array().unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["filename"], "Report.PDF");
    }

    #[tokio::test]
    async fn invalid_regex_is_matched_literally() {
        let app = TestApp::spawn().await;
        app.upload("report(1).txt", b"a".to_vec()).await;

        let res = app.search("report(").await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body[0]["filename"], "report(1).txt");
    }

    #[tokio::test]
    async fn like_wildcards_are_literal() {
        let app = TestApp::spawn().await;
        app.upload("report.pdf", b"a".to_vec()).await;

        assert_eq!(app.search("%").await.body, serde_json::json!([]));
        assert_eq!(app.search("rep_rt").await.body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn repeated_queries_are_idempotent() {
        let app = TestApp::spawn().await;
        app.upload("notes.md", b"a".to_vec()).await;
        app.upload("notes-old.md", b"b".to_vec()).await;

        let first = app.search("notes").await;
        let second = app.search("notes").await;

        assert_eq!(first.status, second.status);
        assert_eq!(first.body, second.body);
    }
}
