use crate::common::{TestApp, routes};

mod download_file {
    use super::*;

    #[tokio::test]
    async fn stored_file_is_downloaded_as_attachment() {
        let app = TestApp::spawn().await;
        app.upload("report.pdf", b"%PDF-1.7 body".to_vec()).await;
        let path = app.records().await[0].path.clone();

        let res = app.get(&routes::download(&path)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.text, "%PDF-1.7 body");
        assert_eq!(res.header("content-type"), Some("application/pdf"));
        assert_eq!(res.header("content-length"), Some("13"));
        let disposition = res.header("content-disposition").unwrap();
        assert!(disposition.starts_with("attachment;"));
        assert!(disposition.contains(&format!("filename=\"{path}\"")));
    }

    #[tokio::test]
    async fn unknown_file_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::download("does-not-exist")).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.text, "File not found");
    }

    #[tokio::test]
    async fn nested_paths_are_resolved_in_upload_dir() {
        let app = TestApp::spawn().await;
        std::fs::create_dir_all(app.uploads_dir.join("a/b")).unwrap();
        std::fs::write(app.uploads_dir.join("a/b/c.png"), b"PNG").unwrap();

        let res = app.get(&routes::download("a/b/c.png")).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.text, "PNG");
        assert_eq!(res.header("content-type"), Some("image/png"));
    }

    #[tokio::test]
    async fn traversal_outside_upload_dir_is_not_found() {
        let app = TestApp::spawn().await;
        // Sits next to the upload directory, inside the temp root.
        std::fs::write(app.uploads_dir.join("../secret.txt"), b"secret").unwrap();

        for path in ["..%2Fsecret.txt", "a%2F..%2F..%2Fsecret.txt", "%2Fetc%2Fpasswd"] {
            let res = app.get(&routes::download(path)).await;
            assert_eq!(res.status, 404, "path {path} should not resolve");
            assert_eq!(res.text, "File not found");
        }
    }

    #[tokio::test]
    async fn directories_and_temp_files_are_not_served() {
        let app = TestApp::spawn().await;
        std::fs::create_dir_all(app.uploads_dir.join("sub")).unwrap();

        assert_eq!(app.get(&routes::download("sub")).await.status, 404);
        assert_eq!(app.get(&routes::download(".tmp")).await.status, 404);
    }
}

mod static_assets {
    use super::*;

    #[tokio::test]
    async fn public_dir_is_served_at_root() {
        let app = TestApp::spawn().await;
        std::fs::write(app.public_dir.join("script.js"), "'use strict';").unwrap();

        let index = app.get("/").await;
        assert_eq!(index.status, 200);
        assert!(index.text.contains("filebot"));

        let script = app.get("/script.js").await;
        assert_eq!(script.status, 200);
        assert_eq!(script.text, "'use strict';");
    }

    #[tokio::test]
    async fn openapi_document_lists_file_routes() {
        let app = TestApp::spawn().await;

        let res = app.get("/api-docs/openapi.json").await;

        assert_eq!(res.status, 200);
        let paths = res.body["paths"].as_object().unwrap();
        assert!(paths.contains_key("/upload"));
        assert!(paths.contains_key("/fileSearch"));
        assert!(paths.contains_key("/download/{file}"));
    }
}
