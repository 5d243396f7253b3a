use crate::common::{TestApp, routes};

mod upload_file {
    use super::*;

    #[tokio::test]
    async fn new_file_is_stored_and_recorded() {
        let app = TestApp::spawn().await;

        let res = app.upload("report.pdf", b"%PDF-1.7".to_vec()).await;

        assert_eq!(res.status, 201);
        assert_eq!(res.text, "File uploaded successfully");

        let records = app.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].filename, "report.pdf");
        assert_eq!(records[0].size, 8);
        assert!(records[0].path.ends_with(".pdf"));
        assert_eq!(app.uploaded_files(), vec![records[0].path.clone()]);
    }

    #[tokio::test]
    async fn stored_name_is_randomized_hex_with_extension() {
        let app = TestApp::spawn().await;

        app.upload("photo.JPG", b"JPEG".to_vec()).await;

        let path = &app.records().await[0].path;
        let (stem, ext) = path.split_once('.').unwrap();
        assert_eq!(stem.len(), 32);
        assert!(stem.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(ext, "JPG");
    }

    #[tokio::test]
    async fn unusual_extensions_are_kept_on_disk() {
        let app = TestApp::spawn().await;

        for name in ["main.c++", "backup.tar-gz", "résumé.pdé"] {
            assert_eq!(app.upload(name, b"x".to_vec()).await.status, 201);
        }

        let records = app.records().await;
        assert!(records[0].path.ends_with(".c++"));
        assert!(records[1].path.ends_with(".tar-gz"));
        assert!(records[2].path.ends_with(".pdé"));

        let res = app.get(&routes::download(&records[0].path)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.text, "x");
    }

    #[tokio::test]
    async fn filename_is_stored_as_sent() {
        let app = TestApp::spawn().await;

        assert_eq!(app.upload(" report.pdf", b"a".to_vec()).await.status, 201);
        assert_eq!(app.upload("report.pdf", b"b".to_vec()).await.status, 201);

        let records = app.records().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].filename, " report.pdf");
        assert_eq!(records[1].filename, "report.pdf");
    }

    #[tokio::test]
    async fn blank_filename_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.upload("   ", b"data".to_vec()).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.text, "Filename cannot be empty");
        assert!(app.uploaded_files().is_empty());
    }

    #[tokio::test]
    async fn duplicate_filename_is_rejected_and_removed_from_disk() {
        let app = TestApp::spawn().await;

        let first = app.upload("report.pdf", b"v1".to_vec()).await;
        assert_eq!(first.status, 201);

        let second = app.upload("report.pdf", b"v2".to_vec()).await;
        assert_eq!(second.status, 200);
        assert_eq!(second.text, "File already exists");

        let records = app.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(app.uploaded_files(), vec![records[0].path.clone()]);

        // The original content is kept.
        let data = std::fs::read(app.uploads_dir.join(&records[0].path)).unwrap();
        assert_eq!(data, b"v1");
    }

    #[tokio::test]
    async fn duplicate_check_is_case_sensitive() {
        let app = TestApp::spawn().await;

        assert_eq!(app.upload("Report.pdf", b"a".to_vec()).await.status, 201);
        assert_eq!(app.upload("report.pdf", b"b".to_vec()).await.status, 201);

        assert_eq!(app.records().await.len(), 2);
        assert_eq!(app.uploaded_files().len(), 2);
    }

    #[tokio::test]
    async fn concurrent_uploads_of_same_name_create_one_record() {
        let app = TestApp::spawn().await;

        let uploads = (0..8).map(|i| app.upload("race.txt", format!("copy {i}").into_bytes()));
        let results = futures::future::join_all(uploads).await;

        let created = results.iter().filter(|r| r.status == 201).count();
        let duplicates = results
            .iter()
            .filter(|r| r.status == 200 && r.text == "File already exists")
            .count();
        assert_eq!(created, 1);
        assert_eq!(duplicates, 7);

        let records = app.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(app.uploaded_files(), vec![records[0].path.clone()]);
    }

    #[tokio::test]
    async fn missing_file_part_is_rejected() {
        let app = TestApp::spawn().await;

        let form = reqwest::multipart::Form::new().text("comment", "no file here");
        let res = app.upload_form(form).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.text, "No file uploaded");
        assert!(app.records().await.is_empty());
    }

    #[tokio::test]
    async fn non_multipart_body_is_missing_file() {
        let app = TestApp::spawn().await;

        let res = app
            .client
            .post(app.url("/upload"))
            .body("plain body")
            .send()
            .await
            .unwrap();

        assert_eq!(res.status().as_u16(), 400);
        assert_eq!(res.text().await.unwrap(), "No file uploaded");
    }

    #[tokio::test]
    async fn file_part_without_filename_is_missing_file() {
        let app = TestApp::spawn().await;

        let form = reqwest::multipart::Form::new()
            .part("file", reqwest::multipart::Part::bytes(b"data".to_vec()));
        let res = app.upload_form(form).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.text, "No file uploaded");
        assert!(app.uploaded_files().is_empty());
    }

    #[tokio::test]
    async fn invalid_filename_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.upload("..", b"data".to_vec()).await;

        assert_eq!(res.status, 400);
        assert!(res.text.starts_with("Invalid filename"));
        assert!(app.uploaded_files().is_empty());
    }

    #[tokio::test]
    async fn extra_fields_are_ignored() {
        let app = TestApp::spawn().await;

        let part = reqwest::multipart::Part::bytes(b"notes".to_vec()).file_name("notes.txt");
        let form = reqwest::multipart::Form::new()
            .text("description", "weekly notes")
            .part("file", part);
        let res = app.upload_form(form).await;

        assert_eq!(res.status, 201);
        assert_eq!(app.records().await[0].filename, "notes.txt");
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected_without_leftovers() {
        let app = TestApp::spawn_with(|config| config.storage.max_upload_size = 16).await;

        let res = app.upload("big.bin", vec![0u8; 64]).await;

        assert_eq!(res.status, 413);
        assert_eq!(res.text, "File too large");
        assert!(app.records().await.is_empty());
        assert!(app.uploaded_files().is_empty());
        let tmp: Vec<_> = std::fs::read_dir(app.uploads_dir.join(".tmp"))
            .unwrap()
            .collect();
        assert!(tmp.is_empty());
    }
}
