use std::sync::atomic::Ordering;

use server::config::UploadFailurePolicy;

use crate::common::{MAX_SIZE, PUBLIC_URL, TestApp, routes};

const CLIP: &[u8] = b"\x00\x00\x00\x18ftypmp42 fake video payload";

#[tokio::test]
async fn health_returns_empty_object() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::HEALTH).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body, serde_json::json!({}));
}

mod upload {
    use super::*;

    #[tokio::test]
    async fn created_video_points_at_its_metadata() {
        let app = TestApp::spawn().await;

        let res = app.upload("intro.mp4", CLIP, "video/mp4").await;

        assert_eq!(res.status, 201, "{:?}", res.body);
        let id = res.body["id"].as_str().unwrap();
        let expected = format!("{}v1/files/locate/{id}", PUBLIC_URL);
        assert_eq!(res.header("location"), Some(expected.as_str()));
        assert_eq!(res.body["location"].as_str(), Some(expected.as_str()));
    }

    #[tokio::test]
    async fn mpeg_is_accepted() {
        let app = TestApp::spawn().await;

        let res = app.upload("old.mpg", b"MPEG-1 stream", "video/mpeg").await;

        assert_eq!(res.status, 201);
    }

    #[tokio::test]
    async fn identical_bytes_are_rejected_with_existing_id() {
        let app = TestApp::spawn().await;
        let first = app.create_video("intro.mp4", CLIP).await;

        let res = app.upload("renamed.mp4", CLIP, "video/mp4").await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
        assert_eq!(res.body["existing_id"].as_str(), Some(first.as_str()));
        assert_eq!(app.get(routes::FILES).await.body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn same_name_different_bytes_is_accepted() {
        let app = TestApp::spawn().await;
        let first = app.create_video("intro.mp4", b"first cut").await;
        let second = app.create_video("intro.mp4", b"second cut").await;

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn unsupported_media_type_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.upload("notes.txt", b"hello", "text/plain").await;

        assert_eq!(res.status, 415);
        assert_eq!(res.body["code"], "UNSUPPORTED_MEDIA_TYPE");
        assert!(app.get(routes::FILES).await.body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_data_field_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .upload_field("file", "intro.mp4", CLIP, "video/mp4")
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn empty_payload_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.upload("empty.mp4", b"", "video/mp4").await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn payload_over_limit_is_rejected_without_orphan() {
        let app = TestApp::spawn().await;
        let oversized = vec![0x47u8; MAX_SIZE + 1];

        for _ in 0..2 {
            let res = app.upload("huge.mp4", &oversized, "video/mp4").await;
            assert_eq!(res.status, 413, "{:?}", res.body);
            assert_eq!(res.body["code"], "PAYLOAD_TOO_LARGE");
        }

        let orphans = app.get(routes::ORPHANS).await;
        assert_eq!(orphans.body["total"].as_u64(), Some(0));
        assert_eq!(app.get(routes::FILES).await.body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn payload_at_limit_is_accepted() {
        let app = TestApp::spawn().await;

        let res = app
            .upload("full.mp4", &vec![0x47u8; MAX_SIZE], "video/mp4")
            .await;

        assert_eq!(res.status, 201, "{:?}", res.body);
    }

    #[tokio::test]
    async fn path_like_filename_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.upload("../intro.mp4", CLIP, "video/mp4").await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod read {
    use super::*;

    #[tokio::test]
    async fn download_returns_exact_bytes_and_headers() {
        let app = TestApp::spawn().await;
        let id = app.create_video("intro.mp4", CLIP).await;

        let res = app.get(&routes::file(&id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.bytes, CLIP);
        assert_eq!(res.header("content-type"), Some("video/mp4"));
        assert_eq!(
            res.header("content-length"),
            Some(CLIP.len().to_string().as_str())
        );
        assert!(
            res.header("content-disposition")
                .unwrap()
                .starts_with("attachment; filename=\"intro.mp4\"")
        );
    }

    #[tokio::test]
    async fn locate_returns_record() {
        let app = TestApp::spawn().await;
        let id = app.create_video("intro.mp4", CLIP).await;

        let res = app.get(&routes::locate(&id)).await;

        assert_eq!(res.status, 200);
        let data = &res.body["fileData"];
        assert_eq!(data["fileid"].as_str(), Some(id.as_str()));
        assert_eq!(data["name"], "intro.mp4");
        assert_eq!(data["size"].as_u64(), Some(CLIP.len() as u64));
        assert_eq!(data["type"], "video/mp4");
        assert_eq!(data["hash"].as_str().unwrap().len(), 64);
    }

    #[tokio::test]
    async fn list_projects_every_video() {
        let app = TestApp::spawn().await;
        let a = app.create_video("a.mp4", b"aaaa").await;
        let b = app.create_video("b.mp4", b"bbbbbb").await;

        let res = app.get(routes::FILES).await;

        assert_eq!(res.status, 200);
        let items = res.body.as_array().unwrap();
        assert_eq!(items.len(), 2);
        let mut ids: Vec<&str> = items.iter().map(|v| v["fileid"].as_str().unwrap()).collect();
        ids.sort();
        let mut expected = vec![a.as_str(), b.as_str()];
        expected.sort();
        assert_eq!(ids, expected);
        for item in items {
            assert!(item.get("hash").is_none());
            assert!(item["created_at"].is_string());
        }
    }

    #[tokio::test]
    async fn empty_catalogue_lists_nothing() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::FILES).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn unknown_and_malformed_ids_are_not_found() {
        let app = TestApp::spawn().await;

        for id in ["01936f0e-1234-7abc-8000-000000000001", "not-an-id"] {
            assert_eq!(app.get(&routes::file(id)).await.status, 404);
            assert_eq!(app.get(&routes::locate(id)).await.status, 404);
            assert_eq!(app.delete(&routes::file(id)).await.status, 404);
        }
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn deleted_video_is_gone() {
        let app = TestApp::spawn().await;
        let id = app.create_video("intro.mp4", CLIP).await;

        let res = app.delete(&routes::file(&id)).await;
        assert_eq!(res.status, 204);

        assert_eq!(app.get(&routes::file(&id)).await.status, 404);
        assert_eq!(app.delete(&routes::file(&id)).await.status, 404);
        assert!(app.get(routes::FILES).await.body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn content_can_be_uploaded_again_after_delete() {
        let app = TestApp::spawn().await;
        let first = app.create_video("intro.mp4", CLIP).await;
        app.delete(&routes::file(&first)).await;

        let second = app.create_video("intro.mp4", CLIP).await;

        assert_ne!(first, second);
    }
}

mod partial_failure {
    use super::*;

    #[tokio::test]
    async fn failed_blob_upload_leaves_reported_orphan() {
        let app = TestApp::spawn().await;
        app.blobs.fail_upload.store(true, Ordering::SeqCst);

        let res = app.upload("intro.mp4", CLIP, "video/mp4").await;
        assert_eq!(res.status, 500);
        assert_eq!(res.body["code"], "INTERNAL_ERROR");

        let orphans = app.get(routes::ORPHANS).await;
        assert_eq!(orphans.status, 200);
        assert_eq!(orphans.body["total"].as_u64(), Some(1));
        let id = orphans.body["orphans"][0]["fileid"].as_str().unwrap().to_string();

        assert_eq!(app.get(&routes::file(&id)).await.status, 404);
        assert_eq!(app.get(&routes::locate(&id)).await.status, 200);
    }

    #[tokio::test]
    async fn orphan_record_still_blocks_identical_upload() {
        let app = TestApp::spawn().await;
        app.blobs.fail_upload.store(true, Ordering::SeqCst);
        app.upload("intro.mp4", CLIP, "video/mp4").await;
        app.blobs.fail_upload.store(false, Ordering::SeqCst);

        let res = app.upload("intro.mp4", CLIP, "video/mp4").await;

        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn compensation_removes_the_record() {
        let app = TestApp::spawn_with_policy(UploadFailurePolicy::Compensate).await;
        app.blobs.fail_upload.store(true, Ordering::SeqCst);

        let res = app.upload("intro.mp4", CLIP, "video/mp4").await;
        assert_eq!(res.status, 500);

        let orphans = app.get(routes::ORPHANS).await;
        assert_eq!(orphans.body["total"].as_u64(), Some(0));
        assert!(app.get(routes::FILES).await.body.as_array().unwrap().is_empty());

        app.blobs.fail_upload.store(false, Ordering::SeqCst);
        assert_eq!(app.upload("intro.mp4", CLIP, "video/mp4").await.status, 201);
    }

    #[tokio::test]
    async fn healthy_catalogue_has_no_orphans() {
        let app = TestApp::spawn().await;
        app.create_video("intro.mp4", CLIP).await;

        let res = app.get(routes::ORPHANS).await;

        assert_eq!(res.body["total"].as_u64(), Some(0));
    }
}

#[tokio::test]
async fn openapi_document_lists_video_routes() {
    let app = TestApp::spawn().await;

    let res = app.get("/api-docs/openapi.json").await;

    assert_eq!(res.status, 200);
    let paths = res.body["paths"].as_object().unwrap();
    for path in [
        "/v1/health",
        "/v1/files",
        "/v1/files/{file_id}",
        "/v1/files/locate/{file_id}",
        "/v1/admin/orphans",
    ] {
        assert!(paths.contains_key(path), "missing {path}");
    }
}
