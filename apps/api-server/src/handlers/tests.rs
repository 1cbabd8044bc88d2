//! Handler-level scenarios over the real route table, backed by the
//! in-memory repositories and a temp-dir media store.

use std::sync::Arc;
use std::time::Duration;

use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::{Value, json};

use quill_core::ports::{MediaStore, PasswordService, TokenService};
use quill_infra::{
    Argon2PasswordService, FsMediaStore, InMemoryStore, JwtConfig, JwtTokenService,
};

use crate::handlers::configure_routes;
use crate::state::AppState;

const BOUNDARY: &str = "----quill-test-boundary";

fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-key".to_string(),
        expiration_hours: 1,
        issuer: "quill-test".to_string(),
    }
}

async fn spawn_app(
    media_dir: &std::path::Path,
) -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    let store = Arc::new(InMemoryStore::new());
    let media: Arc<dyn MediaStore> = Arc::new(FsMediaStore::open(media_dir).await.unwrap());
    let state = AppState {
        users: store.clone(),
        posts: store,
        media,
        storage_timeout: Duration::from_secs(5),
    };
    let token_service: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(test_jwt_config()));
    let password_service: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .app_data(web::Data::new(token_service))
            .app_data(web::Data::new(password_service))
            .configure(configure_routes),
    )
    .await
}

async fn register(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    email: &str,
) -> String {
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "email": email, "password": "password123" }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    body["token"].as_str().unwrap().to_string()
}

fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str, &str, Vec<u8>)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (name, filename, content_type, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_request(method: test::TestRequest, token: Option<&str>, body: Vec<u8>) -> Request {
    let mut req = method
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body);
    if let Some(token) = token {
        req = req.insert_header((header::AUTHORIZATION, format!("Bearer {token}")));
    }
    req.to_request()
}

async fn create_post(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    token: &str,
    fields: &[(&str, &str)],
) -> Value {
    let req = multipart_request(
        test::TestRequest::post().uri("/api/posts"),
        Some(token),
        multipart_body(fields, &[]),
    );
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    test::read_body_json(resp).await
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

#[actix_web::test]
async fn test_register_rejects_duplicate_email() {
    let dir = tempfile::tempdir().unwrap();
    let app = spawn_app(dir.path()).await;

    let _ = register(&app, "first@example.com").await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "email": "first@example.com", "password": "password123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["message"].as_str().unwrap().contains("exists"));
}

#[actix_web::test]
async fn test_login_round_trip_and_bad_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let app = spawn_app(dir.path()).await;

    let _ = register(&app, "login@example.com").await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "login@example.com", "password": "password123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["user"]["email"], "login@example.com");
    // The password hash must never appear in any response
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["user"].get("password_hash").is_none());

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "login@example.com", "password": "wrong-password" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_me_returns_the_token_subject() {
    let dir = tempfile::tempdir().unwrap();
    let app = spawn_app(dir.path()).await;

    let token = register(&app, "me@example.com").await;

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["email"], "me@example.com");
}

#[actix_web::test]
async fn test_anonymous_post_creation_is_unauthorized() {
    let dir = tempfile::tempdir().unwrap();
    let app = spawn_app(dir.path()).await;

    let req = multipart_request(
        test::TestRequest::post().uri("/api/posts"),
        None,
        multipart_body(&[("title", "Nope"), ("content", "Nope")], &[]),
    );
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_garbage_and_stale_tokens_are_unauthorized() {
    let dir = tempfile::tempdir().unwrap();
    let app = spawn_app(dir.path()).await;

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(bearer("not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Validly signed token whose subject was never registered
    let service = JwtTokenService::new(test_jwt_config());
    let ghost = service
        .generate_token(uuid::Uuid::new_v4(), "ghost@example.com")
        .unwrap();
    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(bearer(&ghost))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_create_then_get_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let app = spawn_app(dir.path()).await;

    let token = register(&app, "author@example.com").await;
    let post = create_post(
        &app,
        &token,
        &[
            ("title", "Morning Reflections"),
            ("content", "<p>On stillness.</p>"),
            ("category", "essays"),
            ("tags", " quiet , , morning "),
        ],
    )
    .await;

    assert_eq!(post["user"]["email"], "author@example.com");
    assert_eq!(post["status"], "published");
    assert_eq!(post["contentType"], "html");
    assert_eq!(post["views"], 0);

    let id = post["id"].as_str().unwrap();
    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let fetched: Value = test::read_body_json(resp).await;
    assert_eq!(fetched["title"], "Morning Reflections");
    assert_eq!(fetched["content"], "<p>On stillness.</p>");
    assert_eq!(fetched["category"], "essays");
    assert_eq!(fetched["tags"], json!(["quiet", "morning"]));
}

#[actix_web::test]
async fn test_missing_title_or_content_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = spawn_app(dir.path()).await;

    let token = register(&app, "author@example.com").await;

    let req = multipart_request(
        test::TestRequest::post().uri("/api/posts"),
        Some(&token),
        multipart_body(&[("title", "Only a title")], &[]),
    );
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Whitespace-only counts as missing
    let req = multipart_request(
        test::TestRequest::post().uri("/api/posts"),
        Some(&token),
        multipart_body(&[("title", "   "), ("content", "Body")], &[]),
    );
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_every_read_counts_a_view() {
    let dir = tempfile::tempdir().unwrap();
    let app = spawn_app(dir.path()).await;

    let token = register(&app, "author@example.com").await;
    let post = create_post(&app, &token, &[("title", "Counted"), ("content", "Body")]).await;
    let id = post["id"].as_str().unwrap();

    let mut last = Value::Null;
    for _ in 0..3 {
        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{id}"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        last = test::read_body_json(resp).await;
    }

    assert_eq!(last["views"], 3);
}

#[actix_web::test]
async fn test_only_the_owner_may_update_or_delete() {
    let dir = tempfile::tempdir().unwrap();
    let app = spawn_app(dir.path()).await;

    let owner = register(&app, "usera@example.com").await;
    let intruder = register(&app, "userb@example.com").await;

    let content = "a".repeat(200);
    let post = create_post(&app, &owner, &[("title", "Faith"), ("content", &content)]).await;
    let id = post["id"].as_str().unwrap().to_string();

    // Someone else cannot touch it
    let req = multipart_request(
        test::TestRequest::put().uri(&format!("/api/posts/{id}")),
        Some(&intruder),
        multipart_body(&[("title", "Hijacked")], &[]),
    );
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{id}"))
        .insert_header(bearer(&intruder))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // The owner can
    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{id}"))
        .insert_header(bearer(&owner))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Post deleted successfully");

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_partial_update_keeps_unset_fields() {
    let dir = tempfile::tempdir().unwrap();
    let app = spawn_app(dir.path()).await;

    let token = register(&app, "author@example.com").await;
    let post = create_post(
        &app,
        &token,
        &[
            ("title", "Original"),
            ("content", "Original body"),
            ("category", "letters"),
            ("tags", "one,two"),
        ],
    )
    .await;
    let id = post["id"].as_str().unwrap();

    let req = multipart_request(
        test::TestRequest::put().uri(&format!("/api/posts/{id}")),
        Some(&token),
        multipart_body(&[("title", "Renamed"), ("status", "draft")], &[]),
    );
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let updated: Value = test::read_body_json(resp).await;
    assert_eq!(updated["title"], "Renamed");
    assert_eq!(updated["status"], "draft");
    assert_eq!(updated["content"], "Original body");
    assert_eq!(updated["category"], "letters");
    assert_eq!(updated["tags"], json!(["one", "two"]));
}

#[actix_web::test]
async fn test_like_and_unlike_are_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let app = spawn_app(dir.path()).await;

    let owner = register(&app, "usera@example.com").await;
    let reader = register(&app, "userb@example.com").await;

    let post = create_post(&app, &owner, &[("title", "Liked"), ("content", "Body")]).await;
    let id = post["id"].as_str().unwrap();

    for expected_likes in [1, 1] {
        let req = test::TestRequest::post()
            .uri(&format!("/api/posts/{id}/like"))
            .insert_header(bearer(&reader))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["likes"].as_array().unwrap().len(), expected_likes);
        assert_eq!(body["likes"][0]["email"], "userb@example.com");
    }

    for _ in 0..2 {
        let req = test::TestRequest::delete()
            .uri(&format!("/api/posts/{id}/like"))
            .insert_header(bearer(&reader))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["likes"].as_array().unwrap().is_empty());
    }
}

#[actix_web::test]
async fn test_comment_lifecycle_with_ownership() {
    let dir = tempfile::tempdir().unwrap();
    let app = spawn_app(dir.path()).await;

    let owner = register(&app, "usera@example.com").await;
    let commenter = register(&app, "userb@example.com").await;

    let post = create_post(&app, &owner, &[("title", "Open thread"), ("content", "Body")]).await;
    let id = post["id"].as_str().unwrap();

    // Any authenticated user may comment
    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{id}/comments"))
        .insert_header(bearer(&commenter))
        .set_json(json!({ "content": "First!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["comments"].as_array().unwrap().len(), 1);
    assert_eq!(body["comments"][0]["user"]["email"], "userb@example.com");
    let comment_id = body["comments"][0]["id"].as_str().unwrap().to_string();

    // Only the author may edit it - not even the post owner
    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{id}/comments/{comment_id}"))
        .insert_header(bearer(&owner))
        .set_json(json!({ "content": "Rewritten" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{id}/comments/{comment_id}"))
        .insert_header(bearer(&commenter))
        .set_json(json!({ "content": "Edited" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["comments"][0]["content"], "Edited");

    // Author deletes; a second delete is a 404
    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{id}/comments/{comment_id}"))
        .insert_header(bearer(&commenter))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["comments"].as_array().unwrap().is_empty());

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{id}/comments/{comment_id}"))
        .insert_header(bearer(&commenter))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_empty_comment_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = spawn_app(dir.path()).await;

    let token = register(&app, "author@example.com").await;
    let post = create_post(&app, &token, &[("title", "Quiet"), ("content", "Body")]).await;
    let id = post["id"].as_str().unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{id}/comments"))
        .insert_header(bearer(&token))
        .set_json(json!({ "content": "   " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_upload_validation_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let app = spawn_app(dir.path()).await;

    let token = register(&app, "uploader@example.com").await;

    // No file at all
    let req = multipart_request(
        test::TestRequest::post().uri("/api/upload"),
        Some(&token),
        multipart_body(&[("caption", "just text")], &[]),
    );
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Wrong MIME type
    let req = multipart_request(
        test::TestRequest::post().uri("/api/upload"),
        Some(&token),
        multipart_body(
            &[],
            &[("image", "doc.png", "application/pdf", b"%PDF-".to_vec())],
        ),
    );
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["message"].as_str().unwrap().contains("file type"));

    // Wrong extension, right MIME
    let req = multipart_request(
        test::TestRequest::post().uri("/api/upload"),
        Some(&token),
        multipart_body(&[], &[("image", "notes.txt", "image/png", b"x".to_vec())]),
    );
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["message"].as_str().unwrap().contains("extension"));

    // Too large: 6 MiB
    let req = multipart_request(
        test::TestRequest::post().uri("/api/upload"),
        Some(&token),
        multipart_body(
            &[],
            &[(
                "image",
                "big.png",
                "image/png",
                vec![0u8; 6 * 1024 * 1024],
            )],
        ),
    );
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["message"].as_str().unwrap().contains("too large"));

    // 4 MiB PNG is accepted and lands on disk
    let req = multipart_request(
        test::TestRequest::post().uri("/api/upload"),
        Some(&token),
        multipart_body(
            &[],
            &[(
                "image",
                "ok.PNG",
                "image/png",
                vec![0u8; 4 * 1024 * 1024],
            )],
        ),
    );
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let filename = body["filename"].as_str().unwrap();
    assert!(filename.ends_with(".png"));
    assert_eq!(body["size"], 4 * 1024 * 1024);
    assert_eq!(body["mimetype"], "image/png");
    assert!(
        body["url"]
            .as_str()
            .unwrap()
            .ends_with(&format!("/uploads/{filename}"))
    );
    assert!(dir.path().join(filename).exists());
}

#[actix_web::test]
async fn test_anonymous_upload_is_unauthorized() {
    let dir = tempfile::tempdir().unwrap();
    let app = spawn_app(dir.path()).await;

    let req = multipart_request(
        test::TestRequest::post().uri("/api/upload"),
        None,
        multipart_body(&[], &[("image", "a.png", "image/png", b"x".to_vec())]),
    );
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_update_appends_images_and_delete_cleans_them_up() {
    let dir = tempfile::tempdir().unwrap();
    let app = spawn_app(dir.path()).await;

    let token = register(&app, "author@example.com").await;

    let req = multipart_request(
        test::TestRequest::post().uri("/api/posts"),
        Some(&token),
        multipart_body(
            &[("title", "Illustrated"), ("content", "Body")],
            &[("images", "first.png", "image/png", b"png-one".to_vec())],
        ),
    );
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let post: Value = test::read_body_json(resp).await;
    assert_eq!(post["images"].as_array().unwrap().len(), 1);
    let id = post["id"].as_str().unwrap().to_string();

    let req = multipart_request(
        test::TestRequest::put().uri(&format!("/api/posts/{id}")),
        Some(&token),
        multipart_body(
            &[],
            &[("images", "second.jpg", "image/jpeg", b"jpg-two".to_vec())],
        ),
    );
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = test::read_body_json(resp).await;
    let images = updated["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);

    let stored: Vec<String> = images
        .iter()
        .map(|i| {
            i["url"]
                .as_str()
                .unwrap()
                .rsplit('/')
                .next()
                .unwrap()
                .to_string()
        })
        .collect();
    for file in &stored {
        assert!(dir.path().join(file).exists());
    }

    // Deleting the post removes the backing files
    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{id}"))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    for file in &stored {
        assert!(!dir.path().join(file).exists());
    }
}

#[actix_web::test]
async fn test_listing_paginates_newest_first_with_filters() {
    let dir = tempfile::tempdir().unwrap();
    let app = spawn_app(dir.path()).await;

    let token = register(&app, "author@example.com").await;

    for i in 0..12 {
        let title = format!("Post {i}");
        let mut fields = vec![("title", title.as_str()), ("content", "Body text")];
        if i % 3 == 0 {
            fields.push(("category", "letters"));
            fields.push(("tags", "slow"));
        }
        create_post(&app, &token, &fields).await;
    }

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page: Value = test::read_body_json(resp).await;
    assert_eq!(page["total"], 12);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["currentPage"], 1);
    assert_eq!(page["posts"].as_array().unwrap().len(), 10);
    assert_eq!(page["posts"][0]["title"], "Post 11");

    let req = test::TestRequest::get()
        .uri("/api/posts?page=2")
        .to_request();
    let resp = test::call_service(&app, req).await;
    let page: Value = test::read_body_json(resp).await;
    assert_eq!(page["currentPage"], 2);
    assert_eq!(page["posts"].as_array().unwrap().len(), 2);

    let req = test::TestRequest::get()
        .uri("/api/posts?category=letters")
        .to_request();
    let resp = test::call_service(&app, req).await;
    let page: Value = test::read_body_json(resp).await;
    assert_eq!(page["total"], 4);

    let req = test::TestRequest::get()
        .uri("/api/posts?tag=slow")
        .to_request();
    let resp = test::call_service(&app, req).await;
    let page: Value = test::read_body_json(resp).await;
    assert_eq!(page["total"], 4);

    let req = test::TestRequest::get()
        .uri("/api/posts?search=post%201")
        .to_request();
    let resp = test::call_service(&app, req).await;
    let page: Value = test::read_body_json(resp).await;
    // Case-insensitive substring: "Post 1", "Post 10", "Post 11"
    assert_eq!(page["total"], 3);
}
