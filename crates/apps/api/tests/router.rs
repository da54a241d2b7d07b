use api::api_state::ApiContext;
use api::build_app;
use app_state::UploadSettings;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use common_services::api::upload::interfaces::UploadConfig;
use common_services::database::Stores;
use common_services::object_storage::InMemoryObjectStorage;
use http_body_util::BodyExt;
use image::{ImageBuffer, ImageFormat, Rgba, RgbaImage};
use serde_json::{Value, json};
use std::io::Cursor;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const ADMIN_TOKEN: &str = "test-admin-token";
const BOUNDARY: &str = "X-BLOG-TEST-BOUNDARY";

fn test_app(dir: &TempDir) -> Router {
    let context = ApiContext {
        stores: Stores::in_memory(),
        object_storage: Arc::new(InMemoryObjectStorage::new("https://cdn.example.com")),
        upload: UploadConfig {
            upload: UploadSettings::new(dir.path().to_path_buf(), "uploads"),
            production: false,
            key_prefix: "blog/uploads".to_owned(),
        },
        admin_token: Arc::from(ADMIN_TOKEN),
        id_length: 12,
    };
    build_app(context, &["http://localhost:3000".to_owned()])
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("valid request")
}

fn multipart_request(file_name: &str, bytes: &[u8], token: Option<&str>) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).expect("valid request")
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.expect("infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes()
        .to_vec();
    (status, bytes)
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, request).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn png_bytes() -> Vec<u8> {
    let image: RgbaImage = ImageBuffer::from_pixel(5, 5, Rgba([30, 60, 90, 255]));
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .expect("png encodes");
    out.into_inner()
}

#[tokio::test]
async fn test_root_health_and_openapi() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = test_app(&dir);

    let (root_status, _) = send(&app, request(Method::GET, "/", None, None)).await;
    let (health_status, health) = send(&app, request(Method::GET, "/health", None, None)).await;
    let (doc_status, doc) = send_json(&app, request(Method::GET, "/openapi.json", None, None)).await;

    assert_eq!(root_status, StatusCode::OK);
    assert_eq!(health_status, StatusCode::OK);
    assert_eq!(health, b"OK");
    assert_eq!(doc_status, StatusCode::OK);
    assert!(doc["paths"]["/series/{series_id}/order"]["put"].is_object());
    assert!(doc["paths"]["/upload"]["post"].is_object());
}

#[tokio::test]
async fn test_writes_need_the_admin_token() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = test_app(&dir);
    let payload = json!({"title": "Guide", "slug": "guide", "description": "How to"});

    let (anonymous_status, anonymous) = send_json(
        &app,
        request(Method::POST, "/series", None, Some(payload.clone())),
    )
    .await;
    let (wrong_status, _) = send_json(
        &app,
        request(Method::POST, "/series", Some("nope"), Some(payload)),
    )
    .await;
    let (upload_status, upload) =
        send_json(&app, multipart_request("a.txt", b"hello", None)).await;

    assert_eq!(anonymous_status, StatusCode::FORBIDDEN);
    assert_eq!(anonymous, json!({"error": "permission denied"}));
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(upload_status, StatusCode::FORBIDDEN);
    assert_eq!(upload, json!({"error": "permission denied"}));
}

#[tokio::test]
async fn test_series_lifecycle() {
    // ARRANGE
    let dir = tempfile::tempdir().expect("tempdir");
    let app = test_app(&dir);
    let admin = Some(ADMIN_TOKEN);

    // ACT + ASSERT: create, conflict
    let (status, series) = send_json(
        &app,
        request(
            Method::POST,
            "/series",
            admin,
            Some(json!({"title": "Guide", "slug": "guide", "description": "How to", "published": true})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let series_id = series["id"].as_str().expect("id").to_owned();
    assert!(series["createdAt"].is_string());

    let (status, conflict) = send_json(
        &app,
        request(
            Method::POST,
            "/series",
            admin,
            Some(json!({"title": "Other", "slug": "guide", "description": "Again"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(conflict["error"].as_str().expect("message").contains("slug"));

    // membership
    let mut post_ids = Vec::new();
    for slug in ["part-one", "part-two"] {
        let (status, post) = send_json(
            &app,
            request(
                Method::POST,
                "/posts",
                admin,
                Some(json!({"title": slug, "slug": slug, "published": true})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let post_id = post["id"].as_str().expect("id").to_owned();
        let (status, member) = send_json(
            &app,
            request(
                Method::PUT,
                &format!("/posts/{post_id}/series"),
                admin,
                Some(json!({"seriesId": series_id})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(member["seriesOrder"], json!(post_ids.len()));
        post_ids.push(post_id);
    }

    // reorder
    let (status, reordered) = send_json(
        &app,
        request(
            Method::PUT,
            &format!("/series/{series_id}/order"),
            admin,
            Some(json!({"postOrders": [
                {"postId": post_ids[0], "order": 2},
                {"postId": post_ids[1], "order": 1},
            ]})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reordered, json!({"success": true}));

    let (status, by_slug) =
        send_json(&app, request(Method::GET, "/series/slug/guide", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_slug["postCount"], json!(2));
    assert_eq!(by_slug["posts"][0]["id"], json!(post_ids[1]));
    assert_eq!(by_slug["posts"][1]["seriesOrder"], json!(2));

    // invalid reorder lists every violation
    let (status, invalid) = send_json(
        &app,
        request(
            Method::PUT,
            &format!("/series/{series_id}/order"),
            admin,
            Some(json!({"postOrders": [{"postId": "", "order": -1}]})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        invalid["error"],
        json!("postOrders[0].postId must not be empty; postOrders[0].order must be >= 0")
    );

    // unpublish hides it from anonymous callers
    let (status, toggled) = send_json(
        &app,
        request(
            Method::PATCH,
            &format!("/series/{series_id}"),
            admin,
            Some(json!({"action": "toggle-published"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled["published"], json!(false));
    let (status, _) = send_json(
        &app,
        request(Method::GET, &format!("/series/{series_id}"), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, listed) = send_json(&app, request(Method::GET, "/series", None, None)).await;
    assert_eq!(listed["total"], json!(0));

    // delete detaches members
    let (status, _) = send(
        &app,
        request(Method::DELETE, &format!("/series/{series_id}"), admin, None),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, post) = send_json(
        &app,
        request(Method::GET, &format!("/posts/{}", post_ids[0]), None, None),
    )
    .await;
    assert_eq!(post["seriesId"], Value::Null);
    assert_eq!(post["seriesOrder"], Value::Null);
}

#[tokio::test]
async fn test_listing_query_parameters() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = test_app(&dir);
    for (title, slug, published) in [
        ("Rust One", "rust-one", true),
        ("Rust Two", "rust-two", false),
        ("Cooking", "cooking", true),
    ] {
        let (status, _) = send_json(
            &app,
            request(
                Method::POST,
                "/series",
                Some(ADMIN_TOKEN),
                Some(json!({"title": title, "slug": slug, "description": "d", "published": published})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, admin) = send_json(
        &app,
        request(
            Method::GET,
            "/series?title=Rust&published=unpublished&orderBy=createdAt&order=asc&pageIndex=1&pageSize=5",
            Some(ADMIN_TOKEN),
            None,
        ),
    )
    .await;
    let (_, anonymous) = send_json(
        &app,
        request(Method::GET, "/series?title=Rust&published=unpublished", None, None),
    )
    .await;
    let (status, _) = send_json(
        &app,
        request(Method::GET, "/series?pageSize=500", None, None),
    )
    .await;
    let (_, published) =
        send_json(&app, request(Method::GET, "/series/published", None, None)).await;

    assert_eq!(admin["total"], json!(1));
    assert_eq!(admin["series"][0]["slug"], json!("rust-two"));
    assert_eq!(anonymous["total"], json!(1));
    assert_eq!(anonymous["series"][0]["slug"], json!("rust-one"));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(published["total"], json!(2));
}

#[tokio::test]
async fn test_upload_is_transcoded_and_served() {
    // ARRANGE
    let dir = tempfile::tempdir().expect("tempdir");
    let app = test_app(&dir);

    // ACT
    let (status, body) = send_json(
        &app,
        multipart_request("holiday.png", &png_bytes(), Some(ADMIN_TOKEN)),
    )
    .await;

    // ASSERT
    assert_eq!(status, StatusCode::OK);
    let url = body["url"].as_str().expect("url").to_owned();
    assert!(url.starts_with("/uploads/holiday-") && url.ends_with(".webp"), "{url}");
    let (status, served) = send(&app, request(Method::GET, &url, None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&served[8..12], b"WEBP");
}

#[tokio::test]
async fn test_upload_limits_and_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = test_app(&dir);
    let too_big = vec![b'a'; 11 * 1024 * 1024];

    let (big_status, big) =
        send_json(&app, multipart_request("big.txt", &too_big, Some(ADMIN_TOKEN))).await;
    let empty_form = Request::builder()
        .method(Method::POST)
        .uri("/upload")
        .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(format!("--{BOUNDARY}--\r\n")))
        .expect("valid request");
    let (missing_status, missing) = send_json(&app, empty_form).await;

    assert_eq!(big_status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(big, json!({"error": "file size exceeds the 10 MiB limit"}));
    assert_eq!(missing_status, StatusCode::BAD_REQUEST);
    assert_eq!(missing, json!({"error": "no file selected"}));
    assert!(
        std::fs::read_dir(dir.path().join("uploads"))
            .map(|entries| entries.count() == 0)
            .unwrap_or(true)
    );
}
