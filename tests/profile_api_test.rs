mod common;

use std::path::PathBuf;

use axum::http::StatusCode;
use exam_certificate_backend::render::fonts::FontBook;
use serde_json::json;
use tower::ServiceExt;

use common::{body_json, eligible_profile, get, state, with_json};

fn app() -> axum::Router {
    common::app(state(
        vec![eligible_profile("abc123")],
        FontBook::new(),
        PathBuf::from("/nonexistent/background.png"),
    ))
}

#[tokio::test]
async fn health_is_public_and_reports_assets() {
    let res = app().oneshot(get("/health", None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_json(res).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["assets"]["font_faces"], 0);
    assert_eq!(body["assets"]["background"], false);
    assert_eq!(body["assets"]["ready"], false);
}

#[tokio::test]
async fn profile_requires_bearer_token() {
    let res = app()
        .oneshot(get("/api/profile/abc123", None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(res).await["error"], "missing_authorization");
}

#[tokio::test]
async fn unknown_role_is_forbidden() {
    let res = app()
        .oneshot(get("/api/profile/abc123", Some("admin")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn fetch_profile_returns_record() {
    let res = app()
        .oneshot(get("/api/profile/abc123", Some("barcode")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_json(res).await;
    assert_eq!(body["id"], "abc123");
    assert_eq!(body["nama"], "Joy Putri");
    assert_eq!(body["tanggal_lahir"], "2001-01-26");
    assert_eq!(body["attempts"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn fetch_unknown_profile_is_not_found() {
    let res = app()
        .oneshot(get("/api/profile/does-not-exist", Some("certificate")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_updates_fields_and_derives_total() {
    let payload = json!({
        "tempat_lahir": "kediri",
        "tanggal_cetak_sertifikat": "2026-01-05",
        "attempts": [
            { "slot": 4, "listening": 60, "structure": 61, "reading": 62 }
        ]
    });
    let res = app()
        .oneshot(with_json("PATCH", "/api/profile/abc123", "certificate", &payload))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_json(res).await;
    assert_eq!(body["tempat_lahir"], "kediri");
    assert_eq!(body["expired_date"], "2028-01-05");
    assert_eq!(body["attempts"][3]["total_score"], 610.0);
    assert_eq!(body["attempts"][0]["total_score"].as_f64().unwrap() as f32, 40.3);
}

#[tokio::test]
async fn patch_rejects_invalid_slot_and_empty_body() {
    let bad_slot = json!({ "attempts": [{ "slot": 0, "total_score": 50.0 }] });
    let res = app()
        .oneshot(with_json("PATCH", "/api/profile/abc123", "certificate", &bad_slot))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app()
        .oneshot(with_json("PATCH", "/api/profile/abc123", "certificate", &json!({})))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patch_rejects_repeated_slot() {
    let payload = json!({
        "attempts": [
            { "slot": 2, "total_score": 50.0 },
            { "slot": 2, "total_score": 60.0 }
        ]
    });
    let res = app()
        .oneshot(with_json("PATCH", "/api/profile/abc123", "certificate", &payload))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = body_json(res).await;
    assert!(body["error"].as_str().unwrap().contains("more than once"));
}

#[tokio::test]
async fn patch_unknown_profile_is_not_found() {
    let res = app()
        .oneshot(with_json(
            "PATCH",
            "/api/profile/nobody",
            "certificate",
            &json!({ "nama": "Someone" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
