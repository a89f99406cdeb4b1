//! End-to-end tests over the HTTP surface.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            builder.body(Body::from(value.to_string())).unwrap()
        }
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.expect("request");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

#[tokio::test]
async fn full_quiz_flow_over_http() {
    let (app, _dir) = common::create_test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/session/setup",
        Some(json!({
            "studentId": "kid1",
            "grade": "6th",
            "board": "State Board",
            "subject": "Math"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["coins"], json!(0));
    assert_eq!(body["data"]["level"], json!(1));

    let (status, body) = send(
        &app,
        "POST",
        "/api/quiz",
        Some(json!({
            "studentId": "kid1",
            "subject": "Math",
            "difficulty": "auto",
            "questionCount": 5
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let quiz_id = body["data"]["quizId"].as_str().expect("quiz id").to_string();
    assert_eq!(body["data"]["difficulty"], json!("easy"));
    let questions = body["data"]["questions"].as_array().expect("questions");
    assert_eq!(questions.len(), 5);
    // The client payload must not leak answers.
    assert!(questions.iter().all(|q| q.get("correctOption").is_none()));
    assert!(questions.iter().all(|q| q.get("explanation").is_none()));

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/quiz/{quiz_id}/submit"),
        Some(json!({
            "studentId": "kid1",
            "answers": [null, null, null, null, null],
            "timeTakenSecs": 90.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["score"], json!(0));
    // Consolation reward on the easy tier.
    assert_eq!(body["data"]["coinsEarned"], json!(5));
    assert_eq!(body["data"]["streakDays"], json!(1));
    let unlocked = body["data"]["newlyUnlocked"].as_array().expect("unlocked");
    assert!(unlocked.iter().any(|u| u["id"] == json!("first_quiz")));

    let (status, body) = send(&app, "GET", "/api/dashboard/kid1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["profile"]["totalQuizzes"], json!(1));
    assert_eq!(body["data"]["usage"]["quizzesSubmitted"], json!(1));
    assert_eq!(body["data"]["leaderboardPosition"], json!(1));
    assert!(!body["data"]["weakTopics"].as_array().unwrap().is_empty());

    let (status, body) = send(&app, "GET", "/api/leaderboard?metric=coins&limit=5", None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body["data"].as_array().expect("entries");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["studentId"], json!("kid1"));
}

#[tokio::test]
async fn duplicate_submit_maps_to_conflict() {
    let (app, _dir) = common::create_test_app();

    let (_, body) = send(
        &app,
        "POST",
        "/api/quiz",
        Some(json!({
            "studentId": "kid1",
            "subject": "Science",
            "difficulty": "easy",
            "questionCount": 4
        })),
    )
    .await;
    let quiz_id = body["data"]["quizId"].as_str().expect("quiz id").to_string();

    let submit_body = json!({
        "studentId": "kid1",
        "answers": [0, 0, 0, 0],
        "timeTakenSecs": 30.0
    });
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/quiz/{quiz_id}/submit"),
        Some(submit_body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/quiz/{quiz_id}/submit"),
        Some(submit_body),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], json!("ALREADY_SUBMITTED"));
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn error_codes_match_the_taxonomy() {
    let (app, _dir) = common::create_test_app();

    // No record yet.
    let (status, body) = send(&app, "GET", "/api/dashboard/ghost", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], json!("UNKNOWN_STUDENT"));

    // Create a profile with zero coins.
    send(
        &app,
        "POST",
        "/api/session/setup",
        Some(json!({
            "studentId": "kid1",
            "grade": "6th",
            "board": "State Board",
            "subject": "Math"
        })),
    )
    .await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/perks/purchase",
        Some(json!({ "studentId": "kid1", "perkId": "double_coins" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("INSUFFICIENT_FUNDS"));

    let (status, body) = send(
        &app,
        "POST",
        "/api/perks/purchase",
        Some(json!({ "studentId": "kid1", "perkId": "time_machine" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], json!("UNKNOWN_PERK"));

    let (status, body) = send(
        &app,
        "POST",
        "/api/quiz",
        Some(json!({
            "studentId": "kid1",
            "subject": "Math",
            "difficulty": "hard",
            "questionCount": 50
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], json!("INSUFFICIENT_QUESTIONS"));

    let (status, body) = send(
        &app,
        "POST",
        "/api/attention/ingest",
        Some(json!({ "studentId": "kid1", "score": 1.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("VALIDATION_ERROR"));

    let (status, body) = send(&app, "GET", "/api/leaderboard?metric=fame", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("VALIDATION_ERROR"));
}

#[tokio::test]
async fn parental_policy_gates_attention_over_http() {
    let (app, _dir) = common::create_test_app();

    send(
        &app,
        "POST",
        "/api/session/setup",
        Some(json!({
            "studentId": "kid1",
            "grade": "6th",
            "board": "State Board",
            "subject": "Science"
        })),
    )
    .await;

    let (status, body) = send(
        &app,
        "PUT",
        "/api/policy/kid1",
        Some(json!({ "webcamEnabled": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["webcamEnabled"], json!(false));

    // With consent off, even a stream of zero-attention samples stays quiet.
    for _ in 0..12 {
        let (status, body) = send(
            &app,
            "POST",
            "/api/attention/ingest",
            Some(json!({ "studentId": "kid1", "score": 0.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["kind"], json!("no_alert"));
    }
}

#[tokio::test]
async fn student_reset_removes_the_profile() {
    let (app, _dir) = common::create_test_app();

    send(
        &app,
        "POST",
        "/api/session/setup",
        Some(json!({
            "studentId": "kid1",
            "grade": "6th",
            "board": "State Board",
            "subject": "Math"
        })),
    )
    .await;

    let (status, body) = send(&app, "DELETE", "/api/dashboard/kid1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], json!(true));

    let (status, body) = send(&app, "GET", "/api/dashboard/kid1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], json!("UNKNOWN_STUDENT"));
}
