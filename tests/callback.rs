mod common;

use std::sync::Arc;

use reqwest::{StatusCode, header};
use serde_json::{Value, json};

use common::{MockProvider, mock_discord_user_info, spawn_app, spawn_app_with_provider};

#[tokio::test]
async fn test_callback_without_session_is_forbidden() {
    let (app, discord) = spawn_app().await;
    discord.issue_code("good");

    let response = app.get("/api/auth/callback/discord?code=good", None).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "user not logged in" }));
    assert_eq!(discord.token_requests(), 0);
}

#[tokio::test]
async fn test_callback_with_invalid_session_is_forbidden() {
    let (app, _discord) = spawn_app().await;

    let response = app
        .get("/api/auth/callback/discord?code=good", Some("garbage"))
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_callback_unknown_provider() {
    let (app, _discord) = spawn_app().await;
    let token = app.login(1, "nelly-local");

    let response = app
        .get("/api/auth/callback/myspace?code=good", Some(&token))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_callback_missing_code() {
    let (app, discord) = spawn_app().await;
    let token = app.login(1, "nelly-local");

    for path in ["/api/auth/callback/discord", "/api/auth/callback/discord?code="] {
        let response = app.get(path, Some(&token)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "authorization code is missing");
    }
    assert_eq!(discord.token_requests(), 0);
}

#[tokio::test]
async fn test_callback_connects_account() {
    let (app, discord) = spawn_app().await;
    let token = app.login(1, "nelly-local");
    discord.issue_code("good");

    let response = app
        .get("/api/auth/callback/discord?code=good", Some(&token))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "userId": "80351110224678912",
            "username": "nelly",
            "avatarUrl": "https://cdn.discordapp.com/avatars/80351110224678912/8342729096ea3675442027381ff50dfe.png",
            "refreshToken": "refresh-good"
        })
    );

    let stored = app.store.user(1).unwrap();
    assert_eq!(stored.discord_access_token.as_deref(), Some("access-good"));
    assert_eq!(discord.token_requests(), 1);
    assert_eq!(discord.identity_requests(), 1);
}

#[tokio::test]
async fn test_callback_replayed_code_is_bad_gateway() {
    let (app, discord) = spawn_app().await;
    let token = app.login(1, "nelly-local");
    discord.issue_code("good");

    let first = app
        .get("/api/auth/callback/discord?code=good", Some(&token))
        .await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .get("/api/auth/callback/discord?code=good", Some(&token))
        .await;

    assert_eq!(second.status(), StatusCode::BAD_GATEWAY);
    let body: Value = second.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("invalid_grant"));
    assert_eq!(discord.identity_requests(), 1);
}

#[tokio::test]
async fn test_callback_incomplete_profile_is_bad_gateway() {
    let (app, discord) = spawn_app().await;
    let token = app.login(1, "nelly-local");
    discord.set_profile(json!({ "id": "80351110224678912", "username": "" }));
    discord.issue_code("good");

    let response = app
        .get("/api/auth/callback/discord?code=good", Some(&token))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_callback_with_mock_provider() {
    let provider = Arc::new(MockProvider::succeeding(123));
    let app = spawn_app_with_provider(provider.clone()).await;
    let token = app.login(123, "fakeuser");

    let response = app
        .get("/api/auth/callback/discord?code=fakeAuthCode", Some(&token))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::to_value(mock_discord_user_info()).unwrap());
    assert_eq!(
        provider.exchange_calls(),
        vec![(123, "fakeAuthCode".to_string())]
    );
}

#[tokio::test]
async fn test_callback_accepts_bearer_token() {
    let provider = Arc::new(MockProvider::succeeding(5));
    let app = spawn_app_with_provider(provider.clone()).await;
    let token = app.login(5, "bearer-user");

    let response = app
        .client
        .get(format!(
            "{}/api/auth/callback/discord?code=fakeAuthCode",
            app.address
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(provider.exchange_calls(), vec![(5, "fakeAuthCode".to_string())]);
}

#[tokio::test]
async fn test_connect_redirects_to_discord() {
    let (app, discord) = spawn_app().await;

    let response = app.get("/api/auth/connect/discord", None).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.starts_with(&format!("{}/oauth2/authorize?", discord.address)));
    assert!(location.contains("response_type=code"));
    assert!(location.contains("scope=identify"));
}

#[tokio::test]
async fn test_connect_unknown_provider() {
    let (app, _discord) = spawn_app().await;

    let response = app.get("/api/auth/connect/myspace", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
