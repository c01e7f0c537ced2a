use application::auth_service::AuthService;
use domain::errors::RagError;
use infrastructure::oauth::{OAuthFlow, StoredToken};
use tempfile::tempdir;

fn far_future() -> u64 {
    u64::MAX / 2
}

#[tokio::test]
async fn test_saved_login_is_reused() {
    let dir = tempdir().unwrap();
    let flow = OAuthFlow::new(dir.path().join("client_secret.json"), dir.path().join("token.json"));
    flow.save_token(&StoredToken {
        access_token: "ya29.saved".to_string(),
        refresh_token: Some("1//refresh".to_string()),
        expires_at: far_future(),
    })
    .unwrap();

    let auth = AuthService::new(flow);
    let token = auth.login().await.unwrap();
    assert_eq!(token.secret(), "ya29.saved");
}

#[tokio::test]
async fn test_switch_account_forgets_saved_login() {
    let dir = tempdir().unwrap();
    let token_path = dir.path().join("token.json");
    let flow = OAuthFlow::new(dir.path().join("client_secret.json"), &token_path);
    flow.save_token(&StoredToken {
        access_token: "ya29.saved".to_string(),
        refresh_token: None,
        expires_at: far_future(),
    })
    .unwrap();

    let auth = AuthService::new(flow);
    auth.switch_account().unwrap();
    assert!(!token_path.exists());

    // Switching again with nothing saved is fine.
    auth.switch_account().unwrap();

    // Without a saved token the flow needs the client secret, which is missing here.
    let err = auth.login().await.unwrap_err();
    assert!(matches!(err, RagError::Authentication(_)));
}

#[test]
fn test_saved_token_file_is_plain_json() {
    let dir = tempdir().unwrap();
    let token_path = dir.path().join("nested").join("token.json");
    let flow = OAuthFlow::new(dir.path().join("client_secret.json"), &token_path);
    let token = StoredToken {
        access_token: "ya29.abc".to_string(),
        refresh_token: Some("1//r".to_string()),
        expires_at: 1_700_000_000,
    };
    flow.save_token(&token).unwrap();

    let raw = std::fs::read_to_string(&token_path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["access_token"], "ya29.abc");
    assert_eq!(flow.load_token(), Some(token));
}
