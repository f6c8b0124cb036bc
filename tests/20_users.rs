mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn register_login_and_stale_token_lifecycle() -> Result<()> {
    if !common::enabled() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let (email, password, user) = common::register_user(&client, &server.base_url).await?;
    assert!(user.get("password").is_none(), "password hash leaked in response");
    assert!(user["profilePicture"]["imageUrl"]
        .as_str()
        .is_some_and(|url| !url.is_empty()));

    // First login works and yields a usable token
    let first_token = common::login(&client, &server.base_url, &email, &password).await?;
    let res = client
        .post(format!("{}/logout", server.base_url))
        .header("Authorization", format!("Bearer {}", first_token))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Logout bumped the session version; the same token is now stale
    let res = client
        .post(format!("{}/logout", server.base_url))
        .header("Authorization", format!("Bearer {}", first_token))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Authentication failed: account is not logged in");

    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_rejected_case_insensitively() -> Result<()> {
    if !common::enabled() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let (email, _password, _user) = common::register_user(&client, &server.base_url).await?;

    let form = reqwest::multipart::Form::new()
        .text("fullName", "Copy Cat")
        .text("email", email.to_uppercase())
        .text("password", "another-pass")
        .text("age", "22")
        .text("phoneNumber", {
            let suffix = common::unique_suffix();
            format!("090{}", &suffix[suffix.len() - 8..])
        })
        .part("profilePicture", common::png_part());

    let res = client
        .post(format!("{}/register", server.base_url))
        .multipart(form)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "User already exists");
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_400_not_200() -> Result<()> {
    if !common::enabled() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let (email, _password, _user) = common::register_user(&client, &server.base_url).await?;

    let res = client
        .post(format!("{}/login", server.base_url))
        .json(&serde_json::json!({ "email": email, "password": "not-the-password" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Incorrect password");
    Ok(())
}

#[tokio::test]
async fn unknown_user_lookup_is_404() -> Result<()> {
    if !common::enabled() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!(
            "{}/users/get-one/00000000-0000-0000-0000-000000000000",
            server.base_url
        ))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
