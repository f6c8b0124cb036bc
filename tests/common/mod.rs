use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();

/// Integration tests need a provisioned environment: a reachable Postgres in
/// DATABASE_URL and media host credentials in MEDIA_*. They run only when
/// CATALOG_API_IT is set; otherwise every test returns early as a no-op.
pub fn enabled() -> bool {
    std::env::var("CATALOG_API_IT").is_ok()
}

#[allow(dead_code)]
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        let mut cmd = Command::new("target/debug/catalog-api");
        cmd.env("PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server sees DATABASE_URL, JWT_SECRET and
        // the MEDIA_* credentials from .env (loaded by the server itself)
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            match client.get(format!("{}/health", self.base_url)).send().await {
                Ok(resp) if resp.status() == StatusCode::OK => return Ok(()),
                _ => {}
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Unique suffix so repeated runs against the same database do not collide on
/// unique columns.
#[allow(dead_code)]
pub fn unique_suffix() -> String {
    format!(
        "{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    )
}

#[allow(dead_code)]
pub fn png_part() -> reqwest::multipart::Part {
    // Tiny valid-enough payload; the server only checks the declared MIME type
    reqwest::multipart::Part::bytes(vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a])
        .file_name("test.png")
        .mime_str("image/png")
        .expect("mime")
}

/// Register a fresh user and return (email, password, user json).
#[allow(dead_code)]
pub async fn register_user(
    client: &reqwest::Client,
    base_url: &str,
) -> Result<(String, String, serde_json::Value)> {
    let suffix = unique_suffix();
    let email = format!("it-user-{}@example.com", suffix);
    let password = "correct-horse".to_string();

    let form = reqwest::multipart::Form::new()
        .text("fullName", "Integration Tester")
        .text("email", email.clone())
        .text("password", password.clone())
        .text("age", "30")
        .text("phoneNumber", format!("080{}", &suffix[suffix.len() - 8..]))
        .part("profilePicture", png_part());

    let res = client
        .post(format!("{}/register", base_url))
        .multipart(form)
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == reqwest::StatusCode::CREATED,
        "register failed: {}",
        res.status()
    );
    let body = res.json::<serde_json::Value>().await?;
    Ok((email, password, body["data"].clone()))
}

/// Log in and return the bearer token.
#[allow(dead_code)]
pub async fn login(
    client: &reqwest::Client,
    base_url: &str,
    email: &str,
    password: &str,
) -> Result<String> {
    let res = client
        .post(format!("{}/login", base_url))
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == reqwest::StatusCode::OK,
        "login failed: {}",
        res.status()
    );
    let body = res.json::<serde_json::Value>().await?;
    body["data"]["token"]
        .as_str()
        .map(str::to_string)
        .context("token missing from login response")
}
