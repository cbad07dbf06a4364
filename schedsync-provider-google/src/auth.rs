//! Browser-based OAuth flow that creates a session for one Google account.

use anyhow::{Context, Result, anyhow};
use google_calendar::Client;
use google_calendar::types::MinAccessRole;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use crate::app_config;
use crate::session::{Session, SessionData};

pub const SCOPES: &[&str] = &["https://www.googleapis.com/auth/calendar"];

const REDIRECT_PORT: u16 = 8085;

pub fn redirect_uri() -> String {
    format!("http://localhost:{}/callback", REDIRECT_PORT)
}

fn redirect_address() -> String {
    format!("127.0.0.1:{}", REDIRECT_PORT)
}

/// Run the consent flow and store the session. Returns the account email.
pub async fn authenticate() -> Result<String> {
    let scopes: Vec<String> = SCOPES.iter().map(|s| s.to_string()).collect();

    let creds = app_config::load()?;

    let mut client = Client::new(
        creds.client_id.clone(),
        creds.client_secret.clone(),
        redirect_uri(),
        String::new(),
        String::new(),
    );

    let auth_url = client.user_consent_url(&scopes);

    eprintln!("\nOpen this URL in your browser to authenticate:\n");
    eprintln!("{}\n", auth_url);

    if open::that(&auth_url).is_err() {
        eprintln!("(Could not open browser automatically, please copy the URL above)");
    }

    let (code, state) = wait_for_callback().await?;

    eprintln!("\nReceived authorization code, exchanging for tokens...");

    let tokens = client
        .get_access_token(&code, &state)
        .await
        .context("Failed to exchange authorization code")?;

    let client = Client::new(
        creds.client_id,
        creds.client_secret,
        redirect_uri(),
        tokens.access_token.clone(),
        tokens.refresh_token.clone(),
    );

    let calendars = client
        .calendar_list()
        .list_all(MinAccessRole::default(), false, false)
        .await
        .context("Failed to list calendars")?
        .body;

    // The primary calendar is named after the account email
    let account_email = calendars
        .iter()
        .find(|cal| cal.primary)
        .map(|cal| cal.summary.clone())
        .ok_or_else(|| anyhow!("No primary calendar found"))?;

    Session::new(&account_email, SessionData::from(&tokens)).save()?;

    Ok(account_email)
}

async fn wait_for_callback() -> Result<(String, String)> {
    let listener = TcpListener::bind(redirect_address())
        .await
        .context("Failed to bind OAuth callback listener")?;

    let (stream, _) = listener
        .accept()
        .await
        .context("Failed to accept OAuth callback")?;

    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .await
        .context("Failed to read OAuth callback request line")?;

    let (code, state) = parse_callback(&request_line)?;

    let response = "HTTP/1.1 200 OK\r\n\
        Content-Type: text/html\r\n\
        Connection: close\r\n\
        \r\n\
        <html><body>\
        <h1>Authentication successful!</h1>\
        <p>You can close this window and return to the terminal.</p>\
        </body></html>";

    let mut stream = reader.into_inner();
    stream
        .write_all(response.as_bytes())
        .await
        .context("Failed to write OAuth callback response")?;
    stream.flush().await?;

    Ok((code, state))
}

/// Extract `code` and `state` from the callback's HTTP request line.
fn parse_callback(request_line: &str) -> Result<(String, String)> {
    let url_part = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| anyhow!("Invalid HTTP request"))?;

    let url = url::Url::parse(&format!("http://localhost{}", url_part))?;

    let param = |name: &str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.to_string())
    };

    if let Some(error) = param("error") {
        anyhow::bail!("Authorization was denied: {}", error);
    }

    let code = param("code").ok_or_else(|| anyhow!("No code in callback"))?;
    let state = param("state").ok_or_else(|| anyhow!("No state in callback"))?;

    Ok((code, state))
}
