use anyhow::Result;
use owo_colors::OwoColorize;

pub async fn run() -> Result<()> {
    println!("Authenticating with Google...");

    // Runs the browser consent flow and stores the session
    let account = schedsync_provider_google::auth::authenticate().await?;

    println!("\nAuthenticated as: {}", account.green());
    println!("\nNow add the account to your config.toml:");
    println!();
    println!("[google]");
    println!("account = \"{}\"", account);
    println!("calendar_id = \"primary\"");
    println!();
    println!("Then run `schedsync check` to verify your setup.");

    Ok(())
}
