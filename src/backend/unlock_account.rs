/**
 * Offline Account Unlock
 *
 * Clears the failed-attempt counter and lock of one account, for operators
 * who cannot wait for a lock to expire.
 *
 * ```text
 * unlock-account <username-or-email>
 * ```
 *
 * Uses the same `DATABASE_URL` and secrets as the server. Without
 * `DATABASE_URL` there is no persistent store to unlock, so the tool exits
 * with an error.
 */

use chrono::Utc;
use clap::Parser;
use siteauth::backend::auth::service::AuthService;
use siteauth::backend::logging::init_tracing;
use siteauth::backend::server::config::load_store;
use siteauth::shared::AppConfig;

/// Clear the failed-login lock of one account
#[derive(Parser)]
#[command(name = "unlock-account")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Username or email of the account to unlock
    #[arg(value_parser = parse_identity)]
    identity: String,
}

fn parse_identity(value: &str) -> Result<String, String> {
    let identity = value.trim();
    if identity.is_empty() {
        return Err("identity must not be empty".to_string());
    }
    Ok(identity.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    dotenv::dotenv().ok();

    init_tracing("warn");

    let config = AppConfig::from_env()?;
    if config.database_url.is_none() {
        return Err("DATABASE_URL must be set to unlock an account".into());
    }

    let store = load_store(&config).await?;
    let auth = AuthService::from_config(store, &config);

    let account = auth.unlock_account(&cli.identity, Utc::now()).await?;
    println!("Unlocked {} <{}> ({})", account.username, account.email, account.id);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_identity_is_positional() {
        let cli = Cli::try_parse_from(["unlock-account", " ada@example.com "]).unwrap();
        assert_eq!(cli.identity, "ada@example.com");
    }

    #[test]
    fn test_help_is_not_an_identity() {
        let err = Cli::try_parse_from(["unlock-account", "--help"]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_missing_or_blank_identity_rejected() {
        let err = Cli::try_parse_from(["unlock-account"]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err = Cli::try_parse_from(["unlock-account", "  "]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }
}
