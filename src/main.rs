use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use kagi::config::Config;
use kagi::login::memory::hash_password;
use kagi::login::LoginRequest;
use kagi::AuthRuntime;

/// Kagi - stateless bearer-token authentication
#[derive(Parser, Debug)]
#[command(name = "kagi")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the configuration, derive the key and exit
    Check,
    /// Log in with configured credentials and print the token
    Issue {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Verify a token and print the identity it carries
    Verify {
        #[arg(short, long)]
        token: String,
    },
    /// Print the password_hash value for a user entry
    HashPassword {
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    // Needs no configuration
    if let Command::HashPassword { password } = &args.command {
        let hash = hash_password(password)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
        println!("{}", hash);
        return Ok(());
    }

    // Load configuration from file
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;
    config.validate().context("Invalid configuration")?;

    // Initialize logging subsystem
    kagi::logging::init_subscriber(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging subsystem: {}", e))?;

    tracing::info!(
        config_file = %args.config.display(),
        endpoint = %config.auth.endpoint,
        unsecured_paths = config.auth.unsecured_paths.len(),
        users = config.auth.users.len(),
        "Configuration loaded successfully"
    );

    let runtime = AuthRuntime::builder(config.auth.clone())
        .build()
        .context("Failed to initialize token authentication")?;

    match args.command {
        Command::Check => {
            let codec = runtime.tokens();
            println!(
                "configuration OK: algorithm {}, ttl {}s, timezone {}",
                codec.codec().algorithm(),
                codec.codec().ttl_seconds(),
                codec.codec().time_policy()
            );
        }
        Command::Issue { username, password } => {
            let Some(login) = runtime.login() else {
                bail!("no users configured: nothing to log in against");
            };
            let response = login
                .login(&LoginRequest::new(username, password))
                .await
                .context("Login rejected")?;
            println!("{}", serde_json::to_string(&response)?);
        }
        Command::Verify { token } => {
            let tokens = runtime.tokens();
            let identity = tokens.identity_from_token(&token).context("Token rejected")?;
            let expires = tokens.expiration_from_token(&token)?;
            println!("{}", serde_json::to_string_pretty(&identity)?);
            println!("expires at {}", expires.to_rfc3339());
        }
        Command::HashPassword { .. } => {}
    }

    Ok(())
}
