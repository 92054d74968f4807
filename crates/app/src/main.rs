//! `tokenline` command-line client.
//!
//! Run with: `tokenline <command> [args]`
//!
//! This is a CLI tool, so `println!` and `eprintln!` are intentionally used
//! for user-facing output; diagnostics go through `tracing`.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::env;
use std::process::ExitCode;

use anyhow::{anyhow, Context};
use tokenline_domain::{Config, CredentialPair, PostsState};
use tokenline_infra::{config, init_tracing, loaders, open_store, ApiClient, ApiClientConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();

    let result = match args.first().map(String::as_str) {
        Some("help") | None => {
            print_help();
            Ok(())
        }
        Some(command) => run(command, &args[1..]).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn print_help() {
    println!("Tokenline API client");
    println!();
    println!("USAGE:");
    println!("    tokenline <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    login <access> <refresh>  Store a credential pair");
    println!("    logout                    Remove stored credentials");
    println!("    status                    Show whether an access token is stored");
    println!("    get <path>                GET a path and print the JSON body");
    println!("    posts                     List posts");
    println!("    post <id>                 Show a single post");
    println!("    help                      Show this help message");
    println!();
    println!("Configuration is read from TOKENLINE_* environment variables or");
    println!("tokenline.json / tokenline.toml in the working directory.");
}

async fn run(command: &str, args: &[String]) -> anyhow::Result<()> {
    let config = config::load().context("Failed to load configuration")?;
    init_tracing(&config.logging)?;

    let client = build_client(&config)?;

    match command {
        "login" => {
            let [access_token, refresh_token] = args else {
                return Err(anyhow!("usage: tokenline login <access> <refresh>"));
            };
            client.login(&CredentialPair {
                access_token: access_token.clone(),
                refresh_token: refresh_token.clone(),
            })?;
            println!("Logged in");
        }
        "logout" => {
            client.logout()?;
            println!("Logged out");
        }
        "status" => {
            let state = if client.is_authenticated()? { "authenticated" } else { "anonymous" };
            println!("{state} ({})", client.config().base_url);
        }
        "get" => {
            let [path] = args else {
                return Err(anyhow!("usage: tokenline get <path>"));
            };
            let body: serde_json::Value = client.get(path).await?;
            print_json(&body)?;
        }
        "posts" => {
            let mut state = PostsState::default();
            loaders::load_posts(&client, &mut state).await;
            if let Some(error) = state.error {
                return Err(anyhow!(error));
            }
            for post in &state.posts {
                println!("{:>5}  {}", post.id, post.title);
            }
        }
        "post" => {
            let [id] = args else {
                return Err(anyhow!("usage: tokenline post <id>"));
            };
            let id: u64 = id.parse().with_context(|| format!("Invalid post id: {id}"))?;
            let post = loaders::fetch_post(&client, id).await?;
            println!("#{} {}", post.id, post.title);
            println!();
            println!("{}", post.body);
        }
        unknown => {
            eprintln!("Unknown command: {unknown}");
            eprintln!();
            print_help();
            return Err(anyhow!("Unknown command"));
        }
    }

    Ok(())
}

fn build_client(config: &Config) -> anyhow::Result<ApiClient> {
    let store = open_store(&config.credentials).context("Failed to open credential store")?;
    tracing::debug!(base_url = %config.api.base_url, "Building API client");
    ApiClient::new(ApiClientConfig::from(&config.api), store)
        .context("Failed to create API client")
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
