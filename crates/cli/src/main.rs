use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use flickrview_api::{FlickrClient, OUT_OF_BAND_CALLBACK};
use flickrview_explorer::{Explorer, ExplorerState, ValidationError, build_form, fetch_descriptor, validate};
use flickrview_server::AppState;
use flickrview_types::{Form, Permission};
use flickrview_util::{AppConfig, JsonPersonStore, default_config_path};
use tracing::{Subscriber, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Parser)]
#[command(name = "flickrview", version, about = "Browse Flickr and explore its API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the web views (the default).
    Serve {
        /// Address to listen on, e.g. 127.0.0.1:8000.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Authorize against a Flickr account and store the access token.
    Auth {
        #[arg(long, default_value = "read")]
        perms: Permission,
    },
    /// Call any Flickr API method through its reflected argument list.
    Explore {
        /// Method name, with or without the `flickr.` prefix.
        method: String,
        /// Argument as KEY=VALUE; repeatable.
        #[arg(long = "arg", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        args: Vec<(String, String)>,
        /// Print the form and the arguments that would be sent, without calling.
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = AppConfig::load().context("loading configuration")?;

    match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => run_serve(&config, bind).await,
        Command::Auth { perms } => run_auth(&config, perms).await,
        Command::Explore { method, args, dry_run } => run_explore(&config, &method, args, dry_run).await,
    }
}

fn init_tracing() {
    let _ = log_subscriber(env_filter()).try_init();
}

/// Filter from `RUST_LOG`, falling back to `info`.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn log_subscriber(filter: EnvFilter) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .finish()
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing argument name in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn build_client(config: &AppConfig) -> Result<FlickrClient> {
    let credentials = config.credentials()?;
    let client = FlickrClient::with_endpoints(credentials, config.api_base.as_deref(), None)?;
    Ok(client)
}

async fn run_serve(config: &AppConfig, bind: Option<String>) -> Result<()> {
    let client = Arc::new(build_client(config)?);
    let authenticated_user = client.authenticated_user().map(str::to_string);
    if authenticated_user.is_none() {
        info!("no access token configured; account views are disabled until `flickrview auth` runs");
    }
    let people = Arc::new(JsonPersonStore::new(config.people_path.clone())?);
    let state = AppState::new(client, people, authenticated_user);
    let bind = bind.unwrap_or_else(|| config.bind_address().to_string());
    flickrview_server::serve(state, &bind)
        .await
        .with_context(|| format!("serving on {bind}"))
}

async fn run_auth(config: &AppConfig, perms: Permission) -> Result<()> {
    let mut credentials = config.credentials()?;
    credentials.access_token = None;
    let client = FlickrClient::with_endpoints(credentials, config.api_base.as_deref(), None)?;

    let request_token = client.request_token(OUT_OF_BAND_CALLBACK).await?;
    let authorize_url = client.authorize_url(&request_token, perms)?;
    println!("Open this URL, authorize the application and paste the code shown:\n\n  {authorize_url}\n");
    print!("Verifier code: ");
    io::stdout().flush()?;

    let mut verifier = String::new();
    io::stdin().lock().read_line(&mut verifier)?;
    if verifier.trim().is_empty() {
        bail!("no verifier code entered");
    }
    let access_token = client.access_token(&request_token, &verifier, perms).await?;

    // Only the file's own values are written back; environment overrides stay out.
    let path = default_config_path();
    let mut stored = AppConfig::load_from_path(&path)?;
    let who = access_token
        .username
        .clone()
        .or_else(|| access_token.user_nsid.clone())
        .unwrap_or_else(|| "unknown user".into());
    stored.access_token = Some(access_token);
    stored.save_to_path(&path)?;
    println!("Authorized as {who} with {perms} permission; token saved to {}", path.display());
    Ok(())
}

async fn run_explore(config: &AppConfig, method: &str, args: Vec<(String, String)>, dry_run: bool) -> Result<()> {
    let client: Arc<FlickrClient> = Arc::new(build_client(config)?);
    let input: HashMap<String, String> = args.into_iter().collect();

    if dry_run {
        let descriptor = fetch_descriptor(client.as_ref(), method).await?;
        let form = build_form(&descriptor);
        print_form(&form, None);
        match validate(&form, &input) {
            Ok(arguments) => println!("\nwould send: {}", serde_json::to_string_pretty(&arguments)?),
            Err(errors) => println!("\n{errors}"),
        }
        return Ok(());
    }

    match Explorer::new(client).submit(method, &input).await {
        ExplorerState::ResultReady { result, .. } => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        ExplorerState::AwaitingSubmission { form, errors } => {
            print_form(&form, errors.as_ref());
            match errors {
                Some(errors) => Err(errors.into()),
                None => Ok(()),
            }
        }
        other => Err(other.into_result().err().map(anyhow::Error::from).unwrap_or_else(|| {
            anyhow::anyhow!("explore ended without a result")
        })),
    }
}

fn print_form(form: &Form, errors: Option<&ValidationError>) {
    println!("{}", form.operation);
    if let Some(description) = &form.description {
        println!("  {description}");
    }
    for field in &form.fields {
        let marker = if field.required { " (required)" } else { "" };
        let error = errors
            .and_then(|errors| errors.field_error(&field.name))
            .map(|message| format!("  <- {message}"))
            .unwrap_or_default();
        println!("  --arg {}=...{marker}{error}", field.name);
        if !field.help_text.is_empty() {
            println!("      {}", field.help_text);
        }
    }
}
