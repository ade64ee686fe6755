mod http;
mod output;


use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use hirevoo_session::guard::evaluate_path;
use hirevoo_session::net::api::ApiClient;
use hirevoo_session::session::login::{AccountFlow, validate_login_input};
use hirevoo_session::session::logout::LogoutCoordinator;
use hirevoo_session::session::verifier::SessionVerifier;
use hirevoo_session::storage::{LocalCache, MemoryCache};
use hirevoo_session::sync::settings::{NoEffects, SettingsSynchronizer, SyncOutcome};
use hirevoo_session::{ApiError, AuthStore, ClientConfig};
use serde_json::{Value, json};

use crate::http::{CookieJar, ReqwestTransport, default_cookie_file};
use crate::output::{StderrNotifier, auth_json, guard_json, parse_setting_value, parse_settings_object, print_json};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("http client setup failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("cookie file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("settings payload must be a JSON object")]
    NotAnObject,
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("settings change was discarded")]
    Discarded,
}

#[derive(Parser, Debug)]
#[command(name = "hirevoo-cli", about = "HireVoo session and settings CLI")]
struct Cli {
    #[arg(long, env = "HIREVOO_BASE_URL", default_value = "http://127.0.0.1:8000")]
    base_url: String,

    /// Where cookies persist between invocations.
    #[arg(long, env = "HIREVOO_COOKIE_FILE")]
    cookie_file: Option<PathBuf>,

    /// Keep cookies in memory only.
    #[arg(long, default_value_t = false)]
    no_cookie_file: bool,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify the current session and print it.
    Session,
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "HIREVOO_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    Settings(SettingsCommand),
    /// Evaluate the route guard for a path against the current session.
    Guard {
        path: String,
    },
}

#[derive(Args, Debug)]
struct SettingsCommand {
    #[command(subcommand)]
    command: SettingsSubcommand,
}

#[derive(Subcommand, Debug)]
enum SettingsSubcommand {
    Get,
    Set {
        key: String,
        /// JSON literal or bare string.
        value: String,
    },
    Save {
        #[arg(long)]
        data: String,
    },
    Reset,
}

/// Collaborators shared by every command.
struct Context {
    api: ApiClient,
    store: AuthStore,
    cache: Arc<dyn LocalCache>,
    notifier: Arc<StderrNotifier>,
    jar: Arc<CookieJar>,
    cookie_file: Option<PathBuf>,
}

impl Context {
    fn new(cli: &Cli) -> Result<Self, CliError> {
        let jar = Arc::new(CookieJar::new(&cli.base_url)?);
        let cookie_file = if cli.no_cookie_file { None } else { cli.cookie_file.clone().or_else(default_cookie_file) };
        if let Some(path) = &cookie_file {
            jar.load(path)?;
        }
        let transport = Arc::new(ReqwestTransport::new(&jar)?);
        let config = ClientConfig::default().with_api_base(&cli.base_url);
        Ok(Self {
            api: ApiClient::new(config, transport, jar.clone()),
            store: AuthStore::new(),
            cache: Arc::new(MemoryCache::default()),
            notifier: Arc::new(StderrNotifier),
            jar,
            cookie_file,
        })
    }

    /// Prime CSRF and resolve the session, as the browser does at mount.
    async fn boot(&self) {
        if let Err(err) = self.api.csrf().prime_token().await {
            tracing::warn!(error = %err, "csrf prime failed");
        }
        self.store.initialize(&SessionVerifier::new(self.api.clone())).await;
    }

    fn settings(&self) -> SettingsSynchronizer {
        SettingsSynchronizer::new(
            self.api.clone(),
            self.store.clone(),
            self.notifier.clone(),
            self.cache.clone(),
            Arc::new(NoEffects),
        )
    }

    fn persist_cookies(&self) -> Result<(), CliError> {
        match &self.cookie_file {
            Some(path) => self.jar.save(path),
            None => Ok(()),
        }
    }
}

fn log_level(verbose: u8) -> tracing::Level {
    match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(log_level(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    let ctx = Context::new(&cli)?;
    let result = run(&ctx, cli.command).await;
    ctx.persist_cookies()?;
    result
}

async fn run(ctx: &Context, command: Command) -> Result<(), CliError> {
    match command {
        Command::Session => {
            ctx.boot().await;
            print_json(&auth_json(&ctx.store.state()))
        }
        Command::Login { email, password } => run_login(ctx, &email, &password).await,
        Command::Logout => {
            let coordinator = LogoutCoordinator::new(ctx.api.clone(), ctx.cache.clone(), ctx.notifier.clone());
            let outcome = ctx.store.logout(&coordinator).await;
            print_json(&json!({ "confirmed": outcome.confirmed, "next": outcome.navigation.target() }))
        }
        Command::Settings(settings) => run_settings(ctx, settings).await,
        Command::Guard { path } => {
            ctx.boot().await;
            let decision = evaluate_path(&ctx.store.state(), &path, ctx.api.config());
            print_json(&guard_json(&path, &decision))
        }
    }
}

async fn run_login(ctx: &Context, email: &str, password: &str) -> Result<(), CliError> {
    let email = validate_login_input(email, password).map_err(|errors| {
        let message = [errors.email, errors.password].into_iter().flatten().collect::<Vec<_>>().join("; ");
        CliError::InvalidInput(message)
    })?;
    let account = AccountFlow::new(ctx.api.clone(), ctx.notifier.clone());
    let navigation = account.login(&ctx.store, &email, password).await?;
    print_json(&json!({ "session": auth_json(&ctx.store.state()), "next": navigation.target() }))
}

async fn run_settings(ctx: &Context, settings: SettingsCommand) -> Result<(), CliError> {
    ctx.boot().await;
    let sync = ctx.settings();
    let outcome = match settings.command {
        SettingsSubcommand::Get => {
            let values = sync.load().await?;
            return print_json(&Value::Object(values));
        }
        SettingsSubcommand::Set { key, value } => {
            sync.load().await?;
            sync.update_field(&key, parse_setting_value(&value)).await
        }
        SettingsSubcommand::Save { data } => {
            let changes = parse_settings_object(&data)?;
            sync.load().await?;
            sync.save_all(&changes).await
        }
        SettingsSubcommand::Reset => sync.reset().await,
    };
    settle(outcome)?;
    print_json(&Value::Object(sync.values()))
}

fn settle(outcome: SyncOutcome) -> Result<(), CliError> {
    match outcome {
        SyncOutcome::Committed => Ok(()),
        SyncOutcome::RolledBack { error, .. } | SyncOutcome::Refused { error, .. } => Err(error.into()),
        SyncOutcome::Discarded => Err(CliError::Discarded),
    }
}
