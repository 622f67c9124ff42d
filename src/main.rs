use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use instapic_bot::application::messaging::{BotRunner, MessageDispatcher, MessageParser};
use instapic_bot::application::services::{CommandService, ProfileService};
use instapic_bot::domain::traits::{Bot, UpdateSource};
use instapic_bot::infrastructure::adapters::telegram::polling::PollingUpdateSource;
use instapic_bot::infrastructure::adapters::telegram::webhook::WebhookUpdateSource;
use instapic_bot::infrastructure::adapters::telegram::TelegramAdapter;
use instapic_bot::infrastructure::challenge::ChallengeClient;
use instapic_bot::infrastructure::config::{Config, Environment};
use instapic_bot::infrastructure::image::HttpImageFetcher;
use instapic_bot::infrastructure::profile_page::{HttpPageFetcher, MetadataExtractor};

type Profiles = ProfileService<HttpPageFetcher, HttpImageFetcher>;

#[derive(Parser)]
#[command(name = "instapic-bot")]
#[command(about = "Telegram bot that replies with Instagram profile pictures", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Bot token (overrides config and environment)
    #[arg(short, long)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Look up one handle and save its profile picture
    Lookup {
        handle: String,
        /// Where to write the image, defaults to <handle>.jpg
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Run => with_runtime(run_bot(load_config(&cli.config, cli.token))),
        Commands::Lookup { handle, output } => {
            with_runtime(lookup(load_config(&cli.config, cli.token), handle, output))
        }
        Commands::Version => {
            println!("instapic-bot v{}", env!("CARGO_PKG_VERSION"));
            0
        }
        Commands::InitConfig => init_config(),
    };

    std::process::exit(code);
}

fn with_runtime<F: std::future::Future<Output = i32>>(future: F) -> i32 {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt.block_on(future),
        Err(e) => {
            tracing::error!("Failed to start runtime: {}", e);
            1
        }
    }
}

fn load_config(config_path: &str, token_override: Option<String>) -> Result<Config, String> {
    let mut config = if std::path::Path::new(config_path).exists() {
        Config::load(config_path).map_err(|e| e.to_string())?
    } else {
        tracing::debug!("No config file at {}, using defaults", config_path);
        Config::default()
    };

    config.apply_env().map_err(|e| e.to_string())?;

    if let Some(token) = token_override {
        config.telegram.token = Some(token);
    }

    if config.bot.environment.is_none() {
        tracing::warn!("Environment not set (BOT_ENV), defaulting to {}", Environment::Development);
    }

    Ok(config)
}

fn build_profiles(config: &Config) -> Result<Profiles, String> {
    let scraper = &config.scraper;
    let challenge = ChallengeClient::new(&scraper.user_agent, scraper.challenge_delay())
        .map_err(|e| format!("Failed to build HTTP client: {}", e))?;
    let images = reqwest::Client::builder()
        .user_agent(scraper.user_agent.as_str())
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

    Ok(ProfileService::new(
        HttpPageFetcher::new(challenge, scraper.profile_base_url.as_str()),
        HttpImageFetcher::new(images),
        MetadataExtractor::new(),
    ))
}

async fn run_bot(config: Result<Config, String>) -> i32 {
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load config: {}", e);
            return 1;
        }
    };

    let token = match config.validate() {
        Ok(token) => token.to_string(),
        Err(e) => {
            tracing::error!("Invalid config: {}", e);
            return 1;
        }
    };

    tracing::info!("Starting {} ({})", config.bot.name, config.environment());

    let profiles = match build_profiles(&config) {
        Ok(profiles) => profiles,
        Err(e) => {
            tracing::error!("{}", e);
            return 1;
        }
    };

    let mut commands = CommandService::new("/");
    commands.register_defaults();
    let parser = MessageParser::new(commands.prefix());
    let dispatcher = MessageDispatcher::new(commands, profiles);

    let mut adapter = TelegramAdapter::new(token);
    if let Err(e) = adapter.start().await {
        tracing::error!("Failed to start bot: {}", e);
        return 1;
    }
    let adapter = Arc::new(adapter);

    let mut source: Box<dyn UpdateSource> = match config.environment() {
        Environment::Development => Box::new(PollingUpdateSource::new(
            Arc::clone(&adapter),
            parser,
            config.telegram.poll_timeout_seconds,
        )),
        Environment::Production => {
            // validate() guarantees both are present here
            let port = config.webhook.port.unwrap_or_default();
            let public_url = config.webhook.public_url.clone().unwrap_or_default();
            Box::new(WebhookUpdateSource::new(Arc::clone(&adapter), parser, port, public_url))
        }
    };

    let runner = BotRunner::new(adapter, dispatcher);

    tokio::select! {
        result = runner.run(source.as_mut()) => match result {
            Ok(()) => 0,
            Err(e) => {
                tracing::error!("Bot stopped: {}", e);
                1
            }
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down");
            0
        }
    }
}

async fn lookup(config: Result<Config, String>, handle: String, output: Option<PathBuf>) -> i32 {
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load config: {}", e);
            return 1;
        }
    };

    let profiles = match build_profiles(&config) {
        Ok(profiles) => profiles,
        Err(e) => {
            tracing::error!("{}", e);
            return 1;
        }
    };

    let resolved = match profiles.resolve_profile_image(&handle).await {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::error!("Lookup failed: {}", e);
            println!("{}", e.user_reply());
            return 1;
        }
    };

    let path = output.unwrap_or_else(|| PathBuf::from(format!("{}.jpg", resolved.summary.handle)));
    if let Err(e) = std::fs::write(&path, &resolved.image) {
        tracing::error!("Failed to write {}: {}", path.display(), e);
        return 1;
    }

    println!("{}", resolved.summary);
    println!("{}", resolved.summary.image_url);
    println!("Saved {} bytes to {}", resolved.image.len(), path.display());
    0
}

fn init_config() -> i32 {
    match serde_yaml::to_string(&Config::default()) {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to config.yaml and adjust as needed.");
            0
        }
        Err(e) => {
            tracing::error!("Failed to render config: {}", e);
            1
        }
    }
}
