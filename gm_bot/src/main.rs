//! Twitch chat bot that moderates a guessing game.
//!
//! The bot joins one channel, spawns a moderator actor for the game session
//! and relays chat between the two.

use std::path::PathBuf;

use anyhow::{Context, Error};
use ctrlc::set_handler;
use gm_bot::{
    config::{self, BotConfig},
    console::{ConsoleSink, ConsoleSource},
    irc::{self, IrcSettings},
    logging::{self, LogTarget},
    service::{BotService, ServiceSettings},
};
use guess_moderator::ModeratorActor;
use pico_args::Arguments;
use tokio::sync::{mpsc, watch};

const OUTBOX_CAPACITY: usize = 64;

const HELP: &str = "\
Moderate a chat guessing game on Twitch

USAGE:
  gm_bot [OPTIONS]

OPTIONS:
  --config     PATH        Bot configuration file  [default: config/config.yaml]
  --token      PATH        Chat token file  [default: config/token.yaml]
  --log-dir    DIR         Log file directory when not on a terminal  [default: .]

FLAGS:
  --console                Read chat from stdin instead of connecting to Twitch
  --write-default-config   Write a default configuration to --config and exit
  -h, --help               Print help information

ENVIRONMENT:
  GM_TOKEN                 Chat token, overrides the token file
  GM_NICK                  Login nick  [default: guessbot]
  RUST_LOG                 Log filter, e.g. debug or gm_bot=trace
  (Variables may also come from a .env file)
";

struct Args {
    config: PathBuf,
    token: PathBuf,
    log_dir: PathBuf,
    console: bool,
    write_default_config: bool,
}

fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        config: pargs
            .value_from_str("--config")
            .unwrap_or_else(|_| PathBuf::from("config/config.yaml")),
        token: pargs
            .value_from_str("--token")
            .unwrap_or_else(|_| PathBuf::from("config/token.yaml")),
        log_dir: pargs
            .value_from_str("--log-dir")
            .unwrap_or_else(|_| PathBuf::from(".")),
        console: pargs.contains("--console"),
        write_default_config: pargs.contains("--write-default-config"),
    };

    if args.write_default_config {
        BotConfig::write_default(&args.config)?;
        println!("Wrote default configuration to {}", args.config.display());
        return Ok(());
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to start Tokio runtime")?;
    let result = runtime.block_on(run(args));
    // A pending console read holds a blocking thread until the next line
    runtime.shutdown_background();
    result
}

async fn run(args: Args) -> Result<(), Error> {
    let bot_config = BotConfig::load(&args.config)?;
    bot_config.validate(!args.console)?;

    logging::init(&LogTarget::detect(&args.log_dir)).context("Failed to open log file")?;
    tracing::info!("Loaded configuration from {}", args.config.display());

    // Catching signals for exit.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    set_handler(move || {
        let _ = shutdown_tx.send(true);
    })?;

    let (outbox, outbox_rx) = mpsc::channel(OUTBOX_CAPACITY);
    let (actor, handle) = ModeratorActor::new(bot_config.moderator_config(), outbox);
    let moderator = tokio::spawn(actor.run());

    let service = BotService::new(ServiceSettings::from(&bot_config), handle.clone(), outbox_rx);

    let result = if args.console {
        tracing::info!("Using console chat, lines are `name: text` or `@name: text`");
        service
            .run(ConsoleSource::stdin(), ConsoleSink::stdout(), shutdown_rx)
            .await
    } else {
        let settings = IrcSettings {
            addr: irc::TWITCH_IRC_ADDR.to_string(),
            nick: config::nick_from_env(),
            token: config::resolve_token(&args.token)?,
            channel: bot_config.channel(),
        };
        let (source, sink) = irc::connect(&settings).await?;
        service.run(source, sink, shutdown_rx).await
    };

    let _ = handle.shutdown().await;
    moderator.await.context("Moderator task panicked")?;
    tracing::info!("Bot stopped");

    result
}
