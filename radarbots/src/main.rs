//! Radar Bot Directory CLI - post bot stats and query listing, widget, and votes from the terminal.

mod output;

use clap::{Parser, Subcommand, ValueEnum};
use radarbots_lib::{format_epoch_display, last_voted_timestamp, Client, StaticIdentity};
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "radarbots")]
#[command(about = "Radar Bot Directory CLI - post stats and query bot info", long_about = None)]
struct Cli {
    /// Output format: plain (human-readable), json (structured).
    #[arg(short, long, default_value = "plain", value_enum, global = true)]
    output: OutputFormatArg,

    /// API token from the bot's page on the directory.
    #[arg(long, env = "RADARBOTS_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// Bot (application) id the stats belong to.
    #[arg(long, env = "RADARBOTS_BOT_ID", global = true)]
    bot_id: Option<String>,

    /// Override the API base URL.
    #[arg(long, env = "RADARBOTS_API_BASE", global = true)]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormatArg {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Post guild and shard counts
    Stats {
        guilds: u64,
        #[arg(long)]
        shards: Option<u32>,
        /// Keep posting the same counts every 2 minutes until Ctrl-C
        #[arg(long)]
        autopost: bool,
    },
    /// Show the bot's directory listing
    Info,
    /// Fetch the bot's widget image
    Widget {
        /// Write the image here instead of printing a summary
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show when a user last voted for the bot
    LastVoted {
        user_id: String,
        /// Show the timestamp in UTC instead of local time
        #[arg(long)]
        utc: bool,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    if matches!(cli.command, Commands::Version) {
        println!("radarbots {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let client = match build_client(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let format = match cli.output {
        OutputFormatArg::Plain => output::OutputFormat::Plain,
        OutputFormatArg::Json => output::OutputFormat::Json,
    };

    match run(&client, cli.command, format).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn build_client(cli: &Cli) -> Result<Client, String> {
    let token = cli
        .token
        .clone()
        .ok_or("API token not found. Pass --token or set RADARBOTS_TOKEN.")?;
    let bot_id = cli
        .bot_id
        .clone()
        .ok_or("Bot id not found. Pass --bot-id or set RADARBOTS_BOT_ID.")?;
    let mut builder = Client::builder()
        .token(token)
        .identity(StaticIdentity::new(bot_id));
    if let Some(base) = &cli.api_base {
        builder = builder.api_base(base.clone());
    }
    builder.build().map_err(|e| e.to_string())
}

async fn run(client: &Client, cmd: Commands, format: output::OutputFormat) -> Result<(), String> {
    let print_value = |v: &Value| -> Result<(), String> {
        match format {
            output::OutputFormat::Plain => println!("{}", output::format_plain(v)),
            output::OutputFormat::Json => {
                println!("{}", output::format_json(v).map_err(|e| e.to_string())?)
            }
        }
        Ok(())
    };

    match cmd {
        Commands::Stats {
            guilds,
            shards,
            autopost,
        } => {
            if autopost {
                let handle = client
                    .autopost_stats(Some(guilds), shards)
                    .map_err(|e| e.to_string())?;
                eprintln!(
                    "Posting {} guilds / {} shards every {}s. Press Ctrl-C to stop.",
                    handle.payload().guilds,
                    handle.payload().shards,
                    handle.interval().as_secs()
                );
                tokio::signal::ctrl_c().await.map_err(|e| e.to_string())?;
                handle.stop().await;
            } else {
                let res = client
                    .post_stats(Some(guilds), shards)
                    .await
                    .map_err(|e| e.to_string())?;
                print_value(&res)?;
            }
        }
        Commands::Info => {
            let info = client.bot_info().await.map_err(|e| e.to_string())?;
            print_value(&info)?;
        }
        Commands::Widget { out } => {
            let widget = client.bot_widget().await.map_err(|e| e.to_string())?;
            match out {
                Some(path) => {
                    std::fs::write(&path, &widget.data)
                        .map_err(|e| format!("{}: {}", path.display(), e))?;
                    eprintln!("Wrote {} bytes to {}", widget.len(), path.display());
                }
                None => print_value(&serde_json::json!({
                    "bytes": widget.len(),
                    "content_type": widget.content_type,
                }))?,
            }
        }
        Commands::LastVoted { user_id, utc } => {
            let res = client
                .last_voted(&user_id)
                .await
                .map_err(|e| e.to_string())?;
            print_value(&res)?;
            if let (output::OutputFormat::Plain, Some(ts)) = (format, last_voted_timestamp(&res)) {
                println!("voted at: {}", format_epoch_display(ts, utc));
            }
        }
        Commands::Version => {}
    }
    Ok(())
}
