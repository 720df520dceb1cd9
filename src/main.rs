#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use broadside::{
    init_logging, local_match, serve_tcp, BotOutcome, RandomBot, Server, ServerConfig,
    TcpTransport,
};

#[cfg(feature = "std")]
use clap::{Parser, Subcommand};
#[cfg(feature = "std")]
use log::{error, info, LevelFilter};
#[cfg(feature = "std")]
use rand::rngs::SmallRng;
#[cfg(feature = "std")]
use rand::SeedableRng;
#[cfg(feature = "std")]
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    /// Log level (error, warn, info, debug, trace); overrides BROADSIDE_LOG.
    #[arg(long, global = true)]
    log_level: Option<LevelFilter>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
#[cfg(feature = "std")]
enum Commands {
    /// Accept players over TCP and pair them as they arrive.
    Serve {
        #[arg(long, default_value = "0.0.0.0:3000")]
        bind: String,
        #[arg(long, default_value_t = broadside::transport::tcp::DEFAULT_MAX_FRAME_LEN)]
        max_frame_len: usize,
    },
    /// Run two bots against each other on an in-process server.
    Local {
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
    /// Connect a bot to a running server.
    Bot {
        #[arg(long, default_value = "127.0.0.1:3000")]
        connect: String,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
}

#[cfg(feature = "std")]
fn seeded_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => {
            let mut seed_rng = rand::rng();
            SmallRng::from_rng(&mut seed_rng)
        }
    }
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match cli.command {
        Commands::Serve {
            bind,
            max_frame_len,
        } => {
            let config = ServerConfig {
                bind,
                max_frame_len,
            };
            let listener = TcpListener::bind(&config.bind).await?;
            info!("listening on {}", listener.local_addr()?);

            let server = Server::new();
            let handle = server.handle();
            let accept_task = tokio::spawn(async move {
                if let Err(e) = serve_tcp(listener, handle, &config).await {
                    error!("accept loop failed: {}", e);
                }
            });

            server
                .run_until(async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .await;
            accept_task.abort();
        }
        Commands::Local { seed } => {
            let seed1 = seed.unwrap_or_else(rand::random);
            let seed2 = seed1.wrapping_add(1);
            println!("Starting local bot vs bot game (seeds {}, {})...", seed1, seed2);
            let report = local_match(seed1, seed2).await?;
            println!(
                "Bot 1: {:?} after {} attacks",
                report.first.0, report.first.1
            );
            println!(
                "Bot 2: {:?} after {} attacks",
                report.second.0, report.second.1
            );
            match report.winner() {
                Some(n) => println!("Bot {} wins!", n),
                None => println!("No winner."),
            }
        }
        Commands::Bot { connect, seed } => {
            println!("Connecting to server at {}...", connect);
            let transport = TcpTransport::connect(&connect).await?;
            let mut rng = seeded_rng(seed);
            let mut bot = RandomBot::new(transport);
            let outcome = bot.run(&mut rng).await?;
            match outcome {
                BotOutcome::Won => println!("Victory after {} attacks.", bot.attacks()),
                BotOutcome::Lost => println!("Defeat after {} attacks.", bot.attacks()),
                BotOutcome::OpponentLeft => println!("Opponent disconnected."),
            }
        }
    }
    Ok(())
}
