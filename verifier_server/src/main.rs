//! Verifier service CLI

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use verifier_server::logging::{self, log_key_loaded, LogLevel};
use verifier_server::{
    check_proof, create_router, load_verification_key, save_verification_key, AppState,
    ServerConfig, VerifyRequest,
};

#[derive(Parser)]
#[command(name = "verifier-server")]
#[command(about = "PLONK rollup-proof verification service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// TOML config file
        #[arg(short, long, env = "PLONK_VERIFIER_CONFIG")]
        config: Option<PathBuf>,

        /// Bind address (e.g., 0.0.0.0:8080)
        #[arg(short, long)]
        bind: Option<String>,

        /// Verification key file
        #[arg(short, long)]
        key: Option<PathBuf>,

        /// Emit JSON log lines
        #[arg(long)]
        json_logs: bool,
    },

    /// Verify a proof file (JSON with hex word arrays)
    Verify {
        /// Verification key file
        #[arg(short, long, env = "PLONK_VERIFIER_KEY_FILE")]
        key: PathBuf,

        /// Proof file
        #[arg(short, long)]
        proof: PathBuf,
    },

    /// Print the keccak256 hash of a verification key
    KeyHash {
        /// Verification key file
        #[arg(short, long, env = "PLONK_VERIFIER_KEY_FILE")]
        key: PathBuf,
    },

    /// Convert a verification key between TOML and raw `.bin` form
    ExportKey {
        /// Source key file
        #[arg(short, long)]
        key: PathBuf,

        /// Destination (format from extension)
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            bind,
            key,
            json_logs,
        } => {
            let mut config = ServerConfig::load(config.as_deref())?;
            if let Some(bind) = bind {
                config.bind = bind;
            }
            if let Some(key) = key {
                config.key_file = Some(key);
            }
            config.log_json |= json_logs;
            config.validate()?;

            logging::init_from_config(&config)?;
            run_server(config).await?;
        }
        Commands::Verify { key, proof } => {
            logging::init_logging(LogLevel::Warn, false)?;
            verify_file(&key, &proof)?;
        }
        Commands::KeyHash { key } => {
            let vk = load_verification_key(&key)?;
            println!("0x{}", hex::encode(vk.hash()));
        }
        Commands::ExportKey { key, output } => {
            let vk = load_verification_key(&key)?;
            save_verification_key(&output, &vk)?;
            println!("wrote {}", output.display());
        }
    }

    Ok(())
}

/// Run the HTTP server
async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let key_path = config.key_file()?;
    let vk = load_verification_key(key_path)?;

    let state = AppState::new(vk, config.max_batch_size).with_cors_origins(config.cors_origins.clone());
    log_key_loaded(&state.vk_hash, state.vk.recursive, &key_path.display().to_string());

    let app = create_router(Arc::new(state));
    let addr = config.bind_addr()?;

    tracing::info!(max_batch_size = config.max_batch_size, "Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Verify one proof file and exit non-zero on rejection
fn verify_file(key: &Path, proof: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let vk = load_verification_key(key)?;
    let vk_hash = hex::encode(vk.hash());

    let request: VerifyRequest = serde_json::from_str(&std::fs::read_to_string(proof)?)?;
    let id = request
        .request_id
        .clone()
        .unwrap_or_else(|| proof.display().to_string());
    let response = check_proof(&vk, &vk_hash, &request, &id)?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    if !response.valid {
        std::process::exit(1);
    }
    Ok(())
}
