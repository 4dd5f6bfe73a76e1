//! PLONK proof verification service
//!
//! Hosts the `plonk_verifier` core off-chain for settlement-side checks:
//! loads one verification key, then verifies proofs over HTTP or from the CLI.
//!
//! # Usage
//!
//! ## Start the server
//! ```bash
//! verifier-server serve --config config/verifier.toml
//! ```
//!
//! ## Verify a proof file
//! ```bash
//! verifier-server verify --key keys/rollup.toml --proof proof.json
//! ```

pub mod config;
pub mod error;
pub mod key_file;
pub mod logging;
pub mod server;
pub mod types;

pub use config::{ConfigError, ServerConfig};
pub use error::ServiceError;
pub use key_file::{load_verification_key, save_verification_key, KeyFile, KeyFileError};
pub use server::{check_proof, create_router, AppState};
pub use types::*;
