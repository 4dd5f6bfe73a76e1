//! Axum HTTP server for proof verification
//!
//! The verification key is loaded once and shared read-only. Each proof is
//! verified on the blocking pool so pairing work never stalls the runtime.

use crate::error::{Result, ServiceError};
use crate::logging::{generate_correlation_id, log_batch_event, log_verification_event};
use crate::types::{
    BatchVerifyRequest, BatchVerifyResponse, HealthResponse, KeyHashResponse, VerifyRequest,
    VerifyResponse,
};
use axum::{
    extract::State,
    http::{header, Method},
    routing::{get, post},
    Json, Router,
};
use plonk_verifier::{VerificationKey, VerifierError};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
pub struct AppState {
    pub vk: Arc<VerificationKey>,
    /// Hex keccak256 of the serialized key
    pub vk_hash: String,
    pub max_batch_size: usize,
    /// Allowed CORS origins; empty means no CORS layer
    pub cors_origins: Vec<String>,
}

impl AppState {
    pub fn new(vk: VerificationKey, max_batch_size: usize) -> Self {
        let vk_hash = hex::encode(vk.hash());
        Self {
            vk: Arc::new(vk),
            vk_hash,
            max_batch_size,
            cors_origins: Vec::new(),
        }
    }

    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }
}

/// Create the router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = (!state.cors_origins.is_empty()).then(|| {
        CorsLayer::new()
            .allow_origin(
                state
                    .cors_origins
                    .iter()
                    .filter_map(|o| o.parse().ok())
                    .collect::<Vec<_>>(),
            )
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            .max_age(std::time::Duration::from_secs(3600))
    });

    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/vk-hash", get(vk_hash_handler))
        .route("/verify", post(verify_handler))
        .route("/verify/batch", post(batch_verify_handler))
        .with_state(state);

    let router = match cors {
        Some(cors) => router.layer(cors),
        None => router,
    };
    router.layer(TraceLayer::new_for_http())
}

/// Verify one request against `vk`.
///
/// A proof the verifier rejects yields `valid: false`. Malformed input and
/// host failures are errors.
pub fn check_proof(
    vk: &VerificationKey,
    vk_hash: &str,
    request: &VerifyRequest,
    correlation_id: &str,
) -> Result<VerifyResponse> {
    let start = Instant::now();
    let words = request.to_words()?;
    let result = plonk_verifier::verify(
        vk,
        &words.public_inputs,
        &words.proof,
        &words.recursive_aggregation_input,
    );

    let (code, reason) = match result {
        Ok(true) => (None, None),
        Ok(false) => (
            Some("PAIRING_MISMATCH".to_string()),
            Some("pairing check failed".to_string()),
        ),
        Err(e @ VerifierError::MalformedProof(_)) => return Err(e.into()),
        Err(e) if e.is_proof_rejection() => (Some(e.code().to_string()), Some(e.to_string())),
        Err(e) => return Err(e.into()),
    };

    let valid = code.is_none();
    let duration_ms = start.elapsed().as_millis() as u64;
    log_verification_event(correlation_id, vk_hash, valid, reason.as_deref(), duration_ms);

    Ok(VerifyResponse {
        valid,
        code,
        reason,
        request_id: correlation_id.to_string(),
        vk_hash: vk_hash.to_string(),
        duration_ms,
    })
}

/// Like [`check_proof`], but unusable input becomes a rejected entry
fn check_batch_entry(
    vk: &VerificationKey,
    vk_hash: &str,
    request: &VerifyRequest,
    correlation_id: &str,
) -> Result<VerifyResponse> {
    match check_proof(vk, vk_hash, request, correlation_id) {
        Err(e) if e.is_client_error() => {
            log_verification_event(correlation_id, vk_hash, false, Some(&e.to_string()), 0);
            Ok(VerifyResponse {
                valid: false,
                code: Some(e.error_code().to_string()),
                reason: Some(e.to_string()),
                request_id: correlation_id.to_string(),
                vk_hash: vk_hash.to_string(),
                duration_ms: 0,
            })
        }
        other => other,
    }
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ready".to_string(),
        vk_hash: state.vk_hash.clone(),
        max_batch_size: state.max_batch_size,
    })
}

/// Verification key hash endpoint
async fn vk_hash_handler(State(state): State<Arc<AppState>>) -> Json<KeyHashResponse> {
    Json(KeyHashResponse {
        vk_hash: state.vk_hash.clone(),
        recursive: state.vk.recursive,
    })
}

/// Verify a single proof
async fn verify_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>> {
    let correlation_id = request
        .request_id
        .clone()
        .unwrap_or_else(generate_correlation_id);
    let vk = Arc::clone(&state.vk);
    let vk_hash = state.vk_hash.clone();

    let response = tokio::task::spawn_blocking(move || {
        check_proof(&vk, &vk_hash, &request, &correlation_id)
    })
    .await
    .map_err(|e| ServiceError::internal(format!("verification task failed: {}", e)))??;

    Ok(Json(response))
}

/// Verify independent proofs concurrently
async fn batch_verify_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BatchVerifyRequest>,
) -> Result<Json<BatchVerifyResponse>> {
    let total = request.proofs.len();
    if total == 0 {
        return Err(ServiceError::EmptyBatch);
    }
    if total > state.max_batch_size {
        return Err(ServiceError::BatchTooLarge(total, state.max_batch_size));
    }

    let batch_id = generate_correlation_id();
    let start = Instant::now();

    let handles: Vec<_> = request
        .proofs
        .into_iter()
        .enumerate()
        .map(|(index, proof)| {
            let vk = Arc::clone(&state.vk);
            let vk_hash = state.vk_hash.clone();
            let correlation_id = proof
                .request_id
                .clone()
                .unwrap_or_else(|| format!("{}-{}", batch_id, index));
            tokio::task::spawn_blocking(move || {
                check_batch_entry(&vk, &vk_hash, &proof, &correlation_id)
            })
        })
        .collect();

    let mut results = Vec::with_capacity(total);
    for handle in handles {
        let entry = handle
            .await
            .map_err(|e| ServiceError::internal(format!("verification task failed: {}", e)))??;
        results.push(entry);
    }

    let accepted = results.iter().filter(|r| r.valid).count();
    log_batch_event(&batch_id, total, accepted, start.elapsed().as_millis() as u64);

    Ok(Json(BatchVerifyResponse {
        all_valid: accepted == total,
        results,
    }))
}
