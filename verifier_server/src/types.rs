//! Request and response types for the verifier API

use plonk_verifier::{ProofWords, Word};
use serde::{Deserialize, Serialize};

/// Parse a hex-encoded 256-bit word. Accepts an optional `0x` prefix and
/// fewer than 64 digits (left-padded with zeros).
pub fn parse_word(s: &str) -> Result<Word, String> {
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    if digits.is_empty() {
        return Err("empty word".to_string());
    }
    if digits.len() > 64 {
        return Err(format!("{} hex digits, at most 64 allowed", digits.len()));
    }
    let padded = format!("{:0>64}", digits);
    let mut word = [0u8; 32];
    hex::decode_to_slice(&padded, &mut word).map_err(|e| e.to_string())?;
    Ok(word)
}

/// `0x`-prefixed, 64 hex digits
pub fn format_word(word: &Word) -> String {
    format!("0x{}", hex::encode(word))
}

fn parse_words(field: &'static str, values: &[String]) -> Result<Vec<Word>, crate::ServiceError> {
    values
        .iter()
        .enumerate()
        .map(|(index, v)| {
            parse_word(v).map_err(|reason| crate::ServiceError::InvalidWord { field, index, reason })
        })
        .collect()
}

/// Verify request: the three word arrays of `verify(uint256[],uint256[],uint256[])`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyRequest {
    /// Public inputs (exactly one word)
    pub public_inputs: Vec<String>,
    /// Serialized proof (44 words)
    pub proof: Vec<String>,
    /// Recursive aggregation input (4 words for recursive keys, else empty)
    #[serde(default)]
    pub recursive_aggregation_input: Vec<String>,
    /// Caller-supplied correlation id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl VerifyRequest {
    pub fn to_words(&self) -> Result<ProofWords, crate::ServiceError> {
        Ok(ProofWords {
            public_inputs: parse_words("public_inputs", &self.public_inputs)?,
            proof: parse_words("proof", &self.proof)?,
            recursive_aggregation_input: parse_words(
                "recursive_aggregation_input",
                &self.recursive_aggregation_input,
            )?,
        })
    }

    pub fn from_words(words: &ProofWords) -> Self {
        let fmt = |ws: &[Word]| ws.iter().map(format_word).collect::<Vec<_>>();
        Self {
            public_inputs: fmt(&words.public_inputs),
            proof: fmt(&words.proof),
            recursive_aggregation_input: fmt(&words.recursive_aggregation_input),
            request_id: None,
        }
    }
}

/// Verification outcome for one proof
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    /// Whether the proof was accepted
    pub valid: bool,
    /// Error code when rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Human-readable rejection reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Correlation id used in the logs
    pub request_id: String,
    /// keccak256 of the verification key (hex)
    pub vk_hash: String,
    pub duration_ms: u64,
}

/// Batch verify request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchVerifyRequest {
    pub proofs: Vec<VerifyRequest>,
}

/// Batch verify response, results in request order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchVerifyResponse {
    pub results: Vec<VerifyResponse>,
    pub all_valid: bool,
}

/// Key hash response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyHashResponse {
    /// keccak256 of the serialized verification key (hex)
    pub vk_hash: String,
    /// Whether the key expects a recursive aggregation input
    pub recursive: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    pub vk_hash: String,
    pub max_batch_size: usize,
}

/// Generic error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_word_padding_and_prefix() {
        let w = parse_word("0x01").unwrap();
        assert_eq!(w[31], 1);
        assert!(w[..31].iter().all(|&b| b == 0));

        let odd = parse_word("abc").unwrap();
        assert_eq!(&odd[30..], &[0x0a, 0xbc]);

        assert!(parse_word("").is_err());
        assert!(parse_word("0x").is_err());
        assert!(parse_word(&"f".repeat(65)).is_err());
        assert!(parse_word("zz").is_err());
    }

    #[test]
    fn test_format_word() {
        let mut w = [0u8; 32];
        w[0] = 0xde;
        let s = format_word(&w);
        assert_eq!(s.len(), 66);
        assert!(s.starts_with("0xde00"));
        assert_eq!(parse_word(&s).unwrap(), w);
    }

    #[test]
    fn test_request_defaults_recursive_input() {
        let json = r#"{"public_inputs":["0x05"],"proof":[]}"#;
        let req: VerifyRequest = serde_json::from_str(json).unwrap();
        assert!(req.recursive_aggregation_input.is_empty());
        assert!(req.request_id.is_none());

        let words = req.to_words().unwrap();
        assert_eq!(words.public_inputs[0][31], 5);
    }

    #[test]
    fn test_bad_word_names_position() {
        let req = VerifyRequest {
            public_inputs: vec!["0x01".into()],
            proof: vec!["0x02".into(), "nothex".into()],
            ..Default::default()
        };
        let err = req.to_words().unwrap_err();
        assert!(err.to_string().contains("proof[1]"));
    }

    #[test]
    fn test_error_response() {
        let err = ErrorResponse::new("MALFORMED_PROOF", "proof length is not 44");
        let json: serde_json::Value = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "MALFORMED_PROOF");
        assert_eq!(json["message"], "proof length is not 44");
        assert_eq!(json.as_object().unwrap().len(), 2);
    }
}
