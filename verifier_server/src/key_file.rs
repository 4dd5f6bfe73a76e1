//! Verification key files
//!
//! Two formats are accepted:
//! - `.bin`: the raw byte layout stored in the on-chain key account
//! - anything else: TOML with one `[x, y]` pair of hex words per commitment
//!
//! ```toml
//! recursive = true
//! gate_setup = [["0x..", "0x.."], ...]      # 8 points
//! gate_selectors = [["0x..", "0x.."], ...]  # 2 points
//! permutation = [...]                       # 4 points
//! lookup_selector = ["0x..", "0x.."]
//! lookup_table = [...]                      # 4 points
//! lookup_table_type = ["0x..", "0x.."]
//!
//! [g2]                                      # optional, defaults to the universal setup
//! generator = ["x.c1", "x.c0", "y.c1", "y.c0"]
//! x = ["x.c1", "x.c0", "y.c1", "y.c0"]
//! ```

use crate::types::{format_word, parse_word};
use plonk_verifier::bn254::{G1Point, G2Point};
use plonk_verifier::{VerificationKey, VerifierError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Key file errors
#[derive(Debug, Error)]
pub enum KeyFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse key file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to write key file: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid word in {field}: {reason}")]
    InvalidWord { field: &'static str, reason: String },

    #[error("{field} needs {expected} points, found {found}")]
    PointCount {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("invalid point in {0}")]
    InvalidPoint(&'static str),

    #[error("invalid verification key: {0}")]
    Key(#[from] VerifierError),
}

/// Hex words of the two setup points in G2
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct G2Section {
    pub generator: [String; 4],
    pub x: [String; 4],
}

/// TOML form of a verification key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyFile {
    pub recursive: bool,
    pub gate_setup: Vec<[String; 2]>,
    pub gate_selectors: Vec<[String; 2]>,
    pub permutation: Vec<[String; 2]>,
    pub lookup_selector: [String; 2],
    pub lookup_table: Vec<[String; 2]>,
    pub lookup_table_type: [String; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub g2: Option<G2Section>,
}

fn word(field: &'static str, s: &str) -> Result<[u8; 32], KeyFileError> {
    parse_word(s).map_err(|reason| KeyFileError::InvalidWord { field, reason })
}

fn point(field: &'static str, pair: &[String; 2]) -> Result<G1Point, KeyFileError> {
    let mut bytes = [0u8; 64];
    bytes[..32].copy_from_slice(&word(field, &pair[0])?);
    bytes[32..].copy_from_slice(&word(field, &pair[1])?);
    G1Point::from_bytes(&bytes).map_err(|_| KeyFileError::InvalidPoint(field))
}

fn points<const N: usize>(
    field: &'static str,
    pairs: &[[String; 2]],
) -> Result<[G1Point; N], KeyFileError> {
    if pairs.len() != N {
        return Err(KeyFileError::PointCount {
            field,
            expected: N,
            found: pairs.len(),
        });
    }
    let mut out = [G1Point::IDENTITY; N];
    for (slot, pair) in out.iter_mut().zip(pairs) {
        *slot = point(field, pair)?;
    }
    Ok(out)
}

fn g2_point(field: &'static str, words: &[String; 4]) -> Result<G2Point, KeyFileError> {
    let mut bytes = [0u8; 128];
    for (chunk, s) in bytes.chunks_exact_mut(32).zip(words) {
        chunk.copy_from_slice(&word(field, s)?);
    }
    let p = G2Point::from_bytes(&bytes)?;
    if p.is_identity() {
        return Err(KeyFileError::InvalidPoint(field));
    }
    Ok(p)
}

fn pair(p: &G1Point) -> [String; 2] {
    let [x, y] = p.to_words();
    [format_word(&x), format_word(&y)]
}

fn g2_words(p: &G2Point) -> [String; 4] {
    let bytes = p.to_bytes();
    let mut out: [String; 4] = Default::default();
    for (s, chunk) in out.iter_mut().zip(bytes.chunks_exact(32)) {
        *s = format!("0x{}", hex::encode(chunk));
    }
    out
}

impl KeyFile {
    pub fn from_toml_str(s: &str) -> Result<Self, KeyFileError> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> Result<String, KeyFileError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate every point and build the key
    pub fn to_verification_key(&self) -> Result<VerificationKey, KeyFileError> {
        let mut vk = VerificationKey::new(
            points("gate_setup", &self.gate_setup)?,
            points("gate_selectors", &self.gate_selectors)?,
            points("permutation", &self.permutation)?,
            point("lookup_selector", &self.lookup_selector)?,
            points("lookup_table", &self.lookup_table)?,
            point("lookup_table_type", &self.lookup_table_type)?,
            self.recursive,
        );
        if let Some(g2) = &self.g2 {
            vk.g2_generator = g2_point("g2.generator", &g2.generator)?;
            vk.g2_x = g2_point("g2.x", &g2.x)?;
        }
        Ok(vk)
    }

    pub fn from_verification_key(vk: &VerificationKey) -> Self {
        let defaults = VerificationKey::new(
            vk.gate_setup,
            vk.gate_selectors,
            vk.permutation,
            vk.lookup_selector,
            vk.lookup_table,
            vk.lookup_table_type,
            vk.recursive,
        );
        let g2 = (vk.g2_generator != defaults.g2_generator || vk.g2_x != defaults.g2_x).then(|| {
            G2Section {
                generator: g2_words(&vk.g2_generator),
                x: g2_words(&vk.g2_x),
            }
        });

        Self {
            recursive: vk.recursive,
            gate_setup: vk.gate_setup.iter().map(pair).collect(),
            gate_selectors: vk.gate_selectors.iter().map(pair).collect(),
            permutation: vk.permutation.iter().map(pair).collect(),
            lookup_selector: pair(&vk.lookup_selector),
            lookup_table: vk.lookup_table.iter().map(pair).collect(),
            lookup_table_type: pair(&vk.lookup_table_type),
            g2,
        }
    }
}

/// Load a verification key, choosing the format from the extension
pub fn load_verification_key(path: &Path) -> Result<VerificationKey, KeyFileError> {
    if path.extension().is_some_and(|ext| ext == "bin") {
        let bytes = std::fs::read(path)?;
        return Ok(VerificationKey::from_bytes(&bytes)?);
    }
    let contents = std::fs::read_to_string(path)?;
    KeyFile::from_toml_str(&contents)?.to_verification_key()
}

/// Write a verification key in the format implied by the extension
pub fn save_verification_key(path: &Path, vk: &VerificationKey) -> Result<(), KeyFileError> {
    if path.extension().is_some_and(|ext| ext == "bin") {
        std::fs::write(path, vk.to_bytes())?;
    } else {
        std::fs::write(path, KeyFile::from_verification_key(vk).to_toml_string()?)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use plonk_verifier::fixtures::Fixture;

    #[test]
    fn test_key_file_preserves_key() {
        let vk = Fixture::recursive(51).vk;
        let file = KeyFile::from_verification_key(&vk);
        // toy setup differs from the universal one
        assert!(file.g2.is_some());

        let text = file.to_toml_string().unwrap();
        let parsed = KeyFile::from_toml_str(&text).unwrap();
        assert_eq!(parsed.to_verification_key().unwrap(), vk);
    }

    #[test]
    fn test_default_setup_omits_g2() {
        let g = G1Point::GENERATOR;
        let vk = VerificationKey::new([g; 8], [g; 2], [g; 4], g, [g; 4], g, false);
        let file = KeyFile::from_verification_key(&vk);
        assert!(file.g2.is_none());
        assert!(!file.to_toml_string().unwrap().contains("[g2]"));
    }

    #[test]
    fn test_wrong_point_count() {
        let vk = Fixture::non_recursive(52).vk;
        let mut file = KeyFile::from_verification_key(&vk);
        file.permutation.pop();
        assert!(matches!(
            file.to_verification_key(),
            Err(KeyFileError::PointCount {
                field: "permutation",
                expected: 4,
                found: 3
            })
        ));
    }

    #[test]
    fn test_off_curve_point_rejected() {
        let vk = Fixture::non_recursive(53).vk;
        let mut file = KeyFile::from_verification_key(&vk);
        file.lookup_selector[1] = "0x05".to_string();
        assert!(matches!(
            file.to_verification_key(),
            Err(KeyFileError::InvalidPoint("lookup_selector"))
        ));

        let mut file = KeyFile::from_verification_key(&vk);
        file.gate_setup[3][0] = "0xnope".to_string();
        assert!(matches!(
            file.to_verification_key(),
            Err(KeyFileError::InvalidWord { field: "gate_setup", .. })
        ));
    }

    #[test]
    fn test_unreduced_coordinate_rejected() {
        let g = G1Point::GENERATOR;
        let vk = VerificationKey::new([g; 8], [g; 2], [g; 4], g, [g; 4], g, false);
        let mut file = KeyFile::from_verification_key(&vk);
        // q + 1, which reduces to the generator's x
        file.lookup_table_type[0] =
            "0x30644e72e131a029b85045b68181585d97816a916871ca8d3c208c16d87cfd48".to_string();
        assert!(matches!(
            file.to_verification_key(),
            Err(KeyFileError::InvalidPoint("lookup_table_type"))
        ));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let vk = Fixture::non_recursive(54).vk;
        let text = KeyFile::from_verification_key(&vk).to_toml_string().unwrap();
        let text = format!("extra = 1\n{}", text);
        assert!(matches!(KeyFile::from_toml_str(&text), Err(KeyFileError::Parse(_))));
    }
}
