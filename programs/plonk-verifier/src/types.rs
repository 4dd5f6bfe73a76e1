//! Verification key and proof types

use crate::bn254::{G1Point, G2Point, Word, G1_POINT_SIZE, G2_POINT_SIZE};
use crate::constants::{G2_GENERATOR, G2_SETUP_X, VK_G1_POINTS, VK_SIZE};
use crate::error::VerifierError;
use crate::field::Fr;
use solana_nostd_keccak::hashv;

/// Circuit-specific verification key.
///
/// Immutable once loaded. The G2 pair defaults to the universal setup; it is
/// carried in the key so a deployment can pin the setup it was built against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationKey {
    /// Main gate selectors q0..q7
    pub gate_setup: [G1Point; 8],
    /// Main gate and Rescue custom gate on/off selectors
    pub gate_selectors: [G1Point; 2],
    /// Copy-permutation sigma polynomials
    pub permutation: [G1Point; 4],
    pub lookup_selector: G1Point,
    /// Lookup table columns
    pub lookup_table: [G1Point; 4],
    pub lookup_table_type: G1Point,
    /// Whether proofs for this circuit carry a recursive aggregation input
    pub recursive: bool,
    /// [1]_2
    pub g2_generator: G2Point,
    /// [x]_2
    pub g2_x: G2Point,
}

impl VerificationKey {
    /// Build a key against the universal trusted setup
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        gate_setup: [G1Point; 8],
        gate_selectors: [G1Point; 2],
        permutation: [G1Point; 4],
        lookup_selector: G1Point,
        lookup_table: [G1Point; 4],
        lookup_table_type: G1Point,
        recursive: bool,
    ) -> Self {
        Self {
            gate_setup,
            gate_selectors,
            permutation,
            lookup_selector,
            lookup_table,
            lookup_table_type,
            recursive,
            g2_generator: G2_GENERATOR,
            g2_x: G2_SETUP_X,
        }
    }

    /// All commitments in serialization order
    pub fn commitments(&self) -> [G1Point; VK_G1_POINTS] {
        let mut out = [G1Point::IDENTITY; VK_G1_POINTS];
        out[..8].copy_from_slice(&self.gate_setup);
        out[8..10].copy_from_slice(&self.gate_selectors);
        out[10..14].copy_from_slice(&self.permutation);
        out[14] = self.lookup_selector;
        out[15..19].copy_from_slice(&self.lookup_table);
        out[19] = self.lookup_table_type;
        out
    }

    /// Parse verification key from bytes
    ///
    /// Format: 20 x G1 (x, y) || recursion flag word || [1]_2 || [x]_2
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, VerifierError> {
        if bytes.len() < VK_SIZE {
            return Err(VerifierError::InvalidVerificationKey);
        }

        let mut points = [G1Point::IDENTITY; VK_G1_POINTS];
        for (i, point) in points.iter_mut().enumerate() {
            let offset = i * G1_POINT_SIZE;
            *point = G1Point::from_bytes(&bytes[offset..offset + G1_POINT_SIZE])
                .map_err(|_| VerifierError::InvalidVerificationKey)?;
        }

        let flag_offset = VK_G1_POINTS * G1_POINT_SIZE;
        let flag = &bytes[flag_offset..flag_offset + 32];
        let recursive = match (flag[..31].iter().all(|&b| b == 0), flag[31]) {
            (true, 0) => false,
            (true, 1) => true,
            _ => return Err(VerifierError::InvalidVerificationKey),
        };

        let g2_offset = flag_offset + 32;
        let g2_generator = G2Point::from_bytes(&bytes[g2_offset..g2_offset + G2_POINT_SIZE])?;
        let g2_x = G2Point::from_bytes(&bytes[g2_offset + G2_POINT_SIZE..VK_SIZE])?;
        if g2_generator.is_identity() || g2_x.is_identity() {
            return Err(VerifierError::InvalidVerificationKey);
        }

        let mut gate_setup = [G1Point::IDENTITY; 8];
        gate_setup.copy_from_slice(&points[..8]);
        let mut permutation = [G1Point::IDENTITY; 4];
        permutation.copy_from_slice(&points[10..14]);
        let mut lookup_table = [G1Point::IDENTITY; 4];
        lookup_table.copy_from_slice(&points[15..19]);

        Ok(Self {
            gate_setup,
            gate_selectors: [points[8], points[9]],
            permutation,
            lookup_selector: points[14],
            lookup_table,
            lookup_table_type: points[19],
            recursive,
            g2_generator,
            g2_x,
        })
    }

    /// Serialize in the layout accepted by [`VerificationKey::from_bytes`]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(VK_SIZE);
        for point in self.commitments().iter() {
            out.extend_from_slice(&point.to_bytes());
        }
        let mut flag = [0u8; 32];
        flag[31] = self.recursive as u8;
        out.extend_from_slice(&flag);
        out.extend_from_slice(&self.g2_generator.to_bytes());
        out.extend_from_slice(&self.g2_x.to_bytes());
        out
    }

    /// keccak256 of the serialized key, for out-of-band integrity checks
    pub fn hash(&self) -> [u8; 32] {
        hashv(&[&self.to_bytes()])
    }
}

/// Commitments sent by the prover before the evaluation point is known
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Commitments {
    /// State polynomials a, b, c, d
    pub wires: [G1Point; 4],
    /// Copy-permutation grand product
    pub permutation_product: G1Point,
    /// Lookup sorted (s) polynomial
    pub lookup_sorted: G1Point,
    /// Lookup grand product
    pub lookup_product: G1Point,
    /// Quotient polynomial split in four parts
    pub quotient: [G1Point; 4],
}

/// Openings at z and z*omega
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Evaluations {
    /// a(z), b(z), c(z), d(z)
    pub wires: [Fr; 4],
    /// d(z*omega)
    pub wire_d_shifted: Fr,
    /// Main gate selector at z
    pub main_gate_selector: Fr,
    /// sigma_0(z), sigma_1(z), sigma_2(z)
    pub sigmas: [Fr; 3],
    /// Copy-permutation grand product at z*omega
    pub permutation_product_shifted: Fr,
    /// Aggregated lookup table t(z)
    pub lookup_table: Fr,
    pub lookup_selector: Fr,
    pub lookup_table_type: Fr,
    /// Quotient polynomial t(z)
    pub quotient: Fr,
    /// s(z*omega)
    pub lookup_sorted_shifted: Fr,
    /// Lookup grand product at z*omega
    pub lookup_product_shifted: Fr,
    /// Aggregated lookup table at z*omega
    pub lookup_table_shifted: Fr,
    /// Linearisation polynomial r(z)
    pub linearisation: Fr,
}

/// Pairing operands of a previously verified proof folded into this one
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecursiveInput {
    pub p1: G1Point,
    pub p2: G1Point,
}

/// A fully decoded proof
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Proof {
    pub public_input: Fr,
    pub commitments: Commitments,
    pub evaluations: Evaluations,
    /// KZG opening proof at z
    pub opening_at_z: G1Point,
    /// KZG opening proof at z*omega
    pub opening_at_z_omega: G1Point,
    pub recursive: Option<RecursiveInput>,
}

/// The three raw word arrays of a verification request
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProofWords {
    pub public_inputs: Vec<Word>,
    pub proof: Vec<Word>,
    pub recursive_aggregation_input: Vec<Word>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_key() -> VerificationKey {
        let g = G1Point::GENERATOR;
        let neg = g.negate().unwrap();
        VerificationKey::new([g; 8], [neg, g], [g; 4], neg, [g, neg, g, neg], g, true)
    }

    #[test]
    fn test_vk_bytes_layout() {
        let vk = sample_key();
        let bytes = vk.to_bytes();
        assert_eq!(bytes.len(), VK_SIZE);
        assert_eq!(VerificationKey::from_bytes(&bytes).unwrap(), vk);
    }

    #[test]
    fn test_vk_rejects_bad_flag_and_short_input() {
        let mut bytes = sample_key().to_bytes();
        assert_eq!(
            VerificationKey::from_bytes(&bytes[..VK_SIZE - 1]),
            Err(VerifierError::InvalidVerificationKey)
        );
        bytes[20 * 64 + 31] = 2;
        assert_eq!(
            VerificationKey::from_bytes(&bytes),
            Err(VerifierError::InvalidVerificationKey)
        );
    }

    #[test]
    fn test_vk_rejects_off_curve_commitment() {
        let mut bytes = sample_key().to_bytes();
        bytes[63] ^= 1;
        assert_eq!(
            VerificationKey::from_bytes(&bytes),
            Err(VerifierError::InvalidVerificationKey)
        );
    }

    #[test]
    fn test_vk_rejects_unreduced_coordinate() {
        use crate::field::{FieldParams, FqParams, U256};

        // generator x = 1 written as q + 1
        let mut bytes = sample_key().to_bytes();
        let q_plus_1 = FqParams::MODULUS.overflowing_add(&U256::ONE).0;
        bytes[..32].copy_from_slice(&q_plus_1.to_be_bytes());
        assert_eq!(
            VerificationKey::from_bytes(&bytes),
            Err(VerifierError::InvalidVerificationKey)
        );
    }

    #[test]
    fn test_vk_hash_changes_with_content() {
        let vk = sample_key();
        let mut other = vk.clone();
        other.recursive = false;
        assert_eq!(vk.hash(), sample_key().hash());
        assert_ne!(vk.hash(), other.hash());
    }
}
