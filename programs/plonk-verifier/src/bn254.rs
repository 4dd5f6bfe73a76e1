//! BN254 curve operations using Solana's alt_bn128 syscalls
//!
//! Points are kept in affine form with typed coordinates so that curve
//! membership can be checked before anything reaches a syscall. Off-chain the
//! same `solana_bn254` entry points fall back to an arkworks implementation.

use crate::error::{MalformedReason, VerifierError};
use crate::field::{Fq, Fr, U256};
use solana_bn254::prelude::{alt_bn128_addition, alt_bn128_multiplication, alt_bn128_pairing};

/// G1 point size in bytes (x, y coordinates)
pub const G1_POINT_SIZE: usize = 64;

/// G2 point size in bytes (x.c1, x.c0, y.c1, y.c0)
pub const G2_POINT_SIZE: usize = 128;

/// A 256-bit big-endian word as it appears on the wire
pub type Word = [u8; 32];

/// Curve constant b in y^2 = x^3 + b
const CURVE_B: Fq = Fq::from_raw(U256::from_u64(3));

/// A G1 affine point. `(0, 0)` encodes the point at infinity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct G1Point {
    pub x: Fq,
    pub y: Fq,
}

impl G1Point {
    pub const IDENTITY: Self = Self { x: Fq::zero(), y: Fq::zero() };

    pub const GENERATOR: Self = Self {
        x: Fq::from_raw(U256::from_u64(1)),
        y: Fq::from_raw(U256::from_u64(2)),
    };

    /// Build a point from two wire words.
    ///
    /// Both words are reduced mod q, then the pair must satisfy the curve
    /// equation. The point at infinity does not, so it is rejected as well.
    pub fn from_words(x: &Word, y: &Word) -> Result<Self, VerifierError> {
        let point = Self {
            x: Fq::from_be_bytes_reduced(x),
            y: Fq::from_be_bytes_reduced(y),
        };
        if !point.is_on_curve() {
            return Err(VerifierError::MalformedProof(MalformedReason::PointNotOnCurve));
        }
        Ok(point)
    }

    /// Parse a stored 64-byte encoding.
    ///
    /// Unlike [`G1Point::from_words`] nothing is reduced: both coordinates
    /// must already be below q, so each point has a single encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, VerifierError> {
        if bytes.len() < G1_POINT_SIZE {
            return Err(VerifierError::InvalidPoint);
        }
        let mut x = [0u8; 32];
        let mut y = [0u8; 32];
        x.copy_from_slice(&bytes[..32]);
        y.copy_from_slice(&bytes[32..64]);
        let point = Self {
            x: Fq::from_canonical(U256::from_be_bytes(&x)).ok_or(VerifierError::InvalidPoint)?,
            y: Fq::from_canonical(U256::from_be_bytes(&y)).ok_or(VerifierError::InvalidPoint)?,
        };
        if !point.is_on_curve() {
            return Err(VerifierError::InvalidPoint);
        }
        Ok(point)
    }

    /// Syscall output is trusted to be canonical and on the curve
    fn from_syscall_output(bytes: &[u8]) -> Result<Self, VerifierError> {
        if bytes.len() != G1_POINT_SIZE {
            return Err(VerifierError::Bn254SyscallError);
        }
        let mut x = [0u8; 32];
        let mut y = [0u8; 32];
        x.copy_from_slice(&bytes[..32]);
        y.copy_from_slice(&bytes[32..64]);
        Ok(Self {
            x: Fq::from_be_bytes_reduced(&x),
            y: Fq::from_be_bytes_reduced(&y),
        })
    }

    pub fn to_bytes(&self) -> [u8; G1_POINT_SIZE] {
        let mut out = [0u8; G1_POINT_SIZE];
        out[..32].copy_from_slice(&self.x.to_be_bytes());
        out[32..].copy_from_slice(&self.y.to_be_bytes());
        out
    }

    pub fn to_words(&self) -> [Word; 2] {
        [self.x.to_be_bytes(), self.y.to_be_bytes()]
    }

    pub fn is_identity(&self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }

    /// y^2 == x^3 + 3 (mod q)
    pub fn is_on_curve(&self) -> bool {
        self.y.square() == self.x.square() * self.x + CURVE_B
    }

    /// -P = (x, q - y)
    ///
    /// A point with y = 0 and x != 0 cannot be on the curve, so it is
    /// rejected instead of silently mapping to itself.
    pub fn negate(&self) -> Result<Self, VerifierError> {
        if self.is_identity() {
            return Ok(*self);
        }
        if self.y.is_zero() {
            return Err(VerifierError::InvalidPoint);
        }
        Ok(Self { x: self.x, y: -self.y })
    }

    pub fn add(&self, other: &Self) -> Result<Self, VerifierError> {
        if self.is_identity() {
            return Ok(*other);
        }
        if other.is_identity() {
            return Ok(*self);
        }

        let mut input = [0u8; 128];
        input[..64].copy_from_slice(&self.to_bytes());
        input[64..].copy_from_slice(&other.to_bytes());

        let result = alt_bn128_addition(&input).map_err(|_| VerifierError::Bn254SyscallError)?;
        Self::from_syscall_output(&result)
    }

    pub fn sub(&self, other: &Self) -> Result<Self, VerifierError> {
        self.add(&other.negate()?)
    }

    pub fn mul(&self, scalar: &Fr) -> Result<Self, VerifierError> {
        if scalar.is_zero() || self.is_identity() {
            return Ok(Self::IDENTITY);
        }

        let mut input = [0u8; 96];
        input[..64].copy_from_slice(&self.to_bytes());
        input[64..].copy_from_slice(&scalar.to_be_bytes());

        let result =
            alt_bn128_multiplication(&input).map_err(|_| VerifierError::Bn254SyscallError)?;
        Self::from_syscall_output(&result)
    }
}

/// A G2 affine point in precompile byte order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct G2Point(pub [u8; G2_POINT_SIZE]);

impl Default for G2Point {
    fn default() -> Self {
        Self([0u8; G2_POINT_SIZE])
    }
}

impl G2Point {
    /// Build from the four coordinate words (x.c1, x.c0, y.c1, y.c0)
    pub const fn from_limbs(words: [U256; 4]) -> Self {
        let mut out = [0u8; G2_POINT_SIZE];
        let mut i = 0;
        while i < 4 {
            let bytes = words[i].to_be_bytes();
            let mut j = 0;
            while j < 32 {
                out[i * 32 + j] = bytes[j];
                j += 1;
            }
            i += 1;
        }
        Self(out)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, VerifierError> {
        if bytes.len() < G2_POINT_SIZE {
            return Err(VerifierError::InvalidVerificationKey);
        }
        let mut arr = [0u8; G2_POINT_SIZE];
        arr.copy_from_slice(&bytes[..G2_POINT_SIZE]);
        Ok(Self(arr))
    }

    pub fn to_bytes(&self) -> [u8; G2_POINT_SIZE] {
        self.0
    }

    pub fn is_identity(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

/// Multi-scalar multiplication: sum(scalar_i * point_i)
pub fn msm(terms: &[(G1Point, Fr)]) -> Result<G1Point, VerifierError> {
    let mut acc = G1Point::IDENTITY;
    for (point, scalar) in terms {
        if scalar.is_zero() || point.is_identity() {
            continue;
        }
        let term = point.mul(scalar)?;
        acc = acc.add(&term)?;
    }
    Ok(acc)
}

/// Pairing check: e(P1, Q1) * e(P2, Q2) * ... == 1
pub fn pairing_check(pairs: &[(G1Point, G2Point)]) -> Result<bool, VerifierError> {
    if pairs.is_empty() {
        return Ok(true);
    }

    // Each pair: 64 (G1) + 128 (G2) = 192 bytes
    let mut input = vec![0u8; pairs.len() * 192];
    for (i, (g1, g2)) in pairs.iter().enumerate() {
        let offset = i * 192;
        input[offset..offset + 64].copy_from_slice(&g1.to_bytes());
        input[offset + 64..offset + 192].copy_from_slice(&g2.0);
    }

    let result = alt_bn128_pairing(&input).map_err(|_| VerifierError::Bn254SyscallError)?;

    // 32-byte big-endian boolean
    Ok(result.len() == 32 && result[..31].iter().all(|&b| b == 0) && result[31] == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{G2_GENERATOR, G2_SETUP_X};
    use crate::field::FieldParams;

    fn word(v: u64) -> Word {
        U256::from_u64(v).to_be_bytes()
    }

    #[test]
    fn test_generator_on_curve() {
        assert!(G1Point::GENERATOR.is_on_curve());
        assert!(!G1Point::IDENTITY.is_on_curve());
    }

    #[test]
    fn test_from_words_rejects_off_curve() {
        assert!(G1Point::from_words(&word(1), &word(2)).is_ok());
        assert_eq!(
            G1Point::from_words(&word(1), &word(3)),
            Err(VerifierError::MalformedProof(MalformedReason::PointNotOnCurve))
        );
        assert!(G1Point::from_words(&word(0), &word(0)).is_err());
    }

    #[test]
    fn test_from_words_reduces_coordinates() {
        // x = q + 1 reduces to the generator's x
        let q_plus_1 = crate::field::FqParams::MODULUS
            .overflowing_add(&U256::ONE)
            .0
            .to_be_bytes();
        let p = G1Point::from_words(&q_plus_1, &word(2)).unwrap();
        assert_eq!(p, G1Point::GENERATOR);

        // stored encodings are not reduced
        let mut stored = [0u8; 64];
        stored[..32].copy_from_slice(&q_plus_1);
        stored[32..].copy_from_slice(&word(2));
        assert_eq!(G1Point::from_bytes(&stored), Err(VerifierError::InvalidPoint));
        assert_eq!(
            G1Point::from_bytes(&G1Point::GENERATOR.to_bytes()),
            Ok(G1Point::GENERATOR)
        );
    }

    #[test]
    fn test_negate_rejects_zero_y() {
        let bad = G1Point { x: Fq::from_u64(5), y: Fq::zero() };
        assert_eq!(bad.negate(), Err(VerifierError::InvalidPoint));
        assert_eq!(G1Point::IDENTITY.negate(), Ok(G1Point::IDENTITY));

        let neg_g = G1Point::GENERATOR.negate().unwrap();
        assert!(neg_g.is_on_curve());
        assert_eq!(neg_g.y + G1Point::GENERATOR.y, Fq::zero());
    }

    #[test]
    fn test_add_and_mul_agree() {
        let g = G1Point::GENERATOR;
        let two_g = g.add(&g).unwrap();
        assert_eq!(g.mul(&Fr::from_u64(2)).unwrap(), two_g);
        assert!(two_g.is_on_curve());

        let three_g = two_g.add(&g).unwrap();
        assert_eq!(three_g.sub(&g).unwrap(), two_g);
        assert!(g.sub(&g).unwrap().is_identity());
    }

    #[test]
    fn test_msm() {
        let g = G1Point::GENERATOR;
        let acc = msm(&[(g, Fr::from_u64(3)), (g, Fr::from_u64(4)), (g, Fr::zero())]).unwrap();
        assert_eq!(acc, g.mul(&Fr::from_u64(7)).unwrap());
    }

    #[test]
    fn test_pairing_bilinearity() {
        let g = G1Point::GENERATOR;
        let two_g = g.mul(&Fr::from_u64(2)).unwrap();
        let neg_two_g = two_g.negate().unwrap();

        // e(2G, H) * e(-2G, H) == 1
        assert!(pairing_check(&[(two_g, G2_GENERATOR), (neg_two_g, G2_GENERATOR)]).unwrap());
        // e(G, H) * e(-2G, H) != 1
        assert!(!pairing_check(&[(g, G2_GENERATOR), (neg_two_g, G2_GENERATOR)]).unwrap());
        // the setup point is a valid G2 element
        assert!(!pairing_check(&[(g, G2_SETUP_X)]).unwrap());
    }
}
