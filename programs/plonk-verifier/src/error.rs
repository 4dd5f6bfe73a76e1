//! PLONK verification errors

use core::fmt;
use pinocchio::program_error::ProgramError;

/// Why a proof buffer was rejected before any arithmetic ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    /// Public-input array is not exactly one word
    PublicInputLength,
    /// Main proof array is not exactly 44 words
    ProofLength,
    /// Recursive aggregation input has the wrong number of words
    RecursiveInputLength,
    /// A coordinate pair does not satisfy y^2 = x^3 + 3
    PointNotOnCurve,
    /// ABI argument block is truncated or has bad offsets
    Calldata,
}

/// Errors that can occur during PLONK proof verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifierError {
    /// Wire format violated
    MalformedProof(MalformedReason),
    /// Point negation or validation hit a point with y = 0 and x != 0
    InvalidPoint,
    /// z lies in the evaluation domain (z^n = 1)
    InvalidVanishingPolynomial,
    /// t(z) * (z^n - 1) != r(z) + r0
    InvalidQuotientEvaluation,
    /// Verification key bytes could not be decoded
    InvalidVerificationKey,
    /// alt_bn128 addition, multiplication or pairing failed to execute
    Bn254SyscallError,
}

impl VerifierError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedProof(_) => "MALFORMED_PROOF",
            Self::InvalidPoint => "INVALID_POINT",
            Self::InvalidVanishingPolynomial => "INVALID_VANISHING_POLYNOMIAL",
            Self::InvalidQuotientEvaluation => "INVALID_QUOTIENT_EVALUATION",
            Self::InvalidVerificationKey => "INVALID_VERIFICATION_KEY",
            Self::Bn254SyscallError => "BN254_PRIMITIVE_FAILURE",
        }
    }

    /// Whether the failure says something about the proof rather than the host
    pub fn is_proof_rejection(&self) -> bool {
        !matches!(self, Self::Bn254SyscallError | Self::InvalidVerificationKey)
    }
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PublicInputLength => "public input length is not 1",
            Self::ProofLength => "proof length is not 44",
            Self::RecursiveInputLength => "recursive aggregation input has wrong length",
            Self::PointNotOnCurve => "point is not on curve",
            Self::Calldata => "bad calldata encoding",
        };
        f.write_str(s)
    }
}

impl fmt::Display for VerifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedProof(reason) => write!(f, "malformed proof: {}", reason),
            Self::InvalidPoint => f.write_str("invalid point"),
            Self::InvalidVanishingPolynomial => f.write_str("invalid vanishing polynomial"),
            Self::InvalidQuotientEvaluation => f.write_str("invalid quotient evaluation"),
            Self::InvalidVerificationKey => f.write_str("invalid verification key"),
            Self::Bn254SyscallError => f.write_str("bn254 primitive failure"),
        }
    }
}

impl std::error::Error for VerifierError {}

impl From<VerifierError> for ProgramError {
    fn from(e: VerifierError) -> Self {
        match e {
            VerifierError::MalformedProof(_) => ProgramError::InvalidInstructionData,
            VerifierError::InvalidVerificationKey => ProgramError::InvalidAccountData,
            VerifierError::InvalidPoint => ProgramError::InvalidArgument,
            VerifierError::InvalidVanishingPolynomial => ProgramError::InvalidArgument,
            VerifierError::InvalidQuotientEvaluation => ProgramError::InvalidArgument,
            VerifierError::Bn254SyscallError => ProgramError::Custom(1),
        }
    }
}
