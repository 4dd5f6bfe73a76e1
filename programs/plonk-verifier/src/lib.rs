//! PLONK rollup-proof verifier for Solana
//!
//! Verifies proofs for a custom-gate PLONK circuit with copy-permutation and
//! lookup arguments over BN254, folding an optional recursive proof into the
//! final pairing.
//!
//! # Architecture
//!
//! ```text
//! words / ABI block
//!     │ codec        length + curve checks
//!     ▼
//! Proof ── transcript ──► eta, beta, gamma, beta', gamma', alpha, z, v, u
//!     │
//!     ├── quotient identity   t(z)(z^n - 1) == r(z) + r0
//!     ├── aggregation         F, E from D0, D1 and the v-weighted openings
//!     ▼
//! pairing   e(zW + u z omega W' + F - E + u^2 P2, [1]) * e(-(W + uW' + u^2 P1), [x]) == 1
//! ```
//!
//! The same crate builds as an on-chain program (pinocchio entrypoint) and as
//! a plain library with `no-entrypoint`.

use pinocchio::{
    account_info::AccountInfo,
    entrypoint,
    program_error::ProgramError,
    pubkey::Pubkey,
    ProgramResult,
};

pub mod aggregation;
pub mod bn254;
pub mod codec;
pub mod constants;
pub mod error;
pub mod field;
pub mod transcript;
pub mod types;
pub mod verifier;

/// Honest proofs over a toy setup, for tests in this and downstream crates
#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

pub use bn254::Word;
pub use codec::{decode_calldata, encode_calldata};
pub use error::{MalformedReason, VerifierError};
pub use types::*;
pub use verifier::{pairing_pair, verify, verify_calldata, verify_proof};

/// Program ID placeholder (update after deployment)
pub const ID: Pubkey = [
    0x50, 0x6c, 0x6f, 0x6e, 0x6b, 0x56, 0x65, 0x72, // "PlonkVer"
    0x69, 0x66, 0x69, 0x65, 0x72, 0x53, 0x6f, 0x6c, // "ifierSol"
    0x61, 0x6e, 0x61, 0x00, 0x00, 0x00, 0x00, 0x00, // "ana"
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02,
];

/// Instruction discriminators
pub mod instruction {
    /// Verify a proof against the key stored in an account
    /// Accounts: [vk_account]
    /// Data: ABI argument block of verify(uint256[],uint256[],uint256[])
    pub const VERIFY: u8 = 0;

    /// Write a verification key into an account
    /// Accounts: [vk_account, authority (signer), system_program]
    /// Data: serialized verification key
    pub const INIT_VK: u8 = 1;

    /// Log the keccak256 hash of the stored verification key
    /// Accounts: [vk_account]
    pub const VERIFICATION_KEY_HASH: u8 = 2;
}

#[cfg(not(feature = "no-entrypoint"))]
entrypoint!(process_instruction);

/// Main entrypoint - routes to instruction handlers
pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    let (discriminator, data) = instruction_data
        .split_first()
        .ok_or(ProgramError::InvalidInstructionData)?;

    match *discriminator {
        instruction::VERIFY => process_verify(program_id, accounts, data),
        instruction::INIT_VK => process_init_vk(program_id, accounts, data),
        instruction::VERIFICATION_KEY_HASH => process_key_hash(program_id, accounts),
        _ => Err(ProgramError::InvalidInstructionData),
    }
}

/// Custom error returned when every check passes except the final pairing
pub const PAIRING_MISMATCH: u32 = 2;

/// Verify `calldata` against serialized key bytes
pub fn verify_with_key_bytes(vk_data: &[u8], calldata: &[u8]) -> Result<bool, VerifierError> {
    // Box keeps the key off the 4KB stack
    let vk = Box::new(VerificationKey::from_bytes(vk_data)?);
    verify_calldata(&vk, calldata)
}

fn load_key_account<'a>(
    program_id: &Pubkey,
    accounts: &'a [AccountInfo],
) -> Result<&'a AccountInfo, ProgramError> {
    let vk_account = accounts.first().ok_or(ProgramError::NotEnoughAccountKeys)?;
    if vk_account.owner() != program_id {
        return Err(ProgramError::InvalidAccountOwner);
    }
    Ok(vk_account)
}

/// Process VERIFY instruction
fn process_verify(program_id: &Pubkey, accounts: &[AccountInfo], data: &[u8]) -> ProgramResult {
    let vk_account = load_key_account(program_id, accounts)?;
    let vk_data = vk_account.try_borrow_data()?;

    match verify_with_key_bytes(&vk_data, data) {
        Ok(true) => {
            pinocchio::msg!("Proof verified");
            Ok(())
        }
        Ok(false) => {
            pinocchio::msg!("Pairing check failed");
            Err(ProgramError::Custom(PAIRING_MISMATCH))
        }
        Err(VerifierError::MalformedProof(_)) => {
            pinocchio::msg!("Malformed proof");
            Err(ProgramError::InvalidInstructionData)
        }
        Err(e) => {
            pinocchio::msg!("Proof rejected");
            Err(e.into())
        }
    }
}

/// Process INIT_VK instruction
fn process_init_vk(program_id: &Pubkey, accounts: &[AccountInfo], data: &[u8]) -> ProgramResult {
    if accounts.len() < 3 {
        return Err(ProgramError::NotEnoughAccountKeys);
    }

    let vk_account = &accounts[0];
    let authority = &accounts[1];

    if !authority.is_signer() {
        return Err(ProgramError::MissingRequiredSignature);
    }

    // Uninitialized accounts are still owned by the system program
    let owner = vk_account.owner();
    let system_program: Pubkey = [0u8; 32];
    if owner != program_id && owner != &system_program {
        return Err(ProgramError::InvalidAccountOwner);
    }

    // Reject keys that would fail to load later
    let vk = VerificationKey::from_bytes(data)?;
    let encoded = vk.to_bytes();

    let mut vk_data = vk_account.try_borrow_mut_data()?;
    if vk_data.len() < encoded.len() {
        return Err(ProgramError::AccountDataTooSmall);
    }
    vk_data[..encoded.len()].copy_from_slice(&encoded);

    pinocchio::msg!("Verification key initialized");
    Ok(())
}

/// Process VERIFICATION_KEY_HASH instruction
fn process_key_hash(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
    let vk_account = load_key_account(program_id, accounts)?;
    let vk_data = vk_account.try_borrow_data()?;
    let vk = Box::new(VerificationKey::from_bytes(&vk_data)?);

    let encoded = hex_encode(&vk.hash());
    let text = core::str::from_utf8(&encoded).map_err(|_| ProgramError::InvalidAccountData)?;
    pinocchio::msg!(text);
    Ok(())
}

fn hex_encode(bytes: &[u8; 32]) -> [u8; 64] {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    let mut out = [0u8; 64];
    for (i, b) in bytes.iter().enumerate() {
        out[2 * i] = DIGITS[(b >> 4) as usize];
        out[2 * i + 1] = DIGITS[(b & 0x0f) as usize];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Fixture;

    #[test]
    fn test_instruction_discriminators() {
        assert_eq!(instruction::VERIFY, 0);
        assert_eq!(instruction::INIT_VK, 1);
        assert_eq!(instruction::VERIFICATION_KEY_HASH, 2);
    }

    #[test]
    fn test_verify_with_key_bytes() {
        let f = Fixture::recursive(31);
        let vk_bytes = f.vk.to_bytes();
        let calldata = encode_calldata(&f.proof.to_words());
        assert_eq!(verify_with_key_bytes(&vk_bytes, &calldata), Ok(true));

        // last word is the y coordinate of P2, flipping it leaves the curve
        let mut tampered = calldata.clone();
        let last = tampered.len() - 1;
        tampered[last] ^= 1;
        assert!(verify_with_key_bytes(&vk_bytes, &tampered).is_err());

        assert_eq!(
            verify_with_key_bytes(&vk_bytes[..100], &calldata),
            Err(VerifierError::InvalidVerificationKey)
        );
    }

    #[test]
    fn test_hex_encode() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xab;
        bytes[31] = 0x01;
        let out = hex_encode(&bytes);
        assert_eq!(&out[..2], b"ab");
        assert_eq!(&out[62..], b"01");
    }
}
