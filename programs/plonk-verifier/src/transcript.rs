//! Fiat-Shamir transcript for PLONK verification
//!
//! Two running keccak256 states. Every absorbed word updates both states
//! (domain-separated by a 4-byte tag), and challenges are squeezed from the
//! pair without mutating them.

use crate::bn254::{G1Point, Word};
use crate::constants::FR_MASK;
use crate::field::{Fr, U256};
use solana_nostd_keccak::hashv;

const DST_0: [u8; 4] = [0, 0, 0, 0];
const DST_1: [u8; 4] = [0, 0, 0, 1];
const DST_CHALLENGE: [u8; 4] = [0, 0, 0, 2];

/// Challenge indices, in the order the protocol emits them
pub mod challenge {
    pub const ETA: u32 = 0;
    pub const BETA: u32 = 1;
    pub const GAMMA: u32 = 2;
    pub const BETA_LOOKUP: u32 = 3;
    pub const GAMMA_LOOKUP: u32 = 4;
    pub const ALPHA: u32 = 5;
    pub const Z: u32 = 6;
    pub const V: u32 = 7;
    pub const U: u32 = 8;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transcript {
    state_0: Word,
    state_1: Word,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb one 32-byte word
    pub fn update(&mut self, value: &Word) {
        let next_0 = hashv(&[&DST_0, &self.state_0, &self.state_1, value]);
        let next_1 = hashv(&[&DST_1, &self.state_0, &self.state_1, value]);
        self.state_0 = next_0;
        self.state_1 = next_1;
    }

    #[inline]
    pub fn update_fr(&mut self, value: &Fr) {
        self.update(&value.to_be_bytes());
    }

    /// Absorb x then y
    #[inline]
    pub fn update_point(&mut self, point: &G1Point) {
        self.update(&point.x.to_be_bytes());
        self.update(&point.y.to_be_bytes());
    }

    /// Squeeze challenge `index`, masked to 253 bits
    pub fn challenge(&self, index: u32) -> Fr {
        let digest = hashv(&[&DST_CHALLENGE, &self.state_0, &self.state_1, &index.to_be_bytes()]);
        Fr::from_u256_reduced(U256::from_be_bytes(&digest).bitand(&FR_MASK))
    }

    #[cfg(test)]
    pub(crate) fn states(&self) -> (Word, Word) {
        (self.state_0, self.state_1)
    }
}
