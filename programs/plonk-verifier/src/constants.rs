//! Protocol and curve constants
//!
//! Everything here must match the prover bit for bit. Changing any value
//! invalidates every proof issued against it.

use crate::bn254::G2Point;
use crate::field::{Fr, U256};

/// Mask applied to transcript challenges (low 253 bits)
pub const FR_MASK: U256 =
    U256::from_be_hex("1fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff");

/// log2 of the evaluation domain size
pub const DOMAIN_SIZE_LOG: u32 = 26;

/// Evaluation domain size n
pub const DOMAIN_SIZE: u64 = 1 << DOMAIN_SIZE_LOG;

/// Primitive n-th root of unity, 7^((r - 1) / 2^26)
pub const OMEGA: Fr = Fr::from_raw(U256::from_be_hex(
    "1dba8b5bdd64ef6ce29a9039aca3c0e524395c43b9227b96c75090cc6cc7ec97",
));

/// Coset shifts for the copy-permutation columns b, c, d
pub const NON_RESIDUES: [Fr; 3] = [
    Fr::from_raw(U256::from_u64(5)),
    Fr::from_raw(U256::from_u64(7)),
    Fr::from_raw(U256::from_u64(10)),
];

/// [1]_2, the G2 generator
pub const G2_GENERATOR: G2Point = G2Point::from_limbs([
    U256::from_be_hex("198e9393920d483a7260bfb731fb5d25f1aa493335a9e71297e485b7aef312c2"),
    U256::from_be_hex("1800deef121f1e76426a00665e5c4479674322d4f75edadd46debd5cd992f6ed"),
    U256::from_be_hex("090689d0585ff075ec9e99ad690c3395bc4b313370b38ef355acdadcd122975b"),
    U256::from_be_hex("12c85ea5db8c6deb4aab71808dcb408fe3d1e7690c43d37b4ce6cc0166fa7daa"),
]);

/// [x]_2 from the universal trusted setup
pub const G2_SETUP_X: G2Point = G2Point::from_limbs([
    U256::from_be_hex("260e01b251f6f1c7e7ff4e580791dee8ea51d87a358e038b4efe30fac09383c1"),
    U256::from_be_hex("0118c4d5b837bcc2bc89b5b398b5974e9f5944073b32078b7e231fec938883b0"),
    U256::from_be_hex("04fc6369f7110fe3d25156c1bb9a72859cf2a04641f99ba4ee413c80da6a5fe4"),
    U256::from_be_hex("22febda3c0c0632a56475b4214e5615e11e6dd3f96e6cea2854a87d4dacc5e55"),
]);

/// Expected word counts of the three input arrays
pub const PUBLIC_INPUT_LENGTH: usize = 1;
pub const PROOF_LENGTH: usize = 44;
pub const RECURSIVE_INPUT_LENGTH: usize = 4;

/// Commitments in a verification key
pub const VK_G1_POINTS: usize = 20;

/// Serialized verification key: 20 points, recursion flag word, 2 G2 points
pub const VK_SIZE: usize = VK_G1_POINTS * 64 + 32 + 2 * 128;
