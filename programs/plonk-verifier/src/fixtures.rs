//! Proof builder over a toy setup with known trapdoor. Test use only.
//!
//! Commitments are random multiples of the generator, openings are random
//! except r(z), which is solved from the quotient identity. The opening
//! proofs are then computed directly from the trapdoor so the pairing holds.

use crate::bn254::{G1Point, G2Point};
use crate::field::{Fr, U256};
use crate::transcript::Transcript;
use crate::types::{Commitments, Evaluations, Proof, RecursiveInput, VerificationKey};
use crate::aggregation;
use crate::verifier::{CommitmentChallenges, VerifierState};
use solana_nostd_keccak::hashv;

/// Toy trapdoor x
pub const TOY_TAU: u64 = 0x1d9a_55f3_7c21;

/// [TOY_TAU]_2
pub const TOY_G2_X: G2Point = G2Point::from_limbs([
    U256::from_be_hex("013f7e69d104682923eb5aef4287b6070acb3c035edfcfff82b5e147d192181f"),
    U256::from_be_hex("19baa2886fe20450ae6f57c8f66fd0db0d3085dfd450f66dff806903abd7c761"),
    U256::from_be_hex("1b68eda6bb1f6e0e985dde0901497128f63211cdcf52a4279daf410f70a31c41"),
    U256::from_be_hex("1b2c02dc579f8abb06a4350b0ec2a33f0fb2649c296006bb07f4df2adeb0a8f7"),
]);

struct Rng {
    seed: u64,
    counter: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        Self { seed, counter: 0 }
    }

    fn scalar(&mut self) -> Fr {
        self.counter += 1;
        let digest = hashv(&[&self.seed.to_be_bytes(), &self.counter.to_be_bytes()]);
        Fr::from_be_bytes_reduced(&digest)
    }

    fn point(&mut self) -> G1Point {
        G1Point::GENERATOR.mul(&self.scalar()).unwrap()
    }

    fn points<const N: usize>(&mut self) -> [G1Point; N] {
        let mut out = [G1Point::IDENTITY; N];
        for p in out.iter_mut() {
            *p = self.point();
        }
        out
    }

    fn scalars<const N: usize>(&mut self) -> [Fr; N] {
        let mut out = [Fr::zero(); N];
        for s in out.iter_mut() {
            *s = self.scalar();
        }
        out
    }
}

pub struct Fixture {
    pub vk: VerificationKey,
    pub proof: Proof,
}

impl Fixture {
    /// Recursive key, recursive input is a fresh valid pair (P, x*P)
    pub fn recursive(seed: u64) -> Self {
        let p1 = G1Point::GENERATOR.mul(&Fr::from_u64(seed + 1000)).unwrap();
        let p2 = p1.mul(&Fr::from_u64(TOY_TAU)).unwrap();
        Self::build(seed, Some(RecursiveInput { p1, p2 }))
    }

    pub fn non_recursive(seed: u64) -> Self {
        Self::build(seed, None)
    }

    pub fn build(seed: u64, recursive: Option<RecursiveInput>) -> Self {
        let mut rng = Rng::new(seed);
        let tau = Fr::from_u64(TOY_TAU);

        let mut vk = VerificationKey::new(
            rng.points::<8>(),
            rng.points::<2>(),
            rng.points::<4>(),
            rng.point(),
            rng.points::<4>(),
            rng.point(),
            recursive.is_some(),
        );
        vk.g2_x = TOY_G2_X;

        let mut proof = Proof {
            public_input: rng.scalar(),
            commitments: Commitments {
                wires: rng.points::<4>(),
                permutation_product: rng.point(),
                lookup_sorted: rng.point(),
                lookup_product: rng.point(),
                quotient: rng.points::<4>(),
            },
            evaluations: Evaluations::default(),
            opening_at_z: G1Point::IDENTITY,
            opening_at_z_omega: G1Point::IDENTITY,
            recursive,
        };

        let mut transcript = Transcript::new();
        let mut state = VerifierState::after_commitments(&mut transcript, &proof).unwrap();

        let [d_shifted, main, perm_shifted, table, selector, table_type, quotient, sorted_shifted, product_shifted, table_shifted] =
            rng.scalars::<10>();
        proof.evaluations = Evaluations {
            wires: rng.scalars::<4>(),
            wire_d_shifted: d_shifted,
            main_gate_selector: main,
            sigmas: rng.scalars::<3>(),
            permutation_product_shifted: perm_shifted,
            lookup_table: table,
            lookup_selector: selector,
            lookup_table_type: table_type,
            quotient,
            lookup_sorted_shifted: sorted_shifted,
            lookup_product_shifted: product_shifted,
            lookup_table_shifted: table_shifted,
            linearisation: Fr::zero(),
        };
        let r0 = state.linearisation_constant_term(&proof);
        proof.evaluations.linearisation = quotient * (state.z_pow_n - Fr::one()) - r0;

        state.absorb_evaluations(&mut transcript, &proof);

        let at_0 = aggregation::aggregated_commitment(&vk, &proof, &state, &Fr::zero()).unwrap();
        let at_1 = aggregation::aggregated_commitment(&vk, &proof, &state, &Fr::one()).unwrap();
        let shifted_part = at_1.sub(&at_0).unwrap();
        let (e_z, e_z_omega) = aggregation::aggregated_evaluations(&proof, &state.v);

        let g = G1Point::GENERATOR;
        let numerator_z = at_0.sub(&g.mul(&e_z).unwrap()).unwrap();
        let numerator_z_omega = shifted_part.sub(&g.mul(&e_z_omega).unwrap()).unwrap();
        proof.opening_at_z = numerator_z
            .mul(&(tau - state.z).inverse().unwrap())
            .unwrap();
        proof.opening_at_z_omega = numerator_z_omega
            .mul(&(tau - state.z_omega).inverse().unwrap())
            .unwrap();

        Self { vk, proof }
    }
}

/// State with challenges eta..z = 1..7 and v = 1, for checking formulas by hand
pub fn small_state() -> VerifierState {
    let mut state = VerifierState::from_challenges(CommitmentChallenges {
        eta: Fr::from_u64(1),
        beta: Fr::from_u64(2),
        gamma: Fr::from_u64(3),
        beta_lookup: Fr::from_u64(4),
        gamma_lookup: Fr::from_u64(5),
        alpha: Fr::from_u64(6),
        z: Fr::from_u64(7),
    })
    .unwrap();
    state.v = Fr::one();
    state
}

/// Proof whose public input and openings are small integers
pub fn small_proof() -> Proof {
    let n = Fr::from_u64;
    Proof {
        public_input: n(12),
        evaluations: Evaluations {
            wires: [n(1), n(2), n(3), n(4)],
            main_gate_selector: n(5),
            sigmas: [n(6), n(7), n(8)],
            permutation_product_shifted: n(9),
            lookup_sorted_shifted: n(10),
            lookup_product_shifted: n(11),
            lookup_table_type: n(2),
            lookup_selector: n(3),
            lookup_table: n(4),
            lookup_table_shifted: n(5),
            ..Evaluations::default()
        },
        ..Proof::default()
    }
}
