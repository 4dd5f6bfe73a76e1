//! PLONK proof verification
//!
//! Verification runs in strictly sequential phases: decode the words,
//! replay the transcript, check the quotient identity at z, build the
//! aggregated opening query, and finish with one two-pairing check.

use crate::aggregation;
use crate::bn254::{pairing_check, G1Point, Word};
use crate::codec::decode_calldata;
use crate::constants::{DOMAIN_SIZE, NON_RESIDUES, OMEGA};
use crate::error::VerifierError;
use crate::field::Fr;
use crate::transcript::{challenge, Transcript};
use crate::types::{Proof, VerificationKey};

/// Challenges derived before any opening is absorbed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommitmentChallenges {
    pub eta: Fr,
    pub beta: Fr,
    pub gamma: Fr,
    pub beta_lookup: Fr,
    pub gamma_lookup: Fr,
    pub alpha: Fr,
    pub z: Fr,
}

/// Per-call verifier state. Created fresh for each proof and dropped after.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifierState {
    pub eta: Fr,
    pub beta: Fr,
    pub gamma: Fr,
    pub beta_lookup: Fr,
    pub gamma_lookup: Fr,
    pub alpha: Fr,
    pub z: Fr,
    pub v: Fr,
    pub u: Fr,
    /// alpha_powers[k] = alpha^(k + 1)
    pub alpha_powers: [Fr; 8],
    pub z_omega: Fr,
    /// z^n
    pub z_pow_n: Fr,
    pub l0_at_z: Fr,
    pub l_last_at_z: Fr,
    /// omega^(n - 1)
    pub omega_last: Fr,
    /// gamma' * (1 + beta')
    pub beta_gamma_lookup: Fr,
}

impl VerifierState {
    /// Replay the full transcript for `proof`
    pub fn initialize(proof: &Proof) -> Result<Self, VerifierError> {
        let mut transcript = Transcript::new();
        let mut state = Self::after_commitments(&mut transcript, proof)?;
        state.absorb_evaluations(&mut transcript, proof);
        state.absorb_opening_proofs(&mut transcript, proof);
        Ok(state)
    }

    /// Rounds 1-5: public input and commitments, up to and including z
    pub fn after_commitments(
        transcript: &mut Transcript,
        proof: &Proof,
    ) -> Result<Self, VerifierError> {
        let c = &proof.commitments;

        transcript.update_fr(&proof.public_input);
        for wire in c.wires.iter() {
            transcript.update_point(wire);
        }
        let eta = transcript.challenge(challenge::ETA);

        transcript.update_point(&c.lookup_sorted);
        let beta = transcript.challenge(challenge::BETA);
        let gamma = transcript.challenge(challenge::GAMMA);

        transcript.update_point(&c.permutation_product);
        let beta_lookup = transcript.challenge(challenge::BETA_LOOKUP);
        let gamma_lookup = transcript.challenge(challenge::GAMMA_LOOKUP);

        transcript.update_point(&c.lookup_product);
        let alpha = transcript.challenge(challenge::ALPHA);

        for part in c.quotient.iter() {
            transcript.update_point(part);
        }
        let z = transcript.challenge(challenge::Z);

        Self::from_challenges(CommitmentChallenges {
            eta,
            beta,
            gamma,
            beta_lookup,
            gamma_lookup,
            alpha,
            z,
        })
    }

    /// Derive every scalar that depends only on the pre-opening challenges.
    ///
    /// Fails if z lands inside the evaluation domain.
    pub fn from_challenges(c: CommitmentChallenges) -> Result<Self, VerifierError> {
        let mut alpha_powers = [c.alpha; 8];
        for k in 1..8 {
            alpha_powers[k] = alpha_powers[k - 1] * c.alpha;
        }

        let z_pow_n = c.z.pow_u64(DOMAIN_SIZE);
        let omega_last = OMEGA.pow_u64(DOMAIN_SIZE - 1);
        let l0_at_z = lagrange_at(Fr::one(), &c.z, &z_pow_n)?;
        let l_last_at_z = lagrange_at(omega_last, &c.z, &z_pow_n)?;

        Ok(Self {
            eta: c.eta,
            beta: c.beta,
            gamma: c.gamma,
            beta_lookup: c.beta_lookup,
            gamma_lookup: c.gamma_lookup,
            alpha: c.alpha,
            z: c.z,
            v: Fr::zero(),
            u: Fr::zero(),
            alpha_powers,
            z_omega: c.z * OMEGA,
            z_pow_n,
            l0_at_z,
            l_last_at_z,
            omega_last,
            beta_gamma_lookup: c.gamma_lookup * (c.beta_lookup + Fr::one()),
        })
    }

    /// Round 6: openings, then v
    pub fn absorb_evaluations(&mut self, transcript: &mut Transcript, proof: &Proof) {
        let e = &proof.evaluations;

        transcript.update_fr(&e.quotient);
        for wire in e.wires.iter() {
            transcript.update_fr(wire);
        }
        transcript.update_fr(&e.wire_d_shifted);
        transcript.update_fr(&e.main_gate_selector);
        for sigma in e.sigmas.iter() {
            transcript.update_fr(sigma);
        }
        transcript.update_fr(&e.permutation_product_shifted);
        transcript.update_fr(&e.lookup_table);
        transcript.update_fr(&e.lookup_selector);
        transcript.update_fr(&e.lookup_table_type);
        transcript.update_fr(&e.lookup_sorted_shifted);
        transcript.update_fr(&e.lookup_product_shifted);
        transcript.update_fr(&e.lookup_table_shifted);
        transcript.update_fr(&e.linearisation);

        self.v = transcript.challenge(challenge::V);
    }

    /// Round 7: the two opening proofs and, for recursive keys, P1 and P2, then u.
    ///
    /// P1 and P2 enter the pairing scaled by u^2, so they must be fixed before u.
    pub fn absorb_opening_proofs(&mut self, transcript: &mut Transcript, proof: &Proof) {
        transcript.update_point(&proof.opening_at_z);
        transcript.update_point(&proof.opening_at_z_omega);
        if let Some(rec) = &proof.recursive {
            transcript.update_point(&rec.p1);
            transcript.update_point(&rec.p2);
        }
        self.u = transcript.challenge(challenge::U);
    }

    /// alpha^k for k in 1..=8
    #[inline]
    pub fn alpha_pow(&self, k: usize) -> Fr {
        self.alpha_powers[k - 1]
    }

    /// Product of (w_i + beta * sigma_i(z) + gamma) over the first three wires
    pub fn permutation_sigma_product(&self, proof: &Proof) -> Fr {
        let e = &proof.evaluations;
        (0..3).fold(Fr::one(), |acc, i| {
            acc * (e.wires[i] + self.beta * e.sigmas[i] + self.gamma)
        })
    }

    /// Product of (w_i + beta * k_i * z + gamma) with coset shifts k = 1, 5, 7, 10
    pub fn permutation_identity_product(&self, proof: &Proof) -> Fr {
        let e = &proof.evaluations;
        let beta_z = self.beta * self.z;
        let mut product = e.wires[0] + beta_z + self.gamma;
        for (wire, shift) in e.wires[1..].iter().zip(NON_RESIDUES.iter()) {
            product = product * (*wire + beta_z * *shift + self.gamma);
        }
        product
    }

    /// r0: the part of the linearisation polynomial that is not committed
    pub fn linearisation_constant_term(&self, proof: &Proof) -> Fr {
        let e = &proof.evaluations;

        // main gate with public input
        let main_gate = self.l0_at_z * proof.public_input * e.main_gate_selector;

        // copy-permutation
        let permutation = self.alpha_pow(4)
            * e.permutation_product_shifted
            * self.permutation_sigma_product(proof)
            * (e.wires[3] + self.gamma);
        let permutation_first = self.l0_at_z * self.alpha_pow(5);

        // lookup
        let lookup = self.alpha_pow(6)
            * (e.lookup_sorted_shifted * self.beta_lookup + self.beta_gamma_lookup)
            * e.lookup_product_shifted
            * (self.z - self.omega_last);
        let lookup_first = self.l0_at_z * self.alpha_pow(7);
        let lookup_last = self.l_last_at_z
            * self.alpha_pow(8)
            * self.beta_gamma_lookup.pow_u64(DOMAIN_SIZE - 1);

        main_gate - permutation - permutation_first + lookup - lookup_first - lookup_last
    }

    /// t(z) * (z^n - 1) == r(z) + r0
    pub fn verify_quotient_evaluation(&self, proof: &Proof) -> Result<(), VerifierError> {
        let e = &proof.evaluations;
        let lhs = e.quotient * (self.z_pow_n - Fr::one());
        let rhs = e.linearisation + self.linearisation_constant_term(proof);
        if lhs != rhs {
            return Err(VerifierError::InvalidQuotientEvaluation);
        }
        Ok(())
    }
}

fn lagrange_at(omega_i: Fr, z: &Fr, z_pow_n: &Fr) -> Result<Fr, VerifierError> {
    let vanishing = *z_pow_n - Fr::one();
    if vanishing.is_zero() {
        return Err(VerifierError::InvalidVanishingPolynomial);
    }
    let denominator = Fr::from_u64(DOMAIN_SIZE) * (*z - omega_i);
    let inverse = denominator
        .inverse()
        .ok_or(VerifierError::InvalidVanishingPolynomial)?;
    Ok(omega_i * vanishing * inverse)
}

/// L_i(z) = omega^i * (z^n - 1) / (n * (z - omega^i)) for z outside the domain
pub fn evaluate_lagrange_poly_out_of_domain(i: u64, z: &Fr) -> Result<Fr, VerifierError> {
    let z_pow_n = z.pow_u64(DOMAIN_SIZE);
    lagrange_at(OMEGA.pow_u64(i), z, &z_pow_n)
}

/// Run every phase up to the final pairing and return its two G1 operands
fn prepare(vk: &VerificationKey, proof: &Proof) -> Result<(G1Point, G1Point), VerifierError> {
    let state = VerifierState::initialize(proof)?;
    state.verify_quotient_evaluation(proof)?;
    aggregation::pairing_pair(vk, proof, &state)
}

/// Verify an already decoded proof
pub fn verify_proof(vk: &VerificationKey, proof: &Proof) -> Result<bool, VerifierError> {
    let (lhs, rhs) = prepare(vk, proof)?;
    pairing_check(&[(rhs, vk.g2_generator), (lhs.negate()?, vk.g2_x)])
}

/// Verify a proof given as raw word arrays.
///
/// `Ok(false)` means the pairing did not hold; every other rejection is an
/// error naming the first check that failed.
pub fn verify(
    vk: &VerificationKey,
    public_inputs: &[Word],
    proof: &[Word],
    recursive_aggregation_input: &[Word],
) -> Result<bool, VerifierError> {
    let proof = Proof::from_words(public_inputs, proof, recursive_aggregation_input, vk.recursive)?;
    verify_proof(vk, &proof)
}

/// Verify from an ABI argument block
pub fn verify_calldata(vk: &VerificationKey, data: &[u8]) -> Result<bool, VerifierError> {
    let words = decode_calldata(data)?;
    let proof = Proof::from_proof_words(&words, vk.recursive)?;
    verify_proof(vk, &proof)
}

/// Compute the pairing operands `(W + uW' + u^2 P1, zW + u z omega W' + F - E + u^2 P2)`
/// without running the pairing. A valid pair satisfies `rhs = x * lhs` and can
/// be passed as the recursive input of another proof.
pub fn pairing_pair(
    vk: &VerificationKey,
    public_inputs: &[Word],
    proof: &[Word],
    recursive_aggregation_input: &[Word],
) -> Result<(G1Point, G1Point), VerifierError> {
    let proof = Proof::from_words(public_inputs, proof, recursive_aggregation_input, vk.recursive)?;
    prepare(vk, &proof)
}
