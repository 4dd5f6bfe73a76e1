//! Batched opening query
//!
//! Folds every opening at z and at z*omega into one commitment `F` and one
//! claimed value `E`. Commitments that appear both in the linearisation and
//! in the opening sums get their coefficients merged, so each commitment is
//! multiplied exactly once.

use crate::bn254::{msm, G1Point};
use crate::error::VerifierError;
use crate::field::Fr;
use crate::types::{Proof, VerificationKey};
use crate::verifier::VerifierState;

/// Coefficients of the committed part of the linearisation polynomial.
/// Each already carries the factor v.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinearisationCoefficients {
    pub gate_setup: [Fr; 8],
    /// Rescue custom gate selector
    pub custom_gate: Fr,
    pub permutation_product: Fr,
    /// Negative contribution of sigma_3
    pub last_sigma: Fr,
    pub lookup_sorted: Fr,
    pub lookup_product: Fr,
}

/// Powers v^0..=v^17
fn v_powers(v: &Fr) -> [Fr; 18] {
    let mut out = [Fr::one(); 18];
    for k in 1..18 {
        out[k] = out[k - 1] * *v;
    }
    out
}

pub fn linearisation_coefficients(proof: &Proof, state: &VerifierState) -> LinearisationCoefficients {
    let e = &proof.evaluations;
    let v = state.v;
    let [a, b, c, d] = e.wires;

    // main gate: q0 a + q1 b + q2 c + q3 d + q4 ab + q5 ac + q6 + q7 d(z omega)
    let main = e.main_gate_selector * v;
    let gate_setup = [
        a * main,
        b * main,
        c * main,
        d * main,
        a * b * main,
        a * c * main,
        main,
        e.wire_d_shifted * main,
    ];

    // Rescue: a^2 - b, b^2 - c, c * a - d under alpha, alpha^2, alpha^3
    let custom_gate = ((a.square() - b) * state.alpha_pow(1)
        + (b.square() - c) * state.alpha_pow(2)
        + (c * a - d) * state.alpha_pow(3))
        * v;

    let permutation_product = (state.alpha_pow(4) * state.permutation_identity_product(proof)
        + state.alpha_pow(5) * state.l0_at_z)
        * v;
    let last_sigma = -(state.alpha_pow(4)
        * state.beta
        * e.permutation_product_shifted
        * state.permutation_sigma_product(proof)
        * v);

    let z_minus_last = state.z - state.omega_last;
    let lookup_sorted = state.alpha_pow(6) * z_minus_last * e.lookup_product_shifted * v;

    // f(z) = (a + eta b + eta^2 c + eta^3 tableType) * selector, shifted by gamma'
    let eta = state.eta;
    let eta_2 = eta.square();
    let eta_3 = eta_2 * eta;
    let query = (a + eta * b + eta_2 * c + eta_3 * e.lookup_table_type) * e.lookup_selector
        + state.gamma_lookup;
    let table = e.lookup_table + state.beta_lookup * e.lookup_table_shifted + state.beta_gamma_lookup;
    let lookup_product = (-(state.alpha_pow(6)
        * z_minus_last
        * (state.beta_lookup + Fr::one())
        * query
        * table)
        + state.alpha_pow(7) * state.l0_at_z
        + state.alpha_pow(8) * state.l_last_at_z)
        * v;

    LinearisationCoefficients {
        gate_setup,
        custom_gate,
        permutation_product,
        last_sigma,
        lookup_sorted,
        lookup_product,
    }
}

/// [t] = T0 + eta T1 + eta^2 T2 + eta^3 T3
pub fn lookup_table_commitment(vk: &VerificationKey, eta: &Fr) -> Result<G1Point, VerifierError> {
    let mut coeff = Fr::one();
    let mut terms = [(G1Point::IDENTITY, Fr::zero()); 4];
    for (term, column) in terms.iter_mut().zip(vk.lookup_table.iter()) {
        *term = (*column, coeff);
        coeff = coeff * *eta;
    }
    msm(&terms)
}

/// Claimed values at z and at z*omega, weighted by powers of v
pub fn aggregated_evaluations(proof: &Proof, v: &Fr) -> (Fr, Fr) {
    let e = &proof.evaluations;
    let vp = v_powers(v);

    let at_z = [
        e.quotient,
        e.linearisation,
        e.wires[0],
        e.wires[1],
        e.wires[2],
        e.wires[3],
        e.main_gate_selector,
        e.sigmas[0],
        e.sigmas[1],
        e.sigmas[2],
        e.lookup_table,
        e.lookup_selector,
        e.lookup_table_type,
    ];
    let at_z_omega = [
        e.permutation_product_shifted,
        e.wire_d_shifted,
        e.lookup_sorted_shifted,
        e.lookup_product_shifted,
        e.lookup_table_shifted,
    ];

    let sum_z = at_z
        .iter()
        .zip(vp.iter())
        .fold(Fr::zero(), |acc, (value, power)| acc + *value * *power);
    let sum_z_omega = at_z_omega
        .iter()
        .zip(vp[13..].iter())
        .fold(Fr::zero(), |acc, (value, power)| acc + *value * *power);

    (sum_z, sum_z_omega)
}

/// F = D0 + D1 + sum v^k [p_k] + u * sum v^k [q_k]
pub fn aggregated_commitment(
    vk: &VerificationKey,
    proof: &Proof,
    state: &VerifierState,
    u: &Fr,
) -> Result<G1Point, VerifierError> {
    let c = &proof.commitments;
    let vp = v_powers(&state.v);
    let lin = linearisation_coefficients(proof, state);
    let table = lookup_table_commitment(vk, &state.eta)?;

    let z_n = state.z_pow_n;
    let z_2n = z_n.square();
    let z_3n = z_2n * z_n;

    let mut terms: Vec<(G1Point, Fr)> = Vec::with_capacity(32);

    // D0
    terms.push((c.quotient[0], Fr::one()));
    terms.push((c.quotient[1], z_n));
    terms.push((c.quotient[2], z_2n));
    terms.push((c.quotient[3], z_3n));

    // D1 selectors
    for (point, coeff) in vk.gate_setup.iter().zip(lin.gate_setup.iter()) {
        terms.push((*point, *coeff));
    }
    terms.push((vk.gate_selectors[1], lin.custom_gate));

    // at z only
    terms.push((c.wires[0], vp[2]));
    terms.push((c.wires[1], vp[3]));
    terms.push((c.wires[2], vp[4]));
    terms.push((vk.gate_selectors[0], vp[6]));
    terms.push((vk.permutation[0], vp[7]));
    terms.push((vk.permutation[1], vp[8]));
    terms.push((vk.permutation[2], vp[9]));
    terms.push((vk.permutation[3], lin.last_sigma));
    terms.push((vk.lookup_selector, vp[11]));
    terms.push((vk.lookup_table_type, vp[12]));

    // opened at both points
    terms.push((c.wires[3], vp[5] + *u * vp[14]));
    terms.push((c.permutation_product, lin.permutation_product + *u * vp[13]));
    terms.push((c.lookup_sorted, lin.lookup_sorted + *u * vp[15]));
    terms.push((c.lookup_product, lin.lookup_product + *u * vp[16]));
    terms.push((table, vp[10] + *u * vp[17]));

    msm(&terms)
}

/// The two G1 operands of the final check `e(rhs, [1]) = e(lhs, [x])`
pub fn pairing_pair(
    vk: &VerificationKey,
    proof: &Proof,
    state: &VerifierState,
) -> Result<(G1Point, G1Point), VerifierError> {
    let u = state.u;
    let u_2 = u.square();

    let f = aggregated_commitment(vk, proof, state, &u)?;
    let (e_z, e_z_omega) = aggregated_evaluations(proof, &state.v);
    let e = G1Point::GENERATOR.mul(&(e_z + u * e_z_omega))?;

    let w = proof.opening_at_z;
    let w_shifted = proof.opening_at_z_omega;

    let mut lhs = msm(&[(w, Fr::one()), (w_shifted, u)])?;
    let mut rhs = msm(&[(w, state.z), (w_shifted, u * state.z_omega)])?;
    rhs = rhs.add(&f)?.sub(&e)?;

    if let Some(rec) = &proof.recursive {
        lhs = lhs.add(&rec.p1.mul(&u_2)?)?;
        rhs = rhs.add(&rec.p2.mul(&u_2)?)?;
    }

    Ok((lhs, rhs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Fixture;

    #[test]
    fn test_commitment_is_affine_in_u() {
        let f = Fixture::recursive(21);
        let state = VerifierState::initialize(&f.proof).unwrap();
        let at_0 = aggregated_commitment(&f.vk, &f.proof, &state, &Fr::zero()).unwrap();
        let at_1 = aggregated_commitment(&f.vk, &f.proof, &state, &Fr::one()).unwrap();
        let at_u = aggregated_commitment(&f.vk, &f.proof, &state, &state.u).unwrap();

        let shifted = at_1.sub(&at_0).unwrap();
        assert_eq!(at_0.add(&shifted.mul(&state.u).unwrap()).unwrap(), at_u);
    }

    #[test]
    fn test_evaluations_start_with_quotient() {
        let f = Fixture::recursive(22);
        let (at_z, at_z_omega) = aggregated_evaluations(&f.proof, &Fr::zero());
        assert_eq!(at_z, f.proof.evaluations.quotient);
        assert_eq!(at_z_omega, Fr::zero());

        let (at_z, _) = aggregated_evaluations(&f.proof, &Fr::one());
        let e = &f.proof.evaluations;
        let manual = e.quotient
            + e.linearisation
            + e.wires.iter().fold(Fr::zero(), |acc, w| acc + *w)
            + e.main_gate_selector
            + e.sigmas.iter().fold(Fr::zero(), |acc, s| acc + *s)
            + e.lookup_table
            + e.lookup_selector
            + e.lookup_table_type;
        assert_eq!(at_z, manual);
    }

    #[test]
    fn test_lookup_table_commitment_weights() {
        let f = Fixture::recursive(23);
        let eta = Fr::from_u64(3);
        let table = lookup_table_commitment(&f.vk, &eta).unwrap();
        let t = &f.vk.lookup_table;
        let manual = msm(&[
            (t[0], Fr::one()),
            (t[1], Fr::from_u64(3)),
            (t[2], Fr::from_u64(9)),
            (t[3], Fr::from_u64(27)),
        ])
        .unwrap();
        assert_eq!(table, manual);
    }

    #[test]
    fn test_linearisation_coefficients_by_hand() {
        let state = crate::fixtures::small_state();
        let proof = crate::fixtures::small_proof();
        let n = Fr::from_u64;
        let lin = linearisation_coefficients(&proof, &state);
        let z_minus_last = n(7) - state.omega_last;

        // a, b, c, d, ab, ac, 1, d(z omega) times main gate selector 5
        let gate: [u64; 8] = [5, 10, 15, 20, 10, 15, 5, 0];
        for (coeff, expected) in lin.gate_setup.iter().zip(gate.iter()) {
            assert_eq!(*coeff, n(*expected));
        }
        // (1 - 2) alpha + (4 - 3) alpha^2 + (3 - 4) alpha^3
        assert_eq!(lin.custom_gate, -n(186));
        // alpha^4 (1 + 14 + 3)(2 + 70 + 3)(3 + 98 + 3)(4 + 140 + 3) + alpha^5 L0
        assert_eq!(
            lin.permutation_product,
            n(1296 * 18 * 75 * 104 * 147) + n(7776) * state.l0_at_z
        );
        // -alpha^4 beta z_perm(z omega) (1 + 12 + 3)(2 + 14 + 3)(3 + 16 + 3)
        assert_eq!(lin.last_sigma, -n(1296 * 2 * 9 * 6688));
        assert_eq!(lin.lookup_sorted, n(46656 * 11) * z_minus_last);
        // f = (1 + 2 + 3 + 2) * 3 + 5 = 29, t = 4 + 4 * 5 + 25 = 49, 1 + beta' = 5
        assert_eq!(
            lin.lookup_product,
            -(n(46656 * 5 * 29 * 49) * z_minus_last)
                + n(279936) * state.l0_at_z
                + n(1679616) * state.l_last_at_z
        );
    }

    #[test]
    fn test_commitment_matches_unmerged_sum() {
        let f = Fixture::recursive(25);
        let state = VerifierState::initialize(&f.proof).unwrap();
        let (vk, c) = (&f.vk, &f.proof.commitments);
        let lin = linearisation_coefficients(&f.proof, &state);
        let table = lookup_table_commitment(vk, &state.eta).unwrap();
        let vp = v_powers(&state.v);
        let z_n = state.z_pow_n;

        let d0 = msm(&[
            (c.quotient[0], Fr::one()),
            (c.quotient[1], z_n),
            (c.quotient[2], z_n.square()),
            (c.quotient[3], z_n.square() * z_n),
        ])
        .unwrap();

        let mut d1_terms: Vec<(G1Point, Fr)> =
            vk.gate_setup.iter().copied().zip(lin.gate_setup.iter().copied()).collect();
        d1_terms.push((vk.gate_selectors[1], lin.custom_gate));
        d1_terms.push((c.permutation_product, lin.permutation_product));
        d1_terms.push((vk.permutation[3], lin.last_sigma));
        d1_terms.push((c.lookup_sorted, lin.lookup_sorted));
        d1_terms.push((c.lookup_product, lin.lookup_product));
        let d1 = msm(&d1_terms).unwrap();

        let at_z = msm(&[
            (c.wires[0], vp[2]),
            (c.wires[1], vp[3]),
            (c.wires[2], vp[4]),
            (c.wires[3], vp[5]),
            (vk.gate_selectors[0], vp[6]),
            (vk.permutation[0], vp[7]),
            (vk.permutation[1], vp[8]),
            (vk.permutation[2], vp[9]),
            (table, vp[10]),
            (vk.lookup_selector, vp[11]),
            (vk.lookup_table_type, vp[12]),
        ])
        .unwrap();
        let at_z_omega = msm(&[
            (c.permutation_product, vp[13]),
            (c.wires[3], vp[14]),
            (c.lookup_sorted, vp[15]),
            (c.lookup_product, vp[16]),
            (table, vp[17]),
        ])
        .unwrap();

        let expected = d0
            .add(&d1)
            .unwrap()
            .add(&at_z)
            .unwrap()
            .add(&at_z_omega.mul(&state.u).unwrap())
            .unwrap();
        assert_eq!(
            aggregated_commitment(vk, &f.proof, &state, &state.u).unwrap(),
            expected
        );
    }

    #[test]
    fn test_linearisation_scales_with_v() {
        let f = Fixture::recursive(24);
        let mut state = VerifierState::initialize(&f.proof).unwrap();
        let base = linearisation_coefficients(&f.proof, &state);
        state.v = state.v.double();
        let doubled = linearisation_coefficients(&f.proof, &state);
        assert_eq!(doubled.custom_gate, base.custom_gate.double());
        assert_eq!(doubled.lookup_product, base.lookup_product.double());
        assert_eq!(doubled.gate_setup[6], base.gate_setup[6].double());
    }
}
