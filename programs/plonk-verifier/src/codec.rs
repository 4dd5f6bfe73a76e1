//! Wire codec: word arrays and ABI argument blocks to typed proofs
//!
//! Proof array layout (one 32-byte big-endian word per slot):
//!
//! ```text
//!  0..8   a, b, c, d commitments (x, y)
//!  8..10  copy-permutation grand product
//! 10..12  lookup s polynomial
//! 12..14  lookup grand product
//! 14..22  quotient parts t0..t3
//! 22..26  a(z), b(z), c(z), d(z)
//! 26      d(z*omega)
//! 27      main gate selector(z)
//! 28..31  sigma_0(z), sigma_1(z), sigma_2(z)
//! 31      copy-permutation grand product(z*omega)
//! 32      lookup t(z)
//! 33      lookup selector(z)
//! 34      lookup table type(z)
//! 35      quotient t(z)
//! 36      lookup s(z*omega)
//! 37      lookup grand product(z*omega)
//! 38      lookup t(z*omega)
//! 39      linearisation r(z)
//! 40..42  opening proof at z
//! 42..44  opening proof at z*omega
//! ```
//!
//! The published field order for this proof lists no slot for t(z). Here it
//! sits at word 35, after the table type. Proofs from deployed provers that
//! place t(z) directly before r(z) are not accepted by this codec.

use crate::bn254::{G1Point, Word};
use crate::constants::{PROOF_LENGTH, PUBLIC_INPUT_LENGTH, RECURSIVE_INPUT_LENGTH};
use crate::error::{MalformedReason, VerifierError};
use crate::field::Fr;
use crate::types::{Commitments, Evaluations, Proof, ProofWords, RecursiveInput};

const ABI_WORD: usize = 32;

/// Sequential reader over the proof array
struct WordReader<'a> {
    words: &'a [Word],
    pos: usize,
}

impl<'a> WordReader<'a> {
    fn new(words: &'a [Word]) -> Self {
        Self { words, pos: 0 }
    }

    fn fr(&mut self) -> Fr {
        let value = Fr::from_be_bytes_reduced(&self.words[self.pos]);
        self.pos += 1;
        value
    }

    fn frs<const N: usize>(&mut self) -> [Fr; N] {
        let mut out = [Fr::zero(); N];
        for item in out.iter_mut() {
            *item = self.fr();
        }
        out
    }

    fn point(&mut self) -> Result<G1Point, VerifierError> {
        let point = G1Point::from_words(&self.words[self.pos], &self.words[self.pos + 1])?;
        self.pos += 2;
        Ok(point)
    }

    fn points<const N: usize>(&mut self) -> Result<[G1Point; N], VerifierError> {
        let mut out = [G1Point::IDENTITY; N];
        for item in out.iter_mut() {
            *item = self.point()?;
        }
        Ok(out)
    }
}

impl Proof {
    /// Decode and validate the three input arrays.
    ///
    /// Lengths are checked before any element is touched. `expect_recursive`
    /// selects between a 4-word and an empty recursive aggregation input.
    pub fn from_words(
        public_inputs: &[Word],
        proof: &[Word],
        recursive_input: &[Word],
        expect_recursive: bool,
    ) -> Result<Self, VerifierError> {
        if public_inputs.len() != PUBLIC_INPUT_LENGTH {
            return Err(VerifierError::MalformedProof(MalformedReason::PublicInputLength));
        }
        if proof.len() != PROOF_LENGTH {
            return Err(VerifierError::MalformedProof(MalformedReason::ProofLength));
        }
        let expected_recursive = if expect_recursive { RECURSIVE_INPUT_LENGTH } else { 0 };
        if recursive_input.len() != expected_recursive {
            return Err(VerifierError::MalformedProof(MalformedReason::RecursiveInputLength));
        }

        let public_input = Fr::from_be_bytes_reduced(&public_inputs[0]);

        let mut r = WordReader::new(proof);
        let commitments = Commitments {
            wires: r.points::<4>()?,
            permutation_product: r.point()?,
            lookup_sorted: r.point()?,
            lookup_product: r.point()?,
            quotient: r.points::<4>()?,
        };
        let evaluations = Evaluations {
            wires: r.frs::<4>(),
            wire_d_shifted: r.fr(),
            main_gate_selector: r.fr(),
            sigmas: r.frs::<3>(),
            permutation_product_shifted: r.fr(),
            lookup_table: r.fr(),
            lookup_selector: r.fr(),
            lookup_table_type: r.fr(),
            quotient: r.fr(),
            lookup_sorted_shifted: r.fr(),
            lookup_product_shifted: r.fr(),
            lookup_table_shifted: r.fr(),
            linearisation: r.fr(),
        };
        let opening_at_z = r.point()?;
        let opening_at_z_omega = r.point()?;
        debug_assert_eq!(r.pos, PROOF_LENGTH);

        let recursive = if expect_recursive {
            let mut rr = WordReader::new(recursive_input);
            Some(RecursiveInput { p1: rr.point()?, p2: rr.point()? })
        } else {
            None
        };

        Ok(Self {
            public_input,
            commitments,
            evaluations,
            opening_at_z,
            opening_at_z_omega,
            recursive,
        })
    }

    pub fn from_proof_words(words: &ProofWords, expect_recursive: bool) -> Result<Self, VerifierError> {
        Self::from_words(
            &words.public_inputs,
            &words.proof,
            &words.recursive_aggregation_input,
            expect_recursive,
        )
    }

    /// Encode back into the three word arrays
    pub fn to_words(&self) -> ProofWords {
        let c = &self.commitments;
        let e = &self.evaluations;

        let mut proof = Vec::with_capacity(PROOF_LENGTH);
        for point in c.wires.iter() {
            proof.extend_from_slice(&point.to_words());
        }
        proof.extend_from_slice(&c.permutation_product.to_words());
        proof.extend_from_slice(&c.lookup_sorted.to_words());
        proof.extend_from_slice(&c.lookup_product.to_words());
        for point in c.quotient.iter() {
            proof.extend_from_slice(&point.to_words());
        }

        let scalars = e
            .wires
            .into_iter()
            .chain([e.wire_d_shifted, e.main_gate_selector])
            .chain(e.sigmas)
            .chain([
                e.permutation_product_shifted,
                e.lookup_table,
                e.lookup_selector,
                e.lookup_table_type,
                e.quotient,
                e.lookup_sorted_shifted,
                e.lookup_product_shifted,
                e.lookup_table_shifted,
                e.linearisation,
            ]);
        for scalar in scalars {
            proof.push(scalar.to_be_bytes());
        }
        proof.extend_from_slice(&self.opening_at_z.to_words());
        proof.extend_from_slice(&self.opening_at_z_omega.to_words());

        let mut recursive_aggregation_input = Vec::new();
        if let Some(rec) = &self.recursive {
            recursive_aggregation_input.extend_from_slice(&rec.p1.to_words());
            recursive_aggregation_input.extend_from_slice(&rec.p2.to_words());
        }

        ProofWords {
            public_inputs: vec![self.public_input.to_be_bytes()],
            proof,
            recursive_aggregation_input,
        }
    }
}

/// Read a head or length word as a bounded usize
fn read_usize(data: &[u8], offset: usize) -> Result<usize, VerifierError> {
    let end = offset
        .checked_add(ABI_WORD)
        .filter(|&end| end <= data.len())
        .ok_or(VerifierError::MalformedProof(MalformedReason::Calldata))?;
    let word = &data[offset..end];
    if word[..24].iter().any(|&b| b != 0) {
        return Err(VerifierError::MalformedProof(MalformedReason::Calldata));
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&word[24..]);
    usize::try_from(u64::from_be_bytes(low))
        .map_err(|_| VerifierError::MalformedProof(MalformedReason::Calldata))
}

fn read_array(data: &[u8], head_slot: usize) -> Result<Vec<Word>, VerifierError> {
    let bad = VerifierError::MalformedProof(MalformedReason::Calldata);
    let offset = read_usize(data, head_slot * ABI_WORD)?;
    let len = read_usize(data, offset)?;
    let start = offset.checked_add(ABI_WORD).ok_or(bad)?;
    let end = len
        .checked_mul(ABI_WORD)
        .and_then(|bytes| start.checked_add(bytes))
        .filter(|&end| end <= data.len())
        .ok_or(bad)?;

    Ok(data[start..end]
        .chunks_exact(ABI_WORD)
        .map(|chunk| {
            let mut word = [0u8; 32];
            word.copy_from_slice(chunk);
            word
        })
        .collect())
}

/// Decode the ABI argument block of `verify(uint256[],uint256[],uint256[])`
/// (selector already stripped)
pub fn decode_calldata(data: &[u8]) -> Result<ProofWords, VerifierError> {
    Ok(ProofWords {
        public_inputs: read_array(data, 0)?,
        proof: read_array(data, 1)?,
        recursive_aggregation_input: read_array(data, 2)?,
    })
}

/// Encode three arrays as an ABI argument block with tightly packed tails
pub fn encode_calldata(words: &ProofWords) -> Vec<u8> {
    let arrays = [
        &words.public_inputs,
        &words.proof,
        &words.recursive_aggregation_input,
    ];
    let mut head = Vec::with_capacity(3 * ABI_WORD);
    let mut tail = Vec::new();
    let mut offset = 3 * ABI_WORD;

    for array in arrays {
        head.extend_from_slice(&usize_word(offset));
        tail.extend_from_slice(&usize_word(array.len()));
        for word in array.iter() {
            tail.extend_from_slice(word);
        }
        offset += ABI_WORD * (array.len() + 1);
    }

    head.extend_from_slice(&tail);
    head
}

fn usize_word(value: usize) -> Word {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}
