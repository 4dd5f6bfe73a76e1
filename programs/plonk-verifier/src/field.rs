//! Prime field arithmetic for the BN254 base and scalar fields
//!
//! Elements are stored as four little-endian u64 limbs and are always kept
//! fully reduced. Products are reduced with a bitwise shift-and-subtract over
//! the 512-bit intermediate, which is slow compared to Montgomery form but
//! has no precomputed constants to get wrong.

use core::cmp::Ordering;
use core::fmt;
use core::marker::PhantomData;
use core::ops::{Add, Mul, Neg, Sub};

/// 256-bit unsigned integer, little-endian limbs
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct U256(pub [u64; 4]);

impl U256 {
    pub const ZERO: Self = Self([0, 0, 0, 0]);
    pub const ONE: Self = Self([1, 0, 0, 0]);

    /// Parse a big-endian hex literal (no `0x` prefix) at compile time
    pub const fn from_be_hex(hex: &str) -> Self {
        let bytes = hex.as_bytes();
        assert!(bytes.len() <= 64, "hex literal wider than 256 bits");

        let mut limbs = [0u64; 4];
        let mut i = 0;
        while i < bytes.len() {
            let nibble = match bytes[bytes.len() - 1 - i] {
                b @ b'0'..=b'9' => b - b'0',
                b @ b'a'..=b'f' => b - b'a' + 10,
                b @ b'A'..=b'F' => b - b'A' + 10,
                _ => panic!("invalid hex digit"),
            };
            limbs[i / 16] |= (nibble as u64) << ((i % 16) * 4);
            i += 1;
        }
        Self(limbs)
    }

    pub const fn from_u64(value: u64) -> Self {
        Self([value, 0, 0, 0])
    }

    pub fn from_be_bytes(bytes: &[u8; 32]) -> Self {
        let mut limbs = [0u64; 4];
        for (i, limb) in limbs.iter_mut().enumerate() {
            let start = 32 - (i + 1) * 8;
            let mut chunk = [0u8; 8];
            chunk.copy_from_slice(&bytes[start..start + 8]);
            *limb = u64::from_be_bytes(chunk);
        }
        Self(limbs)
    }

    pub const fn to_be_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        let mut i = 0;
        while i < 4 {
            let limb = self.0[3 - i].to_be_bytes();
            let mut j = 0;
            while j < 8 {
                out[i * 8 + j] = limb[j];
                j += 1;
            }
            i += 1;
        }
        out
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 4]
    }

    /// Bit `i`, counting from the least significant bit
    pub fn bit(&self, i: usize) -> bool {
        (self.0[i / 64] >> (i % 64)) & 1 == 1
    }

    /// Number of significant bits
    pub fn bits(&self) -> usize {
        for i in (0..4).rev() {
            if self.0[i] != 0 {
                return i * 64 + 64 - self.0[i].leading_zeros() as usize;
            }
        }
        0
    }

    pub fn overflowing_add(&self, other: &Self) -> (Self, bool) {
        let mut out = [0u64; 4];
        let mut carry = false;
        for (i, limb) in out.iter_mut().enumerate() {
            let (s1, c1) = self.0[i].overflowing_add(other.0[i]);
            let (s2, c2) = s1.overflowing_add(carry as u64);
            *limb = s2;
            carry = c1 || c2;
        }
        (Self(out), carry)
    }

    pub fn overflowing_sub(&self, other: &Self) -> (Self, bool) {
        let mut out = [0u64; 4];
        let mut borrow = false;
        for (i, limb) in out.iter_mut().enumerate() {
            let (d1, b1) = self.0[i].overflowing_sub(other.0[i]);
            let (d2, b2) = d1.overflowing_sub(borrow as u64);
            *limb = d2;
            borrow = b1 || b2;
        }
        (Self(out), borrow)
    }

    pub fn bitand(&self, mask: &Self) -> Self {
        Self([
            self.0[0] & mask.0[0],
            self.0[1] & mask.0[1],
            self.0[2] & mask.0[2],
            self.0[3] & mask.0[3],
        ])
    }

    /// Shift left by one bit and set the low bit to `low`.
    /// The caller guarantees the top bit is clear.
    fn shl1_with(&self, low: bool) -> Self {
        Self([
            (self.0[0] << 1) | low as u64,
            (self.0[1] << 1) | (self.0[0] >> 63),
            (self.0[2] << 1) | (self.0[1] >> 63),
            (self.0[3] << 1) | (self.0[2] >> 63),
        ])
    }

    /// Schoolbook 256x256 -> 512-bit product, little-endian limbs
    fn mul_wide(&self, other: &Self) -> [u64; 8] {
        let mut out = [0u64; 8];
        for i in 0..4 {
            let mut carry: u128 = 0;
            for j in 0..4 {
                let t = (self.0[i] as u128) * (other.0[j] as u128) + out[i + j] as u128 + carry;
                out[i + j] = t as u64;
                carry = t >> 64;
            }
            out[i + 4] = carry as u64;
        }
        out
    }
}

impl Ord for U256 {
    fn cmp(&self, other: &Self) -> Ordering {
        for i in (0..4).rev() {
            match self.0[i].cmp(&other.0[i]) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for U256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for limb in self.0.iter().rev() {
            write!(f, "{:016x}", limb)?;
        }
        Ok(())
    }
}

/// Reduce a 512-bit value modulo `modulus` (which must be below 2^255)
fn reduce_wide(wide: &[u64; 8], modulus: &U256) -> U256 {
    let mut rem = U256::ZERO;
    for i in (0..512).rev() {
        let bit = (wide[i / 64] >> (i % 64)) & 1 == 1;
        rem = rem.shl1_with(bit);
        if rem >= *modulus {
            rem = rem.overflowing_sub(modulus).0;
        }
    }
    rem
}

/// Static description of a prime field
pub trait FieldParams: Copy + Clone + fmt::Debug + PartialEq + Eq + 'static {
    const MODULUS: U256;
}

/// BN254 scalar field (group order r)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrParams;

impl FieldParams for FrParams {
    const MODULUS: U256 =
        U256::from_be_hex("30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000001");
}

/// BN254 base field (coordinate field q)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FqParams;

impl FieldParams for FqParams {
    const MODULUS: U256 =
        U256::from_be_hex("30644e72e131a029b85045b68181585d97816a916871ca8d3c208c16d87cfd47");
}

/// Element of the prime field described by `P`, always `< P::MODULUS`
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Fp<P: FieldParams> {
    value: U256,
    _params: PhantomData<P>,
}

pub type Fr = Fp<FrParams>;
pub type Fq = Fp<FqParams>;

impl<P: FieldParams> Fp<P> {
    /// Wrap a value that is already known to be canonical.
    /// Only meant for compile-time constants.
    pub const fn from_raw(value: U256) -> Self {
        Self { value, _params: PhantomData }
    }

    pub const fn zero() -> Self {
        Self::from_raw(U256::ZERO)
    }

    pub const fn one() -> Self {
        Self::from_raw(U256::ONE)
    }

    pub fn from_u64(value: u64) -> Self {
        Self::from_u256_reduced(U256::from_u64(value))
    }

    /// Reduce an arbitrary 256-bit value into the field
    pub fn from_u256_reduced(mut value: U256) -> Self {
        while value >= P::MODULUS {
            value = value.overflowing_sub(&P::MODULUS).0;
        }
        Self::from_raw(value)
    }

    /// Accept only values already below the modulus
    pub fn from_canonical(value: U256) -> Option<Self> {
        (value < P::MODULUS).then(|| Self::from_raw(value))
    }

    pub fn from_be_bytes_reduced(bytes: &[u8; 32]) -> Self {
        Self::from_u256_reduced(U256::from_be_bytes(bytes))
    }

    pub fn to_be_bytes(&self) -> [u8; 32] {
        self.value.to_be_bytes()
    }

    pub fn to_u256(&self) -> U256 {
        self.value
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn square(&self) -> Self {
        *self * *self
    }

    pub fn double(&self) -> Self {
        *self + *self
    }

    /// Square-and-multiply, most significant bit first
    pub fn pow(&self, exp: &U256) -> Self {
        let mut result = Self::one();
        for i in (0..exp.bits()).rev() {
            result = result.square();
            if exp.bit(i) {
                result = result * *self;
            }
        }
        result
    }

    pub fn pow_u64(&self, exp: u64) -> Self {
        self.pow(&U256::from_u64(exp))
    }

    /// Multiplicative inverse via Fermat's little theorem, `None` for zero
    pub fn inverse(&self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }
        let exp = P::MODULUS.overflowing_sub(&U256::from_u64(2)).0;
        Some(self.pow(&exp))
    }
}

impl<P: FieldParams> Default for Fp<P> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<P: FieldParams> fmt::Debug for Fp<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.value, f)
    }
}

impl<P: FieldParams> Add for Fp<P> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        // both operands < p < 2^255, so the sum cannot carry out
        let (sum, _) = self.value.overflowing_add(&rhs.value);
        if sum >= P::MODULUS {
            Self::from_raw(sum.overflowing_sub(&P::MODULUS).0)
        } else {
            Self::from_raw(sum)
        }
    }
}

impl<P: FieldParams> Sub for Fp<P> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        let (diff, borrow) = self.value.overflowing_sub(&rhs.value);
        if borrow {
            Self::from_raw(diff.overflowing_add(&P::MODULUS).0)
        } else {
            Self::from_raw(diff)
        }
    }
}

impl<P: FieldParams> Mul for Fp<P> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        if self.is_zero() || rhs.is_zero() {
            return Self::zero();
        }
        let wide = self.value.mul_wide(&rhs.value);
        Self::from_raw(reduce_wide(&wide, &P::MODULUS))
    }
}

impl<P: FieldParams> Neg for Fp<P> {
    type Output = Self;

    fn neg(self) -> Self {
        Self::zero() - self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_and_bytes_agree() {
        let v = U256::from_be_hex("0102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f20");
        let bytes = v.to_be_bytes();
        assert_eq!(bytes[0], 0x01);
        assert_eq!(bytes[31], 0x20);
        assert_eq!(U256::from_be_bytes(&bytes), v);
    }

    #[test]
    fn test_reduction_wraps_modulus() {
        let r = FrParams::MODULUS;
        assert!(Fr::from_u256_reduced(r).is_zero());
        let r_plus_5 = r.overflowing_add(&U256::from_u64(5)).0;
        assert_eq!(Fr::from_u256_reduced(r_plus_5), Fr::from_u64(5));
        assert!(Fr::from_canonical(r).is_none());

        // 2^256 - 1 reduces without overflow
        let max = U256([u64::MAX; 4]);
        let reduced = Fq::from_u256_reduced(max);
        assert!(reduced.to_u256() < FqParams::MODULUS);
    }

    #[test]
    fn test_sub_wraps_below_zero() {
        let one = Fr::one();
        let minus_one = Fr::zero() - one;
        assert_eq!(minus_one + one, Fr::zero());
        assert_eq!(
            minus_one.to_u256(),
            FrParams::MODULUS.overflowing_sub(&U256::ONE).0
        );
        assert_eq!(-minus_one, one);
    }

    #[test]
    fn test_mul_matches_small_integers() {
        let a = Fr::from_u64(0xffff_ffff_ffff_ffff);
        let b = Fr::from_u64(0x1234_5678);
        let expected = U256([0xffff_ffff_edcb_a988, 0x1234_5677, 0, 0]);
        assert_eq!((a * b).to_u256(), expected);
    }

    #[test]
    fn test_mul_large_operands() {
        // (p - 1)^2 = 1 mod p
        let minus_one = -Fq::one();
        assert_eq!(minus_one * minus_one, Fq::one());

        let minus_two = -Fr::from_u64(2);
        assert_eq!(minus_two * minus_two, Fr::from_u64(4));
    }

    #[test]
    fn test_inverse() {
        assert!(Fr::zero().inverse().is_none());
        let a = Fr::from_u64(0xdead_beef);
        let inv = a.inverse().unwrap();
        assert_eq!(a * inv, Fr::one());

        let b = -Fq::from_u64(3);
        assert_eq!(b * b.inverse().unwrap(), Fq::one());
    }

    #[test]
    fn test_pow() {
        let three = Fr::from_u64(3);
        assert_eq!(three.pow_u64(0), Fr::one());
        assert_eq!(three.pow_u64(5), Fr::from_u64(243));
        // Fermat: a^(r-1) = 1
        let r_minus_1 = FrParams::MODULUS.overflowing_sub(&U256::ONE).0;
        assert_eq!(three.pow(&r_minus_1), Fr::one());
    }
}
