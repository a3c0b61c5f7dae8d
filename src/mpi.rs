//! Fixed-capacity multi-precision integer primitives: big-endian
//! import/export, compare, add/sub, shift, fill-random, bit get/set,
//! modular inverse, and constant-time conditional-assign/swap.
//!
//! The registry dispatches curves at *runtime*, so the modulus for every
//! operation here is an explicit parameter rather than baked into a
//! compile-time type, so every modular routine takes its modulus as an
//! argument instead of picking a per-curve newtype.

use core::cmp::Ordering;
use rand_core::{CryptoRng, RngCore};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, ConstantTimeLess, CtOption};
use zeroize::Zeroize;

#[cfg(feature = "serde")]
use serdect::serde::{de, ser, Deserialize, Serialize};

/// Number of 64-bit limbs carried per value: 384 bits, enough to hold
/// Secp384r1 natively and Secp256r1/Curve25519 zero-extended.
pub const LIMBS: usize = 6;

/// Number of limbs in a double-width product.
const WIDE_LIMBS: usize = LIMBS * 2;

/// A non-negative integer with up to 384 bits of magnitude, stored as
/// little-endian 64-bit limbs (limb 0 is least significant), matching the
/// convention `p256`'s hand-written field code itself uses internally.
#[derive(Clone, Copy, Debug, Default, Zeroize)]
pub struct Mpi(pub(crate) [u64; LIMBS]);

impl Mpi {
    /// The additive identity.
    pub const ZERO: Mpi = Mpi([0; LIMBS]);

    /// The multiplicative identity.
    pub const ONE: Mpi = Mpi::from_u64(1);

    /// Builds a value from a single limb.
    pub const fn from_u64(word: u64) -> Mpi {
        let mut limbs = [0u64; LIMBS];
        limbs[0] = word;
        Mpi(limbs)
    }

    /// Imports a big-endian byte string. Longer than `LIMBS * 8` bytes of
    /// meaningful magnitude is a caller error (the curves in scope never
    /// need more than 384 bits), so leading bytes beyond capacity must be
    /// zero or the import is rejected.
    pub fn from_be_bytes(bytes: &[u8]) -> Option<Mpi> {
        let cap = LIMBS * 8;
        let (overflow, tail) = if bytes.len() > cap {
            bytes.split_at(bytes.len() - cap)
        } else {
            (&[][..], bytes)
        };
        if overflow.iter().any(|&b| b != 0) {
            return None;
        }
        let mut limbs = [0u64; LIMBS];
        // Walk the tail from its least-significant byte, filling limbs
        // little-endian.
        for (i, chunk_byte) in tail.iter().rev().enumerate() {
            limbs[i / 8] |= (*chunk_byte as u64) << (8 * (i % 8));
        }
        Some(Mpi(limbs))
    }

    /// Writes the value into `out` as a fixed-width big-endian byte
    /// string. Returns `false` (leaving `out` untouched byte-for-byte is
    /// not guaranteed) if the value doesn't fit in `out.len()` bytes.
    pub fn write_be_bytes(&self, out: &mut [u8]) -> bool {
        if self.bit_length() > out.len() * 8 {
            return false;
        }
        let len = out.len();
        for i in 0..len {
            let limb = self.0[i / 8];
            out[len - 1 - i] = (limb >> (8 * (i % 8))) as u8;
        }
        true
    }

    /// `true` iff every limb is zero. Constant-time.
    pub fn is_zero(&self) -> Choice {
        self.ct_eq(&Mpi::ZERO)
    }

    /// `true` iff the value is odd. Constant-time.
    pub fn is_odd(&self) -> Choice {
        Choice::from((self.0[0] & 1) as u8)
    }

    /// Returns bit `index` (0 = least significant). Constant-time.
    pub fn bit(&self, index: usize) -> Choice {
        if index >= LIMBS * 64 {
            return Choice::from(0);
        }
        Choice::from(((self.0[index / 64] >> (index % 64)) & 1) as u8)
    }

    /// Number of bits needed to represent the value (0 for zero). This
    /// inspects only curve-public values (moduli, orders, exponents) in
    /// this crate, so it is allowed to be variable-time.
    pub fn bit_length(&self) -> usize {
        for i in (0..LIMBS).rev() {
            if self.0[i] != 0 {
                return i * 64 + (64 - self.0[i].leading_zeros() as usize);
            }
        }
        0
    }

    /// Variable-time comparison. Only ever called on public values
    /// (moduli, group orders, table sizes), never on secret scalars or
    /// coordinates, which go through [`Mpi::geq_ct`] instead.
    pub fn cmp_vartime(&self, other: &Mpi) -> Ordering {
        for i in (0..LIMBS).rev() {
            match self.0[i].cmp(&other.0[i]) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }

    /// Constant-time `self >= other`.
    pub fn geq_ct(&self, other: &Mpi) -> Choice {
        !self.ct_lt(other)
    }

    /// Right-shift by one bit. Used by the Montgomery-curve private-key
    /// clamp and by `ecp_modp`'s generic reduction.
    pub fn shr1(&self) -> Mpi {
        let mut out = [0u64; LIMBS];
        let mut carry = 0u64;
        for i in (0..LIMBS).rev() {
            out[i] = (self.0[i] >> 1) | (carry << 63);
            carry = self.0[i] & 1;
        }
        Mpi(out)
    }

    /// Left-shift by one bit, discarding any overflow past the top limb.
    /// Returns the carried-out bit (0 or 1) alongside the shifted value.
    pub fn shl1(&self) -> (Mpi, u64) {
        let mut out = [0u64; LIMBS];
        let mut carry = 0u64;
        for i in 0..LIMBS {
            out[i] = (self.0[i] << 1) | carry;
            carry = self.0[i] >> 63;
        }
        (Mpi(out), carry)
    }

    /// Sets the low bit to 0, used by Montgomery private-key clamping.
    pub fn clear_bit(&mut self, index: usize) {
        self.0[index / 64] &= !(1u64 << (index % 64));
    }

    /// Sets bit `index` to 1, used by Montgomery private-key clamping and
    /// by the comb recoding's top-digit carry absorption.
    pub fn set_bit(&mut self, index: usize) {
        self.0[index / 64] |= 1u64 << (index % 64);
    }

    /// Fills `bit_len` low-order bits with randomness from `rng`, zeroing
    /// everything above.
    pub fn fill_random<R: CryptoRng + RngCore>(rng: &mut R, bit_len: usize) -> Mpi {
        let mut limbs = [0u64; LIMBS];
        let full_limbs = bit_len / 64;
        let rem_bits = bit_len % 64;
        for limb in limbs.iter_mut().take(full_limbs) {
            *limb = rng.next_u64();
        }
        if rem_bits > 0 && full_limbs < LIMBS {
            let mask = (1u64 << rem_bits) - 1;
            limbs[full_limbs] = rng.next_u64() & mask;
        }
        Mpi(limbs)
    }

    /// `self + rhs mod p`. `p` must be reduced; `self`/`rhs` must already
    /// be in `[0, p)`.
    pub fn add_mod(&self, rhs: &Mpi, p: &Mpi) -> Mpi {
        let (sum, carry) = adc_chain(&self.0, &rhs.0);
        // sum may exceed p by at most one p (carry out of the top limb
        // counts as an implicit extra bit), so a single conditional
        // subtract suffices.
        cond_sub_with_carry(sum, carry, p)
    }

    /// `self - rhs mod p`.
    pub fn sub_mod(&self, rhs: &Mpi, p: &Mpi) -> Mpi {
        let (diff, borrow) = sbb_chain(&self.0, &rhs.0);
        let masked_p = select_limbs(&Mpi::ZERO.0, &p.0, borrow_to_choice(borrow));
        let (restored, _) = adc_chain(&diff, &masked_p);
        Mpi(restored)
    }

    /// `p - self`, assuming `self` is already reduced mod `p`.
    pub fn neg_mod(&self, p: &Mpi) -> Mpi {
        Mpi::ZERO.sub_mod(self, p)
    }

    /// Plain subtraction `self - rhs`, assuming `self >= rhs`. Used by the
    /// comb driver's `N - m` swap, where both operands are full-width
    /// values rather than reductions against a shared modulus.
    pub fn sub(&self, rhs: &Mpi) -> Mpi {
        let (diff, _borrow) = sbb_chain(&self.0, &rhs.0);
        Mpi(diff)
    }

    /// `self * rhs mod p`. Schoolbook widening multiply followed by a
    /// generic (curve-agnostic) bit-serial reduction, used uniformly for
    /// every curve rather than a curve-specific fast-reduction routine.
    /// See DESIGN.md for the specialized-reduction tradeoff.
    pub fn mul_mod(&self, rhs: &Mpi, p: &Mpi) -> Mpi {
        let wide = widening_mul(&self.0, &rhs.0);
        reduce_wide(&wide, p)
    }

    /// `self * self mod p`.
    pub fn sqr_mod(&self, p: &Mpi) -> Mpi {
        self.mul_mod(self, p)
    }

    /// `self ^ exponent mod p` via square-and-multiply. `exponent` is
    /// always a curve-public value in this crate (`p - 2` for inversion),
    /// so branching on its bits leaks nothing about the secret base.
    pub fn pow_mod(&self, exponent: &Mpi, p: &Mpi) -> Mpi {
        let mut acc = Mpi::ONE;
        let bits = exponent.bit_length();
        for i in (0..bits).rev() {
            acc = acc.sqr_mod(p);
            if bool::from(exponent.bit(i)) {
                acc = acc.mul_mod(self, p);
            }
        }
        acc
    }

    /// Modular inverse via Fermat's little theorem (`self^(p-2) mod p`).
    /// `None` iff `self` is zero.
    pub fn invert(&self, p: &Mpi) -> CtOption<Mpi> {
        let p_minus_2 = p.sub_mod(&Mpi::from_u64(2), p);
        let inv = self.pow_mod(&p_minus_2, p);
        CtOption::new(inv, !self.is_zero())
    }
}

impl ConstantTimeEq for Mpi {
    fn ct_eq(&self, other: &Mpi) -> Choice {
        let mut acc = 1u8;
        for i in 0..LIMBS {
            acc &= bool::from(self.0[i].ct_eq(&other.0[i])) as u8;
        }
        Choice::from(acc)
    }
}

impl ConstantTimeLess for Mpi {
    fn ct_lt(&self, other: &Mpi) -> Choice {
        let (_, borrow) = sbb_chain(&self.0, &other.0);
        borrow_to_choice(borrow)
    }
}

impl ConditionallySelectable for Mpi {
    fn conditional_select(a: &Mpi, b: &Mpi, choice: Choice) -> Mpi {
        Mpi(select_limbs(&a.0, &b.0, choice))
    }
}

/// Serializes as the fixed-width `LIMBS * 8`-byte big-endian encoding,
/// hex-encoded for text formats, matching the convention every `pXXX`
/// field/scalar type in the workspace uses via `serdect`.
#[cfg(feature = "serde")]
impl Serialize for Mpi {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        let mut bytes = [0u8; LIMBS * 8];
        self.write_be_bytes(&mut bytes);
        serdect::array::serialize_hex_lower_or_bin(&bytes, serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Mpi {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        let mut bytes = [0u8; LIMBS * 8];
        serdect::array::deserialize_hex_or_bin(&mut bytes, deserializer)?;
        Mpi::from_be_bytes(&bytes).ok_or_else(|| de::Error::custom("value does not fit in an Mpi"))
    }
}

/// Conditionally swaps `a` and `b` in constant time, used by the
/// Montgomery ladder's `cswap`.
pub fn conditional_swap(a: &mut Mpi, b: &mut Mpi, choice: Choice) {
    let new_a = Mpi::conditional_select(a, b, choice);
    let new_b = Mpi::conditional_select(b, a, choice);
    *a = new_a;
    *b = new_b;
}

fn select_limbs(a: &[u64; LIMBS], b: &[u64; LIMBS], choice: Choice) -> [u64; LIMBS] {
    let mut out = [0u64; LIMBS];
    for i in 0..LIMBS {
        out[i] = u64::conditional_select(&a[i], &b[i], choice);
    }
    out
}

/// Adds two limb arrays, returning the sum and the final carry (0 or 1).
fn adc_chain(a: &[u64; LIMBS], b: &[u64; LIMBS]) -> ([u64; LIMBS], u64) {
    let mut out = [0u64; LIMBS];
    let mut carry = 0u64;
    for i in 0..LIMBS {
        let wide = a[i] as u128 + b[i] as u128 + carry as u128;
        out[i] = wide as u64;
        carry = (wide >> 64) as u64;
    }
    (out, carry)
}

/// Subtracts `b` from `a`, returning the difference and a borrow mask
/// (`u64::MAX` if `a < b`, else 0), the same borrow-as-bitmask idiom
/// `field64.rs`'s `sub_inner` uses to drive a conditional re-add of the
/// modulus without branching.
fn sbb_chain(a: &[u64; LIMBS], b: &[u64; LIMBS]) -> ([u64; LIMBS], u64) {
    let mut out = [0u64; LIMBS];
    let mut borrow = 0i128;
    for i in 0..LIMBS {
        let diff = a[i] as i128 - b[i] as i128 - borrow;
        if diff < 0 {
            out[i] = (diff + (1i128 << 64)) as u64;
            borrow = 1;
        } else {
            out[i] = diff as u64;
            borrow = 0;
        }
    }
    (out, if borrow != 0 { u64::MAX } else { 0 })
}

fn borrow_to_choice(borrow: u64) -> Choice {
    Choice::from((borrow & 1) as u8)
}

/// If `carry` is set (i.e. the addition overflowed `LIMBS` words) or
/// `sum >= p`, subtracts `p` once; otherwise returns `sum` unchanged.
fn cond_sub_with_carry(sum: [u64; LIMBS], carry: u64, p: &Mpi) -> Mpi {
    let (diff, borrow) = sbb_chain(&sum, &p.0);
    // borrow == 0 means sum >= p (subtraction succeeded without
    // underflow); carry == 1 means sum already overflowed LIMBS words
    // and must be reduced regardless of what the subtraction reports.
    let need_sub = Choice::from((carry as u8) | ((borrow == 0) as u8));
    Mpi(select_limbs(&sum, &diff, need_sub))
}

/// Schoolbook widening multiplication: `LIMBS x LIMBS -> 2*LIMBS` words.
fn widening_mul(a: &[u64; LIMBS], b: &[u64; LIMBS]) -> [u64; WIDE_LIMBS] {
    let mut out = [0u64; WIDE_LIMBS];
    for i in 0..LIMBS {
        let mut carry = 0u128;
        for j in 0..LIMBS {
            let idx = i + j;
            let prod = a[i] as u128 * b[j] as u128 + out[idx] as u128 + carry;
            out[idx] = prod as u64;
            carry = prod >> 64;
        }
        out[i + LIMBS] = out[i + LIMBS].wrapping_add(carry as u64);
    }
    out
}

/// Generic bit-serial reduction of a `2*LIMBS`-word product modulo `p`:
/// the textbook restoring-division algorithm, processing the product one
/// bit at a time from the most significant end, in place of a
/// curve-specialized Solinas reduction; see DESIGN.md for the tradeoff.
fn reduce_wide(wide: &[u64; WIDE_LIMBS], p: &Mpi) -> Mpi {
    let mut rem = Mpi::ZERO;
    for bit_index in (0..(WIDE_LIMBS * 64)).rev() {
        let bit = (wide[bit_index / 64] >> (bit_index % 64)) & 1;
        // rem < p before the shift, so doubling it can overflow the
        // 384-bit capacity by exactly one bit (e.g. for Secp384r1, whose
        // modulus is itself 384 bits wide). `shl1`'s carry-out plays the
        // same role as `add_mod`'s overflow carry, and the same single
        // conditional subtraction brings the result back into [0, p).
        let (mut shifted, carry) = rem.shl1();
        shifted.0[0] |= bit;
        rem = cond_sub_with_carry(shifted.0, carry, p);
    }
    rem
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sub_mod_roundtrip() {
        let p = Mpi::from_u64(97);
        let a = Mpi::from_u64(60);
        let b = Mpi::from_u64(50);
        let sum = a.add_mod(&b, &p);
        assert_eq!(sum.0[0], (60 + 50) % 97);
        let back = sum.sub_mod(&b, &p);
        assert_eq!(back.0[0], 60);
    }

    #[test]
    fn mul_mod_small() {
        let p = Mpi::from_u64(97);
        let a = Mpi::from_u64(13);
        let b = Mpi::from_u64(11);
        let product = a.mul_mod(&b, &p);
        assert_eq!(product.0[0], (13 * 11) % 97);
    }

    #[test]
    fn invert_small_prime() {
        let p = Mpi::from_u64(97);
        let a = Mpi::from_u64(13);
        let inv = a.invert(&p).unwrap();
        assert_eq!(a.mul_mod(&inv, &p).0[0], 1);
    }

    #[test]
    fn be_bytes_roundtrip() {
        let bytes = [0x01, 0x02, 0x03, 0x04];
        let v = Mpi::from_be_bytes(&bytes).unwrap();
        assert_eq!(v.0[0], 0x01020304);
        let mut out = [0u8; 4];
        assert!(v.write_be_bytes(&mut out));
        assert_eq!(out, bytes);
    }

    #[test]
    fn bit_length_matches() {
        let v = Mpi::from_u64(0b1011);
        assert_eq!(v.bit_length(), 4);
        assert_eq!(Mpi::ZERO.bit_length(), 0);
    }
}
