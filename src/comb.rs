//! Fixed-base comb scalar multiplication for short Weierstrass curves.
//!
//! Window `w = 4` for 256-bit curves, `w = 5` for 384-bit curves, giving
//! `d = ceil(bits(N)/w)` comb "teeth". Some comb implementations bump
//! `w` by one when the base point is the group's generator, because a
//! precomputed table cached process-wide lets the larger one-time setup
//! cost amortize across every session. This crate's [`Group::load`]
//! rebuilds groups per call rather than caching a table process-wide
//! (see DESIGN.md), so a bigger window would only slow down every single
//! call; this crate therefore uses the same window whether or not
//! `base == G`. That is the one Open Question decision recorded for
//! this module.

use crate::error::{Error, Result};
use crate::field::FieldElement;
use crate::group::Group;
use crate::mpi::Mpi;
use crate::point::{normalize_many_indexed, AffinePoint, JacobianPoint};
use rand_core::{CryptoRng, RngCore};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use zeroize::Zeroize;

/// Largest comb digit-array length this crate builds: `d + 1` for the
/// widest in-scope case (Secp384r1 at `w = 5`, `d = ceil(384/5) = 77`).
const MAX_DIGITS: usize = 96;

/// Largest comb table this crate builds: `2^(w-1)` for `w = 5`.
const MAX_TABLE: usize = 16;

/// Picks the comb window `w` for a curve of the given bit size: `4` for
/// 256-bit curves, `5` for 384-bit curves.
fn window_for_bits(bits: usize) -> usize {
    if bits <= 256 {
        4
    } else {
        5
    }
}

/// `d = ceil(bits(N)/w)`.
fn digit_count(order_bits: usize, w: usize) -> usize {
    (order_bits + w - 1) / w
}

/// Comb recoding: produces `d + 1` digit bytes from an odd scalar `m`
/// with `bitlen(m) <= w*d`. Bits `0..w` of
/// `digits[i]` carry the unsigned magnitude `K_i`; bit 7 carries its
/// sign. The carry-propagation pass enforces `K_i` odd for `i >= 1`
/// without branching on any digit's value; only the resulting digit
/// bytes differ between scalars, and those are consumed by
/// [`select_comb`] through a full linear scan, never through a
/// data-dependent index.
fn comb_recode(m: &Mpi, w: usize, d: usize, digits: &mut [u8]) {
    debug_assert!(digits.len() >= d + 1);
    for slot in digits[..=d].iter_mut() {
        *slot = 0;
    }

    for i in 0..d {
        for j in 0..w {
            let bit = bool::from(m.bit(i + j * d)) as u8;
            digits[i] |= bit << j;
        }
    }

    let mut carry = 0u8;
    for i in 1..=d {
        let next_carry = digits[i] & carry;
        digits[i] ^= carry;
        carry = next_carry;

        let adjust = 1 - (digits[i] & 1);
        carry |= digits[i] & (digits[i - 1] * adjust);
        digits[i] ^= digits[i - 1] * adjust;
        digits[i - 1] |= adjust << 7;
    }
}

/// Builds the comb table `T[0..2^(w-1))` for `base`: `T[i]` is
/// `(i_{w-1}*2^{(w-1)d} + ... + i_1*2^d + 1) * base`, in two
/// batch-normalized phases: the power-of-two entries are built by
/// repeated doubling and normalized together first, then the remaining
/// entries are filled by mixed addition and normalized in a second
/// batch.
fn precompute_comb(grp: &Group, base: &JacobianPoint, d: usize, table: &mut [AffinePoint]) -> Result<()> {
    let table_size = table.len();
    if table_size > MAX_TABLE {
        return Err(Error::Internal);
    }

    let mut t = [JacobianPoint::IDENTITY; MAX_TABLE];
    t[0] = *base;

    let mut pow2 = [0usize; 8];
    let mut pow2_len = 0;
    let mut i = 1;
    while i < table_size {
        let mut cur = t[i >> 1];
        for _ in 0..d {
            cur = cur.double(grp);
        }
        t[i] = cur;
        pow2[pow2_len] = i;
        pow2_len += 1;
        i <<= 1;
    }
    normalize_many_indexed(&mut t[..table_size], &pow2[..pow2_len], grp)?;

    let mut fresh = [0usize; MAX_TABLE];
    let mut fresh_len = 0;
    let mut i = 1;
    while i < table_size {
        let mut j = i;
        while j > 0 {
            j -= 1;
            let q = t[i].as_affine_unit_z();
            t[i + j] = t[j].add_mixed(&q, grp)?;
            fresh[fresh_len] = i + j;
            fresh_len += 1;
        }
        i <<= 1;
    }
    normalize_many_indexed(&mut t[..table_size], &fresh[..fresh_len], grp)?;

    for (slot, point) in table.iter_mut().zip(t.iter()) {
        *slot = point.as_affine_unit_z();
    }
    Ok(())
}

/// Table select: `R <- sign(digit) *
/// T[|digit|/2]`, by a full linear scan of `table` with a constant-time
/// equality check per entry, followed by a constant-time conditional
/// negation of `Y`; no table index is ever computed from secret data.
fn select_comb(table: &[AffinePoint], digit: u8, grp: &Group) -> AffinePoint {
    let wanted = (digit & 0x7f) >> 1;
    let mut result = AffinePoint::IDENTITY;
    for (idx, candidate) in table.iter().enumerate() {
        let hit = (idx as u8).ct_eq(&wanted);
        result = AffinePoint::conditional_select(&result, candidate, hit);
    }
    let sign = Choice::from((digit >> 7) & 1);
    let negated_y = result.y.neg(&grp.p);
    result.y = FieldElement::conditional_select(&result.y, &negated_y, sign);
    result
}

/// Core comb loop: double-and-add over
/// the recoded digits, most significant tooth first, with an optional
/// Jacobian-coordinate randomization of the running accumulator right
/// after it's seeded from the table.
fn core_loop<R: CryptoRng + RngCore>(
    grp: &Group,
    table: &[AffinePoint],
    digits: &[u8],
    d: usize,
    mut rng: Option<&mut R>,
) -> Result<JacobianPoint> {
    let mut acc = JacobianPoint::from_affine(&select_comb(table, digits[d], grp));
    if let Some(ref mut rng) = rng {
        acc.randomize(rng, grp)?;
    }
    for i in (0..d).rev() {
        acc = acc.double(grp);
        let term = select_comb(table, digits[i], grp);
        acc = acc.add_mixed(&term, grp)?;
    }
    Ok(acc)
}

/// Driver: fixed-base constant-time scalar multiplication
/// `R = scalar * base`. `scalar` must be in `[0, N)`; `scalar == 0`
/// short-circuits to the point at infinity. Optionally randomizes the
/// accumulator for first-order DPA resistance, wired in here for key
/// generation's `Q <- d*G`.
pub fn mul_fixed<R: CryptoRng + RngCore>(
    grp: &Group,
    base: &AffinePoint,
    scalar: &Mpi,
    rng: Option<&mut R>,
) -> Result<AffinePoint> {
    if bool::from(scalar.is_zero()) {
        return Ok(AffinePoint::IDENTITY);
    }
    if !bool::from(grp.n.is_odd()) {
        // Every curve in this registry has an odd group order; this is a
        // closed-registry invariant, not caller input.
        return Err(Error::Internal);
    }

    let w = window_for_bits(grp.bits);
    let d = digit_count(grp.n.bit_length(), w);
    if d + 1 > MAX_DIGITS {
        return Err(Error::Internal);
    }
    let table_size = 1usize << (w - 1);
    if table_size > MAX_TABLE {
        return Err(Error::Internal);
    }

    let is_odd = scalar.is_odd();
    let n_minus_m = grp.n.sub(scalar);
    let mut big_m = Mpi::conditional_select(scalar, &n_minus_m, !is_odd);

    let mut digits = [0u8; MAX_DIGITS];
    comb_recode(&big_m, w, d, &mut digits);
    big_m.zeroize();

    let mut table = [AffinePoint::IDENTITY; MAX_TABLE];
    precompute_comb(grp, &JacobianPoint::from_affine(base), d, &mut table[..table_size])?;

    let result = core_loop(grp, &table[..table_size], &digits, d, rng);
    digits.zeroize();
    let mut acc = result?;
    // Undo the `m <-> N - m` substitution: `(N - m)*base = -m*base`
    // since `N*base = 0`, so negate iff the swap happened.
    crate::point::safe_invert_y(&mut acc.y, !is_odd, grp);

    acc.normalize(grp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CurveId;
    use rand_core::SeedableRng;

    fn p256() -> Group {
        Group::load(CurveId::Secp256r1).unwrap()
    }

    fn generator(grp: &Group) -> AffinePoint {
        AffinePoint::from_xy(grp.gx, grp.gy.unwrap())
    }

    #[test]
    fn comb_recode_digits_are_odd_past_index_zero() {
        let grp = p256();
        let w = window_for_bits(grp.bits);
        let d = digit_count(grp.n.bit_length(), w);
        let m = Mpi::from_u64(0xABCD_EF01);
        let mut digits = [0u8; MAX_DIGITS];
        comb_recode(&m, w, d, &mut digits);
        for digit in &digits[1..=d] {
            assert_eq!(digit & 1, 1, "K_i must be odd for i >= 1");
        }
    }

    #[test]
    fn mul_zero_is_identity() {
        let grp = p256();
        let g = generator(&grp);
        let r = mul_fixed::<rand_chacha::ChaCha20Rng>(&grp, &g, &Mpi::ZERO, None).unwrap();
        assert!(bool::from(r.is_identity()));
    }

    #[test]
    fn mul_one_is_the_point_itself() {
        let grp = p256();
        let g = generator(&grp);
        let r = mul_fixed::<rand_chacha::ChaCha20Rng>(&grp, &g, &Mpi::ONE, None).unwrap();
        assert!(bool::from(r.x.ct_eq(&g.x)));
        assert!(bool::from(r.y.ct_eq(&g.y)));
    }

    #[test]
    fn mul_two_matches_doubling() {
        let grp = p256();
        let g = generator(&grp);
        let doubled = JacobianPoint::from_affine(&g).double(&grp).normalize(&grp).unwrap();
        let r = mul_fixed::<rand_chacha::ChaCha20Rng>(&grp, &g, &Mpi::from_u64(2), None).unwrap();
        assert!(bool::from(r.x.ct_eq(&doubled.x)));
        assert!(bool::from(r.y.ct_eq(&doubled.y)));
    }

    #[test]
    fn mul_n_minus_one_is_negated_generator() {
        let grp = p256();
        let g = generator(&grp);
        let n_minus_one = grp.n.sub(&Mpi::ONE);
        let r = mul_fixed::<rand_chacha::ChaCha20Rng>(&grp, &g, &n_minus_one, None).unwrap();
        assert!(bool::from(r.x.ct_eq(&g.x)));
        assert!(bool::from(r.y.ct_eq(&g.y.neg(&grp.p))));
    }

    #[test]
    fn mul_with_randomization_agrees_with_unrandomized() {
        let grp = p256();
        let g = generator(&grp);
        let scalar = Mpi::from_u64(12345);
        let mut rng = rand_chacha::ChaCha20Rng::from_seed([3u8; 32]);
        let randomized = mul_fixed(&grp, &g, &scalar, Some(&mut rng)).unwrap();
        let plain = mul_fixed::<rand_chacha::ChaCha20Rng>(&grp, &g, &scalar, None).unwrap();
        assert!(bool::from(randomized.x.ct_eq(&plain.x)));
        assert!(bool::from(randomized.y.ct_eq(&plain.y)));
    }
}
