//! Projective x/z arithmetic and the Montgomery ladder, for
//! Curve25519-shaped curves (`v^2 = u^3 + A*u^2 + u`).
//!
//! `Y` never appears: only the `u`-coordinate crosses the wire (RFC 7748
//! §5), so this module carries `(X : Z)` pairs and the combined
//! double-and-add step from the standard EFD recipe (`A`, `AA`, `B`,
//! `BB`, `E`, `C`, `D`, `DA`, `CB`).

use crate::error::Result;
use crate::field::FieldElement;
use crate::group::Group;
use crate::mpi::Mpi;
use rand_core::{CryptoRng, RngCore};
use subtle::{Choice, ConditionallySelectable};

/// A projective `(X : Z)` pair; affine `u = X/Z`.
#[derive(Clone, Copy, Debug)]
struct Xz {
    x: FieldElement,
    z: FieldElement,
}

impl Xz {
    const INFINITY: Xz = Xz {
        x: FieldElement::ONE,
        z: FieldElement::ZERO,
    };
}

impl ConditionallySelectable for Xz {
    fn conditional_select(a: &Xz, b: &Xz, choice: Choice) -> Xz {
        Xz {
            x: FieldElement::conditional_select(&a.x, &b.x, choice),
            z: FieldElement::conditional_select(&a.z, &b.z, choice),
        }
    }
}

/// Constant-time conditional swap of two `(X : Z)` pairs, built from [`FieldElement::conditional_select`] rather than
/// branching on `choice` directly.
fn cswap(a: &mut Xz, b: &mut Xz, choice: Choice) {
    let new_a = Xz::conditional_select(a, b, choice);
    let new_b = Xz::conditional_select(b, a, choice);
    *a = new_a;
    *b = new_b;
}

/// Combined double-and-add step `(R, RP) <- (2R, R + RP)`, using the
/// base point's affine `u`-coordinate (`x1`) as the fixed
/// difference `X(P - Q) = P.X` the x-only addition formula needs. 5M +
/// 4S per the EFD recipe.
fn double_add_mxz(x1: &FieldElement, r: &mut Xz, rp: &mut Xz, a24: &FieldElement, p: &Mpi) {
    let a = r.x.add(&r.z, p);
    let aa = a.square(p);
    let b = r.x.sub(&r.z, p);
    let bb = b.square(p);
    let e = aa.sub(&bb, p);
    let c = rp.x.add(&rp.z, p);
    let d = rp.x.sub(&rp.z, p);
    let da = d.mul(&a, p);
    let cb = c.mul(&b, p);

    let new_rp_x = da.add(&cb, p).square(p);
    let new_rp_z = x1.mul(&da.sub(&cb, p).square(p), p);
    let new_r_x = aa.mul(&bb, p);
    let new_r_z = e.mul(&aa.add(&a24.mul(&e, p), p), p);

    r.x = new_r_x;
    r.z = new_r_z;
    rp.x = new_rp_x;
    rp.z = new_rp_z;
}

/// The Montgomery ladder: computes `scalar * x1` where `x1`
/// is the input point's `u`-coordinate, scanning `scalar` from its
/// `grp.bits`-th bit down to bit 0 so the number of ladder steps never
/// depends on `scalar`'s actual bit length. When `rng` is supplied, the
/// starting projective coordinates are blinded by a random nonzero field
/// element before the ladder runs, for DPA resistance.
pub fn ladder_mul<R: CryptoRng + RngCore>(
    grp: &Group,
    scalar: &Mpi,
    x1: FieldElement,
    rng: Option<&mut R>,
) -> Result<FieldElement> {
    let p = &grp.p;
    let a24 = grp.a24.expect("ladder_mul is only called for Montgomery groups");

    let mut r = Xz::INFINITY;
    let mut rp = Xz { x: x1, z: FieldElement::ONE };

    if let Some(rng) = rng {
        let blind = FieldElement::from_mpi_unchecked(Mpi::fill_random(rng, grp.bits));
        if !bool::from(blind.is_zero()) {
            rp.x = rp.x.mul(&blind, p);
            rp.z = rp.z.mul(&blind, p);
        }
    }

    for i in (0..grp.bits).rev() {
        let bit = scalar.bit(i);
        cswap(&mut r, &mut rp, bit);
        double_add_mxz(&x1, &mut r, &mut rp, &a24, p);
        cswap(&mut r, &mut rp, bit);
    }

    // RFC 7748's reference ladder returns 0 for a zero denominator
    // (e.g. a low-order input point) rather than erroring.
    match r.z.invert(p).into_option() {
        Some(zi) => Ok(r.x.mul(&zi, p)),
        None => Ok(FieldElement::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CurveId;
    use subtle::ConstantTimeEq;

    fn curve25519() -> Group {
        Group::load(CurveId::Curve25519).unwrap()
    }

    #[test]
    fn ladder_by_one_is_identity_map() {
        let grp = curve25519();
        let x1 = grp.gx;
        let r = ladder_mul::<rand_chacha::ChaCha20Rng>(&grp, &Mpi::ONE, x1, None).unwrap();
        assert!(bool::from(r.ct_eq(&x1)));
    }

    #[test]
    fn ladder_by_zero_is_zero() {
        let grp = curve25519();
        let x1 = grp.gx;
        let r = ladder_mul::<rand_chacha::ChaCha20Rng>(&grp, &Mpi::ZERO, x1, None).unwrap();
        assert!(bool::from(r.is_zero()));
    }

    #[test]
    fn ladder_is_commutative_for_shared_secrets() {
        let grp = curve25519();
        let d_a = Mpi::from_u64(0x1234_5678_9abc);
        let d_b = Mpi::from_u64(0x0fed_cba9_8765);

        let pub_a = ladder_mul::<rand_chacha::ChaCha20Rng>(&grp, &d_a, grp.gx, None).unwrap();
        let pub_b = ladder_mul::<rand_chacha::ChaCha20Rng>(&grp, &d_b, grp.gx, None).unwrap();

        let shared_from_a = ladder_mul::<rand_chacha::ChaCha20Rng>(&grp, &d_a, pub_b, None).unwrap();
        let shared_from_b = ladder_mul::<rand_chacha::ChaCha20Rng>(&grp, &d_b, pub_a, None).unwrap();

        assert!(bool::from(shared_from_a.ct_eq(&shared_from_b)));
    }
}
