//! Jacobian point arithmetic for short Weierstrass curves.
//!
//! A [`JacobianPoint`] is the triple `(X, Y, Z)`: affine iff `Z == 1`, the
//! point at infinity iff `Z == 0` (with `X`/`Y` pinned to `(1, 1)` so they
//! remain valid field elements rather than uninitialized or sentinel
//! values). Mixed addition takes an [`AffinePoint`] operand whose `Z` is
//! implicitly 1, the compact encoding a precomputed point table uses.
//!
//! Structural branches on public point state (is this input the point at
//! infinity? did the table lookup's difference term vanish?) use ordinary
//! `if`, matching how the underlying formulas are normally written. Only
//! the operations that touch secret data directly (recoding, table
//! select, safe-invert, the ladder's swap, and the MPI conditional
//! primitives) are required to be branch-free; see [`crate::comb`] and
//! [`crate::montgomery`] for those.

use crate::error::{Error, Result};
use crate::field::FieldElement;
use crate::group::Group;
use crate::mpi::Mpi;
use rand_core::{CryptoRng, RngCore};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// Largest point table this crate ever batch-normalizes at once: the
/// comb table's `2^(w-1)` entries, `w <= 6` (the widest window used, for
/// Secp384r1's comb table).
pub(crate) const BATCH_SCRATCH: usize = 32;

/// A point in Jacobian coordinates, or the point at infinity (`Z == 0`).
#[derive(Clone, Copy, Debug)]
pub struct JacobianPoint {
    pub(crate) x: FieldElement,
    pub(crate) y: FieldElement,
    pub(crate) z: FieldElement,
}

impl JacobianPoint {
    /// The point at infinity: `(1, 1, 0)`.
    pub const IDENTITY: JacobianPoint = JacobianPoint {
        x: FieldElement::ONE,
        y: FieldElement::ONE,
        z: FieldElement::ZERO,
    };

    /// Lifts an affine point into Jacobian coordinates (`Z = 1`), or
    /// `IDENTITY` if the affine point is itself the point at infinity.
    pub fn from_affine(p: &AffinePoint) -> JacobianPoint {
        if bool::from(p.is_identity()) {
            JacobianPoint::IDENTITY
        } else {
            JacobianPoint {
                x: p.x,
                y: p.y,
                z: FieldElement::ONE,
            }
        }
    }

    /// `true` iff this is the point at infinity.
    pub fn is_identity(&self) -> Choice {
        self.z.is_zero()
    }

    /// Point doubling, formula "dbl-1998-cmo-2".
    ///
    /// Takes the fast path (`M = 3(X+Z^2)(X-Z^2)`) when the curve's `a`
    /// is the NIST `-3` convention (`grp.a == None`); otherwise the
    /// generic `M = 3X^2 + A*Z^4`.
    pub fn double(&self, grp: &Group) -> JacobianPoint {
        let p = &grp.p;
        if bool::from(self.is_identity()) {
            return *self;
        }

        let zz = self.z.square(p);
        let m = match grp.a {
            None => {
                let t1 = self.x.add(&zz, p);
                let t2 = self.x.sub(&zz, p);
                t1.mul(&t2, p).mul_small(3, p)
            }
            Some(a) => {
                let xx = self.x.square(p);
                let zzzz = zz.square(p);
                xx.mul_small(3, p).add(&a.mul(&zzzz, p), p)
            }
        };

        let y2 = self.y.square(p);
        let s = self.x.mul(&y2, p).mul_small(4, p);
        let u = y2.square(p).mul_small(8, p);
        let t = m.square(p).sub(&s.double(p), p);

        let r_x = t;
        let r_y = m.mul(&s.sub(&t, p), p).sub(&u, p);
        let r_z = self.y.mul(&self.z, p).mul_small(2, p);

        JacobianPoint {
            x: r_x,
            y: r_y,
            z: r_z,
        }
    }

    /// Mixed addition `R = P + Q`, `Q` affine.
    ///
    /// Delegates to [`JacobianPoint::double`] when `Q == P`, returns the
    /// point at infinity when `Q == -P`, and otherwise applies the
    /// standard Jacobian mixed-addition formula. A `P.Z == 1` fast path
    /// is skipped as an optimization-only simplification: the generic
    /// formula below is correct for any `P.Z`, including 1 (see
    /// DESIGN.md).
    pub fn add_mixed(&self, q: &AffinePoint, grp: &Group) -> Result<JacobianPoint> {
        let p = &grp.p;

        if bool::from(self.is_identity()) {
            return Ok(JacobianPoint::from_affine(q));
        }
        if bool::from(q.is_identity()) {
            return Ok(*self);
        }

        let zz = self.z.square(p);
        let zzz = zz.mul(&self.z, p);
        let t1 = zz.mul(&q.x, p).sub(&self.x, p);
        let t2 = zzz.mul(&q.y, p).sub(&self.y, p);

        if bool::from(t1.is_zero()) {
            if bool::from(t2.is_zero()) {
                return Ok(self.double(grp));
            }
            return Ok(JacobianPoint::IDENTITY);
        }

        let t1_sq = t1.square(p);
        let t1_cu = t1_sq.mul(&t1, p);
        let x1_t1sq = self.x.mul(&t1_sq, p);

        let r_z = self.z.mul(&t1, p);
        let r_x = t2.square(p).sub(&x1_t1sq.mul_small(2, p), p).sub(&t1_cu, p);
        let r_y = t2
            .mul(&x1_t1sq.sub(&r_x, p), p)
            .sub(&self.y.mul(&t1_cu, p), p);

        Ok(JacobianPoint {
            x: r_x,
            y: r_y,
            z: r_z,
        })
    }

    /// Converts to affine coordinates via a single modular inversion.
    /// The point at infinity normalizes to [`AffinePoint::IDENTITY`]
    /// without performing an inversion.
    pub fn normalize(&self, grp: &Group) -> Result<AffinePoint> {
        let p = &grp.p;
        if bool::from(self.is_identity()) {
            return Ok(AffinePoint::IDENTITY);
        }
        let zi = self.z.invert(p).into_option().ok_or(Error::Invalid)?;
        let zi2 = zi.square(p);
        let zi3 = zi2.mul(&zi, p);
        Ok(AffinePoint {
            x: self.x.mul(&zi2, p),
            y: self.y.mul(&zi3, p),
            infinity: 0,
        })
    }

    /// `l^2*X, l^3*Y, l*Z` for a random `l`, defeating first-order DPA by
    /// re-randomizing the projective representative of the same affine
    /// point. Retries while `l <= 1`, bounded to 10 attempts before
    /// [`Error::RandomFailed`].
    pub fn randomize<R: CryptoRng + RngCore>(&mut self, rng: &mut R, grp: &Group) -> Result<()> {
        let p = &grp.p;
        for _ in 0..10 {
            let candidate = Mpi::fill_random(rng, grp.bits);
            if bool::from(candidate.ct_lt_public(&Mpi::from_u64(2))) {
                continue; // l <= 1
            }
            if !bool::from(candidate.ct_lt_public(p)) {
                continue; // keep l a reduced field element
            }
            let l = FieldElement::from_mpi_unchecked(candidate);
            let l2 = l.square(p);
            let l3 = l2.mul(&l, p);
            self.x = self.x.mul(&l2, p);
            self.y = self.y.mul(&l3, p);
            self.z = self.z.mul(&l, p);
            return Ok(());
        }
        Err(Error::RandomFailed)
    }

    /// Assuming `self.z == 1` (true of every comb-table entry and every
    /// point just returned by [`normalize_many_indexed`]), reads off the
    /// affine coordinates without an inversion.
    pub(crate) fn as_affine_unit_z(&self) -> AffinePoint {
        AffinePoint {
            x: self.x,
            y: self.y,
            infinity: 0,
        }
    }
}

impl ConditionallySelectable for JacobianPoint {
    fn conditional_select(a: &JacobianPoint, b: &JacobianPoint, choice: Choice) -> JacobianPoint {
        JacobianPoint {
            x: FieldElement::conditional_select(&a.x, &b.x, choice),
            y: FieldElement::conditional_select(&a.y, &b.y, choice),
            z: FieldElement::conditional_select(&a.z, &b.z, choice),
        }
    }
}

/// A point in affine coordinates, or the point at infinity.
///
/// `infinity` mirrors `AffinePoint<C>` in `primeorder/src/affine.rs`: a
/// `u8` rather than a `bool`/`Choice` so `IDENTITY` stays a `const`.
#[derive(Clone, Copy, Debug)]
pub struct AffinePoint {
    pub x: FieldElement,
    pub y: FieldElement,
    pub(crate) infinity: u8,
}

impl AffinePoint {
    /// The point at infinity.
    pub const IDENTITY: AffinePoint = AffinePoint {
        x: FieldElement::ZERO,
        y: FieldElement::ZERO,
        infinity: 1,
    };

    /// Builds a finite affine point from its coordinates.
    pub const fn from_xy(x: FieldElement, y: FieldElement) -> AffinePoint {
        AffinePoint { x, y, infinity: 0 }
    }

    /// `true` iff this is the point at infinity.
    pub fn is_identity(&self) -> Choice {
        Choice::from(self.infinity)
    }

    /// Public-key validation for short Weierstrass curves: checks
    /// `X, Y \in [0, P)` (already guaranteed by [`FieldElement`]'s
    /// invariant once constructed via [`FieldElement::from_be_bytes`])
    /// and `Y^2 == X^3 + A*X + B (mod P)`. No subgroup check: every NIST
    /// curve here has cofactor 1, so curve membership already implies
    /// subgroup membership.
    pub fn check_on_curve(&self, grp: &Group) -> Result<()> {
        if bool::from(self.is_identity()) {
            return Err(Error::Invalid);
        }
        let p = &grp.p;
        let lhs = self.y.square(p);
        let mut rhs = self.x.square(p).mul(&self.x, p);
        match grp.a {
            None => {
                let three_x = self.x.mul_small(3, p);
                rhs = rhs.sub(&three_x, p);
            }
            Some(a) => {
                rhs = rhs.add(&a.mul(&self.x, p), p);
            }
        }
        rhs = rhs.add(&grp.b, p);
        if bool::from(lhs.ct_eq(&rhs)) {
            Ok(())
        } else {
            Err(Error::Invalid)
        }
    }
}

impl ConditionallySelectable for AffinePoint {
    fn conditional_select(a: &AffinePoint, b: &AffinePoint, choice: Choice) -> AffinePoint {
        AffinePoint {
            x: FieldElement::conditional_select(&a.x, &b.x, choice),
            y: FieldElement::conditional_select(&a.y, &b.y, choice),
            infinity: u8::conditional_select(&a.infinity, &b.infinity, choice),
        }
    }
}

/// Batch-normalizes the Jacobian points at `indices` within `points`
/// using a single modular inversion (the Montgomery trick): prefix
/// products `c[k] = Z_{i0}*...*Z_{ik}`, invert `c[last]`, then walk back
/// recovering each `Z_ik^-1`.
///
/// Fails with [`Error::Invalid`] if any indexed point is the point at
/// infinity: the comb precompute's choice of window guarantees this
/// can't happen for its own callers, but the check costs nothing and
/// turns a would-be silent wrong answer into an error.
pub(crate) fn normalize_many_indexed(
    points: &mut [JacobianPoint],
    indices: &[usize],
    grp: &Group,
) -> Result<()> {
    let p = &grp.p;
    let t = indices.len();
    if t == 0 {
        return Ok(());
    }
    if t > BATCH_SCRATCH {
        return Err(Error::Internal);
    }

    let mut prefix = [FieldElement::ONE; BATCH_SCRATCH];
    prefix[0] = points[indices[0]].z;
    if bool::from(prefix[0].is_zero()) {
        return Err(Error::Invalid);
    }
    for k in 1..t {
        let zk = points[indices[k]].z;
        if bool::from(zk.is_zero()) {
            return Err(Error::Invalid);
        }
        prefix[k] = prefix[k - 1].mul(&zk, p);
    }

    let mut acc = prefix[t - 1].invert(p).into_option().ok_or(Error::Invalid)?;
    for k in (0..t).rev() {
        let idx = indices[k];
        let zi = if k == 0 {
            acc
        } else {
            acc.mul(&prefix[k - 1], p)
        };
        if k > 0 {
            acc = acc.mul(&points[idx].z, p);
        }
        let zi2 = zi.square(p);
        let zi3 = zi2.mul(&zi, p);
        points[idx].x = points[idx].x.mul(&zi2, p);
        points[idx].y = points[idx].y.mul(&zi3, p);
        points[idx].z = FieldElement::ONE;
    }
    Ok(())
}

/// Conditionally negates `y` (a "safe-invert"): replaces it with
/// `P - y` when `mask` is set *and* `y != 0`, via constant-time
/// conditional-select, never branching on `mask`.
pub(crate) fn safe_invert_y(y: &mut FieldElement, mask: Choice, grp: &Group) {
    let negated = y.neg(&grp.p);
    let flip = mask & !y.is_zero();
    *y = FieldElement::conditional_select(y, &negated, flip);
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
    fn double_then_normalize_is_on_curve() {
        let grp = p256();
        let g = JacobianPoint::from_affine(&generator(&grp));
        let doubled = g.double(&grp);
        let affine = doubled.normalize(&grp).unwrap();
        affine.check_on_curve(&grp).unwrap();
    }

    #[test]
    fn add_mixed_generator_to_itself_matches_double() {
        let grp = p256();
        let g_affine = generator(&grp);
        let g = JacobianPoint::from_affine(&g_affine);
        let doubled = g.double(&grp).normalize(&grp).unwrap();
        let added = g.add_mixed(&g_affine, &grp).unwrap().normalize(&grp).unwrap();
        assert!(bool::from(doubled.x.ct_eq(&added.x)));
        assert!(bool::from(doubled.y.ct_eq(&added.y)));
    }

    #[test]
    fn add_mixed_point_and_its_negation_is_identity() {
        let grp = p256();
        let g_affine = generator(&grp);
        let g = JacobianPoint::from_affine(&g_affine);
        let neg_g = AffinePoint::from_xy(g_affine.x, g_affine.y.neg(&grp.p));
        let sum = g.add_mixed(&neg_g, &grp).unwrap();
        assert!(bool::from(sum.is_identity()));
    }

    #[test]
    fn add_mixed_identity_operand_is_noop() {
        let grp = p256();
        let g_affine = generator(&grp);
        let g = JacobianPoint::from_affine(&g_affine);
        let sum = g.add_mixed(&AffinePoint::IDENTITY, &grp).unwrap();
        let normalized = sum.normalize(&grp).unwrap();
        assert!(bool::from(normalized.x.ct_eq(&g_affine.x)));
        assert!(bool::from(normalized.y.ct_eq(&g_affine.y)));
    }

    #[test]
    fn randomize_preserves_affine_projection() {
        let grp = p256();
        let g_affine = generator(&grp);
        let mut g = JacobianPoint::from_affine(&g_affine);
        let before = g.normalize(&grp).unwrap();
        let mut rng = rand_chacha::ChaCha20Rng::from_seed([7u8; 32]);
        g.randomize(&mut rng, &grp).unwrap();
        let after = g.normalize(&grp).unwrap();
        assert!(bool::from(before.x.ct_eq(&after.x)));
        assert!(bool::from(before.y.ct_eq(&after.y)));
    }

    #[test]
    fn normalize_many_matches_individual_normalize() {
        let grp = p256();
        let g_affine = generator(&grp);
        let g = JacobianPoint::from_affine(&g_affine);
        let mut points = [g.double(&grp), g.double(&grp).double(&grp)];
        let individually: [AffinePoint; 2] =
            [points[0].normalize(&grp).unwrap(), points[1].normalize(&grp).unwrap()];
        normalize_many_indexed(&mut points, &[0, 1], &grp).unwrap();
        for i in 0..2 {
            assert!(bool::from(points[i].x.ct_eq(&individually[i].x)));
            assert!(bool::from(points[i].y.ct_eq(&individually[i].y)));
        }
    }
}
