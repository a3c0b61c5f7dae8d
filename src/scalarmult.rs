//! General-dispatch scalar multiplication: picks comb or ladder by curve
//! type, and a non-constant-time double multiplication for signature
//! verification's public combination `m*G + n*Q`.

use crate::comb;
use crate::error::{Error, Result};
use crate::field::FieldElement;
use crate::group::Group;
use crate::mpi::Mpi;
use crate::montgomery;
use crate::point::{AffinePoint, JacobianPoint};
use crate::registry::CurveType;
use rand_core::{CryptoRng, RngCore};

/// A point in whichever coordinate system matches the curve: affine
/// `(x, y)` for short Weierstrass, or a bare `u`-coordinate for
/// Montgomery curves, whose `Y` is irrelevant on the wire.
#[derive(Clone, Copy, Debug)]
pub enum Point {
    /// Short Weierstrass affine point.
    Weierstrass(AffinePoint),
    /// Montgomery `u`-coordinate.
    Montgomery(FieldElement),
}

impl Point {
    /// The curve's base point `G`.
    pub fn generator(grp: &Group) -> Point {
        match grp.curve_type {
            CurveType::ShortWeierstrass => {
                Point::Weierstrass(AffinePoint::from_xy(grp.gx, grp.gy.expect("short Weierstrass group has G.y")))
            }
            CurveType::Montgomery => Point::Montgomery(grp.gx),
        }
    }

    fn as_weierstrass(&self) -> Result<AffinePoint> {
        match self {
            Point::Weierstrass(p) => Ok(*p),
            Point::Montgomery(_) => Err(Error::Invalid),
        }
    }

    fn as_montgomery(&self) -> Result<FieldElement> {
        match self {
            Point::Montgomery(u) => Ok(*u),
            Point::Weierstrass(_) => Err(Error::Invalid),
        }
    }
}

/// Constant-time scalar multiplication `R = scalar * base`, dispatching
/// exhaustively on [`CurveType`] so a third curve form would fail to
/// compile rather than silently falling through.
pub fn mul<R: CryptoRng + RngCore>(
    grp: &Group,
    scalar: &Mpi,
    base: &Point,
    rng: Option<&mut R>,
) -> Result<Point> {
    match grp.curve_type {
        CurveType::ShortWeierstrass => {
            let affine = base.as_weierstrass()?;
            Ok(Point::Weierstrass(comb::mul_fixed(grp, &affine, scalar, rng)?))
        }
        CurveType::Montgomery => {
            let u = base.as_montgomery()?;
            Ok(Point::Montgomery(montgomery::ladder_mul(grp, scalar, u, rng)?))
        }
    }
}

/// Scalar multiplication with the generator as the base point. A thin
/// wrapper over [`mul`]: some comb implementations exploit a
/// process-wide cached comb table for this case; this crate doesn't
/// cache (see DESIGN.md), so it's mechanically identical to calling
/// [`mul`] with `base = G`.
pub fn mul_g<R: CryptoRng + RngCore>(grp: &Group, scalar: &Mpi, rng: Option<&mut R>) -> Result<Point> {
    mul(grp, scalar, &Point::generator(grp), rng)
}

/// Computes `m*G + n*Q` for short Weierstrass curves. **Not
/// constant-time**: callers must not pass
/// secret scalars here; this is the public-key combination signature
/// verification needs, where `m` and `n` are derived from a public
/// signature and hash, never from a private key.
pub fn muladd(grp: &Group, m: &Mpi, n: &Mpi, q: &AffinePoint) -> Result<AffinePoint> {
    if grp.curve_type != CurveType::ShortWeierstrass {
        return Err(Error::FeatureUnavailable);
    }

    let g = AffinePoint::from_xy(grp.gx, grp.gy.expect("short Weierstrass group has G.y"));

    let term_m = scalar_mul_vartime(grp, m, &g)?;
    let term_n = scalar_mul_vartime(grp, n, q)?;

    let sum = JacobianPoint::from_affine(&term_m).add_mixed(&term_n, grp)?;
    sum.normalize(grp)
}

/// Variable-time double-and-add, used only by [`muladd`] on public
/// scalars. Shortcuts `m \in {1, N-1}`; `m == 0` yields the point at
/// infinity.
fn scalar_mul_vartime(grp: &Group, scalar: &Mpi, base: &AffinePoint) -> Result<AffinePoint> {
    if bool::from(scalar.is_zero()) {
        return Ok(AffinePoint::IDENTITY);
    }
    if scalar.cmp_vartime(&Mpi::ONE) == core::cmp::Ordering::Equal {
        return Ok(*base);
    }
    let n_minus_one = grp.n.sub(&Mpi::ONE);
    if scalar.cmp_vartime(&n_minus_one) == core::cmp::Ordering::Equal {
        return Ok(AffinePoint::from_xy(base.x, base.y.neg(&grp.p)));
    }

    let mut acc = JacobianPoint::IDENTITY;
    for i in (0..scalar.bit_length()).rev() {
        acc = acc.double(grp);
        if bool::from(scalar.bit(i)) {
            acc = acc.add_mixed(base, grp)?;
        }
    }
    acc.normalize(grp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CurveId;

    #[test]
    fn mul_g_matches_mul_with_explicit_generator() {
        let grp = Group::load(CurveId::Secp256r1).unwrap();
        let scalar = Mpi::from_u64(999_983);
        let via_mul_g = mul_g::<rand_chacha::ChaCha20Rng>(&grp, &scalar, None).unwrap();
        let via_mul = mul::<rand_chacha::ChaCha20Rng>(&grp, &scalar, &Point::generator(&grp), None).unwrap();
        match (via_mul_g, via_mul) {
            (Point::Weierstrass(a), Point::Weierstrass(b)) => {
                use subtle::ConstantTimeEq;
                assert!(bool::from(a.x.ct_eq(&b.x)));
                assert!(bool::from(a.y.ct_eq(&b.y)));
            }
            _ => panic!("expected Weierstrass points"),
        }
    }

    #[test]
    fn muladd_with_n_zero_matches_mul_g() {
        let grp = Group::load(CurveId::Secp256r1).unwrap();
        let m = Mpi::from_u64(42);
        let g = AffinePoint::from_xy(grp.gx, grp.gy.unwrap());
        let via_muladd = muladd(&grp, &m, &Mpi::ZERO, &g).unwrap();
        let via_mul = mul_g::<rand_chacha::ChaCha20Rng>(&grp, &m, None).unwrap();
        match via_mul {
            Point::Weierstrass(p) => {
                use subtle::ConstantTimeEq;
                assert!(bool::from(p.x.ct_eq(&via_muladd.x)));
                assert!(bool::from(p.y.ct_eq(&via_muladd.y)));
            }
            _ => panic!("expected Weierstrass point"),
        }
    }

    #[test]
    fn muladd_rejects_montgomery_groups() {
        let grp = Group::load(CurveId::Curve25519).unwrap();
        let dummy = AffinePoint::from_xy(grp.gx, grp.gx);
        assert_eq!(
            muladd(&grp, &Mpi::ONE, &Mpi::ONE, &dummy).unwrap_err(),
            Error::FeatureUnavailable
        );
    }
}
