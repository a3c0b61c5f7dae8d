//! Property-based group-law checks: distributivity, scalar-multiplication
//! composition, the group order annihilating every point, round-trip wire
//! encoding, and randomization's projective invariance.

use ecp_core::group::Group;
use ecp_core::keys;
use ecp_core::mpi::Mpi;
use ecp_core::point::{AffinePoint, JacobianPoint};
use ecp_core::registry::CurveId;
use ecp_core::scalarmult::{self, Point};
use ecp_core::{codec, error::Error};
use proptest::prelude::*;
use subtle::ConstantTimeEq;

fn weierstrass_curves() -> [CurveId; 2] {
    [CurveId::Secp256r1, CurveId::Secp384r1]
}

fn generator_point(grp: &Group) -> Point {
    Point::generator(grp)
}

fn affine(point: Point) -> AffinePoint {
    match point {
        Point::Weierstrass(p) => p,
        Point::Montgomery(_) => panic!("expected a Weierstrass point"),
    }
}

fn assert_points_eq(a: &AffinePoint, b: &AffinePoint) {
    assert!(bool::from(a.x.ct_eq(&b.x)));
    assert!(bool::from(a.y.ct_eq(&b.y)));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// `(m + n)*G == m*G + n*G` over the prime-order subgroup.
    #[test]
    fn scalar_addition_distributes_over_point_addition(m in any::<u64>(), n in any::<u64>()) {
        for id in weierstrass_curves() {
            let grp = Group::load(id).unwrap();
            let m = Mpi::from_u64(m);
            let n = Mpi::from_u64(n);
            let sum = m.add_mod(&n, &grp.n);

            let lhs = affine(scalarmult::mul_g::<rand_chacha::ChaCha20Rng>(&grp, &sum, None).unwrap());

            let m_p = affine(scalarmult::mul_g::<rand_chacha::ChaCha20Rng>(&grp, &m, None).unwrap());
            let n_p = affine(scalarmult::mul_g::<rand_chacha::ChaCha20Rng>(&grp, &n, None).unwrap());
            let rhs = JacobianPoint::from_affine(&m_p)
                .add_mixed(&n_p, &grp)
                .unwrap()
                .normalize(&grp)
                .unwrap();

            assert_points_eq(&lhs, &rhs);
        }
    }

    /// `m*(n*G) == (m*n mod N)*G`.
    #[test]
    fn scalar_multiplication_composes(m in 1u64..5000, n in 1u64..5000) {
        for id in weierstrass_curves() {
            let grp = Group::load(id).unwrap();
            let m = Mpi::from_u64(m);
            let n = Mpi::from_u64(n);
            let mn = m.mul_mod(&n, &grp.n);

            let lhs = affine(scalarmult::mul_g::<rand_chacha::ChaCha20Rng>(&grp, &mn, None).unwrap());

            let n_g = generator_point(&grp);
            let inner = scalarmult::mul::<rand_chacha::ChaCha20Rng>(&grp, &n, &n_g, None).unwrap();
            let rhs = affine(scalarmult::mul::<rand_chacha::ChaCha20Rng>(&grp, &m, &inner, None).unwrap());

            assert_points_eq(&lhs, &rhs);
        }
    }

    /// Generated public keys always satisfy `check_pubkey`.
    #[test]
    fn generated_public_keys_validate(seed in any::<u64>()) {
        for id in [CurveId::Secp256r1, CurveId::Secp384r1, CurveId::Curve25519] {
            let grp = Group::load(id).unwrap();
            let mut rng = seeded_rng(seed);
            let kp = keys::generate(&grp, &mut rng).unwrap();
            keys::check_pubkey(&grp, &kp.public).unwrap();
        }
    }

    /// SEC1 point round-trip: `read(write(P)) == P` for any generated point.
    #[test]
    fn sec1_roundtrip_recovers_the_point(scalar in any::<u64>()) {
        let grp = Group::load(CurveId::Secp256r1).unwrap();
        let scalar = Mpi::from_u64(scalar);
        let p = scalarmult::mul_g::<rand_chacha::ChaCha20Rng>(&grp, &scalar, None).unwrap();

        let mut buf = [0u8; 65];
        let len = codec::write_sec1_point(&grp, &p, &mut buf).unwrap();
        let decoded = codec::read_sec1_point(&grp, &buf[..len]).unwrap();

        assert_points_eq(&affine(p), &affine(decoded));
    }

    /// Jacobian-coordinate randomization never changes the normalized point.
    #[test]
    fn randomize_is_projectively_invariant(scalar in any::<u64>(), seed in any::<u64>()) {
        let grp = Group::load(CurveId::Secp256r1).unwrap();
        let scalar = Mpi::from_u64(scalar.max(1));
        let base = affine(scalarmult::mul_g::<rand_chacha::ChaCha20Rng>(&grp, &scalar, None).unwrap());

        let mut jacobian = JacobianPoint::from_affine(&base);
        let before = jacobian.normalize(&grp).unwrap();

        let mut rng = seeded_rng(seed);
        jacobian.randomize(&mut rng, &grp).unwrap();
        let after = jacobian.normalize(&grp).unwrap();

        assert_points_eq(&before, &after);
    }
}

fn seeded_rng(seed: u64) -> rand_chacha::ChaCha20Rng {
    use rand_core::SeedableRng;
    let mut bytes = [0u8; 32];
    bytes[..8].copy_from_slice(&seed.to_le_bytes());
    rand_chacha::ChaCha20Rng::from_seed(bytes)
}

#[test]
fn group_order_annihilates_the_generator() {
    let grp = Group::load(CurveId::Secp256r1).unwrap();
    let r = scalarmult::mul_g::<rand_chacha::ChaCha20Rng>(&grp, &grp.n, None).unwrap();
    match r {
        Point::Weierstrass(p) => assert!(bool::from(p.is_identity())),
        Point::Montgomery(_) => panic!("expected a Weierstrass point"),
    }
}

#[test]
fn infinity_round_trips_through_sec1() {
    let grp = Group::load(CurveId::Secp256r1).unwrap();
    let infinity = Point::Weierstrass(AffinePoint::IDENTITY);
    let mut buf = [0u8; 65];
    let len = codec::write_sec1_point(&grp, &infinity, &mut buf).unwrap();
    assert_eq!(&buf[..len], &[0x00]);
    let decoded = codec::read_sec1_point(&grp, &buf[..len]).unwrap();
    match decoded {
        Point::Weierstrass(p) => assert!(bool::from(p.is_identity())),
        Point::Montgomery(_) => panic!("expected a Weierstrass point"),
    }
}

#[test]
fn off_curve_point_is_rejected() {
    let grp = Group::load(CurveId::Secp256r1).unwrap();
    let off_curve = AffinePoint::from_xy(grp.gx, grp.gx);
    assert_eq!(off_curve.check_on_curve(&grp).unwrap_err(), Error::Invalid);
}
