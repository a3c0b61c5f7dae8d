//! Per-curve immutable parameter records.
//!
//! Groups are process-wide constants: [`Group::load`] builds one from
//! fixed constants on every call, and the result is `Copy`, so callers
//! hold it the same way the source holds a pointer to a static descriptor,
//! borrowed read-only for the lifetime of an operation, never mutated.

use crate::error::Result;
use crate::field::FieldElement;
use crate::mpi::Mpi;
use crate::registry::{CurveId, CurveType};
use hex_literal::hex;

/// Full parameter set for one curve.
#[derive(Copy, Clone, Debug)]
pub struct Group {
    /// Internal identifier.
    pub id: CurveId,
    /// Short Weierstrass vs. Montgomery.
    pub curve_type: CurveType,
    /// `⌈log2 p⌉`.
    pub bits: usize,
    /// Field modulus.
    pub p: Mpi,
    /// Curve coefficient `a`. `None` signals `a == -3 mod p`, the NIST
    /// convention that triggers the fast doubling path. Always `None` for
    /// Montgomery curves (their `A` lives in [`Group::a24`] instead).
    pub a: Option<FieldElement>,
    /// Curve coefficient `b` (short Weierstrass only; `ZERO` and unused
    /// for Montgomery curves).
    pub b: FieldElement,
    /// Generator's `x`/`u` coordinate.
    pub gx: FieldElement,
    /// Generator's `y` coordinate. `None` marks a Montgomery curve. This
    /// crate keeps an explicit [`CurveType`] tag rather than inferring the
    /// curve form from this field's presence, so `match`es stay
    /// exhaustive; see DESIGN.md.
    pub gy: Option<FieldElement>,
    /// Order of the generator's subgroup.
    pub n: Mpi,
    /// Cofactor.
    pub cofactor: u32,
    /// `(A - 2) / 4`, precomputed for the Montgomery ladder's
    /// `double_add` step. `None` for short Weierstrass curves.
    pub a24: Option<FieldElement>,
}

impl Group {
    /// Loads the fixed parameter set (`P`/`A`/`B`/`G`/`N`) for `id`.
    pub fn load(id: CurveId) -> Result<Group> {
        match id {
            CurveId::Secp256r1 => Ok(secp256r1()),
            CurveId::Secp384r1 => Ok(secp384r1()),
            CurveId::Curve25519 => Ok(curve25519()),
        }
    }

    /// `true` iff this group uses short Weierstrass (Jacobian) arithmetic.
    pub fn is_short_weierstrass(&self) -> bool {
        matches!(self.curve_type, CurveType::ShortWeierstrass)
    }
}

fn fe(bytes: [u8; 48]) -> FieldElement {
    FieldElement::from_mpi_unchecked(Mpi::from_be_bytes(&bytes).expect("48 bytes fits in Mpi"))
}

fn fe32(bytes: [u8; 32]) -> FieldElement {
    FieldElement::from_mpi_unchecked(Mpi::from_be_bytes(&bytes).expect("32 bytes fits in Mpi"))
}

fn mpi48(bytes: [u8; 48]) -> Mpi {
    Mpi::from_be_bytes(&bytes).expect("48 bytes fits in Mpi")
}

fn mpi32(bytes: [u8; 32]) -> Mpi {
    Mpi::from_be_bytes(&bytes).expect("32 bytes fits in Mpi")
}

/// NIST P-256 / secp256r1 (FIPS 186-4, SEC 2 §2.4.2).
fn secp256r1() -> Group {
    const P: [u8; 32] =
        hex!("ffffffff00000001000000000000000000000000ffffffffffffffffffffffff");
    const B: [u8; 32] =
        hex!("5ac635d8aa3a93e7b3ebbd55769886bc651d06b0cc53b0f63bce3c3e27d2604b");
    const GX: [u8; 32] =
        hex!("6b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296");
    const GY: [u8; 32] =
        hex!("4fe342e2fe1a7f9b8ee7eb4a7c0f9e162bce33576b315ececbb6406837bf51f5");
    const N: [u8; 32] =
        hex!("ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551");

    Group {
        id: CurveId::Secp256r1,
        curve_type: CurveType::ShortWeierstrass,
        bits: 256,
        p: mpi32(P),
        a: None, // a == -3 mod p
        b: fe32(B),
        gx: fe32(GX),
        gy: Some(fe32(GY)),
        n: mpi32(N),
        cofactor: 1,
        a24: None,
    }
}

/// NIST P-384 / secp384r1 (FIPS 186-4 §D.1.2.4).
fn secp384r1() -> Group {
    const P: [u8; 48] = hex!(
        "fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffe\
         ffffffff0000000000000000ffffffff"
    );
    const B: [u8; 48] = hex!(
        "b3312fa7e23ee7e4988e056be3f82d19181d9c6efe8141120314088f5013875\
         ac656398d8a2ed19d2a85c8edd3ec2aef"
    );
    const GX: [u8; 48] = hex!(
        "aa87ca22be8b05378eb1c71ef320ad746e1d3b628ba79b9859f741e082542a3\
         85502f25dbf55296c3a545e3872760ab7"
    );
    const GY: [u8; 48] = hex!(
        "3617de4a96262c6f5d9e98bf9292dc29f8f41dbd289a147ce9da3113b5f0b8c\
         00a60b1ce1d7e819d7a431d7c90ea0e5f"
    );
    const N: [u8; 48] = hex!(
        "ffffffffffffffffffffffffffffffffffffffffffffffffc7634d81f4372d\
         df581a0db248b0a77aecec196accc52973"
    );

    Group {
        id: CurveId::Secp384r1,
        curve_type: CurveType::ShortWeierstrass,
        bits: 384,
        p: mpi48(P),
        a: None, // a == -3 mod p
        b: fe(B),
        gx: fe(GX),
        gy: Some(fe(GY)),
        n: mpi48(N),
        cofactor: 1,
        a24: None,
    }
}

/// Curve25519 (RFC 7748 §4.1), the Montgomery-form extension point. `N`
/// is the order of the base point's prime-order subgroup; private-key
/// validation never compares a Montgomery scalar against it directly
/// (clamping replaces the range check), but it is carried for interface
/// completeness with the Weierstrass groups and any future subgroup checks.
fn curve25519() -> Group {
    const P: [u8; 32] =
        hex!("7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffed");
    const GX: [u8; 32] =
        hex!("0000000000000000000000000000000000000000000000000000000000000009");
    const N: [u8; 32] =
        hex!("1000000000000000000000000000000014def9dea2f79cd65812631a5cf5d3ed");
    const A24: u64 = 121_665; // (486662 - 2) / 4

    Group {
        id: CurveId::Curve25519,
        curve_type: CurveType::Montgomery,
        bits: 255,
        p: mpi32(P),
        a: None,
        b: FieldElement::ZERO,
        gx: fe32(GX),
        gy: None,
        n: mpi32(N),
        cofactor: 8,
        a24: Some(FieldElement::from_mpi_unchecked(Mpi::from_u64(A24))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_all_preset_curves() {
        for &id in crate::registry::PRESET_CURVES {
            let grp = Group::load(id).unwrap();
            assert_eq!(grp.id, id);
        }
    }

    #[test]
    fn weierstrass_curves_flag_a_minus_3() {
        assert!(secp256r1().a.is_none());
        assert!(secp384r1().a.is_none());
    }

    #[test]
    fn montgomery_curve_has_a24_not_gy() {
        let grp = curve25519();
        assert!(grp.gy.is_none());
        assert!(grp.a24.is_some());
    }
}
