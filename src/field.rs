//! Field elements of `GF(p)`.
//!
//! A [`FieldElement`] is a bare [`Mpi`] plus the discipline that every
//! value handed back from an exported function is already reduced into
//! `[0, p)`: arithmetic here never returns a value that still needs a
//! caller-visible reduction pass.

use crate::error::{Error, Result};
use crate::mpi::Mpi;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};

#[cfg(feature = "serde")]
use serdect::serde::{de, ser, Deserialize, Serialize};

/// An element of `GF(p)` for whichever curve's modulus is supplied
/// alongside it. Curves in scope share one representation (`Mpi`) so the
/// registry can dispatch curve parameters at runtime instead of picking a
/// different compile-time field type per curve.
#[derive(Clone, Copy, Debug, Default)]
pub struct FieldElement(pub(crate) Mpi);

impl FieldElement {
    /// The additive identity.
    pub const ZERO: FieldElement = FieldElement(Mpi::ZERO);

    /// The multiplicative identity.
    pub const ONE: FieldElement = FieldElement(Mpi::ONE);

    /// Wraps a raw [`Mpi`], asserting the caller has already reduced it.
    pub const fn from_mpi_unchecked(value: Mpi) -> FieldElement {
        FieldElement(value)
    }

    /// Parses a big-endian coordinate and checks it falls in `[0, p)`,
    /// which public-key validation requires before the curve equation is
    /// even evaluated.
    pub fn from_be_bytes(bytes: &[u8], p: &Mpi) -> Result<FieldElement> {
        let value = Mpi::from_be_bytes(bytes).ok_or(Error::BadInputData)?;
        if bool::from(value.ct_lt_public(p)) {
            Ok(FieldElement(value))
        } else {
            Err(Error::BadInputData)
        }
    }

    /// Encodes the element as a fixed-width big-endian coordinate.
    pub fn write_be_bytes(&self, out: &mut [u8]) -> Result<()> {
        if self.0.write_be_bytes(out) {
            Ok(())
        } else {
            Err(Error::NoSpace)
        }
    }

    /// `self + rhs mod p`.
    pub fn add(&self, rhs: &FieldElement, p: &Mpi) -> FieldElement {
        FieldElement(self.0.add_mod(&rhs.0, p))
    }

    /// `2 * self mod p`.
    pub fn double(&self, p: &Mpi) -> FieldElement {
        self.add(self, p)
    }

    /// `self - rhs mod p`.
    pub fn sub(&self, rhs: &FieldElement, p: &Mpi) -> FieldElement {
        FieldElement(self.0.sub_mod(&rhs.0, p))
    }

    /// `-self mod p`.
    pub fn neg(&self, p: &Mpi) -> FieldElement {
        FieldElement(self.0.neg_mod(p))
    }

    /// `self * rhs mod p`.
    pub fn mul(&self, rhs: &FieldElement, p: &Mpi) -> FieldElement {
        FieldElement(self.0.mul_mod(&rhs.0, p))
    }

    /// `self^2 mod p`.
    pub fn square(&self, p: &Mpi) -> FieldElement {
        FieldElement(self.0.sqr_mod(p))
    }

    /// Multiplies by a small public constant (e.g. 3, 4, 8 in the
    /// doubling formula) via repeated addition.
    pub fn mul_small(&self, scalar: u32, p: &Mpi) -> FieldElement {
        let mut acc = FieldElement::ZERO;
        let mut base = *self;
        let mut n = scalar;
        while n > 0 {
            if n & 1 == 1 {
                acc = acc.add(&base, p);
            }
            base = base.double(p);
            n >>= 1;
        }
        acc
    }

    /// Modular inverse; `None` iff `self` is zero.
    pub fn invert(&self, p: &Mpi) -> CtOption<FieldElement> {
        self.0.invert(p).map(FieldElement)
    }

    /// `true` iff this is the additive identity.
    pub fn is_zero(&self) -> Choice {
        self.0.is_zero()
    }
}

impl ConstantTimeEq for FieldElement {
    fn ct_eq(&self, other: &FieldElement) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

impl ConditionallySelectable for FieldElement {
    fn conditional_select(a: &FieldElement, b: &FieldElement, choice: Choice) -> FieldElement {
        FieldElement(Mpi::conditional_select(&a.0, &b.0, choice))
    }
}

/// Serializes as the underlying [`Mpi`]'s fixed-width big-endian bytes.
/// A `FieldElement` doesn't carry its modulus, so deserialization can't
/// reject an out-of-range value here; callers that need that check
/// should route decoded coordinates through [`FieldElement::from_be_bytes`]
/// instead, as [`crate::codec`] does for wire data.
#[cfg(feature = "serde")]
impl Serialize for FieldElement {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        self.0.serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        Mpi::deserialize(deserializer).map(FieldElement)
    }
}

impl Mpi {
    /// Constant-time `self < other`; re-exposed under a clearer name for
    /// the range checks callers outside `mpi` perform on public moduli.
    pub(crate) fn ct_lt_public(&self, other: &Mpi) -> Choice {
        use subtle::ConstantTimeLess;
        self.ct_lt(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_roundtrip() {
        let p = Mpi::from_u64(97);
        let bytes = [5u8];
        let fe = FieldElement::from_be_bytes(&bytes, &p).unwrap();
        let mut out = [0u8; 1];
        fe.write_be_bytes(&mut out).unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn rejects_out_of_range() {
        let p = Mpi::from_u64(97);
        let bytes = [200u8];
        assert!(FieldElement::from_be_bytes(&bytes, &p).is_err());
    }
}
