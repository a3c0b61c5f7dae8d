//! Closed curve registry.
//!
//! A static, closed set: lookup by internal id or by the 16-bit TLS
//! NamedCurve id (RFC 8422 §5.1.1) returns the immutable descriptor or
//! `None`. Ordering of [`PRESET_CURVES`] matters only for the "most used
//! first" listing a ClientHello/ServerHello's supported-groups extension
//! would emit: Secp256r1 leads, as the most widely deployed curve.

/// Internal curve identifier.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum CurveId {
    /// NIST P-256 / secp256r1 / prime256v1.
    Secp256r1,
    /// NIST P-384 / secp384r1.
    Secp384r1,
    /// Curve25519, the Montgomery-form extension point.
    Curve25519,
}

/// Short Weierstrass vs. Montgomery dispatch tag.
///
/// `match`es on this are exhaustive throughout the crate by construction:
/// adding a third curve form would be a compile error everywhere that
/// matters, not a silent fallthrough.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CurveType {
    /// `y^2 = x^3 + a*x + b`.
    ShortWeierstrass,
    /// `v^2 = u^3 + A*u^2 + u`.
    Montgomery,
}

/// Printable, TLS-facing facts about a registered curve.
#[derive(Copy, Clone, Debug)]
pub struct CurveInfo {
    /// Internal identifier.
    pub id: CurveId,
    /// TLS NamedCurve codepoint (RFC 8422 §5.1.1 / RFC 7071 §2 / RFC 7748).
    pub tls_id: u16,
    /// Field/group bit size.
    pub bits: usize,
    /// Human-readable name, e.g. `"secp256r1"`.
    pub name: &'static str,
}

const CURVE_TABLE: &[CurveInfo] = &[
    CurveInfo {
        id: CurveId::Secp256r1,
        tls_id: 23,
        bits: 256,
        name: "secp256r1",
    },
    CurveInfo {
        id: CurveId::Secp384r1,
        tls_id: 24,
        bits: 384,
        name: "secp384r1",
    },
    CurveInfo {
        id: CurveId::Curve25519,
        tls_id: 29,
        bits: 255,
        name: "x25519",
    },
];

/// Preset curve ordering for supported-groups listings: Secp256r1 first.
pub const PRESET_CURVES: &[CurveId] = &[
    CurveId::Secp256r1,
    CurveId::Secp384r1,
    CurveId::Curve25519,
];

/// Looks up curve metadata by internal identifier.
pub fn curve_info_from_id(id: CurveId) -> Option<&'static CurveInfo> {
    CURVE_TABLE.iter().find(|info| info.id == id)
}

/// Looks up curve metadata by TLS NamedCurve id (RFC 8422 §5.4). Returns
/// `None` for unassigned/unsupported codepoints; callers surface this as
/// [`crate::error::Error::FeatureUnavailable`].
pub fn curve_info_from_tls_id(tls_id: u16) -> Option<&'static CurveInfo> {
    CURVE_TABLE.iter().find(|info| info.tls_id == tls_id)
}
