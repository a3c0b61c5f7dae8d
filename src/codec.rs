//! Wire codecs: SEC1 uncompressed points, the length-prefixed TLS
//! `ECPoint` record (RFC 8422 §5.4), and the 3-byte TLS `ECParameters`
//! record.

use crate::error::{Error, Result};
use crate::field::FieldElement;
use crate::group::Group;
use crate::registry::{self, CurveId};
use crate::scalarmult::Point;

const UNCOMPRESSED_TAG: u8 = 0x04;
const INFINITY_TAG: u8 = 0x00;

/// `plen = ceil(bits(P)/8)`, the per-coordinate byte width for a group.
fn coordinate_len(grp: &Group) -> usize {
    (grp.bits + 7) / 8
}

/// SEC1 §2.3.3 point encoding: `0x04 || X || Y` for a finite point, or
/// the single byte `0x00` for the point at infinity. Only defined for
/// short Weierstrass curves; RFC 8422 never calls this codec for
/// Montgomery `u`-coordinates.
pub fn write_sec1_point(grp: &Group, point: &Point, out: &mut [u8]) -> Result<usize> {
    let affine = match point {
        Point::Weierstrass(p) => p,
        Point::Montgomery(_) => return Err(Error::FeatureUnavailable),
    };

    if bool::from(affine.is_identity()) {
        if out.is_empty() {
            return Err(Error::NoSpace);
        }
        out[0] = INFINITY_TAG;
        return Ok(1);
    }

    let plen = coordinate_len(grp);
    let total = 2 * plen + 1;
    if out.len() < total {
        return Err(Error::NoSpace);
    }
    out[0] = UNCOMPRESSED_TAG;
    affine.x.write_be_bytes(&mut out[1..1 + plen])?;
    affine.y.write_be_bytes(&mut out[1 + plen..total])?;
    Ok(total)
}

/// Inverse of [`write_sec1_point`]. Rejects any leading byte other than
/// `0x00`/`0x04` with [`Error::FeatureUnavailable`], and any length
/// mismatch with [`Error::BadInputData`].
pub fn read_sec1_point(grp: &Group, bytes: &[u8]) -> Result<Point> {
    if bytes.len() == 1 && bytes[0] == INFINITY_TAG {
        return Ok(Point::Weierstrass(crate::point::AffinePoint::IDENTITY));
    }
    match bytes.first() {
        Some(&UNCOMPRESSED_TAG) => {}
        Some(_) => return Err(Error::FeatureUnavailable),
        None => return Err(Error::BadInputData),
    }

    let plen = coordinate_len(grp);
    if bytes.len() != 2 * plen + 1 {
        return Err(Error::BadInputData);
    }
    let x = FieldElement::from_be_bytes(&bytes[1..1 + plen], &grp.p)?;
    let y = FieldElement::from_be_bytes(&bytes[1 + plen..], &grp.p)?;

    let affine = crate::keys::validate_weierstrass_public(grp, x, y)?;
    Ok(Point::Weierstrass(affine))
}

/// TLS `ECPoint` (RFC 8422 §5.4): a one-byte length prefix followed by
/// the SEC1 encoding.
pub fn write_tls_point(grp: &Group, point: &Point, out: &mut [u8]) -> Result<usize> {
    if out.is_empty() {
        return Err(Error::NoSpace);
    }
    let written = write_sec1_point(grp, point, &mut out[1..])?;
    if written > u8::MAX as usize {
        return Err(Error::NoSpace);
    }
    out[0] = written as u8;
    Ok(1 + written)
}

/// Inverse of [`write_tls_point`]. Returns the decoded point and the
/// number of bytes consumed from `bytes`.
pub fn read_tls_point(grp: &Group, bytes: &[u8]) -> Result<(Point, usize)> {
    let len = *bytes.first().ok_or(Error::BadInputData)? as usize;
    let body = bytes.get(1..1 + len).ok_or(Error::BadInputData)?;
    let point = read_sec1_point(grp, body)?;
    Ok((point, 1 + len))
}

/// TLS `ECParameters`: `0x03 (named_curve) | tls_id_hi | tls_id_lo`. Any
/// curve-selection method other than `named_curve` (`0x03`) is
/// rejected: this core never negotiates anything else.
const NAMED_CURVE: u8 = 0x03;

pub fn write_tls_group(id: CurveId, out: &mut [u8; 3]) -> Result<()> {
    let info = registry::curve_info_from_id(id).ok_or(Error::FeatureUnavailable)?;
    out[0] = NAMED_CURVE;
    out[1] = (info.tls_id >> 8) as u8;
    out[2] = info.tls_id as u8;
    Ok(())
}

pub fn read_tls_group(bytes: &[u8; 3]) -> Result<CurveId> {
    if bytes[0] != NAMED_CURVE {
        return Err(Error::BadInputData);
    }
    let tls_id = u16::from_be_bytes([bytes[1], bytes[2]]);
    registry::curve_info_from_tls_id(tls_id)
        .map(|info| info.id)
        .ok_or(Error::FeatureUnavailable)
}
