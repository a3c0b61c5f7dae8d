#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

//! Elliptic-curve arithmetic core for a TLS implementation's key
//! exchange: a closed [`registry`] of NIST short Weierstrass curves
//! (Secp256r1, Secp384r1) plus Curve25519 as a Montgomery-form
//! extension point, constant-time [`comb`]/[`montgomery`] scalar
//! multiplication, [`keys`] generation and validation, and the SEC1 /
//! RFC 8422 [`codec`]s a handshake needs to put a point on the wire.
//!
//! This crate does not implement TLS itself: no handshake, record
//! layer, certificate parsing, or ECDSA/ECDHE orchestration. It is the
//! numeric engine those layers are built on top of (see `DESIGN.md`).
//!
//! ## `serde` support
//!
//! When the `serde` feature is enabled, [`field::FieldElement`] and
//! [`mpi::Mpi`] gain constant-time-friendly `Serialize`/`Deserialize`
//! impls via `serdect`.

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod codec;
pub mod comb;
pub mod error;
pub mod field;
pub mod group;
pub mod keys;
pub mod montgomery;
pub mod mpi;
pub mod point;
pub mod registry;
pub mod scalarmult;

pub use crate::error::{Error, Result};
pub use crate::group::Group;
pub use crate::keys::Keypair;
pub use crate::registry::CurveId;
pub use crate::scalarmult::Point;
