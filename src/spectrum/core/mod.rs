//! spectrum::core — the masked spectrum data model.
//!
//! Purpose
//! -------
//! Hold the [`Spectrum`] type, its elementwise arithmetic, and the index
//! helpers the transforms share.
//!
//! Key behaviors
//! -------------
//! - `data`: construction, validation, accessors, in-place mask operations.
//! - `arithmetic`: mask-propagating binary/scalar arithmetic and equality.
//! - `indexing`: axis reversal and per-cell allele totals (crate-internal).
//!
//! Invariants & assumptions
//! ------------------------
//! - Mask and data shapes always agree; transforms construct outputs through
//!   crate-internal constructors that preserve this.
pub mod arithmetic;
pub mod data;
pub(crate) mod indexing;

pub use self::data::Spectrum;
