//! Derive support for Tawsil.
//!
//! Re-exports `#[derive(Injectable)]` so applications depend on one crate
//! for the macro and keep `tawsil-macros` an implementation detail.

pub use tawsil_macros::Injectable;
