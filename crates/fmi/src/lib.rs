//! Generation adapters for FMI simulation units.
//!
//! Each generation exposes its own primitive set as a trait over raw status
//! codes and raw event structures ([`v1`], [`v2`], [`v3`]). An adapter per
//! generation and mode binds those primitives onto the single capability
//! interface in `shuttle_core`, so the stepping loop never needs to know
//! which generation it is driving.
//!
//! Loading archives and resolving their symbols is left to the caller; this
//! crate starts from an already loaded [`Fmu`] and binds it to a
//! [`shuttle_core::Profile`] with [`Fmu::select`].

mod fmu;
mod status;

pub mod v1;
pub mod v2;
pub mod v3;

pub use fmu::{Fmu, SelectError};
pub use status::RawStatus;
