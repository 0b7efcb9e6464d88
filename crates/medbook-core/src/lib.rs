//! # medbook-core
//!
//! Shared vocabulary for the Medbook data-access core: entity kinds,
//! geographic types with geodesic distance, and the core error taxonomy.
//!
//! This crate carries no I/O and no async surface. The storage abstraction
//! lives in `medbook-storage`, the caching layer in `medbook-cache`.

mod entity;
mod error;
mod geo;

pub use entity::EntityKind;
pub use error::{CoreError, ErrorCategory, Result};
pub use geo::{GeoPoint, MAX_LATITUDE, MAX_LONGITUDE};
