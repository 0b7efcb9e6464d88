//! # medbook-search
//!
//! Bounded-radius proximity search over the backing store's spatial index.
//!
//! Search results are a continuous, high-cardinality function of the
//! caller's exact coordinates, so this path deliberately bypasses the
//! caching layer: caching them would yield a near-zero hit rate while adding
//! staleness risk. Every call validates its parameters, pushes entity
//! filters down to the store, ranks candidates by true geodesic distance and
//! paginates after sorting.

mod engine;
mod params;

pub use engine::{ProximityEngine, ProximityHit};
pub use params::{
    DEFAULT_LIMIT, DEFAULT_RADIUS_KM, MAX_LIMIT, MAX_RADIUS_KM, NearbyQuery, SearchError,
};
