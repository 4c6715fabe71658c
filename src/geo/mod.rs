//! Geographic inputs to the scheduler.
//!
//! ## Module Structure
//!
//! - [`coordinate`]: validated latitude/longitude value type
//! - [`solar`]: the latitude-based sunrise/sunset approximation
//! - [`geocoder`]: free-text address lookup behind the [`Geocoder`] trait
//!
//! Everything here is pure apart from building the world-city table, so the
//! scheduler and the CLI can call it from any thread.

pub mod coordinate;
pub mod geocoder;
pub mod solar;

pub use coordinate::Coordinate;
pub use geocoder::{CityEntry, CityGeocoder, GeocodeError, Geocoder, Place};
pub use solar::SolarWindow;
