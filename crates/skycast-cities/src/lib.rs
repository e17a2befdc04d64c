//! City search for Skycast.
//!
//! Provides the paginated city-search client, the city identifier encoding
//! and the `CitySource` seam the controllers depend on.

pub mod city_id;
pub mod client;
pub mod error;
pub mod types;

pub use city_id::{decode_city_id, encode_city_id, CityIdParts};
pub use client::{CityClient, CitySource};
pub use error::CityError;
pub use types::{City, CityPage, SearchParams, SortDirection, SortSpec};
