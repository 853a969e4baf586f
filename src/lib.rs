#![doc = "In-memory numeric and geospatial seq_id indexing core"]

mod geo_point;
mod geo_polygon;
mod id_list;
mod iterator;
mod set_algebra;
mod trie;

#[doc(inline)]
pub use geo_point::GeoPointIndex;

#[doc(inline)]
pub use geo_polygon::{GeoPolygonIndex, PolygonValidationError};

#[doc(inline)]
pub use iterator::SeqIdIterator;

#[doc(inline)]
pub use trie::NumericTrie;
