//! Polygon storage keyed by a coarse S2-style cell cover, with exact
//! point-in-polygon containment left to `geo` for the (rare) candidates
//! that survive the cell-membership filter.
//!
//! Grounded on `GeoPolygonIndex` in `geopolygon_index.{h,cpp}`: covering
//! cells are computed with an S2 region coverer and mapped to seq_ids via
//! the same `IdList` used everywhere else in this crate, while exact
//! containment is deferred to a per-seq_id polygon test.

use ahash::{AHashMap, AHashSet};
use geo::{Area, Coord, LineString, Point as GeoPoint, Polygon as GeoPolygon};
use s2::cellid::CellID;
use s2::latlng::LatLng;
use s2::loop_::Loop as S2Loop;
use s2::point::Point as S2Point;
use s2::polygon::Polygon as S2Polygon;
use s2::region::RegionCoverer;
use thiserror::Error;

use crate::id_list::IdList;

#[derive(Debug, Error)]
pub enum PolygonValidationError {
    #[error("polygon ring is not closed (first and last point must match)")]
    NotClosed,
    #[error("polygon ring has fewer than 3 distinct points")]
    TooFewPoints,
    #[error("polygon ring has zero area")]
    Degenerate,
    #[error("polygon ring self-intersects: {0}")]
    SelfIntersecting(String),
}

fn validate_ring(coords: &[(f64, f64)]) -> Result<(), PolygonValidationError> {
    if coords.len() < 2 {
        return Err(PolygonValidationError::TooFewPoints);
    }
    if coords.first() != coords.last() {
        return Err(PolygonValidationError::NotClosed);
    }
    if coords.len() - 1 < 3 {
        return Err(PolygonValidationError::TooFewPoints);
    }
    if ring_to_geo_polygon(coords).unsigned_area() <= f64::EPSILON {
        return Err(PolygonValidationError::Degenerate);
    }
    Ok(())
}

fn ring_to_geo_polygon(coords: &[(f64, f64)]) -> GeoPolygon<f64> {
    let line: LineString<f64> = coords.iter().map(|&(lat, lng)| Coord { x: lng, y: lat }).collect();
    GeoPolygon::new(line, vec![])
}

fn geo_polygon_to_ring(polygon: &GeoPolygon<f64>) -> Vec<(f64, f64)> {
    polygon.exterior().coords().map(|c| (c.y, c.x)).collect()
}

/// Builds the S2 polygon used only transiently, for covering and
/// self-intersection validation; the `geo::Polygon` kept in
/// `seq_id_to_polygons` is what actually answers containment queries.
fn ring_to_s2_polygon(coords: &[(f64, f64)]) -> S2Polygon {
    // `coords` is a closed ring (first == last); S2 loops are implicitly
    // closed, so drop the repeated closing point.
    let points: Vec<S2Point> = coords[..coords.len() - 1]
        .iter()
        .map(|&(lat, lng)| LatLng::from_degrees(lat, lng).to_point())
        .collect();
    let mut loop_ = S2Loop::new(points);
    loop_.normalize();
    S2Polygon::from_loops(vec![loop_])
}

/// Indexes polygons by the set of S2 cells covering them; `find_containing`
/// narrows to a handful of candidate seq_ids via that cover before running
/// exact polygon containment.
pub struct GeoPolygonIndex {
    min_level: u8,
    max_level: u8,
    max_cells: usize,
    cell_to_ids: AHashMap<u64, IdList>,
    seq_id_to_polygons: AHashMap<u32, Vec<GeoPolygon<f64>>>,
}

impl GeoPolygonIndex {
    pub fn new(min_level: u8, max_level: u8, max_cells: usize) -> Self {
        GeoPolygonIndex {
            min_level,
            max_level,
            max_cells,
            cell_to_ids: AHashMap::new(),
            seq_id_to_polygons: AHashMap::new(),
        }
    }

    fn coverer(&self) -> RegionCoverer {
        RegionCoverer {
            min_level: self.min_level,
            max_level: self.max_level,
            level_mod: 1,
            max_cells: self.max_cells,
        }
    }

    /// `coords` is a closed ring of (lat, lng) pairs in degrees: the first
    /// and last entries must match. Rejects rings that don't close, have
    /// fewer than 3 distinct points, have zero area, or self-intersect per
    /// the underlying S2 loop validation — in which case the library's own
    /// message is carried in [`PolygonValidationError::SelfIntersecting`].
    pub fn add_polygon(&mut self, coords: &[(f64, f64)], seq_id: u32) -> Result<(), PolygonValidationError> {
        validate_ring(coords)?;

        let s2_polygon = ring_to_s2_polygon(coords);
        if let Some(message) = s2_polygon.find_validation_error() {
            return Err(PolygonValidationError::SelfIntersecting(message));
        }

        let covering = self.coverer().get_covering(&s2_polygon);
        for cell in covering.0 {
            self.cell_to_ids.entry(cell.0).or_default().insert(seq_id);
        }

        self.seq_id_to_polygons
            .entry(seq_id)
            .or_default()
            .push(ring_to_geo_polygon(coords));

        Ok(())
    }

    pub fn remove_polygon(&mut self, seq_id: u32) {
        let Some(polygons) = self.seq_id_to_polygons.remove(&seq_id) else {
            return;
        };

        for polygon in &polygons {
            let ring = geo_polygon_to_ring(polygon);
            let s2_polygon = ring_to_s2_polygon(&ring);
            let covering = self.coverer().get_covering(&s2_polygon);

            for cell in covering.0 {
                if let Some(ids) = self.cell_to_ids.get_mut(&cell.0) {
                    ids.erase(seq_id);
                    if ids.is_empty() {
                        self.cell_to_ids.remove(&cell.0);
                    }
                }
            }
        }
    }

    /// Walks the query point's cell up through its ancestors to
    /// `min_level`, collecting every seq_id registered at a matching cell,
    /// and tests each owned polygon of each candidate exactly once.
    pub fn find_containing(&self, lat: f64, lng: f64) -> Vec<u32> {
        let point = LatLng::from_degrees(lat, lng).to_point();
        let geo_point = GeoPoint::new(lng, lat);
        let mut current = CellID::from(point);

        let mut tested: AHashSet<(u32, usize)> = AHashSet::new();
        let mut matched: AHashSet<u32> = AHashSet::new();

        loop {
            let level = current.level();
            if level < self.min_level {
                break;
            }

            if let Some(ids) = self.cell_to_ids.get(&current.0) {
                for seq_id in ids.materialize() {
                    let Some(polygons) = self.seq_id_to_polygons.get(&seq_id) else {
                        continue;
                    };
                    for (i, polygon) in polygons.iter().enumerate() {
                        if !tested.insert((seq_id, i)) {
                            continue;
                        }
                        if polygon.contains(&geo_point) {
                            matched.insert(seq_id);
                        }
                    }
                }
            }

            if level == 0 {
                break;
            }
            current = current.parent(level - 1);
        }

        let mut result: Vec<u32> = matched.into_iter().collect();
        result.sort_unstable();
        result
    }

    /// Number of seq_ids with at least one owned polygon.
    pub fn len(&self) -> usize {
        self.seq_id_to_polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq_id_to_polygons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min_lat: f64, min_lng: f64, max_lat: f64, max_lng: f64) -> Vec<(f64, f64)> {
        vec![
            (min_lat, min_lng),
            (min_lat, max_lng),
            (max_lat, max_lng),
            (max_lat, min_lng),
            (min_lat, min_lng),
        ]
    }

    #[test]
    fn scenario_f_add_find_remove() {
        let mut idx = GeoPolygonIndex::new(4, 16, 8);
        idx.add_polygon(&square(10.0, 10.0, 20.0, 20.0), 1).unwrap();

        assert_eq!(idx.find_containing(15.0, 15.0), vec![1]);
        assert!(idx.find_containing(50.0, 50.0).is_empty());

        idx.remove_polygon(1);
        assert!(idx.find_containing(15.0, 15.0).is_empty());
        assert!(idx.is_empty());
    }

    #[test]
    fn rejects_unclosed_ring() {
        let mut idx = GeoPolygonIndex::new(4, 16, 8);
        let mut ring = square(0.0, 0.0, 1.0, 1.0);
        ring.pop();
        assert!(matches!(idx.add_polygon(&ring, 1), Err(PolygonValidationError::NotClosed)));
    }

    #[test]
    fn rejects_too_few_points() {
        let mut idx = GeoPolygonIndex::new(4, 16, 8);
        let ring = vec![(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)];
        assert!(matches!(idx.add_polygon(&ring, 1), Err(PolygonValidationError::TooFewPoints)));
    }

    #[test]
    fn rejects_degenerate_ring() {
        let mut idx = GeoPolygonIndex::new(4, 16, 8);
        let ring = vec![(0.0, 0.0), (0.0, 1.0), (0.0, 2.0), (0.0, 0.0)];
        assert!(matches!(idx.add_polygon(&ring, 1), Err(PolygonValidationError::Degenerate)));
    }

    #[test]
    fn multiple_polygons_per_seq_id_are_unioned() {
        let mut idx = GeoPolygonIndex::new(4, 16, 8);
        idx.add_polygon(&square(0.0, 0.0, 1.0, 1.0), 1).unwrap();
        idx.add_polygon(&square(10.0, 10.0, 11.0, 11.0), 1).unwrap();

        assert_eq!(idx.find_containing(0.5, 0.5), vec![1]);
        assert_eq!(idx.find_containing(10.5, 10.5), vec![1]);
        assert_eq!(idx.len(), 1);
    }
}
