use geo::{BooleanOps, BoundingRect, Contains, Coord, InteriorPoint, MultiPolygon, Point, Polygon, Rect};
use rstar::RTree;

use crate::geom::{bbox::envelope_of, BoundingBox};

/// Unit shapes with a spatial index over their bounding boxes.
///
/// Shapes are expected to be non-overlapping; every shape must have a
/// bounding box and an interior point (see [`Geometries::is_usable`]).
#[derive(Debug, Clone)]
pub(crate) struct Geometries {
    shapes: Vec<MultiPolygon<f64>>,
    interior: Vec<Point<f64>>, // One guaranteed-interior point per shape
    rtree: RTree<BoundingBox>,
}

impl Geometries {
    /// Construct a Geometries object from a vector of MultiPolygons.
    pub(crate) fn new(shapes: Vec<MultiPolygon<f64>>) -> Self {
        Self {
            rtree: RTree::bulk_load(
                shapes.iter().enumerate()
                    .filter_map(|(i, shape)| shape.bounding_rect().map(|rect| BoundingBox::new(i, rect)))
                    .collect()
            ),
            interior: shapes.iter()
                .map(|shape| shape.interior_point().unwrap_or(Point::new(f64::NAN, f64::NAN)))
                .collect(),
            shapes,
        }
    }

    /// Returns true if `shape` can be indexed: it is non-empty, has finite
    /// coordinates, and has an interior point.
    pub(crate) fn is_usable(shape: &MultiPolygon<f64>) -> bool {
        !shape.0.is_empty()
            && shape.0.iter().all(|polygon| polygon_is_finite(polygon))
            && shape.bounding_rect().is_some()
            && shape.interior_point().is_some()
    }

    /// Get the number of shapes.
    #[inline] pub(crate) fn len(&self) -> usize { self.shapes.len() }

    /// Get the shape of a given unit.
    #[inline] pub(crate) fn shape(&self, idx: usize) -> &MultiPolygon<f64> { &self.shapes[idx] }

    /// Get a reference to the R-tree over unit bounding boxes.
    #[inline] pub(crate) fn rtree(&self) -> &RTree<BoundingBox> { &self.rtree }

    /// Compute the bounding rectangle of all shapes.
    pub(crate) fn bounds(&self) -> Option<Rect<f64>> {
        self.shapes.iter()
            .filter_map(|shape| shape.bounding_rect())
            .reduce(|a, b| Rect::new(
                Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
            ))
    }

    /// Compute the union of all shapes into a single MultiPolygon.
    ///
    /// Shapes are merged pairwise in rounds so intermediate results stay
    /// small; this is still the most expensive geometry call in a run.
    pub(crate) fn union(&self) -> MultiPolygon<f64> {
        let mut layer = self.shapes.clone();
        while layer.len() > 1 {
            let mut next = Vec::with_capacity(layer.len().div_ceil(2));
            let mut iter = layer.into_iter();
            while let Some(a) = iter.next() {
                next.push(match iter.next() {
                    Some(b) => a.union(&b),
                    None => a,
                });
            }
            layer = next;
        }
        layer.pop().unwrap_or_else(|| MultiPolygon(Vec::new()))
    }

    /// Indices of the units lying within `part`, in ascending order.
    ///
    /// Candidates come from the R-tree; a unit counts as inside when its
    /// interior point is contained by `part`. Units never straddle the
    /// boundary of a remaining-area part, so one point decides.
    pub(crate) fn units_within(&self, part: &Polygon<f64>) -> Vec<usize> {
        let Some(rect) = part.bounding_rect() else { return Vec::new() };

        let mut units = self.rtree
            .locate_in_envelope_intersecting(&envelope_of(&rect, 0.0))
            .map(|bb| bb.idx())
            .filter(|&i| part.contains(&self.interior[i]))
            .collect::<Vec<_>>();
        units.sort_unstable();
        units
    }
}

/// Returns true if every coordinate of `polygon` is finite.
pub(crate) fn polygon_is_finite(polygon: &Polygon<f64>) -> bool {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .flat_map(|ring| ring.coords())
        .all(|c| c.x.is_finite() && c.y.is_finite())
}

#[cfg(test)]
mod tests {
    use geo::{Area, Rect};

    use super::*;

    fn square(x: f64, y: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![Rect::new(Coord { x, y }, Coord { x: x + 1.0, y: y + 1.0 }).to_polygon()])
    }

    fn row(n: usize) -> Geometries {
        Geometries::new((0..n).map(|i| square(i as f64, 0.0)).collect())
    }

    #[test]
    fn union_of_row_is_single_polygon() {
        let union = row(5).union();
        assert_eq!(union.0.len(), 1);
        assert!((union.unsigned_area() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn union_of_empty_collection_is_empty() {
        assert!(Geometries::new(Vec::new()).union().0.is_empty());
    }

    #[test]
    fn bounds_cover_all_shapes() {
        let bounds = row(3).bounds().unwrap();
        assert_eq!(bounds.min(), Coord { x: 0.0, y: 0.0 });
        assert_eq!(bounds.max(), Coord { x: 3.0, y: 1.0 });
    }

    #[test]
    fn units_within_uses_interior_points() {
        let geoms = row(4);
        // Covers units 1 and 2 entirely and touches units 0 and 3 along edges.
        let part = Rect::new(Coord { x: 1.0, y: 0.0 }, Coord { x: 3.0, y: 1.0 }).to_polygon();
        assert_eq!(geoms.units_within(&part), vec![1, 2]);
    }

    #[test]
    fn empty_shape_is_not_usable() {
        assert!(!Geometries::is_usable(&MultiPolygon(Vec::new())));
        assert!(Geometries::is_usable(&square(0.0, 0.0)));

        let bad = MultiPolygon(vec![Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: f64::NAN, y: 1.0 }).to_polygon()]);
        assert!(!Geometries::is_usable(&bad));
    }
}
