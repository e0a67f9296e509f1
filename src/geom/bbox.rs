use geo::Rect;
use rstar::{RTreeObject, AABB};

/// A unit's bounding box in the R-tree, tagged with the unit's index.
#[derive(Debug, Clone)]
pub(crate) struct BoundingBox {
    idx: usize, // Index of corresponding unit in the dataset
    bbox: Rect<f64>,
}

impl BoundingBox {
    pub(crate) fn new(idx: usize, bbox: Rect<f64>) -> Self {
        Self { idx, bbox }
    }

    /// Get the index of the corresponding unit.
    #[inline] pub(crate) fn idx(&self) -> usize { self.idx }

    /// Envelope of this box grown by `pad` on every side.
    pub(crate) fn padded(&self, pad: f64) -> AABB<[f64; 2]> {
        envelope_of(&self.bbox, pad)
    }
}

impl RTreeObject for BoundingBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

/// Convert a rectangle to an R-tree envelope, grown by `pad` on every side.
pub(crate) fn envelope_of(rect: &Rect<f64>, pad: f64) -> AABB<[f64; 2]> {
    AABB::from_corners(
        [rect.min().x - pad, rect.min().y - pad],
        [rect.max().x + pad, rect.max().y + pad],
    )
}
