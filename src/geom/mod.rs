mod bbox;
mod contiguity;
mod geom;

pub(crate) use bbox::BoundingBox;
pub(crate) use geom::{polygon_is_finite, Geometries};
