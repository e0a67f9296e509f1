use geo::Relate;

use crate::{config::Contiguity, error::GeometryError, geom::Geometries};

/// Bounding-box padding for candidate pair lookup, so boxes that only share
/// a corner are still returned by the R-tree.
const SEARCH_PAD: f64 = 1e-9;

impl Geometries {
    /// Compute adjacency lists under the given contiguity rule.
    ///
    /// Rook: the shapes touch (no interior overlap) and the
    /// boundary/boundary intersection has dimension 1 (index 4 of the
    /// DE-9IM string). Queen: the shapes touch at all.
    ///
    /// Each unordered pair is tested once and recorded in both directions;
    /// lists are returned sorted, so the result does not depend on the
    /// order of the shapes.
    pub(crate) fn adjacencies(&self, rule: Contiguity) -> Result<Vec<Vec<u32>>, GeometryError> {
        let mut adj_list = vec![Vec::new(); self.len()];

        for bb in self.rtree().iter() {
            let i = bb.idx();
            for cand in self.rtree().locate_in_envelope_intersecting(&bb.padded(SEARCH_PAD)) {
                let j = cand.idx();
                if j <= i { continue } // check each unordered pair once

                let im = self.shape(i).relate(self.shape(j));
                if !im.is_touches() { continue }

                let adjacent = match rule {
                    Contiguity::Queen => true,
                    Contiguity::Rook => im.matches("****1****")
                        .map_err(|e| GeometryError::Predicate(format!("units {i} and {j}: {e}")))?,
                };

                if adjacent {
                    adj_list[i].push(j as u32);
                    adj_list[j].push(i as u32);
                }
            }
        }

        for neighbors in &mut adj_list {
            neighbors.sort_unstable();
            neighbors.dedup();
        }

        Ok(adj_list)
    }
}

#[cfg(test)]
mod tests {
    use geo::{Coord, MultiPolygon, Rect};

    use super::*;

    fn square(x: f64, y: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![Rect::new(Coord { x, y }, Coord { x: x + 1.0, y: y + 1.0 }).to_polygon()])
    }

    /// 2x2 grid, indices row-major:
    /// ```text
    /// 2 3
    /// 0 1
    /// ```
    fn two_by_two() -> Geometries {
        Geometries::new(vec![square(0.0, 0.0), square(1.0, 0.0), square(0.0, 1.0), square(1.0, 1.0)])
    }

    #[test]
    fn rook_excludes_corner_touches() {
        let adj = two_by_two().adjacencies(Contiguity::Rook).unwrap();
        assert_eq!(adj, vec![vec![1, 2], vec![0, 3], vec![0, 3], vec![1, 2]]);
    }

    #[test]
    fn queen_includes_corner_touches() {
        let adj = two_by_two().adjacencies(Contiguity::Queen).unwrap();
        assert_eq!(adj, vec![vec![1, 2, 3], vec![0, 2, 3], vec![0, 1, 3], vec![0, 1, 2]]);
    }

    #[test]
    fn separated_shapes_are_not_adjacent() {
        let geoms = Geometries::new(vec![square(0.0, 0.0), square(5.0, 5.0)]);
        assert_eq!(geoms.adjacencies(Contiguity::Queen).unwrap(), vec![Vec::<u32>::new(), vec![]]);
    }

    #[test]
    fn overlapping_shapes_are_not_adjacent() {
        let geoms = Geometries::new(vec![square(0.0, 0.0), square(0.5, 0.0)]);
        assert_eq!(geoms.adjacencies(Contiguity::Rook).unwrap(), vec![Vec::<u32>::new(), vec![]]);
    }
}
