#![allow(dead_code)]

use districter::{Unit, UnitDataset};
use geo::{Coord, MultiPolygon, Rect};

/// Axis-aligned unit square with its lower-left corner at (x, y).
pub fn square(x: f64, y: f64) -> MultiPolygon<f64> {
    MultiPolygon(vec![Rect::new(Coord { x, y }, Coord { x: x + 1.0, y: y + 1.0 }).to_polygon()])
}

/// A rows x cols grid where cell (r, c) covers [c, c+1] x [r, r+1].
/// `cell` returns the (id, population, area) of each cell.
pub fn grid(rows: usize, cols: usize, cell: impl Fn(usize, usize) -> (String, u64, f64)) -> UnitDataset {
    UnitDataset::from_pairs((0..rows).flat_map(|r| (0..cols).map(move |c| (r, c))).map(|(r, c)| {
        let (id, population, area) = cell(r, c);
        (Unit::new(id, population, area), square(c as f64, r as f64))
    })).unwrap()
}

/// A horizontal chain of unit squares with ids "a", "b", ...
pub fn chain(pops: &[u64]) -> UnitDataset {
    UnitDataset::from_pairs(pops.iter().enumerate().map(|(i, &pop)| {
        let id = char::from(b'a' + i as u8).to_string();
        (Unit::new(id, pop, 1.0), square(i as f64, 0.0))
    })).unwrap()
}

/// Ids of a district's members, sorted.
pub fn member_ids(dataset: &UnitDataset, members: &[usize]) -> Vec<String> {
    let mut ids = members.iter().map(|&u| dataset.unit(u).id().to_string()).collect::<Vec<_>>();
    ids.sort();
    ids
}
