use tracing::debug;

use crate::{config::Contiguity, error::GeometryError, unit::UnitDataset};

/// An immutable, undirected adjacency graph over units in compressed sparse
/// row format.
///
/// `offsets[u]..offsets[u+1]` indexes into `edges` to give the sorted list
/// of units adjacent to unit `u`. The relation is symmetric and
/// irreflexive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdjacencyGraph {
    contiguity: Contiguity,
    offsets: Vec<u32>,
    edges: Vec<u32>,
}

impl AdjacencyGraph {
    /// Build the graph for `dataset` under the given contiguity rule.
    pub fn build(dataset: &UnitDataset, contiguity: Contiguity) -> Result<Self, GeometryError> {
        let lists = dataset.geometries().adjacencies(contiguity)?;
        let graph = Self::from_lists(contiguity, lists);
        debug!(%contiguity, units = graph.node_count(), links = graph.edge_count() / 2, "adjacency graph built");
        Ok(graph)
    }

    /// Construct a graph from adjacency lists.
    ///
    /// Self-loops and duplicates are dropped and every edge is mirrored, so
    /// the result is symmetric even if the input lists are not.
    pub fn from_lists(contiguity: Contiguity, mut lists: Vec<Vec<u32>>) -> Self {
        let n = lists.len();
        for u in 0..n {
            for i in 0..lists[u].len() {
                let v = lists[u][i] as usize;
                assert!(v < n, "neighbor {v} of node {u} out of range");
                lists[v].push(u as u32);
            }
        }
        for (u, neighbors) in lists.iter_mut().enumerate() {
            neighbors.retain(|&v| v as usize != u);
            neighbors.sort_unstable();
            neighbors.dedup();
        }

        Self {
            contiguity,
            offsets: std::iter::once(0u32).chain(
                lists.iter()
                    .map(|v| v.len() as u32)
                    .scan(0u32, |acc, len| {*acc += len; Some(*acc)})
            ).collect::<Vec<u32>>(),
            edges: lists.into_iter().flatten().collect(),
        }
    }

    /// Get the contiguity rule this graph was built under.
    #[inline] pub fn contiguity(&self) -> Contiguity { self.contiguity }

    /// Get the number of nodes in the graph.
    #[inline] pub fn node_count(&self) -> usize { self.offsets.len() - 1 }

    /// Get the number of directed edge entries (twice the number of links).
    #[inline] pub fn edge_count(&self) -> usize { self.edges.len() }

    /// Get the range of edges for a given node.
    #[inline]
    fn range(&self, node: usize) -> std::ops::Range<usize> {
        self.offsets[node] as usize .. self.offsets[node + 1] as usize
    }

    /// Get the degree (number of neighbors) of a given node.
    #[inline] pub fn degree(&self, node: usize) -> usize { self.range(node).len() }

    /// Get an iterator over the neighbors of a given node, in ascending order.
    #[inline]
    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.edges[self.range(node)].iter().map(|&v| v as usize)
    }

    /// Returns true if `other` is adjacent to `node` (binary search).
    #[inline]
    pub fn contains(&self, node: usize, other: usize) -> bool {
        self.edges[self.range(node)].binary_search(&(other as u32)).is_ok()
    }

    /// Check that no node neighbors itself and every edge has its mirror.
    pub fn is_symmetric(&self) -> bool {
        (0..self.node_count()).all(|u| {
            self.neighbors(u).all(|v| v != u && self.contains(v, u))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_graph() -> AdjacencyGraph {
        AdjacencyGraph::from_lists(Contiguity::Rook, vec![
            vec![1, 2],       // 0
            vec![0, 2],       // 1
            vec![0, 1, 3],    // 2
            vec![2],          // 3
        ])
    }

    #[test]
    fn csr_graph_construction() {
        let graph = make_test_graph();

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 8);

        // Offsets are cumulative neighbor counts, len = nodes + 1
        assert_eq!(graph.offsets, vec![0, 2, 4, 7, 8]);
        assert_eq!(graph.edges, vec![1, 2, 0, 2, 0, 1, 3, 2]);

        for window in graph.offsets.windows(2) { assert!(window[0] <= window[1]) }
    }

    #[test]
    fn degree_and_neighbors() {
        let graph = make_test_graph();

        assert_eq!(graph.degree(2), 3);
        assert_eq!(graph.degree(3), 1);
        assert_eq!(graph.neighbors(2).collect::<Vec<_>>(), vec![0, 1, 3]);
        assert!(graph.contains(3, 2));
        assert!(!graph.contains(3, 0));
    }

    #[test]
    fn one_sided_lists_are_mirrored() {
        let graph = AdjacencyGraph::from_lists(Contiguity::Queen, vec![vec![1, 2], vec![], vec![]]);
        assert!(graph.is_symmetric());
        assert_eq!(graph.neighbors(1).collect::<Vec<_>>(), vec![0]);
        assert_eq!(graph.neighbors(2).collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn self_loops_and_duplicates_are_dropped() {
        let graph = AdjacencyGraph::from_lists(Contiguity::Rook, vec![vec![0, 1, 1], vec![0]]);
        assert_eq!(graph.neighbors(0).collect::<Vec<_>>(), vec![1]);
        assert_eq!(graph.neighbors(1).collect::<Vec<_>>(), vec![0]);
        assert!(graph.is_symmetric());
    }

    #[test]
    fn empty_graph_is_valid() {
        let graph = AdjacencyGraph::from_lists(Contiguity::Rook, vec![]);
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.offsets, vec![0]);
    }

    #[test]
    fn isolated_nodes_have_zero_degree() {
        let graph = AdjacencyGraph::from_lists(Contiguity::Rook, vec![vec![], vec![], vec![]]);
        assert_eq!(graph.offsets, vec![0, 0, 0, 0]);
        for n in 0..3 {
            assert_eq!(graph.degree(n), 0);
            assert!(graph.neighbors(n).next().is_none());
        }
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn from_lists_panics_on_unknown_neighbor() {
        AdjacencyGraph::from_lists(Contiguity::Rook, vec![vec![5]]);
    }

    #[test]
    #[should_panic]
    fn degree_panics_for_out_of_bounds_node() {
        let graph = make_test_graph();
        graph.degree(graph.node_count());
    }
}
