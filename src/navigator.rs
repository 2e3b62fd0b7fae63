//! Navigator - graph routines over numbered cities.
//!
//! Nodes are `0..node_count`. Edges naming a node outside that range are
//! ignored rather than reported.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

/// A road between two cities with costs in two currencies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Road {
    pub from: usize,
    pub to: usize,
    pub gold: i64,
    pub silver: i64,
}

impl Road {
    pub const fn new(from: usize, to: usize, gold: i64, silver: i64) -> Self {
        Self { from, to, gold, silver }
    }

    /// Combined cost at the given exchange rates.
    ///
    /// Widened to `i128` so each product is exact; the sum saturates.
    #[inline]
    pub fn cost(&self, gold_rate: i64, silver_rate: i64) -> i128 {
        let gold = i128::from(self.gold) * i128::from(gold_rate);
        let silver = i128::from(self.silver) * i128::from(silver_rate);
        gold.saturating_add(silver)
    }
}

/// True if `dest` is reachable from `source` over undirected `edges`.
///
/// Out-of-range endpoints are unreachable; a node always reaches itself.
pub fn path_exists(node_count: usize, edges: &[(usize, usize)], source: usize, dest: usize) -> bool {
    if source >= node_count || dest >= node_count {
        return false;
    }
    if source == dest {
        return true;
    }

    let mut adjacency = vec![Vec::new(); node_count];
    for &(u, v) in edges {
        if u < node_count && v < node_count {
            adjacency[u].push(v);
            adjacency[v].push(u);
        }
    }

    let mut seen = vec![false; node_count];
    let mut queue = VecDeque::from([source]);
    seen[source] = true;

    while let Some(u) = queue.pop_front() {
        for &v in &adjacency[u] {
            if seen[v] {
                continue;
            }
            if v == dest {
                return true;
            }
            seen[v] = true;
            queue.push_back(v);
        }
    }

    false
}

/// Total cost of a minimum spanning tree (Prim), or `-1` if some city
/// cannot be connected.
///
/// Zero or one city costs nothing to connect. Costs are summed in `i128`
/// and a total outside the `i64` range saturates at its bounds.
pub fn min_bribe_cost(node_count: usize, gold_rate: i64, silver_rate: i64, roads: &[Road]) -> i64 {
    if node_count == 0 {
        return 0;
    }

    let mut adjacency: Vec<Vec<(usize, i128)>> = vec![Vec::new(); node_count];
    for road in roads {
        if road.from < node_count && road.to < node_count {
            let cost = road.cost(gold_rate, silver_rate);
            adjacency[road.from].push((road.to, cost));
            adjacency[road.to].push((road.from, cost));
        }
    }

    let mut in_tree = vec![false; node_count];
    let mut frontier = BinaryHeap::from([Reverse((0i128, 0usize))]);
    let mut total = 0i128;
    let mut connected = 0usize;

    while let Some(Reverse((cost, u))) = frontier.pop() {
        if in_tree[u] {
            continue;
        }
        in_tree[u] = true;
        total = total.saturating_add(cost);
        connected += 1;
        if connected == node_count {
            break;
        }

        for &(v, edge_cost) in &adjacency[u] {
            if !in_tree[v] {
                frontier.push(Reverse((edge_cost, v)));
            }
        }
    }

    if connected == node_count {
        total.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
    } else {
        -1
    }
}

/// Sum of shortest distances over every pair `i < j` with a path from `i`
/// to `j`, rendered in binary (Floyd-Warshall).
///
/// Each road `(u, v, w)` relaxes the distance from `u` to `v` only; list a
/// road in both directions to make it two-way. Returns `"0"` when the sum is
/// zero or there are no cities.
pub fn sum_min_distances_binary(node_count: usize, roads: &[(usize, usize, u64)]) -> String {
    let mut dist: Vec<Vec<Option<u64>>> = vec![vec![None; node_count]; node_count];
    for (i, row) in dist.iter_mut().enumerate() {
        row[i] = Some(0);
    }

    for &(u, v, weight) in roads {
        if u < node_count && v < node_count {
            let current = &mut dist[u][v];
            *current = Some(current.map_or(weight, |d| d.min(weight)));
        }
    }

    for k in 0..node_count {
        for i in 0..node_count {
            let Some(to_k) = dist[i][k] else { continue };
            for j in 0..node_count {
                let Some(from_k) = dist[k][j] else { continue };
                let through = to_k.saturating_add(from_k);
                if dist[i][j].map_or(true, |d| through < d) {
                    dist[i][j] = Some(through);
                }
            }
        }
    }

    let total: u128 = (0..node_count)
        .flat_map(|i| (i + 1..node_count).map(move |j| (i, j)))
        .filter_map(|(i, j)| dist[i][j])
        .map(u128::from)
        .sum();

    format!("{total:b}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_exists() {
        assert!(path_exists(3, &[(0, 1), (1, 2)], 0, 2));
        assert!(path_exists(3, &[(0, 1), (1, 2)], 2, 0));
        assert!(!path_exists(4, &[(0, 1), (2, 3)], 0, 3));
        assert!(path_exists(1, &[], 0, 0));
    }

    #[test]
    fn test_path_invalid_endpoints() {
        assert!(!path_exists(3, &[(0, 1)], 0, 5));
        assert!(!path_exists(3, &[(0, 1)], 7, 1));
        assert!(!path_exists(0, &[], 0, 0));
        // Edge into a missing node is ignored
        assert!(!path_exists(2, &[(0, 9), (9, 1)], 0, 1));
    }

    #[test]
    fn test_path_long_chain() {
        let edges: Vec<_> = (0..999).map(|i| (i, i + 1)).collect();
        assert!(path_exists(1000, &edges, 0, 999));
    }

    #[test]
    fn test_mst_examples() {
        let roads = [Road::new(0, 1, 1, 0), Road::new(1, 2, 1, 0), Road::new(0, 2, 10, 0)];
        assert_eq!(min_bribe_cost(3, 10, 0, &roads), 20);
        assert_eq!(min_bribe_cost(1, 5, 5, &[]), 0);
        assert_eq!(min_bribe_cost(0, 10, 10, &[]), 0);
    }

    #[test]
    fn test_mst_disconnected() {
        let roads = [Road::new(0, 1, 1, 0), Road::new(2, 3, 1, 0)];
        assert_eq!(min_bribe_cost(4, 10, 0, &roads), -1);
    }

    #[test]
    fn test_mst_zero_rates_and_parallel_roads() {
        let roads = [Road::new(0, 1, 5, 5), Road::new(1, 2, 5, 5)];
        assert_eq!(min_bribe_cost(3, 0, 0, &roads), 0);

        let parallel = [Road::new(0, 1, 10, 0), Road::new(0, 1, 1, 0)];
        assert_eq!(min_bribe_cost(2, 1, 0, &parallel), 1);
    }

    #[test]
    fn test_mst_large_costs() {
        let roads = [Road::new(0, 1, 1_000_000_000, 1_000_000_000)];
        assert_eq!(
            min_bribe_cost(2, 1_000_000_000, 1_000_000_000, &roads),
            2_000_000_000_000_000_000
        );
    }

    #[test]
    fn test_mst_total_beyond_i64_saturates() {
        let half = i64::MAX / 2;
        let roads = [Road::new(0, 1, half, 0), Road::new(1, 2, half, 0)];
        assert_eq!(min_bribe_cost(3, 2, 0, &roads), i64::MAX);

        // Each road alone overflows i64, the total still fits
        let roads = [Road::new(0, 1, i64::MAX, 0), Road::new(1, 2, i64::MIN, 0)];
        assert_eq!(min_bribe_cost(3, 2, 0, &roads), -2);
        assert_eq!(Road::new(0, 1, i64::MAX, i64::MAX).cost(2, 2), i128::from(i64::MAX) * 4);
    }

    #[test]
    fn test_distance_sums() {
        assert_eq!(sum_min_distances_binary(3, &[(0, 1, 1), (1, 2, 2)]), "110");
        assert_eq!(sum_min_distances_binary(2, &[(0, 1, 4)]), "100");
        assert_eq!(sum_min_distances_binary(3, &[(0, 1, 10), (0, 1, 1), (1, 2, 2)]), "110");
    }

    #[test]
    fn test_distance_roads_are_one_way() {
        // 1 cannot reach 2: only 0->1 and 0->2 exist
        assert_eq!(sum_min_distances_binary(3, &[(0, 1, 2), (0, 2, 8)]), "1010");
        // Listing the road the other way round adds the 1->2 leg
        assert_eq!(
            sum_min_distances_binary(3, &[(0, 1, 2), (0, 2, 8), (1, 0, 2)]),
            "10100"
        );
    }

    #[test]
    fn test_distance_trivial_graphs() {
        assert_eq!(sum_min_distances_binary(1, &[]), "0");
        assert_eq!(sum_min_distances_binary(0, &[]), "0");
        assert_eq!(sum_min_distances_binary(3, &[(0, 5, 1)]), "0");
    }
}
