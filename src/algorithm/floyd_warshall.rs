//! Floyd-Warshall 全源最短路算法
//!
//! 以 n×n 距离表和前驱表为状态，依次把每个节点作为中间点松弛所有节点对，
//! 复杂度 O(V³)。不可达用一个有限哨兵值表示，哨兵大于任何简单路径长度。

use super::path::ShortestPaths;
use super::validate::Precondition;
use super::AlgorithmKind;
use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// 全源最短路结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllPairsShortestPaths {
    /// 矩阵的行列顺序
    pub nodes: Vec<NodeId>,
    /// 距离表，`>= sentinel` 表示不可达
    pub distances: Vec<Vec<i64>>,
    /// 前驱表：`predecessors[i][j]` 为 i 到 j 最短路上 j 的前一个节点下标
    pub predecessors: Vec<Vec<Option<usize>>>,
    /// 不可达哨兵
    pub sentinel: i64,
    pub source: NodeId,
    pub destination: Option<NodeId>,
}

impl AllPairsShortestPaths {
    fn position(&self, node: NodeId) -> Option<usize> {
        self.nodes.iter().position(|&n| n == node)
    }

    /// 两点间最短距离，不可达时为 None
    pub fn distance(&self, from: NodeId, to: NodeId) -> Option<i64> {
        let i = self.position(from)?;
        let j = self.position(to)?;
        let d = self.distances[i][j];
        (d < self.sentinel).then_some(d)
    }

    /// 两点间最短路径（起点在前）
    pub fn path(&self, from: NodeId, to: NodeId) -> Option<Vec<NodeId>> {
        let i = self.position(from)?;
        let mut j = self.position(to)?;
        if self.distances[i][j] >= self.sentinel {
            return None;
        }

        let mut path = vec![self.nodes[j]];
        while j != i {
            j = self.predecessors[i][j]?;
            path.push(self.nodes[j]);
            if path.len() > self.nodes.len() {
                return None;
            }
        }

        path.reverse();
        Some(path)
    }

    pub fn destination_distance(&self) -> Option<i64> {
        self.destination.and_then(|d| self.distance(self.source, d))
    }

    pub fn destination_path(&self) -> Option<Vec<NodeId>> {
        self.destination.and_then(|d| self.path(self.source, d))
    }

    /// 距离矩阵，不可达为 None
    pub fn matrix(&self) -> Vec<Vec<Option<i64>>> {
        self.distances
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&d| (d < self.sentinel).then_some(d))
                    .collect()
            })
            .collect()
    }

    /// 以源点为起点的单源视图
    pub fn source_paths(&self) -> ShortestPaths {
        let mut paths = ShortestPaths::new(AlgorithmKind::FloydWarshall, self.source, self.destination);
        let Some(i) = self.position(self.source) else {
            return paths;
        };

        for (j, &node) in self.nodes.iter().enumerate() {
            let d = self.distances[i][j];
            if d >= self.sentinel {
                continue;
            }
            paths.distances.insert(node, d);
            if let Some(p) = self.predecessors[i][j] {
                if j != i {
                    paths.predecessors.insert(node, self.nodes[p]);
                }
            }
        }

        paths
    }
}

/// Floyd-Warshall 算法实例，只对应一次 `run()`
pub struct FloydWarshall<'g> {
    graph: &'g mut Graph,
    precondition: Precondition,
}

impl<'g> FloydWarshall<'g> {
    /// 创建算法实例并执行前置检查；终点可选
    pub fn new(graph: &'g mut Graph) -> Self {
        let precondition = Precondition::check(graph, false);
        Self {
            graph,
            precondition,
        }
    }

    /// 哨兵：大于 `max|w| × n`，任何简单路径都达不到
    pub fn sentinel_for(graph: &Graph) -> i64 {
        let max_abs = graph
            .edges()
            .map(|e| e.weight().saturating_abs())
            .max()
            .unwrap_or(0)
            .max(1);
        let n = graph.node_count().max(1) as i64;
        max_abs.saturating_mul(n).saturating_add(1)
    }

    pub fn run(self) -> Result<AllPairsShortestPaths> {
        let Self {
            graph,
            precondition,
        } = self;
        precondition.into_result(graph)?;

        let source = graph.source().ok_or(Error::MissingSource)?;
        let index = graph.adjacency();
        let n = index.node_count();
        let sentinel = Self::sentinel_for(graph);

        let mut dist = vec![vec![sentinel; n]; n];
        let mut pred: Vec<Vec<Option<usize>>> = vec![vec![None; n]; n];

        for (i, row) in dist.iter_mut().enumerate() {
            row[i] = 0;
        }
        for edge in graph.edges() {
            if let (Some(i), Some(j)) = (index.position(edge.tail()), index.position(edge.head())) {
                dist[i][j] = edge.weight();
                pred[i][j] = Some(i);
            }
        }

        for k in 0..n {
            for i in 0..n {
                let dik = dist[i][k];
                if dik >= sentinel {
                    continue;
                }
                for j in 0..n {
                    let dkj = dist[k][j];
                    if dkj >= sentinel {
                        continue;
                    }
                    let through_k = dik.saturating_add(dkj);
                    if through_k < dist[i][j] {
                        dist[i][j] = through_k;
                        pred[i][j] = pred[k][j];
                    }
                }
            }
        }

        if (0..n).any(|i| dist[i][i] < 0) {
            graph.set_solved(false);
            warn!(algorithm = "floyd_warshall", "negative cycle detected");
            return Err(Error::NegativeCycleDetected);
        }

        let result = AllPairsShortestPaths {
            nodes: index.nodes().to_vec(),
            distances: dist,
            predecessors: pred,
            sentinel,
            source,
            destination: graph.destination(),
        };

        graph.set_solved(true);
        info!(
            algorithm = "floyd_warshall",
            nodes = n,
            distance = ?result.destination_distance(),
            "all pairs shortest paths computed"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(id: u32) -> NodeId {
        NodeId::new(id)
    }

    fn build(nodes: u32, edges: &[(u32, u32, i64)], source: u32) -> Graph {
        let mut graph = Graph::new();
        for id in 1..=nodes {
            graph.add_node(n(id)).unwrap();
        }
        for &(u, v, w) in edges {
            graph.add_edge(n(u), n(v), w).unwrap();
        }
        graph.set_source(n(source)).unwrap();
        graph
    }

    #[test]
    fn test_all_pairs() {
        let mut graph = build(4, &[(1, 2, 3), (2, 3, 1), (1, 3, 7), (3, 4, 2), (4, 1, 1)], 1);
        graph.set_destination(n(4)).unwrap();

        let result = FloydWarshall::new(&mut graph).run().unwrap();

        assert_eq!(result.distance(n(1), n(3)), Some(4));
        assert_eq!(result.distance(n(2), n(1)), Some(4));
        assert_eq!(result.distance(n(4), n(3)), Some(5));
        assert_eq!(result.destination_distance(), Some(6));
        assert_eq!(result.destination_path(), Some(vec![n(1), n(2), n(3), n(4)]));
        assert_eq!(result.path(n(3), n(2)), Some(vec![n(3), n(4), n(1), n(2)]));
        assert!(graph.is_solved());
    }

    #[test]
    fn test_unreachable_pairs_use_sentinel() {
        let mut graph = build(3, &[(1, 2, 5), (2, 3, 5)], 1);

        let result = FloydWarshall::new(&mut graph).run().unwrap();
        let matrix = result.matrix();

        assert_eq!(result.sentinel, 16);
        assert_eq!(result.distance(n(3), n(1)), None);
        assert_eq!(result.path(n(3), n(1)), None);
        assert_eq!(matrix[0], vec![Some(0), Some(5), Some(10)]);
        assert_eq!(matrix[2], vec![None, None, Some(0)]);
        // 未指定终点也能运行
        assert_eq!(result.destination_distance(), None);
    }

    #[test]
    fn test_negative_edges_do_not_leak_through_sentinel() {
        // 3 无法到达 1，即使 1 -> 2 为负权，3 -> 1 仍应为不可达
        let mut graph = build(3, &[(1, 2, -4), (1, 3, 2)], 1);

        let result = FloydWarshall::new(&mut graph).run().unwrap();

        assert_eq!(result.distance(n(1), n(2)), Some(-4));
        assert_eq!(result.distance(n(3), n(2)), None);
        assert_eq!(result.distance(n(2), n(3)), None);
    }

    #[test]
    fn test_negative_cycle_detected() {
        let mut graph = build(2, &[(1, 2, 5), (2, 1, -7)], 1);

        let err = FloydWarshall::new(&mut graph).run().unwrap_err();
        assert!(matches!(err, Error::NegativeCycleDetected));
        assert!(!graph.is_solved());
    }

    #[test]
    fn test_source_paths_view() {
        let mut graph = build(3, &[(1, 2, 1), (2, 3, 2), (1, 3, 5)], 1);
        graph.set_destination(n(3)).unwrap();

        let result = FloydWarshall::new(&mut graph).run().unwrap();
        let paths = result.source_paths();

        assert_eq!(paths.destination_distance(), Some(3));
        assert_eq!(paths.destination_path(), Some(vec![n(1), n(2), n(3)]));
    }
}
