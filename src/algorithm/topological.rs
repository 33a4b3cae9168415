//! 拓扑序最短路算法（仅限有向无环图）
//!
//! 先用 Kahn 算法求出拓扑序，再按该顺序对每条边只松弛一次：
//! 处理某节点时它的所有前驱都已确定，因此一遍即可得到最优距离。

use super::path::{extend_distance, ShortestPaths};
use super::validate::Precondition;
use super::AlgorithmKind;
use crate::error::{Error, Result};
use crate::graph::{AdjacencyIndex, Graph, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tracing::{debug, info, warn};

/// 拓扑序最短路结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologicalPaths {
    /// 计算出的拓扑序
    pub order: Vec<NodeId>,
    /// 最短路
    pub paths: ShortestPaths,
}

/// Kahn 算法求拓扑序；存在环时返回 `CycleDetected`
pub fn topological_order(graph: &Graph, index: &AdjacencyIndex) -> Result<Vec<NodeId>> {
    let mut in_degree: HashMap<NodeId, usize> =
        graph.nodes().map(|n| (n, index.in_degree(n))).collect();

    let mut barren: VecDeque<NodeId> = graph
        .nodes()
        .filter(|n| in_degree[n] == 0)
        .collect();
    let mut order = Vec::with_capacity(graph.node_count());

    while let Some(node) = barren.pop_front() {
        order.push(node);
        for succ in index.successors(node) {
            if let Some(degree) = in_degree.get_mut(&succ) {
                *degree -= 1;
                if *degree == 0 {
                    barren.push_back(succ);
                }
            }
        }
    }

    if order.len() < graph.node_count() {
        debug!(ordered = order.len(), total = graph.node_count(), "kahn stalled");
        return Err(Error::CycleDetected);
    }

    Ok(order)
}

/// 拓扑序最短路算法实例，只对应一次 `run()`
pub struct TopologicalOrdering<'g> {
    graph: &'g mut Graph,
    precondition: Precondition,
}

impl<'g> TopologicalOrdering<'g> {
    /// 创建算法实例并执行前置检查
    pub fn new(graph: &'g mut Graph) -> Self {
        let precondition = Precondition::check(graph, true);
        Self {
            graph,
            precondition,
        }
    }

    pub fn run(self) -> Result<TopologicalPaths> {
        let Self {
            graph,
            precondition,
        } = self;
        precondition.into_result(graph)?;

        if let Some(key) = graph.first_negative_edge() {
            graph.set_solved(false);
            return Err(Error::NegativeWeightNotSupported(key));
        }

        let source = graph.source().ok_or(Error::MissingSource)?;
        let destination = graph.destination().ok_or(Error::MissingDestination)?;
        let index = graph.adjacency();

        let order = match topological_order(graph, &index) {
            Ok(order) => order,
            Err(err) => {
                graph.set_solved(false);
                warn!(algorithm = "topological", "graph contains a cycle");
                return Err(err);
            }
        };

        let mut paths = ShortestPaths::new(AlgorithmKind::Topological, source, Some(destination));
        let mut distances: HashMap<NodeId, i64> = HashMap::new();
        distances.insert(source, 0);

        for &u in &order {
            let Some(&du) = distances.get(&u) else {
                continue;
            };
            for key in index.outgoing(u) {
                let weight = graph.edge(*key).map(|e| e.weight()).unwrap_or(0);
                let candidate = match extend_distance(du, weight) {
                    Ok(candidate) => candidate,
                    Err(err) => {
                        graph.set_solved(false);
                        return Err(err);
                    }
                };
                if distances.get(&key.head).map_or(true, |&dv| candidate < dv) {
                    distances.insert(key.head, candidate);
                    paths.predecessors.insert(key.head, u);
                }
            }
        }

        for &node in &order {
            if let Some(&d) = distances.get(&node) {
                paths.distances.insert(node, d);
            }
        }

        graph.set_solved(true);
        info!(
            algorithm = "topological",
            distance = ?paths.destination_distance(),
            "shortest path computed"
        );

        Ok(TopologicalPaths { order, paths })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::BellmanFord;

    fn n(id: u32) -> NodeId {
        NodeId::new(id)
    }

    fn build(nodes: u32, edges: &[(u32, u32, i64)], source: u32, dest: u32) -> Graph {
        let mut graph = Graph::new();
        for id in 1..=nodes {
            graph.add_node(n(id)).unwrap();
        }
        for &(u, v, w) in edges {
            graph.add_edge(n(u), n(v), w).unwrap();
        }
        graph.set_source(n(source)).unwrap();
        graph.set_destination(n(dest)).unwrap();
        graph
    }

    fn assert_is_topological(graph: &Graph, order: &[NodeId]) {
        let pos: HashMap<NodeId, usize> = order.iter().enumerate().map(|(i, &n)| (n, i)).collect();
        for edge in graph.edges() {
            assert!(pos[&edge.tail()] < pos[&edge.head()], "{} out of order", edge);
        }
    }

    #[test]
    fn test_dag_shortest_path() {
        let edges = [(1, 2, 2), (1, 3, 6), (2, 3, 3), (2, 4, 8), (3, 4, 1), (3, 5, 7), (4, 5, 2)];
        let mut graph = build(5, &edges, 1, 5);

        let result = TopologicalOrdering::new(&mut graph).run().unwrap();

        assert_is_topological(&graph, &result.order);
        assert_eq!(result.order.len(), 5);
        assert_eq!(result.paths.destination_distance(), Some(8));
        assert_eq!(
            result.paths.destination_path(),
            Some(vec![n(1), n(2), n(3), n(4), n(5)])
        );
        assert!(graph.is_solved());
    }

    #[test]
    fn test_matches_bellman_ford() {
        let edges = [(1, 2, 4), (1, 3, 1), (3, 2, 1), (2, 4, 5), (3, 4, 9), (4, 5, 0)];
        let mut a = build(5, &edges, 1, 5);
        let mut b = a.clone();

        let topo = TopologicalOrdering::new(&mut a).run().unwrap();
        let bf = BellmanFord::new(&mut b).run().unwrap();

        assert_eq!(topo.paths.destination_distance(), Some(7));
        assert_eq!(topo.paths.destination_distance(), bf.destination_distance());
    }

    #[test]
    fn test_cycle_detected() {
        let mut graph = build(3, &[(1, 2, 1), (2, 3, 1), (3, 2, 1)], 1, 3);

        let err = TopologicalOrdering::new(&mut graph).run().unwrap_err();
        assert!(matches!(err, Error::CycleDetected));
        assert!(!graph.is_solved());
    }

    #[test]
    fn test_negative_weight_rejected_before_ordering() {
        // 即使同时有环，也先报告负权边
        let mut graph = build(3, &[(1, 2, 1), (2, 3, -1), (3, 2, 1)], 1, 3);

        let err = TopologicalOrdering::new(&mut graph).run().unwrap_err();
        assert!(matches!(err, Error::NegativeWeightNotSupported(_)));
    }

    #[test]
    fn test_order_helper() {
        let graph = build(4, &[(1, 2, 1), (1, 3, 1), (2, 4, 1), (3, 4, 1)], 1, 4);
        let index = graph.adjacency();

        let order = topological_order(&graph, &index).unwrap();
        assert_eq!(order.first(), Some(&n(1)));
        assert_eq!(order.last(), Some(&n(4)));
        assert_is_topological(&graph, &order);
    }

    #[test]
    fn test_distance_overflow_is_an_error() {
        let mut graph = build(3, &[(1, 2, i64::MAX), (2, 3, 1)], 1, 3);
        let err = TopologicalOrdering::new(&mut graph).run().unwrap_err();
        assert!(matches!(err, Error::Overflow(_)));
        assert!(!graph.is_solved());
    }
}
