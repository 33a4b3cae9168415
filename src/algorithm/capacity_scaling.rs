//! 容量缩放最大流算法
//!
//! 阈值 Δ 从 2^⌊log2 U⌋ 开始（U 为最大边容量），每个阶段只在原始容量
//! 不小于 Δ 的边上寻找增广路，找不到时 Δ 减半，直到 Δ < 1。
//! 最后一个阶段 Δ = 1 覆盖所有边，因此结果与普通增广路算法一致。

use super::residual::{add_flow, flow_terminals, MaxFlow, ResidualNetwork};
use super::validate::Precondition;
use super::AlgorithmKind;
use crate::error::Result;
use crate::graph::Graph;
use tracing::{debug, info};

/// 不超过 `capacity` 的最大 2 的幂；`capacity < 1` 时为 0
pub fn initial_threshold(capacity: i64) -> i64 {
    if capacity < 1 {
        return 0;
    }
    1i64 << (63 - capacity.leading_zeros())
}

/// 容量缩放算法实例，只对应一次 `run()`
pub struct CapacityScaling<'g> {
    graph: &'g mut Graph,
    precondition: Precondition,
}

impl<'g> CapacityScaling<'g> {
    /// 创建算法实例：重置所有边的流字段并执行前置检查
    pub fn new(graph: &'g mut Graph) -> Self {
        graph.reset_flows();
        let precondition = Precondition::check(graph, true);
        Self {
            graph,
            precondition,
        }
    }

    pub fn run(self) -> Result<MaxFlow> {
        let Self {
            graph,
            precondition,
        } = self;
        precondition.into_result(graph)?;

        let (source, sink) = flow_terminals(graph)?;
        let mut network = ResidualNetwork::from_graph(graph);
        let s = network.position(source)?;
        let t = network.position(sink)?;

        let mut value = 0;
        let mut augmentations = 0;
        let mut thresholds = Vec::new();
        let mut delta = initial_threshold(network.max_capacity());

        while delta >= 1 && s != t {
            thresholds.push(delta);
            let before = augmentations;

            while let Some(path) = network.find_augmenting_path(s, t, delta) {
                value = add_flow(value, network.augment(&path))?;
                augmentations += 1;
            }

            debug!(delta, augmentations = augmentations - before, total = value, "phase finished");
            delta /= 2;
        }

        network.write_back(graph);
        graph.set_solved(true);
        info!(
            algorithm = "capacity_scaling",
            value,
            augmentations,
            phases = thresholds.len(),
            "max flow computed"
        );

        let mut result =
            network.into_result(AlgorithmKind::CapacityScaling, source, sink, value, augmentations)?;
        result.thresholds = thresholds;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::{AugmentingPath, EdgeUsage};
    use crate::error::Error;
    use crate::graph::{EdgeKey, NodeId};

    fn n(id: u32) -> NodeId {
        NodeId::new(id)
    }

    fn build(nodes: u32, edges: &[(u32, u32, i64)], source: u32, sink: u32) -> Graph {
        let mut graph = Graph::new();
        for id in 1..=nodes {
            graph.add_node(n(id)).unwrap();
        }
        for &(u, v, w) in edges {
            graph.add_edge(n(u), n(v), w).unwrap();
        }
        graph.set_source(n(source)).unwrap();
        graph.set_destination(n(sink)).unwrap();
        graph
    }

    #[test]
    fn test_initial_threshold() {
        assert_eq!(initial_threshold(0), 0);
        assert_eq!(initial_threshold(1), 1);
        assert_eq!(initial_threshold(10), 8);
        assert_eq!(initial_threshold(16), 16);
        assert_eq!(initial_threshold(1000), 512);
    }

    #[test]
    fn test_thresholds_halve() {
        let mut graph = build(3, &[(1, 2, 10), (2, 3, 4)], 1, 3);

        let result = CapacityScaling::new(&mut graph).run().unwrap();

        assert_eq!(result.value, 4);
        assert_eq!(result.thresholds, vec![8, 4, 2, 1]);
        let at = result.edge(EdgeKey::new(n(2), n(3))).unwrap();
        assert_eq!(at.usage(), EdgeUsage::Full);
        assert_eq!(result.edge(EdgeKey::new(n(1), n(2))).unwrap().residual(), 6);
    }

    #[test]
    fn test_large_capacities() {
        // 经典的坏例子：朴素增广可能在中间边上来回 2000 次
        let mut graph = build(
            4,
            &[(1, 2, 1000), (1, 3, 1000), (2, 3, 1), (2, 4, 1000), (3, 4, 1000)],
            1,
            4,
        );

        let result = CapacityScaling::new(&mut graph).run().unwrap();

        assert_eq!(result.value, 2000);
        assert!(result.augmentations <= 4);
        assert_eq!(result.thresholds.first(), Some(&512));
    }

    #[test]
    fn test_matches_augmenting_path() {
        let edges = [(1, 2, 16), (1, 3, 13), (2, 3, 10), (3, 2, 4), (2, 4, 12), (4, 3, 9), (3, 5, 14), (5, 4, 7), (4, 6, 20), (5, 6, 4)];
        let mut a = build(6, &edges, 1, 6);
        let mut b = a.clone();

        let scaling = CapacityScaling::new(&mut a).run().unwrap();
        let plain = AugmentingPath::new(&mut b).run().unwrap();

        assert_eq!(scaling.value, 23);
        assert_eq!(scaling.value, plain.value);
    }

    #[test]
    fn test_all_zero_capacities() {
        let mut graph = build(2, &[(1, 2, 0)], 1, 2);

        let result = CapacityScaling::new(&mut graph).run().unwrap();
        assert_eq!(result.value, 0);
        assert!(result.thresholds.is_empty());
        assert!(graph.is_solved());
    }

    #[test]
    fn test_flow_value_overflow_is_an_error() {
        let mut graph = build(4, &[(1, 2, i64::MAX), (1, 3, i64::MAX), (2, 4, i64::MAX), (3, 4, i64::MAX)], 1, 4);
        let err = CapacityScaling::new(&mut graph).run().unwrap_err();
        assert!(matches!(err, Error::Overflow(_)));
        assert!(!graph.is_solved());
    }
}
