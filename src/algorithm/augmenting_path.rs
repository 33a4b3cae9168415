//! 增广路最大流算法
//!
//! Ford-Fulkerson：反复用 BFS 标号在残量网络中寻找源点到汇点的增广路，
//! 沿路径推送瓶颈流量，直到汇点无法被标号为止。

use super::residual::{add_flow, flow_terminals, MaxFlow, ResidualNetwork};
use super::validate::Precondition;
use super::AlgorithmKind;
use crate::error::Result;
use crate::graph::Graph;
use tracing::{debug, info};

/// 增广路算法实例，只对应一次 `run()`
pub struct AugmentingPath<'g> {
    graph: &'g mut Graph,
    precondition: Precondition,
}

impl<'g> AugmentingPath<'g> {
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

        if s != t {
            while let Some(path) = network.find_augmenting_path(s, t, 0) {
                let delta = network.augment(&path);
                value = add_flow(value, delta)?;
                augmentations += 1;
                debug!(delta, hops = path.len(), total = value, "augmented");
            }
        }

        network.write_back(graph);
        graph.set_solved(true);
        info!(
            algorithm = "augmenting_path",
            value, augmentations, "max flow computed"
        );

        network.into_result(AlgorithmKind::AugmentingPath, source, sink, value, augmentations)
    }
}
