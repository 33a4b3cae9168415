//! Bellman-Ford 最短路算法
//!
//! 标号修正法：对全部边反复松弛，最多 |V|-1 轮，某一轮没有任何改进时提前结束。
//! 收敛后再扫描一遍边，若仍可松弛则说明源点可达一个负环。

use super::path::{extend_distance, ShortestPaths};
use super::validate::Precondition;
use super::AlgorithmKind;
use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Bellman-Ford 算法实例，只对应一次 `run()`
pub struct BellmanFord<'g> {
    graph: &'g mut Graph,
    precondition: Precondition,
}

impl<'g> BellmanFord<'g> {
    /// 创建算法实例并执行前置检查
    pub fn new(graph: &'g mut Graph) -> Self {
        let precondition = Precondition::check(graph, true);
        Self {
            graph,
            precondition,
        }
    }

    /// 计算从源点出发的最短路；检测到负环时失败且图保持未求解
    pub fn run(self) -> Result<ShortestPaths> {
        let Self {
            graph,
            precondition,
        } = self;
        precondition.into_result(graph)?;

        let source = graph.source().ok_or(Error::MissingSource)?;
        let destination = graph.destination().ok_or(Error::MissingDestination)?;

        // None 表示无穷远
        let mut distances: HashMap<NodeId, Option<i64>> =
            graph.nodes().map(|node| (node, None)).collect();
        let mut predecessors: HashMap<NodeId, NodeId> = HashMap::new();
        distances.insert(source, Some(0));

        let edges: Vec<(NodeId, NodeId, i64)> = graph
            .edges()
            .map(|e| (e.tail(), e.head(), e.weight()))
            .collect();
        let max_passes = graph.node_count().saturating_sub(1);

        let mut passes = 0;
        while passes < max_passes {
            passes += 1;
            let mut changed = false;

            for &(u, v, w) in &edges {
                let Some(du) = distances[&u] else { continue };
                let candidate = match extend_distance(du, w) {
                    Ok(candidate) => candidate,
                    Err(err) => {
                        graph.set_solved(false);
                        return Err(err);
                    }
                };
                if distances[&v].map_or(true, |dv| candidate < dv) {
                    distances.insert(v, Some(candidate));
                    predecessors.insert(v, u);
                    changed = true;
                }
            }

            if !changed {
                break;
            }
        }
        debug!(passes, max_passes, "relaxation converged");

        let negative_cycle = edges.iter().any(|&(u, v, w)| match (distances[&u], distances[&v]) {
            // 负向溢出说明还能继续变小
            (Some(du), Some(dv)) => du.checked_add(w).map_or(w < 0, |candidate| dv > candidate),
            (Some(_), None) => true,
            _ => false,
        });

        if negative_cycle {
            graph.set_solved(false);
            warn!(algorithm = "bellman_ford", "negative cycle detected");
            return Err(Error::NegativeCycleDetected);
        }

        let mut result = ShortestPaths::new(AlgorithmKind::BellmanFord, source, Some(destination));
        for node in graph.nodes() {
            if let Some(d) = distances[&node] {
                result.distances.insert(node, d);
            }
        }
        result.predecessors = predecessors;

        graph.set_solved(true);
        info!(
            algorithm = "bellman_ford",
            passes,
            distance = ?result.destination_distance(),
            "shortest path computed"
        );

        Ok(result)
    }
}
