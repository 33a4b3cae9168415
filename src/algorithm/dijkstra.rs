//! Dijkstra 最短路算法
//!
//! 标号设定法：每轮从优先队列中取出暂定距离最小的未确定节点，
//! 松弛其出边后将其确定，之后不再修改。要求边权非负。

use super::path::{extend_distance, ShortestPaths};
use super::validate::Precondition;
use super::AlgorithmKind;
use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId};
use priority_queue::PriorityQueue;
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use tracing::{info, trace};

/// Dijkstra 算法实例，只对应一次 `run()`
pub struct Dijkstra<'g> {
    graph: &'g mut Graph,
    precondition: Precondition,
}

impl<'g> Dijkstra<'g> {
    /// 创建算法实例并执行前置检查
    pub fn new(graph: &'g mut Graph) -> Self {
        let precondition = Precondition::check(graph, true);
        Self {
            graph,
            precondition,
        }
    }

    /// 计算从源点出发的最短路，终点确定后提前结束
    pub fn run(self) -> Result<ShortestPaths> {
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

        let mut tentative: HashMap<NodeId, i64> = HashMap::new();
        let mut predecessors: HashMap<NodeId, NodeId> = HashMap::new();
        let mut settled: HashSet<NodeId> = HashSet::new();
        let mut result = ShortestPaths::new(AlgorithmKind::Dijkstra, source, Some(destination));

        let mut frontier = PriorityQueue::new();
        tentative.insert(source, 0);
        frontier.push(source, Reverse(0i64));

        while let Some((u, Reverse(dist_u))) = frontier.pop() {
            settled.insert(u);
            result.distances.insert(u, dist_u);
            trace!(node = %u, distance = dist_u, "settled");

            if u == destination {
                break;
            }

            for key in index.outgoing(u) {
                let v = key.head;
                if settled.contains(&v) {
                    continue;
                }
                let weight = graph.edge(*key).map(|e| e.weight()).unwrap_or(0);
                let candidate = match extend_distance(dist_u, weight) {
                    Ok(candidate) => candidate,
                    Err(err) => {
                        graph.set_solved(false);
                        return Err(err);
                    }
                };

                let improved = tentative.get(&v).map_or(true, |&d| candidate < d);
                if improved {
                    tentative.insert(v, candidate);
                    predecessors.insert(v, u);
                    frontier.push_increase(v, Reverse(candidate));
                }
            }
        }

        result.predecessors = predecessors
            .into_iter()
            .filter(|(node, _)| settled.contains(node))
            .collect();

        graph.set_solved(true);
        info!(
            algorithm = "dijkstra",
            settled = settled.len(),
            distance = ?result.destination_distance(),
            "shortest path computed"
        );

        Ok(result)
    }
}
