//! 推流-重标号（preflow-push）最大流算法
//!
//! 每个节点维护高度与盈余，二者都放在本次运行的旁表中。
//! 源点高度为 |V|，先把源点出边全部饱和；之后不断从活跃节点向
//! 更低的邻居推流，无法推流时把高度抬到最低可达邻居之上 1。
//! 活跃节点按 FIFO 顺序处理。

use super::residual::{add_flow, flow_terminals, MaxFlow, ResidualNetwork};
use super::validate::Precondition;
use super::AlgorithmKind;
use crate::error::{Error, Result};
use crate::graph::Graph;
use std::collections::VecDeque;
use tracing::{debug, info, trace};

/// 一次运行的高度与盈余旁表
struct Labels {
    height: Vec<usize>,
    excess: Vec<i64>,
    active: VecDeque<usize>,
    queued: Vec<bool>,
}

impl Labels {
    fn new(n: usize) -> Self {
        Self {
            height: vec![0; n],
            excess: vec![0; n],
            active: VecDeque::new(),
            queued: vec![false; n],
        }
    }

    fn activate(&mut self, node: usize) {
        if !self.queued[node] && self.excess[node] > 0 {
            self.queued[node] = true;
            self.active.push_back(node);
        }
    }
}

/// 推流-重标号算法实例，只对应一次 `run()`
pub struct PreflowPush<'g> {
    graph: &'g mut Graph,
    precondition: Precondition,
}

impl<'g> PreflowPush<'g> {
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

        let mut pushes = 0;
        let mut relabels = 0;
        let mut labels = Labels::new(network.node_count());

        if s != t {
            labels.height[s] = network.node_count();

            // 饱和源点的所有出边
            let source_arcs: Vec<_> = network.arcs(s).to_vec();
            for arc in source_arcs {
                let amount = network.residual(arc);
                if !arc.forward || amount <= 0 {
                    continue;
                }
                let v = network.arc_head(arc);
                network.push(arc, amount);
                labels.excess[s] = add_flow(labels.excess[s], -amount)?;
                labels.excess[v] = add_flow(labels.excess[v], amount)?;
                if v != t {
                    labels.activate(v);
                }
            }

            while let Some(u) = labels.active.pop_front() {
                labels.queued[u] = false;

                while labels.excess[u] > 0 {
                    let mut lowest: Option<usize> = None;

                    for i in 0..network.arcs(u).len() {
                        let arc = network.arcs(u)[i];
                        let residual = network.residual(arc);
                        if residual <= 0 {
                            continue;
                        }
                        let v = network.arc_head(arc);
                        if labels.height[u] > labels.height[v] {
                            let amount = residual.min(labels.excess[u]);
                            network.push(arc, amount);
                            labels.excess[u] -= amount;
                            labels.excess[v] = add_flow(labels.excess[v], amount)?;
                            pushes += 1;
                            trace!(from = u, to = v, amount, "push");
                            if v != s && v != t {
                                labels.activate(v);
                            }
                            if labels.excess[u] == 0 {
                                break;
                            }
                        } else {
                            lowest = Some(lowest.map_or(labels.height[v], |h| h.min(labels.height[v])));
                        }
                    }

                    if labels.excess[u] == 0 {
                        break;
                    }

                    // 没有可推的下坡弧：重标号
                    let Some(min_height) = lowest else {
                        return Err(Error::AlgorithmError(format!(
                            "推流-重标号：节点 {} 有盈余但没有剩余容量的弧",
                            network.node_id(u)
                        )));
                    };
                    labels.height[u] = min_height + 1;
                    relabels += 1;
                    trace!(node = u, height = labels.height[u], "relabel");
                }
            }
        }

        let value = if s != t { labels.excess[t] } else { 0 };

        network.write_back(graph);
        graph.set_solved(true);
        debug!(pushes, relabels, "preflow discharged");
        info!(algorithm = "preflow_push", value, pushes, "max flow computed");

        network.into_result(AlgorithmKind::PreflowPush, source, sink, value, pushes)
    }
}
