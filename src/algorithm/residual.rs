//! 残量网络与最大流结果
//!
//! 三种最大流算法共用的运行期状态。每条原始边对应两条弧：
//! 正向弧的残量为 `capacity - flow`，反向弧的残量为 `flow`（可退回的流量）。
//! 边用其在图中的位置标识，位置与 (tail, head) 一一对应。

use super::AlgorithmKind;
use crate::error::{Error, Result};
use crate::graph::{EdgeKey, Graph, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

// ==================== 结果类型 ====================

/// 边的使用情况
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeUsage {
    /// 流量等于容量
    Full,
    /// 有流量但未满
    Partial,
    /// 无流量
    Unused,
}

/// 单条边的流量报告
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeFlow {
    pub key: EdgeKey,
    pub flow: i64,
    pub capacity: i64,
}

impl EdgeFlow {
    /// 剩余容量
    pub fn residual(&self) -> i64 {
        self.capacity - self.flow
    }

    pub fn usage(&self) -> EdgeUsage {
        if self.flow > 0 && self.flow == self.capacity {
            EdgeUsage::Full
        } else if self.flow > 0 {
            EdgeUsage::Partial
        } else {
            EdgeUsage::Unused
        }
    }
}

/// 最大流结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaxFlow {
    /// 产生结果的算法
    pub algorithm: AlgorithmKind,
    pub source: NodeId,
    pub sink: NodeId,
    /// 最大流量值
    pub value: i64,
    /// 每条边的流量分配（图中边的顺序）
    pub edges: Vec<EdgeFlow>,
    /// 最小割的源侧节点集
    pub source_side: HashSet<NodeId>,
    /// 容量缩放各阶段使用的阈值（其他算法为空）
    pub thresholds: Vec<i64>,
    /// 增广次数（推流-重标号为推流次数）
    pub augmentations: usize,
}

impl MaxFlow {
    /// 查找某条边的流量
    pub fn edge(&self, key: EdgeKey) -> Option<&EdgeFlow> {
        self.edges.iter().find(|e| e.key == key)
    }

    /// 节点的净流入量（流入 - 流出）
    ///
    /// 按补码回绕累加：中间和可能越界，但净值总在 i64 范围内。
    pub fn excess(&self, node: NodeId) -> i64 {
        self.edges
            .iter()
            .map(|e| {
                if e.key.head == node {
                    e.flow
                } else if e.key.tail == node {
                    -e.flow
                } else {
                    0
                }
            })
            .fold(0i64, i64::wrapping_add)
    }

    /// 最小割容量（源侧指向汇侧的边容量之和）
    pub fn cut_capacity(&self) -> i64 {
        self.edges
            .iter()
            .filter(|e| self.source_side.contains(&e.key.tail) && !self.source_side.contains(&e.key.head))
            .map(|e| e.capacity)
            .fold(0i64, i64::wrapping_add)
    }
}

// ==================== 残量网络 ====================

/// 残量网络中的一条弧
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Arc {
    /// 原始边下标
    pub edge: usize,
    /// true 为正向弧，false 为反向弧
    pub forward: bool,
}

#[derive(Debug, Clone)]
struct FlowEdge {
    key: EdgeKey,
    tail: usize,
    head: usize,
    capacity: i64,
    flow: i64,
}

/// 一次运行专用的残量网络
#[derive(Debug, Clone)]
pub(crate) struct ResidualNetwork {
    nodes: Vec<NodeId>,
    positions: HashMap<NodeId, usize>,
    edges: Vec<FlowEdge>,
    /// 每个节点可走的弧（正向出边 + 入边的反向弧）
    arcs: Vec<Vec<Arc>>,
}

impl ResidualNetwork {
    /// 从图构建，所有流量为 0
    pub fn from_graph(graph: &Graph) -> Self {
        let nodes: Vec<NodeId> = graph.nodes().collect();
        let positions: HashMap<NodeId, usize> =
            nodes.iter().enumerate().map(|(i, &n)| (n, i)).collect();
        let mut arcs = vec![Vec::new(); nodes.len()];
        let mut edges = Vec::with_capacity(graph.edge_count());

        for (i, edge) in graph.edges().enumerate() {
            let tail = positions[&edge.tail()];
            let head = positions[&edge.head()];
            arcs[tail].push(Arc {
                edge: i,
                forward: true,
            });
            arcs[head].push(Arc {
                edge: i,
                forward: false,
            });
            edges.push(FlowEdge {
                key: edge.key(),
                tail,
                head,
                capacity: edge.weight(),
                flow: 0,
            });
        }

        Self {
            nodes,
            positions,
            edges,
            arcs,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn position(&self, node: NodeId) -> Result<usize> {
        self.positions
            .get(&node)
            .copied()
            .ok_or(Error::NodeNotFound(node))
    }

    pub fn node_id(&self, position: usize) -> NodeId {
        self.nodes[position]
    }

    pub fn arcs(&self, node: usize) -> &[Arc] {
        &self.arcs[node]
    }

    /// 弧的残量
    pub fn residual(&self, arc: Arc) -> i64 {
        let edge = &self.edges[arc.edge];
        if arc.forward {
            edge.capacity - edge.flow
        } else {
            edge.flow
        }
    }

    /// 弧的终点
    pub fn arc_head(&self, arc: Arc) -> usize {
        let edge = &self.edges[arc.edge];
        if arc.forward {
            edge.head
        } else {
            edge.tail
        }
    }

    /// 弧所属原始边的容量
    pub fn capacity(&self, arc: Arc) -> i64 {
        self.edges[arc.edge].capacity
    }

    /// 最大边容量
    pub fn max_capacity(&self) -> i64 {
        self.edges.iter().map(|e| e.capacity).max().unwrap_or(0)
    }

    /// 沿弧推送 `amount` 单位流量
    pub fn push(&mut self, arc: Arc, amount: i64) {
        let edge = &mut self.edges[arc.edge];
        if arc.forward {
            edge.flow += amount;
        } else {
            edge.flow -= amount;
        }
        debug_assert!(edge.flow >= 0 && edge.flow <= edge.capacity);
    }

    /// BFS 标号搜索增广路，只使用原始容量不小于 `min_capacity` 的边
    pub fn find_augmenting_path(&self, source: usize, sink: usize, min_capacity: i64) -> Option<Vec<Arc>> {
        let mut labeled = vec![false; self.nodes.len()];
        let mut parent: Vec<Option<Arc>> = vec![None; self.nodes.len()];
        let mut queue = VecDeque::new();

        labeled[source] = true;
        queue.push_back(source);

        while let Some(u) = queue.pop_front() {
            if labeled[sink] {
                break;
            }
            for &arc in &self.arcs[u] {
                if self.capacity(arc) < min_capacity || self.residual(arc) <= 0 {
                    continue;
                }
                let v = self.arc_head(arc);
                if !labeled[v] {
                    labeled[v] = true;
                    parent[v] = Some(arc);
                    queue.push_back(v);
                }
            }
        }

        if !labeled[sink] {
            return None;
        }

        let mut path = Vec::new();
        let mut current = sink;
        while current != source {
            let arc = parent[current]?;
            path.push(arc);
            current = if arc.forward {
                self.edges[arc.edge].tail
            } else {
                self.edges[arc.edge].head
            };
        }
        path.reverse();
        Some(path)
    }

    /// 沿路径增广瓶颈流量，返回增广量
    pub fn augment(&mut self, path: &[Arc]) -> i64 {
        let delta = path
            .iter()
            .map(|&arc| self.residual(arc))
            .min()
            .unwrap_or(0);
        for &arc in path {
            self.push(arc, delta);
        }
        delta
    }

    /// 残量网络中从源点可达的节点（最小割源侧）
    pub fn source_side(&self, source: usize) -> HashSet<NodeId> {
        let mut visited = vec![false; self.nodes.len()];
        let mut queue = VecDeque::new();
        visited[source] = true;
        queue.push_back(source);

        while let Some(u) = queue.pop_front() {
            for &arc in &self.arcs[u] {
                let v = self.arc_head(arc);
                if !visited[v] && self.residual(arc) > 0 {
                    visited[v] = true;
                    queue.push_back(v);
                }
            }
        }

        visited
            .iter()
            .enumerate()
            .filter(|(_, &seen)| seen)
            .map(|(i, _)| self.nodes[i])
            .collect()
    }

    /// 把流量写回图中的边
    pub fn write_back(&self, graph: &mut Graph) {
        for (i, flow_edge) in self.edges.iter().enumerate() {
            if let Some(edge) = graph.edge_at_mut(i) {
                debug_assert_eq!(edge.key(), flow_edge.key);
                edge.set_flow(flow_edge.flow);
            }
        }
    }

    /// 生成每条边的流量报告
    pub fn edge_flows(&self) -> Vec<EdgeFlow> {
        self.edges
            .iter()
            .map(|e| EdgeFlow {
                key: e.key,
                flow: e.flow,
                capacity: e.capacity,
            })
            .collect()
    }

    /// 汇总为最大流结果
    pub fn into_result(
        self,
        algorithm: AlgorithmKind,
        source: NodeId,
        sink: NodeId,
        value: i64,
        augmentations: usize,
    ) -> Result<MaxFlow> {
        let source_side = self.source_side(self.position(source)?);
        Ok(MaxFlow {
            algorithm,
            source,
            sink,
            value,
            edges: self.edge_flows(),
            source_side,
            thresholds: Vec::new(),
            augmentations,
        })
    }
}

/// 累加流量，超出 i64 范围时报错
pub(crate) fn add_flow(total: i64, amount: i64) -> Result<i64> {
    total
        .checked_add(amount)
        .ok_or_else(|| Error::Overflow(format!("流量 {} 加 {}", total, amount)))
}

/// 流算法运行前的公共检查，返回 (源点, 汇点)
pub(crate) fn flow_terminals(graph: &mut Graph) -> Result<(NodeId, NodeId)> {
    if let Some(key) = graph.first_negative_edge() {
        graph.set_solved(false);
        return Err(Error::NegativeWeightNotSupported(key));
    }
    let source = graph.source().ok_or(Error::MissingSource)?;
    let sink = graph.destination().ok_or(Error::MissingDestination)?;
    Ok((source, sink))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(id: u32) -> NodeId {
        NodeId::new(id)
    }

    #[test]
    fn test_edge_usage() {
        let key = EdgeKey::new(n(1), n(2));
        let full = EdgeFlow { key, flow: 4, capacity: 4 };
        let partial = EdgeFlow { key, flow: 4, capacity: 10 };
        let unused = EdgeFlow { key, flow: 0, capacity: 10 };
        let zero = EdgeFlow { key, flow: 0, capacity: 0 };

        assert_eq!(full.usage(), EdgeUsage::Full);
        assert_eq!(partial.usage(), EdgeUsage::Partial);
        assert_eq!(partial.residual(), 6);
        assert_eq!(unused.usage(), EdgeUsage::Unused);
        assert_eq!(zero.usage(), EdgeUsage::Unused);
    }

    #[test]
    fn test_reverse_arc_cancels_flow() {
        // 1 -> 2 -> 4, 1 -> 3 -> 4, 2 -> 3
        let mut graph = Graph::new();
        for id in 1..=4 {
            graph.add_node(n(id)).unwrap();
        }
        graph.add_edge(n(1), n(2), 1).unwrap();
        graph.add_edge(n(1), n(3), 1).unwrap();
        graph.add_edge(n(2), n(3), 1).unwrap();
        graph.add_edge(n(2), n(4), 1).unwrap();
        graph.add_edge(n(3), n(4), 1).unwrap();

        let mut net = ResidualNetwork::from_graph(&graph);
        // 先手动走 1 -> 2 -> 3 -> 4，堵死两条直路
        let path = vec![
            Arc { edge: 0, forward: true },
            Arc { edge: 2, forward: true },
            Arc { edge: 4, forward: true },
        ];
        assert_eq!(net.augment(&path), 1);

        // 第二条增广路必须经过 2 -> 3 的反向弧
        let second = net.find_augmenting_path(0, 3, 1).unwrap();
        assert!(second.contains(&Arc { edge: 2, forward: false }));
        assert_eq!(net.augment(&second), 1);
        assert!(net.find_augmenting_path(0, 3, 1).is_none());

        net.write_back(&mut graph);
        assert_eq!(graph.edge(EdgeKey::new(n(2), n(3))).unwrap().flow(), 0);
        for edge in graph.edges() {
            assert_eq!(edge.flow() + edge.residual(), edge.weight());
        }
    }

    #[test]
    fn test_source_side_is_min_cut() {
        let mut graph = Graph::new();
        for id in 1..=3 {
            graph.add_node(n(id)).unwrap();
        }
        graph.add_edge(n(1), n(2), 10).unwrap();
        graph.add_edge(n(2), n(3), 4).unwrap();

        let mut net = ResidualNetwork::from_graph(&graph);
        let path = net.find_augmenting_path(0, 2, 1).unwrap();
        assert_eq!(net.augment(&path), 4);

        let side = net.source_side(0);
        assert!(side.contains(&n(1)));
        assert!(side.contains(&n(2)));
        assert!(!side.contains(&n(3)));
    }
}
