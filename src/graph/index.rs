//! 邻接索引
//!
//! 每次算法运行前构建一次，按节点 ID 查出边 / 入边，
//! 替代逐条扫描边集合。

use crate::graph::edge::EdgeKey;
use crate::graph::graph::Graph;
use crate::graph::node::NodeId;
use std::collections::HashMap;

/// 邻接索引（只读快照）
#[derive(Debug, Clone, Default)]
pub struct AdjacencyIndex {
    /// 节点到出边的映射
    outgoing: HashMap<NodeId, Vec<EdgeKey>>,
    /// 节点到入边的映射
    incoming: HashMap<NodeId, Vec<EdgeKey>>,
    /// 节点 ID 到稠密下标的映射
    positions: HashMap<NodeId, usize>,
    /// 稠密下标到节点 ID
    nodes: Vec<NodeId>,
}

impl AdjacencyIndex {
    /// 从图构建索引
    pub fn build(graph: &Graph) -> Self {
        let nodes: Vec<NodeId> = graph.nodes().collect();
        let positions = nodes.iter().enumerate().map(|(i, &n)| (n, i)).collect();

        let mut outgoing: HashMap<NodeId, Vec<EdgeKey>> = HashMap::new();
        let mut incoming: HashMap<NodeId, Vec<EdgeKey>> = HashMap::new();

        for edge in graph.edges() {
            let key = edge.key();
            outgoing.entry(key.tail).or_default().push(key);
            incoming.entry(key.head).or_default().push(key);
        }

        Self {
            outgoing,
            incoming,
            positions,
            nodes,
        }
    }

    /// 节点的出边
    pub fn outgoing(&self, node: NodeId) -> &[EdgeKey] {
        self.outgoing.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 节点的入边
    pub fn incoming(&self, node: NodeId) -> &[EdgeKey] {
        self.incoming.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 出度
    pub fn out_degree(&self, node: NodeId) -> usize {
        self.outgoing(node).len()
    }

    /// 入度
    pub fn in_degree(&self, node: NodeId) -> usize {
        self.incoming(node).len()
    }

    /// 后继节点
    pub fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.outgoing(node).iter().map(|k| k.head)
    }

    /// 前驱节点
    pub fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.incoming(node).iter().map(|k| k.tail)
    }

    /// 节点的稠密下标
    pub fn position(&self, node: NodeId) -> Option<usize> {
        self.positions.get(&node).copied()
    }

    /// 稠密下标对应的节点
    pub fn node_at(&self, position: usize) -> NodeId {
        self.nodes[position]
    }

    /// 按稠密下标排列的节点
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
