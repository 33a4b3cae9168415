//! 图数据结构
//!
//! 由外部编辑器/导入器逐步构建的有向带权图。算法运行期间图被独占借用，
//! 流算法只会改写边上的 `residual` / `flow` 字段。

use super::edge::{Edge, EdgeKey};
use super::index::AdjacencyIndex;
use super::node::NodeId;
use crate::error::{Error, Result};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// 有向带权图
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    /// 节点集合（保持插入顺序）
    nodes: IndexSet<NodeId>,
    /// 边集合，按 (tail, head) 索引；序列化为有序列表
    #[serde(with = "indexmap::map::serde_seq")]
    edges: IndexMap<EdgeKey, Edge>,
    /// 源点
    source: Option<NodeId>,
    /// 终点
    destination: Option<NodeId>,
    /// 最近一次算法是否成功完成
    solved: bool,
}

impl Graph {
    /// 创建空图
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== 节点操作 ====================

    /// 添加节点
    pub fn add_node(&mut self, id: NodeId) -> Result<NodeId> {
        if !self.nodes.insert(id) {
            return Err(Error::NodeAlreadyExists(id));
        }
        self.solved = false;
        Ok(id)
    }

    /// 以当前最大编号加一添加节点
    pub fn add_next_node(&mut self) -> Result<NodeId> {
        let next = match self.nodes.iter().map(|n| n.as_u32()).max() {
            Some(max) => max
                .checked_add(1)
                .ok_or_else(|| Error::Overflow(format!("{} 之后没有可用的节点编号", NodeId::new(max))))?,
            None => 1,
        };
        let id = NodeId::new(next);
        self.nodes.insert(id);
        self.solved = false;
        Ok(id)
    }

    /// 删除节点及其关联的边
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        if !self.nodes.shift_remove(&id) {
            return Err(Error::NodeNotFound(id));
        }
        self.edges.retain(|_, edge| !edge.touches(id));
        if self.source == Some(id) {
            self.source = None;
        }
        if self.destination == Some(id) {
            self.destination = None;
        }
        self.solved = false;
        Ok(())
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    /// 所有节点（插入顺序）
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // ==================== 边操作 ====================

    /// 添加有向边
    pub fn add_edge(&mut self, tail: NodeId, head: NodeId, weight: i64) -> Result<EdgeKey> {
        if !self.nodes.contains(&tail) {
            return Err(Error::NodeNotFound(tail));
        }
        if !self.nodes.contains(&head) {
            return Err(Error::NodeNotFound(head));
        }
        if tail == head {
            return Err(Error::SelfLoop(tail));
        }

        let key = EdgeKey::new(tail, head);
        if self.edges.contains_key(&key) {
            return Err(Error::EdgeAlreadyExists(key));
        }

        self.edges.insert(key, Edge::new(tail, head, weight));
        self.solved = false;
        Ok(key)
    }

    /// 删除边
    pub fn remove_edge(&mut self, key: EdgeKey) -> Result<Edge> {
        let edge = self
            .edges
            .shift_remove(&key)
            .ok_or(Error::EdgeNotFound(key))?;
        self.solved = false;
        Ok(edge)
    }

    /// 修改边权重
    pub fn set_weight(&mut self, key: EdgeKey, weight: i64) -> Result<()> {
        let edge = self.edges.get_mut(&key).ok_or(Error::EdgeNotFound(key))?;
        edge.set_weight(weight);
        self.solved = false;
        Ok(())
    }

    /// 获取边
    pub fn edge(&self, key: EdgeKey) -> Option<&Edge> {
        self.edges.get(&key)
    }

    /// 按插入位置获取边
    pub(crate) fn edge_at_mut(&mut self, index: usize) -> Option<&mut Edge> {
        self.edges.get_index_mut(index).map(|(_, edge)| edge)
    }

    /// 所有边（插入顺序）
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.values()
    }

    /// 边在插入顺序中的位置
    pub fn edge_position(&self, key: EdgeKey) -> Option<usize> {
        self.edges.get_index_of(&key)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// 节点的所有出边
    pub fn outgoing(&self, node: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.values().filter(move |e| e.tail() == node)
    }

    /// 节点的所有入边
    pub fn incoming(&self, node: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.values().filter(move |e| e.head() == node)
    }

    /// 第一条负权边（如果有）
    pub fn first_negative_edge(&self) -> Option<EdgeKey> {
        self.edges
            .values()
            .find(|e| e.weight() < 0)
            .map(|e| e.key())
    }

    /// 最大边权重（空图为 0）
    pub fn max_weight(&self) -> i64 {
        self.edges.values().map(|e| e.weight()).max().unwrap_or(0)
    }

    /// 将所有边的流字段重置为初始状态
    pub fn reset_flows(&mut self) {
        for edge in self.edges.values_mut() {
            edge.reset_flow();
        }
        self.solved = false;
    }

    /// 构建一次性的邻接索引
    pub fn adjacency(&self) -> AdjacencyIndex {
        AdjacencyIndex::build(self)
    }

    // ==================== 源点 / 终点 ====================

    pub fn set_source(&mut self, node: NodeId) -> Result<()> {
        if !self.nodes.contains(&node) {
            return Err(Error::NodeNotFound(node));
        }
        self.source = Some(node);
        self.solved = false;
        Ok(())
    }

    pub fn set_destination(&mut self, node: NodeId) -> Result<()> {
        if !self.nodes.contains(&node) {
            return Err(Error::NodeNotFound(node));
        }
        self.destination = Some(node);
        self.solved = false;
        Ok(())
    }

    pub fn clear_source(&mut self) {
        self.source = None;
        self.solved = false;
    }

    pub fn clear_destination(&mut self) {
        self.destination = None;
        self.solved = false;
    }

    pub fn source(&self) -> Option<NodeId> {
        self.source
    }

    pub fn destination(&self) -> Option<NodeId> {
        self.destination
    }

    // ==================== 求解状态 ====================

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    pub(crate) fn set_solved(&mut self, solved: bool) {
        self.solved = solved;
    }

    /// 清空整张图
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    // ==================== 可达性 ====================

    /// 从给定节点出发沿有向边可达的节点集合（包括自身）
    pub fn reachable_from(&self, start: NodeId) -> HashSet<NodeId> {
        let index = self.adjacency();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();

        if !self.nodes.contains(&start) {
            return visited;
        }

        visited.insert(start);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            for key in index.outgoing(current) {
                if visited.insert(key.head) {
                    queue.push_back(key.head);
                }
            }
        }

        visited
    }

    /// 节点是否可从源点到达；未指定源点时恒为 false
    pub fn is_reachable(&self, node: NodeId) -> bool {
        match self.source {
            Some(source) => self.reachable_from(source).contains(&node),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(id: u32) -> NodeId {
        NodeId::new(id)
    }

    fn chain() -> Graph {
        let mut graph = Graph::new();
        for id in 1..=3 {
            graph.add_node(n(id)).unwrap();
        }
        graph.add_edge(n(1), n(2), 1).unwrap();
        graph.add_edge(n(2), n(3), 2).unwrap();
        graph
    }

    #[test]
    fn test_graph_basic() {
        let graph = chain();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.outgoing(n(1)).count(), 1);
        assert_eq!(graph.incoming(n(3)).count(), 1);
        assert_eq!(graph.edge(EdgeKey::new(n(2), n(3))).unwrap().weight(), 2);
        assert!(graph.edge(EdgeKey::new(n(3), n(2))).is_none());
    }

    #[test]
    fn test_graph_rejects_invalid_edges() {
        let mut graph = chain();

        assert!(matches!(
            graph.add_edge(n(1), n(9), 1),
            Err(Error::NodeNotFound(id)) if id == n(9)
        ));
        assert!(matches!(graph.add_edge(n(2), n(2), 1), Err(Error::SelfLoop(_))));
        assert!(matches!(
            graph.add_edge(n(1), n(2), 4),
            Err(Error::EdgeAlreadyExists(_))
        ));
        assert!(matches!(graph.add_node(n(1)), Err(Error::NodeAlreadyExists(_))));
        // 反向边是另一条边
        assert!(graph.add_edge(n(2), n(1), 4).is_ok());
    }

    #[test]
    fn test_graph_reachability() {
        let mut graph = chain();
        graph.add_node(n(4)).unwrap();

        assert!(!graph.is_reachable(n(1)));

        graph.set_source(n(1)).unwrap();
        assert!(graph.is_reachable(n(1)));
        assert!(graph.is_reachable(n(3)));
        assert!(!graph.is_reachable(n(4)));

        graph.add_edge(n(3), n(4), 1).unwrap();
        assert!(graph.is_reachable(n(4)));
    }

    #[test]
    fn test_remove_node_drops_incident_edges() {
        let mut graph = chain();
        graph.set_source(n(1)).unwrap();
        graph.set_destination(n(2)).unwrap();

        graph.remove_node(n(2)).unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.source(), Some(n(1)));
        assert_eq!(graph.destination(), None);
        assert!(matches!(graph.remove_node(n(2)), Err(Error::NodeNotFound(_))));
    }

    #[test]
    fn test_editing_clears_solved_flag() {
        let mut graph = chain();
        graph.set_solved(true);

        graph.set_weight(EdgeKey::new(n(1), n(2)), 5).unwrap();
        assert!(!graph.is_solved());
        assert_eq!(graph.edge(EdgeKey::new(n(1), n(2))).unwrap().residual(), 5);
    }

    #[test]
    fn test_add_next_node() {
        let mut graph = Graph::new();
        assert_eq!(graph.add_next_node().unwrap(), n(1));
        graph.add_node(n(5)).unwrap();
        assert_eq!(graph.add_next_node().unwrap(), n(6));
    }

    #[test]
    fn test_add_next_node_exhausted() {
        let mut graph = Graph::new();
        graph.add_node(n(u32::MAX)).unwrap();
        assert!(matches!(graph.add_next_node(), Err(Error::Overflow(_))));
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_reset_flows() {
        let mut graph = chain();
        let position = graph.edge_position(EdgeKey::new(n(2), n(3))).unwrap();
        graph.edge_at_mut(position).unwrap().set_flow(2);

        graph.set_solved(true);
        graph.reset_flows();
        assert!(!graph.is_solved());

        for edge in graph.edges() {
            assert_eq!(edge.flow(), 0);
            assert_eq!(edge.residual(), edge.weight());
        }
    }
}
