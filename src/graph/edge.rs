//! 边定义
//!
//! 有向边由 (tail, head) 唯一确定，带一个整数权重（最短路中的长度，
//! 最大流中的容量）以及两个只在流算法运行期间有意义的字段。

use crate::graph::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 边标识：按值比较的 (tail, head) 有序对
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    pub tail: NodeId,
    pub head: NodeId,
}

impl EdgeKey {
    pub fn new(tail: NodeId, head: NodeId) -> Self {
        Self { tail, head }
    }

    /// 反向边的标识
    pub fn reversed(&self) -> Self {
        Self {
            tail: self.head,
            head: self.tail,
        }
    }
}

impl From<(NodeId, NodeId)> for EdgeKey {
    fn from((tail, head): (NodeId, NodeId)) -> Self {
        Self { tail, head }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.tail, self.head)
    }
}

/// 边
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// 起点
    tail: NodeId,
    /// 终点
    head: NodeId,
    /// 权重 / 容量
    weight: i64,
    /// 剩余容量（流算法运行期间有效）
    residual: i64,
    /// 当前流量（流算法运行期间有效）
    flow: i64,
}

impl Edge {
    /// 创建新边，流字段处于初始状态
    pub fn new(tail: NodeId, head: NodeId, weight: i64) -> Self {
        Self {
            tail,
            head,
            weight,
            residual: weight,
            flow: 0,
        }
    }

    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.tail, self.head)
    }

    pub fn tail(&self) -> NodeId {
        self.tail
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn weight(&self) -> i64 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: i64) {
        self.weight = weight;
        self.reset_flow();
    }

    pub fn residual(&self) -> i64 {
        self.residual
    }

    pub fn flow(&self) -> i64 {
        self.flow
    }

    /// 是否与节点相关联
    pub fn touches(&self, node: NodeId) -> bool {
        self.tail == node || self.head == node
    }

    /// 将流字段重置为 `residual = weight`, `flow = 0`
    pub fn reset_flow(&mut self) {
        self.residual = self.weight;
        self.flow = 0;
    }

    /// 设置流量，剩余容量随之更新，保持 `flow + residual == weight`
    pub(crate) fn set_flow(&mut self, flow: i64) {
        debug_assert!(
            (0..=self.weight).contains(&flow),
            "flow {} out of [0, {}] on {}",
            flow,
            self.weight,
            self.key()
        );
        self.flow = flow;
        self.residual = self.weight - flow;
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge ~ {} - {}", self.tail.as_u32(), self.head.as_u32())
    }
}
