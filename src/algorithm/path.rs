//! 单源最短路结果
//!
//! Dijkstra、Bellman-Ford、拓扑序松弛以及 LP 回译共用的结果形状。

use super::AlgorithmKind;
use crate::error::{Error, Result};
use crate::graph::NodeId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 单源最短路结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortestPaths {
    /// 产生结果的算法
    pub algorithm: AlgorithmKind,
    /// 源点
    pub source: NodeId,
    /// 终点
    pub destination: Option<NodeId>,
    /// 已确定的最短距离（不含无穷远节点）
    pub distances: IndexMap<NodeId, i64>,
    /// 前驱节点
    pub predecessors: HashMap<NodeId, NodeId>,
}

impl ShortestPaths {
    pub(crate) fn new(algorithm: AlgorithmKind, source: NodeId, destination: Option<NodeId>) -> Self {
        Self {
            algorithm,
            source,
            destination,
            distances: IndexMap::new(),
            predecessors: HashMap::new(),
        }
    }

    /// 到某节点的最短距离
    pub fn distance(&self, node: NodeId) -> Option<i64> {
        self.distances.get(&node).copied()
    }

    /// 到终点的最短距离
    pub fn destination_distance(&self) -> Option<i64> {
        self.destination.and_then(|d| self.distance(d))
    }

    /// 到终点的路径（源点在前）
    pub fn destination_path(&self) -> Option<Vec<NodeId>> {
        self.destination.and_then(|d| self.path_to(d))
    }

    /// 沿前驱链重构从源点到 `node` 的路径
    pub fn path_to(&self, node: NodeId) -> Option<Vec<NodeId>> {
        if !self.distances.contains_key(&node) {
            return None;
        }

        let mut path = vec![node];
        let mut current = node;

        while current != self.source {
            current = *self.predecessors.get(&current)?;
            path.push(current);
            // 前驱链不应比节点数更长
            if path.len() > self.distances.len() + 1 {
                return None;
            }
        }

        path.reverse();
        Some(path)
    }
}

/// 距离加边权，超出 i64 范围时报错
pub(crate) fn extend_distance(distance: i64, weight: i64) -> Result<i64> {
    distance
        .checked_add(weight)
        .ok_or_else(|| Error::Overflow(format!("距离 {} 加边权 {}", distance, weight)))
}
