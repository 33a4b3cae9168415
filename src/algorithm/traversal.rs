//! 广度优先遍历
//!
//! 只用于遍历与可达性展示，不考虑边权；加权最短路由其他算法负责。

use super::validate::Precondition;
use crate::error::{Error, Result};
use crate::graph::{EdgeKey, Graph, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::info;

/// 遍历结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Traversal {
    pub source: NodeId,
    /// 节点的访问顺序
    pub order: Vec<NodeId>,
    /// BFS 树边（发现顺序）
    pub tree_edges: Vec<EdgeKey>,
    /// 每个节点离源点的跳数
    pub hops: HashMap<NodeId, usize>,
}

impl Traversal {
    /// BFS 树上从源点到 `node` 的路径
    pub fn path_to(&self, node: NodeId) -> Option<Vec<NodeId>> {
        let parents: HashMap<NodeId, NodeId> =
            self.tree_edges.iter().map(|k| (k.head, k.tail)).collect();

        let mut path = vec![node];
        let mut current = node;
        while current != self.source {
            current = *parents.get(&current)?;
            path.push(current);
        }
        path.reverse();
        Some(path)
    }
}

/// 广度优先遍历实例，只对应一次 `run()`
pub struct BreadthFirstSearch<'g> {
    graph: &'g mut Graph,
    precondition: Precondition,
}

impl<'g> BreadthFirstSearch<'g> {
    /// 创建算法实例；只要求源点存在且所有节点可达
    pub fn new(graph: &'g mut Graph) -> Self {
        let precondition = Precondition::check(graph, false);
        Self {
            graph,
            precondition,
        }
    }

    pub fn run(self) -> Result<Traversal> {
        let Self {
            graph,
            precondition,
        } = self;
        precondition.into_result(graph)?;

        let source = graph.source().ok_or(Error::MissingSource)?;
        let index = graph.adjacency();

        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        let mut traversal = Traversal {
            source,
            order: Vec::new(),
            tree_edges: Vec::new(),
            hops: HashMap::new(),
        };

        visited.insert(source);
        queue.push_back((source, 0usize));

        while let Some((current, depth)) = queue.pop_front() {
            traversal.order.push(current);
            traversal.hops.insert(current, depth);

            for key in index.outgoing(current) {
                if visited.insert(key.head) {
                    traversal.tree_edges.push(*key);
                    queue.push_back((key.head, depth + 1));
                }
            }
        }

        graph.set_solved(true);
        info!(algorithm = "bfs", visited = traversal.order.len(), "traversal finished");

        Ok(traversal)
    }
}
