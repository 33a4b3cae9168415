//! 图核心模块
//!
//! 定义节点、边和图的核心数据结构

mod edge;
#[allow(clippy::module_inception)]
mod graph;
mod index;
mod node;

pub use edge::{Edge, EdgeKey};
pub use graph::Graph;
pub use index::AdjacencyIndex;
pub use node::NodeId;
