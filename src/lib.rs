//! NetGraph - 有向带权图上的最短路与最大流算法
//!
//! 在可编辑的有向带权图上运行经典网络算法：
//! - 最短路：Dijkstra、Bellman-Ford、Floyd-Warshall、拓扑序松弛
//! - 最大流：增广路、容量缩放、推流-重标号
//! - 线性规划建模（求解器由外部提供）
//! - 邻接矩阵 CSV 导入导出

pub mod algorithm;
pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod import;
pub mod logging;
pub mod report;

// 重导出常用类型
pub use algorithm::{solve, AlgorithmKind, MaxFlow, ShortestPaths, Solution};
pub use error::{Error, Result};
pub use graph::{Edge, EdgeKey, Graph, NodeId};

/// 库版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
