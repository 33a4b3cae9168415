//! 图算法模块
//!
//! 包含最短路（Dijkstra、Bellman-Ford、Floyd-Warshall、拓扑序）、
//! 最大流（增广路、容量缩放、推流-重标号）、广度优先遍历以及线性规划建模。
//!
//! 每个算法都是只对应一次 `run()` 的短生命周期对象：构造时借用图并完成
//! 前置检查，运行结束后图的 `solved` 标志反映本次结果。

mod augmenting_path;
mod bellman_ford;
mod capacity_scaling;
mod dijkstra;
mod floyd_warshall;
pub mod lp;
mod path;
mod preflow_push;
mod residual;
mod topological;
mod traversal;
mod validate;

pub use augmenting_path::AugmentingPath;
pub use bellman_ford::BellmanFord;
pub use capacity_scaling::{initial_threshold, CapacityScaling};
pub use dijkstra::Dijkstra;
pub use floyd_warshall::{AllPairsShortestPaths, FloydWarshall};
pub use lp::{LpSolution, LpSolver, LpStatus, MaxFlowLp, ShortestPathLp};
pub use path::ShortestPaths;
pub use preflow_push::PreflowPush;
pub use residual::{EdgeFlow, EdgeUsage, MaxFlow};
pub use topological::{topological_order, TopologicalOrdering, TopologicalPaths};
pub use traversal::{BreadthFirstSearch, Traversal};
pub use validate::validate;

use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 算法种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlgorithmKind {
    BreadthFirstSearch,
    Dijkstra,
    BellmanFord,
    FloydWarshall,
    Topological,
    AugmentingPath,
    CapacityScaling,
    PreflowPush,
    ShortestPathLp,
    MaxFlowLp,
}

impl AlgorithmKind {
    pub const ALL: [AlgorithmKind; 10] = [
        AlgorithmKind::BreadthFirstSearch,
        AlgorithmKind::Dijkstra,
        AlgorithmKind::BellmanFord,
        AlgorithmKind::FloydWarshall,
        AlgorithmKind::Topological,
        AlgorithmKind::AugmentingPath,
        AlgorithmKind::CapacityScaling,
        AlgorithmKind::PreflowPush,
        AlgorithmKind::ShortestPathLp,
        AlgorithmKind::MaxFlowLp,
    ];

    /// 命令行中使用的短名称
    pub fn cli_name(&self) -> &'static str {
        match self {
            AlgorithmKind::BreadthFirstSearch => "bfs",
            AlgorithmKind::Dijkstra => "dijkstra",
            AlgorithmKind::BellmanFord => "bellman-ford",
            AlgorithmKind::FloydWarshall => "floyd-warshall",
            AlgorithmKind::Topological => "topological",
            AlgorithmKind::AugmentingPath => "augmenting-path",
            AlgorithmKind::CapacityScaling => "capacity-scaling",
            AlgorithmKind::PreflowPush => "preflow-push",
            AlgorithmKind::ShortestPathLp => "lp-shortest-path",
            AlgorithmKind::MaxFlowLp => "lp-max-flow",
        }
    }

    /// 是否为最大流算法
    pub fn is_flow(&self) -> bool {
        matches!(
            self,
            AlgorithmKind::AugmentingPath
                | AlgorithmKind::CapacityScaling
                | AlgorithmKind::PreflowPush
                | AlgorithmKind::MaxFlowLp
        )
    }

    /// 是否为最短路算法（遍历不算）
    pub fn is_shortest_path(&self) -> bool {
        !self.is_flow() && *self != AlgorithmKind::BreadthFirstSearch
    }

    /// 是否要求指定终点
    pub fn requires_destination(&self) -> bool {
        !matches!(
            self,
            AlgorithmKind::BreadthFirstSearch | AlgorithmKind::FloydWarshall
        )
    }

    /// 是否需要外部线性规划求解器
    pub fn requires_solver(&self) -> bool {
        matches!(self, AlgorithmKind::ShortestPathLp | AlgorithmKind::MaxFlowLp)
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlgorithmKind::BreadthFirstSearch => "Breadth First Search",
            AlgorithmKind::Dijkstra => "Dijkstra",
            AlgorithmKind::BellmanFord => "Bellman-Ford",
            AlgorithmKind::FloydWarshall => "Floyd-Warshall",
            AlgorithmKind::Topological => "Topological Ordering",
            AlgorithmKind::AugmentingPath => "Augmenting Path",
            AlgorithmKind::CapacityScaling => "Capacity Scaling",
            AlgorithmKind::PreflowPush => "Preflow-Push",
            AlgorithmKind::ShortestPathLp => "Shortest Path (LP)",
            AlgorithmKind::MaxFlowLp => "Maximum Flow (LP)",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for AlgorithmKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        let kind = match normalized.as_str() {
            "bfs" | "breadth-first-search" => AlgorithmKind::BreadthFirstSearch,
            "dijkstra" => AlgorithmKind::Dijkstra,
            "bf" | "bellman-ford" => AlgorithmKind::BellmanFord,
            "fw" | "floyd-warshall" => AlgorithmKind::FloydWarshall,
            "topo" | "topological" => AlgorithmKind::Topological,
            "ff" | "ap" | "augmenting-path" => AlgorithmKind::AugmentingPath,
            "cs" | "capacity-scaling" => AlgorithmKind::CapacityScaling,
            "pp" | "preflow-push" | "push-relabel" => AlgorithmKind::PreflowPush,
            "lp-shortest-path" | "lp-sp" => AlgorithmKind::ShortestPathLp,
            "lp-max-flow" | "lp-mf" => AlgorithmKind::MaxFlowLp,
            _ => return Err(Error::ParseError(format!("未知算法: {}", s))),
        };
        Ok(kind)
    }
}

/// 任意算法的运行结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Solution {
    Traversal(Traversal),
    ShortestPaths(ShortestPaths),
    AllPairs(AllPairsShortestPaths),
    Topological(TopologicalPaths),
    MaxFlow(MaxFlow),
}

impl Solution {
    /// 到终点的最短距离
    pub fn destination_distance(&self) -> Option<i64> {
        match self {
            Solution::ShortestPaths(p) => p.destination_distance(),
            Solution::AllPairs(p) => p.destination_distance(),
            Solution::Topological(p) => p.paths.destination_distance(),
            Solution::Traversal(_) | Solution::MaxFlow(_) => None,
        }
    }

    /// 到终点的路径
    pub fn destination_path(&self) -> Option<Vec<NodeId>> {
        match self {
            Solution::ShortestPaths(p) => p.destination_path(),
            Solution::AllPairs(p) => p.destination_path(),
            Solution::Topological(p) => p.paths.destination_path(),
            Solution::Traversal(_) | Solution::MaxFlow(_) => None,
        }
    }

    /// 最大流量值
    pub fn flow_value(&self) -> Option<i64> {
        match self {
            Solution::MaxFlow(f) => Some(f.value),
            _ => None,
        }
    }
}

/// 运行指定算法；线性规划算法需要求解器，请使用 [`solve_with`]
pub fn solve(graph: &mut Graph, kind: AlgorithmKind) -> Result<Solution> {
    solve_with(graph, kind, None)
}

/// 运行指定算法，必要时使用外部求解器
pub fn solve_with(graph: &mut Graph, kind: AlgorithmKind, solver: Option<&dyn LpSolver>) -> Result<Solution> {
    let solution = match kind {
        AlgorithmKind::BreadthFirstSearch => Solution::Traversal(BreadthFirstSearch::new(graph).run()?),
        AlgorithmKind::Dijkstra => Solution::ShortestPaths(Dijkstra::new(graph).run()?),
        AlgorithmKind::BellmanFord => Solution::ShortestPaths(BellmanFord::new(graph).run()?),
        AlgorithmKind::FloydWarshall => Solution::AllPairs(FloydWarshall::new(graph).run()?),
        AlgorithmKind::Topological => Solution::Topological(TopologicalOrdering::new(graph).run()?),
        AlgorithmKind::AugmentingPath => Solution::MaxFlow(AugmentingPath::new(graph).run()?),
        AlgorithmKind::CapacityScaling => Solution::MaxFlow(CapacityScaling::new(graph).run()?),
        AlgorithmKind::PreflowPush => Solution::MaxFlow(PreflowPush::new(graph).run()?),
        AlgorithmKind::ShortestPathLp => {
            let solver = solver.ok_or_else(missing_solver)?;
            Solution::ShortestPaths(ShortestPathLp::new(graph, solver).run()?)
        }
        AlgorithmKind::MaxFlowLp => {
            let solver = solver.ok_or_else(missing_solver)?;
            Solution::MaxFlow(MaxFlowLp::new(graph, solver).run()?)
        }
    };
    Ok(solution)
}

fn missing_solver() -> Error {
    Error::SolverError("未配置线性规划求解器".to_string())
}
