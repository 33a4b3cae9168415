//! 线性规划建模
//!
//! 最短路与最大流都可以写成流平衡约束下的线性规划：每条边一个决策变量
//! `x_i_j`。这里只负责建模与结果回译，数值求解交给实现了 [`LpSolver`]
//! 的外部求解器。

use super::path::{extend_distance, ShortestPaths};
use super::residual::{flow_terminals, Arc, MaxFlow, ResidualNetwork};
use super::validate::Precondition;
use super::AlgorithmKind;
use crate::error::{Error, Result};
use crate::graph::{EdgeKey, Graph, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

/// 判定决策变量取正值的容差
const EPSILON: f64 = 1e-9;

// ==================== 模型 ====================

/// 优化方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sense {
    Minimize,
    Maximize,
}

/// 约束关系
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    Equal,
    LessEqual,
    GreaterEqual,
}

/// 连续决策变量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub lower: f64,
    /// `None` 表示无上界
    pub upper: Option<f64>,
    /// 目标函数系数
    pub objective: f64,
    /// 对应的边；辅助变量（如流量值 V）为 `None`
    pub edge: Option<EdgeKey>,
}

/// 线性约束 `Σ coef·x  rel  rhs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    /// (变量下标, 系数)
    pub terms: Vec<(usize, f64)>,
    pub relation: Relation,
    pub rhs: f64,
}

impl Constraint {
    /// 在给定取值下是否成立
    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs: f64 = self.terms.iter().map(|&(i, c)| c * values[i]).sum();
        match self.relation {
            Relation::Equal => (lhs - self.rhs).abs() <= tolerance,
            Relation::LessEqual => lhs <= self.rhs + tolerance,
            Relation::GreaterEqual => lhs + tolerance >= self.rhs,
        }
    }
}

/// 线性规划
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearProgram {
    pub sense: Sense,
    pub variables: Vec<Variable>,
    pub constraints: Vec<Constraint>,
}

impl LinearProgram {
    fn new(sense: Sense) -> Self {
        Self {
            sense,
            variables: Vec::new(),
            constraints: Vec::new(),
        }
    }

    fn add_variable(&mut self, variable: Variable) -> usize {
        self.variables.push(variable);
        self.variables.len() - 1
    }

    /// 按名称查找变量下标
    pub fn variable(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v.name == name)
    }

    /// 目标函数值
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.variables
            .iter()
            .zip(values)
            .map(|(v, x)| v.objective * x)
            .sum()
    }

    /// 取值是否满足所有约束与变量界
    pub fn is_feasible(&self, values: &[f64], tolerance: f64) -> bool {
        values.len() == self.variables.len()
            && self.variables.iter().zip(values).all(|(v, &x)| {
                x + tolerance >= v.lower && v.upper.map_or(true, |u| x <= u + tolerance)
            })
            && self.constraints.iter().all(|c| c.is_satisfied(values, tolerance))
    }
}

/// 边变量名 `x_i_j`
pub fn variable_name(key: EdgeKey) -> String {
    format!("x_{}_{}", key.tail.as_u32(), key.head.as_u32())
}

/// 解析 `x_i_j` 形式的变量名
pub fn parse_variable_name(name: &str) -> Option<EdgeKey> {
    let mut parts = name.strip_prefix("x_")?.split('_');
    let tail = parts.next()?.parse().ok()?;
    let head = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(EdgeKey::new(NodeId::new(tail), NodeId::new(head)))
}

/// 流平衡约束：`Σ入 - Σ出`（`sign` = 1）或 `Σ出 - Σ入`（`sign` = -1）
fn balance_terms(graph: &Graph, node: NodeId, columns: &HashMap<EdgeKey, usize>, sign: f64) -> Vec<(usize, f64)> {
    let incoming = graph.incoming(node).map(|e| (columns[&e.key()], sign));
    let outgoing = graph.outgoing(node).map(|e| (columns[&e.key()], -sign));
    incoming.chain(outgoing).collect()
}

fn edge_columns(graph: &Graph, program: &mut LinearProgram, bounded: bool, weighted: bool) -> HashMap<EdgeKey, usize> {
    graph
        .edges()
        .map(|edge| {
            let column = program.add_variable(Variable {
                name: variable_name(edge.key()),
                lower: 0.0,
                upper: bounded.then_some(edge.weight() as f64),
                objective: if weighted { edge.weight() as f64 } else { 0.0 },
                edge: Some(edge.key()),
            });
            (edge.key(), column)
        })
        .collect()
}

/// 最短路树模型
///
/// 最小化 Σ w·x。源点送出 n-1 个单位，其余每个节点各吸收 1 个单位，
/// 最优解的正值变量构成以源点为根的最短路树。
pub fn shortest_path_program(graph: &Graph) -> Result<LinearProgram> {
    let source = graph.source().ok_or(Error::MissingSource)?;
    let mut program = LinearProgram::new(Sense::Minimize);
    let columns = edge_columns(graph, &mut program, false, true);
    let n = graph.node_count() as f64;

    for node in graph.nodes() {
        let constraint = if node == source {
            Constraint {
                name: "balance_source".to_string(),
                terms: balance_terms(graph, node, &columns, 1.0),
                relation: Relation::Equal,
                rhs: -(n - 1.0),
            }
        } else {
            Constraint {
                name: format!("balance_{}", node.as_u32()),
                terms: balance_terms(graph, node, &columns, 1.0),
                relation: Relation::Equal,
                rhs: 1.0,
            }
        };
        program.constraints.push(constraint);
    }

    Ok(program)
}

/// 最大流模型
///
/// 最大化 V。源点净流出 V，汇点净流入 V，其余节点守恒，边流量在 [0, 容量] 内。
pub fn max_flow_program(graph: &Graph) -> Result<LinearProgram> {
    let source = graph.source().ok_or(Error::MissingSource)?;
    let sink = graph.destination().ok_or(Error::MissingDestination)?;
    let mut program = LinearProgram::new(Sense::Maximize);
    let columns = edge_columns(graph, &mut program, true, false);
    let value = program.add_variable(Variable {
        name: "V".to_string(),
        lower: 0.0,
        upper: None,
        objective: 1.0,
        edge: None,
    });

    for node in graph.nodes() {
        let (name, mut terms) = if node == source {
            ("balance_source".to_string(), balance_terms(graph, node, &columns, -1.0))
        } else if node == sink {
            ("balance_sink".to_string(), balance_terms(graph, node, &columns, 1.0))
        } else {
            (format!("balance_{}", node.as_u32()), balance_terms(graph, node, &columns, 1.0))
        };
        if node == source || node == sink {
            terms.push((value, -1.0));
        }
        program.constraints.push(Constraint {
            name,
            terms,
            relation: Relation::Equal,
            rhs: 0.0,
        });
    }

    Ok(program)
}

// ==================== 求解器接口 ====================

/// 求解状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LpStatus {
    Optimal,
    Infeasible,
    Unbounded,
    /// 其他求解器状态码
    Other(i32),
}

/// 求解器返回的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LpSolution {
    pub status: LpStatus,
    pub objective: f64,
    /// 变量名 -> 取值
    pub values: HashMap<String, f64>,
}

impl LpSolution {
    fn ensure_optimal(&self) -> Result<()> {
        match self.status {
            LpStatus::Optimal => Ok(()),
            LpStatus::Infeasible => Err(Error::SolverError("问题不可行".to_string())),
            LpStatus::Unbounded => Err(Error::SolverError("问题无界".to_string())),
            LpStatus::Other(code) => Err(Error::SolverError(format!("求解结束，状态码 {}", code))),
        }
    }

    /// 取值为正的边变量
    pub fn positive_edges(&self) -> Vec<(EdgeKey, f64)> {
        let mut edges: Vec<(EdgeKey, f64)> = self
            .values
            .iter()
            .filter(|(_, &x)| x > EPSILON)
            .filter_map(|(name, &x)| parse_variable_name(name).map(|key| (key, x)))
            .collect();
        edges.sort_by_key(|(key, _)| (key.tail, key.head));
        edges
    }
}

/// 外部线性规划求解器
pub trait LpSolver {
    fn solve(&self, program: &LinearProgram) -> Result<LpSolution>;
}

// ==================== 结果回译 ====================

/// 把最短路树的解回译为 [`ShortestPaths`]
pub fn shortest_paths_from_solution(graph: &Graph, solution: &LpSolution) -> Result<ShortestPaths> {
    solution.ensure_optimal()?;
    let source = graph.source().ok_or(Error::MissingSource)?;

    let mut paths = ShortestPaths::new(AlgorithmKind::ShortestPathLp, source, graph.destination());
    for (key, _) in solution.positive_edges() {
        if graph.edge(key).is_none() {
            return Err(Error::SolverError(format!("解中含有不存在的边 {}", key)));
        }
        paths.predecessors.insert(key.head, key.tail);
    }

    // 沿树计算距离，按图中节点顺序写入
    let mut distances: HashMap<NodeId, i64> = HashMap::new();
    distances.insert(source, 0);
    for node in graph.nodes() {
        let mut chain = Vec::new();
        let mut current = node;
        while !distances.contains_key(&current) {
            chain.push(current);
            match paths.predecessors.get(&current) {
                Some(&pred) if chain.len() <= graph.node_count() => current = pred,
                _ => break,
            }
        }
        let Some(&base) = distances.get(&current) else {
            continue;
        };
        let mut distance = base;
        let mut tail = current;
        for &head in chain.iter().rev() {
            let weight = graph.edge(EdgeKey::new(tail, head)).map_or(0, |e| e.weight());
            distance = extend_distance(distance, weight)?;
            distances.insert(head, distance);
            tail = head;
        }
    }

    for node in graph.nodes() {
        if let Some(&d) = distances.get(&node) {
            paths.distances.insert(node, d);
        }
    }

    Ok(paths)
}

/// 把最大流的解回译为 [`MaxFlow`]，并把流量写回图中
pub fn max_flow_from_solution(graph: &mut Graph, solution: &LpSolution) -> Result<MaxFlow> {
    solution.ensure_optimal()?;
    let (source, sink) = flow_terminals(graph)?;

    graph.reset_flows();
    let mut network = ResidualNetwork::from_graph(graph);
    for (i, edge) in graph.edges().enumerate() {
        let raw = solution.values.get(&variable_name(edge.key())).copied().unwrap_or(0.0);
        let flow = raw.round() as i64;
        if flow < 0 || flow > edge.weight() {
            return Err(Error::SolverError(format!("边 {} 的流量 {} 超出容量 {}", edge.key(), raw, edge.weight())));
        }
        network.push(Arc { edge: i, forward: true }, flow);
    }

    network.write_back(graph);
    let value = solution.objective.round() as i64;
    network.into_result(AlgorithmKind::MaxFlowLp, source, sink, value, 0)
}

// ==================== 运行入口 ====================

/// 通过外部求解器计算最短路，只对应一次 `run()`
pub struct ShortestPathLp<'g, 's> {
    graph: &'g mut Graph,
    solver: &'s dyn LpSolver,
    precondition: Precondition,
}

impl<'g, 's> ShortestPathLp<'g, 's> {
    pub fn new(graph: &'g mut Graph, solver: &'s dyn LpSolver) -> Self {
        let precondition = Precondition::check(graph, true);
        Self {
            graph,
            solver,
            precondition,
        }
    }

    pub fn run(self) -> Result<ShortestPaths> {
        let Self {
            graph,
            solver,
            precondition,
        } = self;
        precondition.into_result(graph)?;

        let program = shortest_path_program(graph)?;
        let result = solver
            .solve(&program)
            .and_then(|solution| shortest_paths_from_solution(graph, &solution));

        match result {
            Ok(paths) => {
                graph.set_solved(true);
                info!(
                    algorithm = "shortest_path_lp",
                    variables = program.variables.len(),
                    distance = ?paths.destination_distance(),
                    "shortest path computed"
                );
                Ok(paths)
            }
            Err(err) => {
                graph.set_solved(false);
                warn!(algorithm = "shortest_path_lp", error = %err, "solver failed");
                Err(err)
            }
        }
    }
}

/// 通过外部求解器计算最大流，只对应一次 `run()`
pub struct MaxFlowLp<'g, 's> {
    graph: &'g mut Graph,
    solver: &'s dyn LpSolver,
    precondition: Precondition,
}

impl<'g, 's> MaxFlowLp<'g, 's> {
    pub fn new(graph: &'g mut Graph, solver: &'s dyn LpSolver) -> Self {
        graph.reset_flows();
        let precondition = Precondition::check(graph, true);
        Self {
            graph,
            solver,
            precondition,
        }
    }

    pub fn run(self) -> Result<MaxFlow> {
        let Self {
            graph,
            solver,
            precondition,
        } = self;
        precondition.into_result(graph)?;
        flow_terminals(graph)?;

        let program = max_flow_program(graph)?;
        let result = solver
            .solve(&program)
            .and_then(|solution| max_flow_from_solution(graph, &solution));

        match result {
            Ok(flow) => {
                graph.set_solved(true);
                info!(algorithm = "max_flow_lp", value = flow.value, "max flow computed");
                Ok(flow)
            }
            Err(err) => {
                graph.reset_flows();
                graph.set_solved(false);
                warn!(algorithm = "max_flow_lp", error = %err, "solver failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(id: u32) -> NodeId {
        NodeId::new(id)
    }

    fn build(nodes: u32, edges: &[(u32, u32, i64)], source: u32, dest: u32) -> Graph {
        let mut graph = Graph::new();
        for id in 1..=nodes {
            graph.add_node(n(id)).unwrap();
        }
        for &(u, v, w) in edges {
            graph.add_edge(n(u), n(v), w).unwrap();
        }
        graph.set_source(n(source)).unwrap();
        graph.set_destination(n(dest)).unwrap();
        graph
    }

    /// 返回预设取值的求解器
    struct FixedSolver {
        status: LpStatus,
        objective: f64,
        values: Vec<(&'static str, f64)>,
    }

    impl LpSolver for FixedSolver {
        fn solve(&self, program: &LinearProgram) -> Result<LpSolution> {
            let values = self
                .values
                .iter()
                .map(|&(name, x)| (name.to_string(), x))
                .collect::<HashMap<_, _>>();
            assert!(values.keys().all(|name| program.variable(name).is_some()));
            Ok(LpSolution {
                status: self.status,
                objective: self.objective,
                values,
            })
        }
    }

    fn dense(program: &LinearProgram, values: &[(&str, f64)]) -> Vec<f64> {
        let mut dense = vec![0.0; program.variables.len()];
        for &(name, x) in values {
            dense[program.variable(name).unwrap()] = x;
        }
        dense
    }

    #[test]
    fn test_variable_names() {
        let key = EdgeKey::new(n(3), n(12));
        assert_eq!(variable_name(key), "x_3_12");
        assert_eq!(parse_variable_name("x_3_12"), Some(key));
        assert_eq!(parse_variable_name("V"), None);
        assert_eq!(parse_variable_name("x_1_2_3"), None);
    }

    #[test]
    fn test_shortest_path_program_shape() {
        let graph = build(3, &[(1, 2, 1), (2, 3, 2), (1, 3, 5)], 1, 3);

        let program = shortest_path_program(&graph).unwrap();

        assert_eq!(program.sense, Sense::Minimize);
        assert_eq!(program.variables.len(), 3);
        assert_eq!(program.constraints.len(), 3);
        assert_eq!(program.constraints[0].rhs, -2.0);

        // 最短路树 1->2->3 满足约束，目标值为树边权之和
        let tree = dense(&program, &[("x_1_2", 2.0), ("x_2_3", 1.0)]);
        assert!(program.is_feasible(&tree, 1e-9));
        assert_eq!(program.objective_value(&tree), 4.0);

        let direct = dense(&program, &[("x_1_2", 1.0), ("x_1_3", 1.0)]);
        assert!(program.is_feasible(&direct, 1e-9));
        assert_eq!(program.objective_value(&direct), 6.0);
    }

    #[test]
    fn test_max_flow_program_shape() {
        let graph = build(3, &[(1, 2, 10), (2, 3, 4)], 1, 3);

        let program = max_flow_program(&graph).unwrap();

        assert_eq!(program.sense, Sense::Maximize);
        assert_eq!(program.variables.len(), 3);
        let v = program.variable("V").unwrap();
        assert_eq!(program.variables[v].objective, 1.0);

        let optimal = dense(&program, &[("x_1_2", 4.0), ("x_2_3", 4.0), ("V", 4.0)]);
        assert!(program.is_feasible(&optimal, 1e-9));
        let over = dense(&program, &[("x_1_2", 5.0), ("x_2_3", 5.0), ("V", 5.0)]);
        assert!(!program.is_feasible(&over, 1e-9));
        let unbalanced = dense(&program, &[("x_1_2", 4.0), ("x_2_3", 3.0), ("V", 4.0)]);
        assert!(!program.is_feasible(&unbalanced, 1e-9));
    }

    #[test]
    fn test_shortest_path_translation() {
        let mut graph = build(3, &[(1, 2, 1), (2, 3, 2), (1, 3, 5)], 1, 3);
        let solver = FixedSolver {
            status: LpStatus::Optimal,
            objective: 4.0,
            values: vec![("x_1_2", 2.0), ("x_2_3", 1.0), ("x_1_3", 0.0)],
        };

        let paths = ShortestPathLp::new(&mut graph, &solver).run().unwrap();

        assert_eq!(paths.algorithm, AlgorithmKind::ShortestPathLp);
        assert_eq!(paths.destination_distance(), Some(3));
        assert_eq!(paths.destination_path(), Some(vec![n(1), n(2), n(3)]));
        assert!(graph.is_solved());
    }

    #[test]
    fn test_max_flow_translation() {
        let mut graph = build(3, &[(1, 2, 10), (2, 3, 4)], 1, 3);
        let solver = FixedSolver {
            status: LpStatus::Optimal,
            objective: 4.0,
            values: vec![("x_1_2", 4.0), ("x_2_3", 4.0), ("V", 4.0)],
        };

        let flow = MaxFlowLp::new(&mut graph, &solver).run().unwrap();

        assert_eq!(flow.value, 4);
        assert_eq!(flow.edge(EdgeKey::new(n(1), n(2))).unwrap().residual(), 6);
        assert_eq!(graph.edge(EdgeKey::new(n(2), n(3))).unwrap().flow(), 4);
        assert_eq!(flow.cut_capacity(), 4);
    }

    #[test]
    fn test_non_optimal_status_fails() {
        let mut graph = build(3, &[(1, 2, 10), (2, 3, 4)], 1, 3);
        let solver = FixedSolver {
            status: LpStatus::Infeasible,
            objective: 0.0,
            values: Vec::new(),
        };

        let err = MaxFlowLp::new(&mut graph, &solver).run().unwrap_err();
        assert!(matches!(err, Error::SolverError(_)));
        assert!(!graph.is_solved());
    }

    #[test]
    fn test_flow_over_capacity_rejected() {
        let mut graph = build(3, &[(1, 2, 10), (2, 3, 4)], 1, 3);
        let solver = FixedSolver {
            status: LpStatus::Optimal,
            objective: 5.0,
            values: vec![("x_1_2", 5.0), ("x_2_3", 5.0)],
        };

        let err = MaxFlowLp::new(&mut graph, &solver).run().unwrap_err();
        assert!(matches!(err, Error::SolverError(_)));
        assert_eq!(graph.edge(EdgeKey::new(n(1), n(2))).unwrap().flow(), 0);
    }

    #[test]
    fn test_lp_validates_first() {
        let mut graph = build(3, &[(1, 2, 1)], 1, 3);
        let solver = FixedSolver {
            status: LpStatus::Optimal,
            objective: 0.0,
            values: Vec::new(),
        };

        let err = ShortestPathLp::new(&mut graph, &solver).run().unwrap_err();
        assert!(matches!(err, Error::UnreachableNode(id) if id == n(3)));
    }
}
