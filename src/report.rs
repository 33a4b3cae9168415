//! 结果报告
//!
//! 把算法结果格式化为文本或表格输出

use crate::algorithm::{AllPairsShortestPaths, EdgeFlow, EdgeUsage, MaxFlow, ShortestPaths, Solution, Traversal};
use crate::error::Result;
use crate::graph::{Graph, NodeId};
use prettytable::{format, row, Cell, Row, Table};

/// 不可达距离的显示
pub const UNREACHABLE: &str = "INF";

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// 文本与表格
    Text,
    /// JSON
    Json,
}

/// 结果报告器
pub struct Reporter {
    format: OutputFormat,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(OutputFormat::Text)
    }
}

impl Reporter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn set_format(&mut self, format: OutputFormat) {
        self.format = format;
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// 格式化一次运行的结果
    pub fn render(&self, solution: &Solution, elapsed_ms: u64) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(solution)?);
        }

        let body = match solution {
            Solution::Traversal(t) => format!("Traversed Path: {}\n", traversal_string(t)),
            Solution::ShortestPaths(p) => shortest_path_summary(p),
            Solution::Topological(t) => format!(
                "Topological Order: {}\n{}",
                path_string(&t.order),
                shortest_path_summary(&t.paths)
            ),
            Solution::AllPairs(p) => format!(
                "Shortest Path between each node (All Pairs):\n{}{}",
                distance_matrix_table(p),
                shortest_path_summary(&p.source_paths())
            ),
            Solution::MaxFlow(f) => format!("{}{}", max_flow_summary(f), edge_flow_table(f)),
        };

        Ok(format!("{}Completed in {} ms\n", body, elapsed_ms))
    }

    /// 图的节点与边
    pub fn render_graph(&self, graph: &Graph) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(graph)?);
        }
        Ok(graph_table(graph).to_string())
    }
}

/// "Node 1->Node 2->Node 3"
pub fn path_string(path: &[NodeId]) -> String {
    path.iter()
        .map(|n| n.label())
        .collect::<Vec<_>>()
        .join("->")
}

pub fn traversal_string(traversal: &Traversal) -> String {
    path_string(&traversal.order)
}

pub fn usage_label(usage: EdgeUsage) -> &'static str {
    match usage {
        EdgeUsage::Full => "Full",
        EdgeUsage::Partial => "Partially used",
        EdgeUsage::Unused => "Not used",
    }
}

/// 单条边的流量行：`Edge ~ 1 - 2 :  (4/10)   - Partially used`
pub fn edge_flow_line(edge: &EdgeFlow) -> String {
    format!(
        "Edge ~ {} - {} :  ({}/{})   - {}",
        edge.key.tail.as_u32(),
        edge.key.head.as_u32(),
        edge.flow,
        edge.capacity,
        usage_label(edge.usage())
    )
}

/// 每条边的流量报告，按 (tail, head) 排序
pub fn flow_report(flow: &MaxFlow) -> String {
    let mut edges: Vec<&EdgeFlow> = flow.edges.iter().collect();
    edges.sort_by_key(|e| (e.key.tail, e.key.head));
    edges
        .into_iter()
        .map(|e| edge_flow_line(e) + "\n")
        .collect()
}

pub fn shortest_path_summary(paths: &ShortestPaths) -> String {
    let Some(destination) = paths.destination else {
        return String::new();
    };
    match (paths.destination_path(), paths.destination_distance()) {
        (Some(path), Some(distance)) => format!(
            "Shortest Path From {} to {}: {}              Total Distance: {}\n",
            paths.source,
            destination,
            path_string(&path),
            distance
        ),
        _ => format!("No path from {} to {}\n", paths.source, destination),
    }
}

pub fn max_flow_summary(flow: &MaxFlow) -> String {
    let mut out = format!(
        "Maximum flow that can be sent from {} to {} : {}\nEdge's residual/original capacities:\n{}",
        flow.source,
        flow.sink,
        flow.value,
        flow_report(flow)
    );
    if !flow.thresholds.is_empty() {
        let phases: Vec<String> = flow.thresholds.iter().map(|d| d.to_string()).collect();
        out.push_str(&format!("Scaling thresholds: {}\n", phases.join(", ")));
    }
    out
}

/// 全源最短路距离矩阵，不可达显示为 INF
pub fn distance_matrix_table(paths: &AllPairsShortestPaths) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);

    let mut header = vec![Cell::new("Node Name")];
    header.extend(paths.nodes.iter().map(|n| Cell::new(&n.label())));
    table.set_titles(Row::new(header));

    for (node, row) in paths.nodes.iter().zip(paths.matrix()) {
        let mut cells = vec![Cell::new(&node.label())];
        cells.extend(row.iter().map(|d| match d {
            Some(d) => Cell::new(&d.to_string()),
            None => Cell::new(UNREACHABLE),
        }));
        table.add_row(Row::new(cells));
    }

    table
}

/// 每条边的流量明细表
pub fn edge_flow_table(flow: &MaxFlow) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(row!["Edge", "Flow", "Capacity", "Residual", "Usage"]);
    for edge in &flow.edges {
        table.add_row(row![
            edge.key.to_string(),
            edge.flow.to_string(),
            edge.capacity.to_string(),
            edge.residual().to_string(),
            usage_label(edge.usage())
        ]);
    }
    table
}

/// 图概览表
pub fn graph_table(graph: &Graph) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(row!["Property", "Value"]);
    table.add_row(row!["Node Count", graph.node_count().to_string()]);
    table.add_row(row!["Edge Count", graph.edge_count().to_string()]);
    table.add_row(row![
        "Source",
        graph.source().map_or("-".to_string(), |n| n.label())
    ]);
    table.add_row(row![
        "Destination",
        graph.destination().map_or("-".to_string(), |n| n.label())
    ]);
    table.add_row(row!["Solved", graph.is_solved().to_string()]);
    for edge in graph.edges() {
        table.add_row(row![edge.key().to_string(), edge.weight().to_string()]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::{solve, AlgorithmKind};

    fn n(id: u32) -> NodeId {
        NodeId::new(id)
    }

    fn scenario() -> Graph {
        let mut graph = Graph::new();
        for id in 1..=3 {
            graph.add_node(n(id)).unwrap();
        }
        graph.add_edge(n(1), n(2), 10).unwrap();
        graph.add_edge(n(2), n(3), 4).unwrap();
        graph.set_source(n(1)).unwrap();
        graph.set_destination(n(3)).unwrap();
        graph
    }

    #[test]
    fn test_path_string() {
        assert_eq!(path_string(&[n(1), n(2), n(3)]), "Node 1->Node 2->Node 3");
        assert_eq!(path_string(&[n(4)]), "Node 4");
    }

    #[test]
    fn test_flow_report_lines() {
        let mut graph = scenario();
        let Solution::MaxFlow(flow) = solve(&mut graph, AlgorithmKind::AugmentingPath).unwrap() else {
            panic!("expected a flow");
        };

        let report = flow_report(&flow);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "Edge ~ 1 - 2 :  (4/10)   - Partially used");
        assert_eq!(lines[1], "Edge ~ 2 - 3 :  (4/4)   - Full");
        assert!(max_flow_summary(&flow).contains("Node 1 to Node 3 : 4"));
    }

    #[test]
    fn test_render_flow_includes_edge_table() {
        let mut graph = scenario();
        let solution = solve(&mut graph, AlgorithmKind::PreflowPush).unwrap();

        let text = Reporter::default().render(&solution, 1).unwrap();
        assert!(text.contains("Edge ~ 1 - 2 :  (4/10)   - Partially used"));
        assert!(text.contains("Residual"));
        assert!(text.contains("Node 1 -> Node 2"));

        let Solution::MaxFlow(flow) = solution else {
            panic!("expected a flow");
        };
        let table = edge_flow_table(&flow);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get_row(0).unwrap().get_cell(3).unwrap().get_content(), "6");
    }

    #[test]
    fn test_distance_matrix_inf() {
        let mut graph = scenario();
        let Solution::AllPairs(paths) = solve(&mut graph, AlgorithmKind::FloydWarshall).unwrap() else {
            panic!("expected all pairs");
        };

        let table = distance_matrix_table(&paths).to_string();
        assert!(table.contains("Node Name"));
        assert!(table.contains(UNREACHABLE));
        assert!(table.contains("14"));
    }

    #[test]
    fn test_render_text_and_json() {
        let mut graph = scenario();
        let solution = solve(&mut graph, AlgorithmKind::Dijkstra).unwrap();

        let text = Reporter::default().render(&solution, 3).unwrap();
        assert!(text.contains("Node 1->Node 2->Node 3"));
        assert!(text.contains("Total Distance: 14"));
        assert!(text.contains("3 ms"));

        let json = Reporter::new(OutputFormat::Json).render(&solution, 3).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["kind"], "shortest_paths");
    }
}
