//! 邻接矩阵导入导出
//!
//! 矩阵为 n 行 n+1 列：表头为 `Node Name, Node 1, ..., Node n`，
//! 第 0 列是行节点标签，其余单元格为边权、`0`（对角线或无边）或 `INF`（无边）。
//! 载体使用 CSV。

use crate::error::{Error, Result};
use crate::graph::{EdgeKey, Graph, NodeId};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// 表头第一个单元格
pub const HEADER_LABEL: &str = "Node Name";
/// 无边哨兵
pub const NO_EDGE: &str = "INF";

/// 导入统计
#[derive(Debug, Default, Clone)]
pub struct ImportStats {
    pub nodes_imported: usize,
    pub edges_imported: usize,
    pub duration_ms: u64,
}

/// 解析单元格，`None` 表示无边
fn parse_cell(raw: &str, row: usize, col: usize) -> Result<Option<i64>> {
    let cell = raw.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case(NO_EDGE) {
        return Ok(None);
    }

    let weight = match cell.parse::<i64>() {
        Ok(w) => w,
        // 电子表格导出的数字常带 ".0"，按整数截断
        Err(_) => match cell.parse::<f64>() {
            Ok(w) if w.is_finite() => w.trunc() as i64,
            _ => {
                return Err(Error::ImportError(format!(
                    "第 {} 行第 {} 列不是合法的边权: {:?}",
                    row + 1,
                    col + 1,
                    raw
                )))
            }
        },
    };

    Ok((weight != 0).then_some(weight))
}

/// 从 CSV 读取邻接矩阵并构建图
pub fn read_matrix<R: Read>(reader: R) -> Result<(Graph, ImportStats)> {
    let start = Instant::now();
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv.headers()?.clone();
    if headers.get(0) != Some(HEADER_LABEL) {
        return Err(Error::ImportError(format!(
            "表头第一列应为 {:?}",
            HEADER_LABEL
        )));
    }

    let columns = headers
        .iter()
        .skip(1)
        .map(|h| h.parse::<NodeId>())
        .collect::<Result<Vec<_>>>()?;

    let mut graph = Graph::new();
    let mut stats = ImportStats::default();
    for &node in &columns {
        graph.add_node(node)?;
        stats.nodes_imported += 1;
    }

    let mut rows = 0;
    for (r, record) in csv.records().enumerate() {
        let record = record?;
        let tail = record
            .get(0)
            .ok_or_else(|| Error::ImportError(format!("第 {} 行缺少节点标签", r + 1)))?
            .parse::<NodeId>()?;
        if columns.get(r) != Some(&tail) {
            return Err(Error::ImportError(format!(
                "第 {} 行标签 {} 与表头顺序不一致",
                r + 1,
                tail
            )));
        }

        for (c, cell) in record.iter().skip(1).enumerate() {
            let head = columns[c];
            if head == tail {
                continue;
            }
            if let Some(weight) = parse_cell(cell, r, c + 1)? {
                graph.add_edge(tail, head, weight)?;
                stats.edges_imported += 1;
                debug!(tail = %tail, head = %head, weight, "edge imported");
            }
        }
        rows += 1;
    }

    if rows != columns.len() {
        return Err(Error::ImportError(format!(
            "矩阵应有 {} 行，实际 {} 行",
            columns.len(),
            rows
        )));
    }

    stats.duration_ms = start.elapsed().as_millis() as u64;
    Ok((graph, stats))
}

/// 把图写成邻接矩阵
///
/// 权重为 0 的边与“无边”在矩阵中无法区分，会写成 `0`。
pub fn write_matrix<W: Write>(graph: &Graph, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = vec![HEADER_LABEL.to_string()];
    header.extend(graph.nodes().map(|n| n.label()));
    csv.write_record(&header)?;

    for tail in graph.nodes() {
        let mut record = vec![tail.label()];
        for head in graph.nodes() {
            let cell = if tail == head {
                "0".to_string()
            } else {
                match graph.edge(EdgeKey::new(tail, head)) {
                    Some(edge) => edge.weight().to_string(),
                    None => NO_EDGE.to_string(),
                }
            };
            record.push(cell);
        }
        csv.write_record(&record)?;
    }

    csv.flush()?;
    Ok(())
}

/// 从 CSV 文件导入
pub fn import_matrix_csv<P: AsRef<Path>>(path: P) -> Result<Graph> {
    let path = path.as_ref();
    let (graph, stats) = read_matrix(File::open(path)?)?;
    info!(
        path = %path.display(),
        nodes = stats.nodes_imported,
        edges = stats.edges_imported,
        duration_ms = stats.duration_ms,
        "matrix imported"
    );
    Ok(graph)
}

/// 导出到 CSV 文件
pub fn export_matrix_csv<P: AsRef<Path>>(graph: &Graph, path: P) -> Result<()> {
    let path = path.as_ref();
    write_matrix(graph, File::create(path)?)?;
    info!(path = %path.display(), nodes = graph.node_count(), "matrix exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn n(id: u32) -> NodeId {
        NodeId::new(id)
    }

    #[test]
    fn test_read_matrix() {
        let data = "\
Node Name,Node 1,Node 2,Node 3
Node 1,0,4,INF
Node 2,INF,0,2.0
Node 3,7,0,0
";
        let (graph, stats) = read_matrix(data.as_bytes()).unwrap();

        assert_eq!(stats.nodes_imported, 3);
        assert_eq!(stats.edges_imported, 3);
        assert_eq!(graph.edge(EdgeKey::new(n(1), n(2))).unwrap().weight(), 4);
        assert_eq!(graph.edge(EdgeKey::new(n(2), n(3))).unwrap().weight(), 2);
        assert_eq!(graph.edge(EdgeKey::new(n(3), n(1))).unwrap().weight(), 7);
        assert!(graph.edge(EdgeKey::new(n(1), n(3))).is_none());
        assert!(graph.edge(EdgeKey::new(n(3), n(2))).is_none());
    }

    #[test]
    fn test_write_matrix() {
        let mut graph = Graph::new();
        for id in 1..=3 {
            graph.add_node(n(id)).unwrap();
        }
        graph.add_edge(n(1), n(2), 5).unwrap();
        graph.add_edge(n(3), n(1), -2).unwrap();

        let mut out = Vec::new();
        write_matrix(&graph, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Node Name,Node 1,Node 2,Node 3");
        assert_eq!(lines[1], "Node 1,0,5,INF");
        assert_eq!(lines[2], "Node 2,INF,0,INF");
        assert_eq!(lines[3], "Node 3,-2,INF,0");
    }

    #[test]
    fn test_file_roundtrip() {
        let mut graph = Graph::new();
        for id in 1..=4 {
            graph.add_node(n(id)).unwrap();
        }
        graph.add_edge(n(1), n(2), 3).unwrap();
        graph.add_edge(n(2), n(4), 8).unwrap();
        graph.add_edge(n(4), n(3), 1).unwrap();

        let file = NamedTempFile::new().unwrap();
        export_matrix_csv(&graph, file.path()).unwrap();
        let imported = import_matrix_csv(file.path()).unwrap();

        assert_eq!(imported.node_count(), 4);
        let edges: Vec<_> = imported.edges().map(|e| (e.key(), e.weight())).collect();
        let expected: Vec<_> = graph.edges().map(|e| (e.key(), e.weight())).collect();
        assert_eq!(edges, expected);
    }

    #[test]
    fn test_rejects_bad_cells() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Node Name,Node 1,Node 2").unwrap();
        writeln!(file, "Node 1,0,abc").unwrap();
        writeln!(file, "Node 2,INF,0").unwrap();

        let err = import_matrix_csv(file.path()).unwrap_err();
        assert!(matches!(err, Error::ImportError(_)));
    }

    #[test]
    fn test_rejects_missing_rows() {
        let data = "Node Name,Node 1,Node 2\nNode 1,0,1\n";
        assert!(read_matrix(data.as_bytes()).is_err());
    }
}
