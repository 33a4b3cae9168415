//! 命令处理
//!
//! 解析并执行一行命令，命令作用在会话持有的图上

use std::path::Path;
use std::time::Instant;

use tracing::warn;

use crate::algorithm::{solve_with, AlgorithmKind, LpSolver};
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::graph::{EdgeKey, Graph, NodeId};
use crate::import;
use crate::logging::RunTranscript;
use crate::report::{OutputFormat, Reporter};

/// 命令执行结果
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// 继续运行
    Continue,
    /// 退出程序
    Exit,
    /// 显示消息
    Message(String),
    /// 错误
    Error(String),
}

/// 交互会话：图、配置与输出格式
pub struct Session {
    graph: Graph,
    config: SessionConfig,
    reporter: Reporter,
    solver: Option<Box<dyn LpSolver>>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let format = if config.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        };
        Self {
            graph: Graph::new(),
            config,
            reporter: Reporter::new(format),
            solver: None,
        }
    }

    /// 接入外部线性规划求解器
    pub fn with_solver(mut self, solver: Box<dyn LpSolver>) -> Self {
        self.solver = Some(solver);
        self
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// 解析并执行一行命令
    pub fn execute(&mut self, input: &str) -> CommandResult {
        let input = input.trim();
        if input.is_empty() || input.starts_with('#') {
            return CommandResult::Continue;
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        let cmd = parts[0].to_lowercase();
        let args = &parts[1..];

        let outcome = match cmd.as_str() {
            "quit" | "exit" | "q" => return CommandResult::Exit,
            "help" | "h" | "?" => Ok(help_text()),
            "node" | "n" => self.add_node(args),
            "edge" | "e" => self.add_edge(args),
            "weight" | "w" => self.set_weight(args),
            "source" | "s" => self.set_terminal(args, true),
            "dest" | "destination" | "d" => self.set_terminal(args, false),
            "remove" | "rm" => self.remove(args),
            "show" | "info" => self.reporter.render_graph(&self.graph),
            "run" | "r" => self.run(args),
            "import" => self.import(args),
            "export" => self.export(args),
            "json" => self.toggle_json(args),
            "clear" => {
                self.graph.clear();
                Ok("图已清空".to_string())
            }
            _ => Err(Error::ParseError(format!(
                "未知命令: {}。输入 'help' 查看帮助。",
                cmd
            ))),
        };

        match outcome {
            Ok(message) => CommandResult::Message(message),
            Err(e) => CommandResult::Error(e.to_string()),
        }
    }

    fn add_node(&mut self, args: &[&str]) -> Result<String> {
        let id = match args.first() {
            Some(raw) => self.graph.add_node(raw.parse()?)?,
            None => self.graph.add_next_node()?,
        };
        Ok(format!("已添加 {}", id))
    }

    fn add_edge(&mut self, args: &[&str]) -> Result<String> {
        let [tail, head, weight] = args else {
            return Err(usage("edge <起点> <终点> <权重>"));
        };
        let key = self
            .graph
            .add_edge(tail.parse()?, head.parse()?, parse_weight(weight)?)?;
        Ok(format!("已添加边 {}", key))
    }

    fn set_weight(&mut self, args: &[&str]) -> Result<String> {
        let [tail, head, weight] = args else {
            return Err(usage("weight <起点> <终点> <权重>"));
        };
        let key = EdgeKey::new(tail.parse()?, head.parse()?);
        self.graph.set_weight(key, parse_weight(weight)?)?;
        Ok(format!("已更新边 {}", key))
    }

    fn set_terminal(&mut self, args: &[&str], source: bool) -> Result<String> {
        if args.is_empty() {
            return Err(usage(if source { "source <节点>" } else { "dest <节点>" }));
        }
        // 允许 "Node 3" 这种带空格的写法
        let node: NodeId = args.join(" ").parse()?;
        if source {
            self.graph.set_source(node)?;
            Ok(format!("源点: {}", node))
        } else {
            self.graph.set_destination(node)?;
            Ok(format!("终点: {}", node))
        }
    }

    fn remove(&mut self, args: &[&str]) -> Result<String> {
        match args {
            ["node", raw] => {
                let node: NodeId = raw.parse()?;
                self.graph.remove_node(node)?;
                Ok(format!("已删除 {}", node))
            }
            ["edge", tail, head] => {
                let key = EdgeKey::new(tail.parse()?, head.parse()?);
                self.graph.remove_edge(key)?;
                Ok(format!("已删除边 {}", key))
            }
            _ => Err(usage("remove node <节点> | remove edge <起点> <终点>")),
        }
    }

    fn run(&mut self, args: &[&str]) -> Result<String> {
        let kind = match args.first() {
            None => self.config.shortest_path,
            Some(&"flow") => self.config.max_flow,
            Some(name) => name.parse::<AlgorithmKind>()?,
        };

        let mut transcript = if self.config.transcript_enabled {
            Some(RunTranscript::open(&self.config.transcript_dir, kind)?)
        } else {
            None
        };
        if let Some(t) = transcript.as_mut() {
            t.record_graph(&self.graph)?;
        }

        let start = Instant::now();
        let outcome = solve_with(&mut self.graph, kind, self.solver.as_deref());
        let elapsed_ms = start.elapsed().as_millis() as u64;

        if let Some(mut t) = transcript {
            match &outcome {
                Ok(solution) => t.record_solution(solution)?,
                Err(e) => t.record_error(e)?,
            }
            t.finish()?;
        }

        match outcome {
            Ok(solution) => self.reporter.render(&solution, elapsed_ms),
            Err(e) => {
                warn!(algorithm = %kind, error = %e, "run failed");
                Err(e)
            }
        }
    }

    fn import(&mut self, args: &[&str]) -> Result<String> {
        if args.is_empty() {
            return Err(usage("import <文件.csv>"));
        }
        self.graph = import::import_matrix_csv(Path::new(&args.join(" ")))?;
        Ok(format!(
            "已导入 {} 个节点，{} 条边（源点与终点需要重新指定）",
            self.graph.node_count(),
            self.graph.edge_count()
        ))
    }

    fn export(&mut self, args: &[&str]) -> Result<String> {
        if args.is_empty() {
            return Err(usage("export <文件.csv>"));
        }
        let path = args.join(" ");
        import::export_matrix_csv(&self.graph, Path::new(&path))?;
        Ok(format!("已导出到 {}", path))
    }

    fn toggle_json(&mut self, args: &[&str]) -> Result<String> {
        let format = match args {
            ["on"] => OutputFormat::Json,
            ["off"] => OutputFormat::Text,
            _ => return Err(usage("json on|off")),
        };
        self.reporter.set_format(format);
        Ok(format!("输出格式: {:?}", format))
    }
}

fn usage(text: &str) -> Error {
    Error::ParseError(format!("用法: {}", text))
}

fn parse_weight(raw: &str) -> Result<i64> {
    raw.parse()
        .map_err(|_| Error::ParseError(format!("无效的权重: {:?}", raw)))
}

pub fn help_text() -> String {
    let algorithms: Vec<&str> = AlgorithmKind::ALL.iter().map(|k| k.cli_name()).collect();
    format!(
        r#"
═══════════════════════════════════════════════════════════════
                   NetGraph 命令帮助
═══════════════════════════════════════════════════════════════

图编辑:
  node, n [ID]                 添加节点（省略 ID 时自动编号）
  edge, e <起点> <终点> <权重>  添加有向边
  weight, w <起点> <终点> <权重> 修改边权
  source, s <节点>             指定源点
  dest, d <节点>               指定终点
  remove node <节点>           删除节点及其关联边
  remove edge <起点> <终点>    删除边
  clear                        清空图
  show, info                   显示图概览

运行算法:
  run                          使用默认最短路算法
  run flow                     使用默认最大流算法
  run <算法>                   可选: {}

导入导出（邻接矩阵 CSV）:
  import <文件.csv>
  export <文件.csv>

其他:
  json on|off                  切换 JSON 输出
  help, h, ?                   显示帮助
  quit, exit, q                退出程序

═══════════════════════════════════════════════════════════════
"#,
        algorithms.join(", ")
    )
}
