//! 日志
//!
//! 两部分：进程级的 `tracing` 订阅器（只由可执行文件初始化），
//! 以及每次运行单独打开的 [`RunTranscript`]，把运行记录追加到人类可读的文本文件。
//! 运行记录不依赖任何全局状态，调用方显式打开、写入、关闭。

use crate::algorithm::{AlgorithmKind, Solution};
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::report;
use chrono::{DateTime, Local};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// 初始化全局 tracing 订阅器；`RUST_LOG` 优先于 `default_filter`
pub fn init_tracing(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| Error::ConfigError(format!("无效的日志过滤器 {:?}: {}", default_filter, e)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| Error::ConfigError(format!("日志初始化失败: {}", e)))
}

/// 按日期命名的记录文件路径，如 `dir/netgraph_20240102.log`
pub fn transcript_path(dir: &Path, now: DateTime<Local>) -> PathBuf {
    dir.join(format!("netgraph_{}.log", now.format("%Y%m%d")))
}

enum Sink {
    File(BufWriter<File>),
    Memory(Vec<u8>),
}

/// 单次运行的文本记录
pub struct RunTranscript {
    sink: Sink,
    algorithm: AlgorithmKind,
    started: Instant,
}

impl RunTranscript {
    /// 在 `dir` 下以追加方式打开当天的记录文件
    pub fn open(dir: &Path, algorithm: AlgorithmKind) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let path = transcript_path(dir, Local::now());
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Self::start(Sink::File(BufWriter::new(file)), algorithm)
    }

    /// 写入内存缓冲区
    pub fn in_memory(algorithm: AlgorithmKind) -> Result<Self> {
        Self::start(Sink::Memory(Vec::new()), algorithm)
    }

    fn start(sink: Sink, algorithm: AlgorithmKind) -> Result<Self> {
        let mut transcript = Self {
            sink,
            algorithm,
            started: Instant::now(),
        };
        let now = Local::now().format("%Y-%m-%d %H:%M:%S");
        transcript.line(&format!("{}\t\tTime: {}", algorithm, now))?;
        Ok(transcript)
    }

    fn line(&mut self, text: &str) -> Result<()> {
        match &mut self.sink {
            Sink::File(w) => writeln!(w, "{}", text)?,
            Sink::Memory(buf) => writeln!(buf, "{}", text)?,
        }
        Ok(())
    }

    /// 记录节点与边列表
    pub fn record_graph(&mut self, graph: &Graph) -> Result<()> {
        let nodes: Vec<String> = graph.nodes().map(|n| n.label()).collect();
        let edges: Vec<String> = graph.edges().map(|e| e.to_string()).collect();
        self.line(&format!("Node List: [{}]", nodes.join(", ")))?;
        self.line(&format!("Edge List: [{}]", edges.join(", ")))
    }

    /// 记录算法结果
    pub fn record_solution(&mut self, solution: &Solution) -> Result<()> {
        let text = match solution {
            Solution::Traversal(t) => format!("Traversed Path: {}", report::traversal_string(t)),
            Solution::ShortestPaths(p) => report::shortest_path_summary(p),
            Solution::Topological(t) => report::shortest_path_summary(&t.paths),
            Solution::AllPairs(p) => format!(
                "Shortest Path between each node (All Pairs):\n{}",
                report::distance_matrix_table(p)
            ),
            Solution::MaxFlow(f) => report::max_flow_summary(f),
        };
        self.line(text.trim_end())
    }

    /// 记录失败
    pub fn record_error(&mut self, error: &Error) -> Result<()> {
        self.line(&format!("Algorithm Failed: {}", error))
    }

    /// 写入耗时并关闭；内存记录返回其内容
    pub fn finish(mut self) -> Result<Option<String>> {
        let elapsed = self.started.elapsed().as_secs_f64();
        let summary = format!(
            "Total elapsed time while executing {}(sec) : {}\n",
            self.algorithm, elapsed
        );
        self.line(&summary)?;

        match self.sink {
            Sink::File(mut w) => {
                w.flush()?;
                Ok(None)
            }
            Sink::Memory(buf) => String::from_utf8(buf)
                .map(Some)
                .map_err(|e| Error::ConfigError(format!("记录内容不是 UTF-8: {}", e))),
        }
    }
}
