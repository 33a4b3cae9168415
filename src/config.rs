//! 会话配置

use crate::algorithm::AlgorithmKind;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 会话配置，可从 JSON 文件加载，缺省字段取默认值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// 运行记录目录
    pub transcript_dir: PathBuf,
    /// 是否写运行记录
    pub transcript_enabled: bool,
    /// `run` 不带参数时使用的最短路算法
    pub shortest_path: AlgorithmKind,
    /// `run flow` 使用的最大流算法
    pub max_flow: AlgorithmKind,
    /// tracing 过滤器
    pub log_filter: String,
    /// 以 JSON 输出结果
    pub json: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            transcript_dir: PathBuf::from("./netgraph-logs"),
            transcript_enabled: false,
            shortest_path: AlgorithmKind::Dijkstra,
            max_flow: AlgorithmKind::AugmentingPath,
            log_filter: "warn".to_string(),
            json: false,
        }
    }
}

impl SessionConfig {
    /// 从 JSON 文件加载
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config: SessionConfig = serde_json::from_str(&text)?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        if !self.shortest_path.is_shortest_path() {
            return Err(Error::ConfigError(format!(
                "{} 不是最短路算法",
                self.shortest_path
            )));
        }
        if !self.max_flow.is_flow() {
            return Err(Error::ConfigError(format!("{} 不是最大流算法", self.max_flow)));
        }
        // 默认算法必须能在没有外部求解器时运行
        for kind in [self.shortest_path, self.max_flow] {
            if kind.requires_solver() {
                return Err(Error::ConfigError(format!("{} 需要外部线性规划求解器", kind)));
            }
        }
        Ok(())
    }
}
