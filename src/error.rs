//! 错误类型定义

use crate::graph::{EdgeKey, NodeId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // ==================== 前置条件 ====================
    #[error("图中必须指定源点")]
    MissingSource,

    #[error("图中必须指定终点")]
    MissingDestination,

    #[error("图中存在从源点不可达的节点: {0}")]
    UnreachableNode(NodeId),

    // ==================== 算法失败 ====================
    #[error("检测到负环")]
    NegativeCycleDetected,

    #[error("不支持负权边 {0}，请改用 Bellman-Ford 算法")]
    NegativeWeightNotSupported(EdgeKey),

    #[error("图中存在环，拓扑排序要求有向无环图")]
    CycleDetected,

    // ==================== 图编辑 ====================
    #[error("节点不存在: {0}")]
    NodeNotFound(NodeId),

    #[error("节点已存在: {0}")]
    NodeAlreadyExists(NodeId),

    #[error("边不存在: {0}")]
    EdgeNotFound(EdgeKey),

    #[error("边已存在: {0}")]
    EdgeAlreadyExists(EdgeKey),

    #[error("不允许自环: {0}")]
    SelfLoop(NodeId),

    // ==================== 外部协作方 ====================
    #[error("导入错误: {0}")]
    ImportError(String),

    #[error("解析错误: {0}")]
    ParseError(String),

    #[error("线性规划求解错误: {0}")]
    SolverError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("算法错误: {0}")]
    AlgorithmError(String),

    #[error("数值溢出: {0}")]
    Overflow(String),

    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV 错误: {0}")]
    CsvError(#[from] csv::Error),

    #[error("序列化错误: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl Error {
    /// 是否为图形状前置条件错误（需要调用方修正图后重试）
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Error::MissingSource | Error::MissingDestination | Error::UnreachableNode(_)
        )
    }
}
