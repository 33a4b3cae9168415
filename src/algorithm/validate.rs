//! 算法前置条件检查
//!
//! 每个算法在构造时调用一次，运行时直接返回缓存的结果。

use crate::error::{Error, Result};
use crate::graph::Graph;

/// 检查图是否满足运行算法的前提：
/// 1. 已指定源点
/// 2. 已指定终点（`require_destination` 为 true 时）
/// 3. 所有节点均可从源点到达
///
/// 不修改图。
pub fn validate(graph: &Graph, require_destination: bool) -> Result<()> {
    let source = graph.source().ok_or(Error::MissingSource)?;

    if require_destination && graph.destination().is_none() {
        return Err(Error::MissingDestination);
    }

    let reachable = graph.reachable_from(source);
    if let Some(node) = graph.nodes().find(|n| !reachable.contains(n)) {
        return Err(Error::UnreachableNode(node));
    }

    Ok(())
}

/// 构造时缓存的校验结果
#[derive(Debug)]
pub(crate) struct Precondition(Option<Error>);

impl Precondition {
    pub(crate) fn check(graph: &Graph, require_destination: bool) -> Self {
        Self(validate(graph, require_destination).err())
    }

    /// 取出缓存的错误；失败时撤销图上一次的求解标记
    pub(crate) fn into_result(self, graph: &mut Graph) -> Result<()> {
        match self.0 {
            Some(err) => {
                graph.set_solved(false);
                Err(err)
            }
            None => Ok(()),
        }
    }
}
