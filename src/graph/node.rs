//! 节点定义
//!
//! 节点只携带身份；算法运行期间的状态（余量、高度、距离标号）
//! 由各算法自己的旁路表维护。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// 节点 ID（图内唯一）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// 矩阵表格中使用的标签，如 `Node 3`
    pub fn label(&self) -> String {
        format!("Node {}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node {}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = Error;

    /// 接受 `3` 或 `Node 3` 两种写法
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("Node")
            .map(str::trim)
            .unwrap_or(trimmed);
        digits
            .parse::<u32>()
            .map(NodeId)
            .map_err(|_| Error::ParseError(format!("无效的节点标识: {:?}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_label() {
        let n = NodeId::new(7);
        assert_eq!(n.as_u32(), 7);
        assert_eq!(n.label(), "Node 7");
        assert_eq!(n.to_string(), "Node 7");
    }

    #[test]
    fn test_node_parse() {
        assert_eq!("3".parse::<NodeId>().unwrap(), NodeId::new(3));
        assert_eq!("Node 12".parse::<NodeId>().unwrap(), NodeId::new(12));
        assert_eq!(" Node  4 ".parse::<NodeId>().unwrap(), NodeId::new(4));
        assert!("Node x".parse::<NodeId>().is_err());
        assert!("".parse::<NodeId>().is_err());
    }
}
