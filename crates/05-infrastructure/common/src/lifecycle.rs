//! 作用域标识与生命周期信息

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// 根作用域名称，容器创建时即存在
pub const ROOT_SCOPE: &str = "root";

/// 作用域标识
///
/// 克隆开销很低，可作为并发表的键使用
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ScopeId(Arc<str>);

impl ScopeId {
    /// 创建作用域标识
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// 根作用域
    pub fn root() -> Self {
        Self::new(ROOT_SCOPE)
    }

    /// 是否为根作用域
    pub fn is_root(&self) -> bool {
        &*self.0 == ROOT_SCOPE
    }

    /// 字符串形式
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ScopeId {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ScopeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ScopeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ScopeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ScopeId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl From<ScopeId> for String {
    fn from(id: ScopeId) -> Self {
        id.0.to_string()
    }
}

/// 作用域快照，用于诊断
#[derive(Debug, Clone, Serialize)]
pub struct ScopeInfo {
    /// 作用域标识
    pub id: ScopeId,
    /// 本地注册项数量
    pub entries: usize,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_scope() {
        let root = ScopeId::default();
        assert!(root.is_root());
        assert_eq!(root.as_str(), ROOT_SCOPE);
        assert!(!ScopeId::new("battle-1").is_root());
    }

    #[test]
    fn test_scope_id_borrows_as_str() {
        let mut scopes = std::collections::HashMap::new();
        scopes.insert(ScopeId::from("battle-1"), 1);
        assert_eq!(scopes.get("battle-1"), Some(&1));
        assert_eq!(ScopeId::from(String::from("battle-1")).to_string(), "battle-1");
    }
}
