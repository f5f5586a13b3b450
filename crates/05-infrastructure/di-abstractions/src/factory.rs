//! 注册项：字面量或工厂

use crate::value::{Args, Dependency};
use infrastructure_common::DependencyResult;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 工厂函数类型
///
/// 每次解析都会以调用方给出的参数调用一次。
pub type FactoryFn = Arc<dyn Fn(&Args) -> DependencyResult<Dependency> + Send + Sync>;

/// 注册表中的一项
#[derive(Clone)]
pub enum Registration {
    /// 字面量，解析时原样返回
    Value(Dependency),
    /// 工厂，解析时调用
    Factory(FactoryFn),
}

impl Registration {
    /// 注册字面量
    pub fn value<T: Any + Send + Sync>(value: T) -> Self {
        Self::Value(Dependency::new(value))
    }

    /// 注册带类型的工厂
    pub fn factory<T, F>(factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Args) -> DependencyResult<T> + Send + Sync + 'static,
    {
        Self::Factory(Arc::new(move |args: &Args| factory(args).map(Dependency::new)))
    }

    /// 是否为工厂
    pub fn is_factory(&self) -> bool {
        matches!(self, Self::Factory(_))
    }

    /// 产出依赖值
    pub fn produce(&self, args: &Args) -> DependencyResult<Dependency> {
        match self {
            Self::Value(value) => Ok(value.clone()),
            Self::Factory(factory) => factory(args),
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Factory(_) => f.write_str("Factory(<function>)"),
        }
    }
}

impl From<Dependency> for Registration {
    fn from(value: Dependency) -> Self {
        Self::Value(value)
    }
}
