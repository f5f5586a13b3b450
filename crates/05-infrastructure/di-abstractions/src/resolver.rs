//! 依赖解析器抽象接口

use crate::command::CommandRef;
use crate::value::{Args, Dependency};
use infrastructure_common::{DependencyError, DependencyResult, ScopeId};
use std::any::Any;
use std::sync::Arc;

/// 依赖解析器 trait
///
/// 查找顺序：当前作用域本地表、全局表，都没有则返回 [`DependencyError::NotFound`]。
/// 不会查找其他具名作用域。
pub trait DependencyResolver: Send + Sync {
    /// 以调用线程的当前作用域解析
    fn resolve(&self, key: &str, args: Args) -> DependencyResult<Dependency>;

    /// 以显式给出的作用域解析
    fn resolve_in(&self, scope: &ScopeId, key: &str, args: Args) -> DependencyResult<Dependency>;
}

/// 解析器的类型化便捷方法
pub trait ResolverExt: DependencyResolver {
    /// 解析并转换为具体类型
    fn resolve_as<T: Any + Send + Sync>(&self, key: &str, args: Args) -> DependencyResult<Arc<T>> {
        self.resolve(key, args)?
            .downcast::<T>()
            .ok_or_else(|| DependencyError::type_mismatch::<T>(key))
    }

    /// 解析一个命令
    fn resolve_command(&self, key: &str, args: Args) -> DependencyResult<CommandRef> {
        self.resolve(key, args)?
            .as_command()
            .ok_or_else(|| DependencyError::type_mismatch::<CommandRef>(key))
    }
}

impl<R: DependencyResolver + ?Sized> ResolverExt for R {}
