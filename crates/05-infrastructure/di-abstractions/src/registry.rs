//! 依赖注册表抽象接口

use crate::factory::Registration;
use infrastructure_common::ScopeId;

/// 依赖注册表 trait
///
/// 同一张表内重复注册同一个键时后写入者生效。
pub trait DependencyRegistry: Send + Sync {
    /// 注册到调用线程的当前作用域，作用域表不存在时自动创建
    fn register_scoped(&self, key: &str, registration: Registration);

    /// 注册到指定作用域
    fn register_in(&self, scope: &ScopeId, key: &str, registration: Registration);

    /// 注册到全局表，所有作用域可见
    fn register_global(&self, key: &str, registration: Registration);

    /// 从调用线程的当前作用域看，键是否可解析
    fn is_registered(&self, key: &str) -> bool;
}
