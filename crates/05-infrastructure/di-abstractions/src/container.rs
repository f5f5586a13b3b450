//! 保留的管理键与作用域管理接口

use infrastructure_common::ScopeId;

/// 保留的管理键
///
/// 解析这些键得到一个命令，执行该命令才真正完成对应的管理动作。
pub mod keys {
    /// 注册到当前作用域：`(key, value_or_registration)`
    pub const REGISTER: &str = "IoC.Register";
    /// 注册到全局表：`(key, value_or_registration)`
    pub const REGISTER_GLOBAL: &str = "IoC.RegisterGlobal";
    /// 新建作用域：`(scope_id)`
    pub const NEW_SCOPE: &str = "Scopes.New";
    /// 设置调用线程的当前作用域：`(scope_id)`
    pub const SET_CURRENT_SCOPE: &str = "Scopes.Current";
    /// 清除作用域：`(scope_id)`
    pub const CLEAR_SCOPE: &str = "Scopes.Clear";

    /// 全部保留键
    pub const ALL: [&str; 5] = [
        REGISTER,
        REGISTER_GLOBAL,
        NEW_SCOPE,
        SET_CURRENT_SCOPE,
        CLEAR_SCOPE,
    ];

    /// 是否为保留键
    pub fn is_reserved(key: &str) -> bool {
        ALL.contains(&key)
    }
}

/// 作用域管理 trait
///
/// 作用域表在线程间共享；当前作用域指针每个线程各自一份。
pub trait ScopeManager: Send + Sync {
    /// 新建作用域；已存在时替换为空表
    fn new_scope(&self, scope: &ScopeId);

    /// 设置调用线程的当前作用域，不要求作用域已存在
    fn set_current_scope(&self, scope: &ScopeId);

    /// 调用线程的当前作用域，首次访问为 `"root"`
    fn current_scope(&self) -> ScopeId;

    /// 删除作用域表；任何指向它的线程指针都重置为 `"root"`
    fn clear_scope(&self, scope: &ScopeId);

    /// 作用域表是否存在
    fn has_scope(&self, scope: &ScopeId) -> bool;

    /// 当前存在的作用域
    fn scope_ids(&self) -> Vec<ScopeId>;
}
