//! 作用域化 IoC 容器实现

use crate::management;
use crate::scopes::{CurrentScopes, ScopeTables};
use di_abstractions::{
    keys, Args, Dependency, DependencyRegistry, DependencyResolver, Registration, ScopeManager,
};
use infrastructure_common::{
    ContainerSettings, DependencyError, DependencyResult, ScopeId, ScopeInfo,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 容器共享状态
struct ContainerState {
    /// 全局注册表
    global: RwLock<HashMap<String, Registration>>,
    /// 具名作用域表
    scopes: ScopeTables,
    /// 各线程的当前作用域
    current: CurrentScopes,
    settings: ContainerSettings,
}

/// 作用域化 IoC 容器
///
/// 显式创建、按句柄传递；克隆得到指向同一容器的新句柄。
/// 所有操作都是同步的，可从任意线程并发调用。
#[derive(Clone)]
pub struct IocContainer {
    state: Arc<ContainerState>,
}

impl IocContainer {
    /// 创建新的容器
    pub fn new() -> Self {
        Self::with_settings(ContainerSettings::default())
    }

    /// 按配置创建容器，配置中的字面量注册到全局表
    pub fn with_settings(settings: ContainerSettings) -> Self {
        let global = settings
            .globals
            .iter()
            .map(|(key, value)| (key.clone(), Registration::value(value.clone())))
            .collect::<HashMap<_, _>>();

        info!("创建 IoC 容器，预置全局依赖 {} 个", global.len());

        Self {
            state: Arc::new(ContainerState {
                global: RwLock::new(global),
                scopes: ScopeTables::new(),
                current: CurrentScopes::default(),
                settings,
            }),
        }
    }

    /// 容器配置
    pub fn settings(&self) -> &ContainerSettings {
        &self.state.settings
    }

    /// 全局表中的键（已排序）
    pub fn global_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.state.global.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// 作用域快照
    pub fn scope_info(&self, scope: &ScopeId) -> Option<ScopeInfo> {
        self.state.scopes.info(scope)
    }

    /// 作用域数量（含根作用域）
    pub fn scope_count(&self) -> usize {
        self.state.scopes.len()
    }

    /// 释放调用线程的当前作用域槽位，之后该线程回到根作用域
    ///
    /// 线程退出时槽位会自动释放；长期存活的线程在归还线程池前调用。
    pub fn release_current_thread(&self) {
        self.state.current.release();
    }

    /// 持有当前作用域槽位的线程数量
    pub fn thread_pointer_count(&self) -> usize {
        self.state.current.len()
    }

    /// 当前作用域优先，其次全局表；不会查找其他具名作用域
    fn lookup(&self, scope: &ScopeId, key: &str) -> Option<Registration> {
        self.state
            .scopes
            .lookup(scope, key)
            .or_else(|| self.state.global.read().get(key).cloned())
    }
}

impl Default for IocContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IocContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IocContainer")
            .field("scopes", &self.state.scopes.len())
            .field("globals", &self.state.global.read().len())
            .finish()
    }
}

/// 保留键总是解析为管理命令，注册到这些键的项永远不可见
fn reject_reserved(key: &str) -> bool {
    let reserved = keys::is_reserved(key);
    if reserved {
        warn!("忽略对保留键的注册: {}", key);
    }
    reserved
}

impl DependencyRegistry for IocContainer {
    fn register_scoped(&self, key: &str, registration: Registration) {
        let scope = self.current_scope();
        self.register_in(&scope, key, registration);
    }

    fn register_in(&self, scope: &ScopeId, key: &str, registration: Registration) {
        if reject_reserved(key) {
            return;
        }
        let replaced = self.state.scopes.insert(scope, key, registration).is_some();
        debug!("注册作用域依赖: scope={}, key={}, replaced={}", scope, key, replaced);
    }

    fn register_global(&self, key: &str, registration: Registration) {
        if reject_reserved(key) {
            return;
        }
        let replaced = self
            .state
            .global
            .write()
            .insert(key.to_string(), registration)
            .is_some();
        debug!("注册全局依赖: key={}, replaced={}", key, replaced);
    }

    fn is_registered(&self, key: &str) -> bool {
        self.lookup(&self.current_scope(), key).is_some()
    }
}

impl DependencyResolver for IocContainer {
    fn resolve(&self, key: &str, args: Args) -> DependencyResult<Dependency> {
        let scope = self.current_scope();
        self.resolve_in(&scope, key, args)
    }

    fn resolve_in(&self, scope: &ScopeId, key: &str, args: Args) -> DependencyResult<Dependency> {
        if let Some(command) = management::command_for(self, key, &args)? {
            return Ok(Dependency::from_command(command));
        }

        // 取出注册项后立即释放锁，工厂内部可以再次解析或注册
        let registration = self.lookup(scope, key).ok_or_else(|| {
            debug!("依赖未找到: scope={}, key={}", scope, key);
            DependencyError::not_found(key)
        })?;

        if self.state.settings.trace_resolution {
            debug!(
                "解析依赖: scope={}, key={}, factory={}",
                scope,
                key,
                registration.is_factory()
            );
        }

        registration.produce(&args)
    }
}

impl ScopeManager for IocContainer {
    fn new_scope(&self, scope: &ScopeId) {
        let replaced = self.state.scopes.create(scope);
        info!("新建作用域: {}, replaced={}", scope, replaced);
    }

    fn set_current_scope(&self, scope: &ScopeId) {
        self.state.current.set(scope);
        debug!("切换当前作用域: {}", scope);
    }

    fn current_scope(&self) -> ScopeId {
        self.state.current.current()
    }

    fn clear_scope(&self, scope: &ScopeId) {
        let removed = self.state.scopes.remove(scope);
        let reset = self.state.current.reset_matching(scope);
        info!("清除作用域: {}, removed={}, reset_pointers={}", scope, removed, reset);
    }

    fn has_scope(&self, scope: &ScopeId) -> bool {
        self.state.scopes.contains(scope)
    }

    fn scope_ids(&self) -> Vec<ScopeId> {
        self.state.scopes.ids()
    }
}
