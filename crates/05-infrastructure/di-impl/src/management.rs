//! 容器管理命令
//!
//! 解析保留键得到的命令。命令在执行时才作用于执行线程的当前作用域，
//! 而不是创建命令时的线程。

use crate::container::IocContainer;
use di_abstractions::{
    keys, Args, Command, CommandRef, DependencyRegistry, Registration, ScopeManager,
};
use infrastructure_common::{CommandError, DependencyError, DependencyResult, ScopeId};
use std::sync::Arc;

/// 管理动作
#[derive(Debug, Clone)]
pub enum ManagementAction {
    /// 注册到执行线程的当前作用域
    Register { key: String, registration: Registration },
    /// 注册到全局表
    RegisterGlobal { key: String, registration: Registration },
    /// 新建作用域
    NewScope(ScopeId),
    /// 设置执行线程的当前作用域
    SetCurrentScope(ScopeId),
    /// 清除作用域
    ClearScope(ScopeId),
}

impl ManagementAction {
    /// 对应的保留键
    pub fn key(&self) -> &'static str {
        match self {
            Self::Register { .. } => keys::REGISTER,
            Self::RegisterGlobal { .. } => keys::REGISTER_GLOBAL,
            Self::NewScope(_) => keys::NEW_SCOPE,
            Self::SetCurrentScope(_) => keys::SET_CURRENT_SCOPE,
            Self::ClearScope(_) => keys::CLEAR_SCOPE,
        }
    }
}

/// 管理命令
pub struct ManagementCommand {
    container: IocContainer,
    action: ManagementAction,
}

impl ManagementCommand {
    /// 创建管理命令
    pub fn new(container: IocContainer, action: ManagementAction) -> Self {
        Self { container, action }
    }

    /// 命令携带的动作
    pub fn action(&self) -> &ManagementAction {
        &self.action
    }
}

impl Command for ManagementCommand {
    fn execute(&self) -> Result<(), CommandError> {
        match &self.action {
            ManagementAction::Register { key, registration } => {
                self.container.register_scoped(key, registration.clone());
            }
            ManagementAction::RegisterGlobal { key, registration } => {
                self.container.register_global(key, registration.clone());
            }
            ManagementAction::NewScope(scope) => self.container.new_scope(scope),
            ManagementAction::SetCurrentScope(scope) => self.container.set_current_scope(scope),
            ManagementAction::ClearScope(scope) => self.container.clear_scope(scope),
        }
        Ok(())
    }

    fn name(&self) -> &str {
        self.action.key()
    }
}

/// 保留键对应的管理命令；普通键返回 `None`
pub(crate) fn command_for(
    container: &IocContainer,
    key: &str,
    args: &Args,
) -> DependencyResult<Option<CommandRef>> {
    let action = match key {
        keys::REGISTER => {
            let (key, registration) = registration_args(key, args)?;
            ManagementAction::Register { key, registration }
        }
        keys::REGISTER_GLOBAL => {
            let (key, registration) = registration_args(key, args)?;
            ManagementAction::RegisterGlobal { key, registration }
        }
        keys::NEW_SCOPE => ManagementAction::NewScope(scope_arg(key, args)?),
        keys::SET_CURRENT_SCOPE => ManagementAction::SetCurrentScope(scope_arg(key, args)?),
        keys::CLEAR_SCOPE => ManagementAction::ClearScope(scope_arg(key, args)?),
        _ => return Ok(None),
    };

    let command: CommandRef = Arc::new(ManagementCommand::new(container.clone(), action));
    Ok(Some(command))
}

/// `(key, value)`：值不是 [`Registration`] 时按字面量注册
fn registration_args(key: &str, args: &Args) -> DependencyResult<(String, Registration)> {
    let name = args.require_str(key, 0)?;
    let value = args
        .dependency(1)
        .ok_or_else(|| DependencyError::invalid_arguments(key, "缺少注册值"))?;

    let registration = value
        .downcast_ref::<Registration>()
        .cloned()
        .unwrap_or_else(|| Registration::Value(value.clone()));

    Ok((name, registration))
}

/// `(scope_id)`：接受 [`ScopeId`] 或字符串
fn scope_arg(key: &str, args: &Args) -> DependencyResult<ScopeId> {
    match args.get::<ScopeId>(0) {
        Some(scope) => Ok(ScopeId::clone(&scope)),
        None => args.require_str(key, 0).map(ScopeId::from),
    }
}
