//! # 依赖注入具体实现
//!
//! 提供作用域化 IoC 容器：全局表与具名作用域表在线程间共享，
//! 当前作用域指针按线程区分。保留键解析为管理命令。

pub mod container;
pub mod management;
mod scopes;

pub use container::IocContainer;
pub use management::{ManagementAction, ManagementCommand};
