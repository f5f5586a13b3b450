//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义按字符串键注册、按作用域解析依赖的核心接口，
//! 以及命令与异常处理器接口。
//!
//! ## 核心接口
//!
//! - [`DependencyRegistry`] - 依赖注册表接口
//! - [`DependencyResolver`] - 依赖解析器接口
//! - [`ScopeManager`] - 作用域管理接口
//! - [`Command`] / [`ExceptionHandler`] - 命令与异常处理器接口

pub mod command;
pub mod container;
pub mod factory;
pub mod registry;
pub mod resolver;
pub mod value;

pub use command::*;
pub use container::*;
pub use factory::*;
pub use registry::*;
pub use resolver::*;
pub use value::*;
