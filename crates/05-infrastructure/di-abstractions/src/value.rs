//! 类型擦除的依赖值与解析参数

use crate::command::CommandRef;
use infrastructure_common::{DependencyError, DependencyResult};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// 解析得到的依赖值
///
/// 内部是 `Arc<dyn Any + Send + Sync>`，克隆只增加引用计数。
#[derive(Clone)]
pub struct Dependency {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Dependency {
    /// 包装一个值
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// 包装一个已共享的值，不再额外分配
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            value,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// 包装命令
    pub fn from_command(command: CommandRef) -> Self {
        Self::new(command)
    }

    /// 取出命令，值不是命令时返回 `None`
    pub fn as_command(&self) -> Option<CommandRef> {
        self.downcast_ref::<CommandRef>().cloned()
    }

    /// 转换为具体类型的共享引用
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.value.clone().downcast::<T>().ok()
    }

    /// 借用为具体类型
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// 是否为指定类型
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// 值的类型名，仅用于诊断
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// 两个依赖是否指向同一个值
    pub fn ptr_eq(&self, other: &Dependency) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependency")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// 解析参数：位置参数与命名参数
#[derive(Clone, Default)]
pub struct Args {
    positional: Vec<Dependency>,
    named: HashMap<String, Dependency>,
}

impl Args {
    /// 空参数
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加位置参数
    pub fn arg<T: Any + Send + Sync>(self, value: T) -> Self {
        self.with_dependency(Dependency::new(value))
    }

    /// 追加已包装的位置参数
    pub fn with_dependency(mut self, value: Dependency) -> Self {
        self.positional.push(value);
        self
    }

    /// 设置命名参数
    pub fn named<T: Any + Send + Sync>(mut self, name: impl Into<String>, value: T) -> Self {
        self.named.insert(name.into(), Dependency::new(value));
        self
    }

    /// 位置参数个数
    pub fn len(&self) -> usize {
        self.positional.len()
    }

    /// 是否没有任何参数
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    /// 全部位置参数
    pub fn positional(&self) -> &[Dependency] {
        &self.positional
    }

    /// 原始位置参数
    pub fn dependency(&self, index: usize) -> Option<&Dependency> {
        self.positional.get(index)
    }

    /// 按位置取参数
    pub fn get<T: Any + Send + Sync>(&self, index: usize) -> Option<Arc<T>> {
        self.positional.get(index).and_then(Dependency::downcast::<T>)
    }

    /// 按名称取参数
    pub fn get_named<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.named.get(name).and_then(Dependency::downcast::<T>)
    }

    /// 按位置取参数，缺失或类型不符时返回 [`DependencyError::InvalidArguments`]
    pub fn require<T: Any + Send + Sync>(&self, key: &str, index: usize) -> DependencyResult<Arc<T>> {
        let value = self.positional.get(index).ok_or_else(|| {
            DependencyError::invalid_arguments(key, format!("缺少第 {} 个参数", index))
        })?;

        value.downcast::<T>().ok_or_else(|| {
            DependencyError::invalid_arguments(
                key,
                format!(
                    "第 {} 个参数类型为 {}, 期望 {}",
                    index,
                    value.type_name(),
                    std::any::type_name::<T>()
                ),
            )
        })
    }

    /// 取字符串参数，接受 `String` 与 `&'static str`
    pub fn require_str(&self, key: &str, index: usize) -> DependencyResult<String> {
        let value = self.positional.get(index).ok_or_else(|| {
            DependencyError::invalid_arguments(key, format!("缺少第 {} 个参数", index))
        })?;

        if let Some(s) = value.downcast_ref::<String>() {
            Ok(s.clone())
        } else if let Some(s) = value.downcast_ref::<&'static str>() {
            Ok((*s).to_string())
        } else {
            Err(DependencyError::invalid_arguments(
                key,
                format!("第 {} 个参数类型为 {}, 期望字符串", index, value.type_name()),
            ))
        }
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("positional", &self.positional)
            .field("named", &self.named.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_downcast() {
        let value = Dependency::new(42_u32);
        assert!(value.is::<u32>());
        assert!(!value.is::<i32>());
        assert_eq!(value.downcast::<u32>().as_deref(), Some(&42));
        assert!(value.downcast::<String>().is_none());
        assert_eq!(value.type_name(), "u32");
    }

    #[test]
    fn test_dependency_shares_value() {
        let shared = Arc::new(String::from("ship"));
        let value = Dependency::from_arc(shared.clone());
        assert!(Arc::ptr_eq(&shared, &value.downcast::<String>().unwrap()));
        assert!(value.ptr_eq(&value.clone()));
    }

    #[test]
    fn test_args_positional_and_named() {
        let args = Args::new().arg(1_i64).arg("two").named("speed", 3.5_f64);
        assert_eq!(args.len(), 2);
        assert_eq!(args.get::<i64>(0).as_deref(), Some(&1));
        assert_eq!(args.require_str("k", 1).unwrap(), "two");
        assert_eq!(args.get_named::<f64>("speed").as_deref(), Some(&3.5));
        assert!(args.get_named::<f64>("missing").is_none());
    }

    #[test]
    fn test_args_require_reports_invalid_arguments() {
        let args = Args::new().arg(1_i64);
        let error = args.require::<String>("ship.name", 0).unwrap_err();
        assert!(matches!(error, DependencyError::InvalidArguments { .. }));
        assert_eq!(error.key(), "ship.name");

        let error = args.require::<i64>("ship.name", 3).unwrap_err();
        assert!(matches!(error, DependencyError::InvalidArguments { .. }));
    }
}
