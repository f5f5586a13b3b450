//! 通用属性包对象

use crate::errors::{DomainError, DomainResult};
use di_abstractions::Dependency;
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;

/// 游戏对象
///
/// 只暴露按名称读写属性，不关心属性的含义。可以在线程间共享。
#[derive(Default)]
pub struct UObject {
    properties: RwLock<HashMap<String, Dependency>>,
}

impl UObject {
    /// 创建空对象
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取属性，不存在时返回 `None`
    pub fn get_property(&self, name: &str) -> Option<Dependency> {
        self.properties.read().get(name).cloned()
    }

    /// 写入属性，覆盖旧值
    pub fn set_property<T: Any + Send + Sync>(&self, name: &str, value: T) {
        self.set_dependency(name, Dependency::new(value));
    }

    /// 写入已包装的属性值
    pub fn set_dependency(&self, name: &str, value: Dependency) {
        self.properties.write().insert(name.to_string(), value);
    }

    /// 删除属性并返回旧值
    pub fn remove_property(&self, name: &str) -> Option<Dependency> {
        self.properties.write().remove(name)
    }

    /// 是否有该属性
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.read().contains_key(name)
    }

    /// 按类型读取属性；不存在或类型不符时返回 `None`
    pub fn get<T: Any + Clone>(&self, name: &str) -> Option<T> {
        self.properties
            .read()
            .get(name)
            .and_then(|value| value.downcast_ref::<T>().cloned())
    }

    /// 按类型读取属性，区分缺失与类型不符
    pub fn require<T: Any + Clone>(&self, name: &str) -> DomainResult<T> {
        let properties = self.properties.read();
        let value = properties
            .get(name)
            .ok_or_else(|| DomainError::missing(name))?;

        value
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| DomainError::type_mismatch::<T>(name))
    }

    /// 属性名，按字典序
    pub fn property_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.properties.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for UObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UObject")
            .field("properties", &self.property_names())
            .finish()
    }
}
