//! 领域错误

use thiserror::Error;

/// 领域错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("对象缺少属性: {property}")]
    MissingProperty { property: String },

    #[error("属性类型不匹配: {property}, 期望 {expected}")]
    PropertyTypeMismatch {
        property: String,
        expected: &'static str,
    },

    #[error("燃料不足: 需要 {required}, 剩余 {available}")]
    NotEnoughFuel { required: i64, available: i64 },
}

impl DomainError {
    /// 缺少属性
    pub fn missing(property: impl Into<String>) -> Self {
        Self::MissingProperty {
            property: property.into(),
        }
    }

    /// 属性类型不是 `T`
    pub fn type_mismatch<T>(property: impl Into<String>) -> Self {
        Self::PropertyTypeMismatch {
            property: property.into(),
            expected: std::any::type_name::<T>(),
        }
    }
}

/// 领域操作结果
pub type DomainResult<T> = Result<T, DomainError>;
