//! 太空战斗领域层
//!
//! 属性包对象、接口适配器以及移动、旋转与燃料命令。
//! 适配器只通过解析键访问对象，具体策略由容器中的注册项决定。

pub mod actions;
pub mod adapters;
pub mod errors;
pub mod geometry;
pub mod uobject;

pub use actions::*;
pub use adapters::{
    missing_property, register_default_strategies, AdapterKey, MovingObject, MovingObjectAdapter,
    RotatableObject, RotatableObjectAdapter, SetPropertyCommand,
};
pub use errors::*;
pub use geometry::*;
pub use uobject::UObject;
