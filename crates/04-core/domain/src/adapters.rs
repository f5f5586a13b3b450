//! 接口适配器
//!
//! 每个接口方法对应一个静态的解析键：
//! `"<接口>:<属性>.get"`、`"<接口>:<属性>.set"` 或 `"<接口>:<方法>"`。
//! 适配器以 `(目标对象, 额外参数...)` 解析这些键；读取键直接返回值，
//! 写入键与方法键返回命令，由适配器执行。

use crate::errors::DomainError;
use crate::geometry::{Angle, Point, Vector};
use crate::uobject::UObject;
use di_abstractions::{
    Args, Command, CommandRef, Dependency, DependencyRegistry, DependencyResolver, Registration,
    ResolverExt,
};
use infrastructure_common::{CommandError, CommandResult, DependencyError, DependencyResult};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// 适配器解析键模板
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterKey {
    /// 属性读取
    Getter {
        interface: &'static str,
        property: &'static str,
    },
    /// 属性写入
    Setter {
        interface: &'static str,
        property: &'static str,
    },
    /// 其他方法
    Method {
        interface: &'static str,
        method: &'static str,
    },
}

impl AdapterKey {
    /// 属性读取键
    pub const fn getter(interface: &'static str, property: &'static str) -> Self {
        Self::Getter {
            interface,
            property,
        }
    }

    /// 属性写入键
    pub const fn setter(interface: &'static str, property: &'static str) -> Self {
        Self::Setter {
            interface,
            property,
        }
    }

    /// 方法键
    pub const fn method(interface: &'static str, method: &'static str) -> Self {
        Self::Method { interface, method }
    }

    /// 所属接口名
    pub fn interface(&self) -> &'static str {
        match self {
            Self::Getter { interface, .. }
            | Self::Setter { interface, .. }
            | Self::Method { interface, .. } => interface,
        }
    }

    /// 生成解析键
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AdapterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Getter {
                interface,
                property,
            } => write!(f, "{}:{}.get", interface, property),
            Self::Setter {
                interface,
                property,
            } => write!(f, "{}:{}.set", interface, property),
            Self::Method { interface, method } => write!(f, "{}:{}", interface, method),
        }
    }
}

/// `MovingObject` 接口的键表
pub mod moving {
    use super::AdapterKey;

    /// 接口名
    pub const INTERFACE: &str = "MovingObject";
    /// 读取位置
    pub const LOCATION_GET: AdapterKey = AdapterKey::getter(INTERFACE, "location");
    /// 写入位置
    pub const LOCATION_SET: AdapterKey = AdapterKey::setter(INTERFACE, "location");
    /// 读取速度向量
    pub const VELOCITY_GET: AdapterKey = AdapterKey::getter(INTERFACE, "velocity");
}

/// `RotatableObject` 接口的键表
pub mod rotatable {
    use super::AdapterKey;

    /// 接口名
    pub const INTERFACE: &str = "RotatableObject";
    /// 读取角度
    pub const ANGLE_GET: AdapterKey = AdapterKey::getter(INTERFACE, "angle");
    /// 写入角度
    pub const ANGLE_SET: AdapterKey = AdapterKey::setter(INTERFACE, "angle");
}

/// 属性包中使用的属性名
pub mod properties {
    /// 位置，[`Point`](crate::geometry::Point)
    pub const LOCATION: &str = "location";
    /// 速度大小
    pub const VELOCITY: &str = "velocity";
    /// 速度向量，[`Vector`](crate::geometry::Vector)
    pub const VELOCITY_VECTOR: &str = "velocity_vector";
    /// 角度，[`Angle`](crate::geometry::Angle)
    pub const ANGLE: &str = "angle";
    /// 燃料，`i64`
    pub const FUEL: &str = "fuel";
    /// 每次移动的燃料消耗，`i64`
    pub const FUEL_BURN_RATE: &str = "fuel_burn_rate";
}

/// 可移动对象
pub trait MovingObject: Send + Sync {
    fn location(&self) -> CommandResult<Point>;
    fn velocity(&self) -> CommandResult<Vector>;
    fn set_location(&self, location: Point) -> CommandResult<()>;
}

/// 可旋转对象
pub trait RotatableObject: Send + Sync {
    fn angle(&self) -> CommandResult<Angle>;
    fn set_angle(&self, angle: Angle) -> CommandResult<()>;
}

/// 经由解析器访问目标对象的适配器核心
#[derive(Clone)]
struct Delegate {
    resolver: Arc<dyn DependencyResolver>,
    target: Arc<UObject>,
}

impl Delegate {
    fn target_args(&self) -> Args {
        Args::new().with_dependency(Dependency::from_arc(self.target.clone()))
    }

    fn get<T: Any + Send + Sync + Copy>(&self, key: AdapterKey) -> CommandResult<T> {
        let value = self
            .resolver
            .resolve_as::<T>(&key.render(), self.target_args())?;
        Ok(*value)
    }

    fn set<T: Any + Send + Sync>(&self, key: AdapterKey, value: T) -> CommandResult<()> {
        let command = self
            .resolver
            .resolve_command(&key.render(), self.target_args().arg(value))?;
        command.execute()
    }
}

/// `MovingObject` 适配器
#[derive(Clone)]
pub struct MovingObjectAdapter {
    delegate: Delegate,
}

impl MovingObjectAdapter {
    /// 通过 `resolver` 访问 `target`
    pub fn new(resolver: Arc<dyn DependencyResolver>, target: Arc<UObject>) -> Self {
        Self {
            delegate: Delegate { resolver, target },
        }
    }

    /// 被适配的对象
    pub fn target(&self) -> &Arc<UObject> {
        &self.delegate.target
    }
}

impl MovingObject for MovingObjectAdapter {
    fn location(&self) -> CommandResult<Point> {
        self.delegate.get(moving::LOCATION_GET)
    }

    fn velocity(&self) -> CommandResult<Vector> {
        self.delegate.get(moving::VELOCITY_GET)
    }

    fn set_location(&self, location: Point) -> CommandResult<()> {
        self.delegate.set(moving::LOCATION_SET, location)
    }
}

/// `RotatableObject` 适配器
#[derive(Clone)]
pub struct RotatableObjectAdapter {
    delegate: Delegate,
}

impl RotatableObjectAdapter {
    /// 通过 `resolver` 访问 `target`
    pub fn new(resolver: Arc<dyn DependencyResolver>, target: Arc<UObject>) -> Self {
        Self {
            delegate: Delegate { resolver, target },
        }
    }

    /// 被适配的对象
    pub fn target(&self) -> &Arc<UObject> {
        &self.delegate.target
    }
}

impl RotatableObject for RotatableObjectAdapter {
    fn angle(&self) -> CommandResult<Angle> {
        self.delegate.get(rotatable::ANGLE_GET)
    }

    fn set_angle(&self, angle: Angle) -> CommandResult<()> {
        self.delegate.set(rotatable::ANGLE_SET, angle)
    }
}

/// 写入一个属性的命令
pub struct SetPropertyCommand {
    target: Arc<UObject>,
    property: &'static str,
    value: Dependency,
}

impl SetPropertyCommand {
    /// 执行时把 `value` 写入 `target` 的 `property`
    pub fn new(target: Arc<UObject>, property: &'static str, value: Dependency) -> Self {
        Self {
            target,
            property,
            value,
        }
    }
}

impl Command for SetPropertyCommand {
    fn execute(&self) -> Result<(), CommandError> {
        self.target.set_dependency(self.property, self.value.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "SetPropertyCommand"
    }
}

fn target_of(key: &str, args: &Args) -> DependencyResult<Arc<UObject>> {
    args.require::<UObject>(key, 0)
}

fn read_property<T: Any + Clone>(key: &str, target: &UObject, property: &str) -> DependencyResult<T> {
    target
        .require::<T>(property)
        .map_err(|error| DependencyError::factory_failed(key, error))
}

/// 读取属性的策略
fn property_getter<T>(key: AdapterKey, property: &'static str) -> Registration
where
    T: Any + Send + Sync + Clone,
{
    let key = key.render();
    Registration::factory(move |args: &Args| {
        let target = target_of(&key, args)?;
        read_property::<T>(&key, &target, property)
    })
}

/// 写入属性的策略，参数 1 必须是 `T`
fn property_setter<T>(key: AdapterKey, property: &'static str) -> Registration
where
    T: Any + Send + Sync,
{
    let key = key.render();
    Registration::factory(move |args: &Args| {
        let target = target_of(&key, args)?;
        args.require::<T>(&key, 1)?;
        let value = args
            .dependency(1)
            .cloned()
            .ok_or_else(|| DependencyError::invalid_arguments(key.as_str(), "缺少属性值"))?;
        let command: CommandRef = Arc::new(SetPropertyCommand::new(target, property, value));
        Ok(command)
    })
}

/// 在全局表中注册基于属性包的默认策略
///
/// 速度由 `velocity`（大小）与 `angle` 推导。
pub fn register_default_strategies(registry: &dyn DependencyRegistry) {
    registry.register_global(
        &moving::LOCATION_GET.render(),
        property_getter::<Point>(moving::LOCATION_GET, properties::LOCATION),
    );
    registry.register_global(
        &moving::LOCATION_SET.render(),
        property_setter::<Point>(moving::LOCATION_SET, properties::LOCATION),
    );

    let velocity_key = moving::VELOCITY_GET.render();
    let key = velocity_key.clone();
    registry.register_global(
        &key,
        Registration::factory(move |args: &Args| {
            let target = target_of(&velocity_key, args)?;
            let magnitude = read_property::<i64>(&velocity_key, &target, properties::VELOCITY)?;
            let angle = read_property::<Angle>(&velocity_key, &target, properties::ANGLE)?;
            Ok(Vector::from_polar(magnitude, angle))
        }),
    );

    registry.register_global(
        &rotatable::ANGLE_GET.render(),
        property_getter::<Angle>(rotatable::ANGLE_GET, properties::ANGLE),
    );
    registry.register_global(
        &rotatable::ANGLE_SET.render(),
        property_setter::<Angle>(rotatable::ANGLE_SET, properties::ANGLE),
    );

    debug!("已注册默认适配器策略");
}

/// 领域错误中的缺失属性，便于调用方区分
pub fn missing_property(error: &CommandError) -> Option<&DomainError> {
    let CommandError::Dependency {
        source: DependencyError::FactoryFailed { source, .. },
    } = error
    else {
        return None;
    };

    source
        .downcast_ref::<DomainError>()
        .filter(|error| matches!(error, DomainError::MissingProperty { .. }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_rendering() {
        assert_eq!(moving::LOCATION_GET.render(), "MovingObject:location.get");
        assert_eq!(moving::LOCATION_SET.render(), "MovingObject:location.set");
        assert_eq!(rotatable::ANGLE_GET.render(), "RotatableObject:angle.get");
        assert_eq!(
            AdapterKey::method("MovingObject", "finish").render(),
            "MovingObject:finish"
        );
        assert_eq!(moving::VELOCITY_GET.interface(), moving::INTERFACE);
    }
}
