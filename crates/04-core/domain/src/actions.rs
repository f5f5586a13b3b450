//! 移动、旋转与燃料命令

use crate::adapters::{properties, MovingObject, RotatableObject};
use crate::errors::DomainError;
use crate::geometry::{Angle, Vector};
use crate::uobject::UObject;
use command_handling::MacroCommand;
use di_abstractions::{Command, CommandRef};
use infrastructure_common::CommandError;
use std::sync::Arc;
use tracing::debug;

/// 按速度移动一步
pub struct MoveCommand {
    moving: Arc<dyn MovingObject>,
}

impl MoveCommand {
    /// 以移动适配器创建
    pub fn new(moving: Arc<dyn MovingObject>) -> Self {
        Self { moving }
    }
}

impl Command for MoveCommand {
    fn execute(&self) -> Result<(), CommandError> {
        let location = self.moving.location()?;
        let velocity = self.moving.velocity()?;
        let next = location + velocity;

        debug!(from = %location, to = %next, "移动");
        self.moving.set_location(next)
    }

    fn name(&self) -> &str {
        "MoveCommand"
    }
}

/// 旋转指定角度
pub struct RotateCommand {
    rotatable: Arc<dyn RotatableObject>,
    delta: Angle,
}

impl RotateCommand {
    /// 以旋转适配器和旋转量创建
    pub fn new(rotatable: Arc<dyn RotatableObject>, delta: Angle) -> Self {
        Self { rotatable, delta }
    }
}

impl Command for RotateCommand {
    fn execute(&self) -> Result<(), CommandError> {
        let angle = self.rotatable.angle()?;
        let next = angle + self.delta;

        debug!(from = %angle, to = %next, "旋转");
        self.rotatable.set_angle(next)
    }

    fn name(&self) -> &str {
        "RotateCommand"
    }
}

fn read_i64(command: &str, target: &UObject, property: &str) -> Result<i64, CommandError> {
    target
        .require::<i64>(property)
        .map_err(|error| CommandError::failed(command, error))
}

/// 检查燃料是否足够消耗一次
pub struct CheckFuelCommand {
    target: Arc<UObject>,
}

impl CheckFuelCommand {
    /// 检查目标对象的燃料
    pub fn new(target: Arc<UObject>) -> Self {
        Self { target }
    }
}

impl Command for CheckFuelCommand {
    fn execute(&self) -> Result<(), CommandError> {
        let fuel = read_i64(self.name(), &self.target, properties::FUEL)?;
        let rate = read_i64(self.name(), &self.target, properties::FUEL_BURN_RATE)?;

        if fuel < rate {
            return Err(CommandError::failed(
                self.name(),
                DomainError::NotEnoughFuel {
                    required: rate,
                    available: fuel,
                },
            ));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "CheckFuelCommand"
    }
}

/// 消耗一次燃料，燃料不会低于零
pub struct BurnFuelCommand {
    target: Arc<UObject>,
}

impl BurnFuelCommand {
    /// 消耗目标对象的燃料
    pub fn new(target: Arc<UObject>) -> Self {
        Self { target }
    }
}

impl Command for BurnFuelCommand {
    fn execute(&self) -> Result<(), CommandError> {
        let fuel = read_i64(self.name(), &self.target, properties::FUEL)?;
        let rate = read_i64(self.name(), &self.target, properties::FUEL_BURN_RATE)?;

        self.target
            .set_property(properties::FUEL, (fuel - rate).max(0));
        Ok(())
    }

    fn name(&self) -> &str {
        "BurnFuelCommand"
    }
}

/// 按当前速度大小与角度重算速度向量
pub struct ChangeVelocityCommand {
    target: Arc<UObject>,
}

impl ChangeVelocityCommand {
    /// 重算目标对象的速度向量
    pub fn new(target: Arc<UObject>) -> Self {
        Self { target }
    }
}

impl Command for ChangeVelocityCommand {
    fn execute(&self) -> Result<(), CommandError> {
        // 静止的对象没有速度可改
        let Some(magnitude) = self.target.get::<i64>(properties::VELOCITY) else {
            return Ok(());
        };
        let angle = self
            .target
            .require::<Angle>(properties::ANGLE)
            .map_err(|error| CommandError::failed(self.name(), error))?;

        self.target.set_property(
            properties::VELOCITY_VECTOR,
            Vector::from_polar(magnitude, angle),
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "ChangeVelocityCommand"
    }
}

/// 检查燃料、移动、消耗燃料
pub fn move_with_fuel(target: Arc<UObject>, moving: Arc<dyn MovingObject>) -> MacroCommand {
    let commands: Vec<CommandRef> = vec![
        Arc::new(CheckFuelCommand::new(target.clone())),
        Arc::new(MoveCommand::new(moving)),
        Arc::new(BurnFuelCommand::new(target)),
    ];
    MacroCommand::named("MoveWithFuelCommand", commands)
}

/// 旋转并重算速度向量
pub fn rotate_with_velocity(
    target: Arc<UObject>,
    rotatable: Arc<dyn RotatableObject>,
    delta: Angle,
) -> MacroCommand {
    let commands: Vec<CommandRef> = vec![
        Arc::new(RotateCommand::new(rotatable, delta)),
        Arc::new(ChangeVelocityCommand::new(target)),
    ];
    MacroCommand::named("RotateWithVelocityCommand", commands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use mockall::mock;
    use mockall::predicate::eq;

    mock! {
        pub Moving {}

        impl MovingObject for Moving {
            fn location(&self) -> Result<Point, CommandError>;
            fn velocity(&self) -> Result<Vector, CommandError>;
            fn set_location(&self, location: Point) -> Result<(), CommandError>;
        }
    }

    mock! {
        pub Rotatable {}

        impl RotatableObject for Rotatable {
            fn angle(&self) -> Result<Angle, CommandError>;
            fn set_angle(&self, angle: Angle) -> Result<(), CommandError>;
        }
    }

    fn fueled(fuel: i64, rate: i64) -> Arc<UObject> {
        let target = Arc::new(UObject::new());
        target.set_property(properties::FUEL, fuel);
        target.set_property(properties::FUEL_BURN_RATE, rate);
        target
    }

    #[test]
    fn test_move_adds_velocity_to_location() {
        let mut moving = MockMoving::new();
        moving
            .expect_location()
            .returning(|| Ok(Point::new(12, 5)));
        moving
            .expect_velocity()
            .returning(|| Ok(Vector::new(-7, 3)));
        moving
            .expect_set_location()
            .with(eq(Point::new(5, 8)))
            .times(1)
            .returning(|_| Ok(()));

        assert!(MoveCommand::new(Arc::new(moving)).execute().is_ok());
    }

    #[test]
    fn test_move_without_location_fails() {
        let mut moving = MockMoving::new();
        moving
            .expect_location()
            .returning(|| Err(CommandError::failed("location", "no location")));
        moving.expect_set_location().never();

        assert!(MoveCommand::new(Arc::new(moving)).execute().is_err());
    }

    #[test]
    fn test_rotate_adds_delta() {
        let mut rotatable = MockRotatable::new();
        rotatable.expect_angle().returning(|| Ok(Angle::new(45)));
        rotatable
            .expect_set_angle()
            .with(eq(Angle::new(60)))
            .times(1)
            .returning(|_| Ok(()));

        let command = RotateCommand::new(Arc::new(rotatable), Angle::new(15));
        assert!(command.execute().is_ok());
    }

    #[test]
    fn test_check_fuel() {
        assert!(CheckFuelCommand::new(fueled(10, 2)).execute().is_ok());

        let error = CheckFuelCommand::new(fueled(1, 5)).execute().unwrap_err();
        assert!(matches!(
            error,
            CommandError::ExecutionFailed { ref command, .. } if command == "CheckFuelCommand"
        ));
    }

    #[test]
    fn test_check_fuel_without_fuel_property() {
        let target = Arc::new(UObject::new());
        assert!(CheckFuelCommand::new(target).execute().is_err());
    }

    #[test]
    fn test_burn_fuel() {
        let target = fueled(10, 3);
        BurnFuelCommand::new(target.clone()).execute().unwrap();
        assert_eq!(target.get::<i64>(properties::FUEL), Some(7));
    }

    #[test]
    fn test_burn_fuel_never_goes_negative() {
        let target = fueled(2, 5);
        BurnFuelCommand::new(target.clone()).execute().unwrap();
        assert_eq!(target.get::<i64>(properties::FUEL), Some(0));
    }

    #[test]
    fn test_change_velocity() {
        let target = Arc::new(UObject::new());
        target.set_property(properties::VELOCITY, 10_i64);
        target.set_property(properties::ANGLE, Angle::new(90));

        ChangeVelocityCommand::new(target.clone()).execute().unwrap();
        let vector = target.get::<Vector>(properties::VELOCITY_VECTOR).unwrap();
        assert_eq!(vector.x, 0);
        assert!((9..=10).contains(&vector.y));
    }

    #[test]
    fn test_change_velocity_of_static_object() {
        let target = Arc::new(UObject::new());
        ChangeVelocityCommand::new(target.clone()).execute().unwrap();
        assert!(!target.has_property(properties::VELOCITY_VECTOR));
    }

    #[test]
    fn test_move_with_fuel_stops_when_tank_is_empty() {
        let target = fueled(1, 2);
        let mut moving = MockMoving::new();
        moving.expect_location().never();
        moving.expect_set_location().never();

        let command = move_with_fuel(target.clone(), Arc::new(moving));
        assert!(command.execute().is_err());
        assert_eq!(target.get::<i64>(properties::FUEL), Some(1));
    }
}
