//! 平面几何：坐标、速度向量与角度

use std::fmt;
use std::ops::{Add, Sub};

/// 整数坐标点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    /// 横坐标
    pub x: i64,
    /// 纵坐标
    pub y: i64,
}

impl Point {
    /// 创建点
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl Add<Vector> for Point {
    type Output = Point;

    fn add(self, velocity: Vector) -> Point {
        Point::new(self.x + velocity.x, self.y + velocity.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// 整数速度向量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Vector {
    /// 横向分量
    pub x: i64,
    /// 纵向分量
    pub y: i64,
}

impl Vector {
    /// 创建向量
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// 由速度大小与方向得到向量，分量向零截断
    pub fn from_polar(magnitude: i64, angle: Angle) -> Self {
        let radians = angle.radians();
        let magnitude = magnitude as f64;
        Self::new(
            (magnitude * radians.cos()).trunc() as i64,
            (magnitude * radians.sin()).trunc() as i64,
        )
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, other: Vector) -> Vector {
        Vector::new(self.x + other.x, self.y + other.y)
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}>", self.x, self.y)
    }
}

/// 以整数度表示的角度
///
/// 加减不做归一化，需要时调用 [`Angle::normalized`]。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Angle {
    /// 角度制数值
    pub degrees: i64,
}

impl Angle {
    /// 以角度制创建
    pub const fn new(degrees: i64) -> Self {
        Self { degrees }
    }

    /// 弧度值
    pub fn radians(self) -> f64 {
        (self.degrees as f64).to_radians()
    }

    /// 归一化到 `[0, 360)`
    pub fn normalized(self) -> Self {
        Self::new(self.degrees.rem_euclid(360))
    }
}

impl From<i64> for Angle {
    fn from(degrees: i64) -> Self {
        Self::new(degrees)
    }
}

impl Add for Angle {
    type Output = Angle;

    fn add(self, other: Angle) -> Angle {
        Angle::new(self.degrees + other.degrees)
    }
}

impl Sub for Angle {
    type Output = Angle;

    fn sub(self, other: Angle) -> Angle {
        Angle::new(self.degrees - other.degrees)
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees)
    }
}
