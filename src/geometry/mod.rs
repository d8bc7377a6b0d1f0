// src/geometry/mod.rs
//! Геометрические примитивы
//!
//! Точки, прямоугольники и многоугольники, на которых строится всё остальное:
//! гексагональная сетка, диаграмма Вороного и границы стран.
//!
//! Система координат: `x` растёт вправо, `y` растёт вниз (экранные координаты).
//! Формулы площади и центроида от этого не зависят — знак площади лишь
//! отражает порядок обхода вершин.

pub mod polygon;

pub use polygon::Polygon;

use serde::{Deserialize, Serialize};

/// Допуск для сравнения вещественных координат
pub const EPSILON: f64 = 1e-9;

/// Точка на плоскости
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Векторное (псевдоскалярное) произведение `self × other`
    #[must_use]
    pub fn cross(self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    #[must_use]
    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    #[must_use]
    pub fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    #[must_use]
    pub fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    #[must_use]
    pub fn scale(self, k: f64) -> Point {
        Point::new(self.x * k, self.y * k)
    }

    #[must_use]
    pub fn lerp(self, other: Point, t: f64) -> Point {
        self.add(other.sub(self).scale(t))
    }
}

/// Ограничивающий прямоугольник `[x_min, x_max] × [y_min, y_max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl BoundingBox {
    /// Прямоугольник `[0, width] × [0, height]`
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            x_min: 0.0,
            y_min: 0.0,
            x_max: width,
            y_max: height,
        }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Проверка с учётом границы
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x_min && p.x <= self.x_max && p.y >= self.y_min && p.y <= self.y_max
    }

    /// Пересекаются ли внутренности двух прямоугольников
    #[must_use]
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.x_min < other.x_max
            && other.x_min < self.x_max
            && self.y_min < other.y_max
            && other.y_min < self.y_max
    }

    #[must_use]
    pub fn to_polygon(&self) -> Polygon {
        Polygon::new(vec![
            Point::new(self.x_min, self.y_min),
            Point::new(self.x_max, self.y_min),
            Point::new(self.x_max, self.y_max),
            Point::new(self.x_min, self.y_max),
        ])
    }
}
