// src/hexgrid.rs
//! Гексагональная сетка
//!
//! Покрывает прямоугольник `[0, width] × [0, height]` правильными шестиугольниками
//! радиуса `R` с плоской верхней гранью:
//! - шаг по столбцам `1.5·R`,
//! - шаг по строкам `√3·R`,
//! - нечётные столбцы сдвинуты вниз на `√3·R / 2`.
//!
//! Сетка детерминирована: одна и та же тройка `(width, height, radius)` всегда
//! даёт одни и те же гексагоны. Итератор ленивый и перезапускаемый — каждый
//! вызов [`Hexgrid::hexagons`] начинает обход заново.

use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, Point, Polygon};

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Один гексагон сетки
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hexagon {
    pub col: i32,
    pub row: i32,
    pub center: Point,
    pub polygon: Polygon,
}

impl Hexagon {
    /// Правильный шестиугольник с плоской верхней гранью
    #[must_use]
    pub fn new(col: i32, row: i32, center: Point, radius: f64) -> Self {
        let points = (0..6_i32)
            .map(|i| {
                let angle = std::f64::consts::FRAC_PI_3 * f64::from(i);
                Point::new(
                    center.x + radius * angle.cos(),
                    center.y + radius * angle.sin(),
                )
            })
            .collect();
        Self {
            col,
            row,
            center,
            polygon: Polygon::new(points),
        }
    }

    /// Центроид правильного шестиугольника совпадает с его центром
    #[must_use]
    pub fn centroid(&self) -> Point {
        self.center
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hexgrid {
    pub width: f64,
    pub height: f64,
    pub radius: f64,
}

impl Hexgrid {
    #[must_use]
    pub fn new(width: f64, height: f64, radius: f64) -> Self {
        Self {
            width,
            height,
            radius,
        }
    }

    #[must_use]
    pub fn column_spacing(&self) -> f64 {
        1.5 * self.radius
    }

    #[must_use]
    pub fn row_spacing(&self) -> f64 {
        SQRT_3 * self.radius
    }

    /// Центр гексагона в координатах смещения `(col, row)`
    #[must_use]
    pub fn center(&self, col: i32, row: i32) -> Point {
        let shift = if col.rem_euclid(2) == 1 {
            self.row_spacing() / 2.0
        } else {
            0.0
        };
        Point::new(
            f64::from(col) * self.column_spacing(),
            f64::from(row) * self.row_spacing() + shift,
        )
    }

    /// Верхняя оценка числа гексагонов, которые выдаст [`Hexgrid::hexagons`]
    #[must_use]
    pub fn max_hexagons(&self) -> f64 {
        if self.radius <= 0.0 {
            return 0.0;
        }
        let cols = (self.width / self.column_spacing()).ceil() + 1.0;
        let rows = (self.height / self.row_spacing()).ceil() + 3.0;
        cols * rows
    }

    /// Ленивая последовательность всех гексагонов, задевающих прямоугольник
    #[must_use]
    pub fn hexagons(&self) -> Hexagons {
        let cols = if self.radius > 0.0 {
            (self.width / self.column_spacing()).ceil() as i32 + 1
        } else {
            0
        };
        let rows = if self.radius > 0.0 {
            (self.height / self.row_spacing()).ceil() as i32 + 1
        } else {
            0
        };
        Hexagons {
            grid: *self,
            col: 0,
            row: -1,
            cols,
            rows,
        }
    }

    fn covers(&self, center: Point) -> bool {
        let half_height = self.row_spacing() / 2.0;
        let bounds = BoundingBox {
            x_min: center.x - self.radius,
            y_min: center.y - half_height,
            x_max: center.x + self.radius,
            y_max: center.y + half_height,
        };
        bounds.overlaps(&BoundingBox::new(self.width, self.height))
    }
}

/// Итератор по гексагонам сетки (по столбцам, сверху вниз)
#[derive(Debug, Clone)]
pub struct Hexagons {
    grid: Hexgrid,
    col: i32,
    row: i32,
    cols: i32,
    rows: i32,
}

impl Iterator for Hexagons {
    type Item = Hexagon;

    fn next(&mut self) -> Option<Hexagon> {
        while self.col < self.cols {
            let (col, row) = (self.col, self.row);
            self.row += 1;
            if self.row > self.rows {
                self.row = -1;
                self.col += 1;
            }

            let center = self.grid.center(col, row);
            if self.grid.covers(center) {
                return Some(Hexagon::new(col, row, center, self.grid.radius));
            }
        }
        None
    }
}
