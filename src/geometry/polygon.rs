// src/geometry/polygon.rs
//! Многоугольники
//!
//! Многоугольник хранит упорядоченную последовательность вершин и считается
//! замкнутым (последняя вершина соединена с первой). Порядок вершин важен для
//! площади, центроида и смещения границы.
//!
//! ## Операции
//! - `contains_point` — принадлежность точки (граница считается внутренней)
//! - `centroid` — центр масс по формуле со знаковой площадью
//! - `offset` — параллельный сдвиг всех рёбер (отрицательное расстояние = внутрь)
//! - `merge` — внешняя граница объединения смежных плиток (гексагонов)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{BoundingBox, EPSILON, Point};
use crate::error::{Error, Result};

/// Масштаб привязки вершин к целочисленной сетке при слиянии.
///
/// Соседние гексагоны вычисляют общие вершины из разных центров, поэтому
/// координаты совпадают лишь с точностью до ошибки округления.
const SNAP_SCALE: f64 = 1e6;

type VertexKey = (i64, i64);

fn snap(p: Point) -> VertexKey {
    (
        (p.x * SNAP_SCALE).round() as i64,
        (p.y * SNAP_SCALE).round() as i64,
    )
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<Point>,
}

impl Polygon {
    #[must_use]
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Итератор по рёбрам `(p[i], p[i + 1])`, включая замыкающее ребро
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Знаковая площадь (формула шнурования). Знак задаётся порядком обхода.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        self.edges().map(|(a, b)| a.cross(b)).sum::<f64>() / 2.0
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first = self.points.first()?;
        let init = BoundingBox {
            x_min: first.x,
            y_min: first.y,
            x_max: first.x,
            y_max: first.y,
        };
        Some(self.points.iter().fold(init, |b, p| BoundingBox {
            x_min: b.x_min.min(p.x),
            y_min: b.y_min.min(p.y),
            x_max: b.x_max.max(p.x),
            y_max: b.y_max.max(p.y),
        }))
    }

    /// Проверяет, лежит ли точка внутри многоугольника.
    ///
    /// Точки на границе считаются внутренними: иначе центр гексагона, попавший
    /// ровно на ребро ячейки Вороного, не достался бы ни одной стране.
    ///
    /// # Примеры
    /// ```
    /// use hexconquest::geometry::{Point, Polygon};
    /// let square = Polygon::new(vec![
    ///     Point::new(-1.0, -1.0),
    ///     Point::new(-1.0, 1.0),
    ///     Point::new(1.0, 1.0),
    ///     Point::new(1.0, -1.0),
    /// ]);
    /// assert!(square.contains_point(Point::new(0.0, 0.0)));
    /// assert!(square.contains_point(Point::new(1.0, 0.0)));
    /// assert!(!square.contains_point(Point::new(2.0, 2.0)));
    /// ```
    #[must_use]
    pub fn contains_point(&self, p: Point) -> bool {
        if self.edges().any(|(a, b)| on_segment(p, a, b)) {
            return true;
        }

        // Луч вправо от точки: нечётное число пересечений = внутри
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > p.y) != (b.y > p.y) {
                let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Центроид многоугольника (центр масс однородной пластины).
    ///
    /// # Ошибки
    /// `Error::DegenerateGeometry` для многоугольника без площади.
    pub fn centroid(&self) -> Result<Point> {
        if self.points.len() < 3 {
            return Err(Error::DegenerateGeometry("centroid of fewer than 3 points"));
        }
        let area = self.signed_area();
        if area.abs() < EPSILON {
            return Err(Error::DegenerateGeometry("centroid of zero-area polygon"));
        }

        let (cx, cy) = self.edges().fold((0.0, 0.0), |(cx, cy), (a, b)| {
            let k = a.cross(b);
            (cx + (a.x + b.x) * k, cy + (a.y + b.y) * k)
        });
        Ok(Point::new(cx / (6.0 * area), cy / (6.0 * area)))
    }

    /// Сдвигает каждое ребро вдоль внешней нормали на `distance`.
    ///
    /// Отрицательное расстояние сжимает многоугольник — так между соседними
    /// странами появляется видимый зазор. Число вершин сохраняется; новая
    /// вершина — пересечение двух соседних сдвинутых рёбер.
    #[must_use]
    pub fn offset(&self, distance: f64) -> Polygon {
        let n = self.points.len();
        if n < 3 {
            return self.clone();
        }

        let orientation = self.signed_area().signum();

        // Для каждого ребра i: сдвинутая опорная точка и направление
        let lines: Vec<(Point, Point, Point)> = self
            .edges()
            .map(|(a, b)| {
                let d = b.sub(a);
                let len = d.x.hypot(d.y);
                let normal = if len < EPSILON {
                    Point::default()
                } else {
                    Point::new(d.y / len, -d.x / len).scale(orientation)
                };
                (a.add(normal.scale(distance)), d, normal)
            })
            .collect();

        let points = (0..n)
            .map(|i| {
                let (p1, d1, _) = lines[(i + n - 1) % n];
                let (p2, d2, normal) = lines[i];
                let denom = d1.cross(d2);
                if denom.abs() < EPSILON {
                    // Соседние рёбра параллельны: просто сдвигаем вершину
                    self.points[i].add(normal.scale(distance))
                } else {
                    let t = p2.sub(p1).cross(d2) / denom;
                    p1.add(d1.scale(t))
                }
            })
            .collect();

        Polygon::new(points)
    }

    /// Внешняя граница объединения многоугольников, покрывающих связную область
    /// без перекрытий (например, соседних гексагонов).
    ///
    /// Общие рёбра соседних плиток встречаются дважды с противоположным
    /// направлением и взаимно уничтожаются; оставшиеся рёбра сцепляются в
    /// контуры. Возвращается контур наибольшей площади с положительной
    /// ориентацией.
    ///
    /// # Ошибки
    /// `Error::DegenerateGeometry`, если список пуст или контур не найден.
    pub fn merge(polygons: &[Polygon]) -> Result<Polygon> {
        if polygons.is_empty() {
            return Err(Error::DegenerateGeometry("merge of zero polygons"));
        }

        let mut directed: BTreeMap<(VertexKey, VertexKey), ()> = BTreeMap::new();
        let mut positions: BTreeMap<VertexKey, Point> = BTreeMap::new();

        for polygon in polygons {
            let oriented = polygon.oriented_positive();
            for (a, b) in oriented.edges() {
                let (ka, kb) = (snap(a), snap(b));
                if ka == kb {
                    continue;
                }
                positions.entry(ka).or_insert(a);
                positions.entry(kb).or_insert(b);
                if directed.remove(&(kb, ka)).is_none() {
                    directed.insert((ka, kb), ());
                }
            }
        }

        let mut outgoing: BTreeMap<VertexKey, Vec<VertexKey>> = BTreeMap::new();
        for &(a, b) in directed.keys() {
            outgoing.entry(a).or_default().push(b);
        }

        let mut best: Option<Polygon> = None;
        let limit = directed.len();

        while let Some(start) = outgoing
            .iter()
            .find(|(_, targets)| !targets.is_empty())
            .map(|(&k, _)| k)
        {
            let mut ring = Vec::new();
            let mut current = start;
            let mut closed = false;

            for _ in 0..=limit {
                let Some(next) = outgoing.get_mut(&current).and_then(Vec::pop) else {
                    break;
                };
                ring.push(positions[&current]);
                current = next;
                if current == start {
                    closed = true;
                    break;
                }
            }

            if closed && ring.len() >= 3 {
                let candidate = Polygon::new(ring).without_collinear();
                if best.as_ref().is_none_or(|b| candidate.area() > b.area()) {
                    best = Some(candidate);
                }
            }
        }

        best.ok_or(Error::DegenerateGeometry("merge produced no closed boundary"))
    }

    /// Копия с положительной знаковой площадью
    #[must_use]
    pub fn oriented_positive(&self) -> Polygon {
        if self.signed_area() < 0.0 {
            Polygon::new(self.points.iter().rev().copied().collect())
        } else {
            self.clone()
        }
    }

    /// Удаляет вершины, лежащие на прямой между соседями
    fn without_collinear(self) -> Polygon {
        let n = self.points.len();
        if n <= 3 {
            return self;
        }
        let points: Vec<Point> = (0..n)
            .filter(|&i| {
                let prev = self.points[(i + n - 1) % n];
                let cur = self.points[i];
                let next = self.points[(i + 1) % n];
                cur.sub(prev).cross(next.sub(cur)).abs() > EPSILON
            })
            .map(|i| self.points[i])
            .collect();
        if points.len() < 3 { self } else { Polygon::new(points) }
    }
}

/// Лежит ли точка `p` на отрезке `[a, b]` (с допуском)
fn on_segment(p: Point, a: Point, b: Point) -> bool {
    let ab = b.sub(a);
    let ap = p.sub(a);
    let len2 = ab.dot(ab);
    let tolerance = EPSILON * len2.sqrt().max(1.0);
    if ab.cross(ap).abs() > tolerance {
        return false;
    }
    let t = ab.dot(ap);
    t >= -tolerance && t <= len2 + tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn square() -> Polygon {
        Polygon::new(vec![p(-1.0, -1.0), p(-1.0, 1.0), p(1.0, 1.0), p(1.0, -1.0)])
    }

    fn unit_square_at(x: f64, y: f64) -> Polygon {
        Polygon::new(vec![
            p(x, y),
            p(x + 1.0, y),
            p(x + 1.0, y + 1.0),
            p(x, y + 1.0),
        ])
    }

    #[test]
    fn contains_point_inside_and_outside() {
        let polygon = square();
        assert!(polygon.contains_point(p(0.0, 0.0)));
        assert!(!polygon.contains_point(p(2.0, 2.0)));
    }

    #[test]
    fn boundary_points_are_inside() {
        let polygon = square();
        assert!(polygon.contains_point(p(-1.0, 0.0)));
        assert!(polygon.contains_point(p(1.0, 1.0)));
        assert!(polygon.contains_point(p(0.5, -1.0)));
    }

    #[test]
    fn centroid_of_square_is_origin() {
        let c = square().centroid().unwrap();
        assert!(c.x.abs() < 1e-12 && c.y.abs() < 1e-12);
    }

    #[test]
    fn centroid_does_not_depend_on_winding() {
        let triangle = Polygon::new(vec![p(0.0, 0.0), p(3.0, 0.0), p(0.0, 3.0)]);
        let reversed = Polygon::new(triangle.points.iter().rev().copied().collect());
        let a = triangle.centroid().unwrap();
        let b = reversed.centroid().unwrap();
        assert!((a.x - 1.0).abs() < 1e-12 && (a.y - 1.0).abs() < 1e-12);
        assert!((a.x - b.x).abs() < 1e-12 && (a.y - b.y).abs() < 1e-12);
    }

    #[test]
    fn centroid_of_degenerate_polygon_fails() {
        let line = Polygon::new(vec![p(0.0, 0.0), p(1.0, 1.0), p(2.0, 2.0)]);
        assert!(matches!(line.centroid(), Err(Error::DegenerateGeometry(_))));
        assert!(Polygon::default().centroid().is_err());
    }

    #[test]
    fn inward_offset_shrinks_square() {
        for polygon in [square(), square().oriented_positive()] {
            let inner = polygon.offset(-0.25);
            assert_eq!(inner.len(), 4);
            assert!((inner.area() - 2.25).abs() < 1e-9);
            assert!(inner.contains_point(p(0.0, 0.0)));
            assert!(!inner.contains_point(p(0.9, 0.9)));
        }
    }

    #[test]
    fn outward_offset_grows_square() {
        let outer = square().offset(1.0);
        assert!((outer.area() - 16.0).abs() < 1e-9);
    }

    #[test]
    fn merge_two_adjacent_squares() {
        let merged = Polygon::merge(&[unit_square_at(0.0, 0.0), unit_square_at(1.0, 0.0)]).unwrap();
        assert_eq!(merged.len(), 4);
        assert!((merged.area() - 2.0).abs() < 1e-9);
        assert!(merged.signed_area() > 0.0);
    }

    #[test]
    fn merge_l_shape_keeps_reflex_corner() {
        let merged = Polygon::merge(&[
            unit_square_at(0.0, 0.0),
            unit_square_at(1.0, 0.0),
            unit_square_at(0.0, 1.0),
        ])
        .unwrap();
        assert_eq!(merged.len(), 6);
        assert!((merged.area() - 3.0).abs() < 1e-9);
        assert!(merged.contains_point(p(0.5, 1.5)));
        assert!(!merged.contains_point(p(1.5, 1.5)));
    }

    #[test]
    fn merge_single_polygon_is_identity_up_to_rotation() {
        let merged = Polygon::merge(&[square()]).unwrap();
        assert!((merged.area() - 4.0).abs() < 1e-9);
        assert_eq!(merged.len(), 4);
    }

    #[test]
    fn merge_of_nothing_is_an_error() {
        assert!(matches!(Polygon::merge(&[]), Err(Error::DegenerateGeometry(_))));
    }
}
