// src/voronoi/lloyd.rs
//! Релаксация Ллойда
//!
//! На каждой итерации каждый сайт заменяется центроидом своей ячейки, после
//! чего диаграмма строится заново. Чем больше итераций, тем равномернее по
//! форме и размеру получаются ячейки.

use rand::Rng;

use super::{Diagram, tessellate};
use crate::error::Result;
use crate::geometry::{BoundingBox, Point};

/// Строит диаграмму и применяет `relaxations` итераций Ллойда.
///
/// При `relaxations == 0` возвращается исходная диаграмма.
pub fn relax(sites: &[Point], bbox: BoundingBox, relaxations: usize) -> Result<Diagram> {
    let mut diagram = tessellate(sites, bbox)?;

    for iteration in 0..relaxations {
        let centroids = diagram
            .cells
            .iter()
            .map(|cell| cell.polygon.centroid())
            .collect::<Result<Vec<Point>>>()?;
        tracing::trace!(iteration, "lloyd relaxation step");
        diagram = tessellate(&centroids, bbox)?;
    }

    Ok(diagram)
}

/// Случайные сайты, равномерно распределённые внутри прямоугольника
pub fn random_sites<R: Rng + ?Sized>(count: usize, bbox: BoundingBox, rng: &mut R) -> Vec<Point> {
    (0..count)
        .map(|_| {
            Point::new(
                rng.gen_range(bbox.x_min..bbox.x_max),
                rng.gen_range(bbox.y_min..bbox.y_max),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn zero_relaxations_is_plain_tessellation() {
        let bbox = BoundingBox::new(200.0, 100.0);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let sites = random_sites(10, bbox, &mut rng);
        assert_eq!(relax(&sites, bbox, 0).unwrap(), tessellate(&sites, bbox).unwrap());
    }

    #[test]
    fn relaxation_moves_sites_to_centroids() {
        let bbox = BoundingBox::new(100.0, 100.0);
        let sites = [Point::new(10.0, 50.0), Point::new(20.0, 50.0)];
        let relaxed = relax(&sites, bbox, 1).unwrap();
        // Исходные ячейки: [0,15]×[0,100] и [15,100]×[0,100]
        let moved = relaxed.sites();
        assert_eq!(moved.len(), 2);
        assert!((moved[0].x - 7.5).abs() < 1e-9);
        assert!((moved[1].x - 57.5).abs() < 1e-9);
        assert!((moved[0].y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn relaxation_evens_out_cell_areas() {
        let bbox = BoundingBox::new(300.0, 300.0);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let sites = random_sites(12, bbox, &mut rng);

        let spread = |d: &Diagram| {
            let areas: Vec<f64> = d.cells.iter().map(|c| c.polygon.area()).collect();
            let max = areas.iter().copied().fold(f64::MIN, f64::max);
            let min = areas.iter().copied().fold(f64::MAX, f64::min);
            max / min
        };

        let raw = relax(&sites, bbox, 0).unwrap();
        let relaxed = relax(&sites, bbox, 5).unwrap();
        assert!(spread(&relaxed) < spread(&raw));
    }

    #[test]
    fn random_sites_stay_inside_bbox() {
        let bbox = BoundingBox::new(50.0, 20.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(random_sites(100, bbox, &mut rng).iter().all(|p| bbox.contains(*p)));
    }
}
