//! Shared Occupancy Grid
//!
//! Sparse spatial index of which connection currently owns which canvas
//! cell, used during path computation to keep wires from overlapping
//! visually. Derived state: rebuilt from the live connection list, never
//! serialized.

use std::collections::{HashMap, HashSet};

use crate::schema::Point;

/// Grid cell size in canvas pixels.
pub const CELL_SIZE: f64 = 20.0;

type Cell = (i64, i64);

#[derive(Debug, Default)]
pub struct OccupancyGrid {
    cells: HashMap<Cell, HashSet<String>>,
    by_connection: HashMap<String, Vec<Cell>>,
}

impl OccupancyGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.by_connection.clear();
    }

    fn cell_of(point: Point) -> Cell {
        (
            (point.x / CELL_SIZE).floor() as i64,
            (point.y / CELL_SIZE).floor() as i64,
        )
    }

    /// Cells touched by an orthogonal polyline, in walk order without
    /// repeats.
    fn cells_for_path(points: &[Point]) -> Vec<Cell> {
        let mut seen = HashSet::new();
        let mut cells = Vec::new();
        for pair in points.windows(2) {
            for point in sample_segment(pair[0], pair[1]) {
                let cell = Self::cell_of(point);
                if seen.insert(cell) {
                    cells.push(cell);
                }
            }
        }
        cells
    }

    /// Mark a routed path as occupied by `connection_id`.
    pub fn mark(&mut self, connection_id: &str, points: &[Point]) {
        let cells = Self::cells_for_path(points);
        for cell in &cells {
            self.cells
                .entry(*cell)
                .or_default()
                .insert(connection_id.to_string());
        }
        self.by_connection.insert(connection_id.to_string(), cells);
    }

    /// Release every cell previously marked for `connection_id`.
    pub fn release(&mut self, connection_id: &str) {
        let Some(cells) = self.by_connection.remove(connection_id) else {
            return;
        };
        for cell in cells {
            if let Some(owners) = self.cells.get_mut(&cell) {
                owners.remove(connection_id);
                if owners.is_empty() {
                    self.cells.remove(&cell);
                }
            }
        }
    }

    /// A path is clear when every cell it touches is unoccupied or
    /// occupied only by the connection's own previous path.
    pub fn is_clear(&self, connection_id: &str, points: &[Point]) -> bool {
        Self::cells_for_path(points).iter().all(|cell| {
            match self.cells.get(cell) {
                None => true,
                Some(owners) => owners.iter().all(|id| id == connection_id),
            }
        })
    }

    pub fn occupied_cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn has_marks(&self, connection_id: &str) -> bool {
        self.by_connection.contains_key(connection_id)
    }
}

/// Sample a segment at half-cell steps so no crossed cell is skipped.
fn sample_segment(a: Point, b: Point) -> Vec<Point> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length = (dx * dx + dy * dy).sqrt();
    let steps = ((length / (CELL_SIZE / 2.0)).ceil() as usize).max(1);
    (0..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            Point::new(a.x + dx * t, a.y + dy * t)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_and_clear() {
        let mut grid = OccupancyGrid::new();
        let path = vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)];
        assert!(grid.is_clear("a", &path));

        grid.mark("a", &path);
        assert!(grid.is_clear("a", &path), "own cells do not block");
        assert!(!grid.is_clear("b", &path), "foreign cells block");
    }

    #[test]
    fn test_release_frees_cells() {
        let mut grid = OccupancyGrid::new();
        let path = vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)];
        grid.mark("a", &path);
        grid.release("a");
        assert!(grid.is_clear("b", &path));
        assert_eq!(grid.occupied_cell_count(), 0);
    }

    #[test]
    fn test_disjoint_paths_do_not_conflict() {
        let mut grid = OccupancyGrid::new();
        grid.mark("a", &[Point::new(0.0, 0.0), Point::new(100.0, 0.0)]);
        let far = vec![Point::new(0.0, 200.0), Point::new(100.0, 200.0)];
        assert!(grid.is_clear("b", &far));
    }

    #[test]
    fn test_crossing_segment_detected() {
        let mut grid = OccupancyGrid::new();
        grid.mark("a", &[Point::new(0.0, 0.0), Point::new(200.0, 0.0)]);
        // Vertical path crossing the horizontal one.
        let crossing = vec![Point::new(100.0, -50.0), Point::new(100.0, 50.0)];
        assert!(!grid.is_clear("b", &crossing));
    }
}
