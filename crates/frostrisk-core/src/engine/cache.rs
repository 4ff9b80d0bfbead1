use crate::core::catalog::stations::StationCatalog;
use crate::core::utils::geometry::{great_circle_km, grid_cell, grid_cell_center};
use std::collections::HashMap;

/// Candidate stations per geographic grid cell.
///
/// Filled sequentially before the batch starts and only read afterwards. A cell keeps every
/// station that can be the nearest one for some point inside it; the caller picks among them
/// with the real coordinate, so a warmed lookup agrees with a full catalog search.
#[derive(Debug, Clone, Default)]
pub(crate) struct StationCellCache {
    cell_deg: f64,
    cells: HashMap<(i64, i64), Vec<usize>>,
}

impl StationCellCache {
    pub(crate) fn new(cell_deg: f64) -> Self {
        Self {
            cell_deg,
            cells: HashMap::new(),
        }
    }

    /// Resolves and stores the cell containing `(latitude, longitude)` if not already cached.
    pub(crate) fn warm(&mut self, catalog: &StationCatalog, latitude: f64, longitude: f64) {
        let cell = grid_cell(latitude, longitude, self.cell_deg);
        let cell_deg = self.cell_deg;
        self.cells.entry(cell).or_insert_with(|| {
            let (center_lat, center_lon) = grid_cell_center(cell, cell_deg);
            match catalog.nearest(center_lat, center_lon) {
                // A point within h of the centre has its nearest station within D + 2h of it.
                Some((_, distance)) => {
                    let reach = distance + 2.0 * half_diagonal_km(cell, cell_deg);
                    catalog.indices_within(center_lat, center_lon, reach)
                }
                None => Vec::new(),
            }
        });
    }

    /// `None` when the cell was never warmed; an empty slice when the catalog had no station.
    pub(crate) fn lookup(&self, latitude: f64, longitude: f64) -> Option<&[usize]> {
        self.cells
            .get(&grid_cell(latitude, longitude, self.cell_deg))
            .map(Vec::as_slice)
    }

    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }
}

/// Largest distance from a cell's centre to one of its corners.
fn half_diagonal_km(cell: (i64, i64), cell_deg: f64) -> f64 {
    let (center_lat, center_lon) = grid_cell_center(cell, cell_deg);
    let south = cell.0 as f64 * cell_deg;
    let west = cell.1 as f64 * cell_deg;
    [
        (south, west),
        (south, west + cell_deg),
        (south + cell_deg, west),
        (south + cell_deg, west + cell_deg),
    ]
    .into_iter()
    .map(|(lat, lon)| great_circle_km(center_lat, center_lon, lat, lon))
    .fold(0.0, f64::max)
}
