//! Pure classification rules deciding what occupies each grid cell.
//!
//! Every predicate is a total function of static coordinates and the grid
//! dimensions; nothing here depends on previously computed results, so the
//! generation pass may evaluate cells in any order.

use gridtown_core::{CellCoord, CellKind, GridDimensions};

/// Reports whether the cell sits on the road lattice.
///
/// The remainder follows signed integer semantics, so probes left of or
/// below the grid (negative indices) stay off the lattice unless the other
/// axis puts them on it.
#[must_use]
pub fn road_eligible(cell: CellCoord) -> bool {
    cell.x() % 3 == 0 || cell.z() % 3 == 0
}

/// Reports whether the cell is a four-way intersection: all four orthogonal
/// neighbours must be inside the grid and road-eligible.
///
/// An out-of-bounds neighbour counts as absent, so cells on the grid rim are
/// never four-ways.
#[must_use]
pub fn is_four_way(cell: CellCoord, grid: GridDimensions) -> bool {
    let north = cell.offset(0, 1);
    let south = cell.offset(0, -1);
    let east = cell.offset(1, 0);
    let west = cell.offset(-1, 0);

    grid.contains(north)
        && road_eligible(north)
        && grid.contains(south)
        && road_eligible(south)
        && grid.contains(east)
        && road_eligible(east)
        && grid.contains(west)
        && road_eligible(west)
}

/// Reports whether the cell satisfies the boundary-exact outer-intersection
/// predicate.
///
/// Each neighbour check demands that the neighbour index lands exactly on
/// the corresponding grid edge (`z + 1 == length`, `z - 1 == 0`, and the
/// symmetric x-axis conditions) in addition to being road-eligible by
/// formula.
#[must_use]
pub fn is_outer_intersection(cell: CellCoord, grid: GridDimensions) -> bool {
    let north_on_edge =
        cell.z() + 1 == grid.length() as i32 && road_eligible(cell.offset(0, 1));
    let south_on_edge = cell.z() - 1 == 0 && road_eligible(cell.offset(0, -1));
    let east_on_edge = cell.x() + 1 == grid.width() as i32 && road_eligible(cell.offset(1, 0));
    let west_on_edge = cell.x() - 1 == 0 && road_eligible(cell.offset(-1, 0));

    north_on_edge && south_on_edge && east_on_edge && west_on_edge
}

/// Reports whether the cell resolves to a building: inside the grid and off
/// the road lattice.
///
/// This re-derives the classification instead of consulting generated
/// state, so it never requires a building to actually have been placed.
#[must_use]
pub fn has_building(cell: CellCoord, grid: GridDimensions) -> bool {
    grid.contains(cell) && !road_eligible(cell)
}

/// Reports whether a road cell is flanked by buildings on either the z axis
/// or the x axis, which turns the segment a quarter turn when placed.
#[must_use]
pub fn road_flanked_by_buildings(cell: CellCoord, grid: GridDimensions) -> bool {
    (has_building(cell.offset(0, -1), grid) && has_building(cell.offset(0, 1), grid))
        || (has_building(cell.offset(-1, 0), grid) && has_building(cell.offset(1, 0), grid))
}

/// Classifies a single cell.
///
/// Exactly one kind is returned for every coordinate, making the
/// classification total and mutually exclusive over the grid domain. The
/// outer-intersection check only participates when `outer_enabled` is set;
/// the default generation path leaves it dormant.
#[must_use]
pub fn classify(cell: CellCoord, grid: GridDimensions, outer_enabled: bool) -> CellKind {
    if !road_eligible(cell) {
        return CellKind::Building;
    }

    if is_four_way(cell, grid) {
        return CellKind::FourWayIntersection;
    }

    if outer_enabled && is_outer_intersection(cell, grid) {
        return CellKind::OuterIntersection;
    }

    CellKind::Road
}
