#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure analytics over generated city layouts.

use gridtown_core::{CellKind, CellPlacement, Event, GenerationId};

/// Aggregate metrics describing a single generated layout.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct CityMetrics {
    /// Number of cells classified as buildings.
    pub buildings: u32,
    /// Number of cells classified as plain road segments.
    pub roads: u32,
    /// Number of cells classified as four-way intersections.
    pub four_ways: u32,
    /// Number of cells classified as outer intersections.
    pub outer_intersections: u32,
    /// Number of road segments turned a quarter turn by flanking buildings.
    pub rotated_roads: u32,
    /// Height of the tallest building, if any building was placed.
    pub tallest_building: Option<f32>,
    /// Height of the lowest building, if any building was placed.
    pub lowest_building: Option<f32>,
}

impl CityMetrics {
    /// Computes metrics for the provided placements in a single pass.
    #[must_use]
    pub fn collect(placements: &[CellPlacement]) -> Self {
        let mut metrics = Self::default();

        for placement in placements {
            match placement.kind {
                CellKind::Building => {
                    metrics.buildings += 1;
                    let height = placement.scale.y;
                    metrics.tallest_building = Some(match metrics.tallest_building {
                        Some(tallest) => tallest.max(height),
                        None => height,
                    });
                    metrics.lowest_building = Some(match metrics.lowest_building {
                        Some(lowest) => lowest.min(height),
                        None => height,
                    });
                }
                CellKind::Road => {
                    metrics.roads += 1;
                    if placement.rotated {
                        metrics.rotated_roads += 1;
                    }
                }
                CellKind::FourWayIntersection => metrics.four_ways += 1,
                CellKind::OuterIntersection => metrics.outer_intersections += 1,
            }
        }

        metrics
    }

    /// Total number of cells the metrics cover.
    #[must_use]
    pub const fn total_cells(&self) -> u32 {
        self.buildings + self.roads + self.four_ways + self.outer_intersections
    }

    /// Per-kind cell counts, the multiset regeneration must preserve.
    #[must_use]
    pub const fn kind_tally(&self) -> [(CellKind, u32); 4] {
        [
            (CellKind::Building, self.buildings),
            (CellKind::Road, self.roads),
            (CellKind::FourWayIntersection, self.four_ways),
            (CellKind::OuterIntersection, self.outer_intersections),
        ]
    }
}

/// Pure system that republishes metrics whenever a layout is generated.
#[derive(Debug, Default)]
pub struct Analytics {
    last_metrics: Option<(GenerationId, CityMetrics)>,
}

impl Analytics {
    /// Creates a new analytics system with no published metrics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the metrics published for the most recent generation, if any.
    #[must_use]
    pub fn last_metrics(&self) -> Option<&(GenerationId, CityMetrics)> {
        self.last_metrics.as_ref()
    }

    /// Consumes world events and recomputes metrics when a generation is
    /// announced. Returns the freshly published metrics, if any.
    pub fn handle(
        &mut self,
        events: &[Event],
        placements: &[CellPlacement],
    ) -> Option<CityMetrics> {
        let generation = events.iter().rev().find_map(|event| match event {
            Event::CityGenerated { generation, .. } => Some(*generation),
            _ => None,
        })?;

        let metrics = CityMetrics::collect(placements);
        self.last_metrics = Some((generation, metrics));
        Some(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridtown_core::{CellCoord, ConfigurationError, GridDimensions, WorldVec};

    fn placement(kind: CellKind, height: f32, rotated: bool) -> CellPlacement {
        CellPlacement {
            cell: CellCoord::new(0, 0),
            kind,
            position: WorldVec::ZERO,
            scale: WorldVec::new(1.0, height, 1.0),
            yaw_degrees: if rotated { 90.0 } else { 0.0 },
            rotated,
        }
    }

    #[test]
    fn collect_tallies_each_kind_and_height_extremes() {
        let placements = vec![
            placement(CellKind::Building, 3.5, false),
            placement(CellKind::Building, 8.0, false),
            placement(CellKind::Road, 1.0, true),
            placement(CellKind::Road, 1.0, false),
            placement(CellKind::FourWayIntersection, 1.0, false),
        ];

        let metrics = CityMetrics::collect(&placements);
        assert_eq!(metrics.buildings, 2);
        assert_eq!(metrics.roads, 2);
        assert_eq!(metrics.four_ways, 1);
        assert_eq!(metrics.outer_intersections, 0);
        assert_eq!(metrics.rotated_roads, 1);
        assert_eq!(metrics.tallest_building, Some(8.0));
        assert_eq!(metrics.lowest_building, Some(3.5));
        assert_eq!(metrics.total_cells(), 5);
    }

    #[test]
    fn collect_reports_no_heights_without_buildings() {
        let placements = vec![placement(CellKind::Road, 1.0, false)];
        let metrics = CityMetrics::collect(&placements);
        assert_eq!(metrics.tallest_building, None);
        assert_eq!(metrics.lowest_building, None);
    }

    #[test]
    fn handle_publishes_only_on_generation_events() {
        let mut analytics = Analytics::new();
        let placements = vec![placement(CellKind::Building, 2.0, false)];

        let rejected = [Event::ConfigurationRejected {
            reason: ConfigurationError::NoBuildingVariants,
        }];
        assert!(analytics.handle(&rejected, &placements).is_none());
        assert!(analytics.last_metrics().is_none());

        let generated = [Event::CityGenerated {
            generation: GenerationId::new(1),
            grid: GridDimensions::new(1, 1),
            buildings: 1,
            roads: 0,
            four_ways: 0,
            outer_intersections: 0,
        }];
        let metrics = analytics
            .handle(&generated, &placements)
            .expect("generation event publishes metrics");
        assert_eq!(metrics.buildings, 1);
        assert_eq!(
            analytics.last_metrics(),
            Some(&(GenerationId::new(1), metrics))
        );
    }
}
