//! A hierarchical grid, the default broad phase for trigger detection.

use super::{
    bitmatrix::BitMatrix, spatial_query::SpatialIndex, ColliderKey, ColliderSet, LayerMask,
    SpatialQuery, AABB,
};
use crate::math as m;
use std::ops::RangeInclusive;

/// A hierarchical grid spatial index.
///
/// This is optimized for fairly small worlds with a low object count (in the thousands at most).
/// If the object count or world size is very large, it will eat up a lot of memory.
///
/// The grid is rebuilt from scratch every frame with [`rebuild`][SpatialIndex::rebuild].
#[derive(Debug)]
pub struct HGrid {
    pub(crate) bounds: AABB,
    pub(crate) grids: Vec<Grid>,
    spacing_ratio: usize,
    // timestamping used to keep track of which colliders were already checked by a query.
    last_timestamp: u16,
    timestamps: Vec<u16>,
    // cache AABBs that colliders were inserted with, their layers to cull by mask
    // quickly, and their full keys so queries can hand out generational keys
    aabbs: Vec<AABB>,
    layers: Vec<usize>,
    keys: Vec<Option<ColliderKey>>,
}

#[derive(Clone, Debug)]
pub(crate) struct Grid {
    pub(crate) spacing: f64,
    pub(crate) column_count: usize,
    pub(crate) row_count: usize,
    column_bits: BitMatrix,
    row_bits: BitMatrix,
    // bitmask with bit per cell of a grid,
    // indicating whether objects exist below that cell on lower grid levels.
    subgrid_mask: Option<BitMatrix>,
}

/// Parameters for the creation of a hierarchical grid.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct HGridParams {
    /// Approximate bounds of the grid. Approximate because the actual bounds
    /// are rounded to fit a multiple of the largest grid level's spacing.
    /// The bottom left bound is used as-is and the top right is extended.
    ///
    /// The grid doesn't need to cover the whole world because it wraps around
    /// toroidally to cover all of space, however, the larger the grid, the less
    /// far-apart objects will be tested due to said wrapping.
    pub approx_bounds: AABB,
    /// Spacing of the lowest grid level.
    ///
    /// A likely good value is a little (10-50%) larger than the smallest objects in your scene.
    pub lowest_spacing: f64,
    /// Number of grid levels. Two or three should be sufficient
    /// depending on the size distribution of your objects.
    pub level_count: usize,
    /// The number to multiply spacing by for subsequent grid levels after `lowest_spacing`.
    pub spacing_ratio: usize,
    /// How many colliders to initially allocate space for.
    /// More space will be allocated as needed.
    pub initial_capacity: usize,
}

impl Default for HGridParams {
    fn default() -> Self {
        Self {
            approx_bounds: AABB {
                min: m::Vec2::new(-40.0, -10.0),
                max: m::Vec2::new(40.0, 10.0),
            },
            lowest_spacing: 1.0,
            level_count: 2,
            spacing_ratio: 2,
            initial_capacity: 0,
        }
    }
}

impl HGrid {
    /// Create a new HGrid. See [`HGridParams`][self::HGridParams] for explanation.
    pub fn new(params: HGridParams) -> Self {
        let level_count = params.level_count.max(1);
        let spacing_ratio = params.spacing_ratio.max(1);
        let mut spacings: Vec<f64> = Vec::with_capacity(level_count);
        let mut spacing = params.lowest_spacing;
        spacings.push(spacing);
        for _i in 1..level_count {
            spacing *= spacing_ratio as f64;
            spacings.push(spacing);
        }

        let largest_spacing = spacing;
        let bounds = AABB {
            min: params.approx_bounds.min,
            max: params.approx_bounds.min
                + m::Vec2::new(
                    (params.approx_bounds.width() / largest_spacing).ceil() * largest_spacing,
                    (params.approx_bounds.height() / largest_spacing).ceil() * largest_spacing,
                ),
        };
        let bounds_w = bounds.width();
        let bounds_h = bounds.height();

        let mut grids: Vec<Grid> = spacings
            .iter()
            .map(|&spacing| {
                let column_count = ((bounds_w / spacing).round() as usize).max(1);
                let row_count = ((bounds_h / spacing).round() as usize).max(1);
                Grid {
                    spacing,
                    column_count,
                    row_count,
                    column_bits: BitMatrix::new(params.initial_capacity, column_count),
                    row_bits: BitMatrix::new(params.initial_capacity, row_count),
                    subgrid_mask: None,
                }
            })
            .collect();

        // set subgrid mask for all except smallest grid
        for grid in grids.iter_mut().skip(1) {
            grid.subgrid_mask = Some(BitMatrix::new(grid.row_count, grid.column_count));
        }

        HGrid {
            bounds,
            grids,
            spacing_ratio,
            last_timestamp: 0,
            timestamps: vec![0; params.initial_capacity],
            aabbs: vec![AABB::zero(); params.initial_capacity],
            layers: vec![0; params.initial_capacity],
            keys: vec![None; params.initial_capacity],
        }
    }

    /// Clear the grid and allocate more space if we need bigger bitsets.
    fn prepare(&mut self, slot_count: usize) {
        for grid in &mut self.grids {
            grid.column_bits.clear_and_resize(slot_count);
            grid.row_bits.clear_and_resize(slot_count);
            if let Some(mask) = &mut grid.subgrid_mask {
                mask.clear();
            }
        }

        self.reset_timestamps();
        self.timestamps.resize(slot_count, 0);
        self.aabbs.resize(slot_count, AABB::zero());
        self.layers.resize(slot_count, 0);
        self.keys.iter_mut().for_each(|k| *k = None);
        self.keys.resize(slot_count, None);
    }

    fn reset_timestamps(&mut self) {
        self.last_timestamp = 0;
        for ts in &mut self.timestamps {
            *ts = 0;
        }
    }

    pub(crate) fn insert(&mut self, key: ColliderKey, aabb: AABB, layer: usize) {
        let id = key.slot();
        self.aabbs[id] = aabb;
        self.layers[id] = layer;
        self.keys[id] = Some(key);

        let aabb = AABB {
            min: aabb.min - self.bounds.min,
            max: aabb.max - self.bounds.min,
        };
        // select grid level based on smaller extent of the aabb
        let aabb_size = aabb.width().min(aabb.height());
        let last_grid_idx = self.grids.len() - 1;
        let placement_idx = self
            .grids
            .iter()
            .position(|g| g.spacing >= aabb_size)
            .unwrap_or(last_grid_idx);
        let (placement_grid, upper_grids) = self.grids[placement_idx..].split_at_mut(1);
        let placement_grid = &mut placement_grid[0];

        let columns = cell_range(
            aabb.min.x,
            aabb.max.x,
            placement_grid.spacing,
            placement_grid.column_count,
        );
        for col in columns.clone() {
            // toroidal wrapping for things outside the grid
            let col = col.rem_euclid(placement_grid.column_count as isize) as usize;
            placement_grid.column_bits.set(col, id);
        }

        let rows = cell_range(
            aabb.min.y,
            aabb.max.y,
            placement_grid.spacing,
            placement_grid.row_count,
        );
        for row in rows.clone() {
            let row = row.rem_euclid(placement_grid.row_count as isize) as usize;
            placement_grid.row_bits.set(row, id);
        }

        // mark above grids as having something below them.
        // we can get cells on subsequent grids by dividing by spacing ratio
        let mut ratio = 1;
        for grid in upper_grids {
            ratio *= self.spacing_ratio as isize;
            let Some(mask) = grid.subgrid_mask.as_mut() else { continue };
            let mask_cols = one_lap(
                columns.start().div_euclid(ratio),
                columns.end().div_euclid(ratio),
                grid.column_count,
            );
            let mask_rows = one_lap(
                rows.start().div_euclid(ratio),
                rows.end().div_euclid(ratio),
                grid.row_count,
            );
            for (col, row) in itertools::iproduct!(mask_cols, mask_rows) {
                let col = col.rem_euclid(grid.column_count as isize) as usize;
                let row = row.rem_euclid(grid.row_count as isize) as usize;
                mask.set(col, row);
            }
        }
    }

    /// Find every stored collider whose bounds intersect `aabb` and whose layer is in `layer_mask`.
    /// Every collider is returned at most once per query.
    pub fn test_aabb(
        &mut self,
        aabb: AABB,
        layer_mask: LayerMask,
    ) -> impl '_ + Iterator<Item = ColliderKey> {
        let aabb_worldspace = aabb;
        let aabb = AABB {
            min: aabb.min - self.bounds.min,
            max: aabb.max - self.bounds.min,
        };

        if self.last_timestamp == u16::MAX {
            self.reset_timestamps();
        }
        self.last_timestamp += 1;
        let curr_timestamp = self.last_timestamp;

        // destructuring still needed here (in 2021 edition)
        // to make lifetimes work by moving the right things
        let timestamps = &mut self.timestamps;
        let aabbs = &self.aabbs;
        let layers = &self.layers;
        let keys = &self.keys;

        self.grids
            .iter()
            .flat_map(move |grid| {
                let cols = cell_range(aabb.min.x, aabb.max.x, grid.spacing, grid.column_count);
                let rows = cell_range(aabb.min.y, aabb.max.y, grid.spacing, grid.row_count);
                itertools::iproduct!(cols, rows).flat_map(
                    move |(col, row)| {
                        let col = col.rem_euclid(grid.column_count as isize) as usize;
                        let row = row.rem_euclid(grid.row_count as isize) as usize;
                        grid.column_bits
                            .entry(col)
                            .intersection(grid.row_bits.entry(row))
                            .iter()
                    },
                )
            })
            .filter_map(move |id| {
                if timestamps[id] == curr_timestamp {
                    return None;
                }
                timestamps[id] = curr_timestamp;
                if !layer_mask.get(layers[id]) {
                    return None;
                }
                // aabb check to quickly cull things that are in the same square because of
                // wrapping or just far enough apart
                aabb_worldspace.intersection(&aabbs[id])?;
                keys[id]
            })
    }

    /// Find every stored collider whose bounds contain the point.
    pub fn test_point(&self, point: m::Vec2) -> impl '_ + Iterator<Item = ColliderKey> {
        let point_worldspace = point;
        let point = point - self.bounds.min;

        // walk from the top level down, stopping once nothing is stored below
        self.grids
            .iter()
            .rev()
            .scan(false, move |empty_below, grid| {
                if *empty_below {
                    return None;
                }
                let col = (point.x / grid.spacing).floor() as isize;
                let col = col.rem_euclid(grid.column_count as isize) as usize;
                let row = (point.y / grid.spacing).floor() as isize;
                let row = row.rem_euclid(grid.row_count as isize) as usize;
                if let Some(mask) = &grid.subgrid_mask {
                    if !mask.entry(col).has(row) {
                        *empty_below = true;
                    }
                }
                Some(
                    grid.column_bits
                        .entry(col)
                        .intersection(grid.row_bits.entry(row))
                        .iter(),
                )
            })
            .flatten()
            .filter(move |&id| self.aabbs[id].contains_point(point_worldspace))
            .filter_map(move |id| self.keys[id])
    }
}

/// Cells that `min..=max` covers along one axis of a grid level,
/// cut off after one lap around the wrapping grid.
fn cell_range(min: f64, max: f64, spacing: f64, cell_count: usize) -> RangeInclusive<isize> {
    one_lap(
        (min / spacing).floor() as isize,
        (max / spacing).floor() as isize,
        cell_count,
    )
}

#[inline]
fn one_lap(first: isize, last: isize, cell_count: usize) -> RangeInclusive<isize> {
    first..=last.min(first + cell_count as isize - 1)
}

impl SpatialQuery for HGrid {
    fn query_aabb(&mut self, bounds: AABB, mask: LayerMask, out: &mut Vec<ColliderKey>) {
        out.extend(self.test_aabb(bounds, mask));
    }
}

impl SpatialIndex for HGrid {
    fn rebuild(&mut self, colliders: &ColliderSet) {
        let _span = tracy_span!("rebuild hgrid", "rebuild");
        self.prepare(colliders.slot_count());
        for (key, coll) in colliders.iter().filter(|(_, c)| c.enabled) {
            self.insert(key, coll.bounds(), coll.layer);
        }
    }
}

//
// tests
//
