//! Occupancy grid snapshots consumed by the costmap scorer
//!
//! A grid arrives asynchronously and replaces the previous one wholesale.
//! Readers take an `Arc` clone under a short read lock and sample it without
//! holding any lock, so a long search never blocks a grid update.

use nav_route_common::{Error, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::geometry::Coordinates;

pub const FREE_SPACE: u8 = 0;
pub const LETHAL_OBSTACLE: u8 = 254;
pub const NO_INFORMATION: u8 = 255;

/// Row-major 2D cost grid (`index = my * width + mx`)
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyGrid {
    width: u32,
    height: u32,
    resolution: f64,
    origin: Coordinates,
    data: Vec<u8>,
}

/// Wire form of an occupancy grid update
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GridMessage {
    /// Cells along x
    #[schema(example = 100)]
    pub width: u32,
    /// Cells along y
    #[schema(example = 100)]
    pub height: u32,
    /// Cell edge length in meters
    #[schema(example = 0.1)]
    pub resolution: f64,
    #[serde(default)]
    pub origin_x: f64,
    #[serde(default)]
    pub origin_y: f64,
    /// Costs 0-255, row-major
    pub data: Vec<u8>,
}

impl OccupancyGrid {
    /// Grid filled with `default_cost`
    pub fn new(
        width: u32,
        height: u32,
        resolution: f64,
        origin: Coordinates,
        default_cost: u8,
    ) -> Result<Self> {
        let cells = width as usize * height as usize;
        Self::from_data(width, height, resolution, origin, vec![default_cost; cells])
    }

    pub fn from_data(
        width: u32,
        height: u32,
        resolution: f64,
        origin: Coordinates,
        data: Vec<u8>,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidGrid(format!(
                "grid must be non-empty, got {width}x{height}"
            )));
        }
        if !(resolution > 0.0 && resolution.is_finite()) {
            return Err(Error::InvalidGrid(format!(
                "resolution must be positive, got {resolution}"
            )));
        }
        if !(origin.x.is_finite() && origin.y.is_finite()) {
            return Err(Error::InvalidGrid("origin must be finite".to_string()));
        }
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(Error::InvalidGrid(format!(
                "expected {expected} cells for {width}x{height}, got {}",
                data.len()
            )));
        }

        Ok(Self {
            width,
            height,
            resolution,
            origin,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn origin(&self) -> Coordinates {
        self.origin
    }

    /// Panics when (mx, my) is outside the grid.
    pub fn cost(&self, mx: u32, my: u32) -> u8 {
        self.data[self.cell_index(mx, my)]
    }

    /// Panics when (mx, my) is outside the grid.
    pub fn set_cost(&mut self, mx: u32, my: u32, cost: u8) {
        let idx = self.cell_index(mx, my);
        self.data[idx] = cost;
    }

    fn cell_index(&self, mx: u32, my: u32) -> usize {
        assert!(
            mx < self.width && my < self.height,
            "cell ({mx}, {my}) outside {}x{} grid",
            self.width,
            self.height
        );
        my as usize * self.width as usize + mx as usize
    }

    /// Cell containing `point`, or `None` when it lies off the map
    pub fn world_to_map(&self, point: Coordinates) -> Option<(u32, u32)> {
        let fx = (point.x - self.origin.x) / self.resolution;
        let fy = (point.y - self.origin.y) / self.resolution;
        if !(fx >= 0.0 && fy >= 0.0) {
            return None;
        }

        let (mx, my) = (fx.floor(), fy.floor());
        if mx >= self.width as f64 || my >= self.height as f64 {
            return None;
        }
        Some((mx as u32, my as u32))
    }

    /// Cost at `point`, or `None` when off the map
    pub fn cost_at(&self, point: Coordinates) -> Option<u8> {
        self.world_to_map(point).map(|(mx, my)| self.cost(mx, my))
    }
}

impl TryFrom<GridMessage> for OccupancyGrid {
    type Error = Error;

    fn try_from(msg: GridMessage) -> Result<Self> {
        OccupancyGrid::from_data(
            msg.width,
            msg.height,
            msg.resolution,
            Coordinates::new(msg.origin_x, msg.origin_y),
            msg.data,
        )
    }
}

/// Latest occupancy grid, shared between the update path and the scorers
#[derive(Debug, Default)]
pub struct SharedCostmap {
    latest: RwLock<Option<Arc<OccupancyGrid>>>,
    warned_missing: AtomicBool,
}

impl SharedCostmap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current snapshot
    pub fn update(&self, grid: OccupancyGrid) {
        debug!(
            width = grid.width(),
            height = grid.height(),
            resolution = grid.resolution(),
            "received occupancy grid"
        );
        *self.latest.write() = Some(Arc::new(grid));
        self.warned_missing.store(false, Ordering::Relaxed);
    }

    /// Current snapshot, if any grid has been received
    pub fn snapshot(&self) -> Option<Arc<OccupancyGrid>> {
        let snapshot = self.latest.read().clone();
        if snapshot.is_none() && !self.warned_missing.swap(true, Ordering::Relaxed) {
            warn!("no occupancy grid received yet; costmap scoring rejects all edges");
        }
        snapshot
    }

    pub fn has_grid(&self) -> bool {
        self.latest.read().is_some()
    }

    pub fn clear(&self) {
        *self.latest.write() = None;
    }
}
