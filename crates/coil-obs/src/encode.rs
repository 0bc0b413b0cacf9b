//! Snapshot → grid encoding.
//!
//! [`encode`] is a pure function: the same snapshot and spec always
//! produce an identical grid. Every spatial write is additive, so each
//! cell is a plain sum over the entities that land in it and the result
//! cannot depend on entity iteration order. Entities whose cell falls
//! outside `[0, grid_size)` on either axis are dropped — no clamping,
//! no wraparound, no error.

use coil_core::{Segment, Snapshot, SnapshotError};

use crate::grid::ObsGrid;
use crate::spec::{Channel, GridSpec};

/// The observation window: a square of half-width `view_range` world
/// units centered on the agent, mapped onto `grid_size` cells per axis.
///
/// `cell = floor((world − origin + view_range) · grid_size / (2 · view_range))`
///
/// A coordinate exactly at `+view_range` scales to `grid_size` and is
/// therefore outside the window; `−view_range` lands in cell 0.
struct Window {
    origin: (f32, f32),
    view_range: f32,
    grid_size: usize,
}

impl Window {
    fn cell(&self, x: f32, y: f32) -> Option<(usize, usize)> {
        Some((
            self.axis(x - self.origin.0)?,
            self.axis(y - self.origin.1)?,
        ))
    }

    fn axis(&self, rel: f32) -> Option<usize> {
        let scaled = (rel + self.view_range) * self.grid_size as f32 / (2.0 * self.view_range);
        let cell = scaled.floor();
        // NaN fails the range check and is dropped with everything else.
        if cell >= 0.0 && cell < self.grid_size as f32 {
            Some(cell as usize)
        } else {
            None
        }
    }
}

/// Encode one snapshot into a fixed-shape observation grid.
///
/// The output shape is `(spec.layout.len(), grid_size, grid_size)` for
/// every input, including snapshots with zero entities of any kind.
///
/// # Errors
///
/// [`SnapshotError::MissingSelf`] when the snapshot has no self agent —
/// the window has no origin without one.
pub fn encode(snapshot: &Snapshot, spec: &GridSpec) -> Result<ObsGrid, SnapshotError> {
    let agent = snapshot.slither.as_ref().ok_or(SnapshotError::MissingSelf)?;
    let window = Window {
        origin: agent.head(),
        view_range: spec.view_range,
        grid_size: spec.grid_size,
    };

    let mut grid = ObsGrid::zeros(spec.layout.len(), spec.grid_size);
    for (c, channel) in spec.layout.channels().iter().enumerate() {
        match channel {
            Channel::FoodDensity => {
                for food in &snapshot.foods {
                    if let Some((x, y)) = window.cell(food.x, food.y) {
                        grid.add(c, x, y, food.value);
                    }
                }
            }
            Channel::SelfBody => scatter_presence(&mut grid, c, &window, &agent.parts),
            Channel::RivalBodies => {
                for rival in &snapshot.others {
                    scatter_presence(&mut grid, c, &window, &rival.parts);
                }
            }
            Channel::RankedBodies => {
                for part in &snapshot.top_body_parts {
                    if let Some((x, y)) = window.cell(part.x, part.y) {
                        grid.add(c, x, y, part.size.unwrap_or(1.0));
                    }
                }
            }
            Channel::Preys => {
                for prey in &snapshot.preys {
                    if let Some((x, y)) = window.cell(prey.x, prey.y) {
                        grid.add(c, x, y, 1.0);
                    }
                }
            }
            Channel::HeadingX => grid.fill(c, agent.xm),
            Channel::HeadingY => grid.fill(c, agent.ym),
            Channel::SelfHeading => {
                if let Some((x, y)) = window.cell(agent.x, agent.y) {
                    grid.add(c, x, y, agent.ang);
                }
            }
            Channel::RivalHeadings => {
                for rival in &snapshot.others {
                    if let Some((x, y)) = window.cell(rival.x, rival.y) {
                        grid.add(c, x, y, rival.ang);
                    }
                }
            }
            Channel::TargetBody => {
                if let Some(target) = &snapshot.target_slither {
                    scatter_presence(&mut grid, c, &window, &target.parts);
                }
            }
            Channel::TargetHeading => {
                if let Some(target) = &snapshot.target_slither {
                    if let Some((x, y)) = window.cell(target.x, target.y) {
                        grid.add(c, x, y, target.ang);
                    }
                }
            }
        }
    }
    Ok(grid)
}

fn scatter_presence(grid: &mut ObsGrid, channel: usize, window: &Window, parts: &[Segment]) {
    for part in parts {
        if let Some((x, y)) = window.cell(part.x, part.y) {
            grid.add(channel, x, y, 1.0);
        }
    }
}
