//! Recompute jobs: the Idle → Recomputing → Idle cycle of the controller.

use super::{ControllerState, Effect, Frame, MapController, ViewState};
use crate::compute::cluster::cluster;
use crate::compute::spatial::SpatialIndex;
use crate::error::Result;
use std::sync::Arc;

/// Snapshot of everything needed to compute the markers of one view.
///
/// Holds its own handle on the index, so it can run after the controller
/// has moved on or on another thread.
#[derive(Debug, Clone)]
pub struct RecomputeJob {
    generation: u64,
    view: ViewState,
    index: Arc<SpatialIndex>,
    pixel_radius: f64,
}

/// Result of [`RecomputeJob::run`], handed back to [`MapController::complete`].
#[derive(Debug)]
pub struct RecomputeOutcome {
    pub generation: u64,
    pub frame: Result<Frame>,
}

impl RecomputeJob {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Query the buffered viewport and cluster the candidates.
    pub fn run(self) -> RecomputeOutcome {
        let candidates = self.index.query(&self.view.viewport, self.view.zoom);
        let frame = cluster(&candidates, self.view.zoom, self.pixel_radius).map(|markers| {
            Frame {
                generation: self.generation,
                view: self.view,
                markers,
            }
        });

        RecomputeOutcome {
            generation: self.generation,
            frame,
        }
    }
}

impl MapController {
    /// Take the pending view and snapshot it into a job.
    ///
    /// Returns `None` when nothing is pending or a job is already outstanding.
    /// The pending view becomes the current view immediately.
    pub fn start_recompute(&mut self) -> Option<RecomputeJob> {
        if self.state == ControllerState::Recomputing {
            return None;
        }
        let view = self.pending.take()?;

        self.state = ControllerState::Recomputing;
        self.stats.recomputes += 1;
        self.view = view.clone();

        Some(RecomputeJob {
            generation: self.generation,
            view,
            index: Arc::clone(&self.index),
            pixel_radius: self.config.pixel_radius,
        })
    }

    /// Install a finished job and return to `Idle`.
    ///
    /// Outcomes from an older generation are discarded and leave the state
    /// alone. A failed clustering pass keeps the previous frame.
    pub fn complete(&mut self, outcome: RecomputeOutcome) -> Option<Effect> {
        if outcome.generation != self.generation {
            self.stats.stale_discarded += 1;
            log::debug!(
                "Discarding markers of generation {} (current {})",
                outcome.generation,
                self.generation
            );
            return None;
        }

        self.state = ControllerState::Idle;
        match outcome.frame {
            Ok(frame) => {
                log::debug!(
                    "Redraw at zoom {} with {} marker(s)",
                    frame.view.zoom,
                    frame.markers.len()
                );
                self.frame = Some(frame.clone());
                Some(Effect::Redraw(frame))
            }
            Err(err) => {
                log::warn!("Failed to recompute markers: {}", err);
                None
            }
        }
    }

    /// Run start, run and complete until nothing is pending.
    pub fn pump(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        while let Some(job) = self.start_recompute() {
            if let Some(effect) = self.complete(job.run()) {
                effects.push(effect);
            }
        }
        effects
    }
}
