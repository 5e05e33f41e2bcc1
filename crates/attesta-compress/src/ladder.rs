// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quality ladder — the bounded, precomputed sequence of encode qualities a
// compression run walks through.

use attesta_core::types::Quality;

/// A descending sequence of encode qualities from a starting value down to
/// a floor, inclusive.
///
/// The rungs are precomputed in integer percentage points, so termination
/// is decided by integer comparison rather than repeated floating-point
/// decrement. A ladder is never empty and never longer than
/// `(start - floor) / step + 1` rungs.
#[derive(Debug, Clone)]
pub struct QualityLadder {
    rungs: Vec<Quality>,
}

impl QualityLadder {
    /// Build a ladder stepping down from `start` to `floor` by `step`
    /// percentage points. A step of 0 is treated as 1. When the last
    /// decrement would overshoot the floor, the floor itself becomes the
    /// final rung. `start <= floor` yields the single rung `start`.
    pub fn descending(start: Quality, floor: Quality, step: u8) -> Self {
        let step = step.max(1);
        let floor_pct = floor.percent().min(start.percent());

        let mut rungs = Vec::new();
        let mut current = start.percent();
        loop {
            rungs.push(Quality::new(current));
            if current <= floor_pct {
                break;
            }
            current = current.saturating_sub(step).max(floor_pct);
        }

        Self { rungs }
    }

    pub fn len(&self) -> usize {
        self.rungs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rungs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Quality> + '_ {
        self.rungs.iter().copied()
    }

    pub fn rungs(&self) -> &[Quality] {
        &self.rungs
    }
}
