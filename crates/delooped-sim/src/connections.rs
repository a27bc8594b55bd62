//! Building→enemy link side table.
//!
//! Presentation hint only: records which loop's building touched which
//! enemy recently. Never read by gameplay code.

use std::collections::BTreeMap;

use delooped_core::constants::CONNECTION_LINGER_SECS;
use delooped_core::state::ConnectionView;
use delooped_core::types::{EnemyId, LoopPos};

#[derive(Debug, Clone, Default)]
pub struct Connections {
    links: BTreeMap<(EnemyId, LoopPos), f64>,
}

impl Connections {
    pub fn record(&mut self, from: LoopPos, enemy: EnemyId) {
        self.links.insert((enemy, from), CONNECTION_LINGER_SECS);
    }

    /// Age every link by `delta` and purge the expired ones.
    pub fn tick(&mut self, delta: f64) {
        self.links.retain(|_, remaining| {
            *remaining -= delta;
            *remaining > 0.0
        });
    }

    /// Drop every link to an enemy that left the board.
    pub fn forget(&mut self, enemy: EnemyId) {
        self.links.retain(|(id, _), _| *id != enemy);
    }

    pub fn clear(&mut self) {
        self.links.clear();
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn views(&self) -> Vec<ConnectionView> {
        self.links
            .iter()
            .map(|(&(enemy, from), &remaining)| ConnectionView {
                from,
                enemy,
                remaining,
            })
            .collect()
    }
}
