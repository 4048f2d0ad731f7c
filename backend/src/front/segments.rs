//! Front segment activity sync

use crate::core::EdgeKey;
use crate::models::{FrontEdge, FrontSegment, GameState};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SegmentStats {
    pub active: u32,
    pub newly_active: u32,
    pub deactivated: u32,
    pub total: u32,
}

/// Bring persistent segment records in line with this turn's front edges
///
/// Present edges become (or stay) active: streak and friction grow by one.
/// Records of edges that vanished go inactive with a zero streak, and their
/// friction decays by one per turn.
pub fn sync_segments(state: &mut GameState, edges: &[FrontEdge], turn: u32) -> SegmentStats {
    let mut stats = SegmentStats::default();
    let present: BTreeSet<&EdgeKey> = edges.iter().map(|e| &e.edge_id).collect();

    for key in &present {
        let segment = state
            .front_segments
            .entry((*key).clone())
            .or_insert_with(|| FrontSegment {
                created_turn: turn,
                ..FrontSegment::default()
            });

        if !segment.active {
            segment.active = true;
            segment.since_turn = turn;
            segment.active_streak = 0;
            stats.newly_active += 1;
        }
        segment.active_streak += 1;
        segment.max_active_streak = segment.max_active_streak.max(segment.active_streak);
        segment.friction += 1;
        segment.max_friction = segment.max_friction.max(segment.friction);
        segment.last_active_turn = turn;
        stats.active += 1;
    }

    for (key, segment) in state.front_segments.iter_mut() {
        if present.contains(key) {
            continue;
        }
        if segment.active {
            segment.active = false;
            stats.deactivated += 1;
        }
        segment.active_streak = 0;
        segment.friction = segment.friction.saturating_sub(1);
    }

    stats.total = state.front_segments.len() as u32;
    stats
}
