//! Joining sweep rows of a whole (possibly concave) polygon into one route.
//!
//! ## Algorithm
//!
//! Rows sit in a queue, north to south. Each time a row comes off the
//! front, its next unvisited pair is flown (in the current direction) and
//! the row goes to the back if it still has pairs left. The leg from the
//! previous pair's exit to this pair's entry is flown straight when the
//! polygon allows it, and through a [`DetourStrategy`] otherwise.
//!
//! So a concave field is covered in passes: the first pass takes the
//! western-most pair of every row, the next pass the pairs after those,
//! and so on.

use crate::detour::DetourStrategy;
use crate::error::Result;
use crate::geometry::{Metric, Point};
use crate::polygon::Polygon;
use crate::sweep::SweepRow;
use std::collections::VecDeque;

/// What happened when a pair was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StitchState {
    /// First pair of the route, nothing to connect from
    SelectingFirstPair,
    /// The connecting leg stays inside the field
    ConnectingDirect,
    /// The connecting leg needed waypoints
    Detouring,
    /// The row has no pairs left and leaves the queue
    RowExhausted,
}

/// Stitch `rows` into one ordered list of waypoints.
///
/// Every pair of every row is flown exactly once. Direction alternates
/// with each pair placed, starting west to east. Detour waypoints are
/// polygon vertices and may repeat: two passes can round the same reflex
/// corner.
pub fn stitch_rows(
    polygon: &Polygon,
    rows: &[SweepRow],
    detour: &dyn DetourStrategy,
    metric: Metric,
) -> Result<Vec<Point>> {
    let mut queue: VecDeque<usize> = (0..rows.len()).collect();
    let mut next_pair = vec![0usize; rows.len()];
    let mut route: Vec<Point> = Vec::new();
    let mut eastward = true;

    let mut pass = 1;
    let mut processed = 0;
    let mut pass_len = queue.len();

    while let Some(r) = queue.pop_front() {
        let row = &rows[r];

        if let Some((west, east)) = row.pair(next_pair[r]) {
            let (entry, exit) = if eastward { (west, east) } else { (east, west) };
            let state = place_pair(polygon, &mut route, entry, exit, detour, metric)?;
            log::trace!("row {} pair {}: {:?}", row.index, next_pair[r], state);

            next_pair[r] += 1;
            eastward = !eastward;
        }

        if next_pair[r] < row.pairs() {
            queue.push_back(r);
        } else {
            log::trace!("row {}: {:?}", row.index, StitchState::RowExhausted);
        }

        processed += 1;
        if processed == pass_len {
            log::debug!("stitch pass {} done, {} rows still open", pass, queue.len());
            pass += 1;
            processed = 0;
            pass_len = queue.len();
        }
    }

    Ok(route)
}

/// Append one pair to the route, connecting it to what came before.
fn place_pair(
    polygon: &Polygon,
    route: &mut Vec<Point>,
    entry: Point,
    exit: Point,
    detour: &dyn DetourStrategy,
    metric: Metric,
) -> Result<StitchState> {
    let state = match route.last().copied() {
        None => {
            route.push(entry);
            StitchState::SelectingFirstPair
        }
        Some(last) if polygon.can_see(last, entry) => {
            route.push(entry);
            StitchState::ConnectingDirect
        }
        Some(last) => {
            let path = detour.find_detour(polygon, last, entry, metric)?;
            route.extend(path.into_iter().skip(1));
            StitchState::Detouring
        }
    };

    route.push(exit);
    Ok(state)
}

// ============================================================================
// TESTS
// ============================================================================
