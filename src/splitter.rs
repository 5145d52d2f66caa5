use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};
use slog_scope::{debug, trace};

use crate::cell::CellId;
use crate::diff::CellDifference;
use crate::ring::RingIndex;

/// Pending cells plus the in-flight counter, always mutated together
/// under the one lock. The pool is drained only when the queue is empty
/// AND nothing is in flight; a worker about to re-queue children must
/// not be mistaken for completion
struct TaskQueue<E> {
    pending: VecDeque<CellId>,
    in_flight: usize,
    failure: Option<E>,
}

/// Queue/condvar bundle shared by every split worker
struct SplitShared<E> {
    queue: Mutex<TaskQueue<E>>,
    tasks_changed: Condvar,
}

enum CellOutcome<E> {
    Accepted,
    Split,
    Failed(E),
}

struct CellSplitter<'a, F, E> {
    shared: &'a SplitShared<E>,
    index: &'a RingIndex,
    max_level: u8,
    max_points: usize,
    process_result: &'a F,
}

/// Runs the region-difference pass: seeds a complete tiling at
/// `start_level`, then lets `threads` workers pull cells, compute their
/// water remainder against the index and either hand the result to
/// `process_result` or re-queue the cell's children. Returns the first
/// callback error, after the pool has wound down
pub(crate) fn process<F, E>(
    threads: usize,
    start_level: u8,
    max_level: u8,
    max_points: usize,
    index: &RingIndex,
    process_result: F,
) -> Result<(), E>
where
    F: Fn(CellId, CellDifference) -> Result<(), E> + Send + Sync,
    E: Send,
{
    debug_assert!(threads > 0);
    debug_assert!(start_level <= max_level);

    let seeded: VecDeque<CellId> = CellId::cells_on_level(start_level).collect();
    debug!(
        "splitting coastline cells";
        "threads" => threads,
        "seeded" => seeded.len(),
        "start_level" => start_level,
        "max_level" => max_level
    );

    let shared = SplitShared {
        queue: Mutex::new(TaskQueue {
            pending: seeded,
            in_flight: 0,
            failure: None,
        }),
        tasks_changed: Condvar::new(),
    };

    crossbeam::thread::scope(|scope| {
        for i in 0..threads {
            let worker = CellSplitter {
                shared: &shared,
                index,
                max_level,
                max_points,
                process_result: &process_result,
            };

            scope
                .builder()
                .name(format!("coast-split-{}", i))
                .spawn(move |_| worker.run())
                .expect("failed to spawn split worker");
        }
    })
    .expect("split worker panicked");

    match shared.queue.into_inner().failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

impl<'a, F, E> CellSplitter<'a, F, E>
where
    F: Fn(CellId, CellDifference) -> Result<(), E>,
{
    fn run(&self) {
        loop {
            let mut queue = self.shared.queue.lock();
            while queue.pending.is_empty() && queue.in_flight > 0 {
                self.shared.tasks_changed.wait(&mut queue);
            }

            let cell = match queue.pending.pop_front() {
                Some(cell) => cell,
                None => break, // drained
            };
            queue.in_flight += 1;
            drop(queue);

            // geometry runs outside the lock
            let outcome = self.process_cell(cell);

            let mut queue = self.shared.queue.lock();
            match outcome {
                CellOutcome::Accepted => {}
                CellOutcome::Split => queue.pending.extend(cell.children()),
                CellOutcome::Failed(err) => {
                    // first failure wins; dropping the remaining work
                    // lets the pool drain without a cancellation flag
                    queue.pending.clear();
                    if queue.failure.is_none() {
                        queue.failure = Some(err);
                    }
                }
            }
            queue.in_flight -= 1;

            // a single completion can unblock both waiters and the
            // final drained check, so broadcast rather than signal one
            self.shared.tasks_changed.notify_all();
        }
    }

    fn process_cell(&self, cell: CellId) -> CellOutcome<E> {
        let mut diff = CellDifference::new(cell.grid_bounds());
        let bbox = diff.cell_bbox();
        self.index.for_each_in_rect(&bbox, |ring| diff.subtract(ring));

        if cell.level() < self.max_level && diff.points_count() >= self.max_points {
            trace!("cell over point budget"; "cell" => ?cell, "points" => diff.points_count());
            return CellOutcome::Split;
        }

        match (self.process_result)(cell, diff) {
            Ok(()) => CellOutcome::Accepted,
            Err(err) => CellOutcome::Failed(err),
        }
    }
}
