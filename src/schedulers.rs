use log::debug;

use crate::generators::RecursiveBacktracker;
use crate::grid::Grid;
use crate::units::StepsPerTick;

/// Drive a generator to completion: execute `steps_per_tick` generator steps,
/// hand the grid snapshot to `on_progress`, re-check the completion predicate,
/// and repeat. Once every room is visited `on_complete` fires exactly once and
/// the loop returns.
///
/// The scheduler holds no generation logic - it is sequencing glue. Observers
/// only ever see the grid between whole steps, never mid-mutation. The same
/// contract can be honoured by any other driving loop (a timer, a frame
/// callback); this is the synchronous rendition.
///
/// Panics if `steps_per_tick` is zero.
pub fn run_to_completion<P, C>(grid: &mut Grid,
                               generator: &mut RecursiveBacktracker,
                               steps_per_tick: StepsPerTick,
                               mut on_progress: P,
                               on_complete: C)
    where P: FnMut(&Grid, &RecursiveBacktracker),
          C: FnOnce(&Grid)
{
    let StepsPerTick(steps) = steps_per_tick;
    assert!(steps >= 1, "steps_per_tick must be at least 1");

    let mut ticks = 0u64;
    loop {
        for _ in 0..steps {
            generator.step(grid);
        }
        ticks += 1;

        on_progress(grid, generator);

        if grid.is_fully_visited() {
            debug!("maze complete after {} ticks of {} steps", ticks, steps);
            on_complete(grid);
            return;
        }

        // A dead walk with unvisited rooms left would tick forever. It cannot
        // happen when the generator was built on this grid, so treat it as a
        // caller bug rather than spinning.
        assert!(generator.current().is_some(),
                "generator walk terminated with unvisited rooms remaining");
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::generators::RecursiveBacktracker;
    use crate::units::{Height, Width};

    fn grid(w: usize, h: usize) -> Grid {
        Grid::new(Width(w), Height(h)).expect("test grid dimensions are valid")
    }

    fn visited_count(g: &Grid) -> usize {
        g.rooms().iter().filter(|room| room.is_visited()).count()
    }

    #[test]
    fn completion_hook_fires_exactly_once_after_progress() {
        let mut g = grid(5, 5);
        let mut walk = RecursiveBacktracker::with_seed(&mut g, 21);

        let mut progress_calls = 0usize;
        let mut complete_calls = 0usize;
        run_to_completion(&mut g,
                          &mut walk,
                          StepsPerTick(3),
                          |_, _| progress_calls += 1,
                          |finished| {
                              complete_calls += 1;
                              assert!(finished.is_fully_visited());
                          });

        assert_eq!(complete_calls, 1);
        assert!(progress_calls >= 1);
        assert!(g.is_fully_visited());
    }

    #[test]
    fn batches_visit_at_most_steps_per_tick_new_rooms() {
        let steps = 4;
        let mut g = grid(6, 6);
        let mut walk = RecursiveBacktracker::with_seed(&mut g, 5);

        let mut previous = visited_count(&g);
        run_to_completion(&mut g,
                          &mut walk,
                          StepsPerTick(steps),
                          |snapshot, _| {
                              let now = visited_count(snapshot);
                              assert!(now - previous <= steps);
                              previous = now;
                          },
                          |_| {});
    }

    #[test]
    fn observer_sees_the_active_room_while_running() {
        let mut g = grid(4, 4);
        let mut walk = RecursiveBacktracker::with_seed(&mut g, 13);

        let mut saw_a_current_room = false;
        run_to_completion(&mut g,
                          &mut walk,
                          StepsPerTick(1),
                          |snapshot, generator| {
                              if let Some(current) = generator.current() {
                                  assert!(snapshot.room_at(current)
                                      .expect("current room is always in bounds")
                                      .is_visited());
                                  saw_a_current_room = true;
                              }
                          },
                          |_| {});
        assert!(saw_a_current_room);
    }

    #[test]
    fn single_room_grid_finishes_on_the_first_tick() {
        let mut g = grid(1, 1);
        let mut walk = RecursiveBacktracker::with_seed(&mut g, 0);

        let mut progress_calls = 0usize;
        let mut complete_calls = 0usize;
        run_to_completion(&mut g,
                          &mut walk,
                          StepsPerTick(1),
                          |_, _| progress_calls += 1,
                          |_| complete_calls += 1);

        // one observation frame, then done; no wall was ever opened
        assert_eq!(progress_calls, 1);
        assert_eq!(complete_calls, 1);
        assert!(g.rooms()[0].walls().is_fully_closed());
    }

    #[test]
    fn large_batches_finish_in_one_tick() {
        let mut g = grid(3, 3);
        let mut walk = RecursiveBacktracker::with_seed(&mut g, 17);

        let mut progress_calls = 0usize;
        run_to_completion(&mut g,
                          &mut walk,
                          StepsPerTick(10_000),
                          |_, _| progress_calls += 1,
                          |_| {});
        assert_eq!(progress_calls, 1);
        assert!(g.is_fully_visited());
    }

    #[test]
    #[should_panic(expected = "at least 1")]
    fn zero_steps_per_tick_is_rejected() {
        let mut g = grid(2, 2);
        let mut walk = RecursiveBacktracker::with_seed(&mut g, 1);
        run_to_completion(&mut g, &mut walk, StepsPerTick(0), |_, _| {}, |_| {});
    }
}
