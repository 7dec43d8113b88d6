use log::trace;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::grid::Grid;
use crate::rooms::{CompassPrimary, GridCoordinate};

/// Pick one of the in-bounds, unvisited rooms adjacent to `from`, uniformly at
/// random. Returns None when every in-bounds neighbour has been visited.
/// An out-of-bounds position is simply absent - it never enters the draw.
pub fn random_unvisited_neighbour<R: Rng>(grid: &Grid,
                                          from: GridCoordinate,
                                          rng: &mut R)
                                          -> Option<GridCoordinate> {
    let candidates = grid.unvisited_neighbours(from);
    candidates.choose(rng).cloned()
}

/// What a single generator step did.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum StepOutcome {
    /// Carved a passage into a fresh room, which is now the current room.
    Advanced(GridCoordinate),
    /// Dead end: popped the stack back to an earlier branch point.
    Backtracked(GridCoordinate),
    /// The stack is empty and there is nowhere left to go; the walk is over.
    Terminated,
}

/// The randomised depth-first walk that carves a perfect maze: keep moving
/// into random unvisited neighbours, opening walls as you go, and back up
/// along an explicit stack whenever you hit a dead end.
///
/// The walk holds only coordinates into the grid's room arena, never rooms.
/// The stack can never grow past `grid.size()` entries because a room is
/// pushed at most once, when it is first left behind.
pub struct RecursiveBacktracker {
    current: Option<GridCoordinate>,
    stack: Vec<GridCoordinate>,
    rng: StdRng,
}

impl RecursiveBacktracker {
    /// Start a walk at the room at index 0 with a randomly seeded generator.
    pub fn new(grid: &mut Grid) -> RecursiveBacktracker {
        RecursiveBacktracker::with_start(grid, GridCoordinate::new(0, 0), StdRng::from_entropy())
    }

    /// Start a walk at the room at index 0 with a fixed seed. Identical seed
    /// and grid dimensions reproduce an identical maze.
    pub fn with_seed(grid: &mut Grid, seed: u64) -> RecursiveBacktracker {
        RecursiveBacktracker::with_start(grid,
                                         GridCoordinate::new(0, 0),
                                         StdRng::seed_from_u64(seed))
    }

    /// Start a walk at a designated room. The start room is marked visited
    /// immediately, before any step runs; the stack begins empty.
    ///
    /// Panics if `start` lies outside the grid.
    pub fn with_start(grid: &mut Grid, start: GridCoordinate, rng: StdRng) -> RecursiveBacktracker {
        assert!(grid.is_valid_coordinate(start),
                "start room {:?} lies outside the grid",
                start);
        grid.mark_visited(start);
        RecursiveBacktracker {
            current: Some(start),
            stack: Vec::new(),
            rng,
        }
    }

    /// The walk's active room. None once the walk has terminated.
    #[inline]
    pub fn current(&self) -> Option<GridCoordinate> {
        self.current
    }

    #[inline]
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// One atomic unit of work. Either advances into a random unvisited
    /// neighbour (marking it visited, pushing the old room and opening the
    /// wall pair between them), or backtracks by popping the stack, or - with
    /// an empty stack and no candidates - terminates by dropping the current
    /// room. A terminated walk stays terminated; further steps do nothing.
    pub fn step(&mut self, grid: &mut Grid) -> StepOutcome {
        let current = match self.current {
            Some(coord) => coord,
            None => return StepOutcome::Terminated,
        };

        if let Some(next) = random_unvisited_neighbour(grid, current, &mut self.rng) {
            grid.mark_visited(next);
            self.stack.push(current);
            grid.open_passage(current, next);
            self.current = Some(next);
            trace!("carved {:?} -> {:?}", current, next);
            StepOutcome::Advanced(next)
        } else if let Some(branch_point) = self.stack.pop() {
            self.current = Some(branch_point);
            trace!("dead end at {:?}, backtracked to {:?}", current, branch_point);
            StepOutcome::Backtracked(branch_point)
        } else {
            self.current = None;
            trace!("walk finished at {:?}", current);
            StepOutcome::Terminated
        }
    }
}

/// Apply the recursive backtracker maze generation algorithm to a grid in one
/// synchronous sweep, stepping until the walk dies out. For frame-by-frame
/// generation drive a `RecursiveBacktracker` through `schedulers` instead.
pub fn recursive_backtracker(grid: &mut Grid) {
    let mut walk = RecursiveBacktracker::new(grid);
    while walk.step(grid) != StepOutcome::Terminated {}
}

/// Cosmetic finishing step: open one boundary wall on the first room (its
/// west side) and one on the last room (its east side) as a designated entry
/// and exit. Applied once, after generation - never interleaved with steps.
pub fn carve_doorways(grid: &mut Grid) {
    let first = grid.index_to_coordinate(0);
    let last = grid.index_to_coordinate(grid.size() - 1);
    grid.open_boundary_wall(first, CompassPrimary::West);
    grid.open_boundary_wall(last, CompassPrimary::East);
}

#[cfg(test)]
mod tests {

    use petgraph::unionfind::UnionFind;
    use quickcheck::quickcheck;

    use super::*;
    use crate::units::{Height, Width};

    fn grid(w: usize, h: usize) -> Grid {
        Grid::new(Width(w), Height(h)).expect("test grid dimensions are valid")
    }

    /// Every open passage as an index pair, derived from the east/south wall
    /// flags so each passage is seen exactly once.
    fn open_passages(g: &Grid) -> Vec<(usize, usize)> {
        let mut passages = Vec::new();
        for room in g.rooms() {
            let coord = room.coordinate();
            for &dir in &[CompassPrimary::East, CompassPrimary::South] {
                if !room.walls().is_closed(dir) {
                    if let Some(neighbour) = coord.offset(dir) {
                        if let (Some(a), Some(b)) = (g.coordinate_to_index(coord),
                                                     g.coordinate_to_index(neighbour)) {
                            passages.push((a, b));
                        }
                    }
                }
            }
        }
        passages
    }

    fn is_spanning_tree(g: &Grid) -> bool {
        let rooms_count = g.size();
        let passages = open_passages(g);
        if passages.len() != rooms_count - 1 {
            return false;
        }

        // every union must merge two distinct sets, otherwise there is a cycle
        let mut forest = UnionFind::<usize>::new(rooms_count);
        for &(a, b) in &passages {
            if !forest.union(a, b) {
                return false;
            }
        }

        // n-1 acyclic edges over n vertices must already be connected,
        // but check anyway
        (1..rooms_count).all(|index| forest.equiv(0, index))
    }

    #[test]
    fn every_room_is_reached() {
        for &(w, h) in &[(1, 1), (2, 2), (3, 5), (8, 8), (20, 20)] {
            let mut g = grid(w, h);
            recursive_backtracker(&mut g);
            assert!(g.is_fully_visited(), "unvisited rooms left in a {}x{} grid", w, h);
        }
    }

    #[test]
    fn carved_passages_form_a_spanning_tree() {
        let mut g = grid(12, 9);
        recursive_backtracker(&mut g);
        assert!(is_spanning_tree(&g));
    }

    #[test]
    fn identical_seeds_rebuild_identical_mazes() {
        let mut first = grid(15, 15);
        let mut second = grid(15, 15);

        let mut first_walk = RecursiveBacktracker::with_seed(&mut first, 0xCAFE);
        let mut second_walk = RecursiveBacktracker::with_seed(&mut second, 0xCAFE);
        while first_walk.step(&mut first) != StepOutcome::Terminated {}
        while second_walk.step(&mut second) != StepOutcome::Terminated {}

        assert_eq!(open_passages(&first), open_passages(&second));
    }

    #[test]
    fn different_seeds_usually_differ() {
        let mut first = grid(15, 15);
        let mut second = grid(15, 15);

        let mut first_walk = RecursiveBacktracker::with_seed(&mut first, 1);
        let mut second_walk = RecursiveBacktracker::with_seed(&mut second, 2);
        while first_walk.step(&mut first) != StepOutcome::Terminated {}
        while second_walk.step(&mut second) != StepOutcome::Terminated {}

        // a 15x15 grid has far too many spanning trees for a collision
        assert_ne!(open_passages(&first), open_passages(&second));
    }

    #[test]
    fn three_by_one_corridor_end_to_end() {
        let mut g = grid(3, 1);
        let mut walk = RecursiveBacktracker::with_seed(&mut g, 7);

        assert_eq!(walk.current(), Some(GridCoordinate::new(0, 0)));
        assert!(g.room_at(GridCoordinate::new(0, 0)).unwrap().is_visited());

        while walk.step(&mut g) != StepOutcome::Terminated {}

        // the only possible spanning tree of a corridor
        assert_eq!(open_passages(&g), vec![(0, 1), (1, 2)]);
        assert!(g.is_fully_visited());
        assert_eq!(walk.current(), None);
        assert_eq!(walk.stack_depth(), 0);
    }

    #[test]
    fn single_room_grid_is_trivially_complete() {
        let mut g = grid(1, 1);
        let mut walk = RecursiveBacktracker::with_seed(&mut g, 0);

        // visited at construction, before any step
        assert!(g.is_fully_visited());

        // the first step terminates the walk without touching a wall
        assert_eq!(walk.step(&mut g), StepOutcome::Terminated);
        assert!(g.rooms()[0].walls().is_fully_closed());
        assert_eq!(walk.current(), None);
    }

    #[test]
    fn terminated_walks_stay_terminated() {
        let mut g = grid(2, 1);
        let mut walk = RecursiveBacktracker::with_seed(&mut g, 3);
        while walk.step(&mut g) != StepOutcome::Terminated {}

        let snapshot = open_passages(&g);
        assert_eq!(walk.step(&mut g), StepOutcome::Terminated);
        assert_eq!(walk.step(&mut g), StepOutcome::Terminated);
        assert_eq!(open_passages(&g), snapshot);
    }

    #[test]
    fn stack_stays_within_the_room_count() {
        let mut g = grid(6, 6);
        let mut walk = RecursiveBacktracker::with_seed(&mut g, 99);
        loop {
            assert!(walk.stack_depth() <= g.size());
            if walk.step(&mut g) == StepOutcome::Terminated {
                break;
            }
        }
    }

    #[test]
    fn walks_can_start_anywhere() {
        let mut g = grid(4, 4);
        let start = GridCoordinate::new(2, 3);
        let mut walk =
            RecursiveBacktracker::with_start(&mut g, start, StdRng::seed_from_u64(11));

        assert!(g.room_at(start).unwrap().is_visited());
        while walk.step(&mut g) != StepOutcome::Terminated {}
        assert!(g.is_fully_visited());
        assert!(is_spanning_tree(&g));
    }

    #[test]
    #[should_panic(expected = "outside the grid")]
    fn starting_outside_the_grid_panics() {
        let mut g = grid(2, 2);
        let _ = RecursiveBacktracker::with_start(&mut g,
                                                 GridCoordinate::new(5, 5),
                                                 StdRng::seed_from_u64(0));
    }

    #[test]
    fn doorways_open_the_outer_corners() {
        let mut g = grid(4, 3);
        recursive_backtracker(&mut g);
        carve_doorways(&mut g);

        let first = g.index_to_coordinate(0);
        let last = g.index_to_coordinate(g.size() - 1);
        assert!(!g.room_at(first).unwrap().walls().is_closed(CompassPrimary::West));
        assert!(!g.room_at(last).unwrap().walls().is_closed(CompassPrimary::East));

        // doorways are boundary walls, so the passage count is untouched
        assert_eq!(open_passages(&g).len(), g.size() - 1);
    }

    quickcheck! {
        fn any_small_grid_becomes_a_perfect_maze(w: u8, h: u8, seed: u64) -> bool {
            let width = (w % 8) as usize + 1;
            let height = (h % 8) as usize + 1;
            let mut g = grid(width, height);
            let mut walk = RecursiveBacktracker::with_seed(&mut g, seed);
            while walk.step(&mut g) != StepOutcome::Terminated {}

            g.is_fully_visited() && is_spanning_tree(&g)
        }
    }
}
