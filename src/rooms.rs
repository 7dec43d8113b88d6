use std::convert::From;

#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub struct GridCoordinate {
    pub x: u32,
    pub y: u32,
}

impl GridCoordinate {
    pub fn new(x: u32, y: u32) -> GridCoordinate {
        GridCoordinate { x, y }
    }

    /// Creates a new `GridCoordinate` offset 1 room away in the given direction.
    /// Returns None if the coordinate is not representable (x or y would drop
    /// below zero). Whether the offset lands inside a particular grid is the
    /// grid's own business.
    pub fn offset(self, direction: CompassPrimary) -> Option<GridCoordinate> {
        let GridCoordinate { x, y } = self;
        match direction {
            CompassPrimary::North => {
                if y > 0 {
                    Some(GridCoordinate { x, y: y - 1 })
                } else {
                    None
                }
            }
            CompassPrimary::East => Some(GridCoordinate { x: x + 1, y }),
            CompassPrimary::South => Some(GridCoordinate { x, y: y + 1 }),
            CompassPrimary::West => {
                if x > 0 {
                    Some(GridCoordinate { x: x - 1, y })
                } else {
                    None
                }
            }
        }
    }
}

impl From<(u32, u32)> for GridCoordinate {
    fn from(x_y_pair: (u32, u32)) -> GridCoordinate {
        GridCoordinate::new(x_y_pair.0, x_y_pair.1)
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum CompassPrimary {
    North,
    East,
    South,
    West,
}

impl CompassPrimary {
    /// The canonical order in which neighbouring rooms are examined.
    pub const ALL: [CompassPrimary; 4] = [CompassPrimary::North,
                                          CompassPrimary::East,
                                          CompassPrimary::South,
                                          CompassPrimary::West];

    pub fn opposite(self) -> CompassPrimary {
        match self {
            CompassPrimary::North => CompassPrimary::South,
            CompassPrimary::East => CompassPrimary::West,
            CompassPrimary::South => CompassPrimary::North,
            CompassPrimary::West => CompassPrimary::East,
        }
    }

    /// The direction leading from `a` to `b`, decided purely arithmetically
    /// from the coordinate deltas. Returns None unless the two coordinates are
    /// grid-adjacent (Manhattan distance exactly 1).
    pub fn between(a: GridCoordinate, b: GridCoordinate) -> Option<CompassPrimary> {
        let horizontal = i64::from(b.x) - i64::from(a.x);
        let vertical = i64::from(b.y) - i64::from(a.y);
        match (horizontal, vertical) {
            (1, 0) => Some(CompassPrimary::East),
            (-1, 0) => Some(CompassPrimary::West),
            (0, 1) => Some(CompassPrimary::South),
            (0, -1) => Some(CompassPrimary::North),
            _ => None,
        }
    }
}

/// The four wall flags of one room. A `true` flag means the wall is present
/// and the passage closed.
///
/// Walls between two rooms are always toggled as a pair, so the flags are only
/// mutable from within the crate - the grid keeps the mirror invariant.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct Walls {
    north: bool,
    east: bool,
    south: bool,
    west: bool,
}

impl Walls {
    pub fn closed() -> Walls {
        Walls {
            north: true,
            east: true,
            south: true,
            west: true,
        }
    }

    pub fn is_closed(&self, direction: CompassPrimary) -> bool {
        match direction {
            CompassPrimary::North => self.north,
            CompassPrimary::East => self.east,
            CompassPrimary::South => self.south,
            CompassPrimary::West => self.west,
        }
    }

    pub fn is_fully_closed(&self) -> bool {
        self.north && self.east && self.south && self.west
    }

    pub(crate) fn open(&mut self, direction: CompassPrimary) {
        match direction {
            CompassPrimary::North => self.north = false,
            CompassPrimary::East => self.east = false,
            CompassPrimary::South => self.south = false,
            CompassPrimary::West => self.west = false,
        }
    }
}

/// One cell of the grid: a fixed coordinate, four wall flags and a visited
/// marker. Rooms are created fully walled and unvisited, live in the grid's
/// arena for the whole run and are only ever mutated in place.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct Room {
    coordinate: GridCoordinate,
    walls: Walls,
    visited: bool,
}

impl Room {
    pub(crate) fn new(coordinate: GridCoordinate) -> Room {
        Room {
            coordinate,
            walls: Walls::closed(),
            visited: false,
        }
    }

    #[inline]
    pub fn coordinate(&self) -> GridCoordinate {
        self.coordinate
    }

    #[inline]
    pub fn walls(&self) -> &Walls {
        &self.walls
    }

    #[inline]
    pub fn is_visited(&self) -> bool {
        self.visited
    }

    pub(crate) fn mark_visited(&mut self) {
        self.visited = true;
    }

    pub(crate) fn walls_mut(&mut self) -> &mut Walls {
        &mut self.walls
    }
}
