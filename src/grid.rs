use smallvec::SmallVec;
use std::error::Error;
use std::fmt;

use crate::rooms::{CompassPrimary, GridCoordinate, Room};
use crate::units::{Height, Width};

pub type CoordinateSmallVec = SmallVec<[GridCoordinate; 4]>;

/// Rejected grid construction: a maze needs at least one room in each
/// dimension.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct InvalidDimension {
    pub width: Width,
    pub height: Height,
}

impl fmt::Display for InvalidDimension {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f,
               "invalid grid dimensions {}x{}: width and height must both be at least 1",
               self.width.0,
               self.height.0)
    }
}

impl Error for InvalidDimension {}

/// The room arena. The grid exclusively owns every `Room` in a flat row-major
/// container and is the sole source of truth for room existence and adjacency.
/// Everything else refers to rooms by `GridCoordinate` only.
#[derive(Clone, Debug)]
pub struct Grid {
    width: Width,
    height: Height,
    rooms: Vec<Room>,
}

impl Grid {
    /// Create a width x height grid of fully walled, unvisited rooms.
    pub fn new(width: Width, height: Height) -> Result<Grid, InvalidDimension> {
        if width.0 == 0 || height.0 == 0 {
            return Err(InvalidDimension { width, height });
        }

        let rooms_count = width.0 * height.0;
        let mut rooms = Vec::with_capacity(rooms_count);
        for index in 0..rooms_count {
            let x = (index % width.0) as u32;
            let y = (index / width.0) as u32;
            rooms.push(Room::new(GridCoordinate::new(x, y)));
        }

        Ok(Grid {
            width,
            height,
            rooms,
        })
    }

    #[inline]
    pub fn width(&self) -> Width {
        self.width
    }

    #[inline]
    pub fn height(&self) -> Height {
        self.height
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.rooms.len()
    }

    /// Convert a one dimensional row-major index back to a coordinate.
    /// Total over `0..size()`; panics on anything larger.
    pub fn index_to_coordinate(&self, index: usize) -> GridCoordinate {
        assert!(index < self.size(),
                "room index {} out of range for a grid of {} rooms",
                index,
                self.size());
        let x = (index % self.width.0) as u32;
        let y = (index / self.width.0) as u32;
        GridCoordinate::new(x, y)
    }

    /// Convert a grid coordinate to a one dimensional index in the range
    /// `0..size()`. Returns None if the coordinate lies outside the grid,
    /// which is what makes neighbour lookups at the grid edges safe.
    #[inline]
    pub fn coordinate_to_index(&self, coord: GridCoordinate) -> Option<usize> {
        if self.is_valid_coordinate(coord) {
            Some(coord.y as usize * self.width.0 + coord.x as usize)
        } else {
            None
        }
    }

    /// Is the grid coordinate within the grid's dimensions?
    #[inline]
    pub fn is_valid_coordinate(&self, coord: GridCoordinate) -> bool {
        (coord.x as usize) < self.width.0 && (coord.y as usize) < self.height.0
    }

    /// The room at the given position, or None if out of bounds.
    pub fn room_at(&self, coord: GridCoordinate) -> Option<&Room> {
        self.coordinate_to_index(coord).map(|index| &self.rooms[index])
    }

    /// Read-only view of every room in row-major order.
    #[inline]
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn mark_visited(&mut self, coord: GridCoordinate) {
        let index = self.coordinate_to_index(coord)
            .expect("cannot mark a room outside the grid as visited");
        self.rooms[index].mark_visited();
    }

    /// The completion predicate: does any unvisited room remain?
    pub fn is_fully_visited(&self) -> bool {
        self.rooms.iter().all(Room::is_visited)
    }

    /// Clear the wall on `a` facing `b` and the wall on `b` facing `a`, always
    /// both, so the two rooms stay mirror images of each other.
    ///
    /// Panics unless `a` and `b` are valid, grid-adjacent coordinates. A
    /// caller tripping this has a logic bug; it is not a recoverable
    /// condition.
    pub fn open_passage(&mut self, a: GridCoordinate, b: GridCoordinate) {
        let a_index = self.coordinate_to_index(a)
            .expect("passage endpoint outside the grid");
        let b_index = self.coordinate_to_index(b)
            .expect("passage endpoint outside the grid");

        let direction = match CompassPrimary::between(a, b) {
            Some(direction) => direction,
            None => panic!("rooms {:?} and {:?} are not grid-adjacent", a, b),
        };

        self.rooms[a_index].walls_mut().open(direction);
        self.rooms[b_index].walls_mut().open(direction.opposite());
    }

    /// Clear a single wall flag on the boundary of the grid, where there is no
    /// partner room whose mirror flag would need clearing. Used to carve entry
    /// and exit doorways after generation.
    ///
    /// Panics if a room does exist in that direction - paired walls must go
    /// through `open_passage`.
    pub fn open_boundary_wall(&mut self, coord: GridCoordinate, direction: CompassPrimary) {
        let index = self.coordinate_to_index(coord)
            .expect("boundary room outside the grid");

        let neighbour_exists = coord.offset(direction)
            .map_or(false, |neighbour| self.is_valid_coordinate(neighbour));
        assert!(!neighbour_exists,
                "wall {:?} of room {:?} is shared with a neighbour, not a boundary wall",
                direction,
                coord);

        self.rooms[index].walls_mut().open(direction);
    }

    /// Rooms adjacent to `coord` in the four cardinal directions, examined in
    /// the canonical North, East, South, West order. Out-of-bounds positions
    /// are excluded entirely - absence is never a candidate.
    pub fn neighbours(&self, coord: GridCoordinate) -> CoordinateSmallVec {
        CompassPrimary::ALL
            .iter()
            .filter_map(|&direction| coord.offset(direction))
            .filter(|&neighbour| self.is_valid_coordinate(neighbour))
            .collect()
    }

    /// The subset of `neighbours` whose rooms have not been visited yet.
    pub fn unvisited_neighbours(&self, coord: GridCoordinate) -> CoordinateSmallVec {
        self.neighbours(coord)
            .iter()
            .cloned()
            .filter(|&neighbour| {
                let index = self.coordinate_to_index(neighbour)
                    .expect("neighbours only yields in-bounds coordinates");
                !self.rooms[index].is_visited()
            })
            .collect()
    }

    pub fn iter(&self) -> RoomCoordinateIter {
        RoomCoordinateIter {
            current_room_number: 0,
            row_width: self.width.0,
            rooms_count: self.size(),
        }
    }
}

/// Walks every room coordinate in row-major order.
#[derive(Debug, Copy, Clone)]
pub struct RoomCoordinateIter {
    current_room_number: usize,
    row_width: usize,
    rooms_count: usize,
}

impl Iterator for RoomCoordinateIter {
    type Item = GridCoordinate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_room_number < self.rooms_count {
            let x = (self.current_room_number % self.row_width) as u32;
            let y = (self.current_room_number / self.row_width) as u32;
            self.current_room_number += 1;
            Some(GridCoordinate::new(x, y))
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.rooms_count - self.current_room_number;
        (remaining, Some(remaining))
    }
}

impl<'a> IntoIterator for &'a Grid {
    type Item = GridCoordinate;
    type IntoIter = RoomCoordinateIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut output = String::new();

        for y in 0..self.height.0 {
            // Each room draws its own north wall; the final row adds the
            // southern grid boundary afterwards.
            let mut top = String::new();
            let mut middle = String::new();

            for x in 0..self.width.0 {
                let coord = GridCoordinate::new(x as u32, y as u32);
                let walls = self.room_at(coord)
                    .expect("iterating within own dimensions")
                    .walls();

                top.push('+');
                top.push_str(if walls.is_closed(CompassPrimary::North) {
                    "---"
                } else {
                    "   "
                });

                middle.push(if walls.is_closed(CompassPrimary::West) {
                    '|'
                } else {
                    ' '
                });
                middle.push_str("   ");

                if x == self.width.0 - 1 {
                    top.push('+');
                    middle.push(if walls.is_closed(CompassPrimary::East) {
                        '|'
                    } else {
                        ' '
                    });
                }
            }

            output.push_str(&top);
            output.push('\n');
            output.push_str(&middle);
            output.push('\n');
        }

        for x in 0..self.width.0 {
            let coord = GridCoordinate::new(x as u32, (self.height.0 - 1) as u32);
            let walls = self.room_at(coord)
                .expect("iterating within own dimensions")
                .walls();
            output.push('+');
            output.push_str(if walls.is_closed(CompassPrimary::South) {
                "---"
            } else {
                "   "
            });
        }
        output.push('+');
        output.push('\n');

        write!(f, "{}", output)
    }
}
