//! This module contains the small geometric value types used to address grid
//! cells: [Point], [Dimension], and [Rectangle]. All of them are immutable,
//! copyable, and usable as map keys.

use serde::{Deserialize, Serialize};

use std::cmp::Ordering;

/// An immutable pair of integer coordinates identifying one cell of a grid.
/// `x` is the column and `y` the row, both counted from zero at the top-left
/// corner.
///
/// Points are ordered in row-major fashion, that is, first by row and then by
/// column. Ordered collections of points therefore iterate in the same order
/// in which the grid is scanned.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Point {
    x: usize,
    y: usize
}

impl Point {

    /// Creates a new point from the given column (`x`) and row (`y`).
    pub fn new(x: usize, y: usize) -> Point {
        Point {
            x,
            y
        }
    }

    /// Gets the column (x-coordinate) of this point.
    pub fn x(&self) -> usize {
        self.x
    }

    /// Gets the row (y-coordinate) of this point.
    pub fn y(&self) -> usize {
        self.y
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Point) -> Ordering {
        self.y.cmp(&other.y).then_with(|| self.x.cmp(&other.x))
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Point) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// An immutable width/height pair describing the extent of a grid.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Dimension {
    width: usize,
    height: usize
}

impl Dimension {

    /// Creates a new dimension from the given width and height.
    pub fn new(width: usize, height: usize) -> Dimension {
        Dimension {
            width,
            height
        }
    }

    /// Gets the width (number of columns).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Gets the height (number of rows).
    pub fn height(&self) -> usize {
        self.height
    }

    /// Gets the total number of cells covered, i.e. `width * height`.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Returns an iterator over all points of the rectangle
    /// `[0, width) × [0, height)` in row-major order.
    pub fn points(&self) -> impl Iterator<Item = Point> {
        let width = self.width;
        (0..self.height)
            .flat_map(move |y| (0..width).map(move |x| Point::new(x, y)))
    }
}

/// An immutable, axis-aligned rectangle given by its top-left corner and its
/// extent. Rectangles derive the set of points they cover and are the
/// construction unit for rectangular scopes.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Rectangle {
    x: usize,
    y: usize,
    width: usize,
    height: usize
}

impl Rectangle {

    /// Creates a new rectangle with the top-left corner at `(x, y)` and the
    /// given width and height.
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Rectangle {
        Rectangle {
            x,
            y,
            width,
            height
        }
    }

    /// Gets the column (x-coordinate) of the top-left corner.
    pub fn x(&self) -> usize {
        self.x
    }

    /// Gets the row (y-coordinate) of the top-left corner.
    pub fn y(&self) -> usize {
        self.y
    }

    /// Gets the width (number of columns) of this rectangle.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Gets the height (number of rows) of this rectangle.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Gets the top-left corner as a [Point].
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Gets the extent of this rectangle as a [Dimension].
    pub fn size(&self) -> Dimension {
        Dimension::new(self.width, self.height)
    }

    /// Returns an iterator over all points covered by this rectangle in
    /// row-major order.
    pub fn points(&self) -> impl Iterator<Item = Point> {
        let x = self.x;
        let width = self.width;
        (self.y..self.y + self.height)
            .flat_map(move |y| (x..x + width).map(move |x| Point::new(x, y)))
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn point_order_is_row_major() {
        let mut points = vec![
            Point::new(1, 1),
            Point::new(0, 2),
            Point::new(2, 0),
            Point::new(0, 1)
        ];
        points.sort();

        assert_eq!(vec![
            Point::new(2, 0),
            Point::new(0, 1),
            Point::new(1, 1),
            Point::new(0, 2)
        ], points);
    }

    #[test]
    fn dimension_area() {
        assert_eq!(1, Dimension::new(1, 1).area());
        assert_eq!(12, Dimension::new(3, 4).area());
        assert_eq!(81, Dimension::new(9, 9).area());
    }

    #[test]
    fn dimension_points_scan_row_major() {
        let points: Vec<Point> = Dimension::new(2, 2).points().collect();

        assert_eq!(vec![
            Point::new(0, 0),
            Point::new(1, 0),
            Point::new(0, 1),
            Point::new(1, 1)
        ], points);
    }

    #[test]
    fn rectangle_points_include_offset() {
        let points: Vec<Point> = Rectangle::new(3, 1, 2, 2).points().collect();

        assert_eq!(vec![
            Point::new(3, 1),
            Point::new(4, 1),
            Point::new(3, 2),
            Point::new(4, 2)
        ], points);
    }

    #[test]
    fn rectangle_accessors() {
        let rectangle = Rectangle::new(3, 6, 3, 3);

        assert_eq!(Point::new(3, 6), rectangle.position());
        assert_eq!(Dimension::new(3, 3), rectangle.size());
    }

    #[test]
    fn rectangle_serde_round_trip() {
        let rectangle = Rectangle::new(0, 3, 3, 3);
        let json = serde_json::to_string(&rectangle).unwrap();
        let parsed: Rectangle = serde_json::from_str(&json).unwrap();

        assert_eq!(rectangle, parsed);
    }
}
