/// Width/height factor a dimension must beat before a stroke stops being
/// considered square.
const ORIENTATION_FACTOR: f32 = 0.7;

/// Dimensions more than this many times smaller than the other one are
/// raised to exactly this fraction before taking the ratio log.
const MAX_DIMENSION_RATIO: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn manhattan_distance(self, other: Point) -> f32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn distance(self, other: Point) -> f32 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

impl From<(f32, f32)> for Point {
    fn from(value: (f32, f32)) -> Self {
        Self {
            x: value.0,
            y: value.1,
        }
    }
}

impl From<Point> for (f32, f32) {
    fn from(value: Point) -> Self {
        (value.x, value.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl BoundingBox {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn orientation(&self) -> Orientation {
        let width = self.width();
        let height = self.height();
        if width * ORIENTATION_FACTOR > height {
            Orientation::Landscape
        } else if height * ORIENTATION_FACTOR > width {
            Orientation::Portrait
        } else {
            Orientation::Square
        }
    }

    /// Natural log of `width / height`.
    ///
    /// Zero dimensions count as `1`, and a dimension more than ten times
    /// smaller than the other is treated as exactly ten times smaller, so
    /// near-perfect horizontal or vertical lines produce stable values.
    pub fn ratio_log(&self) -> f32 {
        let mut width = non_zero(self.width());
        let mut height = non_zero(self.height());
        if width * MAX_DIMENSION_RATIO < height {
            width = height / MAX_DIMENSION_RATIO;
        } else if height * MAX_DIMENSION_RATIO < width {
            height = width / MAX_DIMENSION_RATIO;
        }
        (width / height).ln()
    }
}

fn non_zero(value: f32) -> f32 {
    if value == 0.0 {
        1.0
    } else {
        value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Orientation {
    Landscape,
    Portrait,
    Square,
}

impl Orientation {
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
            Orientation::Square => "square",
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    EmptyGeometry,
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryError::EmptyGeometry => f.write_str("geometry requested on a zero-point stroke"),
        }
    }
}

impl std::error::Error for GeometryError {}

pub fn bounding_box(points: &[Point]) -> Result<BoundingBox, GeometryError> {
    let first = points.first().ok_or(GeometryError::EmptyGeometry)?;
    Ok(bounds_from(*first, points))
}

pub(crate) fn bounds_from(first: Point, points: &[Point]) -> BoundingBox {
    let init = BoundingBox {
        left: first.x,
        right: first.x,
        top: first.y,
        bottom: first.y,
    };
    points.iter().fold(init, |bbox, point| BoundingBox {
        left: bbox.left.min(point.x),
        right: bbox.right.max(point.x),
        top: bbox.top.min(point.y),
        bottom: bbox.bottom.max(point.y),
    })
}

/// Translate `points` so their bounding box' top-left corner sits at the
/// origin.
pub fn offset_to_origin(points: &[Point]) -> Result<Vec<Point>, GeometryError> {
    let bbox = bounding_box(points)?;
    Ok(points
        .iter()
        .map(|point| Point::new(point.x - bbox.left, point.y - bbox.top))
        .collect())
}

pub fn classify_orientation(points: &[Point]) -> Result<Orientation, GeometryError> {
    Ok(bounding_box(points)?.orientation())
}

pub fn ratio_log(points: &[Point]) -> Result<f32, GeometryError> {
    Ok(bounding_box(points)?.ratio_log())
}

/// `true` when every positional pair of ratio logs differs by at most
/// `tolerance`.
pub fn ratio_logs_similar(a: &[f32], b: &[f32], tolerance: f32) -> bool {
    a.iter()
        .zip(b)
        .all(|(ratio_a, ratio_b)| (ratio_a - ratio_b).abs() <= tolerance)
}

/// Largest distance from a point of `from` to its nearest point in `to`.
pub fn directed_hausdorff(from: &[Point], to: &[Point]) -> Result<f32, GeometryError> {
    if from.is_empty() || to.is_empty() {
        return Err(GeometryError::EmptyGeometry);
    }
    Ok(from
        .iter()
        .map(|a| {
            to.iter()
                .map(|b| a.distance(*b))
                .fold(f32::INFINITY, f32::min)
        })
        .fold(0.0, f32::max))
}

pub fn hausdorff_symmetric(a: &[Point], b: &[Point]) -> Result<f32, GeometryError> {
    Ok(directed_hausdorff(a, b)?.max(directed_hausdorff(b, a)?))
}
