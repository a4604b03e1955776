use crate::strokes::geometry::{bounds_from, BoundingBox, GeometryError, Orientation, Point};

/// One continuous drag, in recording order. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    points: Vec<Point>,
}

impl Stroke {
    pub fn new(points: Vec<Point>) -> Result<Self, GeometryError> {
        if points.is_empty() {
            return Err(GeometryError::EmptyGeometry);
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn start(&self) -> Point {
        self.points[0]
    }

    pub fn bounding_box(&self) -> BoundingBox {
        bounds_from(self.start(), &self.points)
    }

    pub fn orientation(&self) -> Orientation {
        self.bounding_box().orientation()
    }

    pub fn ratio_log(&self) -> f32 {
        self.bounding_box().ratio_log()
    }

    /// Copy of the stroke moved so its own bounding box starts at (0, 0).
    pub fn offset_to_origin(&self) -> Vec<Point> {
        let bbox = self.bounding_box();
        self.points
            .iter()
            .map(|point| Point::new(point.x - bbox.left, point.y - bbox.top))
            .collect()
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Stroke {
        Stroke {
            points: self
                .points
                .iter()
                .map(|point| Point::new(point.x + dx, point.y + dy))
                .collect(),
        }
    }

    pub(crate) fn from_first_point(point: Point) -> Self {
        Self {
            points: vec![point],
        }
    }

    pub(crate) fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    pub(crate) fn last(&self) -> Point {
        self.points[self.points.len() - 1]
    }
}

impl TryFrom<Vec<(f32, f32)>> for Stroke {
    type Error = GeometryError;

    fn try_from(value: Vec<(f32, f32)>) -> Result<Self, Self::Error> {
        Stroke::new(value.into_iter().map(Point::from).collect())
    }
}

/// Strokes drawn in one capture session, in drawing order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Gesture {
    strokes: Vec<Stroke>,
}

impl Gesture {
    pub fn new(strokes: Vec<Stroke>) -> Self {
        Self { strokes }
    }

    /// Build a gesture from raw coordinate lists, rejecting zero-point strokes.
    pub fn from_coords(strokes: Vec<Vec<(f32, f32)>>) -> Result<Self, GeometryError> {
        let strokes = strokes
            .into_iter()
            .map(Stroke::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { strokes })
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn into_strokes(self) -> Vec<Stroke> {
        self.strokes
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn signature(&self) -> ShapeSignature {
        ShapeSignature(self.strokes.iter().map(Stroke::orientation).collect())
    }

    pub fn ratio_logs(&self) -> Vec<f32> {
        self.strokes.iter().map(Stroke::ratio_log).collect()
    }

    /// Every stroke offset independently to its own origin.
    pub fn normalized_strokes(&self) -> Vec<Vec<Point>> {
        self.strokes.iter().map(Stroke::offset_to_origin).collect()
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Gesture {
        Gesture {
            strokes: self
                .strokes
                .iter()
                .map(|stroke| stroke.translated(dx, dy))
                .collect(),
        }
    }

    pub fn to_coords(&self) -> Vec<Vec<(f32, f32)>> {
        self.strokes
            .iter()
            .map(|stroke| stroke.points().iter().copied().map(Into::into).collect())
            .collect()
    }
}

/// Orientation of every stroke, in stroke order. Used as the bucket key of
/// the template index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ShapeSignature(pub Vec<Orientation>);

impl ShapeSignature {
    pub fn orientations(&self) -> &[Orientation] {
        &self.0
    }

    pub fn stroke_count(&self) -> usize {
        self.0.len()
    }
}

impl std::fmt::Display for ShapeSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(empty)");
        }
        for (idx, orientation) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str("+")?;
            }
            write!(f, "{orientation}")?;
        }
        Ok(())
    }
}
