//! Colored point sets keyed by position.

use std::collections::HashMap;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// RGBA color sample.
pub type Rgba = [u8; 4];

/// One point of a [`PointCloud`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CloudPoint {
    pub position: Point3<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgba>,
}

type PositionKey = [u64; 3];

fn position_key(p: &Point3<f64>) -> PositionKey {
    // +0.0 and -0.0 are the same position
    let bits = |v: f64| if v == 0.0 { 0u64 } else { v.to_bits() };
    [bits(p.x), bits(p.y), bits(p.z)]
}

/// Set of colored 3D points, unique by position.
///
/// Setting an already present position overwrites its color. Iteration
/// follows first-insertion order so that downstream neighbor searches are
/// deterministic for a fixed input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<CloudPoint>", into = "Vec<CloudPoint>")]
pub struct PointCloud {
    points: Vec<CloudPoint>,
    index: HashMap<PositionKey, usize>,
}

impl PointCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Insert a point, overwriting the color if the position already exists.
    pub fn set(&mut self, position: Point3<f64>, color: Option<Rgba>) {
        match self.index.get(&position_key(&position)) {
            Some(&i) => self.points[i].color = color,
            None => {
                self.index.insert(position_key(&position), self.points.len());
                self.points.push(CloudPoint { position, color });
            }
        }
    }

    pub fn insert(&mut self, point: CloudPoint) {
        self.set(point.position, point.color);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, position: &Point3<f64>) -> Option<&CloudPoint> {
        self.index
            .get(&position_key(position))
            .map(|&i| &self.points[i])
    }

    pub fn contains(&self, position: &Point3<f64>) -> bool {
        self.index.contains_key(&position_key(position))
    }

    pub fn points(&self) -> &[CloudPoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CloudPoint> {
        self.points.iter()
    }

    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.points.iter().map(|p| p.position).collect()
    }

    /// Axis-aligned extent as `(min, max)` corners; `None` for an empty cloud.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.points.first()?.position;
        Some(self.points.iter().skip(1).fold((first, first), |(lo, hi), p| {
            (lo.inf(&p.position), hi.sup(&p.position))
        }))
    }

    pub fn centroid(&self) -> Option<Point3<f64>> {
        if self.points.is_empty() {
            return None;
        }
        let sum = self
            .points
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.position.coords);
        Some(Point3::from(sum / self.points.len() as f64))
    }
}

impl From<Vec<CloudPoint>> for PointCloud {
    fn from(points: Vec<CloudPoint>) -> Self {
        let mut cloud = PointCloud::with_capacity(points.len());
        for p in points {
            cloud.insert(p);
        }
        cloud
    }
}

impl From<PointCloud> for Vec<CloudPoint> {
    fn from(cloud: PointCloud) -> Self {
        cloud.points
    }
}

impl FromIterator<CloudPoint> for PointCloud {
    fn from_iter<I: IntoIterator<Item = CloudPoint>>(iter: I) -> Self {
        let mut cloud = PointCloud::new();
        for p in iter {
            cloud.insert(p);
        }
        cloud
    }
}

impl<'a> IntoIterator for &'a PointCloud {
    type Item = &'a CloudPoint;
    type IntoIter = std::slice::Iter<'a, CloudPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
