/// Bounding box, centroid and recentering pass
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::geometry::Mesh;

/// Distance of the X range's center from the origin beyond which a mesh counts
/// as off-center.
pub const RECENTER_THRESHOLD: f32 = 5.0;

/// Extent and centroid of a decoded mesh.
///
/// `min`/`max` are reported after recentering when it was applied; `centroid`
/// is always the mean vertex position before any shift.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingInfo {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
    pub centroid: Point3<f32>,
}

impl BoundingInfo {
    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }
}

/// Running per-axis min/max and position sum.
#[derive(Debug, Clone, Copy)]
pub struct BoundsAccumulator {
    min: Point3<f32>,
    max: Point3<f32>,
    sum: Vector3<f64>,
    count: u64,
}

impl BoundsAccumulator {
    pub fn new() -> Self {
        Self {
            min: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
            sum: Vector3::zeros(),
            count: 0,
        }
    }

    pub fn include(&mut self, point: &Point3<f32>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
        self.sum += point.coords.cast::<f64>();
        self.count += 1;
    }

    /// An empty accumulator reports the origin for every field.
    pub fn finish(&self) -> BoundingInfo {
        if self.count == 0 {
            return BoundingInfo {
                min: Point3::origin(),
                max: Point3::origin(),
                centroid: Point3::origin(),
            };
        }
        let mean = self.sum / self.count as f64;
        BoundingInfo {
            min: self.min,
            max: self.max,
            centroid: Point3::from(mean.cast::<f32>()),
        }
    }
}

impl Default for BoundsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<Point3<f32>> for BoundsAccumulator {
    fn from_iter<I: IntoIterator<Item = Point3<f32>>>(iter: I) -> Self {
        let mut acc = Self::new();
        for point in iter {
            acc.include(&point);
        }
        acc
    }
}

/// True when the center of the X range lies more than [`RECENTER_THRESHOLD`]
/// from the origin and the X centroid does not round to zero.
pub fn should_recenter(info: &BoundingInfo) -> bool {
    let center_x = (info.max.x + info.min.x) / 2.0;
    center_x.abs() > RECENTER_THRESHOLD && info.centroid.x.abs().round() != 0.0
}

/// Compute the mesh's bounds and, if `recenter` is allowed and the mesh is
/// off-center, shift every vertex by the negative centroid.
///
/// Returns the reported bounds and whether the shift was applied.
pub fn finish_mesh(mesh: &mut Mesh, recenter: bool) -> (BoundingInfo, bool) {
    let info = mesh.positions().collect::<BoundsAccumulator>().finish();

    if !(recenter && should_recenter(&info)) {
        return (info, false);
    }

    let shift = -info.centroid.coords;
    mesh.translate(&shift);
    let shifted = BoundingInfo {
        min: info.min + shift,
        max: info.max + shift,
        centroid: info.centroid,
    };
    (shifted, true)
}
