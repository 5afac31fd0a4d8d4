/// Flat-shaded triangle mesh buffers
use nalgebra::{Point3, Vector3};

/// Floats per facet in each flat buffer (3 vertices x 3 components)
pub const FLOATS_PER_FACET: usize = 9;

/// One triangle as read from a file: a normal and three vertex positions.
/// Only lives for one iteration of a parse loop before being flattened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Facet {
    pub normal: Vector3<f32>,
    pub vertices: [Point3<f32>; 3],
}

impl Facet {
    /// Build from the twelve floats in file order: normal, then three vertices.
    pub fn from_floats(values: &[f32; 12]) -> Self {
        let point = |i: usize| Point3::new(values[i], values[i + 1], values[i + 2]);
        Self {
            normal: Vector3::new(values[0], values[1], values[2]),
            vertices: [point(3), point(6), point(9)],
        }
    }
}

/// Decoded mesh as parallel flat buffers.
///
/// `normals` repeats each facet's normal for its three vertices, and `colors`,
/// when present, has the same shape with components in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    pub vertices: Vec<f32>,
    pub normals: Vec<f32>,
    pub colors: Option<Vec<f32>>,
    pub alpha: Option<f32>,
}

impl Mesh {
    pub fn with_capacity(facets: usize) -> Self {
        let floats = facets * FLOATS_PER_FACET;
        Self {
            vertices: Vec::with_capacity(floats),
            normals: Vec::with_capacity(floats),
            colors: None,
            alpha: None,
        }
    }

    /// Like [`Mesh::with_capacity`], with a color buffer and mesh-wide alpha.
    pub fn with_colors(facets: usize, alpha: f32) -> Self {
        Self {
            colors: Some(Vec::with_capacity(facets * FLOATS_PER_FACET)),
            alpha: Some(alpha),
            ..Self::with_capacity(facets)
        }
    }

    /// Flatten a facet into the buffers. `color` is only recorded when the mesh
    /// carries a color buffer.
    pub fn push_facet(&mut self, facet: &Facet, color: Option<[f32; 3]>) {
        for vertex in &facet.vertices {
            self.vertices.extend_from_slice(&[vertex.x, vertex.y, vertex.z]);
            self.normals
                .extend_from_slice(&[facet.normal.x, facet.normal.y, facet.normal.z]);
            if let (Some(colors), Some(rgb)) = (self.colors.as_mut(), color) {
                colors.extend_from_slice(&rgb);
            }
        }
    }

    pub fn facet_count(&self) -> usize {
        self.vertices.len() / FLOATS_PER_FACET
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn has_colors(&self) -> bool {
        self.colors.is_some()
    }

    /// Vertex positions in buffer order.
    pub fn positions(&self) -> impl Iterator<Item = Point3<f32>> + '_ {
        self.vertices
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
    }

    /// Shift every vertex by `offset`.
    pub fn translate(&mut self, offset: &Vector3<f32>) {
        for position in self.vertices.chunks_exact_mut(3) {
            position[0] += offset.x;
            position[1] += offset.y;
            position[2] += offset.z;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_facet() -> Facet {
        Facet::from_floats(&[
            0.0, 0.0, 1.0, //
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0,
        ])
    }

    #[test]
    fn test_push_facet_repeats_normal() {
        let mut mesh = Mesh::with_capacity(1);
        mesh.push_facet(&unit_facet(), None);

        assert_eq!(mesh.vertices, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(mesh.normals, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        assert_eq!(mesh.facet_count(), 1);
        assert_eq!(mesh.vertex_count(), 3);
        assert!(!mesh.has_colors());
    }

    #[test]
    fn test_colors_follow_vertex_shape() {
        let mut mesh = Mesh::with_colors(2, 0.5);
        mesh.push_facet(&unit_facet(), Some([1.0, 0.0, 0.5]));
        mesh.push_facet(&unit_facet(), Some([0.0, 1.0, 0.0]));

        let colors = mesh.colors.as_ref().unwrap();
        assert_eq!(colors.len(), mesh.vertices.len());
        assert_eq!(&colors[..3], &[1.0, 0.0, 0.5]);
        assert_eq!(&colors[15..], &[0.0, 1.0, 0.0]);
        assert_eq!(mesh.alpha, Some(0.5));
    }

    #[test]
    fn test_translate() {
        let mut mesh = Mesh::with_capacity(1);
        mesh.push_facet(&unit_facet(), None);
        mesh.translate(&Vector3::new(-1.0, 2.0, 0.5));

        let positions: Vec<_> = mesh.positions().collect();
        assert_eq!(positions[1], Point3::new(0.0, 2.0, 0.5));
        assert_eq!(mesh.normals[2], 1.0);
    }
}
