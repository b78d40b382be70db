//! # Mesh Geometry
//!
//! CPU-side geometry produced by the OBJ parser and consumed by the scene
//! loader and the extent calculator.
//!
//! ## Layout
//!
//! A parsed mesh is an ordered list of [`GeometryGroup`]s, one per `usemtl`
//! section of the source file. Each group owns a [`VertexBuffers`]: three
//! parallel, flat attribute streams (positions, normals, texture coordinates)
//! describing a non-indexed triangle list. Index `i` in every stream belongs to
//! the same vertex.
//!
//! ## Usage
//!
//! ```rust
//! use diorama::gfx::geometry::{parse_obj, Extents};
//!
//! let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
//! assert_eq!(mesh.vertex_count(), 3);
//!
//! let extents = Extents::of_groups(&mesh.groups).unwrap();
//! assert_eq!(extents.max.x, 1.0);
//! ```

pub mod extents;
pub mod obj;

pub use extents::{CameraFraming, Extents};
pub use obj::{parse_obj, ParseDiagnostics, ParsedMesh};

use crate::gfx::scene::vertex::{Vertex3D, DEFAULT_VERTEX_COLOR};

/// Flat vertex attribute streams for one non-indexed triangle list.
///
/// The streams are filled in lock-step and only exposed read-only afterwards,
/// so they can never drift out of alignment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexBuffers {
    positions: Vec<f32>,
    normals: Vec<f32>,
    tex_coords: Vec<f32>,
    colors: Vec<f32>,
}

impl VertexBuffers {
    /// Create empty buffers
    pub fn new() -> Self {
        Self::default()
    }

    /// Build buffers from already-flattened streams.
    ///
    /// Returns `None` unless positions and normals hold 3 floats per vertex and
    /// texture coordinates hold 2, all for the same vertex count.
    pub fn from_streams(positions: Vec<f32>, normals: Vec<f32>, tex_coords: Vec<f32>) -> Option<Self> {
        if positions.len() % 3 != 0 {
            return None;
        }
        let vertex_count = positions.len() / 3;
        if normals.len() != vertex_count * 3 || tex_coords.len() != vertex_count * 2 {
            return None;
        }

        Some(Self {
            positions,
            normals,
            tex_coords,
            colors: Vec::new(),
        })
    }

    pub(crate) fn push_vertex(
        &mut self,
        position: [f32; 3],
        normal: [f32; 3],
        tex_coord: [f32; 2],
        color: [f32; 3],
    ) {
        self.positions.extend_from_slice(&position);
        self.normals.extend_from_slice(&normal);
        self.tex_coords.extend_from_slice(&tex_coord);
        self.colors.extend_from_slice(&color);
    }

    pub(crate) fn fill_normals(&mut self, normal: [f32; 3]) {
        for chunk in self.normals.chunks_exact_mut(3) {
            chunk.copy_from_slice(&normal);
        }
    }

    pub(crate) fn synthesize_tex_coords(&mut self) {
        for (i, chunk) in self.tex_coords.chunks_exact_mut(2).enumerate() {
            let value = (i % 2) as f32;
            chunk[0] = value;
            chunk[1] = value;
        }
    }

    pub(crate) fn drop_colors(&mut self) {
        self.colors.clear();
    }

    /// Vertex positions, 3 floats per vertex
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Vertex normals, 3 floats per vertex
    pub fn normals(&self) -> &[f32] {
        &self.normals
    }

    /// Texture coordinates, 2 floats per vertex
    pub fn tex_coords(&self) -> &[f32] {
        &self.tex_coords
    }

    /// Per-vertex RGB colours, present only when the source mesh declared them
    pub fn colors(&self) -> Option<&[f32]> {
        if self.colors.is_empty() {
            None
        } else {
            Some(&self.colors)
        }
    }

    /// Number of vertices in the triangle list
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of triangles in the triangle list
    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn color(&self, vertex: usize) -> [f32; 3] {
        match self.colors() {
            Some(c) if c.len() >= vertex * 3 + 3 => {
                [c[vertex * 3], c[vertex * 3 + 1], c[vertex * 3 + 2]]
            }
            _ => DEFAULT_VERTEX_COLOR,
        }
    }

    /// Interleave the streams into the GPU vertex layout
    pub fn to_vertices(&self) -> Vec<Vertex3D> {
        (0..self.vertex_count())
            .map(|i| Vertex3D {
                position: [
                    self.positions[i * 3],
                    self.positions[i * 3 + 1],
                    self.positions[i * 3 + 2],
                ],
                normal: [
                    self.normals[i * 3],
                    self.normals[i * 3 + 1],
                    self.normals[i * 3 + 2],
                ],
                tex_coords: [self.tex_coords[i * 2], self.tex_coords[i * 2 + 1]],
                color: self.color(i),
            })
            .collect()
    }
}

/// One material-tagged section of a mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryGroup {
    /// Material name from the `usemtl` directive that opened the group
    pub material: String,
    /// Object or group name (`o` / `g`) active when the group was opened
    pub object: Option<String>,
    pub buffers: VertexBuffers,
}

impl GeometryGroup {
    pub fn new(material: impl Into<String>, object: Option<String>) -> Self {
        Self {
            material: material.into(),
            object,
            buffers: VertexBuffers::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}
