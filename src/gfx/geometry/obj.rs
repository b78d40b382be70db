//! Wavefront OBJ parsing
//!
//! Expands OBJ's shared-vertex indexing into flat, non-indexed triangle lists,
//! one [`GeometryGroup`] per `usemtl` section. Parsing is best-effort: a
//! malformed line is skipped and counted, never fatal for the document.

use super::{GeometryGroup, VertexBuffers};

/// Material name used for faces that appear before any `usemtl`
pub const DEFAULT_MATERIAL: &str = "default";

/// Normal assigned to every vertex of a mesh that declares no `vn` lines
pub const FALLBACK_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];

const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

/// Counters collected while parsing a text asset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseDiagnostics {
    /// Lines with a known keyword whose arguments could not be parsed
    pub skipped_lines: usize,
    /// Lines whose keyword is not understood (ignored, not an error)
    pub unknown_directives: usize,
}

/// Result of parsing one OBJ document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedMesh {
    pub groups: Vec<GeometryGroup>,
    /// Filenames named by `mtllib`, in document order
    pub material_libs: Vec<String>,
    pub diagnostics: ParseDiagnostics,
}

impl ParsedMesh {
    pub fn vertex_count(&self) -> usize {
        self.groups.iter().map(|g| g.buffers.vertex_count()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.groups.iter().map(|g| g.buffers.triangle_count()).sum()
    }

    /// True when no group holds any vertex
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(GeometryGroup::is_empty)
    }
}

/// A face corner: 1-based table indices after relative indices are resolved
#[derive(Debug, Clone, Copy)]
struct Corner {
    position: usize,
    tex_coord: Option<usize>,
    normal: Option<usize>,
}

struct ObjParser {
    // Index 0 of every table is a placeholder so OBJ's 1-based indices map directly.
    positions: Vec<[f32; 3]>,
    colors: Vec<Option<[f32; 3]>>,
    normals: Vec<[f32; 3]>,
    tex_coords: Vec<[f32; 2]>,
    groups: Vec<GeometryGroup>,
    material_libs: Vec<String>,
    current_object: Option<String>,
    diagnostics: ParseDiagnostics,
}

impl ObjParser {
    fn new() -> Self {
        Self {
            positions: vec![[0.0; 3]],
            colors: vec![None],
            normals: vec![[0.0; 3]],
            tex_coords: vec![[0.0; 2]],
            groups: Vec::new(),
            material_libs: Vec::new(),
            current_object: None,
            diagnostics: ParseDiagnostics::default(),
        }
    }

    fn current_group(&mut self) -> &mut GeometryGroup {
        if self.groups.is_empty() {
            self.groups.push(GeometryGroup::new(
                DEFAULT_MATERIAL,
                self.current_object.clone(),
            ));
        }
        let last = self.groups.len() - 1;
        &mut self.groups[last]
    }

    fn parse_line(&mut self, line_number: usize, line: &str) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return;
        }

        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (line, ""),
        };

        let accepted = match keyword {
            "v" => self.parse_position(rest),
            "vn" => self.parse_normal(rest),
            "vt" => self.parse_tex_coord(rest),
            "f" => self.parse_face(rest),
            "usemtl" => {
                self.groups
                    .push(GeometryGroup::new(rest, self.current_object.clone()));
                true
            }
            "mtllib" => {
                if rest.is_empty() {
                    false
                } else {
                    self.material_libs.push(rest.to_string());
                    true
                }
            }
            "o" | "g" => {
                self.open_object(rest);
                true
            }
            "s" => true,
            _ => {
                log::debug!("OBJ line {}: ignoring unknown keyword '{}'", line_number, keyword);
                self.diagnostics.unknown_directives += 1;
                true
            }
        };

        if !accepted {
            log::debug!("OBJ line {}: skipping malformed '{}'", line_number, line);
            self.diagnostics.skipped_lines += 1;
        }
    }

    fn open_object(&mut self, name: &str) {
        let name = if name.is_empty() { None } else { Some(name.to_string()) };
        self.current_object = name.clone();

        // A new object splits the running group but keeps its material.
        if let Some(last) = self.groups.last_mut() {
            if last.is_empty() {
                last.object = name;
            } else {
                let material = last.material.clone();
                self.groups.push(GeometryGroup::new(material, name));
            }
        }
    }

    fn parse_position(&mut self, rest: &str) -> bool {
        let Some(values) = parse_floats(rest) else {
            return false;
        };
        match values.len() {
            3 | 4 => {
                self.positions.push([values[0], values[1], values[2]]);
                self.colors.push(None);
            }
            6 | 7 => {
                self.positions.push([values[0], values[1], values[2]]);
                self.colors.push(Some([values[3], values[4], values[5]]));
            }
            _ => return false,
        }
        true
    }

    fn parse_normal(&mut self, rest: &str) -> bool {
        match parse_floats(rest).as_deref() {
            Some([x, y, z]) => {
                self.normals.push([*x, *y, *z]);
                true
            }
            _ => false,
        }
    }

    fn parse_tex_coord(&mut self, rest: &str) -> bool {
        match parse_floats(rest).as_deref() {
            Some([u]) => self.tex_coords.push([*u, 0.0]),
            Some([u, v]) | Some([u, v, _]) => self.tex_coords.push([*u, *v]),
            _ => return false,
        }
        true
    }

    fn parse_face(&mut self, rest: &str) -> bool {
        let corners: Option<Vec<Corner>> = rest
            .split_whitespace()
            .map(|token| self.parse_corner(token))
            .collect();

        let Some(corners) = corners else {
            return false;
        };
        if corners.len() < 3 {
            return false;
        }

        // Fan triangulation, a triangle yields itself
        for tri in 0..corners.len() - 2 {
            for corner in [corners[0], corners[tri + 1], corners[tri + 2]] {
                self.emit(corner);
            }
        }
        true
    }

    fn parse_corner(&self, token: &str) -> Option<Corner> {
        let mut slots = token.split('/');
        let position = resolve_index(slots.next()?, self.positions.len())?;
        let tex_coord = match slots.next() {
            None | Some("") => None,
            Some(slot) => Some(resolve_index(slot, self.tex_coords.len())?),
        };
        let normal = match slots.next() {
            None | Some("") => None,
            Some(slot) => Some(resolve_index(slot, self.normals.len())?),
        };
        if slots.next().is_some() {
            return None;
        }

        Some(Corner {
            position,
            tex_coord,
            normal,
        })
    }

    fn emit(&mut self, corner: Corner) {
        let position = self.positions[corner.position];
        let color = self.colors[corner.position].unwrap_or(WHITE);
        let tex_coord = corner
            .tex_coord
            .map_or([0.0, 0.0], |index| self.tex_coords[index]);
        let normal = corner.normal.map_or([0.0; 3], |index| self.normals[index]);

        self.current_group()
            .buffers
            .push_vertex(position, normal, tex_coord, color);
    }

    fn finish(mut self) -> ParsedMesh {
        let has_normals = self.normals.len() > 1;
        let has_tex_coords = self.tex_coords.len() > 1;
        let has_colors = self.colors.iter().any(Option::is_some);

        for group in &mut self.groups {
            if !has_normals {
                group.buffers.fill_normals(FALLBACK_NORMAL);
            }
            if !has_tex_coords {
                group.buffers.synthesize_tex_coords();
            }
            if !has_colors {
                group.buffers.drop_colors();
            }
        }

        if self.diagnostics.skipped_lines > 0 {
            log::warn!(
                "OBJ parse skipped {} malformed line(s)",
                self.diagnostics.skipped_lines
            );
        }

        ParsedMesh {
            groups: self.groups,
            material_libs: self.material_libs,
            diagnostics: self.diagnostics,
        }
    }
}

/// Parse every whitespace-separated token as a float, failing on the first bad one
fn parse_floats(rest: &str) -> Option<Vec<f32>> {
    rest.split_whitespace()
        .map(|token| token.parse::<f32>().ok())
        .collect()
}

/// Map a 1-based (or negative, relative) OBJ index onto a table that carries a
/// placeholder at slot 0. Returns `None` for 0, garbage, or out-of-range indices.
fn resolve_index(token: &str, table_len: usize) -> Option<usize> {
    let raw: i64 = token.parse().ok()?;
    let index = if raw < 0 {
        table_len as i64 + raw
    } else {
        raw
    };
    if index <= 0 || index >= table_len as i64 {
        return None;
    }
    Some(index as usize)
}

/// Parse OBJ text into material-tagged geometry groups.
///
/// Meshes without any `vn` line get [`FALLBACK_NORMAL`] on every vertex;
/// meshes without any `vt` line get a repeating synthetic texture coordinate.
pub fn parse_obj(text: &str) -> ParsedMesh {
    let mut parser = ObjParser::new();
    for (i, line) in text.lines().enumerate() {
        parser.parse_line(i + 1, line);
    }
    parser.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    #[test]
    fn test_single_triangle() {
        let mesh = parse_obj(TRIANGLE);

        assert_eq!(mesh.groups.len(), 1);
        let buffers = &mesh.groups[0].buffers;
        assert_eq!(
            buffers.positions(),
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]
        );
        assert_eq!(
            buffers.normals(),
            &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]
        );
        assert_eq!(mesh.groups[0].material, DEFAULT_MATERIAL);
        assert_eq!(mesh.diagnostics, ParseDiagnostics::default());
    }

    #[test]
    fn test_position_count_is_nine_floats_per_face() {
        let mut text = String::from("v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\n");
        let faces = 7;
        for i in 0..faces {
            if i % 2 == 0 {
                text.push_str("f 1 2 3\n");
            } else {
                text.push_str("f 2 4 3\n");
            }
        }

        let mesh = parse_obj(&text);
        let floats: usize = mesh
            .groups
            .iter()
            .map(|g| g.buffers.positions().len())
            .sum();
        assert_eq!(floats, 3 * faces * 3);
        assert_eq!(mesh.triangle_count(), faces);
    }

    #[test]
    fn test_every_normal_is_fallback_without_vn() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 0 1\nusemtl a\nf 1 2 3\nusemtl b\nf 1 3 4\nf 2 3 4\n";
        let mesh = parse_obj(text);

        assert_eq!(mesh.groups.len(), 2);
        for group in &mesh.groups {
            for normal in group.buffers.normals().chunks(3) {
                assert_eq!(normal, &FALLBACK_NORMAL);
            }
        }
    }

    #[test]
    fn test_normals_and_tex_coords_are_looked_up_by_index() {
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0.5 0.25
vt 1 1
vn 0 1 0
vn 1 0 0
f 1/1/2 2/2/1 3//2
";
        let mesh = parse_obj(text);
        let buffers = &mesh.groups[0].buffers;

        assert_eq!(
            buffers.normals(),
            &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0]
        );
        // The third corner has no texcoord slot: neutral zero default.
        assert_eq!(buffers.tex_coords(), &[0.5, 0.25, 1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_missing_normal_slot_defaults_to_zero_when_mesh_has_normals() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 1 0\nf 1//1 2 3\n";
        let mesh = parse_obj(text);

        assert_eq!(
            mesh.groups[0].buffers.normals(),
            &[0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_synthetic_tex_coords_without_vt() {
        let mesh = parse_obj(TRIANGLE);
        assert_eq!(
            mesh.groups[0].buffers.tex_coords(),
            &[0.0, 0.0, 1.0, 1.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_usemtl_opens_groups_in_order() {
        let text = "\
mtllib chair.mtl
v 0 0 0
v 1 0 0
v 0 1 0
usemtl Wood
f 1 2 3
usemtl Metal
f 3 2 1
f 1 3 2
";
        let mesh = parse_obj(text);

        assert_eq!(mesh.material_libs, vec!["chair.mtl".to_string()]);
        let names: Vec<&str> = mesh.groups.iter().map(|g| g.material.as_str()).collect();
        assert_eq!(names, vec!["Wood", "Metal"]);
        assert_eq!(mesh.groups[0].buffers.vertex_count(), 3);
        assert_eq!(mesh.groups[1].buffers.vertex_count(), 6);
    }

    #[test]
    fn test_usemtl_without_geometry_opens_empty_group() {
        let mesh = parse_obj("usemtl Lonely\n");

        assert_eq!(mesh.groups.len(), 1);
        assert_eq!(mesh.groups[0].material, "Lonely");
        assert!(mesh.groups[0].is_empty());
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_malformed_lines_are_skipped_and_counted() {
        let text = "\
v 0 0 0
v 1 0 zero
v 1 0 0
v 0 1 0
f 1 2 3
f 1 2 9
f 1 2
vn 0 0
";
        let mesh = parse_obj(text);

        assert_eq!(mesh.diagnostics.skipped_lines, 4);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(
            mesh.groups[0].buffers.positions(),
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]
        );
    }

    #[test]
    fn test_comments_blank_lines_and_unknown_keywords() {
        let text = "# a comment\n\n   \nv 0 0 0\nv 1 0 0\nv 0 1 0\ns off\ncurv 0 1\nf 1 2 3\n";
        let mesh = parse_obj(text);

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.diagnostics.skipped_lines, 0);
        assert_eq!(mesh.diagnostics.unknown_directives, 1);
    }

    #[test]
    fn test_negative_indices_are_relative() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n";
        let mesh = parse_obj(text);

        assert_eq!(
            mesh.groups[0].buffers.positions(),
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]
        );
    }

    #[test]
    fn test_quad_is_fan_triangulated() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let mesh = parse_obj(text);
        let buffers = &mesh.groups[0].buffers;

        assert_eq!(buffers.triangle_count(), 2);
        assert_eq!(
            buffers.positions(),
            &[
                0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, //
                0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0,
            ]
        );
    }

    #[test]
    fn test_vertex_colors_are_kept_when_declared() {
        let text = "v 0 0 0 1 0 0\nv 1 0 0\nv 0 1 0 0 0 1\nf 1 2 3\n";
        let mesh = parse_obj(text);
        let colors = mesh.groups[0].buffers.colors().unwrap();

        assert_eq!(colors, &[1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 1.0]);
        assert!(parse_obj(TRIANGLE).groups[0].buffers.colors().is_none());
    }

    #[test]
    fn test_object_directive_splits_running_group() {
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
usemtl Paint
o lid
f 1 2 3
o body
f 3 2 1
";
        let mesh = parse_obj(text);

        assert_eq!(mesh.groups.len(), 2);
        assert_eq!(mesh.groups[0].object.as_deref(), Some("lid"));
        assert_eq!(mesh.groups[1].object.as_deref(), Some("body"));
        assert!(mesh.groups.iter().all(|g| g.material == "Paint"));
    }

    #[test]
    fn test_crlf_line_endings() {
        let mesh = parse_obj("v 0 0 0\r\nv 1 0 0\r\nv 0 1 0\r\nf 1 2 3\r\n");
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.diagnostics.skipped_lines, 0);
    }
}
