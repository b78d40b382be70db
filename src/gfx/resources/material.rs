//! Material system
//!
//! Material records parsed from Wavefront MTL documents, the library that maps
//! material names to records, and the uniform block the renderer uploads.
//! Materials are immutable once parsed.

use std::collections::HashMap;

use crate::gfx::geometry::ParseDiagnostics;

/// Texture map filenames named by a material.
///
/// Filenames are stored exactly as written in the MTL document until the
/// loader resolves them against the MTL file's own location.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureMaps {
    pub diffuse: Option<String>,
    pub ambient: Option<String>,
    pub specular: Option<String>,
    pub specular_exponent: Option<String>,
    pub opacity: Option<String>,
    pub normal: Option<String>,
}

impl TextureMaps {
    /// Apply `resolve` to every map filename that is present
    pub fn map_paths(&self, mut resolve: impl FnMut(&str) -> String) -> Self {
        let mut apply = |path: &Option<String>| path.as_deref().map(&mut resolve);
        Self {
            diffuse: apply(&self.diffuse),
            ambient: apply(&self.ambient),
            specular: apply(&self.specular),
            specular_exponent: apply(&self.specular_exponent),
            opacity: apply(&self.opacity),
            normal: apply(&self.normal),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        [
            &self.diffuse,
            &self.ambient,
            &self.specular,
            &self.specular_exponent,
            &self.opacity,
            &self.normal,
        ]
        .into_iter()
        .filter_map(|path| path.as_deref())
    }
}

/// Material definition with Phong-style properties
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub diffuse: [f32; 3],
    pub ambient: [f32; 3],
    pub specular: [f32; 3],
    pub emissive: [f32; 3],
    pub shininess: f32,
    pub optical_density: f32,
    /// 0 = fully transparent, 1 = opaque
    pub opacity: f32,
    pub illumination: u32,
    pub maps: TextureMaps,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            diffuse: [1.0, 1.0, 1.0],
            ambient: [0.0, 0.0, 0.0],
            specular: [1.0, 1.0, 1.0],
            emissive: [0.0, 0.0, 0.0],
            shininess: 400.0,
            optical_density: 1.0,
            opacity: 1.0,
            illumination: 2,
            maps: TextureMaps::default(),
        }
    }
}

impl Material {
    /// Creates a material with default properties and the given name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Builder pattern: Set diffuse color
    pub fn with_diffuse(mut self, r: f32, g: f32, b: f32) -> Self {
        self.diffuse = [r, g, b];
        self
    }

    /// Builder pattern: Set opacity
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Uniform block for the fragment stage
    pub fn uniform(&self) -> MaterialUniform {
        MaterialUniform {
            diffuse: [self.diffuse[0], self.diffuse[1], self.diffuse[2], self.opacity],
            ambient: [self.ambient[0], self.ambient[1], self.ambient[2], 0.0],
            specular: [
                self.specular[0],
                self.specular[1],
                self.specular[2],
                self.shininess,
            ],
            emissive: [self.emissive[0], self.emissive[1], self.emissive[2], 0.0],
        }
    }
}

/// GPU uniform data for materials
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    /// rgb + opacity
    pub diffuse: [f32; 4],
    pub ambient: [f32; 4],
    /// rgb + shininess
    pub specular: [f32; 4],
    pub emissive: [f32; 4],
}

/// Materials keyed by name, as parsed from one or more MTL documents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialLibrary {
    materials: HashMap<String, Material>,
    pub diagnostics: ParseDiagnostics,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    /// Material for a geometry group, falling back to a default record carrying the requested name
    pub fn get_or_default(&self, name: &str) -> Material {
        self.materials
            .get(name)
            .cloned()
            .unwrap_or_else(|| Material::new(name))
    }

    pub fn insert(&mut self, material: Material) {
        self.materials.insert(material.name.clone(), material);
    }

    /// Merge another library in; its records win on name clashes
    pub fn extend(&mut self, other: MaterialLibrary) {
        self.diagnostics.skipped_lines += other.diagnostics.skipped_lines;
        self.diagnostics.unknown_directives += other.diagnostics.unknown_directives;
        self.materials.extend(other.materials);
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn names(&self) -> Vec<&String> {
        self.materials.keys().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.values()
    }

    /// Rewrite every texture map filename, e.g. to resolve it against the MTL location
    pub fn resolve_maps(&mut self, mut resolve: impl FnMut(&str) -> String) {
        for material in self.materials.values_mut() {
            material.maps = material.maps.map_paths(&mut resolve);
        }
    }
}

fn parse_color(rest: &str) -> Option<[f32; 3]> {
    let values: Vec<f32> = rest
        .split_whitespace()
        .map(|token| token.parse().ok())
        .collect::<Option<_>>()?;
    match values.as_slice() {
        [r, g, b] => Some([*r, *g, *b]),
        // A single value means grey
        [v] => Some([*v, *v, *v]),
        _ => None,
    }
}

fn parse_scalar(rest: &str) -> Option<f32> {
    let mut tokens = rest.split_whitespace();
    let value = tokens.next()?.parse().ok()?;
    tokens.next().is_none().then_some(value)
}

/// Parse MTL text (possibly several concatenated documents) into a library.
///
/// Lines before the first `newmtl` are ignored, unrecognised keywords are
/// ignored, malformed numeric lines are skipped and counted.
pub fn parse_mtl(text: &str) -> MaterialLibrary {
    let mut library = MaterialLibrary::new();
    let mut current: Option<Material> = None;

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (line, ""),
        };

        if keyword == "newmtl" {
            if let Some(done) = current.take() {
                library.insert(done);
            }
            current = Some(Material::new(rest));
            continue;
        }

        let Some(material) = current.as_mut() else {
            continue;
        };

        let accepted = match keyword {
            "Kd" => parse_color(rest).map(|c| material.diffuse = c).is_some(),
            "Ka" => parse_color(rest).map(|c| material.ambient = c).is_some(),
            "Ks" => parse_color(rest).map(|c| material.specular = c).is_some(),
            "Ke" => parse_color(rest).map(|c| material.emissive = c).is_some(),
            "Ns" => parse_scalar(rest).map(|v| material.shininess = v).is_some(),
            "Ni" => parse_scalar(rest).map(|v| material.optical_density = v).is_some(),
            "d" => parse_scalar(rest).map(|v| material.opacity = v).is_some(),
            "Tr" => parse_scalar(rest)
                .map(|v| material.opacity = 1.0 - v)
                .is_some(),
            "illum" => rest
                .parse::<u32>()
                .ok()
                .map(|v| material.illumination = v)
                .is_some(),
            "map_Kd" | "map_Ka" | "map_Ks" | "map_Ns" | "map_d" | "map_Bump" | "map_bump"
            | "bump" | "norm" => {
                let filename = map_filename(rest);
                if let Some(filename) = filename {
                    let slot = match keyword {
                        "map_Kd" => &mut material.maps.diffuse,
                        "map_Ka" => &mut material.maps.ambient,
                        "map_Ks" => &mut material.maps.specular,
                        "map_Ns" => &mut material.maps.specular_exponent,
                        "map_d" => &mut material.maps.opacity,
                        _ => &mut material.maps.normal,
                    };
                    *slot = Some(filename);
                    true
                } else {
                    false
                }
            }
            _ => {
                log::debug!("MTL line {}: ignoring unknown keyword '{}'", i + 1, keyword);
                library.diagnostics.unknown_directives += 1;
                true
            }
        };

        if !accepted {
            log::debug!("MTL line {}: skipping malformed '{}'", i + 1, line);
            library.diagnostics.skipped_lines += 1;
        }
    }

    if let Some(done) = current.take() {
        library.insert(done);
    }

    if library.diagnostics.skipped_lines > 0 {
        log::warn!(
            "MTL parse skipped {} malformed line(s)",
            library.diagnostics.skipped_lines
        );
    }

    library
}

/// Filename of a map directive: the raw argument text, minus any leading `-option value...` pairs
fn map_filename(rest: &str) -> Option<String> {
    if rest.is_empty() {
        return None;
    }
    if !rest.starts_with('-') {
        return Some(rest.to_string());
    }
    // Options are followed by numeric arguments; the filename is the final token.
    rest.split_whitespace().last().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_diffuse_material() {
        let library = parse_mtl("newmtl Red\nKd 1 0 0\n");

        assert_eq!(library.len(), 1);
        let red = library.get("Red").unwrap();
        assert_eq!(red.diffuse, [1.0, 0.0, 0.0]);
        assert_eq!(red.opacity, 1.0);
        assert_eq!(red.ambient, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_all_scalar_and_color_fields() {
        let text = "\
# exported
newmtl Brass
Ka 0.1 0.1 0.1
Kd 0.8 0.6 0.2
Ks 0.5 0.5 0.5
Ke 0 0 0.25
Ns 96
Ni 1.5
d 0.75
illum 2
";
        let library = parse_mtl(text);
        let brass = library.get("Brass").unwrap();

        assert_eq!(brass.ambient, [0.1, 0.1, 0.1]);
        assert_eq!(brass.diffuse, [0.8, 0.6, 0.2]);
        assert_eq!(brass.specular, [0.5, 0.5, 0.5]);
        assert_eq!(brass.emissive, [0.0, 0.0, 0.25]);
        assert_eq!(brass.shininess, 96.0);
        assert_eq!(brass.optical_density, 1.5);
        assert_eq!(brass.opacity, 0.75);
        assert_eq!(brass.illumination, 2);
        assert_eq!(library.diagnostics, ParseDiagnostics::default());
    }

    #[test]
    fn test_multiple_materials_flush_in_turn() {
        let text = "newmtl A\nKd 1 0 0\nnewmtl B\nKd 0 1 0\nnewmtl C\n";
        let library = parse_mtl(text);

        assert_eq!(library.len(), 3);
        assert_eq!(library.get("A").unwrap().diffuse, [1.0, 0.0, 0.0]);
        assert_eq!(library.get("B").unwrap().diffuse, [0.0, 1.0, 0.0]);
        assert_eq!(library.get("C").unwrap().diffuse, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_lines_before_newmtl_are_ignored() {
        let library = parse_mtl("Kd 0 0 1\nNs 10\nnewmtl Late\n");

        assert_eq!(library.get("Late").unwrap().diffuse, [1.0, 1.0, 1.0]);
        assert_eq!(library.get("Late").unwrap().shininess, 400.0);
    }

    #[test]
    fn test_map_directives_keep_raw_filenames() {
        let text = "\
newmtl Wood
map_Kd textures/oak diffuse.png
map_Ks spec.jpg
map_Bump -bm 0.5 normal.png
";
        let library = parse_mtl(text);
        let wood = library.get("Wood").unwrap();

        assert_eq!(wood.maps.diffuse.as_deref(), Some("textures/oak diffuse.png"));
        assert_eq!(wood.maps.specular.as_deref(), Some("spec.jpg"));
        assert_eq!(wood.maps.normal.as_deref(), Some("normal.png"));
        assert_eq!(wood.maps.iter().count(), 3);
    }

    #[test]
    fn test_unknown_keywords_and_malformed_lines() {
        let text = "newmtl X\nPr 0.5\nKd 1 zero 0\nNs\nd 0.5\n";
        let library = parse_mtl(text);
        let x = library.get("X").unwrap();

        assert_eq!(library.diagnostics.unknown_directives, 1);
        assert_eq!(library.diagnostics.skipped_lines, 2);
        assert_eq!(x.diffuse, [1.0, 1.0, 1.0]);
        assert_eq!(x.opacity, 0.5);
    }

    #[test]
    fn test_resolve_maps_and_fallback_material() {
        let mut library = parse_mtl("newmtl Stone\nmap_Kd stone.png\n");
        library.resolve_maps(|file| format!("assets/objs/{}", file));

        assert_eq!(
            library.get("Stone").unwrap().maps.diffuse.as_deref(),
            Some("assets/objs/stone.png")
        );

        let fallback = library.get_or_default("Missing");
        assert_eq!(fallback.name, "Missing");
        assert_eq!(fallback.diffuse, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_uniform_packs_opacity_and_shininess() {
        let uniform = Material::new("m")
            .with_diffuse(0.5, 0.25, 1.0)
            .with_opacity(0.5)
            .uniform();

        assert_eq!(uniform.diffuse, [0.5, 0.25, 1.0, 0.5]);
        assert_eq!(uniform.specular[3], 400.0);
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 64);
    }
}
