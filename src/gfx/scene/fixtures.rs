//! Shared asset fixtures for the scene tests

use std::rc::Rc;

use crate::{
    config::{CatalogEntry, EditorConfig},
    gfx::resources::{texture_cache::tests::png_bytes, MemorySource},
};

/// Unit cube from the origin to (1,1,1), quads only, no normals or texcoords
pub(crate) const CUBE_OBJ: &str = "\
# cube
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0 0 1
v 1 0 1
v 1 1 1
v 0 1 1
f 1 4 3 2
f 5 6 7 8
f 1 2 6 5
f 2 3 7 6
f 3 4 8 7
f 4 1 5 8
";

/// Two triangles in two materials from two libraries
pub(crate) const CRATE_OBJ: &str = "\
mtllib crate.mtl
mtllib mtl/extra.mtl
v 0 0 0
v 1 0 0
v 0 1 0
v 4 0 0
vn 0 0 1
usemtl Red
f 1//1 2//1 3//1
usemtl Wood
f 2//1 4//1 3//1
";

pub(crate) fn two_material_source() -> Rc<MemorySource> {
    let source = Rc::new(MemorySource::new());
    source.insert("models/crate.obj", CRATE_OBJ);
    source.insert("models/crate.mtl", "newmtl Red\nKd 1 0 0\n");
    source.insert(
        "models/mtl/extra.mtl",
        "newmtl Wood\nKd 0.6 0.4 0.2\nmap_Kd wood.png\n",
    );
    source
}

/// Every fixture asset plus the palette images of [`test_config`]
pub(crate) fn populated_source() -> Rc<MemorySource> {
    let source = two_material_source();
    source.insert("models/cube.obj", CUBE_OBJ);
    source.insert("tex/a.png", png_bytes(2, [255, 0, 0, 255]));
    source.insert("tex/b.png", png_bytes(2, [0, 255, 0, 255]));
    source
}

pub(crate) fn test_config() -> EditorConfig {
    EditorConfig {
        catalog: vec![
            CatalogEntry::new("Cube", "models/cube.obj"),
            CatalogEntry::new("Crate", "models/crate.obj"),
            CatalogEntry::new("Ghost", "models/ghost.obj"),
        ],
        palette: vec!["tex/a.png".to_string(), "tex/b.png".to_string()],
        ..EditorConfig::default()
    }
}
