use std::rc::Rc;

use diorama::{
    config::{CatalogEntry, EditorConfig},
    gfx::{
        backend::NullBackend,
        resources::MemorySource,
        scene::{
            DocumentError, InstanceId, PlacementRequest, SavedScene, SceneEdit, SceneEditor,
        },
    },
};
use futures::executor::block_on;

const TRIANGLE_OBJ: &str = "mtllib tri.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl Red\nf 1 2 3\n";
const QUAD_OBJ: &str = "v -1 -1 0\nv 1 -1 0\nv 1 1 0\nv -1 1 0\nvt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\nf 1/1 2/2 3/3 4/4\n";

fn png(rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(1, 1, image::Rgba(rgba));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

fn setup() -> (Rc<MemorySource>, SceneEditor<NullBackend>) {
    let _ = env_logger::builder().is_test(true).try_init();

    let source = Rc::new(MemorySource::new());
    source.insert("objs/tri.obj", TRIANGLE_OBJ);
    source.insert("objs/tri.mtl", "newmtl Red\nKd 1 0 0\nmap_Kd red.png\n");
    source.insert("objs/quad.obj", QUAD_OBJ);
    source.insert("objs/texture.png", png([255, 255, 255, 255]));
    source.insert("objs/textura2.jpg", png([0, 0, 255, 255]));

    let config = EditorConfig {
        catalog: vec![
            CatalogEntry::new("Triangle", "objs/tri.obj"),
            CatalogEntry::new("Quad", "objs/quad.obj"),
        ],
        palette: vec![
            "objs/texture.png".to_string(),
            "objs/textura2.jpg".to_string(),
        ],
        ..EditorConfig::default()
    };

    let editor = SceneEditor::new(config, source.clone(), NullBackend::new());
    (source, editor)
}

fn round_trip(editor: &mut SceneEditor<NullBackend>) -> SavedScene {
    let json = editor.save_json().unwrap();
    let report = block_on(editor.load_json(&json)).unwrap();
    assert!(report.is_complete());
    editor.save()
}

#[test]
fn test_round_trip_empty_scene() {
    let (_, mut editor) = setup();

    let saved = round_trip(&mut editor);

    assert!(saved.is_empty());
    assert!(editor.scene().is_empty());
}

#[test]
fn test_round_trip_single_instance() {
    let (_, mut editor) = setup();
    let id = block_on(editor.place_catalog(1)).unwrap();
    editor.select(id);
    block_on(editor.apply_control("rotation", "0.3")).unwrap();
    block_on(editor.apply_control("offset_z", "-4")).unwrap();
    let before = editor.save();

    let after = round_trip(&mut editor);

    assert_eq!(after, before);
    let object = editor.scene().get(InstanceId(0)).unwrap();
    assert_eq!(object.transform.rotation, 0.3);
    assert_eq!(object.transform.offset.z, -4.0);
}

#[test]
fn test_round_trip_keeps_distinct_scales() {
    let (_, mut editor) = setup();
    let a = block_on(editor.place("objs/tri.obj")).unwrap();
    let b = block_on(editor.place("objs/tri.obj")).unwrap();
    editor.select(a);
    block_on(editor.apply_edit(SceneEdit::Scale(1.0))).unwrap();
    editor.select(b);
    block_on(editor.apply_edit(SceneEdit::Scale(2.0))).unwrap();
    block_on(editor.set_palette_texture(b, 1)).unwrap();

    let after = round_trip(&mut editor);

    let scales: Vec<f32> = after.instances.iter().map(|i| i.scale).collect();
    assert_eq!(scales, vec![1.0, 2.0]);
    assert_eq!(after.instances[0].asset, "objs/tri.obj");
    assert_eq!(after.instances[1].asset, "objs/tri.obj");
    assert_eq!(
        after.instances[1].texture.as_deref(),
        Some("objs/textura2.jpg")
    );
    assert_eq!(editor.backend().live_meshes(), 2);
    assert_eq!(editor.backend().live_textures(), 2);
}

#[test]
fn test_clear_then_save_is_empty() {
    let (_, mut editor) = setup();
    block_on(editor.place_catalog(0)).unwrap();
    block_on(editor.place_catalog(1)).unwrap();

    editor.clear();
    let document = SavedScene::from_json(&editor.save_json().unwrap()).unwrap();

    assert_eq!(document.len(), 0);
    assert_eq!(editor.backend().live_meshes(), 0);
    assert!(!editor.select(InstanceId(1)));
}

#[test]
fn test_invalid_document_is_rejected_before_clearing() {
    let (_, mut editor) = setup();
    block_on(editor.place_catalog(0)).unwrap();

    for text in ["", "[1, 2]", "{\"instances\": 3}", "{\"instances\": [{\"asset\": 1}]}"] {
        assert!(block_on(editor.load_json(text)).is_err(), "accepted {:?}", text);
    }
    assert_eq!(
        block_on(editor.load_json("{\"version\": 2, \"instances\": []}")),
        Err(DocumentError::UnsupportedVersion(2))
    );
    assert_eq!(editor.scene().len(), 1);
    assert_eq!(editor.backend().live_meshes(), 1);
}

#[test]
fn test_partial_failure_is_skipped() {
    let (source, mut editor) = setup();
    block_on(editor.place_catalog(0)).unwrap();
    block_on(editor.place_catalog(1)).unwrap();
    let json = editor.save_json().unwrap();
    source.remove("objs/tri.mtl");

    let report = block_on(editor.load_json(&json)).unwrap();

    assert_eq!(report.loaded.len(), 1);
    assert_eq!(report.failed[0].asset, "objs/tri.obj");
    assert_eq!(editor.labels(), vec!["Quad"]);
}

#[test]
fn test_textures_fetched_once_per_path() {
    let (source, mut editor) = setup();
    for index in [0, 1, 0, 1] {
        block_on(editor.place_catalog(index)).unwrap();
    }

    assert_eq!(source.fetch_count("objs/texture.png"), 1);
    assert_eq!(source.fetch_count("objs/tri.obj"), 2);
    // The palette texture overrides the MTL map, which is never needed
    assert_eq!(source.fetch_count("objs/red.png"), 0);
    assert_eq!(editor.backend().live_textures(), 4);
}

#[test]
fn test_untextured_placement_draws_material_map() {
    let (source, mut editor) = setup();
    source.insert("objs/red.png", png([255, 0, 0, 255]));

    for _ in 0..2 {
        block_on(editor.place_request(PlacementRequest::new("objs/tri.obj"))).unwrap();
    }

    assert_eq!(source.fetch_count("objs/red.png"), 1);
    assert_eq!(editor.backend().live_textures(), 2);
    let frame = editor.frame(1.0);
    assert!(frame.draw_items().all(|item| item.texture.is_some()));

    // A saved instance without a texture comes back with its map
    round_trip(&mut editor);
    assert_eq!(editor.backend().live_textures(), 2);
    assert_eq!(source.fetch_count("objs/red.png"), 1);

    editor.clear();
    assert_eq!(editor.backend().live_textures(), 0);
}

#[test]
fn test_frame_describes_every_part() {
    let (_, mut editor) = setup();
    block_on(editor.place_catalog(0)).unwrap();
    block_on(editor.place_catalog(1)).unwrap();

    let frame = editor.frame(16.0 / 9.0);
    let items: Vec<_> = frame.draw_items().collect();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].material.diffuse, [1.0, 0.0, 0.0]);
    assert_eq!(items[0].vertex_count, 3);
    assert_eq!(items[1].vertex_count, 6);
    assert!(items.iter().all(|item| item.texture.is_some()));
}
