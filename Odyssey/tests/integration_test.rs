use odyssey::formats::mdl::{Classification, MDL_OFFSET};
use odyssey::prelude::*;
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const NODE_BASE: u16 = 0x0001;
const NODE_MESH: u16 = 0x0020;

fn put_u32(buf: &mut [u8], at: usize, v: u32) {
    buf[at..at + 4].copy_from_slice(&v.to_le_bytes());
}

fn push_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn push_f32(buf: &mut Vec<u8>, v: f32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn push_array(buf: &mut Vec<u8>, offset: usize, count: u32) {
    push_u32(buf, offset as u32);
    push_u32(buf, count);
    push_u32(buf, count);
}

fn push_text(buf: &mut Vec<u8>, s: &str, len: usize) {
    let mut bytes = s.as_bytes().to_vec();
    bytes.resize(len, 0);
    buf.extend_from_slice(&bytes);
}

fn push_node_header(buf: &mut Vec<u8>, flags: u16, name_index: u16, children: (usize, u32)) {
    buf.extend_from_slice(&flags.to_le_bytes());
    buf.extend_from_slice(&name_index.to_le_bytes());
    buf.extend_from_slice(&name_index.to_le_bytes());
    buf.extend_from_slice(&[0, 0]);
    push_u32(buf, 0);
    push_u32(buf, 0);
    for v in [0.0, 0.0, 1.5, 1.0, 0.0, 0.0, 0.0] {
        push_f32(buf, v);
    }
    push_array(buf, children.0, children.1);
    push_array(buf, 0, 0);
    push_array(buf, 0, 0);
}

const VERTICES: [[f32; 3]; 4] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
];

/// A two-node model: dummy `root` with one textured quad child `plane`.
fn build_model(variant: Variant) -> (Vec<u8>, Vec<u8>) {
    // Indices into `body` are the relative offsets stored in the file.
    let mut body = vec![0u8; 196];

    let names_at = body.len();
    body.resize(names_at + 8, 0);
    let root_name = body.len();
    body.extend_from_slice(b"root\0");
    let plane_name = body.len();
    body.extend_from_slice(b"plane\0");
    put_u32(&mut body, names_at, root_name as u32);
    put_u32(&mut body, names_at + 4, plane_name as u32);

    let root_children = body.len();
    push_u32(&mut body, 0);

    let faces_at = body.len();
    for face in [[0u16, 1, 2], [0, 2, 3]] {
        body.extend_from_slice(&[0u8; 26]);
        for i in face {
            body.extend_from_slice(&i.to_le_bytes());
        }
    }

    let root_at = body.len();
    push_node_header(&mut body, NODE_BASE, 0, (root_children, 1));

    let plane_at = body.len();
    put_u32(&mut body, root_children, plane_at as u32);
    push_node_header(&mut body, NODE_BASE | NODE_MESH, 1, (0, 0));

    let (p1, p2) = variant.fn_ptrs();
    push_u32(&mut body, p1);
    push_u32(&mut body, p2);
    push_array(&mut body, faces_at, 2);
    for _ in 0..10 {
        push_f32(&mut body, 0.0);
    }
    for v in [1.0, 1.0, 1.0, 0.5, 0.5, 0.5] {
        push_f32(&mut body, v);
    }
    push_u32(&mut body, 0);
    push_text(&mut body, "plane_tex", 32);
    push_text(&mut body, "", 32);
    push_text(&mut body, "", 12);
    push_text(&mut body, "", 12);
    for _ in 0..3 {
        push_array(&mut body, 0, 0);
    }
    body.extend_from_slice(&[0u8; 20]);
    push_u32(&mut body, 0);
    for _ in 0..4 {
        push_f32(&mut body, 0.0);
    }
    push_u32(&mut body, 12); // stride
    push_u32(&mut body, 1); // attribute bitmap
    push_u32(&mut body, 0); // vertex position offset
    for _ in 0..10 {
        push_u32(&mut body, u32::MAX);
    }
    body.extend_from_slice(&(VERTICES.len() as u16).to_le_bytes());
    body.extend_from_slice(&1u16.to_le_bytes());
    body.extend_from_slice(&[0, 0, 0, 1, 0, 1]);
    if variant.is_tsl() {
        body.extend_from_slice(&[0u8; 8]);
    }
    body.extend_from_slice(&[0, 0]);
    push_f32(&mut body, 1.0);
    push_u32(&mut body, 0);
    push_u32(&mut body, 0); // mdx block offset
    if !variant.is_xbox() {
        push_u32(&mut body, 0);
    }

    let mut mdx = Vec::new();
    for vertex in VERTICES {
        for c in vertex {
            push_f32(&mut mdx, c);
        }
    }

    let mut geometry = Vec::new();
    push_u32(&mut geometry, p1);
    push_u32(&mut geometry, p2);
    push_text(&mut geometry, "plc_plane", 32);
    push_u32(&mut geometry, root_at as u32);
    push_u32(&mut geometry, 2);
    push_array(&mut geometry, 0, 0);
    push_array(&mut geometry, 0, 0);
    push_u32(&mut geometry, 0);
    geometry.extend_from_slice(&[2, 0, 0, 0]);

    let mut model = vec![0x20, 0, 0, 1];
    push_u32(&mut model, 0);
    push_array(&mut model, 0, 0);
    push_u32(&mut model, 0);
    for _ in 0..8 {
        push_f32(&mut model, 1.0);
    }
    push_text(&mut model, "NULL", 32);
    push_u32(&mut model, 0);
    push_u32(&mut model, 0);
    push_u32(&mut model, mdx.len() as u32);
    push_u32(&mut model, 0);
    push_array(&mut model, names_at, 2);

    body[..80].copy_from_slice(&geometry);
    body[80..196].copy_from_slice(&model);

    let mut mdl = Vec::new();
    push_u32(&mut mdl, 0);
    push_u32(&mut mdl, (MDL_OFFSET + body.len()) as u32);
    push_u32(&mut mdl, mdx.len() as u32);
    mdl.extend_from_slice(&body);
    (mdl, mdx)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn write_pair(dir: &Path, stem: &str, mdl: &[u8], mdx: &[u8]) -> PathBuf {
    let mdl_path = dir.join(format!("{stem}.mdl"));
    std::fs::write(&mdl_path, mdl).unwrap();
    std::fs::write(dir.join(format!("{stem}.mdx")), mdx).unwrap();
    mdl_path
}

#[test]
fn test_read_mdl_all_variants() {
    init_tracing();
    let dir = tempdir().unwrap();

    for (i, variant) in [
        Variant::new(Game::Kotor, Platform::Pc),
        Variant::new(Game::Kotor, Platform::Xbox),
        Variant::new(Game::Tsl, Platform::Pc),
        Variant::new(Game::Tsl, Platform::Xbox),
    ]
    .into_iter()
    .enumerate()
    {
        let (mdl, mdx) = build_model(variant);
        let path = write_pair(dir.path(), &format!("plane{i}"), &mdl, &mdx);

        let model = read_mdl(&path).unwrap();
        assert_eq!(model.name, "plc_plane");
        assert_eq!(model.variant, variant);
        assert_eq!(model.properties.classification, Classification::Placeable);
        assert_eq!(model.node_count(), 2);

        let root = model.root();
        assert_eq!(root.name, "root");
        assert_eq!(root.node_type, NodeType::Dummy);

        let plane: Vec<_> = model.children(model.root_id()).collect();
        assert_eq!(plane.len(), 1);
        assert_eq!(plane[0].name, "plane");
        assert_eq!(plane[0].node_type, NodeType::TriMesh);
        assert_eq!(plane[0].parent, Some(model.root_id()));

        let mesh = plane[0].mesh.as_ref().unwrap();
        assert_eq!(mesh.faces.faces, vec![[0, 1, 2], [0, 2, 3]]);
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.vertices[2].to_array(), [1.0, 1.0, 0.0]);
        assert_eq!(mesh.bitmap, "plane_tex");
    }
}

#[test]
fn test_missing_vertex_file_checked_first() {
    let dir = tempdir().unwrap();
    let (mdl, _) = build_model(Variant::default());
    let path = dir.path().join("lonely.mdl");
    std::fs::write(&path, mdl).unwrap();

    let err = read_mdl(&path).unwrap_err();
    match err {
        Error::MissingVertexFile { path } => assert_eq!(path, dir.path().join("lonely.mdx")),
        other => panic!("unexpected error: {other}"),
    }

    // The .mdl itself is never opened.
    let err = read_mdl(dir.path().join("absent.mdl")).unwrap_err();
    assert!(matches!(err, Error::MissingVertexFile { .. }));
}

#[test]
fn test_bad_signature() {
    let (mut mdl, mdx) = build_model(Variant::default());
    put_u32(&mut mdl, 0, 0xDEAD_BEEF);
    let err = parse_mdl_bytes(&mdl, &mdx).unwrap_err();
    assert!(matches!(err, Error::BadSignature { found: 0xDEAD_BEEF }));
}

#[test]
fn test_bad_model_type() {
    let (mut mdl, mdx) = build_model(Variant::default());
    mdl[MDL_OFFSET + 76] = 5;
    let err = parse_mdl_bytes(&mdl, &mdx).unwrap_err();
    assert!(matches!(err, Error::BadModelType { expected: 2, found: 5 }));
}

#[test]
fn test_mdx_size_mismatch() {
    let (mut mdl, mdx) = build_model(Variant::default());
    put_u32(&mut mdl, 8, 1000);
    let err = parse_mdl_bytes(&mdl, &mdx).unwrap_err();
    assert!(matches!(err, Error::SizeMismatch { header: 1000, model: 48 }));
}

#[test]
fn test_name_array_count_mismatch() {
    let (mut mdl, mdx) = build_model(Variant::default());
    // Second count of the name array, last field of the model header.
    put_u32(&mut mdl, MDL_OFFSET + 80 + 112, 3);
    let err = parse_mdl_bytes(&mdl, &mdx).unwrap_err();
    assert!(matches!(
        err,
        Error::ArrayCountMismatch { offset: 196, count1: 2, count2: 3 }
    ));
}

#[test]
fn test_truncated_mdl() {
    let (mdl, mdx) = build_model(Variant::default());
    let err = parse_mdl_bytes(&mdl[..150], &mdx).unwrap_err();
    assert!(matches!(err, Error::TruncatedRead { len: 150, .. }));
}

#[test]
fn test_unknown_variant_falls_back_to_kotor_pc() {
    init_tracing();
    let (mut mdl, mdx) = build_model(Variant::default());
    put_u32(&mut mdl, MDL_OFFSET, 1);
    put_u32(&mut mdl, MDL_OFFSET + 4, 2);
    let model = parse_mdl_bytes(&mdl, &mdx).unwrap();
    assert_eq!(model.variant, Variant::default());
}

#[test]
fn test_inspect_and_dump_json() {
    let dir = tempdir().unwrap();
    let (mdl, mdx) = build_model(Variant::new(Game::Tsl, Platform::Pc));
    let path = write_pair(dir.path(), "plc_plane", &mdl, &mdx);

    let info = inspect_mdl(&path).unwrap();
    assert_eq!(info.game, Game::Tsl);
    assert_eq!(info.node_count, 2);
    assert_eq!(info.mesh_count, 1);
    assert_eq!(info.total_vertices, 4);
    assert_eq!(info.total_faces, 2);
    assert_eq!(info.nodes[1].texture.as_deref(), Some("plane_tex"));

    let model = read_mdl(&path).unwrap();
    let json = serde_json::to_value(&model).unwrap();
    assert_eq!(json["name"], "plc_plane");
    assert_eq!(json["nodes"][1]["name"], "plane");
    assert_eq!(json["nodes"][1]["mesh"]["faces"][1], serde_json::json!([0, 2, 3]));
}

#[test]
fn test_batch_load_directory() {
    let dir = tempdir().unwrap();
    let (mdl, mdx) = build_model(Variant::default());
    write_pair(dir.path(), "a", &mdl, &mdx);
    write_pair(dir.path(), "b", &mdl, &mdx);
    std::fs::write(dir.path().join("c.mdl"), &mdl).unwrap();

    let files = find_mdl_files(dir.path());
    assert_eq!(files.len(), 3);

    let result = load_models(&files, &LoadOptions::structure_only(), |_| {});
    assert_eq!(result.success_count, 2);
    assert_eq!(result.fail_count, 1);
    assert_eq!(result.models[0].0, dir.path().join("a.mdl"));
    assert!(result.models[0].1.nodes()[1].mesh.as_ref().unwrap().vertices.is_empty());
    assert_eq!(result.failures[0].0, dir.path().join("c.mdl"));
}
