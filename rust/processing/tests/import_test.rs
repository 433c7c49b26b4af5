// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end imports of small CityJSON documents.

use approx::assert_relative_eq;
use cityjson_lite_core::GeometryKind;
use cityjson_lite_processing::{
    CityJsonImporter, Diagnostic, ErrorKind, ImportConfig, ImportResult, MaterialStrategy,
};
use serde_json::{json, Value};

const SQUARE: [[i64; 3]; 4] = [[0, 0, 0], [10, 0, 0], [10, 10, 0], [0, 10, 0]];

fn document(objects: Value) -> String {
    json!({
        "type": "CityJSON",
        "version": "1.1",
        "vertices": SQUARE,
        "CityObjects": objects
    })
    .to_string()
}

fn import_with(doc: &str, strategy: MaterialStrategy, parallel: bool) -> ImportResult {
    let config = ImportConfig::new()
        .with_materials(strategy)
        .with_parallel(parallel);
    CityJsonImporter::new(config).import_str(doc).unwrap()
}

fn import(doc: &str) -> ImportResult {
    import_with(doc, MaterialStrategy::Reuse, false)
}

fn import_err(doc: &str) -> ErrorKind {
    CityJsonImporter::new(ImportConfig::default())
        .import_str(doc)
        .unwrap_err()
        .kind()
}

#[test]
fn single_square_without_semantics() {
    let doc = document(json!({
        "B1": {"type": "Building", "geometry": [
            {"type": "MultiSurface", "lod": 1, "boundaries": [[[0, 1, 2, 3]]]}
        ]}
    }));
    let result = import(&doc);

    assert_eq!(result.meshes.len(), 1);
    let mesh = &result.meshes[0];
    assert_eq!(mesh.faces.len(), 1);
    assert_eq!(mesh.faces[0].as_slice(), &[0, 1, 2, 3]);
    assert_eq!(mesh.vertices.len(), 4);
    assert!(mesh.materials.is_empty());
    assert_eq!(mesh.material_indices, vec![None]);
    assert!(result.materials.is_empty());
    assert!(result.is_clean());
}

#[test]
fn null_semantic_value_means_no_material() {
    let doc = document(json!({
        "B1": {"type": "Building", "geometry": [{
            "type": "MultiSurface",
            "lod": 2,
            "boundaries": [[[0, 1, 2]], [[0, 2, 3]]],
            "semantics": {
                "surfaces": [{"type": "WallSurface"}, {"type": "RoofSurface"}],
                "values": [null, 1]
            }
        }]}
    }));
    let result = import(&doc);
    let mesh = &result.meshes[0];

    assert_eq!(mesh.material_indices, vec![None, Some(1)]);
    assert_eq!(mesh.material_for_face(0), None);
    let roof = mesh
        .material_for_face(1)
        .and_then(|id| result.material(id))
        .unwrap();
    assert_eq!(roof.type_tag, "RoofSurface");
}

#[test]
fn missing_parent_aborts_import() {
    let doc = document(json!({
        "A": {"type": "BuildingPart", "parents": ["B"]}
    }));
    assert_eq!(import_err(&doc), ErrorKind::DanglingReference);
}

#[test]
fn transform_applies_before_recentering() {
    let doc = json!({
        "type": "CityJSON",
        "transform": {"scale": [0.01, 0.01, 0.01], "translate": [1000, 2000, 0]},
        "vertices": [[100, 200, 50], [300, 400, 150]],
        "CityObjects": {
            "B1": {"type": "Building", "geometry": [
                {"type": "MultiSurface", "boundaries": [[[1, 0]]]}
            ]}
        }
    })
    .to_string();
    let result = import(&doc);

    assert_relative_eq!(result.shift.x, 1001.0, epsilon = 1e-9);
    assert_relative_eq!(result.shift.y, 2002.0, epsilon = 1e-9);
    assert_relative_eq!(result.shift.z, 0.5, epsilon = 1e-9);

    let mesh = &result.meshes[0];
    let origin = result.shift.restore(mesh.vertices[1]);
    assert_relative_eq!(origin.x, 1001.0, epsilon = 1e-9);
    assert_relative_eq!(origin.y, 2002.0, epsilon = 1e-9);
    assert_relative_eq!(origin.z, 0.5, epsilon = 1e-9);

    assert_relative_eq!(mesh.vertices[0].x, 2.0, epsilon = 1e-9);
    assert_relative_eq!(mesh.vertices[0].y, 2.0, epsilon = 1e-9);
    assert_relative_eq!(mesh.vertices[0].z, 1.0, epsilon = 1e-9);
}

#[test]
fn solid_shells_flatten_to_all_faces() {
    let doc = document(json!({
        "S": {"type": "Building", "geometry": [{
            "type": "Solid",
            "lod": 2,
            "boundaries": [
                [[[0, 1, 2]], [[1, 2, 3]], [[2, 3, 0]]],
                [[[0, 1, 3]], [[0, 2, 3]], [[1, 3, 2]]]
            ]
        }]}
    }));
    let result = import(&doc);
    let mesh = &result.meshes[0];

    assert_eq!(mesh.kind, GeometryKind::Solid);
    assert_eq!(mesh.faces.len(), 6);
    assert_eq!(mesh.vertices.len(), 18);
}

#[test]
fn multisolid_and_compositesolid_flatten_two_levels() {
    let solid = json!([[[[0, 1, 2]], [[1, 2, 3]]]]);
    let doc = document(json!({
        "M": {"type": "Building", "geometry": [
            {"type": "MultiSolid", "lod": 2, "boundaries": [solid.clone(), solid.clone()]},
            {"type": "CompositeSolid", "lod": 2, "boundaries": [solid]}
        ]}
    }));
    let result = import(&doc);

    assert_eq!(result.meshes[0].faces.len(), 4);
    assert_eq!(result.meshes[1].faces.len(), 2);
    assert_eq!(result.meshes[1].kind, GeometryKind::CompositeSolid);
}

#[test]
fn null_shell_and_null_solid_values_import() {
    let doc = document(json!({
        "S": {"type": "Building", "geometry": [{
            "type": "Solid",
            "lod": 2,
            "boundaries": [
                [[[0, 1, 2]], [[1, 2, 3]]],
                [[[2, 3, 0]]]
            ],
            "semantics": {"surfaces": [{"type": "WallSurface"}], "values": [[0, 0], null]}
        }]},
        "M": {"type": "Building", "geometry": [{
            "type": "MultiSolid",
            "lod": 2,
            "boundaries": [
                [[[[0, 1, 2]]]],
                [[[[1, 2, 3]]]]
            ],
            "semantics": {"surfaces": [{"type": "WallSurface"}], "values": [[[0]], null]}
        }]}
    }));
    let result = import(&doc);

    assert_eq!(result.meshes[0].material_indices, vec![Some(0), Some(0), None]);
    assert_eq!(result.meshes[1].material_indices, vec![Some(0), None]);
    assert_eq!(result.materials.len(), 1);
    assert!(result.is_clean());
}

#[test]
fn holes_are_dropped_and_shared_vertices_duplicated() {
    let doc = document(json!({
        "B1": {"type": "Building", "geometry": [{
            "type": "CompositeSurface",
            "lod": 2,
            "boundaries": [[[0, 1, 2, 3], [1, 2, 3]], [[2, 3, 0]]]
        }]}
    }));
    let result = import(&doc);
    let mesh = &result.meshes[0];

    assert_eq!(mesh.faces.len(), 2);
    assert_eq!(mesh.faces[0].as_slice(), &[0, 1, 2, 3]);
    assert_eq!(mesh.faces[1].as_slice(), &[4, 5, 6]);
    assert_eq!(mesh.vertices.len(), 7);
    assert_eq!(mesh.vertices[2], mesh.vertices[4]);
}

#[test]
fn empty_surfaces_keep_semantic_alignment() {
    let doc = document(json!({
        "B1": {"type": "Building", "geometry": [{
            "type": "MultiSurface",
            "lod": 2,
            "boundaries": [[], [[0, 1, 2]], [[]], [[0, 2, 3]]],
            "semantics": {
                "surfaces": [{"type": "GroundSurface"}, {"type": "RoofSurface"}],
                "values": [0, 0, 0, 1]
            }
        }]}
    }));
    let result = import(&doc);
    let mesh = &result.meshes[0];

    assert_eq!(mesh.faces.len(), 2);
    assert_eq!(mesh.material_indices, vec![Some(0), Some(1)]);
    assert_eq!(result.stats.skipped_surfaces, 2);
}

#[test]
fn extra_semantic_values_are_reported_not_fatal() {
    let doc = document(json!({
        "B1": {"type": "Building", "geometry": [{
            "type": "MultiSurface",
            "lod": 2,
            "boundaries": [[[0, 1, 2]]],
            "semantics": {"surfaces": [{"type": "WallSurface"}], "values": [0, 0, 0]}
        }]}
    }));
    let result = import(&doc);

    assert_eq!(result.meshes[0].material_indices, vec![Some(0)]);
    assert_eq!(
        result.diagnostics,
        vec![Diagnostic::SemanticsLengthMismatch {
            mesh: "0: [LoD2] B1".into(),
            surfaces: 1,
            values: 3,
        }]
    );
}

#[test]
fn geometry_instance_keeps_template_reference() {
    let doc = document(json!({
        "T1": {"type": "SolitaryVegetationObject", "geometry": [{
            "type": "GeometryInstance",
            "template": 0,
            "boundaries": [2],
            "transformationMatrix": [
                1.0, 0.0, 0.0, 0.0,
                0.0, 1.0, 0.0, 0.0,
                0.0, 0.0, 1.0, 0.0,
                0.0, 0.0, 0.0, 1.0
            ]
        }]}
    }));
    let result = import(&doc);
    let mesh = &result.meshes[0];

    assert_eq!(mesh.name, "0: [GeometryInstance] T1");
    assert!(mesh.faces.is_empty());
    assert!(mesh.vertices.is_empty());
    let instance = mesh.instance.as_ref().unwrap();
    assert_eq!(instance.template, Some(0));
    assert_eq!(instance.anchor, Some(2));
    assert_eq!(instance.transformation_matrix.as_ref().map(Vec::len), Some(16));
    assert!(result.lod_groups().is_empty());
}

#[test]
fn unsupported_geometry_fails() {
    let doc = document(json!({
        "P": {"type": "CityFurniture", "geometry": [
            {"type": "MultiPoint", "lod": 1, "boundaries": [0, 1]}
        ]}
    }));
    assert_eq!(import_err(&doc), ErrorKind::UnsupportedGeometryType);
}

#[test]
fn malformed_documents_fail() {
    let empty_pool = json!({"type": "CityJSON", "vertices": [], "CityObjects": {}}).to_string();
    assert_eq!(import_err(&empty_pool), ErrorKind::MalformedDocument);

    let no_objects = json!({"type": "CityJSON", "vertices": SQUARE}).to_string();
    assert_eq!(import_err(&no_objects), ErrorKind::MalformedDocument);

    let wrong_type = json!({"type": "GeoJSON", "vertices": SQUARE, "CityObjects": {}}).to_string();
    assert_eq!(import_err(&wrong_type), ErrorKind::MalformedDocument);

    let out_of_range = document(json!({
        "B1": {"type": "Building", "geometry": [
            {"type": "MultiSurface", "boundaries": [[[0, 1, 9]]]}
        ]}
    }));
    assert_eq!(import_err(&out_of_range), ErrorKind::MalformedDocument);

    assert_eq!(import_err("{not json"), ErrorKind::MalformedDocument);
}

#[test]
fn containers_carry_flattened_attributes_and_hierarchy() {
    let doc = document(json!({
        "B": {
            "type": "Building",
            "children": ["P1", "P2"],
            "attributes": {"yearOfConstruction": 1990, "address": {"city": "Delft"}}
        },
        "P1": {"type": "BuildingPart", "parents": ["B"], "geometry": [
            {"type": "MultiSurface", "lod": "1.2", "boundaries": [[[0, 1, 2]]]}
        ]},
        "P2": {"type": "BuildingPart", "parents": ["B"]}
    }));
    let result = import(&doc);

    let ids: Vec<&str> = result.containers.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["B", "P1", "P2"]);

    let building = result.container("B").unwrap();
    let keys: Vec<&str> = building.properties.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["type", "attributes.yearOfConstruction", "attributes.address.city"]
    );
    assert_eq!(building.parent, None);
    assert_eq!(building.children, vec!["P1".to_string(), "P2".to_string()]);

    let part = result.container("P1").unwrap();
    assert_eq!(part.parent.as_deref(), Some("B"));
    assert_eq!(result.hierarchy.roots().collect::<Vec<_>>(), vec!["B"]);

    let meshes: Vec<_> = result.meshes_of("P1").collect();
    assert_eq!(meshes.len(), 1);
    assert_eq!(meshes[0].name, "0: [LoD1.2] P1");
    assert_eq!(meshes[0].properties.get("lod"), Some(&json!("1.2")));
    assert_eq!(result.meshes_of("P2").count(), 0);
}

#[test]
fn strategies_differ_only_in_material_identity() {
    let doc = document(json!({
        "A": {"type": "Building", "geometry": [{
            "type": "MultiSurface", "lod": 2,
            "boundaries": [[[0, 1, 2]], [[0, 2, 3]]],
            "semantics": {
                "surfaces": [{"type": "WallSurface"}, {"type": "RoofSurface"}],
                "values": [0, 1]
            }
        }]},
        "B": {"type": "Building", "geometry": [{
            "type": "MultiSurface", "lod": 2,
            "boundaries": [[[0, 1, 2]]],
            "semantics": {"surfaces": [{"type": "RoofSurface", "slope": 20}], "values": [0]}
        }]},
        "R": {"type": "Road", "geometry": [
            {"type": "MultiSurface", "lod": 1, "boundaries": [[[0, 1, 2, 3]]]}
        ]}
    }));

    let basic = import_with(&doc, MaterialStrategy::Basic, false);
    assert_eq!(basic.materials.len(), 3);

    let reuse = import_with(&doc, MaterialStrategy::Reuse, false);
    assert_eq!(reuse.materials.len(), 2);
    assert_eq!(reuse.meshes[0].materials[1], reuse.meshes[1].materials[0]);

    let by_type = import_with(&doc, MaterialStrategy::CityObjectType, false);
    assert_eq!(by_type.materials.len(), 2);
    assert_eq!(by_type.meshes[0].materials, by_type.meshes[1].materials);
    assert_ne!(by_type.meshes[0].materials, by_type.meshes[2].materials);
    assert_eq!(by_type.meshes[2].material_indices, vec![Some(0)]);

    for result in [&basic, &reuse, &by_type] {
        assert_eq!(result.meshes[0].faces, basic.meshes[0].faces);
        assert_eq!(result.meshes[2].vertices, basic.meshes[2].vertices);
    }
}

#[test]
fn parallel_and_sequential_imports_match() {
    let mut objects = serde_json::Map::new();
    for i in 0..64 {
        let surface = if i % 3 == 0 { "RoofSurface" } else { "WallSurface" };
        objects.insert(
            format!("B{}", i),
            json!({"type": "Building", "geometry": [{
                "type": "MultiSurface",
                "lod": 2,
                "boundaries": [[[0, 1, 2]], [[0, 2, 3]]],
                "semantics": {
                    "surfaces": [{"type": surface}, {"type": "GroundSurface"}],
                    "values": [0, 1]
                }
            }]}),
        );
    }
    let doc = document(Value::Object(objects));

    for strategy in [
        MaterialStrategy::Basic,
        MaterialStrategy::Reuse,
        MaterialStrategy::CityObjectType,
    ] {
        let sequential = import_with(&doc, strategy, false);
        let parallel = import_with(&doc, strategy, true);
        assert_eq!(sequential.meshes, parallel.meshes);
        assert_eq!(sequential.containers, parallel.containers);
        assert_eq!(sequential.materials, parallel.materials);
    }
}

#[test]
fn lod_groups_in_first_seen_order() {
    let doc = document(json!({
        "A": {"type": "Building", "geometry": [
            {"type": "MultiSurface", "lod": 2, "boundaries": [[[0, 1, 2]]]},
            {"type": "MultiSurface", "lod": 1, "boundaries": [[[0, 1, 2]]]}
        ]},
        "B": {"type": "Building", "geometry": [
            {"type": "MultiSurface", "lod": 2, "boundaries": [[[0, 1, 2]]]},
            {"type": "MultiSurface", "boundaries": [[[0, 1, 2]]]}
        ]}
    }));
    let result = import(&doc);

    assert_eq!(
        result.lod_groups(),
        vec![("LoD2".to_string(), vec![0, 2]), ("LoD1".to_string(), vec![1])]
    );
    assert_eq!(result.meshes[3].name, "1: B");
}

#[test]
fn result_serializes_without_hierarchy() {
    let doc = document(json!({
        "B1": {"type": "Building", "geometry": [{
            "type": "MultiSurface", "lod": 2,
            "boundaries": [[[0, 1, 2, 3]]],
            "semantics": {"surfaces": [{"type": "RoofSurface"}], "values": [0]}
        }]}
    }));
    let result = import(&doc);
    let value = serde_json::to_value(&result).unwrap();

    assert!(value.get("hierarchy").is_none());
    assert_eq!(value["meshes"][0]["name"], json!("0: [LoD2] B1"));
    assert_eq!(value["meshes"][0]["faces"], json!([[0, 1, 2, 3]]));
    assert_eq!(value["materials"][0]["type_tag"], json!("RoofSurface"));
    assert_eq!(value["containers"][0]["id"], json!("B1"));
}

#[test]
fn import_from_file() {
    let doc = document(json!({
        "B1": {"type": "Building", "geometry": [
            {"type": "MultiSurface", "lod": 2, "boundaries": [[[0, 1, 2, 3]]]}
        ]}
    }));
    let path = std::env::temp_dir().join(format!("cityjson-import-{}.city.json", std::process::id()));
    std::fs::write(&path, doc).unwrap();

    let result = CityJsonImporter::new(ImportConfig::default()).import_path(&path);
    std::fs::remove_file(&path).ok();

    let result = result.unwrap();
    assert_eq!(result.version.as_deref(), Some("1.1"));
    assert_eq!(result.meshes.len(), 1);

    let missing = CityJsonImporter::new(ImportConfig::default())
        .import_path(std::env::temp_dir().join("does-not-exist.city.json"))
        .unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::Io);
}
