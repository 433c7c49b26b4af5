// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Import result types

use std::fmt;

use cityjson_lite_core::{GeometryInstance, GeometryKind, Lod};
use cityjson_lite_geometry::{
    triangulate_faces, CoordinateShift, Face, Mesh, ModelBounds, Point3,
};
use serde::Serialize;

use crate::hierarchy::Hierarchy;
use crate::materials::{Material, MaterialId, MaterialLibrary};
use crate::properties::PropertyMap;

/// Name of the collection grouping meshes of one LoD.
pub fn lod_collection_name(lod: &Lod) -> String {
    format!("LoD{}", lod)
}

/// Name of the per-LoD scene.
pub fn lod_scene_name(lod: &Lod) -> String {
    format!("LoD {}", lod)
}

/// Template reference carried by a `GeometryInstance` mesh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceReference {
    pub template: Option<u32>,
    /// Anchor vertex index into the document's vertex pool.
    pub anchor: Option<u32>,
    pub transformation_matrix: Option<Vec<f64>>,
}

impl From<&GeometryInstance> for InstanceReference {
    fn from(instance: &GeometryInstance) -> Self {
        Self {
            template: instance.template,
            anchor: instance.boundaries.first().copied(),
            transformation_matrix: instance.transformation_matrix.clone(),
        }
    }
}

/// One mesh, built from one geometry of a city object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshDescriptor {
    /// `"{index}: [LoD{lod}] {id}"`, `"{index}: [GeometryInstance] {id}"`
    /// or `"{index}: {id}"`.
    pub name: String,
    /// Id of the owning container.
    pub object_id: String,
    /// Position of the geometry in the object's `geometry` array.
    pub geometry_index: usize,
    pub kind: GeometryKind,
    pub lod: Option<Lod>,
    /// Compacted, shifted vertices.
    pub vertices: Vec<Point3<f64>>,
    /// Polygon faces, indexing into `vertices`.
    pub faces: Vec<Face>,
    /// Material slots of this mesh.
    pub materials: Vec<MaterialId>,
    /// Slot into `materials` for each face.
    pub material_indices: Vec<Option<u32>>,
    /// Mesh-level properties (`lod`).
    pub properties: PropertyMap,
    pub instance: Option<InstanceReference>,
}

impl MeshDescriptor {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Material assigned to face `face`, if any.
    pub fn material_for_face(&self, face: usize) -> Option<MaterialId> {
        let slot = (*self.material_indices.get(face)?)?;
        self.materials.get(slot as usize).copied()
    }

    /// Triangulate the polygon faces for rendering.
    pub fn to_triangle_mesh(&self) -> cityjson_lite_geometry::Result<Mesh> {
        triangulate_faces(&self.vertices, &self.faces)
    }
}

/// One city object, as a node of the output scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerNode {
    pub id: String,
    pub object_type: String,
    /// Flattened attributes, including `type`.
    pub properties: PropertyMap,
    pub parent: Option<String>,
    pub children: Vec<String>,
    /// Indices into [`ImportResult::meshes`].
    pub meshes: Vec<usize>,
}

/// Non-fatal anomaly found while importing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Diagnostic {
    /// More semantic values than surfaces; the extra values were dropped.
    SemanticsLengthMismatch {
        mesh: String,
        surfaces: usize,
        values: usize,
    },
    /// A semantic value pointed past the surface list; the face has no material.
    SemanticIndexOutOfRange {
        mesh: String,
        index: u32,
        surfaces: usize,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::SemanticsLengthMismatch {
                mesh,
                surfaces,
                values,
            } => write!(
                f,
                "{}: {} semantic values for {} surfaces, extra values ignored",
                mesh, values, surfaces
            ),
            Diagnostic::SemanticIndexOutOfRange {
                mesh,
                index,
                surfaces,
            } => write!(
                f,
                "{}: semantic value {} out of range for {} surfaces",
                mesh, index, surfaces
            ),
        }
    }
}

/// Counters and timings for one import.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportStats {
    pub objects: usize,
    pub meshes: usize,
    pub vertices: usize,
    pub faces: usize,
    pub skipped_surfaces: usize,
    pub materials: usize,
    pub decode_time_ms: u64,
    pub resolve_time_ms: u64,
    pub hierarchy_time_ms: u64,
    pub total_time_ms: u64,
}

/// Everything produced by a successful import.
#[derive(Debug, Clone, Serialize)]
pub struct ImportResult {
    pub version: Option<String>,
    /// One container per city object, in document order.
    pub containers: Vec<ContainerNode>,
    pub meshes: Vec<MeshDescriptor>,
    pub materials: MaterialLibrary,
    /// Offset subtracted from every vertex.
    pub shift: CoordinateShift,
    /// Bounds of the transformed vertices, before shifting.
    pub bounds: ModelBounds,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: ImportStats,
    #[serde(skip)]
    pub hierarchy: Hierarchy,
}

impl ImportResult {
    pub fn container(&self, id: &str) -> Option<&ContainerNode> {
        self.containers.iter().find(|c| c.id == id)
    }

    /// Meshes of the container `id`, in geometry order.
    pub fn meshes_of<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a MeshDescriptor> + 'a {
        self.container(id)
            .map(|c| c.meshes.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(move |&i| self.meshes.get(i))
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    /// Mesh indices grouped by LoD collection name, in first-seen order.
    ///
    /// Instances and meshes without a LoD are not grouped.
    pub fn lod_groups(&self) -> Vec<(String, Vec<usize>)> {
        let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
        for (index, mesh) in self.meshes.iter().enumerate() {
            if mesh.instance.is_some() {
                continue;
            }
            let Some(lod) = &mesh.lod else {
                continue;
            };
            let name = lod_collection_name(lod);
            match groups.iter_mut().find(|(n, _)| *n == name) {
                Some((_, members)) => members.push(index),
                None => groups.push((name, vec![index])),
            }
        }
        groups
    }

    /// Whether the import finished without diagnostics.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}
