// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CityJSON import orchestration
//!
//! An import runs in four phases:
//!
//! 1. normalize the vertex pool once (transform, then re-center)
//! 2. decode every city object: flatten, compact and map attributes. Objects
//!    are independent, so this phase runs on the rayon pool when enabled
//! 3. resolve materials on a single thread, in document order, so material
//!    ids do not depend on scheduling
//! 4. link the hierarchy once every object exists
//!
//! Results are only returned after all phases succeed.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cityjson_lite_core::{CityModel, CityObject, Geometry};
use cityjson_lite_geometry::{
    compact_faces, flatten_geometry, normalize_vertices, CompactedMesh, FlattenedGeometry,
    VertexPool,
};
use rayon::prelude::*;

use crate::config::ImportConfig;
use crate::error::{Error, Result};
use crate::hierarchy::Hierarchy;
use crate::materials::{MaterialLibrary, SemanticResolver};
use crate::properties::{object_properties, PropertyMap};
use crate::semantics::resolve_materials;
use crate::types::{ContainerNode, ImportResult, ImportStats, InstanceReference, MeshDescriptor};

/// Output of phase 2 for one geometry.
struct DecodedGeometry {
    flattened: FlattenedGeometry,
    mesh: CompactedMesh,
}

/// Output of phase 2 for one city object.
struct DecodedObject {
    properties: PropertyMap,
    geometries: Vec<DecodedGeometry>,
}

/// Imports CityJSON documents into mesh descriptors and containers.
pub struct CityJsonImporter {
    config: ImportConfig,
    resolver: Box<dyn SemanticResolver>,
    cancel: Option<Arc<AtomicBool>>,
}

impl CityJsonImporter {
    /// Create an importer using the resolver selected by `config.materials`.
    pub fn new(config: ImportConfig) -> Self {
        Self {
            resolver: config.materials.resolver(),
            config,
            cancel: None,
        }
    }

    /// Create an importer with a caller-supplied resolver.
    ///
    /// `config.materials` is ignored.
    pub fn with_resolver(config: ImportConfig, resolver: Box<dyn SemanticResolver>) -> Self {
        Self {
            config,
            resolver,
            cancel: None,
        }
    }

    /// Abort with [`Error::Cancelled`] once `flag` is set.
    ///
    /// The flag is checked between city objects.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Read and import the document at `path`.
    pub fn import_path<P: AsRef<Path>>(&mut self, path: P) -> Result<ImportResult> {
        let path = path.as_ref();
        let parse_start = std::time::Instant::now();
        let model = CityModel::from_path(path)?;
        tracing::info!(
            path = %path.display(),
            objects = model.len(),
            parse_time_ms = parse_start.elapsed().as_millis(),
            "Parsed CityJSON document"
        );
        self.import_model(&model)
    }

    /// Parse and import a document held in memory.
    pub fn import_str(&mut self, content: &str) -> Result<ImportResult> {
        let model: CityModel = content.parse()?;
        self.import_model(&model)
    }

    /// Import an already decoded document.
    pub fn import_model(&mut self, model: &CityModel) -> Result<ImportResult> {
        let total_start = std::time::Instant::now();
        let strategy = self.resolver.strategy();

        tracing::info!(
            objects = model.len(),
            vertices = model.vertices.len(),
            materials = %strategy,
            parallel = self.config.parallel,
            "Starting CityJSON import"
        );

        self.resolver.reset();
        let cancel = self.cancel.as_deref();

        let normalized = normalize_vertices(&model.vertices, model.transform.as_ref())?;
        if normalized.shift.is_significant() {
            tracing::debug!(
                shift_x = normalized.shift.x,
                shift_y = normalized.shift.y,
                shift_z = normalized.shift.z,
                "Re-centered vertex pool"
            );
        }

        let decode_start = std::time::Instant::now();
        let pool = &normalized.pool;
        let decoded: Vec<DecodedObject> = if self.config.parallel {
            model
                .objects()
                .par_iter()
                .map(|object| decode_object(object, pool, cancel))
                .collect::<Result<Vec<_>>>()?
        } else {
            model
                .objects()
                .iter()
                .map(|object| decode_object(object, pool, cancel))
                .collect::<Result<Vec<_>>>()?
        };
        let decode_time = decode_start.elapsed();
        tracing::debug!(
            objects = decoded.len(),
            decode_time_ms = decode_time.as_millis(),
            "Decode phase complete"
        );

        let resolve_start = std::time::Instant::now();
        let mut library = MaterialLibrary::new();
        let mut diagnostics = Vec::new();
        let mut containers = Vec::with_capacity(model.len());
        let mut meshes = Vec::new();
        let mut skipped_surfaces = 0;

        for (object, decoded) in model.objects().iter().zip(decoded) {
            check_cancelled(cancel)?;

            let mut container = ContainerNode {
                id: object.id.clone(),
                object_type: object.object_type.clone(),
                properties: decoded.properties,
                parent: None,
                children: Vec::new(),
                meshes: Vec::with_capacity(decoded.geometries.len()),
            };

            for (index, (geometry, part)) in
                object.geometry.iter().zip(decoded.geometries).enumerate()
            {
                let name = geometry.display_name(index, &object.id);
                let resolved = resolve_materials(
                    self.resolver.as_mut(),
                    geometry,
                    object,
                    &part.flattened,
                    &mut library,
                    &name,
                    &mut diagnostics,
                );
                skipped_surfaces += part.flattened.skipped();

                let mut properties = PropertyMap::new();
                if let Some(lod) = geometry.lod() {
                    properties.insert("lod".into(), lod.clone().into());
                }
                let instance = match geometry {
                    Geometry::GeometryInstance(instance) => Some(InstanceReference::from(instance)),
                    _ => None,
                };

                container.meshes.push(meshes.len());
                meshes.push(MeshDescriptor {
                    name,
                    object_id: object.id.clone(),
                    geometry_index: index,
                    kind: geometry.kind(),
                    lod: geometry.lod().cloned(),
                    vertices: part.mesh.vertices,
                    faces: part.mesh.faces,
                    materials: resolved.materials,
                    material_indices: resolved.indices,
                    properties,
                    instance,
                });
            }

            containers.push(container);
        }
        let resolve_time = resolve_start.elapsed();
        tracing::debug!(
            meshes = meshes.len(),
            materials = library.len(),
            diagnostics = diagnostics.len(),
            resolve_time_ms = resolve_time.as_millis(),
            "Resolve phase complete"
        );

        let hierarchy_start = std::time::Instant::now();
        let hierarchy = Hierarchy::build(model)?;
        for container in &mut containers {
            container.parent = hierarchy.parent_of(&container.id).map(str::to_owned);
            container.children = hierarchy
                .children_of(&container.id)
                .into_iter()
                .map(str::to_owned)
                .collect();
        }
        let hierarchy_time = hierarchy_start.elapsed();
        let total_time = total_start.elapsed();

        let stats = ImportStats {
            objects: containers.len(),
            meshes: meshes.len(),
            vertices: meshes.iter().map(MeshDescriptor::vertex_count).sum(),
            faces: meshes.iter().map(MeshDescriptor::face_count).sum(),
            skipped_surfaces,
            materials: library.len(),
            decode_time_ms: decode_time.as_millis() as u64,
            resolve_time_ms: resolve_time.as_millis() as u64,
            hierarchy_time_ms: hierarchy_time.as_millis() as u64,
            total_time_ms: total_time.as_millis() as u64,
        };

        tracing::info!(
            objects = stats.objects,
            meshes = stats.meshes,
            vertices = stats.vertices,
            faces = stats.faces,
            materials = stats.materials,
            total_time_ms = stats.total_time_ms,
            "CityJSON import complete"
        );

        Ok(ImportResult {
            version: model.version.clone(),
            containers,
            meshes,
            materials: library,
            shift: normalized.shift,
            bounds: normalized.bounds,
            diagnostics,
            stats,
            hierarchy,
        })
    }
}

fn check_cancelled(cancel: Option<&AtomicBool>) -> Result<()> {
    match cancel {
        Some(flag) if flag.load(Ordering::Relaxed) => Err(Error::Cancelled),
        _ => Ok(()),
    }
}

fn decode_object(
    object: &CityObject,
    pool: &VertexPool,
    cancel: Option<&AtomicBool>,
) -> Result<DecodedObject> {
    check_cancelled(cancel)?;

    let geometries = object
        .geometry
        .iter()
        .map(|geometry| -> Result<DecodedGeometry> {
            let flattened = flatten_geometry(geometry);
            let mesh = compact_faces(pool, &flattened.faces)?;
            Ok(DecodedGeometry { flattened, mesh })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(DecodedObject {
        properties: object_properties(object),
        geometries,
    })
}
