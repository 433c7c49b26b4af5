// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-face material indices
//!
//! Turns a [`SurfaceBinding`] into the material list and per-face index
//! list carried by a mesh. Semantic values are read positionally, aligned to
//! the surfaces that survived flattening.

use cityjson_lite_core::{CityObject, Geometry};
use cityjson_lite_geometry::{semantic_values, FlattenedGeometry};
use tracing::{debug, warn};

use crate::materials::{MaterialId, MaterialLibrary, SemanticResolver, SurfaceBinding};
use crate::types::Diagnostic;

/// Materials of one mesh plus the material slot used by each face.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedMaterials {
    /// Materials in slot order.
    pub materials: Vec<MaterialId>,
    /// Slot into `materials` for each face, `None` for no material.
    pub indices: Vec<Option<u32>>,
}

/// Bind materials for `geometry` and compute one index per flattened face.
///
/// Anomalies in the semantic values are reported through `diagnostics`
/// and never abort the import.
pub fn resolve_materials(
    resolver: &mut dyn SemanticResolver,
    geometry: &Geometry,
    object: &CityObject,
    flattened: &FlattenedGeometry,
    library: &mut MaterialLibrary,
    mesh_name: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> ResolvedMaterials {
    let face_count = flattened.len();

    match resolver.bind(geometry, object, library) {
        SurfaceBinding::Unbound => ResolvedMaterials {
            materials: Vec::new(),
            indices: vec![None; face_count],
        },
        SurfaceBinding::Uniform(id) => ResolvedMaterials {
            materials: vec![id],
            indices: vec![Some(0); face_count],
        },
        SurfaceBinding::PerSurface(materials) => {
            let values = semantic_values(geometry).unwrap_or_default();

            if values.len() > flattened.surface_count {
                warn!(
                    mesh = mesh_name,
                    surfaces = flattened.surface_count,
                    values = values.len(),
                    "More semantic values than surfaces, extra values ignored"
                );
                diagnostics.push(Diagnostic::SemanticsLengthMismatch {
                    mesh: mesh_name.to_string(),
                    surfaces: flattened.surface_count,
                    values: values.len(),
                });
            } else if values.len() < flattened.surface_count {
                debug!(
                    mesh = mesh_name,
                    surfaces = flattened.surface_count,
                    values = values.len(),
                    "Fewer semantic values than surfaces"
                );
            }

            let indices = flattened
                .source_slots
                .iter()
                .map(|&slot| match values.get(slot).copied().flatten() {
                    Some(value) if (value as usize) < materials.len() => Some(value),
                    Some(value) => {
                        warn!(
                            mesh = mesh_name,
                            index = value,
                            surfaces = materials.len(),
                            "Semantic value points past the surface list"
                        );
                        diagnostics.push(Diagnostic::SemanticIndexOutOfRange {
                            mesh: mesh_name.to_string(),
                            index: value,
                            surfaces: materials.len(),
                        });
                        None
                    }
                    None => None,
                })
                .collect();

            ResolvedMaterials { materials, indices }
        }
    }
}
