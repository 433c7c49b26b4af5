// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boundary flattening
//!
//! Walks a geometry's nested boundaries and yields one face per surface: the
//! surface's outer ring. Hole rings are dropped. Semantic values are walked
//! with the same traversal so that value `i` and surface `i` always refer to
//! the same source surface.

use cityjson_lite_core::{Geometry, SemanticIndex, Surface};
use smallvec::SmallVec;

/// Vertex indices of one face's outer ring
pub type Face = SmallVec<[u32; 8]>;

/// Faces of one geometry, in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlattenedGeometry {
    /// Outer rings, indices still pointing into the shared pool
    pub faces: Vec<Face>,
    /// Position of each face among all surfaces of the geometry, skipped ones included
    pub source_slots: Vec<usize>,
    /// Number of surfaces in the source, before skipping
    pub surface_count: usize,
}

impl FlattenedGeometry {
    #[inline]
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Number of surfaces that produced no face
    #[inline]
    pub fn skipped(&self) -> usize {
        self.surface_count - self.faces.len()
    }

    /// Total number of vertex references across all faces
    pub fn vertex_reference_count(&self) -> usize {
        self.faces.iter().map(|f| f.len()).sum()
    }
}

/// Surfaces of a geometry in traversal order.
///
/// `MultiSurface`/`CompositeSurface` are used as-is, `Solid` flattens shells,
/// `MultiSolid`/`CompositeSolid` flatten solids then shells. Instances have none.
pub fn surfaces(geometry: &Geometry) -> Vec<&Surface> {
    match geometry {
        Geometry::MultiSurface(g) | Geometry::CompositeSurface(g) => g.boundaries.iter().collect(),
        Geometry::Solid(g) => g.boundaries.iter().flatten().collect(),
        Geometry::MultiSolid(g) | Geometry::CompositeSolid(g) => {
            g.boundaries.iter().flatten().flatten().collect()
        }
        Geometry::GeometryInstance(_) => Vec::new(),
    }
}

/// Flatten a geometry into its outer-ring faces.
///
/// A surface without rings, or whose outer ring is empty, yields no face.
pub fn flatten_geometry(geometry: &Geometry) -> FlattenedGeometry {
    let surfaces = surfaces(geometry);
    let mut faces = Vec::with_capacity(surfaces.len());
    let mut source_slots = Vec::with_capacity(surfaces.len());

    for (slot, surface) in surfaces.iter().enumerate() {
        match surface.first() {
            Some(outer) if !outer.is_empty() => {
                faces.push(Face::from_slice(outer));
                source_slots.push(slot);
            }
            _ => {}
        }
    }

    FlattenedGeometry {
        faces,
        source_slots,
        surface_count: surfaces.len(),
    }
}

/// Flatten `semantics.values` with the same traversal as [`surfaces`].
///
/// A `null` shell or solid stands for one `None` per surface of the matching
/// boundary shell or solid. Returns `None` when the geometry has no semantics
/// or no values.
pub fn semantic_values(geometry: &Geometry) -> Option<Vec<SemanticIndex>> {
    match geometry {
        Geometry::MultiSurface(g) | Geometry::CompositeSurface(g) => {
            g.semantics.as_ref()?.values.clone()
        }
        Geometry::Solid(g) => {
            let values = g.semantics.as_ref()?.values.as_ref()?;
            let mut out = Vec::new();
            for (i, shell) in values.iter().enumerate() {
                push_shell(&mut out, shell.as_deref(), g.boundaries.get(i).map_or(0, Vec::len));
            }
            Some(out)
        }
        Geometry::MultiSolid(g) | Geometry::CompositeSolid(g) => {
            let values = g.semantics.as_ref()?.values.as_ref()?;
            let mut out = Vec::new();
            for (i, solid) in values.iter().enumerate() {
                let shells = g.boundaries.get(i).map(Vec::as_slice).unwrap_or(&[]);
                match solid {
                    Some(solid) => {
                        for (j, shell) in solid.iter().enumerate() {
                            push_shell(&mut out, shell.as_deref(), shells.get(j).map_or(0, Vec::len));
                        }
                    }
                    None => {
                        let count = shells.iter().map(Vec::len).sum();
                        out.extend(std::iter::repeat(None).take(count));
                    }
                }
            }
            Some(out)
        }
        Geometry::GeometryInstance(_) => None,
    }
}

fn push_shell(out: &mut Vec<SemanticIndex>, shell: Option<&[SemanticIndex]>, surface_count: usize) {
    match shell {
        Some(values) => out.extend_from_slice(values),
        None => out.extend(std::iter::repeat(None).take(surface_count)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn geometry(value: serde_json::Value) -> Geometry {
        Geometry::from_json(&value).unwrap()
    }

    #[test]
    fn multisurface_takes_outer_rings() {
        let g = geometry(json!({
            "type": "MultiSurface",
            "lod": 2,
            "boundaries": [[[0, 1, 2, 3]], [[4, 5, 6], [7, 8, 9]]]
        }));
        let flat = flatten_geometry(&g);
        assert_eq!(flat.len(), 2);
        assert_eq!(flat.faces[0].as_slice(), &[0, 1, 2, 3]);
        // Hole [7, 8, 9] dropped
        assert_eq!(flat.faces[1].as_slice(), &[4, 5, 6]);
        assert_eq!(flat.vertex_reference_count(), 7);
    }

    #[test]
    fn solid_with_two_shells_of_three_faces() {
        let g = geometry(json!({
            "type": "Solid",
            "lod": 2,
            "boundaries": [
                [[[0, 1, 2]], [[1, 2, 3]], [[2, 3, 4]]],
                [[[5, 6, 7]], [[6, 7, 8]], [[7, 8, 9]]]
            ]
        }));
        let flat = flatten_geometry(&g);
        assert_eq!(flat.len(), 6);
        assert_eq!(flat.faces[3].as_slice(), &[5, 6, 7]);
        assert_eq!(flat.source_slots, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn multisolid_flattens_two_levels() {
        let g = geometry(json!({
            "type": "MultiSolid",
            "lod": 1,
            "boundaries": [
                [[[[0, 1, 2]], [[2, 3, 0]]]],
                [[[[4, 5, 6]]], [[[6, 7, 4]]]]
            ]
        }));
        let flat = flatten_geometry(&g);
        let faces: Vec<Vec<u32>> = flat.faces.iter().map(|f| f.to_vec()).collect();
        assert_eq!(
            faces,
            vec![vec![0, 1, 2], vec![2, 3, 0], vec![4, 5, 6], vec![6, 7, 4]]
        );
    }

    #[test]
    fn composite_solid_matches_multisolid() {
        let boundaries = json!([[[[[0, 1, 2]], [[3, 4, 5]]]]]);
        let multi = geometry(json!({"type": "MultiSolid", "lod": 2, "boundaries": boundaries}));
        let composite =
            geometry(json!({"type": "CompositeSolid", "lod": 2, "boundaries": boundaries}));
        assert_eq!(flatten_geometry(&multi).faces, flatten_geometry(&composite).faces);
    }

    #[test]
    fn empty_surfaces_are_skipped_but_keep_slots() {
        let g = geometry(json!({
            "type": "CompositeSurface",
            "lod": 2,
            "boundaries": [[[0, 1, 2]], [], [[]], [[3, 4, 5]]]
        }));
        let flat = flatten_geometry(&g);
        assert_eq!(flat.len(), 2);
        assert_eq!(flat.surface_count, 4);
        assert_eq!(flat.skipped(), 2);
        assert_eq!(flat.source_slots, vec![0, 3]);
    }

    #[test]
    fn instance_has_no_faces() {
        let g = geometry(json!({"type": "GeometryInstance", "template": 0, "boundaries": [3]}));
        let flat = flatten_geometry(&g);
        assert!(flat.is_empty());
        assert_eq!(flat.surface_count, 0);
        assert!(semantic_values(&g).is_none());
    }

    #[test]
    fn values_follow_surface_traversal() {
        let g = geometry(json!({
            "type": "MultiSolid",
            "lod": 2,
            "boundaries": [
                [[[[0, 1, 2]], [[2, 3, 0]]]],
                [[[[4, 5, 6]]]]
            ],
            "semantics": {
                "surfaces": [{"type": "WallSurface"}, {"type": "RoofSurface"}],
                "values": [[[0, null]], [[1]]]
            }
        }));
        assert_eq!(semantic_values(&g), Some(vec![Some(0), None, Some(1)]));
        assert_eq!(surfaces(&g).len(), 3);
    }

    #[test]
    fn null_shell_expands_to_its_surfaces() {
        let g = geometry(json!({
            "type": "Solid",
            "lod": 2,
            "boundaries": [
                [[[0, 1, 2]], [[1, 2, 3]]],
                [[[2, 3, 0]], [[3, 0, 1]]]
            ],
            "semantics": {
                "surfaces": [{"type": "GroundSurface"}],
                "values": [null, [0, null]]
            }
        }));
        assert_eq!(semantic_values(&g), Some(vec![None, None, Some(0), None]));
    }

    #[test]
    fn null_solid_expands_to_all_its_shells() {
        let g = geometry(json!({
            "type": "MultiSolid",
            "lod": 2,
            "boundaries": [
                [[[[0, 1, 2]], [[2, 3, 0]]], [[[4, 5, 6]]]],
                [[[[6, 7, 4]]]]
            ],
            "semantics": {
                "surfaces": [{"type": "RoofSurface"}],
                "values": [null, [[0]]]
            }
        }));
        assert_eq!(semantic_values(&g), Some(vec![None, None, None, Some(0)]));

        let g = geometry(json!({
            "type": "CompositeSolid",
            "lod": 2,
            "boundaries": [[[[[0, 1, 2]], [[2, 3, 0]]], [[[4, 5, 6]]]]],
            "semantics": {
                "surfaces": [{"type": "RoofSurface"}],
                "values": [[null, [0]]]
            }
        }));
        assert_eq!(semantic_values(&g), Some(vec![None, None, Some(0)]));
    }

    #[test]
    fn missing_values_yield_none() {
        let g = geometry(json!({
            "type": "MultiSurface",
            "lod": 2,
            "boundaries": [[[0, 1, 2]]],
            "semantics": {"surfaces": [{"type": "WallSurface"}]}
        }));
        assert!(semantic_values(&g).is_none());
    }
}
