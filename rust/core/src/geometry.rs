// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CityJSON geometry objects
//!
//! A geometry's `type` member is resolved once into the closed [`Geometry`]
//! variant. Each boundary-carrying variant stores its boundaries and semantic
//! values with the nesting depth of that type, so every consumer has to match
//! exhaustively instead of branching on strings.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Indices into the shared vertex pool describing one closed ring.
pub type Ring = Vec<u32>;

/// One surface: the outer ring followed by zero or more hole rings.
pub type Surface = Vec<Ring>;

/// Boundaries of a `MultiSurface` / `CompositeSurface`.
pub type SurfaceBoundaries = Vec<Surface>;

/// Boundaries of a `Solid`: a list of shells.
pub type ShellBoundaries = Vec<SurfaceBoundaries>;

/// Boundaries of a `MultiSolid` / `CompositeSolid`: a list of solids.
pub type SolidBoundaries = Vec<ShellBoundaries>;

/// Index into `semantics.surfaces`, or `None` when a surface is unclassified.
pub type SemanticIndex = Option<u32>;

/// Level of detail label. Only ever displayed, never parsed numerically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Lod {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for Lod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lod::Number(n) => write!(f, "{}", n),
            Lod::Text(s) => f.write_str(s),
        }
    }
}

impl From<Lod> for Value {
    fn from(lod: Lod) -> Self {
        match lod {
            Lod::Number(n) => Value::Number(n),
            Lod::Text(s) => Value::String(s),
        }
    }
}

/// A semantic surface: a classification tag plus arbitrary attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceDescriptor {
    #[serde(rename = "type")]
    pub surface_type: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl SurfaceDescriptor {
    /// Create a descriptor without extra attributes.
    pub fn new(surface_type: impl Into<String>) -> Self {
        Self {
            surface_type: surface_type.into(),
            attributes: Map::new(),
        }
    }

    /// The descriptor as a JSON object, `type` first.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::with_capacity(self.attributes.len() + 1);
        map.insert("type".to_string(), Value::String(self.surface_type.clone()));
        for (key, value) in &self.attributes {
            map.insert(key.clone(), value.clone());
        }
        map
    }
}

/// The `semantics` block of a geometry.
///
/// `values` mirrors the nesting of the owning geometry's boundaries minus
/// the ring level: one entry per surface.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Semantics<V> {
    #[serde(default)]
    pub surfaces: Vec<SurfaceDescriptor>,
    pub values: Option<V>,
}

/// A geometry that carries boundaries of type `B` and semantic values of type `V`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BoundaryGeometry<B, V> {
    pub lod: Option<Lod>,
    pub boundaries: B,
    pub semantics: Option<Semantics<V>>,
}

/// Semantic values of one shell, one per surface.
pub type ShellValues = Vec<SemanticIndex>;

/// Semantic values of a solid. A `null` shell has no classified surface.
pub type SolidValues = Vec<Option<ShellValues>>;

/// Semantic values of a multi-solid. A `null` solid has no classified surface.
pub type MultiSolidValues = Vec<Option<SolidValues>>;

pub type SurfaceGeometry = BoundaryGeometry<SurfaceBoundaries, ShellValues>;
pub type SolidGeometry = BoundaryGeometry<ShellBoundaries, SolidValues>;
pub type MultiSolidGeometry = BoundaryGeometry<SolidBoundaries, MultiSolidValues>;

/// A reference to a geometry template. No faces of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryInstance {
    /// Index into the document's geometry templates.
    pub template: Option<u32>,
    /// The single anchor vertex, as an index into the vertex pool.
    #[serde(default)]
    pub boundaries: Vec<u32>,
    /// Row-major 4x4 matrix placing the template at the anchor.
    pub transformation_matrix: Option<Vec<f64>>,
}

/// Discriminant for geometry variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    MultiSurface,
    CompositeSurface,
    Solid,
    MultiSolid,
    CompositeSolid,
    GeometryInstance,
}

impl GeometryKind {
    /// Returns the CityJSON type tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::MultiSurface => "MultiSurface",
            GeometryKind::CompositeSurface => "CompositeSurface",
            GeometryKind::Solid => "Solid",
            GeometryKind::MultiSolid => "MultiSolid",
            GeometryKind::CompositeSolid => "CompositeSolid",
            GeometryKind::GeometryInstance => "GeometryInstance",
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeometryKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "MultiSurface" => Ok(GeometryKind::MultiSurface),
            "CompositeSurface" => Ok(GeometryKind::CompositeSurface),
            "Solid" => Ok(GeometryKind::Solid),
            "MultiSolid" => Ok(GeometryKind::MultiSolid),
            "CompositeSolid" => Ok(GeometryKind::CompositeSolid),
            "GeometryInstance" => Ok(GeometryKind::GeometryInstance),
            other => Err(Error::UnsupportedGeometryType(other.to_string())),
        }
    }
}

/// A decoded CityJSON geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    MultiSurface(SurfaceGeometry),
    CompositeSurface(SurfaceGeometry),
    Solid(SolidGeometry),
    MultiSolid(MultiSolidGeometry),
    CompositeSolid(MultiSolidGeometry),
    GeometryInstance(GeometryInstance),
}

impl Geometry {
    /// Decode one entry of a CityObject's `geometry` array.
    pub fn from_json(value: &Value) -> Result<Self> {
        let tag = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::MalformedDocument("geometry without a \"type\" member".into()))?;
        let kind: GeometryKind = tag.parse()?;

        Ok(match kind {
            GeometryKind::MultiSurface => Geometry::MultiSurface(decode(kind, value)?),
            GeometryKind::CompositeSurface => Geometry::CompositeSurface(decode(kind, value)?),
            GeometryKind::Solid => Geometry::Solid(decode(kind, value)?),
            GeometryKind::MultiSolid => Geometry::MultiSolid(decode(kind, value)?),
            GeometryKind::CompositeSolid => Geometry::CompositeSolid(decode(kind, value)?),
            GeometryKind::GeometryInstance => Geometry::GeometryInstance(decode(kind, value)?),
        })
    }

    /// Returns the variant discriminant.
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::MultiSurface(_) => GeometryKind::MultiSurface,
            Geometry::CompositeSurface(_) => GeometryKind::CompositeSurface,
            Geometry::Solid(_) => GeometryKind::Solid,
            Geometry::MultiSolid(_) => GeometryKind::MultiSolid,
            Geometry::CompositeSolid(_) => GeometryKind::CompositeSolid,
            Geometry::GeometryInstance(_) => GeometryKind::GeometryInstance,
        }
    }

    /// The level of detail label, if the geometry has one.
    pub fn lod(&self) -> Option<&Lod> {
        match self {
            Geometry::MultiSurface(g) | Geometry::CompositeSurface(g) => g.lod.as_ref(),
            Geometry::Solid(g) => g.lod.as_ref(),
            Geometry::MultiSolid(g) | Geometry::CompositeSolid(g) => g.lod.as_ref(),
            Geometry::GeometryInstance(_) => None,
        }
    }

    /// The semantic surfaces declared by this geometry (empty without semantics).
    pub fn semantic_surfaces(&self) -> &[SurfaceDescriptor] {
        let semantics = match self {
            Geometry::MultiSurface(g) | Geometry::CompositeSurface(g) => {
                g.semantics.as_ref().map(|s| &s.surfaces)
            }
            Geometry::Solid(g) => g.semantics.as_ref().map(|s| &s.surfaces),
            Geometry::MultiSolid(g) | Geometry::CompositeSolid(g) => {
                g.semantics.as_ref().map(|s| &s.surfaces)
            }
            Geometry::GeometryInstance(_) => None,
        };
        semantics.map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether a `semantics` block is present.
    pub fn has_semantics(&self) -> bool {
        match self {
            Geometry::MultiSurface(g) | Geometry::CompositeSurface(g) => g.semantics.is_some(),
            Geometry::Solid(g) => g.semantics.is_some(),
            Geometry::MultiSolid(g) | Geometry::CompositeSolid(g) => g.semantics.is_some(),
            Geometry::GeometryInstance(_) => false,
        }
    }

    /// Display name of the mesh built from this geometry.
    ///
    /// Instances are always labelled `GeometryInstance`; downstream grouping
    /// relies on that label rather than on a LoD. Other geometries without a
    /// LoD get no label at all, so they are never mistaken for instances.
    pub fn display_name(&self, index: usize, object_id: &str) -> String {
        match (self, self.lod()) {
            (Geometry::GeometryInstance(_), _) => {
                format!("{}: [GeometryInstance] {}", index, object_id)
            }
            (_, Some(lod)) => format!("{}: [LoD{}] {}", index, lod, object_id),
            (_, None) => format!("{}: {}", index, object_id),
        }
    }
}

fn decode<T: DeserializeOwned>(kind: GeometryKind, value: &Value) -> Result<T> {
    T::deserialize(value).map_err(|e| Error::MalformedDocument(format!("{} geometry: {}", kind, e)))
}
