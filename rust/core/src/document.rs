// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Top-level CityJSON document decoding
//!
//! The document is read once into a [`CityModel`]: the raw vertex pool, the
//! optional quantization transform, and an arena of [`CityObject`]s kept in
//! document order with an id → index map for reference resolution.

use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::city_object::CityObject;
use crate::error::{Error, Result};

/// Quantization transform: `real = raw * scale + translate`, per axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub scale: [f64; 3],
    pub translate: [f64; 3],
}

impl Transform {
    /// Apply the transform to one raw vertex.
    #[inline]
    pub fn apply(&self, raw: [f64; 3]) -> [f64; 3] {
        [
            raw[0] * self.scale[0] + self.translate[0],
            raw[1] * self.scale[1] + self.translate[1],
            raw[2] * self.scale[2] + self.translate[2],
        ]
    }
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(rename = "type")]
    doc_type: Option<String>,
    version: Option<String>,
    vertices: Vec<[f64; 3]>,
    transform: Option<Transform>,
    #[serde(rename = "CityObjects")]
    city_objects: Map<String, Value>,
}

/// A decoded CityJSON document.
#[derive(Debug, Clone)]
pub struct CityModel {
    /// Declared CityJSON version, when present.
    pub version: Option<String>,
    /// Raw vertex pool, before any transform.
    pub vertices: Vec<[f64; 3]>,
    pub transform: Option<Transform>,
    objects: Vec<CityObject>,
    index: FxHashMap<String, usize>,
}

impl CityModel {
    /// Decode a document from a JSON value.
    pub fn from_json(value: Value) -> Result<Self> {
        let raw: RawDocument = serde_json::from_value(value)?;

        if let Some(doc_type) = raw.doc_type.as_deref() {
            if doc_type != "CityJSON" {
                return Err(Error::MalformedDocument(format!(
                    "expected type \"CityJSON\", found \"{}\"",
                    doc_type
                )));
            }
        }

        let mut objects = Vec::with_capacity(raw.city_objects.len());
        let mut index = FxHashMap::default();
        for (id, value) in raw.city_objects {
            index.insert(id.clone(), objects.len());
            objects.push(CityObject::from_json(id, value)?);
        }

        Ok(Self {
            version: raw.version,
            vertices: raw.vertices,
            transform: raw.transform,
            objects,
            index,
        })
    }

    /// Decode a document from raw bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Self::from_json(serde_json::from_slice(bytes)?)
    }

    /// Decode a document from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_json(serde_json::from_reader(reader)?)
    }

    /// Read and decode a document from disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_slice(&bytes)
    }

    /// City objects in document order.
    #[inline]
    pub fn objects(&self) -> &[CityObject] {
        &self.objects
    }

    /// Position of an object in [`CityModel::objects`].
    #[inline]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Look up an object by id.
    pub fn get(&self, id: &str) -> Option<&CityObject> {
        self.index_of(id).map(|i| &self.objects[i])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of city objects that carry at least one geometry.
    pub fn geometry_object_count(&self) -> usize {
        self.objects.iter().filter(|o| !o.geometry.is_empty()).count()
    }
}

impl FromStr for CityModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_json(serde_json::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "type": "CityJSON",
        "version": "1.1",
        "transform": {"scale": [0.01, 0.01, 0.01], "translate": [1000.0, 2000.0, 0.0]},
        "vertices": [[100, 200, 50], [0, 0, 0], [10, 0, 0]],
        "CityObjects": {
            "Zeta": {"type": "Building", "geometry": []},
            "Alpha": {"type": "BuildingPart", "parents": ["Zeta"], "geometry": [
                {"type": "MultiSurface", "lod": 2, "boundaries": [[[0, 1, 2]]]}
            ]}
        }
    }"#;

    #[test]
    fn parses_document() {
        let model: CityModel = DOC.parse().unwrap();
        assert_eq!(model.version.as_deref(), Some("1.1"));
        assert_eq!(model.vertices.len(), 3);
        assert_eq!(model.len(), 2);
        assert_eq!(model.geometry_object_count(), 1);
        assert_eq!(model.get("Alpha").map(|o| o.object_type.as_str()), Some("BuildingPart"));
    }

    #[test]
    fn keeps_document_order() {
        let model: CityModel = DOC.parse().unwrap();
        let ids: Vec<&str> = model.objects().iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["Zeta", "Alpha"]);
        assert_eq!(model.index_of("Alpha"), Some(1));
        assert_eq!(model.index_of("Missing"), None);
    }

    #[test]
    fn transform_applies_per_axis() {
        let model: CityModel = DOC.parse().unwrap();
        let transform = model.transform.unwrap();
        let real = transform.apply(model.vertices[0]);
        assert!((real[0] - 1001.0).abs() < 1e-9);
        assert!((real[1] - 2002.0).abs() < 1e-9);
        assert!((real[2] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn transform_without_translate_is_malformed() {
        let doc = r#"{"transform": {"scale": [1, 1, 1]}, "vertices": [[0, 0, 0]], "CityObjects": {}}"#;
        assert!(matches!(doc.parse::<CityModel>(), Err(Error::MalformedDocument(_))));
    }

    #[test]
    fn missing_city_objects_is_malformed() {
        let doc = r#"{"type": "CityJSON", "vertices": [[0, 0, 0]]}"#;
        assert!(matches!(doc.parse::<CityModel>(), Err(Error::MalformedDocument(_))));
    }

    #[test]
    fn wrong_document_type_is_malformed() {
        let doc = r#"{"type": "GeoJSON", "vertices": [], "CityObjects": {}}"#;
        assert!(matches!(doc.parse::<CityModel>(), Err(Error::MalformedDocument(_))));
    }

    #[test]
    fn two_component_vertex_is_malformed() {
        let doc = r#"{"vertices": [[0, 0]], "CityObjects": {}}"#;
        assert!(matches!(doc.parse::<CityModel>(), Err(Error::MalformedDocument(_))));
    }
}
