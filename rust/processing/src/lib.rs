// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # CityJSON-Lite Processing
//!
//! Imports CityJSON documents into renderer-agnostic mesh descriptors.
//!
//! ## Overview
//!
//! - **Materials**: semantic surfaces are bound to materials by one of three
//!   [`SemanticResolver`] strategies, chosen once per import.
//! - **Attributes**: nested attribute maps are flattened to dotted keys.
//! - **Hierarchy**: city objects are linked to their first declared parent.
//! - **Orchestration**: [`CityJsonImporter`] decodes objects in parallel and
//!   resolves materials in document order, so output is deterministic.
//!
//! ## Quick Start
//!
//! ```rust
//! use cityjson_lite_processing::{CityJsonImporter, ImportConfig, MaterialStrategy};
//!
//! let doc = r#"{
//!     "type": "CityJSON",
//!     "vertices": [[0, 0, 0], [10, 0, 0], [10, 10, 0], [0, 10, 0]],
//!     "CityObjects": {
//!         "B1": {"type": "Building", "geometry": [{
//!             "type": "MultiSurface", "lod": 2, "boundaries": [[[0, 1, 2, 3]]],
//!             "semantics": {"surfaces": [{"type": "RoofSurface"}], "values": [0]}
//!         }]}
//!     }
//! }"#;
//!
//! let config = ImportConfig::default().with_materials(MaterialStrategy::Reuse);
//! let result = CityJsonImporter::new(config).import_str(doc).unwrap();
//!
//! assert_eq!(result.meshes.len(), 1);
//! assert_eq!(result.meshes[0].name, "0: [LoD2] B1");
//! assert_eq!(result.materials.len(), 1);
//! ```

pub mod config;
pub mod error;
pub mod hierarchy;
pub mod importer;
pub mod materials;
pub mod properties;
pub mod semantics;
pub mod types;

pub use config::ImportConfig;
pub use error::{Error, ErrorKind, Result};
pub use hierarchy::{Hierarchy, HierarchyNode, NodeKey};
pub use importer::CityJsonImporter;
pub use materials::{
    object_type_color, surface_color, BasicResolver, CityObjectTypeResolver, Material,
    MaterialId, MaterialLibrary, MaterialSource, MaterialStrategy, ReuseResolver,
    SemanticResolver, SurfaceBinding,
};
pub use properties::{flatten_properties, object_properties, PropertyMap};
pub use semantics::{resolve_materials, ResolvedMaterials};
pub use types::{
    lod_collection_name, lod_scene_name, ContainerNode, Diagnostic, ImportResult, ImportStats,
    InstanceReference, MeshDescriptor,
};
