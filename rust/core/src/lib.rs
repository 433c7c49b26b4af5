// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # CityJSON-Lite Core
//!
//! Document model and decoding for CityJSON city models.
//!
//! ## Overview
//!
//! - **Document decoding**: [`CityModel`] holds the raw vertex pool, the
//!   optional quantization [`Transform`] and every [`CityObject`] in
//!   document order.
//! - **Closed geometry variant**: each geometry's `type` tag is resolved once
//!   into [`Geometry`]; unknown tags fail with
//!   [`Error::UnsupportedGeometryType`] instead of being skipped.
//! - **Semantics**: semantic surfaces and their per-surface value arrays are
//!   kept with the nesting depth of their geometry.
//!
//! ## Quick Start
//!
//! ```rust
//! use cityjson_lite_core::{CityModel, GeometryKind};
//!
//! let doc = r#"{
//!     "type": "CityJSON",
//!     "vertices": [[0, 0, 0], [10, 0, 0], [10, 10, 0]],
//!     "CityObjects": {
//!         "B1": {"type": "Building", "geometry": [
//!             {"type": "MultiSurface", "lod": 2, "boundaries": [[[0, 1, 2]]]}
//!         ]}
//!     }
//! }"#;
//!
//! let model: CityModel = doc.parse().unwrap();
//! let building = model.get("B1").unwrap();
//! assert_eq!(building.geometry[0].kind(), GeometryKind::MultiSurface);
//! ```

pub mod city_object;
pub mod document;
pub mod error;
pub mod geometry;

pub use city_object::{CityObject, RESERVED_KEYS};
pub use document::{CityModel, Transform};
pub use error::{Error, Result};
pub use geometry::{
    BoundaryGeometry, Geometry, GeometryInstance, GeometryKind, Lod, MultiSolidGeometry,
    MultiSolidValues, Ring, SemanticIndex, Semantics, ShellBoundaries, ShellValues,
    SolidBoundaries, SolidGeometry, SolidValues, Surface, SurfaceBoundaries, SurfaceDescriptor,
    SurfaceGeometry,
};
