//! CityJSON-Lite Geometry Processing
//!
//! Turns CityJSON boundaries into self-contained polygon meshes: coordinate
//! normalization of the shared vertex pool, flattening of nested boundaries
//! into outer-ring faces, and per-mesh vertex compaction. Polygon meshes can
//! be triangulated with earcutr for renderers that only draw triangles.

pub mod compact;
pub mod error;
pub mod flatten;
pub mod mesh;
pub mod normalize;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector3};

pub use compact::{compact_faces, CompactedMesh};
pub use error::{Error, Result};
pub use flatten::{flatten_geometry, semantic_values, surfaces, Face, FlattenedGeometry};
pub use mesh::Mesh;
pub use normalize::{
    normalize_vertices, recenter, CoordinateShift, ModelBounds, NormalizedVertices, VertexPool,
};
pub use triangulation::{calculate_polygon_normal, triangulate_faces, triangulate_polygon};
