// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vertex compaction
//!
//! Copies the vertices a face list references out of the shared pool into a
//! local buffer and re-indexes the faces against it. Every reference gets its
//! own local vertex, in traversal order: two faces sharing a pool vertex end
//! up with two distinct local vertices, so unrelated faces are never welded.

use nalgebra::Point3;
use serde::Serialize;

use crate::flatten::Face;
use crate::normalize::VertexPool;
use crate::{Error, Result};

/// A self-contained polygon mesh
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompactedMesh {
    /// Local vertex buffer
    pub vertices: Vec<Point3<f64>>,
    /// Faces indexing into `vertices`
    pub faces: Vec<Face>,
}

impl CompactedMesh {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

/// Build a local vertex buffer for `faces`.
///
/// The result satisfies `vertices.len() == faces.iter().map(len).sum()` and
/// keeps per-face vertex order. Fails if a face references past the pool.
pub fn compact_faces(pool: &VertexPool, faces: &[Face]) -> Result<CompactedMesh> {
    let total: usize = faces.iter().map(|f| f.len()).sum();
    let mut vertices = Vec::with_capacity(total);
    let mut local_faces = Vec::with_capacity(faces.len());

    for face in faces {
        let mut local = Face::with_capacity(face.len());
        for &index in face {
            let point = pool.get(index).ok_or(Error::VertexIndexOutOfRange {
                index,
                len: pool.len(),
            })?;
            local.push(vertices.len() as u32);
            vertices.push(*point);
        }
        local_faces.push(local);
    }

    Ok(CompactedMesh {
        vertices,
        faces: local_faces,
    })
}
