// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation
//!
//! Faces are planar polygons in 3D. Each is projected onto its own plane
//! (Newell normal) and cut into triangles with earcutr.

use crate::flatten::Face;
use crate::mesh::Mesh;
use crate::{Error, Point2, Point3, Result, Vector3};

/// Check if a polygon is convex (all cross products have same sign)
#[inline]
fn is_convex(points: &[Point2<f64>]) -> bool {
    if points.len() < 3 {
        return false;
    }

    let n = points.len();
    let mut sign = 0i8;

    for i in 0..n {
        let p0 = &points[i];
        let p1 = &points[(i + 1) % n];
        let p2 = &points[(i + 2) % n];

        let cross = (p1.x - p0.x) * (p2.y - p1.y) - (p1.y - p0.y) * (p2.x - p1.x);

        if cross.abs() > 1e-10 {
            let current_sign = if cross > 0.0 { 1i8 } else { -1i8 };
            if sign == 0 {
                sign = current_sign;
            } else if sign != current_sign {
                return false;
            }
        }
    }

    true
}

/// Fan triangulation for convex polygons
#[inline]
fn fan_triangulate(n: usize) -> Vec<usize> {
    let mut indices = Vec::with_capacity((n - 2) * 3);
    for i in 1..n - 1 {
        indices.push(0);
        indices.push(i);
        indices.push(i + 1);
    }
    indices
}

/// Triangulate a simple polygon.
/// Returns triangle indices into the input points
pub fn triangulate_polygon(points: &[Point2<f64>]) -> Result<Vec<usize>> {
    let n = points.len();

    if n < 3 {
        return Err(Error::TriangulationError(
            "Need at least 3 points to triangulate".to_string(),
        ));
    }

    if n == 3 {
        return Ok(vec![0, 1, 2]);
    }

    if n <= 8 && is_convex(points) {
        return Ok(fan_triangulate(n));
    }

    let mut coords = Vec::with_capacity(n * 2);
    for p in points {
        coords.push(p.x);
        coords.push(p.y);
    }

    earcutr::earcut(&coords, &[], 2).map_err(|e| Error::TriangulationError(format!("{:?}", e)))
}

/// Project 3D points onto the plane through the first point with the given normal
pub fn project_to_2d(points_3d: &[Point3<f64>], normal: &Vector3<f64>) -> Vec<Point2<f64>> {
    let Some(origin) = points_3d.first().copied() else {
        return Vec::new();
    };

    // Use the axis least parallel to the normal for a stable basis
    let reference = if normal.x.abs() <= normal.y.abs() && normal.x.abs() <= normal.z.abs() {
        Vector3::x()
    } else if normal.y.abs() <= normal.z.abs() {
        Vector3::y()
    } else {
        Vector3::z()
    };

    let u_axis = normal.cross(&reference).normalize();
    let v_axis = normal.cross(&u_axis).normalize();

    points_3d
        .iter()
        .map(|p| {
            let v = p - origin;
            Point2::new(v.dot(&u_axis), v.dot(&v_axis))
        })
        .collect()
}

/// Unit normal of a polygon by Newell's method, +Z for degenerate input
pub fn calculate_polygon_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    if n < 3 {
        return Vector3::z();
    }

    let mut normal = Vector3::<f64>::zeros();
    for i in 0..n {
        let current = &points[i];
        let next = &points[(i + 1) % n];

        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }

    if normal.norm() > 1e-10 {
        normal.normalize()
    } else {
        Vector3::z()
    }
}

/// Triangulate every face of a compacted polygon mesh.
///
/// Each polygon gets its own vertices and its own flat normal. Faces with
/// fewer than three vertices produce no triangles.
pub fn triangulate_faces(vertices: &[Point3<f64>], faces: &[Face]) -> Result<Mesh> {
    let vertex_refs: usize = faces.iter().map(|f| f.len()).sum();
    let mut mesh = Mesh::with_capacity(vertex_refs, vertex_refs.saturating_sub(2 * faces.len()));

    for (face_id, face) in faces.iter().enumerate() {
        if face.len() < 3 {
            continue;
        }

        let points = face
            .iter()
            .map(|&i| {
                vertices
                    .get(i as usize)
                    .copied()
                    .ok_or(Error::VertexIndexOutOfRange {
                        index: i,
                        len: vertices.len(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let normal = calculate_polygon_normal(&points);
        let triangles = triangulate_polygon(&project_to_2d(&points, &normal))?;

        let base = mesh.vertex_count() as u32;
        for p in &points {
            mesh.add_vertex(*p, normal);
        }
        for tri in triangles.chunks_exact(3) {
            mesh.add_triangle(
                base + tri[0] as u32,
                base + tri[1] as u32,
                base + tri[2] as u32,
                face_id as u32,
            );
        }
    }

    Ok(mesh)
}
