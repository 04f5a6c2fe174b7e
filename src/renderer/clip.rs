//! Triangle/plane clipping
//!
//! One routine serves both the near-plane clip (view space) and the four
//! screen-edge clips (pixel space); only the plane point and normal
//! change between callers.

use super::math::{TexCoord, Vec4};
use super::types::Triangle;

/// Clip output: zero, one, or two triangles in a fixed-capacity buffer.
/// Triangle arity never produces more than two pieces, so no allocation
/// is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Clipped {
    tris: [Triangle; 2],
    len: usize,
}

impl Clipped {
    fn none() -> Self {
        Clipped::default()
    }

    fn one(t: Triangle) -> Self {
        Clipped { tris: [t, Triangle::default()], len: 1 }
    }

    fn two(a: Triangle, b: Triangle) -> Self {
        Clipped { tris: [a, b], len: 2 }
    }

    pub fn as_slice(&self) -> &[Triangle] {
        &self.tris[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Parametric line/plane intersection. Returns the crossing point and
/// the parameter `t` used to interpolate vertex attributes.
fn intersect_plane(plane_point: Vec4, plane_normal: Vec4, start: Vec4, end: Vec4) -> (Vec4, f32) {
    let plane_d = -plane_normal.dot(plane_point);
    let ad = plane_normal.dot(start);
    let bd = plane_normal.dot(end);
    let t = (-plane_d - ad) / (bd - ad);
    (start + (end - start) * t, t)
}

fn lerp_tex(a: TexCoord, b: TexCoord, t: f32) -> TexCoord {
    TexCoord {
        u: a.u + t * (b.u - a.u),
        v: a.v + t * (b.v - a.v),
        w: a.w + t * (b.w - a.w),
    }
}

/// Clip `tri` against the plane through `plane_point` with normal
/// `plane_normal` (normalized internally). Vertices with signed distance
/// >= 0 count as inside. Returns the surviving region as 0, 1, or 2
/// triangles; texture coordinates and the depth metric interpolate along
/// the cut edges with the same parameter as the positions.
pub fn clip_against_plane(plane_point: Vec4, plane_normal: Vec4, tri: &Triangle) -> Clipped {
    let normal = plane_normal.normalize();
    let plane_dot = normal.dot(plane_point);

    // classify the three vertices; capacity-3 index buffers, in vertex
    // order so winding survives the rebuild
    let mut inside = [0usize; 3];
    let mut outside = [0usize; 3];
    let mut n_inside = 0;
    let mut n_outside = 0;

    for i in 0..3 {
        let dist = normal.dot(tri.points[i]) - plane_dot;
        if dist >= 0.0 {
            inside[n_inside] = i;
            n_inside += 1;
        } else {
            outside[n_outside] = i;
            n_outside += 1;
        }
    }

    match n_inside {
        0 => Clipped::none(),
        3 => Clipped::one(*tri),
        1 => {
            // one corner survives; the two cut edges pinch it into a
            // smaller triangle
            let ip = inside[0];
            let (p1, t1) = intersect_plane(plane_point, normal, tri.points[ip], tri.points[outside[0]]);
            let (p2, t2) = intersect_plane(plane_point, normal, tri.points[ip], tri.points[outside[1]]);

            let out = Triangle {
                points: [tri.points[ip], p1, p2],
                tex: [
                    tri.tex[ip],
                    lerp_tex(tri.tex[ip], tri.tex[outside[0]], t1),
                    lerp_tex(tri.tex[ip], tri.tex[outside[1]], t2),
                ],
                color: tri.color,
            };
            Clipped::one(out)
        }
        _ => {
            // two corners survive; the clipped region is a quad, split
            // into two triangles sharing the first cut point
            let i0 = inside[0];
            let i1 = inside[1];
            let op = outside[0];

            let (p0, t0) = intersect_plane(plane_point, normal, tri.points[i0], tri.points[op]);
            let (p1, t1) = intersect_plane(plane_point, normal, tri.points[i1], tri.points[op]);

            let tex_p0 = lerp_tex(tri.tex[i0], tri.tex[op], t0);
            let tex_p1 = lerp_tex(tri.tex[i1], tri.tex[op], t1);

            let a = Triangle {
                points: [tri.points[i0], tri.points[i1], p0],
                tex: [tri.tex[i0], tri.tex[i1], tex_p0],
                color: tri.color,
            };
            let b = Triangle {
                points: [tri.points[i1], p0, p1],
                tex: [tri.tex[i1], tex_p0, tex_p1],
                color: tri.color,
            };
            Clipped::two(a, b)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::math::Vec3;

    const EPS: f32 = 1e-4;

    fn xy_plane_z(z: f32) -> (Vec4, Vec4) {
        (Vec4::point(0.0, 0.0, z), Vec4::point(0.0, 0.0, 1.0))
    }

    fn signed_distance(plane_point: Vec4, plane_normal: Vec4, p: Vec4) -> f32 {
        let n = plane_normal.xyz().normalize();
        n.dot(p.xyz()) - n.dot(plane_point.xyz())
    }

    /// doubled area of a triangle projected on the xy plane
    fn area2(t: &Triangle) -> f32 {
        let [a, b, c] = t.points;
        ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)).abs()
    }

    #[test]
    fn test_fully_inside_passes_through() {
        let (pp, pn) = xy_plane_z(0.0);
        let tri = Triangle::new(
            Vec4::point(0.0, 0.0, 1.0),
            Vec4::point(1.0, 0.0, 2.0),
            Vec4::point(0.0, 1.0, 3.0),
        );
        let out = clip_against_plane(pp, pn, &tri);
        assert_eq!(out.len(), 1);
        for i in 0..3 {
            let got = out.as_slice()[0].points[i].xyz();
            let want = tri.points[i].xyz();
            assert!((got - want).length_sq() < EPS);
        }
    }

    #[test]
    fn test_fully_outside_discarded() {
        let (pp, pn) = xy_plane_z(0.0);
        let tri = Triangle::new(
            Vec4::point(0.0, 0.0, -1.0),
            Vec4::point(1.0, 0.0, -2.0),
            Vec4::point(0.0, 1.0, -3.0),
        );
        let out = clip_against_plane(pp, pn, &tri);
        assert!(out.is_empty());
    }

    #[test]
    fn test_one_inside_keeps_inside_vertex_first() {
        let (pp, pn) = xy_plane_z(0.0);
        let inside_vertex = Vec4::point(0.0, 0.0, 2.0);
        let tri = Triangle::new(
            inside_vertex,
            Vec4::point(1.0, 0.0, -2.0),
            Vec4::point(0.0, 1.0, -2.0),
        );
        let out = clip_against_plane(pp, pn, &tri);
        assert_eq!(out.len(), 1);

        let clipped = &out.as_slice()[0];
        assert!((clipped.points[0].xyz() - inside_vertex.xyz()).length_sq() < EPS);
        // the two new vertices sit on the plane
        assert!(signed_distance(pp, pn, clipped.points[1]).abs() < EPS);
        assert!(signed_distance(pp, pn, clipped.points[2]).abs() < EPS);
    }

    #[test]
    fn test_two_inside_covers_the_quad() {
        // plane x = 1, inside pointing to -x: keeps x <= 1
        let pp = Vec4::point(1.0, 0.0, 0.0);
        let pn = Vec4::point(-1.0, 0.0, 0.0);
        let tri = Triangle::new(
            Vec4::point(0.0, 0.0, 0.0),
            Vec4::point(2.0, 0.0, 0.0),
            Vec4::point(0.0, 2.0, 0.0),
        );
        let out = clip_against_plane(pp, pn, &tri);
        assert_eq!(out.len(), 2);

        // every output vertex stays on the inside half-space
        for t in out.as_slice() {
            for p in &t.points {
                assert!(signed_distance(pp, pn, *p) > -EPS);
            }
        }

        // the two pieces together cover the quad left after the cut:
        // original area 2.0 minus the sliced-off corner 0.5
        let covered = (area2(&out.as_slice()[0]) + area2(&out.as_slice()[1])) * 0.5;
        assert!((covered - 1.5).abs() < 1e-3);
    }

    #[test]
    fn test_cut_interpolates_depth_metric() {
        let (pp, pn) = xy_plane_z(0.0);
        let tri = Triangle::new(
            Vec4::point(0.0, 0.0, 1.0),
            Vec4::point(0.0, 0.0, -1.0),
            Vec4::point(5.0, 0.0, 1.0),
        )
        .with_tex(
            TexCoord { u: 0.0, v: 0.0, w: 1.0 },
            TexCoord { u: 1.0, v: 0.0, w: 3.0 },
            TexCoord { u: 0.0, v: 1.0, w: 1.0 },
        );
        let out = clip_against_plane(pp, pn, &tri);
        assert_eq!(out.len(), 2);

        // the edge from v0 (z=1, w=1) to v1 (z=-1, w=3) crosses at t=0.5
        let found = out
            .as_slice()
            .iter()
            .flat_map(|t| t.tex.iter())
            .any(|tc| (tc.w - 2.0).abs() < 1e-3 && (tc.u - 0.5).abs() < 1e-3);
        assert!(found, "expected an interpolated cut vertex with w=2, u=0.5");
    }

    #[test]
    fn test_plane_normal_scaling_does_not_matter() {
        let tri = Triangle::new(
            Vec4::point(0.0, 0.0, 2.0),
            Vec4::point(1.0, 0.0, -2.0),
            Vec4::point(0.0, 1.0, -2.0),
        );
        let a = clip_against_plane(Vec4::point(0.0, 0.0, 0.0), Vec4::point(0.0, 0.0, 1.0), &tri);
        let b = clip_against_plane(Vec4::point(0.0, 0.0, 0.0), Vec4::point(0.0, 0.0, 25.0), &tri);
        assert_eq!(a.len(), b.len());
        for (ta, tb) in a.as_slice().iter().zip(b.as_slice()) {
            for i in 0..3 {
                assert!((ta.points[i].xyz() - tb.points[i].xyz()).length_sq() < 1e-3);
            }
        }
    }
}
