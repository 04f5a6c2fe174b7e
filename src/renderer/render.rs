//! Core rendering: framebuffer, depth-tested scanline fills, camera,
//! and the per-frame triangle pipeline.

use std::collections::VecDeque;
use std::mem::swap;

use super::clip::clip_against_plane;
use super::math::{q_rsqrt, Vec3, Vec4};
use super::matrix::Mat4;
use super::types::{Color, Texture, Triangle};

/// Depth buffer clear value. The depth metric is inverse depth (larger
/// means closer), so "nothing drawn yet" is the most negative float and
/// any real fragment beats it.
pub const DEPTH_CLEAR: f32 = f32::MIN;

/// Perspective divide guard: a projected vertex with |w| below this is
/// degenerate and drops its triangle.
const W_EPSILON: f32 = 1e-6;

/// Framebuffer for software rendering
pub struct Framebuffer {
    pub pixels: Vec<u8>,   // RGBA, 4 bytes per pixel
    pub depth: Vec<f32>,   // inverse-depth per pixel
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height * 4],
            depth: vec![DEPTH_CLEAR; width * height],
            width,
            height,
        }
    }

    /// Fill the color buffer and reset every depth cell to the sentinel.
    pub fn clear(&mut self, color: Color) {
        let bytes = color.to_bytes();
        for i in 0..(self.width * self.height) {
            self.pixels[i * 4] = bytes[0];
            self.pixels[i * 4 + 1] = bytes[1];
            self.pixels[i * 4 + 2] = bytes[2];
            self.pixels[i * 4 + 3] = bytes[3];
            self.depth[i] = DEPTH_CLEAR;
        }
    }

    /// Unconditional pixel write. Out-of-range coordinates are dropped
    /// silently.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || x >= self.width as i32 || y < 0 || y >= self.height as i32 {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * 4;
        let bytes = color.to_bytes();
        self.pixels[idx] = bytes[0];
        self.pixels[idx + 1] = bytes[1];
        self.pixels[idx + 2] = bytes[2];
        self.pixels[idx + 3] = bytes[3];
    }

    /// Depth-tested pixel write: the fragment lands only if its metric is
    /// strictly greater than what is stored; ties keep the existing
    /// pixel. Out-of-range fragments are dropped silently.
    pub fn set_pixel_depth(&mut self, x: i32, y: i32, w: f32, color: Color) {
        if x < 0 || x >= self.width as i32 || y < 0 || y >= self.height as i32 {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        if w > self.depth[idx] {
            self.depth[idx] = w;
            let pixel_idx = idx * 4;
            let bytes = color.to_bytes();
            self.pixels[pixel_idx] = bytes[0];
            self.pixels[pixel_idx + 1] = bytes[1];
            self.pixels[pixel_idx + 2] = bytes[2];
            self.pixels[pixel_idx + 3] = bytes[3];
        }
    }

    /// Parametric line walk: step one normalized direction increment per
    /// pixel. No depth test.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let dx = (x1 - x0) as f32;
        let dy = (y1 - y0) as f32;
        let r_len = q_rsqrt(dx * dx + dy * dy);
        let add_x = dx * r_len;
        let add_y = dy * r_len;

        let mut x = x0 as f32;
        let mut y = y0 as f32;
        for _ in 0..(1.0 / r_len) as i32 {
            self.set_pixel(x as i32, y as i32, color);
            x += add_x;
            y += add_y;
        }
    }

    /// Wireframe: the three triangle edges as plain lines.
    pub fn draw_triangle_lines(&mut self, tri: &Triangle, color: Color) {
        let [p0, p1, p2] = tri.points;
        self.draw_line(p0.x as i32, p0.y as i32, p1.x as i32, p1.y as i32, color);
        self.draw_line(p1.x as i32, p1.y as i32, p2.x as i32, p2.y as i32, color);
        self.draw_line(p2.x as i32, p2.y as i32, p0.x as i32, p0.y as i32, color);
    }

    /// Scanline fill with per-pixel depth test. Vertices sort by
    /// ascending y, the triangle splits at the middle vertex, and the
    /// depth metric interpolates along the edges and across each span.
    pub fn fill_triangle(&mut self, tri: &Triangle) {
        let mut x1 = tri.points[0].x as i32;
        let mut y1 = tri.points[0].y as i32;
        let mut w1 = tri.tex[0].w;
        let mut x2 = tri.points[1].x as i32;
        let mut y2 = tri.points[1].y as i32;
        let mut w2 = tri.tex[1].w;
        let mut x3 = tri.points[2].x as i32;
        let mut y3 = tri.points[2].y as i32;
        let mut w3 = tri.tex[2].w;

        if y2 < y1 {
            swap(&mut y1, &mut y2);
            swap(&mut x1, &mut x2);
            swap(&mut w1, &mut w2);
        }
        if y3 < y1 {
            swap(&mut y1, &mut y3);
            swap(&mut x1, &mut x3);
            swap(&mut w1, &mut w3);
        }
        if y3 < y2 {
            swap(&mut y2, &mut y3);
            swap(&mut x2, &mut x3);
            swap(&mut w2, &mut w3);
        }

        let mut dy1 = y2 - y1;
        let mut dx1 = x2 - x1;
        let mut dw1 = w2 - w1;

        let dy2 = y3 - y1;
        let dx2 = x3 - x1;
        let dw2 = w3 - w1;

        let mut dax_step = 0.0;
        let mut dbx_step = 0.0;
        let mut dw1_step = 0.0;
        let mut dw2_step = 0.0;

        if dy1 != 0 {
            dax_step = dx1 as f32 / dy1.abs() as f32;
            dw1_step = dw1 / dy1.abs() as f32;
        }
        if dy2 != 0 {
            dbx_step = dx2 as f32 / dy2.abs() as f32;
            dw2_step = dw2 / dy2.abs() as f32;
        }

        // upper span (flat bottom); an edge with dy == 0 draws nothing
        if dy1 != 0 {
            for i in y1..=y2 {
                let mut ax = x1 + ((i - y1) as f32 * dax_step) as i32;
                let mut bx = x1 + ((i - y1) as f32 * dbx_step) as i32;
                let mut sw = w1 + (i - y1) as f32 * dw1_step;
                let mut ew = w1 + (i - y1) as f32 * dw2_step;

                if ax > bx {
                    swap(&mut ax, &mut bx);
                    swap(&mut sw, &mut ew);
                }

                let t_step = 1.0 / (bx - ax) as f32;
                let mut t = 0.0f32;
                for j in ax..bx {
                    let w = (1.0 - t) * sw + t * ew;
                    self.set_pixel_depth(j, i, w, tri.color);
                    t += t_step;
                }
            }
        }

        // lower span (flat top)
        dy1 = y3 - y2;
        dx1 = x3 - x2;
        dw1 = w3 - w2;
        if dy1 != 0 {
            dax_step = dx1 as f32 / dy1.abs() as f32;
            dw1_step = dw1 / dy1.abs() as f32;
        }

        if dy1 != 0 {
            for i in y2..=y3 {
                let mut ax = x2 + ((i - y2) as f32 * dax_step) as i32;
                let mut bx = x1 + ((i - y1) as f32 * dbx_step) as i32;
                let mut sw = w2 + (i - y2) as f32 * dw1_step;
                let mut ew = w1 + (i - y1) as f32 * dw2_step;

                if ax > bx {
                    swap(&mut ax, &mut bx);
                    swap(&mut sw, &mut ew);
                }

                let t_step = 1.0 / (bx - ax) as f32;
                let mut t = 0.0f32;
                for j in ax..bx {
                    let w = (1.0 - t) * sw + t * ew;
                    self.set_pixel_depth(j, i, w, tri.color);
                    t += t_step;
                }
            }
        }
    }

    /// Textured scanline fill: same walk as `fill_triangle`, also
    /// interpolating u/v and sampling per pixel.
    pub fn textured_triangle(&mut self, tri: &Triangle, texture: &Texture) {
        let mut x1 = tri.points[0].x as i32;
        let mut y1 = tri.points[0].y as i32;
        let mut u1 = tri.tex[0].u;
        let mut v1 = tri.tex[0].v;
        let mut w1 = tri.tex[0].w;
        let mut x2 = tri.points[1].x as i32;
        let mut y2 = tri.points[1].y as i32;
        let mut u2 = tri.tex[1].u;
        let mut v2 = tri.tex[1].v;
        let mut w2 = tri.tex[1].w;
        let mut x3 = tri.points[2].x as i32;
        let mut y3 = tri.points[2].y as i32;
        let mut u3 = tri.tex[2].u;
        let mut v3 = tri.tex[2].v;
        let mut w3 = tri.tex[2].w;

        if y2 < y1 {
            swap(&mut y1, &mut y2);
            swap(&mut x1, &mut x2);
            swap(&mut u1, &mut u2);
            swap(&mut v1, &mut v2);
            swap(&mut w1, &mut w2);
        }
        if y3 < y1 {
            swap(&mut y1, &mut y3);
            swap(&mut x1, &mut x3);
            swap(&mut u1, &mut u3);
            swap(&mut v1, &mut v3);
            swap(&mut w1, &mut w3);
        }
        if y3 < y2 {
            swap(&mut y2, &mut y3);
            swap(&mut x2, &mut x3);
            swap(&mut u2, &mut u3);
            swap(&mut v2, &mut v3);
            swap(&mut w2, &mut w3);
        }

        let mut dy1 = y2 - y1;
        let mut dx1 = x2 - x1;
        let mut du1 = u2 - u1;
        let mut dv1 = v2 - v1;
        let mut dw1 = w2 - w1;

        let dy2 = y3 - y1;
        let dx2 = x3 - x1;
        let du2 = u3 - u1;
        let dv2 = v3 - v1;
        let dw2 = w3 - w1;

        let mut dax_step = 0.0;
        let mut dbx_step = 0.0;
        let mut du1_step = 0.0;
        let mut dv1_step = 0.0;
        let mut dw1_step = 0.0;
        let mut du2_step = 0.0;
        let mut dv2_step = 0.0;
        let mut dw2_step = 0.0;

        if dy1 != 0 {
            dax_step = dx1 as f32 / dy1.abs() as f32;
            du1_step = du1 / dy1.abs() as f32;
            dv1_step = dv1 / dy1.abs() as f32;
            dw1_step = dw1 / dy1.abs() as f32;
        }
        if dy2 != 0 {
            dbx_step = dx2 as f32 / dy2.abs() as f32;
            du2_step = du2 / dy2.abs() as f32;
            dv2_step = dv2 / dy2.abs() as f32;
            dw2_step = dw2 / dy2.abs() as f32;
        }

        if dy1 != 0 {
            for i in y1..=y2 {
                let mut ax = x1 + ((i - y1) as f32 * dax_step) as i32;
                let mut bx = x1 + ((i - y1) as f32 * dbx_step) as i32;

                let mut tex_su = u1 + (i - y1) as f32 * du1_step;
                let mut tex_sv = v1 + (i - y1) as f32 * dv1_step;
                let mut tex_sw = w1 + (i - y1) as f32 * dw1_step;

                let mut tex_eu = u1 + (i - y1) as f32 * du2_step;
                let mut tex_ev = v1 + (i - y1) as f32 * dv2_step;
                let mut tex_ew = w1 + (i - y1) as f32 * dw2_step;

                if ax > bx {
                    swap(&mut ax, &mut bx);
                    swap(&mut tex_su, &mut tex_eu);
                    swap(&mut tex_sv, &mut tex_ev);
                    swap(&mut tex_sw, &mut tex_ew);
                }

                let t_step = 1.0 / (bx - ax) as f32;
                let mut t = 0.0f32;
                for j in ax..bx {
                    let tex_u = (1.0 - t) * tex_su + t * tex_eu;
                    let tex_v = (1.0 - t) * tex_sv + t * tex_ev;
                    let tex_w = (1.0 - t) * tex_sw + t * tex_ew;
                    self.set_pixel_depth(j, i, tex_w, texture.sample(tex_u, tex_v));
                    t += t_step;
                }
            }
        }

        dy1 = y3 - y2;
        dx1 = x3 - x2;
        du1 = u3 - u2;
        dv1 = v3 - v2;
        dw1 = w3 - w2;
        du1_step = 0.0;
        dv1_step = 0.0;
        if dy1 != 0 {
            dax_step = dx1 as f32 / dy1.abs() as f32;
            du1_step = du1 / dy1.abs() as f32;
            dv1_step = dv1 / dy1.abs() as f32;
            dw1_step = dw1 / dy1.abs() as f32;
        }

        if dy1 != 0 {
            for i in y2..=y3 {
                let mut ax = x2 + ((i - y2) as f32 * dax_step) as i32;
                let mut bx = x1 + ((i - y1) as f32 * dbx_step) as i32;

                let mut tex_su = u2 + (i - y2) as f32 * du1_step;
                let mut tex_sv = v2 + (i - y2) as f32 * dv1_step;
                let mut tex_sw = w2 + (i - y2) as f32 * dw1_step;

                let mut tex_eu = u1 + (i - y1) as f32 * du2_step;
                // TODO: this end attribute steps v by the u increment
                // (du2_step, not dv2_step); compare against a reference
                // frame capture before changing it
                let mut tex_ev = v1 + (i - y1) as f32 * du2_step;
                let mut tex_ew = w1 + (i - y1) as f32 * dw2_step;

                if ax > bx {
                    swap(&mut ax, &mut bx);
                    swap(&mut tex_su, &mut tex_eu);
                    swap(&mut tex_sv, &mut tex_ev);
                    swap(&mut tex_sw, &mut tex_ew);
                }

                let t_step = 1.0 / (bx - ax) as f32;
                let mut t = 0.0f32;
                for j in ax..bx {
                    let tex_u = (1.0 - t) * tex_su + t * tex_eu;
                    let tex_v = (1.0 - t) * tex_sv + t * tex_ev;
                    let tex_w = (1.0 - t) * tex_sw + t * tex_ew;
                    self.set_pixel_depth(j, i, tex_w, texture.sample(tex_u, tex_v));
                    t += t_step;
                }
            }
        }
    }

    /// Debug view: remap all drawn depth values between their observed
    /// min and max into grayscale, sentinel cells to black.
    pub fn draw_depth_view(&mut self) {
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for &d in &self.depth {
            if d != DEPTH_CLEAR {
                min = min.min(d);
                max = max.max(d);
            }
        }
        let range = (max - min).max(1e-12);

        for i in 0..(self.width * self.height) {
            let level = if self.depth[i] == DEPTH_CLEAR {
                0
            } else {
                (((self.depth[i] - min) / range) * 255.0) as u8
            };
            self.pixels[i * 4] = level;
            self.pixels[i * 4 + 1] = level;
            self.pixels[i * 4 + 2] = level;
            self.pixels[i * 4 + 3] = 255;
        }
    }

    /// Open a drawing session: clear both buffers and capture the
    /// per-frame matrices. All rendering goes through the returned
    /// context; the framebuffer stays borrowed until it drops.
    pub fn begin_frame(
        &mut self,
        camera: &Camera,
        light_dir: Vec3,
        near: f32,
        far: f32,
    ) -> FrameContext<'_> {
        self.clear(Color::BLACK);
        let aspect = self.height as f32 / self.width as f32;
        FrameContext {
            view: Mat4::look_at(camera.position, camera.target, camera.up),
            projection: Mat4::perspective(camera.fov_y_degrees, aspect, near, far),
            camera_position: camera.position,
            light_dir: light_dir.normalize(),
            near,
            fb: self,
        }
    }
}

/// Free-look camera. Movement translates position and target together,
/// preserving the look direction.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_degrees: f32,
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            target: position + Vec3::new(0.0, 0.0, 1.0),
            up: Vec3::UP,
            fov_y_degrees: 90.0,
        }
    }

    fn translate(&mut self, delta: Vec3) {
        self.position = self.position + delta;
        self.target = self.target + delta;
    }

    pub fn move_forward(&mut self, distance: f32) {
        let forward = (self.target - self.position).normalize();
        self.translate(forward.scale(distance));
    }

    pub fn move_right(&mut self, distance: f32) {
        let forward = self.target - self.position;
        let right = forward.cross(self.up).normalize();
        self.translate(right.scale(distance));
    }

    pub fn move_up(&mut self, distance: f32) {
        self.translate(self.up.normalize().scale(distance));
    }

    /// Rotate the view direction about the (normalized) up vector.
    pub fn yaw(&mut self, angle: f32) {
        let up = self.up.normalize();
        let view = self.target - self.position;
        self.target = self.position + view.rotate_axis_angle(up, angle);
    }
}

/// Everything one frame needs: the drawing surface plus the matrices and
/// lighting derived from the active camera. Built by
/// [`Framebuffer::begin_frame`], passed by reference into pipeline
/// calls, dropped when the frame is over.
pub struct FrameContext<'a> {
    pub fb: &'a mut Framebuffer,
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
    pub light_dir: Vec3,
    pub near: f32,
}

/// Clip a screen-space triangle against the four viewport edges in
/// fixed order. Each edge pass consumes the whole queue left by the
/// previous one: a triangle cut by one edge can still cross the next,
/// so every piece re-runs against every remaining edge.
pub fn clip_to_screen_edges(tri: &Triangle, width: usize, height: usize) -> VecDeque<Triangle> {
    let w = (width - 1) as f32;
    let h = (height - 1) as f32;
    let edges = [
        (Vec4::point(0.0, 0.0, 0.0), Vec4::point(0.0, 1.0, 0.0)),
        (Vec4::point(0.0, h, 0.0), Vec4::point(0.0, -1.0, 0.0)),
        (Vec4::point(0.0, 0.0, 0.0), Vec4::point(1.0, 0.0, 0.0)),
        (Vec4::point(w, 0.0, 0.0), Vec4::point(-1.0, 0.0, 0.0)),
    ];

    let mut queue = VecDeque::with_capacity(4);
    queue.push_back(*tri);

    for (edge_point, edge_normal) in edges {
        for _ in 0..queue.len() {
            if let Some(pending) = queue.pop_front() {
                for piece in clip_against_plane(edge_point, edge_normal, &pending).as_slice() {
                    queue.push_back(*piece);
                }
            }
        }
    }
    queue
}

/// Project one near-clipped view-space triangle into pixel space.
/// Returns `None` when a vertex lands on the camera plane (w ~ 0).
fn project_to_screen(tri: &Triangle, projection: &Mat4, width: usize, height: usize) -> Option<Triangle> {
    let mut out = *tri;
    for i in 0..3 {
        let p = projection.transform(tri.points[i]);
        if p.w.abs() < W_EPSILON {
            return None;
        }

        // attributes pick up the inverse-depth metric before the divide
        out.tex[i].u = tri.tex[i].u / p.w;
        out.tex[i].v = tri.tex[i].v / p.w;
        out.tex[i].w = 1.0 / p.w;

        let mut p = p.div(p.w);
        p.x = -p.x;
        p.y = -p.y;
        p.z = -p.z;

        p = p + Vec4::point(1.0, 1.0, 0.0);
        p.x *= 0.5 * width as f32;
        p.y *= 0.5 * height as f32;
        out.points[i] = p;
    }
    Some(out)
}

/// Run the full pipeline for one mesh instance:
/// world transform, flat shading, backface cull, view transform,
/// near-plane clip, projection, viewport clip, rasterization.
pub fn render_triangles(
    frame: &mut FrameContext,
    triangles: &[Triangle],
    world: &Mat4,
    texture: Option<&Texture>,
    wireframe: bool,
) {
    let near_point = Vec4::point(0.0, 0.0, frame.near);
    let near_normal = Vec4::point(0.0, 0.0, 1.0);

    for tri in triangles {
        let mut transformed = *tri;
        for i in 0..3 {
            transformed.points[i] = world.transform(tri.points[i]);
        }

        // face normal from the winding; degenerate triangles normalize
        // to zero and fall to the cull below
        let edge1 = (transformed.points[1] - transformed.points[0]).xyz();
        let edge2 = (transformed.points[2] - transformed.points[0]).xyz();
        let normal = edge1.cross(edge2).normalize();

        let camera_ray = transformed.points[0].xyz() - frame.camera_position;
        if normal.dot(camera_ray) >= 0.0 {
            continue;
        }

        // flat shading with an ambient floor so no face goes fully black
        let intensity = frame.light_dir.dot(normal).max(0.1);
        transformed.color = Color::grayscale(intensity);

        let mut viewed = transformed;
        for i in 0..3 {
            viewed.points[i] = frame.view.transform(transformed.points[i]);
        }

        let near_clipped = clip_against_plane(near_point, near_normal, &viewed);

        for clipped in near_clipped.as_slice() {
            let Some(projected) =
                project_to_screen(clipped, &frame.projection, frame.fb.width, frame.fb.height)
            else {
                continue;
            };

            for screen_tri in clip_to_screen_edges(&projected, frame.fb.width, frame.fb.height) {
                match texture {
                    Some(tex) => frame.fb.textured_triangle(&screen_tri, tex),
                    None => frame.fb.fill_triangle(&screen_tri),
                }
                if wireframe {
                    frame.fb.draw_triangle_lines(&screen_tri, Color::GREEN);
                }
            }
        }
    }
}
