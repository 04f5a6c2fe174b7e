//! Core types for the rasterizer

use super::math::{TexCoord, Vec4};

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Grayscale from an intensity in 0.0-1.0 (flat shading output)
    pub fn grayscale(intensity: f32) -> Self {
        let level = (intensity.clamp(0.0, 1.0) * 255.0) as u8;
        Self::new(level, level, level)
    }

    /// Convert to [u8; 4] for framebuffer
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// A triangle: three homogeneous vertices, per-vertex texture
/// coordinates (with the inverse-depth metric), one flat color.
///
/// Vertex order fixes the sign of the cross-product normal used for
/// culling, so it is preserved through every pipeline stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct Triangle {
    pub points: [Vec4; 3],
    pub tex: [TexCoord; 3],
    pub color: Color,
}

impl Triangle {
    pub fn new(p0: Vec4, p1: Vec4, p2: Vec4) -> Self {
        Self {
            points: [p0, p1, p2],
            tex: [TexCoord::default(); 3],
            color: Color::WHITE,
        }
    }

    pub fn with_tex(mut self, t0: TexCoord, t1: TexCoord, t2: TexCoord) -> Self {
        self.tex = [t0, t1, t2];
        self
    }
}

/// Simple texture (array of colors)
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Color>,
    pub name: String,
}

impl Texture {
    /// Load a texture from an image file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, String> {
        use image::GenericImageView;

        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|e| format!("Failed to load {}: {}", path.display(), e))?;

        let (width, height) = img.dimensions();
        let rgba = img.to_rgba8();

        let pixels: Vec<Color> = rgba
            .pixels()
            .map(|p| Color::with_alpha(p[0], p[1], p[2], p[3]))
            .collect();

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Self {
            width: width as usize,
            height: height as usize,
            pixels,
            name,
        })
    }

    /// Create a checkerboard test texture
    pub fn checkerboard(width: usize, height: usize, color1: Color, color2: Color) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / 4) + (y / 4)) % 2 == 0;
                pixels.push(if checker { color1 } else { color2 });
            }
        }
        Self { width, height, pixels, name: "checkerboard".to_string() }
    }

    /// Sample at UV coordinates (nearest neighbor, wrapping)
    pub fn sample(&self, u: f32, v: f32) -> Color {
        let tx = ((u.abs() * self.width as f32) as usize) % self.width;
        let ty = ((v.abs() * self.height as f32) as usize) % self.height;
        self.pixels[ty * self.width + tx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grayscale_clamps() {
        assert_eq!(Color::grayscale(2.0), Color::WHITE);
        assert_eq!(Color::grayscale(-1.0), Color::new(0, 0, 0));
        assert_eq!(Color::grayscale(0.5).r, 127);
    }

    #[test]
    fn test_checkerboard_sample_wraps() {
        let tex = Texture::checkerboard(8, 8, Color::WHITE, Color::BLACK);
        assert_eq!(tex.sample(0.0, 0.0), Color::WHITE);
        // one full wrap lands on the same texel
        assert_eq!(tex.sample(1.0, 1.0), tex.sample(0.0, 0.0));
    }
}
