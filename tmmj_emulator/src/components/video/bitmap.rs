//! Indexed bitmaps the compositor draws into.
use bitcode::Decode;
use bitcode::Encode;

/// Pen written by `Bitmap::clear`. It lies outside the palette and always renders black.
///
/// No plotted pixel can produce this value: the largest 8bpp pen is `0xFF00 + 0xFE` since byte
/// value 255 is transparent.
pub const BLACK_PEN: u16 = 0xFFFF;

/// Inclusive clip rectangle in bitmap coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClipRect {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl ClipRect {
    pub fn new(min_x: i32, max_x: i32, min_y: i32, max_y: i32) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Only accepts points strictly inside the rectangle, excluding its outermost rows and columns.
    #[inline]
    pub fn contains_interior(&self, x: i32, y: i32) -> bool {
        x > self.min_x && x < self.max_x && y > self.min_y && y < self.max_y
    }
}

/// A bitmap of 16-bit pens, resolved to colors through the palette on output.
#[derive(Clone, Debug, PartialEq, Encode, Decode)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u16>,
}

impl Bitmap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![BLACK_PEN; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Clip rectangle covering the whole bitmap.
    pub fn bounds(&self) -> ClipRect {
        ClipRect::new(0, self.width as i32 - 1, 0, self.height as i32 - 1)
    }

    pub fn clear(&mut self) {
        self.pixels.fill(BLACK_PEN);
    }

    /// Pen at (x, y), None outside of the bitmap.
    pub fn get(&self, x: i32, y: i32) -> Option<u16> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(self.pixels[x as usize + y as usize * self.width as usize])
    }

    /// Writes a pen. Callers clip against a rectangle inside the bitmap; writes outside of the
    /// bitmap are dropped.
    #[inline]
    pub fn plot(&mut self, x: i32, y: i32, pen: u16) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        self.pixels[x as usize + y as usize * self.width as usize] = pen;
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, u16)> + '_ {
        let width = self.width;
        self.pixels
            .iter()
            .enumerate()
            .map(move |(idx, pen)| (idx as u32 % width, idx as u32 / width, *pen))
    }
}

impl std::ops::Index<(u32, u32)> for Bitmap {
    type Output = u16;

    fn index(&self, index: (u32, u32)) -> &Self::Output {
        &self.pixels[index.0 as usize + index.1 as usize * self.width as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_interior_drops_border() {
        let clip = ClipRect::new(0, 9, 0, 9);
        assert!(clip.contains(0, 0));
        assert!(clip.contains(9, 9));
        assert!(!clip.contains_interior(0, 5));
        assert!(!clip.contains_interior(5, 9));
        assert!(clip.contains_interior(1, 1));
        assert!(clip.contains_interior(8, 8));
    }

    #[test]
    fn test_plot_outside_is_dropped() {
        let mut bitmap = Bitmap::new(4, 4);
        bitmap.plot(-1, 0, 7);
        bitmap.plot(4, 0, 7);
        bitmap.plot(3, 3, 7);
        assert_eq!(bitmap.iter().filter(|(_, _, pen)| *pen == 7).count(), 1);
        assert_eq!(bitmap[(3, 3)], 7);
        assert_eq!(bitmap.get(4, 0), None);
    }
}
