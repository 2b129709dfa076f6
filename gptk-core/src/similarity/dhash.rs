//! Difference hash.

use std::fmt::Write as _;

use image::{DynamicImage, imageops::FilterType};

/// Hash side length for thumbnails of `height` pixels: `floor(sqrt(h) / 4)`
/// clamped to `8..=32`.
pub fn calculate_hash_size(height: u32) -> u32 {
    ((f64::from(height).sqrt() / 4.0).floor() as u32).clamp(8, 32)
}

/// A `size × size` bit grid, row-major, packed into 64-bit words.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DHash {
    size: u32,
    words: Vec<u64>,
}

impl DHash {
    /// Scales `image` to `(size + 1) × size` and sets a bit wherever a pixel
    /// is brighter than its right neighbour. Brightness is the plain mean of
    /// the red, green and blue channels.
    pub fn compute(image: &DynamicImage, size: u32) -> Self {
        let size = size.max(1);
        let resized = image.resize_exact(size + 1, size, FilterType::Triangle);
        let scaled = resized.to_rgb8();
        let gray = |x: u32, y: u32| {
            let [r, g, b] = scaled.get_pixel(x, y).0;
            (u32::from(r) + u32::from(g) + u32::from(b)) as f32 / 3.0
        };

        let bits = (0..size)
            .flat_map(|y| (0..size).map(move |x| (x, y)))
            .map(|(x, y)| gray(x, y) > gray(x + 1, y));
        Self::from_bits(size, bits)
    }

    /// Builds a hash from row-major bits. Missing bits are zero.
    pub fn from_bits(size: u32, bits: impl IntoIterator<Item = bool>) -> Self {
        let len = (size as usize) * (size as usize);
        let mut words = vec![0u64; len.div_ceil(64)];
        for (index, bit) in bits.into_iter().take(len).enumerate() {
            if bit {
                words[index / 64] |= 1 << (index % 64);
            }
        }
        Self { size, words }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn bit_len(&self) -> u32 {
        self.size * self.size
    }

    /// Differing bits. Hashes of different sizes differ everywhere.
    pub fn hamming(&self, other: &DHash) -> u32 {
        if self.size != other.size {
            return self.bit_len().max(other.bit_len());
        }
        self.words
            .iter()
            .zip(&other.words)
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }

    /// `1 - hamming / size²`, in `0.0..=1.0`.
    pub fn similarity(&self, other: &DHash) -> f64 {
        let bits = self.bit_len().max(other.bit_len());
        if bits == 0 {
            return 1.0;
        }
        1.0 - f64::from(self.hamming(other)) / f64::from(bits)
    }

    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(self.words.len() * 16);
        for word in &self.words {
            let _ = write!(out, "{word:016x}");
        }
        out
    }
}

impl std::fmt::Display for DHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}
