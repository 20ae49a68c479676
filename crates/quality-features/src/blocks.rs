//! Block Partitioning
//!
//! Every block-based module partitions the image the same way: square,
//! non-overlapping blocks in raster order, starting at the top-left corner.
//! Trailing partial blocks on the right and bottom edges are discarded.

use crate::statistics::SampleStatistics;
use crate::FeatureError;
use fingerprint_image::FingerprintImage;

/// Position of one full block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// Left pixel column
    pub x: u32,
    /// Top pixel row
    pub y: u32,
    pub size: u32,
}

/// Grid of full blocks covering an image
#[derive(Debug, Clone, Copy)]
pub struct BlockGrid {
    block_size: u32,
    columns: u32,
    rows: u32,
}

impl BlockGrid {
    /// Partition `image` into blocks of `block_size`
    ///
    /// Fails when the image cannot hold a single block.
    pub fn new(
        module: &'static str,
        image: &FingerprintImage,
        block_size: u32,
    ) -> Result<Self, FeatureError> {
        if block_size == 0 {
            return Err(FeatureError::malformed(module, "block size is zero"));
        }
        if image.width() < block_size || image.height() < block_size {
            return Err(FeatureError::malformed(
                module,
                format!(
                    "image {}x{} is smaller than one {}x{} block",
                    image.width(),
                    image.height(),
                    block_size,
                    block_size
                ),
            ));
        }

        Ok(Self {
            block_size,
            columns: image.width() / block_size,
            rows: image.height() / block_size,
        })
    }

    /// Number of full blocks
    pub fn len(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pixels per block
    pub fn block_area(&self) -> usize {
        self.block_size as usize * self.block_size as usize
    }

    /// Blocks in raster order
    pub fn blocks(&self) -> impl Iterator<Item = Block> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.columns).map(move |col| Block {
                x: col * self.block_size,
                y: row * self.block_size,
                size: self.block_size,
            })
        })
    }
}

impl Block {
    /// Rows of the block, each a slice of `size` pixels
    pub fn rows<'a>(&self, image: &'a FingerprintImage) -> impl Iterator<Item = &'a [u8]> + 'a {
        let (x, size) = (self.x as usize, self.size as usize);
        (self.y..self.y + self.size)
            .filter_map(move |y| image.row(y))
            .map(move |row| &row[x..x + size])
    }

    /// Pixel statistics of the block
    pub fn statistics(&self, image: &FingerprintImage) -> SampleStatistics {
        SampleStatistics::from_pixels(self.rows(image).flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fingerprint_image::DEFAULT_PPI;

    #[test]
    fn test_partial_blocks_discarded() {
        let img = FingerprintImage::uniform(70, 40, 0, DEFAULT_PPI).unwrap();
        let grid = BlockGrid::new("Test", &img, 32).unwrap();
        assert_eq!(grid.len(), 2);
        assert!(!grid.is_empty());
        let blocks: Vec<_> = grid.blocks().collect();
        assert_eq!((blocks[1].x, blocks[1].y), (32, 0));
    }

    #[test]
    fn test_raster_order() {
        let img = FingerprintImage::uniform(32, 32, 0, DEFAULT_PPI).unwrap();
        let grid = BlockGrid::new("Test", &img, 16).unwrap();
        let origins: Vec<_> = grid.blocks().map(|b| (b.x, b.y)).collect();
        assert_eq!(origins, vec![(0, 0), (16, 0), (0, 16), (16, 16)]);
    }

    #[test]
    fn test_image_smaller_than_block() {
        let img = FingerprintImage::uniform(8, 8, 0, DEFAULT_PPI).unwrap();
        let err = BlockGrid::new("Test", &img, 16).unwrap_err();
        assert!(matches!(err, FeatureError::MalformedInput { module: "Test", .. }));
    }

    #[test]
    fn test_block_statistics() {
        // Left half 0, right half 200
        let data: Vec<u8> = (0..16 * 8).map(|i| if i % 16 < 8 { 0 } else { 200 }).collect();
        let img = FingerprintImage::new(data, 16, 8, DEFAULT_PPI).unwrap();
        let grid = BlockGrid::new("Test", &img, 8).unwrap();
        let means: Vec<_> = grid.blocks().map(|b| b.statistics(&img).mean).collect();
        assert_eq!(means, vec![0.0, 200.0]);
    }
}
