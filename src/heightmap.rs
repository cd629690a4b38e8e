//! Animated height-map sequence for the HeightMap wave mode.

use std::path::{Path, PathBuf};

use noise::{NoiseFn, Perlin};

use crate::error::{Error, Result};

/// Upper bound on frames read from disk
pub const MAX_FRAMES: usize = 200;

/// Equally sized 8-bit luminance frames
#[derive(Debug, Clone, PartialEq)]
pub struct HeightmapSequence {
    width: u32,
    height: u32,
    frames: Vec<Vec<u8>>,
}

impl HeightmapSequence {
    /// Load `000.png`, `001.png`, ... from `dir` until the first missing index.
    ///
    /// Returns `Ok(None)` when `000.png` does not exist.
    pub fn load_dir(dir: &Path) -> Result<Option<Self>> {
        let mut frames = Vec::new();
        let mut size = None;

        for index in 0..MAX_FRAMES {
            let path = frame_path(dir, index);
            if !path.is_file() {
                break;
            }
            let image = image::open(&path)
                .map_err(|source| Error::Asset {
                    path: path.clone(),
                    source,
                })?
                .to_luma8();

            let dims = image.dimensions();
            match size {
                None => size = Some(dims),
                Some(expected) if expected != dims => {
                    return Err(Error::AssetFormat(format!(
                        "{} is {}x{}, expected {}x{}",
                        path.display(),
                        dims.0,
                        dims.1,
                        expected.0,
                        expected.1
                    )));
                }
                Some(_) => {}
            }
            frames.push(image.into_raw());
        }

        Ok(size.map(|(width, height)| Self {
            width,
            height,
            frames,
        }))
    }

    /// Perlin noise frames, with time as the third noise dimension
    pub fn procedural(size: u32, frame_count: usize, seed: u32) -> Self {
        let size = size.max(1);
        let frame_count = frame_count.max(1);
        let perlin = Perlin::new(seed);
        let frequency = 4.0 / size as f64;

        let frames = (0..frame_count)
            .map(|frame| {
                let t = frame as f64 * 0.05;
                let mut pixels = Vec::with_capacity((size * size) as usize);
                for y in 0..size {
                    for x in 0..size {
                        let n = perlin.get([x as f64 * frequency, y as f64 * frequency, t]);
                        pixels.push(((n * 0.5 + 0.5).clamp(0.0, 1.0) * 255.0).round() as u8);
                    }
                }
                pixels
            })
            .collect();

        Self {
            width: size,
            height: size,
            frames,
        }
    }

    /// Frames from `dir` if any exist there, otherwise a procedural sequence
    pub fn load_or_generate(dir: Option<&Path>, seed: u32) -> Result<Self> {
        if let Some(dir) = dir {
            if let Some(sequence) = Self::load_dir(dir)? {
                log::info!(
                    "Loaded {} height maps ({}x{}) from {}",
                    sequence.frame_count(),
                    sequence.width,
                    sequence.height,
                    dir.display()
                );
                return Ok(sequence);
            }
            log::warn!(
                "No height maps found in {}, generating procedural frames",
                dir.display()
            );
        }
        Ok(Self::procedural(128, 60, seed))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Row-major pixels of one frame (`width * height` bytes)
    pub fn frame(&self, index: usize) -> &[u8] {
        &self.frames[index % self.frames.len()]
    }
}

fn frame_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("{:03}.png", index))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "watersurface-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_frame(dir: &Path, index: usize, width: u32, height: u32, value: u8) {
        let pixels = vec![value; (width * height) as usize];
        image::save_buffer(
            frame_path(dir, index),
            &pixels,
            width,
            height,
            image::ColorType::L8,
        )
        .unwrap();
    }

    #[test]
    fn test_load_stops_at_first_gap() {
        let dir = scratch_dir("gap");
        write_frame(&dir, 0, 4, 2, 10);
        write_frame(&dir, 1, 4, 2, 20);
        write_frame(&dir, 3, 4, 2, 30);

        let seq = HeightmapSequence::load_dir(&dir).unwrap().unwrap();
        assert_eq!(seq.frame_count(), 2);
        assert_eq!((seq.width(), seq.height()), (4, 2));
        assert_eq!(seq.frame(1), &[20u8; 8][..]);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_empty_dir_loads_nothing() {
        let dir = scratch_dir("empty");
        assert!(HeightmapSequence::load_dir(&dir).unwrap().is_none());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_mismatched_sizes_are_rejected() {
        let dir = scratch_dir("mismatch");
        write_frame(&dir, 0, 4, 4, 0);
        write_frame(&dir, 1, 8, 4, 0);

        let result = HeightmapSequence::load_dir(&dir);
        assert!(matches!(result, Err(Error::AssetFormat(_))));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_corrupt_frame_reports_path() {
        let dir = scratch_dir("corrupt");
        std::fs::write(frame_path(&dir, 0), b"not a png").unwrap();

        match HeightmapSequence::load_dir(&dir) {
            Err(Error::Asset { path, .. }) => assert!(path.ends_with("000.png")),
            other => panic!("expected asset error, got {:?}", other),
        }
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_procedural_fallback() {
        let missing = std::env::temp_dir().join("watersurface-does-not-exist");
        let seq = HeightmapSequence::load_or_generate(Some(&missing), 3).unwrap();
        assert_eq!(seq.frame_count(), 60);
        assert_eq!(seq.frame(0).len(), 128 * 128);
        assert_eq!(seq, HeightmapSequence::procedural(128, 60, 3));

        // Frames actually vary
        let first = seq.frame(0);
        assert!(first.iter().any(|&p| p != first[0]));
    }
}
