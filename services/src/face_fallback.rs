//! Deterministic local image comparison used when the recognition service is
//! unreachable (face path only).
//!
//! This is intentionally not a recognizer. Its only job is to reject grossly
//! different inputs — a different subject, a blank or occluded camera — while
//! tolerating re-encoding noise of the same image, and to do so without ever
//! raising: the verification pipeline must always receive a definite answer.

use common::config::AppConfig;

/// Number of byte offsets sampled per buffer (a 16x16 grid, conceptually).
const GRID_SAMPLES: usize = 256;

/// Outcome of a local face comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceComparison {
    pub mse: f64,
    pub matched: bool,
    pub confidence: f64,
}

impl FaceComparison {
    fn no_match() -> Self {
        Self {
            mse: f64::INFINITY,
            matched: false,
            confidence: 0.0,
        }
    }
}

/// Compares two raw image buffers using the configured MSE threshold.
pub fn compare_face_images(reference: &[u8], probe: &[u8]) -> FaceComparison {
    compare_face_images_with(reference, probe, AppConfig::global().fallback_mse_threshold)
}

/// Compares two raw image buffers against an explicit MSE threshold.
///
/// Each buffer is reduced to a 256-length grey vector: 256 evenly spaced
/// offsets, 3 consecutive bytes per offset read as a pseudo-RGB triplet and
/// converted to luma. The MSE between the two vectors decides the match.
/// Malformed or empty buffers yield maximal MSE, never an error.
pub fn compare_face_images_with(reference: &[u8], probe: &[u8], threshold: f64) -> FaceComparison {
    let (Some(a), Some(b)) = (grey_vector(reference), grey_vector(probe)) else {
        return FaceComparison::no_match();
    };

    let mse = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f64>()
        / GRID_SAMPLES as f64;

    FaceComparison {
        mse,
        matched: mse < threshold,
        confidence: (1.0 - mse / threshold).clamp(0.0, 1.0),
    }
}

/// Samples `GRID_SAMPLES` luma values evenly across the buffer.
/// Returns `None` when the buffer is too small to read one RGB triplet.
fn grey_vector(buf: &[u8]) -> Option<Vec<f64>> {
    if buf.len() < 3 {
        return None;
    }

    let span = buf.len() - 3;
    let mut out = Vec::with_capacity(GRID_SAMPLES);
    for i in 0..GRID_SAMPLES {
        let offset = i * span / (GRID_SAMPLES - 1);
        let r = buf[offset] as f64;
        let g = buf[offset + 1] as f64;
        let b = buf[offset + 2] as f64;
        out.push(0.299 * r + 0.587 * g + 0.114 * b);
    }
    Some(out)
}
