//! The decision layer between the raw recognizer and an attendance mark.
//!
//! Face: service answer when reachable, local MSE comparison exactly once
//! when it is not. Voice: service answer or nothing — there is no offline
//! stand-in for a voiceprint.

use common::config::AppConfig;
use services::error::{AttendanceError, Result};
use services::face_fallback;

use crate::client::Recognizer;

/// Voice matches below this service confidence are rejected.
pub const VOICE_ACCEPT_THRESHOLD: f64 = 0.75;

/// A face verification that cleared its acceptance threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceVerification {
    pub confidence: f64,
    /// True when the local comparison decided, not the service.
    pub used_fallback: bool,
}

/// Verifies a face pair, degrading to the local comparison when the service
/// is unreachable. Every rejection is `NoMatch` with the deciding
/// confidence; `RecognitionUnavailable` never escapes this function.
pub async fn verify_face(
    recognizer: &dyn Recognizer,
    reference: &[u8],
    probe: &[u8],
) -> Result<FaceVerification> {
    let accept = AppConfig::global().face_accept_threshold;

    match recognizer.verify_face(reference, probe).await {
        Ok(result) => {
            if result.verified && result.confidence >= accept {
                Ok(FaceVerification {
                    confidence: result.confidence,
                    used_fallback: false,
                })
            } else {
                Err(AttendanceError::NoMatch {
                    confidence: result.confidence,
                })
            }
        }
        Err(AttendanceError::RecognitionUnavailable(source)) => {
            log::warn!("recognition service unavailable ({source}), using local comparison");
            let cmp = face_fallback::compare_face_images(reference, probe);
            if cmp.matched {
                Ok(FaceVerification {
                    confidence: cmp.confidence,
                    used_fallback: true,
                })
            } else {
                Err(AttendanceError::NoMatch {
                    confidence: cmp.confidence,
                })
            }
        }
        Err(other) => Err(other),
    }
}

/// Verifies a voice pair. An unreachable service is surfaced unchanged.
pub async fn verify_voice(
    recognizer: &dyn Recognizer,
    reference: &[u8],
    probe: &[u8],
) -> Result<f64> {
    let result = recognizer.verify_voice(reference, probe).await?;
    if result.verified && result.confidence >= VOICE_ACCEPT_THRESHOLD {
        Ok(result.confidence)
    } else {
        Err(AttendanceError::NoMatch {
            confidence: result.confidence,
        })
    }
}
