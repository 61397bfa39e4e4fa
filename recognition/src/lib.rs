//! Client for the external face/voice recognition service and the
//! verification pipeline that sits in front of self-marking.
//!
//! The external service is a collaborator we do not control: every call is
//! bounded by a configured timeout, and for the face path an unreachable
//! service degrades to the local comparison in
//! [`services::face_fallback`] rather than failing the mark outright.

pub mod client;
pub mod pipeline;

pub use client::{HttpRecognizer, MatchResult, Recognizer};
pub use pipeline::{verify_face, verify_voice, FaceVerification, VOICE_ACCEPT_THRESHOLD};
