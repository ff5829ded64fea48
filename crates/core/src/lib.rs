//! Domain building blocks shared by the mediakit crates.
//!
//! Pure types and helpers with no HTTP knowledge: ids, the response
//! envelope and its timings, operation outcomes, payload control fields,
//! request validation, FFmpeg and whisper command construction and local
//! storage.

pub mod captions;
pub mod envelope;
pub mod error;
pub mod ffmpeg;
pub mod outcome;
pub mod payload;
pub mod requests;
pub mod storage;
pub mod timing;
pub mod transcription;
pub mod types;
