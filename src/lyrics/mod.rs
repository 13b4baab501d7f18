//! Timed lyrics: the document model, time resolution, loading and syllable
//! estimation.

pub mod loader;
pub mod model;
pub mod resolve;
pub mod syllables;
