//! Built-in tagger implementations.
//!
//! Real deployments plug pretrained biomedical models in behind the
//! [`Tagger`](crate::Tagger) trait; this module ships a regex fallback so the
//! pipeline works end to end without any model files.

pub mod pattern;
