//! Word-occurrence visualization.
//!
//! Source text is normalized and split into tokens; every occurrence of a
//! search term becomes a cluster of marker meshes whose height encodes how
//! far into the text the occurrence sits.
//!
//! # Invariants
//! - Tokenization is a pure function of its input; token order matches source order.
//! - Marker placement is reproducible for a given seed.
//! - A term absent from the tokens produces no markers.

mod config;
mod placement;
mod tokenize;

pub use config::{
    DiameterMode, MAX_MARKERS_PER_OCCURRENCE, MarkerShape, RotationMode, TermConfig, VizConfigError, WordVizConfig,
};
pub use placement::{Marker, MarkerPlacer, populate};
pub use tokenize::{Occurrence, locate, normalize, occurrences, placement_height, tokenize};
