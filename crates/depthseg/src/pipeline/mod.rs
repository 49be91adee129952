//! Detection-to-object pipeline.
//!
//! Internal glue between the stages: frame pairing -> (detector) ->
//! confidence gate -> back-projection -> outlier filter -> object packaging.
//! The detector call itself lives in [`crate::DetectionSegmenter`], which owns
//! the collaborators; this layer only sees their outputs.

mod frames;
mod run;

pub(crate) use frames::FramePair;
pub(crate) use run::run;
