//! Core planning and replay logic for the Tower of Hanoi visualizer.
//!
//! This crate intentionally avoids any rendering- or runtime-specific
//! dependencies: the scene and progress readout are reached through the
//! [`scene::Scene`] and [`progress::ProgressSink`] traits.

pub mod occupancy;
pub mod planner;
pub mod progress;
pub mod scene;
pub mod sequencer;
pub mod trajectory;
