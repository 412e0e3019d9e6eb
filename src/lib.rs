//! Schoolyard experience engine library
//!
//! A frame-driven simulation for a walkable 3D schoolyard: physics-backed
//! character movement, an animation state machine, proximity interactions,
//! and the HUD/audio models an external renderer consumes.

pub mod assets;
pub mod config;
pub mod experience;
