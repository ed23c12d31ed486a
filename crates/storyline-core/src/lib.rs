#![cfg_attr(not(test), no_std)]

//! Story playback and view-tracking engine.
//!
//! [`player::StoryPlayer`] plays an ordered [`story::StorySequence`] with a
//! fixed-resolution clock, routes keyboard and pointer input, and reports
//! each viewed story to a latency-bearing [`repository::StoryRepository`].

pub mod clock;
pub mod config;
pub mod input;
pub mod player;
pub mod render;
pub mod repository;
pub mod story;
