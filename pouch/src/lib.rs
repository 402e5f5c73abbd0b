//! # Pouch
//!
//! Driver for the package core: owners, text rendering and a scripted session.

pub mod character;
pub mod demo;
pub mod render;
