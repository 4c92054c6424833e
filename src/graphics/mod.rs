// graphics/mod.rs

pub mod camera;
pub mod overlay;
pub mod scene;
