// utils/mod.rs

pub mod math;
pub mod timeline;
pub mod vec3;
