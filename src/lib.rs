pub mod api;
pub mod code;
pub mod config;
pub mod error;
pub mod noise;
pub mod optimizer;
pub mod sampler;
// cmd and reports belong to the binary (see main.rs).
