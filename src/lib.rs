pub mod brdf;
pub mod camera;
pub mod cli;
pub mod config;
pub mod cubemap;
pub mod environment;
pub mod gbuffer;
pub mod lights;
pub mod material;
pub mod mesh;
pub mod renderer;

pub use camera::{Camera3D, CameraInfo};
pub use cubemap::Cubemap;
pub use environment::{EnvironmentMaps, HdrImage};
pub use gbuffer::GBuffer;
pub use lights::SceneLights;
pub use renderer::{DeferredRenderer, DrawParams, RenderTarget};
