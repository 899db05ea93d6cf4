//! Inkboard Render Library
//!
//! Renderer abstraction plus a CPU implementation on `vello_cpu`. The same
//! surface backs the on-screen view, PNG export and generation snapshots.

pub mod decode;
pub mod export;
pub mod raster;
mod raster_impl;
mod renderer;
pub mod text;

pub use decode::{DecodeError, ImageDecoder, ImageImporter, ImportResult, ImportedImage};
pub use export::{ExportError, PngRenderResult, encode_png};
pub use raster_impl::RasterRenderer;
pub use renderer::{DEFAULT_BACKGROUND, RenderContext, RenderResult, Renderer, RendererError};
pub use text::{ApproximateMetrics, GlyphFont};
