#![warn(missing_docs)]
//! StudioShot - AI professional headshots from a single photo.
//!
//! This crate is a thin orchestration layer over the Gemini multimodal
//! generation API: it encodes an uploaded photo, builds a natural-language
//! instruction from the selected stylistic options, sends one request, and
//! extracts the returned image. A small session controller drives the
//! placeholder / loading / result / error flow and the regenerate-with-
//! changes loop that feeds the previous output back in as the new input.
//!
//! # Quick Start
//!
//! ```no_run
//! use studioshot::{GeminiClient, HeadwearChoice, OptionSelection, Studio};
//!
//! #[tokio::main]
//! async fn main() -> studioshot::Result<()> {
//!     let mut studio = Studio::new(Box::new(GeminiClient::builder().build()));
//!     studio.upload_photo("photo.jpg").await?;
//!
//!     let selection = OptionSelection::default()
//!         .with_outfit("a dark business suit with a white shirt")
//!         .with_headwear(HeadwearChoice::Remove);
//!     let headshot = studio.generate(&selection).await?;
//!     headshot.save("headshot.png")?;
//!     Ok(())
//! }
//! ```
//!
//! # Refining a result
//!
//! ```no_run
//! use studioshot::{GeminiClient, RefinementSelection, Studio};
//!
//! # #[tokio::main]
//! # async fn main() -> studioshot::Result<()> {
//! # let mut studio = Studio::new(Box::new(GeminiClient::builder().build()));
//! let refinement = RefinementSelection::view("show a three-quarter view")
//!     .with_custom("make the smile a little wider");
//! let refined = studio.regenerate(&refinement).await?;
//! # Ok(())
//! # }
//! ```
//!
//! The API key is read from the `GEMINI_API_KEY` environment variable; a
//! missing key surfaces on the first request, not at startup.

mod error;
mod gemini;
mod generator;
pub mod image;
pub mod prompt;
mod session;

pub use error::{Result, StudioError};
pub use gemini::{GeminiClient, GeminiClientBuilder, GeminiModel, API_KEY_ENV};
pub use generator::HeadshotGenerator;
pub use image::{load_photo, ImageFormat, ImagePayload};
pub use prompt::{
    headshot_prompt, refinement_prompt, HeadwearChoice, OptionSelection, RefinementSelection,
};
pub use session::{RegionVisibility, Studio, ViewState};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{Result, StudioError};
    pub use crate::gemini::GeminiClient;
    pub use crate::generator::HeadshotGenerator;
    pub use crate::image::ImagePayload;
    pub use crate::prompt::{HeadwearChoice, OptionSelection, RefinementSelection};
    pub use crate::session::{Studio, ViewState};
}
