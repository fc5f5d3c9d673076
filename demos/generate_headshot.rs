//! Basic headshot generation example.
//!
//! Run with: `cargo run --example generate_headshot -- <photo.jpg>`
//!
//! Requires `GEMINI_API_KEY` environment variable.

use studioshot::{GeminiClient, HeadwearChoice, OptionSelection, Studio};

#[tokio::main]
async fn main() -> studioshot::Result<()> {
    let photo_path = std::env::args()
        .nth(1)
        .expect("Usage: generate_headshot <photo.jpg>");

    let mut studio = Studio::new(Box::new(GeminiClient::builder().build()));
    studio.upload_photo(&photo_path).await?;

    let selection = OptionSelection::default()
        .with_outfit("a charcoal blazer over a light sweater")
        .with_background("a neutral light gray studio backdrop")
        .with_lighting("soft diffused studio lighting")
        .with_headwear(HeadwearChoice::Remove);

    let headshot = studio.generate(&selection).await?;
    headshot.save("headshot.png")?;
    println!(
        "Generated headshot: headshot.png (~{} bytes, {})",
        headshot.size_estimate(),
        headshot.mime_type
    );

    Ok(())
}
