//! Refinement example - modifies a previously generated headshot.
//!
//! Run with: `cargo run --example refine_headshot -- <headshot.png>`
//!
//! Requires `GEMINI_API_KEY` environment variable.

use studioshot::{load_photo, GeminiClient, RefinementSelection, Studio};

#[tokio::main]
async fn main() -> studioshot::Result<()> {
    let headshot_path = std::env::args()
        .nth(1)
        .expect("Usage: refine_headshot <headshot.png>");

    let mut studio = Studio::new(Box::new(GeminiClient::builder().build()));
    studio.restore_result(load_photo(&headshot_path).await?);

    // A non-empty custom instruction would take precedence over the view.
    let refinement = RefinementSelection::view("show a three-quarter view");

    let refined = studio.regenerate(&refinement).await?;
    refined.save("refined.png")?;
    println!(
        "Refined headshot saved to refined.png (~{} bytes)",
        refined.size_estimate()
    );

    Ok(())
}
