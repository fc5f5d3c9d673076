//! CLI for StudioShot - AI professional headshot generation.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use studioshot::{
    load_photo, GeminiClient, GeminiModel, HeadwearChoice, OptionSelection, RefinementSelection,
    Studio,
};

#[derive(Parser)]
#[command(name = "studioshot")]
#[command(about = "Turn a photo into a professional headshot via the Gemini image API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a headshot from a photo
    Generate(GenerateArgs),

    /// Modify a previously generated headshot
    Refine(RefineArgs),

    /// List the predefined option values
    Options,
}

#[derive(Args)]
struct GenerateArgs {
    /// Path to the source photo
    photo: PathBuf,

    /// Output file path (extension follows the returned image when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Outfit description
    #[arg(long)]
    outfit: Option<String>,

    /// Headwear: "remove", "none", or an item to wear
    #[arg(long)]
    headwear: Option<String>,

    /// Background description
    #[arg(long)]
    background: Option<String>,

    /// Lighting description
    #[arg(long)]
    lighting: Option<String>,

    /// Model to use
    #[arg(long, value_enum, default_value = "flash")]
    model: ModelArg,

    /// Print the result as a data URL instead of saving it
    #[arg(long)]
    data_url: bool,
}

#[derive(Args)]
struct RefineArgs {
    /// Path to a previously generated headshot
    headshot: PathBuf,

    /// Free-text instruction (wins over --view when both are given)
    #[arg(short, long)]
    instruction: Option<String>,

    /// Predefined view change (see `studioshot options`)
    #[arg(long)]
    view: Option<String>,

    /// Output file path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Model to use
    #[arg(long, value_enum, default_value = "flash")]
    model: ModelArg,

    /// Print the result as a data URL instead of saving it
    #[arg(long)]
    data_url: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    /// Gemini 2.5 Flash Image
    Flash,
    /// Gemini 3 Pro Image
    Pro,
}

impl From<ModelArg> for GeminiModel {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Flash => GeminiModel::FlashImage,
            ModelArg::Pro => GeminiModel::ProImage,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => generate(args, cli.json).await,
        Commands::Refine(args) => refine(args, cli.json).await,
        Commands::Options => list_options(cli.json),
    }
}

fn studio_for(model: ModelArg) -> Studio {
    let client = GeminiClient::builder().model(model.into()).build();
    Studio::new(Box::new(client))
}

async fn generate(args: GenerateArgs, json_output: bool) -> anyhow::Result<()> {
    let mut studio = studio_for(args.model);

    if let Err(e) = studio.upload_photo(&args.photo).await {
        anyhow::bail!("{}", e.user_message());
    }

    let mut selection = OptionSelection::default();
    if let Some(outfit) = args.outfit {
        selection = selection.with_outfit(outfit);
    }
    if let Some(background) = args.background {
        selection = selection.with_background(background);
    }
    if let Some(lighting) = args.lighting {
        selection = selection.with_lighting(lighting);
    }
    if let Some(ref headwear) = args.headwear {
        selection = selection.with_headwear(HeadwearChoice::from_option_value(headwear));
    }

    let headshot = match studio.generate(&selection).await {
        Ok(payload) => payload.clone(),
        Err(e) => anyhow::bail!("{}", e.user_message()),
    };

    emit_result(&headshot, args.output, args.data_url, json_output)
}

async fn refine(args: RefineArgs, json_output: bool) -> anyhow::Result<()> {
    if args.instruction.is_none() && args.view.is_none() {
        anyhow::bail!("provide --instruction or --view (see `studioshot options`)");
    }

    let mut studio = studio_for(args.model);

    let prior = match load_photo(&args.headshot).await {
        Ok(payload) => payload,
        Err(e) => anyhow::bail!("{}", e.user_message()),
    };
    studio.restore_result(prior);

    let refinement = RefinementSelection {
        custom_instruction: args.instruction.unwrap_or_default(),
        view_change: args.view.unwrap_or_default(),
    };

    let headshot = match studio.regenerate(&refinement).await {
        Ok(payload) => payload.clone(),
        Err(e) => anyhow::bail!("{}", e.user_message()),
    };

    emit_result(&headshot, args.output, args.data_url, json_output)
}

fn emit_result(
    headshot: &studioshot::ImagePayload,
    output: Option<PathBuf>,
    data_url: bool,
    json_output: bool,
) -> anyhow::Result<()> {
    if data_url {
        let url = headshot.to_data_url();
        if json_output {
            let result = serde_json::json!({
                "success": true,
                "mime_type": headshot.mime_type,
                "data_url": url,
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!("{url}");
        }
        return Ok(());
    }

    let path =
        output.unwrap_or_else(|| PathBuf::from(format!("headshot.{}", headshot.extension())));
    headshot.save(&path)?;

    if json_output {
        let result = serde_json::json!({
            "success": true,
            "output": path.display().to_string(),
            "size_bytes": headshot.size_estimate(),
            "mime_type": headshot.mime_type,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Saved headshot: {} (~{} bytes, {})",
            path.display(),
            headshot.size_estimate(),
            headshot.mime_type
        );
    }

    Ok(())
}

fn list_options(json_output: bool) -> anyhow::Result<()> {
    use studioshot::prompt::{BACKGROUNDS, LIGHTING, OUTFITS, VIEW_CHANGES};

    if json_output {
        let options = serde_json::json!({
            "outfits": OUTFITS,
            "backgrounds": BACKGROUNDS,
            "lighting": LIGHTING,
            "view_changes": VIEW_CHANGES,
            "headwear": ["none", "remove", "<free text: item to wear>"],
        });
        println!("{}", serde_json::to_string_pretty(&options)?);
        return Ok(());
    }

    println!("Outfits:");
    for v in OUTFITS {
        println!("  {v}");
    }
    println!("\nBackgrounds:");
    for v in BACKGROUNDS {
        println!("  {v}");
    }
    println!("\nLighting:");
    for v in LIGHTING {
        println!("  {v}");
    }
    println!("\nView changes (refine):");
    for v in VIEW_CHANGES {
        println!("  {v}");
    }
    println!("\nHeadwear: \"none\", \"remove\", or free text for an item to wear");
    println!("\nAny option also accepts free text.");

    Ok(())
}
