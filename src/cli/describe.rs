use anyhow::{Context, Result};
use clap::Args;
use std::path::Path;

use agent_vision::config::Config;
use agent_vision::vision::{ImageFormat, ImagePayload, VisionService};

#[derive(Args)]
pub struct DescribeArgs {
    /// Image to describe: a file path or a data:image/...;base64,... string
    pub image: String,

    /// Prompt prefix (overrides config)
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Model to use (overrides config)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Request a streamed response
    #[arg(long)]
    pub stream: bool,

    /// Output format: text (default) or json
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub async fn run(args: DescribeArgs, mut config: Config) -> Result<()> {
    if let Some(prompt) = args.prompt {
        config.vision.content = prompt;
    }
    if let Some(model) = args.model {
        config.vision.model = model;
    }
    if args.stream {
        config.vision.stream = true;
    }

    let image_data = if args.image.starts_with("data:") {
        args.image
    } else {
        load_image_file(&args.image)?
    };

    let service = VisionService::new(&config)?;
    let description = service.describe_image(&image_data).await?;

    match args.format.as_str() {
        "json" => {
            let output = serde_json::json!({
                "model": config.vision.model,
                "description": description,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => {
            println!("{}", description);
        }
    }

    Ok(())
}

/// Read an image from disk and encode it as an inline data URL.
fn load_image_file(input: &str) -> Result<String> {
    let expanded = shellexpand::tilde(input).to_string();
    let path = Path::new(&expanded);

    if !path.exists() {
        anyhow::bail!("File not found: {}", expanded);
    }

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    let format = ImageFormat::from_extension(ext).ok_or_else(|| {
        anyhow::anyhow!("Unsupported image extension '{}' (expected jpeg, jpg or png)", ext)
    })?;

    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", expanded))?;
    tracing::debug!("Read {} ({} bytes)", expanded, bytes.len());

    Ok(ImagePayload::from_bytes(format, &bytes).data_url())
}
