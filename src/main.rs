use std::path::PathBuf;

use anyhow::{bail, Context};
use avatar_crop::extract::OutputFormat;
use avatar_crop::PartialClip;

const USAGE: &str = "usage: avatar-crop <input> <output> [clip-json]";

fn main() -> anyhow::Result<()> {
    avatar_crop::logging::init();

    let mut args = std::env::args_os().skip(1);
    let (Some(input), Some(output)) = (args.next(), args.next()) else {
        bail!(USAGE);
    };
    let input = PathBuf::from(input);
    let output = PathBuf::from(output);
    let clip = args
        .next()
        .map(|raw| {
            let raw = raw.to_string_lossy().into_owned();
            serde_json::from_str::<PartialClip>(&raw)
                .with_context(|| format!("invalid clip json: {raw}"))
        })
        .transpose()?;
    if args.next().is_some() {
        bail!(USAGE);
    }

    let mime_type = image::ImageFormat::from_path(&output)
        .ok()
        .map(|format| format.to_mime_type())
        .filter(|mime| OutputFormat::from_mime_type(mime).is_some());

    let blob = avatar_crop::run(&input, clip.as_ref(), mime_type)
        .with_context(|| format!("failed to crop {}", input.display()))?;
    std::fs::write(&output, &blob.bytes)
        .with_context(|| format!("failed to write {}", output.display()))?;
    tracing::info!(
        output = %output.display(),
        bytes = blob.bytes.len(),
        mime_type = blob.mime_type,
        "wrote avatar crop"
    );
    Ok(())
}
