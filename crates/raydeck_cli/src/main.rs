use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use raydeck_core::{SceneCatalog, SceneDescriptor};
use raydeck_session::{
    CancellationToken, DenoisePolicy, QualitySettings, RenderService, SessionConfig, Viewport,
};

/// Render a scene from a scene catalog to an image file.
#[derive(Parser, Debug)]
#[command(name = "raydeck", version)]
struct Cli {
    /// Scene catalog (JSON)
    #[arg(long, env = "RAYDECK_CATALOG")]
    catalog: PathBuf,

    /// Scene to render, by name
    #[arg(long, conflicts_with = "index")]
    scene: Option<String>,

    /// Scene to render, by position in the catalog
    #[arg(long)]
    index: Option<usize>,

    #[arg(long, default_value_t = 640)]
    width: u32,

    #[arg(long, default_value_t = 360)]
    height: u32,

    /// Samples per pixel
    #[arg(long, default_value_t = 10)]
    spp: i32,

    /// Maximum path length
    #[arg(long = "max-path", default_value_t = 5)]
    max_path: i32,

    /// Skip the denoise pass even if the engine supports it
    #[arg(long)]
    no_denoise: bool,

    /// Directory to start the content search from (default: working directory)
    #[arg(long)]
    content_root: Option<PathBuf>,

    /// Output image; the format follows the extension (png, bmp, jpg)
    #[arg(long, short, default_value = "render.png")]
    output: PathBuf,

    /// Print the scene names and exit
    #[arg(long)]
    list: bool,
}

impl Cli {
    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            denoise: if self.no_denoise {
                DenoisePolicy::Off
            } else {
                DenoisePolicy::Auto
            },
            search_root: self.content_root.clone(),
            ..Default::default()
        }
    }
}

/// Pick the requested scene; the first one when none is named.
fn select_scene<'a>(
    catalog: &'a SceneCatalog,
    name: Option<&str>,
    index: Option<usize>,
) -> Result<&'a SceneDescriptor> {
    if catalog.is_empty() {
        bail!("Scene catalog has no scenes");
    }
    match (name, index) {
        (Some(name), _) => catalog
            .find(name)
            .with_context(|| format!("No scene named '{}'", name)),
        (None, Some(i)) => catalog.get(i).with_context(|| {
            format!("Scene index {} out of range (catalog has {})", i, catalog.len())
        }),
        (None, None) => catalog.get(0).context("Scene catalog has no scenes"),
    }
}

#[cfg(feature = "native")]
fn create_service(config: SessionConfig) -> RenderService {
    RenderService::new(raydeck_engine::NativeEngine::new(), config)
}

#[cfg(not(feature = "native"))]
fn create_service(config: SessionConfig) -> RenderService {
    RenderService::new(raydeck_engine::HeadlessEngine::new(), config)
}

fn run(cli: &Cli) -> Result<()> {
    let catalog = SceneCatalog::load(&cli.catalog)
        .with_context(|| format!("Failed to load scene catalog {}", cli.catalog.display()))?;

    if cli.list {
        for (i, name) in catalog.names().enumerate() {
            println!("{:>3}  {}", i, name);
        }
        return Ok(());
    }

    let descriptor = select_scene(&catalog, cli.scene.as_deref(), cli.index)?;
    log::info!("Rendering '{}' at {}x{}", descriptor.name, cli.width, cli.height);

    let service = create_service(cli.session_config());
    let start = std::time::Instant::now();
    let output = service
        .render(
            descriptor,
            QualitySettings::new(cli.spp, cli.max_path),
            Viewport::new(cli.width, cli.height),
            &CancellationToken::new(),
        )
        .with_context(|| format!("Failed to render '{}'", descriptor.name))?;
    log::info!(
        "Rendered in {:.2}s (denoised: {})",
        start.elapsed().as_secs_f32(),
        output.denoised
    );

    output
        .display
        .to_rgb_image()
        .save(&cli.output)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;
    log::info!("Wrote {}", cli.output.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    run(&cli)
}
