use clap::{Parser, Subcommand};
use simple_picture::imaging::RustProducer;
use simple_picture::shortcodes::{
    Args, IMAGE, IMAGE_WITH_DETAIL, InvocationContext, PictureShortcodes, ProduceEvent,
    ShortcodeRegistry, register_picture_shortcodes,
};
use simple_picture::variants::VariantSet;
use simple_picture::{config, output};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "simple-picture")]
#[command(about = "Responsive <picture> markup with AVIF, WebP and JPEG variants")]
#[command(long_about = "\
Responsive <picture> markup with AVIF, WebP and JPEG variants

Each source image is resized to 320, 640 and 1280 pixels wide (never
upscaled) and encoded as AVIF, WebP and JPEG. The composed markup is
printed on stdout; progress goes to stderr.

Source references starting with '.' are used as given. Anything else is
resolved against the directory of --page:

  --page ./src/posts/index.md  cat.jpg        →  ./src/posts/cat.jpg
  --page ./src/posts/index.md  ./img/cat.jpg  →  ./img/cat.jpg

Run 'simple-picture gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Write every produced variant set as JSON to this file
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Arguments shared by both picture commands.
#[derive(clap::Args, Clone)]
struct PictureArgs {
    /// Source image reference, as written in a template
    src: String,

    /// Alternative text (may be empty, but must be given)
    #[arg(long)]
    alt: Option<String>,

    /// `sizes` attribute for every <source>
    #[arg(long)]
    sizes: String,

    /// Input path of the page the image appears on
    #[arg(long, default_value = "./index.md")]
    page: String,
}

#[derive(Subcommand)]
enum Command {
    /// Render a single responsive <picture>
    Image(PictureArgs),
    /// Render a <picture> with an art-directed detail crop
    ImageWithDetail {
        #[command(flatten)]
        picture: PictureArgs,

        /// Wrap the picture in a <figure> with this caption
        #[arg(long)]
        caption: Option<String>,

        /// Detail image reference
        #[arg(long)]
        detail_src: Option<String>,

        /// Media query selecting the detail image
        #[arg(long)]
        detail_media: Option<String>,

        /// `sizes` for the detail sources (defaults to config detail.sizes)
        #[arg(long)]
        detail_sizes: Option<String>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("simple_picture={log_level}").into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(err) = run(cli) {
        tracing::error!("{err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let (name, picture, args) = match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            return Ok(());
        }
        Command::Image(picture) => {
            let args = Args::new(vec![
                Some(picture.src.clone()),
                picture.alt.clone(),
                Some(picture.sizes.clone()),
            ]);
            (IMAGE, picture, args)
        }
        Command::ImageWithDetail {
            picture,
            caption,
            detail_src,
            detail_media,
            detail_sizes,
        } => {
            let args = Args::new(vec![
                Some(picture.src.clone()),
                picture.alt.clone(),
                Some(picture.sizes.clone()),
                caption,
                detail_src,
                detail_media,
                detail_sizes,
            ]);
            (IMAGE_WITH_DETAIL, picture, args)
        }
    };

    let config = config::load_config(&cli.config_dir)?;
    tracing::debug!(config_dir = %cli.config_dir.display(), "loaded config");
    init_thread_pool(&config.processing);

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        let mut produced = BTreeMap::new();
        for event in rx {
            output::print_produce_event(&event);
            let ProduceEvent::Produced {
                resolved, variants, ..
            } = event;
            produced.insert(resolved, variants);
        }
        produced
    });

    let shortcodes = PictureShortcodes::new(RustProducer::new(), config).with_events(tx);
    let mut registry = ShortcodeRegistry::new();
    register_picture_shortcodes(&mut registry, Arc::new(shortcodes));

    let ctx = InvocationContext::new(picture.page);
    let result = registry.invoke(name, &ctx, &args);
    // Dropping the registry drops the last sender and ends the printer loop.
    drop(registry);
    let produced: BTreeMap<String, VariantSet> = printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;

    let markup = result?;
    println!("{}", markup);

    if let Some(path) = &cli.manifest {
        let json = serde_json::to_string_pretty(&produced)?;
        std::fs::write(path, json)?;
    }
    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores; config can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
