use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use flipbook_core::{
    DocumentRef, DocumentSource, LoaderEvent, PageSource, PdfiumSource, Viewer, ViewerOptions,
};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "flipbook", about = "Page-flip PDF viewer tools", version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the page count of a PDF
    Info {
        /// Input PDF file
        file: PathBuf,
    },

    /// Render every page of a PDF to PNG files
    Render(RenderArgs),
}

#[derive(Args)]
struct RenderArgs {
    /// Input PDF file
    file: PathBuf,

    /// Directory for page-NNN.png files
    #[arg(short, long)]
    out_dir: PathBuf,

    /// Zoom level in percent
    #[arg(long)]
    zoom: Option<u32>,

    /// Pages rendered in order before the book is ready
    #[arg(long)]
    initial: Option<usize>,

    /// Background renders in flight at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Viewer options JSON file
    #[arg(long)]
    config: Option<PathBuf>,
}

impl RenderArgs {
    /// Options from the config file, with command-line flags taking precedence
    async fn options(&self) -> Result<ViewerOptions> {
        let mut options = match &self.config {
            Some(path) => ViewerOptions::load(path)
                .await
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => ViewerOptions::default(),
        };

        if let Some(zoom) = self.zoom {
            options.zoom.initial_percent = zoom;
        }
        if let Some(initial) = self.initial {
            options.initial_pages_to_load = initial;
        }
        if let Some(concurrency) = self.concurrency {
            options.max_concurrent_renders = concurrency;
        }
        options.validate()?;
        Ok(options)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    match cli.command {
        Commands::Info { file } => info(&file).await,
        Commands::Render(args) => render(args).await,
    }
}

async fn info(file: &Path) -> Result<()> {
    let reference = DocumentRef::Path(file.to_path_buf());
    let name = reference.display_name();

    let page_count = tokio::task::spawn_blocking(move || {
        PdfiumSource::new()
            .open(&reference)
            .map(|document| document.page_count())
    })
    .await??;

    println!("{}: {} pages", name, page_count);
    Ok(())
}

async fn render(args: RenderArgs) -> Result<()> {
    let options = args.options().await?;
    tokio::fs::create_dir_all(&args.out_dir)
        .await
        .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;

    let mut viewer = Viewer::new(PdfiumSource::new(), options)?;
    let started = Instant::now();
    viewer.open(DocumentRef::Path(args.file.clone()));

    let mut written = 0;
    let mut failed = Vec::new();
    while let Some(event) = viewer.next_event().await {
        if event.generation() != viewer.state().generation {
            continue;
        }
        match event {
            LoaderEvent::OpenFailed { message, .. } => {
                bail!("Failed to open {}: {}", args.file.display(), message);
            }
            LoaderEvent::Opened { page_count, .. } => {
                println!("Rendering {} pages at {}", page_count, viewer.state().zoom);
            }
            LoaderEvent::PageRendered { index, page, .. } => {
                let path = args.out_dir.join(format!("page-{:03}.png", index + 1));
                let png = page.encode_png()?;
                tokio::fs::write(&path, png)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                written += 1;
            }
            LoaderEvent::PageFailed { index, message, .. } => {
                eprintln!("Page {} failed: {}", index + 1, message);
                failed.push(index + 1);
            }
            LoaderEvent::Ready { .. } => {
                println!(
                    "Book ready after {:.2?} ({}/{} pages)",
                    started.elapsed(),
                    viewer.slots().settled_count(),
                    viewer.slots().len()
                );
            }
            LoaderEvent::Settled { .. } => break,
            _ => {}
        }
    }

    println!(
        "Wrote {} page(s) to {} in {:.2?}",
        written,
        args.out_dir.display(),
        started.elapsed()
    );
    if !failed.is_empty() {
        println!("Failed pages: {:?}", failed);
    }

    Ok(())
}
