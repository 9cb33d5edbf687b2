use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pix_blob::{
    BlobStore, CollectionConfig, FsStore, RemoteCollection, S3Config, S3Store, StoreCapabilities,
};
use pix_gallery::{
    FsMediaReader, GalleryBody, GalleryConfig, GalleryController, GalleryView, PathPicker,
    PickOutcome, Viewport,
};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Browse and upload to a remote image gallery.", long_about = None)]
struct Args {
    /// Use a local directory as the bucket instead of S3 (PIX_S3_* variables)
    #[arg(long, value_name = "DIR", env = "PIX_FS_ROOT")]
    fs_root: Option<PathBuf>,

    /// Folder under which uploads are stored
    #[arg(long, default_value = "images")]
    upload_prefix: String,

    /// Parallel listing and resolution requests
    #[arg(long, default_value_t = 8)]
    concurrency: usize,

    /// Screen width used to lay out rows
    #[arg(long, default_value_t = 1000.0)]
    width: f32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every image in the collection, row by row
    List {
        /// Print the full screen snapshot as JSON
        #[arg(long)]
        json: bool,

        /// Show file names next to locators
        #[arg(long)]
        names: bool,
    },
    /// Upload a local picture
    Upload {
        file: PathBuf,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let store = open_store(&args).await?;
    let collection = RemoteCollection::from_shared(
        store,
        CollectionConfig::default()
            .with_upload_prefix(args.upload_prefix.clone())
            .with_max_concurrency(args.concurrency),
    );
    let viewport = Viewport::new(args.width, Viewport::default().item_width);

    match args.command {
        Command::List { json, names } => list(collection, viewport, json, names).await,
        Command::Upload { file, yes } => upload(collection, viewport, file, yes).await,
    }
}

async fn open_store(args: &Args) -> Result<Arc<dyn BlobStore>> {
    if let Some(root) = &args.fs_root {
        info!(root = %root.display(), "using local directory store");
        return Ok(Arc::new(FsStore::new(root)));
    }
    let config = S3Config::from_env().context("S3 configuration (or pass --fs-root)")?;
    info!(bucket = %config.bucket, region = %config.region, "using S3 store");
    Ok(Arc::new(S3Store::new(config).await))
}

async fn list(collection: RemoteCollection, viewport: Viewport, json: bool, names: bool) -> Result<()> {
    if let Some(notice) = link_notice(&collection.capabilities()) {
        info!("{notice}");
    }

    let config = GalleryConfig::new().with_viewport(viewport);
    let mut gallery = GalleryController::new(collection, PathPicker::cancelled(), FsMediaReader::new(), config);

    load(&mut gallery, names).await;
    print!("{}", render(&gallery.view(), json)?);
    Ok(())
}

/// Activate the gallery. A failed load leaves it empty with `last_error` set.
async fn load(gallery: &mut GalleryController, names: bool) {
    if let Err(e) = gallery.activate().await {
        warn!(error = %e, "showing an empty gallery");
    }
    if names {
        for image in gallery.images().to_vec() {
            gallery.toggle_name(&image);
        }
    }
}

fn render(view: &GalleryView, json: bool) -> Result<String> {
    if json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(view)?));
    }

    let mut out = String::new();
    match &view.body {
        GalleryBody::Loading => {}
        GalleryBody::Empty => out.push_str("No images in storage\n"),
        GalleryBody::Rows(rows) => {
            for row in rows {
                out.push_str(&format!("-- row {} --\n", row.index + 1));
                for tile in &row.items {
                    match &tile.caption {
                        Some(caption) => out.push_str(&format!("{caption}\t{}\n", tile.image)),
                        None => out.push_str(&format!("{}\n", tile.image)),
                    }
                }
            }
        }
    }
    Ok(out)
}

fn link_notice(capabilities: &StoreCapabilities) -> Option<String> {
    match (capabilities.supports_signed_urls, capabilities.url_ttl_secs) {
        (true, Some(ttl)) => Some(format!("download links are presigned and expire after {ttl}s")),
        (true, None) => Some("download links are presigned".to_string()),
        (false, _) => None,
    }
}

async fn upload(collection: RemoteCollection, viewport: Viewport, file: PathBuf, yes: bool) -> Result<()> {
    let config = GalleryConfig::new().with_viewport(viewport);
    let mut gallery = GalleryController::new(collection, PathPicker::new(&file), FsMediaReader::new(), config);

    let image = match gallery.request_pick().await? {
        PickOutcome::Picked(image) => image,
        PickOutcome::Cancelled => return Ok(()),
    };

    if !yes && !confirm(&format!("Upload {}?", pix_gallery::display_name(Some(&image))))? {
        gallery.cancel_upload();
        println!("Upload cancelled");
        return Ok(());
    }

    let ack = gallery.confirm_upload().await?;
    println!("Uploaded {} ({} bytes)", ack.path, ack.size_bytes);
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
