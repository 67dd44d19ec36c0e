use clap::{Parser, Subcommand};
use photo_redact::config::{CliOverrides, RedactConfig, check_directories};
use photo_redact::imaging::RustCodec;
use photo_redact::region::Region;
use photo_redact::{document::Document, export, output, scan};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "photo-redact")]
#[command(about = "Batch redaction for photo directories")]
#[command(long_about = "\
Batch redaction for photo directories

Black out rectangular regions on photos and export redacted JPEG copies
with metadata preserved (minus orientation), the embedded thumbnail
redacted too, and an optional output size cap.

Your filesystem is the data source. Each image's regions live in a JSON
sidecar next to it, in full-resolution pixel coordinates:

  photos/
  ├── redact.toml                  # Export config (optional)
  ├── IMG_0042.jpg
  ├── IMG_0042.regions.json        # [{\"x\":120,\"y\":80,\"width\":640,\"height\":220}]
  └── IMG_0043.jpg                 # No sidecar = copied with no blackouts

Typical session:

  photo-redact add photos/IMG_0042.jpg 120 80 760 300
  photo-redact scan photos
  photo-redact export photos redacted --limit 4

Size-capped export re-encodes at decreasing quality (default 80, step 3,
floor 70) until the output fits the limit.")]
#[command(version = version_string())]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List images and their blackout regions
    Scan {
        /// Directory of photos
        input: PathBuf,
    },
    /// Add a blackout region to an image's sidecar
    Add {
        image: PathBuf,
        // Two corners of the rectangle, in any order
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    /// Remove every region intersecting the given rectangle
    Remove {
        image: PathBuf,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    /// Export redacted copies of every image
    Export {
        /// Directory of photos
        input: PathBuf,
        /// Existing directory to write redacted copies into
        output: PathBuf,
        /// First JPEG encode quality (1-100)
        #[arg(short, long)]
        quality: Option<u32>,
        /// Output size cap in MB
        #[arg(short, long)]
        limit: Option<f64>,
        /// Disable the size cap entirely
        #[arg(long, conflicts_with = "limit")]
        no_limit: bool,
    },
    /// Validate directories, config and sidecars without exporting
    Check {
        input: PathBuf,
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Scan { input } => {
            let documents = scan::scan(&input)?;
            for line in output::format_scan(&documents) {
                println!("{line}");
            }
        }
        Command::Add { image, x1, y1, x2, y2 } => {
            let mut document = Document::with_regions(&image, scan::load_regions(&image)?);
            document.add_region(Region::from_corners(x1, y1, x2, y2));
            scan::save_regions(&image, document.regions())?;
            println!(
                "{}: {} region(s)",
                image.display(),
                document.regions().len()
            );
        }
        Command::Remove { image, x1, y1, x2, y2 } => {
            let mut document = Document::with_regions(&image, scan::load_regions(&image)?);
            let removed = document.remove_intersecting(x1, y1, x2, y2);
            scan::save_regions(&image, document.regions())?;
            println!(
                "{}: removed {}, {} region(s) left",
                image.display(),
                removed,
                document.regions().len()
            );
        }
        Command::Export {
            input,
            output: out_dir,
            quality,
            limit,
            no_limit,
        } => {
            check_directories(&input, &out_dir)?;
            let config = RedactConfig::load(&input)?.merged(&CliOverrides {
                quality,
                limit_mb: limit,
                no_limit,
            });
            config.validate()?;

            let documents = scan::scan(&input)?;
            let report = export::export_all(
                &documents,
                &RustCodec::new(),
                &out_dir,
                &config.export_options(),
            );
            for line in output::format_report(&report) {
                println!("{line}");
            }
            if !report.all_succeeded() {
                std::process::exit(1);
            }
        }
        Command::Check { input, output: out_dir } => {
            println!("==> Checking {}", input.display());
            check_directories(&input, &out_dir)?;
            RedactConfig::load(&input)?.validate()?;
            let documents = scan::scan(&input)?;
            for line in output::format_scan(&documents) {
                println!("{line}");
            }
            println!("==> Ready to export");
        }
    }

    Ok(())
}
