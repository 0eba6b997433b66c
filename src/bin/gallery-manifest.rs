use clap::{Parser, ValueEnum};
use infinite_gallery::generate::{self, Format, Order};
use std::{fs, path::PathBuf, process::ExitCode};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
	/// JSON array, fetched by `loadGallery()`
	Json,
	/// `const manifest = [...]` script, passed to `mountStatic(manifest)`
	Script,
}

/// Writes the image manifest of an infinite-scroll gallery.
#[derive(Parser)]
#[command(name = "gallery-manifest")]
struct Cli {
	/// Directory containing the images
	#[arg(long, default_value = "images")]
	images: PathBuf,

	/// Output file [default: manifest.json or manifest.js, depending on format]
	#[arg(long)]
	output: Option<PathBuf>,

	#[arg(long, value_enum, default_value = "json")]
	format: FormatArg,

	/// List images in descending natural order
	#[arg(long)]
	newest_first: bool,
}

fn main() -> ExitCode {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.with_writer(std::io::stderr)
		.init();

	let cli = Cli::parse();
	let format = match cli.format {
		FormatArg::Json => Format::Json,
		FormatArg::Script => Format::Script,
	};
	let order = if cli.newest_first { Order::NewestFirst } else { Order::OldestFirst };
	let output = cli.output.unwrap_or_else(|| {
		PathBuf::from(match format {
			Format::Json => "manifest.json",
			Format::Script => "manifest.js",
		})
	});

	let result = generate::scan_images(&cli.images, order).and_then(|images| {
		let rendered = generate::render(&images, format)?;
		fs::write(&output, rendered)?;
		Ok(images.len())
	});
	match result {
		Ok(count) => {
			info!("{} updated with {} image(s).", output.display(), count);
			ExitCode::SUCCESS
		}
		Err(error) => {
			error!("{}", error);
			ExitCode::FAILURE
		}
	}
}
