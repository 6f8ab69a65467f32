use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::batch::BatchConverter;
use crate::convert::Converter;
use crate::engine::FileType;

#[derive(Parser)]
#[command(name = "md2pdf")]
#[command(about = "Convert Markdown documents to PDF with headless Chrome")]
#[command(version)]
pub struct Cli {
	/// Source Markdown file, or a directory to convert recursively
	pub source: PathBuf,

	/// Directory the generated files are moved into (created if absent)
	pub output: PathBuf,

	/// Export format
	#[arg(short, long, value_enum, default_value = "pdf")]
	pub format: FileType,
}

impl Cli {
	pub async fn run(self) -> Result<()> {
		if self.source.is_dir() {
			let batch = BatchConverter::new(self.source, self.output, self.format);
			batch.run().await
		} else {
			let converter = Converter::new(self.source, self.output, self.format);
			let final_path = converter.run().await?;
			println!("Created {}", final_path.display());
			Ok(())
		}
	}
}
