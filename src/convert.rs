use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::EngineConfig;
use crate::engine::{ExportOptions, FileType, Notebook};

/// One-shot conversion of a single document: export through the notebook
/// engine, then move the result into the requested output directory.
pub struct Converter {
	source: PathBuf,
	output_dir: PathBuf,
	file_type: FileType,
}

impl Converter {
	pub fn new(source: PathBuf, output_dir: PathBuf, file_type: FileType) -> Self {
		Self {
			source,
			output_dir,
			file_type,
		}
	}

	pub async fn run(&self) -> Result<PathBuf> {
		let source = std::path::absolute(&self.source)
			.with_context(|| format!("Failed to resolve path: {}", self.source.display()))?;
		let workspace_dir = source
			.parent()
			.context("Source file has no parent directory")?;

		fs::create_dir_all(&self.output_dir).with_context(|| {
			format!(
				"Failed to create output directory: {}",
				self.output_dir.display()
			)
		})?;

		let notebook = Notebook::init(workspace_dir, EngineConfig::default())?;
		let engine = notebook.markdown_engine(&source)?;

		log::info!("Exporting {}", source.display());
		let temp_path = engine
			.chrome_export(ExportOptions {
				file_type: self.file_type,
				open_file_after_generation: false,
			})
			.await?;
		log::info!("Engine wrote {}", temp_path.display());

		relocate(&temp_path, &self.output_dir)
	}
}

/// Move the engine-produced file into `output_dir`, keeping the name the
/// engine chose. A plain rename, so both paths must live on the same
/// filesystem volume.
pub fn relocate(temp_path: &Path, output_dir: &Path) -> Result<PathBuf> {
	let name = temp_path
		.file_name()
		.with_context(|| format!("No file name in {}", temp_path.display()))?;
	let final_path = output_dir.join(name);

	fs::rename(temp_path, &final_path).with_context(|| {
		format!(
			"Failed to move {} to {}",
			temp_path.display(),
			final_path.display()
		)
	})?;

	Ok(final_path)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn scratch_dir(name: &str) -> PathBuf {
		let dir = std::env::temp_dir().join(format!("md2pdf-{}-{}", name, std::process::id()));
		fs::create_dir_all(&dir).unwrap();
		dir
	}

	#[test]
	fn test_relocate_moves_file_and_keeps_name() {
		let dir = scratch_dir("relocate");
		let temp = dir.join("doc.pdf");
		fs::write(&temp, b"%PDF-1.7 fake bytes").unwrap();
		let out_dir = dir.join("out");
		fs::create_dir_all(&out_dir).unwrap();

		let final_path = relocate(&temp, &out_dir).unwrap();

		assert_eq!(final_path, out_dir.join("doc.pdf"));
		assert_eq!(fs::read(&final_path).unwrap(), b"%PDF-1.7 fake bytes");
		assert!(!temp.exists());

		fs::remove_dir_all(&dir).ok();
	}

	#[test]
	fn test_relocate_missing_source_fails() {
		let dir = scratch_dir("relocate-missing");
		let out_dir = dir.join("out");
		fs::create_dir_all(&out_dir).unwrap();

		assert!(relocate(&dir.join("gone.pdf"), &out_dir).is_err());

		fs::remove_dir_all(&dir).ok();
	}

	#[test]
	fn test_output_directory_created_recursively() {
		let dir = scratch_dir("mkdir");
		let nested = dir.join("a").join("b").join("c");

		// same call the converter makes before exporting
		fs::create_dir_all(&nested).unwrap();
		assert!(nested.is_dir());

		// idempotent on a second run
		fs::create_dir_all(&nested).unwrap();

		fs::remove_dir_all(&dir).ok();
	}
}
