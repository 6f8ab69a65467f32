use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::EngineConfig;
use crate::export;
use crate::render::Renderer;

/// A conversion engine rooted at a workspace directory. Relative
/// references inside documents resolve against this root, so the
/// intermediate HTML page is written there too.
pub struct Notebook {
	workspace_dir: PathBuf,
	config: EngineConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FileType {
	Pdf,
	Png,
	Jpeg,
}

impl FileType {
	pub fn extension(self) -> &'static str {
		match self {
			FileType::Pdf => "pdf",
			FileType::Png => "png",
			FileType::Jpeg => "jpeg",
		}
	}
}

pub struct ExportOptions {
	pub file_type: FileType,
	pub open_file_after_generation: bool,
}

impl Notebook {
	pub fn init(workspace_dir: impl Into<PathBuf>, config: EngineConfig) -> Result<Self> {
		let workspace_dir = workspace_dir.into();
		if !workspace_dir.is_dir() {
			bail!(
				"Workspace directory does not exist: {}",
				workspace_dir.display()
			);
		}

		log::debug!(
			"Engine themes: preview={}, revealjs={}, code={}",
			config.preview_theme,
			config.revealjs_theme,
			config.code_block_theme
		);

		Ok(Self {
			workspace_dir,
			config,
		})
	}

	/// Per-document export handle bound to this notebook's workspace.
	pub fn markdown_engine(&self, path: &Path) -> Result<MarkdownEngine> {
		let path = std::path::absolute(path)
			.with_context(|| format!("Failed to resolve path: {}", path.display()))?;

		Ok(MarkdownEngine {
			workspace_dir: self.workspace_dir.clone(),
			config: self.config.clone(),
			path,
		})
	}
}

pub struct MarkdownEngine {
	workspace_dir: PathBuf,
	config: EngineConfig,
	path: PathBuf,
}

impl MarkdownEngine {
	/// Render the document and capture it with headless Chrome. Returns
	/// the temporary path the file was written to; the caller decides
	/// where it finally lives.
	pub async fn chrome_export(&self, options: ExportOptions) -> Result<PathBuf> {
		let stem = self
			.path
			.file_stem()
			.and_then(|s| s.to_str())
			.context("Source file has no usable name")?;

		let renderer = Renderer::new(self.config.clone());
		let page = renderer.render_page(&self.path)?;
		log::debug!("Rendered \"{}\"", page.title);

		// The page goes inside the workspace so relative images and
		// links keep resolving under the file:// origin.
		let html_path = self.workspace_dir.join(format!(".{stem}.export.html"));
		fs::write(&html_path, &page.html)
			.with_context(|| format!("Failed to write {}", html_path.display()))?;

		let out_dir = std::env::temp_dir().join("md2pdf");
		fs::create_dir_all(&out_dir)
			.with_context(|| format!("Failed to create {}", out_dir.display()))?;
		let out_path = out_dir.join(format!("{}.{}", stem, options.file_type.extension()));

		let result = export::capture(
			&html_path,
			&out_path,
			options.file_type,
			self.config.print_background,
		)
		.await;

		fs::remove_file(&html_path).ok();
		let out_path = result?;

		if options.open_file_after_generation {
			export::open_file(&out_path);
		}

		Ok(out_path)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_init_rejects_missing_workspace() {
		let missing = std::env::temp_dir().join("md2pdf-no-such-workspace");
		assert!(Notebook::init(missing, EngineConfig::default()).is_err());
	}

	#[test]
	fn test_file_type_extensions() {
		assert_eq!(FileType::Pdf.extension(), "pdf");
		assert_eq!(FileType::Png.extension(), "png");
		assert_eq!(FileType::Jpeg.extension(), "jpeg");
	}
}
