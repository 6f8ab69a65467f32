use anyhow::{anyhow, Context, Result};
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::engine::FileType;

/// Drive headless Chrome over a rendered HTML page and write the capture
/// to `output_path`. The browser work is blocking, so it runs on the
/// blocking pool; this await is the only suspension point of a conversion.
pub async fn capture(
	html_path: &Path,
	output_path: &Path,
	file_type: FileType,
	print_background: bool,
) -> Result<PathBuf> {
	let url = format!("file://{}", html_path.display());
	let output_path = output_path.to_path_buf();

	tokio::task::spawn_blocking(move || -> Result<PathBuf> {
		let browser = Browser::new(
			LaunchOptions::default_builder()
				.headless(true)
				.build()
				.map_err(|e| anyhow!("Failed to configure Chrome: {e}"))?,
		)?;

		let tab = browser.new_tab()?;
		tab.navigate_to(&url)?.wait_until_navigated()?;

		let bytes = match file_type {
			FileType::Pdf => tab.print_to_pdf(Some(PrintToPdfOptions {
				print_background: Some(print_background),
				..Default::default()
			}))?,
			FileType::Png => {
				tab.capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)?
			}
			FileType::Jpeg => {
				tab.capture_screenshot(CaptureScreenshotFormatOption::Jpeg, Some(90), None, true)?
			}
		};

		fs::write(&output_path, bytes)
			.with_context(|| format!("Failed to write {}", output_path.display()))?;

		Ok(output_path)
	})
	.await?
}

/// Hand the generated file to the platform opener. Best effort only.
pub fn open_file(path: &Path) {
	#[cfg(target_os = "macos")]
	let result = Command::new("open").arg(path).spawn();
	#[cfg(target_os = "windows")]
	let result = Command::new("cmd").args(["/C", "start", ""]).arg(path).spawn();
	#[cfg(all(unix, not(target_os = "macos")))]
	let result = Command::new("xdg-open").arg(path).spawn();

	if let Err(e) = result {
		log::warn!("Failed to open {}: {}", path.display(), e);
	}
}
