use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::convert::Converter;
use crate::engine::FileType;

const HASH_MAP_FILE: &str = "_hash_map.json";

/// Per-document record in the hash map. A document is only reconverted
/// when its source or its output no longer matches what is recorded here.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HashEntry {
	pub source_path: PathBuf,
	pub output_path: PathBuf,
	pub source_hash: Option<String>,
	pub output_hash: Option<String>,
}

/// Converts every Markdown file under a directory, sequentially, skipping
/// documents that are unchanged since the previous run.
pub struct BatchConverter {
	input_dir: PathBuf,
	output_dir: PathBuf,
	file_type: FileType,
	skip_pattern: Regex,
}

impl BatchConverter {
	pub fn new(input_dir: PathBuf, output_dir: PathBuf, file_type: FileType) -> Self {
		Self {
			input_dir,
			output_dir,
			file_type,
			// numbered placeholder files like `03_.md` are never converted
			skip_pattern: Regex::new(r"^\d+_\.md$").unwrap(),
		}
	}

	pub async fn run(&self) -> Result<()> {
		if !self.input_dir.is_dir() {
			bail!("Input directory is not valid: {}", self.input_dir.display());
		}
		fs::create_dir_all(&self.output_dir).with_context(|| {
			format!(
				"Failed to create output directory: {}",
				self.output_dir.display()
			)
		})?;

		let documents = self.collect_documents();
		if documents.is_empty() {
			log::warn!(
				"No Markdown files found under {}",
				self.input_dir.display()
			);
			return Ok(());
		}
		log::info!("Found {} Markdown files", documents.len());

		let hash_map_path = self.output_dir.join(HASH_MAP_FILE);
		let mut hash_map = load_hash_map(&hash_map_path);
		let mut converted = 0;

		for md_file in &documents {
			let filename = md_file
				.file_name()
				.map(|s| s.to_string_lossy().to_string())
				.unwrap_or_default();
			if self.skip_pattern.is_match(&filename) {
				log::info!("Skipping {filename}");
				continue;
			}

			let stem = md_file
				.file_stem()
				.and_then(|s| s.to_str())
				.unwrap_or("output");
			let out_name = format!("{}.{}", stem, self.file_type.extension());
			let expected = self.output_dir.join(&out_name);

			let current_source_hash = sha256_of_file(md_file);
			let current_output_hash = sha256_of_file(&expected);

			if !needs_convert(
				hash_map.get(&out_name),
				current_source_hash.as_deref(),
				current_output_hash.as_deref(),
			) {
				log::info!("Up to date: {out_name}");
				hash_map.insert(
					out_name,
					self.entry(md_file, &expected, current_source_hash, current_output_hash),
				);
				continue;
			}

			log::info!("Converting {}", md_file.display());
			let converter =
				Converter::new(md_file.clone(), self.output_dir.clone(), self.file_type);
			match converter.run().await {
				Ok(path) => {
					converted += 1;
					log::info!("Created {}", path.display());
				}
				Err(e) => {
					log::error!("Conversion failed for {}: {:#}", md_file.display(), e);
				}
			}

			// record whatever is on disk now, even after a failure
			hash_map.insert(
				out_name,
				self.entry(
					md_file,
					&expected,
					current_source_hash,
					sha256_of_file(&expected),
				),
			);
			save_hash_map(&hash_map_path, &hash_map)?;
		}

		save_hash_map(&hash_map_path, &hash_map)?;
		log::info!(
			"Processed {} documents, {} converted",
			documents.len(),
			converted
		);

		Ok(())
	}

	fn collect_documents(&self) -> Vec<PathBuf> {
		let mut documents = Vec::new();

		for entry in WalkDir::new(&self.input_dir)
			.follow_links(true)
			.into_iter()
			.filter_map(|e| e.ok())
		{
			let path = entry.path();
			if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("md") {
				documents.push(path.to_path_buf());
			}
		}

		documents.sort();
		documents
	}

	fn entry(
		&self,
		source: &Path,
		output: &Path,
		source_hash: Option<String>,
		output_hash: Option<String>,
	) -> HashEntry {
		HashEntry {
			source_path: source
				.strip_prefix(&self.input_dir)
				.unwrap_or(source)
				.to_path_buf(),
			output_path: output
				.strip_prefix(&self.output_dir)
				.unwrap_or(output)
				.to_path_buf(),
			source_hash,
			output_hash,
		}
	}
}

fn needs_convert(
	entry: Option<&HashEntry>,
	current_source_hash: Option<&str>,
	current_output_hash: Option<&str>,
) -> bool {
	let current_output = match current_output_hash {
		Some(hash) => hash,
		// output missing or unreadable
		None => return true,
	};
	let entry = match entry {
		Some(entry) => entry,
		// no history, rebuild to be safe
		None => return true,
	};
	let stored_output = match entry.output_hash.as_deref() {
		Some(hash) => hash,
		None => return true,
	};
	if let Some(stored_source) = entry.source_hash.as_deref() {
		if Some(stored_source) != current_source_hash {
			return true;
		}
	}

	stored_output != current_output
}

fn load_hash_map(path: &Path) -> BTreeMap<String, HashEntry> {
	match fs::read_to_string(path) {
		Ok(raw) => serde_json::from_str(&raw).unwrap_or_default(),
		Err(_) => BTreeMap::new(),
	}
}

fn save_hash_map(path: &Path, map: &BTreeMap<String, HashEntry>) -> Result<()> {
	let raw = serde_json::to_string_pretty(map)?;
	fs::write(path, raw).with_context(|| format!("Failed to write {}", path.display()))
}

fn sha256_of_file(path: &Path) -> Option<String> {
	let mut file = File::open(path).ok()?;
	let mut hasher = Sha256::new();
	io::copy(&mut file, &mut hasher).ok()?;
	Some(hex::encode(hasher.finalize()))
}
