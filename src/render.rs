use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::config::EngineConfig;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Frontmatter {
	pub title: Option<String>,
	#[serde(flatten)]
	pub extra: HashMap<String, serde_yaml::Value>,
}

/// A document rendered into a standalone HTML page, ready for Chrome.
#[derive(Debug, Clone)]
pub struct RenderedPage {
	pub title: String,
	pub html: String,
}

pub struct Renderer {
	config: EngineConfig,
	page_template: String,
}

impl Renderer {
	pub fn new(config: EngineConfig) -> Self {
		Self {
			config,
			page_template: include_str!("../templates/page.html").to_string(),
		}
	}

	/// Read a Markdown document and render it into a full HTML page with
	/// the configured themes applied.
	pub fn render_page(&self, path: &Path) -> Result<RenderedPage> {
		let raw = fs::read_to_string(path)
			.with_context(|| format!("Failed to read file: {}", path.display()))?;

		let (frontmatter, markdown) = extract_frontmatter(&raw);

		let mut body = markdown_to_html(&markdown);
		if !self.config.enable_script_execution {
			body = strip_scripts(&body);
		}

		let title = frontmatter.title.unwrap_or_else(|| {
			path.file_stem()
				.and_then(|s| s.to_str())
				.unwrap_or("Untitled")
				.to_string()
		});

		let html = self
			.page_template
			.replace("{{title}}", &title)
			.replace("{{preview_css}}", preview_theme_css(&self.config.preview_theme))
			.replace("{{code_css}}", code_block_theme_css(&self.config.code_block_theme))
			.replace("{{content}}", &body);

		Ok(RenderedPage { title, html })
	}
}

/// Split YAML frontmatter off the top of a document. Documents without a
/// frontmatter block pass through unchanged.
fn extract_frontmatter(content: &str) -> (Frontmatter, String) {
	if content.starts_with("---\n") {
		if let Some(end) = content[4..].find("\n---\n") {
			let frontmatter_str = &content[4..end + 4];
			let markdown = &content[end + 9..];

			let frontmatter: Frontmatter =
				serde_yaml::from_str(frontmatter_str).unwrap_or_default();

			return (frontmatter, markdown.to_string());
		}
	}

	(Frontmatter::default(), content.to_string())
}

fn markdown_to_html(markdown: &str) -> String {
	use pulldown_cmark::{html, Options, Parser};

	let mut options = Options::empty();
	options.insert(Options::ENABLE_STRIKETHROUGH);
	options.insert(Options::ENABLE_TABLES);
	options.insert(Options::ENABLE_TASKLISTS);
	options.insert(Options::ENABLE_SMART_PUNCTUATION);

	let parser = Parser::new_ext(markdown, options);
	let mut html_output = String::new();
	html::push_html(&mut html_output, parser);

	html_output
}

/// Remove script elements so nothing executes inside Chrome during capture.
fn strip_scripts(html: &str) -> String {
	let script_regex = Regex::new(r"(?is)<script\b[^>]*>.*?</script>").unwrap();
	script_regex.replace_all(html, "").to_string()
}

fn preview_theme_css(name: &str) -> &'static str {
	match name {
		"github-dark.css" => include_str!("../themes/github-dark.css"),
		// unknown names fall back to the default preview theme
		_ => include_str!("../themes/github-light.css"),
	}
}

fn code_block_theme_css(name: &str) -> &'static str {
	match name {
		"monokai.css" => include_str!("../themes/monokai.css"),
		_ => include_str!("../themes/default.css"),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_extract_frontmatter() {
		let content = r#"---
title: Release Notes
author: someone
---
# Content here
"#;
		let (fm, md) = extract_frontmatter(content);
		assert_eq!(fm.title, Some("Release Notes".to_string()));
		assert!(fm.extra.contains_key("author"));
		assert!(md.contains("Content here"));
	}

	#[test]
	fn test_no_frontmatter_passes_through() {
		let content = "# Just a heading\n";
		let (fm, md) = extract_frontmatter(content);
		assert_eq!(fm.title, None);
		assert_eq!(md, content);
	}

	#[test]
	fn test_markdown_to_html() {
		let html = markdown_to_html("# Hello\n\nSome *text* here.");
		assert!(html.contains("<h1>Hello</h1>"));
		assert!(html.contains("<em>text</em>"));
	}

	#[test]
	fn test_strip_scripts() {
		let html = "<p>before</p><script>alert(1)</script><p>after</p>";
		let stripped = strip_scripts(html);
		assert!(!stripped.contains("<script"));
		assert!(stripped.contains("<p>before</p>"));
		assert!(stripped.contains("<p>after</p>"));
	}

	#[test]
	fn test_render_page_title_falls_back_to_file_stem() {
		let dir = std::env::temp_dir().join(format!("md2pdf-render-{}", std::process::id()));
		fs::create_dir_all(&dir).unwrap();
		let doc = dir.join("notes.md");
		fs::write(&doc, "# Heading\n").unwrap();

		let renderer = Renderer::new(EngineConfig::default());
		let page = renderer.render_page(&doc).unwrap();
		assert_eq!(page.title, "notes");
		assert!(page.html.contains("<h1>Heading</h1>"));

		fs::remove_dir_all(&dir).ok();
	}
}
