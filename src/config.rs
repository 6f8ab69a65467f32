/// Rendering options handed to the notebook engine.
///
/// The CLI does not expose these; every invocation runs with the same
/// fixed configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
	pub preview_theme: String,
	pub revealjs_theme: String,
	pub code_block_theme: String,
	pub print_background: bool,
	pub enable_script_execution: bool,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			preview_theme: "github-light.css".to_string(),
			revealjs_theme: "white.css".to_string(),
			code_block_theme: "default.css".to_string(),
			print_background: true,
			enable_script_execution: true,
		}
	}
}
