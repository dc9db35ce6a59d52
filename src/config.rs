//! Engine configuration shared by the CLI and embedders (SPEC_FULL §3).

use crate::filters::InterpolationFilter;

/// Parameters the CLI constructs and hands to a [`crate::Context`]; library
/// users may build one directly to bypass the CLI entirely.
#[derive(Debug, Clone)]
pub struct Config {
  pub default_filter: InterpolationFilter,
  pub default_sharpen_percent: f32,
  pub png_zlib_level: i32,
  pub jpeg_quality: u8,
  pub log_filter: String,
}
impl Default for Config {
  fn default() -> Self {
    Self {
      default_filter: InterpolationFilter::Robidoux,
      default_sharpen_percent: 0.0,
      png_zlib_level: -1,
      jpeg_quality: 90,
      log_filter: "warn".to_string(),
    }
  }
}
impl Config {
  /// Installs `env_logger` using [`Self::log_filter`] as the default
  /// directive, honoring `RUST_LOG` when set.
  pub fn init_logging(&self) {
    let _ = env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or(self.log_filter.clone()),
    )
    .try_init();
  }
}
