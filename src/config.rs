//! Demo configuration.
//!
//! Defaults reproduce the original hackathon demo: a 16×2 RGB character
//! display, 200 ms scroll steps, one-second pauses, a fixed reference
//! voice and sentence, and unbounded retries.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::display::Rgb;
use crate::{Error, Result};

/// Subdirectory of the synthesizer model directory holding the exported graph.
pub const SYNTHESIZER_SUBDIR: &str = "taco_pretrained";

/// Where the three pretrained models live on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelPaths {
    /// Speaker encoder graph.
    pub encoder: PathBuf,
    /// Synthesizer model directory (contains `taco_pretrained/`).
    pub synthesizer_dir: PathBuf,
    /// Vocoder graph.
    pub vocoder: PathBuf,
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self {
            encoder: PathBuf::from("inference/encoder/saved_models/pretrained.onnx"),
            synthesizer_dir: PathBuf::from("inference/synthesizer/saved_models/logs-pretrained/"),
            vocoder: PathBuf::from("inference/vocoder/saved_models/pretrained/pretrained.onnx"),
        }
    }
}

impl ModelPaths {
    /// Directory the synthesizer is actually loaded from.
    pub fn synthesizer_checkpoint(&self) -> PathBuf {
        self.synthesizer_dir.join(SYNTHESIZER_SUBDIR)
    }
}

/// Where reference audio and text come from on each iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Use the configured reference audio path and sentence every time.
    #[default]
    Fixed,
    /// Prompt on stdin for both.
    Interactive,
}

/// Status display geometry, colours and fixed messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub columns: usize,
    pub rows: usize,
    /// Backlight colour while the demo is running.
    pub idle_color: Rgb,
    /// Backlight colour between iterations.
    pub off_color: Rgb,
    /// Shown once at startup.
    pub welcome_message: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            columns: 16,
            rows: 2,
            idle_color: Rgb::new(100, 100, 100),
            off_color: Rgb::new(0, 0, 0),
            welcome_message: "Voice Cloning\nDemo".to_string(),
        }
    }
}

/// Pauses embedded in the success path, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub welcome_pause_ms: u64,
    pub scroll_step_ms: u64,
    pub saved_pause_ms: u64,
    pub off_pause_ms: u64,
    /// Delay before retrying a failed iteration. Zero keeps the original
    /// behaviour of restarting immediately.
    pub retry_delay_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            welcome_pause_ms: 1000,
            scroll_step_ms: 200,
            saved_pause_ms: 1000,
            off_pause_ms: 1000,
            retry_delay_ms: 0,
        }
    }
}

impl Timings {
    /// All pauses set to zero.
    pub fn immediate() -> Self {
        Self {
            welcome_pause_ms: 0,
            scroll_step_ms: 0,
            saved_pause_ms: 0,
            off_pause_ms: 0,
            retry_delay_ms: 0,
        }
    }

    pub fn welcome_pause(&self) -> Duration {
        Duration::from_millis(self.welcome_pause_ms)
    }

    pub fn scroll_step(&self) -> Duration {
        Duration::from_millis(self.scroll_step_ms)
    }

    pub fn saved_pause(&self) -> Duration {
        Duration::from_millis(self.saved_pause_ms)
    }

    pub fn off_pause(&self) -> Duration {
        Duration::from_millis(self.off_pause_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Top-level demo configuration, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub models: ModelPaths,
    /// Disable audio playback.
    pub no_sound: bool,
    pub input: InputMode,
    /// Reference voice used in [`InputMode::Fixed`].
    pub reference_audio: PathBuf,
    /// Sentence used in [`InputMode::Fixed`], and the fallback for blank
    /// interactive answers.
    pub text: String,
    /// Generated files are written here as `demo_output_NN.wav`.
    pub output_dir: PathBuf,
    pub display: DisplayConfig,
    pub timings: Timings,
    /// Give up after this many failed iterations in a row. `None` retries forever.
    pub max_consecutive_failures: Option<u32>,
    /// Stop after this many successful iterations. `None` runs forever.
    pub max_iterations: Option<u32>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            models: ModelPaths::default(),
            no_sound: false,
            input: InputMode::Fixed,
            reference_audio: PathBuf::from("demo/reference_voice.wav"),
            text: "Hello, this is a synthesized version of my voice".to_string(),
            output_dir: PathBuf::from("output"),
            display: DisplayConfig::default(),
            timings: Timings::default(),
            max_consecutive_failures: None,
            max_iterations: None,
        }
    }
}

impl DemoConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the demo cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.display.columns == 0 || self.display.rows == 0 {
            return Err(Error::Config(format!(
                "display must have at least one row and column, got {}x{}",
                self.display.columns, self.display.rows
            )));
        }
        if self.input == InputMode::Fixed && self.text.trim().is_empty() {
            return Err(Error::Config("text must not be empty in fixed input mode".into()));
        }
        if self.max_consecutive_failures == Some(0) {
            return Err(Error::Config("max_consecutive_failures must be at least 1".into()));
        }
        Ok(())
    }
}
