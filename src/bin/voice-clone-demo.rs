//! Voice cloning demo CLI.
//!
//! Loads the speaker encoder, synthesizer and vocoder, then loops forever:
//! clone the reference voice, synthesize the sentence, play it and save it
//! as `output/demo_output_NN.wav`. Progress is shown on a character panel
//! drawn in the terminal (or logged with `--headless`).
//!
//! Model loading failures exit non-zero. Failures inside an iteration are
//! logged and the iteration is retried.

use std::io;
use std::path::PathBuf;

use clap::Parser;
use voice_clone_demo::{
    config::{DemoConfig, InputMode},
    demo::VoiceCloneDemo,
    display::{LogDisplay, StatusDisplay, TerminalDisplay},
    input::{FixedUtterance, InteractiveUtterance, UtteranceSource},
    model::OnnxModelLoader,
    playback::{AudioPlayback, NoPlayback},
};

#[derive(Parser, Debug)]
#[command(
    name = "voice-clone-demo",
    about = "Voice cloning demo: encoder → synthesizer → vocoder on a loop",
    long_about = "Clone a reference voice and speak a sentence with it, over and over.\n\
                  Each result is played (unless --no-sound) and written to \
                  <output-dir>/demo_output_NN.wav."
)]
struct Args {
    /// Path to a saved encoder
    /// [default: inference/encoder/saved_models/pretrained.onnx]
    #[arg(long = "enc-model-fpath", short = 'e')]
    enc_model_fpath: Option<PathBuf>,

    /// Directory containing the synthesizer model
    /// [default: inference/synthesizer/saved_models/logs-pretrained/]
    #[arg(long = "syn-model-dir", short = 's')]
    syn_model_dir: Option<PathBuf>,

    /// Path to a saved vocoder
    /// [default: inference/vocoder/saved_models/pretrained/pretrained.onnx]
    #[arg(long = "voc-model-fpath", short = 'v')]
    voc_model_fpath: Option<PathBuf>,

    /// If set, audio won't be played.
    #[arg(long)]
    no_sound: bool,

    /// JSON configuration file. Command line options override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Reference voice to clone (fixed input mode).
    #[arg(long)]
    reference_audio: Option<PathBuf>,

    /// Sentence to synthesize (fixed input mode).
    #[arg(long)]
    text: Option<String>,

    /// Directory for generated files.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Prompt for the reference voice and sentence on every iteration.
    #[arg(long)]
    interactive: bool,

    /// Log display updates instead of drawing the panel in the terminal.
    #[arg(long)]
    headless: bool,

    /// Exit after this many failed iterations in a row.
    #[arg(long)]
    max_consecutive_failures: Option<u32>,

    /// Exit after this many successful iterations.
    #[arg(long)]
    iterations: Option<u32>,

    /// Run inference on the CPU even if CUDA is available.
    #[arg(long)]
    cpu: bool,
}

impl Args {
    fn into_config(self) -> anyhow::Result<DemoConfig> {
        let mut config = match &self.config {
            Some(path) => DemoConfig::from_json_file(path)
                .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?,
            None => DemoConfig::default(),
        };
        if let Some(path) = self.enc_model_fpath {
            config.models.encoder = path;
        }
        if let Some(dir) = self.syn_model_dir {
            config.models.synthesizer_dir = dir;
        }
        if let Some(path) = self.voc_model_fpath {
            config.models.vocoder = path;
        }
        if let Some(path) = self.reference_audio {
            config.reference_audio = path;
        }
        if let Some(text) = self.text {
            config.text = text;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if self.max_consecutive_failures.is_some() {
            config.max_consecutive_failures = self.max_consecutive_failures;
        }
        if self.iterations.is_some() {
            config.max_iterations = self.iterations;
        }
        config.no_sound |= self.no_sound;
        if self.interactive {
            config.input = InputMode::Interactive;
        }
        config.validate()?;
        Ok(config)
    }
}

fn print_config(config: &DemoConfig) {
    tracing::info!("Arguments:");
    tracing::info!("    enc_model_fpath:  {}", config.models.encoder.display());
    tracing::info!("    syn_model_dir:    {}", config.models.synthesizer_dir.display());
    tracing::info!("    voc_model_fpath:  {}", config.models.vocoder.display());
    tracing::info!("    no_sound:         {}", config.no_sound);
    tracing::info!("    input:            {:?}", config.input);
    tracing::info!("    reference_audio:  {}", config.reference_audio.display());
    tracing::info!("    text:             {}", config.text);
    tracing::info!("    output_dir:       {}", config.output_dir.display());
}

#[cfg(feature = "playback")]
fn open_playback(no_sound: bool) -> anyhow::Result<Box<dyn AudioPlayback>> {
    if no_sound {
        return Ok(Box::new(NoPlayback));
    }
    let player = voice_clone_demo::playback::RodioPlayback::open_default()
        .map_err(|e| anyhow::anyhow!("{e} (use --no-sound to run without audio)"))?;
    Ok(Box::new(player))
}

#[cfg(not(feature = "playback"))]
fn open_playback(no_sound: bool) -> anyhow::Result<Box<dyn AudioPlayback>> {
    if !no_sound {
        tracing::warn!("built without the `playback` feature, audio won't be played");
    }
    Ok(Box::new(NoPlayback))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let cpu = args.cpu;
    let headless = args.headless;
    let config = args.into_config()?;
    print_config(&config);

    let device = if cpu {
        candle_core::Device::Cpu
    } else {
        candle_core::Device::cuda_if_available(0)?
    };
    tracing::info!("Using device: {:?}", device);

    let display: Box<dyn StatusDisplay> = if headless {
        Box::new(LogDisplay::new(config.display.columns, config.display.rows))
    } else {
        Box::new(TerminalDisplay::stdout(
            config.display.columns,
            config.display.rows,
        ))
    };
    let playback = open_playback(config.no_sound)?;
    let input: Box<dyn UtteranceSource> = match config.input {
        InputMode::Fixed => Box::new(FixedUtterance::new(
            config.reference_audio.clone(),
            config.text.clone(),
        )),
        InputMode::Interactive => Box::new(InteractiveUtterance::new(
            io::stdin().lock(),
            io::stdout(),
            config.text.clone(),
        )),
    };
    let loader = OnnxModelLoader::new(config.models.clone(), device);

    let mut demo = VoiceCloneDemo::start(config, display, playback, input, &loader)
        .map_err(|e| anyhow::anyhow!("failed to start demo: {e}"))?;

    let summary = demo.run()?;
    tracing::info!(
        completed = summary.completed,
        failed = summary.failed,
        "demo finished"
    );
    Ok(())
}
