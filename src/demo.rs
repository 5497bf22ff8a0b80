//! The demo loop.
//!
//! [`VoiceCloneDemo::start`] greets on the status display and loads the
//! three models; any failure there is fatal. [`VoiceCloneDemo::run`] then
//! repeats the full pipeline:
//!
//! ```text
//! reference path → load wav → preprocess → embed
//!     text ─────────────────────────────────┴→ synthesize → vocode
//!         → pad 1 s → play (non-blocking) → output/demo_output_NN.wav
//! ```
//!
//! A failed iteration is logged and the next one starts from the top. The
//! output counter only advances once a file has been written.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::audio::Waveform;
use crate::config::DemoConfig;
use crate::display::{StatusDisplay, pause, show_scrolling};
use crate::error::{FailureClass, StageExt};
use crate::input::UtteranceSource;
use crate::model::{ModelLoader, Models};
use crate::playback::AudioPlayback;
use crate::{Error, Result};

/// One named step of an iteration, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ResolveReference,
    LoadReference,
    Preprocess,
    Embed,
    SelectText,
    Synthesize,
    Vocode,
    Playback,
    Save,
    Report,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ResolveReference => "resolve reference",
            Stage::LoadReference => "load reference",
            Stage::Preprocess => "preprocess",
            Stage::Embed => "embed",
            Stage::SelectText => "select text",
            Stage::Synthesize => "synthesize",
            Stage::Vocode => "vocode",
            Stage::Playback => "playback",
            Stage::Save => "save",
            Stage::Report => "report",
        };
        f.write_str(name)
    }
}

/// Sequence number for output file names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputCounter(u32);

impl OutputCounter {
    pub fn value(self) -> u32 {
        self.0
    }

    /// `demo_output_NN.wav`, zero-padded to two digits.
    pub fn file_name(self) -> String {
        format!("demo_output_{:02}.wav", self.0)
    }

    fn advance(&mut self) {
        self.0 += 1;
    }
}

/// What a successful iteration produced.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationOutput {
    pub path: PathBuf,
    /// Samples written, including the trailing silence.
    pub num_samples: usize,
    pub sample_rate: u32,
}

/// Totals reported when [`VoiceCloneDemo::run`] returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub completed: u32,
    pub failed: u32,
}

pub struct VoiceCloneDemo {
    config: DemoConfig,
    models: Models,
    display: Box<dyn StatusDisplay>,
    playback: Box<dyn AudioPlayback>,
    input: Box<dyn UtteranceSource>,
    counter: OutputCounter,
}

impl VoiceCloneDemo {
    /// Initialise the display, then load encoder, synthesizer and vocoder in that order.
    pub fn start(
        config: DemoConfig,
        mut display: Box<dyn StatusDisplay>,
        playback: Box<dyn AudioPlayback>,
        input: Box<dyn UtteranceSource>,
        loader: &dyn ModelLoader,
    ) -> Result<Self> {
        config.validate()?;

        display.clear()?;
        display.set_color(config.display.idle_color)?;
        display.set_message(&config.display.welcome_message)?;
        pause(config.timings.welcome_pause());

        tracing::info!("Preparing the encoder, the synthesizer and the vocoder...");
        display.clear()?;
        display.set_message("Preparing models...")?;
        let models = Models::load(loader)?;

        Ok(Self {
            config,
            models,
            display,
            playback,
            input,
            counter: OutputCounter::default(),
        })
    }

    pub fn counter(&self) -> OutputCounter {
        self.counter
    }

    pub fn config(&self) -> &DemoConfig {
        &self.config
    }

    /// Run iterations until the configured limit, a closed input, or too
    /// many consecutive failures.
    pub fn run(&mut self) -> Result<RunSummary> {
        tracing::info!("Interactive generation loop");
        let mut summary = RunSummary::default();
        let mut consecutive_failures = 0u32;

        loop {
            if let Some(limit) = self.config.max_iterations
                && summary.completed >= limit
            {
                tracing::info!(completed = summary.completed, "iteration limit reached");
                return Ok(summary);
            }

            match self.run_iteration() {
                Ok(_) => {
                    summary.completed += 1;
                    consecutive_failures = 0;
                }
                Err(error) if matches!(error.root(), Error::InputClosed) => {
                    tracing::info!("input closed, stopping");
                    return Ok(summary);
                }
                Err(error) => {
                    summary.failed += 1;
                    consecutive_failures += 1;
                    log_failure(&error, consecutive_failures);

                    if let Some(max) = self.config.max_consecutive_failures
                        && consecutive_failures >= max
                    {
                        return Err(Error::TooManyFailures {
                            count: consecutive_failures,
                            last: Box::new(error),
                        });
                    }
                    tracing::info!("Restarting");
                    pause(self.config.timings.retry_delay());
                }
            }
        }
    }

    /// Run the pipeline once and write one output file.
    pub fn run_iteration(&mut self) -> Result<IterationOutput> {
        self.display.clear().at(Stage::ResolveReference)?;
        self.display
            .set_message("Loading voice")
            .at(Stage::ResolveReference)?;
        let reference = self.input.reference_audio().at(Stage::ResolveReference)?;

        let original = Waveform::load(&reference).at(Stage::LoadReference)?;
        tracing::debug!(
            path = %reference.display(),
            sample_rate = original.sample_rate,
            duration_s = original.duration_s(),
            "loaded reference audio"
        );
        let preprocessed = self
            .models
            .encoder
            .preprocess(&original)
            .at(Stage::Preprocess)?;
        self.display.clear().at(Stage::Preprocess)?;
        self.display
            .set_message("Loaded file\nsuccessfully")
            .at(Stage::Preprocess)?;
        tracing::info!("Loaded file successfully");

        let embedding = self.models.encoder.embed(&preprocessed).at(Stage::Embed)?;
        tracing::info!(dim = embedding.dim(), "Created the embedding");

        let text = self.input.text().at(Stage::SelectText)?;
        show_scrolling(
            self.display.as_mut(),
            &format!("Using sample sentence: {text}..."),
            self.config.timings.scroll_step(),
        )
        .at(Stage::SelectText)?;

        // The synthesizer is batched; we always send a batch of one.
        let spectrogram = self
            .models
            .synthesizer
            .synthesize(&[text], &[embedding])
            .at(Stage::Synthesize)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::ModelContract("synthesizer returned no spectrogram".into()))
            .at(Stage::Synthesize)?;
        tracing::info!(frames = spectrogram.frames(), "Created the mel spectrogram");

        self.display.clear().at(Stage::Vocode)?;
        self.display
            .set_message("Synthesizing the\nwaveform")
            .at(Stage::Vocode)?;
        tracing::info!("Synthesizing the waveform");
        let samples = self.models.vocoder.infer(&spectrogram).at(Stage::Vocode)?;

        let sample_rate = self.models.synthesizer.sample_rate();
        let generated = Waveform::new(samples, sample_rate).pad_silence(sample_rate as usize);

        if !self.config.no_sound {
            self.playback.stop().at(Stage::Playback)?;
            self.playback.play(&generated).at(Stage::Playback)?;
        }

        let path = self.config.output_dir.join(self.counter.file_name());
        save_atomically(&generated, &path).at(Stage::Save)?;
        self.counter.advance();
        tracing::info!(path = %path.display(), "Saved output");

        // The file is committed; a display fault from here on doesn't undo the iteration.
        if let Err(error) = self.report_saved(&path) {
            tracing::warn!(stage = %Stage::Report, "Caught error: {error}");
        }

        Ok(IterationOutput {
            path,
            num_samples: generated.len(),
            sample_rate,
        })
    }

    fn report_saved(&mut self, path: &Path) -> Result<()> {
        self.display.clear().at(Stage::Report)?;
        self.display
            .set_message(&format!("Saved output as\n{}", path.display()))
            .at(Stage::Report)?;
        pause(self.config.timings.saved_pause());
        self.display
            .set_color(self.config.display.off_color)
            .at(Stage::Report)?;
        self.display.clear().at(Stage::Report)?;
        pause(self.config.timings.off_pause());
        Ok(())
    }
}

/// Write next to `path` and rename into place, so a failed write never
/// leaves a truncated `demo_output_NN.wav` behind.
fn save_atomically(wav: &Waveform, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        std::fs::create_dir_all(dir)?;
    }
    let partial = path.with_extension("wav.partial");
    if let Err(error) = wav.save(&partial) {
        let _ = std::fs::remove_file(&partial);
        return Err(error);
    }
    std::fs::rename(&partial, path)?;
    Ok(())
}

fn log_failure(error: &Error, consecutive: u32) {
    let stage = error
        .stage()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "unknown".into());
    match error.class() {
        FailureClass::Transient => {
            tracing::warn!(%stage, consecutive, "Caught error: {error}");
        }
        FailureClass::Internal => {
            tracing::error!(%stage, consecutive, "Caught error: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use candle_core::{DType, Device, Tensor};

    use super::*;
    use crate::audio::write_wav;
    use crate::config::Timings;
    use crate::display::Rgb;
    use crate::model::{
        Embedding, PreprocessedWaveform, SpeakerEncoder, Spectrogram, Synthesizer, Vocoder,
    };

    const SAMPLE_RATE: u32 = 8000;
    const VOCODED_LEN: usize = 1234;

    /// Shared script of failures and a log of collaborator calls.
    #[derive(Clone, Default)]
    struct Harness {
        failures: Rc<RefCell<VecDeque<Stage>>>,
        calls: Rc<RefCell<Vec<String>>>,
        reference: Rc<RefCell<PathBuf>>,
        output_dir: PathBuf,
    }

    impl Harness {
        fn fail_at(&self, stages: &[Stage]) {
            self.failures.borrow_mut().extend(stages.iter().copied());
        }

        /// Record the call and fail if it is next in the script.
        fn step(&self, stage: Stage, call: &str) -> Result<()> {
            self.calls.borrow_mut().push(call.to_string());
            let mut failures = self.failures.borrow_mut();
            if failures.front() == Some(&stage) {
                failures.pop_front();
                return Err(match stage {
                    Stage::Playback => Error::Playback("device busy".into()),
                    Stage::Vocode | Stage::Synthesize => Error::ModelContract("injected".into()),
                    _ => Error::Io(std::io::Error::other(format!("injected at {stage}"))),
                });
            }
            Ok(())
        }

        fn count(&self, call: &str) -> usize {
            self.calls.borrow().iter().filter(|c| c.as_str() == call).count()
        }

        fn messages(&self) -> Vec<String> {
            self.calls
                .borrow()
                .iter()
                .filter_map(|c| c.strip_prefix("message:").map(str::to_string))
                .collect()
        }
    }

    struct MockEncoder(Harness);

    impl SpeakerEncoder for MockEncoder {
        fn preprocess(&self, wav: &Waveform) -> Result<PreprocessedWaveform> {
            self.0.step(Stage::Preprocess, "preprocess")?;
            Ok(PreprocessedWaveform(wav.clone()))
        }

        fn embed(&self, _wav: &PreprocessedWaveform) -> Result<Embedding> {
            self.0.step(Stage::Embed, "embed")?;
            Embedding::new(Tensor::new(&[0.6f32, 0.8], &Device::Cpu)?)
        }
    }

    struct MockSynthesizer(Harness);

    impl Synthesizer for MockSynthesizer {
        fn sample_rate(&self) -> u32 {
            SAMPLE_RATE
        }

        fn synthesize(
            &self,
            texts: &[String],
            embeddings: &[Embedding],
        ) -> Result<Vec<Spectrogram>> {
            self.0.step(Stage::Synthesize, "synthesize")?;
            assert_eq!(texts.len(), 1);
            assert_eq!(embeddings.len(), 1);
            texts
                .iter()
                .map(|_| Spectrogram::new(Tensor::zeros((10, 80), DType::F32, &Device::Cpu)?))
                .collect()
        }
    }

    struct MockVocoder(Harness);

    impl Vocoder for MockVocoder {
        fn infer(&self, spectrogram: &Spectrogram) -> Result<Vec<f32>> {
            self.0.step(Stage::Vocode, "vocode")?;
            assert_eq!(spectrogram.mel_bands(), 80);
            Ok(vec![0.5; VOCODED_LEN])
        }
    }

    struct MockLoader {
        harness: Harness,
        fail: Option<&'static str>,
    }

    impl MockLoader {
        fn load(&self, which: &'static str) -> Result<()> {
            self.harness.calls.borrow_mut().push(format!("load:{which}"));
            if self.fail == Some(which) {
                return Err(Error::ModelLoad(format!("{which} weights missing")));
            }
            Ok(())
        }
    }

    impl ModelLoader for MockLoader {
        fn load_encoder(&self) -> Result<Box<dyn SpeakerEncoder>> {
            self.load("encoder")?;
            Ok(Box::new(MockEncoder(self.harness.clone())))
        }

        fn load_synthesizer(&self) -> Result<Box<dyn Synthesizer>> {
            self.load("synthesizer")?;
            Ok(Box::new(MockSynthesizer(self.harness.clone())))
        }

        fn load_vocoder(&self) -> Result<Box<dyn Vocoder>> {
            self.load("vocoder")?;
            Ok(Box::new(MockVocoder(self.harness.clone())))
        }
    }

    struct MockDisplay(Harness);

    impl StatusDisplay for MockDisplay {
        fn clear(&mut self) -> Result<()> {
            self.0.calls.borrow_mut().push("clear".into());
            Ok(())
        }

        fn set_message(&mut self, message: &str) -> Result<()> {
            if message.starts_with("Saved output") {
                return self.0.step(Stage::Report, &format!("message:{message}"));
            }
            self.0.calls.borrow_mut().push(format!("message:{message}"));
            Ok(())
        }

        fn set_color(&mut self, color: Rgb) -> Result<()> {
            self.0.calls.borrow_mut().push(format!("color:{color}"));
            Ok(())
        }

        fn scroll_left(&mut self) -> Result<()> {
            Ok(())
        }
    }

    struct MockPlayback(Harness);

    impl AudioPlayback for MockPlayback {
        fn stop(&mut self) -> Result<()> {
            self.0.step(Stage::Playback, "stop")
        }

        fn play(&mut self, wav: &Waveform) -> Result<()> {
            self.0.step(Stage::Playback, "play")?;
            assert_eq!(wav.len(), VOCODED_LEN + SAMPLE_RATE as usize);
            // Nothing for this iteration may be on disk yet.
            let pending = self.0.output_dir.join(format!(
                "demo_output_{:02}.wav",
                self.0.count("play") - 1
            ));
            assert!(!pending.exists(), "save ran before play returned");
            Ok(())
        }
    }

    struct MockInput(Harness);

    impl UtteranceSource for MockInput {
        fn reference_audio(&mut self) -> Result<PathBuf> {
            self.0.step(Stage::ResolveReference, "reference")?;
            if self.0.step(Stage::LoadReference, "check-reference").is_err() {
                return Ok(PathBuf::from("/nonexistent/reference.wav"));
            }
            Ok(self.0.reference.borrow().clone())
        }

        fn text(&mut self) -> Result<String> {
            self.0.step(Stage::SelectText, "text")?;
            Ok("Hello, this is a test".into())
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        harness: Harness,
        config: DemoConfig,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("reference.wav");
        let tone: Vec<f32> = (0..8000)
            .map(|i| (i as f32 * 220.0 * std::f32::consts::TAU / 16000.0).sin() * 0.3)
            .collect();
        write_wav(&reference, &tone, 16000, 1).unwrap();

        let output_dir = dir.path().join("output");
        let harness = Harness {
            reference: Rc::new(RefCell::new(reference)),
            output_dir: output_dir.clone(),
            ..Default::default()
        };
        let config = DemoConfig {
            output_dir,
            timings: Timings::immediate(),
            ..Default::default()
        };
        Fixture {
            _dir: dir,
            harness,
            config,
        }
    }

    fn start(fx: &Fixture, config: DemoConfig) -> Result<VoiceCloneDemo> {
        let loader = MockLoader {
            harness: fx.harness.clone(),
            fail: None,
        };
        VoiceCloneDemo::start(
            config,
            Box::new(MockDisplay(fx.harness.clone())),
            Box::new(MockPlayback(fx.harness.clone())),
            Box::new(MockInput(fx.harness.clone())),
            &loader,
        )
    }

    #[test]
    fn test_counter_file_names() {
        let mut counter = OutputCounter::default();
        assert_eq!(counter.file_name(), "demo_output_00.wav");
        for _ in 0..7 {
            counter.advance();
        }
        assert_eq!(counter.file_name(), "demo_output_07.wav");
        for _ in 0..100 {
            counter.advance();
        }
        assert_eq!(counter.file_name(), "demo_output_107.wav");
    }

    #[test]
    fn test_startup_sequence() {
        let fx = fixture();
        start(&fx, fx.config.clone()).unwrap();
        let calls = fx.harness.calls.borrow().clone();
        assert_eq!(
            calls,
            vec![
                "clear",
                "color:#646464",
                "message:Voice Cloning\nDemo",
                "clear",
                "message:Preparing models...",
                "load:encoder",
                "load:synthesizer",
                "load:vocoder",
            ]
        );
    }

    #[test]
    fn test_model_load_failure_is_fatal() {
        for which in ["encoder", "synthesizer", "vocoder"] {
            let fx = fixture();
            let loader = MockLoader {
                harness: fx.harness.clone(),
                fail: Some(which),
            };
            let result = VoiceCloneDemo::start(
                fx.config.clone(),
                Box::new(MockDisplay(fx.harness.clone())),
                Box::new(MockPlayback(fx.harness.clone())),
                Box::new(MockInput(fx.harness.clone())),
                &loader,
            );
            assert!(matches!(result, Err(Error::ModelLoad(_))));
            // Loading stops at the failing model and no iteration begins.
            assert_eq!(fx.harness.count(&format!("load:{which}")), 1);
            assert_eq!(fx.harness.count("reference"), 0);
            if which == "encoder" {
                assert_eq!(fx.harness.count("load:synthesizer"), 0);
            }
        }
    }

    #[test]
    fn test_single_iteration_pads_and_saves() {
        let fx = fixture();
        let mut demo = start(&fx, fx.config.clone()).unwrap();
        let output = demo.run_iteration().unwrap();

        assert_eq!(output.path, fx.config.output_dir.join("demo_output_00.wav"));
        assert_eq!(output.num_samples, VOCODED_LEN + SAMPLE_RATE as usize);
        assert_eq!(demo.counter().value(), 1);

        let saved = Waveform::load(&output.path).unwrap();
        assert_eq!(saved.sample_rate, SAMPLE_RATE);
        assert_eq!(saved.len(), VOCODED_LEN + SAMPLE_RATE as usize);
        assert!(saved.samples[..VOCODED_LEN].iter().all(|&s| s == 0.5));
        assert!(saved.samples[VOCODED_LEN..].iter().all(|&s| s == 0.0));
        assert!(!output.path.with_extension("wav.partial").exists());

        assert_eq!(fx.harness.count("stop"), 1);
        assert_eq!(fx.harness.count("play"), 1);
        let messages = fx.harness.messages();
        assert!(messages.contains(&"Loading voice".to_string()));
        assert!(messages.contains(&"Using sample sentence: Hello, this is a test...".to_string()));
        assert!(messages.contains(&"Synthesizing the\nwaveform".to_string()));
        assert_eq!(
            messages.last().unwrap(),
            &format!("Saved output as\n{}", output.path.display())
        );
        assert!(fx.harness.calls.borrow().contains(&"color:#000000".to_string()));
    }

    #[test]
    fn test_every_stage_failure_is_isolated() {
        let fx = fixture();
        let stages = [
            Stage::ResolveReference,
            Stage::LoadReference,
            Stage::Preprocess,
            Stage::Embed,
            Stage::SelectText,
            Stage::Synthesize,
            Stage::Vocode,
            Stage::Playback,
        ];
        fx.harness.fail_at(&stages);
        let mut demo = start(
            &fx,
            DemoConfig {
                max_iterations: Some(1),
                ..fx.config.clone()
            },
        )
        .unwrap();

        let summary = demo.run().unwrap();
        assert_eq!(
            summary,
            RunSummary {
                completed: 1,
                failed: stages.len() as u32
            }
        );
        // Every attempt restarted from the reference step.
        assert_eq!(fx.harness.count("reference"), stages.len() + 1);
        assert!(fx.harness.failures.borrow().is_empty());
        assert!(fx.config.output_dir.join("demo_output_00.wav").exists());
        assert!(!fx.config.output_dir.join("demo_output_01.wav").exists());
    }

    #[test]
    fn test_failed_iteration_reports_stage() {
        let fx = fixture();
        fx.harness.fail_at(&[Stage::Vocode]);
        let mut demo = start(&fx, fx.config.clone()).unwrap();
        let error = demo.run_iteration().unwrap_err();
        assert_eq!(error.stage(), Some(Stage::Vocode));
        assert_eq!(error.class(), FailureClass::Internal);
        assert_eq!(demo.counter().value(), 0);

        fx.harness.fail_at(&[Stage::LoadReference]);
        let error = demo.run_iteration().unwrap_err();
        assert_eq!(error.stage(), Some(Stage::LoadReference));
        assert_eq!(error.class(), FailureClass::Transient);
    }

    #[test]
    fn test_counter_monotonic_across_failures() {
        let fx = fixture();
        fx.harness.fail_at(&[Stage::Embed, Stage::Vocode]);
        let mut demo = start(
            &fx,
            DemoConfig {
                max_iterations: Some(3),
                ..fx.config.clone()
            },
        )
        .unwrap();
        let summary = demo.run().unwrap();
        assert_eq!(summary.completed, 3);
        assert_eq!(summary.failed, 2);
        for i in 0..3 {
            assert!(fx.config.output_dir.join(format!("demo_output_{i:02}.wav")).exists());
        }
        assert!(!fx.config.output_dir.join("demo_output_03.wav").exists());
    }

    #[test]
    fn test_save_failure_does_not_advance_counter() {
        let fx = fixture();
        // A regular file where the output directory should be.
        std::fs::write(&fx.config.output_dir, b"in the way").unwrap();
        let mut demo = start(&fx, fx.config.clone()).unwrap();

        let error = demo.run_iteration().unwrap_err();
        assert_eq!(error.stage(), Some(Stage::Save));
        assert_eq!(demo.counter().value(), 0);

        std::fs::remove_file(&fx.config.output_dir).unwrap();
        let output = demo.run_iteration().unwrap();
        assert!(output.path.ends_with("demo_output_00.wav"));
        assert_eq!(demo.counter().value(), 1);
    }

    #[test]
    fn test_report_failure_still_counts_saved_iteration() {
        let fx = fixture();
        fx.harness.fail_at(&[Stage::Report]);
        let mut demo = start(
            &fx,
            DemoConfig {
                max_iterations: Some(1),
                ..fx.config.clone()
            },
        )
        .unwrap();

        let summary = demo.run().unwrap();
        assert_eq!(
            summary,
            RunSummary {
                completed: 1,
                failed: 0
            }
        );
        assert_eq!(demo.counter().value(), 1);
        assert!(fx.harness.failures.borrow().is_empty());
        let written = std::fs::read_dir(&fx.config.output_dir).unwrap().count();
        assert_eq!(written, 1);
        assert!(fx.config.output_dir.join("demo_output_00.wav").exists());
    }

    #[test]
    fn test_no_sound_skips_playback() {
        let fx = fixture();
        let mut demo = start(
            &fx,
            DemoConfig {
                no_sound: true,
                ..fx.config.clone()
            },
        )
        .unwrap();
        demo.run_iteration().unwrap();
        assert_eq!(fx.harness.count("stop"), 0);
        assert_eq!(fx.harness.count("play"), 0);
    }

    #[test]
    fn test_consecutive_failure_bound() {
        let fx = fixture();
        fx.harness.fail_at(&[
            Stage::ResolveReference,
            Stage::ResolveReference,
            Stage::ResolveReference,
        ]);
        let mut demo = start(
            &fx,
            DemoConfig {
                max_consecutive_failures: Some(2),
                ..fx.config.clone()
            },
        )
        .unwrap();
        let error = demo.run().unwrap_err();
        match error {
            Error::TooManyFailures { count, last } => {
                assert_eq!(count, 2);
                assert_eq!(last.stage(), Some(Stage::ResolveReference));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_closed_input_ends_run() {
        struct ClosedInput;

        impl UtteranceSource for ClosedInput {
            fn reference_audio(&mut self) -> Result<PathBuf> {
                Err(Error::InputClosed)
            }

            fn text(&mut self) -> Result<String> {
                Err(Error::InputClosed)
            }
        }

        let fx = fixture();
        let loader = MockLoader {
            harness: fx.harness.clone(),
            fail: None,
        };
        let mut demo = VoiceCloneDemo::start(
            fx.config.clone(),
            Box::new(MockDisplay(fx.harness.clone())),
            Box::new(MockPlayback(fx.harness.clone())),
            Box::new(ClosedInput),
            &loader,
        )
        .unwrap();
        assert_eq!(demo.run().unwrap(), RunSummary::default());
    }
}
