//! Voice cloning demo in Rust.
//!
//! Drives a three-stage voice cloning pipeline from a status display loop,
//! in the style of a kiosk demo: clone a reference voice, speak a sentence
//! with it, play the result, save it, repeat.
//!
//! ## Architecture
//!
//! ```text
//! reference wav → speaker encoder ──→ embedding ─┐
//!                                                 ├→ synthesizer → mel
//! sentence ───────────────────────────────────────┘        ↓
//!                                                       vocoder → waveform
//!                                                          ↓
//!                                     pad 1 s, play, output/demo_output_NN.wav
//! ```
//!
//! The three models are pre-exported ONNX graphs evaluated with candle;
//! their architectures are opaque to this crate.
//!
//! ## Modules
//!
//! - [`demo`] — startup, the per-iteration pipeline and the retry loop
//! - [`model`] — encoder, synthesizer and vocoder traits and ONNX implementations
//! - [`audio`] — WAV I/O, resampling, padding, volume normalisation
//! - [`display`] — status display trait, character panel model, renderers
//! - [`playback`] — non-blocking audio output
//! - [`input`] — fixed or interactive reference voice and sentence
//! - [`text`] — symbol encoding for the synthesizer
//! - [`config`] — demo configuration

pub mod audio;
pub mod config;
pub mod demo;
pub mod display;
pub mod input;
pub mod model;
pub mod playback;
pub mod text;

mod error;

pub use error::{Error, FailureClass, Result};
