//! Where each iteration's reference voice and sentence come from.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::{Error, Result};

pub const REFERENCE_PROMPT: &str =
    "Reference voice: enter an audio filepath of a voice to be cloned (wav):";
pub const TEXT_PROMPT: &str = "Write a sentence (+-20 words) to be synthesized:";

pub trait UtteranceSource {
    /// Path of the voice to clone.
    fn reference_audio(&mut self) -> Result<PathBuf>;

    /// Sentence to synthesize in that voice.
    fn text(&mut self) -> Result<String>;
}

/// The same path and sentence every iteration.
#[derive(Debug, Clone)]
pub struct FixedUtterance {
    reference_audio: PathBuf,
    text: String,
}

impl FixedUtterance {
    pub fn new(reference_audio: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            reference_audio: reference_audio.into(),
            text: text.into(),
        }
    }
}

impl UtteranceSource for FixedUtterance {
    fn reference_audio(&mut self) -> Result<PathBuf> {
        Ok(self.reference_audio.clone())
    }

    fn text(&mut self) -> Result<String> {
        Ok(self.text.clone())
    }
}

/// Prompts for both on a line-oriented terminal.
///
/// End of input surfaces as [`Error::InputClosed`].
pub struct InteractiveUtterance<R, W> {
    input: R,
    prompt: W,
    fallback_text: String,
}

impl<R: BufRead, W: Write> InteractiveUtterance<R, W> {
    /// `fallback_text` is used when the sentence answer is blank.
    pub fn new(input: R, prompt: W, fallback_text: impl Into<String>) -> Self {
        Self {
            input,
            prompt,
            fallback_text: fallback_text.into(),
        }
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        writeln!(self.prompt, "{question}")?;
        self.prompt.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(Error::InputClosed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Drop quote characters left over from drag-and-drop or shell copying.
pub fn clean_path_answer(answer: &str) -> PathBuf {
    PathBuf::from(answer.replace(['"', '\''], "").trim())
}

impl<R: BufRead, W: Write> UtteranceSource for InteractiveUtterance<R, W> {
    fn reference_audio(&mut self) -> Result<PathBuf> {
        let answer = self.ask(REFERENCE_PROMPT)?;
        Ok(clean_path_answer(&answer))
    }

    fn text(&mut self) -> Result<String> {
        let answer = self.ask(TEXT_PROMPT)?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(self.fallback_text.clone());
        }
        Ok(answer.to_string())
    }
}
