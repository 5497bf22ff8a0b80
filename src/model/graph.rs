//! Opaque ONNX graph evaluation via candle-onnx.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use candle_core::Tensor;
use candle_onnx::onnx::ModelProto;

use crate::{Error, Result};

/// A loaded ONNX graph with its runtime input and output names resolved.
pub struct OnnxGraph {
    model: ModelProto,
    inputs: Vec<String>,
    output: String,
}

impl OnnxGraph {
    /// Read a graph and check it has exactly `num_inputs` runtime inputs.
    ///
    /// Initializers listed among the graph inputs (older exporters do this)
    /// are not counted.
    pub fn load(path: impl AsRef<Path>, num_inputs: usize) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::ModelLoad(format!(
                "model graph not found at {}",
                path.display()
            )));
        }
        let model = candle_onnx::read_file(path)
            .map_err(|e| Error::ModelLoad(format!("{}: {e}", path.display())))?;
        Self::from_model(model, path, num_inputs)
    }

    /// Resolve the runtime inputs and first output of an already parsed graph.
    pub fn from_model(model: ModelProto, origin: &Path, num_inputs: usize) -> Result<Self> {
        let graph = model
            .graph
            .as_ref()
            .ok_or_else(|| Error::ModelLoad(format!("{} contains no graph", origin.display())))?;

        let initializers: HashSet<&str> =
            graph.initializer.iter().map(|t| t.name.as_str()).collect();
        let inputs: Vec<String> = graph
            .input
            .iter()
            .map(|i| i.name.clone())
            .filter(|name| !initializers.contains(name.as_str()))
            .collect();
        if inputs.len() != num_inputs {
            return Err(Error::ModelLoad(format!(
                "{} takes {} inputs {inputs:?}, expected {num_inputs}",
                origin.display(),
                inputs.len()
            )));
        }
        let output = graph
            .output
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| Error::ModelLoad(format!("{} has no outputs", origin.display())))?;

        tracing::debug!(path = %origin.display(), ?inputs, %output, "loaded onnx graph");
        Ok(Self {
            model,
            inputs,
            output,
        })
    }

    /// Feed `values` to the graph inputs in declaration order and return the first output.
    pub fn run(&self, values: Vec<Tensor>) -> Result<Tensor> {
        if values.len() != self.inputs.len() {
            return Err(Error::ModelContract(format!(
                "graph takes {} inputs, got {}",
                self.inputs.len(),
                values.len()
            )));
        }
        let feeds: HashMap<String, Tensor> = self.inputs.iter().cloned().zip(values).collect();
        let mut outputs = candle_onnx::simple_eval(&self.model, feeds)?;
        outputs
            .remove(&self.output)
            .ok_or_else(|| Error::ModelContract(format!("graph produced no '{}'", self.output)))
    }

    pub fn input_names(&self) -> &[String] {
        &self.inputs
    }
}
