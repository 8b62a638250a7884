//! ONNX back-end on top of `candle-onnx`.
//!
//! On load the graph is rewritten so that every node output is also a graph
//! output. One evaluation then yields the whole activation stack, with the
//! original first graph output (the classifier head) moved to the end.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt::Write as _,
    path::Path,
};

use candle_core::Tensor;
use candle_onnx::onnx::{ModelProto, ValueInfoProto};

use super::ActivationModel;
use crate::error::{ConfigError, InferenceError};

pub struct OnnxActivationModel {
    model: ModelProto,
    input: String,
    layers: Vec<String>,
}

impl OnnxActivationModel {
    /// Load an ONNX file and expose its intermediate layers.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let model_err = |reason: String| ConfigError::Model {
            path: path.to_path_buf(),
            reason,
        };

        if !path.is_file() {
            return Err(model_err("file not found".into()));
        }
        let model = candle_onnx::read_file(path).map_err(|e| model_err(e.to_string()))?;
        Self::from_proto(model).map_err(model_err)
    }

    /// Wrap an already decoded model.
    pub fn from_proto(mut model: ModelProto) -> Result<Self, String> {
        let graph = model.graph.as_mut().ok_or("model has no graph")?;

        let input = {
            let weights: HashSet<&str> = graph.initializer.iter().map(|t| t.name.as_str()).collect();
            graph
                .input
                .iter()
                .map(|i| i.name.as_str())
                .find(|name| !weights.contains(name))
                .ok_or("graph has no data input")?
                .to_string()
        };

        let head = graph
            .output
            .first()
            .map(|o| o.name.clone())
            .ok_or("graph declares no outputs")?;

        let mut seen = HashSet::new();
        let mut layers: Vec<String> = graph
            .node
            .iter()
            .flat_map(|n| n.output.iter())
            .filter(|name| !name.is_empty() && **name != head)
            .filter(|name| seen.insert(name.as_str()))
            .cloned()
            .collect();
        layers.push(head);

        let declared: HashSet<String> = graph.output.iter().map(|o| o.name.clone()).collect();
        for name in &layers {
            if !declared.contains(name) {
                graph.output.push(ValueInfoProto {
                    name: name.clone(),
                    ..Default::default()
                });
            }
        }

        Ok(Self {
            model,
            input,
            layers,
        })
    }

    /// Name of the tensor the batch is fed to.
    pub fn input_name(&self) -> &str {
        &self.input
    }

    /// Exposed layer outputs, classifier head last.
    pub fn layer_names(&self) -> &[String] {
        &self.layers
    }

    /// One-paragraph description of the graph for the startup log.
    pub fn summary(&self) -> String {
        let mut ops: BTreeMap<&str, usize> = BTreeMap::new();
        let nodes = self.model.graph.as_ref().map_or(&[][..], |g| &g.node[..]);
        for node in nodes {
            *ops.entry(node.op_type.as_str()).or_default() += 1;
        }

        let mut out = format!(
            "input '{}', {} nodes, {} exposed layers, head '{}'",
            self.input,
            nodes.len(),
            self.layers.len(),
            self.layers.last().map_or("", String::as_str),
        );
        for (op, count) in ops {
            let _ = write!(out, "; {op}×{count}");
        }
        out
    }
}

impl ActivationModel for OnnxActivationModel {
    fn activations(&self, batch: &Tensor) -> Result<Vec<Tensor>, InferenceError> {
        let inputs = HashMap::from([(self.input.clone(), batch.clone())]);
        let mut values = candle_onnx::simple_eval(&self.model, inputs)?;

        self.layers
            .iter()
            .map(|name| {
                values
                    .remove(name)
                    .ok_or_else(|| InferenceError::MissingOutput(name.clone()))
            })
            .collect()
    }
}
