//! Model signature inference
//!
//! Describes a model's expected inputs and outputs as tensor specs, in the
//! JSON layout MLflow stores inside an `MLmodel` file:
//!
//! ```text
//! [{"type": "tensor", "tensor-spec": {"dtype": "float32", "shape": [-1, 1]}}]
//! ```
//!
//! The leading (batch) dimension is always recorded as `-1` so that the
//! signature does not depend on how many samples it was inferred from.

use aprender::primitives::Matrix;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Variable-size dimension marker.
pub const BATCH_DIM: i64 = -1;

/// Element type of a tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// 32-bit float
    Float32,
    /// 64-bit signed integer
    Int64,
}

/// Dtype and shape of one tensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorSpec {
    dtype: DataType,
    shape: Vec<i64>,
}

impl TensorSpec {
    /// Create a tensor spec.
    #[must_use]
    pub const fn new(dtype: DataType, shape: Vec<i64>) -> Self {
        Self { dtype, shape }
    }

    /// Element type.
    #[must_use]
    pub const fn dtype(&self) -> DataType {
        self.dtype
    }

    /// Shape, batch dimension first.
    #[must_use]
    pub fn shape(&self) -> &[i64] {
        &self.shape
    }
}

/// One entry of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SchemaEntry {
    /// Unnamed tensor input or output.
    #[serde(rename = "tensor")]
    Tensor {
        /// Tensor dtype and shape.
        #[serde(rename = "tensor-spec")]
        tensor_spec: TensorSpec,
    },
}

/// Ordered list of schema entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema(Vec<SchemaEntry>);

impl Schema {
    /// Schema with a single tensor.
    #[must_use]
    pub fn tensor(spec: TensorSpec) -> Self {
        Self(vec![SchemaEntry::Tensor { tensor_spec: spec }])
    }

    /// Tensor spec of the first entry.
    #[must_use]
    pub fn first_tensor(&self) -> Option<&TensorSpec> {
        self.0.first().map(|SchemaEntry::Tensor { tensor_spec }| tensor_spec)
    }
}

/// Input and output schemas of a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSignature {
    inputs: Schema,
    outputs: Schema,
}

/// `signature` section of an `MLmodel` file: schemas encoded as JSON strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureDocument {
    /// JSON encoded input schema.
    pub inputs: String,
    /// JSON encoded output schema.
    pub outputs: String,
    /// Inference params schema (unused).
    pub params: Option<String>,
}

impl ModelSignature {
    /// Pair input and output schemas.
    #[must_use]
    pub const fn new(inputs: Schema, outputs: Schema) -> Self {
        Self { inputs, outputs }
    }

    /// Input schema.
    #[must_use]
    pub const fn inputs(&self) -> &Schema {
        &self.inputs
    }

    /// Output schema.
    #[must_use]
    pub const fn outputs(&self) -> &Schema {
        &self.outputs
    }

    /// Encode for the `MLmodel` file.
    ///
    /// # Errors
    ///
    /// Returns error if JSON encoding fails.
    pub fn to_document(&self) -> Result<SignatureDocument> {
        Ok(SignatureDocument {
            inputs: serde_json::to_string(&self.inputs)?,
            outputs: serde_json::to_string(&self.outputs)?,
            params: None,
        })
    }

    /// Decode from the `MLmodel` representation.
    ///
    /// # Errors
    ///
    /// Returns error if either schema string is not valid schema JSON.
    pub fn from_document(doc: &SignatureDocument) -> Result<Self> {
        Ok(Self {
            inputs: serde_json::from_str(&doc.inputs)?,
            outputs: serde_json::from_str(&doc.outputs)?,
        })
    }
}

/// Sample data a tensor spec can be inferred from.
pub trait InferTensorSpec {
    /// Dtype and shape of `self`, with a variable batch dimension.
    fn tensor_spec(&self) -> TensorSpec;
}

impl InferTensorSpec for Matrix<f32> {
    fn tensor_spec(&self) -> TensorSpec {
        TensorSpec::new(DataType::Float32, vec![BATCH_DIM, dim(self.n_cols())])
    }
}

// class labels; MLflow has no unsigned type
impl InferTensorSpec for [usize] {
    fn tensor_spec(&self) -> TensorSpec {
        TensorSpec::new(DataType::Int64, vec![BATCH_DIM])
    }
}

fn dim(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Infer a model signature from example inputs and the model's outputs on them.
#[must_use]
pub fn infer_signature<I, O>(input: &I, output: &O) -> ModelSignature
where
    I: InferTensorSpec + ?Sized,
    O: InferTensorSpec + ?Sized,
{
    ModelSignature::new(
        Schema::tensor(input.tensor_spec()),
        Schema::tensor(output.tensor_spec()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Dataset;

    #[test]
    fn test_infer_from_matrix_and_labels() {
        let data = Dataset::demo().unwrap();
        let predictions: Vec<usize> = vec![0, 0, 0, 1, 1, 1];
        let signature = infer_signature(data.x(), predictions.as_slice());

        let input = signature.inputs().first_tensor().unwrap();
        assert_eq!(input.dtype(), DataType::Float32);
        assert_eq!(input.shape(), &[-1, 1]);

        let output = signature.outputs().first_tensor().unwrap();
        assert_eq!(output.dtype(), DataType::Int64);
        assert_eq!(output.shape(), &[-1]);
    }

    #[test]
    fn test_schema_json_layout() {
        let schema = Schema::tensor(TensorSpec::new(DataType::Float32, vec![-1, 1]));
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"type": "tensor", "tensor-spec": {"dtype": "float32", "shape": [-1, 1]}}
            ])
        );
    }

    #[test]
    fn test_document_round_trip() {
        let data = Dataset::column(&[1.0, 2.0], vec![0, 1]).unwrap();
        let signature = infer_signature(data.x(), data.y());
        let doc = signature.to_document().unwrap();
        assert!(doc.outputs.contains("int64"));
        assert_eq!(ModelSignature::from_document(&doc).unwrap(), signature);
    }
}
