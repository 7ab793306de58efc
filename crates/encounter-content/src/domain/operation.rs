//! Typed read/modify/write operation models.

use encounter_core::address::KeyValueAddress;
use serde::{Deserialize, Serialize};

/// Operations shared by the integer and float evaluators.
///
/// `Random` draws from `[input0, input1)`; `RandomNormal` draws from `[0, 1)`.
/// `Round`, `Floor` and `Ceiling` are identities on integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericOperation {
    Set,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Clamp,
    Round,
    Floor,
    Ceiling,
    Random,
    RandomNormal,
    #[serde(other)]
    Unknown,
}

impl NumericOperation {
    /// Returns `true` if the operation reads `input1`.
    #[must_use]
    pub fn is_binary(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide | Self::Modulo | Self::Random
        )
    }
}

/// Boolean operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BooleanOperation {
    Set,
    And,
    Or,
    Xor,
    Random,
    #[serde(other)]
    Unknown,
}

impl BooleanOperation {
    /// Returns `true` if the operation reads `input1`.
    #[must_use]
    pub fn is_binary(self) -> bool {
        matches!(self, Self::And | Self::Or | Self::Xor)
    }
}

/// String operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringOperation {
    Set,
    #[serde(other)]
    Unknown,
}

/// An integer or float operation with optional clamp bounds.
///
/// Each bound is enabled independently by being present. The result is
/// clamped after it is computed and before it is written to `output`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericOperationModel<T> {
    /// What to compute.
    pub operation: NumericOperation,
    /// First operand.
    pub input0: KeyValueAddress<T>,
    /// Second operand, for binary operations.
    #[serde(default)]
    pub input1: Option<KeyValueAddress<T>>,
    /// Lower clamp bound.
    #[serde(default)]
    pub min: Option<KeyValueAddress<T>>,
    /// Upper clamp bound.
    #[serde(default)]
    pub max: Option<KeyValueAddress<T>>,
    /// Write target; must be a store reference.
    pub output: KeyValueAddress<T>,
}

/// Integer operation model.
pub type IntegerOperationModel = NumericOperationModel<i64>;

/// Float operation model.
pub type FloatOperationModel = NumericOperationModel<f64>;

/// A boolean operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BooleanOperationModel {
    /// What to compute.
    pub operation: BooleanOperation,
    /// First operand.
    pub input0: KeyValueAddress<bool>,
    /// Second operand, for `And`, `Or` and `Xor`.
    #[serde(default)]
    pub input1: Option<KeyValueAddress<bool>>,
    /// Write target; must be a store reference.
    pub output: KeyValueAddress<bool>,
}

/// A string operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringOperationModel {
    /// What to compute.
    pub operation: StringOperation,
    /// The operand.
    pub input0: KeyValueAddress<String>,
    /// Write target; must be a store reference.
    pub output: KeyValueAddress<String>,
}

/// One operation of any value type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperationModel {
    Boolean(BooleanOperationModel),
    Integer(IntegerOperationModel),
    Float(FloatOperationModel),
    String(StringOperationModel),
}

impl OperationModel {
    /// Returns the value type name, for logging.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
        }
    }

    /// Returns `true` if a binary operation has no `input1`.
    #[must_use]
    pub fn lacks_second_operand(&self) -> bool {
        match self {
            Self::Boolean(op) => op.operation.is_binary() && op.input1.is_none(),
            Self::Integer(op) => op.operation.is_binary() && op.input1.is_none(),
            Self::Float(op) => op.operation.is_binary() && op.input1.is_none(),
            Self::String(_) => false,
        }
    }
}
