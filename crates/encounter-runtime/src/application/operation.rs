//! Typed read/modify/write operations.
//!
//! Operands are read in a fixed order (min bound, max bound, `input0`,
//! `input1`) and every read must succeed before anything is computed. The
//! result is clamped, then written to `output`.

use encounter_content::domain::operation::{
    BooleanOperation, BooleanOperationModel, NumericOperation, NumericOperationModel,
    OperationModel, StringOperation, StringOperationModel,
};
use encounter_core::address::KeyValueAddress;
use encounter_core::error::EncounterError;
use encounter_core::rng::DeterministicRng;
use encounter_core::store::{KeyValueStore, StoreType};

/// Arithmetic shared by the integer and float evaluators.
trait Numeric: StoreType + Copy + PartialOrd {
    const CATEGORY: &'static str;

    fn add(self, rhs: Self) -> Option<Self>;
    fn sub(self, rhs: Self) -> Option<Self>;
    fn mul(self, rhs: Self) -> Option<Self>;
    fn div(self, rhs: Self) -> Option<Self>;
    fn rem(self, rhs: Self) -> Option<Self>;
    fn round(self) -> Self;
    fn floor(self) -> Self;
    fn ceil(self) -> Self;
    /// A value in `[min, max)`, or `min` for an empty range.
    fn random(rng: &mut dyn DeterministicRng, min: Self, max: Self) -> Self;
    /// A value in `[0, 1)`.
    fn random_normal(rng: &mut dyn DeterministicRng) -> Self;
}

impl Numeric for i64 {
    const CATEGORY: &'static str = "integer operation";

    fn add(self, rhs: Self) -> Option<Self> {
        self.checked_add(rhs)
    }
    fn sub(self, rhs: Self) -> Option<Self> {
        self.checked_sub(rhs)
    }
    fn mul(self, rhs: Self) -> Option<Self> {
        self.checked_mul(rhs)
    }
    fn div(self, rhs: Self) -> Option<Self> {
        self.checked_div(rhs)
    }
    fn rem(self, rhs: Self) -> Option<Self> {
        self.checked_rem(rhs)
    }
    fn round(self) -> Self {
        self
    }
    fn floor(self) -> Self {
        self
    }
    fn ceil(self) -> Self {
        self
    }
    fn random(rng: &mut dyn DeterministicRng, min: Self, max: Self) -> Self {
        rng.next_i64_range(min, max)
    }
    fn random_normal(rng: &mut dyn DeterministicRng) -> Self {
        rng.next_i64_range(0, 1)
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

impl Numeric for f64 {
    const CATEGORY: &'static str = "float operation";

    fn add(self, rhs: Self) -> Option<Self> {
        finite(self + rhs)
    }
    fn sub(self, rhs: Self) -> Option<Self> {
        finite(self - rhs)
    }
    fn mul(self, rhs: Self) -> Option<Self> {
        finite(self * rhs)
    }
    fn div(self, rhs: Self) -> Option<Self> {
        finite(self / rhs)
    }
    fn rem(self, rhs: Self) -> Option<Self> {
        finite(self % rhs)
    }
    fn round(self) -> Self {
        f64::round(self)
    }
    fn floor(self) -> Self {
        f64::floor(self)
    }
    fn ceil(self) -> Self {
        f64::ceil(self)
    }
    fn random(rng: &mut dyn DeterministicRng, min: Self, max: Self) -> Self {
        if max <= min {
            return min;
        }
        let value = min + rng.next_f64() * (max - min);
        if value < max { value } else { min }
    }
    fn random_normal(rng: &mut dyn DeterministicRng) -> Self {
        rng.next_f64()
    }
}

/// Executes one operation against the store.
///
/// # Errors
///
/// Returns `EncounterError::InvalidAddress` if the output is a literal,
/// `EncounterError::ResolutionFailure` if an operand cannot be read, a binary
/// operation lacks `input1`, the arithmetic fails or the write is rejected,
/// and `EncounterError::UnrecognizedKind` for an unknown operation. Nothing is
/// written when an error is returned.
pub async fn execute_operation(
    model: &OperationModel,
    store: &dyn KeyValueStore,
    rng: &mut dyn DeterministicRng,
) -> Result<(), EncounterError> {
    match model {
        OperationModel::Boolean(op) => execute_boolean(op, store, rng).await,
        OperationModel::Integer(op) => execute_numeric(op, store, rng).await,
        OperationModel::Float(op) => execute_numeric(op, store, rng).await,
        OperationModel::String(op) => execute_string(op, store).await,
    }
}

async fn read_optional<T: StoreType>(
    address: Option<&KeyValueAddress<T>>,
    store: &dyn KeyValueStore,
) -> Result<Option<T>, EncounterError> {
    match address {
        Some(address) => Ok(Some(address.get(store).await?)),
        None => Ok(None),
    }
}

fn require<T>(value: Option<T>, what: &str) -> Result<T, EncounterError> {
    value.ok_or_else(|| EncounterError::ResolutionFailure(format!("{what} requires input1")))
}

fn clamp<T: PartialOrd + Copy>(value: T, min: Option<T>, max: Option<T>) -> T {
    let (lo, hi) = match (min, max) {
        (Some(a), Some(b)) if b < a => (Some(b), Some(a)),
        bounds => bounds,
    };
    match (lo, hi) {
        (Some(lo), _) if value < lo => lo,
        (_, Some(hi)) if value > hi => hi,
        _ => value,
    }
}

async fn execute_numeric<T: Numeric>(
    model: &NumericOperationModel<T>,
    store: &dyn KeyValueStore,
    rng: &mut dyn DeterministicRng,
) -> Result<(), EncounterError> {
    if !model.output.is_writable() {
        return Err(EncounterError::InvalidAddress);
    }

    let min = read_optional(model.min.as_ref(), store).await?;
    let max = read_optional(model.max.as_ref(), store).await?;
    let a = model.input0.get(store).await?;
    let b = read_optional(model.input1.as_ref(), store).await?;

    let arithmetic = |result: Option<T>, name: &str| {
        result.ok_or_else(|| {
            EncounterError::ResolutionFailure(format!("{name} failed: overflow or invalid operand"))
        })
    };

    let raw = match model.operation {
        NumericOperation::Set | NumericOperation::Clamp => a,
        NumericOperation::Add => arithmetic(a.add(require(b, "add")?), "add")?,
        NumericOperation::Subtract => arithmetic(a.sub(require(b, "subtract")?), "subtract")?,
        NumericOperation::Multiply => arithmetic(a.mul(require(b, "multiply")?), "multiply")?,
        NumericOperation::Divide => arithmetic(a.div(require(b, "divide")?), "divide")?,
        NumericOperation::Modulo => arithmetic(a.rem(require(b, "modulo")?), "modulo")?,
        NumericOperation::Round => a.round(),
        NumericOperation::Floor => a.floor(),
        NumericOperation::Ceiling => a.ceil(),
        NumericOperation::Random => T::random(rng, a, require(b, "random")?),
        NumericOperation::RandomNormal => T::random_normal(rng),
        NumericOperation::Unknown => {
            return Err(EncounterError::unrecognized(T::CATEGORY, "unknown"));
        }
    };

    model.output.set(store, clamp(raw, min, max)).await
}

async fn execute_boolean(
    model: &BooleanOperationModel,
    store: &dyn KeyValueStore,
    rng: &mut dyn DeterministicRng,
) -> Result<(), EncounterError> {
    if !model.output.is_writable() {
        return Err(EncounterError::InvalidAddress);
    }

    let a = model.input0.get(store).await?;
    let b = read_optional(model.input1.as_ref(), store).await?;

    let result = match model.operation {
        BooleanOperation::Set => a,
        BooleanOperation::And => a && require(b, "and")?,
        BooleanOperation::Or => a || require(b, "or")?,
        BooleanOperation::Xor => a ^ require(b, "xor")?,
        BooleanOperation::Random => rng.next_f64() < 0.5,
        BooleanOperation::Unknown => {
            return Err(EncounterError::unrecognized("boolean operation", "unknown"));
        }
    };

    model.output.set(store, result).await
}

async fn execute_string(
    model: &StringOperationModel,
    store: &dyn KeyValueStore,
) -> Result<(), EncounterError> {
    if !model.output.is_writable() {
        return Err(EncounterError::InvalidAddress);
    }

    let value = model.input0.get(store).await?;
    match model.operation {
        StringOperation::Set => model.output.set(store, value).await,
        StringOperation::Unknown => Err(EncounterError::unrecognized("string operation", "unknown")),
    }
}

#[cfg(test)]
mod tests {
    use encounter_core::rng::SeededRng;
    use encounter_core::store::{Scope, StoreValue};
    use encounter_test_support::{MockRng, RecordingKeyValueStore, SequenceRng};

    use super::*;
    use encounter_content::domain::operation::{FloatOperationModel, IntegerOperationModel};

    fn counter() -> KeyValueAddress<i64> {
        KeyValueAddress::reference(Scope::Global, "counter")
    }

    fn integer_op(
        operation: NumericOperation,
        input0: KeyValueAddress<i64>,
        input1: Option<KeyValueAddress<i64>>,
    ) -> IntegerOperationModel {
        NumericOperationModel {
            operation,
            input0,
            input1,
            min: None,
            max: None,
            output: counter(),
        }
    }

    #[tokio::test]
    async fn test_integer_add_reads_store_and_writes_sum() {
        // Arrange
        let store =
            RecordingKeyValueStore::with_values([(Scope::Global, "counter", StoreValue::Integer(3))]);
        let model = OperationModel::Integer(integer_op(
            NumericOperation::Add,
            KeyValueAddress::local(5),
            Some(counter()),
        ));

        // Act
        let result = execute_operation(&model, &store, &mut MockRng).await;

        // Assert
        assert!(result.is_ok());
        assert_eq!(
            store.value(&Scope::Global, "counter"),
            Some(StoreValue::Integer(8))
        );
    }

    #[tokio::test]
    async fn test_swapped_clamp_bounds_are_reordered() {
        // Arrange
        let store = RecordingKeyValueStore::new();
        let mut model = integer_op(NumericOperation::Clamp, KeyValueAddress::local(15), None);
        model.min = Some(KeyValueAddress::local(10));
        model.max = Some(KeyValueAddress::local(2));

        // Act
        execute_operation(&OperationModel::Integer(model), &store, &mut MockRng)
            .await
            .unwrap();

        // Assert
        assert_eq!(
            store.value(&Scope::Global, "counter"),
            Some(StoreValue::Integer(10))
        );
    }

    #[test]
    fn test_clamp_with_single_bound() {
        assert_eq!(clamp(-4, Some(0), None), 0);
        assert_eq!(clamp(40, None, Some(30)), 30);
        assert_eq!(clamp(7, None, None), 7);
        assert_eq!(clamp(1, Some(2), Some(10)), 2);
    }

    #[tokio::test]
    async fn test_local_output_is_invalid_and_store_untouched() {
        // Arrange
        let store = RecordingKeyValueStore::new();
        let mut model = integer_op(NumericOperation::Set, KeyValueAddress::local(1), None);
        model.output = KeyValueAddress::local(0);

        // Act
        let result = execute_operation(&OperationModel::Integer(model), &store, &mut MockRng).await;

        // Assert
        assert_eq!(result, Err(EncounterError::InvalidAddress));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_bound_read_skips_operation() {
        // Arrange
        let store = RecordingKeyValueStore::new();
        let mut model = integer_op(NumericOperation::Set, KeyValueAddress::local(1), None);
        model.min = Some(KeyValueAddress::reference(Scope::Global, "missing_floor"));

        // Act
        let result = execute_operation(&OperationModel::Integer(model), &store, &mut MockRng).await;

        // Assert
        assert!(matches!(result, Err(EncounterError::ResolutionFailure(_))));
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn test_integer_division_truncates_and_rejects_zero() {
        // Arrange
        let store = RecordingKeyValueStore::new();
        let divide = |rhs| {
            OperationModel::Integer(integer_op(
                NumericOperation::Divide,
                KeyValueAddress::local(-7),
                Some(KeyValueAddress::local(rhs)),
            ))
        };

        // Act
        let ok = execute_operation(&divide(2), &store, &mut MockRng).await;
        let by_zero = execute_operation(&divide(0), &store, &mut MockRng).await;

        // Assert
        assert!(ok.is_ok());
        assert_eq!(
            store.value(&Scope::Global, "counter"),
            Some(StoreValue::Integer(-3))
        );
        assert!(matches!(by_zero, Err(EncounterError::ResolutionFailure(_))));
        assert_eq!(store.writes().len(), 1);
    }

    #[tokio::test]
    async fn test_binary_operation_without_input1_fails() {
        let store = RecordingKeyValueStore::new();
        let model = OperationModel::Integer(integer_op(
            NumericOperation::Multiply,
            KeyValueAddress::local(2),
            None,
        ));

        let result = execute_operation(&model, &store, &mut MockRng).await;

        assert!(matches!(result, Err(EncounterError::ResolutionFailure(m)) if m.contains("multiply")));
    }

    #[tokio::test]
    async fn test_float_random_stays_in_half_open_range() {
        // Arrange
        let store = RecordingKeyValueStore::new();
        let output = KeyValueAddress::reference(Scope::Encounter, "roll");
        let model = OperationModel::Float(FloatOperationModel {
            operation: NumericOperation::Random,
            input0: KeyValueAddress::local(0.0),
            input1: Some(KeyValueAddress::local(1.0)),
            min: None,
            max: None,
            output,
        });
        let mut rng = SeededRng::new(42);

        for _ in 0..200 {
            // Act
            execute_operation(&model, &store, &mut rng).await.unwrap();

            // Assert
            match store.value(&Scope::Encounter, "roll") {
                Some(StoreValue::Float(v)) => assert!((0.0..1.0).contains(&v), "{v} out of range"),
                other => panic!("expected float, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_float_floor_and_modulo() {
        // Arrange
        let store = RecordingKeyValueStore::new();
        let float_op = |operation, input1| {
            OperationModel::Float(FloatOperationModel {
                operation,
                input0: KeyValueAddress::local(7.5),
                input1,
                min: None,
                max: None,
                output: KeyValueAddress::reference(Scope::Global, "f"),
            })
        };

        // Act
        execute_operation(&float_op(NumericOperation::Floor, None), &store, &mut MockRng)
            .await
            .unwrap();
        let floored = store.value(&Scope::Global, "f");
        execute_operation(
            &float_op(NumericOperation::Modulo, Some(KeyValueAddress::local(2.0))),
            &store,
            &mut MockRng,
        )
        .await
        .unwrap();
        let remainder = store.value(&Scope::Global, "f");

        // Assert
        assert_eq!(floored, Some(StoreValue::Float(7.0)));
        assert_eq!(remainder, Some(StoreValue::Float(1.5)));
    }

    #[tokio::test]
    async fn test_boolean_random_and_xor() {
        // Arrange
        let store = RecordingKeyValueStore::new();
        let output = KeyValueAddress::reference(Scope::Global, "b");
        let random = OperationModel::Boolean(BooleanOperationModel {
            operation: BooleanOperation::Random,
            input0: KeyValueAddress::local(false),
            input1: None,
            output: output.clone(),
        });
        let xor = OperationModel::Boolean(BooleanOperationModel {
            operation: BooleanOperation::Xor,
            input0: KeyValueAddress::local(true),
            input1: Some(KeyValueAddress::local(true)),
            output,
        });
        let mut rng = SequenceRng::with_floats(vec![0.75, 0.25]);

        // Act / Assert
        execute_operation(&random, &store, &mut rng).await.unwrap();
        assert_eq!(store.value(&Scope::Global, "b"), Some(StoreValue::Boolean(false)));
        execute_operation(&random, &store, &mut rng).await.unwrap();
        assert_eq!(store.value(&Scope::Global, "b"), Some(StoreValue::Boolean(true)));
        execute_operation(&xor, &store, &mut rng).await.unwrap();
        assert_eq!(store.value(&Scope::Global, "b"), Some(StoreValue::Boolean(false)));
    }

    #[tokio::test]
    async fn test_string_set_copies_value() {
        let store = RecordingKeyValueStore::new();
        let model = OperationModel::String(StringOperationModel {
            operation: StringOperation::Set,
            input0: KeyValueAddress::local("Vell".to_owned()),
            output: KeyValueAddress::reference(Scope::Preferences, "last_species"),
        });

        execute_operation(&model, &store, &mut MockRng).await.unwrap();

        assert_eq!(
            store.value(&Scope::Preferences, "last_species"),
            Some(StoreValue::String("Vell".to_owned()))
        );
    }

    #[tokio::test]
    async fn test_unknown_operation_is_unrecognized() {
        let store = RecordingKeyValueStore::new();
        let model = OperationModel::Integer(integer_op(
            NumericOperation::Unknown,
            KeyValueAddress::local(1),
            None,
        ));

        let result = execute_operation(&model, &store, &mut MockRng).await;

        assert!(matches!(
            result,
            Err(EncounterError::UnrecognizedKind { category: "integer operation", .. })
        ));
    }
}
