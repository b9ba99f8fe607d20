// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Value boxes backing fields and properties.

use crate::error::MockError;
use crate::settings::NumericCoercion;
use crate::validate::type_matches;
use mimic_schema::{TypeRef, Value};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Storage for a data field. Reading before the first write is an error.
#[derive(Debug, Default)]
pub(crate) struct ValueCell {
    value: Option<Value>,
}

impl ValueCell {
    pub(crate) fn read(&self, member: &str) -> Result<Value, MockError> {
        self.value.clone().ok_or_else(|| MockError::UnsetFieldAccess {
            member: member.to_owned(),
        })
    }

    pub(crate) fn write(&mut self, value: Value) {
        self.value = Some(value);
    }
}

/// Declared type a cell is held to once attached to a property.
#[derive(Debug, Clone)]
pub(crate) struct CellBinding {
    pub(crate) member: String,
    pub(crate) ty: Option<TypeRef>,
    pub(crate) coercion: NumericCoercion,
}

impl CellBinding {
    fn check(&self, value: &Value) -> Result<(), MockError> {
        match &self.ty {
            Some(ty) if !type_matches(value, ty, self.coercion) => Err(MockError::ReturnType {
                member: self.member.clone(),
                expected: ty.clone(),
                value: value.clone(),
            }),
            _ => Ok(()),
        }
    }
}

#[derive(Debug)]
struct CellState {
    value: Value,
    bindings: Vec<CellBinding>,
}

/// The current value of a stubbed property.
///
/// Clones share one slot: the test keeps a handle, attaches another with
/// `stub(&mock).property(..)`, and can change what later reads return with
/// [`PropertyCell::write_return_value`]. Writes through the handle are
/// configuration, not calls, and are never recorded.
///
/// ```
/// use mimic_core::PropertyCell;
/// use mimic_schema::Value;
///
/// let cell = PropertyCell::new("forty-two");
/// cell.write_return_value(42).unwrap();
/// assert_eq!(cell.value(), Value::Int(42));
/// ```
#[derive(Debug, Clone)]
pub struct PropertyCell {
    state: Arc<Mutex<CellState>>,
}

impl PropertyCell {
    /// A cell holding `initial`.
    pub fn new(initial: impl Into<Value>) -> Self {
        Self {
            state: Arc::new(Mutex::new(CellState {
                value: initial.into(),
                bindings: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CellState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current value, without recording a read.
    pub fn value(&self) -> Value {
        self.lock().value.clone()
    }

    /// Replace the value returned by subsequent reads.
    ///
    /// Once attached, the new value must fit the declared type of every
    /// property the cell backs; otherwise the cell is unchanged and
    /// [`MockError::ReturnType`] is returned.
    pub fn write_return_value(&self, value: impl Into<Value>) -> Result<(), MockError> {
        let value = value.into();
        let mut state = self.lock();
        for binding in &state.bindings {
            binding.check(&value)?;
        }
        state.value = value;
        Ok(())
    }

    /// Whether both handles share one slot.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    /// Check the current value against `binding` and add it to the
    /// bindings later writes must satisfy.
    pub(crate) fn bind(&self, binding: CellBinding) -> Result<(), MockError> {
        let mut state = self.lock();
        binding.check(&state.value)?;
        if !state.bindings.iter().any(|b| b.member == binding.member) {
            state.bindings.push(binding);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn int_binding() -> CellBinding {
        CellBinding {
            member: "Deep#1.answer".into(),
            ty: Some(TypeRef::Int),
            coercion: NumericCoercion::Lossless,
        }
    }

    #[test]
    fn unset_field_read_fails() {
        let mut cell = ValueCell::default();
        assert!(matches!(cell.read("T#1.x"), Err(MockError::UnsetFieldAccess { .. })));
        cell.write(Value::Int(3));
        assert_eq!(cell.read("T#1.x").unwrap(), Value::Int(3));
    }

    #[test]
    fn bind_rejects_incompatible_initial_value() {
        let cell = PropertyCell::new("nope");
        assert!(matches!(cell.bind(int_binding()), Err(MockError::ReturnType { .. })));
    }

    #[test]
    fn bound_cell_rejects_incompatible_writes() {
        let cell = PropertyCell::new(1);
        cell.bind(int_binding()).unwrap();
        assert!(cell.write_return_value("two").is_err());
        assert_eq!(cell.value(), Value::Int(1));
        cell.write_return_value(2).unwrap();
        assert_eq!(cell.value(), Value::Int(2));
    }

    #[test]
    fn shared_cell_honours_every_binding() {
        let cell = PropertyCell::new(1);
        cell.bind(int_binding()).unwrap();
        cell.bind(CellBinding {
            member: "Deep#2.answer".into(),
            ty: Some(TypeRef::optional(TypeRef::Int)),
            coercion: NumericCoercion::Lossless,
        })
        .unwrap();
        // `None` fits the second property but not the first.
        assert!(matches!(
            cell.write_return_value(Value::None),
            Err(MockError::ReturnType { ref member, .. }) if member == "Deep#1.answer"
        ));
        assert_eq!(cell.value(), Value::Int(1));
        cell.write_return_value(7).unwrap();
        assert_eq!(cell.state.lock().unwrap().bindings.len(), 2);
    }

    #[test]
    fn clones_share_the_slot() {
        let cell = PropertyCell::new(1);
        let other = cell.clone();
        other.write_return_value(5).unwrap();
        assert_eq!(cell.value(), Value::Int(5));
        assert!(cell.ptr_eq(&other));
    }
}
