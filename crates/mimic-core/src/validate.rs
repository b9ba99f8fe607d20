// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Argument binding and runtime type checks against declared signatures.

use crate::call::CallArgs;
use crate::error::{ArgumentMismatch, MockError};
use crate::settings::NumericCoercion;
use mimic_schema::{MemberSpec, ParamKind, TypeRef, Value};

/// Does `value` fit the declared type `ty`?
///
/// Containers are checked element by element. A union matches when any
/// alternative matches. `bool` is never accepted as a number.
///
/// ```
/// use mimic_core::{type_matches, NumericCoercion};
/// use mimic_schema::{TypeRef, Value};
///
/// let lossless = NumericCoercion::Lossless;
/// assert!(type_matches(&Value::Int(3), &TypeRef::Float, lossless));
/// assert!(!type_matches(&Value::Float(2.5), &TypeRef::Int, lossless));
/// assert!(!type_matches(&Value::Bool(true), &TypeRef::Int, lossless));
/// assert!(type_matches(&Value::None, &TypeRef::optional(TypeRef::Str), lossless));
/// ```
pub fn type_matches(value: &Value, ty: &TypeRef, coercion: NumericCoercion) -> bool {
    let lossless = coercion == NumericCoercion::Lossless;
    match (ty, value) {
        (TypeRef::Any, _)
        | (TypeRef::NoneType, Value::None)
        | (TypeRef::Bool, Value::Bool(_))
        | (TypeRef::Int, Value::Int(_))
        | (TypeRef::Float, Value::Float(_))
        | (TypeRef::Str, Value::Str(_)) => true,
        (TypeRef::Int, Value::Float(x)) => lossless && is_integral(*x),
        (TypeRef::Float, Value::Int(_)) => lossless,
        (TypeRef::List(item), Value::List(items)) | (TypeRef::Set(item), Value::Set(items)) => {
            items.iter().all(|v| type_matches(v, item, coercion))
        }
        (TypeRef::Tuple(shape), Value::Tuple(items)) => {
            shape.is_empty()
                || (shape.len() == items.len()
                    && shape
                        .iter()
                        .zip(items)
                        .all(|(t, v)| type_matches(v, t, coercion)))
        }
        (TypeRef::Map(kt, vt), Value::Map(entries)) => entries
            .iter()
            .all(|(k, v)| type_matches(k, kt, coercion) && type_matches(v, vt, coercion)),
        (TypeRef::Union(alts), _) => alts.iter().any(|t| type_matches(value, t, coercion)),
        (TypeRef::Named(expected), Value::Object { type_name, .. }) => {
            bare_name(expected) == bare_name(type_name)
        }
        _ => false,
    }
}

#[allow(clippy::cast_precision_loss, clippy::float_cmp)]
fn is_integral(x: f64) -> bool {
    // `i64::MAX as f64` rounds up to 2^63, which is out of range.
    x.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(&x)
}

fn bare_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

fn check(
    member: &str,
    param: &str,
    ty: Option<&TypeRef>,
    value: &Value,
    coercion: NumericCoercion,
) -> Result<(), MockError> {
    match ty {
        Some(ty) if !type_matches(value, ty, coercion) => Err(MockError::ArgumentType {
            member: member.to_owned(),
            mismatch: ArgumentMismatch::WrongType {
                param: param.to_owned(),
                expected: ty.clone(),
                value: value.clone(),
            },
        }),
        _ => Ok(()),
    }
}

/// Bind `call` to `spec`'s parameters and type-check every bound value.
///
/// Positional arguments bind first, then keywords; surplus positionals go
/// to `*args` and unknown keywords to `**kwargs` when declared. Unbound
/// optional parameters take their defaults, which are checked as well.
/// Arity problems are reported before any type mismatch.
pub fn validate_call(
    spec: &MemberSpec,
    member: &str,
    call: &CallArgs,
    coercion: NumericCoercion,
) -> Result<(), MockError> {
    let arity = |mismatch| MockError::ArgumentType {
        member: member.to_owned(),
        mismatch,
    };
    let params = &spec.params;
    let positional: Vec<usize> = params
        .iter()
        .enumerate()
        .filter(|(_, p)| p.kind == ParamKind::PositionalOrKeyword)
        .map(|(i, _)| i)
        .collect();
    let var_positional = params.iter().find(|p| p.kind == ParamKind::VarPositional);
    let var_keyword = params.iter().find(|p| p.kind == ParamKind::VarKeyword);

    let mut bound: Vec<Option<&Value>> = vec![None; params.len()];
    let mut surplus: Vec<&Value> = Vec::new();
    for (i, value) in call.args().iter().enumerate() {
        match positional.get(i) {
            Some(&idx) => bound[idx] = Some(value),
            None if var_positional.is_some() => surplus.push(value),
            None => {
                return Err(arity(ArgumentMismatch::TooManyPositional {
                    max: positional.len(),
                    given: call.args().len(),
                }))
            }
        }
    }

    let mut extra: Vec<(&str, &Value)> = Vec::new();
    for (name, value) in call.kwargs() {
        let slot = params.iter().position(|p| {
            p.name == *name && matches!(p.kind, ParamKind::PositionalOrKeyword | ParamKind::KeywordOnly)
        });
        match slot {
            Some(idx) if bound[idx].is_some() => {
                return Err(arity(ArgumentMismatch::MultipleValues { param: name.clone() }))
            }
            Some(idx) => bound[idx] = Some(value),
            None if var_keyword.is_some() => extra.push((name.as_str(), value)),
            None => return Err(arity(ArgumentMismatch::UnexpectedKeyword { name: name.clone() })),
        }
    }

    if let Some(missing) = params
        .iter()
        .zip(&bound)
        .find(|(p, b)| !p.is_variadic() && b.is_none() && !p.has_default())
    {
        return Err(arity(ArgumentMismatch::Missing {
            param: missing.0.name.clone(),
        }));
    }

    for (param, value) in params.iter().zip(bound.iter().copied()) {
        match param.kind {
            ParamKind::VarPositional => {
                for value in &surplus {
                    check(member, &param.name, param.ty.as_ref(), value, coercion)?;
                }
            }
            ParamKind::VarKeyword => {
                for (name, value) in &extra {
                    check(member, name, param.ty.as_ref(), value, coercion)?;
                }
            }
            _ => {
                if let Some(value) = value.or(param.default.as_ref()) {
                    check(member, &param.name, param.ty.as_ref(), value, coercion)?;
                }
            }
        }
    }
    Ok(())
}

/// Check a stubbed result against `spec`'s declared result type.
///
/// Members without a declared result type accept anything.
pub fn validate_outcome(
    spec: &MemberSpec,
    member: &str,
    value: &Value,
    coercion: NumericCoercion,
) -> Result<(), MockError> {
    match &spec.result {
        Some(expected) if !type_matches(value, expected, coercion) => Err(MockError::ReturnType {
            member: member.to_owned(),
            expected: expected.clone(),
            value: value.clone(),
        }),
        _ => Ok(()),
    }
}

/// Check a value written to a field against its declared type.
pub(crate) fn validate_field(
    spec: &MemberSpec,
    member: &str,
    value: &Value,
    coercion: NumericCoercion,
) -> Result<(), MockError> {
    check(member, &spec.name, spec.result.as_ref(), value, coercion)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use mimic_schema::TypeDescriptor;

    const LOSSLESS: NumericCoercion = NumericCoercion::Lossless;

    fn spec(desc: &TypeDescriptor, name: &str) -> MemberSpec {
        desc.member(name).unwrap().clone()
    }

    fn sample() -> TypeDescriptor {
        TypeDescriptor::builder("Random")
            .method("randint", |m| {
                m.param("a", TypeRef::Int)
                    .param("b", TypeRef::Int)
                    .returns(TypeRef::Int)
            })
            .method("sample", |m| {
                m.param("population", TypeRef::list(TypeRef::Any))
                    .var_args("extra", TypeRef::Int)
                    .keyword_optional("k", TypeRef::Int, 1)
                    .var_kwargs("options", TypeRef::Str)
                    .returns(TypeRef::list(TypeRef::Any))
            })
            .method("greet", |m| {
                m.param("name", TypeRef::Str)
                    .optional("loud", TypeRef::Bool, false)
                    .returns(TypeRef::Str)
            })
            .build()
            .unwrap()
    }

    fn mismatch(result: Result<(), MockError>) -> ArgumentMismatch {
        match result {
            Err(MockError::ArgumentType { mismatch, .. }) => mismatch,
            other => panic!("expected an argument error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_positional_and_keyword_binding() {
        let desc = sample();
        let randint = spec(&desc, "randint");
        assert!(validate_call(&randint, "r", &CallArgs::positional([1, 2]), LOSSLESS).is_ok());
        assert!(validate_call(&randint, "r", &CallArgs::new().arg(1).kwarg("b", 2), LOSSLESS).is_ok());
    }

    #[test]
    fn wrong_type_names_parameter() {
        let desc = sample();
        let greet = spec(&desc, "greet");
        let got = mismatch(validate_call(&greet, "g", &CallArgs::positional([42]), LOSSLESS));
        assert_eq!(
            got,
            ArgumentMismatch::WrongType {
                param: "name".into(),
                expected: TypeRef::Str,
                value: Value::Int(42),
            }
        );
    }

    #[test]
    fn arity_errors() {
        let desc = sample();
        let randint = spec(&desc, "randint");
        assert!(matches!(
            mismatch(validate_call(&randint, "r", &CallArgs::positional([1, 2, 3]), LOSSLESS)),
            ArgumentMismatch::TooManyPositional { max: 2, given: 3 }
        ));
        assert!(matches!(
            mismatch(validate_call(&randint, "r", &CallArgs::positional([1]), LOSSLESS)),
            ArgumentMismatch::Missing { .. }
        ));
        assert!(matches!(
            mismatch(validate_call(&randint, "r", &CallArgs::positional([1, 2]).kwarg("c", 3), LOSSLESS)),
            ArgumentMismatch::UnexpectedKeyword { .. }
        ));
        assert!(matches!(
            mismatch(validate_call(&randint, "r", &CallArgs::positional([1, 2]).kwarg("a", 3), LOSSLESS)),
            ArgumentMismatch::MultipleValues { .. }
        ));
    }

    #[test]
    fn variadics_check_every_element() {
        let desc = sample();
        let sample = spec(&desc, "sample");
        let ok = CallArgs::new()
            .arg(Value::list([1, 2]))
            .arg(3)
            .arg(4)
            .kwarg("k", 2)
            .kwarg("mode", "fast");
        assert!(validate_call(&sample, "s", &ok, LOSSLESS).is_ok());

        let bad_vararg = CallArgs::new().arg(Value::list([1])).arg("x");
        assert!(validate_call(&sample, "s", &bad_vararg, LOSSLESS).is_err());

        let bad_kwarg = CallArgs::new().arg(Value::list([1])).kwarg("mode", 1);
        let got = mismatch(validate_call(&sample, "s", &bad_kwarg, LOSSLESS));
        assert!(matches!(got, ArgumentMismatch::WrongType { ref param, .. } if param == "mode"));
    }

    #[test]
    fn numeric_coercion() {
        assert!(type_matches(&Value::Float(3.0), &TypeRef::Int, LOSSLESS));
        assert!(!type_matches(&Value::Float(3.0), &TypeRef::Int, NumericCoercion::Strict));
        assert!(!type_matches(&Value::Int(3), &TypeRef::Float, NumericCoercion::Strict));
        assert!(!type_matches(&Value::Bool(false), &TypeRef::Float, LOSSLESS));
        assert!(!type_matches(&Value::Float(f64::NAN), &TypeRef::Int, LOSSLESS));
    }

    #[test]
    fn integral_floats_must_fit_in_i64() {
        let two_pow_63 = 9_223_372_036_854_775_808.0_f64;
        assert!(!type_matches(&Value::Float(two_pow_63), &TypeRef::Int, LOSSLESS));
        assert!(type_matches(&Value::Float(-two_pow_63), &TypeRef::Int, LOSSLESS));
        assert!(type_matches(&Value::Float(2f64.powi(62)), &TypeRef::Int, LOSSLESS));
        assert!(!type_matches(&Value::Float(f64::INFINITY), &TypeRef::Int, LOSSLESS));
    }

    #[test]
    fn containers_and_named_types() {
        let ints = TypeRef::list(TypeRef::Int);
        assert!(type_matches(&Value::list([1, 2]), &ints, LOSSLESS));
        assert!(!type_matches(&Value::list(["a"]), &ints, LOSSLESS));
        assert!(!type_matches(&Value::tuple([1, 2]), &ints, LOSSLESS));

        let pair = TypeRef::Tuple(vec![TypeRef::Int, TypeRef::Str]);
        assert!(type_matches(&Value::tuple([Value::Int(1), Value::from("a")]), &pair, LOSSLESS));
        assert!(!type_matches(&Value::tuple([1]), &pair, LOSSLESS));

        let point = Value::object("geo.Point", [("x", 1)]);
        assert!(type_matches(&point, &TypeRef::named("Point"), LOSSLESS));
        assert!(!type_matches(&point, &TypeRef::named("Line"), LOSSLESS));
    }

    #[test]
    fn outcome_respects_declared_result() {
        let desc = sample();
        let randint = spec(&desc, "randint");
        assert!(validate_outcome(&randint, "r", &Value::Int(4), LOSSLESS).is_ok());
        assert!(matches!(
            validate_outcome(&randint, "r", &Value::from("four"), LOSSLESS),
            Err(MockError::ReturnType { .. })
        ));
    }
}
