// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! End-to-end scenarios: stub, call, verify.

use mimic_core::{
    mock, that, when, ArgumentMismatch, CallArgs, CallSummary, MockError, PropertyCell,
};
use mimic_dry_tests::{init_test_tracing, philosopher_descriptor, random_descriptor};
use mimic_schema::{TypeRef, Value};

#[test]
fn fixed_value_is_returned_every_time() {
    init_test_tracing();
    let rng = mock(&random_descriptor(), None);
    when(rng.member("random").unwrap())
        .any_call()
        .then_return(0.25)
        .unwrap();

    assert_eq!(rng.call("random", CallArgs::new()).unwrap(), Value::Float(0.25));
    assert_eq!(rng.call("random", CallArgs::new()).unwrap(), Value::Float(0.25));
    assert_eq!(that(rng.member("random").unwrap()).num_calls(), 2);
}

#[test]
fn fixed_text_is_returned_for_every_call() {
    let p = mock(&philosopher_descriptor(), Some("socrates"));
    when(p.member("think").unwrap())
        .any_call()
        .then_return("X")
        .unwrap();
    let think = p.member("think").unwrap();
    assert_eq!(think.call(CallArgs::positional(["ethics"])).unwrap(), Value::from("X"));
    assert_eq!(think.call(CallArgs::positional(["logic"])).unwrap(), Value::from("X"));
    assert_eq!(that(think).num_calls(), 2);
}

#[test]
fn sequence_cycles_then_sticks() {
    let rng = mock(&random_descriptor(), None);
    when(rng.member("randint").unwrap())
        .any_call()
        .then_return_many([1, 2, 3])
        .unwrap();
    let results: Vec<Value> = (0..4)
        .map(|_| rng.call("randint", CallArgs::positional([1, 10])).unwrap())
        .collect();
    assert_eq!(results, [1, 2, 3, 3].map(Value::Int));
}

#[test]
fn predicate_shadows_fallback_for_matching_inputs() {
    let p = mock(&philosopher_descriptor(), None);
    let think = p.member("think").unwrap();
    when(think).any_call().then_return("small").unwrap();
    when(think)
        .call_matching(|call| {
            call.keyword("depth")
                .or_else(|| call.get(1))
                .and_then(Value::as_int)
                .is_some_and(|depth| depth > 10)
        })
        .then_return("big")
        .unwrap();

    assert_eq!(think.call(CallArgs::positional(["t"]).arg(5)).unwrap(), Value::from("small"));
    assert_eq!(think.call(CallArgs::positional(["t"]).arg(20)).unwrap(), Value::from("big"));
    assert_eq!(
        think.call(CallArgs::positional(["t"]).kwarg("depth", 11)).unwrap(),
        Value::from("big")
    );
}

#[test]
fn wrong_argument_type_is_rejected_and_not_logged() {
    let p = mock(&philosopher_descriptor(), Some("plato"));
    let think = p.member("think").unwrap();
    let err = think.call(CallArgs::positional([42])).unwrap_err();
    match &err {
        MockError::ArgumentType {
            member,
            mismatch: ArgumentMismatch::WrongType { param, expected, value },
        } => {
            assert_eq!(member, "Philosopher#plato.think");
            assert_eq!(param, "topic");
            assert_eq!(*expected, TypeRef::Str);
            assert_eq!(*value, Value::Int(42));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let message = err.to_string();
    assert!(message.contains("expects str"), "{message}");
    assert!(message.contains("42 (int)"), "{message}");
    assert_eq!(that(think).num_calls(), 0);
}

#[test]
fn last_call_before_and_after() {
    let p = mock(&philosopher_descriptor(), None);
    let think = p.member("think").unwrap();
    assert!(matches!(that(think).last_call(), Err(MockError::NoCallsRecorded { .. })));

    think.call(CallArgs::positional(["a"])).unwrap();
    assert_eq!(
        that(think).last_call().unwrap(),
        CallSummary::Args(vec![Value::from("a")])
    );
}

#[test]
fn defaults_follow_declared_result_types() {
    let rng = mock(&random_descriptor(), None);
    assert_eq!(rng.call("random", CallArgs::new()).unwrap(), Value::Float(0.0));
    assert_eq!(rng.call("randint", CallArgs::positional([1, 2])).unwrap(), Value::Int(0));
    assert_eq!(rng.call("seed", CallArgs::new()).unwrap(), Value::None);
    assert_eq!(rng.call("choice", CallArgs::positional([Value::list([1])])).unwrap(), Value::None);
    assert_eq!(
        rng.call("sample", CallArgs::positional([Value::list([1])])).unwrap(),
        Value::List(Vec::new())
    );
    let p = mock(&philosopher_descriptor(), None);
    assert_eq!(p.call("think", CallArgs::positional(["x"])).unwrap(), Value::from(""));
    assert_eq!(p.call("on_idea", CallArgs::positional(["x"])).unwrap(), Value::Bool(false));
}

#[test]
fn fields_read_back_written_values() {
    let p = mock(&philosopher_descriptor(), None);
    assert!(matches!(p.get("age"), Err(MockError::UnsetFieldAccess { .. })));
    p.set("age", 2400).unwrap();
    assert_eq!(p.get("age").unwrap(), Value::Int(2400));

    let err = p.set("age", "old").unwrap_err();
    assert!(matches!(err, MockError::ArgumentType { .. }));
    assert_eq!(p.get("age").unwrap(), Value::Int(2400));

    p.set("nickname", Value::None).unwrap();
    assert_eq!(p.get("nickname").unwrap(), Value::None);
}

#[test]
fn property_reads_are_counted_but_writes_are_not() {
    let p = mock(&philosopher_descriptor(), None);
    let cell = PropertyCell::new("unknown");
    mimic_core::stub(&p).property("meaning_of_life", cell.clone()).unwrap();
    let prop = p.member("meaning_of_life").unwrap();

    assert_eq!(p.get("meaning_of_life").unwrap(), Value::from("unknown"));
    assert_eq!(p.get("meaning_of_life").unwrap(), Value::from("unknown"));
    assert_eq!(that(prop).num_calls(), 2);

    cell.write_return_value("42").unwrap();
    assert_eq!(that(prop).num_calls(), 2);
    assert_eq!(p.get("meaning_of_life").unwrap(), Value::from("42"));
    assert_eq!(that(prop).num_calls(), 3);
    assert_eq!(that(prop).last_call().unwrap(), CallSummary::Args(Vec::new()));
}
