// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Member kinds, descriptor sources, and per-mock settings.

use mimic_core::{
    mock, mock_of, mock_with, spy, stub, that, when, CallArgs, CallSummary, MockError,
    MockSettings, NumericCoercion, PropertyCell,
};
use mimic_dry_tests::{Philosopher, Random, RANDOM_SCHEMA_JSON};
use mimic_schema::{DescriptorCache, TypeDescriptor, Value};
use std::sync::Arc;

#[test]
fn mocks_share_a_cached_descriptor() {
    let cache = DescriptorCache::new();
    let a = mock_of::<Random>(&cache, None).unwrap();
    let b = mock_of::<Random>(&cache, Some("b")).unwrap();
    assert!(Arc::ptr_eq(a.descriptor(), b.descriptor()));
    assert_eq!(cache.len(), 1);
    assert_eq!(b.to_string(), "Mock[Random#b]");
    assert!(!a.ptr_eq(&b));
}

#[test]
fn json_schema_builds_an_equivalent_mock() {
    let desc = Arc::new(TypeDescriptor::from_json(RANDOM_SCHEMA_JSON).unwrap());
    let rng = mock(&desc, None);
    assert_eq!(
        rng.members(),
        ["random", "randint", "seed", "choice", "sample", "name"]
    );
    // `self` was stripped, so two arguments bind.
    assert!(rng.call("randint", CallArgs::positional([1, 2])).is_ok());
}

#[test]
fn missing_member_names_the_type() {
    let cache = DescriptorCache::new();
    let p = mock_of::<Philosopher>(&cache, Some("hume")).unwrap();
    let err = p.member("sleep").unwrap_err();
    assert_eq!(
        err.to_string(),
        "[MEMBER_NOT_FOUND] Philosopher#hume.sleep does not exist on the mocked type Philosopher"
    );
}

#[test]
fn variadic_arguments_are_validated_and_recorded() {
    let cache = DescriptorCache::new();
    let rng = mock_of::<Random>(&cache, None).unwrap();
    let population = Value::list(["a", "b", "c"]);
    let call = CallArgs::new()
        .arg(population.clone())
        .arg(7)
        .kwarg("k", 2)
        .kwarg("mode", "fast");
    rng.call("sample", call).unwrap();

    let err = rng
        .call("sample", CallArgs::new().arg(population.clone()).kwarg("mode", 1))
        .unwrap_err();
    assert!(matches!(err, MockError::ArgumentType { .. }));

    let view = spy(rng.member("sample").unwrap());
    assert_eq!(view.num_calls(), 1);
    match view.nth_call(0).unwrap() {
        CallSummary::WithKwargs(args, kwargs) => {
            assert_eq!(args, [population, Value::Int(7)]);
            assert_eq!(kwargs.get("k"), Some(&Value::Int(2)));
        }
        CallSummary::Args(args) => unreachable!("keywords were passed: {args:?}"),
    }
}

#[test]
fn property_cell_type_is_enforced() {
    let cache = DescriptorCache::new();
    let p = mock_of::<Philosopher>(&cache, None).unwrap();
    let bad = stub(&p).property("meaning_of_life", PropertyCell::new(42)).err();
    assert!(matches!(bad, Some(MockError::ReturnType { .. })));
    assert!(matches!(
        p.get("meaning_of_life"),
        Err(MockError::PropertyNotStubbed { .. })
    ));

    let cell = PropertyCell::new("forty-two");
    stub(&p).property("meaning_of_life", cell.clone()).unwrap();
    assert!(matches!(
        cell.write_return_value(42),
        Err(MockError::ReturnType { .. })
    ));
    assert!(p.set("meaning_of_life", 42).is_err());
    p.set("meaning_of_life", "42").unwrap();
    assert_eq!(cell.value(), Value::from("42"));
    // Neither write was a call.
    assert_eq!(that(p.member("meaning_of_life").unwrap()).num_calls(), 0);
}

#[test]
fn callable_members_dispatch_like_methods() {
    let cache = DescriptorCache::new();
    let p = mock_of::<Philosopher>(&cache, None).unwrap();
    let on_idea = p.member("on_idea").unwrap();
    when(on_idea)
        .call_matching(|call| call.get(0).and_then(Value::as_str).is_some_and(|s| s.contains("cave")))
        .then_return(true)
        .unwrap();
    assert_eq!(on_idea.call(CallArgs::positional(["the cave"])).unwrap(), Value::Bool(true));
    assert_eq!(on_idea.call(CallArgs::positional(["forms"])).unwrap(), Value::Bool(false));
    assert_eq!(that(on_idea).all_calls().len(), 2);
}

#[test]
fn strict_coercion_rejects_mixed_numbers() {
    let cache = DescriptorCache::new();
    let desc = cache.get::<Random>().unwrap();
    let settings = MockSettings::named("strict").with_coercion(NumericCoercion::Strict);
    let strict = mock_with(&desc, settings);
    let lossless = mock(&desc, None);

    let floaty = CallArgs::positional([1.0, 6.0]);
    assert!(lossless.call("randint", floaty.clone()).is_ok());
    assert!(strict.call("randint", floaty).is_err());
    assert!(lossless.call("randint", CallArgs::positional([1.5, 6.0])).is_err());

    assert!(when(lossless.member("random").unwrap()).any_call().then_return(1).is_ok());
    assert!(when(strict.member("random").unwrap()).any_call().then_return(1).is_err());
}

#[test]
fn settings_load_from_json() {
    let settings = MockSettings::from_json(r#"{ "name": "from-json" }"#).unwrap();
    assert_eq!(settings.coercion, NumericCoercion::Lossless);
    let cache = DescriptorCache::new();
    let rng = mock_with(&cache.get::<Random>().unwrap(), settings);
    assert_eq!(rng.label(), "Random#from-json");
}
