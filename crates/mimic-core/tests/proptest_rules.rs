// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Property tests for outcome sequencing and rule shadowing.

use mimic_core::{mock, that, when, CallArgs};
use mimic_dry_tests::random_descriptor;
use mimic_schema::Value;
use proptest::prelude::*;

proptest! {
    #[test]
    fn sequence_yields_in_order_then_repeats_last(
        outcomes in prop::collection::vec(any::<i64>(), 1..8),
        extra in 0usize..8,
    ) {
        let rng = mock(&random_descriptor(), None);
        let member = rng.member("randint").unwrap();
        when(member).any_call().then_return_many(outcomes.clone()).unwrap();

        let total = outcomes.len() + extra;
        for i in 0..total {
            let got = member.call(CallArgs::positional([0, 1])).unwrap();
            let want = outcomes[i.min(outcomes.len() - 1)];
            prop_assert_eq!(got, Value::Int(want));
        }
        prop_assert_eq!(that(member).num_calls(), total);
    }

    #[test]
    fn predicate_shadows_fallback_exactly_where_it_matches(
        threshold in -50i64..50,
        inputs in prop::collection::vec(-100i64..100, 0..16),
    ) {
        let rng = mock(&random_descriptor(), None);
        let member = rng.member("randint").unwrap();
        when(member).any_call().then_return(-1).unwrap();
        when(member)
            .call_matching(move |call| call.get(0).and_then(Value::as_int).is_some_and(|a| a > threshold))
            .then_return(1)
            .unwrap();

        for a in &inputs {
            let got = member.call(CallArgs::positional([*a, 0])).unwrap();
            let want = if *a > threshold { 1 } else { -1 };
            prop_assert_eq!(got, Value::Int(want));
        }
        let recorded: Vec<Value> = that(member)
            .all_calls()
            .into_iter()
            .map(|call| call.args[0].clone())
            .collect();
        prop_assert_eq!(recorded, inputs.into_iter().map(Value::Int).collect::<Vec<_>>());
    }

    #[test]
    fn ill_typed_calls_never_touch_the_log(garbage in "[a-z]{0,8}") {
        let rng = mock(&random_descriptor(), None);
        let member = rng.member("randint").unwrap();
        let call = CallArgs::positional([garbage.as_str(), "x"]);
        prop_assert!(member.call(call).is_err());
        prop_assert!(!that(member).was_called());
    }
}
