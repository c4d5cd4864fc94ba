use bson::{Bson, doc};
use docquery::features::QueryDescriptor;
use docquery::query::{CmpOp, Filter, FilterLimits, eval_filter, parse_filter_json, parse_filter_object};
use proptest::prelude::*;

proptest! {
    #![proptest_config(proptest::test_runner::Config {
        failure_persistence: Some(Box::new(proptest::test_runner::FileFailurePersistence::WithSource("proptest-regressions"))),
        .. proptest::test_runner::Config::default()
    })]
    #[test]
    fn prop_parser_never_panics(s in "\\PC{0,64}") {
        let _ = parse_filter_json(&s, &FilterLimits::default());
    }

    // Field names and values full of operator words are never rewritten.
    #[test]
    fn prop_operator_words_stay_literal(name in "(gt|gte|lt|in|x){1,4}", value in "(gt|lte|in|\\$gt|y){1,4}") {
        let json = serde_json::json!({ name.clone(): value.clone() }).to_string();
        let f = parse_filter_json(&json, &FilterLimits::default()).unwrap();
        prop_assert_eq!(&f, &Filter::Cmp { path: name.clone(), op: CmpOp::Eq, value: Bson::String(value.clone()) });
        let mut d = bson::Document::new();
        d.insert(name.clone(), value.clone());
        prop_assert!(eval_filter(&d, &f));
    }

    #[test]
    fn prop_gt_filter_agrees_with_integer_order(x in any::<i32>(), bound in any::<i32>()) {
        let d = QueryDescriptor::from_pairs([("price[gt]", bound.to_string())]);
        let f = parse_filter_object(&d.residual_filter().unwrap(), &FilterLimits::default()).unwrap();
        prop_assert_eq!(eval_filter(&doc! {"price": x}, &f), x > bound);
        prop_assert_eq!(eval_filter(&doc! {"price": f64::from(x)}, &f), x > bound);
    }

    #[test]
    fn prop_dollar_prefixed_top_level_is_rejected(name in "\\$[a-z]{1,8}") {
        let json = serde_json::json!({ name: 1 }).to_string();
        prop_assert!(parse_filter_json(&json, &FilterLimits::default()).unwrap_err().is_bad_request());
    }
}
