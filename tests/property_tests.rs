/// Property-based tests using proptest
/// Tests invariants and properties that should hold for all inputs
use proptest::prelude::*;
use people_service::db_storage::build_people_query;
use people_service::filter::{FilterKey, FilterSpec};
use people_service::models::CountryCandidate;
use people_service::services::most_probable_country;
use std::collections::HashMap;

fn candidates() -> impl Strategy<Value = Vec<CountryCandidate>> {
    prop::collection::vec(("[A-Z]{2}", 0.0f64..=1.0f64), 0..12).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(country_id, probability)| CountryCandidate {
                country_id,
                probability,
            })
            .collect()
    })
}

fn filter_key() -> impl Strategy<Value = FilterKey> {
    prop::sample::select(FilterKey::ALL.to_vec())
}

// Property: the chosen country is the first one with the highest probability
proptest! {
    #[test]
    fn most_probable_country_is_first_maximum(list in candidates()) {
        match most_probable_country(&list) {
            None => prop_assert!(list.is_empty()),
            Some(best) => {
                let max = list.iter().map(|c| c.probability).fold(f64::MIN, f64::max);
                prop_assert_eq!(best.probability, max);
                let first = list.iter().position(|c| c.probability == max).unwrap();
                prop_assert!(std::ptr::eq(best, &list[first]));
            }
        }
    }
}

// Property: building a filter from arbitrary query parameters never panics
proptest! {
    #[test]
    fn filter_from_params_never_panics(
        params in prop::collection::hash_map("\\PC{0,12}", "\\PC{0,12}", 0..10)
    ) {
        let spec = FilterSpec::from_params(&params);
        prop_assert!(spec.constraints().all(|(_, v)| !v.is_empty()));
    }

    #[test]
    fn non_negative_pagination_round_trips(offset in 0i64..1_000_000, limit in 0i64..1_000_000) {
        let params: HashMap<String, String> = [
            ("offset".to_string(), offset.to_string()),
            ("limit".to_string(), limit.to_string()),
        ]
        .into_iter()
        .collect();
        let spec = FilterSpec::from_params(&params);
        prop_assert_eq!(spec.offset, Some(offset));
        prop_assert_eq!(spec.limit, Some(limit));
    }

    #[test]
    fn non_numeric_pagination_is_dropped(raw in "[a-zA-Z_ ]{1,10}") {
        let params: HashMap<String, String> =
            [("offset".to_string(), raw.clone()), ("limit".to_string(), raw)]
                .into_iter()
                .collect();
        let spec = FilterSpec::from_params(&params);
        prop_assert_eq!(spec.offset, None);
        prop_assert_eq!(spec.limit, None);
    }
}

// Property: every applicable constraint and pagination value is a placeholder, never inlined;
// malformed integer constraints are dropped rather than emptying the result
proptest! {
    #[test]
    fn placeholders_match_bound_values(
        entries in prop::collection::vec((filter_key(), "[a-z]{1,8}|[0-9]{1,5}"), 0..7),
        limit in proptest::option::of(0i64..100),
        offset in proptest::option::of(0i64..100),
    ) {
        let mut filter = FilterSpec::new();
        for (key, value) in &entries {
            filter.set(*key, value.clone());
        }
        filter.limit = limit;
        filter.offset = offset;

        let expected = filter
            .constraints()
            .filter(|(key, value)| !key.is_integer() || value.parse::<i32>().is_ok())
            .count()
            + usize::from(limit.is_some())
            + usize::from(offset.is_some());

        let query = build_people_query(&filter);
        let sql = query.sql();
        prop_assert!(!sql.contains("FALSE"));
        let placeholders = sql.matches('$').count();
        prop_assert_eq!(placeholders, expected);
        for n in 1..=expected {
            let placeholder = format!("${}", n);
            prop_assert!(sql.contains(&placeholder));
        }
    }

    #[test]
    fn filter_values_never_reach_sql(value in "[a-z';\\- ]{3,20}") {
        prop_assume!(!value.trim().is_empty());
        let marker = format!("zz{}zz", value);
        let filter = FilterSpec::new()
            .with(FilterKey::Name, marker.clone())
            .with(FilterKey::Gender, marker.clone());
        let query = build_people_query(&filter);
        prop_assert!(!query.sql().contains(&marker));
        prop_assert!(query.sql().contains("name = $1 AND gender = $2"));
    }
}
