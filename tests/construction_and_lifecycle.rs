//! Scenario A/B: construction parameter validation and basic put/get/
//! remove/clear lifecycle.
//!
//! Run individual tests with:
//! cargo test construction_rejects -- --nocapture
//! cargo test basic_lifecycle -- --nocapture
//! cargo test null_key_rejection -- --nocapture

use elastic_hash::{ElasticMap, MapError};

fn setup_map() -> ElasticMap<u64, String> {
    ElasticMap::new(16, 0.125).unwrap()
}

mod construction_rejects_bad_parameters {
    use super::*;

    #[test]
    fn zero_capacity_is_rejected() {
        let result: Result<ElasticMap<u64, u64>, _> = ElasticMap::new(0, 0.125);
        assert_eq!(result.unwrap_err(), MapError::InvalidCapacity(0));
    }

    #[test]
    fn delta_outside_open_unit_interval_is_rejected() {
        let too_low: Result<ElasticMap<u64, u64>, _> = ElasticMap::new(16, 0.0);
        let too_high: Result<ElasticMap<u64, u64>, _> = ElasticMap::new(16, 1.0);
        let negative: Result<ElasticMap<u64, u64>, _> = ElasticMap::new(16, -0.1);
        assert!(too_low.is_err());
        assert!(too_high.is_err());
        assert!(negative.is_err());
    }

    #[test]
    fn valid_parameters_construct_with_requested_minimum_capacity() {
        let map: ElasticMap<u64, u64> = ElasticMap::new(10, 0.2).unwrap();
        assert!(map.capacity() >= 10);
        assert_eq!(map.len(), 0);
        assert!(map.is_empty());
    }
}

mod basic_lifecycle {
    use super::*;

    #[test]
    fn put_then_get_then_remove() {
        let mut map = setup_map();

        assert_eq!(map.put(1, "one".to_string()).unwrap(), None);
        assert_eq!(map.get(&1).unwrap(), Some(&"one".to_string()));
        assert_eq!(map.len(), 1);

        let removed = map.remove(&1).unwrap();
        assert_eq!(removed, Some("one".to_string()));
        assert_eq!(map.get(&1).unwrap(), None);
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn put_on_existing_key_overwrites_and_returns_previous_value() {
        let mut map = setup_map();
        map.put(5, "first".to_string()).unwrap();
        let previous = map.put(5, "second".to_string()).unwrap();
        assert_eq!(previous, Some("first".to_string()));
        assert_eq!(map.get(&5).unwrap(), Some(&"second".to_string()));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn removing_an_absent_key_is_a_harmless_none() {
        let mut map = setup_map();
        assert_eq!(map.remove(&999).unwrap(), None);
    }

    #[test]
    fn clear_empties_the_map_but_keeps_capacity() {
        let mut map = setup_map();
        for i in 0..8u64 {
            map.put(i, i.to_string()).unwrap();
        }
        let cap_before = map.capacity();
        map.clear();
        assert_eq!(map.len(), 0);
        assert!(map.is_empty());
        assert_eq!(map.capacity(), cap_before);
        for i in 0..8u64 {
            assert_eq!(map.get(&i).unwrap(), None);
        }
    }
}

mod null_key_rejection {
    use super::*;

    #[test]
    fn option_none_key_is_rejected_on_every_operation() {
        let mut map: ElasticMap<Option<u64>, &str> = ElasticMap::new(8, 0.125).unwrap();
        assert_eq!(map.put(None, "x").unwrap_err(), MapError::NullKey);
        assert_eq!(map.get(&None).unwrap_err(), MapError::NullKey);
        assert_eq!(map.remove(&None).unwrap_err(), MapError::NullKey);

        map.put(Some(1), "ok").unwrap();
        assert_eq!(map.get(&Some(1)).unwrap(), Some(&"ok"));
    }
}
