//! Unit tests for the identifier newtypes

use core_kernel::{BrokerId, ConsentId, EventId, ListingId, ReviewerId};
use uuid::Uuid;

mod broker_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        let id1 = BrokerId::new();
        let id2 = BrokerId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = BrokerId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = BrokerId::new_v7();
        assert!(id1 < id2);
    }

    #[test]
    fn test_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = BrokerId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn test_display_format() {
        let id = BrokerId::new();
        assert!(id.to_string().starts_with("BRK-"));
    }
}

mod parsing {
    use super::*;

    #[test]
    fn test_from_str_with_prefix() {
        let original = ListingId::new();
        let parsed: ListingId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_from_str_without_prefix() {
        let uuid = Uuid::new_v4();
        let parsed: ConsentId = uuid.to_string().parse().unwrap();
        assert_eq!(*parsed.as_uuid(), uuid);
    }

    #[test]
    fn test_from_str_rejects_garbage() {
        assert!("CNS-not-a-uuid".parse::<ConsentId>().is_err());
        assert!("".parse::<ListingId>().is_err());
    }
}

mod prefixes {
    use super::*;

    #[test]
    fn test_all_prefixes() {
        assert_eq!(BrokerId::prefix(), "BRK");
        assert_eq!(ReviewerId::prefix(), "REV");
        assert_eq!(ConsentId::prefix(), "CNS");
        assert_eq!(ListingId::prefix(), "LST");
        assert_eq!(EventId::prefix(), "EVT");
    }
}

mod serde_tests {
    use super::*;

    #[test]
    fn test_serializes_as_bare_uuid() {
        let uuid = Uuid::new_v4();
        let id = ListingId::from_uuid(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
    }
}
