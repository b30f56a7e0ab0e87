//! Property tests for family routing, idempotence and the retention floor.

use proptest::prelude::*;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;
use wafguard::admission::merge_network;
use wafguard::retention::{classify_actor, MIN_RETENTION_MINUTES};
use wafguard::{ActorClass, AdmissionController, RetentionWindow};
use wafguard_client::memory::MemorySetStore;
use wafguard_core::{AddressFamily, FamilySets, IpSetRef, ObservedAddress, Scope};

fn sets() -> FamilySets {
    FamilySets {
        v4: IpSetRef::new("badbot-v4", "id-4"),
        v6: IpSetRef::new("badbot-v6", "id-6"),
    }
}

fn any_ip() -> impl Strategy<Value = IpAddr> {
    prop_oneof![
        any::<u32>().prop_map(|bits| IpAddr::V4(Ipv4Addr::from(bits))),
        any::<u128>().prop_map(|bits| IpAddr::V6(Ipv6Addr::from(bits))),
    ]
}

proptest! {
    /// Property: an address only ever lands in its own family's set
    #[test]
    fn prop_family_routing(ip in any_ip()) {
        let store = Arc::new(
            MemorySetStore::new()
                .with_set(Scope::Regional, &sets().v4, Vec::<String>::new())
                .with_set(Scope::Regional, &sets().v6, Vec::<String>::new()),
        );
        let controller = AdmissionController::new(store.clone());
        let address = ObservedAddress::from(ip);

        let (v4, v6) = tokio_test::block_on(async {
            controller.admit(Scope::Regional, address, &sets()).await.unwrap();
            (
                store.addresses(Scope::Regional, &sets().v4).await.unwrap(),
                store.addresses(Scope::Regional, &sets().v6).await.unwrap(),
            )
        });

        match address.family() {
            AddressFamily::V4 => {
                prop_assert_eq!(v4, vec![address.network()]);
                prop_assert!(v6.is_empty());
            }
            AddressFamily::V6 => {
                prop_assert_eq!(v6, vec![address.network()]);
                prop_assert!(v4.is_empty());
            }
        }
    }

    /// Property: merging the same network twice changes nothing the second time
    #[test]
    fn prop_merge_idempotent(
        existing in proptest::collection::vec(any::<u32>(), 0..20),
        ip in any::<u32>()
    ) {
        let current: Vec<String> = existing
            .iter()
            .map(|bits| ObservedAddress::from(IpAddr::V4(Ipv4Addr::from(*bits))).network())
            .collect();
        let network = ObservedAddress::from(IpAddr::V4(Ipv4Addr::from(ip))).network();

        let (once, _) = merge_network(&current, &network);
        let (twice, inserted) = merge_network(&once, &network);

        prop_assert!(!inserted);
        prop_assert_eq!(&once, &twice);
        prop_assert!(once.contains(&network));
        prop_assert!(once.windows(2).all(|pair| pair[0] < pair[1]));
    }

    /// Property: a positive window is never persisted below the floor
    #[test]
    fn prop_retention_floor(minutes in -10_000i64..10_000) {
        match RetentionWindow::from_configured(minutes) {
            RetentionWindow::Disabled => prop_assert!(minutes <= 0),
            RetentionWindow::Minutes(effective) => {
                prop_assert!(minutes > 0);
                prop_assert!(effective >= MIN_RETENTION_MINUTES);
                if minutes >= i64::from(MIN_RETENTION_MINUTES) {
                    prop_assert_eq!(i64::from(effective), minutes);
                }
            }
        }
    }

    /// Property: only principals naming the reaper role are classified as the reaper
    #[test]
    fn prop_reaper_classification(account in "[0-9]{12}", user in "[a-z]{1,12}") {
        let reaper = format!("arn:aws:iam::{account}:role/waf-reaper");
        let person = format!("arn:aws:iam::{account}:user/{user}");
        prop_assert_eq!(classify_actor(&reaper, "waf-reaper"), ActorClass::ExpiryReaper);
        prop_assert_eq!(classify_actor(&person, "waf-reaper"), ActorClass::HumanOrOtherSystem);
    }
}
