use rust_decimal::Decimal;

use super::*;

const USER: Coordinate = Coordinate {
    lat: -29.9050,
    lng: -71.2520,
};
const NEAR: Coordinate = Coordinate {
    lat: -29.9027,
    lng: -71.2519,
};
const FAR: Coordinate = Coordinate {
    lat: -29.9534,
    lng: -71.3398,
};
const MADRID: Coordinate = Coordinate {
    lat: 40.4168,
    lng: -3.7038,
};

fn offer(key: &str, id: u64, seller: &str, price: i64) -> Offer {
    Offer {
        product_key: key.to_owned(),
        product_id: id,
        product_name: key.to_owned(),
        seller_id: seller.to_owned(),
        price: Decimal::from(price),
        quantity_available: 10,
        seller_coordinate: None,
    }
}

fn seller(id: &str, coordinate: Option<Coordinate>) -> SellerLocation {
    SellerLocation {
        seller_id: id.to_owned(),
        name: format!("Store {id}"),
        address: None,
        coordinate,
    }
}

/// Small deterministic generator so the partition/minimum properties run over
/// many shapes of input without pulling in a property-testing crate.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }
}

fn random_catalog(rng: &mut Lcg) -> (Vec<Offer>, Vec<SellerLocation>) {
    let sellers: Vec<SellerLocation> = (0..5)
        .map(|i| {
            let coordinate = if rng.below(4) == 0 {
                None
            } else {
                #[allow(clippy::cast_precision_loss)]
                let jitter = rng.below(1000) as f64 / 10_000.0;
                Some(Coordinate {
                    lat: -29.90 - jitter,
                    lng: -71.25 - jitter,
                })
            };
            seller(&format!("s{i}"), coordinate)
        })
        .collect();

    let count = rng.below(30);
    let offers = (0..count)
        .map(|id| {
            let key = format!("sku-{}", rng.below(6));
            let seller_id = format!("s{}", rng.below(5));
            #[allow(clippy::cast_possible_wrap)]
            let price = (rng.below(20) * 1000) as i64;
            offer(&key, id, &seller_id, price)
        })
        .collect();

    (offers, sellers)
}

#[test]
fn product_key_prefers_sku() {
    assert_eq!(
        product_key(Some(" TALADRO-001 "), "Taladro Percutor"),
        Some("TALADRO-001".to_owned())
    );
}

#[test]
fn product_key_normalizes_name_when_sku_blank() {
    assert_eq!(product_key(None, "Martillo"), product_key(Some("  "), " martillo "));
    assert_eq!(product_key(None, " MARTILLO "), Some("martillo".to_owned()));
}

#[test]
fn product_key_none_when_everything_blank() {
    assert_eq!(product_key(Some(""), "   "), None);
}

#[test]
fn group_offers_empty_input_is_empty() {
    assert!(group_offers(&[]).expect("empty ok").is_empty());
}

#[test]
fn group_offers_merges_case_and_whitespace_variants() {
    let a = product_key(None, "Martillo").expect("key");
    let b = product_key(None, " martillo ").expect("key");
    let groups = group_offers(&[offer(&a, 1, "s1", 100), offer(&b, 2, "s2", 90)]).expect("valid");
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].0, "martillo");
    assert_eq!(groups[0].1.len(), 2);
}

#[test]
fn group_offers_preserves_first_appearance_and_member_order() {
    let offers = vec![
        offer("b", 1, "s1", 10),
        offer("a", 2, "s1", 10),
        offer("b", 3, "s2", 10),
        offer("a", 4, "s3", 10),
    ];
    let groups = group_offers(&offers).expect("valid");
    let keys: Vec<&str> = groups.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, ["b", "a"]);
    let ids: Vec<u64> = groups[0].1.iter().map(|o| o.product_id).collect();
    assert_eq!(ids, [1, 3]);
}

#[test]
fn group_offers_rejects_negative_price() {
    let err = group_offers(&[offer("a", 7, "s1", -1)]).unwrap_err();
    assert!(matches!(err, CoreError::NegativePrice { product_id: 7, .. }));
}

#[test]
fn group_offers_rejects_blank_key() {
    let err = group_offers(&[offer("  ", 9, "s1", 10)]).unwrap_err();
    assert_eq!(err, CoreError::EmptyProductKey { product_id: 9 });
}

#[test]
fn group_offers_rejects_bad_seller_coordinate() {
    let mut bad = offer("a", 1, "s1", 10);
    bad.seller_coordinate = Some(Coordinate {
        lat: 120.0,
        lng: 0.0,
    });
    assert!(matches!(
        group_offers(&[bad]),
        Err(CoreError::InvalidCoordinate { .. })
    ));
}

#[test]
fn hammer_cheapest_and_nearest_differ() {
    let offers = vec![offer("hammer", 1, "A", 9990), offer("hammer", 2, "B", 7990)];
    let sellers = vec![seller("A", Some(NEAR)), seller("B", Some(FAR))];

    let groups = rank_all_groups(&offers, &sellers, USER, None).expect("valid");
    assert_eq!(groups.len(), 1);
    let group = &groups[0];
    assert_eq!(group.product_key, "hammer");
    assert_eq!(group.offer_count(), 2);
    assert_eq!(group.cheapest.offer.seller_id, "B");
    assert_eq!(group.nearest.offer.seller_id, "A");
    assert_eq!(group.most_expensive.offer.seller_id, "A");
    assert!(!group.is_exclusive);
    assert!(!group.cheapest_is_nearest());
    assert_eq!(group.price_spread(), Decimal::from(2000));
}

#[test]
fn saw_single_offer_is_exclusive() {
    let offers = vec![offer("saw", 1, "C", 109_990)];
    let group =
        build_offer_group("saw", &offers, &[seller("C", Some(FAR))], USER).expect("valid");
    assert!(group.is_exclusive);
    assert_eq!(group.cheapest, group.offers[0]);
    assert_eq!(group.nearest, group.offers[0]);
    assert_eq!(group.most_expensive, group.offers[0]);
    assert!(group.cheapest_is_nearest());
}

#[test]
fn drill_without_coordinate_gets_sentinel() {
    let offers = vec![offer("drill", 1, "D", 5000)];
    let group = build_offer_group("drill", &offers, &[seller("D", None)], USER).expect("valid");
    assert!((group.offers[0].distance_meters - UNKNOWN_DISTANCE_METERS).abs() < f64::EPSILON);
    assert!(!group.offers[0].distance_known);
    assert_eq!(group.nearest, group.offers[0]);
}

#[test]
fn unknown_seller_is_not_an_error() {
    let offers = vec![offer("drill", 1, "ghost", 5000)];
    let group = build_offer_group("drill", &offers, &[], USER).expect("valid");
    assert!(!group.nearest.distance_known);
}

#[test]
fn offer_coordinate_used_when_seller_missing_from_directory() {
    let mut listed = offer("drill", 1, "walk-in", 5000);
    listed.seller_coordinate = Some(NEAR);
    let group = build_offer_group("drill", &[listed], &[], USER).expect("valid");
    assert!(group.nearest.distance_known);
    assert!(group.nearest.distance_meters < 1000.0);
}

#[test]
fn directory_coordinate_wins_over_offer_coordinate() {
    let mut listed = offer("drill", 1, "A", 5000);
    listed.seller_coordinate = Some(MADRID);
    let group = build_offer_group("drill", &[listed], &[seller("A", Some(NEAR))], USER)
        .expect("valid");
    assert!(group.nearest.distance_meters < 1000.0);
}

#[test]
fn sentinel_never_beats_real_distance_even_when_far() {
    // Madrid is ~10 000 km from La Serena, well past the sentinel value.
    let offers = vec![offer("level", 1, "nowhere", 100), offer("level", 2, "spain", 200)];
    let sellers = vec![seller("nowhere", None), seller("spain", Some(MADRID))];
    let group = build_offer_group("level", &offers, &sellers, USER).expect("valid");
    assert!(group.nearest.distance_meters > UNKNOWN_DISTANCE_METERS);
    assert_eq!(group.nearest.offer.seller_id, "spain");
}

#[test]
fn ties_resolve_to_first_occurrence() {
    let offers = vec![
        offer("tape", 1, "A", 4990),
        offer("tape", 2, "B", 4990),
        offer("tape", 3, "C", 4990),
    ];
    let sellers = vec![
        seller("A", Some(NEAR)),
        seller("B", Some(NEAR)),
        seller("C", Some(NEAR)),
    ];
    let group = build_offer_group("tape", &offers, &sellers, USER).expect("valid");
    assert_eq!(group.cheapest.offer.product_id, 1);
    assert_eq!(group.nearest.offer.product_id, 1);
    assert_eq!(group.most_expensive.offer.product_id, 1);
}

#[test]
fn build_offer_group_rejects_empty_members() {
    let err = build_offer_group("nothing", &[], &[], USER).unwrap_err();
    assert_eq!(
        err,
        CoreError::EmptyGroup {
            product_key: "nothing".to_owned()
        }
    );
}

#[test]
fn rank_rejects_invalid_user_coordinate() {
    let bad_user = Coordinate {
        lat: f64::NAN,
        lng: 0.0,
    };
    assert!(rank_all_groups(&[], &[], bad_user, None).is_err());
}

#[test]
fn rank_all_groups_empty_is_empty() {
    assert!(rank_all_groups(&[], &[], USER, None)
        .expect("empty ok")
        .is_empty());
}

#[test]
fn rank_orders_by_nearest_with_unknown_last() {
    let offers = vec![
        offer("unknown-only", 1, "X", 10),
        offer("far", 2, "F", 10),
        offer("near", 3, "N", 10),
    ];
    let sellers = vec![
        seller("X", None),
        seller("F", Some(FAR)),
        seller("N", Some(NEAR)),
    ];
    let groups = rank_all_groups(&offers, &sellers, USER, None).expect("valid");
    let keys: Vec<&str> = groups.iter().map(|g| g.product_key.as_str()).collect();
    assert_eq!(keys, ["near", "far", "unknown-only"]);
}

#[test]
fn limit_truncates_groups_not_offers() {
    let offers = vec![
        offer("near", 1, "N", 10),
        offer("far", 2, "F", 10),
        offer("near", 3, "F", 5),
        offer("near", 4, "X", 7),
    ];
    let sellers = vec![
        seller("N", Some(NEAR)),
        seller("F", Some(FAR)),
        seller("X", None),
    ];
    let groups = rank_all_groups(&offers, &sellers, USER, Some(1)).expect("valid");
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].product_key, "near");
    assert_eq!(groups[0].offer_count(), 3);
    assert_eq!(groups[0].cheapest.offer.product_id, 3);
}

#[test]
fn offers_by_price_sorts_ascending_and_stable() {
    let offers = vec![
        offer("k", 1, "A", 30),
        offer("k", 2, "B", 10),
        offer("k", 3, "C", 10),
    ];
    let group = build_offer_group("k", &offers, &[], USER).expect("valid");
    let ids: Vec<u64> = group
        .offers_by_price()
        .iter()
        .map(|o| o.offer.product_id)
        .collect();
    assert_eq!(ids, [2, 3, 1]);
}

#[test]
fn grouping_partitions_every_offer() {
    let mut rng = Lcg(7);
    for _ in 0..200 {
        let (offers, _) = random_catalog(&mut rng);
        let groups = group_offers(&offers).expect("valid");
        let total: usize = groups.iter().map(|(_, members)| members.len()).sum();
        assert_eq!(total, offers.len());
        for offer in &offers {
            let holders = groups
                .iter()
                .filter(|(_, members)| members.contains(offer))
                .count();
            assert_eq!(holders, 1, "offer {} in {holders} groups", offer.product_id);
        }
        assert!(groups.iter().all(|(_, members)| !members.is_empty()));
    }
}

#[test]
fn picks_are_true_extrema_and_exclusivity_matches_size() {
    let mut rng = Lcg(42);
    for _ in 0..200 {
        let (offers, sellers) = random_catalog(&mut rng);
        for group in rank_all_groups(&offers, &sellers, USER, None).expect("valid") {
            assert_eq!(group.is_exclusive, group.offers.len() == 1);
            for member in &group.offers {
                assert!(member.offer.price >= group.cheapest.offer.price);
                assert!(member.offer.price <= group.most_expensive.offer.price);
                if member.distance_known {
                    assert!(group.nearest.distance_known);
                    assert!(member.distance_meters >= group.nearest.distance_meters);
                }
            }
        }
    }
}
