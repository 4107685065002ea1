//! End-to-end allocation tests: worked scenarios plus invariants checked over
//! seeded random markets.

use fragment_optimizer::{
    allocate, cmp_per_fragment, AllocationReport, CandidatePool, ItemCatalog, ItemDescriptor,
    ListingSnapshot, Optimizer, Price, PriceTier,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn tier(whole: u64, quantity: u64) -> PriceTier {
    PriceTier::new(Price::from_whole(whole), quantity)
}

fn single_item(fragment_yield: u32, tiers: Vec<PriceTier>) -> (ItemCatalog, ListingSnapshot) {
    let catalog = ItemCatalog::new(vec![ItemDescriptor::new(1, "Only", fragment_yield)]).unwrap();
    let listings = vec![(1, tiers)].into_iter().collect();
    (catalog, listings)
}

#[test]
fn scenario_exact_fill() {
    let (catalog, listings) = single_item(2, vec![tier(1, 5)]);
    let report = Optimizer::default().optimize(6, &catalog, &listings).unwrap();

    let only = report.item("Only").unwrap();
    assert_eq!(only.units, 3);
    assert_eq!(report.total_fragments, 6);
    assert_eq!(report.total_spent, Price::from_whole(3));
}

#[test]
fn scenario_overshoot_accepted() {
    let (catalog, listings) = single_item(4, vec![tier(1, 5)]);
    let report = Optimizer::default().optimize(6, &catalog, &listings).unwrap();

    assert_eq!(report.item("Only").unwrap().units, 2);
    assert_eq!(report.total_fragments, 8);
    assert_eq!(report.total_spent, Price::from_whole(2));
}

#[test]
fn scenario_cheaper_item_wins() {
    let catalog = ItemCatalog::new(vec![
        ItemDescriptor::new(1, "A", 1),
        ItemDescriptor::new(2, "B", 1),
    ])
    .unwrap();
    let listings: ListingSnapshot = vec![(1, vec![tier(2, 1)]), (2, vec![tier(1, 5)])]
        .into_iter()
        .collect();

    let report = Optimizer::default().optimize(4, &catalog, &listings).unwrap();
    assert!(report.item("A").is_none());
    assert_eq!(report.item("B").unwrap().units, 4);
    assert_eq!(report.total_spent, Price::from_whole(4));
}

#[test]
fn scenario_above_ceiling_never_bought() {
    let catalog = ItemCatalog::new(vec![
        ItemDescriptor::new(1, "Expensive", 1_000),
        ItemDescriptor::new(2, "Cheap", 1),
    ])
    .unwrap();
    let listings: ListingSnapshot = vec![(1, vec![tier(11, 50)]), (2, vec![tier(3, 2)])]
        .into_iter()
        .collect();

    let report = Optimizer::default().optimize(10, &catalog, &listings).unwrap();
    assert!(report.item("Expensive").is_none());
    assert_eq!(report.total_fragments, 2);
    assert!(report.is_partial());
}

#[test]
fn scenario_target_beyond_liquidity() {
    let (catalog, listings) = single_item(3, vec![tier(1, 2), tier(2, 4)]);
    let report = Optimizer::default().optimize(1_000, &catalog, &listings).unwrap();

    assert_eq!(report.total_fragments, 18);
    assert_eq!(report.total_spent, Price::from_whole(2 + 8));
    assert_eq!(report.shortfall(), 982);
}

#[test]
fn scenario_equal_ratio_first_discovered() {
    let catalog = ItemCatalog::new(vec![
        ItemDescriptor::new(7, "Zulu", 2),
        ItemDescriptor::new(3, "Alpha", 2),
    ])
    .unwrap();
    let listings: ListingSnapshot = vec![(3, vec![tier(2, 1)]), (7, vec![tier(2, 1)])]
        .into_iter()
        .collect();

    let mut pool = CandidatePool::build(&catalog, &listings, Price::from_whole(10)).unwrap();
    let first = allocate(&mut pool.clone(), 2).unwrap();
    let second = allocate(&mut pool, 2).unwrap();

    // Catalog order decides discovery, not name or id.
    assert_eq!(first.events.len(), 1);
    assert_eq!(first.events[0].name, "Zulu");
    assert_eq!(first, second);
}

#[test]
fn builtin_catalog_with_partial_snapshot() {
    let catalog = ItemCatalog::builtin().unwrap();
    // Only two of the sixty items were fetched.
    let listings: ListingSnapshot = vec![
        (175_982_691, vec![PriceTier::new(Price::from_parts(4, 500_000), 2)]),
        (176_099_204, vec![PriceTier::new(Price::from_parts(0, 100_000), 30)]),
    ]
    .into_iter()
    .collect();

    let report = Optimizer::default().optimize(400, &catalog, &listings).unwrap();
    // 0.1 / 8 = 0.0125 beats 4.5 / 200 = 0.0225
    let bizon = report.item("Gunsmith Cobalt - PP-19 Bizon").unwrap();
    assert_eq!(bizon.units, 30);
    assert_eq!(bizon.fragments, 240);
    let akm = report.item("Gold Plate - AKM").unwrap();
    assert_eq!(akm.units, 1);
    assert_eq!(report.total_fragments, 440);
    assert_eq!(report.total_spent, Price::from_parts(7, 500_000));
}

/// A random catalog and snapshot with ascending tiers.
fn random_market(seed: u64) -> (ItemCatalog, ListingSnapshot) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let item_count = rng.gen_range(1..12u64);

    let mut items = Vec::new();
    for id in 0..item_count {
        let fragment_yield = [1, 2, 3, 8, 16, 28, 40, 200][rng.gen_range(0..8)];
        let name = format!("item-{:02}", rng.gen_range(0..6));
        items.push(ItemDescriptor::new(id, name, fragment_yield));
    }

    let mut listings = ListingSnapshot::new();
    for item in &items {
        if !rng.gen_bool(0.85) {
            continue;
        }
        let mut price = rng.gen_range(10_000..2_000_000u64);
        let mut tiers = Vec::new();
        for _ in 0..rng.gen_range(0..8) {
            price += rng.gen_range(0..3_000_000u64);
            tiers.push(PriceTier::new(Price::from_micros(price), rng.gen_range(0..6)));
        }
        listings.insert(item.id, tiers);
    }

    (ItemCatalog::new(items).unwrap(), listings)
}

#[test]
fn greedy_invariants_hold_on_random_markets() {
    for seed in 0..300u64 {
        let (catalog, listings) = random_market(seed);
        let target = ChaCha8Rng::seed_from_u64(seed ^ 0xF00D).gen_range(1..600u64);

        let original = CandidatePool::build(&catalog, &listings, Price::from_whole(10)).unwrap();
        let mut pool = original.clone();
        let allocation = allocate(&mut pool, target).unwrap();

        // Replay the events against a supply ledger.
        let mut supply: Vec<u64> = original
            .candidates()
            .iter()
            .map(|c| c.remaining_supply())
            .collect();
        let mut fragments = 0u64;
        let mut spent = Price::ZERO;

        for event in &allocation.events {
            let chosen = original.get(event.candidate).unwrap();
            assert!(supply[event.candidate] > 0, "seed {seed}: retired candidate selected");
            assert!(event.units > 0, "seed {seed}: empty purchase");

            // No live candidate is strictly cheaper per fragment.
            for (i, other) in original.candidates().iter().enumerate() {
                if supply[i] == 0 {
                    continue;
                }
                let order = cmp_per_fragment(
                    other.unit_price,
                    other.fragment_yield,
                    chosen.unit_price,
                    chosen.fragment_yield,
                );
                assert!(order.is_ge(), "seed {seed}: cheaper candidate {i} skipped");
                if order.is_eq() {
                    assert!(i >= event.candidate, "seed {seed}: tie not broken by discovery");
                }
            }

            assert!(event.units <= supply[event.candidate]);
            supply[event.candidate] -= event.units;
            assert_eq!(event.fragments, event.units * u64::from(chosen.fragment_yield));
            assert_eq!(event.spent, chosen.unit_price * event.units);

            let before = fragments;
            fragments += event.fragments;
            spent += event.spent;
            assert!(fragments > before, "seed {seed}: no progress");
        }

        // Engine supply matches the replay.
        for (i, candidate) in pool.candidates().iter().enumerate() {
            assert_eq!(candidate.remaining_supply(), supply[i]);
            assert!(candidate.remaining_supply() <= candidate.original_supply());
        }

        assert_eq!(fragments, allocation.total_fragments);
        assert_eq!(spent, allocation.total_spent);
        assert!(
            allocation.total_fragments >= target || pool.is_exhausted(),
            "seed {seed}: stopped early"
        );

        let report = AllocationReport::from_allocation(&allocation);
        assert_eq!(report.total_spent, allocation.total_spent);
        assert_eq!(report.total_fragments, allocation.total_fragments);
        assert_eq!(
            report.items.iter().map(|i| i.fragments).sum::<u64>(),
            report.total_fragments
        );
        assert_eq!(
            report.items.iter().map(|i| i.spent).sum::<Price>(),
            report.total_spent
        );
        assert!(report.items.windows(2).all(|w| w[0].name < w[1].name));
    }
}

#[test]
fn identical_inputs_give_identical_output() {
    for seed in [3u64, 17, 256] {
        let (catalog, listings) = random_market(seed);
        let optimizer = Optimizer::default();
        let a = optimizer.optimize(250, &catalog, &listings).unwrap();
        let b = optimizer.optimize(250, &catalog, &listings).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
