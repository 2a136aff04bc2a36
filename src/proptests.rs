use super::*;

use proptest::prelude::*;

use crate::node::Node;

fn validate_tree(t: &HwTree, expected_len: usize) {
    let issues = t.verify_integrity();
    assert!(issues.is_empty(), "integrity issues: {issues:?}");

    let mut leaf_entries = 0usize;
    t.for_each_node(|node, level| {
        assert!(level <= MAX_LEVEL, "node below the deepest level");
        if let Node::Leaf(leaf) = node {
            leaf_entries += leaf.len();
        }
    });
    assert_eq!(leaf_entries, expected_len, "leaf entries must match tree len");
    assert_eq!(t.len(), expected_len);
    assert_eq!(t.is_empty(), expected_len == 0, "root must exist iff entries exist");
}

fn brute_force(model: &[Entry], target: u64, radius: u32) -> Vec<Entry> {
    let mut out: Vec<Entry> = model
        .iter()
        .filter(|e| e.distance_to(target) <= radius)
        .copied()
        .collect();
    out.sort();
    out
}

#[derive(Clone, Debug)]
enum Op {
    Insert(Entry),
    Remove(Entry),
    Search(u64, u32),
    Clear,
}

/// Codes drawn from a few sources so that duplicates, shared weight vectors
/// and near neighbours all occur often.
fn code_strategy() -> impl Strategy<Value = u64> + Clone {
    prop_oneof![
        3 => any::<u64>(),
        2 => 0u64..32,
        2 => (0usize..64).prop_map(|b| 1u64 << b),
        3 => prop::collection::vec(0usize..64, 0..6).prop_map(|bits| {
            bits.into_iter().fold(0xF0F0_F0F0_0F0F_0F0Fu64, |c, b| c ^ (1u64 << b))
        }),
    ]
}

fn entry_strategy() -> impl Strategy<Value = Entry> + Clone {
    (0i64..64, code_strategy()).prop_map(|(id, code)| Entry::new(id, code))
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let entry = entry_strategy();
    let op = prop_oneof![
        50 => entry.clone().prop_map(Op::Insert),
        25 => entry.prop_map(Op::Remove),
        24 => (code_strategy(), 0u32..=16).prop_map(|(c, r)| Op::Search(c, r)),
        1 => Just(Op::Clear),
    ];
    prop::collection::vec(op, 0..=1000)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        max_shrink_iters: 20_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in ops_strategy()) {
        let mut t = HwTree::new();
        let mut m: Vec<Entry> = Vec::new();

        for op in ops {
            match op {
                Op::Insert(e) => {
                    t.insert(e);
                    m.push(e);
                }
                Op::Remove(e) => {
                    let got = t.remove(&e);
                    let expected = m.iter().position(|x| *x == e).map(|i| m.swap_remove(i));
                    prop_assert_eq!(got, expected);
                }
                Op::Search(target, radius) => {
                    let mut got = t.range_search(target, radius);
                    got.sort();
                    prop_assert_eq!(got, brute_force(&m, target, radius));
                }
                Op::Clear => {
                    t.clear();
                    m.clear();
                }
            }
            prop_assert_eq!(t.len(), m.len());
        }

        validate_tree(&t, m.len());
        let mut all: Vec<Entry> = t.iter().copied().collect();
        all.sort();
        m.sort();
        prop_assert_eq!(all, m);
    }

    #[test]
    fn prop_weight_l1_lower_bounds_hamming(a in any::<u64>(), b in any::<u64>()) {
        for level in 0..=MAX_LEVEL {
            let wa = WeightVector::derive(a, level).unwrap();
            let wb = WeightVector::derive(b, level).unwrap();
            prop_assert!(wa.l1_distance(&wb) <= (a ^ b).count_ones());
        }
    }

    #[test]
    fn prop_radius_zero_round_trip(entries in prop::collection::vec(entry_strategy(), 1..300)) {
        let t: HwTree = entries.iter().copied().collect();
        for e in &entries {
            prop_assert!(t.range_search(e.code, 0).contains(e));
        }
    }

    #[test]
    fn prop_range_search_exact(
        entries in prop::collection::vec(entry_strategy(), 0..500),
        target in code_strategy(),
        radius in 0u32..=64,
    ) {
        let t: HwTree = entries.iter().copied().collect();
        let mut got = t.range_search(target, radius);
        got.sort();
        prop_assert_eq!(got, brute_force(&entries, target, radius));
    }

    #[test]
    fn prop_small_config_equivalence(
        entries in prop::collection::vec(entry_strategy(), 0..200),
        capacity in 1usize..4,
        depth in 0u8..=MAX_LEVEL,
    ) {
        let mut t = HwTree::with_config(Config::default().leaf_capacity(capacity).max_depth(depth)).unwrap();
        t.extend(entries.iter().copied());
        validate_tree(&t, entries.len());

        let mut m = entries.clone();
        for e in &entries {
            prop_assert_eq!(t.remove(e), Some(*e));
            let i = m.iter().position(|x| x == e).unwrap();
            m.swap_remove(i);
            prop_assert_eq!(t.len(), m.len());
        }
        validate_tree(&t, 0);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_remove_order_small_set() {
    // Capacity 1 promotes on the second insert, so the set spans several
    // levels and every removal order exercises collapsing.
    let entries = vec![
        Entry::new(1, 0x00),
        Entry::new(2, 0x01),
        Entry::new(3, 0x80),
        Entry::new(4, 0x8000_0000_0000_0000),
        Entry::new(5, 0xFF),
        Entry::new(6, 0x01),
    ];
    let config = Config::default().leaf_capacity(1);
    let mut base = HwTree::with_config(config).unwrap();
    base.extend(entries.iter().copied());
    validate_tree(&base, entries.len());

    for_each_permutation(&entries, |perm| {
        let mut t = base.clone();
        let mut left = entries.len();
        for e in perm {
            assert_eq!(t.remove(&e), Some(e));
            left -= 1;
            validate_tree(&t, left);
            assert!(!t.contains(&e));
        }
        assert!(t.root.is_none());
    });
}

#[test]
fn clustered_search_finds_every_member() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(0x5EED);
    let radius = 10u32;
    let mut t = HwTree::new();
    let mut id = 0i64;

    for _ in 0..1000 {
        t.insert(Entry::new(id, rng.gen()));
        id += 1;
    }

    let mut clusters = Vec::new();
    for _ in 0..10 {
        let center: u64 = rng.gen();
        let mut members = vec![Entry::new(id, center)];
        id += 1;
        for _ in 0..9 {
            let mut code = center;
            for _ in 0..rng.gen_range(1..=radius) {
                code ^= 1u64 << rng.gen_range(0..64);
            }
            members.push(Entry::new(id, code));
            id += 1;
        }
        t.extend(members.iter().copied());
        clusters.push((center, members));
    }
    assert_eq!(t.len(), 1100);

    for (center, members) in &clusters {
        let found = t.range_search(*center, radius);
        for m in members {
            assert!(found.contains(m), "cluster member {m:?} missing");
        }
    }

    for (center, members) in &clusters {
        assert_eq!(t.remove(&members[0]), Some(Entry::new(members[0].id, *center)));
    }
    assert_eq!(t.len(), 1090);
    validate_tree(&t, 1090);
}
