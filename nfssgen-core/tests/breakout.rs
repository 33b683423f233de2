use proptest::prelude::*;

use nfssgen_core::breakout::Breakout;

/// Groups of distinct tokens `g<i>t<j>`, each optionally offering the empty choice.
fn groups_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec((1usize..4, any::<bool>()), 1..5).prop_map(|shape| {
        shape
            .into_iter()
            .enumerate()
            .map(|(i, (size, optional))| {
                let mut group: Vec<String> = (0..size).map(|j| format!("g{i}t{j}")).collect();
                if optional {
                    group.push(String::new());
                }
                group
            })
            .collect()
    })
}

fn group_of(token: &str) -> usize {
    token[1..token.find('t').unwrap_or(token.len())]
        .parse()
        .expect("group index")
}

#[test]
fn mandatory_groups_yield_one_combination() {
    let groups = vec![vec!["kern".to_string()], vec!["liga".to_string()]];
    let combos: Vec<Vec<String>> = Breakout::new(groups).collect();
    assert_eq!(combos, vec![vec!["kern".to_string(), "liga".to_string()]]);
}

proptest! {
    #[test]
    fn count_is_product_minus_all_empty_pick(groups in groups_strategy()) {
        let product: usize = groups.iter().map(Vec::len).product();
        let all_optional = groups.iter().all(|g| g.iter().any(String::is_empty));
        let expected = product - usize::from(all_optional);

        let combos: Vec<Vec<String>> = Breakout::new(groups.clone()).collect();
        prop_assert_eq!(combos.len(), expected);
    }

    #[test]
    fn combinations_preserve_group_order(groups in groups_strategy()) {
        let n = groups.len();
        for combo in Breakout::new(groups) {
            prop_assert!(!combo.is_empty());
            prop_assert!(combo.len() <= n);
            let order: Vec<usize> = combo.iter().map(|t| group_of(t)).collect();
            prop_assert!(order.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn combinations_are_distinct(groups in groups_strategy()) {
        let combos: Vec<Vec<String>> = Breakout::new(groups).collect();
        let mut deduped = combos.clone();
        deduped.sort();
        deduped.dedup();
        prop_assert_eq!(deduped.len(), combos.len());
    }
}
