use crate::llrb::{Cursor, Llrb};

const PAIRS: [(i64, &str); 5] = [(0, "foo"), (2, "bar"), (4, "baz"), (5, "qux"), (7, "quux")];

#[test]
fn test_all_permutations() {
    for perm in permutations(&PAIRS) {
        let tree = build(&perm);
        assert_eq!(collect(&tree, tree.all()), PAIRS.to_vec(), "insert {:?}", perm);
    }
}

#[test]
fn test_backward_permutations() {
    let mut want = PAIRS.to_vec();
    want.reverse();
    for perm in permutations(&PAIRS) {
        let tree = build(&perm);
        assert_eq!(collect(&tree, tree.backward()), want, "insert {:?}", perm);
    }
}

#[test]
fn test_scan_within() {
    for perm in permutations(&PAIRS) {
        let tree = build(&perm);
        assert_eq!(collect(&tree, tree.scan(3, 4)), vec![(4, "baz")]);
        assert_eq!(collect(&tree, tree.scan(2, 3)), vec![(2, "bar")]);
        assert_eq!(collect(&tree, tree.scan(3, 3)), vec![]);
        assert_eq!(
            collect(&tree, tree.scan(2, 5)),
            vec![(2, "bar"), (4, "baz"), (5, "qux")]
        );
        // hi < lo runs in reverse.
        assert_eq!(
            collect(&tree, tree.scan(5, 1)),
            vec![(5, "qux"), (4, "baz"), (2, "bar")]
        );
    }
}

#[test]
fn test_scan_beyond_extremes() {
    for perm in permutations(&PAIRS) {
        let tree = build(&perm);
        assert_eq!(collect(&tree, tree.scan(-5, 100)), PAIRS.to_vec());
        let mut rev = PAIRS.to_vec();
        rev.reverse();
        assert_eq!(collect(&tree, tree.scan(100, -5)), rev);

        // ranges entirely outside the key set.
        assert_eq!(collect(&tree, tree.scan(8, 9)), vec![]);
        assert_eq!(collect(&tree, tree.scan(9, 8)), vec![]);
        assert_eq!(collect(&tree, tree.scan(-3, -1)), vec![]);
        assert_eq!(collect(&tree, tree.scan(-1, -3)), vec![]);

        // one endpoint outside.
        assert_eq!(
            collect(&tree, tree.scan(10, 3)),
            vec![(7, "quux"), (5, "qux"), (4, "baz")]
        );
        assert_eq!(collect(&tree, tree.scan(-5, 1)), vec![(0, "foo")]);
        assert_eq!(collect(&tree, tree.scan(1, -5)), vec![(0, "foo")]);
    }
}

#[test]
fn test_cursor_empty_tree() {
    let tree: Llrb<i64, &str> = Llrb::new_ord();
    let mut cursor = tree.all();
    assert_eq!(cursor.next(&tree), None);
    assert_eq!(cursor.next(&tree), None);
    assert_eq!(collect(&tree, tree.backward()), vec![]);
    assert_eq!(collect(&tree, tree.scan(1, 10)), vec![]);
}

#[test]
fn test_remove_current_forward() {
    // deleting the entry the cursor is parked on must not derail it.
    for perm in permutations(&PAIRS) {
        for (target, _) in PAIRS.iter() {
            let mut tree = build(&perm);
            let mut cursor = tree.all();
            let mut got = vec![];
            while let Some((key, value)) = cursor.next(&tree) {
                got.push((key, value));
                if key == *target {
                    assert!(tree.remove(&key).is_some());
                }
            }
            assert_eq!(got, PAIRS.to_vec(), "insert {:?} remove {}", perm, target);
        }
    }
}

#[test]
fn test_remove_current_backward() {
    let mut want = PAIRS.to_vec();
    want.reverse();
    for perm in permutations(&PAIRS) {
        for (target, _) in PAIRS.iter() {
            let mut tree = build(&perm);
            let mut cursor = tree.backward();
            let mut got = vec![];
            while let Some((key, value)) = cursor.next(&tree) {
                got.push((key, value));
                if key == *target {
                    assert!(tree.remove(&key).is_some());
                }
            }
            assert_eq!(got, want, "insert {:?} remove {}", perm, target);
        }
    }
}

#[test]
fn test_remove_current_mid_scan() {
    for perm in permutations(&PAIRS) {
        let mut tree = build(&perm);
        let mut cursor = tree.scan(2, 5);
        let mut got = vec![];
        while let Some((key, value)) = cursor.next(&tree) {
            got.push((key, value));
            if key == 4 {
                assert_eq!(tree.remove(&4), Some("baz"));
            }
        }
        assert_eq!(got, vec![(2, "bar"), (4, "baz"), (5, "qux")]);
    }
}

#[test]
fn test_reinsert_current() {
    // the removed key comes back before the cursor advances; the cursor
    // must skip past it rather than yield it a second time.
    for perm in permutations(&PAIRS) {
        let mut tree = build(&perm);
        let mut cursor = tree.all();
        let mut got = vec![];
        while let Some((key, value)) = cursor.next(&tree) {
            got.push((key, value));
            if key == 4 {
                assert_eq!(tree.remove(&4), Some("baz"));
                assert_eq!(tree.set(4, "BAZ"), None);
            }
        }
        assert_eq!(got, PAIRS.to_vec());
        assert_eq!(tree.get(&4), Some("BAZ"));
    }
}

#[test]
fn test_remove_ahead() {
    for perm in permutations(&PAIRS) {
        let mut tree = build(&perm);
        let mut cursor = tree.all();
        let mut got = vec![];
        while let Some((key, value)) = cursor.next(&tree) {
            got.push((key, value));
            if key == 2 {
                assert_eq!(tree.remove(&5), Some("qux"));
            }
        }
        assert_eq!(got, vec![(0, "foo"), (2, "bar"), (4, "baz"), (7, "quux")]);
    }
}

#[test]
fn test_remove_behind() {
    for perm in permutations(&PAIRS) {
        let mut tree = build(&perm);
        let mut cursor = tree.all();
        let mut got = vec![];
        while let Some((key, value)) = cursor.next(&tree) {
            got.push((key, value));
            if key == 4 {
                assert_eq!(tree.remove(&0), Some("foo"));
            }
        }
        assert_eq!(got, PAIRS.to_vec());
    }
}

#[test]
fn test_remove_all_orders() {
    // every insertion order crossed with every removal order.
    for perm in permutations(&PAIRS) {
        for order in permutations(&PAIRS) {
            let mut tree = build(&perm);
            for (key, value) in order.iter() {
                assert_eq!(tree.remove(key), Some(*value));
                tree.validate().expect("invalid tree");
            }
            assert_eq!(tree.len(), 0);
            assert_eq!(collect(&tree, tree.all()), vec![]);
        }
    }
}

#[test]
fn test_fresh_cursor_restarts() {
    let tree = build(&PAIRS);
    assert_eq!(collect(&tree, tree.all()), PAIRS.to_vec());
    // a second cursor starts over from the beginning.
    assert_eq!(collect(&tree, tree.all()), PAIRS.to_vec());
}

#[test]
fn test_exhaustion_is_final() {
    let mut tree = build(&PAIRS);
    let mut cursor = tree.all();
    while cursor.next(&tree).is_some() {}
    // growth after exhaustion does not revive the cursor.
    tree.set(100, "new");
    assert_eq!(cursor.next(&tree), None);
}

#[test]
fn test_drain_via_cursor() {
    for perm in permutations(&PAIRS) {
        let mut tree = build(&perm);
        let mut cursor = tree.all();
        let mut got = vec![];
        while let Some((key, value)) = cursor.next(&tree) {
            got.push((key, value));
            assert_eq!(tree.remove(&key), Some(value));
        }
        assert_eq!(got, PAIRS.to_vec());
        assert_eq!(tree.len(), 0);
    }
}

#[test]
fn test_drain_large() {
    let mut tree: Llrb<i64, i64> = Llrb::new_ord();
    for key in 0..1000 {
        tree.set(key, key * 3);
    }
    let mut cursor = tree.all();
    let mut expect = 0;
    while let Some((key, value)) = cursor.next(&tree) {
        assert_eq!(key, expect);
        assert_eq!(value, expect * 3);
        assert_eq!(tree.remove(&key), Some(value));
        tree.validate().expect("invalid tree");
        expect += 1;
    }
    assert_eq!(expect, 1000);
    assert_eq!(tree.len(), 0);
}

#[test]
fn test_slot_reuse_does_not_confuse_cursor() {
    let mut tree = build(&PAIRS);
    let mut cursor = tree.all();
    assert_eq!(cursor.next(&tree), Some((0, "foo")));
    // freeing 0 and inserting 1 may land the new entry in the old slot;
    // the cursor must still treat its mark as deleted and recover.
    assert_eq!(tree.remove(&0), Some("foo"));
    tree.set(1, "one");
    assert_eq!(cursor.next(&tree), Some((1, "one")));
    assert_eq!(cursor.next(&tree), Some((2, "bar")));
}

fn build(pairs: &[(i64, &'static str)]) -> Llrb<i64, &'static str> {
    let mut tree: Llrb<i64, &'static str> = Llrb::new_ord();
    tree.extend(pairs.iter().cloned());
    tree.validate().expect("invalid tree");
    tree
}

fn collect(tree: &Llrb<i64, &'static str>, mut cursor: Cursor<i64>) -> Vec<(i64, &'static str)> {
    let mut out = vec![];
    while let Some(item) = cursor.next(tree) {
        out.push(item);
        if out.len() > 64 {
            panic!("cursor refuses to finish");
        }
    }
    out
}

fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut out = vec![];
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let first = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, first.clone());
            out.push(tail);
        }
    }
    out
}
