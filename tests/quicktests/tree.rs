use avl::Tree;
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;

use crate::Op;

/// Applies a set of operations to a tree and a sorted `Vec` of the same keys.
/// This way we can ensure that after a random smattering of inserts
/// and deletes we have the same multiset of keys in both.
fn do_ops<K>(ops: &[Op<K>], mut tree: Tree<K>, model: &mut Vec<K>) -> Tree<K>
where
    K: Ord + Clone,
{
    for op in ops {
        match op {
            Op::Insert(k) => {
                tree.insert(k.clone()).unwrap();
                let pos = model.partition_point(|x| x <= k);
                model.insert(pos, k.clone());
            }
            Op::Remove(k) => {
                let removed = tree.delete(k).unwrap();
                match model.iter().position(|x| x == k) {
                    Some(pos) => {
                        assert!(removed);
                        model.remove(pos);
                    }
                    None => assert!(!removed),
                }
            }
        }
        assert!(tree.is_balanced());
    }

    tree
}

/// The worst case height of an AVL tree holding `len` keys.
fn max_avl_height(len: usize) -> f64 {
    1.44 * ((len + 2) as f64).log2()
}

#[quickcheck]
fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
    let mut model = Vec::new();
    let tree = do_ops(&ops, Tree::new(), &mut model);

    tree.len() == model.len() && tree.iter().eq(model.iter())
}

#[quickcheck]
fn inorder_is_sorted(xs: Vec<i16>) -> bool {
    let tree = Tree::from_unsorted(xs).unwrap();

    tree.inorder().windows(2).all(|pair| pair[0] <= pair[1])
}

#[quickcheck]
fn build_matches_sorted_input(xs: Vec<i32>) -> bool {
    let tree = Tree::from_unsorted(xs.clone()).unwrap();
    let mut sorted = xs;
    sorted.sort();

    tree.iter().eq(sorted.iter()) && tree.is_balanced()
}

#[quickcheck]
fn unsorted_inserts_hold_the_same_keys_as_build(xs: Vec<i8>) -> bool {
    let built = Tree::from_unsorted(xs.clone()).unwrap();
    let mut inserted = Tree::new();
    for x in xs {
        inserted.insert(x).unwrap();
    }

    inserted.is_balanced() && built.inorder() == inserted.inorder()
}

#[quickcheck]
fn with_deletions(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
    let mut tree = Tree::new();
    for x in &xs {
        tree.insert(*x).unwrap();
    }
    for delete in &deletes {
        tree.delete(delete).unwrap();
    }

    // Each delete removes a single occurrence.
    let mut still_present = xs;
    for delete in &deletes {
        if let Some(pos) = still_present.iter().position(|x| x == delete) {
            still_present.swap_remove(pos);
        }
    }
    still_present.sort();

    tree.is_balanced() && tree.iter().eq(still_present.iter())
}

#[quickcheck]
fn deleting_missing_keys_changes_nothing(xs: Vec<i8>, missing: i8) -> TestResult {
    if xs.contains(&missing) {
        return TestResult::discard();
    }
    let mut tree = Tree::from_unsorted(xs).unwrap();
    let before: Vec<i8> = tree.iter().copied().collect();

    TestResult::from_bool(tree.delete(&missing) == Ok(false) && tree.iter().eq(before.iter()))
}

#[quickcheck]
fn height_stays_logarithmic(xs: Vec<u16>) -> bool {
    let tree = Tree::from_unsorted(xs.iter().copied()).unwrap();
    let mut unsorted = Tree::new();
    for x in xs {
        unsorted.insert(x).unwrap();
    }

    let bound = max_avl_height(tree.len());
    tree.height() as f64 <= bound && unsorted.height() as f64 <= bound
}

#[quickcheck]
fn min_is_smallest(xs: Vec<i32>) -> bool {
    let tree = Tree::from_unsorted(xs.clone()).unwrap();

    tree.min() == xs.iter().min()
}

#[test]
fn build_example() {
    let tree = Tree::from_unsorted(vec![5, 3, 8, 1, 4, 7, 9]).unwrap();

    assert_eq!(tree.inorder(), [&1, &3, &4, &5, &7, &8, &9]);
}

#[test]
fn insert_then_delete_scenario() {
    let mut tree = Tree::new();
    for key in [30, 20, 10, 40, 50] {
        tree.insert(key).unwrap();
    }
    assert_eq!(tree.delete(&30), Ok(true));

    assert_eq!(tree.inorder(), [&10, &20, &40, &50]);
    assert!(tree.is_balanced());
}

#[test]
fn large_sequential_workload_stays_balanced() {
    let mut tree = Tree::new();
    for key in 0..10_000 {
        tree.insert(key).unwrap();
    }
    assert!(tree.height() as f64 <= max_avl_height(tree.len()));

    for key in (0..10_000).step_by(2) {
        assert_eq!(tree.delete(&key), Ok(true));
    }
    assert!(tree.is_balanced());
    assert_eq!(tree.len(), 5_000);
    assert!(tree.iter().copied().eq((1..10_000).step_by(2)));
}
