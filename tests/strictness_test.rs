mod common;

use std::sync::mpsc;
use std::thread;
use common::{leaf, node};
use queryeval::blueprint::node::Operator;
use queryeval::blueprint::options::{opt_allow_force_strict, opt_keep_order, opt_sort_by_cost};
use queryeval::blueprint::tree::PlanTree;
use queryeval::Options;

fn check_opts(sort_by_cost: bool, allow_force_strict: bool, keep_order: bool) {
    assert_eq!(opt_sort_by_cost(), sort_by_cost);
    assert_eq!(opt_allow_force_strict(), allow_force_strict);
    assert_eq!(opt_keep_order(), keep_order);
}

#[test]
fn test_options_binding_and_nesting() {
    check_opts(false, false, false);
    {
        let _outer = Options::bind(Options::new(true, true, false));
        check_opts(true, true, false);
        {
            let _inner = Options::bind(Options::new(false, false, true));
            check_opts(false, false, true);
        }
        check_opts(true, true, false);
    }
    check_opts(false, false, false);
}

#[test]
fn test_options_restored_on_early_return() {
    fn bound_then_bail(fail: bool) -> Result<(), String> {
        let _guard = Options::bind(Options::new(true, false, true));
        check_opts(true, false, true);
        if fail {
            return Err("bail".to_string());
        }
        Ok(())
    }
    assert!(bound_then_bail(true).is_err());
    check_opts(false, false, false);
    assert!(bound_then_bail(false).is_ok());
    check_opts(false, false, false);
}

#[test]
fn test_options_are_thread_confined() {
    let _guard = Options::bind(Options::new(true, true, true));
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(Options::current());
    })
    .join()
    .unwrap();
    assert_eq!(rx.recv().unwrap(), Options::default());
    check_opts(true, true, true);
}

#[test]
fn test_self_strict_resolving_during_sort() {
    let mut tree = PlanTree::new();
    let l = leaf(&mut tree, 250, &[]);
    tree.set_docid_limit(l, 1000);
    tree.update_flow_stats(l, 1000);
    assert_eq!(tree.estimate(l), 0.25);
    assert_eq!(tree.cost(l), 1.0);
    assert_eq!(tree.strict_cost(l), 0.25);
    assert!(!tree.strict(l));
    {
        let _guard = Options::bind(Options::new(true, false, false));
        tree.sort(l, true);
        assert!(tree.strict(l));
        tree.sort(l, false);
        assert!(!tree.strict(l));
        tree.sort(l, 0.30);
        assert!(!tree.strict(l));
    }
    {
        let _guard = Options::bind(Options::new(true, true, false));
        tree.sort(l, true);
        assert!(tree.strict(l));
        tree.sort(l, false);
        assert!(tree.strict(l));
        tree.sort(l, 0.30);
        assert!(tree.strict(l));
        tree.sort(l, 0.20);
        assert!(!tree.strict(l));
    }
}

#[test]
fn test_force_strict_needs_docid_limit() {
    let mut tree = PlanTree::new();
    let l = leaf(&mut tree, 250, &[]);
    let _guard = Options::bind(Options::new(false, true, false));
    tree.sort(l, false);
    assert!(!tree.strict(l));
}

#[test]
fn test_strict_and_drives_with_first_child() {
    let mut tree = PlanTree::new();
    let children = vec![leaf(&mut tree, 1, &[]), leaf(&mut tree, 2, &[]), leaf(&mut tree, 3, &[])];
    let and = node(&mut tree, Operator::And, children.clone());
    tree.set_root(and).unwrap();
    tree.set_docid_limit(and, 100);
    tree.optimize_and_sort().unwrap();
    let flags: Vec<bool> = children.iter().map(|&c| tree.strict(c)).collect();
    assert_eq!(flags, vec![true, false, false]);

    tree.optimize_and_sort_with(false, None).unwrap();
    assert!(!tree.strict(and));
    assert!(children.iter().all(|&c| !tree.strict(c)));
}

#[test]
fn test_forced_strict_child_in_conjunction() {
    let build = || {
        let mut tree = PlanTree::new();
        let first = leaf(&mut tree, 400, &[]);
        let second = leaf(&mut tree, 500, &[]);
        let and = node(&mut tree, Operator::And, vec![first, second]);
        tree.set_root(and).unwrap();
        tree.set_docid_limit(and, 1000);
        (tree, second)
    };

    // offered 40% of documents: strict cost 0.5 exceeds 0.4 * 1.0
    let (mut tree, second) = build();
    tree.optimize_and_sort_with(true, Some(Options::new(false, true, false))).unwrap();
    assert!(!tree.strict(second));

    let mut tree = PlanTree::new();
    let first = leaf(&mut tree, 500, &[]);
    let second = leaf(&mut tree, 500, &[]);
    let and = node(&mut tree, Operator::And, vec![first, second]);
    tree.set_root(and).unwrap();
    tree.set_docid_limit(and, 1000);

    // offered 50%: strict cost 0.5 does not exceed 0.5 * 1.0
    tree.optimize_and_sort_with(true, Some(Options::new(false, true, false))).unwrap();
    assert!(tree.strict(first));
    assert!(tree.strict(second));

    tree.optimize_and_sort_with(true, Some(Options::new(false, false, false))).unwrap();
    assert!(tree.strict(first));
    assert!(!tree.strict(second));
}
