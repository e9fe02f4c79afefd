//! Self-referential, mutually referential and shared object graphs.

mod common;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use common::*;
use pretty_assertions::assert_eq;
use rulegraph_validator::prelude::*;

// ============================================================================
// SELF REFERENCE
// ============================================================================

#[test]
fn test_recursive_chain_validates_every_link() {
    let first = Link::new(2);
    let second = Link::new(3);
    let third = Link::new(4);
    first.point_to(&second);
    second.point_to(&third);

    let report = link_builder().build().unwrap().validate(&first).unwrap();

    assert_eq!(report.test_count(), 6);
    assert_eq!(report.member_results()[0].name(), "next");
    let odd = report.rule_result("Link.next [even]").unwrap().unwrap();
    assert!(!odd.is_valid());
    assert!(report.rule_result("Link.next.next [even]").unwrap().unwrap().is_valid());
}

#[test]
fn test_self_loop_costs_no_extra_evaluations() {
    let link = Link::new(2);
    link.point_to(&link);

    let report = link_builder().build().unwrap().validate(&link).unwrap();

    assert_eq!(report.test_count(), 2);
    assert!(report.member_results().is_empty());
    assert!(report.is_valid());
    link.unlink();
}

#[test]
fn test_long_loop_is_walked_once() {
    let links: Vec<_> = (1..=5).map(|value| Link::new(value * 2)).collect();
    for pair in links.windows(2) {
        pair[0].point_to(&pair[1]);
    }
    links[4].point_to(&links[0]);

    let report = link_builder().build().unwrap().validate(&links[0]).unwrap();

    assert_eq!(report.test_count(), 10);
    assert!(report.rule_result("Link.next.next.next.next [positive]").unwrap().is_some());
    assert_eq!(
        report.rule_result("Link.next.next.next.next.next [positive]"),
        Err(PathError::UnknownMember {
            member: "next".into()
        })
    );
    links[4].unlink();
}

#[test]
fn test_self_referential_builder_is_one_node() {
    assert_eq!(link_builder().build().unwrap().node_count(), 1);
}

// ============================================================================
// MUTUAL REFERENCE
// ============================================================================

struct Left {
    value: i32,
    right: RefCell<Option<Rc<Right>>>,
}

struct Right {
    value: i32,
    left: RefCell<Option<Rc<Left>>>,
}

impl BusinessObject for Left {}
impl BusinessObject for Right {}

fn cross_builders() -> (Builder<Left>, Builder<Right>) {
    let left = Builder::<Left>::new();
    let right = Builder::<Right>::new();
    left.add_rule("positive", "value is positive", |l| l.value > 0)
        .add_rule("small", "value below 100", |l| l.value < 100)
        .add_rule("odd", "value is odd", |l| l.value % 2 != 0)
        .add_member("right", |l| MemberValue::optional(l.right.borrow().clone()), &right);
    right
        .add_rule("positive", "value is positive", |r| r.value > 0)
        .add_rule("even", "value is even", |r| r.value % 2 == 0)
        .add_member("left", |r| MemberValue::optional(r.left.borrow().clone()), &left);
    (left, right)
}

fn cross_pair() -> (Rc<Left>, Rc<Right>) {
    let left = Rc::new(Left {
        value: 1,
        right: RefCell::new(None),
    });
    let right = Rc::new(Right {
        value: 2,
        left: RefCell::new(Some(Rc::clone(&left))),
    });
    *left.right.borrow_mut() = Some(Rc::clone(&right));
    (left, right)
}

#[test]
fn test_cross_loop_validates_each_object_once() {
    let (left_builder, right_builder) = cross_builders();
    let (left, right) = cross_pair();

    let from_left = left_builder.build().unwrap().validate(&left).unwrap();
    let from_right = right_builder.build().unwrap().validate(&right).unwrap();

    assert_eq!(from_left.test_count(), 5);
    assert_eq!(from_right.test_count(), 5);
    assert!(from_left.is_valid());
    assert!(from_left.rule_result("Left.right [even]").unwrap().is_some());
    assert!(from_right.rule_result("Right.left [odd]").unwrap().is_some());

    left.right.borrow_mut().take();
}

#[test]
fn test_cross_builders_compile_to_two_nodes() {
    let (left, right) = cross_builders();
    assert_eq!(left.build().unwrap().node_count(), 2);
    assert_eq!(right.build().unwrap().node_count(), 2);
}

// ============================================================================
// SHARING
// ============================================================================

struct Leaf {
    weight: u32,
}

struct Pair {
    first: Rc<Leaf>,
    second: Rc<Leaf>,
}

impl BusinessObject for Leaf {}
impl BusinessObject for Pair {}

fn pair_builder() -> Builder<Pair> {
    let leaf = Builder::<Leaf>::new().add_rule("light", "weight below 10", |l| l.weight < 10);
    Builder::<Pair>::new()
        .add_rule("distinct", "leaves are distinct", |p| !Rc::ptr_eq(&p.first, &p.second))
        .add_member("first", |p| MemberValue::single(Rc::clone(&p.first)), &leaf)
        .add_member("second", |p| MemberValue::single(Rc::clone(&p.second)), &leaf)
}

#[test]
fn test_diamond_sharing_prunes_second_encounter() {
    let leaf = Rc::new(Leaf { weight: 3 });
    let pair = Pair {
        first: Rc::clone(&leaf),
        second: leaf,
    };

    let report = pair_builder().build().unwrap().validate(&pair).unwrap();

    assert_eq!(report.test_count(), 2);
    let names: Vec<_> = report.member_results().iter().map(ResultNode::name).collect();
    assert_eq!(names, ["first"]);
    assert!(!report.is_valid());
}

#[test]
fn test_equal_but_distinct_objects_are_both_validated() {
    let pair = Pair {
        first: Rc::new(Leaf { weight: 3 }),
        second: Rc::new(Leaf { weight: 3 }),
    };

    let report = pair_builder().build().unwrap().validate(&pair).unwrap();

    assert_eq!(report.test_count(), 3);
    assert!(report.is_valid());
}

#[test]
fn test_object_shared_by_two_roots_is_validated_under_each() {
    let shared = Rc::new(Leaf { weight: 4 });
    let pairs = [
        Pair {
            first: Rc::clone(&shared),
            second: Rc::new(Leaf { weight: 1 }),
        },
        Pair {
            first: Rc::clone(&shared),
            second: Rc::new(Leaf { weight: 2 }),
        },
    ];

    let reports = pair_builder().build().unwrap().validate_all(&pairs).unwrap();

    let counts: Vec<_> = reports.iter().map(ResultNode::test_count).collect();
    assert_eq!(counts, [3, 3]);
    for (index, report) in reports.iter().enumerate() {
        let names: Vec<_> = report.member_results().iter().map(ResultNode::name).collect();
        assert_eq!(names, ["first", "second"]);
        let path = format!("Pair[{index}].first [light]");
        assert!(report.rule_result(&path).unwrap().unwrap().is_valid());
    }
}

#[test]
fn test_shared_element_in_collection_appears_once() {
    struct Basket {
        leaves: Vec<Arc<Leaf>>,
    }
    impl BusinessObject for Basket {}

    let leaf = Builder::<Leaf>::new().add_rule("light", "weight below 10", |l| l.weight < 10);
    let basket = Builder::<Basket>::new().add_member(
        "leaves",
        |b| MemberValue::many(b.leaves.iter().cloned()),
        &leaf,
    );

    let shared = Arc::new(Leaf { weight: 1 });
    let value = Basket {
        leaves: vec![Arc::clone(&shared), Arc::new(Leaf { weight: 20 }), shared],
    };

    let report = basket.build().unwrap().validate(&value).unwrap();

    let names: Vec<_> = report.member_results().iter().map(ResultNode::name).collect();
    assert_eq!(names, ["leaves[0]", "leaves[1]"]);
    assert!(!report.rule_result("Basket.leaves[1] [light]").unwrap().unwrap().is_valid());
}

#[test]
fn test_fresh_values_from_accessors_are_not_mistaken_for_visited() {
    struct Factory;
    impl BusinessObject for Factory {}

    let leaf = Builder::<Leaf>::new().add_rule("light", "weight below 10", |l| l.weight < 10);
    let factory = Builder::<Factory>::new().add_member(
        "made",
        |_| MemberValue::many((0..4).map(|weight| Rc::new(Leaf { weight }))),
        &leaf,
    );

    let report = factory.build().unwrap().validate(&Factory).unwrap();

    assert_eq!(report.member_results().len(), 4);
    assert_eq!(report.test_count(), 4);
}

// ============================================================================
// DEPTH
// ============================================================================

#[test]
fn test_deep_chain_within_limit() {
    let validator = chain_builder()
        .build()
        .unwrap()
        .with_options(ValidationOptions::new().with_max_depth(9));

    let report = validator.validate(&chain(10)).unwrap();
    assert_eq!(report.test_count(), 10);
}

#[test]
fn test_depth_limit_aborts_with_path() {
    let validator = chain_builder()
        .build()
        .unwrap()
        .with_options(ValidationOptions::new().with_max_depth(2));

    let error = validator.validate(&chain(5)).unwrap_err();

    match error {
        ValidationError::DepthExceeded { limit, path } => {
            assert_eq!(limit, 2);
            assert_eq!(path, "Chain.next.next.next");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_options_from_config_document() {
    let options: ValidationOptions = serde_json::from_str(r#"{ "max_depth": 0 }"#).unwrap();
    let validator = chain_builder().build().unwrap().with_options(options);

    assert!(validator.validate(&chain(1)).is_ok());
    assert!(matches!(
        validator.validate(&chain(2)),
        Err(ValidationError::DepthExceeded { limit: 0, .. })
    ));
}
