//! Integration Tests
//!
//! These tests verify that cells, nodes, conditionals, scopes, and the
//! graph driver work together correctly across whole update cycles.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cascade_core::{
    Conditional, Error, Graph, NodeBuilder, Scope, TypedCell, Value, ValueType,
};

fn real(r: f64) -> Value {
    Value::Real(r)
}

/// A node computing `2 * x`, counting its transform invocations.
fn doubler(name: &str) -> (cascade_core::Node, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let node = NodeBuilder::new(name)
        .parameter("x", ValueType::Real)
        .output(ValueType::Real)
        .transform(move |params| {
            counter.fetch_add(1, Ordering::SeqCst);
            let Value::Real(x) = params.get("x")? else { unreachable!() };
            Ok(Value::Real(2.0 * x))
        })
        .build()
        .unwrap();
    (node, calls)
}

/// Cell -> node: a write propagates through one taint/settle cycle.
#[test]
fn cell_write_drives_a_dependent_node() {
    let x = TypedCell::new(ValueType::Real);
    let (double, _) = doubler("double");
    double.bind("x", Arc::new(x.clone())).unwrap();

    x.write(real(3.0)).unwrap();
    assert_eq!(double.tainted(), Ok(true));
    assert_eq!(double.value(), real(6.0));

    double.untaint();
    assert_eq!(double.tainted(), Ok(false));
}

/// A conditional bound to a cell follows the cell's value.
#[test]
fn conditional_tracks_a_bound_cell() {
    let is_negative = Conditional::new(ValueType::Real, |v| match v {
        Value::Real(r) => *r < 0.0,
        _ => false,
    });
    let x = TypedCell::new(ValueType::Real);
    is_negative.bind(Conditional::INPUT, Arc::new(x.clone())).unwrap();

    x.write(real(-1.0)).unwrap();
    assert!(is_negative.met());

    is_negative.untaint();
    x.write(real(5.0)).unwrap();
    assert!(!is_negative.met());
}

/// Killing a scope makes binds towards its nodes fail with OutOfScope.
#[test]
fn dead_scope_rejects_binds_towards_its_nodes() {
    let switch = Conditional::new(ValueType::Bool, |v| v.is_truthy());
    let scope = Scope::global().create_scope(switch.clone()).unwrap();

    let scoped = NodeBuilder::new("scoped")
        .parameter("x", ValueType::Real)
        .output(ValueType::Real)
        .scope(scope.clone())
        .build()
        .unwrap();

    assert!(scope.is_alive());
    switch.force(true).unwrap();
    assert!(scope.is_dead());

    // A global-scope node must not observe the scoped node: the scoped
    // node's scope is not included in the global scope.
    let (global_node, _) = doubler("global");
    assert_eq!(
        global_node.bind("x", Arc::new(scoped)),
        Err(Error::OutOfScope { name: "x".to_owned() })
    );
}

/// Binds across sibling scopes always fail; binds within a scope or
/// towards an ancestor always succeed.
#[test]
fn scope_enforcement_on_bind() {
    let left_scope = Scope::global()
        .create_scope(Conditional::new(ValueType::Bool, |_| false))
        .unwrap();
    let right_scope = Scope::global()
        .create_scope(Conditional::new(ValueType::Bool, |_| false))
        .unwrap();

    let make = |name: &str, scope: &Scope| {
        NodeBuilder::new(name)
            .parameter("x", ValueType::Real)
            .output(ValueType::Real)
            .scope(scope.clone())
            .transform(|params| params.get("x"))
            .build()
            .unwrap()
    };

    let left = make("left", &left_scope);
    let right = make("right", &right_scope);
    let sibling = make("sibling", &left_scope);
    let global = make("global", &Scope::global());

    // Sibling scopes never include each other.
    assert!(matches!(left.bind("x", Arc::new(right)), Err(Error::OutOfScope { .. })));

    // Same scope is fine.
    assert!(left.bind("x", Arc::new(sibling)).is_ok());

    // A child scope may observe the global scope.
    assert!(left.bind("x", Arc::new(global.clone())).is_ok());

    // The reverse direction is rejected.
    assert!(matches!(global.bind("x", Arc::new(left)), Err(Error::OutOfScope { .. })));
}

/// Scope death is monotonic: once forced dead, a scope stays dead.
#[test]
fn scope_death_is_monotonic() {
    let switch = Conditional::new(ValueType::Bool, |v| v.is_truthy());
    let scope = Scope::global().create_scope(switch.clone()).unwrap();

    assert!(scope.is_alive());
    switch.force(true).unwrap();

    // Forcing untaints the input, so the settled input no longer drives
    // the output.
    assert!(scope.is_dead());
    switch.set(Conditional::INPUT, Value::Bool(false)).unwrap();
    switch.untaint();
    assert!(scope.is_dead());
}

/// Graph scenario: terminal `b` reads terminal `a`; one pass settles both
/// and a quiescent second pass runs no transforms.
#[test]
fn graph_update_settles_and_goes_quiescent() {
    let (a, a_calls) = doubler("a");
    let (b, b_calls) = doubler("b");
    b.bind("x", Arc::new(a.clone())).unwrap();
    a.set("x", real(1.5)).unwrap();

    let graph = Graph::new(vec![a.clone(), b.clone()]).unwrap();
    graph.update().unwrap();

    assert_eq!(a.value(), real(3.0));
    assert_eq!(b.value(), real(6.0));
    assert_eq!(a_calls.load(Ordering::SeqCst), 1);
    assert_eq!(b_calls.load(Ordering::SeqCst), 1);

    // No intervening writes: the second pass must not evaluate anything.
    graph.update().unwrap();
    assert_eq!(a_calls.load(Ordering::SeqCst), 1);
    assert_eq!(b_calls.load(Ordering::SeqCst), 1);
}

/// A diamond over a shared source settles with one evaluation per node.
#[test]
fn diamond_graph_evaluates_each_node_once_per_pass() {
    let x = TypedCell::new(ValueType::Real);
    let (shared, shared_calls) = doubler("shared");
    let (left, left_calls) = doubler("left");
    let (right, right_calls) = doubler("right");

    let sum_calls = Arc::new(AtomicUsize::new(0));
    let counter = sum_calls.clone();
    let sink = NodeBuilder::new("sink")
        .parameter("a", ValueType::Real)
        .parameter("b", ValueType::Real)
        .output(ValueType::Real)
        .transform(move |params| {
            counter.fetch_add(1, Ordering::SeqCst);
            let Value::Real(a) = params.get("a")? else { unreachable!() };
            let Value::Real(b) = params.get("b")? else { unreachable!() };
            Ok(Value::Real(a + b))
        })
        .build()
        .unwrap();

    shared.bind("x", Arc::new(x.clone())).unwrap();
    left.bind("x", Arc::new(shared.clone())).unwrap();
    right.bind("x", Arc::new(shared.clone())).unwrap();
    sink.bind("a", Arc::new(left)).unwrap();
    sink.bind("b", Arc::new(right)).unwrap();

    let graph = Graph::new(vec![sink.clone()]).unwrap();

    x.write(real(1.0)).unwrap();
    graph.update().unwrap();
    assert_eq!(sink.value(), real(8.0));
    assert_eq!(shared_calls.load(Ordering::SeqCst), 1);
    assert_eq!(left_calls.load(Ordering::SeqCst), 1);
    assert_eq!(right_calls.load(Ordering::SeqCst), 1);
    assert_eq!(sum_calls.load(Ordering::SeqCst), 1);

    x.write(real(2.0)).unwrap();
    graph.update().unwrap();
    assert_eq!(sink.value(), real(16.0));
    assert_eq!(shared_calls.load(Ordering::SeqCst), 2);
    assert_eq!(sum_calls.load(Ordering::SeqCst), 2);
}

/// The consumer callback sees settled output values in terminal order.
#[test]
fn graph_update_delivers_settled_outputs() {
    let less_than_two = Conditional::new(ValueType::Real, |v| match v {
        Value::Real(r) => *r < 2.0,
        _ => false,
    });
    let negate = Conditional::new(ValueType::Bool, |v| !v.is_truthy());
    negate.bind(Conditional::INPUT, Arc::new(less_than_two.clone())).unwrap();

    let graph = Graph::new(vec![negate.node().clone()]).unwrap();

    let mut outputs = Vec::new();
    graph.update_with(|value| outputs.push(*value)).unwrap();
    assert_eq!(outputs, vec![Value::Bool(false)]);

    less_than_two.set(Conditional::INPUT, real(3.0)).unwrap();
    outputs.clear();
    graph.update_with(|value| outputs.push(*value)).unwrap();
    assert_eq!(outputs, vec![Value::Bool(true)]);
}

/// The documented untaint assumption: a transform that produces the same
/// output for different dirty inputs leaves the output clean, so the
/// settle sweep skips the recursive walk and the input stays tainted.
#[test]
fn idempotent_transform_skips_the_untaint_walk() {
    let x = TypedCell::new(ValueType::Real);
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let constant = NodeBuilder::new("constant")
        .parameter("x", ValueType::Real)
        .output(ValueType::Real)
        .transform(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Value::Real(42.0))
        })
        .build()
        .unwrap();
    constant.bind("x", Arc::new(x.clone())).unwrap();

    // First cycle establishes the output and settles everything.
    constant.tainted().unwrap();
    constant.untaint();
    assert!(!x.is_tainted());

    // The input changes but the output settles on the same value, so the
    // node reports clean and the settle sweep never reaches the input.
    x.write(real(7.0)).unwrap();
    assert_eq!(constant.tainted(), Ok(false));
    constant.untaint();
    assert!(x.is_tainted());

    // The still-tainted input retriggers the transform on the next pass.
    assert_eq!(constant.tainted(), Ok(false));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}
