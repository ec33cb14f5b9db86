//! Benchmarks for SSA construction.
//!
//! Measures the fixed-point iteration on synthetic control flow shapes:
//! - Straight-line code (no merges at all)
//! - A chain of branch diamonds (one phi per join)
//! - Nested loops (repeated requeueing until stability)

extern crate ssaflow;

use criterion::{criterion_group, criterion_main, Criterion};
use ssaflow::{
    DirectGraph, Expr, FunctionKind, MethodDescriptor, NodeKind, SsaConstructor, SsaOptions, VarId,
};
use std::hint::black_box;

/// A single block of `len` alternating definitions and reads of one variable.
fn straight_line_graph(len: usize) -> DirectGraph {
    let x = VarId::new(0);
    let mut statements = Vec::with_capacity(len);
    for i in 0..len {
        if i % 2 == 0 {
            statements.push(Expr::assign_local(x, Expr::Const));
        } else {
            statements.push(Expr::local(x));
        }
    }
    let mut graph = DirectGraph::new();
    graph.add_node(NodeKind::Regular, statements);
    graph
}

/// `count` sequential diamonds, each redefining the variable on one arm and
/// reading it at the join.
fn diamond_chain_graph(count: usize) -> DirectGraph {
    let x = VarId::new(0);
    let mut graph = DirectGraph::new();
    let mut prev = graph.add_node(NodeKind::Regular, vec![Expr::assign_local(x, Expr::Const)]);
    for _ in 0..count {
        let then = graph.add_node(NodeKind::Regular, vec![Expr::assign_local(x, Expr::Const)]);
        let join = graph.add_node(NodeKind::Regular, vec![Expr::local(x)]);
        graph.add_edge(prev, then).unwrap();
        graph.add_edge(prev, join).unwrap();
        graph.add_edge(then, join).unwrap();
        graph.set_negative_branch(prev, join).unwrap();
        prev = join;
    }
    graph
}

/// A doubly nested counting loop with increments in the inner body.
fn nested_loop_graph() -> DirectGraph {
    let i = VarId::new(0);
    let j = VarId::new(1);
    let mut graph = DirectGraph::new();
    let init = graph.add_node(NodeKind::Regular, vec![Expr::assign_local(i, Expr::Const)]);
    let outer = graph.add_node(NodeKind::Regular, vec![Expr::local(i)]);
    let inner_init = graph.add_node(NodeKind::Regular, vec![Expr::assign_local(j, Expr::Const)]);
    let inner = graph.add_node(NodeKind::Regular, vec![Expr::local(j)]);
    let body = graph.add_node(
        NodeKind::Regular,
        vec![Expr::function(
            FunctionKind::PostIncrement,
            vec![Expr::local(j)],
        )],
    );
    let outer_step = graph.add_node(
        NodeKind::Regular,
        vec![Expr::function(
            FunctionKind::PostIncrement,
            vec![Expr::local(i)],
        )],
    );
    let exit = graph.add_node(NodeKind::Regular, vec![Expr::local(i)]);

    graph.add_edge(init, outer).unwrap();
    graph.add_edge(outer, inner_init).unwrap();
    graph.add_edge(outer, exit).unwrap();
    graph.set_negative_branch(outer, exit).unwrap();
    graph.add_edge(inner_init, inner).unwrap();
    graph.add_edge(inner, body).unwrap();
    graph.add_edge(inner, outer_step).unwrap();
    graph.set_negative_branch(inner, outer_step).unwrap();
    graph.add_edge(body, inner).unwrap();
    graph.add_edge(outer_step, outer).unwrap();
    graph
}

fn bench_straight_line(c: &mut Criterion) {
    let template = straight_line_graph(512);
    let method = MethodDescriptor::new(false, &[]);

    c.bench_function("ssa_straight_line_512", |b| {
        b.iter(|| {
            let mut graph = template.clone();
            let form = SsaConstructor::new(SsaOptions::empty())
                .split_variables(black_box(&mut graph), &method)
                .unwrap();
            black_box(form)
        });
    });
}

fn bench_diamond_chain(c: &mut Criterion) {
    let template = diamond_chain_graph(64);
    let method = MethodDescriptor::new(false, &[]);

    c.bench_function("ssa_diamond_chain_64", |b| {
        b.iter(|| {
            let mut graph = template.clone();
            let form = SsaConstructor::new(SsaOptions::empty())
                .split_variables(black_box(&mut graph), &method)
                .unwrap();
            black_box(form)
        });
    });
}

fn bench_nested_loops(c: &mut Criterion) {
    let template = nested_loop_graph();
    let method = MethodDescriptor::new(false, &[]);
    let options = SsaOptions::INCREMENT_ON_USAGE | SsaOptions::TRACK_PHANTOM_INCREMENTS;

    c.bench_function("ssa_nested_loops", |b| {
        b.iter(|| {
            let mut graph = template.clone();
            let form = SsaConstructor::new(options)
                .split_variables(black_box(&mut graph), &method)
                .unwrap();
            black_box(form)
        });
    });
}

criterion_group!(
    benches,
    bench_straight_line,
    bench_diamond_chain,
    bench_nested_loops
);
criterion_main!(benches);
