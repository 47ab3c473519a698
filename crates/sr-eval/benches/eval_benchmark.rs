use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sr_core::{Dataset, Node, NodeKind, Range, Tree};
use sr_eval::{evaluate_trees, DerivativeCalculator, Interpreter};
use std::hint::black_box;

fn make_dataset(rows: usize) -> Dataset {
    let mut rng = StdRng::seed_from_u64(42);
    let x: Vec<f64> = (0..rows).map(|_| rng.gen_range(-2.0..2.0)).collect();
    let y: Vec<f64> = (0..rows).map(|_| rng.gen_range(0.1..3.0)).collect();
    Dataset::from_columns([("x".to_string(), x), ("y".to_string(), y)]).unwrap()
}

/// c0 * sin(c1 * x) + c2 * exp(c3 * y) + aq(x, y) * c4 + c5
fn make_tree(ds: &Dataset) -> Tree {
    let x = ds.hash_of("x").unwrap();
    let y = ds.hash_of("y").unwrap();
    Tree::new(vec![
        Node::constant(0.8).with_optimize(true),
        Node::constant(1.3).with_optimize(true),
        Node::variable(x, 1.0),
        Node::new(NodeKind::Mul),
        Node::new(NodeKind::Sin),
        Node::new(NodeKind::Mul),
        Node::constant(0.4).with_optimize(true),
        Node::constant(0.3).with_optimize(true),
        Node::variable(y, 1.0),
        Node::new(NodeKind::Mul),
        Node::new(NodeKind::Exp),
        Node::new(NodeKind::Mul),
        Node::variable(x, 1.0),
        Node::variable(y, 1.0),
        Node::new(NodeKind::Aq),
        Node::constant(-0.7).with_optimize(true),
        Node::new(NodeKind::Mul),
        Node::constant(0.2).with_optimize(true),
        Node::new(NodeKind::Add).with_arity(4),
    ])
    .unwrap()
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    for rows in [256usize, 4096, 65536] {
        let ds = make_dataset(rows);
        let tree = make_tree(&ds);
        let interpreter = Interpreter::<f64>::new();
        let range = Range::new(0, rows);

        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::new("primal", rows), &rows, |b, _| {
            b.iter(|| black_box(interpreter.evaluate(&tree, &ds, range, None).unwrap()))
        });
    }

    group.finish();
}

fn bench_jacobian(c: &mut Criterion) {
    let mut group = c.benchmark_group("jacobian");

    for rows in [256usize, 4096] {
        let ds = make_dataset(rows);
        let tree = make_tree(&ds);
        let coeff = tree.coefficients();
        let range = Range::new(0, rows);

        let calc4 = DerivativeCalculator::<4>::new();
        group.throughput(Throughput::Elements((rows * coeff.len()) as u64));
        group.bench_with_input(BenchmarkId::new("dual4", rows), &rows, |b, _| {
            b.iter(|| black_box(calc4.jacobian(&tree, &ds, &coeff, range).unwrap()))
        });

        let calc8 = DerivativeCalculator::<8>::new();
        group.bench_with_input(BenchmarkId::new("dual8", rows), &rows, |b, _| {
            b.iter(|| black_box(calc8.jacobian(&tree, &ds, &coeff, range).unwrap()))
        });
    }

    group.finish();
}

fn bench_evaluate_many(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate_many");

    let rows = 4096;
    let ds = make_dataset(rows);
    let trees: Vec<Tree> = (0..64).map(|_| make_tree(&ds)).collect();
    let range = Range::new(0, rows);

    for n_threads in [1usize, 0] {
        group.bench_with_input(
            BenchmarkId::new("trees64", format!("threads{n_threads}")),
            &n_threads,
            |b, &n| b.iter(|| black_box(evaluate_trees(&trees, &ds, range, n).unwrap())),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_jacobian, bench_evaluate_many);
criterion_main!(benches);
