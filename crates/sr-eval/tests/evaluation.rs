//! End-to-end evaluation tests: literal scenarios, fold semantics,
//! kernel/std parity, block independence, and the error contracts.

use approx::assert_relative_eq;
use sr_core::{Dataset, Node, NodeKind, Range, Tree};
use sr_eval::{evaluate_trees, evaluate_trees_into, DispatchTable, Interpreter, Kernel};
use std::sync::Arc;

fn dataset(columns: &[(&str, Vec<f64>)]) -> Dataset {
    Dataset::from_columns(columns.iter().map(|(n, c)| (n.to_string(), c.clone()))).unwrap()
}

fn var(ds: &Dataset, name: &str, weight: f64) -> Node {
    Node::variable(ds.hash_of(name).unwrap(), weight)
}

fn tree(nodes: Vec<Node>) -> Tree {
    Tree::new(nodes).unwrap()
}

#[test]
fn test_constant_tree_broadcasts() {
    let ds = dataset(&[("x", vec![0.0; 5])]);
    let t = tree(vec![Node::constant(3.5)]);
    let out = Interpreter::<f64>::new().evaluate(&t, &ds, Range::new(0, 5), None).unwrap();
    assert_eq!(out, vec![3.5; 5]);
}

#[test]
fn test_weighted_variable() {
    let ds = dataset(&[("x", vec![1.0, 2.0, 3.0, 4.0])]);
    let t = tree(vec![var(&ds, "x", 2.0)]);
    let out = Interpreter::<f64>::new().evaluate(&t, &ds, Range::new(0, 4), None).unwrap();
    assert_eq!(out, vec![2.0, 4.0, 6.0, 8.0]);
}

#[test]
fn test_binary_add_per_row() {
    let ds = dataset(&[("x", vec![1.0, 2.0, 3.0]), ("y", vec![10.0, 20.0, 30.0])]);
    let t = tree(vec![var(&ds, "x", 1.0), var(&ds, "y", 1.0), Node::new(NodeKind::Add)]);
    let out = Interpreter::<f64>::new().evaluate(&t, &ds, Range::new(0, 3), None).unwrap();
    assert_eq!(out, vec![11.0, 22.0, 33.0]);
}

#[test]
fn test_variadic_mul_arity_five() {
    let ds = dataset(&[("x", vec![0.0; 4])]);
    let t = tree(vec![
        Node::constant(2.0),
        Node::constant(3.0),
        Node::constant(5.0),
        Node::constant(7.0),
        Node::constant(11.0),
        Node::new(NodeKind::Mul).with_arity(5),
    ]);
    let out = Interpreter::<f64>::new().evaluate(&t, &ds, Range::new(0, 4), None).unwrap();
    assert_eq!(out, vec![2310.0; 4]);
}

#[test]
fn test_nary_sub_fold() {
    let ds = dataset(&[("x", vec![0.0; 3])]);
    let t = tree(vec![
        Node::constant(10.0),
        Node::constant(1.0),
        Node::constant(2.0),
        Node::constant(3.0),
        Node::new(NodeKind::Sub).with_arity(4),
    ]);
    let out = Interpreter::<f64>::new().evaluate(&t, &ds, Range::new(0, 3), None).unwrap();
    assert_eq!(out, vec![4.0; 3]);
}

#[test]
fn test_parameter_override() {
    let ds = dataset(&[("x", vec![0.0; 2])]);
    let t = tree(vec![
        Node::constant(2.0).with_optimize(true),
        Node::constant(3.0).with_optimize(true),
        Node::constant(5.0).with_optimize(true),
        Node::constant(7.0).with_optimize(true),
        Node::constant(11.0).with_optimize(true),
        Node::new(NodeKind::Mul).with_arity(5),
    ]);
    let interpreter = Interpreter::<f64>::new();
    let out = interpreter.evaluate(&t, &ds, Range::new(0, 2), Some(&[1.0; 5])).unwrap();
    assert_eq!(out, vec![1.0; 2]);

    // Without parameters the in-tree values are used.
    let out = interpreter.evaluate(&t, &ds, Range::new(0, 2), None).unwrap();
    assert_eq!(out, vec![2310.0; 2]);

    // Substituting the parameters into the tree gives the same output.
    let mut substituted = t.clone();
    substituted.set_coefficients(&[1.0; 5]).unwrap();
    let out = interpreter.evaluate(&substituted, &ds, Range::new(0, 2), None).unwrap();
    assert_eq!(out, vec![1.0; 2]);
}

/// A deterministic but non-trivial column.
fn ramp(n: usize, scale: f64, offset: f64) -> Vec<f64> {
    (0..n).map(|i| offset + scale * (i as f64) + (i as f64 * 0.7).sin()).collect()
}

fn sample_tree(ds: &Dataset) -> Tree {
    // sin(x) * y + x / (1 + y^2)
    tree(vec![
        var(ds, "x", 1.0),
        Node::new(NodeKind::Sin),
        var(ds, "y", 1.0),
        Node::new(NodeKind::Mul),
        var(ds, "x", 1.0),
        var(ds, "y", 1.0),
        Node::new(NodeKind::Aq),
        Node::new(NodeKind::Add),
    ])
}

#[test]
fn test_block_independence() {
    let n = 150;
    let ds = dataset(&[("x", ramp(n, 0.05, -2.0)), ("y", ramp(n, -0.03, 1.5))]);
    let t = sample_tree(&ds);
    let interpreter = Interpreter::<f64>::new();

    let full = interpreter.evaluate(&t, &ds, Range::new(0, n), None).unwrap();
    assert_eq!(full.len(), n);

    // Splitting the range at any point must reproduce the full output.
    for split in [1, 63, 64, 65, 97, n - 1] {
        let head = interpreter.evaluate(&t, &ds, Range::new(0, split), None).unwrap();
        let tail = interpreter.evaluate(&t, &ds, Range::new(split, n), None).unwrap();
        let stitched: Vec<f64> = head.into_iter().chain(tail).collect();
        assert_eq!(stitched, full);
    }

    // External tiling is output-equivalent.
    for batch in [1, 7, 64, 1000] {
        let tiled = interpreter.evaluate_batched(&t, &ds, Range::new(0, n), batch, None).unwrap();
        assert_eq!(tiled, full);
    }
}

#[test]
fn test_unary_kernels_match_std() {
    let cases: &[(NodeKind, fn(f64) -> f64)] = &[
        (NodeKind::Abs, f64::abs),
        (NodeKind::Acos, f64::acos),
        (NodeKind::Asin, f64::asin),
        (NodeKind::Atan, f64::atan),
        (NodeKind::Cbrt, f64::cbrt),
        (NodeKind::Ceil, f64::ceil),
        (NodeKind::Cos, f64::cos),
        (NodeKind::Cosh, f64::cosh),
        (NodeKind::Exp, f64::exp),
        (NodeKind::Floor, f64::floor),
        (NodeKind::Log, f64::ln),
        (NodeKind::Logabs, |x| x.abs().ln()),
        (NodeKind::Log1p, f64::ln_1p),
        (NodeKind::Sin, f64::sin),
        (NodeKind::Sinh, f64::sinh),
        (NodeKind::Sqrt, f64::sqrt),
        (NodeKind::Sqrtabs, |x| x.abs().sqrt()),
        (NodeKind::Tan, f64::tan),
        (NodeKind::Tanh, f64::tanh),
        (NodeKind::Square, |x| x * x),
    ];

    // Values inside every kind's domain of interest (asin/acos need [-1, 1]).
    let xs: Vec<f64> = (0..80).map(|i| -0.99 + 0.025 * i as f64).collect();
    let ds = dataset(&[("x", xs.clone())]);
    let interpreter = Interpreter::<f64>::new();

    for &(kind, reference) in cases {
        let t = tree(vec![var(&ds, "x", 1.0), Node::new(kind)]);
        let out = interpreter.evaluate(&t, &ds, Range::new(0, xs.len()), None).unwrap();
        for (o, x) in out.iter().zip(&xs) {
            let expected = reference(*x);
            if expected.is_nan() {
                assert!(o.is_nan(), "{kind}: expected NaN at x={x}, got {o}");
            } else {
                assert_relative_eq!(*o, expected, epsilon = 1e-14, max_relative = 1e-14);
            }
        }
    }
}

#[test]
fn test_pow_and_aq() {
    let ds = dataset(&[("x", vec![1.0, 2.0, 3.0]), ("y", vec![2.0, 3.0, 0.5])]);
    let interpreter = Interpreter::<f64>::new();

    let t = tree(vec![var(&ds, "x", 1.0), var(&ds, "y", 1.0), Node::new(NodeKind::Pow)]);
    let out = interpreter.evaluate(&t, &ds, Range::new(0, 3), None).unwrap();
    assert_relative_eq!(out[0], 1.0);
    assert_relative_eq!(out[1], 8.0);
    assert_relative_eq!(out[2], 3.0_f64.sqrt(), epsilon = 1e-14);

    let t = tree(vec![var(&ds, "x", 1.0), var(&ds, "y", 1.0), Node::new(NodeKind::Aq)]);
    let out = interpreter.evaluate(&t, &ds, Range::new(0, 3), None).unwrap();
    for (o, (x, y)) in out.iter().zip([(1.0, 2.0), (2.0, 3.0), (3.0, 0.5_f64)]) {
        assert_relative_eq!(*o, x / (1.0 + y * y).sqrt(), epsilon = 1e-14);
    }
}

#[test]
fn test_division_by_zero_propagates_ieee() {
    let ds = dataset(&[("x", vec![1.0, -1.0, 0.0])]);
    let t = tree(vec![var(&ds, "x", 1.0), Node::new(NodeKind::Div).with_arity(1)]);
    let out = Interpreter::<f64>::new().evaluate(&t, &ds, Range::new(0, 3), None).unwrap();
    assert_eq!(out[0], 1.0);
    assert_eq!(out[1], -1.0);
    assert!(out[2].is_infinite());

    let t = tree(vec![var(&ds, "x", 1.0), Node::new(NodeKind::Log)]);
    let out = Interpreter::<f64>::new().evaluate(&t, &ds, Range::new(0, 3), None).unwrap();
    assert!(out[1].is_nan());
}

#[test]
fn test_dynamic_kind_requires_registration() {
    let ds = dataset(&[("x", vec![0.0, 1.0, -3.0])]);
    let t = tree(vec![var(&ds, "x", 1.0), Node::new(NodeKind::Dynamic).with_arity(1)]);

    // Unregistered Dynamic is a contract violation.
    let plain = Interpreter::<f64>::new();
    assert!(plain.evaluate(&t, &ds, Range::new(0, 3), None).is_err());

    // A registered kernel makes the same tree evaluable: logistic sigmoid.
    let sigmoid: Kernel<f64> = Arc::new(|buf, _nodes, parent, rows| {
        let width = buf.width();
        let (children, dst) = buf.split_at_parent(parent);
        let child = parent - 1;
        let src = &children[child * width..child * width + rows];
        for j in 0..rows {
            dst[j] = 1.0 / (1.0 + (-src[j]).exp());
        }
    });
    let mut table = DispatchTable::<f64>::new();
    table.register(NodeKind::Dynamic, sigmoid).unwrap();
    let out = Interpreter::with_table(table).evaluate(&t, &ds, Range::new(0, 3), None).unwrap();
    assert_relative_eq!(out[0], 0.5);
    assert_relative_eq!(out[1], 1.0 / (1.0 + (-1.0_f64).exp()), epsilon = 1e-14);
}

#[test]
fn test_contract_violations_are_reported() {
    let ds = dataset(&[("x", vec![1.0, 2.0])]);
    let interpreter = Interpreter::<f64>::new();

    // Empty tree.
    let empty = Tree::new(vec![]).unwrap();
    assert!(interpreter.evaluate(&empty, &ds, Range::new(0, 2), None).is_err());

    // Unknown variable hash.
    let stray = tree(vec![Node::variable(0xbad_c0de, 1.0)]);
    assert!(interpreter.evaluate(&stray, &ds, Range::new(0, 2), None).is_err());

    // Range outside the dataset.
    let t = tree(vec![var(&ds, "x", 1.0)]);
    assert!(interpreter.evaluate(&t, &ds, Range::new(0, 3), None).is_err());

    // Mis-sized output span.
    let mut short = vec![0.0; 1];
    assert!(interpreter.evaluate_into(&t, &ds, Range::new(0, 2), &mut short, None).is_err());

    // Parameter vector length must match the optimizable-leaf count.
    let opt = tree(vec![
        Node::constant(1.0).with_optimize(true),
        Node::constant(2.0).with_optimize(true),
        Node::new(NodeKind::Add),
    ]);
    assert!(interpreter.evaluate(&opt, &ds, Range::new(0, 2), Some(&[1.0])).is_err());
    assert!(interpreter.evaluate(&opt, &ds, Range::new(0, 2), Some(&[1.0, 2.0, 3.0])).is_err());
    assert!(interpreter.evaluate(&opt, &ds, Range::new(0, 2), Some(&[1.0, 2.0])).is_ok());
}

#[test]
fn test_evaluate_many_matches_single_tree_runs() {
    let n = 100;
    let ds = dataset(&[("x", ramp(n, 0.1, 0.0)), ("y", ramp(n, 0.2, 1.0))]);
    let trees = vec![
        tree(vec![var(&ds, "x", 1.0), Node::new(NodeKind::Tanh)]),
        sample_tree(&ds),
        tree(vec![var(&ds, "x", 1.0), var(&ds, "y", 1.0), Node::new(NodeKind::Mul)]),
        tree(vec![Node::constant(4.25)]),
    ];
    let range = Range::new(10, 90);

    let interpreter = Interpreter::<f64>::new();
    let expected: Vec<Vec<f64>> =
        trees.iter().map(|t| interpreter.evaluate(t, &ds, range, None).unwrap()).collect();

    for n_threads in [0, 1, 2] {
        let got = evaluate_trees(&trees, &ds, range, n_threads).unwrap();
        assert_eq!(got, expected);
    }

    // Row-major buffer form.
    let mut flat = vec![0.0; trees.len() * range.size()];
    evaluate_trees_into(&trees, &ds, range, &mut flat, 2).unwrap();
    for (i, row) in expected.iter().enumerate() {
        assert_eq!(&flat[i * range.size()..(i + 1) * range.size()], row.as_slice());
    }

    // Mis-sized buffer is rejected.
    let mut wrong = vec![0.0; 3];
    assert!(evaluate_trees_into(&trees, &ds, range, &mut wrong, 0).is_err());
}
