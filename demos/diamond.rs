//! Dependency graph in diamond shape. It evaluates the same term twice, so the derivative should add up.

use adjoint::{evaluate, Bindings, Complex64, Node};

fn main() {
    let a = Node::variable("a");
    let b = Node::variable("b");
    let c = Node::variable("c");
    let a2 = 0. - &a;
    let ab = &a2 + &b;
    let ac = &a2 + &c;
    let abac = &ab + &ac;

    let bindings = Bindings::from([
        ("a".to_string(), Complex64::new(1., 0.)),
        ("b".to_string(), Complex64::new(3., 0.)),
        ("c".to_string(), Complex64::new(5., 0.)),
    ]);
    let result = evaluate(&abac, &bindings).unwrap();
    println!("{abac} = {}", result.value);
    for name in abac.variables() {
        println!("d/d{name}: {}", result.derivatives[&name]);
    }
}
