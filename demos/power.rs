use adjoint::{evaluate, Bindings, Complex64, Node};

fn main() {
    let x = Node::variable("x");
    let y = Node::variable("y");
    let f = &(&x * &y.pow(&Node::real(2.))) + &(&(5. * &x.pow(&Node::real(2.))) * &y);

    let bindings = Bindings::from([
        ("x".to_string(), Complex64::new(-1., 0.)),
        ("y".to_string(), Complex64::new(2., 0.)),
    ]);
    let result = evaluate(&f, &bindings).unwrap();
    println!("f = {f}");
    println!("f(x, y) = {}", result.value);
    println!("df/dx = {}", result.derivatives["x"]);
    println!("df/dy = {}", result.derivatives["y"]);

    // The same graph evaluated off the real axis.
    let bindings = Bindings::from([
        ("x".to_string(), Complex64::new(0., 1.)),
        ("y".to_string(), Complex64::new(1., -1.)),
    ]);
    let result = evaluate(&f, &bindings).unwrap();
    println!("f(i, 1 - i) = {}", result.value);
    println!("df/dx = {}", result.derivatives["x"]);
    println!("df/dy = {}", result.derivatives["y"]);
}
