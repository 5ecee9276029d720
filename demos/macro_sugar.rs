use adjoint::{evaluate, Bindings, Complex64};
use adjoint_macro::adjoint;

fn main() {
    adjoint! {{
        let x;
        let result = 2. * x + 321.;
        let wave = sin(x) * exp(-1 * x);
    }};
    let bindings = Bindings::from([("x".to_string(), Complex64::new(123., 0.))]);

    let res = evaluate(&result, &bindings).unwrap();
    println!("f(x): {}", res.value);
    println!("df/dx: {}", res.derivatives["x"]);

    let res = evaluate(&wave, &bindings).unwrap();
    println!("{wave}: {}", res.value);
    println!("d/dx: {}", res.derivatives["x"]);
}
