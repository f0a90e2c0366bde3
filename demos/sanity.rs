//! The classic sanity-check expression. Prints the gradient of `y` with respect to `x` and the
//! graph in graphviz dot format.

use scalargrad::Value;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let x = Value::named("x", -4.);
    let z = 2. * &x + 2. + &x;
    let q = z.relu() + &z * &x;
    let h = (&z * &z).relu();
    let y = &h + &q + &q * &x;
    y.backward();

    println!("y: {}, dy/dx: {}", y.data(), x.grad());
    println!("forward-mode dy/dx: {}", y.derive(&x));

    let halved = (&y / 2.)?;
    println!("y / 2: {halved}");

    y.dot(&mut std::io::stdout())?;
    Ok(())
}
