//! Dependency graph in diamond shape. It uses the same term twice, so the derivative should add up.

use scalargrad::Value;

fn main() -> std::io::Result<()> {
    env_logger::init();

    let a = Value::named("a", 1.);
    let a2 = -&a;
    let b = Value::named("b", 3.);
    let c = Value::named("c", 5.);
    let ab = &a2 + &b;
    let ac = &a2 + &c;
    let abac = &ab + &ac;

    abac.backward();
    println!("abac: {}", abac.grad());
    println!("a: {}", a.grad());
    println!("b: {}", b.grad());
    println!("c: {}", c.grad());

    let mut file = std::io::BufWriter::new(std::fs::File::create("diamond.dot")?);
    abac.dot(&mut file)?;
    abac.dot(&mut std::io::stdout())
}
