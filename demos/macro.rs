use scalargrad::{scalargrad, Result};

fn main() -> Result<()> {
    env_logger::init();

    scalargrad! {{
        let x = 123.;
        let result = 2. * x + 321. / x;
    }};
    println!("f(x): {}", result.data());
    println!("df/dx: {}", result.derive(&x));
    result.backward();
    println!("x.grad: {}", x.grad());
    if let Err(e) = result.dot(&mut std::io::stdout()) {
        eprintln!("{e}");
    }
    Ok(())
}
