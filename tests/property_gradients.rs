use proptest::prelude::*;
use scalargrad::{ops, Result, Value};

fn close(lhs: f64, rhs: f64, tol: f64) -> bool {
    (lhs - rhs).abs() <= tol * (1. + lhs.abs().max(rhs.abs()))
}

/// f(a, b) = a * b + b^3 + tanh(a) * exp(b) - a / (1 + b^2)
fn smooth(a: &Value, b: &Value) -> Result<Value> {
    let denom = 1. + b.pow(2.)?;
    Ok(a * b + b.pow(3.)? + a.tanh() * b.exp() - (a / &denom)?)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_matches_analytic_partials(a in -3.0f64..3.0, b in -3.0f64..3.0) {
        let (va, vb) = (Value::new(a), Value::new(b));
        let f = smooth(&va, &vb).unwrap();
        f.backward();

        let sech2 = 1. - a.tanh().powi(2);
        let denom = 1. + b * b;
        let dfda = b + sech2 * b.exp() - 1. / denom;
        let dfdb = a + 3. * b * b + a.tanh() * b.exp() + 2. * a * b / (denom * denom);

        prop_assert!(close(va.grad(), dfda, 1e-9), "df/da {} vs {}", va.grad(), dfda);
        prop_assert!(close(vb.grad(), dfdb, 1e-9), "df/db {} vs {}", vb.grad(), dfdb);
    }

    #[test]
    fn prop_backward_agrees_with_derive(a in -3.0f64..3.0, b in -3.0f64..3.0) {
        let (va, vb) = (Value::new(a), Value::new(b));
        let f = smooth(&va, &vb).unwrap();
        f.backward();
        prop_assert!(close(va.grad(), f.derive(&va), 1e-9));
        prop_assert!(close(vb.grad(), f.derive(&vb), 1e-9));
    }

    #[test]
    fn prop_finite_difference(a in -3.0f64..3.0, b in -3.0f64..3.0) {
        let va = Value::new(a);
        let f = smooth(&va, &Value::new(b)).unwrap();
        f.backward();

        let h = 1e-6;
        let at = |a: f64| smooth(&Value::new(a), &Value::new(b)).unwrap().data();
        let numeric = (at(a + h) - at(a - h)) / (2. * h);
        prop_assert!(close(va.grad(), numeric, 1e-4), "{} vs {}", va.grad(), numeric);
    }

    #[test]
    fn prop_repeated_backward_doubles(a in -3.0f64..3.0, b in -3.0f64..3.0) {
        let (va, vb) = (Value::new(a), Value::new(b));
        let f = smooth(&va, &vb).unwrap();
        f.backward();
        let (ga, gb) = (va.grad(), vb.grad());
        f.backward();
        prop_assert_eq!(va.grad(), 2. * ga);
        prop_assert_eq!(vb.grad(), 2. * gb);
        prop_assert_eq!(f.grad(), 2.);
    }

    #[test]
    fn prop_fan_out_sums_paths(x in -10.0f64..10.0, copies in 1usize..50) {
        let vx = Value::new(x);
        let total: Value = std::iter::repeat(&vx).take(copies).sum();
        let y = ops::mul(&total, &vx);
        y.backward();
        // y = k x^2
        prop_assert_eq!(y.topological_order().len(), copies + 1);
        prop_assert!(close(vx.grad(), 2. * copies as f64 * x, 1e-12));
    }

    #[test]
    fn prop_relu_gradient_is_step(x in -5.0f64..5.0) {
        let vx = Value::new(x);
        let y = vx.relu();
        y.backward();
        prop_assert_eq!(y.data(), x.max(0.));
        prop_assert_eq!(vx.grad(), if x > 0. { 1. } else { 0. });
    }
}
