use burn::tensor::{PrintOptions, set_print_options};
use num::Float;

pub fn set_tensor_dbg_precision(prec: usize) {
    let po = PrintOptions {
        precision: Option::Some(prec),
        edge_items: 10,
        ..Default::default()
    };

    set_print_options(po);
}

// Helper function for comparing floats
pub fn assert_approx_eq<F>(a: &F, b: &F, epsilon: F)
where
    F: Float + std::fmt::Display + std::fmt::Debug,
{
    assert!(
        (*a - *b).abs() <= epsilon,
        "Values differ: {:?} vs {:?} (tolerance: {:?})",
        *a,
        *b,
        epsilon
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_approx_eq_within_tolerance() {
        assert_approx_eq(&0.3f64, &(0.1 + 0.2), 1e-12);
        assert_approx_eq(&1.0f32, &1.0005, 1e-3);
    }

    #[test]
    #[should_panic(expected = "Values differ")]
    fn test_assert_approx_eq_outside_tolerance() {
        assert_approx_eq(&0.5f64, &0.6, 1e-3);
    }
}
