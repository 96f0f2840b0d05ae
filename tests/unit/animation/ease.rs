use super::*;

const ALL: [Ease; 5] = [Ease::Linear, Ease::In, Ease::Out, Ease::InOut, Ease::Smooth];

#[test]
fn curves_pin_both_ends() {
    for ease in ALL {
        assert_eq!(ease.apply(0.0), 0.0, "{ease:?}");
        assert_eq!(ease.apply(1.0), 1.0, "{ease:?}");
    }
}

#[test]
fn curves_increase_through_the_interior() {
    for ease in ALL {
        let samples: Vec<f64> = (1..10).map(|i| ease.apply(f64::from(i) / 10.0)).collect();
        assert!(samples.windows(2).all(|w| w[0] < w[1]), "{ease:?}");
    }
}

#[test]
fn out_mirrors_in_and_symmetric_curves_cross_the_midpoint() {
    assert_eq!(Ease::In.apply(0.5), 0.125);
    assert_eq!(Ease::Out.apply(0.5), 0.875);
    assert_eq!(Ease::InOut.apply(0.5), 0.5);
    assert_eq!(Ease::Smooth.apply(0.5), 0.5);
}

#[test]
fn input_outside_the_unit_interval_is_clamped() {
    assert_eq!(Ease::In.apply(-3.0), 0.0);
    assert_eq!(Ease::Out.apply(7.0), 1.0);
}
