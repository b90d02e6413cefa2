/// Coefficients of an explicit Runge-Kutta method.
///
/// Only the strictly lower triangle of `a` is read.
#[derive(Clone, Copy, Debug)]
pub struct ButcherTableau<const STAGES: usize> {
    pub a: [[f64; STAGES]; STAGES],
    pub b: [f64; STAGES],
    pub c: [f64; STAGES],
    pub order: usize,
}

impl ButcherTableau<1> {
    // usage is ButcherTableau::<1>::EULER
    pub const EULER: Self = Self {
        a: [[0.]],
        b: [1.],
        c: [0.],
        order: 1,
    };
}

impl ButcherTableau<2> {
    pub const MIDPOINT: Self = Self {
        a: [[0., 0.], [1. / 2., 0.]],
        b: [0., 1.],
        c: [0., 1. / 2.],
        order: 2,
    };
}

impl ButcherTableau<3> {
    // Kutta's third order method
    pub const RK3: Self = Self {
        a: [[0., 0., 0.], [1. / 2., 0., 0.], [-1., 2., 0.]],
        b: [1. / 6., 2. / 3., 1. / 6.],
        c: [0., 1. / 2., 1.],
        order: 3,
    };
}

impl ButcherTableau<4> {
    // usage is ButcherTableau::<4>::RK4
    pub const RK4: Self = Self {
        a: [
            [0., 0., 0., 0.],
            [1. / 2., 0., 0., 0.],
            [0., 1. / 2., 0., 0.],
            [0., 0., 1., 0.],
        ],
        b: [1. / 6., 1. / 3., 1. / 3., 1. / 6.],
        c: [0., 1.0 / 2.0, 1.0 / 2.0, 1.0],
        order: 4,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn check_consistency<const S: usize>(tableau: &ButcherTableau<S>) {
        // weights sum to one and each c is the row sum of a
        assert_abs_diff_eq!(tableau.b.iter().sum::<f64>(), 1.0, epsilon = 1e-15);
        for s in 0..S {
            assert_abs_diff_eq!(tableau.a[s].iter().sum::<f64>(), tableau.c[s], epsilon = 1e-15);
            for i in s..S {
                assert_eq!(tableau.a[s][i], 0.0, "tableau must be explicit");
            }
        }
    }

    #[test]
    fn tableaus_are_consistent() {
        check_consistency(&ButcherTableau::<1>::EULER);
        check_consistency(&ButcherTableau::<2>::MIDPOINT);
        check_consistency(&ButcherTableau::<3>::RK3);
        check_consistency(&ButcherTableau::<4>::RK4);
    }
}
