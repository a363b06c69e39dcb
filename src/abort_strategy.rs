use crate::Primitive;

/// Enum with possible abort strategies.
/// These strategies decide when [`KMeans::kmeans_lloyd`](crate::KMeans::kmeans_lloyd) stops calling
/// [`KMeans::step`](crate::KMeans::step). Independent of the strategy, a run never exceeds its `max_iter` cap.
#[derive(Clone, Debug, PartialEq)]
pub enum AbortStrategy<T: Primitive> {
    /// Stop as soon as an iteration leaves every cluster's membership unchanged.
    /// This is the natural k-means fixed point and the default.
    StableAssignments,
    /// Stop directly after an iteration produced no improvement of the distance sum where
    /// `improvement > threshold` for the first time.
    /// ## Fields:
    /// - **threshold**: Threshold, used to detect an improvement (`improvement > threshold`)
    NoImprovement { threshold: T },
    /// Stop when there have not been any improvements of the distance sum after **x** iterations,
    /// where `improvement > threshold`.
    /// ## Fields:
    /// - **x**: The amount of consecutive iterations without improvement, after which the run stops
    /// - **threshold**: Threshold, used to detect an improvement (`improvement > threshold`)
    /// - **abort_on_negative**: Whether a negative improvement stops the run instantly (**true**), or is
    ///   counted as "no improvement" (**false**).
    NoImprovementForXIterations { x: usize, threshold: T, abort_on_negative: bool },
}
impl<T: Primitive> Default for AbortStrategy<T> {
    fn default() -> Self { AbortStrategy::StableAssignments }
}
impl<T: Primitive> AbortStrategy<T> {
    pub(crate) fn create_logic(&self) -> Box<dyn AbortStrategyLogic<T>> {
        match *self {
            AbortStrategy::StableAssignments => Box::new(StableAssignmentsLogic),
            AbortStrategy::NoImprovement { threshold } => Box::new(NoImprovementLogic {
                threshold,
                prev_error: T::infinity(),
            }),
            AbortStrategy::NoImprovementForXIterations { x, threshold, abort_on_negative } => {
                Box::new(NoImprovementForXIterationsLogic {
                    x, threshold, abort_on_negative,
                    prev_error: T::infinity(),
                    no_improvement_counter: 0,
                })
            }
        }
    }
}

pub(crate) trait AbortStrategyLogic<T: Primitive> {
    /// Has to be called once per finished iteration.
    /// ## Arguments
    /// - **converged**: Whether the iteration left all cluster memberships unchanged
    /// - **error**: The distance sum after the iteration
    /// ## Returns
    /// - **true** if the calculation should continue
    /// - **false** if the calculation should stop
    fn next(&mut self, converged: bool, error: T) -> bool;
}

struct StableAssignmentsLogic;
impl<T: Primitive> AbortStrategyLogic<T> for StableAssignmentsLogic {
    fn next(&mut self, converged: bool, _: T) -> bool { !converged }
}

struct NoImprovementLogic<T: Primitive> {
    threshold: T,
    prev_error: T,
}
impl<T: Primitive> AbortStrategyLogic<T> for NoImprovementLogic<T> {
    fn next(&mut self, _: bool, error: T) -> bool {
        let improvement = self.prev_error - error;
        self.prev_error = error;
        improvement > self.threshold
    }
}

struct NoImprovementForXIterationsLogic<T: Primitive> {
    x: usize,
    threshold: T,
    abort_on_negative: bool,
    prev_error: T,
    no_improvement_counter: usize,
}
impl<T: Primitive> AbortStrategyLogic<T> for NoImprovementForXIterationsLogic<T> {
    fn next(&mut self, _: bool, error: T) -> bool {
        let improvement = self.prev_error - error;
        self.prev_error = error;
        if self.abort_on_negative && improvement < T::zero() {
            return false;
        }
        if improvement > self.threshold { // positive improvement: reset no-improv-counter
            self.no_improvement_counter = 0;
        } else {
            self.no_improvement_counter += 1;
        }
        self.no_improvement_counter < self.x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t<T: Primitive>(v: f64) -> T { T::from(v).unwrap() }

    #[test]
    fn stable_assignments_follows_convergence_flag() {
        let mut logic = AbortStrategy::<f64>::StableAssignments.create_logic();
        assert!(logic.next(false, 100.0));
        // distance sum is irrelevant for this strategy
        assert!(logic.next(false, 100.0));
        assert!(!logic.next(true, 50.0));
    }

    #[test] fn no_improvement_f32() { no_improvement::<f32>(); }
    #[test] fn no_improvement_f64() { no_improvement::<f64>(); }

    fn no_improvement<T: Primitive>() {
        let strategy = AbortStrategy::NoImprovement { threshold: t::<T>(0.5) };
        {
            let mut logic = strategy.create_logic();
            assert!(logic.next(false, t(3000.0)));
            assert!(!logic.next(false, t(3000.0)));
        }
        {
            let mut logic = strategy.create_logic();
            assert!(logic.next(false, t(3000.0)));
            assert!(!logic.next(false, t(2999.75)));
        }
        {
            let mut logic = strategy.create_logic();
            assert!(logic.next(false, t(3000.0)));
            assert!(logic.next(false, t(2000.0)));
            assert!(logic.next(true, t(1999.0)));
            assert!(!logic.next(true, t(1998.75)));
        }
    }

    #[test] fn no_improvement_for_x_iterations_f32() { no_improvement_for_x_iterations::<f32>(); }
    #[test] fn no_improvement_for_x_iterations_f64() { no_improvement_for_x_iterations::<f64>(); }

    fn no_improvement_for_x_iterations<T: Primitive>() {
        { // two flat iterations are tolerated with x = 2
            let mut logic = AbortStrategy::NoImprovementForXIterations {
                x: 2, threshold: t::<T>(0.5), abort_on_negative: false }.create_logic();
            assert!(logic.next(false, t(3000.0)));
            assert!(logic.next(false, t(2000.0)));
            assert!(logic.next(false, t(2000.0)));
            assert!(logic.next(false, t(1000.0)));
            assert!(logic.next(false, t(1000.0)));
            assert!(!logic.next(false, t(1000.0)));
        }
        { // a worse distance sum counts as "no improvement"
            let mut logic = AbortStrategy::NoImprovementForXIterations {
                x: 2, threshold: t::<T>(0.5), abort_on_negative: false }.create_logic();
            assert!(logic.next(false, t(3000.0)));
            assert!(logic.next(false, t(3100.0)));
            assert!(!logic.next(false, t(3100.0)));
        }
        { // ...unless negative improvements abort instantly
            let mut logic = AbortStrategy::NoImprovementForXIterations {
                x: 2, threshold: t::<T>(0.5), abort_on_negative: true }.create_logic();
            assert!(logic.next(false, t(3000.0)));
            assert!(logic.next(false, t(2000.0)));
            assert!(!logic.next(false, t(2000.25)));
        }
    }

    #[test]
    fn default_is_stable_assignments() {
        assert_eq!(AbortStrategy::<f32>::default(), AbortStrategy::StableAssignments);
    }
}
