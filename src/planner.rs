use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Cap on how many recent bars one update cycle may recompute.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Default, Debug, Serialize, Deserialize)]
pub enum MaxVisible {
    /// Recompute every bar the host reports as changed.
    #[default]
    Unbounded,
    /// Recompute at most this many recent bars per cycle.
    Bars(usize),
}

impl MaxVisible {
    /// Host encoding: `-1` means unbounded, any other non-negative value is
    /// a cap. Returns `None` for other negative values.
    #[must_use]
    pub fn from_host(value: i64) -> Option<Self> {
        match value {
            -1 => Some(Self::Unbounded),
            v => usize::try_from(v).ok().map(Self::Bars),
        }
    }

    #[inline]
    fn cap(self, changed_bars: usize) -> usize {
        match self {
            Self::Unbounded => changed_bars,
            Self::Bars(max) => changed_bars.min(max),
        }
    }
}

impl Display for MaxVisible {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unbounded => write!(f, "unbounded"),
            Self::Bars(max) => write!(f, "{max}"),
        }
    }
}

/// Inclusive bar range `[0, start]`, walked from `start` (oldest
/// invalidated) down to `0` (newest).
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct RecomputeRange {
    start: usize,
}

impl RecomputeRange {
    /// Oldest bar to recompute.
    #[inline]
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Number of bars in the range.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.start + 1
    }

    /// Never empty: a range always holds at least bar `0`.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Bars in recompute order, oldest first.
    pub fn bars(&self) -> impl Iterator<Item = usize> {
        (0..=self.start).rev()
    }
}

/// Outcome of planning one update cycle.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Plan {
    Recompute(RecomputeRange),
    /// Fewer bars than the algorithm's window; retry on a later cycle.
    InsufficientHistory,
}

/// Turns a "what changed" notification into the bar range to recompute.
///
/// ```text
/// effective = min(changed_bars, max_visible)
/// start     = min(effective - 1, total_bars - window_size)
/// ```
///
/// A negative `start` means there is not enough history for a single
/// window.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct InvalidationPlanner {
    max_visible: MaxVisible,
}

impl InvalidationPlanner {
    #[must_use]
    pub fn new(max_visible: MaxVisible) -> Self {
        Self { max_visible }
    }

    #[inline]
    #[must_use]
    pub fn max_visible(&self) -> MaxVisible {
        self.max_visible
    }

    #[must_use]
    pub fn plan(&self, changed_bars: usize, total_bars: usize, window_size: usize) -> Plan {
        let effective = self.max_visible.cap(changed_bars);

        let newest_changed = effective.checked_sub(1);
        let oldest_computable = total_bars.checked_sub(window_size);

        match (newest_changed, oldest_computable) {
            (Some(changed), Some(computable)) => Plan::Recompute(RecomputeRange {
                start: changed.min(computable),
            }),
            _ => Plan::InsufficientHistory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unbounded() -> InvalidationPlanner {
        InvalidationPlanner::new(MaxVisible::Unbounded)
    }

    fn start(plan: Plan) -> usize {
        match plan {
            Plan::Recompute(range) => range.start(),
            Plan::InsufficientHistory => panic!("expected a recompute range"),
        }
    }

    mod range {
        use super::*;

        #[test]
        fn full_history_starts_at_oldest_computable() {
            // 100 bars, window 10: oldest computable is offset 90
            assert_eq!(start(unbounded().plan(100, 100, 10)), 90);
        }

        #[test]
        fn single_new_bar_recomputes_newest_only() {
            assert_eq!(start(unbounded().plan(1, 100, 10)), 0);
        }

        #[test]
        fn two_changed_bars() {
            assert_eq!(start(unbounded().plan(2, 100, 10)), 1);
        }

        #[test]
        fn window_equal_to_history() {
            assert_eq!(start(unbounded().plan(10, 10, 10)), 0);
        }

        #[test]
        fn bars_are_oldest_first() {
            let Plan::Recompute(range) = unbounded().plan(3, 100, 10) else {
                panic!("expected range");
            };
            assert_eq!(range.bars().collect::<Vec<_>>(), vec![2, 1, 0]);
            assert_eq!(range.len(), 3);
        }
    }

    mod max_visible {
        use super::*;

        #[test]
        fn caps_changed_bars() {
            let planner = InvalidationPlanner::new(MaxVisible::Bars(20));
            assert_eq!(start(planner.plan(100, 100, 10)), 19);
        }

        #[test]
        fn cap_above_changed_has_no_effect() {
            let planner = InvalidationPlanner::new(MaxVisible::Bars(500));
            assert_eq!(start(planner.plan(3, 100, 10)), 2);
        }

        #[test]
        fn zero_cap_idles() {
            let planner = InvalidationPlanner::new(MaxVisible::Bars(0));
            assert_eq!(planner.plan(100, 100, 10), Plan::InsufficientHistory);
        }

        #[test]
        fn from_host_encoding() {
            assert_eq!(MaxVisible::from_host(-1), Some(MaxVisible::Unbounded));
            assert_eq!(MaxVisible::from_host(0), Some(MaxVisible::Bars(0)));
            assert_eq!(MaxVisible::from_host(250), Some(MaxVisible::Bars(250)));
            assert_eq!(MaxVisible::from_host(-2), None);
        }

        #[test]
        fn display() {
            assert_eq!(MaxVisible::Unbounded.to_string(), "unbounded");
            assert_eq!(MaxVisible::Bars(5).to_string(), "5");
        }
    }

    mod insufficient_history {
        use super::*;

        #[test]
        fn fewer_bars_than_window() {
            assert_eq!(unbounded().plan(5, 5, 10), Plan::InsufficientHistory);
        }

        #[test]
        fn one_bar_short() {
            assert_eq!(unbounded().plan(9, 9, 10), Plan::InsufficientHistory);
        }

        #[test]
        fn nothing_changed() {
            assert_eq!(unbounded().plan(0, 100, 10), Plan::InsufficientHistory);
        }

        #[test]
        fn empty_history() {
            assert_eq!(unbounded().plan(0, 0, 2), Plan::InsufficientHistory);
        }
    }
}
