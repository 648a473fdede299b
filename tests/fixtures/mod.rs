#![allow(dead_code)]

use quantedge_series::{Buffers, Ohlcv, Price};
use serde::{Deserialize, de::DeserializeOwned};

/// OHLC bar parsed from the hourly EURUSD fixture.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RefBar {
    pub open_time: u64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Ohlcv for RefBar {
    fn open(&self) -> Price {
        self.open
    }

    fn high(&self) -> Price {
        self.high
    }

    fn low(&self) -> Price {
        self.low
    }

    fn close(&self) -> Price {
        self.close
    }
}

/// Reference band values with timestamp.
#[derive(Debug, Deserialize)]
pub struct RefBandsValue {
    pub open_time: u64,
    pub upper: f64,
    pub main: f64,
    pub lower: f64,
}

/// Reference FDI value with timestamp.
#[derive(Debug, Deserialize)]
pub struct RefFdiValue {
    pub open_time: u64,
    pub fdi: f64,
}

const BARS_PATH: &str = "tests/fixtures/data/eurusd-1h.csv";

/// Load the reference bars, oldest first.
pub fn load_reference_bars() -> Vec<RefBar> {
    load_records(BARS_PATH, "invalid bar record")
}

pub fn load_bands_ref(path: &str) -> Vec<RefBandsValue> {
    load_records(path, "invalid bands reference record")
}

pub fn load_fdi_ref(path: &str) -> Vec<RefFdiValue> {
    load_records(path, "invalid FDI reference record")
}

/// Offset of the bar opened at `open_time`, counted from the newest bar.
pub fn offset_of(bars: &[RefBar], open_time: u64) -> usize {
    let index = bars
        .iter()
        .position(|bar| bar.open_time == open_time)
        .unwrap_or_else(|| panic!("no bar at t={open_time}"));

    bars.len() - 1 - index
}

/// Assert two f64 values are within tolerance.
pub fn assert_near(actual: f64, expected: f64, tolerance: f64, context: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "{context}: expected {expected:.10}, got {actual:.10}, diff {diff:.2e} > tolerance {tolerance:.2e}"
    );
}

/// Creates perturbed versions of a bar to simulate live repaints.
///
/// Returns 2 intermediate bars (with shifted close/high/low) followed
/// by the unperturbed bar. All share the same `open_time`.
pub fn repaint_sequence(bar: &RefBar) -> Vec<RefBar> {
    let t = bar.open_time;
    vec![
        // First tick: only open is known, close near open
        RefBar {
            open: bar.open,
            high: bar.open * 1.001,
            low: bar.open * 0.999,
            close: bar.open * 1.0005,
            open_time: t,
        },
        // Mid-bar: partial movement toward final values
        RefBar {
            open: bar.open,
            high: bar.open.midpoint(bar.high),
            low: bar.open.midpoint(bar.low),
            close: bar.open.midpoint(bar.close),
            open_time: t,
        },
        *bar,
    ]
}

/// Assert every buffer matches cell by cell between two engines.
pub fn assert_buffers_match(closed: &Buffers, repainted: &Buffers, tolerance: f64) {
    assert_eq!(closed.len(), repainted.len(), "buffer lengths differ");

    for (c, r) in closed.iter().zip(repainted.iter()) {
        for (offset, (cv, rv)) in c.iter().zip(r.iter()).enumerate() {
            match (cv, rv) {
                (None, None) => {}
                (Some(cv), Some(rv)) => {
                    let diff = (cv - rv).abs();
                    assert!(
                        diff <= tolerance,
                        "{} diverged at offset {offset}: closed={cv:.10}, repainted={rv:.10}, diff={diff:.2e}",
                        c.name()
                    );
                }
                (cv, rv) => {
                    panic!(
                        "{} presence mismatch at offset {offset}: closed={cv:?}, repainted={rv:?}",
                        c.name()
                    );
                }
            }
        }
    }
}

/// Generate reference match and live-feed tests for a [`Bands`] config.
///
/// Usage: `bands_reference_test!(sma_20, BandsConfig::sma(20), "tests/fixtures/data/bands-20-2-sma-close.csv", 1e-9);`
///
/// [`Bands`]: quantedge_series::Bands
#[allow(unused_macros)]
macro_rules! bands_reference_test {
    ($name:ident, $config:expr, $ref_path:expr, $tolerance:expr) => {
        mod $name {
            use super::fixtures::*;
            use quantedge_series::*;

            #[test]
            fn matches_reference() {
                let bars = load_reference_bars();
                let reference = load_bands_ref($ref_path);
                let mut engine = Engine::<Bands>::init($config);

                assert_eq!(
                    engine.on_update(&Tick::full(bars.len()), &bars),
                    Ok(Status::Ok)
                );

                let buffers = engine.buffers().unwrap();
                for (i, expected) in reference.iter().enumerate() {
                    let offset = offset_of(&bars, expected.open_time);
                    let ctx = format!(
                        "{} at ref {i} (t={})",
                        stringify!($name),
                        expected.open_time
                    );
                    for (line, value) in [
                        (Bands::UPPER, expected.upper),
                        (Bands::MAIN, expected.main),
                        (Bands::LOWER, expected.lower),
                    ] {
                        let actual = buffers[line]
                            .get(offset)
                            .unwrap_or_else(|| panic!("{ctx}: line {line} empty"));
                        assert_near(actual, value, $tolerance, &ctx);
                    }
                }

                let oldest = offset_of(&bars, reference[0].open_time);
                assert_eq!(buffers[Bands::MAIN].get(oldest + 1), None);
            }

            #[test]
            fn live_feed_matches_full_load() {
                let bars = load_reference_bars();
                let config = $config;

                let mut full = Engine::<Bands>::init(config);
                full.on_update(&Tick::full(bars.len()), &bars).unwrap();

                let mut live = Engine::<Bands>::init(config);
                let mut feed: Vec<RefBar> = Vec::with_capacity(bars.len());
                for bar in &bars {
                    let mut first = true;
                    for tick in repaint_sequence(bar) {
                        let notification = if first {
                            feed.push(tick);
                            Tick::new_bars(1, feed.len())
                        } else {
                            *feed.last_mut().unwrap() = tick;
                            Tick::repaint(feed.len())
                        };
                        first = false;

                        live.on_update(&notification, &feed).unwrap();
                    }
                }

                assert_buffers_match(
                    full.buffers().unwrap(),
                    live.buffers().unwrap(),
                    $tolerance,
                );
            }
        }
    };
}

#[allow(unused_imports)]
pub(crate) use bands_reference_test;

fn load_records<D>(path: &str, expect_msg: &str) -> Vec<D>
where
    D: DeserializeOwned,
{
    let mut rdr =
        csv::Reader::from_path(path).unwrap_or_else(|e| panic!("failed to open {path}: {e}"));

    rdr.deserialize().map(|r| r.expect(expect_msg)).collect()
}
