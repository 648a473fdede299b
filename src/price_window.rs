use crate::{AppliedPrice, Price, PriceSeries, error::IndicatorError};

/// Scratch buffer holding the applied prices of one indicator window.
///
/// After [`load`](Self::load), element `i` is the price at offset `bar + i`,
/// so index `0` is the newest bar of the window.
#[derive(Clone, Debug)]
pub(crate) struct PriceWindow {
    source: AppliedPrice,
    values: Vec<Price>,
}

impl PriceWindow {
    pub fn new(source: AppliedPrice) -> Self {
        Self {
            source,
            values: Vec::new(),
        }
    }

    /// Loads `count` prices starting at `bar` and walking back in time.
    pub fn load(
        &mut self,
        prices: &(impl PriceSeries + ?Sized),
        bar: usize,
        count: usize,
    ) -> Result<&[Price], IndicatorError> {
        self.values.clear();
        self.values.reserve(count);

        for offset in bar..bar + count {
            let ohlcv = prices.bar(offset).ok_or(IndicatorError::PriceOutOfRange {
                offset,
                len: prices.len(),
            })?;
            self.values.push(self.source.extract(ohlcv));
        }

        Ok(&self.values)
    }
}
