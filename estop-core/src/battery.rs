//! Battery level estimation for the hand-held units

/// Cell voltage reported as 0 %
pub const BATTERY_EMPTY_MV: u32 = 3000;

/// Cell voltage reported as 100 %
pub const BATTERY_FULL_MV: u32 = 4200;

/// Linear state of charge from cell voltage, clamped to 0-100
pub fn battery_percent(cell_mv: u32) -> u8 {
    if cell_mv <= BATTERY_EMPTY_MV {
        return 0;
    }
    if cell_mv >= BATTERY_FULL_MV {
        return 100;
    }
    ((cell_mv - BATTERY_EMPTY_MV) * 100 / (BATTERY_FULL_MV - BATTERY_EMPTY_MV)) as u8
}

/// Scale a divided ADC reading back to cell millivolts
///
/// `ratio_num / ratio_den` is the divider's cell-to-pin ratio.
pub fn cell_millivolts(
    adc_raw: u16,
    adc_ref_mv: u32,
    adc_max: u16,
    ratio_num: u32,
    ratio_den: u32,
) -> u32 {
    let pin_mv = adc_raw as u32 * adc_ref_mv / (adc_max as u32).max(1);
    pin_mv * ratio_num / ratio_den.max(1)
}

/// Running mean over the last `N` samples
#[derive(Debug, Clone)]
pub struct MeanFilter<const N: usize> {
    samples: [u32; N],
    next: usize,
    filled: usize,
}

impl<const N: usize> Default for MeanFilter<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> MeanFilter<N> {
    pub const fn new() -> Self {
        Self {
            samples: [0; N],
            next: 0,
            filled: 0,
        }
    }

    pub fn push(&mut self, sample: u32) {
        if N == 0 {
            return;
        }
        self.samples[self.next] = sample;
        self.next = (self.next + 1) % N;
        self.filled = (self.filled + 1).min(N);
    }

    /// Mean of the samples seen so far, `None` before the first sample
    pub fn mean(&self) -> Option<u32> {
        if self.filled == 0 {
            return None;
        }
        let sum: u64 = self.samples[..self.filled].iter().map(|&s| s as u64).sum();
        Some((sum / self.filled as u64) as u32)
    }
}
