// Scalar timestamp unwrap: the reference the batched path must match bit for bit

use std::fmt;

use super::field::TruncatedField;

/// Rebuilds full-width timestamps from a truncated counter.
///
/// State is the current era (upper bits, a multiple of the field period) and
/// the last truncated value seen. Consecutive samples are assumed to be less
/// than half a period apart in true time; a larger jump in the narrow field
/// is read as a rollover in the opposite direction. Inputs that violate this
/// are reconstructed wrongly without any signal.
#[derive(Clone)]
pub struct TimestampExtender {
    pub(crate) field: TruncatedField,
    pub(crate) era: u64,
    pub(crate) prev: u64,
}

impl TimestampExtender {
    /// Seed from a full-width reference: its upper bits become the era, its
    /// low bits the previous sample.
    pub fn new(seed: u64, field: TruncatedField) -> Self {
        Self {
            field,
            era: seed & !field.mask(),
            prev: seed & field.mask(),
        }
    }

    pub fn field(&self) -> TruncatedField {
        self.field
    }

    pub fn era(&self) -> u64 {
        self.era
    }

    /// Last truncated sample observed (the seed's low bits before any input).
    pub fn prev(&self) -> u32 {
        self.prev as u32
    }

    /// The most recent reconstructed value.
    pub fn last_full(&self) -> u64 {
        self.era | self.prev
    }

    /// Reconstruct one sample. Bits above the field width are ignored.
    #[inline(always)]
    pub fn extend_one(&mut self, raw: u32) -> u64 {
        let t = u64::from(raw) & self.field.mask();
        let prev = self.prev;
        let half = self.field.half();

        if prev > t && prev - t > half {
            self.era = self.era.wrapping_add(self.field.period());
        } else if t > prev && t - prev > half {
            self.era = self.era.wrapping_sub(self.field.period());
        }

        self.prev = t;
        self.era | t
    }

    /// Reconstruct `min(src.len(), dst.len())` samples one at a time.
    /// Returns the number written.
    pub fn extend(&mut self, src: &[u32], dst: &mut [u64]) -> usize {
        let n = src.len().min(dst.len());
        for (out, &raw) in dst[..n].iter_mut().zip(&src[..n]) {
            *out = self.extend_one(raw);
        }
        n
    }
}

impl fmt::Debug for TimestampExtender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::Debug::StructDebug::debug_timestamp_extender(self, f)
    }
}
