use crate::Core::error::{PipelineError, Result};

/// Width of the hardware timestamp field carried in each descriptor.
pub const DEFAULT_FIELD_WIDTH: u32 = 20;

/// The widest field that still fits [`EventDescriptor::truncated_ts`].
///
/// [`EventDescriptor::truncated_ts`]: crate::SPSC::Structs::EventDescriptor::truncated_ts
pub const MAX_FIELD_WIDTH: u32 = 32;

/// Geometry of a truncated counter field of `width` bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TruncatedField {
    width: u32,
    period: u64,
    half: u64,
    mask: u64,
}

impl TruncatedField {
    pub fn new(width: u32) -> Result<Self> {
        if width == 0 || width > MAX_FIELD_WIDTH {
            return Err(PipelineError::InvalidFieldWidth { bits: width });
        }
        let period = 1u64 << width;
        Ok(Self {
            width,
            period,
            half: period / 2,
            mask: period - 1,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Ticks between two rollovers of the field (`2^width`).
    #[inline]
    pub fn period(&self) -> u64 {
        self.period
    }

    #[inline]
    pub fn half(&self) -> u64 {
        self.half
    }

    #[inline]
    pub fn mask(&self) -> u64 {
        self.mask
    }

    /// The low `width` bits of a full-width value.
    #[inline]
    pub fn truncate(&self, full: u64) -> u32 {
        (full & self.mask) as u32
    }
}

impl Default for TruncatedField {
    fn default() -> Self {
        let period = 1u64 << DEFAULT_FIELD_WIDTH;
        Self {
            width: DEFAULT_FIELD_WIDTH,
            period,
            half: period / 2,
            mask: period - 1,
        }
    }
}
