// Four-lane unwrap. Same answer as the scalar loop, fewer dependent branches.
//
// Each lane's wrap step depends only on its own sample and the sample before
// it, both of which are known up front. The per-lane steps are prefix-summed
// into era offsets, so the only loop-carried state is one era and one sample
// per chunk.

use super::extender::TimestampExtender;
use crate::SPSC::Structs::EventDescriptor;

/// Samples processed per batched step.
pub const LANES: usize = 4;

/// +1 for a forward rollover, -1 for a backward one, 0 otherwise.
#[inline(always)]
fn wrap_step(prev: u64, t: u64, half: u64) -> i64 {
    let forward = prev > t && prev - t > half;
    let backward = t > prev && t - prev > half;
    i64::from(forward) - i64::from(backward)
}

impl TimestampExtender {
    #[inline(always)]
    fn extend_lanes(&mut self, raw: [u32; LANES]) -> [u64; LANES] {
        let mask = self.field.mask();
        let half = self.field.half();
        let period = self.field.period();

        let t = raw.map(|r| u64::from(r) & mask);
        let before = [self.prev, t[0], t[1], t[2]];

        let mut offset = [0i64; LANES];
        let mut running = 0i64;
        for lane in 0..LANES {
            running += wrap_step(before[lane], t[lane], half);
            offset[lane] = running;
        }

        let mut out = [0u64; LANES];
        for lane in 0..LANES {
            let era = self
                .era
                .wrapping_add((offset[lane] as u64).wrapping_mul(period));
            out[lane] = era | t[lane];
        }

        self.era = self
            .era
            .wrapping_add((running as u64).wrapping_mul(period));
        self.prev = t[LANES - 1];
        out
    }

    /// Reconstruct `min(src.len(), dst.len())` samples, [`LANES`] at a time,
    /// finishing any remainder with the scalar path. Output and final state
    /// are identical to [`TimestampExtender::extend`].
    pub fn extend_batched(&mut self, src: &[u32], dst: &mut [u64]) -> usize {
        let n = src.len().min(dst.len());
        let mut src_chunks = src[..n].chunks_exact(LANES);
        let mut dst_chunks = dst[..n].chunks_exact_mut(LANES);

        for (s, d) in (&mut src_chunks).zip(&mut dst_chunks) {
            let out = self.extend_lanes([s[0], s[1], s[2], s[3]]);
            d.copy_from_slice(&out);
        }

        for (out, &raw) in dst_chunks
            .into_remainder()
            .iter_mut()
            .zip(src_chunks.remainder())
        {
            *out = self.extend_one(raw);
        }
        n
    }

    /// Batched reconstruction straight from descriptors: reads each
    /// `truncated_ts` and writes the full value at the same index.
    pub fn extend_descriptors(&mut self, src: &[EventDescriptor], dst: &mut [u64]) -> usize {
        let n = src.len().min(dst.len());
        let mut src_chunks = src[..n].chunks_exact(LANES);
        let mut dst_chunks = dst[..n].chunks_exact_mut(LANES);

        for (s, d) in (&mut src_chunks).zip(&mut dst_chunks) {
            let out = self.extend_lanes([
                s[0].truncated_ts,
                s[1].truncated_ts,
                s[2].truncated_ts,
                s[3].truncated_ts,
            ]);
            d.copy_from_slice(&out);
        }

        for (out, desc) in dst_chunks
            .into_remainder()
            .iter_mut()
            .zip(src_chunks.remainder())
        {
            *out = self.extend_one(desc.truncated_ts);
        }
        n
    }
}
