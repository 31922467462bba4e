//! Binary search over encoder quality to land near a target byte size.
//!
//! Encoded size is only roughly monotonic in quality, so the search is
//! best effort: it stops as soon as a probe is within tolerance, when the
//! range is exhausted, or after the probe budget. The buffer kept is always
//! the one from the *last* probe, even if an earlier one was closer to the
//! target. Callers that need the closest candidate must track it themselves.

use std::future::Future;

use crate::error::{PipelineError, PipelineResult};

/// Byte-size goal for an encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeTarget {
    pub bytes: u64,
    pub tolerance: u64,
}

impl SizeTarget {
    pub fn new(bytes: u64, tolerance: u64) -> Self {
        Self { bytes, tolerance }
    }

    /// Whether an encoded length is within `bytes ± tolerance`.
    pub fn accepts(&self, len: u64) -> bool {
        len.abs_diff(self.bytes) <= self.tolerance
    }
}

/// Search bounds and probe budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualitySearch {
    pub min_quality: u8,
    pub max_quality: u8,
    pub max_probes: usize,
}

impl Default for QualitySearch {
    fn default() -> Self {
        Self {
            min_quality: 10,
            max_quality: 95,
            max_probes: 7,
        }
    }
}

/// Result of a finished search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Encoded buffer of the last probe
    pub bytes: Vec<u8>,
    /// Quality of the last probe
    pub quality: u8,
    /// Number of probes taken
    pub probes: usize,
    /// Last probe was within tolerance
    pub converged: bool,
    /// Search range ran out (`lo > hi`) before converging
    pub exhausted: bool,
}

/// Running state, updated after every probe whether or not it improved.
#[derive(Debug)]
struct SearchState {
    lo: u8,
    hi: u8,
    best_buffer: Option<Vec<u8>>,
    best_quality: u8,
    probes: usize,
}

impl SearchState {
    fn midpoint(&self) -> u8 {
        // Round half up
        ((self.lo as u16 + self.hi as u16 + 1) / 2) as u8
    }
}

impl QualitySearch {
    /// Run the search, calling `probe(quality)` for each encode.
    ///
    /// A probe error aborts the search and is returned as-is.
    pub async fn run<F, Fut>(&self, target: SizeTarget, mut probe: F) -> PipelineResult<SearchOutcome>
    where
        F: FnMut(u8) -> Fut,
        Fut: Future<Output = PipelineResult<Vec<u8>>>,
    {
        let mut state = SearchState {
            lo: self.min_quality,
            hi: self.max_quality,
            best_buffer: None,
            best_quality: self.min_quality,
            probes: 0,
        };
        let mut converged = false;
        let mut exhausted = false;

        while state.probes < self.max_probes {
            let mid = state.midpoint();
            let buffer = probe(mid).await?;
            let len = buffer.len() as u64;
            state.probes += 1;

            tracing::trace!(
                "  probe {}: q={} -> {} bytes (target {} ± {})",
                state.probes,
                mid,
                len,
                target.bytes,
                target.tolerance
            );

            state.best_buffer = Some(buffer);
            state.best_quality = mid;

            if target.accepts(len) {
                converged = true;
                break;
            } else if len > target.bytes {
                // Too big: lower quality next
                match mid.checked_sub(1) {
                    Some(hi) => state.hi = hi,
                    None => {
                        exhausted = true;
                        break;
                    }
                }
            } else {
                state.lo = mid.saturating_add(1);
            }

            if state.lo > state.hi {
                exhausted = true;
                break;
            }
        }

        let bytes = state.best_buffer.ok_or_else(|| {
            PipelineError::invalid(format!(
                "quality search needs at least one probe (max_probes = {})",
                self.max_probes
            ))
        })?;

        Ok(SearchOutcome {
            bytes,
            quality: state.best_quality,
            probes: state.probes,
            converged,
            exhausted,
        })
    }
}
