//! Visibility thresholds for each LOD level

use lodcrate_core::{Error, Result};

/// Compute `levels` monotonically decreasing thresholds from
/// `transition_start` down to `culled`.
///
/// Each intermediate threshold sits halfway between the previous one and
/// `culled`, so detailed levels get the wider bands. A single level is the
/// cull threshold alone.
///
/// The bands shrink by half per level, so a long enough chain runs out of
/// `f32` precision above `culled`. Level counts that would repeat a
/// threshold are rejected.
pub fn plan_thresholds(transition_start: f32, culled: f32, levels: usize) -> Result<Vec<f32>> {
    if !(culled >= 0.0 && transition_start > culled) || !transition_start.is_finite() {
        return Err(Error::InvalidConfiguration(format!(
            "Expected transition_start > culled >= 0, got {} and {}",
            transition_start, culled
        )));
    }

    let mut thresholds = Vec::with_capacity(levels);
    if levels == 0 {
        return Ok(thresholds);
    }
    if levels == 1 {
        thresholds.push(culled);
        return Ok(thresholds);
    }

    thresholds.push(transition_start);
    let mut remaining = transition_start - culled;
    for _ in 1..levels - 1 {
        let threshold = culled + remaining / 2.0;
        if threshold <= culled {
            return Err(Error::InvalidConfiguration(format!(
                "{} levels leave no room between thresholds above {}",
                levels, culled
            )));
        }
        thresholds.push(threshold);
        remaining = threshold - culled;
    }
    thresholds.push(culled);

    Ok(thresholds)
}
