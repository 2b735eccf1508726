use crate::ping::prober::ProbeOutcome;

/// Orders outcomes by ascending latency. Failures carry the timeout as their
/// latency, so they land after every faster success; a failure ties after a
/// success of equal latency, and remaining ties are broken by target name so
/// the report is stable across runs.
pub fn aggregate(mut outcomes: Vec<ProbeOutcome>) -> Vec<ProbeOutcome> {
    outcomes.sort_by(|a, b| {
        a.latency
            .cmp(&b.latency)
            .then_with(|| a.is_failure().cmp(&b.is_failure()))
            .then_with(|| a.target.cmp(&b.target))
    });
    outcomes
}
