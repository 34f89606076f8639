use serde::{Deserialize, Serialize};

use super::model::SeriesGroup;
use crate::error::SeriesError;

// ---------------------------------------------------------------------------
// CyclePartition – equal-length cycles cut from a flat series
// ---------------------------------------------------------------------------

/// Read-only view of a series split into cycles of exactly `cycle_pts` samples.
///
/// The trailing samples that do not fill a whole cycle are kept apart in
/// [`CyclePartition::remainder`] and never show up as a cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CyclePartition<'a> {
    cycle_pts: usize,
    cycles: Vec<&'a [f64]>,
    remainder: &'a [f64],
}

impl<'a> CyclePartition<'a> {
    pub fn num_cycles(&self) -> usize {
        self.cycles.len()
    }

    pub fn cycle_pts(&self) -> usize {
        self.cycle_pts
    }

    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a [f64]> {
        self.cycles.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a [f64]> + '_ {
        self.cycles.iter().copied()
    }

    /// Samples past the last whole cycle.
    pub fn remainder(&self) -> &'a [f64] {
        self.remainder
    }

    /// Owned copies of every cycle.
    pub fn to_vecs(&self) -> Vec<Vec<f64>> {
        self.cycles.iter().map(|c| c.to_vec()).collect()
    }
}

fn check_cycle_pts(cycle_pts: usize) -> Result<(), SeriesError> {
    if cycle_pts == 0 {
        return Err(SeriesError::InvalidArgument(
            "cycle_pts must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Split `series` into `len / cycle_pts` contiguous cycles.
///
/// Cycle `i` covers `[i * cycle_pts, (i + 1) * cycle_pts)`. A series shorter
/// than one cycle yields an empty partition.
pub fn partition(series: &[f64], cycle_pts: usize) -> Result<CyclePartition<'_>, SeriesError> {
    check_cycle_pts(cycle_pts)?;
    let chunks = series.chunks_exact(cycle_pts);
    let remainder = chunks.remainder();
    Ok(CyclePartition {
        cycle_pts,
        cycles: chunks.collect(),
        remainder,
    })
}

// ---------------------------------------------------------------------------
// Paired partitions (positive / negative half-cycles)
// ---------------------------------------------------------------------------

/// How a consumer pairs up two partitions whose cycle counts differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PairPolicy {
    /// Pair the first `min(a, b)` cycles and drop the rest.
    #[default]
    Truncate,
    /// Refuse to pair unequal counts.
    Strict,
}

/// Two independent partitions with the same `cycle_pts`.
#[derive(Debug, Clone, PartialEq)]
pub struct PairedPartition<'a> {
    pub a: CyclePartition<'a>,
    pub b: CyclePartition<'a>,
}

impl PairedPartition<'_> {
    pub fn num_cycles_a(&self) -> usize {
        self.a.num_cycles()
    }

    pub fn num_cycles_b(&self) -> usize {
        self.b.num_cycles()
    }

    /// Number of index-aligned pairs allowed by `policy`.
    pub fn paired_count(&self, policy: PairPolicy) -> Result<usize, SeriesError> {
        paired_cycle_count(self.num_cycles_a(), self.num_cycles_b(), policy)
    }
}

/// Partition two series independently; their cycle counts are reported
/// separately and may differ.
pub fn partition_paired<'a>(
    series_a: &'a [f64],
    series_b: &'a [f64],
    cycle_pts: usize,
) -> Result<PairedPartition<'a>, SeriesError> {
    let a = partition(series_a, cycle_pts)?;
    let b = partition(series_b, cycle_pts)?;
    Ok(PairedPartition { a, b })
}

/// Resolve two cycle counts into the number of pairs a consumer may iterate.
pub fn paired_cycle_count(a: usize, b: usize, policy: PairPolicy) -> Result<usize, SeriesError> {
    if a == b {
        return Ok(a);
    }
    match policy {
        PairPolicy::Truncate => {
            let n = a.min(b);
            log::warn!("Cycle counts differ ({a} vs {b}); pairing the first {n}");
            Ok(n)
        }
        PairPolicy::Strict => Err(SeriesError::CycleMismatch { a, b }),
    }
}

// ---------------------------------------------------------------------------
// Group partitions – every column of a tag cut in lockstep
// ---------------------------------------------------------------------------

/// One cycle of a [`SeriesGroup`]: the same index range of each column.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupCycle<'a> {
    pub index: usize,
    columns: Vec<(&'static str, &'a [f64])>,
}

impl<'a> GroupCycle<'a> {
    pub fn column(&self, name: &str) -> Option<&'a [f64]> {
        self.columns
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, c)| *c)
    }

    pub fn len(&self) -> usize {
        self.columns.first().map(|(_, c)| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cut every column of `group` into cycles of `cycle_pts` samples.
pub fn partition_group(
    group: &SeriesGroup,
    cycle_pts: usize,
) -> Result<Vec<GroupCycle<'_>>, SeriesError> {
    check_cycle_pts(cycle_pts)?;
    let num_cycles = group.len() / cycle_pts;
    let columns = group.kind().columns();

    let cycles: Vec<GroupCycle<'_>> = (0..num_cycles)
        .map(|i| GroupCycle {
            index: i,
            columns: columns
                .iter()
                .map(|&(name, series)| (name, &series[i * cycle_pts..(i + 1) * cycle_pts]))
                .collect(),
        })
        .collect();

    log::info!("{}: number of cycles: {num_cycles}", group.tag());
    Ok(cycles)
}

/// Group partitions of two tags, e.g. the positive and negative halves of a
/// CP run.
#[derive(Debug, Clone, PartialEq)]
pub struct PairedGroupCycles<'a> {
    pub a: Vec<GroupCycle<'a>>,
    pub b: Vec<GroupCycle<'a>>,
}

impl<'a> PairedGroupCycles<'a> {
    pub fn num_cycles_a(&self) -> usize {
        self.a.len()
    }

    pub fn num_cycles_b(&self) -> usize {
        self.b.len()
    }

    /// Index-aligned cycle pairs, as many as `policy` allows.
    pub fn pairs(
        &self,
        policy: PairPolicy,
    ) -> Result<Vec<(&GroupCycle<'a>, &GroupCycle<'a>)>, SeriesError> {
        let n = paired_cycle_count(self.a.len(), self.b.len(), policy)?;
        Ok(self.a.iter().zip(self.b.iter()).take(n).collect())
    }
}

pub fn partition_group_paired<'a>(
    group_a: &'a SeriesGroup,
    group_b: &'a SeriesGroup,
    cycle_pts: usize,
) -> Result<PairedGroupCycles<'a>, SeriesError> {
    let a = partition_group(group_a, cycle_pts)?;
    let b = partition_group(group_b, cycle_pts)?;
    Ok(PairedGroupCycles { a, b })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Series, SeriesKind};

    #[test]
    fn seven_samples_three_per_cycle() {
        let s = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let p = partition(&s, 3).unwrap();
        assert_eq!(p.num_cycles(), 2);
        assert_eq!(p.to_vecs(), vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        assert_eq!(p.remainder(), &[7.0]);
    }

    #[test]
    fn chunks_rebuild_prefix() {
        let s: Vec<f64> = (0..50).map(|i| i as f64 * 0.5).collect();
        for cycle_pts in 1..=60 {
            let p = partition(&s, cycle_pts).unwrap();
            assert_eq!(p.num_cycles(), s.len() / cycle_pts);
            assert!(p.iter().all(|c| c.len() == cycle_pts));
            let joined: Vec<f64> = p.iter().flatten().copied().collect();
            assert_eq!(joined, &s[..p.num_cycles() * cycle_pts]);
        }
    }

    #[test]
    fn cycle_longer_than_series_is_empty() {
        let p = partition(&[1.0, 2.0], 5).unwrap();
        assert!(p.is_empty());
        assert_eq!(p.num_cycles(), 0);
        assert_eq!(p.remainder(), &[1.0, 2.0]);
    }

    #[test]
    fn zero_cycle_pts_is_invalid() {
        assert!(matches!(
            partition(&[1.0, 2.0], 0),
            Err(SeriesError::InvalidArgument(_))
        ));
        assert!(matches!(
            partition_paired(&[1.0], &[1.0], 0),
            Err(SeriesError::InvalidArgument(_))
        ));
    }

    #[test]
    fn paired_counts_are_reported_separately() {
        let pos: Vec<f64> = (0..9).map(f64::from).collect();
        let neg: Vec<f64> = (0..6).map(f64::from).collect();
        let paired = partition_paired(&pos, &neg, 3).unwrap();
        assert_eq!(paired.num_cycles_a(), 3);
        assert_eq!(paired.num_cycles_b(), 2);
        assert_eq!(paired.paired_count(PairPolicy::Truncate).unwrap(), 2);
        assert!(matches!(
            paired.paired_count(PairPolicy::Strict),
            Err(SeriesError::CycleMismatch { a: 3, b: 2 })
        ));
    }

    #[test]
    fn group_columns_stay_aligned() {
        let group = SeriesGroup::new(
            "pos",
            SeriesKind::Cp {
                time: Series::from(vec![0.0, 1.0, 2.0, 3.0, 4.0]),
                potential: Series::from(vec![0.1, 0.2, 0.3, 0.4, 0.5]),
            },
        )
        .unwrap();
        let cycles = partition_group(&group, 2).unwrap();
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[1].index, 1);
        assert_eq!(cycles[1].column("time").unwrap(), &[2.0, 3.0]);
        assert_eq!(cycles[1].column("potential").unwrap(), &[0.3, 0.4]);
        assert!(cycles[0].column("re_z").is_none());
    }
}
