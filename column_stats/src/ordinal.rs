use hashbrown::HashMap;
use snafu::OptionExt;

use crate::error::{MissingPartitionSnafu, Result};

/// Maps a partition name to its 0-based position in the table's ordered
/// partition list.
///
/// If a name is listed more than once, its first position is used.
#[derive(Debug)]
pub(crate) struct OrdinalIndexMap<'a> {
    positions: HashMap<&'a str, usize>,
    len: usize,
}

impl<'a> OrdinalIndexMap<'a> {
    pub(crate) fn new<S: AsRef<str>>(partition_names: &'a [S]) -> Self {
        let mut positions = HashMap::with_capacity(partition_names.len());
        for (idx, name) in partition_names.iter().enumerate() {
            positions.entry(name.as_ref()).or_insert(idx);
        }

        Self {
            positions,
            len: partition_names.len(),
        }
    }

    /// Ordinal position of a partition that contributes statistics.
    pub(crate) fn position(&self, partition_name: &str) -> Result<usize> {
        self.positions
            .get(partition_name)
            .copied()
            .context(MissingPartitionSnafu { partition_name })
    }

    /// Number of partitions in the table, including duplicates.
    pub(crate) fn len(&self) -> usize {
        self.len
    }
}
