//! Memo of fetched graph points and the user's dataset selection.

use api::DatasetId;
use indexmap::{IndexMap, IndexSet};

use super::dates::SampleDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Variant {
    Absolute,
    Relative,
}

impl Variant {
    pub fn is_relative(self) -> bool {
        matches!(self, Self::Relative)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub dataset: DatasetId,
    pub variant: Variant,
}

impl CacheKey {
    pub fn new(dataset: DatasetId, variant: Variant) -> Self {
        Self { dataset, variant }
    }

    pub fn absolute(dataset: impl Into<DatasetId>) -> Self {
        Self::new(dataset.into(), Variant::Absolute)
    }

    pub fn relative(dataset: impl Into<DatasetId>) -> Self {
        Self::new(dataset.into(), Variant::Relative)
    }

    /// Column / series identifier, `<dataset>` or `<dataset>_relative`.
    pub fn series_id(&self) -> String {
        match self.variant {
            Variant::Absolute => self.dataset.to_string(),
            Variant::Relative => format!("{}_relative", self.dataset),
        }
    }
}

/// A fetched cell may legitimately hold no value (`Fetched(None)`), which is
/// different from never having been requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellState {
    Unfetched,
    Fetched(Option<f64>),
}

impl CellState {
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Unfetched => None,
            Self::Fetched(value) => value,
        }
    }

    pub fn is_fetched(self) -> bool {
        matches!(self, Self::Fetched(_))
    }
}

/// Per-(dataset, variant, date) memo. Cells are only ever added; dates that
/// fall out of the selected range stay cached for when they come back.
#[derive(Debug, Clone, Default)]
pub struct PointCache {
    cells: IndexMap<CacheKey, IndexMap<SampleDate, CellState>>,
}

impl PointCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `Unfetched` cells for dates not yet known under `key`.
    /// Existing cells are left untouched. Returns how many cells were added.
    pub fn ensure_keys_exist(&mut self, key: &CacheKey, dates: &[SampleDate]) -> usize {
        let row = self.cells.entry(key.clone()).or_default();
        let before = row.len();
        for date in dates {
            row.entry(*date).or_insert(CellState::Unfetched);
        }
        row.len() - before
    }

    /// `None` when the cell was never registered.
    pub fn read(&self, key: &CacheKey, date: SampleDate) -> Option<CellState> {
        self.cells.get(key).and_then(|row| row.get(&date)).copied()
    }

    pub fn write(&mut self, key: &CacheKey, date: SampleDate, value: Option<f64>) {
        self.cells
            .entry(key.clone())
            .or_default()
            .insert(date, CellState::Fetched(value));
    }

    /// First unfetched cell, scanning `keys` in order and each key's dates in
    /// registration order.
    pub fn next_unfetched<'a, I>(&self, keys: I) -> Option<(CacheKey, SampleDate)>
    where
        I: IntoIterator<Item = &'a CacheKey>,
    {
        keys.into_iter().find_map(|key| {
            self.cells.get(key).and_then(|row| {
                row.iter()
                    .find(|(_, state)| !state.is_fetched())
                    .map(|(date, _)| (key.clone(), *date))
            })
        })
    }
}

/// Datasets switched on in the picker, per variant, in the order they were
/// switched on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnabledDatasets {
    absolute: IndexSet<DatasetId>,
    relative: IndexSet<DatasetId>,
}

impl EnabledDatasets {
    pub fn new() -> Self {
        Self::default()
    }

    fn set_for(&mut self, variant: Variant) -> &mut IndexSet<DatasetId> {
        match variant {
            Variant::Absolute => &mut self.absolute,
            Variant::Relative => &mut self.relative,
        }
    }

    /// Returns `true` when the selection changed.
    pub fn set(&mut self, variant: Variant, dataset: DatasetId, enabled: bool) -> bool {
        let set = self.set_for(variant);
        if enabled {
            set.insert(dataset)
        } else {
            set.shift_remove(&dataset)
        }
    }

    pub fn is_enabled(&self, variant: Variant, dataset: &DatasetId) -> bool {
        match variant {
            Variant::Absolute => self.absolute.contains(dataset),
            Variant::Relative => self.relative.contains(dataset),
        }
    }

    /// Absolute keys first, then relative ones.
    pub fn keys(&self) -> Vec<CacheKey> {
        self.absolute
            .iter()
            .map(|id| CacheKey::new(id.clone(), Variant::Absolute))
            .chain(
                self.relative
                    .iter()
                    .map(|id| CacheKey::new(id.clone(), Variant::Relative)),
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn sample(d: time::Date) -> SampleDate {
        SampleDate::new(d)
    }

    #[test]
    fn ensure_keys_never_overwrites() {
        let key = CacheKey::absolute("number_of_members");
        let jan = sample(date!(2024 - 01 - 01));
        let feb = sample(date!(2024 - 02 - 01));
        let mut cache = PointCache::new();

        assert_eq!(cache.ensure_keys_exist(&key, &[jan, feb]), 2);
        cache.write(&key, jan, Some(140.0));
        cache.write(&key, feb, None);

        assert_eq!(cache.ensure_keys_exist(&key, &[jan, feb]), 0);
        assert_eq!(cache.read(&key, jan), Some(CellState::Fetched(Some(140.0))));
        assert_eq!(cache.read(&key, feb), Some(CellState::Fetched(None)));
    }

    #[test]
    fn unregistered_cells_read_as_none() {
        let cache = PointCache::new();
        let key = CacheKey::relative("number_of_members");
        assert_eq!(cache.read(&key, sample(date!(2024 - 01 - 01))), None);
    }

    #[test]
    fn next_unfetched_respects_key_then_insertion_order() {
        let absolute = CacheKey::absolute("a");
        let relative = CacheKey::relative("a");
        let mar = sample(date!(2024 - 03 - 01));
        let jan = sample(date!(2024 - 01 - 01));
        let mut cache = PointCache::new();
        cache.ensure_keys_exist(&relative, &[jan]);
        cache.ensure_keys_exist(&absolute, &[mar, jan]);

        let order = [absolute.clone(), relative.clone()];
        assert_eq!(cache.next_unfetched(&order), Some((absolute.clone(), mar)));

        cache.write(&absolute, mar, Some(1.0));
        cache.write(&absolute, jan, Some(2.0));
        assert_eq!(cache.next_unfetched(&order), Some((relative.clone(), jan)));

        cache.write(&relative, jan, None);
        assert_eq!(cache.next_unfetched(&order), None);
    }

    #[test]
    fn enabling_twice_is_idempotent() {
        let mut enabled = EnabledDatasets::new();
        assert!(enabled.set(Variant::Absolute, "a".into(), true));
        assert!(!enabled.set(Variant::Absolute, "a".into(), true));
        assert!(enabled.set(Variant::Relative, "a".into(), true));
        assert_eq!(
            enabled.keys(),
            vec![CacheKey::absolute("a"), CacheKey::relative("a")]
        );
    }

    #[test]
    fn keys_follow_enablement_order() {
        let mut enabled = EnabledDatasets::new();
        enabled.set(Variant::Relative, "z".into(), true);
        enabled.set(Variant::Absolute, "b".into(), true);
        enabled.set(Variant::Absolute, "a".into(), true);
        enabled.set(Variant::Absolute, "b".into(), false);
        enabled.set(Variant::Absolute, "b".into(), true);

        let ids: Vec<String> = enabled.keys().iter().map(CacheKey::series_id).collect();
        assert_eq!(ids, vec!["a", "b", "z_relative"]);
    }
}
