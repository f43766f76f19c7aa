use super::collect;
use crate::BucketMultimap;
use hashbrown::hash_map;
use rayon::iter::plumbing::UnindexedConsumer;
use rayon::iter::{
    FromParallelIterator, IntoParallelIterator, IntoParallelRefIterator,
    IntoParallelRefMutIterator, ParallelExtend, ParallelIterator,
};
use std::hash::{BuildHasher, Hash};

/// Parallel iterator over shared references to entries in a map.
#[derive(Clone)]
pub struct ParIter<'a, K, V> {
    inner: hash_map::rayon::ParIter<'a, K, Vec<V>>,
}

impl<'a, K: Sync, V: Sync> ParallelIterator for ParIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: UnindexedConsumer<(&'a K, &'a V)>,
    {
        self.inner
            .flat_map(|(key, bucket)| bucket.par_iter().map(move |value| (key, value)))
            .drive_unindexed(consumer)
    }
}

/// Parallel iterator over shared references to keys in a map,
/// repeated once per value in their bucket.
#[derive(Clone)]
pub struct ParKeys<'a, K, V> {
    inner: hash_map::rayon::ParIter<'a, K, Vec<V>>,
}

impl<'a, K: Sync, V: Sync> ParallelIterator for ParKeys<'a, K, V> {
    type Item = &'a K;

    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: UnindexedConsumer<Self::Item>,
    {
        self.inner
            .flat_map(|(key, bucket)| bucket.par_iter().map(move |_| key))
            .drive_unindexed(consumer)
    }
}

/// Parallel iterator over shared references to values in a map.
#[derive(Clone)]
pub struct ParValues<'a, K, V> {
    inner: hash_map::rayon::ParIter<'a, K, Vec<V>>,
}

impl<'a, K: Sync, V: Sync> ParallelIterator for ParValues<'a, K, V> {
    type Item = &'a V;

    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: UnindexedConsumer<Self::Item>,
    {
        self.inner
            .flat_map(|(_, bucket)| bucket.par_iter())
            .drive_unindexed(consumer)
    }
}

/// Parallel iterator over mutable references to entries in a map.
pub struct ParIterMut<'a, K, V> {
    inner: hash_map::rayon::ParIterMut<'a, K, Vec<V>>,
}

impl<'a, K: Sync, V: Send> ParallelIterator for ParIterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: UnindexedConsumer<Self::Item>,
    {
        self.inner
            .flat_map(|(key, bucket)| bucket.par_iter_mut().map(move |value| (key, value)))
            .drive_unindexed(consumer)
    }
}

/// Parallel iterator over mutable references to values in a map.
pub struct ParValuesMut<'a, K, V> {
    inner: hash_map::rayon::ParValuesMut<'a, K, Vec<V>>,
}

impl<'a, K: Sync, V: Send> ParallelIterator for ParValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: UnindexedConsumer<Self::Item>,
    {
        self.inner
            .flat_map(|bucket| bucket.par_iter_mut())
            .drive_unindexed(consumer)
    }
}

/// Parallel iterator over the distinct keys and buckets of a consumed map.
pub struct IntoParIter<K, V> {
    inner: hash_map::rayon::IntoParIter<K, Vec<V>>,
}

impl<K: Send, V: Send> ParallelIterator for IntoParIter<K, V> {
    type Item = (K, Vec<V>);

    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: UnindexedConsumer<Self::Item>,
    {
        self.inner.drive_unindexed(consumer)
    }
}

impl<K: Sync, V: Sync, S> BucketMultimap<K, V, S> {
    /// Visits (potentially in parallel) immutably borrowed keys in an arbitrary order,
    /// repeated once per value in their bucket.
    pub fn par_keys(&self) -> ParKeys<'_, K, V> {
        ParKeys {
            inner: self.inner.par_iter(),
        }
    }

    /// Visits (potentially in parallel) immutably borrowed values in an arbitrary order.
    pub fn par_values(&self) -> ParValues<'_, K, V> {
        ParValues {
            inner: self.inner.par_iter(),
        }
    }
}

impl<K: Send, V: Send, S> BucketMultimap<K, V, S> {
    /// Visits (potentially in parallel) mutably borrowed values in an arbitrary order.
    pub fn par_values_mut(&mut self) -> ParValuesMut<'_, K, V> {
        ParValuesMut {
            inner: self.inner.par_values_mut(),
        }
    }
}

impl<K: Send, V: Send, S> IntoParallelIterator for BucketMultimap<K, V, S> {
    type Item = (K, Vec<V>);
    type Iter = IntoParIter<K, V>;

    fn into_par_iter(self) -> Self::Iter {
        IntoParIter {
            inner: self.inner.into_par_iter(),
        }
    }
}

impl<'a, K: Sync, V: Sync, S> IntoParallelIterator for &'a BucketMultimap<K, V, S> {
    type Item = (&'a K, &'a V);
    type Iter = ParIter<'a, K, V>;

    fn into_par_iter(self) -> Self::Iter {
        ParIter {
            inner: self.inner.par_iter(),
        }
    }
}

impl<'a, K: Sync, V: Send, S> IntoParallelIterator for &'a mut BucketMultimap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type Iter = ParIterMut<'a, K, V>;

    fn into_par_iter(self) -> Self::Iter {
        ParIterMut {
            inner: self.inner.par_iter_mut(),
        }
    }
}

impl<K, V, S> FromParallelIterator<(K, V)> for BucketMultimap<K, V, S>
where
    K: Eq + Hash + Send,
    V: Send,
    S: BuildHasher + Default,
{
    fn from_par_iter<P>(par_iter: P) -> Self
    where
        P: IntoParallelIterator<Item = (K, V)>,
    {
        let mut map = BucketMultimap::default();
        map.par_extend(par_iter);
        map
    }
}

impl<K, V, S> ParallelExtend<(K, V)> for BucketMultimap<K, V, S>
where
    K: Eq + Hash + Send,
    V: Send,
    S: BuildHasher,
{
    fn par_extend<I>(&mut self, par_iter: I)
    where
        I: IntoParallelIterator<Item = (K, V)>,
    {
        extend(self, par_iter);
    }
}

impl<'a, K, V, S> ParallelExtend<(&'a K, &'a V)> for BucketMultimap<K, V, S>
where
    K: Copy + Eq + Hash + Sync,
    V: Copy + Sync,
    S: BuildHasher,
{
    fn par_extend<I>(&mut self, par_iter: I)
    where
        I: IntoParallelIterator<Item = (&'a K, &'a V)>,
    {
        extend(self, par_iter);
    }
}

fn extend<K, V, S, I>(map: &mut BucketMultimap<K, V, S>, par_iter: I)
where
    K: Eq + Hash,
    S: BuildHasher,
    I: IntoParallelIterator,
    BucketMultimap<K, V, S>: Extend<I::Item>,
{
    let (list, len) = collect(par_iter);

    map.reserve(len);

    for vec in list {
        map.extend(vec);
    }
}

#[cfg(test)]
mod test_par_map {
    use crate::BucketMultimap;
    use rayon::iter::{IntoParallelIterator, ParallelExtend, ParallelIterator};

    fn sample() -> BucketMultimap<i32, i32> {
        let mut map = BucketMultimap::new();
        map.insert(1, 1);
        map.insert(1, 2);
        map.insert(2, 3);
        map
    }

    #[test]
    fn test_par_iter_matches_iter() {
        let map = sample();

        let mut sequential: Vec<_> = map.iter().map(|(&key, &value)| (key, value)).collect();
        sequential.sort_unstable();

        let mut parallel: Vec<_> = (&map)
            .into_par_iter()
            .map(|(&key, &value)| (key, value))
            .collect();
        parallel.sort_unstable();

        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_par_keys() {
        let map = sample();

        let mut keys: Vec<_> = map.par_keys().copied().collect();
        keys.sort_unstable();

        assert_eq!(keys, [1, 1, 2]);
    }

    #[test]
    fn test_par_values() {
        let map = sample();

        let mut values: Vec<_> = map.par_values().copied().collect();
        values.sort_unstable();

        assert_eq!(values, [1, 2, 3]);
    }

    #[test]
    fn test_par_values_mut() {
        let mut map = sample();

        map.par_values_mut().for_each(|value| *value *= 10);

        let mut values: Vec<_> = map.values().copied().collect();
        values.sort_unstable();

        assert_eq!(values, [10, 20, 30]);
    }

    #[test]
    fn test_into_par_iter_yields_buckets() {
        let map = sample();

        let mut buckets: Vec<_> = map.into_par_iter().collect();
        buckets.sort_unstable_by_key(|(key, _)| *key);

        assert_eq!(buckets, [(1, vec![1, 2]), (2, vec![3])]);
    }

    #[test]
    fn test_par_extend_matches_extend() {
        let pairs = [(1, 1), (1, 2), (2, 3)];

        let mut parallel: BucketMultimap<i32, i32> = BucketMultimap::new();
        parallel.par_extend(pairs.into_par_iter());

        let mut sequential = BucketMultimap::new();
        sequential.extend(pairs);

        assert_eq!(parallel.len(), sequential.len());

        let mut parallel_pairs: Vec<_> =
            parallel.iter().map(|(&key, &value)| (key, value)).collect();
        parallel_pairs.sort_unstable();

        let mut sequential_pairs: Vec<_> = sequential
            .iter()
            .map(|(&key, &value)| (key, value))
            .collect();
        sequential_pairs.sort_unstable();

        assert_eq!(parallel_pairs, sequential_pairs);
    }

    #[test]
    fn test_from_par_iter() {
        let pairs = [(1, 1), (1, 2), (2, 3)];

        let map: BucketMultimap<i32, i32> = pairs.into_par_iter().collect();

        assert_eq!(map.len(), 3);
        assert!(map.contains(&1, &1));
        assert!(map.contains(&1, &2));
        assert!(map.contains(&2, &3));
    }
}
