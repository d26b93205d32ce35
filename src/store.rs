use crate::dlog;
use crate::error::StoreError;
use crate::kv::KvStore;
use crate::types::{Workout, WorkoutId};

/// Reserved namespace for workout records inside the flat store.
pub const KEY_PREFIX: &str = "workout:";

pub fn record_key(id: &WorkoutId) -> String {
    format!("{KEY_PREFIX}{id}")
}

/// A record under the workout prefix that could not be turned back into a
/// workout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub key: String,
    pub reason: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: Vec<SkippedRecord>,
}

/// Insertion-ordered workouts, each persisted as its own keyed record.
pub struct WorkoutStore<K> {
    kv: K,
    workouts: Vec<Workout>,
}

impl<K: KvStore> WorkoutStore<K> {
    /// Wraps `kv` without reading it; call [`Self::load_all`] to populate.
    pub const fn new(kv: K) -> Self {
        Self {
            kv,
            workouts: Vec::new(),
        }
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    pub fn find(&self, id: &WorkoutId) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id() == id)
    }

    pub fn find_mut(&mut self, id: &WorkoutId) -> Option<&mut Workout> {
        self.workouts.iter_mut().find(|w| w.id() == id)
    }

    pub const fn kv(&self) -> &K {
        &self.kv
    }

    pub fn into_inner(self) -> K {
        self.kv
    }

    /// Persists `workout`, then appends it. Memory is left untouched when
    /// the write fails.
    pub fn add(&mut self, workout: Workout) -> Result<(), StoreError> {
        if self.find(workout.id()).is_some() {
            return Err(StoreError::DuplicateId(workout.id().clone()));
        }
        self.persist(&workout)?;
        dlog!("stored workout id={} kind={}", workout.id(), workout.kind());
        self.workouts.push(workout);
        Ok(())
    }

    /// Writes the current in-memory state of one workout back to storage.
    pub fn update(&mut self, id: &WorkoutId) -> Result<bool, StoreError> {
        let Some(w) = self.workouts.iter().find(|w| w.id() == id) else {
            return Ok(false);
        };
        let body = encode(w)?;
        self.kv.set(&record_key(id), &body)?;
        Ok(true)
    }

    /// Replaces the in-memory sequence with every workout record in storage.
    ///
    /// Keys outside the workout namespace are ignored. Records that fail to
    /// decode, break a workout invariant, or sit under a key other than
    /// `workout:<their id>` are skipped and listed in the report.
    pub fn load_all(&mut self) -> Result<LoadReport, StoreError> {
        let mut report = LoadReport::default();
        let mut out: Vec<Workout> = Vec::new();

        for key in self.kv.keys()? {
            if !key.starts_with(KEY_PREFIX) {
                continue;
            }
            let Some(body) = self.kv.get(&key)? else {
                continue;
            };

            match decode(&key, &body) {
                Ok(w) => out.push(w),
                Err(reason) => {
                    tracing::warn!(key = %key, reason = %reason, "skipping workout record");
                    report.skipped.push(SkippedRecord { key, reason });
                }
            }
        }

        out.sort_by(|a, b| a.date().cmp(&b.date()).then_with(|| a.id().cmp(b.id())));
        report.loaded = out.len();
        self.workouts = out;

        tracing::info!(
            loaded = report.loaded,
            skipped = report.skipped.len(),
            "loaded workouts"
        );
        Ok(report)
    }

    /// Removes one workout from storage and memory. Returns the removed
    /// workout, if there was one.
    pub fn remove_by_id(&mut self, id: &WorkoutId) -> Result<Option<Workout>, StoreError> {
        self.kv.delete(&record_key(id))?;
        let removed = self
            .workouts
            .iter()
            .position(|w| w.id() == id)
            .map(|i| self.workouts.remove(i));
        dlog!("removed workout id={id} found={}", removed.is_some());
        Ok(removed)
    }

    /// Deletes every workout record and empties memory. Keys outside the
    /// workout namespace survive.
    pub fn clear(&mut self) -> Result<usize, StoreError> {
        let mut n = 0usize;
        for key in self.kv.keys()? {
            if key.starts_with(KEY_PREFIX) {
                self.kv.delete(&key)?;
                n += 1;
            }
        }
        self.workouts.clear();
        tracing::info!(removed = n, "cleared all workouts");
        Ok(n)
    }

    fn persist(&mut self, w: &Workout) -> Result<(), StoreError> {
        let body = encode(w)?;
        self.kv.set(&record_key(w.id()), &body)?;
        Ok(())
    }
}

/// One stored record back to a workout. A record is only accepted under
/// its own key, so no two loaded workouts can share an id and every loaded
/// workout can later be deleted by id.
fn decode(key: &str, body: &str) -> Result<Workout, String> {
    let w: Workout = serde_json::from_str(body).map_err(|e| e.to_string())?;
    if key != record_key(w.id()) {
        return Err(format!("key does not match id {}", w.id()));
    }
    w.validate().map_err(|e| e.to_string())?;
    Ok(w)
}

fn encode(w: &Workout) -> Result<String, StoreError> {
    serde_json::to_string(w).map_err(|source| StoreError::Encode {
        id: w.id().clone(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;
    use crate::types::{Activity, Coords, WorkoutDetails};
    use anyhow::bail;
    use chrono::{TimeZone, Utc};

    fn workout(ms: i64, activity: Activity) -> Workout {
        let t = Utc.timestamp_millis_opt(ms).single().unwrap();
        Workout::create(activity, Coords::new(39.0, -12.0), 5.2, 24.0, t).unwrap()
    }

    fn run(ms: i64) -> Workout {
        workout(ms, Activity::Running { cadence: 178.0 })
    }

    #[test]
    fn add_persists_under_prefixed_key() {
        let mut store = WorkoutStore::new(MemoryKv::new());
        let w = run(1_713_100_000_000);
        store.add(w.clone()).unwrap();

        let key = record_key(w.id());
        assert!(key.starts_with("workout:"));
        assert!(store.kv().get(&key).unwrap().is_some());
        assert_eq!(store.find(w.id()), Some(&w));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut store = WorkoutStore::new(MemoryKv::new());
        store.add(run(1_713_100_000_000)).unwrap();
        let err = store.add(run(1_713_100_000_000)).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn load_rebuilds_typed_variants_in_creation_order() {
        let mut store = WorkoutStore::new(MemoryKv::new());
        let a = workout(
            1_713_100_000_300,
            Activity::Swimming { laps: 20.0 },
        );
        let b = run(1_713_100_000_100);
        let c = workout(
            1_713_100_000_200,
            Activity::Cycling {
                elevation_gain: 523.0,
            },
        );
        for w in [&a, &b, &c] {
            store.add(w.clone()).unwrap();
        }

        let mut reloaded = WorkoutStore::new(store.into_inner());
        let report = reloaded.load_all().unwrap();
        assert_eq!(report.loaded, 3);
        assert!(report.skipped.is_empty());

        let ids: Vec<_> = reloaded.workouts().iter().map(|w| w.id().clone()).collect();
        assert_eq!(ids, vec![b.id().clone(), c.id().clone(), a.id().clone()]);

        let got = reloaded.find(c.id()).unwrap();
        assert!(matches!(got.details(), WorkoutDetails::Cycling { .. }));
        assert_eq!(got.details().derived(), c.details().derived());
        assert_eq!(got.distance(), c.distance());
        assert_eq!(got.duration(), c.duration());
    }

    #[test]
    fn foreign_keys_are_ignored_and_bad_records_skipped() {
        let mut kv = MemoryKv::new();
        kv.set("theme", "dark").unwrap();
        kv.set("workout:broken", "{not json").unwrap();
        kv.set("workout:shape", r#"{"type":"rowing"}"#).unwrap();

        let mut store = WorkoutStore::new(kv);
        store.add(run(1_713_100_000_000)).unwrap();

        let report = store.load_all().unwrap();
        assert_eq!(report.loaded, 1);
        let skipped: Vec<_> = report.skipped.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(skipped, vec!["workout:broken", "workout:shape"]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn record_under_foreign_id_key_is_skipped() {
        let w = run(1_713_100_000_000);
        let body = serde_json::to_string(&w).unwrap();
        let mut kv = MemoryKv::new();
        kv.set("workout:legacy", &body).unwrap();

        let mut store = WorkoutStore::new(kv);
        let report = store.load_all().unwrap();
        assert_eq!(report.loaded, 0);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].key, "workout:legacy");
        assert!(report.skipped[0].reason.contains(w.id().as_str()));

        // Nothing was loaded that remove_by_id could fail to delete.
        store.remove_by_id(w.id()).unwrap();
        let report = store.load_all().unwrap();
        assert!(store.is_empty());
        assert_eq!(report.skipped.len(), 1);
    }

    #[test]
    fn copy_of_a_record_loads_once() {
        let w = run(1_713_100_000_000);
        let body = serde_json::to_string(&w).unwrap();
        let mut kv = MemoryKv::new();
        kv.set(&record_key(w.id()), &body).unwrap();
        kv.set("workout:copy", &body).unwrap();

        let mut store = WorkoutStore::new(kv);
        let report = store.load_all().unwrap();
        assert_eq!(report.loaded, 1);
        assert_eq!(store.workouts(), std::slice::from_ref(&w));
        let skipped: Vec<_> = report.skipped.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(skipped, vec!["workout:copy"]);

        assert!(store.remove_by_id(w.id()).unwrap().is_some());
        store.load_all().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn records_breaking_invariants_are_skipped() {
        let w = run(1_713_100_000_000);
        let mut value = serde_json::to_value(&w).unwrap();
        value["distance"] = serde_json::json!(-5.0);
        value["duration"] = serde_json::json!(0.0);
        value["cadence"] = serde_json::json!(-1.0);

        let mut kv = MemoryKv::new();
        kv.set(&record_key(w.id()), &value.to_string()).unwrap();
        let good = run(1_713_100_000_001);
        kv.set(&record_key(good.id()), &serde_json::to_string(&good).unwrap())
            .unwrap();

        let mut store = WorkoutStore::new(kv);
        let report = store.load_all().unwrap();
        assert_eq!(report.loaded, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].key, record_key(w.id()));
        assert!(report.skipped[0].reason.contains("distance"));
        assert_eq!(store.workouts(), std::slice::from_ref(&good));
    }

    #[test]
    fn remove_by_id_touches_only_that_record() {
        let mut store = WorkoutStore::new(MemoryKv::new());
        let a = run(1_713_100_000_001);
        let b = run(1_713_100_000_002);
        let c = run(1_713_100_000_003);
        for w in [&a, &b, &c] {
            store.add(w.clone()).unwrap();
        }

        let removed = store.remove_by_id(b.id()).unwrap();
        assert_eq!(removed.as_ref().map(Workout::id), Some(b.id()));
        assert!(store.find(b.id()).is_none());
        assert_eq!(store.remove_by_id(b.id()).unwrap(), None);

        let mut reloaded = WorkoutStore::new(store.into_inner());
        reloaded.load_all().unwrap();
        let ids: Vec<_> = reloaded.workouts().iter().map(|w| w.id().clone()).collect();
        assert_eq!(ids, vec![a.id().clone(), c.id().clone()]);
    }

    #[test]
    fn clear_keeps_foreign_keys() {
        let mut kv = MemoryKv::new();
        kv.set("theme", "dark").unwrap();
        let mut store = WorkoutStore::new(kv);
        store.add(run(1_713_100_000_001)).unwrap();
        store.add(run(1_713_100_000_002)).unwrap();

        assert_eq!(store.clear().unwrap(), 2);
        assert!(store.is_empty());
        assert_eq!(store.load_all().unwrap().loaded, 0);
        assert_eq!(store.kv().get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn update_persists_view_count() {
        let mut store = WorkoutStore::new(MemoryKv::new());
        let w = run(1_713_100_000_000);
        store.add(w.clone()).unwrap();
        store.find_mut(w.id()).unwrap().record_view();
        assert!(store.update(w.id()).unwrap());

        let mut reloaded = WorkoutStore::new(store.into_inner());
        reloaded.load_all().unwrap();
        assert_eq!(reloaded.find(w.id()).unwrap().clicks(), 1);
    }

    struct FailingKv;

    impl KvStore for FailingKv {
        fn get(&self, _: &str) -> anyhow::Result<Option<String>> {
            Ok(None)
        }
        fn set(&mut self, _: &str, _: &str) -> anyhow::Result<()> {
            bail!("quota exceeded")
        }
        fn delete(&mut self, _: &str) -> anyhow::Result<()> {
            Ok(())
        }
        fn keys(&self) -> anyhow::Result<Vec<String>> {
            Ok(Vec::new())
        }
        fn clear(&mut self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_write_leaves_memory_untouched() {
        let mut store = WorkoutStore::new(FailingKv);
        let err = store.add(run(1_713_100_000_000)).unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
        assert!(store.is_empty());
    }
}
