use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, warn};
use watch_core::PricePoint;

use crate::estimate::mean_price;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] io::Error),
    #[error("store json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown watch: {0}")]
    NotFound(String),
}

fn default_enabled() -> bool {
    true
}

/// A tracked item and the sales recorded for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Watch {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub items: Vec<PricePoint>,
    /// Extra columns shown in the table as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Watch {
    /// Row for `GET /watch`; the estimate is derived from the stored sales.
    pub fn summary(&self) -> Value {
        let mut row = Map::new();
        row.insert("id".into(), json!(self.id));
        row.insert("name".into(), json!(self.name));
        row.insert("keywords".into(), json!(self.keywords));
        row.insert("estimate".into(), json!(mean_price(&self.items)));
        row.insert("url".into(), json!(self.url));
        row.insert("enabled".into(), json!(self.enabled));
        for (key, value) in &self.extra {
            row.entry(key.clone()).or_insert_with(|| value.clone());
        }
        Value::Object(row)
    }

    fn sort_items(&mut self) {
        self.items.sort_by_key(|p| p.date);
    }
}

/// JSON-file backed list of watches.
#[derive(Debug)]
pub struct WatchStore {
    path: PathBuf,
    watches: Vec<Watch>,
}

impl WatchStore {
    /// A missing file is an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let watches = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "watch store not found, starting empty");
                Vec::new()
            }
            Err(err) => return Err(err.into()),
        };
        Ok(Self::from_watches(path, watches))
    }

    pub fn from_watches(path: impl Into<PathBuf>, mut watches: Vec<Watch>) -> Self {
        for watch in &mut watches {
            watch.sort_items();
        }
        Self {
            path: path.into(),
            watches,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.watches.len()
    }

    pub fn summaries(&self) -> Vec<Value> {
        self.watches.iter().map(Watch::summary).collect()
    }

    pub fn items(&self, id: u64) -> Result<&[PricePoint], StoreError> {
        self.find(id).map(|w| w.items.as_slice())
    }

    /// `(id, keywords)` of every enabled watch with something to search for.
    pub fn refresh_targets(&self) -> Vec<(u64, String)> {
        self.watches
            .iter()
            .filter(|w| w.enabled && !w.keywords.trim().is_empty())
            .map(|w| (w.id, w.keywords.clone()))
            .collect()
    }

    /// Append sales not seen before (matched by URL, or by date and price
    /// when there is none) and save the store if anything was added.
    /// Returns how many were added.
    pub async fn merge_items(
        &mut self,
        id: u64,
        points: Vec<PricePoint>,
    ) -> Result<usize, StoreError> {
        let added = self.merge_in_memory(id, points)?;
        if added > 0 {
            self.save().await?;
        }
        Ok(added)
    }

    fn merge_in_memory(&mut self, id: u64, points: Vec<PricePoint>) -> Result<usize, StoreError> {
        let watch = self
            .watches
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let mut seen: HashSet<String> = watch.items.iter().map(item_key).collect();
        let before = watch.items.len();
        for point in points {
            if seen.insert(item_key(&point)) {
                watch.items.push(point);
            }
        }
        let added = watch.items.len() - before;
        if added > 0 {
            watch.sort_items();
        }
        debug!(id, added, "merged items");
        Ok(added)
    }

    /// Write to a sibling temp file, then rename it over the store, so a
    /// crash mid-write leaves the previous file intact.
    pub async fn save(&self) -> Result<(), StoreError> {
        let json = self.to_json()?;
        let tmp = temp_path(&self.path);
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), "watch store saved");
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&self.watches)?)
    }

    fn find(&self, id: u64) -> Result<&Watch, StoreError> {
        self.watches
            .iter()
            .find(|w| w.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

fn item_key(point: &PricePoint) -> String {
    match &point.url {
        Some(url) => url.clone(),
        None => format!("{}@{}", point.timestamp_ms(), point.price),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    pub(crate) fn sample_store() -> WatchStore {
        let raw = json!([
            {
                "id": 1,
                "name": "Nikon F3",
                "keywords": "nikon f3 body",
                "url": "http://x",
                "enabled": true,
                "condition": "used",
                "items": [
                    {"date": "2020-06-01T00:00:00Z", "price": 20.0, "url": "http://b"},
                    {"date": "2020-01-01T00:00:00Z", "price": 10.0, "url": "http://a"}
                ]
            },
            {"id": 2, "name": "Leica M6", "enabled": false}
        ]);
        let watches: Vec<Watch> = serde_json::from_value(raw).unwrap();
        WatchStore::from_watches("unused.json", watches)
    }

    fn point(month: u32, price: f64, url: Option<&str>) -> PricePoint {
        PricePoint {
            date: Utc.with_ymd_and_hms(2020, month, 1, 0, 0, 0).unwrap(),
            price,
            url: url.map(str::to_string),
        }
    }

    #[test]
    fn items_are_sorted_on_load() {
        let store = sample_store();
        let items = store.items(1).unwrap();
        assert_eq!(items[0].price, 10.0);
        assert_eq!(items[1].price, 20.0);
    }

    #[test]
    fn summary_orders_keys_and_derives_estimate() {
        let store = sample_store();
        let rows = store.summaries();
        let keys: Vec<&String> = rows[0].as_object().unwrap().keys().collect();
        assert_eq!(
            keys,
            vec!["id", "name", "keywords", "estimate", "url", "enabled", "condition"]
        );
        assert_eq!(rows[0]["estimate"], json!(15.0));
        assert_eq!(rows[1]["estimate"], Value::Null);
        assert_eq!(rows[1]["keywords"], json!(""));
    }

    #[test]
    fn unknown_watch_is_not_found() {
        let store = sample_store();
        assert!(matches!(store.items(99), Err(StoreError::NotFound(id)) if id == "99"));
    }

    pub(crate) fn scratch_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("watch-store-{tag}-{}.json", std::process::id()))
    }

    #[tokio::test]
    async fn merge_skips_known_sales_and_saves() {
        let path = scratch_path("merge");
        let mut store = sample_store();
        store.path = path.clone();
        let added = store
            .merge_items(
                1,
                vec![
                    point(1, 10.0, Some("http://a")),
                    point(3, 15.0, Some("http://c")),
                    point(4, 12.0, None),
                    point(4, 12.0, None),
                ],
            )
            .await
            .unwrap();
        assert_eq!(added, 2);
        let prices: Vec<f64> = store.items(1).unwrap().iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![10.0, 15.0, 12.0, 20.0]);

        let reloaded = WatchStore::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(reloaded.items(1).unwrap(), store.items(1).unwrap());
        assert!(!temp_path(&path).exists());
    }

    #[tokio::test]
    async fn merge_without_new_sales_leaves_disk_alone() {
        let path = scratch_path("unchanged");
        let mut store = sample_store();
        store.path = path.clone();
        let added = store
            .merge_items(1, vec![point(1, 10.0, Some("http://a"))])
            .await
            .unwrap();
        assert_eq!(added, 0);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn merge_into_unknown_watch_fails() {
        let mut store = sample_store();
        let err = store.merge_items(99, vec![point(1, 1.0, None)]).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "99"));
    }

    #[test]
    fn temp_file_sits_next_to_store() {
        assert_eq!(
            temp_path(Path::new("data/watches.json")),
            PathBuf::from("data/watches.json.tmp")
        );
    }

    #[test]
    fn refresh_targets_skip_disabled_watches() {
        let store = sample_store();
        assert_eq!(store.refresh_targets(), vec![(1, "nikon f3 body".to_string())]);
    }

    #[test]
    fn missing_file_loads_empty() {
        let path = std::env::temp_dir().join("watch-store-missing-does-not-exist.json");
        let store = WatchStore::load(&path).unwrap();
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn store_round_trips_through_disk() {
        let path = scratch_path("roundtrip");
        let mut store = sample_store();
        store.path = path.clone();
        store.save().await.unwrap();
        let loaded = WatchStore::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.summaries(), store.summaries());
    }
}
