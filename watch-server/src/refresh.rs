use std::time::Duration;

use tokio::time::interval;
use tracing::{info, warn};

use crate::ebay::EbayClient;
use crate::estimate::normalize_keywords;
use crate::routes::SharedStore;
use crate::store::StoreError;

/// Poll the marketplace for every enabled watch, forever.
pub async fn run_refresh(store: SharedStore, client: EbayClient, every: Duration) {
    let mut timer = interval(every);
    loop {
        timer.tick().await;
        match refresh_once(&store, &client).await {
            Ok(added) => info!(added, "refresh cycle done"),
            Err(err) => warn!("refresh cycle failed: {err}"),
        }
    }
}

/// One pass over all watches. Each merge that adds sales saves the store.
pub async fn refresh_once(store: &SharedStore, client: &EbayClient) -> Result<usize, StoreError> {
    let targets = store.read().await.refresh_targets();
    let mut added = 0;
    for (id, keywords) in targets {
        let query = normalize_keywords(&keywords);
        if query.is_empty() {
            continue;
        }
        match client.completed_items(&query).await {
            Ok(points) => {
                let count = store.write().await.merge_items(id, points).await?;
                info!(id, query = %query, count, "new sales recorded");
                added += count;
            }
            Err(err) => warn!(id, query = %query, "ebay lookup failed: {err}"),
        }
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{sample_store, scratch_path};
    use crate::store::WatchStore;
    use axum::extract::Query;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    async fn finding_stub(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        assert_eq!(params["OPERATION-NAME"], "findCompletedItems");
        assert_eq!(params["keywords"], "nikon f3 body");
        Json(json!({
            "findCompletedItemsResponse": [{
                "ack": ["Success"],
                "searchResult": [{
                    "item": [{
                        "itemId": ["9"],
                        "viewItemURL": ["http://ebay/9"],
                        "sellingStatus": [{
                            "currentPrice": [{"__value__": "30.00"}],
                            "sellingState": ["EndedWithSales"]
                        }],
                        "listingInfo": [{"endTime": ["2020-09-01T00:00:00.000Z"]}]
                    }]
                }]
            }]
        }))
    }

    async fn stub_client() -> EbayClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, Router::new().route("/", get(finding_stub)))
                .await
                .unwrap();
        });
        EbayClient::new("app-id", format!("http://{addr}/"))
    }

    #[tokio::test]
    async fn refresh_merges_new_sales_and_saves() {
        let path = scratch_path("refresh");
        let watches = serde_json::from_str(&sample_store().to_json().unwrap()).unwrap();
        let store: SharedStore = Arc::new(RwLock::new(WatchStore::from_watches(&path, watches)));
        let client = stub_client().await;

        assert_eq!(refresh_once(&store, &client).await.unwrap(), 1);
        // Second pass finds the same listing and adds nothing.
        assert_eq!(refresh_once(&store, &client).await.unwrap(), 0);

        let reloaded = WatchStore::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        let prices: Vec<f64> = reloaded.items(1).unwrap().iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![10.0, 20.0, 30.0]);
    }
}
