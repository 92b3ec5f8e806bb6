use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use watch_core::{parse_date, PricePoint};

pub const DEFAULT_EBAY_API_URL: &str = "https://svcs.ebay.com/services/search/FindingService/v1";

/// Listings in this state actually sold.
const SOLD_STATE: &str = "EndedWithSales";

#[derive(Debug, Error)]
pub enum EbayError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("ebay api error: {0}")]
    Api(String),
}

/// Thin client for the Finding API's `findCompletedItems` call.
#[derive(Debug, Clone)]
pub struct EbayClient {
    http: reqwest::Client,
    base_url: String,
    app_id: String,
}

impl EbayClient {
    pub fn new(app_id: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            app_id: app_id.into(),
        }
    }

    /// Sold listings matching `keywords`.
    pub async fn completed_items(&self, keywords: &str) -> Result<Vec<PricePoint>, EbayError> {
        let resp = self
            .http
            .get(&self.base_url)
            .query(&[
                ("OPERATION-NAME", "findCompletedItems"),
                ("SERVICE-VERSION", "1.0.0"),
                ("SECURITY-APPNAME", self.app_id.as_str()),
                ("RESPONSE-DATA-FORMAT", "JSON"),
                ("REST-PAYLOAD", ""),
                ("keywords", keywords),
            ])
            .send()
            .await?
            .error_for_status()?;
        let body: Value = resp.json().await?;
        parse_completed_items(&body)
    }
}

/// The Finding API wraps every field in a one-element array.
fn first<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value.get(key)? {
        Value::Array(items) => items.first(),
        other => Some(other),
    }
}

fn first_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    first(value, key).and_then(Value::as_str)
}

pub fn parse_completed_items(body: &Value) -> Result<Vec<PricePoint>, EbayError> {
    let response = first(body, "findCompletedItemsResponse")
        .ok_or_else(|| EbayError::Api("missing findCompletedItemsResponse".into()))?;

    if first_str(response, "ack") != Some("Success") {
        let message = first(response, "errorMessage")
            .and_then(|m| first(m, "error"))
            .and_then(|e| first_str(e, "message"))
            .unwrap_or("request not acknowledged");
        return Err(EbayError::Api(message.to_string()));
    }

    let items = first(response, "searchResult")
        .and_then(|r| r.get("item"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut points = Vec::new();
    for item in items {
        let Some(status) = first(item, "sellingStatus") else {
            continue;
        };
        if first_str(status, "sellingState") != Some(SOLD_STATE) {
            continue;
        }
        let price = first(status, "currentPrice")
            .and_then(|p| p.get("__value__"))
            .and_then(|v| v.as_str().and_then(|s| s.parse().ok()).or_else(|| v.as_f64()));
        let date = first(item, "listingInfo")
            .and_then(|l| first_str(l, "endTime"))
            .and_then(parse_date);
        match (date, price) {
            (Some(date), Some(price)) => points.push(PricePoint {
                date,
                price,
                url: first_str(item, "viewItemURL").map(str::to_string),
            }),
            _ => debug!(item_id = ?first_str(item, "itemId"), "skipping sold item without date or price"),
        }
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(id: &str, state: &str, price: &str, end: &str) -> Value {
        json!({
            "itemId": [id],
            "viewItemURL": [format!("http://ebay/{id}")],
            "sellingStatus": [{
                "currentPrice": [{"@currencyId": "USD", "__value__": price}],
                "sellingState": [state]
            }],
            "listingInfo": [{"endTime": [end]}]
        })
    }

    #[test]
    fn keeps_only_sold_items() {
        let body = json!({
            "findCompletedItemsResponse": [{
                "ack": ["Success"],
                "searchResult": [{
                    "@count": "3",
                    "item": [
                        item("1", "EndedWithSales", "12.50", "2020-01-01T10:00:00.000Z"),
                        item("2", "EndedWithoutSales", "99.00", "2020-01-02T10:00:00.000Z"),
                        item("3", "EndedWithSales", "7", "2020-01-03T10:00:00.000Z")
                    ]
                }]
            }]
        });
        let points = parse_completed_items(&body).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].price, 12.5);
        assert_eq!(points[0].url.as_deref(), Some("http://ebay/1"));
        assert_eq!(points[1].price, 7.0);
        assert_eq!(points[1].date.to_rfc3339(), "2020-01-03T10:00:00+00:00");
    }

    #[test]
    fn empty_search_result_is_ok() {
        let body = json!({
            "findCompletedItemsResponse": [{"ack": ["Success"], "searchResult": [{"@count": "0"}]}]
        });
        assert!(parse_completed_items(&body).unwrap().is_empty());
    }

    #[test]
    fn failure_ack_surfaces_message() {
        let body = json!({
            "findCompletedItemsResponse": [{
                "ack": ["Failure"],
                "errorMessage": [{"error": [{"message": ["Invalid application id"]}]}]
            }]
        });
        let err = parse_completed_items(&body).unwrap_err();
        assert_eq!(err.to_string(), "ebay api error: Invalid application id");
    }
}
