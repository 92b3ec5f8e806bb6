use gloo_net::http::Request;
use serde_json::Value;
use watch_core::{
    is_uri_safe, items_path, parse_points, parse_records, PricePoint, ViewError, WatchRecord,
    WATCHES_PATH,
};

/// Client for the two read endpoints the board needs.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: String,
}

impl ApiClient {
    /// `base` is prefixed to every path; empty means same origin.
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn watches_url(&self) -> String {
        format!("{}{WATCHES_PATH}", self.base)
    }

    pub fn items_url(&self, id: &str) -> String {
        if is_uri_safe(id) {
            format!("{}{}", self.base, items_path(id))
        } else {
            let id = String::from(js_sys::encode_uri_component(id));
            format!("{}{}", self.base, items_path(&id))
        }
    }

    pub async fn fetch_watches(&self) -> Result<Vec<WatchRecord>, ViewError> {
        let values = get_array(&self.watches_url()).await?;
        let parsed = parse_records(values);
        for issue in &parsed.issues {
            log::warn!("{issue}");
        }
        Ok(parsed.items)
    }

    pub async fn fetch_items(&self, id: &str) -> Result<Vec<PricePoint>, ViewError> {
        let values = get_array(&self.items_url(id)).await?;
        let parsed = parse_points(&values);
        for issue in &parsed.issues {
            log::warn!("watch {id}: {issue}");
        }
        Ok(parsed.items)
    }
}

async fn get_array(url: &str) -> Result<Vec<Value>, ViewError> {
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| ViewError::fetch_failed(url, e))?;
    if !resp.ok() {
        return Err(ViewError::fetch_failed(
            url,
            format!("HTTP {} {}", resp.status(), resp.status_text()),
        ));
    }
    resp.json::<Vec<Value>>()
        .await
        .map_err(|e| ViewError::fetch_failed(url, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_click_id_maps_to_items_endpoint() {
        let api = ApiClient::new("http://h/");
        assert_eq!(api.watches_url(), "http://h/watch");
        let id = watch_core::parse_load_id("watch-load-1").unwrap();
        assert_eq!(api.items_url(id), "http://h/watch/1/items");
    }

    #[test]
    fn empty_base_is_same_origin() {
        let api = ApiClient::new("");
        assert_eq!(api.watches_url(), "/watch");
        assert_eq!(api.items_url("lamp-7"), "/watch/lamp-7/items");
    }
}
