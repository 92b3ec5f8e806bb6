//! URL paths shared by the server router and the browser client.

pub const WATCHES_PATH: &str = "/watch";
/// Router template for a watch's sales; `:id` is the path parameter.
pub const ITEMS_ROUTE: &str = "/watch/:id/items";

/// Concrete path for [`ITEMS_ROUTE`]. `id` must already be URI-encoded.
pub fn items_path(id: &str) -> String {
    format!("{WATCHES_PATH}/{id}/items")
}

/// Characters `encodeURIComponent` leaves as they are.
pub fn is_uri_safe(id: &str) -> bool {
    id.chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_.!~*'()".contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_path_fills_route_template() {
        assert_eq!(items_path("1"), "/watch/1/items");
        assert_eq!(ITEMS_ROUTE.replace(":id", "1"), items_path("1"));
    }

    #[test]
    fn safe_ids_need_no_encoding() {
        assert!(is_uri_safe("lamp-7"));
        assert!(!is_uri_safe("a/b"));
        assert!(!is_uri_safe("nikon f3"));
    }
}
