use watch_core::PricePoint;

/// Mean sold price, `None` without any sales.
pub fn mean_price(points: &[PricePoint]) -> Option<f64> {
    if points.is_empty() {
        return None;
    }
    let total: f64 = points.iter().map(|p| p.price).sum();
    Some(total / points.len() as f64)
}

/// Search terms as sent to the marketplace: whitespace collapsed, non-word
/// characters dropped from each term, empty terms removed.
pub fn normalize_keywords(raw: &str) -> String {
    raw.split_whitespace()
        .map(|term| {
            term.chars()
                .filter(|c| c.is_alphanumeric() || *c == '_')
                .collect::<String>()
        })
        .filter(|term| !term.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn point(price: f64) -> PricePoint {
        PricePoint {
            date: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            price,
            url: None,
        }
    }

    #[test]
    fn mean_of_sales() {
        assert_eq!(mean_price(&[point(10.0), point(20.0), point(33.0)]), Some(21.0));
        assert_eq!(mean_price(&[]), None);
    }

    #[test]
    fn keywords_are_cleaned() {
        assert_eq!(normalize_keywords("  Nikon\tF3 (body),\n mint!! "), "Nikon F3 body mint");
        assert_eq!(normalize_keywords("-- &&"), "");
        assert_eq!(normalize_keywords("lens_cap 50mm"), "lens_cap 50mm");
    }
}
