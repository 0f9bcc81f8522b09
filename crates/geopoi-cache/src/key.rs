//! Key builders. Each cacheable operation formats every parameter,
//! including absent optionals, into one canonical string and hashes it.

use geopoi_core::types::{PoiId, SearchFilters};

/// blake3 of `data`, first 16 bytes, lowercase hex.
pub fn hash_key(data: &str) -> String { hex::encode(&blake3::hash(data.as_bytes()).as_bytes()[..16]) }

/// First 12 characters, for log fields.
pub fn key_prefix(key: &str) -> &str { key.get(..12).unwrap_or(key) }

/// Append `field` as `<byte length>:<field>` so no value can spill into the next one.
fn push_field(canonical: &mut String, field: &str) {
    canonical.push_str(&field.len().to_string());
    canonical.push(':');
    canonical.push_str(field);
}

/// Key for a search page. A zero `limit` is resolved with `default_limit`
/// first, so an implicit and an explicit page of the same size share a key.
pub fn search_key(query: &str, filters: &SearchFilters, default_limit: usize) -> String {
    let mut categories: Vec<&str> = filters.categories.iter().map(String::as_str).collect();
    categories.sort_unstable();
    categories.dedup();
    let center = match filters.center {
        Some(c) => format!("{}:{}", c.lat, c.lng),
        None => "-".to_string(),
    };

    let mut canonical = String::from("search");
    push_field(&mut canonical, query);
    push_field(&mut canonical, &categories.len().to_string());
    for category in categories {
        push_field(&mut canonical, category);
    }
    push_field(&mut canonical, &center);
    push_field(&mut canonical, &filters.radius_km.to_string());
    push_field(&mut canonical, &filters.period);
    push_field(&mut canonical, &filters.limit_or(default_limit).to_string());
    push_field(&mut canonical, &filters.offset.to_string());
    format!("search:{}", hash_key(&canonical))
}

pub fn poi_key(id: PoiId) -> String { format!("poi:{id}") }

pub fn embedding_key(text: &str) -> String { format!("emb:{}", hash_key(text)) }

pub fn categories_key() -> String { "categories".to_string() }
