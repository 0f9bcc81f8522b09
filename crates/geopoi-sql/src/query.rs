//! Incremental builder for the parameterized `poi` search statement.
//!
//! Values are never interpolated into the SQL text: every fragment binds its
//! values through [`PoiQuery::bind`], which hands back the `$n` position the
//! fragment must reference.

use geopoi_core::ordering::SortOrder;
use geopoi_core::types::{Coordinate, SearchFilters};

/// Column list shared by every statement that materializes a [`geopoi_core::types::Poi`].
pub const POI_COLUMNS: &str = "id, \
COALESCE(name, '') AS name, \
COALESCE(description, '') AS description, \
COALESCE(short_description, '') AS short_description, \
ST_Y(location::geometry) AS lat, \
ST_X(location::geometry) AS lng, \
COALESCE(address, '') AS address, \
category, \
COALESCE(subcategory, '') AS subcategory, \
COALESCE(tags, '[]'::jsonb) AS tags, \
COALESCE(historical_period, '') AS historical_period, \
year_built, \
year_destroyed, \
COALESCE(source, '') AS source, \
osm_id, \
popularity_score::float8 AS popularity_score, \
created_at, \
updated_at";

#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Float(f64),
    Int(i64),
    Text(String),
    TextArray(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct PoiQuery {
    sql: String,
    params: Vec<Param>,
    center: Option<(usize, usize)>,
}

fn geography_point(lng: usize, lat: usize) -> String {
    format!("ST_SetSRID(ST_MakePoint(${lng}, ${lat}), 4326)::geography")
}

/// Escape LIKE wildcards so the pattern is a literal substring match.
pub fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

impl PoiQuery {
    /// Base projection. The distance column exists only when a center is given.
    pub fn select(center: Option<Coordinate>) -> Self {
        let mut q = Self { sql: format!("SELECT {POI_COLUMNS}"), params: Vec::new(), center: None };
        if let Some(c) = center {
            let (lng, lat) = q.bind_center(c);
            q.sql.push_str(&format!(", ST_Distance(location, {}) AS distance", geography_point(lng, lat)));
        }
        q.sql.push_str(" FROM poi WHERE 1=1");
        q
    }

    /// Append `value` to the parameter list and return its 1-based position.
    pub fn bind(&mut self, value: Param) -> usize {
        self.params.push(value);
        self.params.len()
    }

    fn bind_center(&mut self, c: Coordinate) -> (usize, usize) {
        if let Some(positions) = self.center {
            return positions;
        }
        let lng = self.bind(Param::Float(c.lng));
        let lat = self.bind(Param::Float(c.lat));
        self.center = Some((lng, lat));
        (lng, lat)
    }

    /// Geography distance from `center` at most `radius_km`.
    pub fn within_radius(mut self, center: Coordinate, radius_km: f64) -> Self {
        let (lng, lat) = self.bind_center(center);
        let meters = self.bind(Param::Float(radius_km * 1000.0));
        self.sql.push_str(&format!(" AND ST_DWithin(location, {}, ${meters})", geography_point(lng, lat)));
        self
    }

    pub fn in_categories(mut self, categories: &[String]) -> Self {
        if categories.is_empty() {
            return self;
        }
        let pos = self.bind(Param::TextArray(categories.to_vec()));
        self.sql.push_str(&format!(" AND category = ANY(${pos})"));
        self
    }

    /// Case-insensitive substring match across name, description and address.
    pub fn matching_text(mut self, text: &str) -> Self {
        let pos = self.bind(Param::Text(format!("%{}%", escape_like(text))));
        self.sql.push_str(&format!(" AND (name ILIKE ${pos} OR description ILIKE ${pos} OR address ILIKE ${pos})"));
        self
    }

    pub fn order_by(mut self, order: SortOrder) -> Self {
        self.sql.push_str(order.sql());
        self
    }

    pub fn paginate(mut self, limit: usize, offset: usize) -> Self {
        let limit = self.bind(Param::Int(limit as i64));
        let offset = self.bind(Param::Int(offset as i64));
        self.sql.push_str(&format!(" LIMIT ${limit} OFFSET ${offset}"));
        self
    }

    pub fn sql(&self) -> &str { &self.sql }

    pub fn params(&self) -> &[Param] { &self.params }

    pub fn has_distance(&self) -> bool { self.center.is_some() }
}

/// Assemble the full statement for `filters`; `text` adds the fuzzy predicate
/// and `default_limit` pages requests that leave `limit` at zero.
///
/// Fragment order: projection, radius, categories, text, ordering, pagination.
pub fn build_search(filters: &SearchFilters, text: Option<&str>, default_limit: usize) -> PoiQuery {
    let mut q = PoiQuery::select(filters.center);
    if let Some((center, radius_km)) = filters.radius() {
        q = q.within_radius(center, radius_km);
    }
    q = q.in_categories(&filters.categories);
    if let Some(text) = text {
        q = q.matching_text(text);
    }
    q.order_by(SortOrder::for_filters(filters))
        .paginate(filters.limit_or(default_limit), filters.offset)
}
