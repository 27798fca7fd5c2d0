use bson::{doc, Document};

use crate::error::{GatewayError, Result};
use crate::models::{CanonicalQuery, TimeWindow};
use crate::store::FindSpec;

/// Rewrites single quotes to double quotes so filter authors don't have to
/// escape. Known quirk: a literal apostrophe inside a string value is
/// corrupted by this rewrite.
pub fn rewrite_quotes(filter: &str) -> String {
    filter.replace('\'', "\"")
}

/// Parses the free-form filter text into an ordered BSON document. Empty or
/// whitespace-only text means "no additional filter". An unparseable filter
/// is a hard error; there is nothing to merge from a partial parse.
pub fn parse_filter(text: &str) -> Result<Document> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Document::new());
    }

    serde_json::from_str::<Document>(&rewrite_quotes(trimmed))
        .map_err(|err| GatewayError::BadRequest(format!("filter parse: {err}")))
}

/// Builds the store-ready query spec: the user filter AND-merged with the
/// inclusive time window, a projection of exactly the requested field plus
/// `timestamp`, ascending timestamp order, and the row cap.
///
/// Clause order in the `$and` array is fixed: time lower bound, time upper
/// bound, then each user clause in original order. A user clause on
/// `timestamp` rides along untouched; overlapping constraints are the
/// caller's responsibility.
pub fn range_query(query: &CanonicalQuery, window: &TimeWindow, max_points: i64) -> Result<FindSpec> {
    let user_filter = parse_filter(&query.find_query)?;

    let mut clauses = vec![
        doc! { "timestamp": { "$gte": bson::DateTime::from_chrono(window.from) } },
        doc! { "timestamp": { "$lte": bson::DateTime::from_chrono(window.to) } },
    ];
    for (key, value) in user_filter {
        let mut clause = Document::new();
        clause.insert(key, value);
        clauses.push(clause);
    }

    let mut projection = Document::new();
    projection.insert(query.projection.as_str(), 1);
    projection.insert("timestamp", 1);
    projection.insert("_id", 0);

    Ok(FindSpec {
        filter: doc! { "$and": clauses },
        projection,
        sort: doc! { "timestamp": 1 },
        limit: max_points,
    })
}
