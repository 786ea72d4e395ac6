//! CX2 document access: aspect shapes, a parsed document with an aspect index, and the
//! numeric-CX2-id ↔ internal-element-id encoding.

pub mod aspects;
mod document;

pub use aspects::*;
pub use document::{Cx2Document, Cx2Entry};

/// Internal edge ids carry this prefix so node and edge ids never collide.
pub const EDGE_ID_PREFIX: char = 'e';

pub fn translate_cx_node_id(id: i64) -> String {
    id.to_string()
}

pub fn translate_cx_edge_id(id: i64) -> String {
    format!("{EDGE_ID_PREFIX}{id}")
}

pub fn translate_node_id_to_cx(id: &str) -> Option<i64> {
    id.parse().ok()
}

pub fn translate_edge_id_to_cx(id: &str) -> Option<i64> {
    id.strip_prefix(EDGE_ID_PREFIX)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_ids_round_trip_through_prefix() {
        assert_eq!(translate_cx_edge_id(10), "e10");
        assert_eq!(translate_edge_id_to_cx("e10"), Some(10));
        assert_eq!(translate_edge_id_to_cx("10"), None);
        assert_eq!(translate_node_id_to_cx(&translate_cx_node_id(-4)), Some(-4));
    }
}
