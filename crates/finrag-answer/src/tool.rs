//! The one tool the model may call: CUSIP identifier listing.

use serde_json::{json, Value};

pub const CUSIP_TOOL_NAME: &str = "list_cusip_numbers";

/// The exact (lower-cased) query that forces the tool call. Brittle intent
/// detection, kept for compatibility with the original behavior.
const CUSIP_LISTING_QUERY: &str = "list all cusip numbers";

pub fn cusip_tool_definition() -> Value {
    json!({
        "type": "function",
        "function": {
            "name": CUSIP_TOOL_NAME,
            "description": "List all CUSIP numbers found in the document. If no CUSIP numbers are found, return an empty list.",
            "parameters": {
                "type": "object",
                "properties": {
                    "cusip_list": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "List of CUSIP numbers. This list will be empty if no CUSIP numbers are found."
                    }
                },
                "required": ["cusip_list"]
            }
        }
    })
}

/// Whether the query is the recognized listing request (case-insensitive
/// exact match).
pub fn is_cusip_listing_query(query: &str) -> bool {
    query.to_lowercase() == CUSIP_LISTING_QUERY
}

/// `tool_choice` for the request: forced for the recognized listing query,
/// model-decided otherwise.
pub fn tool_choice_for_query(query: &str) -> Value {
    if is_cusip_listing_query(query) {
        json!({ "type": "function", "function": { "name": CUSIP_TOOL_NAME } })
    } else {
        json!("auto")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_query_matches_case_insensitively() {
        assert!(is_cusip_listing_query("list all cusip numbers"));
        assert!(is_cusip_listing_query("List all CUSIP numbers"));
        assert!(is_cusip_listing_query("LIST ALL CUSIP NUMBERS"));
    }

    #[test]
    fn other_queries_do_not_force_the_tool() {
        assert!(!is_cusip_listing_query("list all cusip numbers please"));
        assert!(!is_cusip_listing_query(" list all cusip numbers"));
        assert!(!is_cusip_listing_query("what is the total revenue?"));
        assert_eq!(tool_choice_for_query("total revenue?"), serde_json::json!("auto"));
    }

    #[test]
    fn forced_choice_names_the_tool() {
        let choice = tool_choice_for_query("List All Cusip Numbers");
        assert_eq!(choice["function"]["name"], CUSIP_TOOL_NAME);
    }
}
