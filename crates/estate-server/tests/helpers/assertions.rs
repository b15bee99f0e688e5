//! Custom assertions para tests.

use serde_json::Value;

/// Verifica el formato de una respuesta de busqueda paginada.
pub fn assert_search_page_schema(json: &Value) {
    let obj = json.as_object().expect("Response should be a JSON object");

    assert!(obj["data"].is_array(), "'data' should be an array");

    let pagination = obj["pagination"]
        .as_object()
        .expect("'pagination' should be an object");
    for field in ["currentPage", "totalPages", "totalResults", "resultsPerPage"] {
        assert!(pagination[field].is_u64(), "'{}' should be a number", field);
    }
    for field in ["hasNextPage", "hasPrevPage"] {
        assert!(pagination[field].is_boolean(), "'{}' should be a boolean", field);
    }
}

/// Verifica el cuerpo de error `{error, message}`.
pub fn assert_error_body(json: &Value, error: &str) {
    assert_eq!(json["error"], error);
    assert!(json["message"].is_string(), "'message' should be a string");
}
