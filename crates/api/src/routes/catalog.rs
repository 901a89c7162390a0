//! Catalog of gradients, frame shapes, transitions and music presets.

use axum::Json;
use domain::models::catalog::{catalog as build_catalog, Catalog};

/// GET /api/v1/catalog
pub async fn catalog() -> Json<Catalog> {
    Json(build_catalog())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_catalog_lists_presets() {
        let Json(catalog) = catalog().await;
        let json = serde_json::to_value(&catalog).unwrap();
        assert_eq!(json["musicPresets"].as_array().unwrap().len(), 8);
        assert_eq!(json["gradients"].as_array().unwrap().len(), 10);
    }
}
