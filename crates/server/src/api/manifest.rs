//! Addon manifest.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct Manifest {
    pub id: String,
    pub version: String,
    pub name: String,
    pub description: String,
    pub resources: Vec<String>,
    pub types: Vec<String>,
    #[serde(rename = "idPrefixes")]
    pub id_prefixes: Vec<String>,
}

/// GET /manifest.json
pub async fn manifest() -> Json<Manifest> {
    Json(Manifest {
        id: "org.subtonic.subtitles".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        name: "Subtonic".to_string(),
        description: "Bulgarian subtitles aggregated from subsunacs.net, subs.sab.bz and yavka.net"
            .to_string(),
        resources: vec!["subtitles".to_string()],
        types: vec!["movie".to_string(), "series".to_string()],
        id_prefixes: vec!["tt".to_string()],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_manifest_shape() {
        let Json(manifest) = manifest().await;
        assert_eq!(manifest.resources, vec!["subtitles"]);
        assert!(manifest.types.contains(&"movie".to_string()));
        assert!(manifest.types.contains(&"series".to_string()));

        let json = serde_json::to_value(&manifest).unwrap();
        assert!(json.get("idPrefixes").is_some());
    }
}
