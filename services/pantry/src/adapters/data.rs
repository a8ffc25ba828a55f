//! services/pantry/src/adapters/data.rs
//!
//! Loads the static tables (knowledge base, achievement catalog) either from a
//! configured JSON file or from the copies embedded in the core crate.

use pantry_core::achievements::AchievementCatalog;
use pantry_core::knowledge::KnowledgeBase;
use std::path::Path;
use tracing::info;

use crate::error::ServiceResult;

pub async fn load_knowledge_base(path: Option<&Path>) -> ServiceResult<KnowledgeBase> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "Loading knowledge base from file");
            let raw = tokio::fs::read_to_string(path).await?;
            Ok(KnowledgeBase::from_json(&raw)?)
        }
        None => {
            info!("Using embedded knowledge base");
            Ok(KnowledgeBase::embedded()?)
        }
    }
}

pub async fn load_achievement_catalog(path: Option<&Path>) -> ServiceResult<AchievementCatalog> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "Loading achievement catalog from file");
            let raw = tokio::fs::read_to_string(path).await?;
            Ok(AchievementCatalog::from_json(&raw)?)
        }
        None => {
            info!("Using embedded achievement catalog");
            Ok(AchievementCatalog::embedded()?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;

    #[tokio::test]
    async fn test_embedded_defaults() {
        let kb = load_knowledge_base(None).await.unwrap();
        assert_eq!(kb.resolve("milk").profile.name, "Dairy");
        let catalog = load_achievement_catalog(None).await.unwrap();
        assert_eq!(catalog.len(), 14);
    }

    #[tokio::test]
    async fn test_catalog_from_file() {
        let path = std::env::temp_dir().join(format!("pantry-catalog-{}.json", uuid::Uuid::new_v4()));
        let raw = r#"[{ "name": "First Scan", "family": "SCAN_MASTER", "tier": "BRONZE", "points_required": 1, "xp_reward": 5 }]"#;
        tokio::fs::write(&path, raw).await.unwrap();
        let catalog = load_achievement_catalog(Some(path.as_path())).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("pantry-does-not-exist.json");
        let result = load_knowledge_base(Some(path.as_path())).await;
        assert!(matches!(result, Err(ServiceError::Io(_))));
    }
}
