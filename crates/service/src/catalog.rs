use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ServiceError;
use crate::storage::json_map_store::JsonMapStore;

/// 商品记录：目录中的一个条目，以 `name` 作为唯一键
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
}

impl Item {
    /// 统一校验：名称非空
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.name.trim().is_empty() {
            return Err(ServiceError::Validation("name must be a non-empty string".into()));
        }
        Ok(())
    }
}

/// 文件存储：以 JSON 文件持久化商品目录
///
/// Loaded once at startup; every successful create writes the whole map back
/// so the in-memory state and the file stay in sync.
#[derive(Clone)]
pub struct ItemCatalog {
    store: Arc<JsonMapStore<String, Item>>,
}

impl ItemCatalog {
    /// 初始化存储，若文件不存在则创建空文件
    pub async fn new<P: Into<std::path::PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = JsonMapStore::<String, Item>::new(path).await?;
        Ok(Arc::new(Self { store }))
    }

    /// 根据名称精确查找
    pub async fn get(&self, name: &str) -> Option<Item> {
        self.store.get(name).await
    }

    /// 当前条目数量
    pub async fn count(&self) -> usize {
        self.store.len().await
    }

    /// 均匀随机返回一个条目；目录为空时返回 `None`
    pub async fn random(&self) -> Option<Item> {
        self.store.pick_random().await
    }

    /// 创建新条目：键已存在时报冲突且不落盘
    pub async fn create(&self, item: Item) -> Result<Item, ServiceError> {
        item.validate()?;
        let inserted = self.store.insert_if_absent(item.name.clone(), item.clone()).await?;
        if !inserted {
            return Err(ServiceError::conflict("Item"));
        }
        debug!(name = %item.name, "item created and persisted");
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("catalog_{}.json", uuid::Uuid::new_v4()))
    }

    fn apple() -> Item {
        Item { name: "苹果".into(), description: Some("红色的苹果".into()), price: 5.0 }
    }

    #[tokio::test]
    async fn create_then_get_roundtrips() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        let catalog = ItemCatalog::new(&tmp).await?;

        let created = catalog.create(apple()).await?;
        assert_eq!(created, apple());

        let found = catalog.get("苹果").await.expect("item present");
        assert_eq!(found.price, 5.0);
        assert!(catalog.get("不存在").await.is_none());

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_create_conflicts_without_mutating() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        let catalog = ItemCatalog::new(&tmp).await?;

        catalog.create(apple()).await?;
        let second = Item { description: Some("绿苹果".into()), price: 6.0, ..apple() };
        let res = catalog.create(second).await;
        assert!(matches!(res, Err(ServiceError::Conflict(_))));

        // the original record survives and the size stays at 1
        assert_eq!(catalog.count().await, 1);
        assert_eq!(catalog.get("苹果").await.expect("present").price, 5.0);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn empty_name_is_rejected() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        let catalog = ItemCatalog::new(&tmp).await?;
        let bad = Item { name: "  ".into(), description: None, price: 1.0 };
        assert!(matches!(catalog.create(bad).await, Err(ServiceError::Validation(_))));
        assert_eq!(catalog.count().await, 0);
        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn count_tracks_successful_creates() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        let catalog = ItemCatalog::new(&tmp).await?;
        assert_eq!(catalog.count().await, 0);

        for (name, price) in [("苹果", 5.0), ("香蕉", 3.0), ("橙子", 4.0)] {
            catalog.create(Item { name: name.into(), description: None, price }).await?;
        }
        assert_eq!(catalog.count().await, 3);

        // conflicting create does not change the count
        let _ = catalog.create(Item { name: "苹果".into(), description: None, price: 9.0 }).await;
        assert_eq!(catalog.count().await, 3);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn random_returns_member_or_none() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        let catalog = ItemCatalog::new(&tmp).await?;
        assert!(catalog.random().await.is_none());

        let names = ["苹果", "香蕉", "橙子"];
        for name in names {
            catalog.create(Item { name: name.into(), description: None, price: 1.0 }).await?;
        }
        for _ in 0..10 {
            let picked = catalog.random().await.expect("non-empty catalog");
            assert!(names.contains(&picked.name.as_str()));
        }

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn catalog_survives_reload() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        {
            let catalog = ItemCatalog::new(&tmp).await?;
            catalog.create(apple()).await?;
            catalog.create(Item { name: "香蕉".into(), description: None, price: 3.0 }).await?;
        }

        let reloaded = ItemCatalog::new(&tmp).await?;
        assert_eq!(reloaded.count().await, 2);
        assert_eq!(reloaded.get("苹果").await, Some(apple()));
        // omitted description normalizes to null and stays that way
        assert_eq!(reloaded.get("香蕉").await.expect("present").description, None);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
