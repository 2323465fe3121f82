//! 以記憶體模擬 `stocks` 資料表，測試 HTTP 層時不需要真的 PostgreSQL。

use std::{collections::BTreeMap, sync::Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::database::table::stock::{Stock, StockInput, StockStore};

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    sequence: i64,
    rows: BTreeMap<i64, Stock>,
}

#[async_trait]
impl StockStore for MemoryStore {
    async fn create(&self, stock: &StockInput) -> Result<i64> {
        let mut inner = self.inner.lock().map_err(|_| anyhow!("store poisoned"))?;
        inner.sequence += 1;
        let id = inner.sequence;
        inner.rows.insert(id, Stock::new(id, stock.clone()));
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Option<Stock>> {
        let inner = self.inner.lock().map_err(|_| anyhow!("store poisoned"))?;
        Ok(inner.rows.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Stock>> {
        let inner = self.inner.lock().map_err(|_| anyhow!("store poisoned"))?;
        Ok(inner.rows.values().cloned().collect())
    }

    async fn update(&self, id: i64, stock: &StockInput) -> Result<u64> {
        let mut inner = self.inner.lock().map_err(|_| anyhow!("store poisoned"))?;
        match inner.rows.get_mut(&id) {
            Some(row) => {
                *row = Stock::new(id, stock.clone());
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: i64) -> Result<u64> {
        let mut inner = self.inner.lock().map_err(|_| anyhow!("store poisoned"))?;
        Ok(inner.rows.remove(&id).map_or(0, |_| 1))
    }
}

/// 每個操作都回傳錯誤，用來模擬資料庫斷線。
pub struct FailingStore;

#[async_trait]
impl StockStore for FailingStore {
    async fn create(&self, _stock: &StockInput) -> Result<i64> {
        Err(anyhow!("connection refused"))
    }

    async fn get(&self, _id: i64) -> Result<Option<Stock>> {
        Err(anyhow!("connection refused"))
    }

    async fn list(&self) -> Result<Vec<Stock>> {
        Err(anyhow!("connection refused"))
    }

    async fn update(&self, _id: i64, _stock: &StockInput) -> Result<u64> {
        Err(anyhow!("connection refused"))
    }

    async fn delete(&self, _id: i64) -> Result<u64> {
        Err(anyhow!("connection refused"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip() {
        let store = MemoryStore::default();
        let input = StockInput::new("Acme", 150, "Acme Corp");

        let id = store.create(&input).await.unwrap();

        assert_eq!(id, 1);
        assert_eq!(store.get(id).await.unwrap(), Some(Stock::new(id, input)));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::default();
        let id = store.create(&StockInput::new("A", 1, "A Co")).await.unwrap();

        assert_eq!(store.delete(id).await.unwrap(), 1);
        assert_eq!(store.delete(id).await.unwrap(), 0);
        assert_eq!(store.delete(404).await.unwrap(), 0);
        assert_eq!(store.get(id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_after_creates_and_deletes() {
        let store = MemoryStore::default();
        assert!(store.list().await.unwrap().is_empty());

        let mut ids = Vec::new();
        for i in 0..5 {
            ids.push(
                store
                    .create(&StockInput::new(format!("S{}", i), i, "Co"))
                    .await
                    .unwrap(),
            );
        }
        store.delete(ids[1]).await.unwrap();
        store.delete(ids[3]).await.unwrap();

        let listed: Vec<i64> = store
            .list()
            .await
            .unwrap()
            .iter()
            .map(|s| s.stock_id)
            .collect();
        assert_eq!(listed, vec![ids[0], ids[2], ids[4]]);
    }

    #[tokio::test]
    async fn test_update_overwrites() {
        let store = MemoryStore::default();
        let id = store
            .create(&StockInput::new("Old", 10, "Old Co"))
            .await
            .unwrap();
        let changed = StockInput::new("New", 20, "New Co");

        assert_eq!(store.update(id, &changed).await.unwrap(), 1);
        assert_eq!(store.get(id).await.unwrap(), Some(Stock::new(id, changed)));
        assert_eq!(
            store.update(999, &StockInput::default()).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_ids_are_not_reused() {
        let store = MemoryStore::default();
        let first = store.create(&StockInput::default()).await.unwrap();
        store.delete(first).await.unwrap();
        let second = store.create(&StockInput::default()).await.unwrap();

        assert_ne!(first, second);
    }
}
