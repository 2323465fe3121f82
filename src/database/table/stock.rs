use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{database::PostgresSQL, logging};

/// 資料表 `stocks` 的資料列。
///
/// 價格以最小貨幣單位（分）儲存，避免浮點數誤差。
#[derive(sqlx::FromRow, Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct Stock {
    /// 由資料庫序列產生，建立後不可變更
    #[sqlx(rename = "stockid")]
    pub stock_id: i64,
    pub name: String,
    pub price: i64,
    pub company: String,
}

impl Stock {
    pub fn new(stock_id: i64, input: StockInput) -> Self {
        Stock {
            stock_id,
            name: input.name,
            price: input.price,
            company: input.company,
        }
    }
}

/// 新增與更新時由用戶端送入的欄位，不含 `stock_id`。
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct StockInput {
    pub name: String,
    pub price: i64,
    pub company: String,
}

impl StockInput {
    pub fn new(name: impl Into<String>, price: i64, company: impl Into<String>) -> Self {
        StockInput {
            name: name.into(),
            price,
            company: company.into(),
        }
    }
}

/// `stocks` 的存取介面，每個操作只執行一道 SQL。
#[async_trait]
pub trait StockStore: Send + Sync {
    /// 新增一筆資料並回傳資料庫產生的 `stock_id`。
    async fn create(&self, stock: &StockInput) -> Result<i64>;

    /// 取得指定 id 的資料，查無資料時回傳 `None`，不視為錯誤。
    async fn get(&self, id: i64) -> Result<Option<Stock>>;

    /// 取得所有資料，順序依資料庫預設。
    async fn list(&self) -> Result<Vec<Stock>>;

    /// 以 `stock` 覆蓋指定 id 的所有欄位，回傳異動筆數。
    async fn update(&self, id: i64, stock: &StockInput) -> Result<u64>;

    /// 刪除指定 id 的資料，回傳異動筆數。
    async fn delete(&self, id: i64) -> Result<u64>;
}

#[async_trait]
impl StockStore for PostgresSQL {
    async fn create(&self, stock: &StockInput) -> Result<i64> {
        let sql = r#"
INSERT INTO stocks
    (name, price, company)
VALUES
    ($1, $2, $3)
RETURNING stockid;"#;

        let id = sqlx::query_scalar::<_, i64>(sql)
            .bind(&stock.name)
            .bind(stock.price)
            .bind(&stock.company)
            .fetch_one(self.pool())
            .await
            .context(format!("Failed to Stock::create({:?}) from database", stock))?;

        logging::info_file_async(format!("Inserted a single record {}", id));

        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Option<Stock>> {
        let sql = r#"
SELECT
    stockid, name, price, company
FROM stocks
WHERE stockid = $1;"#;

        sqlx::query_as::<_, Stock>(sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .context(format!("Failed to Stock::get({}) from database", id))
    }

    async fn list(&self) -> Result<Vec<Stock>> {
        let sql = r#"
SELECT
    stockid, name, price, company
FROM stocks;"#;

        sqlx::query_as::<_, Stock>(sql)
            .fetch_all(self.pool())
            .await
            .context("Failed to Stock::list from database")
    }

    async fn update(&self, id: i64, stock: &StockInput) -> Result<u64> {
        let sql = r#"
UPDATE stocks
SET name = $2, price = $3, company = $4
WHERE stockid = $1;"#;

        let result = sqlx::query(sql)
            .bind(id)
            .bind(&stock.name)
            .bind(stock.price)
            .bind(&stock.company)
            .execute(self.pool())
            .await
            .context(format!(
                "Failed to Stock::update({}, {:?}) from database",
                id, stock
            ))?;

        logging::info_file_async(format!(
            "Updated stock {}. Total rows/record affected {}",
            id,
            result.rows_affected()
        ));

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: i64) -> Result<u64> {
        let sql = "DELETE FROM stocks WHERE stockid = $1;";

        let result = sqlx::query(sql)
            .bind(id)
            .execute(self.pool())
            .await
            .context(format!("Failed to Stock::delete({}) from database", id))?;

        logging::info_file_async(format!(
            "Deleted stock {}. Total rows/record affected {}",
            id,
            result.rows_affected()
        ));

        Ok(result.rows_affected())
    }
}
