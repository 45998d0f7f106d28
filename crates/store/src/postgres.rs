use async_trait::async_trait;
use chrono::Utc;
use common::{FlowId, SessionId, TransactionId};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    NewOrder, NewProduct, NewTransaction, OrderRecord, OrderStore, ProductChanges, ProductRecord,
    ProductStore, Result, TransactionRecord, TransactionStore,
};

/// PostgreSQL-backed store implementation.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_transaction(row: PgRow) -> Result<TransactionRecord> {
        Ok(TransactionRecord {
            transaction_id: TransactionId::new(row.try_get::<String, _>("transaction_id")?),
            session_id: SessionId::new(row.try_get::<String, _>("session_id")?),
            flow_id: FlowId::new(row.try_get::<String, _>("flow_id")?),
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_product(row: PgRow) -> Result<ProductRecord> {
        Ok(ProductRecord {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            category: row.try_get("category")?,
            stock_quantity: row.try_get("stock_quantity")?,
            image_url: row.try_get("image_url")?,
            seller_id: row.try_get("seller_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_order(row: PgRow) -> Result<OrderRecord> {
        Ok(OrderRecord {
            id: row.try_get("id")?,
            customer_name: row.try_get("customer_name")?,
            buyer_id: row.try_get("buyer_id")?,
            seller_id: row.try_get("seller_id")?,
            items: row.try_get("items")?,
            total_amount: row.try_get("total_amount")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl TransactionStore for PostgresStore {
    async fn insert_transaction(&self, row: NewTransaction) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions (transaction_id, session_id, flow_id, status)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(row.transaction_id.as_str())
        .bind(row.session_id.as_str())
        .bind(row.flow_id.as_str())
        .bind(&row.status)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn transaction_by_id(&self, id: &TransactionId) -> Result<Option<TransactionRecord>> {
        let row = sqlx::query(
            r#"
            SELECT transaction_id, session_id, flow_id, status, created_at
            FROM transactions
            WHERE transaction_id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_transaction).transpose()
    }

    async fn transaction_by_session(
        &self,
        session_id: &SessionId,
        flow_id: &FlowId,
    ) -> Result<Option<TransactionRecord>> {
        let row = sqlx::query(
            r#"
            SELECT transaction_id, session_id, flow_id, status, created_at
            FROM transactions
            WHERE session_id = $1 AND flow_id = $2
            "#,
        )
        .bind(session_id.as_str())
        .bind(flow_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_transaction).transpose()
    }

    async fn update_transaction_status(&self, id: &TransactionId, status: &str) -> Result<()> {
        sqlx::query("UPDATE transactions SET status = $2 WHERE transaction_id = $1")
            .bind(id.as_str())
            .bind(status)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl ProductStore for PostgresStore {
    async fn insert_product(&self, input: NewProduct) -> Result<ProductRecord> {
        let now = Utc::now();
        let product = ProductRecord {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            description: input.description,
            price: input.price,
            category: input.category,
            stock_quantity: input.stock_quantity,
            image_url: input.image_url,
            seller_id: input.seller_id,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO products
                (id, name, description, price, category, stock_quantity, image_url, seller_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.category)
        .bind(product.stock_quantity)
        .bind(&product.image_url)
        .bind(&product.seller_id)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    async fn all_products(&self) -> Result<Vec<ProductRecord>> {
        let rows = sqlx::query("SELECT * FROM products ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn products_by_seller(&self, seller_id: &str) -> Result<Vec<ProductRecord>> {
        let rows =
            sqlx::query("SELECT * FROM products WHERE seller_id = $1 ORDER BY created_at DESC")
                .bind(seller_id)
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn search_products(&self, query: &str) -> Result<Vec<ProductRecord>> {
        let pattern = format!("%{query}%");
        let rows = sqlx::query(
            r#"
            SELECT * FROM products
            WHERE name ILIKE $1 OR category ILIKE $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn update_product(
        &self,
        id: &str,
        seller_id: &str,
        changes: ProductChanges,
    ) -> Result<Option<ProductRecord>> {
        let row = sqlx::query(
            r#"
            UPDATE products SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                price = COALESCE($5, price),
                category = COALESCE($6, category),
                stock_quantity = COALESCE($7, stock_quantity),
                image_url = COALESCE($8, image_url),
                updated_at = $9
            WHERE id = $1 AND seller_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(seller_id)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(changes.price)
        .bind(&changes.category)
        .bind(changes.stock_quantity)
        .bind(&changes.image_url)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_product).transpose()
    }

    async fn delete_product(&self, id: &str, seller_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1 AND seller_id = $2")
            .bind(id)
            .bind(seller_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn stock_quantity(&self, id: &str) -> Result<Option<i64>> {
        let stock: Option<i64> =
            sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(stock)
    }

    async fn decrement_stock(&self, id: &str, quantity: i64, expected: i64) -> Result<bool> {
        // Single conditional statement: the WHERE clause is the only guard
        // against a concurrent decrement on the same row.
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity - $2, updated_at = $4
            WHERE id = $1 AND stock_quantity = $3
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(expected)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn set_stock(&self, id: &str, quantity: i64) -> Result<()> {
        sqlx::query("UPDATE products SET stock_quantity = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(quantity)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn product_count_by_seller(&self, seller_id: &str) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE seller_id = $1")
                .bind(seller_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn insert_order(&self, input: NewOrder) -> Result<OrderRecord> {
        let now = Utc::now();
        let order = OrderRecord {
            id: Uuid::new_v4().to_string(),
            customer_name: input.customer_name,
            buyer_id: input.buyer_id,
            seller_id: input.seller_id,
            items: input.items,
            total_amount: input.total_amount,
            status: input.status,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO orders
                (id, customer_name, buyer_id, seller_id, items, total_amount, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&order.id)
        .bind(&order.customer_name)
        .bind(&order.buyer_id)
        .bind(&order.seller_id)
        .bind(&order.items)
        .bind(order.total_amount)
        .bind(&order.status)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(order)
    }

    async fn orders_by_seller(&self, seller_id: &str) -> Result<Vec<OrderRecord>> {
        let rows =
            sqlx::query("SELECT * FROM orders WHERE seller_id = $1 ORDER BY created_at DESC")
                .bind(seller_id)
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn orders_by_buyer(&self, buyer_id: &str) -> Result<Vec<OrderRecord>> {
        let rows =
            sqlx::query("SELECT * FROM orders WHERE buyer_id = $1 ORDER BY created_at DESC")
                .bind(buyer_id)
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn update_order_status(&self, id: &str, status: &str) -> Result<Option<OrderRecord>> {
        let row = sqlx::query(
            r#"
            UPDATE orders SET status = $2, updated_at = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_order).transpose()
    }
}
