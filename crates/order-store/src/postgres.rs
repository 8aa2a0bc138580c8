use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgPoolOptions, postgres::PgRow};
use uuid::Uuid;

use crate::{
    AccountId, LineRecord, Money, OrderId, OrderRecord, OrderRow, ProductId, Result, StoreError,
    repository::{OrderRepository, validate_record},
};

/// PostgreSQL-backed order store implementation.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a new pool to `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Closes the pool, waiting for checked-out connections to be returned.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    fn row_to_order_row(row: PgRow) -> Result<OrderRow> {
        let order_id = OrderId::from_uuid(row.try_get::<Uuid, _>("id")?);
        let product_id: Option<String> = row.try_get("product_id")?;
        let quantity: Option<i32> = row.try_get("quantity")?;

        let line = match (product_id, quantity) {
            (Some(product_id), Some(quantity)) => {
                let quantity = u32::try_from(quantity).map_err(|_| {
                    StoreError::CorruptRow(format!(
                        "order {order_id} has negative quantity {quantity} for {product_id}"
                    ))
                })?;
                Some(LineRecord {
                    product_id: ProductId::new(product_id),
                    quantity,
                })
            }
            (None, None) => None,
            _ => {
                return Err(StoreError::CorruptRow(format!(
                    "order {order_id} has a partial line item"
                )));
            }
        };

        Ok(OrderRow {
            order_id,
            created_at: row.try_get("created_at")?,
            account_id: AccountId::new(row.try_get::<String, _>("account_id")?),
            total_price: Money::from_cents(row.try_get("total_price_cents")?),
            line,
        })
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id, lines = order.lines.len()))]
    async fn create_order(&self, order: &OrderRecord) -> Result<()> {
        validate_record(order)?;

        // Dropping the transaction without commit rolls back, so every early
        // return below leaves no header or line rows behind.
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, created_at, account_id, total_price_cents)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.created_at)
        .bind(order.account_id.as_str())
        .bind(order.total_price.cents())
        .execute(&mut *tx)
        .await?;

        if !order.lines.is_empty() {
            let mut insert: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO order_products (order_id, position, product_id, quantity) ",
            );
            // validate_record bounds both the line count and quantities to i32.
            insert.push_values(order.lines.iter().enumerate(), |mut values, (position, line)| {
                values
                    .push_bind(order.id.as_uuid())
                    .push_bind(position as i32)
                    .push_bind(line.product_id.as_str())
                    .push_bind(line.quantity as i32);
            });
            insert.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        metrics::counter!("order_store_writes_total").increment(1);
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn get_order_rows_for_account(&self, account_id: &AccountId) -> Result<Vec<OrderRow>> {
        let rows = sqlx::query(
            r#"
            SELECT o.id, o.created_at, o.account_id, o.total_price_cents,
                   op.product_id, op.quantity
            FROM orders o
            LEFT JOIN order_products op ON o.id = op.order_id
            WHERE o.account_id = $1
            ORDER BY o.id ASC, op.position ASC
            "#,
        )
        .bind(account_id.as_str())
        .fetch(&self.pool)
        .map(|result| match result {
            Ok(row) => Self::row_to_order_row(row),
            Err(e) => Err(StoreError::Database(e)),
        })
        .try_collect::<Vec<_>>()
        .await?;

        metrics::counter!("order_store_reads_total").increment(1);
        Ok(rows)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
