//! Repository layer for database operations.
//!
//! The in-memory order store is authoritative at runtime; this layer is the
//! hosting environment's durable copy. Every applied transition writes the
//! order snapshot and its journal event in one transaction.

use crate::domain::{
    Address, EventRecord, GasPricing, Order, OrderEvent, OrderId, OrderStatus, Timestamp,
    TokenAmount,
};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::warn;
use uuid::Uuid;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Liveness check against the pool (readiness probes).
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // =========================================================================
    // Order snapshot operations
    // =========================================================================

    /// Load every persisted order, ascending by id (startup recovery).
    ///
    /// Rows that fail to decode are logged and skipped rather than taking
    /// the whole store down.
    pub async fn load_orders(&self) -> Result<Vec<Order>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM orders ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().filter_map(order_from_row).collect())
    }

    /// Persist an applied transition: the order snapshot and its journal
    /// event commit together or not at all.
    pub async fn persist_transition(
        &self,
        order: &Order,
        event: &EventRecord,
    ) -> Result<(), sqlx::Error> {
        let payload = serde_json::to_string(&event.event)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO orders
            (id, creator, order_type, status, max_gas,
             execution_period_start, execution_period_deadline, execution_window,
             is_revokable, reward_amount, reward_token, gas_cost_price, gas_cost_token,
             guarantee_amount, guarantee_token, gas_balance, fee_rate, executor, accepted_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(order.id.as_i64())
        .bind(order.creator.as_str())
        .bind(order.order_type as i64)
        .bind(order.status.as_str())
        .bind(order.max_gas)
        .bind(order.execution_period_start.as_i64())
        .bind(order.execution_period_deadline.as_i64())
        .bind(order.execution_window)
        .bind(order.is_revokable)
        .bind(order.reward.amount)
        .bind(order.reward.token.as_str())
        .bind(order.gas_cost.gas_price)
        .bind(order.gas_cost.token.as_str())
        .bind(order.guarantee.gas_price)
        .bind(order.guarantee.token.as_str())
        .bind(order.gas_balance)
        .bind(order.fee_rate)
        .bind(order.executor.as_ref().map(|a| a.as_str().to_string()))
        .bind(order.accepted_at.map(|t| t.as_i64()))
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO order_events (event_id, order_id, kind, occurred_at, payload)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.event_id.to_string())
        .bind(event.order_id.as_i64())
        .bind(event.event.kind())
        .bind(event.occurred_at)
        .bind(payload)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    // Event journal operations
    // =========================================================================

    /// Events for one order in the order they occurred.
    pub async fn query_events(&self, order_id: OrderId) -> Result<Vec<EventRecord>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT event_id, order_id, occurred_at, payload
            FROM order_events
            WHERE order_id = ?
            ORDER BY occurred_at ASC, rowid ASC
            "#,
        )
        .bind(order_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().filter_map(event_from_row).collect())
    }

    // =========================================================================
    // Fee schedule operations
    // =========================================================================

    /// All explicitly configured fee rates.
    pub async fn load_fee_rates(&self) -> Result<Vec<(u8, i64)>, sqlx::Error> {
        let rows = sqlx::query("SELECT order_type, rate FROM fee_rates")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let order_type: i64 = row.get("order_type");
                let rate: i64 = row.get("rate");
                (order_type as u8, rate)
            })
            .collect())
    }

    /// Upsert one fee rate.
    pub async fn set_fee_rate(&self, order_type: u8, rate: i64) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO fee_rates (order_type, rate)
            VALUES (?, ?)
            ON CONFLICT(order_type) DO UPDATE SET rate = excluded.rate
            "#,
        )
        .bind(order_type as i64)
        .bind(rate)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn order_from_row(row: &SqliteRow) -> Option<Order> {
    let id: i64 = row.get("id");
    let status_str: String = row.get("status");
    let status = match status_str.parse::<OrderStatus>() {
        Ok(s) => s,
        Err(e) => {
            warn!(order_id = id, error = %e, "Skipping order row with unknown status");
            return None;
        }
    };

    let order_type: i64 = row.get("order_type");
    let executor: Option<String> = row.get("executor");
    let accepted_at: Option<i64> = row.get("accepted_at");

    Some(Order {
        id: OrderId::new(id),
        creator: Address::new(row.get("creator")),
        order_type: order_type as u8,
        status,
        max_gas: row.get("max_gas"),
        execution_period_start: Timestamp::new(row.get("execution_period_start")),
        execution_period_deadline: Timestamp::new(row.get("execution_period_deadline")),
        execution_window: row.get("execution_window"),
        is_revokable: row.get("is_revokable"),
        reward: TokenAmount {
            amount: row.get("reward_amount"),
            token: Address::new(row.get("reward_token")),
        },
        gas_cost: GasPricing {
            gas_price: row.get("gas_cost_price"),
            token: Address::new(row.get("gas_cost_token")),
        },
        guarantee: GasPricing {
            gas_price: row.get("guarantee_amount"),
            token: Address::new(row.get("guarantee_token")),
        },
        gas_balance: row.get("gas_balance"),
        fee_rate: row.get("fee_rate"),
        executor: executor.map(Address::new),
        accepted_at: accepted_at.map(Timestamp::new),
    })
}

fn event_from_row(row: &SqliteRow) -> Option<EventRecord> {
    let event_id_str: String = row.get("event_id");
    let order_id: i64 = row.get("order_id");
    let payload: String = row.get("payload");

    let event_id = match event_id_str.parse::<Uuid>() {
        Ok(id) => id,
        Err(e) => {
            warn!(order_id, error = %e, "Skipping event row with invalid id");
            return None;
        }
    };
    let event = match serde_json::from_str::<OrderEvent>(&payload) {
        Ok(event) => event,
        Err(e) => {
            warn!(order_id, error = %e, "Skipping event row with undecodable payload");
            return None;
        }
    };

    Some(EventRecord {
        event_id,
        order_id: OrderId::new(order_id),
        occurred_at: row.get("occurred_at"),
        event,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::init_db;
    use tempfile::TempDir;

    async fn setup_test_db() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (Repository::new(pool), temp_dir)
    }

    fn sample_order(id: i64) -> Order {
        let token = Address::new("0xt0ken".to_string());
        Order {
            id: OrderId::new(id),
            creator: Address::new("0xcreator".to_string()),
            order_type: 1,
            status: OrderStatus::Accepted,
            max_gas: 20,
            execution_period_start: Timestamp::new(1_000),
            execution_period_deadline: Timestamp::new(10_000),
            execution_window: 3_600,
            is_revokable: true,
            reward: TokenAmount {
                amount: 100,
                token: token.clone(),
            },
            gas_cost: GasPricing {
                gas_price: 10,
                token: token.clone(),
            },
            guarantee: GasPricing {
                gas_price: 50,
                token,
            },
            gas_balance: 3,
            fee_rate: 500,
            executor: Some(Address::new("0xexec".to_string())),
            accepted_at: Some(Timestamp::new(2_000)),
        }
    }

    #[tokio::test]
    async fn test_ping_answers() {
        let (repo, _temp) = setup_test_db().await;
        repo.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_persist_and_load_order_round_trip() {
        let (repo, _temp) = setup_test_db().await;
        let order = sample_order(1);
        let event = EventRecord::new(
            order.id,
            2_000,
            OrderEvent::Accepted {
                executor: Address::new("0xexec".to_string()),
                guarantee_locked: 50,
            },
        );

        repo.persist_transition(&order, &event).await.unwrap();

        let loaded = repo.load_orders().await.unwrap();
        assert_eq!(loaded, vec![order]);
    }

    #[tokio::test]
    async fn test_persist_twice_keeps_latest_snapshot() {
        let (repo, _temp) = setup_test_db().await;
        let mut order = sample_order(1);
        let accept = EventRecord::new(
            order.id,
            2_000,
            OrderEvent::Accepted {
                executor: Address::new("0xexec".to_string()),
                guarantee_locked: 50,
            },
        );
        repo.persist_transition(&order, &accept).await.unwrap();

        order.status = OrderStatus::Executing;
        order.gas_balance = 12;
        let progress = EventRecord::new(
            order.id,
            2_100,
            OrderEvent::ExecutionProgress {
                executor: Address::new("0xexec".to_string()),
                gas_used: 9,
                gas_balance: 12,
            },
        );
        repo.persist_transition(&order, &progress).await.unwrap();

        let loaded = repo.load_orders().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].status, OrderStatus::Executing);
        assert_eq!(loaded[0].gas_balance, 12);

        let events = repo.query_events(order.id).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], accept);
        assert_eq!(events[1], progress);
    }

    #[tokio::test]
    async fn test_query_events_scoped_to_order() {
        let (repo, _temp) = setup_test_db().await;
        let first = sample_order(1);
        let second = sample_order(2);
        let event_one = EventRecord::new(first.id, 10, OrderEvent::Revoked { creator_refund: 7 });
        let event_two = EventRecord::new(second.id, 20, OrderEvent::Revoked { creator_refund: 9 });

        repo.persist_transition(&first, &event_one).await.unwrap();
        repo.persist_transition(&second, &event_two).await.unwrap();

        let events = repo.query_events(first.id).await.unwrap();
        assert_eq!(events, vec![event_one]);
    }

    #[tokio::test]
    async fn test_fee_rates_round_trip() {
        let (repo, _temp) = setup_test_db().await;
        repo.set_fee_rate(0, 250).await.unwrap();
        repo.set_fee_rate(1, 500).await.unwrap();
        repo.set_fee_rate(0, 300).await.unwrap();

        let mut rates = repo.load_fee_rates().await.unwrap();
        rates.sort();
        assert_eq!(rates, vec![(0, 300), (1, 500)]);
    }
}
