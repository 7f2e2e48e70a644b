//! Order service: the single-writer coordinator over store, ledger, and
//! journal.
//!
//! Every mutating call takes one mutex over the store and fee schedule, so
//! transitions never interleave. Within a call the ordering is fixed:
//! lazy expiry first, then pure engine validation, then ledger transfers,
//! then the store mutation with its write-through persistence and event
//! broadcast. A rejection at any step leaves everything untouched.

use crate::clock::Clock;
use crate::db::Repository;
use crate::domain::{
    Address, EventRecord, Order, OrderEvent, OrderFilter, OrderId, OrderStatus, OrderView, Timestamp,
};
use crate::engine::{
    self, CreateOrderRequest, EngineError, FeeRateError, FeeSchedule, SettlementBreakdown,
};
use crate::ledger::{AssetLedger, LedgerError};
use crate::store::OrderStore;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

/// Capacity of the in-process event fan-out channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("order {0} not found")]
    NotFound(OrderId),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    FeeRate(#[from] FeeRateError),
    #[error("reward and gas cost must be escrowed in the same token")]
    TokenMismatch,
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

struct Inner {
    store: OrderStore,
    fees: FeeSchedule,
}

/// The order-settlement engine's hosting surface.
pub struct OrderService {
    inner: Mutex<Inner>,
    ledger: Arc<dyn AssetLedger>,
    repo: Arc<Repository>,
    clock: Arc<dyn Clock>,
    /// Account holding all escrowed funds.
    escrow_account: Address,
    /// Protocol fee-collection account.
    fee_sink: Address,
    events: broadcast::Sender<EventRecord>,
}

impl OrderService {
    /// Restore the service from persisted state.
    pub async fn init(
        repo: Arc<Repository>,
        ledger: Arc<dyn AssetLedger>,
        clock: Arc<dyn Clock>,
        escrow_account: Address,
        fee_sink: Address,
        default_fee_rate: i64,
    ) -> Result<Self, ServiceError> {
        let orders = repo.load_orders().await?;
        let store = OrderStore::restore(orders);

        let mut fees = FeeSchedule::new(default_fee_rate);
        for (order_type, rate) in repo.load_fee_rates().await? {
            if let Err(e) = fees.set(order_type, rate) {
                warn!(order_type, rate, error = %e, "Skipping persisted fee rate");
            }
        }

        info!(orders = store.len(), "Order service restored");
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(OrderService {
            inner: Mutex::new(Inner { store, fees }),
            ledger,
            repo,
            clock,
            escrow_account,
            fee_sink,
            events,
        })
    }

    /// Subscribe to the live event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.events.subscribe()
    }

    /// Readiness probe: verify the backing database still answers.
    pub async fn ready(&self) -> Result<(), ServiceError> {
        self.repo.ping().await?;
        Ok(())
    }

    fn now(&self) -> Timestamp {
        self.clock.now()
    }

    // =========================================================================
    // Mutating operations
    // =========================================================================

    /// Create an order, escrowing `reward + maxGas * gasPrice` from the
    /// creator. The fee rate in force for the order type is snapshotted into
    /// the record.
    pub async fn create_order(&self, req: CreateOrderRequest) -> Result<OrderView, ServiceError> {
        if req.reward.token != req.gas_cost.token {
            return Err(ServiceError::TokenMismatch);
        }
        let mut inner = self.inner.lock().await;

        let escrow_total = engine::validate_create(&req)?;
        let id = inner.store.next_id();
        let fee_rate = inner.fees.rate(req.order_type);

        self.ledger
            .transfer_from(&req.reward.token, &req.creator, &self.escrow_account, escrow_total)
            .await?;

        let order = req.into_order(id, fee_rate);
        let event = self.journal(
            &order,
            OrderEvent::Created {
                creator: order.creator.clone(),
                order_type: order.order_type,
                escrowed: escrow_total,
            },
        );
        self.repo.persist_transition(&order, &event).await?;
        let view = OrderView::from(&order);
        inner.store.insert(order);

        info!(order_id = %id, escrowed = escrow_total, "Order created");
        let _ = self.events.send(event);
        Ok(view)
    }

    /// Accept an order as `executor`, locking the guarantee deposit.
    pub async fn accept(&self, id: OrderId, executor: Address) -> Result<OrderView, ServiceError> {
        let mut inner = self.inner.lock().await;
        self.expire_if_due(&mut inner, id).await?;

        let now = self.now();
        let order = inner.store.get(id).ok_or(ServiceError::NotFound(id))?;
        let guarantee = engine::plan_accept(order, now)?;

        self.ledger
            .transfer_from(
                &order.guarantee.token,
                &executor,
                &self.escrow_account,
                guarantee,
            )
            .await?;

        let order = inner
            .store
            .get_mut(id)
            .ok_or(ServiceError::NotFound(id))?;
        order.status = OrderStatus::Accepted;
        order.executor = Some(executor.clone());
        order.accepted_at = Some(now);

        let event = self.journal(
            order,
            OrderEvent::Accepted {
                executor,
                guarantee_locked: guarantee,
            },
        );
        self.repo.persist_transition(order, &event).await?;

        info!(order_id = %id, guarantee, "Order accepted");
        let _ = self.events.send(event);
        Ok(OrderView::from(&*order))
    }

    /// Record execution progress, accumulating gas against `max_gas`.
    pub async fn execute(
        &self,
        id: OrderId,
        executor: Address,
        gas_used: i64,
    ) -> Result<OrderView, ServiceError> {
        let mut inner = self.inner.lock().await;
        self.expire_if_due(&mut inner, id).await?;

        let now = self.now();
        let order = inner.store.get(id).ok_or(ServiceError::NotFound(id))?;
        let new_balance = engine::plan_execute(order, &executor, gas_used, now)?;

        let order = inner
            .store
            .get_mut(id)
            .ok_or(ServiceError::NotFound(id))?;
        order.gas_balance = new_balance;
        order.status = OrderStatus::Executing;

        let event = self.journal(
            order,
            OrderEvent::ExecutionProgress {
                executor,
                gas_used,
                gas_balance: new_balance,
            },
        );
        self.repo.persist_transition(order, &event).await?;

        info!(order_id = %id, gas_balance = new_balance, "Execution progress recorded");
        let _ = self.events.send(event);
        Ok(OrderView::from(&*order))
    }

    /// Settle a fully or partially executed order: pay the executor, collect
    /// the protocol fee, refund the guarantee and any unspent gas escrow.
    pub async fn settle(&self, id: OrderId) -> Result<OrderView, ServiceError> {
        let mut inner = self.inner.lock().await;
        self.expire_if_due(&mut inner, id).await?;

        let now = self.now();
        let order = inner.store.get(id).ok_or(ServiceError::NotFound(id))?;
        let breakdown = engine::plan_settle(order, now)?;
        // plan_settle guarantees a recorded executor.
        let executor = order
            .executor
            .clone()
            .ok_or(EngineError::NotAccepted)?;

        self.pay_out(order, &executor, &breakdown).await?;

        let order = inner
            .store
            .get_mut(id)
            .ok_or(ServiceError::NotFound(id))?;
        order.status = OrderStatus::Completed;

        let event = self.journal(
            order,
            OrderEvent::Settled {
                executor,
                executor_payout: breakdown.executor_payout,
                protocol_fee: breakdown.protocol_fee,
                creator_refund: breakdown.creator_refund,
                guarantee_refund: breakdown.guarantee_refund,
            },
        );
        self.repo.persist_transition(order, &event).await?;

        info!(
            order_id = %id,
            executor_payout = breakdown.executor_payout,
            protocol_fee = breakdown.protocol_fee,
            "Order settled"
        );
        let _ = self.events.send(event);
        Ok(OrderView::from(&*order))
    }

    /// Revoke an unaccepted, revokable order and refund the creator.
    pub async fn revoke(&self, id: OrderId) -> Result<OrderView, ServiceError> {
        let mut inner = self.inner.lock().await;

        let order = inner.store.get(id).ok_or(ServiceError::NotFound(id))?;
        let refund = engine::plan_revoke(order)?;

        self.ledger
            .transfer(
                &order.reward.token,
                &self.escrow_account,
                &order.creator,
                refund,
            )
            .await?;

        let order = inner
            .store
            .get_mut(id)
            .ok_or(ServiceError::NotFound(id))?;
        order.status = OrderStatus::Revoked;

        let event = self.journal(order, OrderEvent::Revoked { creator_refund: refund });
        self.repo.persist_transition(order, &event).await?;

        info!(order_id = %id, refund, "Order revoked");
        let _ = self.events.send(event);
        Ok(OrderView::from(&*order))
    }

    /// Expire an order whose deadline lapsed without settlement. Anyone may
    /// call this; mutating calls also apply it lazily.
    pub async fn expire(&self, id: OrderId) -> Result<OrderView, ServiceError> {
        let mut inner = self.inner.lock().await;

        let now = self.now();
        let order = inner.store.get(id).ok_or(ServiceError::NotFound(id))?;
        engine::plan_expire(order, now)?;
        self.apply_expiry(&mut inner, id).await?;

        let order = inner.store.get(id).ok_or(ServiceError::NotFound(id))?;
        Ok(OrderView::from(order))
    }

    /// Set the prospective fee rate for an order type. Existing orders keep
    /// their creation-time snapshot.
    pub async fn set_fee(&self, order_type: u8, rate: i64) -> Result<(), ServiceError> {
        let mut inner = self.inner.lock().await;
        inner.fees.set(order_type, rate)?;
        self.repo.set_fee_rate(order_type, rate).await?;
        info!(order_type, rate, "Fee rate updated");
        Ok(())
    }

    // =========================================================================
    // Read-only operations (never mutate)
    // =========================================================================

    pub async fn get_order(&self, id: OrderId) -> Result<Order, ServiceError> {
        let inner = self.inner.lock().await;
        inner
            .store
            .get(id)
            .cloned()
            .ok_or(ServiceError::NotFound(id))
    }

    pub async fn filtered_orders(&self, filter: &OrderFilter) -> Vec<OrderView> {
        let inner = self.inner.lock().await;
        inner.store.filtered(filter)
    }

    pub async fn order_events(&self, id: OrderId) -> Result<Vec<EventRecord>, ServiceError> {
        {
            let inner = self.inner.lock().await;
            if inner.store.get(id).is_none() {
                return Err(ServiceError::NotFound(id));
            }
        }
        Ok(self.repo.query_events(id).await?)
    }

    pub async fn fee_rate(&self, order_type: u8) -> i64 {
        let inner = self.inner.lock().await;
        inner.fees.rate(order_type)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn journal(&self, order: &Order, event: OrderEvent) -> EventRecord {
        EventRecord::new(order.id, self.now().as_i64(), event)
    }

    /// Lazy expiry: run the expiry transition before a mutating call so a
    /// stale order is observed in its `Expired` state.
    async fn expire_if_due(&self, inner: &mut Inner, id: OrderId) -> Result<(), ServiceError> {
        let due = match inner.store.get(id) {
            Some(order) => engine::is_expirable(order, self.now()),
            None => false,
        };
        if due {
            self.apply_expiry(inner, id).await?;
        }
        Ok(())
    }

    /// Perform the expiry fund movements and status change. Caller has
    /// already established that expiry is legal.
    async fn apply_expiry(&self, inner: &mut Inner, id: OrderId) -> Result<(), ServiceError> {
        let order = inner.store.get(id).ok_or(ServiceError::NotFound(id))?;
        let breakdown =
            engine::expiry_breakdown(order).ok_or(EngineError::AmountOverflow)?;

        // Escrowed funds return to the creator; the guarantee is forfeited
        // to the creator as compensation for non-performance.
        self.ledger
            .transfer(
                &order.reward.token,
                &self.escrow_account,
                &order.creator,
                breakdown.creator_refund,
            )
            .await?;
        self.ledger
            .transfer(
                &order.guarantee.token,
                &self.escrow_account,
                &order.creator,
                breakdown.guarantee_forfeit,
            )
            .await?;

        let order = inner
            .store
            .get_mut(id)
            .ok_or(ServiceError::NotFound(id))?;
        order.status = OrderStatus::Expired;

        let event = self.journal(
            order,
            OrderEvent::Expired {
                guarantee_forfeit: breakdown.guarantee_forfeit,
                creator_refund: breakdown.creator_refund,
            },
        );
        self.repo.persist_transition(order, &event).await?;

        info!(
            order_id = %id,
            guarantee_forfeit = breakdown.guarantee_forfeit,
            "Order expired"
        );
        let _ = self.events.send(event);
        Ok(())
    }

    /// Settlement fund movements, all out of the funded escrow account.
    async fn pay_out(
        &self,
        order: &Order,
        executor: &Address,
        breakdown: &SettlementBreakdown,
    ) -> Result<(), ServiceError> {
        let escrow_token = &order.reward.token;
        if breakdown.executor_payout > 0 {
            self.ledger
                .transfer(
                    escrow_token,
                    &self.escrow_account,
                    executor,
                    breakdown.executor_payout,
                )
                .await?;
        }
        if breakdown.protocol_fee > 0 {
            self.ledger
                .transfer(
                    escrow_token,
                    &self.escrow_account,
                    &self.fee_sink,
                    breakdown.protocol_fee,
                )
                .await?;
        }
        if breakdown.creator_refund > 0 {
            self.ledger
                .transfer(
                    escrow_token,
                    &self.escrow_account,
                    &order.creator,
                    breakdown.creator_refund,
                )
                .await?;
        }
        if breakdown.guarantee_refund > 0 {
            self.ledger
                .transfer(
                    &order.guarantee.token,
                    &self.escrow_account,
                    executor,
                    breakdown.guarantee_refund,
                )
                .await?;
        }
        Ok(())
    }
}
