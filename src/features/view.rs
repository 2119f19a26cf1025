//! Single-transaction lookup for investigators

use super::extractor::TransactionContext;
use crate::graph::{GraphStore, NodeView};
use serde::Serialize;

/// A transaction together with the entities it touches
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionView {
    pub transaction: NodeView,
    pub from_account: Option<NodeView>,
    pub to_account: Option<NodeView>,
    pub owner: Option<NodeView>,
    pub location: Option<NodeView>,
    pub device: Option<NodeView>,
    pub ip_address: Option<NodeView>,
    pub merchant: Option<NodeView>,
}

impl From<&TransactionContext<'_>> for TransactionView {
    fn from(ctx: &TransactionContext<'_>) -> Self {
        Self {
            transaction: ctx.transaction.into(),
            from_account: ctx.from_account.map(NodeView::from),
            to_account: ctx.to_account.map(NodeView::from),
            owner: ctx.owner.map(NodeView::from),
            location: ctx.location.map(NodeView::from),
            device: ctx.device.map(NodeView::from),
            ip_address: ctx.ip_address.map(NodeView::from),
            merchant: ctx.merchant.map(NodeView::from),
        }
    }
}

/// Look up a transaction and its neighbors; `None` when the id is unknown
pub fn transaction_view(store: &GraphStore, transaction_id: &str) -> Option<TransactionView> {
    TransactionContext::resolve(store, transaction_id.trim()).map(|ctx| TransactionView::from(&ctx))
}
