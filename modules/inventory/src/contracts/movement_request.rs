use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "stock_tx_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StockTxType {
    Inbound,
    Outbound,
    Adjust,
    TransferIn,
    TransferOut,
}

/// A single stock movement. `qty` is signed: positive for Inbound and
/// positive Adjust, negative for Outbound and negative Adjust. Transfers
/// are two movements (see `post_transfer`), not one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementRequest {
    pub company_id: String,
    pub warehouse_id: String,
    pub product_id: String,
    pub qty: Decimal,
    pub unit_cost: Decimal,
    pub tx_type: StockTxType,
    pub reference_module: String,
    pub reference_id: String,
    pub idempotency_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementOutcome {
    pub stock_transaction_id: uuid::Uuid,
    pub qty_on_hand: Decimal,
    pub avg_cost: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_request_round_trips_through_json() {
        let request = MovementRequest {
            company_id: "co-1".to_string(),
            warehouse_id: "wh-1".to_string(),
            product_id: "prod-1".to_string(),
            qty: Decimal::new(10, 0),
            unit_cost: Decimal::new(250, 2),
            tx_type: StockTxType::Inbound,
            reference_module: "grn".to_string(),
            reference_id: "grn-1".to_string(),
            idempotency_key: "grn-1:line-1".to_string(),
        };

        let json = serde_json::to_string(&request).unwrap();
        let back: MovementRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.qty, request.qty);
        assert_eq!(back.tx_type, StockTxType::Inbound);
    }
}
