//! Record models served by the admin backend, with their screen columns

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::action::RowAction;
use crate::column::{BadgeTone, ColumnDescriptor, ColumnSet};
use crate::error::CoreResult;
use crate::record::Record;
use crate::value::CellValue;

// ==================== Fees ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fee {
    pub id: String,
    pub name: String,
    pub interest: Decimal,
    #[serde(default)]
    pub description: String,
}

impl Record for Fee {
    fn id(&self) -> &str {
        &self.id
    }
}

pub fn fee_columns() -> CoreResult<ColumnSet<Fee>> {
    ColumnSet::new(vec![
        ColumnDescriptor::index(),
        ColumnDescriptor::text("name", "Name", |f: &Fee| CellValue::text(&f.name)),
        ColumnDescriptor::text("interest", "Interest", |f: &Fee| CellValue::Number(f.interest.normalize())),
        ColumnDescriptor::text("description", "Description", |f: &Fee| CellValue::text(&f.description)),
        ColumnDescriptor::actions(),
    ])
}

// ==================== Stores ====================

pub const STORE_VERIFIED: &str = "VERIFIED";
pub const STORE_DECLINED: &str = "DECLINED";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreUser {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct City {
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub city_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub user: StoreUser,
    #[serde(default)]
    pub city: City,
    pub is_verified: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Store {
    pub fn is_verified(&self) -> bool {
        self.is_verified == STORE_VERIFIED
    }
}

impl Record for Store {
    fn id(&self) -> &str {
        &self.id
    }
}

pub fn store_tone(value: &CellValue) -> BadgeTone {
    match value.to_string().as_str() {
        STORE_VERIFIED => BadgeTone::Success,
        STORE_DECLINED => BadgeTone::Danger,
        _ => BadgeTone::Info,
    }
}

pub fn store_columns() -> CoreResult<ColumnSet<Store>> {
    ColumnSet::new(vec![
        ColumnDescriptor::index(),
        ColumnDescriptor::text("name", "Store Name", |s: &Store| CellValue::text(&s.name)),
        ColumnDescriptor::text("email", "Email", |s: &Store| CellValue::text(&s.user.email)),
        ColumnDescriptor::text("city", "City", |s: &Store| {
            CellValue::text(format!("{}, {}", s.city.city_name, s.city.province))
        }),
        ColumnDescriptor::badge("status", "Status", |s: &Store| CellValue::text(&s.is_verified), store_tone),
        ColumnDescriptor::text("created_at", "Created At", |s: &Store| CellValue::Date(s.created_at)),
        ColumnDescriptor::actions(),
    ])
}

// ==================== Payouts ====================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayoutStore {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayoutBank {
    #[serde(default)]
    pub bank_name: String,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub account_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payout {
    pub id: String,
    #[serde(default)]
    pub store: PayoutStore,
    #[serde(default)]
    pub payout_bank: PayoutBank,
    pub status: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Record for Payout {
    fn id(&self) -> &str {
        &self.id
    }
}

pub const PAYOUT_PENDING: &str = "PENDING";

/// Only a pending payout can be confirmed
pub fn payout_action_available(payout: &Payout, action: RowAction) -> bool {
    match action {
        RowAction::Confirm => payout.status == PAYOUT_PENDING,
        _ => true,
    }
}

pub fn payout_tone(value: &CellValue) -> BadgeTone {
    match value.to_string().as_str() {
        "SUCCESS" => BadgeTone::Success,
        "CANCEL" => BadgeTone::Danger,
        "ONGOING" => BadgeTone::Info,
        _ => BadgeTone::Neutral,
    }
}

pub fn payout_columns() -> CoreResult<ColumnSet<Payout>> {
    ColumnSet::new(vec![
        ColumnDescriptor::index(),
        ColumnDescriptor::text("store", "Store", |p: &Payout| CellValue::text(&p.store.name)),
        ColumnDescriptor::text("bank", "Bank", |p: &Payout| CellValue::text(&p.payout_bank.bank_name)),
        ColumnDescriptor::text("account", "Account", |p: &Payout| {
            CellValue::text(format!(
                "{} ({})",
                p.payout_bank.account_name, p.payout_bank.account_number
            ))
        })
        .not_sortable(),
        ColumnDescriptor::badge("status", "Status", |p: &Payout| CellValue::text(&p.status), payout_tone),
        ColumnDescriptor::text("created_at", "Created At", |p: &Payout| CellValue::Date(p.created_at)),
        ColumnDescriptor::actions(),
    ])
}

// ==================== Transactions ====================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionUser {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "transactionId")]
    pub transaction_id: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub total_amount: Decimal,
    pub status: String,
    #[serde(default)]
    pub user: TransactionUser,
}

impl Record for Transaction {
    fn id(&self) -> &str {
        &self.id
    }
}

pub fn transaction_tone(value: &CellValue) -> BadgeTone {
    match value.to_string().as_str() {
        "SUCCESS" => BadgeTone::Success,
        "CANCEL" => BadgeTone::Danger,
        "PAYABLE" => BadgeTone::Info,
        _ => BadgeTone::Neutral,
    }
}

pub fn transaction_columns() -> CoreResult<ColumnSet<Transaction>> {
    ColumnSet::new(vec![
        ColumnDescriptor::index(),
        ColumnDescriptor::text("transaction_id", "Transaction ID", |t: &Transaction| {
            CellValue::text(&t.transaction_id)
        }),
        ColumnDescriptor::text("created_at", "Date", |t: &Transaction| CellValue::Date(t.created_at)),
        ColumnDescriptor::badge(
            "status",
            "Status",
            |t: &Transaction| CellValue::text(&t.status),
            transaction_tone,
        ),
        ColumnDescriptor::text("email", "Email", |t: &Transaction| CellValue::text(&t.user.email)),
        ColumnDescriptor::text("total_amount", "Total Amount", |t: &Transaction| {
            CellValue::Number(t.total_amount.normalize())
        }),
        ColumnDescriptor::actions(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::decode_envelope;

    #[test]
    fn test_decode_store_envelope() {
        let body = r#"{
            "success": true,
            "message": "ok",
            "data": [{
                "id": "s1",
                "user_id": "u1",
                "name": "Toko Maju",
                "user": {"email": "maju@example.com"},
                "city": {"province": "Jawa Barat", "city_name": "Bandung"},
                "is_verified": "VERIFIED",
                "createdAt": "2024-05-01T10:00:00.000Z"
            }]
        }"#;
        let stores: Vec<Store> = decode_envelope(body).unwrap();
        assert_eq!(stores[0].user.email, "maju@example.com");
        assert!(stores[0].is_verified());

        let columns = store_columns().unwrap();
        let city = columns.get("city").unwrap().value(&stores[0]);
        assert_eq!(city.to_string(), "Bandung, Jawa Barat");
    }

    #[test]
    fn test_decode_transaction_renames() {
        let body = r#"{"success":true,"data":[{
            "id":"t1","transactionId":"INV-001","createdAt":"2024-01-02T00:00:00Z",
            "total_amount":150000,"status":"PAYABLE","user":{"email":"a@b.c"}
        }]}"#;
        let txs: Vec<Transaction> = decode_envelope(body).unwrap();
        assert_eq!(txs[0].transaction_id, "INV-001");
        assert_eq!(txs[0].total_amount, Decimal::from(150000));

        let json = serde_json::to_value(&txs[0]).unwrap();
        assert_eq!(json["transactionId"], "INV-001");
        assert!(json.get("transaction_id").is_none());
    }

    #[test]
    fn test_status_tones() {
        assert_eq!(store_tone(&CellValue::text("VERIFIED")), BadgeTone::Success);
        assert_eq!(store_tone(&CellValue::text("DECLINED")), BadgeTone::Danger);
        assert_eq!(store_tone(&CellValue::text("PENDING")), BadgeTone::Info);
        assert_eq!(payout_tone(&CellValue::text("ONGOING")), BadgeTone::Info);
        assert_eq!(payout_tone(&CellValue::text("PENDING")), BadgeTone::Neutral);
        assert_eq!(transaction_tone(&CellValue::text("CANCEL")), BadgeTone::Danger);
    }

    #[test]
    fn test_screen_column_sets_are_valid() {
        assert_eq!(fee_columns().unwrap().len(), 5);
        assert_eq!(store_columns().unwrap().len(), 7);
        assert_eq!(payout_columns().unwrap().len(), 7);
        assert_eq!(transaction_columns().unwrap().len(), 7);
        assert!(!payout_columns().unwrap().get("account").unwrap().is_sortable());
    }

    #[test]
    fn test_decimal_cells_are_normalized() {
        let body = r#"{"success":true,"data":[
            {"id":"f1","name":"Admin","interest":"2.50"},
            {"id":"f2","name":"Service","interest":2.5}
        ]}"#;
        let fees: Vec<Fee> = decode_envelope(body).unwrap();
        let columns = fee_columns().unwrap();
        let interest = columns.get("interest").unwrap();
        assert_eq!(interest.value(&fees[0]).to_string(), "2.5");
        assert_eq!(interest.value(&fees[0]), interest.value(&fees[1]));
        assert!(!interest.value(&fees[0]).contains_lowercase("2.50"));

        let body = r#"{"success":true,"data":[{
            "id":"t1","transactionId":"INV-1","createdAt":"2024-01-02T00:00:00Z",
            "total_amount":"150000.00","status":"SUCCESS"
        }]}"#;
        let txs: Vec<Transaction> = decode_envelope(body).unwrap();
        let total = transaction_columns().unwrap().get("total_amount").unwrap().value(&txs[0]);
        assert_eq!(total.to_string(), "150000");
    }

    #[test]
    fn test_payout_confirm_only_while_pending() {
        let payout = |status: &str| Payout {
            id: "p1".to_string(),
            store: PayoutStore::default(),
            payout_bank: PayoutBank::default(),
            status: status.to_string(),
            created_at: "2024-05-01T00:00:00Z".parse().unwrap(),
        };
        assert!(payout_action_available(&payout("PENDING"), RowAction::Confirm));
        assert!(!payout_action_available(&payout("SUCCESS"), RowAction::Confirm));
        assert!(!payout_action_available(&payout("ONGOING"), RowAction::Confirm));
        assert!(payout_action_available(&payout("SUCCESS"), RowAction::Detail));
    }

    #[test]
    fn test_fee_interest_sorts_numerically() {
        let fee = |id: &str, interest: i64| Fee {
            id: id.to_string(),
            name: id.to_string(),
            interest: Decimal::from(interest),
            description: String::new(),
        };
        let fees = vec![fee("a", 10), fee("b", 9), fee("c", 100)];
        let columns = fee_columns().unwrap();
        let sort = crate::state::SortState {
            column_id: "interest".to_string(),
            direction: crate::state::SortDirection::Asc,
        };
        let order = crate::engine::apply_sort(&fees, &[0, 1, 2], Some(&sort), &columns);
        assert_eq!(order, vec![1, 0, 2]);
    }
}
