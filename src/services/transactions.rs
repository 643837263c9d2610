use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Payment, PaymentStatus};

/// Admin transaction list filter. Every field is optional.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub search: Option<String>,
    pub status: Option<PaymentStatus>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TransactionSummary {
    pub total_service_fees: Decimal,
    pub total_amount: Decimal,
    pub count: usize,
}

impl TransactionFilter {
    pub fn matches(&self, payment: &Payment) -> bool {
        self.matches_search(payment) && self.matches_status(payment) && self.matches_dates(payment)
    }

    fn matches_search(&self, payment: &Payment) -> bool {
        let query = match self.search.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => q.to_lowercase(),
            _ => return true,
        };
        payment.mpesa_number.contains(&query)
            || payment
                .transaction_id
                .as_deref()
                .is_some_and(|id| id.to_lowercase().contains(&query))
            || payment.booking_id.to_lowercase().contains(&query)
    }

    fn matches_status(&self, payment: &Payment) -> bool {
        self.status.map_or(true, |s| payment.status == s)
    }

    fn matches_dates(&self, payment: &Payment) -> bool {
        let day = payment.created_at.date();
        self.start.map_or(true, |start| day >= start) && self.end.map_or(true, |end| day <= end)
    }
}

pub fn filter_transactions<'a>(payments: &'a [Payment], filter: &TransactionFilter) -> Vec<&'a Payment> {
    payments.iter().filter(|p| filter.matches(p)).collect()
}

pub fn summarize(payments: &[&Payment]) -> TransactionSummary {
    TransactionSummary {
        total_service_fees: payments.iter().map(|p| p.service_fee).sum(),
        total_amount: payments.iter().map(|p| p.amount).sum(),
        count: payments.len(),
    }
}

pub fn export_csv(payments: &[&Payment]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "Date",
        "Transaction ID",
        "M-Pesa Number",
        "Amount",
        "Service Fee",
        "Status",
    ])?;
    for p in payments {
        writer.write_record([
            p.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            p.transaction_id.clone().unwrap_or_default(),
            p.mpesa_number.clone(),
            p.amount.to_string(),
            p.service_fee.to_string(),
            p.status.as_str().to_string(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}
