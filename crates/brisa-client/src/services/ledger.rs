use serde::Serialize;

use crate::api::ApiClient;
use crate::error::{AppError, AppResult};
use crate::models::{Transaction, TransactionKind};

/// Form state behind the income/expense entry screens. The derived
/// `total` is recomputed on every numeric change; for an income entry it
/// is never edited directly.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub kind: TransactionKind,
    pub date: String,
    pub activity: String,
    pub activity_other: String,
    pub seller: String,
    pub instructor: String,
    pub details: String,
    pub hours: f64,
    pub rate_per_hour: f64,
    pub expenses: f64,
    pub commission: f64,
    pub currency: String,
    pub payment_method: String,
    pub payment_method_other: String,
    total: f64,
}

impl TransactionDraft {
    pub fn income(date: &str, instructor: &str) -> Self {
        Self {
            kind: TransactionKind::Ingreso,
            date: date.to_string(),
            activity: "Clases".to_string(),
            activity_other: String::new(),
            seller: String::new(),
            instructor: instructor.to_string(),
            details: String::new(),
            hours: 0.0,
            rate_per_hour: 0.0,
            expenses: 0.0,
            commission: 0.0,
            currency: "USD".to_string(),
            payment_method: "Efectivo".to_string(),
            payment_method_other: String::new(),
            total: 0.0,
        }
    }

    pub fn expense(date: &str, instructor: &str) -> Self {
        Self {
            kind: TransactionKind::Egreso,
            activity: "Gastos".to_string(),
            ..Self::income(date, instructor)
        }
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn set_hours(&mut self, hours: f64) {
        self.hours = hours;
        self.recompute_total();
    }

    pub fn set_rate(&mut self, rate_per_hour: f64) {
        self.rate_per_hour = rate_per_hour;
        self.recompute_total();
    }

    pub fn set_expenses(&mut self, expenses: f64) {
        self.expenses = expenses;
        self.recompute_total();
    }

    fn recompute_total(&mut self) {
        self.total = match self.kind {
            // Associated expenses come off the gross; the form never
            // shows a negative class.
            TransactionKind::Ingreso => (self.hours * self.rate_per_hour - self.expenses).max(0.0),
            // For an expense the entered amount is the whole story.
            TransactionKind::Egreso => self.expenses,
        };
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.instructor.trim().is_empty() {
            return Err(AppError::Validation(
                "Select an instructor before saving".to_string(),
            ));
        }
        if self.kind == TransactionKind::Egreso && self.expenses <= 0.0 {
            return Err(AppError::Validation(
                "An expense needs a positive amount".to_string(),
            ));
        }
        Ok(())
    }

    fn resolved_activity(&self) -> String {
        if self.activity == "Otro" {
            self.activity_other.clone()
        } else {
            self.activity.clone()
        }
    }

    fn resolved_payment_method(&self) -> String {
        if self.payment_method == "Otro" {
            self.payment_method_other.clone()
        } else {
            self.payment_method.clone()
        }
    }

    /// Wire payload with the "Otro" escape hatches folded in.
    pub fn payload(&self) -> SaveTransactionRequest {
        SaveTransactionRequest {
            kind: self.kind,
            date: self.date.clone(),
            activity: self.resolved_activity(),
            seller: non_empty(&self.seller),
            instructor: self.instructor.clone(),
            details: non_empty(&self.details),
            hours: self.hours,
            rate_per_hour: self.rate_per_hour,
            total: self.total,
            currency: self.currency.clone(),
            associated_expenses: self.expenses,
            commission: self.commission,
            payment_method: self.resolved_payment_method(),
        }
    }

    /// Ready the form for the next entry: identity and date defaults
    /// survive, everything transaction-specific is wiped.
    pub fn clear_transient(&mut self) {
        self.details.clear();
        self.seller.clear();
        self.activity_other.clear();
        self.payment_method_other.clear();
        self.hours = 0.0;
        self.rate_per_hour = 0.0;
        self.expenses = 0.0;
        self.commission = 0.0;
        self.recompute_total();
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct SaveTransactionRequest {
    #[serde(rename = "tipoTransaccion")]
    pub kind: TransactionKind,
    #[serde(rename = "fecha")]
    pub date: String,
    #[serde(rename = "actividad")]
    pub activity: String,
    #[serde(rename = "vendedor", skip_serializing_if = "Option::is_none")]
    pub seller: Option<String>,
    pub instructor: String,
    #[serde(rename = "detalles", skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(rename = "cantidadHoras")]
    pub hours: f64,
    #[serde(rename = "tarifaPorHora")]
    pub rate_per_hour: f64,
    pub total: f64,
    #[serde(rename = "moneda")]
    pub currency: String,
    #[serde(rename = "gastosAsociados")]
    pub associated_expenses: f64,
    #[serde(rename = "comision")]
    pub commission: f64,
    #[serde(rename = "formaPago")]
    pub payment_method: String,
}

/// Validate and persist. On success the draft is reset for the next
/// entry; on failure it stays as typed and nothing is retried.
pub async fn submit(api: &ApiClient, draft: &mut TransactionDraft) -> AppResult<Transaction> {
    draft.validate()?;
    let saved: Transaction = api.post_json("/api/clases/guardar", &draft.payload()).await?;
    draft.clear_transient();
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn income_total_follows_hours_rate_and_expenses() {
        let mut draft = TransactionDraft::income("2025-11-02", "Leo Paz");
        draft.set_hours(2.0);
        draft.set_rate(50.0);
        assert_eq!(draft.total(), 100.0);

        draft.set_expenses(20.0);
        assert_eq!(draft.total(), 80.0);

        draft.set_rate(60.0);
        assert_eq!(draft.total(), 100.0);
    }

    #[test]
    fn income_total_clamps_at_zero() {
        let mut draft = TransactionDraft::income("2025-11-02", "Leo Paz");
        draft.set_hours(1.0);
        draft.set_rate(10.0);
        draft.set_expenses(25.0);
        assert_eq!(draft.total(), 0.0);
    }

    #[test]
    fn expense_total_mirrors_the_entered_amount() {
        let mut draft = TransactionDraft::expense("2025-11-02", "Ana Diaz");
        draft.set_expenses(35.0);
        assert_eq!(draft.total(), 35.0);
    }

    #[test]
    fn submission_requires_an_instructor() {
        let mut draft = TransactionDraft::income("2025-11-02", "");
        draft.set_hours(1.0);
        draft.set_rate(50.0);
        assert!(matches!(draft.validate(), Err(AppError::Validation(_))));

        draft.instructor = "Leo Paz".to_string();
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn expenses_need_a_positive_amount() {
        let draft = TransactionDraft::expense("2025-11-02", "Ana Diaz");
        assert!(matches!(draft.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn otro_escape_hatches_fold_into_the_payload() {
        let mut draft = TransactionDraft::income("2025-11-02", "Leo Paz");
        draft.activity = "Otro".to_string();
        draft.activity_other = "Aula teorica".to_string();
        draft.payment_method = "Otro".to_string();
        draft.payment_method_other = "Cheque".to_string();

        let payload = draft.payload();
        assert_eq!(payload.activity, "Aula teorica");
        assert_eq!(payload.payment_method, "Cheque");
    }

    #[test]
    fn payload_uses_the_wire_field_names() {
        let mut draft = TransactionDraft::income("2025-11-02", "Leo Paz");
        draft.set_hours(2.0);
        draft.set_rate(50.0);

        let json = serde_json::to_value(draft.payload()).unwrap();
        assert_eq!(json["tipoTransaccion"], "INGRESO");
        assert_eq!(json["cantidadHoras"], 2.0);
        assert_eq!(json["tarifaPorHora"], 50.0);
        assert_eq!(json["total"], 100.0);
        assert_eq!(json["moneda"], "USD");
        // Empty optionals stay off the wire entirely.
        assert!(json.get("vendedor").is_none());
    }

    #[test]
    fn clearing_transient_fields_keeps_the_defaults() {
        let mut draft = TransactionDraft::income("2025-11-02", "Leo Paz");
        draft.details = "Clase a Santa Teresa".to_string();
        draft.seller = "Hotel Norte".to_string();
        draft.set_hours(2.0);
        draft.set_rate(50.0);
        draft.set_expenses(10.0);
        draft.commission = 5.0;

        draft.clear_transient();

        assert_eq!(draft.details, "");
        assert_eq!(draft.seller, "");
        assert_eq!(draft.hours, 0.0);
        assert_eq!(draft.rate_per_hour, 0.0);
        assert_eq!(draft.expenses, 0.0);
        assert_eq!(draft.commission, 0.0);
        assert_eq!(draft.total(), 0.0);
        // Identity and defaults survive for the next entry.
        assert_eq!(draft.date, "2025-11-02");
        assert_eq!(draft.instructor, "Leo Paz");
        assert_eq!(draft.currency, "USD");
        assert_eq!(draft.payment_method, "Efectivo");
    }
}
