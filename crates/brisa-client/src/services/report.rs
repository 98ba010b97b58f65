use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::error::{AppError, AppResult};
use crate::models::{Operator, Transaction, TransactionKind};

/// Share of a class total that goes to the instructor who taught it.
pub const INSTRUCTOR_SHARE: f64 = 0.30;

/// The ledger triaged for the admin dashboard. Every transaction lands
/// in exactly one bucket.
#[derive(Debug, Default)]
pub struct Breakdown {
    /// Incomes nobody has been assigned to yet.
    pub pending: Vec<Transaction>,
    /// Incomes attributed to one of the operators.
    pub assigned: Vec<Transaction>,
    /// EGRESO entries.
    pub expenses: Vec<Transaction>,
}

pub fn partition(transactions: Vec<Transaction>) -> Breakdown {
    let mut breakdown = Breakdown::default();
    for tx in transactions {
        match tx.kind {
            TransactionKind::Egreso => breakdown.expenses.push(tx),
            TransactionKind::Ingreso => match tx.operator() {
                Some(_) => breakdown.assigned.push(tx),
                None => breakdown.pending.push(tx),
            },
        }
    }
    breakdown
}

/// Financial summary for one currency. Amounts in different currencies
/// are never added together; callers get one of these per currency code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencySummary {
    pub currency: String,
    pub gross_income: f64,
    pub linked_expenses: f64,
    pub operational_expenses: f64,
    pub net_balance: f64,
    pub assigned_igna: f64,
    pub assigned_jose: f64,
    pub commissions: f64,
    pub school_income: f64,
}

impl CurrencySummary {
    fn new(currency: &str) -> Self {
        Self {
            currency: currency.to_string(),
            gross_income: 0.0,
            linked_expenses: 0.0,
            operational_expenses: 0.0,
            net_balance: 0.0,
            assigned_igna: 0.0,
            assigned_jose: 0.0,
            commissions: 0.0,
            school_income: 0.0,
        }
    }
}

pub fn summarize(breakdown: &Breakdown) -> Vec<CurrencySummary> {
    let mut by_currency: BTreeMap<String, CurrencySummary> = BTreeMap::new();

    for tx in breakdown.pending.iter().chain(breakdown.assigned.iter()) {
        let summary = by_currency
            .entry(tx.currency.clone())
            .or_insert_with(|| CurrencySummary::new(&tx.currency));
        let total = tx.total.unwrap_or(0.0);
        summary.gross_income += total;
        summary.linked_expenses += tx.associated_expenses.unwrap_or(0.0);
        summary.commissions += tx.commission.unwrap_or(0.0);
        match tx.operator() {
            Some(Operator::Igna) => summary.assigned_igna += total,
            Some(Operator::Jose) => summary.assigned_jose += total,
            None => {}
        }
    }

    for tx in &breakdown.expenses {
        let summary = by_currency
            .entry(tx.currency.clone())
            .or_insert_with(|| CurrencySummary::new(&tx.currency));
        summary.operational_expenses += tx.effective_expense();
    }

    let mut summaries: Vec<CurrencySummary> = by_currency.into_values().collect();
    for s in &mut summaries {
        s.net_balance = s.gross_income - s.linked_expenses - s.operational_expenses;
        s.school_income = s.gross_income - s.assigned_igna - s.assigned_jose;
        s.gross_income = round2(s.gross_income);
        s.linked_expenses = round2(s.linked_expenses);
        s.operational_expenses = round2(s.operational_expenses);
        s.net_balance = round2(s.net_balance);
        s.assigned_igna = round2(s.assigned_igna);
        s.assigned_jose = round2(s.assigned_jose);
        s.commissions = round2(s.commissions);
        s.school_income = round2(s.school_income);
    }
    summaries
}

pub async fn fetch_all(api: &ApiClient) -> AppResult<Vec<Transaction>> {
    api.get_json("/api/clases/listar").await
}

/// The assignment select must name a real operator; an empty choice and
/// the NINGUNO placeholder are rejected before anything touches the
/// network.
pub fn validate_assignment(raw: &str) -> AppResult<Operator> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "NINGUNO" {
        return Err(AppError::Validation(
            "Select an operator before confirming the assignment".to_string(),
        ));
    }
    Operator::from_raw(Some(raw))
        .ok_or_else(|| AppError::Validation(format!("Unknown operator: {raw}")))
}

#[derive(Debug, Serialize)]
struct AssignRequest<'a> {
    #[serde(rename = "asignadoA")]
    assigned_to: &'a str,
}

/// Validate, persist, then refetch so the row moves buckets and the
/// aggregates pick it up. A failed PUT refetches too: the optimistic
/// update never survives a rejection.
pub async fn assign(
    api: &ApiClient,
    transactions: &mut Vec<Transaction>,
    id: i64,
    raw_operator: &str,
) -> AppResult<()> {
    let operator = validate_assignment(raw_operator)?;

    let tx = transactions
        .iter_mut()
        .find(|t| t.id == Some(id))
        .ok_or_else(|| AppError::NotFound(format!("No transaction with id {id}")))?;
    tx.assigned_to = Some(operator.as_str().to_string());
    tx.reviewed = true;

    let result = api
        .put_json(
            &format!("/api/clases/asignar/{id}"),
            &AssignRequest {
                assigned_to: operator.as_str(),
            },
        )
        .await;

    match fetch_all(api).await {
        Ok(fresh) => *transactions = fresh,
        Err(e) => tracing::warn!("Ledger reload after assignment failed: {e}"),
    }

    result
}

/// Server-side aggregate for a date range (ISO dates). A 404 means the
/// range holds no rows.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteReport {
    #[serde(default)]
    pub total_ingresos_brutos: Option<f64>,
    #[serde(default)]
    pub total_gastos: Option<f64>,
    #[serde(default)]
    pub total_egresos: Option<f64>,
    #[serde(default)]
    pub total_comisiones: Option<f64>,
    #[serde(default)]
    pub total_asignado_igna: Option<f64>,
    #[serde(default)]
    pub total_asignado_jose: Option<f64>,
}

impl RemoteReport {
    pub fn gross_income(&self) -> f64 {
        self.total_ingresos_brutos.unwrap_or(0.0)
    }

    pub fn linked_expenses(&self) -> f64 {
        self.total_gastos.unwrap_or(0.0)
    }

    pub fn operational_expenses(&self) -> f64 {
        self.total_egresos.unwrap_or(0.0)
    }

    pub fn net_income(&self) -> f64 {
        round2(self.gross_income() - self.linked_expenses() - self.operational_expenses())
    }

    pub fn school_income(&self) -> f64 {
        round2(
            self.gross_income()
                - self.total_asignado_igna.unwrap_or(0.0)
                - self.total_asignado_jose.unwrap_or(0.0),
        )
    }
}

pub async fn remote_summary(api: &ApiClient, from: &str, to: &str) -> AppResult<RemoteReport> {
    api.get_json(&format!(
        "/api/clases/reporte?fechaInicio={from}&fechaFin={to}"
    ))
    .await
}

/// Instructor statistics for one calendar month: what the school
/// generated and the instructor's cut, per currency.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlyStats {
    pub totals: BTreeMap<String, f64>,
    pub instructor_share: BTreeMap<String, f64>,
    pub class_count: usize,
}

pub fn monthly_stats(transactions: &[Transaction], year: i32, month: u32) -> MonthlyStats {
    let mut stats = MonthlyStats::default();

    for tx in transactions {
        if tx.kind != TransactionKind::Ingreso {
            continue;
        }
        let Ok(date) = chrono::NaiveDate::parse_from_str(&tx.date, "%Y-%m-%d") else {
            continue;
        };
        if date.year() != year || date.month() != month {
            continue;
        }

        let total = tx.total.unwrap_or(0.0);
        *stats.totals.entry(tx.currency.clone()).or_default() += total;
        *stats.instructor_share.entry(tx.currency.clone()).or_default() +=
            total * INSTRUCTOR_SHARE;
        stats.class_count += 1;
    }

    for value in stats.totals.values_mut() {
        *value = round2(*value);
    }
    for value in stats.instructor_share.values_mut() {
        *value = round2(*value);
    }
    stats
}

/// CSV export of the per-currency summary, one row per currency.
pub fn summary_csv(summaries: &[CurrencySummary]) -> AppResult<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());

    wtr.write_record([
        "Currency",
        "Gross Income",
        "Linked Expenses",
        "Operational Expenses",
        "Net Balance",
        "Assigned IGNA",
        "Assigned JOSE",
        "Commissions",
        "School Income",
    ])
    .map_err(|e| AppError::Internal(format!("CSV write error: {e}")))?;

    for s in summaries {
        wtr.write_record([
            s.currency.as_str(),
            &format!("{:.2}", s.gross_income),
            &format!("{:.2}", s.linked_expenses),
            &format!("{:.2}", s.operational_expenses),
            &format!("{:.2}", s.net_balance),
            &format!("{:.2}", s.assigned_igna),
            &format!("{:.2}", s.assigned_jose),
            &format!("{:.2}", s.commissions),
            &format!("{:.2}", s.school_income),
        ])
        .map_err(|e| AppError::Internal(format!("CSV write error: {e}")))?;
    }

    let data = wtr
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV flush error: {e}")))?;

    String::from_utf8(data).map_err(|e| AppError::Internal(format!("CSV encoding error: {e}")))
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
