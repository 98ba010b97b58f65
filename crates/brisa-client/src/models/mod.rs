use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Backend roles, normalized at the boundary. Anything the backend sends
/// that we do not recognize is preserved in `Unknown` instead of being
/// passed around as a loose string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    Administrador,
    Secretaria,
    Instructor,
    Alumno,
    Unknown(String),
}

impl Role {
    /// Normalize a raw backend role: strips the `ROLE_` prefix and maps
    /// onto the closed set.
    pub fn parse(raw: &str) -> Role {
        let clean = raw.trim();
        let clean = clean.strip_prefix("ROLE_").unwrap_or(clean);
        match clean {
            "ADMINISTRADOR" => Role::Administrador,
            "SECRETARIA" => Role::Secretaria,
            "INSTRUCTOR" => Role::Instructor,
            "ALUMNO" => Role::Alumno,
            other => Role::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Administrador => "ADMINISTRADOR",
            Role::Secretaria => "SECRETARIA",
            Role::Instructor => "INSTRUCTOR",
            Role::Alumno => "ALUMNO",
            Role::Unknown(s) => s,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The current user, as decoded from the bearer token. `id` may be
/// `None` until the directory lookup backfills it.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub id: Option<i64>,
    pub given_name: String,
    pub family_name: String,
    pub email: String,
    pub role: Option<Role>,
}

impl Identity {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    #[serde(rename = "INGRESO")]
    Ingreso,
    #[serde(rename = "EGRESO")]
    Egreso,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Ingreso => write!(f, "INGRESO"),
            TransactionKind::Egreso => write!(f, "EGRESO"),
        }
    }
}

/// The two named revenue recipients an income can be attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Igna,
    Jose,
}

impl Operator {
    /// Reads the raw `asignadoA` value. Unset, empty, `NINGUNO` and
    /// unrecognized values all mean "no operator".
    pub fn from_raw(raw: Option<&str>) -> Option<Operator> {
        match raw.map(str::trim) {
            Some("IGNA") => Some(Operator::Igna),
            Some("JOSE") => Some(Operator::Jose),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Igna => "IGNA",
            Operator::Jose => "JOSE",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One ledger entry. Dates travel as ISO `YYYY-MM-DD` strings, the same
/// form the API uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "tipoTransaccion")]
    pub kind: TransactionKind,
    #[serde(rename = "fecha")]
    pub date: String,
    #[serde(rename = "actividad")]
    pub activity: String,
    #[serde(rename = "descripcionActividad", default)]
    pub activity_detail: Option<String>,
    #[serde(rename = "vendedor", default)]
    pub seller: Option<String>,
    pub instructor: String,
    #[serde(rename = "detalles", default)]
    pub details: Option<String>,
    #[serde(rename = "cantidadHoras", default)]
    pub hours: Option<f64>,
    #[serde(rename = "tarifaPorHora", default)]
    pub rate_per_hour: Option<f64>,
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(rename = "moneda")]
    pub currency: String,
    #[serde(rename = "gastosAsociados", default)]
    pub associated_expenses: Option<f64>,
    #[serde(rename = "comision", default)]
    pub commission: Option<f64>,
    #[serde(rename = "formaPago", default)]
    pub payment_method: Option<String>,
    #[serde(rename = "detalleFormaPago", default)]
    pub payment_method_detail: Option<String>,
    #[serde(rename = "asignadoA", default)]
    pub assigned_to: Option<String>,
    #[serde(rename = "revisado", default)]
    pub reviewed: bool,
}

impl Transaction {
    pub fn operator(&self) -> Option<Operator> {
        Operator::from_raw(self.assigned_to.as_deref())
    }

    /// An EGRESO's cost is whichever amount was captured: the dedicated
    /// expense field, or the generic total as a fallback.
    pub fn effective_expense(&self) -> f64 {
        self.associated_expenses.or(self.total).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    #[serde(rename = "PENDIENTE")]
    Pendiente,
    #[serde(rename = "CONFIRMADA")]
    Confirmada,
    #[serde(rename = "RECHAZADA")]
    Rechazada,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pendiente => "PENDIENTE",
            BookingStatus::Confirmada => "CONFIRMADA",
            BookingStatus::Rechazada => "RECHAZADA",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A scheduled class awaiting instructor confirmation. `hora` arrives as
/// `HH:MM` or `HH:MM:SS`, both kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "alumno")]
    pub student: String,
    #[serde(rename = "fecha")]
    pub date: String,
    #[serde(rename = "hora")]
    pub time: String,
    #[serde(rename = "instructorId", default)]
    pub instructor_id: Option<i64>,
    #[serde(rename = "nombreInstructor", default)]
    pub instructor_name: Option<String>,
    #[serde(rename = "lugar", default)]
    pub place: Option<String>,
    #[serde(rename = "tarifa", default)]
    pub rate: Option<f64>,
    #[serde(rename = "horas", default)]
    pub hours: Option<f64>,
    #[serde(rename = "horasPagadas", default)]
    pub amount_paid: Option<f64>,
    #[serde(rename = "hotelDerivacion", default)]
    pub hotel_referral: Option<String>,
    #[serde(rename = "estado")]
    pub status: BookingStatus,
}

/// Directory entry from `GET /usuario`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub given_name: String,
    #[serde(rename = "apellido")]
    pub family_name: String,
    pub email: String,
    #[serde(rename = "rol", default)]
    pub role: String,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleEntry {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "nombre")]
    pub name: String,
}

/// Parses an ISO `YYYY-MM-DD` date string the way every screen needs it.
pub fn parse_iso_date(raw: &str) -> AppResult<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| AppError::Validation(format!("Invalid date '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_strips_backend_prefix() {
        assert_eq!(Role::parse("ROLE_ADMINISTRADOR"), Role::Administrador);
        assert_eq!(Role::parse("ROLE_SECRETARIA"), Role::Secretaria);
        assert_eq!(Role::parse("INSTRUCTOR"), Role::Instructor);
        assert_eq!(Role::parse("ALUMNO"), Role::Alumno);
    }

    #[test]
    fn unrecognized_roles_are_preserved_not_dropped() {
        assert_eq!(
            Role::parse("ROLE_ENFERMERO"),
            Role::Unknown("ENFERMERO".to_string())
        );
        assert_eq!(Role::parse("ENFERMERO").as_str(), "ENFERMERO");
    }

    #[test]
    fn operator_from_raw_treats_ninguno_as_unassigned() {
        assert_eq!(Operator::from_raw(Some("IGNA")), Some(Operator::Igna));
        assert_eq!(Operator::from_raw(Some("JOSE")), Some(Operator::Jose));
        assert_eq!(Operator::from_raw(Some("NINGUNO")), None);
        assert_eq!(Operator::from_raw(Some("")), None);
        assert_eq!(Operator::from_raw(None), None);
        assert_eq!(Operator::from_raw(Some("  JOSE  ")), Some(Operator::Jose));
    }

    #[test]
    fn effective_expense_prefers_the_dedicated_field() {
        let mut tx = sample_expense();
        assert_eq!(tx.effective_expense(), 30.0);

        tx.associated_expenses = None;
        tx.total = Some(45.0);
        assert_eq!(tx.effective_expense(), 45.0);

        tx.total = None;
        assert_eq!(tx.effective_expense(), 0.0);
    }

    #[test]
    fn transaction_wire_names_round_trip() {
        let json = r#"{
            "id": 3,
            "tipoTransaccion": "INGRESO",
            "fecha": "2025-11-02",
            "actividad": "Clase de Kite",
            "instructor": "Ana Diaz",
            "cantidadHoras": 2.0,
            "tarifaPorHora": 50.0,
            "total": 100.0,
            "moneda": "USD",
            "asignadoA": "IGNA",
            "revisado": true
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.kind, TransactionKind::Ingreso);
        assert_eq!(tx.operator(), Some(Operator::Igna));
        assert!(tx.reviewed);
        assert_eq!(tx.payment_method, None);
    }

    #[test]
    fn booking_status_round_trips_through_wire_form() {
        let json = r#"{
            "id": 9,
            "alumno": "Marta",
            "fecha": "2025-11-02",
            "hora": "10:00:00",
            "instructorId": 4,
            "estado": "PENDIENTE"
        }"#;
        let booking: Booking = serde_json::from_str(json).unwrap();
        assert_eq!(booking.status, BookingStatus::Pendiente);
        assert_eq!(booking.status.as_str(), "PENDIENTE");
    }

    fn sample_expense() -> Transaction {
        Transaction {
            id: Some(1),
            kind: TransactionKind::Egreso,
            date: "2025-11-01".to_string(),
            activity: "Gastos".to_string(),
            activity_detail: None,
            seller: None,
            instructor: "Ana Diaz".to_string(),
            details: Some("Pago de lancha".to_string()),
            hours: None,
            rate_per_hour: None,
            total: None,
            currency: "USD".to_string(),
            associated_expenses: Some(30.0),
            commission: None,
            payment_method: Some("Efectivo".to_string()),
            payment_method_detail: None,
            assigned_to: None,
            reviewed: false,
        }
    }
}
