use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Utc};
use serde::Deserialize;

use crate::errors::{AppError, Result};

/// Money or quantity as sent by the app: a JSON number or a numeric string.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    pub fn value(&self) -> f64 {
        match self {
            Amount::Number(n) => *n,
            Amount::Text(s) => s.trim().parse().unwrap_or(0.0),
        }
    }

    /// Zero, NaN and the empty string count as "not provided".
    pub fn is_present(&self) -> bool {
        match self {
            Amount::Number(n) => *n != 0.0 && !n.is_nan(),
            Amount::Text(s) => !s.is_empty(),
        }
    }
}

fn present(amount: &Option<Amount>) -> Option<&Amount> {
    amount.as_ref().filter(|a| a.is_present())
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ReceiptProduct {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub cantidad: Option<Amount>,
    #[serde(default)]
    pub unidad: Option<String>,
    #[serde(default)]
    pub precio_unitario: Option<Amount>,
    #[serde(default)]
    pub precio: Option<Amount>,
    #[serde(default)]
    pub precio_total: Option<Amount>,
    #[serde(default)]
    pub subtotal: Option<Amount>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptRequest {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub total: Option<Amount>,
    #[serde(default)]
    pub productos: Option<Vec<ReceiptProduct>>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub subtotal: Option<Amount>,
    #[serde(default)]
    pub envio: Option<Amount>,
    #[serde(default)]
    pub impuestos: Option<Amount>,
    #[serde(default)]
    pub ciudad: Option<String>,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub direccion_entrega: Option<String>,
    #[serde(default)]
    pub metodo_pago: Option<String>,
    #[serde(default)]
    pub fecha_compra: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: f64,
    pub unit: Option<String>,
    pub unit_price: f64,
    pub line_total: f64,
}

impl From<&ReceiptProduct> for ReceiptLine {
    fn from(p: &ReceiptProduct) -> Self {
        let unit_price = present(&p.precio_unitario)
            .or_else(|| present(&p.precio))
            .map(Amount::value)
            .unwrap_or(0.0);
        let quantity = present(&p.cantidad).map(Amount::value).unwrap_or(1.0);
        let line_total = present(&p.precio_total)
            .or_else(|| present(&p.subtotal))
            .map(Amount::value)
            .unwrap_or(unit_price * quantity);

        Self {
            name: non_empty(&p.nombre).unwrap_or_else(|| "Producto".to_string()),
            quantity,
            unit: non_empty(&p.unidad),
            unit_price,
            line_total,
        }
    }
}

/// A validated receipt ready to be rendered.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub order_id: String,
    pub email: String,
    pub customer_name: String,
    pub date_label: String,
    pub lines: Vec<ReceiptLine>,
    pub subtotal: Option<f64>,
    pub shipping: Option<f64>,
    pub taxes: Option<f64>,
    pub total: f64,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub delivery_address: Option<String>,
    pub payment_method: Option<String>,
}

impl ReceiptRequest {
    pub fn into_receipt(self, now: DateTime<Utc>) -> Result<Receipt> {
        let missing = || AppError::invalid_data("Email, orderId, total and productos are required");

        let email = non_empty(&self.user_email).ok_or_else(missing)?;
        let order_id = non_empty(&self.order_id).ok_or_else(missing)?;
        let total = present(&self.total).map(Amount::value).ok_or_else(missing)?;
        let products = self.productos.as_ref().ok_or_else(missing)?;

        let date_label = match non_empty(&self.fecha_compra) {
            Some(raw) => parse_purchase_date(&raw)
                .map(format_long_date)
                .unwrap_or_else(|| format_short_date(now)),
            None => format_short_date(now),
        };

        Ok(Receipt {
            order_id,
            email,
            customer_name: non_empty(&self.user_name).unwrap_or_else(|| "Cliente".to_string()),
            date_label,
            lines: products.iter().map(ReceiptLine::from).collect(),
            subtotal: present(&self.subtotal).map(Amount::value),
            shipping: present(&self.envio).map(Amount::value),
            taxes: present(&self.impuestos).map(Amount::value),
            total,
            city: non_empty(&self.ciudad),
            phone: non_empty(&self.telefono),
            delivery_address: non_empty(&self.direccion_entrega),
            payment_method: non_empty(&self.metodo_pago),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

const MONTHS_ES: [&str; 12] = [
    "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto", "septiembre",
    "octubre", "noviembre", "diciembre",
];

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD` or epoch millis.
pub fn parse_purchase_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|d| d.and_utc());
    }
    raw.parse::<i64>().ok().and_then(DateTime::<Utc>::from_timestamp_millis)
}

pub fn format_long_date(at: DateTime<Utc>) -> String {
    format!(
        "{} de {} de {}, {:02}:{:02}",
        at.day(),
        MONTHS_ES[at.month0() as usize],
        at.year(),
        at.hour(),
        at.minute()
    )
}

pub fn format_short_date(at: DateTime<Utc>) -> String {
    format!("{}/{}/{}", at.day(), at.month(), at.year())
}

pub fn format_money(value: f64) -> String {
    format!("${:.2}", value)
}

pub fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn request(value: serde_json::Value) -> ReceiptRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn required_fields_are_enforced() {
        let now = Utc::now();
        let err = request(json!({ "orderId": "o1", "total": 10, "productos": [] }))
            .into_receipt(now)
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let zero_total = request(json!({
            "orderId": "o1", "userEmail": "a@b.com", "total": 0, "productos": []
        }))
        .into_receipt(now);
        assert!(zero_total.is_err());
    }

    #[test]
    fn product_prices_fall_back_through_aliases() {
        let product: ReceiptProduct = serde_json::from_value(json!({
            "nombre": "Tomate",
            "cantidad": 3,
            "precio": "2.5",
            "unidad": "kg",
        }))
        .unwrap();
        let line = ReceiptLine::from(&product);
        assert_eq!(line.name, "Tomate");
        assert_eq!(line.unit_price, 2.5);
        assert_eq!(line.line_total, 7.5);
        assert_eq!(line.unit.as_deref(), Some("kg"));

        let explicit: ReceiptProduct = serde_json::from_value(json!({
            "precio_unitario": 4, "precio_total": 9, "subtotal": 100
        }))
        .unwrap();
        let line = ReceiptLine::from(&explicit);
        assert_eq!(line.name, "Producto");
        assert_eq!(line.quantity, 1.0);
        assert_eq!(line.line_total, 9.0);
    }

    #[test]
    fn optional_amounts_are_none_when_zero_or_missing() {
        let receipt = request(json!({
            "orderId": "o1",
            "userEmail": "a@b.com",
            "total": "120.5",
            "productos": [],
            "envio": 0,
            "impuestos": "3",
        }))
        .into_receipt(Utc::now())
        .unwrap();
        assert_eq!(receipt.total, 120.5);
        assert_eq!(receipt.subtotal, None);
        assert_eq!(receipt.shipping, None);
        assert_eq!(receipt.taxes, Some(3.0));
        assert_eq!(receipt.customer_name, "Cliente");
    }

    #[test]
    fn purchase_date_is_rendered_in_spanish() {
        let at = parse_purchase_date("2026-10-16T14:05:00Z").unwrap();
        assert_eq!(format_long_date(at), "16 de octubre de 2026, 14:05");

        let now = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        let receipt = request(json!({
            "orderId": "o1", "userEmail": "a@b.com", "total": 1, "productos": [],
            "fechaCompra": "not a date",
        }))
        .into_receipt(now)
        .unwrap();
        assert_eq!(receipt.date_label, "2/3/2026");
    }

    #[test]
    fn money_and_quantity_formatting() {
        assert_eq!(format_money(7.5), "$7.50");
        assert_eq!(format_quantity(3.0), "3");
        assert_eq!(format_quantity(1.5), "1.5");
    }
}
