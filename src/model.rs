//! Request records and JSON intake.
//!
//! Bodies arrive in the two endpoint shapes:
//!
//! ```json
//! {"items": [{"id": "P1", "name": "Widget", "qty": 10, "weight": 2.5}]}
//! {"cart": [{"id": "P1", "name": "Widget", "orderQty": 2, "weight": 2.5}], "totalWeight": "5.00"}
//! ```
//!
//! Intake is lenient about shape and strict about values: ids and names are
//! trimmed, numbers may be JSON numbers or numeric strings, missing fields
//! default to empty or zero. Non-numeric, non-finite or negative values fail
//! with [`Error::InvalidRecord`] naming the record.
//!
//! [`DocumentRequest`] itself (de)serialises as an internally tagged enum:
//! `{"kind": "inbound", "items": [...]}` / `{"kind": "outbound", "cart": [...], "totalWeight": ...}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::pipeline::DocumentKind;

/// One item of an inbound shipment.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    /// Item identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Received quantity
    pub quantity: f64,
    /// Weight per unit in kg
    pub unit_weight: f64,
}

/// One line of an outbound order.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    /// The item being picked
    pub item: LineItem,
    /// Quantity to pick, always positive
    pub ordered_quantity: f64,
}

impl CartLine {
    /// `unit_weight × ordered_quantity`.
    pub fn line_weight(&self) -> f64 {
        self.item.unit_weight * self.ordered_quantity
    }
}

/// Caller-supplied order total, printed exactly as given.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TotalWeight(pub String);

impl std::fmt::Display for TotalWeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated document request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRequest", into = "RawRequest")]
pub enum DocumentRequest {
    /// Inbound shipment receipt plus product labels
    Inbound {
        /// Received items in input order
        items: Vec<LineItem>,
    },
    /// Outbound picking list
    Outbound {
        /// Order lines in input order
        cart: Vec<CartLine>,
        /// Total printed in the summary line
        total_weight: TotalWeight,
    },
}

impl DocumentRequest {
    /// Which document this request produces.
    pub fn kind(&self) -> DocumentKind {
        match self {
            DocumentRequest::Inbound { .. } => DocumentKind::Inbound,
            DocumentRequest::Outbound { .. } => DocumentKind::Outbound,
        }
    }

    /// Number of input records.
    pub fn record_count(&self) -> usize {
        match self {
            DocumentRequest::Inbound { items } => items.len(),
            DocumentRequest::Outbound { cart, .. } => cart.len(),
        }
    }

    /// Parse an endpoint-shaped JSON body for `kind`.
    pub fn from_body(kind: DocumentKind, body: &[u8]) -> Result<Self> {
        match kind {
            DocumentKind::Inbound => serde_json::from_slice::<InboundBody>(body)?.try_into(),
            DocumentKind::Outbound => serde_json::from_slice::<OutboundBody>(body)?.try_into(),
        }
    }
}

/// Inbound endpoint body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InboundBody {
    /// Raw items; absent means none
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<RawLineItem>,
}

/// Outbound endpoint body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutboundBody {
    /// Raw cart lines; absent means none
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cart: Vec<RawLineItem>,
    /// Total weight as sent
    #[serde(rename = "totalWeight", default)]
    pub total_weight: Value,
}

/// A record as it arrives, before normalisation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLineItem {
    /// Identifier (string or number)
    #[serde(default)]
    pub id: Value,
    /// Display name
    #[serde(default)]
    pub name: Value,
    /// Inbound quantity
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub qty: Value,
    /// Outbound quantity
    #[serde(rename = "orderQty", default, skip_serializing_if = "Value::is_null")]
    pub order_qty: Value,
    /// Unit weight
    #[serde(default)]
    pub weight: Value,
}

/// Wire form of [`DocumentRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RawRequest {
    /// Inbound body
    Inbound(InboundBody),
    /// Outbound body
    Outbound(OutboundBody),
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<RawLineItem>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<RawLineItem>>::deserialize(deserializer)?.unwrap_or_default())
}

fn invalid(index: usize, reason: impl Into<String>) -> Error {
    Error::InvalidRecord {
        index,
        reason: reason.into(),
    }
}

fn text_field(value: &Value, index: usize, field: &str) -> Result<String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(invalid(index, format!("{} must be text", field))),
    }
}

fn number_field(value: &Value, index: usize, field: &str) -> Result<f64> {
    let number = match value {
        Value::Null => 0.0,
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| invalid(index, format!("{} is out of range", field)))?,
        Value::String(s) if s.trim().is_empty() => 0.0,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid(index, format!("{} is not a number: {:?}", field, s)))?,
        _ => return Err(invalid(index, format!("{} must be a number", field))),
    };

    if !number.is_finite() {
        return Err(invalid(index, format!("{} is not finite", field)));
    }
    if number < 0.0 {
        return Err(invalid(index, format!("{} is negative", field)));
    }
    Ok(number)
}

impl RawLineItem {
    fn line_item(&self, index: usize) -> Result<LineItem> {
        Ok(LineItem {
            id: text_field(&self.id, index, "id")?,
            name: text_field(&self.name, index, "name")?,
            quantity: number_field(&self.qty, index, "qty")?,
            unit_weight: number_field(&self.weight, index, "weight")?,
        })
    }

    fn cart_line(&self, index: usize) -> Result<CartLine> {
        let item = self.line_item(index)?;
        let ordered_quantity = number_field(&self.order_qty, index, "orderQty")?;
        if ordered_quantity <= 0.0 {
            return Err(invalid(index, "orderQty must be greater than zero"));
        }
        Ok(CartLine {
            item,
            ordered_quantity,
        })
    }
}

fn total_weight(value: &Value) -> Result<TotalWeight> {
    match value {
        Value::Null => Ok(TotalWeight("0".to_string())),
        Value::String(s) => Ok(TotalWeight(s.clone())),
        Value::Number(n) => Ok(TotalWeight(n.to_string())),
        _ => Err(Error::InvalidRecord {
            index: 0,
            reason: "totalWeight must be a string or a number".to_string(),
        }),
    }
}

impl TryFrom<InboundBody> for DocumentRequest {
    type Error = Error;

    fn try_from(body: InboundBody) -> Result<Self> {
        let items = body
            .items
            .iter()
            .enumerate()
            .map(|(i, raw)| raw.line_item(i))
            .collect::<Result<Vec<_>>>()?;
        Ok(DocumentRequest::Inbound { items })
    }
}

impl TryFrom<OutboundBody> for DocumentRequest {
    type Error = Error;

    fn try_from(body: OutboundBody) -> Result<Self> {
        let cart = body
            .cart
            .iter()
            .enumerate()
            .map(|(i, raw)| raw.cart_line(i))
            .collect::<Result<Vec<_>>>()?;
        Ok(DocumentRequest::Outbound {
            cart,
            total_weight: total_weight(&body.total_weight)?,
        })
    }
}

impl TryFrom<RawRequest> for DocumentRequest {
    type Error = Error;

    fn try_from(raw: RawRequest) -> Result<Self> {
        match raw {
            RawRequest::Inbound(body) => body.try_into(),
            RawRequest::Outbound(body) => body.try_into(),
        }
    }
}

fn number_value(n: f64) -> Value {
    serde_json::Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn raw_item(item: &LineItem) -> RawLineItem {
    RawLineItem {
        id: Value::String(item.id.clone()),
        name: Value::String(item.name.clone()),
        qty: Value::Null,
        order_qty: Value::Null,
        weight: number_value(item.unit_weight),
    }
}

impl From<DocumentRequest> for RawRequest {
    fn from(request: DocumentRequest) -> Self {
        match request {
            DocumentRequest::Inbound { items } => RawRequest::Inbound(InboundBody {
                items: items
                    .iter()
                    .map(|item| RawLineItem {
                        qty: number_value(item.quantity),
                        ..raw_item(item)
                    })
                    .collect(),
            }),
            DocumentRequest::Outbound { cart, total_weight } => RawRequest::Outbound(OutboundBody {
                cart: cart
                    .iter()
                    .map(|line| RawLineItem {
                        order_qty: number_value(line.ordered_quantity),
                        ..raw_item(&line.item)
                    })
                    .collect(),
                total_weight: Value::String(total_weight.0),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_body() {
        let body = br#"{"items":[{"id":" P1 ","name":"Widget","qty":10,"weight":2.5},{"id":7,"name":"Gadget","qty":"3","weight":"1.0"}]}"#;
        let request = DocumentRequest::from_body(DocumentKind::Inbound, body).unwrap();
        let DocumentRequest::Inbound { items } = request else {
            panic!("expected inbound request");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "P1");
        assert_eq!(items[0].quantity, 10.0);
        assert_eq!(items[1].id, "7");
        assert_eq!(items[1].quantity, 3.0);
        assert_eq!(items[1].unit_weight, 1.0);
    }

    #[test]
    fn test_missing_items_is_empty() {
        for body in [&b"{}"[..], br#"{"items":null}"#] {
            let request = DocumentRequest::from_body(DocumentKind::Inbound, body).unwrap();
            assert_eq!(request.record_count(), 0);
        }
    }

    #[test]
    fn test_missing_fields_default() {
        let request = DocumentRequest::from_body(DocumentKind::Inbound, br#"{"items":[{}]}"#).unwrap();
        let DocumentRequest::Inbound { items } = request else {
            panic!("expected inbound request");
        };
        assert_eq!(items[0].id, "");
        assert_eq!(items[0].quantity, 0.0);
    }

    #[test]
    fn test_invalid_number_names_record() {
        let body = br#"{"items":[{"id":"P1","qty":1},{"id":"P2","qty":"lots"}]}"#;
        let err = DocumentRequest::from_body(DocumentKind::Inbound, body).unwrap_err();
        match err {
            Error::InvalidRecord { index, reason } => {
                assert_eq!(index, 1);
                assert!(reason.contains("qty"));
            },
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_negative_weight_rejected() {
        let body = br#"{"items":[{"id":"P1","qty":1,"weight":-2}]}"#;
        assert!(matches!(
            DocumentRequest::from_body(DocumentKind::Inbound, body),
            Err(Error::InvalidRecord { index: 0, .. })
        ));
    }

    #[test]
    fn test_outbound_body() {
        let body = br#"{"cart":[{"id":"P1","name":"Widget","orderQty":4,"weight":2.5}],"totalWeight":"99.99"}"#;
        let request = DocumentRequest::from_body(DocumentKind::Outbound, body).unwrap();
        let DocumentRequest::Outbound { cart, total_weight } = request else {
            panic!("expected outbound request");
        };
        assert_eq!(cart[0].line_weight(), 10.0);
        assert_eq!(total_weight.to_string(), "99.99");
    }

    #[test]
    fn test_outbound_total_number() {
        let body = br#"{"cart":[],"totalWeight":12.5}"#;
        let request = DocumentRequest::from_body(DocumentKind::Outbound, body).unwrap();
        assert!(matches!(
            request,
            DocumentRequest::Outbound { total_weight, .. } if total_weight.0 == "12.5"
        ));
    }

    #[test]
    fn test_zero_order_qty_rejected() {
        let body = br#"{"cart":[{"id":"P1","orderQty":0,"weight":1}],"totalWeight":0}"#;
        assert!(matches!(
            DocumentRequest::from_body(DocumentKind::Outbound, body),
            Err(Error::InvalidRecord { index: 0, .. })
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            DocumentRequest::from_body(DocumentKind::Inbound, b"{not json"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_tagged_round_trip() {
        let json = r#"{"kind":"outbound","cart":[{"id":"P1","name":"Widget","orderQty":2,"weight":1.5}],"totalWeight":"3"}"#;
        let request: DocumentRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.kind(), DocumentKind::Outbound);

        let back = serde_json::to_string(&request).unwrap();
        let again: DocumentRequest = serde_json::from_str(&back).unwrap();
        assert_eq!(request, again);
    }
}
