use serde::{Deserialize, Serialize};

/// Purchase document (`compras`). Older app versions wrote `estado` and
/// `usuarioId`; both spellings are still read.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct OrderDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estado_pedido: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estado: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usuario_id: Option<String>,
    #[serde(rename = "usuarioId", default, skip_serializing_if = "Option::is_none")]
    pub usuario_id_legacy: Option<String>,
}

impl OrderDocument {
    /// Trimmed, lower-cased status; empty when unset.
    pub fn normalized_status(&self) -> String {
        first_non_empty(&self.estado_pedido, &self.estado)
            .unwrap_or_default()
            .trim()
            .to_lowercase()
    }

    pub fn buyer_id(&self) -> Option<&str> {
        first_non_empty(&self.usuario_id, &self.usuario_id_legacy)
    }
}

fn first_non_empty<'a>(primary: &'a Option<String>, fallback: &'a Option<String>) -> Option<&'a str> {
    primary
        .as_deref()
        .filter(|v| !v.is_empty())
        .or_else(|| fallback.as_deref().filter(|v| !v.is_empty()))
}

/// Update event delivered for an order document.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct OrderUpdateEvent {
    #[serde(default)]
    pub before: Option<OrderDocument>,
    #[serde(default)]
    pub after: Option<OrderDocument>,
}
