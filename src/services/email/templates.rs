//! Customer-facing email bodies.

use super::OutgoingEmail;
use crate::models::receipt::{format_money, format_quantity, Receipt, ReceiptLine};

const BRAND: &str = "🌾 AgroMarket";

const BASE_STYLE: &str = r#"
    body { font-family: -apple-system, 'Segoe UI', Roboto, Arial, sans-serif; line-height: 1.6; color: #333; background: #eef2f5; margin: 0; padding: 20px; }
    .container { max-width: 640px; margin: 0 auto; background: #fff; border-radius: 14px; overflow: hidden; }
    .header { background: #2E7D32; color: #fff; padding: 32px 24px; text-align: center; }
    .header h1 { margin: 0 0 6px; font-size: 28px; }
    .header h2 { margin: 0; font-size: 18px; font-weight: 400; }
    .content { padding: 32px; }
    .muted { color: #666; font-size: 15px; }
    .footer { background: #f5f7f8; padding: 24px; text-align: center; font-size: 13px; color: #777; }
    .signature { font-weight: 600; color: #2E7D32; }
"#;

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(heading: &str, extra_style: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <style>{base}{extra}</style>
</head>
<body>
  <div class="container">
    <div class="header">
      <h1>{brand}</h1>
      <h2>{heading}</h2>
    </div>
    <div class="content">
{content}
    </div>
    <div class="footer">
      <p class="signature">Saludos,<br>El equipo de AgroMarket</p>
      <p><em>Este es un correo automático, por favor no respondas a este mensaje.</em></p>
    </div>
  </div>
</body>
</html>"#,
        base = BASE_STYLE,
        extra = extra_style,
        brand = BRAND,
        heading = heading,
        content = content,
    )
}

/// Email carrying a password-reset code.
pub fn reset_code_email(to: &str, code: &str, ttl_minutes: i64) -> OutgoingEmail {
    let style = r#"
    .code-box { background: #f3f6f4; border: 2px dashed #2E7D32; border-radius: 12px; padding: 24px; text-align: center; margin: 24px 0; }
    .code { font-size: 44px; font-weight: 700; letter-spacing: 8px; color: #2E7D32; font-family: 'Courier New', monospace; }
    .warning { background: #fff3cd; border-left: 4px solid #ffc107; padding: 14px; border-radius: 8px; color: #856404; }
"#;
    let content = format!(
        r#"      <p><strong>Hola,</strong></p>
      <p class="muted">Has solicitado restablecer tu contraseña. Usa el siguiente código de verificación:</p>
      <div class="code-box">
        <p class="muted">Tu código de verificación es:</p>
        <div class="code">{code}</div>
      </div>
      <div class="warning"><strong>⚠️ Importante:</strong> Este código expirará en {ttl} minutos. No compartas este código con nadie.</div>
      <p class="muted">Si no solicitaste este código, puedes ignorar este correo de forma segura.</p>"#,
        code = escape_html(code),
        ttl = ttl_minutes,
    );

    let text = format!(
        "{BRAND} - Recuperación de Contraseña\n\n\
         Hola,\n\n\
         Has solicitado restablecer tu contraseña. Usa el siguiente código de verificación:\n\n\
         Código: {code}\n\n\
         ⚠️ IMPORTANTE: Este código expirará en {ttl_minutes} minutos. No compartas este código con nadie.\n\n\
         Si no solicitaste este código, puedes ignorar este correo de forma segura.\n\n\
         Saludos,\n\
         El equipo de AgroMarket"
    );

    OutgoingEmail {
        to: to.to_string(),
        subject: "Código de Recuperación de Contraseña - AgroMarket".to_string(),
        html: page("Recuperación de Contraseña", style, &content),
        text,
    }
}

fn receipt_row(line: &ReceiptLine) -> String {
    let unit = line
        .unit
        .as_deref()
        .map(|u| format!(r#"<br><span class="muted">{}</span>"#, escape_html(u)))
        .unwrap_or_default();
    format!(
        r#"          <tr>
            <td><strong>{name}</strong>{unit}</td>
            <td class="center">{qty}</td>
            <td class="right">{price}</td>
            <td class="right total">{line_total}</td>
          </tr>
"#,
        name = escape_html(&line.name),
        unit = unit,
        qty = format_quantity(line.quantity),
        price = format_money(line.unit_price),
        line_total = format_money(line.line_total),
    )
}

/// Purchase receipt with a product table and totals summary.
pub fn receipt_email(receipt: &Receipt) -> OutgoingEmail {
    let style = r#"
    .order-info { background: #f5f7f8; border-left: 4px solid #2E7D32; border-radius: 10px; padding: 20px; margin: 20px 0; }
    .order-info strong { color: #2E7D32; display: inline-block; min-width: 140px; }
    table { width: 100%; border-collapse: collapse; margin: 24px 0; }
    th { background: #2E7D32; color: #fff; padding: 12px; text-align: left; font-size: 13px; text-transform: uppercase; }
    td { padding: 12px; border-bottom: 1px solid #e0e0e0; }
    .center { text-align: center; }
    .right { text-align: right; }
    td.total { font-weight: 600; color: #2E7D32; }
    .summary { background: #f5f7f8; border-radius: 10px; padding: 20px; }
    .summary-row { display: flex; justify-content: space-between; padding: 6px 0; }
    .grand-total { border-top: 2px solid #2E7D32; margin-top: 10px; padding-top: 10px; font-size: 20px; font-weight: 700; color: #2E7D32; }
"#;

    let mut details = String::new();
    let optional = [
        ("Ciudad", &receipt.city),
        ("Teléfono", &receipt.phone),
        ("Dirección de Entrega", &receipt.delivery_address),
        ("Método de Pago", &receipt.payment_method),
    ];
    for (label, value) in optional.iter() {
        if let Some(value) = value {
            details.push_str(&format!(
                "        <p><strong>{}:</strong> {}</p>\n",
                label,
                escape_html(value)
            ));
        }
    }

    let rows: String = receipt.lines.iter().map(receipt_row).collect();

    let content = format!(
        r#"      <p>Hola <strong>{name}</strong>,</p>
      <p class="muted">Gracias por tu compra. Aquí está el detalle de tu pedido:</p>
      <div class="order-info">
        <p><strong>Número de Orden:</strong> <code>{order_id}</code></p>
        <p><strong>Fecha:</strong> {date}</p>
{details}      </div>
      <table>
        <thead>
          <tr><th>Producto</th><th class="center">Cantidad</th><th class="right">Precio Unit.</th><th class="right">Subtotal</th></tr>
        </thead>
        <tbody>
{rows}        </tbody>
      </table>
      <div class="summary">
        <div class="summary-row"><span>Subtotal:</span><span>{subtotal}</span></div>
        <div class="summary-row"><span>Envío:</span><span>{shipping}</span></div>
        <div class="summary-row"><span>Impuestos:</span><span>{taxes}</span></div>
        <div class="summary-row grand-total"><span>Total:</span><span>{total}</span></div>
      </div>
      <p class="muted">Si tienes alguna pregunta sobre tu pedido, no dudes en contactarnos.</p>"#,
        name = escape_html(&receipt.customer_name),
        order_id = escape_html(&receipt.order_id),
        date = escape_html(&receipt.date_label),
        details = details,
        rows = rows,
        subtotal = format_money(receipt.subtotal.unwrap_or(0.0)),
        shipping = format_money(receipt.shipping.unwrap_or(0.0)),
        taxes = format_money(receipt.taxes.unwrap_or(0.0)),
        total = format_money(receipt.total),
    );

    OutgoingEmail {
        to: receipt.email.clone(),
        subject: format!("Comprobante de Compra - Orden {}", receipt.order_id),
        html: page("Comprobante de Compra", style, &content),
        text: receipt_text(receipt),
    }
}

fn receipt_text(receipt: &Receipt) -> String {
    let mut lines = vec![
        format!("{} - Comprobante de Compra", BRAND),
        String::new(),
        format!("Hola {},", receipt.customer_name),
        String::new(),
        "Gracias por tu compra. Aquí está el detalle de tu pedido:".to_string(),
        String::new(),
        format!("Número de Orden: {}", receipt.order_id),
        format!("Fecha: {}", receipt.date_label),
    ];

    let optional = [
        ("Ciudad", &receipt.city),
        ("Teléfono", &receipt.phone),
        ("Dirección", &receipt.delivery_address),
        ("Método de Pago", &receipt.payment_method),
    ];
    lines.extend(
        optional
            .iter()
            .filter_map(|(label, value)| value.as_ref().map(|v| format!("{}: {}", label, v))),
    );

    lines.push(String::new());
    lines.push("Productos:".to_string());
    lines.extend(receipt.lines.iter().map(|line| {
        format!(
            "- {} x{} - {} c/u - Total: {}",
            line.name,
            format_quantity(line.quantity),
            format_money(line.unit_price),
            format_money(line.line_total)
        )
    }));
    lines.push(String::new());

    let amounts = [
        ("Subtotal", receipt.subtotal),
        ("Envío", receipt.shipping),
        ("Impuestos", receipt.taxes),
    ];
    lines.extend(
        amounts
            .iter()
            .filter_map(|(label, value)| value.map(|v| format!("{}: {}", label, format_money(v)))),
    );
    lines.push(format!("Total: {}", format_money(receipt.total)));
    lines.push(String::new());
    lines.push("Saludos,".to_string());
    lines.push("El equipo de AgroMarket".to_string());

    lines.join("\n")
}
