//! Picking list export for the workshop floor.

use std::fmt::Write;

use crate::orders::OrderView;

/// Render a plain-text picking list for one order.
pub fn render_picking_list(view: &OrderView) -> String {
    let order = &view.order;
    let p = order.purchaser();
    let mut out = String::new();

    let _ = writeln!(out, "PICKING LIST");
    let _ = writeln!(out, "Order:    {}", order.id());
    let _ = writeln!(out, "Placed:   {}", order.created_at().format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(out, "Status:   {}", order.status());
    let _ = writeln!(out);
    let _ = writeln!(out, "Customer: {} <{}>", p.display_name, p.email);
    if !p.company_name.is_empty() {
        let _ = writeln!(out, "Company:  {}", p.company_name);
    }
    if !p.mobile_number.is_empty() {
        let _ = writeln!(out, "Mobile:   {}", p.mobile_number);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{:<16} {:<32} {:<6} {:>4}", "SKU", "ITEM", "SIZE", "QTY");

    for l in &view.lines {
        let (sku, name) = match &l.product {
            Some(product) => (product.sku().to_string(), product.name().to_string()),
            None => ("-".to_string(), format!("missing product {}", l.line.product_id)),
        };
        let _ = writeln!(
            out,
            "{:<16} {:<32} {:<6} {:>4}",
            sku, name, l.line.size, l.line.quantity
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Total units: {}", order.total_units());
    let _ = writeln!(out, "Total value: {}", view.total());
    out
}
