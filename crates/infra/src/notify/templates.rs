//! Plain-text bodies for transactional notifications.

use std::fmt::Write;

use atelier_parties::UserAccount;

use crate::orders::OrderView;

use super::Notification;

fn describe_lines(view: &OrderView) -> String {
    let mut out = String::new();
    for l in &view.lines {
        let name = l.product.as_ref().map_or("(unavailable)", |p| p.name());
        let _ = writeln!(out, "  - {name} (size {}) x {}", l.line.size, l.line.quantity);
    }
    out
}

pub fn order_confirmed(view: &OrderView) -> Notification {
    let p = view.order.purchaser();
    let body = format!(
        "Dear {name},\n\n\
         Your order {id} has been confirmed.\n\n\
         Items:\n{lines}\n\
         Total: {total}\n\n\
         We will be in touch about fitting and delivery.\n",
        name = p.display_name,
        id = view.order.id(),
        lines = describe_lines(view),
        total = view.total(),
    );
    Notification {
        to: p.email.clone(),
        subject: format!("Order {} confirmed", view.order.id()),
        body,
    }
}

pub fn order_rejected(view: &OrderView) -> Notification {
    let p = view.order.purchaser();
    let body = format!(
        "Dear {name},\n\n\
         We are sorry, but your order {id} could not be accepted.\n\n\
         Items:\n{lines}\n\
         No payment has been taken. Please contact us if you have any questions.\n",
        name = p.display_name,
        id = view.order.id(),
        lines = describe_lines(view),
    );
    Notification {
        to: p.email.clone(),
        subject: format!("Order {} was not accepted", view.order.id()),
        body,
    }
}

pub fn account_approved(account: &UserAccount) -> Notification {
    Notification {
        to: account.email().to_string(),
        subject: "Your account has been approved".to_string(),
        body: format!(
            "Dear {},\n\nYour account is now active and you can place orders.\n",
            account.display_name()
        ),
    }
}

pub fn campaign(to: &str, subject: &str, content: &str) -> Notification {
    Notification {
        to: to.to_string(),
        subject: subject.to_string(),
        body: format!("{content}\n\n--\nYou are receiving this because you subscribed to our newsletter.\n"),
    }
}
