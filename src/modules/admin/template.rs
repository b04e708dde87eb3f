//! Security PIN email template.

use kitab_mail::OutgoingMail;

pub const SUBJECT: &str = "Your Admin Security PIN";

/// Render the PIN message from `from` to `to`.
pub fn render_pin_mail(from: &str, to: &str, pin: &str) -> OutgoingMail {
    let text = format!("Your Admin PIN is: {}", pin);
    let html = format!(
        "<h2>KitabCorner Admin Access</h2>\n\
         <p>Your security PIN is:</p>\n\
         <h1>{}</h1>\n\
         <p>Use this PIN to log into the Admin Panel.</p>\n",
        escape_html(pin)
    );

    OutgoingMail {
        from: from.to_string(),
        to: to.to_string(),
        subject: SUBJECT.to_string(),
        text,
        html,
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_appears_in_both_bodies() {
        let mail = render_pin_mail("KitabCorner Admin <admin@kitab.test>", "a@b.com", "1234");

        assert_eq!(mail.subject, "Your Admin Security PIN");
        assert_eq!(mail.to, "a@b.com");
        assert_eq!(mail.from, "KitabCorner Admin <admin@kitab.test>");
        assert_eq!(mail.text, "Your Admin PIN is: 1234");
        assert!(mail.html.contains("<h1>1234</h1>"));
        assert!(mail.html.starts_with("<h2>KitabCorner Admin Access</h2>"));
    }

    #[test]
    fn markup_in_pin_is_escaped() {
        let mail = render_pin_mail("admin@kitab.test", "a@b.com", "<b>12</b>");
        assert!(mail.html.contains("<h1>&lt;b&gt;12&lt;/b&gt;</h1>"));
        assert_eq!(mail.text, "Your Admin PIN is: <b>12</b>");
    }
}
