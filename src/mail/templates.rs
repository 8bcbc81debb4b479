//! Account lifecycle message bodies.

use super::OutgoingMail;

/// Activation message sent after registration. The link is valid for 24 hours.
pub fn activation_email(to: &str, first_name: &str, activation_url: &str) -> OutgoingMail {
    let name = escape_html(first_name);
    let url = escape_html(activation_url);

    let text = format!(
        "Welcome to DriveClone!\n\n\
         Hi {first_name},\n\n\
         Thanks for signing up. Activate your account by visiting:\n\
         {activation_url}\n\n\
         This link will expire in 24 hours.\n\n\
         If you did not create a DriveClone account, you can ignore this email.\n\n\
         The DriveClone Team"
    );

    let html = format!(
        "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
         <h1>Welcome to DriveClone!</h1>\
         <p>Hi {name},</p>\
         <p>Thanks for signing up. Activate your account with the link below:</p>\
         <p><a href=\"{url}\">Activate Account</a></p>\
         <p><code>{url}</code></p>\
         <p><strong>This link will expire in 24 hours.</strong></p>\
         <p>If you did not create a DriveClone account, you can ignore this email.</p>\
         <p>The DriveClone Team</p>\
         </div>"
    );

    OutgoingMail {
        to: to.to_string(),
        subject: "Activate Your DriveClone Account".to_string(),
        text,
        html,
    }
}

/// Password reset message. The link is valid for 10 minutes.
pub fn password_reset_email(to: &str, first_name: &str, reset_url: &str) -> OutgoingMail {
    let name = escape_html(first_name);
    let url = escape_html(reset_url);

    let text = format!(
        "Password Reset Request\n\n\
         Hi {first_name},\n\n\
         Someone asked to reset the password of your DriveClone account.\n\
         Use the following link to choose a new one:\n\n\
         {reset_url}\n\n\
         This link will expire in 10 minutes.\n\n\
         If you did not ask for a reset, you can ignore this email.\n\n\
         The DriveClone Team"
    );

    let html = format!(
        "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
         <h1>Password Reset Request</h1>\
         <p>Hi {name},</p>\
         <p>Someone asked to reset the password of your DriveClone account.</p>\
         <p><a href=\"{url}\">Reset Password</a></p>\
         <p><code>{url}</code></p>\
         <p><strong>This link will expire in 10 minutes.</strong></p>\
         <p>If you did not ask for a reset, you can ignore this email.</p>\
         <p>The DriveClone Team</p>\
         </div>"
    );

    OutgoingMail {
        to: to.to_string(),
        subject: "Password Reset Request - DriveClone".to_string(),
        text,
        html,
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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
