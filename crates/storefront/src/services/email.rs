//! Email service for sending order confirmations.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use forgeline_core::Price;

use crate::config::EmailConfig;
use crate::models::Address;

/// One order line as rendered in the confirmation email.
#[derive(Debug, Clone)]
pub struct EmailLineItem {
    pub name: String,
    /// Variant description; rendered as `Standard` when empty.
    pub material: String,
    pub quantity: i32,
    pub unit_price: Price,
    pub total_price: Price,
}

/// Everything the order confirmation email needs.
#[derive(Debug, Clone)]
pub struct OrderConfirmationEmail {
    pub order_number: String,
    pub customer_name: String,
    /// Preformatted order date, e.g. `24 August 2026`.
    pub order_date: String,
    pub items: Vec<EmailLineItem>,
    pub subtotal: Price,
    pub shipping_cost: Price,
    pub tax_amount: Price,
    pub total: Price,
    pub shipping_address: Address,
}

/// HTML template for the order confirmation email.
#[derive(Template)]
#[template(path = "email/order_confirmation.html")]
struct OrderConfirmationHtml<'a> {
    order: &'a OrderConfirmationEmail,
    tracking_url: &'a str,
    continue_url: &'a str,
}

/// Plain text template for the order confirmation email.
#[derive(Template)]
#[template(path = "email/order_confirmation.txt")]
struct OrderConfirmationText<'a> {
    order: &'a OrderConfirmationEmail,
    tracking_url: &'a str,
    continue_url: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    base_url: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// `base_url` is the public storefront URL used for links in emails.
    ///
    /// # Errors
    ///
    /// Returns error if SMTP connection fails.
    pub fn new(config: &EmailConfig, base_url: &str) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Send the order confirmation email for a newly confirmed order.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_order_confirmation(
        &self,
        to: &str,
        order: &OrderConfirmationEmail,
    ) -> Result<(), EmailError> {
        let tracking_url = format!(
            "{}/orders/track?order={}",
            self.base_url, order.order_number
        );
        let continue_url = format!("{}/products", self.base_url);

        let html = OrderConfirmationHtml {
            order,
            tracking_url: &tracking_url,
            continue_url: &continue_url,
        }
        .render()?;
        let text = OrderConfirmationText {
            order,
            tracking_url: &tracking_url,
            continue_url: &continue_url,
        }
        .render()?;

        let subject = format!("Order Confirmed - {}", order.order_number);
        self.send_multipart_email(to, &subject, &text, &html).await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use forgeline_core::Price;

    fn sample_order() -> OrderConfirmationEmail {
        OrderConfirmationEmail {
            order_number: "ORD-000042".to_string(),
            customer_name: "Ayesha Khan".to_string(),
            order_date: "24 August 2026".to_string(),
            items: vec![
                EmailLineItem {
                    name: "Geometric Stag Head".to_string(),
                    material: "Black acrylic, 3x3 ft, 5mm".to_string(),
                    quantity: 1,
                    unit_price: Price::from_rupees(5200),
                    total_price: Price::from_rupees(5200),
                },
                EmailLineItem {
                    name: "Crescent Calligraphy".to_string(),
                    material: String::new(),
                    quantity: 2,
                    unit_price: Price::from_rupees(3100),
                    total_price: Price::from_rupees(6200),
                },
            ],
            subtotal: Price::from_rupees(11400),
            shipping_cost: Price::ZERO,
            tax_amount: Price::ZERO,
            total: Price::from_rupees(11400),
            shipping_address: Address {
                line1: "House 12, Street 4, F-8/3".to_string(),
                line2: None,
                city: "Islamabad".to_string(),
                province: "Islamabad Capital Territory".to_string(),
                postal_code: "44000".to_string(),
                country: "Pakistan".to_string(),
            },
        }
    }

    #[test]
    fn test_html_template_renders_order_details() {
        let order = sample_order();
        let html = OrderConfirmationHtml {
            order: &order,
            tracking_url: "https://forgeline.pk/orders/track?order=ORD-000042",
            continue_url: "https://forgeline.pk/products",
        }
        .render()
        .expect("template should render");

        assert!(html.contains("ORD-000042"));
        assert!(html.contains("Ayesha Khan"));
        assert!(html.contains("Geometric Stag Head"));
        assert!(html.contains("Rs 11,400"));
        assert!(html.contains("Islamabad"));
        assert!(html.contains("https://forgeline.pk/orders/track?order=ORD-000042"));
    }

    #[test]
    fn test_html_template_free_shipping_label() {
        let order = sample_order();
        let html = OrderConfirmationHtml {
            order: &order,
            tracking_url: "https://forgeline.pk/orders/track?order=ORD-000042",
            continue_url: "https://forgeline.pk/products",
        }
        .render()
        .expect("template should render");

        assert!(html.contains("Free"));
    }

    #[test]
    fn test_text_template_renders_line_items() {
        let order = sample_order();
        let text = OrderConfirmationText {
            order: &order,
            tracking_url: "https://forgeline.pk/orders/track?order=ORD-000042",
            continue_url: "https://forgeline.pk/products",
        }
        .render()
        .expect("template should render");

        assert!(text.contains("ORD-000042"));
        assert!(text.contains("Geometric Stag Head"));
        assert!(text.contains("Qty: 2"));
        assert!(text.contains("Total: Rs 11,400"));
    }

    #[test]
    fn test_text_template_defaults_material() {
        let order = sample_order();
        let text = OrderConfirmationText {
            order: &order,
            tracking_url: "https://forgeline.pk/orders/track?order=ORD-000042",
            continue_url: "https://forgeline.pk/products",
        }
        .render()
        .expect("template should render");

        // Second item has no variant description
        assert!(text.contains("Standard"));
    }
}
