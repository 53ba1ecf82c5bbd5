//! Email service for booking confirmations and password resets
//!
//! Sends are fire-and-forget from the HTTP layer's point of view: the
//! handlers spawn them and answer immediately, failures only reach the log.

use lettre::{
    message::{header::ContentType, Mailbox, Message},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};
use std::str::FromStr;

use crate::{
    config::{EmailConfig, StudioConfig},
    error::{AppError, AppResult},
    models::booking::Booking,
};

#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
    studio: StudioConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig, studio: StudioConfig) -> Self {
        Self { config, studio }
    }

    /// Send the booking confirmation for the primary row of a reservation
    pub async fn send_booking_confirmation(&self, booking: &Booking) -> AppResult<()> {
        if booking.email.is_empty() {
            // Admin bookings may carry no email at all
            return Ok(());
        }

        let subject = format!("{} - Prenotazione confermata", self.studio.name);
        let manage_hint = match &booking.token {
            Some(token) => format!(
                "Gestisci la tua prenotazione: {}/bookings/manage/{}\n\
                 (modifiche e cancellazioni sono possibili fino a 24 ore prima)\n",
                self.studio.base_url, token
            ),
            None => String::new(),
        };
        let group_line = if booking.group_size > 1 {
            format!("Persone: {}\n", booking.group_size)
        } else {
            String::new()
        };
        let body = format!(
            "Ciao {} {},\n\n\
             la tua prenotazione è confermata:\n\n\
             Data: {}\nOra: {}\n{}\n{}\n\
             {}\n{}\nTel: {}\n",
            booking.nome,
            booking.cognome,
            booking.giorno.format("%d/%m/%Y"),
            booking.ora,
            group_line,
            manage_hint,
            self.studio.name,
            self.studio.address,
            self.studio.phone,
        );

        self.send_email(&booking.email, &subject, &body).await
    }

    /// Send a password-reset link
    pub async fn send_password_reset(&self, to: &str, reset_link: &str) -> AppResult<()> {
        let subject = format!("{} - Reimposta la password", self.studio.name);
        let body = format!(
            "Abbiamo ricevuto una richiesta di reset della password.\n\n\
             Reimposta la password qui: {reset_link}\n\n\
             Il link scade tra un'ora. Se non hai richiesto il reset, ignora questa email.\n",
        );
        self.send_email(to, &subject, &body).await
    }

    async fn send_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        let from_name = self.config.smtp_from_name.as_deref().unwrap_or("Lev Space");
        let from_mailbox = Mailbox::from_str(&format!("{} <{}>", from_name, self.config.smtp_from))
            .map_err(|e| AppError::Internal(format!("Invalid from address: {e}")))?;
        let to_mailbox = Mailbox::from_str(to)
            .map_err(|e| AppError::Internal(format!("Invalid to address: {e}")))?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to build email: {e}")))?;

        let mut builder = SmtpTransport::relay(&self.config.smtp_host)
            .map_err(|e| AppError::Internal(format!("SMTP setup failed: {e}")))?
            .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_username, &self.config.smtp_password)
        {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let transport = builder.build();
        transport
            .send(&email)
            .map_err(|e| AppError::Internal(format!("Failed to send email: {e}")))?;

        tracing::debug!(to, subject, "email sent");
        Ok(())
    }
}
