// 📬 Inbox - quote requests, message threads and notification counters

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteStatus {
    /// Sent, waiting for the manufacturer
    Pending,
    /// Manufacturer quoted a price
    Responded,
    Accepted,
    Declined,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Pending => "Pending",
            QuoteStatus::Responded => "Responded",
            QuoteStatus::Accepted => "Accepted",
            QuoteStatus::Declined => "Declined",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub id: String,
    pub manufacturer_id: String,
    pub product: String,
    pub quantity: u32,
    pub target_price: Option<f64>,
    pub needed_by: Option<NaiveDate>,
    pub quoted_price: Option<f64>,
    pub status: QuoteStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub manufacturer_id: String,
    pub body: String,

    /// `true` when the signed-in user wrote it
    pub from_user: bool,
    pub at: DateTime<Utc>,
    pub read: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationCounters {
    pub unread_messages: usize,
    pub pending_quotes: usize,
    pub responded_quotes: usize,
}

impl NotificationCounters {
    /// Badge count: unread messages plus quotes awaiting the user's decision
    pub fn total(&self) -> usize {
        self.unread_messages + self.responded_quotes
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InboxError {
    #[error("quantity must be greater than zero")]
    ZeroQuantity,

    #[error("message body is empty")]
    EmptyMessage,

    #[error("quote not found: {0}")]
    QuoteNotFound(String),

    #[error("quote {id} is {from}, cannot move to {to}")]
    InvalidTransition {
        id: String,
        from: &'static str,
        to: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewQuote {
    pub manufacturer_id: String,
    pub product: String,
    pub quantity: u32,
    pub target_price: Option<f64>,
    pub needed_by: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct Inbox {
    quotes: Vec<QuoteRequest>,
    messages: Vec<Message>,
}

impl Inbox {
    pub fn new() -> Self {
        Inbox::default()
    }

    /// Inbox pre-filled with existing quotes and messages
    pub fn with_history(quotes: Vec<QuoteRequest>, messages: Vec<Message>) -> Self {
        Inbox { quotes, messages }
    }

    pub fn quotes(&self) -> &[QuoteRequest] {
        &self.quotes
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn thread(&self, manufacturer_id: &str) -> Vec<&Message> {
        self.messages
            .iter()
            .filter(|m| m.manufacturer_id == manufacturer_id)
            .collect()
    }

    pub fn request_quote(&mut self, quote: NewQuote, now: DateTime<Utc>) -> Result<QuoteRequest, InboxError> {
        if quote.quantity == 0 {
            return Err(InboxError::ZeroQuantity);
        }

        let request = QuoteRequest {
            id: uuid::Uuid::new_v4().to_string(),
            manufacturer_id: quote.manufacturer_id,
            product: quote.product,
            quantity: quote.quantity,
            target_price: quote.target_price,
            needed_by: quote.needed_by,
            quoted_price: None,
            status: QuoteStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.quotes.push(request.clone());

        tracing::debug!(quote = %request.id, manufacturer = %request.manufacturer_id, "quote requested");
        Ok(request)
    }

    fn transition(
        &mut self,
        id: &str,
        from: QuoteStatus,
        to: QuoteStatus,
        now: DateTime<Utc>,
    ) -> Result<&mut QuoteRequest, InboxError> {
        let quote = self
            .quotes
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| InboxError::QuoteNotFound(id.to_string()))?;

        if quote.status != from {
            return Err(InboxError::InvalidTransition {
                id: id.to_string(),
                from: quote.status.as_str(),
                to: to.as_str(),
            });
        }

        quote.status = to;
        quote.updated_at = now;
        Ok(quote)
    }

    pub fn respond_to_quote(&mut self, id: &str, price: f64, now: DateTime<Utc>) -> Result<(), InboxError> {
        let quote = self.transition(id, QuoteStatus::Pending, QuoteStatus::Responded, now)?;
        quote.quoted_price = Some(price);
        Ok(())
    }

    pub fn accept_quote(&mut self, id: &str, now: DateTime<Utc>) -> Result<(), InboxError> {
        self.transition(id, QuoteStatus::Responded, QuoteStatus::Accepted, now)?;
        Ok(())
    }

    pub fn decline_quote(&mut self, id: &str, now: DateTime<Utc>) -> Result<(), InboxError> {
        self.transition(id, QuoteStatus::Responded, QuoteStatus::Declined, now)?;
        Ok(())
    }

    fn push_message(&mut self, manufacturer_id: &str, body: &str, from_user: bool, now: DateTime<Utc>) -> Result<(), InboxError> {
        if body.trim().is_empty() {
            return Err(InboxError::EmptyMessage);
        }
        self.messages.push(Message {
            id: uuid::Uuid::new_v4().to_string(),
            manufacturer_id: manufacturer_id.to_string(),
            body: body.trim().to_string(),
            from_user,
            at: now,
            read: from_user,
        });
        Ok(())
    }

    pub fn send_message(&mut self, manufacturer_id: &str, body: &str, now: DateTime<Utc>) -> Result<(), InboxError> {
        self.push_message(manufacturer_id, body, true, now)
    }

    pub fn receive_message(&mut self, manufacturer_id: &str, body: &str, now: DateTime<Utc>) -> Result<(), InboxError> {
        self.push_message(manufacturer_id, body, false, now)
    }

    /// Mark every message in a thread read; returns how many changed
    pub fn mark_thread_read(&mut self, manufacturer_id: &str) -> usize {
        let mut changed = 0;
        for message in self.messages.iter_mut().filter(|m| m.manufacturer_id == manufacturer_id && !m.read) {
            message.read = true;
            changed += 1;
        }
        changed
    }

    pub fn counters(&self) -> NotificationCounters {
        NotificationCounters {
            unread_messages: self.messages.iter().filter(|m| !m.read).count(),
            pending_quotes: self.quotes.iter().filter(|q| q.status == QuoteStatus::Pending).count(),
            responded_quotes: self.quotes.iter().filter(|q| q.status == QuoteStatus::Responded).count(),
        }
    }
}
