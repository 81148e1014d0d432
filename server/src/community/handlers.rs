//! Public submission handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use super::queries::{self, NewContactMessage, NewFeedback, Receipt, Subscriber};
use crate::api::AppState;
use crate::auth::Viewer;
use crate::error::{Ack, ApiResult};
use crate::listing::pagination::{FEEDBACK_PER_PAGE, SUBSCRIBERS_PER_PAGE};
use crate::listing::{ListParams, Paginated};
use crate::moderation::{queries as moderation_queries, ContactMessageType, PublicFeedbackItem};
use crate::permissions::ContentManager;
use crate::util::not_blank;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(
        length(min = 1, max = 200, message = "Your name is required"),
        custom(function = "not_blank")
    )]
    pub full_name: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(max = 20))]
    #[serde(default)]
    pub phone: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub village: String,
    #[serde(default)]
    pub address: String,
    #[validate(
        length(min = 1, max = 300, message = "Subject is required"),
        custom(function = "not_blank")
    )]
    pub subject: String,
    #[serde(default)]
    pub message_type: ContactMessageType,
    #[validate(
        length(min = 1, max = 10000, message = "Message is required"),
        custom(function = "not_blank")
    )]
    pub message: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct FeedbackRequest {
    #[validate(
        length(min = 1, max = 200, message = "Your name is required"),
        custom(function = "not_blank")
    )]
    pub author_name: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub author_title: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub author_location: String,
    #[validate(
        length(min = 1, max = 1000, message = "Feedback must be 1 to 1000 characters"),
        custom(function = "not_blank")
    )]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubscribeRequest {
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UnsubscribeRequest {
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Send a message to the palace. No account needed.
///
/// `POST /api/contact`
#[tracing::instrument(skip(state, body))]
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(body): Json<ContactRequest>,
) -> ApiResult<(StatusCode, Ack<Receipt>)> {
    body.validate()?;

    let receipt = queries::insert_contact_message(
        &state.db,
        &NewContactMessage {
            full_name: body.full_name.trim(),
            email: body.email.trim(),
            phone: body.phone.trim(),
            village: body.village.trim(),
            address: body.address.trim(),
            subject: body.subject.trim(),
            message_type: body.message_type,
            message: &body.message,
        },
    )
    .await?;

    tracing::info!(message_id = %receipt.id, message_type = ?body.message_type, "Contact message received");

    Ok((
        StatusCode::CREATED,
        Ack::new(
            "Your message has been sent successfully. We will respond as soon as possible.",
            receipt,
        ),
    ))
}

/// Submit feedback for review. Authenticated submitters are linked.
///
/// `POST /api/feedback`
#[tracing::instrument(skip(state, body))]
pub async fn submit_feedback(
    State(state): State<AppState>,
    viewer: Viewer,
    Json(body): Json<FeedbackRequest>,
) -> ApiResult<(StatusCode, Ack<Receipt>)> {
    body.validate()?;

    let receipt = queries::insert_feedback(
        &state.db,
        &NewFeedback {
            author_name: body.author_name.trim(),
            author_title: body.author_title.trim(),
            author_location: body.author_location.trim(),
            content: body.content.trim(),
            user_id: viewer.user().map(|u| u.id),
        },
    )
    .await?;

    tracing::info!(feedback_id = %receipt.id, "Feedback submitted");

    Ok((
        StatusCode::CREATED,
        Ack::new(
            "Thank you for your feedback! It will be reviewed and published soon.",
            receipt,
        ),
    ))
}

/// Approved feedback, newest first.
///
/// `GET /api/feedback?page=`
pub async fn list_feedback(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Paginated<PublicFeedbackItem>>> {
    let page = params.page_request(FEEDBACK_PER_PAGE);
    let (items, total) = moderation_queries::list_public_feedback(&state.db, page).await?;
    Ok(Json(Paginated::new(items, total, page)))
}

/// `POST /api/newsletter/subscribe`
#[tracing::instrument(skip(state, body))]
pub async fn subscribe(
    State(state): State<AppState>,
    Json(body): Json<SubscribeRequest>,
) -> ApiResult<Ack<Subscriber>> {
    body.validate()?;

    let subscriber = queries::subscribe(&state.db, body.email.trim(), body.name.trim()).await?;
    tracing::info!(subscriber_id = %subscriber.id, "Newsletter subscription active");

    Ok(Ack::new(
        "Thank you for subscribing to our newsletter!",
        subscriber,
    ))
}

/// Always succeeds, so the response does not reveal who is subscribed.
///
/// `POST /api/newsletter/unsubscribe`
#[tracing::instrument(skip(state, body))]
pub async fn unsubscribe(
    State(state): State<AppState>,
    Json(body): Json<UnsubscribeRequest>,
) -> ApiResult<Ack<()>> {
    body.validate()?;

    if queries::unsubscribe(&state.db, body.email.trim()).await? {
        tracing::info!("Newsletter subscription deactivated");
    }

    Ok(Ack::new("You have been unsubscribed from our newsletter.", ()))
}

/// `GET /api/admin/newsletter?page=`
#[tracing::instrument(skip(state))]
pub async fn list_subscribers(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Paginated<Subscriber>>> {
    let page = params.page_request(SUBSCRIBERS_PER_PAGE);
    let (items, total) = queries::list_active_subscribers(&state.db, page).await?;
    Ok(Json(Paginated::new(items, total, page)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_defaults_to_general() {
        let body: ContactRequest = serde_json::from_str(
            r#"{"full_name": "Ene", "email": "ene@example.com", "subject": "Hi", "message": "Hello"}"#,
        )
        .unwrap();
        assert_eq!(body.message_type, ContactMessageType::General);
        assert!(body.validate().is_ok());
    }

    #[test]
    fn test_feedback_content_limit() {
        let body = FeedbackRequest {
            author_name: "Abu".into(),
            author_title: String::new(),
            author_location: String::new(),
            content: "x".repeat(1001),
        };
        let errors = body.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("content"));
    }

    #[test]
    fn test_whitespace_only_feedback_is_rejected() {
        let body = FeedbackRequest {
            author_name: "   ".into(),
            author_title: String::new(),
            author_location: String::new(),
            content: "    ".into(),
        };
        let errors = body.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("author_name"));
        assert!(fields.contains_key("content"));
    }

    #[test]
    fn test_whitespace_only_contact_is_rejected() {
        let body: ContactRequest = serde_json::from_str(
            r#"{"full_name": "  ", "email": "ene@example.com", "subject": " ", "message": "  "}"#,
        )
        .unwrap();
        let errors = body.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["full_name", "subject", "message"] {
            assert!(fields.contains_key(field), "{field}");
        }
    }

    #[test]
    fn test_subscribe_requires_email() {
        let body = SubscribeRequest {
            email: "not-an-email".into(),
            name: String::new(),
        };
        assert!(body.validate().is_err());
    }
}
