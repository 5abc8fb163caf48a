//! Checkout route handlers.
//!
//! The checkout is a short wizard. Contact details (guest step) and
//! addresses (details step) accumulate in a [`CheckoutDraft`] kept in the
//! session. Submitting the details creates a hosted checkout session on the
//! backend and redirects the shopper to its payment page. The payment page
//! sends them back to `/checkout/success` or `/checkout/cancel`.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use emporium_core::{
    Address, CheckoutSessionId, CheckoutSessionStatus, Email, Toast, ValidationErrors, Validator,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::{BackendError, Cart, CheckoutContact, CheckoutSession, CreateCheckoutSession};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{Flash, push_toast};
use crate::models::{CheckoutDraft, session_keys};
use crate::routes::cart::{cart_token, clear_cart_token, load_cart, validate_coupon_code};
use crate::routes::toast_for_backend_error;
use crate::state::AppState;

/// Longest order note accepted.
pub const MAX_NOTES_LENGTH: usize = 500;

/// Placeholder the payment provider replaces with the session ID.
const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

// =============================================================================
// Forms
// =============================================================================

/// The combined checkout form as submitted or re-rendered.
///
/// Built from flat form fields so the same struct serves the one-page form
/// on `/checkout` and the details step of the guest flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub contact: CheckoutContact,
    pub shipping: Address,
    pub billing: Address,
    pub same_as_shipping: bool,
    pub coupon_code: String,
    pub notes: String,
    pub guest: bool,
}

impl CheckoutForm {
    /// Read the form from submitted fields.
    #[must_use]
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        let flag = |name: &str| {
            fields
                .get(name)
                .is_some_and(|v| matches!(v.as_str(), "on" | "true" | "1"))
        };
        let text = |name: &str| fields.get(name).map(|v| v.trim().to_string()).unwrap_or_default();

        Self {
            contact: contact_from_fields(fields),
            shipping: Address::from_fields(fields, "shipping"),
            billing: Address::from_fields(fields, "billing"),
            same_as_shipping: flag("same_as_shipping"),
            coupon_code: text("coupon_code"),
            notes: text("notes"),
            guest: flag("guest"),
        }
    }

    /// Prefill the form from a saved draft.
    #[must_use]
    pub fn from_draft(draft: &CheckoutDraft) -> Self {
        Self {
            contact: draft.contact.clone(),
            shipping: draft.shipping_address.clone(),
            billing: draft.billing_address.clone(),
            same_as_shipping: draft.same_as_shipping || draft.billing_address.is_blank(),
            coupon_code: draft.coupon_code.clone().unwrap_or_default(),
            notes: draft.notes.clone().unwrap_or_default(),
            guest: draft.guest,
        }
    }
}

fn contact_from_fields(fields: &HashMap<String, String>) -> CheckoutContact {
    let text = |name: &str| fields.get(name).map(|v| v.trim().to_string()).unwrap_or_default();
    let phone = text("phone");
    CheckoutContact {
        email: text("email"),
        first_name: text("first_name"),
        last_name: text("last_name"),
        phone: (!phone.is_empty()).then_some(phone),
    }
}

/// Validate contact details, returning them with the email normalized.
fn validate_contact(v: &mut Validator, contact: &CheckoutContact) -> CheckoutContact {
    let email = v.email("Email", &contact.email);
    v.required("First name", &contact.first_name);
    v.required("Last name", &contact.last_name);
    if let Some(phone) = &contact.phone {
        v.phone("Phone", phone);
    }

    CheckoutContact {
        email: email.map_or_else(|| contact.email.clone(), Email::into_inner),
        ..contact.clone()
    }
}

/// Validate the guest contact step.
///
/// # Errors
///
/// Returns every failed check, in form order.
pub fn validate_guest_contact(
    contact: &CheckoutContact,
) -> std::result::Result<CheckoutContact, ValidationErrors> {
    let mut v = Validator::new();
    let contact = validate_contact(&mut v, contact);
    v.finish()?;
    Ok(contact)
}

/// Validate the full checkout form and turn it into a draft.
///
/// # Errors
///
/// Returns every failed check, in form order.
pub fn validate_checkout(
    form: &CheckoutForm,
) -> std::result::Result<CheckoutDraft, ValidationErrors> {
    let mut v = Validator::new();

    let contact = validate_contact(&mut v, &form.contact);
    form.shipping.validate("Shipping", &mut v);
    if !form.same_as_shipping {
        form.billing.validate("Billing", &mut v);
    }
    validate_coupon_code(&mut v, &form.coupon_code);
    v.max_len("Notes", &form.notes, MAX_NOTES_LENGTH);

    v.finish()?;

    Ok(CheckoutDraft {
        contact,
        guest: form.guest,
        shipping_address: form.shipping.clone(),
        billing_address: if form.same_as_shipping {
            Address::default()
        } else {
            form.billing.clone()
        },
        same_as_shipping: form.same_as_shipping,
        coupon_code: (!form.coupon_code.is_empty()).then(|| form.coupon_code.clone()),
        notes: (!form.notes.is_empty()).then(|| form.notes.clone()),
    })
}

/// Query string of the payment return pages.
#[derive(Debug, Default, Deserialize)]
pub struct ReturnQuery {
    #[serde(default)]
    pub session_id: Option<String>,
}

impl ReturnQuery {
    fn session_id(&self) -> Option<CheckoutSessionId> {
        self.session_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty() && *id != SESSION_ID_PLACEHOLDER)
            .map(CheckoutSessionId::new)
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

async fn load_draft(session: &Session) -> CheckoutDraft {
    session
        .get::<CheckoutDraft>(session_keys::CHECKOUT_DRAFT)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

async fn save_draft(session: &Session, draft: &CheckoutDraft) -> Result<()> {
    session.insert(session_keys::CHECKOUT_DRAFT, draft).await?;
    Ok(())
}

async fn clear_draft(session: &Session) {
    if let Err(e) = session.remove_value(session_keys::CHECKOUT_DRAFT).await {
        tracing::warn!("Failed to clear checkout draft: {e}");
    }
}

/// Redirect shoppers with nothing to buy back to the cart.
async fn redirect_empty_cart(session: &Session) -> Response {
    push_toast(session, Toast::warning("Your cart is empty")).await;
    Redirect::to("/cart").into_response()
}

/// Absolute URL the payment page returns to.
fn return_url(base_url: &str, path: &str) -> String {
    format!(
        "{}{path}?session_id={SESSION_ID_PLACEHOLDER}",
        base_url.trim_end_matches('/')
    )
}

// =============================================================================
// Templates
// =============================================================================

/// One-page checkout: cart review plus every field.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/index.html")]
pub struct CheckoutIndexTemplate {
    pub cart: Cart,
    pub form: CheckoutForm,
    pub toasts: Vec<Toast>,
}

/// Guest contact step.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/guest.html")]
pub struct CheckoutGuestTemplate {
    pub cart: Cart,
    pub contact: CheckoutContact,
    pub toasts: Vec<Toast>,
}

/// Address, coupon and notes step.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/details.html")]
pub struct CheckoutDetailsTemplate {
    pub cart: Cart,
    pub form: CheckoutForm,
    pub toasts: Vec<Toast>,
}

/// Checkout session summary.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutShowTemplate {
    pub session: CheckoutSession,
    pub toasts: Vec<Toast>,
}

/// Payment completed.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/success.html")]
pub struct CheckoutSuccessTemplate {
    pub session: Option<CheckoutSession>,
    /// The backend confirmed the session is complete.
    pub paid: bool,
    pub toasts: Vec<Toast>,
}

/// Payment abandoned.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/cancel.html")]
pub struct CheckoutCancelTemplate {
    pub session_id: Option<CheckoutSessionId>,
    pub toasts: Vec<Toast>,
}

/// Re-render whichever form was submitted.
fn form_response(cart: Cart, form: CheckoutForm, toast: Toast, status: StatusCode) -> Response {
    let toasts = vec![toast];
    if form.guest {
        (status, CheckoutDetailsTemplate { cart, form, toasts }).into_response()
    } else {
        (status, CheckoutIndexTemplate { cart, form, toasts }).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Checkout index: review the cart and fill in every field at once.
#[instrument(skip(state, session, toasts))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Flash(toasts): Flash,
) -> Response {
    let cart = load_cart(&state, &session).await;
    if cart.is_empty() {
        return redirect_empty_cart(&session).await;
    }

    let mut form = CheckoutForm::from_draft(&load_draft(&session).await);
    form.guest = false;

    CheckoutIndexTemplate {
        cart,
        form,
        toasts,
    }
    .into_response()
}

/// Guest checkout: contact details step.
#[instrument(skip(state, session, toasts))]
pub async fn guest_index(
    State(state): State<AppState>,
    session: Session,
    Flash(toasts): Flash,
) -> Response {
    let cart = load_cart(&state, &session).await;
    if cart.is_empty() {
        return redirect_empty_cart(&session).await;
    }

    CheckoutGuestTemplate {
        cart,
        contact: load_draft(&session).await.contact,
        toasts,
    }
    .into_response()
}

/// Store guest contact details and continue to the details step.
///
/// # Errors
///
/// Returns an error if the session store fails.
#[instrument(skip_all)]
pub async fn guest_submit(
    State(state): State<AppState>,
    session: Session,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Response> {
    let submitted = contact_from_fields(&fields);

    let contact = match validate_guest_contact(&submitted) {
        Ok(contact) => contact,
        Err(errors) => {
            let cart = load_cart(&state, &session).await;
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                CheckoutGuestTemplate {
                    cart,
                    contact: submitted,
                    toasts: vec![Toast::from_validation(&errors)],
                },
            )
                .into_response());
        }
    };

    let mut draft = load_draft(&session).await;
    draft.contact = contact;
    draft.guest = true;
    save_draft(&session, &draft).await?;

    add_breadcrumb("checkout", "Guest contact entered", None);
    Ok(Redirect::to("/checkout/details").into_response())
}

/// Checkout details: shipping and billing address, coupon, notes.
#[instrument(skip(state, session, toasts))]
pub async fn details(
    State(state): State<AppState>,
    session: Session,
    Flash(toasts): Flash,
) -> Response {
    let cart = load_cart(&state, &session).await;
    if cart.is_empty() {
        return redirect_empty_cart(&session).await;
    }

    let draft = load_draft(&session).await;
    if !draft.has_contact() {
        return Redirect::to("/checkout/guest").into_response();
    }

    let mut form = CheckoutForm::from_draft(&draft);
    form.guest = true;

    CheckoutDetailsTemplate {
        cart,
        form,
        toasts,
    }
    .into_response()
}

/// Validate the checkout form, create a checkout session and redirect to
/// the payment page.
///
/// Invalid input re-renders the submitted form with its values and the
/// first message as a toast.
///
/// # Errors
///
/// Returns an error if the session store fails.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Response> {
    let form = CheckoutForm::from_fields(&fields);

    let Some(token) = cart_token(&session).await else {
        return Ok(redirect_empty_cart(&session).await);
    };
    let cart = load_cart(&state, &session).await;
    if cart.is_empty() {
        return Ok(redirect_empty_cart(&session).await);
    }

    let draft = match validate_checkout(&form) {
        Ok(draft) => draft,
        Err(errors) => {
            tracing::debug!(count = errors.messages().len(), "Checkout form invalid");
            return Ok(form_response(
                cart,
                form,
                Toast::from_validation(&errors),
                StatusCode::UNPROCESSABLE_ENTITY,
            ));
        }
    };
    save_draft(&session, &draft).await?;

    let base_url = &state.config().base_url;
    let request = CreateCheckoutSession {
        contact: draft.contact.clone(),
        shipping_address: draft.shipping_address.clone(),
        billing_address: draft.effective_billing_address(),
        same_as_shipping: draft.same_as_shipping,
        coupon_code: draft.coupon_code.clone(),
        notes: draft.notes.clone(),
        guest: draft.guest,
        success_url: return_url(base_url, "/checkout/success"),
        cancel_url: return_url(base_url, "/checkout/cancel"),
    };

    match state
        .backend()
        .create_checkout_session(&token, &request)
        .await
    {
        Ok(created) => {
            tracing::info!(session_id = %created.id, "Checkout session created");
            add_breadcrumb("checkout", "Redirected to payment", None);
            Ok(Redirect::to(&created.redirect_url).into_response())
        }
        Err(e) => {
            let status = if matches!(e, BackendError::Validation(_)) {
                tracing::warn!("Backend rejected checkout: {e}");
                StatusCode::UNPROCESSABLE_ENTITY
            } else {
                tracing::error!("Failed to create checkout session: {e}");
                StatusCode::BAD_GATEWAY
            };
            Ok(form_response(cart, form, toast_for_backend_error(&e), status))
        }
    }
}

/// Checkout session summary.
///
/// # Errors
///
/// Returns 404 for unknown sessions.
#[instrument(skip(state, toasts))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Flash(toasts): Flash,
) -> Result<impl IntoResponse> {
    let id = CheckoutSessionId::new(id);
    let session = state.backend().get_checkout_session(&id).await?;
    Ok(CheckoutShowTemplate { session, toasts })
}

/// Return from the payment page: show the confirmation.
///
/// The cart and draft are forgotten only once the backend reports the
/// session complete; otherwise the shopper keeps their cart.
#[instrument(skip(state, session, query, toasts))]
pub async fn success(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ReturnQuery>,
    Flash(toasts): Flash,
) -> Response {
    let checkout = match query.session_id() {
        Some(id) => match state.backend().get_checkout_session(&id).await {
            Ok(checkout) => Some(checkout),
            Err(e) => {
                tracing::warn!(session_id = %id, "Failed to fetch checkout session: {e}");
                None
            }
        },
        None => None,
    };

    if checkout
        .as_ref()
        .is_some_and(|c| c.status == CheckoutSessionStatus::Expired)
    {
        push_toast(
            &session,
            Toast::warning("Your checkout session expired. Please try again."),
        )
        .await;
        return Redirect::to("/cart").into_response();
    }

    let paid = checkout
        .as_ref()
        .is_some_and(|c| c.status == CheckoutSessionStatus::Complete);
    if paid {
        clear_cart_token(&session).await;
        clear_draft(&session).await;
    } else {
        tracing::info!("Checkout return without a completed session, keeping cart");
    }

    CheckoutSuccessTemplate {
        session: checkout,
        paid,
        toasts,
    }
    .into_response()
}

/// Payment abandoned: keep the cart and offer a way back.
#[instrument(skip(query, toasts))]
pub async fn cancel(Query(query): Query<ReturnQuery>, Flash(mut toasts): Flash) -> Response {
    toasts.push(Toast::info(
        "Payment was cancelled. Your cart has been saved.",
    ));
    CheckoutCancelTemplate {
        session_id: query.session_id(),
        toasts,
    }
    .into_response()
}
