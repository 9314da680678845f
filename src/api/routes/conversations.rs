use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::api::dtos::{
    ConversationDetailResponse, ConversationListParams, ConversationListResponse, ErrorResponse,
    MessageResponse, OrderResponse, PaginationParams, RespondToOrderRequest,
    RespondToOrderResponse, SendMessageRequest, SendOrderRequestRequest,
    StartConversationRequest, StartConversationResponse, UnreadCountResponse,
};
use crate::api::routes::AppState;
use crate::error::AppResult;
use crate::middleware::AuthenticatedUser;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/conversations")
            .route("", web::get().to(list_conversations))
            .route("", web::post().to(start_conversation))
            .route("/unread-count", web::get().to(unread_count))
            .route("/{id}", web::get().to(get_conversation))
            .route("/{id}/messages", web::post().to(send_message))
            .route("/{id}/order-requests", web::post().to(send_order_request))
            .route("/{id}/order-responses", web::post().to(respond_to_order))
            .route("/{id}/archive", web::post().to(archive_conversation))
            .route("/{id}/orders", web::get().to(list_orders)),
    );
}

#[utoipa::path(
    post,
    path = "/api/v1/conversations",
    request_body = StartConversationRequest,
    responses(
        (status = 201, description = "Message stored in a new or existing conversation", body = StartConversationResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Artisan profile not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "conversations"
)]
pub async fn start_conversation(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    payload: web::Json<StartConversationRequest>,
) -> AppResult<HttpResponse> {
    let result = state
        .conversation_service
        .start_conversation(user.user_id, payload.into_inner())
        .await?;
    state.metrics.record_conversation_started(result.created);
    Ok(HttpResponse::Created().json(result))
}

#[utoipa::path(
    get,
    path = "/api/v1/conversations",
    params(ConversationListParams),
    responses(
        (status = 200, description = "Conversations the caller takes part in", body = ConversationListResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "conversations"
)]
pub async fn list_conversations(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<ConversationListParams>,
) -> AppResult<HttpResponse> {
    let result = state
        .conversation_service
        .list_conversations(user.user_id, query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(result))
}

#[utoipa::path(
    get,
    path = "/api/v1/conversations/unread-count",
    responses(
        (status = 200, description = "Unread messages addressed to the caller", body = UnreadCountResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "conversations"
)]
pub async fn unread_count(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let result = state.conversation_service.unread_count(user.user_id).await?;
    Ok(HttpResponse::Ok().json(result))
}

#[utoipa::path(
    get,
    path = "/api/v1/conversations/{id}",
    params(("id" = Uuid, Path, description = "Conversation id"), PaginationParams),
    responses(
        (status = 200, description = "Conversation with one page of messages; marks them read", body = ConversationDetailResponse),
        (status = 404, description = "Conversation not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "conversations"
)]
pub async fn get_conversation(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    query: web::Query<PaginationParams>,
) -> AppResult<HttpResponse> {
    let result = state
        .conversation_service
        .get_conversation(user.user_id, path.into_inner(), query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(result))
}

#[utoipa::path(
    post,
    path = "/api/v1/conversations/{id}/messages",
    params(("id" = Uuid, Path, description = "Conversation id")),
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message stored", body = MessageResponse),
        (status = 400, description = "Invalid message or inactive conversation", body = ErrorResponse),
        (status = 404, description = "Conversation not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "conversations"
)]
pub async fn send_message(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    payload: web::Json<SendMessageRequest>,
) -> AppResult<HttpResponse> {
    let result = state
        .conversation_service
        .send_message(user.user_id, path.into_inner(), payload.into_inner())
        .await?;
    state.metrics.record_message_sent();
    Ok(HttpResponse::Created().json(result))
}

#[utoipa::path(
    post,
    path = "/api/v1/conversations/{id}/order-requests",
    params(("id" = Uuid, Path, description = "Conversation id")),
    request_body = SendOrderRequestRequest,
    responses(
        (status = 201, description = "Order request stored", body = MessageResponse),
        (status = 403, description = "Caller is not the customer", body = ErrorResponse),
        (status = 404, description = "Conversation or product not found", body = ErrorResponse),
        (status = 422, description = "Product not available from this artisan", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn send_order_request(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    payload: web::Json<SendOrderRequestRequest>,
) -> AppResult<HttpResponse> {
    let result = state
        .conversation_service
        .send_order_request(user.user_id, path.into_inner(), payload.into_inner())
        .await?;
    state.metrics.record_order_request();
    Ok(HttpResponse::Created().json(result))
}

#[utoipa::path(
    post,
    path = "/api/v1/conversations/{id}/order-responses",
    params(("id" = Uuid, Path, description = "Conversation id")),
    request_body = RespondToOrderRequest,
    responses(
        (status = 201, description = "Response stored; order created when accepted", body = RespondToOrderResponse),
        (status = 403, description = "Caller is not the conversation's artisan", body = ErrorResponse),
        (status = 404, description = "Conversation or order request not found", body = ErrorResponse),
        (status = 409, description = "Order request already answered", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn respond_to_order(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    payload: web::Json<RespondToOrderRequest>,
) -> AppResult<HttpResponse> {
    let result = state
        .conversation_service
        .respond_to_order(user.user_id, path.into_inner(), payload.into_inner())
        .await?;
    state.metrics.record_order_response(result.order.is_some());
    Ok(HttpResponse::Created().json(result))
}

#[utoipa::path(
    post,
    path = "/api/v1/conversations/{id}/archive",
    params(("id" = Uuid, Path, description = "Conversation id")),
    responses(
        (status = 204, description = "Conversation archived"),
        (status = 404, description = "Conversation not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "conversations"
)]
pub async fn archive_conversation(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .conversation_service
        .archive_conversation(user.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/v1/conversations/{id}/orders",
    params(("id" = Uuid, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Orders created in this conversation", body = [OrderResponse]),
        (status = 404, description = "Conversation not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn list_orders(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let result = state
        .conversation_service
        .list_orders(user.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(result))
}
