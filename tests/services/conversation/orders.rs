use std::sync::atomic::Ordering;

use actix_rt::test;
use craft_market_backend::api::dtos::{PaginationParams, PriceRangeDto};
use craft_market_backend::domain::{
    ConversationStatus, MessageType, OrderRequestState, OrderStatus,
};
use craft_market_backend::error::AppError;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::helpers::{order_request, response, world};
use crate::common::fixtures::test_product;

#[test]
async fn order_request_estimates_price_from_catalog() {
    let w = world();
    let started = w.open("Hello").await;

    let sent = w.request_order(started.conversation.id).await;

    assert_eq!(sent.message_type, MessageType::OrderRequest);
    assert_eq!(sent.order_state, Some(OrderRequestState::Pending));
    assert_eq!(sent.content, "I would like to order Glazed vase");

    let stored = w
        .store
        .messages_in(started.conversation.id)
        .into_iter()
        .find(|m| m.id == sent.id)
        .unwrap();
    let details = stored.payload.as_order_request().unwrap();
    assert_eq!(details.product_id, w.product.id);
    assert_eq!(details.quantity, 2);
    assert_eq!(details.estimated_price.min, Decimal::new(40, 0));
    assert_eq!(details.estimated_price.max, Decimal::new(60, 0));
}

#[test]
async fn order_request_uses_supplied_message_and_details() {
    let w = world();
    let started = w.open("Hello").await;
    let mut request = order_request(w.product.id, 3);
    request.message = Some("Three vases in teal please".to_string());
    request.customization = Some("teal glaze".to_string());
    request.specifications = Some(serde_json::json!({ "height_cm": 25 }));
    request.timeline = Some("before June".to_string());

    let sent = w
        .service
        .send_order_request(w.customer.id, started.conversation.id, request)
        .await
        .unwrap();

    assert_eq!(sent.content, "Three vases in teal please");
    let details = &sent.metadata["order_details"];
    assert_eq!(details["quantity"], 3);
    assert_eq!(details["customization"], "teal glaze");
    assert_eq!(details["specifications"]["height_cm"], 25);
    assert_eq!(details["timeline"], "before June");
}

#[test]
async fn order_request_rejects_inverted_or_negative_price_range() {
    let w = world();
    let started = w.open("Hello").await;

    for (min, max) in [(60, 40), (-1, 10)] {
        let mut request = order_request(w.product.id, 1);
        request.requested_price = Some(PriceRangeDto {
            min: Decimal::new(min, 0),
            max: Decimal::new(max, 0),
        });
        let result = w
            .service
            .send_order_request(w.customer.id, started.conversation.id, request)
            .await;
        assert!(matches!(result, Err(AppError::ValidationError { .. })));
    }
}

#[test]
async fn only_the_customer_may_request_orders() {
    let w = world();
    let started = w.open("Hello").await;

    let result = w
        .service
        .send_order_request(
            w.artisan.id,
            started.conversation.id,
            order_request(w.product.id, 1),
        )
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let stranger = w.add_customer();
    let result = w
        .service
        .send_order_request(
            stranger.id,
            started.conversation.id,
            order_request(w.product.id, 1),
        )
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[test]
async fn order_request_checks_product_availability() {
    let w = world();
    let started = w.open("Hello").await;
    let id = started.conversation.id;

    let missing = w
        .service
        .send_order_request(w.customer.id, id, order_request(Uuid::new_v4(), 1))
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let foreign = test_product(Uuid::new_v4(), Decimal::new(10, 0));
    w.store.add_product(foreign.clone());
    let result = w
        .service
        .send_order_request(w.customer.id, id, order_request(foreign.id, 1))
        .await;
    assert!(matches!(result, Err(AppError::ProductNotAvailable(_))));

    let mut retired = test_product(w.profile.id, Decimal::new(10, 0));
    retired.is_active = false;
    w.store.add_product(retired.clone());
    let result = w
        .service
        .send_order_request(w.customer.id, id, order_request(retired.id, 1))
        .await;
    assert!(matches!(result, Err(AppError::ProductNotAvailable(_))));
}

#[test]
async fn order_request_rejects_out_of_range_quantity() {
    let w = world();
    let started = w.open("Hello").await;
    let result = w
        .service
        .send_order_request(
            w.customer.id,
            started.conversation.id,
            order_request(w.product.id, 0),
        )
        .await;
    assert!(matches!(result, Err(AppError::ValidationError { .. })));
}

#[test]
async fn accepting_creates_confirmed_order() {
    let w = world();
    let started = w.open("Hello").await;
    let id = started.conversation.id;
    let request = w.request_order(id).await;

    let mut accept = response(request.id, true);
    accept.final_price = Some(Decimal::new(45, 0));
    accept.terms = Some("50% deposit".to_string());
    let answered = w
        .service
        .respond_to_order(w.artisan.id, id, accept)
        .await
        .unwrap();

    let order = answered.order.expect("accepted request creates an order");
    assert_eq!(order.status, OrderStatus::Confirmed);
    assert!(order.confirmed_at.is_some());
    assert_eq!(order.customer_id, w.customer.id);
    assert_eq!(order.conversation_id, Some(id));
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].price, Decimal::new(45, 0));
    assert_eq!(order.items[0].quantity, 2);
    assert_eq!(order.items[0].artisan_profile_id, w.profile.id);

    assert_eq!(answered.message.message_type, MessageType::OrderResponse);
    assert_eq!(answered.message.content, "Order accepted!");
    assert_eq!(answered.message.metadata["accepted"], true);
    assert_eq!(
        answered.message.metadata["order_id"],
        serde_json::json!(order.id)
    );
    assert_eq!(
        answered.message.metadata["original_message_id"],
        serde_json::json!(request.id)
    );

    let conversation = w.store.conversation(id).unwrap();
    assert_eq!(conversation.order_ids, vec![order.id]);
    assert_eq!(conversation.last_message_id, Some(answered.message.id));

    let detail = w
        .service
        .get_conversation(w.customer.id, id, PaginationParams::default())
        .await
        .unwrap();
    let request_view = detail.messages.iter().find(|m| m.id == request.id).unwrap();
    assert_eq!(request_view.order_state, Some(OrderRequestState::Accepted));

    let orders = w.service.list_orders(w.customer.id, id).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, order.id);
}

#[test]
async fn accepting_without_price_uses_estimate_minimum() {
    let w = world();
    let started = w.open("Hello").await;
    let request = w.request_order(started.conversation.id).await;

    let answered = w.answer(started.conversation.id, request.id, true).await;

    let order = answered.order.unwrap();
    assert_eq!(order.items[0].price, Decimal::new(40, 0));
    assert_eq!(order.total, Decimal::new(40, 0));
}

#[test]
async fn declining_creates_no_order() {
    let w = world();
    let started = w.open("Hello").await;
    let id = started.conversation.id;
    let request = w.request_order(id).await;

    let answered = w.answer(id, request.id, false).await;

    assert!(answered.order.is_none());
    assert_eq!(answered.message.content, "Order declined");
    assert_eq!(answered.message.metadata["accepted"], false);
    assert_eq!(w.store.order_count(), 0);
    assert!(w.store.conversation(id).unwrap().order_ids.is_empty());

    let detail = w
        .service
        .get_conversation(w.artisan.id, id, PaginationParams::default())
        .await
        .unwrap();
    let request_view = detail.messages.iter().find(|m| m.id == request.id).unwrap();
    assert_eq!(request_view.order_state, Some(OrderRequestState::Declined));
}

#[test]
async fn only_the_owning_artisan_may_respond() {
    let w = world();
    let started = w.open("Hello").await;
    let request = w.request_order(started.conversation.id).await;

    let result = w
        .service
        .respond_to_order(
            w.customer.id,
            started.conversation.id,
            response(request.id, true),
        )
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let stranger = w.add_customer();
    let result = w
        .service
        .respond_to_order(stranger.id, started.conversation.id, response(request.id, true))
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(w.store.order_count(), 0);
}

#[test]
async fn responding_requires_an_order_request_in_this_conversation() {
    let w = world();
    let started = w.open("Hello").await;
    let id = started.conversation.id;

    let plain = w.say(w.customer.id, id, "not an order").await;
    let result = w
        .service
        .respond_to_order(w.artisan.id, id, response(plain.id, true))
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let result = w
        .service
        .respond_to_order(w.artisan.id, id, response(Uuid::new_v4(), true))
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    // A request that lives in another conversation of the same artisan.
    let other = w.add_customer();
    let elsewhere = w.open_as(other.id, "Other thread").await;
    let foreign_request = w
        .service
        .send_order_request(
            other.id,
            elsewhere.conversation.id,
            order_request(w.product.id, 1),
        )
        .await
        .unwrap();
    let result = w
        .service
        .respond_to_order(w.artisan.id, id, response(foreign_request.id, true))
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[test]
async fn second_response_conflicts_and_creates_nothing() {
    let w = world();
    let started = w.open("Hello").await;
    let id = started.conversation.id;
    let request = w.request_order(id).await;
    w.answer(id, request.id, true).await;

    for accepted in [true, false] {
        let result = w
            .service
            .respond_to_order(w.artisan.id, id, response(request.id, accepted))
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
    assert_eq!(w.store.order_count(), 1);
    let responses = w
        .store
        .messages_in(id)
        .into_iter()
        .filter(|m| m.responds_to() == Some(request.id))
        .count();
    assert_eq!(responses, 1);
}

#[test]
async fn concurrent_acceptances_create_one_order() {
    let w = world();
    let started = w.open("Hello").await;
    let id = started.conversation.id;
    let request = w.request_order(id).await;

    let (left, right) = tokio::join!(
        w.service
            .respond_to_order(w.artisan.id, id, response(request.id, true)),
        w.service
            .respond_to_order(w.artisan.id, id, response(request.id, true)),
    );

    let outcomes = [left.is_ok(), right.is_ok()];
    assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
    let loser = if left.is_ok() { right } else { left };
    assert!(matches!(loser, Err(AppError::Conflict(_))));
    assert_eq!(w.store.order_count(), 1);
    assert_eq!(w.store.conversation(id).unwrap().order_ids.len(), 1);
}

#[test]
async fn failed_order_write_leaves_request_pending() {
    let w = world();
    let started = w.open("Hello").await;
    let id = started.conversation.id;
    let request = w.request_order(id).await;
    let messages_before = w.store.messages_in(id).len();

    w.store.fail_next_order_write.store(true, Ordering::SeqCst);
    let result = w
        .service
        .respond_to_order(w.artisan.id, id, response(request.id, true))
        .await;

    assert!(matches!(result, Err(AppError::InternalError(_))));
    assert_eq!(w.store.order_count(), 0);
    assert_eq!(w.store.messages_in(id).len(), messages_before);
    assert!(w.store.conversation(id).unwrap().order_ids.is_empty());

    let retried = w.answer(id, request.id, true).await;
    assert!(retried.order.is_some());
}

#[test]
async fn negative_final_price_is_rejected() {
    let w = world();
    let started = w.open("Hello").await;
    let request = w.request_order(started.conversation.id).await;
    let mut accept = response(request.id, true);
    accept.final_price = Some(Decimal::new(-5, 0));

    let result = w
        .service
        .respond_to_order(w.artisan.id, started.conversation.id, accept)
        .await;
    assert!(matches!(result, Err(AppError::ValidationError { .. })));
}

#[test]
async fn final_price_must_be_whole_cents_below_the_money_ceiling() {
    let w = world();
    let started = w.open("Hello").await;
    let id = started.conversation.id;
    let request = w.request_order(id).await;

    for price in [Decimal::new(45999, 3), Decimal::new(100_000_000_000, 0)] {
        let mut accept = response(request.id, true);
        accept.final_price = Some(price);
        let result = w.service.respond_to_order(w.artisan.id, id, accept).await;
        assert!(
            matches!(result, Err(AppError::ValidationError { .. })),
            "{price} should be rejected"
        );
    }
    assert_eq!(w.store.order_count(), 0);

    let mut accept = response(request.id, true);
    accept.final_price = Some(Decimal::new(45500, 3));
    let answered = w
        .service
        .respond_to_order(w.artisan.id, id, accept)
        .await
        .unwrap();
    let order = answered.order.expect("accepted request creates an order");
    assert_eq!(order.items[0].price, Decimal::new(4550, 2));
}

#[test]
async fn requested_price_outside_money_column_is_rejected() {
    let w = world();
    let started = w.open("Hello").await;

    let ranges = [
        (Decimal::new(10_000_000_000, 0), Decimal::new(10_000_000_000, 0)),
        (Decimal::new(10, 0), Decimal::new(12345, 3)),
    ];
    for (min, max) in ranges {
        let mut request = order_request(w.product.id, 1);
        request.requested_price = Some(PriceRangeDto { min, max });
        let result = w
            .service
            .send_order_request(w.customer.id, started.conversation.id, request)
            .await;
        assert!(matches!(result, Err(AppError::ValidationError { .. })));
    }
}

#[test]
async fn oversized_catalog_estimate_is_rejected() {
    let w = world();
    let started = w.open("Hello").await;
    let pricey = test_product(w.profile.id, Decimal::new(999_999_999, 2));
    w.store.add_product(pricey.clone());

    let result = w
        .service
        .send_order_request(
            w.customer.id,
            started.conversation.id,
            order_request(pricey.id, 10_000),
        )
        .await;

    match result {
        Err(AppError::ValidationError { message, .. }) => {
            assert!(message.contains("maximum order amount"))
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
async fn responding_in_archived_conversation_is_refused() {
    let w = world();
    let started = w.open("Hello").await;
    let id = started.conversation.id;
    let request = w.request_order(id).await;
    w.store.set_status(id, ConversationStatus::Archived);

    let result = w
        .service
        .respond_to_order(w.artisan.id, id, response(request.id, true))
        .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    let result = w
        .service
        .send_order_request(w.customer.id, id, order_request(w.product.id, 1))
        .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

#[test]
async fn list_orders_is_limited_to_participants() {
    let w = world();
    let started = w.open("Hello").await;
    let stranger = w.add_customer();

    let empty = w
        .service
        .list_orders(w.artisan.id, started.conversation.id)
        .await
        .unwrap();
    assert!(empty.is_empty());

    let result = w
        .service
        .list_orders(stranger.id, started.conversation.id)
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}
