#![allow(dead_code)]

use std::sync::Arc;

use craft_market_backend::api::dtos::{
    MessageResponse, RespondToOrderRequest, RespondToOrderResponse, SendMessageRequest,
    SendOrderRequestRequest, StartConversationRequest, StartConversationResponse,
};
use craft_market_backend::application::ConversationService;
use craft_market_backend::config::MessagingConfig;
use craft_market_backend::domain::{ArtisanProfile, Product, User};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::common::fixtures::{test_artisan, test_artisan_profile, test_customer, test_product};
use crate::common::mocks::{
    MemoryStore, MockConversationRepo, MockMessageRepo, MockOrderRepo, MockProductRepo,
    MockUserRepo,
};

/// One customer, one artisan with a profile and an active product.
pub struct World {
    pub store: Arc<MemoryStore>,
    pub service: ConversationService,
    pub customer: User,
    pub artisan: User,
    pub profile: ArtisanProfile,
    pub product: Product,
}

pub fn service_for(store: Arc<MemoryStore>, settings: MessagingConfig) -> ConversationService {
    ConversationService::new(
        Arc::new(MockUserRepo::new(store.clone())),
        Arc::new(MockProductRepo::new(store.clone())),
        Arc::new(MockConversationRepo::new(store.clone())),
        Arc::new(MockMessageRepo::new(store.clone())),
        Arc::new(MockOrderRepo::new(store)),
        settings,
    )
}

pub fn world() -> World {
    world_with_settings(MessagingConfig::default())
}

pub fn world_with_settings(settings: MessagingConfig) -> World {
    let store = Arc::new(MemoryStore::default());
    let customer = test_customer();
    let artisan = test_artisan();
    let profile = test_artisan_profile(artisan.id);
    let product = test_product(profile.id, Decimal::new(2000, 2));

    store.add_user(customer.clone());
    store.add_user(artisan.clone());
    store.add_artisan_profile(profile.clone());
    store.add_product(product.clone());

    World {
        service: service_for(store.clone(), settings),
        store,
        customer,
        artisan,
        profile,
        product,
    }
}

impl World {
    /// Adds another customer known to the user store.
    pub fn add_customer(&self) -> User {
        let customer = test_customer();
        self.store.add_user(customer.clone());
        customer
    }

    pub async fn open(&self, content: &str) -> StartConversationResponse {
        self.open_as(self.customer.id, content).await
    }

    pub async fn open_as(&self, customer_id: Uuid, content: &str) -> StartConversationResponse {
        self.service
            .start_conversation(customer_id, start_request(self.profile.id, content))
            .await
            .expect("conversation should start")
    }

    pub async fn say(&self, sender: Uuid, conversation_id: Uuid, content: &str) -> MessageResponse {
        self.service
            .send_message(sender, conversation_id, text(content))
            .await
            .expect("message should send")
    }

    pub async fn request_order(&self, conversation_id: Uuid) -> MessageResponse {
        self.service
            .send_order_request(
                self.customer.id,
                conversation_id,
                order_request(self.product.id, 2),
            )
            .await
            .expect("order request should send")
    }

    pub async fn answer(
        &self,
        conversation_id: Uuid,
        request_id: Uuid,
        accepted: bool,
    ) -> RespondToOrderResponse {
        self.service
            .respond_to_order(
                self.artisan.id,
                conversation_id,
                response(request_id, accepted),
            )
            .await
            .expect("order response should record")
    }
}

pub fn start_request(artisan_profile_id: Uuid, content: &str) -> StartConversationRequest {
    StartConversationRequest {
        artisan_profile_id,
        subject: None,
        initial_message: content.to_string(),
        related_product_id: None,
        related_design_id: None,
        priority: None,
    }
}

pub fn text(content: &str) -> SendMessageRequest {
    SendMessageRequest {
        content: content.to_string(),
        message_type: None,
        attachments: Vec::new(),
        metadata: None,
    }
}

pub fn order_request(product_id: Uuid, quantity: i32) -> SendOrderRequestRequest {
    SendOrderRequestRequest {
        product_id,
        quantity,
        customization: None,
        specifications: None,
        requested_price: None,
        timeline: None,
        message: None,
    }
}

pub fn response(original_message_id: Uuid, accepted: bool) -> RespondToOrderRequest {
    RespondToOrderRequest {
        original_message_id,
        accepted,
        response_message: None,
        final_price: None,
        estimated_delivery: None,
        terms: None,
    }
}
