use std::{sync::Arc, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use futures::FutureExt;
use log::*;
use storefront_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    CatalogApi,
    InventorySyncApi,
    OrderHistoryApi,
    PaymentFlowApi,
    PayoutAccountApi,
    PublishApi,
    RevenueSplit,
    SqliteDatabase,
};
use stripe_tools::StripeApi;

use crate::{
    auth::TokenVerifier,
    config::ServerConfig,
    errors::ServerError,
    middleware::JwtMiddlewareFactory,
    routes::{
        check_token,
        health,
        CancelOrderRoute,
        ConfirmOrderRoute,
        LinkExternalAccountRoute,
        MyOrdersRoute,
        OrderByIdRoute,
        PayoutBalanceRoute,
        ProviderOrdersRoute,
        PublishProductRoute,
        RefundOrderRoute,
        RegisterPayoutAccountRoute,
        SaveProductDraftRoute,
        SaveSkuDraftRoute,
        UpsertSkuRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let stripe = StripeApi::new(config.stripe.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let hooks = create_event_hooks(db.clone(), stripe.clone());
    let handlers = EventHandlers::new(config.event_buffer_size, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, stripe, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Wires the inventory sync to the SKU events, so every live SKU write is mirrored to the payment processor.
pub fn create_event_hooks(db: SqliteDatabase, stripe: StripeApi) -> EventHooks {
    let sync_api = Arc::new(InventorySyncApi::new(db, stripe));
    let mut hooks = EventHooks::default();
    let on_created = Arc::clone(&sync_api);
    hooks.on_sku_created(move |ev| {
        let api = Arc::clone(&on_created);
        async move {
            let path = ev.sku.path();
            match api.on_sku_created(ev).await {
                Ok(outcome) => debug!("📬️ SKU {path} created. Mirror outcome: {outcome:?}"),
                Err(e) => error!("📬️ Could not sync new SKU {path}. {e}"),
            }
        }
        .boxed()
    });
    let on_updated = sync_api;
    hooks.on_sku_updated(move |ev| {
        let api = Arc::clone(&on_updated);
        async move {
            let path = ev.sku.path();
            match api.on_sku_updated(ev).await {
                Ok(outcome) => debug!("📬️ SKU {path} updated. Mirror outcome: {outcome:?}"),
                Err(e) => error!("📬️ Could not sync updated SKU {path}. {e}"),
            }
        }
        .boxed()
    });
    hooks.on_payment_changed(|ev| {
        async move {
            info!(
                "📬️ Order {} payment status changed from {} to {}",
                ev.order.id, ev.old_status, ev.order.payment_status
            );
        }
        .boxed()
    });
    hooks
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    stripe: StripeApi,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let split = RevenueSplit::new(config.revenue_split_percent);
    info!("🪛️ Intermediaries receive {}% of mediated line items", split.percent());
    let verifier = TokenVerifier::new(&config.auth);
    let (host, port) = (config.host.clone(), config.port);
    let srv = HttpServer::new(move || {
        let payments_api = PaymentFlowApi::new(db.clone(), stripe.clone(), producers.clone()).with_revenue_split(split);
        let payout_api = PayoutAccountApi::new(db.clone(), stripe.clone());
        let publish_api = PublishApi::new(db.clone(), producers.clone());
        let catalog_api = CatalogApi::new(db.clone(), producers.clone());
        let history_api = OrderHistoryApi::new(db.clone());
        let jwt = JwtMiddlewareFactory::new(verifier.clone(), config.use_x_forwarded_for, config.use_forwarded);
        // Routes that require authentication
        let auth_scope = web::scope("/api")
            .wrap(jwt)
            .service(check_token)
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(ProviderOrdersRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(ConfirmOrderRoute::<SqliteDatabase, StripeApi>::new())
            .service(CancelOrderRoute::<SqliteDatabase, StripeApi>::new())
            .service(RefundOrderRoute::<SqliteDatabase, StripeApi>::new())
            .service(PublishProductRoute::<SqliteDatabase>::new())
            .service(SaveProductDraftRoute::<SqliteDatabase>::new())
            .service(SaveSkuDraftRoute::<SqliteDatabase>::new())
            .service(UpsertSkuRoute::<SqliteDatabase>::new())
            .service(LinkExternalAccountRoute::<SqliteDatabase, StripeApi>::new())
            .service(PayoutBalanceRoute::<SqliteDatabase, StripeApi>::new())
            .service(RegisterPayoutAccountRoute::<SqliteDatabase, StripeApi>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("sf::access_log"))
            .app_data(web::Data::new(payments_api))
            .app_data(web::Data::new(payout_api))
            .app_data(web::Data::new(publish_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(history_api))
            .service(health)
            .service(auth_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
