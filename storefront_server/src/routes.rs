//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST hand their work to an engine API. Keep this module neat and tidy 🙏
//!
//! Every handler under `/api` receives the caller's [`JwtClaims`], turns them into an [`AuthContext`] and passes that
//! to the engine explicitly. Responses are `{"result": ...}` or, for expected failures, `{"error": ...}` with a 200
//! status (see [`JsonResponse`]). Anything else is a transport-level error carried by [`ServerError`].
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Database and processor calls are all async, so keep it that way.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use serde_json::Value;
use storefront_engine::{
    db_types::{OrderId, ProductInput, ProviderId, Role, SkuInput},
    processor::PaymentProcessor,
    traits::{AccountManagement, OrderQueries, OrderQueryFilter, StorefrontDatabase},
    AuthContext,
    CatalogApi,
    OrderHistoryApi,
    PaymentFlowApi,
    PayoutAccountApi,
    PublishApi,
};

use crate::{
    auth::JwtClaims,
    data_objects::{ConfirmParams, JsonResponse, PublishParams, RegisterPayoutAccountParams},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro.
// Each bound becomes its own type parameter, in the order given, so `impl StorefrontDatabase, PaymentProcessor`
// registers `handler::<TStorefrontDatabase, TPaymentProcessor>`.
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where requires [$($roles:expr),+]) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

/// Echoes the authorization context the server resolved from the caller's access token.
#[get("/check_token")]
pub async fn check_token(claims: JwtClaims) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET check_token for {}", claims.sub);
    Ok(JsonResponse::success(AuthContext::from(claims))?.into_response())
}

//----------------------------------------------   Payments  ----------------------------------------------------
route!(confirm_order => Post "/orders/{order_id}/confirm" impl StorefrontDatabase, PaymentProcessor);
/// Captures the payment of a `processing` order. Only the order's provider may call this.
///
/// Body: `{"payment_intent_id": "pi_..."}`. A repeated call returns `{"error": {"message": "Invalid order status.",
/// "target": order_id}}` without contacting the processor again.
pub async fn confirm_order<B, P>(
    claims: JwtClaims,
    path: web::Path<String>,
    body: web::Json<ConfirmParams>,
    api: web::Data<PaymentFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: StorefrontDatabase,
    P: PaymentProcessor,
{
    let order_id = path.into_inner();
    debug!("💻️ POST confirm for order {order_id} by {}", claims.sub);
    let ctx = AuthContext::from(claims);
    let outcome = api.confirm(&ctx, &order_id, &body.payment_intent_id).await.map(|confirmed| {
        if !confirmed.transfers.is_empty() {
            debug!("💻️ Order {order_id} split outcomes: {:?}", confirmed.transfers);
        }
        confirmed.order
    });
    Ok(JsonResponse::from_outcome(outcome)?.into_response())
}

route!(cancel_order => Post "/orders/{order_id}/cancel" impl StorefrontDatabase, PaymentProcessor);
/// Voids the payment of a `processing` order. The order's buyer or provider may call this.
pub async fn cancel_order<B, P>(
    claims: JwtClaims,
    path: web::Path<String>,
    api: web::Data<PaymentFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: StorefrontDatabase,
    P: PaymentProcessor,
{
    let order_id = path.into_inner();
    debug!("💻️ POST cancel for order {order_id} by {}", claims.sub);
    let ctx = AuthContext::from(claims);
    let outcome = api.cancel(&ctx, &order_id).await;
    Ok(JsonResponse::from_outcome(outcome)?.into_response())
}

route!(refund_order => Post "/orders/{order_id}/refund" impl StorefrontDatabase, PaymentProcessor);
/// Refunds a `succeeded` order in full. The order's buyer or provider may call this.
pub async fn refund_order<B, P>(
    claims: JwtClaims,
    path: web::Path<String>,
    api: web::Data<PaymentFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: StorefrontDatabase,
    P: PaymentProcessor,
{
    let order_id = path.into_inner();
    debug!("💻️ POST refund for order {order_id} by {}", claims.sub);
    let ctx = AuthContext::from(claims);
    let outcome = api.refund(&ctx, &order_id).await;
    Ok(JsonResponse::from_outcome(outcome)?.into_response())
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(my_orders => Get "/orders" impl OrderQueries);
/// The caller's purchase history, newest first.
pub async fn my_orders<B: OrderQueries>(
    claims: JwtClaims,
    api: web::Data<OrderHistoryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_orders for {}", claims.sub);
    let ctx = AuthContext::from(claims);
    let orders = api.orders_for_buyer(&ctx).await?;
    Ok(JsonResponse::success(orders)?.into_response())
}

route!(order_by_id => Get "/orders/{order_id}" impl StorefrontDatabase);
/// A single order, as seen by the caller's provider or by the caller as buyer.
pub async fn order_by_id<B: StorefrontDatabase>(
    claims: JwtClaims,
    path: web::Path<String>,
    api: web::Data<OrderHistoryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = OrderId::from(path.into_inner());
    debug!("💻️ GET order {order_id} for {}", claims.sub);
    let ctx = AuthContext::from(claims);
    let order = api.order_for_actor(&ctx, &order_id).await?;
    Ok(JsonResponse::success(order)?.into_response())
}

route!(provider_orders => Get "/provider/orders" impl OrderQueries);
/// Orders placed with the caller's provider. Filter with the `payment_status`, `delivery_status` and `sales_method`
/// query parameters.
pub async fn provider_orders<B: OrderQueries>(
    claims: JwtClaims,
    query: web::Query<OrderQueryFilter>,
    api: web::Data<OrderHistoryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let filter = query.into_inner();
    debug!("💻️ GET provider_orders for {} with {filter:?}", claims.sub);
    let ctx = AuthContext::from(claims);
    let orders = api.provider_orders(&ctx, filter).await?;
    Ok(JsonResponse::success(orders)?.into_response())
}

//----------------------------------------------   Catalog  ----------------------------------------------------
route!(publish_product => Post "/products/publish" impl StorefrontDatabase);
/// Promotes a product draft and its SKU drafts to the live catalog.
///
/// Body: `{"product_draft_path": "providers/{provider}/productDrafts/{product}"}`. The result lists the live product
/// path followed by each live SKU path.
pub async fn publish_product<B: StorefrontDatabase>(
    claims: JwtClaims,
    body: web::Json<PublishParams>,
    api: web::Data<PublishApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST publish {} by {}", body.product_draft_path, claims.sub);
    let ctx = AuthContext::from(claims);
    let outcome = api.publish(&ctx, &body.product_draft_path).await;
    Ok(JsonResponse::from_outcome(outcome)?.into_response())
}

route!(save_product_draft => Put "/provider/product_drafts/{product_id}" impl StorefrontDatabase);
pub async fn save_product_draft<B: StorefrontDatabase>(
    claims: JwtClaims,
    path: web::Path<String>,
    body: web::Json<ProductInput>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let product_id = path.into_inner();
    debug!("💻️ PUT product draft {product_id} by {}", claims.sub);
    let ctx = AuthContext::from(claims);
    let provider_id = seller_provider(&ctx)?;
    let product = api.save_product_draft(&ctx, &provider_id, &product_id, body.into_inner()).await?;
    Ok(JsonResponse::success(product)?.into_response())
}

route!(save_sku_draft => Put "/provider/product_drafts/{product_id}/skus/{sku_id}" impl StorefrontDatabase);
pub async fn save_sku_draft<B: StorefrontDatabase>(
    claims: JwtClaims,
    path: web::Path<(String, String)>,
    body: web::Json<SkuInput>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let (product_id, sku_id) = path.into_inner();
    debug!("💻️ PUT SKU draft {product_id}/{sku_id} by {}", claims.sub);
    let ctx = AuthContext::from(claims);
    let provider_id = seller_provider(&ctx)?;
    let sku = api.save_sku_draft(&ctx, &provider_id, &product_id, &sku_id, body.into_inner()).await?;
    Ok(JsonResponse::success(sku)?.into_response())
}

route!(upsert_sku => Put "/provider/products/{product_id}/skus/{sku_id}" impl StorefrontDatabase);
/// Edits (or adds) a live SKU. The change is mirrored to the payment processor in the background.
pub async fn upsert_sku<B: StorefrontDatabase>(
    claims: JwtClaims,
    path: web::Path<(String, String)>,
    body: web::Json<SkuInput>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let (product_id, sku_id) = path.into_inner();
    debug!("💻️ PUT live SKU {product_id}/{sku_id} by {}", claims.sub);
    let ctx = AuthContext::from(claims);
    let provider_id = seller_provider(&ctx)?;
    let sku = api.upsert_sku(&ctx, &provider_id, &product_id, &sku_id, body.into_inner()).await?;
    Ok(JsonResponse::success(sku)?.into_response())
}

fn seller_provider(ctx: &AuthContext) -> Result<ProviderId, ServerError> {
    Ok(ctx.require_provider()?.clone())
}

//----------------------------------------------   Payouts  ----------------------------------------------------
route!(link_external_account => Post "/payout_account/external_account" impl AccountManagement, PaymentProcessor);
/// Attaches a bank account or card to the caller's payout account. The body is handed to the processor as is and
/// must include `external_account`.
pub async fn link_external_account<B, P>(
    claims: JwtClaims,
    body: web::Json<Value>,
    api: web::Data<PayoutAccountApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: AccountManagement,
    P: PaymentProcessor,
{
    debug!("💻️ POST external account for {}", claims.sub);
    let ctx = AuthContext::from(claims);
    let outcome = api.link_payout_account(&ctx, body.into_inner()).await;
    Ok(JsonResponse::from_outcome(outcome)?.into_response())
}

route!(payout_balance => Get "/payout_account/balance" impl AccountManagement, PaymentProcessor);
pub async fn payout_balance<B, P>(
    claims: JwtClaims,
    api: web::Data<PayoutAccountApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: AccountManagement,
    P: PaymentProcessor,
{
    debug!("💻️ GET payout balance for {}", claims.sub);
    let ctx = AuthContext::from(claims);
    let outcome = api.balance(&ctx).await;
    Ok(JsonResponse::from_outcome(outcome)?.into_response())
}

route!(register_payout_account => Post "/payout_account" impl AccountManagement, PaymentProcessor where requires [Role::Admin]);
/// Admin only. Records which processor account receives an actor's payouts.
pub async fn register_payout_account<B, P>(
    claims: JwtClaims,
    body: web::Json<RegisterPayoutAccountParams>,
    api: web::Data<PayoutAccountApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: AccountManagement,
    P: PaymentProcessor,
{
    let RegisterPayoutAccountParams { actor_id, external_account_id } = body.into_inner();
    info!("💻️ POST payout account for {actor_id} by {}", claims.sub);
    let ctx = AuthContext::from(claims);
    let account = api.register_payout_account(&ctx, &actor_id, &external_account_id).await?;
    Ok(JsonResponse::success(account)?.into_response())
}
