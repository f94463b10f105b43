use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{AddToCartRequest, CartLineDto, CartSummary, UpdateCartItemRequest},
        orders::{
            ConfirmPaidRequest, ConfirmPaidResponse, CreatePendingOrderRequest, OrderCreated,
            OrderItemInput, OrderList, OrderWithItems,
        },
        payments::{CreatePaymentIntentRequest, PaymentIntentCreated},
        products::{CreateProductRequest, ProductDetail, ProductList, UpdateProductRequest},
        reviews::{CreateReviewRequest, ReviewList},
        wishlist::{AddWishlistRequest, WishlistProductList},
    },
    models::{Address, CartItem, Customizations, Order, OrderItem, Product, Review, User},
    pricing::{AddonConfig, InquiryContact, LetteringOptions, PresetConfig, SizeOption, SizePrice},
    response::{ApiResponse, Meta},
    routes::{admin, auth, cart, health, orders, params, products, reviews, stripe, wishlist},
    totals::CartTotals,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        reviews::list_reviews,
        reviews::create_review,
        cart::cart_list,
        cart::add_to_cart,
        cart::update_cart_item,
        cart::remove_from_cart,
        orders::list_orders,
        orders::create_pending,
        orders::confirm_paid,
        orders::get_order,
        stripe::create_payment_intent,
        stripe::webhook,
        wishlist::list_wishlist,
        wishlist::add_to_wishlist,
        wishlist::remove_from_wishlist,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::update_order_status,
        admin::set_tracking_number
    ),
    components(
        schemas(
            User,
            Product,
            CartItem,
            Order,
            OrderItem,
            Review,
            Address,
            Customizations,
            SizePrice,
            AddonConfig,
            PresetConfig,
            SizeOption,
            LetteringOptions,
            InquiryContact,
            CartTotals,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            ProductDetail,
            CreateReviewRequest,
            ReviewList,
            AddToCartRequest,
            UpdateCartItemRequest,
            CartLineDto,
            CartSummary,
            OrderItemInput,
            CreatePendingOrderRequest,
            OrderCreated,
            ConfirmPaidRequest,
            ConfirmPaidResponse,
            CreatePaymentIntentRequest,
            PaymentIntentCreated,
            AddWishlistRequest,
            WishlistProductList,
            admin::UpdateOrderStatusRequest,
            admin::SetTrackingRequest,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductDetail>,
            ApiResponse<ProductList>,
            ApiResponse<CartSummary>,
            ApiResponse<OrderList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderCreated>,
            ApiResponse<ConfirmPaidResponse>,
            ApiResponse<PaymentIntentCreated>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Products", description = "Product catalog and admin CRUD"),
        (name = "Reviews", description = "Product review endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Order intake and confirmation"),
        (name = "Payments", description = "Payment intent and webhook endpoints"),
        (name = "Wishlist", description = "Wishlist endpoints"),
        (name = "Admin", description = "Admin back office"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
