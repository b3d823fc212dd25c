//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Health check
//!
//! # Auth (public, code endpoints rate limited)
//! POST /api/auth/send-otp               - Mail a one-time login code
//! POST /api/auth/verify-otp             - Verify code, log in or park email
//! POST /api/auth/register               - Create buyer for verified email
//! POST /api/auth/logout                 - Drop the session
//! GET  /api/auth/user                   - Current identity + impersonation
//!
//! # Admin
//! GET  /api/admin/users                 - List users (admin+)
//! POST /api/admin/users                 - Create user (admin+)
//! PATCH /api/admin/users/{id}/role      - Change role (super admin)
//! DELETE /api/admin/users/{id}          - Delete user (super admin)
//! POST /api/admin/impersonate/{user_id} - Start impersonation (admin+)
//! POST /api/admin/exit-impersonation    - Restore original identity
//! GET  /api/admin/custom-domains        - List custom domains (admin+)
//! POST /api/admin/custom-domains        - Register custom domain (admin+)
//! PATCH /api/admin/custom-domains/{id}  - Assign/activate (admin+)
//! DELETE /api/admin/custom-domains/{id} - Delete (admin+)
//!
//! # Catalog
//! GET  /api/vendors                     - List vendors (public)
//! GET  /api/vendors/{id}                - Vendor detail (public)
//! POST /api/vendors                     - Create vendor (seller/super admin)
//! PUT  /api/vendors/{id}                - Update vendor (owner)
//! GET  /api/products                    - List products (public)
//! GET  /api/products/{id}               - Product detail (public)
//! POST /api/products                    - Create product (owner)
//! PUT  /api/products/{id}               - Update product (owner)
//! DELETE /api/products/{id}             - Delete product (owner)
//! GET  /api/categories                  - Categories in actor's scope
//! POST /api/categories                  - Create category (scoped)
//! PATCH /api/categories/{id}            - Rename category (scoped)
//! DELETE /api/categories/{id}           - Delete category (scoped)
//!
//! # Commerce
//! GET  /api/cart                        - Current user's cart
//! POST /api/cart                        - Add/merge a line
//! PUT  /api/cart                        - Set line quantity
//! DELETE /api/cart                      - Remove a line
//! GET  /api/orders                      - Orders in actor's scope
//! GET  /api/orders/{id}                 - Order detail + items
//! POST /api/orders/checkout             - Transactional checkout
//! PATCH /api/orders/{id}/status         - Status update (resolver gated)
//!
//! # Storefront
//! GET  /api/storefront/by-domain        - Hostname -> vendor (public)
//! ```

pub mod admin_users;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod custom_domains;
pub mod impersonation;
pub mod orders;
pub mod products;
pub mod storefront;
pub mod vendors;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router. The code endpoints carry a strict
/// per-IP rate limit.
pub fn auth_routes() -> Router<AppState> {
    let limited = Router::new()
        .route("/send-otp", post(auth::send_otp))
        .route("/verify-otp", post(auth::verify_otp))
        .layer(auth_rate_limiter());

    Router::new()
        .merge(limited)
        .route("/register", post(auth::register))
        .route("/logout", post(auth::logout))
        .route("/user", get(auth::current_user))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin_users::list).post(admin_users::create))
        .route("/users/{id}/role", patch(admin_users::update_role))
        .route("/users/{id}", delete(admin_users::delete))
        .route("/impersonate/{user_id}", post(impersonation::start))
        .route("/exit-impersonation", post(impersonation::exit))
        .route(
            "/custom-domains",
            get(custom_domains::list).post(custom_domains::create),
        )
        .route(
            "/custom-domains/{id}",
            patch(custom_domains::update).delete(custom_domains::delete),
        )
}

/// Create the vendor routes router.
pub fn vendor_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(vendors::list).post(vendors::create))
        .route("/{id}", get(vendors::get).put(vendors::update))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route(
            "/{id}",
            get(products::get)
                .put(products::update)
                .delete(products::delete),
        )
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::list).post(categories::create))
        .route(
            "/{id}",
            patch(categories::update).delete(categories::delete),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(cart::list)
            .post(cart::add)
            .put(cart::update)
            .delete(cart::remove),
    )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list))
        .route("/checkout", post(orders::checkout))
        .route("/{id}", get(orders::get))
        .route("/{id}/status", patch(orders::update_status))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_routes())
        .nest("/api/admin", admin_routes())
        .nest("/api/vendors", vendor_routes())
        .nest("/api/products", product_routes())
        .nest("/api/categories", category_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/orders", order_routes())
        .route("/api/storefront/by-domain", get(storefront::by_domain))
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}
