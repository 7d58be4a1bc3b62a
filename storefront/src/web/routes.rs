// harvest_store/src/web/routes.rs

use actix_web::{error, web, HttpRequest, HttpResponse};

use crate::errors::AppError;
use crate::web::handlers::{auth_handlers, contact_handlers, order_handlers, product_handlers};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// Malformed bodies and path ids get the same `{message}` 400 as every other
// validation failure.
fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
  AppError::Validation(format!("Invalid request body: {}", err)).into()
}

fn path_error_handler(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
  AppError::Validation(format!("Invalid path parameter: {}", err)).into()
}

/// Called from `main.rs` (and the HTTP tests) to mount the API.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
    .app_data(web::PathConfig::default().error_handler(path_error_handler))
    .service(
      web::scope("/api")
        .route("/health", web::get().to(health_check_handler))
        .service(
          web::scope("/auth")
            .route("/signup", web::post().to(auth_handlers::signup_handler))
            .route("/login", web::post().to(auth_handlers::login_handler)),
        )
        .service(
          web::scope("/products")
            .route("", web::get().to(product_handlers::list_products_handler))
            .route("", web::post().to(product_handlers::create_product_handler))
            .route(
              "/category/{category_name}",
              web::get().to(product_handlers::list_products_by_category_handler),
            )
            .route("/{product_id}", web::get().to(product_handlers::get_product_handler))
            .route("/{product_id}", web::put().to(product_handlers::update_product_handler))
            .route("/{product_id}", web::delete().to(product_handlers::delete_product_handler))
            .route("/{product_id}/stock", web::put().to(product_handlers::adjust_stock_handler)),
        )
        .service(
          web::scope("/orders")
            .route("", web::post().to(order_handlers::place_order_handler))
            .route("", web::get().to(order_handlers::list_all_orders_handler))
            .route("/user/{user_id}", web::get().to(order_handlers::list_user_orders_handler))
            .route("/{order_id}/status", web::put().to(order_handlers::update_order_status_handler)),
        )
        .service(
          web::scope("/contact")
            .route("", web::post().to(contact_handlers::create_contact_message_handler))
            .route("", web::get().to(contact_handlers::list_contact_messages_handler))
            .route("/{message_id}/status", web::put().to(contact_handlers::update_contact_status_handler)),
        ),
    );
}
