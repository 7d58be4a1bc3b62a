// harvest_store/tests/api_tests.rs

mod common;

use actix_web::{http::StatusCode, test, web, App};
use common::{add_product, add_user, test_state, token_for, PUBLIC_BASE_URL};
use harvest_store::state::AppState;
use harvest_store::web::configure_app_routes;
use serde_json::{json, Value};

macro_rules! init_app {
  ($state:expr) => {
    test::init_service(
      App::new()
        .app_data(web::Data::new($state.clone()))
        .configure(configure_app_routes),
    )
    .await
  };
}

fn bearer(token: &str) -> (&'static str, String) {
  ("Authorization", format!("Bearer {}", token))
}

async fn admin_token(state: &AppState) -> String {
  let admin = add_user(state, "Admin User", "admin@goldenharvest.com", "admin123", true).await;
  token_for(state, &admin)
}

#[actix_rt::test]
async fn health_check() {
  let state = test_state();
  let app = init_app!(state);
  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["status"], "ok");
}

#[actix_rt::test]
async fn admin_routes_require_token_then_role() {
  let state = test_state();
  let customer = add_user(&state, "Asha", "asha@example.com", "secret1", false).await;
  let customer_token = token_for(&state, &customer);
  let admin_token = admin_token(&state).await;
  let app = init_app!(state);

  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/orders").to_request()).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body, json!({ "message": "Not authorized, no token" }));

  let req = test::TestRequest::get()
    .uri("/api/orders")
    .insert_header(bearer("garbage.token.value"))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["message"], "Not authorized, token failed");

  let req = test::TestRequest::get()
    .uri("/api/orders")
    .insert_header(bearer(&customer_token))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["message"], "Not authorized as an admin");

  let req = test::TestRequest::get()
    .uri("/api/orders")
    .insert_header(bearer(&admin_token))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn signup_and_login_over_http() {
  let state = test_state();
  let app = init_app!(state);

  let req = test::TestRequest::post()
    .uri("/api/auth/signup")
    .set_json(json!({ "name": "Meera", "email": "meera@example.com", "password": "secret1" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["user"]["email"], "meera@example.com");
  assert_eq!(body["user"]["isAdmin"], false);

  let req = test::TestRequest::post()
    .uri("/api/auth/login")
    .set_json(json!({ "email": "meera@example.com", "password": "secret1" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert!(body["token"].as_str().is_some_and(|t| t.split('.').count() == 3));
  assert_eq!(body["user"]["name"], "Meera");
  assert!(body["user"].get("passwordHash").is_none());

  let req = test::TestRequest::post()
    .uri("/api/auth/login")
    .set_json(json!({ "email": "meera@example.com", "password": "nope123" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body, json!({ "message": "Invalid email or password" }));
}

#[actix_rt::test]
async fn products_are_listed_with_resolved_images() {
  let state = test_state();
  harvest_store::seed::seed_catalog_if_empty(state.stores.catalog.as_ref())
    .await
    .unwrap();
  let app = init_app!(state);

  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/products").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  let products = body.as_array().unwrap();
  assert_eq!(products.len(), 18);
  assert_eq!(products[0]["name"], "Fresh Spinach");
  assert_eq!(products[0]["price"], 2.5);
  assert_eq!(
    products[0]["imageUrl"],
    "https://images.unsplash.com/photo-1576045057995-568f588f82fb?auto=format&fit=crop&w=300&q=80"
  );
  assert!(products.iter().all(|p| p["imageUrl"].as_str().unwrap().starts_with("https://")));

  let req = test::TestRequest::get().uri("/api/products/category/powders").to_request();
  let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
  assert_eq!(body.as_array().unwrap().len(), 8);

  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/products/not-a-uuid").to_request()).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn admin_manages_products_and_stock() {
  let state = test_state();
  let token = admin_token(&state).await;
  let app = init_app!(state);

  let req = test::TestRequest::post()
    .uri("/api/products")
    .insert_header(bearer(&token))
    .set_json(json!({
      "name": "Okra",
      "category": "vegetables",
      "price": "2.40",
      "description": "Tender okra",
      "image": "https://cdn.example.com/okra.jpg"
    }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let created: Value = test::read_body_json(resp).await;
  assert_eq!(created["stock"], 0);
  assert_eq!(created["imageUrl"], "https://cdn.example.com/okra.jpg");
  let id = created["_id"].as_str().unwrap().to_string();

  let req = test::TestRequest::put()
    .uri(&format!("/api/products/{}/stock", id))
    .insert_header(bearer(&token))
    .set_json(json!({ "stock": 12 }))
    .to_request();
  let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
  assert_eq!(body["stock"], 12);

  let req = test::TestRequest::put()
    .uri(&format!("/api/products/{}/stock", id))
    .insert_header(bearer(&token))
    .set_json(json!({ "stock": -20 }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);

  let req = test::TestRequest::put()
    .uri(&format!("/api/products/{}/stock", id))
    .insert_header(bearer(&token))
    .set_json(json!({ "stock": i64::MAX }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert!(body["message"].as_str().unwrap().contains("out of range"));

  let req = test::TestRequest::put()
    .uri(&format!("/api/products/{}", id))
    .insert_header(bearer(&token))
    .set_json(json!({ "price": 0, "about": "Grown locally", "image": "okra-1700000000.jpg" }))
    .to_request();
  let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
  assert_eq!(body["imageUrl"], format!("{}/images/okra-1700000000.jpg", PUBLIC_BASE_URL));
  assert_eq!(body["price"], 0.0);
  assert_eq!(body["stock"], 12);
  assert_eq!(body["about"], "Grown locally");

  let req = test::TestRequest::delete()
    .uri(&format!("/api/products/{}", id))
    .insert_header(bearer(&token))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

  let resp = test::call_service(&app, test::TestRequest::get().uri(&format!("/api/products/{}", id)).to_request()).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["message"], "Product not found");
}

#[actix_rt::test]
async fn placing_orders_over_http() {
  let state = test_state();
  let turmeric = add_product(&state, "Turmeric Powder", 450, 10).await;
  let customer = add_user(&state, "Asha", "asha@example.com", "secret1", false).await;
  let customer_token = token_for(&state, &customer);
  let admin_token = admin_token(&state).await;
  let app = init_app!(state);

  let order_body = json!({
    "user": null,
    "customerName": "Asha",
    "customerAddress": "12 Market Road",
    "items": [{ "productId": turmeric.id, "name": "Turmeric Powder", "quantity": 3, "price": 4.5 }],
    "totalAmount": 13.5
  });

  let req = test::TestRequest::post()
    .uri("/api/orders")
    .insert_header(bearer(&customer_token))
    .set_json(&order_body)
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let order: Value = test::read_body_json(resp).await;
  assert_eq!(order["totalAmount"], 13.5);
  assert_eq!(order["status"], "Pending");
  assert_eq!(order["user"], json!(customer.id));
  assert!(order.get("warnings").is_none());

  // Guest checkout with a stale client total.
  let mut guest_body = order_body.clone();
  guest_body["totalAmount"] = json!(1.0);
  guest_body["items"][0]["quantity"] = json!(1);
  let req = test::TestRequest::post().uri("/api/orders").set_json(&guest_body).to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let guest_order: Value = test::read_body_json(resp).await;
  assert_eq!(guest_order["user"], Value::Null);
  assert_eq!(guest_order["totalAmount"], 4.5);
  assert_eq!(guest_order["warnings"].as_array().map(Vec::len), Some(1));

  let mut too_many = order_body.clone();
  too_many["items"][0]["quantity"] = json!(7);
  let req = test::TestRequest::post().uri("/api/orders").set_json(&too_many).to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["message"], "Insufficient stock for Turmeric Powder: requested 7, available 6");

  let req = test::TestRequest::post()
    .uri("/api/orders")
    .insert_header(("Authorization", "Token abc"))
    .set_json(&order_body)
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

  let req = test::TestRequest::post()
    .uri("/api/orders")
    .insert_header(("Content-Type", "application/json"))
    .set_payload("{not json")
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert!(body["message"].as_str().unwrap().starts_with("Invalid request body"));

  // Own orders: visible to the owner and to admins, not to anyone else.
  let uri = format!("/api/orders/user/{}", customer.id);
  let req = test::TestRequest::get().uri(&uri).insert_header(bearer(&customer_token)).to_request();
  let mine: Value = test::read_body_json(test::call_service(&app, req).await).await;
  assert_eq!(mine.as_array().unwrap().len(), 1);

  let req = test::TestRequest::get().uri(&uri).to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

  let req = test::TestRequest::get().uri(&uri).insert_header(bearer(&admin_token)).to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

  // Admin listing embeds the owner in place of the bare id.
  let req = test::TestRequest::get().uri("/api/orders").insert_header(bearer(&admin_token)).to_request();
  let all: Value = test::read_body_json(test::call_service(&app, req).await).await;
  let all = all.as_array().unwrap();
  assert_eq!(all.len(), 2);
  let owned = all.iter().find(|o| o["_id"] == order["_id"]).unwrap();
  assert_eq!(owned["user"]["_id"], json!(customer.id));
  assert_eq!(owned["user"]["email"], "asha@example.com");
  let guest = all.iter().find(|o| o["_id"] == guest_order["_id"]).unwrap();
  assert_eq!(guest["user"], Value::Null);

  let order_id = order["_id"].as_str().unwrap();
  let req = test::TestRequest::put()
    .uri(&format!("/api/orders/{}/status", order_id))
    .insert_header(bearer(&admin_token))
    .set_json(json!({ "status": "Shipped" }))
    .to_request();
  let updated: Value = test::read_body_json(test::call_service(&app, req).await).await;
  assert_eq!(updated["status"], "Shipped");

  let req = test::TestRequest::put()
    .uri(&format!("/api/orders/{}/status", order_id))
    .insert_header(bearer(&admin_token))
    .set_json(json!({ "status": "Lost" }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn cart_built_from_catalog_listing_places_an_order() {
  let state = test_state();
  add_product(&state, "Turmeric Powder", 450, 10).await;
  add_product(&state, "Cumin Powder", 400, 5).await;
  let customer = add_user(&state, "Asha", "asha@example.com", "secret1", false).await;
  let token = token_for(&state, &customer);
  let app = init_app!(state);

  let req = test::TestRequest::post()
    .uri("/api/auth/login")
    .set_json(json!({ "email": "asha@example.com", "password": "secret1" }))
    .to_request();
  let login: Value = test::read_body_json(test::call_service(&app, req).await).await;

  let catalog: Value = test::read_body_json(
    test::call_service(&app, test::TestRequest::get().uri("/api/products").to_request()).await,
  )
  .await;
  let cart: Vec<Value> = catalog
    .as_array()
    .unwrap()
    .iter()
    .map(|product| {
      json!({
        "productId": product["_id"],
        "name": product["name"],
        "quantity": 2,
        "price": product["price"],
      })
    })
    .collect();
  assert!(cart.iter().all(|item| item["productId"].is_string()));

  let req = test::TestRequest::post()
    .uri("/api/orders")
    .insert_header(bearer(&token))
    .set_json(json!({
      "user": login["user"]["id"],
      "customerName": "Asha",
      "customerAddress": "12 Market Road",
      "items": cart,
      "totalAmount": 17.0
    }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let order: Value = test::read_body_json(resp).await;
  assert_eq!(order["totalAmount"], 17.0);
  assert!(order["_id"].is_string());
  assert!(order.get("warnings").is_none());

  let req = test::TestRequest::get()
    .uri(&format!("/api/orders/user/{}", login["user"]["id"].as_str().unwrap()))
    .insert_header(bearer(&token))
    .to_request();
  let mine: Value = test::read_body_json(test::call_service(&app, req).await).await;
  assert_eq!(mine[0]["_id"], order["_id"]);
}

#[actix_rt::test]
async fn other_users_orders_are_forbidden() {
  let state = test_state();
  let asha = add_user(&state, "Asha", "asha@example.com", "secret1", false).await;
  let ravi = add_user(&state, "Ravi", "ravi@example.com", "secret2", false).await;
  let app = init_app!(state);

  let req = test::TestRequest::get()
    .uri(&format!("/api/orders/user/{}", asha.id))
    .insert_header(bearer(&token_for(&state, &ravi)))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn contact_messages_flow() {
  let state = test_state();
  let token = admin_token(&state).await;
  let app = init_app!(state);

  let req = test::TestRequest::post()
    .uri("/api/contact")
    .set_json(json!({ "name": "Lata", "email": "lata@example.com", "mobile": "" , "comments": "Hi" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body, json!({ "message": "Please fill in all fields." }));

  let req = test::TestRequest::post()
    .uri("/api/contact")
    .set_json(json!({ "name": "Lata", "email": "lata@example.com", "mobile": "9876543210", "comments": "Do you deliver?" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["message"], "Message sent successfully!");
  assert_eq!(body["data"]["status"], "In Progress");
  let message_id = body["data"]["_id"].as_str().unwrap().to_string();

  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/contact").to_request()).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

  let req = test::TestRequest::put()
    .uri(&format!("/api/contact/{}/status", message_id))
    .insert_header(bearer(&token))
    .set_json(json!({ "status": "Done" }))
    .to_request();
  let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
  assert_eq!(body["status"], "Done");

  let req = test::TestRequest::get().uri("/api/contact").insert_header(bearer(&token)).to_request();
  let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
  assert_eq!(body.as_array().unwrap().len(), 1);

  let req = test::TestRequest::put()
    .uri(&format!("/api/contact/{}/status", uuid::Uuid::new_v4()))
    .insert_header(bearer(&token))
    .set_json(json!({ "status": "Done" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["message"], "Message not found");
}
