use actix_web::{
    HttpRequest, HttpResponse, get, post,
    web::{Data, ServiceConfig, scope},
};
use actix_web_validator::Json;

use crate::api::error::ServiceError;
use crate::api::user::models::Success;
use crate::api::user::service::UserService;
use super::extractor::bearer_token;
use super::models::{Actor, LoginRequest};
use super::service::AuthService;

#[post("/login")]
async fn login(
    auth: Data<AuthService>,
    body: Json<LoginRequest>,
) -> Result<HttpResponse, ServiceError> {
    let response = auth.login(&body.email, &body.password).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/logout")]
async fn logout(auth: Data<AuthService>, req: HttpRequest) -> Result<HttpResponse, ServiceError> {
    if let Some(token) = bearer_token(&req) {
        auth.logout(&token).await?;
    }
    Ok(HttpResponse::Ok().json(Success::ok()))
}

#[get("/me")]
async fn me(actor: Actor, users: Data<UserService>) -> Result<HttpResponse, ServiceError> {
    let uid = actor
        .uid
        .ok_or_else(|| ServiceError::Unauthorized("Sign in required".to_string()))?;
    let user = users.get_user(uid).await?;
    Ok(HttpResponse::Ok().json(user))
}

pub fn auth_config(config: &mut ServiceConfig) {
    config.service(scope("auth").service(login).service(logout).service(me));
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use serde_json::{Value, json};

    use crate::api::test_support::TestContext;

    #[actix_web::test]
    async fn login_returns_token_and_profile() {
        let ctx = TestContext::new().await;
        let app = test::init_service(ctx.app()).await;

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "email": "Admin@Example.com", "password": "correct-horse" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert!(!body["token"].as_str().unwrap().is_empty());
        assert_eq!(body["user"]["role"], "admin");
        assert_eq!(body["user"]["lastName"], "Turing");
    }

    #[actix_web::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let ctx = TestContext::new().await;
        let app = test::init_service(ctx.app()).await;

        let mut errors = Vec::new();
        for (email, password) in [("admin@example.com", "nope"), ("ghost@example.com", "correct-horse")] {
            let req = test::TestRequest::post()
                .uri("/auth/login")
                .set_json(json!({ "email": email, "password": password }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
            let body: Value = test::read_body_json(resp).await;
            errors.push(body["error"].clone());
        }
        assert_eq!(errors[0], errors[1]);
    }

    #[actix_web::test]
    async fn logout_ends_the_session() {
        let ctx = TestContext::new().await;
        let app = test::init_service(ctx.app()).await;

        let req = test::TestRequest::get()
            .uri("/auth/me")
            .insert_header(ctx.admin_auth())
            .to_request();
        let me: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(me["email"], "admin@example.com");

        let req = test::TestRequest::post()
            .uri("/auth/logout")
            .insert_header(ctx.admin_auth())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/auth/me")
            .insert_header(ctx.admin_auth())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}
