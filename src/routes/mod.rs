pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

use crate::auth::{AuthGate, TokenSigner};

/// Builds the application's route configuration.
///
/// Public endpoints (health, registration, login, the avatar image) are
/// registered ahead of a catch-all scope wrapped in [`AuthGate`]; everything
/// inside that scope sees a resolved [`crate::auth::Session`] or a uniform 401.
pub fn config(signer: TokenSigner) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.service(health::health)
            .service(users::register)
            .service(users::login)
            .service(users::show_avatar)
            .service(
                web::scope("")
                    .wrap(AuthGate::new(signer))
                    .service(users::logout)
                    .service(users::logout_all)
                    .service(users::me)
                    .service(users::update_me)
                    .service(users::delete_me)
                    .service(users::upload_avatar)
                    .service(users::delete_avatar)
                    .service(tasks::create_task)
                    .service(tasks::list_tasks)
                    .service(tasks::get_task)
                    .service(tasks::update_task)
                    .service(tasks::delete_task),
            );
    }
}
