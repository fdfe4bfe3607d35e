use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use taskhive::{auth::TokenSigner, config::Config, db, email::Mailer, routes};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    let pool = db::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");
    db::init_schema(&pool)
        .await
        .expect("Failed to initialize database schema");

    let signer = TokenSigner::new(&config.jwt_secret);
    let mailer = Mailer::new(config.sendgrid_api_key.clone());

    log::info!("Starting TaskHive server at {}", config.server_url());

    let bind_addr = (config.server_host.clone(), config.server_port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(signer.clone()))
            .app_data(web::Data::new(mailer.clone()))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config(signer.clone()))
    })
    .bind(bind_addr)?
    .run()
    .await
}
