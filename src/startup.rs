use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;

use crate::auth::TokenService;
use crate::middleware::JwtMiddleware;
use crate::routes::{
    create_downtime, create_user, delete_downtime, delete_user, health_check, list_downtime,
    list_roles, list_users, login, refresh, update_user,
};

pub fn run(
    listener: TcpListener,
    connection: PgPool,
    token_service: TokenService,
) -> Result<Server, std::io::Error> {
    let connection = web::Data::new(connection);
    let tokens = web::Data::new(token_service);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            // Shared state
            .app_data(connection.clone())
            .app_data(tokens.clone())
            // Public routes (no authentication required)
            .route("/health_check", web::get().to(health_check))
            .route("/auth/login", web::post().to(login))
            .route("/auth/refresh", web::post().to(refresh))
            // Protected routes (require a valid access token)
            .service(
                web::scope("")
                    .wrap(JwtMiddleware::new(tokens.clone()))
                    .route("/users", web::get().to(list_users))
                    .route("/users", web::post().to(create_user))
                    .route("/users/{user_name}", web::put().to(update_user))
                    .route("/users/{user_name}", web::delete().to(delete_user))
                    .route("/roles", web::get().to(list_roles))
                    .route("/downtime", web::get().to(list_downtime))
                    .route("/downtime", web::post().to(create_downtime))
                    .route("/downtime/{downtime_id}", web::delete().to(delete_downtime)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
