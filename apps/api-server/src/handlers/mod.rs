//! HTTP handlers and route configuration.

mod auth;
mod health;
mod multipart;
mod posts;
mod upload;

#[cfg(test)]
mod tests;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            // Post routes; listing and detail are public, mutation requires auth
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list_posts))
                    .route("", web::post().to(posts::create_post))
                    .route("/{id}", web::get().to(posts::get_post))
                    .route("/{id}", web::put().to(posts::update_post))
                    .route("/{id}", web::delete().to(posts::delete_post))
                    .route("/{id}/comments", web::post().to(posts::add_comment))
                    .route(
                        "/{id}/comments/{comment_id}",
                        web::put().to(posts::update_comment),
                    )
                    .route(
                        "/{id}/comments/{comment_id}",
                        web::delete().to(posts::delete_comment),
                    )
                    .route("/{id}/like", web::post().to(posts::like_post))
                    .route("/{id}/like", web::delete().to(posts::unlike_post)),
            )
            // Upload route
            .route("/upload", web::post().to(upload::upload_image)),
    );
}
