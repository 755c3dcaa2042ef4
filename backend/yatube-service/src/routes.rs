//! URL routing table.

use actix_web::web;

use crate::handlers::{about, auth, comments, follow, health, media, posts};
use crate::metrics::serve_metrics;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(posts::index))
        .route("/group/{slug}/", web::get().to(posts::group_list))
        .route("/profile/{username}/", web::get().to(posts::profile))
        .service(
            web::resource("/profile/{username}/follow/")
                .route(web::get().to(follow::profile_follow))
                .route(web::post().to(follow::profile_follow)),
        )
        .service(
            web::resource("/profile/{username}/unfollow/")
                .route(web::get().to(follow::profile_unfollow))
                .route(web::post().to(follow::profile_unfollow)),
        )
        .route("/posts/{post_id}/", web::get().to(posts::post_detail))
        .service(
            web::resource("/posts/{post_id}/edit/")
                .route(web::get().to(posts::post_edit_form))
                .route(web::post().to(posts::post_edit)),
        )
        .route(
            "/posts/{post_id}/comment/",
            web::post().to(comments::add_comment),
        )
        .service(
            web::resource("/create/")
                .route(web::get().to(posts::post_create_form))
                .route(web::post().to(posts::post_create)),
        )
        .route("/follow/", web::get().to(follow::follow_index))
        .service(
            web::scope("/about")
                .route("/author/", web::get().to(about::author))
                .route("/tech/", web::get().to(about::tech)),
        )
        .service(
            web::scope("/auth")
                .service(
                    web::resource("/signup/")
                        .route(web::get().to(auth::signup_form))
                        .route(web::post().to(auth::signup)),
                )
                .service(
                    web::resource("/login/")
                        .route(web::get().to(auth::login_form))
                        .route(web::post().to(auth::login)),
                )
                .service(
                    web::resource("/logout/")
                        .route(web::get().to(auth::logout))
                        .route(web::post().to(auth::logout)),
                ),
        )
        .route("/media/{name:.+}", web::get().to(media::serve_media))
        .route("/health", web::get().to(health::health))
        .route("/health/ready", web::get().to(health::readiness))
        .route("/metrics", web::get().to(serve_metrics));
}
