/// View tests: listings, pagination, page contents, cache and follows.
mod common;

use actix_web::{http::StatusCode, test};
use common::{body_string, card_count, location, TestApp};
use yatube_service::build_app;
use yatube_service::cache::PageCache;
use yatube_service::models::PostFilter;

const POSTS_TOTAL: usize = 17;

#[actix_web::test]
async fn listings_paginate_by_ten() {
    let t = TestApp::new();
    let author = t.user("auth").await;
    let group = t.group("Тестовая группа", "test-slug").await;
    for i in 0..POSTS_TOTAL {
        t.post(&author, &format!("Тестовый пост {}", i), Some(&group)).await;
    }
    let app = test::init_service(build_app(t.state.clone())).await;

    for base in ["/", "/group/test-slug/", "/profile/auth/"] {
        for (query, expected) in [("", 10), ("?page=2", 7), ("?page=abc", 10), ("?page=99", 7)] {
            t.cache.clear().await.unwrap();
            let uri = format!("{}{}", base, query);
            let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::OK, "{}", uri);
            assert_eq!(card_count(&body_string(resp).await), expected, "{}", uri);
        }
    }
}

#[actix_web::test]
async fn newest_post_comes_first() {
    let t = TestApp::new();
    let author = t.user("auth").await;
    t.post(&author, "Первый пост", None).await;
    t.post(&author, "Последний пост", None).await;
    let app = test::init_service(build_app(t.state.clone())).await;

    let body = body_string(
        test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await,
    )
    .await;
    let newest = body.find("Последний пост").unwrap();
    let oldest = body.find("Первый пост").unwrap();
    assert!(newest < oldest);
}

#[actix_web::test]
async fn group_page_shows_group_and_its_posts_only() {
    let t = TestApp::new();
    let author = t.user("auth").await;
    let group = t.group("Тестовая группа", "test-slug").await;
    let other = t.group("Другая группа", "other-slug").await;
    t.post(&author, "Пост в группе", Some(&group)).await;
    t.post(&author, "Пост в другой группе", Some(&other)).await;
    let app = test::init_service(build_app(t.state.clone())).await;

    let body = body_string(
        test::call_service(
            &app,
            test::TestRequest::get().uri("/group/test-slug/").to_request(),
        )
        .await,
    )
    .await;
    assert!(body.contains("<h1>Тестовая группа</h1>"));
    assert!(body.contains("test-slug"));
    assert!(body.contains("Тестовое описание"));
    assert!(body.contains("Пост в группе"));
    assert!(!body.contains("Пост в другой группе"));
}

#[actix_web::test]
async fn profile_and_detail_show_post_counts() {
    let t = TestApp::new();
    let author = t.user("auth").await;
    let post = t.post(&author, "Первый пост", None).await;
    t.post(&author, "Второй пост", None).await;
    let app = test::init_service(build_app(t.state.clone())).await;

    let body = body_string(
        test::call_service(&app, test::TestRequest::get().uri("/profile/auth/").to_request())
            .await,
    )
    .await;
    assert!(body.contains("Всего постов: 2"));

    let body = body_string(
        test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/posts/{}/", post.id))
                .to_request(),
        )
        .await,
    )
    .await;
    assert!(body.contains("Первый пост"));
    assert!(body.contains("Всего постов автора: <span>2</span>"));
}

#[actix_web::test]
async fn post_form_pages_have_expected_fields() {
    let t = TestApp::new();
    let author = t.user("auth").await;
    let post = t.post(&author, "Редактируемый текст", None).await;
    let app = test::init_service(build_app(t.state.clone())).await;

    let req = test::TestRequest::get()
        .uri("/create/")
        .cookie(t.login(&author))
        .to_request();
    let body = body_string(test::call_service(&app, req).await).await;
    for field in ["name=\"text\"", "name=\"group\"", "name=\"image\""] {
        assert!(body.contains(field), "create form lacks {}", field);
    }
    assert!(body.contains("Текст поста"));

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/edit/", post.id))
        .cookie(t.login(&author))
        .to_request();
    let body = body_string(test::call_service(&app, req).await).await;
    assert!(body.contains("<title>Редактировать пост</title>"));
    assert!(body.contains(">Редактируемый текст</textarea>"));
}

#[actix_web::test]
async fn index_is_served_from_cache() {
    let t = TestApp::new();
    let author = t.user("auth").await;
    let post = t.post(&author, "Кешированный пост", None).await;
    let app = test::init_service(build_app(t.state.clone())).await;

    let first = test::read_body(
        test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await,
    )
    .await;

    assert!(t.store.delete_post(post.id).await.unwrap());
    assert_eq!(t.store.count_posts(PostFilter::All).await.unwrap(), 0);

    let second = test::read_body(
        test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await,
    )
    .await;
    assert_eq!(first, second);

    t.cache.clear().await.unwrap();
    let third = test::read_body(
        test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await,
    )
    .await;
    assert_ne!(first, third);
}

#[actix_web::test]
async fn follow_and_unfollow() {
    let t = TestApp::new();
    let reader = t.user("reader").await;
    let writer = t.user("writer").await;
    let app = test::init_service(build_app(t.state.clone())).await;

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/profile/writer/follow/")
            .cookie(t.login(&reader))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), "/profile/writer/");
    }
    let following = t.store.list_following(reader.id).await.unwrap();
    assert_eq!(following.len(), 1);
    assert_eq!(following[0].id, writer.id);

    let req = test::TestRequest::post()
        .uri("/profile/writer/unfollow/")
        .cookie(t.login(&reader))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FOUND);
    assert!(!t.store.is_following(reader.id, writer.id).await.unwrap());
}

#[actix_web::test]
async fn self_follow_is_ignored() {
    let t = TestApp::new();
    let user = t.user("narcissus").await;
    let app = test::init_service(build_app(t.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/profile/narcissus/follow/")
        .cookie(t.login(&user))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FOUND);
    assert!(t.store.list_following(user.id).await.unwrap().is_empty());
}

#[actix_web::test]
async fn feed_shows_posts_of_followed_authors_only() {
    let t = TestApp::new();
    let follower = t.user("follower").await;
    let bystander = t.user("bystander").await;
    let writer = t.user("writer").await;
    t.store.create_follow(follower.id, writer.id).await.unwrap();
    t.post(&writer, "Пост для подписчиков", None).await;
    let app = test::init_service(build_app(t.state.clone())).await;

    let req = test::TestRequest::get()
        .uri("/follow/")
        .cookie(t.login(&follower))
        .to_request();
    let body = body_string(test::call_service(&app, req).await).await;
    assert!(body.contains("<title>Избранные авторы</title>"));
    assert_eq!(card_count(&body), 1);
    assert!(body.contains("Пост для подписчиков"));

    let req = test::TestRequest::get()
        .uri("/follow/")
        .cookie(t.login(&bystander))
        .to_request();
    let body = body_string(test::call_service(&app, req).await).await;
    assert_eq!(card_count(&body), 0);
}

#[actix_web::test]
async fn profile_offers_follow_button_to_others_only() {
    let t = TestApp::new();
    let reader = t.user("reader").await;
    let writer = t.user("writer").await;
    let app = test::init_service(build_app(t.state.clone())).await;

    let req = test::TestRequest::get()
        .uri("/profile/writer/")
        .cookie(t.login(&reader))
        .to_request();
    let body = body_string(test::call_service(&app, req).await).await;
    assert!(body.contains("/profile/writer/follow/"));

    let req = test::TestRequest::get()
        .uri("/profile/writer/")
        .cookie(t.login(&writer))
        .to_request();
    let body = body_string(test::call_service(&app, req).await).await;
    assert!(!body.contains("/profile/writer/follow/"));
}
