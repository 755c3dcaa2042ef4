//! HTML templates.
//!
//! Templates are compiled into the binary and parsed once into a shared
//! Tera instance. `.html` templates are auto-escaped.

use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use tera::{Context, Tera};

use crate::error::Result;
use crate::middleware::SessionUser;

static TEMPLATES: Lazy<Tera> = Lazy::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("base.html", include_str!("../templates/base.html")),
        ("includes/header.html", include_str!("../templates/includes/header.html")),
        ("includes/footer.html", include_str!("../templates/includes/footer.html")),
        ("includes/paginator.html", include_str!("../templates/includes/paginator.html")),
        ("includes/post_card.html", include_str!("../templates/includes/post_card.html")),
        ("includes/form_errors.html", include_str!("../templates/includes/form_errors.html")),
        ("posts/index.html", include_str!("../templates/posts/index.html")),
        ("posts/group_list.html", include_str!("../templates/posts/group_list.html")),
        ("posts/profile.html", include_str!("../templates/posts/profile.html")),
        ("posts/post_detail.html", include_str!("../templates/posts/post_detail.html")),
        ("posts/create_post.html", include_str!("../templates/posts/create_post.html")),
        ("posts/follow.html", include_str!("../templates/posts/follow.html")),
        ("about/author.html", include_str!("../templates/about/author.html")),
        ("about/tech.html", include_str!("../templates/about/tech.html")),
        ("users/signup.html", include_str!("../templates/users/signup.html")),
        ("users/login.html", include_str!("../templates/users/login.html")),
        ("users/logged_out.html", include_str!("../templates/users/logged_out.html")),
        ("core/400.html", include_str!("../templates/core/400.html")),
        ("core/404.html", include_str!("../templates/core/404.html")),
        ("core/500.html", include_str!("../templates/core/500.html")),
    ])
    .expect("embedded templates must parse");
    tera.set_escape_fn(escape_html);
    tera
});

/// HTML escaping for template output. Unlike Tera's default, `/` is left
/// alone so URLs stay readable in the markup.
fn escape_html(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#x27;"),
            _ => output.push(c),
        }
    }
    output
}

/// Render `name` with `context`.
pub fn render(name: &str, context: &Context) -> Result<String> {
    Ok(TEMPLATES.render(name, context)?)
}

/// Context every page starts from: the visitor shown in the header.
pub fn page_context(viewer: &Option<SessionUser>) -> Context {
    let mut context = Context::new();
    context.insert("user", viewer);
    context.insert("year", &chrono::Utc::now().format("%Y").to_string());
    context
}

/// Render `name` into a 200 HTML response.
pub fn render_page(name: &str, context: &Context) -> Result<HttpResponse> {
    let body = render(name, context)?;
    Ok(html(body))
}

pub fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(mime::TEXT_HTML_UTF_8)
        .body(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_templates_parse() {
        assert!(TEMPLATES.get_template_names().count() >= 20);
    }

    #[test]
    fn about_pages_render_for_anonymous() {
        let context = page_context(&None);
        let author = render("about/author.html", &context).unwrap();
        assert!(author.contains("<title>Об авторе проекта</title>"));
        let tech = render("about/tech.html", &context).unwrap();
        assert!(tech.contains("<title>Технологии</title>"));
    }

    #[test]
    fn header_shows_logged_in_user() {
        let viewer = Some(SessionUser {
            id: 1,
            username: "TestUser".into(),
        });
        let page = render("about/tech.html", &page_context(&viewer)).unwrap();
        assert!(page.contains("TestUser"));
        assert!(page.contains("/auth/logout/"));
    }

    #[test]
    fn user_text_is_escaped() {
        let mut context = page_context(&None);
        context.insert("path", "<script>alert(1)</script>");
        let page = render("core/404.html", &context).unwrap();
        assert!(!page.contains("<script>alert(1)</script>"));
        assert!(page.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn escaping_keeps_slashes() {
        assert_eq!(escape_html("/posts/1/"), "/posts/1/");
        assert_eq!(
            escape_html("<a href='x'>&</a>"),
            "&lt;a href=&#x27;x&#x27;&gt;&amp;&lt;/a&gt;"
        );
    }
}
