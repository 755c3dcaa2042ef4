/// Business logic layer
///
/// Services hold the blog rules and talk to storage through `db::Store`.
/// Handlers only translate between HTTP and these calls.
pub mod accounts;
pub mod comments;
pub mod follows;
pub mod posts;

pub use accounts::AccountService;
pub use comments::CommentService;
pub use follows::FollowService;
pub use posts::{EditAccess, PostDetail, PostService, ProfilePage};

use crate::db::Store;
use crate::error::Result;
use crate::models::{Post, PostFilter};
use crate::pagination::{Page, Paginator};

/// Fetch one page of `filter`, resolving `raw_page` leniently.
pub(crate) async fn list_page(
    store: &dyn Store,
    filter: PostFilter,
    raw_page: Option<&str>,
    per_page: usize,
) -> Result<Page<Post>> {
    let count = store.count_posts(filter).await?.max(0) as usize;
    let paginator = Paginator::new(count, per_page);
    let window = paginator.window(raw_page);

    let posts = store
        .list_posts(filter, window.limit as i64, window.offset as i64)
        .await?;
    Ok(Page::new(posts, window, &paginator))
}
