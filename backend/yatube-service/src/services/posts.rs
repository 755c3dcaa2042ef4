/// Post service - listings, detail pages, create and edit
use std::sync::Arc;

use super::list_page;
use crate::db::Store;
use crate::error::{AppError, Result};
use crate::forms::{CleanPost, PostForm, Submission};
use crate::media::MediaStorage;
use crate::metrics::POSTS_CREATED_TOTAL;
use crate::middleware::SessionUser;
use crate::models::{Comment, Group, NewPost, Post, PostChanges, PostFilter, User};
use crate::pagination::Page;

pub struct PostService {
    store: Arc<dyn Store>,
    media: MediaStorage,
    per_page: usize,
}

/// Everything the profile page shows.
#[derive(Debug)]
pub struct ProfilePage {
    pub author: User,
    pub posts_count: usize,
    pub page: Page<Post>,
    /// Whether the viewer follows `author`; false for anonymous viewers.
    pub following: bool,
}

#[derive(Debug)]
pub struct PostDetail {
    pub post: Post,
    pub comments: Vec<Comment>,
    pub author_posts_count: i64,
}

/// Result of checking who may edit a post.
#[derive(Debug)]
pub enum EditAccess {
    Allowed(Post),
    /// Someone other than the author; they are sent back to the post.
    Denied(Post),
}

impl PostService {
    pub fn new(store: Arc<dyn Store>, media: MediaStorage, per_page: usize) -> Self {
        Self {
            store,
            media,
            per_page,
        }
    }

    pub async fn index(&self, raw_page: Option<&str>) -> Result<Page<Post>> {
        list_page(self.store.as_ref(), PostFilter::All, raw_page, self.per_page).await
    }

    pub async fn group_posts(&self, slug: &str, raw_page: Option<&str>) -> Result<(Group, Page<Post>)> {
        let group = self
            .store
            .find_group_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("group '{}'", slug)))?;

        let page = list_page(
            self.store.as_ref(),
            PostFilter::Group(group.id),
            raw_page,
            self.per_page,
        )
        .await?;
        Ok((group, page))
    }

    pub async fn profile(
        &self,
        username: &str,
        raw_page: Option<&str>,
        viewer: Option<&SessionUser>,
    ) -> Result<ProfilePage> {
        let author = self
            .store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{}'", username)))?;

        let page = list_page(
            self.store.as_ref(),
            PostFilter::Author(author.id),
            raw_page,
            self.per_page,
        )
        .await?;

        let following = match viewer {
            Some(viewer) if viewer.id != author.id => {
                self.store.is_following(viewer.id, author.id).await?
            }
            _ => false,
        };

        Ok(ProfilePage {
            posts_count: page.count,
            author,
            page,
            following,
        })
    }

    pub async fn detail(&self, post_id: i64) -> Result<PostDetail> {
        let post = self.find(post_id).await?;
        let comments = self.store.list_comments(post.id).await?;
        let author_posts_count = self
            .store
            .count_posts(PostFilter::Author(post.author_id))
            .await?;

        Ok(PostDetail {
            post,
            comments,
            author_posts_count,
        })
    }

    pub async fn find(&self, post_id: i64) -> Result<Post> {
        self.store
            .find_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))
    }

    /// Groups offered on the post form.
    pub async fn groups(&self) -> Result<Vec<Group>> {
        self.store.list_groups().await
    }

    /// Validate and publish a new post by `author`.
    pub async fn create(&self, author: &SessionUser, form: PostForm) -> Result<Submission<Post>> {
        let groups = self.groups().await?;
        let clean = match form.clean(&groups) {
            Submission::Accepted(clean) => clean,
            Submission::Rejected(errors) => return Ok(Submission::Rejected(errors)),
        };

        let CleanPost {
            text,
            group_id,
            image,
        } = clean;
        let image = match image {
            Some(upload) => Some(self.media.save(&upload.filename, &upload.bytes).await?),
            None => None,
        };

        let post = self
            .store
            .create_post(NewPost {
                author_id: author.id,
                text,
                group_id,
                image,
            })
            .await?;

        POSTS_CREATED_TOTAL.inc();
        tracing::info!(post_id = post.id, author = %author.username, "post created");
        Ok(Submission::Accepted(post))
    }

    /// Load a post for editing by `user`.
    pub async fn editable(&self, post_id: i64, user: &SessionUser) -> Result<EditAccess> {
        let post = self.find(post_id).await?;
        if post.is_authored_by(user.id) {
            Ok(EditAccess::Allowed(post))
        } else {
            tracing::warn!(post_id, user = %user.username, "edit attempt by non-author");
            Ok(EditAccess::Denied(post))
        }
    }

    /// Apply an edit to a post the caller already checked with `editable`.
    /// The publication date never changes; a missing upload keeps the
    /// current image.
    pub async fn update(&self, post: &Post, form: PostForm) -> Result<Submission<Post>> {
        let groups = self.groups().await?;
        let clean = match form.clean(&groups) {
            Submission::Accepted(clean) => clean,
            Submission::Rejected(errors) => return Ok(Submission::Rejected(errors)),
        };

        let image = match clean.image {
            Some(upload) => Some(self.media.save(&upload.filename, &upload.bytes).await?),
            None => None,
        };

        let updated = self
            .store
            .update_post(
                post.id,
                PostChanges {
                    text: clean.text,
                    group_id: clean.group_id,
                    image,
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post.id)))?;

        tracing::info!(post_id = updated.id, "post updated");
        Ok(Submission::Accepted(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{NewGroup, NewUser};

    async fn setup() -> (PostService, Arc<dyn Store>, User, tempfile::TempDir) {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let author = store
            .create_user(NewUser {
                username: "auth".into(),
                email: String::new(),
                first_name: String::new(),
                last_name: String::new(),
                password_hash: String::new(),
            })
            .await
            .unwrap();
        let media = tempfile::tempdir().unwrap();
        let service = PostService::new(store.clone(), MediaStorage::new(media.path()), 10);
        (service, store, author, media)
    }

    fn session(user: &User) -> SessionUser {
        SessionUser {
            id: user.id,
            username: user.username.clone(),
        }
    }

    #[tokio::test]
    async fn create_stores_trimmed_post() {
        let (service, store, author, _media) = setup().await;
        let group = store
            .create_group(NewGroup {
                title: "Группа".into(),
                slug: "group".into(),
                description: String::new(),
            })
            .await
            .unwrap();

        let form = PostForm::new("  Новый пост  ", Some(&group.id.to_string()), None);
        let post = match service.create(&session(&author), form).await.unwrap() {
            Submission::Accepted(post) => post,
            Submission::Rejected(errors) => panic!("unexpected errors: {:?}", errors),
        };
        assert_eq!(post.text, "Новый пост");
        assert_eq!(post.group_id, Some(group.id));
        assert_eq!(store.count_posts(PostFilter::All).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn rejected_form_stores_nothing() {
        let (service, store, author, _media) = setup().await;
        let result = service
            .create(&session(&author), PostForm::new("   ", None, None))
            .await
            .unwrap();
        assert!(matches!(result, Submission::Rejected(_)));
        assert_eq!(store.count_posts(PostFilter::All).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn only_author_may_edit() {
        let (service, store, author, _media) = setup().await;
        let post = store
            .create_post(NewPost {
                author_id: author.id,
                text: "Текст".into(),
                group_id: None,
                image: None,
            })
            .await
            .unwrap();
        let stranger = SessionUser {
            id: author.id + 100,
            username: "stranger".into(),
        };

        assert!(matches!(
            service.editable(post.id, &session(&author)).await.unwrap(),
            EditAccess::Allowed(_)
        ));
        assert!(matches!(
            service.editable(post.id, &stranger).await.unwrap(),
            EditAccess::Denied(_)
        ));
        assert!(matches!(
            service.editable(post.id + 1, &stranger).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_keeps_pub_date() {
        let (service, store, author, _media) = setup().await;
        let post = store
            .create_post(NewPost {
                author_id: author.id,
                text: "Старый текст".into(),
                group_id: None,
                image: None,
            })
            .await
            .unwrap();

        let updated = match service
            .update(&post, PostForm::new("Новый текст", None, None))
            .await
            .unwrap()
        {
            Submission::Accepted(post) => post,
            Submission::Rejected(errors) => panic!("unexpected errors: {:?}", errors),
        };
        assert_eq!(updated.text, "Новый текст");
        assert_eq!(updated.pub_date, post.pub_date);
    }

    #[tokio::test]
    async fn unknown_group_and_user_are_not_found() {
        let (service, _store, _author, _media) = setup().await;
        assert!(matches!(
            service.group_posts("missing", None).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.profile("nobody", None, None).await,
            Err(AppError::NotFound(_))
        ));
    }
}
