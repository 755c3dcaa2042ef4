/// Comment service - replies under posts
use std::sync::Arc;

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::forms::{CommentForm, Submission};
use crate::metrics::COMMENTS_CREATED_TOTAL;
use crate::middleware::SessionUser;
use crate::models::{Comment, NewComment};

pub struct CommentService {
    store: Arc<dyn Store>,
}

impl CommentService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Add a comment by `author` to an existing post.
    pub async fn add(
        &self,
        post_id: i64,
        author: &SessionUser,
        form: CommentForm,
    ) -> Result<Submission<Comment>> {
        if self.store.find_post(post_id).await?.is_none() {
            return Err(AppError::NotFound(format!("post {}", post_id)));
        }

        let text = match form.clean() {
            Submission::Accepted(text) => text,
            Submission::Rejected(errors) => return Ok(Submission::Rejected(errors)),
        };

        let comment = self
            .store
            .create_comment(NewComment {
                post_id,
                author_id: author.id,
                text,
            })
            .await?;

        COMMENTS_CREATED_TOTAL.inc();
        tracing::debug!(post_id, comment_id = comment.id, "comment added");
        Ok(Submission::Accepted(comment))
    }

    pub async fn for_post(&self, post_id: i64) -> Result<Vec<Comment>> {
        self.store.list_comments(post_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{NewPost, NewUser};

    #[tokio::test]
    async fn comments_need_text_and_a_post() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let user = store
            .create_user(NewUser {
                username: "reader".into(),
                email: String::new(),
                first_name: String::new(),
                last_name: String::new(),
                password_hash: String::new(),
            })
            .await
            .unwrap();
        let post = store
            .create_post(NewPost {
                author_id: user.id,
                text: "Пост".into(),
                group_id: None,
                image: None,
            })
            .await
            .unwrap();
        let author = SessionUser {
            id: user.id,
            username: user.username.clone(),
        };
        let service = CommentService::new(store.clone());

        let added = service
            .add(post.id, &author, CommentForm { text: " Отлично ".into() })
            .await
            .unwrap();
        assert!(matches!(added, Submission::Accepted(ref c) if c.text == "Отлично"));

        let blank = service
            .add(post.id, &author, CommentForm { text: "".into() })
            .await
            .unwrap();
        assert!(matches!(blank, Submission::Rejected(_)));
        assert_eq!(service.for_post(post.id).await.unwrap().len(), 1);

        assert!(matches!(
            service
                .add(post.id + 1, &author, CommentForm { text: "?".into() })
                .await,
            Err(AppError::NotFound(_))
        ));
    }
}
