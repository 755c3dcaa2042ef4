/// Account service - registration and login
use std::sync::Arc;

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::forms::{FormErrors, SignupForm, Submission, USERNAME_TAKEN};
use crate::models::{NewUser, User};
use crate::security::{hash_password, verify_password};

pub struct AccountService {
    store: Arc<dyn Store>,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Register a new user from the signup form.
    pub async fn signup(&self, form: SignupForm) -> Result<Submission<User>> {
        let clean = match form.clean() {
            Submission::Accepted(clean) => clean,
            Submission::Rejected(errors) => return Ok(Submission::Rejected(errors)),
        };

        if self
            .store
            .find_user_by_username(&clean.username)
            .await?
            .is_some()
        {
            return Ok(Submission::Rejected(FormErrors::single(
                "username",
                USERNAME_TAKEN,
            )));
        }

        let password_hash = hash_password(&clean.password)?;
        let created = self
            .store
            .create_user(NewUser {
                username: clean.username,
                email: clean.email,
                first_name: clean.first_name,
                last_name: clean.last_name,
                password_hash,
            })
            .await;

        match created {
            Ok(user) => {
                tracing::info!(user_id = user.id, username = %user.username, "user registered");
                Ok(Submission::Accepted(user))
            }
            // lost a race with a concurrent signup
            Err(AppError::Conflict(_)) => Ok(Submission::Rejected(FormErrors::single(
                "username",
                USERNAME_TAKEN,
            ))),
            Err(e) => Err(e),
        }
    }

    /// Check credentials. Unknown users and wrong passwords look the same.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        let user = match self.store.find_user_by_username(username.trim()).await? {
            Some(user) => user,
            None => return Ok(None),
        };

        if verify_password(password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            tracing::debug!(username = %user.username, "password mismatch");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn form(username: &str, password: &str) -> SignupForm {
        SignupForm {
            username: username.into(),
            password1: password.into(),
            password2: password.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn signup_then_authenticate() {
        let service = AccountService::new(Arc::new(MemoryStore::new()));

        let user = match service.signup(form("leo", "War-and-Peace")).await.unwrap() {
            Submission::Accepted(user) => user,
            Submission::Rejected(errors) => panic!("unexpected errors: {:?}", errors),
        };
        assert_ne!(user.password_hash, "War-and-Peace");

        let found = service.authenticate("leo", "War-and-Peace").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
        assert!(service.authenticate("leo", "wrong-pass").await.unwrap().is_none());
        assert!(service.authenticate("nobody", "War-and-Peace").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_is_a_form_error() {
        let service = AccountService::new(Arc::new(MemoryStore::new()));
        service.signup(form("leo", "War-and-Peace")).await.unwrap();

        match service.signup(form("leo", "Anna-Karenina")).await.unwrap() {
            Submission::Rejected(errors) => {
                assert_eq!(errors.get("username"), [USERNAME_TAKEN.to_string()]);
            }
            Submission::Accepted(_) => panic!("duplicate username accepted"),
        }
    }
}
