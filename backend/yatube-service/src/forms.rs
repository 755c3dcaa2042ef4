//! Form parsing and validation.
//!
//! Forms normalise raw input (trimming text, parsing ids) and validate it.
//! Problems are collected into `FormErrors` and shown next to the inputs;
//! they never become `AppError`s.

use actix_multipart::Multipart;
use futures_util::StreamExt;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use validator::{Validate, ValidationErrors};

use crate::error::Result;
use crate::models::{Group, Post};

/// Key for errors not tied to one input.
pub const NON_FIELD_ERRORS: &str = "__all__";

pub const POST_TEXT_REQUIRED: &str = "Введите текст поста";
pub const COMMENT_TEXT_REQUIRED: &str = "Введите текст комментария";
pub const INVALID_CHOICE: &str =
    "Выберите корректный вариант. Вашего варианта нет среди допустимых значений.";
pub const INVALID_IMAGE: &str =
    "Загрузите правильное изображение. Файл, который вы загрузили, поврежден или не является изображением.";
pub const IMAGE_TOO_LARGE: &str = "Файл слишком большой.";
pub const USERNAME_TAKEN: &str = "Пользователь с таким именем уже существует.";
pub const PASSWORD_MISMATCH: &str = "Введённые пароли не совпадают.";
pub const BAD_CREDENTIALS: &str =
    "Пожалуйста, введите правильные имя пользователя и пароль. Оба поля могут быть чувствительны к регистру.";

/// Validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    fn extend_from(&mut self, errors: &ValidationErrors) {
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                self.add(&field.to_string(), message);
            }
        }
    }
}

/// Outcome of cleaning a submitted form.
#[derive(Debug)]
pub enum Submission<T> {
    Accepted(T),
    Rejected(FormErrors),
}

impl<T> Submission<T> {
    fn from_errors(errors: FormErrors, value: impl FnOnce() -> T) -> Self {
        if errors.is_empty() {
            Submission::Accepted(value())
        } else {
            Submission::Rejected(errors)
        }
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

/// An uploaded file, held in memory until the form is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Post create/edit form.
#[derive(Debug, Clone, Default, Validate)]
pub struct PostForm {
    #[validate(length(min = 1, message = "Введите текст поста"))]
    pub text: String,
    /// Raw `<select>` value; empty means no group.
    pub group: Option<String>,
    pub image: Option<UploadedImage>,
    image_too_large: bool,
}

/// A post form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanPost {
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<UploadedImage>,
}

impl PostForm {
    pub fn new(text: &str, group: Option<&str>, image: Option<UploadedImage>) -> Self {
        Self {
            text: text.to_string(),
            group: group.map(str::to_string),
            image,
            image_too_large: false,
        }
    }

    /// Read the form from a `multipart/form-data` body. Files larger than
    /// `max_upload_bytes` are dropped and reported as a form error.
    pub async fn from_multipart(mut payload: Multipart, max_upload_bytes: usize) -> Result<Self> {
        let mut form = PostForm::default();

        while let Some(field) = payload.next().await {
            let mut field = field?;
            let name = field.name().unwrap_or_default().to_string();
            let filename = field
                .content_disposition()
                .and_then(|cd| cd.get_filename())
                .map(str::to_string);

            let mut data = Vec::new();
            let mut oversized = false;
            while let Some(chunk) = field.next().await {
                let chunk = chunk?;
                if oversized {
                    continue;
                }
                if data.len() + chunk.len() > max_upload_bytes {
                    oversized = true;
                    data.clear();
                    continue;
                }
                data.extend_from_slice(&chunk);
            }

            match name.as_str() {
                "text" => form.text = String::from_utf8_lossy(&data).into_owned(),
                "group" => form.group = Some(String::from_utf8_lossy(&data).into_owned()),
                "image" if oversized => form.image_too_large = true,
                "image" => {
                    // browsers send an empty part when no file was picked
                    let filename = filename.unwrap_or_default();
                    if !filename.is_empty() || !data.is_empty() {
                        form.image = Some(UploadedImage {
                            filename,
                            bytes: data,
                        });
                    }
                }
                other => tracing::debug!(field = %other, "ignoring unknown form field"),
            }
        }

        Ok(form)
    }

    /// Validate against the groups that exist.
    pub fn clean(mut self, groups: &[Group]) -> Submission<CleanPost> {
        self.text = self.text.trim().to_string();

        let mut errors = FormErrors::new();
        if let Err(e) = self.validate() {
            errors.extend_from(&e);
        }

        let group_id = match self.group.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match raw.parse::<i64>() {
                Ok(id) if groups.iter().any(|g| g.id == id) => Some(id),
                _ => {
                    errors.add("group", INVALID_CHOICE);
                    None
                }
            },
        };

        if self.image_too_large {
            errors.add("image", IMAGE_TOO_LARGE);
        } else if let Some(upload) = &self.image {
            if upload.bytes.is_empty() || image::guess_format(&upload.bytes).is_err() {
                errors.add("image", INVALID_IMAGE);
            }
        }

        let PostForm { text, image, .. } = self;
        Submission::from_errors(errors, || CleanPost {
            text,
            group_id,
            image,
        })
    }
}

/// Field labels and help texts shown on the post form.
#[derive(Debug, Clone, Serialize)]
pub struct PostFormLabels {
    pub text: &'static str,
    pub group: &'static str,
    pub image: &'static str,
}

pub const POST_FORM_LABELS: PostFormLabels = PostFormLabels {
    text: "Текст поста",
    group: "Группа",
    image: "Картинка",
};

/// Template view of the post form: current values plus any errors.
#[derive(Debug, Clone, Serialize)]
pub struct PostFormView {
    pub text: String,
    pub group: Option<i64>,
    pub image_url: Option<String>,
    pub image_name: Option<String>,
    pub labels: PostFormLabels,
    pub help: PostFormLabels,
    pub errors: FormErrors,
}

impl PostFormView {
    pub fn blank() -> Self {
        Self {
            text: String::new(),
            group: None,
            image_url: None,
            image_name: None,
            labels: POST_FORM_LABELS,
            help: post_form_help(),
            errors: FormErrors::new(),
        }
    }

    /// Pre-filled from an existing post.
    pub fn for_post(post: &Post) -> Self {
        Self {
            text: post.text.clone(),
            group: post.group_id,
            image_url: post.image.as_deref().map(crate::urls::media),
            image_name: post.image.clone(),
            ..Self::blank()
        }
    }

    /// Echo a rejected submission back.
    pub fn rejected(form: &PostForm, errors: FormErrors) -> Self {
        Self {
            text: form.text.clone(),
            group: form
                .group
                .as_deref()
                .and_then(|g| g.trim().parse::<i64>().ok()),
            errors,
            ..Self::blank()
        }
    }
}

fn post_form_help() -> PostFormLabels {
    let help = |name: &str| Post::field(name).map(|f| f.help_text).unwrap_or("");
    PostFormLabels {
        text: help("text"),
        group: help("group"),
        image: help("image"),
    }
}

/// Comment form on the post detail page.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CommentForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Введите текст комментария"))]
    pub text: String,
}

impl CommentForm {
    pub fn clean(mut self) -> Submission<String> {
        self.text = self.text.trim().to_string();

        let mut errors = FormErrors::new();
        if let Err(e) = self.validate() {
            errors.extend_from(&e);
        }
        let CommentForm { text } = self;
        Submission::from_errors(errors, || text)
    }
}

/// Template view of the comment form.
#[derive(Debug, Clone, Serialize)]
pub struct CommentFormView {
    pub label: &'static str,
    pub text: String,
    pub errors: FormErrors,
}

impl CommentFormView {
    pub fn blank() -> Self {
        Self {
            label: "Текст комментария",
            text: String::new(),
            errors: FormErrors::new(),
        }
    }

    pub fn rejected(text: &str, errors: FormErrors) -> Self {
        Self {
            text: text.to_string(),
            errors,
            ..Self::blank()
        }
    }
}

/// Registration form.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SignupForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 150,
        message = "Обязательное поле. Не более 150 символов."
    ))]
    pub username: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(email(message = "Введите правильный адрес электронной почты."))]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(length(
        min = 8,
        message = "Введённый пароль слишком короткий. Он должен содержать как минимум 8 символов."
    ))]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

/// A registration that passed validation; the password is still plain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanSignup {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

fn is_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

impl SignupForm {
    pub fn clean(mut self) -> Submission<CleanSignup> {
        self.username = self.username.trim().to_string();
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();

        let mut errors = FormErrors::new();
        if let Err(e) = self.validate() {
            errors.extend_from(&e);
        }
        if !self.username.chars().all(is_username_char) {
            errors.add(
                "username",
                "Введите правильное имя пользователя. Оно может содержать только буквы, цифры и знаки @/./+/-/_.",
            );
        }
        if !self.password1.is_empty() && self.password1.chars().all(|c| c.is_ascii_digit()) {
            errors.add("password1", "Введённый пароль состоит только из цифр.");
        }
        if self.password1 != self.password2 {
            errors.add("password2", PASSWORD_MISMATCH);
        }

        let SignupForm {
            first_name,
            last_name,
            username,
            email,
            password1,
            ..
        } = self;
        Submission::from_errors(errors, || CleanSignup {
            username,
            email: email.unwrap_or_default(),
            first_name,
            last_name,
            password: password1,
        })
    }
}

/// One input of the signup page.
#[derive(Debug, Clone, Serialize)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub input_type: &'static str,
    pub value: String,
    pub errors: Vec<String>,
}

/// Inputs of the signup page, echoing everything but passwords.
pub fn signup_fields(form: &SignupForm, errors: &FormErrors) -> Vec<FieldView> {
    let field = |name: &'static str, label: &'static str, input_type: &'static str, value: &str| FieldView {
        name,
        label,
        input_type,
        value: value.to_string(),
        errors: errors.get(name).to_vec(),
    };
    vec![
        field("first_name", "Имя", "text", &form.first_name),
        field("last_name", "Фамилия", "text", &form.last_name),
        field("username", "Имя пользователя", "text", &form.username),
        field(
            "email",
            "Адрес электронной почты",
            "email",
            form.email.as_deref().unwrap_or(""),
        ),
        field("password1", "Пароль", "password", ""),
        field("password2", "Подтверждение пароля", "password", ""),
    ]
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}
