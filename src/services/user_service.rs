use std::sync::Arc;

use crate::{
    auth::{password, JwtService},
    errors::{AppError, AppResult},
    models::domain::user::{User, UserRole},
    models::dto::request::{LoginRequest, RegisterRequest},
    models::dto::response::{TokenResponse, UserDto},
    repositories::UserRepository,
};

pub struct UserService {
    repository: Arc<dyn UserRepository>,
    jwt_service: Arc<JwtService>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, jwt_service: Arc<JwtService>) -> Self {
        Self {
            repository,
            jwt_service,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<UserDto> {
        if self
            .repository
            .find_by_email(&request.email)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyExists("Email already registered".to_string()));
        }

        let password_hash = password::hash_password(&request.password)?;
        let user = User::new(
            &request.email,
            &password_hash,
            &request.full_name,
            request.role.unwrap_or(UserRole::Student),
        );

        let user = self.repository.create(user).await?;
        log::info!("Registered user {} ({})", user.id, user.email);

        Ok(user.into())
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<TokenResponse> {
        let user = self
            .repository
            .find_by_email(&request.email)
            .await?
            .filter(|u| u.is_active);

        // One failure path for unknown email and wrong password
        let invalid = || AppError::Unauthorized("Incorrect email or password".to_string());
        let user = user.ok_or_else(invalid)?;

        if !password::verify_password(&request.password, &user.password_hash)? {
            return Err(invalid());
        }

        let token = self.jwt_service.create_token(&user)?;
        Ok(TokenResponse::bearer(token))
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<UserDto> {
        let user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", id)))?;
        Ok(user.into())
    }
}
