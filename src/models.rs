use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub date_joined: i64,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password1: String,
    pub password2: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}
