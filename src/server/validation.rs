use crate::server::response::ApiError;

const MAX_USERNAME_LEN: usize = 80;
const MAX_EMAIL_LEN: usize = 200;
const MAX_TITLE_LEN: usize = 200;
const MAX_ARTIST_LEN: usize = 200;

pub fn validate_username(username: &str) -> Result<(), ApiError> {
    if username.trim().is_empty() {
        return Err(ApiError::bad_request("Username cannot be empty"));
    }
    if username.len() > MAX_USERNAME_LEN {
        return Err(ApiError::bad_request(format!(
            "Username cannot exceed {MAX_USERNAME_LEN} characters"
        )));
    }
    if username.contains(char::is_whitespace) {
        return Err(ApiError::bad_request("Username cannot contain whitespace"));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.trim().is_empty() {
        return Err(ApiError::bad_request("Email cannot be empty"));
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(ApiError::bad_request(format!(
            "Email cannot exceed {MAX_EMAIL_LEN} characters"
        )));
    }
    if !email.contains('@') {
        return Err(ApiError::bad_request("Email must contain '@'"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.is_empty() {
        return Err(ApiError::bad_request("Password cannot be empty"));
    }
    Ok(())
}

pub fn validate_tab_fields(title: &str, artist: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::bad_request("Title cannot be empty"));
    }
    if title.len() > MAX_TITLE_LEN {
        return Err(ApiError::bad_request(format!(
            "Title cannot exceed {MAX_TITLE_LEN} characters"
        )));
    }
    if artist.trim().is_empty() {
        return Err(ApiError::bad_request("Artist cannot be empty"));
    }
    if artist.len() > MAX_ARTIST_LEN {
        return Err(ApiError::bad_request(format!(
            "Artist cannot exceed {MAX_ARTIST_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_difficulty(difficulty: i32) -> Result<(), ApiError> {
    if !(1..=5).contains(&difficulty) {
        return Err(ApiError::bad_request("Difficulty must be between 1 and 5"));
    }
    Ok(())
}
