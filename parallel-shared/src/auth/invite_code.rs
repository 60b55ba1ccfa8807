/// Workspace invite codes
///
/// An invite code is a short base62 string. It is stored in plain form
/// because it is shown to workspace admins for sharing; resetting it makes
/// the previous code useless.

use rand::Rng;

/// Length of an invite code (characters)
pub const INVITE_CODE_LENGTH: usize = 10;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generates a new invite code from the thread RNG
///
/// # Example
///
/// ```
/// use parallel_shared::auth::invite_code::{generate_invite_code, is_valid_invite_code};
///
/// let code = generate_invite_code();
/// assert_eq!(code.len(), 10);
/// assert!(is_valid_invite_code(&code));
/// ```
pub fn generate_invite_code() -> String {
    let mut rng = rand::thread_rng();

    (0..INVITE_CODE_LENGTH)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

/// Checks the shape of a presented code before touching the database
pub fn is_valid_invite_code(code: &str) -> bool {
    code.len() == INVITE_CODE_LENGTH && code.bytes().all(|b| b.is_ascii_alphanumeric())
}
