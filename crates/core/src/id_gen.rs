//! Client-side order identifiers
//!
//! Venues that accept a caller-chosen order id (Binance `newClientOrderId`)
//! get a nanoid drawn from an alphabet every venue accepts.

use nanoid::nanoid;

/// Alphanumeric alphabet; Binance restricts client ids to `[.A-Z:/a-z0-9_-]`
const ID_ALPHABET: [char; 62] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I',
    'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b',
    'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u',
    'v', 'w', 'x', 'y', 'z',
];

/// Random 12 character id
pub fn generate_id() -> String {
    nanoid!(12, &ID_ALPHABET)
}

/// Client order id with a short prefix, capped at 36 characters
pub fn client_order_id(prefix: &str) -> String {
    let mut id = format!("{prefix}{}", nanoid!(20, &ID_ALPHABET));
    id.truncate(36);
    id
}
