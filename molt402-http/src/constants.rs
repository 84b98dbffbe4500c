//! HTTP-specific constants for moltbook.

/// Header carrying the hex HMAC-SHA256 of a webhook body.
pub const WEBHOOK_SIGNATURE_HEADER: &str = "x-moltbook-signature";

/// Header carrying an x402 payment proof (client → server).
pub const PROOF_HEADER: &str = molt402::proof::PROOF_HEADER;

/// Default moltbook API base URL.
pub const DEFAULT_MOLTBOOK_URL: &str = "https://api.moltbook.com/v1/";

/// Currency used for payment intents when none is given.
pub const DEFAULT_CURRENCY: &str = "SOL";
