// Fixed defaults for the chat service. Anything a deployment may want to
// change is surfaced as a CLI flag in `config`, with these as the fallback.

pub const DEFAULT_API_URL: &str = "https://api.mistral.ai/v1";
pub const DEFAULT_CHAT_MODEL: &str = "mistral-medium";
pub const DEFAULT_CONSULTANT_MODEL: &str = "mistral-large";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
pub const DEFAULT_PORT: u16 = 3000;

pub const API_KEY_ENV: &str = "MISTRAL_API_KEY";

// User-facing error strings returned in `{ "error": ... }` bodies.
pub const INVALID_MESSAGES: &str = "Invalid messages format";
pub const INVALID_API_KEY: &str = "Invalid Mistral API key";
pub const RATE_LIMITED: &str = "Rate limit exceeded for Mistral API";
pub const UPSTREAM_FAILED: &str = "Failed to communicate with Mistral API";
