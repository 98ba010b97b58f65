use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub token_path: String,
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            api_base_url: env::var("BRISA_API_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            token_path: env::var("BRISA_TOKEN_PATH")
                .unwrap_or_else(|_| "./.brisa-token".to_string()),
            request_timeout_secs: env::var("BRISA_TIMEOUT_SECS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .expect("BRISA_TIMEOUT_SECS must be a number of seconds"),
        }
    }
}
