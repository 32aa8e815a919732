pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_TOP_K: usize = 2;
pub const MAX_TOP_K: u64 = 100;
pub const DEFAULT_EMBED_CONCURRENCY: usize = 4;
pub const MAX_EMBED_CONCURRENCY: u64 = 64;
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";
pub const DEFAULT_GENERATION_MODEL: &str = "mistral";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

pub fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}
