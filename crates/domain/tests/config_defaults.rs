use ym_domain::config::Config;

#[test]
fn default_host_is_localhost() {
    let config = Config::default();
    assert_eq!(config.server.host, "127.0.0.1");
}

#[test]
fn explicit_zero_host_parses() {
    let toml_str = r#"
[server]
host = "0.0.0.0"
port = 3000
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.host, "0.0.0.0");
}

#[test]
fn default_cors_allows_only_localhost() {
    let config = Config::default();
    assert!(config.server.cors.allowed_origins.contains(&"http://localhost:*".to_string()));
    assert!(config.server.cors.allowed_origins.contains(&"http://127.0.0.1:*".to_string()));
}

#[test]
fn context_budgets_stay_distinct() {
    let config = Config::default();
    assert_eq!(config.context.chat_max_chars, 100_000);
    assert_eq!(config.context.agent_context_max_chars, 25_000);
    assert_eq!(config.context.truncation_reserve_chars, 200);
}

#[test]
fn llm_defaults_target_gemini_openai_endpoint() {
    let config = Config::default();
    assert_eq!(config.llm.default_model, "gemini-2.0-flash");
    assert_eq!(config.llm.api_key_env, "GEMINI_API_KEY");
    assert!(config.llm.base_url.contains("generativelanguage.googleapis.com"));
    assert_eq!(config.llm.top_p, 0.95);
    assert_eq!(config.llm.max_tokens, 4096);
}

#[test]
fn partial_llm_section_keeps_other_defaults() {
    let toml_str = r#"
[llm]
default_model = "gemini-1.5-pro"
stream_idle_timeout_secs = 15

[context]
chat_max_chars = 5000
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.llm.default_model, "gemini-1.5-pro");
    assert_eq!(config.llm.stream_idle_timeout_secs, 15);
    assert_eq!(config.llm.request_timeout_secs, 120);
    assert_eq!(config.context.chat_max_chars, 5000);
    assert_eq!(config.context.agent_context_max_chars, 25_000);
}

#[test]
fn store_and_url_fetch_defaults() {
    let config = Config::default();
    assert_eq!(config.store.state_path, std::path::PathBuf::from("./data"));
    assert_eq!(config.url_fetch.max_bytes, 5 * 1024 * 1024);
    assert_eq!(config.url_fetch.timeout_secs, 20);
}
