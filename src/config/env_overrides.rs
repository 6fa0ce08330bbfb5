use super::{Config, LogLevel};

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("SCRIBETWIN_API_KEY")
            && !key.is_empty()
        {
            self.llm.api_key = Some(key);
        }

        if let Ok(model) = std::env::var("SCRIBETWIN_MODEL")
            && !model.is_empty()
        {
            self.llm.model = model;
        }

        if let Ok(source) = std::env::var("SCRIBETWIN_STYLE_SOURCE")
            && !source.is_empty()
        {
            self.corpus.default_style_source = Some(source);
        }

        if let Ok(port_str) =
            std::env::var("SCRIBETWIN_GATEWAY_PORT").or_else(|_| std::env::var("PORT"))
            && let Ok(port) = port_str.parse::<u16>()
        {
            self.gateway.port = port;
        }

        if let Ok(host) =
            std::env::var("SCRIBETWIN_GATEWAY_HOST").or_else(|_| std::env::var("HOST"))
            && !host.is_empty()
        {
            self.gateway.host = host;
        }

        if let Ok(level) = std::env::var("SCRIBETWIN_LOG_LEVEL")
            && let Ok(level) = level.parse::<LogLevel>()
        {
            self.observability.log_level = level;
        }
    }
}
