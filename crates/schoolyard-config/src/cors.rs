use std::env;

#[derive(Clone, Debug)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self { allowed_origins }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origins_are_split_and_trimmed() {
        let config = CorsConfig::from_lookup(|_| {
            Some(" https://a.school , ,https://b.school".to_string())
        });
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.school", "https://b.school"]
        );
    }

    #[test]
    fn test_default_origin() {
        let config = CorsConfig::from_lookup(|_| None);
        assert_eq!(config.allowed_origins, vec!["http://localhost:3000"]);
    }
}
